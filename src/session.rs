//! Session-scoped dataset cache.
//!
//! The price table is loaded exactly once when a session starts and shared
//! immutably afterwards. Nothing invalidates it short of a process restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::DashboardConfig;
use crate::forecast::Capability;
use crate::io::ingest::{Dataset, LoadError, load_dataset};

/// Everything a front-end needs that does not change while it runs.
#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    dataset: Arc<Dataset>,
    capability: Capability,
}

impl Session {
    /// Load the data file and resolve the configured forecaster.
    pub fn open(config: &DashboardConfig) -> Result<Self, LoadError> {
        let dataset = load_dataset(&config.data_path)?;
        let capability = Capability::resolve(config.forecaster, &config.model);
        if let Capability::Disabled(reason) = &capability {
            tracing::warn!(%reason, "forecasting disabled for this session");
        }
        Ok(Self::with_dataset(&config.data_path, dataset, capability))
    }

    /// Build a session around an already-loaded dataset.
    pub fn with_dataset(source: &Path, dataset: Dataset, capability: Capability) -> Self {
        Self {
            source: source.to_path_buf(),
            dataset: Arc::new(dataset),
            capability,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}
