//! Export forecast rows to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! A `.json` extension writes a pretty-printed array; anything else writes CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::Forecast;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to create export file '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write export JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to flush export file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Write every forecast row (history and future) to `path`.
pub fn write_forecast(path: &Path, forecast: &Forecast) -> Result<ExportFormat, ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let format = ExportFormat::from_path(path);

    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(file);
            for row in &forecast.rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &forecast.rows)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }

    tracing::info!(
        path = %path.display(),
        rows = forecast.rows.len(),
        ?format,
        "forecast exported"
    );
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, ModelSummary};
    use chrono::NaiveDate;

    fn forecast() -> Forecast {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Forecast {
            rows: vec![
                ForecastRow {
                    date: d(1),
                    predicted_price: 80.0,
                    lower_bound: 79.0,
                    upper_bound: 81.0,
                    is_future: false,
                },
                ForecastRow {
                    date: d(2),
                    predicted_price: 81.5,
                    lower_bound: 79.5,
                    upper_bound: 83.25,
                    is_future: true,
                },
            ],
            horizon: 1,
            backend: "additive",
            model: ModelSummary::default(),
        }
    }

    #[test]
    fn csv_export_has_header_and_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(write_forecast(&path, &forecast()).unwrap(), ExportFormat::Csv);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,predicted_price,lower_bound,upper_bound,is_future");
        assert_eq!(lines[1], "2024-01-01,80.0,79.0,81.0,false");
        assert_eq!(lines[2], "2024-01-02,81.5,79.5,83.25,true");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn json_extension_selects_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.JSON");
        assert_eq!(write_forecast(&path, &forecast()).unwrap(), ExportFormat::Json);

        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<ForecastRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows, forecast().rows);
    }

    #[test]
    fn unwritable_path_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_forecast(&path, &forecast()).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
        assert!(err.to_string().contains("out.csv"));
    }
}
