use crate::forecast::ForecastError;
use crate::io::export::ExportError;
use crate::io::ingest::LoadError;

/// Process-level error: a user-facing message plus the exit code `main` returns.
///
/// Exit codes:
/// - `2`: input problems (missing/malformed data file, bad flags, export paths)
/// - `3`: the selection left nothing to forecast
/// - `4`: runtime failures (terminal, forecaster)
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, format!("Failed to load data file: {err}"))
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let code = match err {
            ForecastError::EmptySelection | ForecastError::TooFewRows { .. } => 3,
            ForecastError::Unavailable(_) | ForecastError::Solve(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::new(2, err.to_string())
    }
}
