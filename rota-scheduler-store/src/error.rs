use chrono::NaiveDate;
use rota_scheduler_core::error::InputError;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed workbook {path}: {source}")]
    Shape {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("end date {end} cannot be earlier than start date {start}")]
    LeaveValidation { start: NaiveDate, end: NaiveDate },
    #[error("leave request {0} not found")]
    UnknownRequest(Uuid),
    #[error("{path} is locked by another session")]
    Locked { path: PathBuf },
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
