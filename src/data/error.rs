use thiserror::Error;

/// Failure to obtain a usable dataset. Fatal for the load attempt: no
/// partial table is ever returned.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' not found")]
    MissingColumn(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("malformed data: {0:#}")]
    Malformed(#[from] anyhow::Error),
}

pub type DataResult<T> = Result<T, DataSourceError>;
