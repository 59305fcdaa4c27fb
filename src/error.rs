use thiserror::Error;

pub type Result<T> = std::result::Result<T, CowError>;

#[derive(Error, Debug)]
pub enum CowError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Path too long: {len} bytes exceeds limit of {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Ownership error: {0}")]
    Ownership(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl CowError {
    /// POSIX errno to hand back to a filesystem client.
    pub fn errno(&self) -> i32 {
        match self {
            CowError::InvalidArgument(_) => libc::EINVAL,
            CowError::NameTooLong { .. } => libc::ENAMETOOLONG,
            CowError::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
            CowError::Ownership(_) => libc::EPERM,
            CowError::Config(_) | CowError::Json(_) => libc::EIO,
        }
    }
}

impl From<std::io::Error> for CowError {
    fn from(err: std::io::Error) -> Self {
        CowError::Io(err)
    }
}

impl From<serde_json::Error> for CowError {
    fn from(err: serde_json::Error) -> Self {
        CowError::Json(err.to_string())
    }
}
