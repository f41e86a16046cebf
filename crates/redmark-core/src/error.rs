use thiserror::Error;

/// Error taxonomy for the comparison engine.
///
/// Canonicalization failures are fatal; matching and diffing surface only
/// `Cancelled` and `Internal`; markup rendering tolerates absent optional
/// parts by creating them.
#[derive(Error, Debug)]
pub enum RedmarkError {
    #[error("Malformed OOXML package: {message}")]
    MalformedPackage { message: String },

    #[error("Unsupported content in '{part}': {message}")]
    UnsupportedContent { part: String, message: String },

    #[error("Broken reference '{r_id}' in part '{part}'")]
    BrokenReference { part: String, r_id: String },

    #[error("Invalid setting: {message}")]
    InvalidSetting { message: String },

    #[error("Comparison cancelled")]
    Cancelled,

    #[error("Internal error [{code}]: {message}")]
    Internal { code: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl RedmarkError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPackage {
            message: message.into(),
        }
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_setting(message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RedmarkError>;
