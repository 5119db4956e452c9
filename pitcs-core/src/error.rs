/// Errors produced by the `pitcs-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// An environment variable held a value that could not be interpreted.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    /// An inquiry field failed validation.
    #[error("inquiry field '{field}' {reason}")]
    InvalidInquiry { field: String, reason: String },
}
