/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded; for `validate`, the settings are valid.
    Ok = 0,
    /// Config, settings file, runtime or coordinator failure.
    Error = 1,
    /// `validate` ran and the report contains errors.
    InvalidSettings = 2,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Failures at the CLI boundary itself (writing output, building the runtime).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) | Self::Serialization(_) => ExitCode::Error,
        }
    }
}
