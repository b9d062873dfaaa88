use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] cryptotick_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Core(#[from] cryptotick_core::CoreError),

    #[error(transparent)]
    Table(#[from] cryptotick_core::TableError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Core(_) => 10,
            Self::Table(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_with_usage_code() {
        let error = CliError::from(cryptotick_core::ValidationError::EmptySymbol);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn filesystem_errors_exit_with_io_code() {
        let error = CliError::from(std::io::Error::other("disk full"));
        assert_eq!(error.exit_code(), 10);
    }
}
