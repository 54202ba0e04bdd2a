//! Driver error type.

use std::path::PathBuf;

/// Error raised while resolving, selecting or parsing an input.
///
/// Everything except [`DriverError::Contract`] is an input problem: the run
/// logs it and continues with the next input. A contract violation means a
/// driver produced something the model cannot represent and aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Input could not be resolved to a file.
    #[error("Cannot resolve input: {identifier}")]
    NotFound { identifier: String },

    /// Input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input was found but could not be parsed.
    #[error("Failed to parse {identifier}: {message}")]
    Parse { identifier: String, message: String },

    /// Explicit `@driver` suffix names no known driver.
    #[error("Unknown driver '{name}' for input {identifier}")]
    UnknownDriver { identifier: String, name: String },

    /// No driver handles the input's extension.
    #[error("No driver for extension '.{extension}' of input {identifier}")]
    UnknownExtension {
        identifier: String,
        extension: String,
    },

    /// Driver tried to represent an entity the model has no mapping for.
    #[error("Driver '{driver}' violated the model contract: {message}")]
    Contract {
        driver: &'static str,
        message: String,
    },
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(identifier: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            identifier: identifier.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error must abort the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_contract_is_fatal() {
        let recoverable = [
            DriverError::NotFound {
                identifier: "pkg".to_owned(),
            },
            DriverError::parse("a.rs", "expected item"),
            DriverError::UnknownDriver {
                identifier: "a.txt@pdf".to_owned(),
                name: "pdf".to_owned(),
            },
            DriverError::UnknownExtension {
                identifier: "a.txt".to_owned(),
                extension: "txt".to_owned(),
            },
            DriverError::io("a.rs", std::io::Error::other("denied")),
        ];
        assert!(recoverable.iter().all(|e| !e.is_fatal()));

        let fatal = DriverError::Contract {
            driver: "reflect",
            message: "unknown kind 'coroutine'".to_owned(),
        };
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_display_names_identifier() {
        let err = DriverError::NotFound {
            identifier: "missing.module".to_owned(),
        };
        assert_eq!(err.to_string(), "Cannot resolve input: missing.module");
    }
}
