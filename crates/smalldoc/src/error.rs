//! CLI error types.

use sd_config::ConfigError;
use sd_drivers::DriverError;
use sd_output::OutputError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("{0}")]
    Output(#[from] OutputError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} outputs could not be written")]
    PartialOutput { failed: usize, total: usize },
}
