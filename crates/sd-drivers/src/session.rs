//! A documentation run over a list of inputs.

use sd_model::Documenter;

use crate::driver::DriverContext;
use crate::error::DriverError;
use crate::registry::DriverRegistry;

/// An input that was skipped, and why.
#[derive(Debug)]
pub struct InputFailure {
    pub identifier: String,
    pub error: DriverError,
}

/// Outcome of [`Session::process_all`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Inputs parsed successfully, in order.
    pub processed: Vec<String>,
    /// Inputs skipped because of a recoverable error.
    pub failures: Vec<InputFailure>,
}

impl RunReport {
    /// Whether every input was processed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One documenter shared by every driver of the run.
pub struct Session {
    documenter: Documenter,
    registry: DriverRegistry,
}

impl Session {
    /// Session with the built-in drivers.
    #[must_use]
    pub fn new(context: DriverContext) -> Self {
        Self::with_registry(DriverRegistry::with_defaults(context))
    }

    #[must_use]
    pub fn with_registry(registry: DriverRegistry) -> Self {
        Self {
            documenter: Documenter::new(),
            registry,
        }
    }

    #[must_use]
    pub fn documenter(&self) -> &Documenter {
        &self.documenter
    }

    #[must_use]
    pub fn into_documenter(self) -> Documenter {
        self.documenter
    }

    /// Parse one input.
    ///
    /// # Errors
    ///
    /// Returns driver selection and parse errors unchanged.
    pub fn process(&mut self, input: &str) -> Result<(), DriverError> {
        self.registry.parse(&mut self.documenter, input)
    }

    /// Parse `inputs` in order, logging and skipping the ones that fail.
    ///
    /// Elements added by an input that failed half-way stay in the model.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error ([`DriverError::is_fatal`]), abandoning
    /// the remaining inputs.
    pub fn process_all<I, S>(&mut self, inputs: I) -> Result<RunReport, DriverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = RunReport::default();
        for input in inputs {
            let input = input.as_ref();
            match self.process(input) {
                Ok(()) => {
                    tracing::info!(input = %input, "Documented input");
                    report.processed.push(input.to_owned());
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(input = %input, error = %e, "Aborting run");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(input = %input, error = %e, "Skipping input");
                    report.failures.push(InputFailure {
                        identifier: input.to_owned(),
                        error: e,
                    });
                }
            }
        }
        Ok(report)
    }
}
