//! Driver dispatch.
//!
//! Inputs select a driver either explicitly (`path@driver`) or by file
//! extension. Drivers are constructed on first use and reused for every
//! later input of the same kind.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use sd_model::Documenter;

use crate::driver::{Driver, DriverContext};
use crate::error::DriverError;
use crate::markdown::{self, MarkdownDriver};
use crate::reflect::{self, ReflectDriver};
use crate::rust::{self, RustDriver};

/// Constructor of a driver from the run's shared context.
pub type DriverFactory = fn(&DriverContext) -> Box<dyn Driver>;

/// An input split into the driver that handles it and the identifier the
/// driver receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub driver: &'static str,
    pub identifier: &'a str,
}

/// Registry of driver factories and the drivers built from them.
pub struct DriverRegistry {
    context: DriverContext,
    factories: BTreeMap<&'static str, DriverFactory>,
    extensions: HashMap<String, &'static str>,
    drivers: HashMap<&'static str, Box<dyn Driver>>,
}

impl DriverRegistry {
    /// Create a registry with no drivers.
    #[must_use]
    pub fn new(context: DriverContext) -> Self {
        Self {
            context,
            factories: BTreeMap::new(),
            extensions: HashMap::new(),
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with the built-in `reflect`, `rust` and `markdown`
    /// drivers.
    #[must_use]
    pub fn with_defaults(context: DriverContext) -> Self {
        let mut registry = Self::new(context);
        registry.register(reflect::NAME, |ctx| Box::new(ReflectDriver::new(ctx)));
        registry.register(rust::NAME, |ctx| Box::new(RustDriver::new(ctx)));
        registry.register(markdown::NAME, |ctx| Box::new(MarkdownDriver::new(ctx)));
        registry.register_extension(reflect::SNAPSHOT_EXTENSION, reflect::NAME);
        registry.register_extension("rs", rust::NAME);
        registry.register_extension("md", markdown::NAME);
        registry.register_extension("markdown", markdown::NAME);
        registry
    }

    /// Register a driver factory under `name`, replacing any previous one.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        self.drivers.remove(name);
        self.factories.insert(name, factory);
    }

    /// Route files with `extension` (case-insensitive, without the dot) to
    /// the driver `name`.
    pub fn register_extension(&mut self, extension: &str, name: &'static str) {
        self.extensions.insert(extension.to_lowercase(), name);
    }

    /// Check if a driver is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered driver names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Check if the driver `name` has already been constructed.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Decide which driver handles `input`.
    ///
    /// An `@name` suffix wins over the extension. Without an extension the
    /// input is a module name for the `reflect` driver. A dotted module name
    /// such as `pkg.sub` is also routed there, unless a file of that name
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnknownDriver`] for an unregistered `@name` and
    /// [`DriverError::UnknownExtension`] when no driver handles the extension.
    pub fn select<'a>(&self, input: &'a str) -> Result<Selection<'a>, DriverError> {
        if let Some((identifier, name)) = input.rsplit_once('@')
            && !name.is_empty()
            && !name.contains(['/', '\\'])
        {
            let driver = self
                .factories
                .get_key_value(name)
                .map(|(key, _)| *key)
                .ok_or_else(|| DriverError::UnknownDriver {
                    identifier: identifier.to_owned(),
                    name: name.to_owned(),
                })?;
            return Ok(Selection { driver, identifier });
        }

        let path = Path::new(input);
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(Selection {
                driver: reflect::NAME,
                identifier: input,
            });
        };
        if let Some(&driver) = self.extensions.get(&extension.to_lowercase()) {
            return Ok(Selection {
                driver,
                identifier: input,
            });
        }
        if is_module_name(input) && !path.exists() {
            return Ok(Selection {
                driver: reflect::NAME,
                identifier: input,
            });
        }
        Err(DriverError::UnknownExtension {
            identifier: input.to_owned(),
            extension: extension.to_owned(),
        })
    }

    /// The driver `name`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnknownDriver`] if no factory is registered.
    pub fn driver(&mut self, name: &str) -> Result<&mut dyn Driver, DriverError> {
        let Some((&key, &factory)) = self.factories.get_key_value(name) else {
            return Err(DriverError::UnknownDriver {
                identifier: String::new(),
                name: name.to_owned(),
            });
        };
        let context = &self.context;
        let driver = self.drivers.entry(key).or_insert_with(|| {
            tracing::debug!(driver = key, "Constructing driver");
            factory(context)
        });
        Ok(driver.as_mut())
    }

    /// Select the driver for `input` and parse it into `documenter`.
    ///
    /// # Errors
    ///
    /// Returns selection errors and whatever the driver reports.
    pub fn parse(&mut self, documenter: &mut Documenter, input: &str) -> Result<(), DriverError> {
        let selection = self.select(input)?;
        tracing::debug!(input = %input, driver = selection.driver, "Dispatching input");
        self.driver(selection.driver)?
            .parse(documenter, selection.identifier)
    }
}

/// `pkg.sub.mod`: dot-separated identifiers without path separators.
fn is_module_name(input: &str) -> bool {
    input.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn registry() -> DriverRegistry {
        DriverRegistry::with_defaults(DriverContext::default())
    }

    fn selected(input: &str) -> &'static str {
        registry().select(input).unwrap().driver
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[test]
    fn test_select_by_extension() {
        assert_eq!(selected("src/lib.rs"), "rust");
        assert_eq!(selected("docs/guide.md"), "markdown");
        assert_eq!(selected("docs/GUIDE.Markdown"), "markdown");
        assert_eq!(selected("dump/pkg.objgraph"), "reflect");
    }

    #[test]
    fn test_select_module_names() {
        assert_eq!(selected("pkg"), "reflect");
        assert_eq!(selected("pkg.sub"), "reflect");
    }

    #[test]
    fn test_explicit_driver_wins() {
        let registry = registry();
        let selection = registry.select("notes.txt@markdown").unwrap();
        assert_eq!(
            selection,
            Selection {
                driver: "markdown",
                identifier: "notes.txt",
            }
        );
    }

    #[test]
    fn test_unknown_explicit_driver() {
        let err = registry().select("lib.rs@cobol").unwrap_err();
        assert!(matches!(
            err,
            DriverError::UnknownDriver { ref identifier, ref name } if identifier == "lib.rs" && name == "cobol"
        ));
    }

    #[test]
    fn test_unknown_extension() {
        let err = registry().select("notes/todo.txt").unwrap_err();
        assert!(matches!(
            err,
            DriverError::UnknownExtension { ref extension, .. } if extension == "txt"
        ));
    }

    #[test]
    fn test_existing_file_with_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "text").unwrap();

        let input = path.to_str().unwrap();
        assert!(registry().select(input).is_err());
        assert!(!is_module_name(input));
    }

    #[test]
    fn test_module_name_shape() {
        assert!(is_module_name("pkg._private.mod2"));
        assert!(!is_module_name("pkg..mod"));
        assert!(!is_module_name("2pkg"));
        assert!(!is_module_name("a/b.c"));
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_default_names() {
        assert_eq!(registry().names(), vec!["markdown", "reflect", "rust"]);
    }

    #[test]
    fn test_drivers_are_built_lazily_and_cached() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("a.md");
        let second = temp.path().join("b.md");
        fs::write(&first, "# A\n").unwrap();
        fs::write(&second, "# B\n").unwrap();

        let mut registry = registry();
        assert!(!registry.is_loaded("markdown"));

        let mut doc = Documenter::new();
        registry.parse(&mut doc, first.to_str().unwrap()).unwrap();
        registry.parse(&mut doc, second.to_str().unwrap()).unwrap();

        assert!(registry.is_loaded("markdown"));
        assert!(!registry.is_loaded("rust"));
        assert_eq!(doc.elements().len(), 2);
    }

    #[test]
    fn test_driver_unknown_name() {
        assert!(registry().driver("cobol").is_err());
    }

    #[test]
    fn test_register_custom_driver() {
        struct Nothing;
        impl Driver for Nothing {
            fn name(&self) -> &'static str {
                "nothing"
            }
            fn parse(&mut self, _: &mut Documenter, _: &str) -> Result<(), DriverError> {
                Ok(())
            }
        }

        let mut registry = DriverRegistry::new(DriverContext::default());
        registry.register("nothing", |_| Box::new(Nothing));
        registry.register_extension("TXT", "nothing");

        assert!(registry.has("nothing"));
        assert_eq!(registry.select("a.txt").unwrap().driver, "nothing");
        assert_eq!(registry.driver("nothing").unwrap().name(), "nothing");
    }
}
