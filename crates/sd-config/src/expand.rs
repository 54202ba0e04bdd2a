//! `${VAR}` and `${VAR:-default}` references in configured titles and paths.

use crate::ConfigError;

/// Name of an environment variable referenced without a default and unset.
struct Unset(String);

/// Substitute environment references in the value of `field`.
///
/// Only the braced form is recognized, so a path containing a bare `$` is
/// left untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    let lookup = |name: &str| {
        std::env::var(name)
            .map(Some)
            .map_err(|_| Unset(name.to_owned()))
    };
    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(e) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        }),
    }
}

/// Expand every entry of a list-valued field, stopping at the first unset
/// reference.
pub(crate) fn expand_all(values: &[String], field: &str) -> Result<Vec<String>, ConfigError> {
    values.iter().map(|value| expand_env(value, field)).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_var_in_path() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SD_TEST_SNAPSHOTS", "/data/snapshots");
        }
        let result = expand_env("${SD_TEST_SNAPSHOTS}/pkg", "drivers.search_paths").unwrap();
        assert_eq!(result, "/data/snapshots/pkg");
        unsafe {
            std::env::remove_var("SD_TEST_SNAPSHOTS");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("SD_TEST_UNSET_TITLE");
        }
        let result = expand_env("${SD_TEST_UNSET_TITLE:-API docs}", "output.title").unwrap();
        assert_eq!(result, "API docs");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("SD_TEST_MISSING");
        }
        let err = expand_env("${SD_TEST_MISSING}", "output.title").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in output.title: ${SD_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_expand_all_reports_list_field() {
        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("SD_TEST_VENDOR", "/opt/vendor");
            std::env::remove_var("SD_TEST_NO_SUCH_DIR");
        }
        let paths = vec!["lib".to_owned(), "${SD_TEST_VENDOR}/snap".to_owned()];
        assert_eq!(
            expand_all(&paths, "drivers.search_paths").unwrap(),
            vec!["lib", "/opt/vendor/snap"]
        );

        let paths = vec!["${SD_TEST_NO_SUCH_DIR}".to_owned()];
        let err = expand_all(&paths, "drivers.search_paths").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { field, .. } if field == "drivers.search_paths"));
        unsafe {
            std::env::remove_var("SD_TEST_VENDOR");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("lib/$cache", "drivers.search_paths").unwrap(), "lib/$cache");
        assert_eq!(expand_env("plain", "output.title").unwrap(), "plain");
    }
}
