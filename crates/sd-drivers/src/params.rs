//! Display-ready parameter descriptors for `arguments` relations.

use std::fmt;

use serde::Deserialize;

/// Variadic marker of a parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variadic {
    #[default]
    None,
    /// Collects extra positional arguments (`*name`).
    Positional,
    /// Collects extra keyword arguments (`**name`).
    Keyword,
}

/// One formal parameter of a callable.
///
/// Formats as `name[:type][=default]`, prefixed by `*` or `**` for
/// variadics. The formatted strings are what the model stores; they are
/// meant for display, not for re-parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub variadic: Variadic,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_annotation: impl Into<String>) -> Self {
        self.type_annotation = Some(type_annotation.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn variadic(mut self, variadic: Variadic) -> Self {
        self.variadic = variadic;
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variadic {
            Variadic::None => {}
            Variadic::Positional => f.write_str("*")?,
            Variadic::Keyword => f.write_str("**")?,
        }
        f.write_str(&self.name)?;
        if let Some(ty) = &self.type_annotation {
            write!(f, ":{ty}")?;
        }
        if let Some(default) = &self.default {
            write!(f, "={default}")?;
        }
        Ok(())
    }
}

/// Format parameters into the string list stored by `arguments` relations.
#[must_use]
pub fn format_parameters(parameters: &[Parameter]) -> Vec<String> {
    parameters.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_default() {
        let params = [Parameter::new("a"), Parameter::new("b").with_default("1")];
        assert_eq!(format_parameters(&params), vec!["a", "b=1"]);
    }

    #[test]
    fn test_type_annotation_precedes_default() {
        let param = Parameter::new("limit")
            .with_type("usize")
            .with_default("10");
        assert_eq!(param.to_string(), "limit:usize=10");
    }

    #[test]
    fn test_variadics() {
        let params = [
            Parameter::new("args").variadic(Variadic::Positional),
            Parameter::new("kw").variadic(Variadic::Keyword),
        ];
        assert_eq!(format_parameters(&params), vec!["*args", "**kw"]);
    }

    #[test]
    fn test_deserialize_snapshot_parameter() {
        let param: Parameter =
            serde_json::from_str(r#"{"name": "x", "type": "int", "variadic": "keyword"}"#).unwrap();
        assert_eq!(param.to_string(), "**x:int");
    }
}
