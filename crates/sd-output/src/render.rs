use std::path::{Path, PathBuf};

use minijinja::{Environment, Value, context};
use sd_assets::{AssetError, AssetSource, LIBRARY, PAGE_TEMPLATE, STYLESHEET};
use sd_model::Documenter;

use crate::format::OutputFormat;
use crate::outline;

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "API documentation";

/// Error generating an output.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings for rendering one output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub assets: AssetSource,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            assets: AssetSource::Bundled,
        }
    }
}

/// Serialize `value` for embedding in a `<script>` element.
///
/// Every `<` is written as a JSON unicode escape, so no string in the data
/// can open or close a tag or comment inside the script.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, OutputError> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

/// Render the documenter in `format`.
///
/// # Errors
///
/// Returns an error if a page asset is missing, the page template fails to
/// render, or the model cannot be serialized.
pub fn render(
    documenter: &Documenter,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&documenter.view())?),
        OutputFormat::Html => render_html(documenter, options),
        OutputFormat::Js => render_js(documenter, options),
    }
}

fn render_html(documenter: &Documenter, options: &RenderOptions) -> Result<String, OutputError> {
    let page = options.assets.text(PAGE_TEMPLATE)?;
    let stylesheet = options.assets.text(STYLESHEET)?;
    let library = options.assets.text(LIBRARY)?;
    let data = script_json(&documenter.view())?;
    let bootstrap =
        format!("window.SMALLDOC_DATA = {data};\nsmalldoc.setup(window.SMALLDOC_DATA);");

    let env = Environment::new();
    let template = env.template_from_named_str(PAGE_TEMPLATE, &page)?;
    let html = template.render(context! {
        title => options.title.as_str(),
        stylesheet => Value::from_safe_string(stylesheet.into_owned()),
        library => Value::from_safe_string(library.into_owned()),
        bootstrap => Value::from_safe_string(bootstrap),
        outline => Value::from_safe_string(outline::render(documenter)),
    })?;
    Ok(html)
}

fn render_js(documenter: &Documenter, options: &RenderOptions) -> Result<String, OutputError> {
    let stylesheet = options.assets.text(STYLESHEET)?;
    let library = options.assets.text(LIBRARY)?;
    let data = script_json(&documenter.view())?;
    let stylesheet = script_json(&*stylesheet)?;

    Ok(format!(
        "window.SMALLDOC_DATA = {data};\n\
         {library}\n\
         smalldoc.loadStyle({stylesheet});\n\
         smalldoc.loadData(window.SMALLDOC_DATA);\n\
         smalldoc.setup();\n"
    ))
}

/// Render the documenter in `format` and write it to `path`.
///
/// # Errors
///
/// Returns rendering errors, or [`OutputError::Io`] if the file cannot be
/// written.
pub fn write_to(
    documenter: &Documenter,
    format: OutputFormat,
    options: &RenderOptions,
    path: &Path,
) -> Result<(), OutputError> {
    let mut output = render(documenter, format, options)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, output).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), format = %format, "Wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use sd_model::{ElementAttrs, verbs};
    use tempfile::TempDir;

    use super::*;

    fn documenter() -> Documenter {
        let mut doc = Documenter::new();
        let pkg = doc.create_module("pkg", ElementAttrs::new().id("pkg"));
        let f = doc.create_function(
            "f",
            ElementAttrs::new()
                .id("pkg.f")
                .documentation(Some("<p>does X</p>".to_owned())),
        );
        doc.element_mut(f).add_relation(
            verbs::ARGUMENTS,
            [vec!["a".to_owned(), "b=1".to_owned()]],
        );
        doc.element_mut(pkg).set_slot("f", f);
        doc.add_element(pkg);
        doc
    }

    #[test]
    fn test_render_json() {
        let json = render(&documenter(), OutputFormat::Json, &RenderOptions::default()).unwrap();
        assert_eq!(
            json,
            r#"{"children":[["pkg",{"id":"pkg","name":"pkg","type":"module","children":[["f",{"id":"pkg.f","name":"f","type":"function","documentation":"<p>does X</p>","relations":[["arguments",["a","b=1"]]]}]]}]]}"#
        );
    }

    #[test]
    fn test_render_html() {
        let options = RenderOptions {
            title: "Docs <&>".to_owned(),
            ..RenderOptions::default()
        };
        let html = render(&documenter(), OutputFormat::Html, &options).unwrap();

        assert!(html.contains("<title>Docs &lt;&amp;&gt;</title>"));
        assert!(html.contains("window.SMALLDOC_DATA = {\"children\""));
        assert!(html.contains("smalldoc.setup(window.SMALLDOC_DATA);"));
        assert!(html.contains("\"documentation\":\"\\u003cp>does X\\u003c/p>\""));
        assert!(html.contains("<div class=\"sd-outline\">"));
        assert!(html.contains("var smalldoc"));
    }

    #[test]
    fn test_render_js() {
        let js = render(&documenter(), OutputFormat::Js, &RenderOptions::default()).unwrap();

        assert!(js.starts_with("window.SMALLDOC_DATA = {\"children\""));
        let style = js.find("smalldoc.loadStyle(\"").unwrap();
        let data = js.find("smalldoc.loadData(window.SMALLDOC_DATA);").unwrap();
        let setup = js.find("smalldoc.setup();").unwrap();
        assert!(js.find("var smalldoc").unwrap() < style);
        assert!(style < data && data < setup);
    }

    #[test]
    fn test_missing_asset_fails_page_formats_only() {
        let temp = TempDir::new().unwrap();
        let options = RenderOptions {
            assets: AssetSource::Directory(temp.path().to_path_buf()),
            ..RenderOptions::default()
        };
        let doc = documenter();

        assert!(render(&doc, OutputFormat::Json, &options).is_ok());
        assert!(matches!(
            render(&doc, OutputFormat::Html, &options),
            Err(OutputError::Asset(AssetError::NotFound(_)))
        ));
        assert!(matches!(
            render(&doc, OutputFormat::Js, &options),
            Err(OutputError::Asset(_))
        ));
    }

    #[test]
    fn test_write_to_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/api.json");

        write_to(&documenter(), OutputFormat::Json, &RenderOptions::default(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("]]}\n"));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["children"][0][0], "pkg");
    }

    #[test]
    fn test_script_json_escapes_every_angle_bracket() {
        assert_eq!(script_json("</script>").unwrap(), r#""\u003c/script>""#);
        assert_eq!(
            script_json("<!--<script>").unwrap(),
            r#""\u003c!--\u003cscript>""#
        );
        let back: String = serde_json::from_str(&script_json("a < b").unwrap()).unwrap();
        assert_eq!(back, "a < b");
    }

    #[test]
    fn test_html_page_keeps_comment_openers_out_of_script() {
        let mut doc = Documenter::new();
        let m = doc.create_module(
            "m",
            ElementAttrs::new()
                .id("m")
                .documentation(Some("<p><!--<script></p>".to_owned())),
        );
        doc.add_element(m);

        let html = render(&doc, OutputFormat::Html, &RenderOptions::default()).unwrap();
        let data = html.find("window.SMALLDOC_DATA = ").unwrap();
        let end = data + html[data..].find("</script>").unwrap();
        assert!(!html[data..end].contains('<'));
    }
}
