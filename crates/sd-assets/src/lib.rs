//! Page assets for smalldoc output.
//!
//! Provides a single API for the page template, stylesheet and client
//! library in both embedded and filesystem modes:
//!
//! - **`embed` feature on**: assets are compiled into the binary via `rust-embed`
//! - **`embed` feature off**: assets are read from the crate's `assets/`
//!   directory at runtime

use std::borrow::Cow;
use std::path::PathBuf;

/// HTML page template with `title`, `stylesheet`, `library`, `bootstrap`
/// and `outline` placeholders.
pub const PAGE_TEMPLATE: &str = "page.html";

/// Stylesheet inlined into generated pages.
pub const STYLESHEET: &str = "smalldoc.css";

/// Client library that renders the model in the browser.
pub const LIBRARY: &str = "smalldoc.js";

/// Embedded assets (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
#[prefix = ""]
struct Assets;

/// Directory for filesystem-based asset loading.
#[cfg(not(feature = "embed"))]
const ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Error loading an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Get a bundled asset by path (relative to `assets/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(feature = "embed")]
#[must_use]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get a bundled asset by path (relative to `assets/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(not(feature = "embed"))]
#[must_use]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    std::fs::read(std::path::Path::new(ASSET_DIR).join(path))
        .ok()
        .map(Cow::Owned)
}

/// Where output rendering reads its assets from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssetSource {
    /// The assets shipped with smalldoc.
    #[default]
    Bundled,
    /// A theme directory holding files with the same names.
    Directory(PathBuf),
}

impl AssetSource {
    /// Raw contents of `path`, if present.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Cow<'static, [u8]>> {
        match self {
            Self::Bundled => get(path),
            Self::Directory(dir) => std::fs::read(dir.join(path)).ok().map(Cow::Owned),
        }
    }

    /// Contents of `path` as text.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] if the asset is missing and
    /// [`AssetError::Encoding`] if it is not UTF-8.
    pub fn text(&self, path: &str) -> Result<Cow<'static, str>, AssetError> {
        let bytes = self
            .get(path)
            .ok_or_else(|| AssetError::NotFound(path.to_owned()))?;
        match bytes {
            Cow::Borrowed(b) => std::str::from_utf8(b)
                .map(Cow::Borrowed)
                .map_err(|_| AssetError::Encoding(path.to_owned())),
            Cow::Owned(b) => String::from_utf8(b)
                .map(Cow::Owned)
                .map_err(|_| AssetError::Encoding(path.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_bundled_assets_present() {
        for name in [PAGE_TEMPLATE, STYLESHEET, LIBRARY] {
            assert!(get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_page_template_placeholders() {
        let page = AssetSource::Bundled.text(PAGE_TEMPLATE).unwrap();
        for placeholder in ["title", "stylesheet", "library", "bootstrap", "outline"] {
            assert!(
                page.contains(&format!("{{{{ {placeholder}")),
                "missing {placeholder}"
            );
        }
    }

    #[test]
    fn test_library_entry_points() {
        let library = AssetSource::Bundled.text(LIBRARY).unwrap();
        assert!(library.contains("setup"));
        assert!(library.contains("loadStyle"));
        assert!(library.contains("loadData"));
    }

    #[test]
    fn test_get_nonexistent_asset() {
        assert!(get("nonexistent_file_that_does_not_exist.txt").is_none());
    }

    #[test]
    fn test_directory_source() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(STYLESHEET), "body {}").unwrap();
        fs::write(temp.path().join("bad.bin"), [0xff, 0xfe]).unwrap();

        let source = AssetSource::Directory(temp.path().to_path_buf());
        assert_eq!(source.text(STYLESHEET).unwrap(), "body {}");
        assert!(matches!(
            source.text(LIBRARY),
            Err(AssetError::NotFound(name)) if name == LIBRARY
        ));
        assert!(matches!(source.text("bad.bin"), Err(AssetError::Encoding(_))));
    }
}
