//! The documentation run: arguments, inputs and output destinations.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use sd_assets::AssetSource;
use sd_config::{CliSettings, Config};
use sd_drivers::{DriverContext, Session};
use sd_markup::Markup;
use sd_output::{OutputFormat, RenderOptions};

use crate::error::CliError;
use crate::output::Output;

/// smalldoc - generic API documentation generator.
#[derive(Parser, Debug)]
#[command(name = "smalldoc", version, about)]
pub(crate) struct Cli {
    /// Inputs to document: source files, snapshots or dotted module names,
    /// optionally suffixed with `@driver`. Arguments ending in `.json`,
    /// `.html`, `.htm` or `.js` are output destinations.
    inputs: Vec<String>,

    /// Output destination (repeatable).
    #[arg(short, long = "output", value_name = "PATH")]
    outputs: Vec<PathBuf>,

    /// Default output format (json, html, js) for destinations without a
    /// recognized extension and for standard output.
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Document title (overrides config).
    #[arg(short, long)]
    title: Option<String>,

    /// Extra search path for inputs (repeatable).
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    paths: Vec<PathBuf>,

    /// Docstring markup for reflected snapshots (none, markdown).
    #[arg(short, long)]
    markup: Option<Markup>,

    /// Path to configuration file (default: auto-discover smalldoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with a replacement page template, stylesheet and library.
    #[arg(long, value_name = "DIR", env = "SMALLDOC_THEME")]
    theme: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// A requested output file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Destination {
    path: PathBuf,
    format: OutputFormat,
}

/// Whether a positional argument names an output rather than an input.
fn is_destination(arg: &str) -> bool {
    !arg.contains('@') && OutputFormat::from_path(Path::new(arg)).is_some()
}

impl Cli {
    /// Execute the documentation run.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a driver violates the model
    /// contract, or outputs cannot be written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let (destination_args, inputs): (Vec<String>, Vec<String>) =
            self.inputs.into_iter().partition(|arg| is_destination(arg));

        if inputs.is_empty() {
            Self::command().print_help()?;
            return Ok(());
        }

        let cli_settings = CliSettings {
            title: self.title,
            format: self.format,
            search_paths: self.paths,
            markup: self.markup,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let context = DriverContext {
            search_paths: config.drivers_resolved.search_paths.clone(),
            markup: config.drivers_resolved.markup,
        };
        let mut session = Session::new(context);
        let report = session.process_all(&inputs)?;
        if !report.is_clean() {
            output.skipped_inputs(report.failures.len(), inputs.len());
        }

        let default_format = config.output_resolved.format;
        let destinations: Vec<Destination> = self
            .outputs
            .into_iter()
            .chain(destination_args.into_iter().map(PathBuf::from))
            .map(|path| Destination {
                format: OutputFormat::from_path(&path).unwrap_or(default_format),
                path,
            })
            .collect();

        let options = RenderOptions {
            title: config.output_resolved.title.clone(),
            assets: self.theme.map_or(AssetSource::Bundled, AssetSource::Directory),
        };
        let documenter = session.into_documenter();

        if destinations.is_empty() {
            let rendered = sd_output::render(&documenter, default_format, &options)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            writeln!(stdout)?;
            return Ok(());
        }

        if let [destination] = destinations.as_slice() {
            sd_output::write_to(&documenter, destination.format, &options, &destination.path)?;
            output.wrote(&destination.path);
            return Ok(());
        }

        let mut failed = 0;
        for destination in &destinations {
            match sd_output::write_to(&documenter, destination.format, &options, &destination.path) {
                Ok(()) => output.wrote(&destination.path),
                Err(e) => {
                    tracing::error!(path = %destination.path.display(), error = %e, "Output failed");
                    output.write_failed(&destination.path, &e);
                    failed += 1;
                }
            }
        }
        if failed > 0 {
            return Err(CliError::PartialOutput {
                failed,
                total: destinations.len(),
            });
        }
        output.documented(report.processed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("smalldoc").chain(args.iter().copied())).unwrap()
    }

    fn path(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_str().unwrap().to_owned()
    }

    /// Workspace with one Markdown input and an empty config, so discovery
    /// from the test's working directory is never involved.
    fn workspace() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("guide.md"), "Intro.\n\n# Usage\n\nRun it.\n").unwrap();
        fs::write(temp.path().join("smalldoc.toml"), "").unwrap();
        temp
    }

    #[test]
    fn test_arguments_are_split_into_inputs_and_destinations() {
        assert!(is_destination("out/api.json"));
        assert!(is_destination("index.HTML"));
        assert!(is_destination("data.js"));
        assert!(!is_destination("lib.rs"));
        assert!(!is_destination("pkg.sub"));
        assert!(!is_destination("bundle.js@markdown"));
    }

    #[test]
    fn test_parse_options() {
        let cli = cli(&["-f", "html", "-m", "none", "-t", "Docs", "-p", "lib", "-p", "vendor", "a.rs"]);
        assert_eq!(cli.format, Some(OutputFormat::Html));
        assert_eq!(cli.markup, Some(Markup::None));
        assert_eq!(cli.title.as_deref(), Some("Docs"));
        assert_eq!(cli.paths, vec![PathBuf::from("lib"), PathBuf::from("vendor")]);
        assert_eq!(cli.inputs, vec!["a.rs"]);
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = Cli::try_parse_from(["smalldoc", "-f", "pdf", "a.rs"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_positional_destination_is_written() {
        let temp = workspace();
        let out = path(&temp, "api.json");
        let config = path(&temp, "smalldoc.toml");

        cli(&["-c", &config, &path(&temp, "guide.md"), &out])
            .execute(&Output::new())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["children"][0][0], "guide");
        assert_eq!(
            value["children"][0][1]["children"][0][1]["id"],
            "guide.usage"
        );
    }

    #[test]
    fn test_output_flag_uses_default_format_for_unknown_extension() {
        let temp = workspace();
        let out = path(&temp, "api.txt");
        let config = path(&temp, "smalldoc.toml");

        cli(&["-c", &config, "-f", "js", "-o", &out, &path(&temp, "guide.md")])
            .execute(&Output::new())
            .unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("window.SMALLDOC_DATA = "));
    }

    #[test]
    fn test_only_destinations_does_nothing() {
        let temp = workspace();
        let out = path(&temp, "api.json");

        cli(&[&out]).execute(&Output::new()).unwrap();

        assert!(!Path::new(&out).exists());
    }

    #[test]
    fn test_single_destination_asset_failure_is_fatal() {
        let temp = workspace();
        let theme = TempDir::new().unwrap();
        let out = path(&temp, "index.html");
        let config = path(&temp, "smalldoc.toml");

        let err = cli(&[
            "-c",
            &config,
            "--theme",
            theme.path().to_str().unwrap(),
            &path(&temp, "guide.md"),
            &out,
        ])
        .execute(&Output::new())
        .unwrap_err();

        assert!(matches!(err, CliError::Output(_)));
        assert!(!Path::new(&out).exists());
    }

    #[test]
    fn test_asset_failure_keeps_other_destinations() {
        let temp = workspace();
        let theme = TempDir::new().unwrap();
        let html = path(&temp, "index.html");
        let json = path(&temp, "api.json");
        let config = path(&temp, "smalldoc.toml");

        let err = cli(&[
            "-c",
            &config,
            "--theme",
            theme.path().to_str().unwrap(),
            &path(&temp, "guide.md"),
            &html,
            &json,
        ])
        .execute(&Output::new())
        .unwrap_err();

        assert!(matches!(err, CliError::PartialOutput { failed: 1, total: 2 }));
        assert!(!Path::new(&html).exists());
        assert!(Path::new(&json).exists());
    }

    #[test]
    fn test_failed_inputs_do_not_fail_the_run() {
        let temp = workspace();
        let out = path(&temp, "api.json");
        let config = path(&temp, "smalldoc.toml");

        cli(&["-c", &config, &path(&temp, "missing.md"), &path(&temp, "guide.md"), &out])
            .execute(&Output::new())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["children"].as_array().unwrap().len(), 1);
    }
}
