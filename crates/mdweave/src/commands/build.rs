//! `build` command implementation.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use mdweave_ast::{Document, TargetFormat};
use mdweave_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;
use crate::pipeline::Pipeline;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Markdown input file, or `-` for stdin.
    #[arg(default_value = "-")]
    input: String,

    /// Target format tag (e.g. `html`, `latex`, `pdf`).
    #[arg(short = 't', long = "to", default_value = "generic")]
    to: String,

    /// Write the document tree here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdweave.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram artifact directory (overrides config).
    #[arg(long, env = "MDWEAVE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Re-render every diagram instead of reusing stored artifacts.
    #[arg(long)]
    no_cache: bool,

    /// Maximum include nesting depth (overrides config).
    #[arg(long)]
    max_include_depth: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, reading the input, a fatal
    /// filter failure or writing the output fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            max_include_depth: self.max_include_depth,
            cache_dir: self.cache_dir.clone(),
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!("using configuration {}", path.display());
        }

        let (source, include_root) = self.read_input()?;
        let format = TargetFormat::from_tag(&self.to);

        let mut pipeline = Pipeline::new(&config, &include_root);
        let doc = pipeline.run(&source, format)?;

        for warning in pipeline.warnings() {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                write_document(BufWriter::new(File::create(path)?), &doc)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => write_document(io::stdout().lock(), &doc)?,
        }
        Ok(())
    }

    /// Input text and the directory include paths resolve against.
    fn read_input(&self) -> Result<(String, PathBuf), CliError> {
        if self.input == "-" {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            return Ok((source, PathBuf::from(".")));
        }

        let path = Path::new(&self.input);
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((source, root))
    }
}

fn write_document(mut writer: impl Write, doc: &Document) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
