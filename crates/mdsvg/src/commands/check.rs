//! `mdsvg check` command implementation.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use mdsvg_config::{CliSettings, Config};
use mdsvg_inline::{Document, FileContext, InlineOptions, SvgInliner};

use crate::error::CliError;
use crate::output::Output;
use crate::walk::markdown_files;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Content directories to scan for markdown files (overrides config).
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Image URL suffix that marks images for inlining (overrides config).
    #[arg(long)]
    suffix: Option<String>,

    /// Static asset directory for site-root image URLs (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Enable verbose output (show per-file inlining logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (default: auto-discover mdsvg.toml).
    #[arg(short, long, env = "MDSVG_CONFIG")]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Runs the same scan and transform as `process` but writes nothing.
    /// Failures always produce a non-zero exit, regardless of the configured
    /// `on_error` policy.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            suffix: self.suffix,
            static_dir: self.static_dir,
            content_dirs: (!self.dirs.is_empty()).then_some(self.dirs),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let inliner = SvgInliner::new(
            InlineOptions::new(config.site_root.clone())
                .suffix(config.inline_resolved.suffix.clone())
                .static_dir(config.inline_resolved.static_dir.clone()),
        );

        let mut checked = 0_usize;
        let mut inlined = 0_usize;
        let mut failed = 0_usize;

        for dir in &config.content_resolved.dirs {
            let files = markdown_files(dir);
            output.info(&format!(
                "Checking {} ({} files)",
                dir.display(),
                files.len()
            ));

            for path in &files {
                let source = fs::read_to_string(path)?;
                let mut doc = Document::parse(&source);
                let report = inliner.inline(&mut doc, &FileContext::new(path));

                checked += 1;
                inlined += report.inlined;
                failed += report.errors.len();
                for err in &report.errors {
                    output.file_warning(path, err);
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Inline(format!(
                "{failed} images failed to inline"
            )));
        }

        output.success(&format!(
            "Checked {checked} files, {inlined} images inline cleanly"
        ));
        Ok(())
    }
}
