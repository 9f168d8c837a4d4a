//! `mdsvg process` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use mdsvg_config::{CliSettings, Config, OnError};
use mdsvg_inline::{Document, FileContext, InlineOptions, InlineReport, SvgInliner};

use crate::error::CliError;
use crate::output::Output;
use crate::walk::markdown_files;

/// Arguments for the process command.
#[derive(Args)]
pub(crate) struct ProcessArgs {
    /// Content directories to scan for markdown files (overrides config).
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Output directory for rendered HTML (overrides config).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Image URL suffix that marks images for inlining (overrides config).
    #[arg(long)]
    suffix: Option<String>,

    /// Static asset directory for site-root image URLs (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Exit non-zero when any image fails to inline (overrides config).
    #[arg(long)]
    strict: bool,

    /// Report inline failures without failing the run.
    #[arg(long, conflicts_with = "strict")]
    no_strict: bool,

    /// Enable verbose output (show per-file inlining logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (default: auto-discover mdsvg.toml).
    #[arg(short, long, env = "MDSVG_CONFIG")]
    config: Option<PathBuf>,
}

impl ProcessArgs {
    /// Execute the process command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a file cannot be read or
    /// written, or any image failed to inline under the `fail` policy.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Resolve flags before moving into CliSettings
        let on_error = self.resolve_on_error();

        let cli_settings = CliSettings {
            suffix: self.suffix,
            static_dir: self.static_dir,
            content_dirs: (!self.dirs.is_empty()).then_some(self.dirs),
            out_dir: self.out,
            on_error,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let inliner = SvgInliner::new(
            InlineOptions::new(config.site_root.clone())
                .suffix(config.inline_resolved.suffix.clone())
                .static_dir(config.inline_resolved.static_dir.clone()),
        );
        let out_dir = &config.content_resolved.out_dir;

        output.info(&format!("Site root: {}", config.site_root.display()));
        output.info(&format!("Output: {}", out_dir.display()));

        let mut processed = 0_usize;
        let mut inlined = 0_usize;
        let mut failed = 0_usize;

        for dir in &config.content_resolved.dirs {
            let files = markdown_files(dir);
            output.info(&format!(
                "Content: {} ({} files)",
                dir.display(),
                files.len()
            ));

            // Each content directory mirrors into its own subtree of out_dir
            let target_root = match dir.file_name() {
                Some(name) => out_dir.join(name),
                None => out_dir.clone(),
            };

            for path in &files {
                let report = process_file(&inliner, path, dir, &target_root)?;
                processed += 1;
                inlined += report.inlined;
                failed += report.errors.len();
                for err in &report.errors {
                    output.file_warning(path, err);
                }
            }
        }

        if failed > 0 && config.inline_resolved.on_error == OnError::Fail {
            return Err(CliError::Inline(format!(
                "{failed} images failed to inline"
            )));
        }

        output.success(&format!(
            "Processed {processed} files, inlined {inlined} images"
        ));
        Ok(())
    }

    /// Resolve the failure policy from --strict/--no-strict flags.
    fn resolve_on_error(&self) -> Option<OnError> {
        self.strict
            .then_some(OnError::Fail)
            .or(self.no_strict.then_some(OnError::Warn))
    }
}

/// Transform a single markdown file and write the rendered HTML.
///
/// The output path mirrors the file's location under `content_dir`, with the
/// extension swapped to `.html`.
fn process_file(
    inliner: &SvgInliner,
    path: &Path,
    content_dir: &Path,
    target_root: &Path,
) -> Result<InlineReport, CliError> {
    let source = fs::read_to_string(path)?;
    let mut doc = Document::parse(&source);
    let report = inliner.inline(&mut doc, &FileContext::new(path));

    let relative = path.strip_prefix(content_dir).unwrap_or(path);
    let target = target_root.join(relative).with_extension("html");
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, doc.to_html())?;
    tracing::debug!(path = %target.display(), "Wrote rendered HTML");

    Ok(report)
}
