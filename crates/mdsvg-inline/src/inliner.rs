//! The path-resolving inline SVG transform.
//!
//! [`SvgInliner`] walks a parsed document for image references whose
//! URL ends with the configured suffix, resolves each URL to a
//! filesystem path, loads the referenced SVG files in parallel, and
//! splices the markup over the image spans. Failures are collected per
//! image so one broken reference cannot take down the whole document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::consts::{DEFAULT_STATIC_DIR, DEFAULT_SUFFIX};
use crate::document::ImageDocument;
use crate::resolve::{FileContext, resolve_image_path};
use crate::svg::load_svg;

/// Options for the inline SVG transform (immutable after setup).
///
/// The site root is required; it anchors `/img/` URLs and replaces any
/// reliance on the ambient working directory, so resolution stays a
/// pure function of the options and the document's location.
#[derive(Clone, Debug)]
pub struct InlineOptions {
    /// Root directory of the documentation site (required).
    pub(crate) site_root: PathBuf,
    /// URL suffix that marks an image for inlining.
    pub(crate) suffix: String,
    /// Static asset directory, relative to the site root unless absolute.
    pub(crate) static_dir: PathBuf,
}

impl InlineOptions {
    /// Create options rooted at `site_root`.
    ///
    /// # Example
    ///
    /// ```
    /// use mdsvg_inline::InlineOptions;
    ///
    /// let options = InlineOptions::new("/repo")
    ///     .suffix(".svg")
    ///     .static_dir("assets");
    /// assert_eq!(options.static_root(), std::path::PathBuf::from("/repo/assets"));
    /// ```
    #[must_use]
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            suffix: DEFAULT_SUFFIX.to_owned(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }

    /// Set the URL suffix that marks an image for inlining.
    ///
    /// Default is `.inline.svg`, so regular SVG references stay plain
    /// `<img>` tags unless opted in.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the static asset directory.
    ///
    /// Default is `static`. Relative directories are taken relative to
    /// the site root; absolute directories are honored as-is.
    #[must_use]
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Root directory of the documentation site.
    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// The directory `/img/` URLs resolve into.
    #[must_use]
    pub fn static_root(&self) -> PathBuf {
        if self.static_dir.is_absolute() {
            self.static_dir.clone()
        } else {
            self.site_root.join(&self.static_dir)
        }
    }
}

/// Failure to inline a single image.
#[derive(Debug, thiserror::Error)]
#[error("image {index} ({url}): {kind}")]
pub struct InlineError {
    /// Position of the image in document order.
    pub index: usize,
    /// URL as written in the document.
    pub url: String,
    /// What went wrong.
    pub kind: InlineErrorKind,
}

/// Kind of inlining error.
#[derive(Clone, Debug, thiserror::Error)]
pub enum InlineErrorKind {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid UTF-8: {0}")]
    Utf8(String),
    #[error("not an SVG document")]
    NotSvg,
}

/// Result of one transform pass over a document.
#[derive(Debug, Default)]
pub struct InlineReport {
    /// Number of images replaced with inline markup.
    pub inlined: usize,
    /// Errors for images that could not be inlined, in document order.
    pub errors: Vec<InlineError>,
}

/// An image selected for inlining during traversal.
#[derive(Debug)]
struct MatchedImage {
    index: usize,
    url: String,
    path: PathBuf,
}

/// A successfully loaded SVG, keyed back to its image.
#[derive(Debug)]
struct LoadedSvg {
    index: usize,
    svg: String,
}

/// Result of loading SVG files with partial failures.
#[derive(Debug)]
struct PartialLoadResult {
    loaded: Vec<LoadedSvg>,
    errors: Vec<InlineError>,
}

/// The inline SVG transform.
///
/// One pass over a document:
/// 1. Visit image references; collect those whose URL ends with the
///    configured suffix.
/// 2. Resolve each collected URL (`/img/` against the static directory,
///    everything else against the document) and overwrite the node URL
///    with the resolved path.
/// 3. Load each distinct file once, in parallel on the global rayon
///    thread pool.
/// 4. After all loads complete, splice the SVG markup over the image
///    spans and report per-image failures.
///
/// The pass is not idempotent: rewritten URLs no longer carry the
/// original suffix, so run it once per parsed document.
pub struct SvgInliner {
    options: InlineOptions,
}

impl SvgInliner {
    /// Create an inliner with the given options.
    #[must_use]
    pub fn new(options: InlineOptions) -> Self {
        Self { options }
    }

    /// Run the transform over one document.
    ///
    /// Returns how many images were inlined and an error per image that
    /// could not be. Documents without matching images are returned
    /// untouched without any filesystem access.
    pub fn inline<D: ImageDocument>(&self, doc: &mut D, file: &FileContext) -> InlineReport {
        let matched = self.collect_and_rewrite(doc, file);
        if matched.is_empty() {
            return InlineReport::default();
        }

        tracing::info!(
            file = %file.path().display(),
            matched = matched.len(),
            "Inlining SVG images"
        );

        let result = load_matched(&matched);

        let mut replacements = HashMap::with_capacity(result.loaded.len());
        for item in result.loaded {
            replacements.insert(item.index, item.svg);
        }
        let inlined = replacements.len();
        doc.replace_images(replacements);

        for error in &result.errors {
            tracing::warn!(file = %file.path().display(), "{error}");
        }

        InlineReport {
            inlined,
            errors: result.errors,
        }
    }

    /// Collect images matching the suffix and rewrite their URLs to
    /// resolved filesystem paths.
    fn collect_and_rewrite<D: ImageDocument>(
        &self,
        doc: &mut D,
        file: &FileContext,
    ) -> Vec<MatchedImage> {
        let mut matched = Vec::new();
        doc.visit_images(&mut |image| {
            if !image.url().ends_with(&self.options.suffix) {
                return;
            }
            let url = image.url().to_owned();
            let path = resolve_image_path(&url, file, &self.options);
            image.set_url(path.to_string_lossy().into_owned());
            matched.push(MatchedImage {
                index: image.index(),
                url,
                path,
            });
        });
        matched
    }
}

/// Load the matched files in parallel, each distinct file once.
///
/// Uses the global rayon thread pool. Returns partial results so a
/// missing or malformed file only fails the images referencing it.
fn load_matched(matched: &[MatchedImage]) -> PartialLoadResult {
    let mut groups: HashMap<&Path, Vec<&MatchedImage>> = HashMap::new();
    for image in matched {
        groups.entry(image.path.as_path()).or_default().push(image);
    }
    // Map iteration order is arbitrary; fan out in document order
    let mut groups: Vec<(&Path, Vec<&MatchedImage>)> = groups.into_iter().collect();
    groups.sort_by_key(|(_, images)| images[0].index);

    let results: Vec<Result<LoadedSvg, InlineError>> = groups
        .par_iter()
        .flat_map_iter(|(path, images)| {
            let loaded = load_svg(path);
            images
                .iter()
                .map(|image| match &loaded {
                    Ok(svg) => Ok(LoadedSvg {
                        index: image.index,
                        svg: svg.clone(),
                    }),
                    Err(kind) => Err(InlineError {
                        index: image.index,
                        url: image.url.clone(),
                        kind: kind.clone(),
                    }),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    partition_results(results)
}

/// Partition per-image results into successes and failures, with the
/// failures in document order.
fn partition_results(results: Vec<Result<LoadedSvg, InlineError>>) -> PartialLoadResult {
    let mut loaded = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(item) => loaded.push(item),
            Err(error) => errors.push(error),
        }
    }
    errors.sort_by_key(|error| error.index);

    PartialLoadResult { loaded, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, ImageRef};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    static_assertions::assert_impl_all!(SvgInliner: Send, Sync);
    static_assertions::assert_impl_all!(InlineReport: Send);

    const LOGO_SVG: &str = "<?xml version=\"1.0\"?>\n<svg id=\"logo\"><rect/></svg>";
    const DIAGRAM_SVG: &str = "<svg id=\"diagram\"><circle/></svg>";

    /// Lay out a site: static/img/logo.inline.svg + docs/diagram.inline.svg.
    fn site() -> TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("static/img")).unwrap();
        fs::create_dir_all(root.path().join("docs")).unwrap();
        fs::write(root.path().join("static/img/logo.inline.svg"), LOGO_SVG).unwrap();
        fs::write(root.path().join("docs/diagram.inline.svg"), DIAGRAM_SVG).unwrap();
        root
    }

    fn guide_context(root: &Path) -> FileContext {
        FileContext::new(root.join("docs/guide.md"))
    }

    #[test]
    fn test_options_defaults() {
        let options = InlineOptions::new("/repo");
        assert_eq!(options.suffix, ".inline.svg");
        assert_eq!(options.static_root(), PathBuf::from("/repo/static"));
        assert_eq!(options.site_root(), Path::new("/repo"));
    }

    #[test]
    fn test_inline_site_root_and_relative_urls() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let markdown = "![logo](/img/logo.inline.svg)\n\n![diagram](diagram.inline.svg)";
        let mut doc = Document::parse(markdown);

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 2);
        assert!(report.errors.is_empty());
        let html = doc.to_html();
        assert!(html.contains("<svg id=\"logo\">"), "html: {html}");
        assert!(html.contains("<svg id=\"diagram\">"), "html: {html}");
        assert!(!html.contains("<img"), "all images replaced: {html}");
    }

    #[test]
    fn test_non_matching_images_stay_untouched() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let markdown = "![photo](photo.png) and ![plain](plain.svg)";
        let mut doc = Document::parse(markdown);
        let before = doc.clone();

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 0);
        assert!(report.errors.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_zero_matches_needs_no_filesystem() {
        // Site root does not exist; without matches nothing is read.
        let inliner = SvgInliner::new(InlineOptions::new("/nonexistent"));
        let mut doc = Document::parse("no images here, just text");
        let before = doc.clone();

        let report = inliner.inline(&mut doc, &FileContext::new("/nonexistent/docs/a.md"));

        assert_eq!(report.inlined, 0);
        assert!(report.errors.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_missing_file_fails_only_that_image() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let markdown = "![ok](/img/logo.inline.svg) ![gone](absent.inline.svg)";
        let mut doc = Document::parse(markdown);

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 1);
        assert_eq!(report.errors.len(), 1);
        let error = &report.errors[0];
        assert_eq!(error.index, 1);
        assert_eq!(error.url, "absent.inline.svg");
        assert!(matches!(error.kind, InlineErrorKind::Io(_)));

        // The failed image keeps its rewritten absolute URL.
        let html = doc.to_html();
        assert!(html.contains("<svg id=\"logo\">"), "html: {html}");
        let failed_src = root.path().join("docs/absent.inline.svg");
        assert!(
            html.contains(failed_src.to_str().unwrap()),
            "html: {html}"
        );
    }

    #[test]
    fn test_invalid_svg_reported_per_image() {
        let root = site();
        fs::write(root.path().join("docs/broken.inline.svg"), "not xml at all").unwrap();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let mut doc = Document::parse("![broken](broken.inline.svg)");

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0].kind, InlineErrorKind::NotSvg));
    }

    #[test]
    fn test_errors_report_in_document_order() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let markdown = "![a](gone-a.inline.svg) ![b](gone-b.inline.svg)\n\n\
                        ![a](gone-a.inline.svg) ![c](gone-c.inline.svg)\n\n\
                        ![d](gone-d.inline.svg)";
        let mut doc = Document::parse(markdown);

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 0);
        let indices: Vec<usize> = report.errors.iter().map(|error| error.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_references_are_all_replaced() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let markdown = "![one](/img/logo.inline.svg)\n\n![two](/img/logo.inline.svg)";
        let mut doc = Document::parse(markdown);

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 2);
        let html = doc.to_html();
        assert_eq!(html.matches("<svg id=\"logo\">").count(), 2);
    }

    #[test]
    fn test_custom_suffix_matches_plain_svg() {
        let root = site();
        fs::write(root.path().join("docs/plain.svg"), DIAGRAM_SVG).unwrap();
        let options = InlineOptions::new(root.path()).suffix(".svg");
        let inliner = SvgInliner::new(options);
        let mut doc = Document::parse("![d](plain.svg) ![p](photo.png)");

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 1);
        assert!(report.errors.is_empty());
        let html = doc.to_html();
        assert!(html.contains("<svg id=\"diagram\">"), "html: {html}");
        assert!(html.contains("photo.png"), "html: {html}");
    }

    #[test]
    fn test_inline_error_display() {
        let error = InlineError {
            index: 3,
            url: "x.inline.svg".to_owned(),
            kind: InlineErrorKind::NotSvg,
        };
        assert_eq!(error.to_string(), "image 3 (x.inline.svg): not an SVG document");
    }

    /// Minimal stand-in document exercising the trait seam.
    struct MockDocument {
        urls: Vec<String>,
        replaced: HashMap<usize, String>,
    }

    impl ImageDocument for MockDocument {
        fn visit_images(&mut self, f: &mut dyn FnMut(&mut ImageRef)) {
            for (index, url) in self.urls.iter_mut().enumerate() {
                let mut image = ImageRef::new(index, url);
                f(&mut image);
                if let Some(rewritten) = image.take_rewrite() {
                    *url = rewritten;
                }
            }
        }

        fn replace_images(&mut self, replacements: HashMap<usize, String>) {
            self.replaced = replacements;
        }
    }

    #[test]
    fn test_inline_through_mock_document() {
        let root = site();
        let inliner = SvgInliner::new(InlineOptions::new(root.path()));
        let mut doc = MockDocument {
            urls: vec!["/img/logo.inline.svg".to_owned(), "photo.png".to_owned()],
            replaced: HashMap::new(),
        };

        let report = inliner.inline(&mut doc, &guide_context(root.path()));

        assert_eq!(report.inlined, 1);
        let logo_path = root.path().join("static/img/logo.inline.svg");
        assert_eq!(doc.urls[0], logo_path.to_str().unwrap());
        assert_eq!(doc.urls[1], "photo.png");
        assert!(doc.replaced[&0].contains("<svg id=\"logo\">"));
    }
}
