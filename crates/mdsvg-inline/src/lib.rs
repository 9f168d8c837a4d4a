//! Path-resolving inline SVG transform for markdown documents.
//!
//! This crate finds image references whose URL ends with a configured
//! suffix (default `.inline.svg`), resolves each URL to a filesystem
//! path, and replaces the image with the literal SVG markup so rendered
//! pages embed the graphic instead of linking to it:
//! - `/img/` URLs resolve against the site's static asset directory
//! - all other URLs resolve against the referencing document
//! - files load in parallel, with failures isolated per image
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`document`]: parsed markdown documents and image traversal
//! - [`resolve`]: URL-to-path resolution rules
//! - [`svg`]: loading and sanitizing SVG files for embedding
//! - [`inliner`]: the transform itself, with parallel loading and
//!   per-image error reporting
//!
//! # Example
//!
//! ```no_run
//! use mdsvg_inline::{Document, FileContext, InlineOptions, SvgInliner};
//!
//! let markdown = "![architecture](/img/architecture.inline.svg)";
//! let mut doc = Document::parse(markdown);
//!
//! let inliner = SvgInliner::new(InlineOptions::new("/repo"));
//! let report = inliner.inline(&mut doc, &FileContext::new("/repo/docs/guide.md"));
//!
//! assert!(report.errors.is_empty());
//! let html = doc.to_html();
//! ```

mod consts;
mod document;
mod inliner;
mod resolve;
mod svg;

pub use document::{Document, ImageDocument, ImageRef, gfm_options};
pub use inliner::{InlineError, InlineErrorKind, InlineOptions, InlineReport, SvgInliner};
pub use resolve::{FileContext, resolve_image_path};
pub use svg::{load_svg, prepare_svg};
