//! Loading and preparing SVG files for inline embedding.
//!
//! Files are read from disk and lightly sanitized: the XML prolog,
//! DOCTYPE and leading comments are dropped so the markup can sit
//! directly inside an HTML document. Anything that is not an SVG
//! document after stripping is rejected.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::inliner::InlineErrorKind;

/// Regex to match the XML prolog (`<?xml ... ?>`).
static XML_PROLOG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<\?xml.*?\?>").unwrap());

/// Regex to match a DOCTYPE declaration.
static DOCTYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<!DOCTYPE[^>]*>").unwrap());

/// Regex to match a leading XML comment.
static LEADING_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--.*?-->").unwrap());

/// Read an SVG file and prepare it for embedding.
pub fn load_svg(path: &Path) -> Result<String, InlineErrorKind> {
    let bytes = std::fs::read(path).map_err(|e| InlineErrorKind::Io(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| InlineErrorKind::Utf8(e.to_string()))?;
    prepare_svg(&content)
}

/// Prepare SVG markup for embedding in an HTML document.
///
/// Strips the UTF-8 BOM, the XML prolog, the DOCTYPE and any leading
/// comments (editors like Inkscape and Illustrator emit all three),
/// then requires the remaining document to open with an `<svg` tag.
pub fn prepare_svg(content: &str) -> Result<String, InlineErrorKind> {
    let mut rest = content.trim_start_matches('\u{feff}').trim_start();

    loop {
        let mut stripped = false;
        for re in [&*XML_PROLOG_RE, &*DOCTYPE_RE, &*LEADING_COMMENT_RE] {
            if let Some(m) = re.find(rest) {
                rest = rest[m.end()..].trim_start();
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }

    if !rest.starts_with("<svg") {
        return Err(InlineErrorKind::NotSvg);
    }

    Ok(rest.trim_end().to_owned())
}
