//! Parsed markdown documents and image traversal.
//!
//! A [`Document`] is a buffer of pulldown-cmark events. The
//! [`ImageDocument`] trait exposes the two operations the inline
//! transform needs: visiting image references by document order and
//! splicing raw markup over image spans.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

/// Parser options with GitHub Flavored Markdown features enabled.
///
/// Matches what documentation sites typically enable:
/// - Tables
/// - Strikethrough (`~~text~~`)
/// - Task lists (`- [ ] item`)
#[must_use]
pub fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// A markdown document parsed into an event buffer.
///
/// Borrows the source text; events reference it where possible.
#[derive(Clone, Debug, PartialEq)]
pub struct Document<'a> {
    events: Vec<Event<'a>>,
}

impl<'a> Document<'a> {
    /// Parse markdown with GFM options enabled.
    #[must_use]
    pub fn parse(markdown: &'a str) -> Self {
        Self::parse_with(markdown, gfm_options())
    }

    /// Parse markdown with explicit parser options.
    #[must_use]
    pub fn parse_with(markdown: &'a str, options: Options) -> Self {
        Self {
            events: Parser::new_ext(markdown, options).collect(),
        }
    }

    /// The parsed event buffer.
    #[must_use]
    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Consume the document, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event<'a>> {
        self.events
    }

    /// Render the document to HTML with the stock pulldown-cmark renderer.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.events.len() * 32);
        pulldown_cmark::html::push_html(&mut html, self.events.iter().cloned());
        html
    }
}

/// Mutable view of one image reference handed to visitors.
///
/// The underlying event is only touched when [`set_url`](Self::set_url)
/// is called; visited-but-unchanged images keep their original URL
/// byte-for-byte.
#[derive(Debug)]
pub struct ImageRef {
    index: usize,
    url: String,
    rewritten: Option<String>,
}

impl ImageRef {
    pub(crate) fn new(index: usize, url: &str) -> Self {
        Self {
            index,
            url: url.to_owned(),
            rewritten: None,
        }
    }

    /// Position of this image in document order, counting nested images.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current URL of the image reference.
    #[must_use]
    pub fn url(&self) -> &str {
        self.rewritten.as_deref().unwrap_or(&self.url)
    }

    /// Overwrite the image URL in the document.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.rewritten = Some(url.into());
    }

    pub(crate) fn take_rewrite(self) -> Option<String> {
        self.rewritten
    }
}

/// A document whose image references can be visited and replaced.
///
/// Implemented by [`Document`]; tests can substitute a mock to exercise
/// the transform without parsing markdown.
pub trait ImageDocument {
    /// Visit every image reference in document order.
    fn visit_images(&mut self, f: &mut dyn FnMut(&mut ImageRef));

    /// Replace image spans with raw inline markup, keyed by image index.
    ///
    /// A replaced span runs from the image's start event through its
    /// matching end event; alt text inside the span is dropped along
    /// with it.
    fn replace_images(&mut self, replacements: HashMap<usize, String>);
}

impl ImageDocument for Document<'_> {
    fn visit_images(&mut self, f: &mut dyn FnMut(&mut ImageRef)) {
        let mut index = 0;
        for event in &mut self.events {
            if let Event::Start(Tag::Image { dest_url, .. }) = event {
                let mut image = ImageRef::new(index, dest_url);
                f(&mut image);
                if let Some(url) = image.take_rewrite() {
                    *dest_url = CowStr::from(url);
                }
                index += 1;
            }
        }
    }

    fn replace_images(&mut self, mut replacements: HashMap<usize, String>) {
        if replacements.is_empty() {
            return;
        }

        let mut result = Vec::with_capacity(self.events.len());
        let mut index = 0;
        let mut events = std::mem::take(&mut self.events).into_iter();

        while let Some(event) = events.next() {
            if let Event::Start(Tag::Image { .. }) = &event {
                let current = index;
                index += 1;

                if let Some(html) = replacements.remove(&current) {
                    // Consume the span up to the matching end tag, counting
                    // nested images so later ordinals stay aligned.
                    let mut depth = 1usize;
                    for inner in events.by_ref() {
                        match inner {
                            Event::Start(Tag::Image { .. }) => {
                                depth += 1;
                                index += 1;
                            }
                            Event::End(TagEnd::Image) => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    result.push(Event::InlineHtml(CowStr::from(html)));
                    continue;
                }
            }
            result.push(event);
        }

        self.events = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn image_urls(doc: &mut Document<'_>) -> Vec<String> {
        let mut urls = Vec::new();
        doc.visit_images(&mut |image| urls.push(image.url().to_owned()));
        urls
    }

    #[test]
    fn test_parse_collects_events() {
        let doc = Document::parse("# Title\n\nSome *text*.");
        assert!(!doc.events().is_empty());
    }

    #[test]
    fn test_gfm_options_enable_tables() {
        assert!(gfm_options().contains(Options::ENABLE_TABLES));
    }

    #[test]
    fn test_visit_images_finds_urls_in_order() {
        let mut doc = Document::parse("![a](one.svg) text ![b](two.png)\n\n![c](three.svg)");
        assert_eq!(image_urls(&mut doc), vec!["one.svg", "two.png", "three.svg"]);
    }

    #[test]
    fn test_visit_images_indices_match_document_order() {
        let mut doc = Document::parse("![a](one.svg) ![b](two.svg)");
        let mut indices = Vec::new();
        doc.visit_images(&mut |image| indices.push(image.index()));
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_visit_images_ignores_links() {
        let mut doc = Document::parse("[a](page.md) and ![b](pic.svg)");
        assert_eq!(image_urls(&mut doc), vec!["pic.svg"]);
    }

    #[test]
    fn test_set_url_rewrites_destination() {
        let mut doc = Document::parse("![logo](logo.svg)");
        doc.visit_images(&mut |image| image.set_url("/abs/logo.svg"));
        assert_eq!(image_urls(&mut doc), vec!["/abs/logo.svg"]);
    }

    #[test]
    fn test_visit_without_set_url_leaves_events_untouched() {
        let mut doc = Document::parse("![a](one.svg) and ![b](two.svg)");
        let before = doc.clone();
        doc.visit_images(&mut |_| {});
        assert_eq!(doc, before);
    }

    #[test]
    fn test_replace_images_splices_inline_html() {
        let mut doc = Document::parse("before ![alt text](pic.svg) after");
        let mut replacements = HashMap::new();
        replacements.insert(0, "<svg>x</svg>".to_owned());
        doc.replace_images(replacements);

        let html = doc.to_html();
        assert!(html.contains("<svg>x</svg>"), "html: {html}");
        assert!(!html.contains("alt text"), "alt must be dropped: {html}");
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_replace_images_keeps_unmatched_images() {
        let mut doc = Document::parse("![a](one.svg) ![b](two.svg)");
        let mut replacements = HashMap::new();
        replacements.insert(0, "<svg>one</svg>".to_owned());
        doc.replace_images(replacements);

        let html = doc.to_html();
        assert!(html.contains("<svg>one</svg>"));
        assert!(html.contains(r#"src="two.svg""#), "html: {html}");
    }

    #[test]
    fn test_replace_images_multiple() {
        let mut doc = Document::parse("![a](one.svg)\n\n![b](two.svg)");
        let mut replacements = HashMap::new();
        replacements.insert(0, "<svg>1</svg>".to_owned());
        replacements.insert(1, "<svg>2</svg>".to_owned());
        doc.replace_images(replacements);

        let html = doc.to_html();
        assert!(html.contains("<svg>1</svg>"));
        assert!(html.contains("<svg>2</svg>"));
    }

    #[test]
    fn test_replace_images_empty_map_is_noop() {
        let mut doc = Document::parse("![a](one.svg)");
        let before = doc.clone();
        doc.replace_images(HashMap::new());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_replace_nested_image_keeps_ordinals_aligned() {
        // The nested image in the alt text takes ordinal 1, so the
        // trailing image is ordinal 2.
        let mut doc = Document::parse("![outer ![inner](in.svg) text](out.svg) ![last](last.svg)");
        let mut urls = Vec::new();
        doc.visit_images(&mut |image| urls.push((image.index(), image.url().to_owned())));
        assert_eq!(
            urls,
            vec![
                (0, "out.svg".to_owned()),
                (1, "in.svg".to_owned()),
                (2, "last.svg".to_owned()),
            ]
        );

        let mut replacements = HashMap::new();
        replacements.insert(0, "<svg>outer</svg>".to_owned());
        replacements.insert(2, "<svg>last</svg>".to_owned());
        doc.replace_images(replacements);

        let html = doc.to_html();
        assert!(html.contains("<svg>outer</svg>"));
        assert!(html.contains("<svg>last</svg>"));
        assert!(!html.contains("in.svg"), "nested span must be consumed: {html}");
    }

    #[test]
    fn test_to_html_renders_image_tag() {
        let doc = Document::parse("![alt](pic.svg)");
        let html = doc.to_html();
        assert!(html.contains(r#"<img src="pic.svg" alt="alt""#), "html: {html}");
    }
}
