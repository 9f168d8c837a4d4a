//! Internal constants for the inline SVG transform.

/// Default URL suffix that marks an image for inlining.
pub const DEFAULT_SUFFIX: &str = ".inline.svg";

/// Default static asset directory, relative to the site root.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// URL prefix that selects site-root-relative resolution.
pub const SITE_ROOT_PREFIX: &str = "/img/";
