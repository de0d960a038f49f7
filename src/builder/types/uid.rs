//! UID derivation and identifier normalization
//!
//! Every entity is addressed by a globally unique string UID. Content types
//! live in the `api::` namespace (`api::<singular>.<singular>`), components
//! are addressed by `<category-slug>.<name-slug>`. Derivation is pure: the
//! same names always produce the same UID, which is what lets sibling
//! entities created in one batch reference each other before persistence.

use once_cell::sync::Lazy;
use regex::Regex;

/// Relation target sentinel meaning "the entity currently being created".
pub const NEW_ENTITY_SENTINEL: &str = "__contentType__";

/// Relation target sentinel meaning "the entity this attribute lives on".
pub const SELF_SENTINEL: &str = "__self__";

static CONTENT_TYPE_UID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^api::[a-z0-9-]+\.[a-z0-9-]+$").unwrap());

static COMPONENT_UID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+\.[a-z0-9-]+$").unwrap());

static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase a display name and collapse every non-alphanumeric run into a
/// single dash, trimming leading/trailing dashes.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Deterministic content-type UID from its singular name.
pub fn content_type_uid(singular_name: &str) -> String {
    let slug = slugify(singular_name);
    format!("api::{}.{}", slug, slug)
}

/// Deterministic component UID from its category and display name.
pub fn component_uid(category: &str, display_name: &str) -> String {
    format!("{}.{}", slugify(category), slugify(display_name))
}

pub fn is_content_type_uid(uid: &str) -> bool {
    CONTENT_TYPE_UID_RE.is_match(uid)
}

pub fn is_component_uid(uid: &str) -> bool {
    !is_content_type_uid(uid) && COMPONENT_UID_RE.is_match(uid)
}

/// The `<singular>` segment of a content-type UID.
pub fn content_type_singular(uid: &str) -> Option<&str> {
    let rest = uid.strip_prefix("api::")?;
    rest.split('.').next()
}

/// The `<category>` segment of a component UID.
pub fn component_category(uid: &str) -> Option<&str> {
    if !is_component_uid(uid) {
        return None;
    }
    uid.split('.').next()
}

/// The `<name>` segment of a component UID.
pub fn component_name(uid: &str) -> Option<&str> {
    if !is_component_uid(uid) {
        return None;
    }
    uid.split('.').nth(1)
}

/// Normalized form used for attribute key collision checks. Keys that map to
/// the same storage column name must compare equal here.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace(['_', '-'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("Blog Post"), "blog-post");
        assert_eq!(slugify("  SEO / Meta  "), "seo-meta");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn content_type_uid_is_deterministic() {
        assert_eq!(content_type_uid("Article"), "api::article.article");
        assert_eq!(content_type_uid("article"), "api::article.article");
        assert!(is_content_type_uid("api::article.article"));
        assert!(!is_content_type_uid("default.seo"));
    }

    #[test]
    fn component_uid_from_category_and_name() {
        assert_eq!(component_uid("Default", "SEO Meta"), "default.seo-meta");
        assert!(is_component_uid("default.seo-meta"));
        assert!(!is_component_uid("api::article.article"));
        assert_eq!(component_category("default.seo-meta"), Some("default"));
        assert_eq!(component_name("default.seo-meta"), Some("seo-meta"));
    }

    #[test]
    fn normalized_keys_collide_across_formats() {
        assert_eq!(normalize_key("cover_image"), normalize_key("coverImage"));
        assert_ne!(normalize_key("cover_image"), normalize_key("coverPhoto"));
    }
}
