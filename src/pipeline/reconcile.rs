//! Markdown reconciliation: point image placeholders at resolvable URLs.
//!
//! The provider marks where each image sits with a markdown image whose link
//! text is the image id, e.g. `![img-0.jpeg](img-0.jpeg)`. One fixed pattern
//! finds every markdown image reference, with or without a `(target)`; the
//! link text is then looked up as a plain string in the page's
//! [`ImageRefs`]. Ids are never compiled into a pattern, so ids containing
//! `.`, `*`, `(` and friends need no escaping. An id containing `]` or a
//! newline cannot appear as link text and is simply never matched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]*)\](?:\(([^)\n]*)\))?").unwrap());

/// Per-page map from image id to resolvable URL.
///
/// Inserting an id twice keeps the later URL (last write wins); duplicate ids
/// are not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRefs {
    urls: HashMap<String, String>,
}

impl ImageRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` for `id`, replacing any earlier entry.
    pub fn insert(&mut self, id: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(id.into(), url.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.urls.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Rewrite every image reference whose link text is a known id to
/// `![id](url)`. Unknown ids are left byte-for-byte unchanged.
pub fn rewrite_placeholders(markdown: &str, refs: &ImageRefs) -> String {
    if refs.is_empty() {
        return markdown.to_string();
    }

    RE_IMAGE_REF
        .replace_all(markdown, |caps: &Captures| {
            let id = &caps[1];
            match refs.get(id) {
                Some(url) => format!("![{id}]({url})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(pairs: &[(&str, &str)]) -> ImageRefs {
        let mut r = ImageRefs::new();
        for (id, url) in pairs {
            r.insert(*id, *url);
        }
        r
    }

    #[test]
    fn rewrites_target_of_matching_placeholder() {
        let md = "Intro\n\n![img-0.jpeg](img-0.jpeg)\n\nOutro";
        let out = rewrite_placeholders(md, &refs(&[("img-0.jpeg", "data:image/jpeg;base64,AA")]));
        assert_eq!(out, "Intro\n\n![img-0.jpeg](data:image/jpeg;base64,AA)\n\nOutro");
    }

    #[test]
    fn rewrites_bare_placeholder_without_target() {
        let out = rewrite_placeholders("see ![img-1] here", &refs(&[("img-1", "u1")]));
        assert_eq!(out, "see ![img-1](u1) here");
    }

    #[test]
    fn rewrites_every_occurrence() {
        let md = "![a](a) and ![a](a) and ![a]";
        let out = rewrite_placeholders(md, &refs(&[("a", "X")]));
        assert_eq!(out, "![a](X) and ![a](X) and ![a](X)");
    }

    #[test]
    fn unknown_id_left_exactly_as_is() {
        let md = "![missing.png](missing.png) ![a](a)";
        let out = rewrite_placeholders(md, &refs(&[("a", "X")]));
        assert_eq!(out, "![missing.png](missing.png) ![a](X)");
    }

    #[test]
    fn ids_with_pattern_metacharacters_are_literal() {
        // `.` must not act as a wildcard: "img-0xjpeg" is a different id.
        let md = "![img-0.jpeg](img-0.jpeg) ![img-0xjpeg](img-0xjpeg) ![a+(b)*](x)";
        let out = rewrite_placeholders(md, &refs(&[("img-0.jpeg", "U"), ("a+(b)*", "V")]));
        assert_eq!(out, "![img-0.jpeg](U) ![img-0xjpeg](img-0xjpeg) ![a+(b)*](V)");
    }

    #[test]
    fn plain_links_are_not_images() {
        let md = "[a](a) stays a link";
        assert_eq!(rewrite_placeholders(md, &refs(&[("a", "X")])), md);
    }

    #[test]
    fn last_write_wins_on_duplicate_ids() {
        let mut r = ImageRefs::new();
        r.insert("dup", "first");
        r.insert("dup", "second");
        assert_eq!(r.len(), 1);
        assert_eq!(rewrite_placeholders("![dup](dup)", &r), "![dup](second)");
    }

    #[test]
    fn empty_map_returns_input() {
        let md = "![x](x)";
        assert_eq!(rewrite_placeholders(md, &ImageRefs::new()), md);
    }
}
