//! Plain-text extraction from HTML fragments.
//!
//! Feed summaries and API payloads routinely embed markup. [`clean_text`]
//! reduces them to dense single-spaced text. The HTML parser is lenient, so
//! malformed markup degrades to best-effort text instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup from `html`, collapse whitespace runs and trim.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<p>Hello <b>world</b></p>"), "Hello world");
/// ```
pub fn clean_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let joined = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&joined)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_clean(out: &str) {
        assert!(!out.contains('<') && !out.contains('>'), "markup left in {out:?}");
        assert!(!out.contains("  "), "double space in {out:?}");
        assert!(!out.contains('\n') && !out.contains('\t'));
        assert_eq!(out, out.trim());
    }

    #[test]
    fn test_strips_tags() {
        let out = clean_text("<p>Hello <b>world</b></p>");
        assert_eq!(out, "Hello world");
        assert_clean(&out);
    }

    #[test]
    fn test_block_elements_are_separated() {
        let out = clean_text("<div>First</div><div>Second</div>");
        assert_eq!(out, "First Second");
    }

    #[test]
    fn test_collapses_whitespace() {
        let out = clean_text("  lots\n\n of \t   space  ");
        assert_eq!(out, "lots of space");
        assert_clean(&out);
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let out = clean_text("<p>Unclosed <em>tags <a href='x'>link");
        assert_eq!(out, "Unclosed tags link");
        assert_clean(&out);

        let out = clean_text("</div></span>stray closers<br/>and <img src=a.png> images");
        assert_clean(&out);
        assert!(out.contains("stray closers"));
        assert!(out.contains("images"));
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(clean_text("Fish &amp; chips&nbsp;today"), "Fish & chips today");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(clean_text("Just text, no markup."), "Just text, no markup.");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n "), "");
        assert_eq!(clean_text("<p>  </p>"), "");
    }
}
