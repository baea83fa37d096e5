//! Abstract text cleaning.
//!
//! Markup is handed to the `scraper` HTML5 parser and only the text nodes
//! outside non-content elements are kept. A `<` that does not open a tag is
//! escaped first, so plain-text math such as `$a<b$` reaches the output
//! intact. Entities are decoded on every input, tagged or not.

use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

/// Elements whose text is never content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "head", "template", "title"];

/// Elements that separate words when their tags are removed
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// Upper bound on cleaning passes; each pass peels one level of escaping.
const MAX_PASSES: usize = 8;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--|</?[A-Za-z][A-Za-z0-9:-]*(?:\s[^<>]*)?/?>").expect("valid markup regex")
});

/// Strip markup from `raw` and return normalized plain text.
///
/// Passes repeat until the text stops changing, so escaped markup
/// (`&lt;b&gt;`) cannot survive as a live tag and cleaning already-clean
/// text returns it unchanged.
pub fn clean_text(raw: &str) -> String {
    let mut text = clean_pass(raw);
    for _ in 1..MAX_PASSES {
        let next = clean_pass(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

fn clean_pass(raw: &str) -> String {
    let text = extract_text(&escape_stray_brackets(raw));
    // Tags that only appeared once entities were decoded are prose; keep their text.
    if has_markup(&text) {
        collapse_whitespace(&MARKUP_RE.replace_all(&text, ""))
    } else {
        text
    }
}

/// Escape every `<` that does not start tag-shaped markup.
fn escape_stray_brackets(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for tag in MARKUP_RE.find_iter(raw) {
        out.push_str(&raw[last..tag.start()].replace('<', "&lt;"));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&raw[last..].replace('<', "&lt;"));
    out
}

fn extract_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut text = String::with_capacity(markup.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                text.push(' ');
            }
            Node::Text(chunk) => {
                let skipped = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
                });
                if !skipped {
                    text.push_str(chunk);
                }
            }
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

/// Whether `text` contains anything that looks like an HTML/XML tag.
pub fn has_markup(text: &str) -> bool {
    MARKUP_RE.is_match(text)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        assert_eq!(clean_text("<p>Hello</p>"), "Hello");
        assert_eq!(clean_text("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(clean_text("No tags"), "No tags");
    }

    #[test]
    fn test_drops_non_content_elements() {
        let raw = "<style>p { color: red; }</style><p>Kept</p><script>alert(1)</script>";
        assert_eq!(clean_text(raw), "Kept");
    }

    #[test]
    fn test_block_elements_separate_words() {
        assert_eq!(clean_text("<p>First</p><p>Second</p>"), "First Second");
        assert_eq!(clean_text("line one<br>line two"), "line one line two");
    }

    #[test]
    fn test_decodes_entities_inside_markup() {
        assert_eq!(clean_text("<p>Q&amp;A &lt;3</p>"), "Q&A <3");
    }

    #[test]
    fn test_plain_math_survives() {
        let raw = "We show that $a<b$ and\n  $c>d$ hold.";
        assert!(!has_markup(raw));
        assert_eq!(clean_text(raw), "We show that $a<b$ and $c>d$ hold.");
    }

    #[test]
    fn test_collapses_arxiv_line_wrapping() {
        let raw = "  We propose a\n  transformer for\n  parsing.\n";
        assert_eq!(clean_text(raw), "We propose a transformer for parsing.");
    }

    #[test]
    fn test_escaped_tags_do_not_come_back() {
        let raw = "<p>We use &lt;script&gt;x&lt;/script&gt; and &lt;b&gt;y&lt;/b&gt;.</p>";
        let cleaned = clean_text(raw);
        assert_eq!(cleaned, "We use x and y.");
        assert!(!has_markup(&cleaned));
        assert_eq!(clean_text(&cleaned), cleaned);

        // `<summary>&lt;p&gt;use &amp;lt;b&amp;gt;x&lt;/p&gt;</summary>` after XML unescaping
        assert_eq!(clean_text("<p>use &lt;b&gt;x</p>"), "use x");
    }

    #[test]
    fn test_stray_angle_next_to_markup() {
        assert_eq!(clean_text("<p>We show $a<b$ holds.</p>"), "We show $a<b$ holds.");
        assert_eq!(clean_text("<i>n</i> < 5 <br> ok"), "n < 5 ok");
    }

    #[test]
    fn test_entities_decoded_with_or_without_tags() {
        assert_eq!(clean_text("Q&amp;A"), "Q&A");
        assert_eq!(clean_text("<p>Q&amp;A</p>"), "Q&A");
        assert_eq!(clean_text("x &lt; y"), "x < y");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<div><h1>Title</h1><p>Some <em>emphasised</em> text.</p></div>",
            "Already clean text.",
            "  spaced \t out \n text ",
            "<jats:p>Namespaced JATS abstract</jats:p>",
            "<p>Nested &amp;lt;i&amp;gt;escaping&amp;lt;/i&amp;gt; here</p>",
            "<p>Bound $a<b$ and &lt;em&gt;e&lt;/em&gt;</p>",
            "",
        ];
        for raw in inputs {
            let once = clean_text(raw);
            assert!(!has_markup(&once), "markup left in {once:?}");
            assert_eq!(clean_text(&once), once, "not idempotent for {raw:?}");
        }
    }
}
