//! HTML-to-plain-text stripping for rich-text card fields.
//!
//! Card descriptions and comments may carry markup. [`strip_html`] parses them
//! with the html5ever-backed `scraper` parser and keeps only the text nodes, in
//! document order. The parser never fails: malformed markup is recovered the
//! same way a browser would, so stripping is infallible.

use scraper::Html;
use tracing::trace;

/// Return the text content of an HTML fragment with all markup removed.
///
/// Text nodes are concatenated in document order without inserting or
/// collapsing whitespace. Character references are decoded and CRLF line
/// endings are normalized to LF by the parser. Empty input yields an empty
/// string.
pub fn strip_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect();

    trace!(input_len = input.len(), text_len = text.len(), "stripped html");
    text
}

/// Strip every input and join the results with `separator`.
pub fn strip_and_join<'a, I>(inputs: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    inputs
        .into_iter()
        .map(strip_html)
        .collect::<Vec<_>>()
        .join(separator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
