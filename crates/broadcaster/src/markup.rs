//! HTML to Discord markdown conversion.
//!
//! Status summaries use a small, known tag set, so conversion is a fixed
//! replacement table plus a few capturing rules instead of an HTML parser.

use std::sync::OnceLock;

use regex::Regex;

/// Literal tag replacements, applied in order.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("<br>", "\n"),
    ("<br />", "\n"),
    ("<br/>", "\n"),
    ("<b>", "**"),
    ("</b>", "**"),
    ("<i>", "*"),
    ("</i>", "*"),
    ("<p>", ""),
    ("</p>", "\n"),
    ("<strong>", "**"),
    ("</strong>", "**"),
    ("<small>", "_"),
    ("</small>", "_"),
    ("<h1>", "# "),
    ("</h1>", "\n"),
    ("<h2>", "## "),
    ("</h2>", "\n"),
    ("<h3>", "### "),
    ("</h3>", "\n"),
    ("<h4>", "#### "),
    ("</h4>", "\n"),
    ("<h5>", "##### "),
    ("</h5>", "\n"),
    ("<html>", ""),
    ("</html>", ""),
    ("<body>", ""),
    ("</body>", ""),
];

fn var_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<var\b[^>]*>(.*?)</var>").expect("valid regex"))
}

fn anchor_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("valid regex")
    })
}

fn img_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\s[^>]*?src\s*=\s*["']([^"']*)["'][^>]*>"#).expect("valid regex")
    })
}

/// Convert an HTML fragment to Discord markdown.
///
/// The output is not trimmed: `"<h1>T</h1>"` becomes `"# T\n"`.
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut text = html.to_string();
    for (tag, replacement) in REPLACEMENTS {
        text = text.replace(tag, replacement);
    }

    let text = var_tag().replace_all(&text, "`${1}`");
    let text = anchor_tag().replace_all(&text, "[${2}](${1})");
    text.into_owned()
}

/// URL of the first `<img src="...">` in an HTML fragment.
pub fn extract_image(html: &str) -> Option<String> {
    img_tag()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|url| !url.is_empty())
}

/// Remove every `<img>` tag from an HTML fragment.
pub fn strip_images(html: &str) -> String {
    img_tag().replace_all(html, "").into_owned()
}
