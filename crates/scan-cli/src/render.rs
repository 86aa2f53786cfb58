//! Plain-text rendering of the HTML report for terminal output.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("tag regex"))
}

fn markup_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<![^>]*>").expect("comment regex"))
}

fn layout_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s*\n\s*<").expect("layout regex"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run regex"))
}

fn replace_tag(caps: &Captures) -> &'static str {
    let closing = !caps[1].is_empty();
    match (caps[2].to_ascii_lowercase().as_str(), closing) {
        ("br", _) => "\n",
        ("p", true) => "\n",
        ("h1", false) => "\n# ",
        ("h2", false) => "\n## ",
        ("h3", false) => "\n### ",
        ("h1" | "h2" | "h3", true) => "\n",
        ("table", _) => "\n",
        ("tr", true) => "\n",
        ("td" | "th", false) => " | ",
        _ => "",
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Turn the model's HTML table into pipe-separated rows; headings become `#` lines
/// and every other tag, comment and declaration is dropped.
pub fn html_to_text(html: &str) -> String {
    let bare = markup_decl_re().replace_all(html, "");
    let compact = layout_ws_re().replace_all(&bare, "><");
    let stripped = tag_re().replace_all(&compact, |caps: &Captures| replace_tag(caps));
    let decoded = decode_entities(&stripped);

    let lines: Vec<String> = decoded
        .lines()
        .map(|line| {
            let line = line.trim();
            if line.starts_with('|') {
                format!("{} |", line)
            } else {
                line.to_string()
            }
        })
        .collect();
    blank_run_re()
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
