use ammonia::Builder;
use pulldown_cmark::{html, Options, Parser};
use std::collections::HashSet;

const RICH_TEXT_TAGS: [&str; 24] = [
    "h2", "h3", "h4", "b", "strong", "i", "em", "u", "p", "br", "a", "ul", "ol", "li",
    "blockquote", "hr", "img", "table", "thead", "tbody", "tr", "th", "td", "span",
];

const RICH_TEXT_ATTRIBUTES: [&str; 6] = ["href", "src", "alt", "title", "target", "class"];

fn rich_text_cleaner() -> Builder<'static> {
    let mut builder = Builder::new();
    builder
        .tags(RICH_TEXT_TAGS.iter().copied().collect::<HashSet<_>>())
        .generic_attributes(RICH_TEXT_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .link_rel(Some("noopener noreferrer"));
    builder
}

/// Markdown to HTML, then cleaned down to the rich-text whitelist.
/// Scripting attributes (`onclick`, `onerror`, ...) never survive.
pub fn render_markdown(markdown_input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown_input, options);
    let mut unsafe_html = String::new();
    html::push_html(&mut unsafe_html, parser);

    sanitize_html(&unsafe_html)
}

pub fn sanitize_html(input: &str) -> String {
    rich_text_cleaner().clean(input).to_string()
}

/// Escapes plain text and keeps its line breaks.
pub fn text_to_html(input: &str) -> String {
    html_escape::encode_text(input)
        .lines()
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Strips all HTML tags from input (for names, titles, lead messages).
pub fn strip_all_html(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_links_are_kept_and_scripts_dropped() {
        let html = render_markdown("[Edital](https://example.com/edital.pdf)\n\n<img src=x onerror=alert(1)>");
        assert!(html.contains("href=\"https://example.com/edital.pdf\""));
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn plain_text_is_escaped_with_breaks() {
        assert_eq!(text_to_html("a < b\nc"), "a &lt; b<br>c");
    }

    #[test]
    fn strip_all_html_keeps_text() {
        assert_eq!(strip_all_html("<b>Olá</b> mundo"), "Olá mundo");
    }
}
