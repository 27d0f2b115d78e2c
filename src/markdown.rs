use pulldown_cmark::{html, Options, Parser};

/// Renders a campaign statement to html that is safe to embed in a page as-is.
/// Any raw markup in `source` that is not on ammonia's allow-list (scripts,
/// event handlers, `javascript:` links, ...) is stripped.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION;

    let mut unsafe_html = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut unsafe_html, Parser::new_ext(source, options));

    ammonia::clean(&unsafe_html)
}
