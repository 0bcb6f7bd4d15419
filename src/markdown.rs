use pulldown_cmark::{Parser, html};

/// Renders raw markdown to HTML. Comment and submission bodies are rendered
/// once at creation time and stored next to the raw text, so the derived form
/// must be deterministic for a given input.
pub fn render(raw: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(raw));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraphs_and_emphasis() {
        let rendered = render("hello *world*");
        assert_eq!(rendered, "<p>hello <em>world</em></p>\n");
    }

    #[test]
    fn is_deterministic() {
        let raw = "# title\n\nsome **bold** text";
        assert_eq!(render(raw), render(raw));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render(""), "");
    }
}
