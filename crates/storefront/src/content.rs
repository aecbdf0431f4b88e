//! Article body rendering.
//!
//! Article content is authored in the admin console as Markdown (raw HTML
//! is allowed, as older articles were written in a rich-text editor).

use comrak::{Options, markdown_to_html};

/// Render an article body to HTML with GitHub Flavored Markdown support.
#[must_use]
pub fn render_article(content: &str) -> String {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Rough reading time in minutes, at 200 words per minute (at least 1).
#[must_use]
pub fn reading_minutes(content: &str) -> usize {
    content.split_whitespace().count().div_ceil(200).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_markdown() {
        let html = render_article("## Water changes\n\nChange **25%** weekly.");
        assert!(html.contains("<h2"));
        assert!(html.contains("Water changes"));
        assert!(html.contains("<strong>25%</strong>"));
    }

    #[test]
    fn test_keeps_legacy_html() {
        let html = render_article("<p>Keep <em>Corydoras</em> in groups.</p>");
        assert!(html.contains("<em>Corydoras</em>"));
    }

    #[test]
    fn test_gfm_table() {
        let html = render_article("| Species | pH |\n|---|---|\n| Neon Tetra | 6.5 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(""), 1);
        assert_eq!(reading_minutes(&"word ".repeat(450)), 3);
    }
}
