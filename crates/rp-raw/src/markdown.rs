//! Markdown to HTML conversion for plain-text pastes.

use std::borrow::Cow;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, html};
use regex::Regex;
use rp_config::MarkdownConfig;

/// Single-line triple-backtick span as pasted from chat apps.
static CHAT_CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:^|\n)```)([^\n`]+)(```(?:$|\n))").expect("invalid chat code span regex")
});

/// Converts Markdown to HTML.
pub trait MarkdownConverter {
    /// Convert Markdown text to an HTML fragment.
    fn to_html(&self, markdown: &str) -> String;
}

/// [`MarkdownConverter`] backed by `pulldown-cmark`.
///
/// Header ids are never generated and mid-word underscores stay literal.
/// Single newlines become `<br>` unless simple line breaks are disabled.
#[derive(Debug, Clone)]
pub struct CmarkConverter {
    tables: bool,
    strikethrough: bool,
    simple_line_breaks: bool,
}

impl Default for CmarkConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CmarkConverter {
    /// Converter with tables and simple line breaks enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: true,
            strikethrough: false,
            simple_line_breaks: true,
        }
    }

    /// Converter configured from the `[markdown]` config section.
    #[must_use]
    pub fn from_config(config: &MarkdownConfig) -> Self {
        Self {
            tables: config.tables,
            strikethrough: config.strikethrough,
            simple_line_breaks: config.simple_line_breaks,
        }
    }

    #[must_use]
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }

    #[must_use]
    pub fn with_strikethrough(mut self, enabled: bool) -> Self {
        self.strikethrough = enabled;
        self
    }

    #[must_use]
    pub fn with_simple_line_breaks(mut self, enabled: bool) -> Self {
        self.simple_line_breaks = enabled;
        self
    }

    /// Parser options for the enabled extensions.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options |= Options::ENABLE_TABLES;
        }
        if self.strikethrough {
            options |= Options::ENABLE_STRIKETHROUGH;
        }
        options
    }
}

impl MarkdownConverter for CmarkConverter {
    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options()).map(|event| match event {
            Event::SoftBreak if self.simple_line_breaks => Event::HardBreak,
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out.truncate(out.trim_end().len());
        out
    }
}

/// Put a single-line ```` ```code``` ```` span on its own fenced lines so it
/// parses as a code block.
#[must_use]
pub fn correct_chat_markdown(text: &str) -> Cow<'_, str> {
    CHAT_CODE_SPAN.replace(text, "${1}\n${2}\n${3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_markdown() {
        let converter = CmarkConverter::new();
        assert_eq!(
            converter.to_html("Some **bold** text."),
            "<p>Some <strong>bold</strong> text.</p>"
        );
    }

    #[test]
    fn test_list() {
        let converter = CmarkConverter::new();
        assert_eq!(
            converter.to_html("* one\n* two\n* three"),
            "<ul>\n<li>one</li>\n<li>two</li>\n<li>three</li>\n</ul>"
        );
    }

    #[test]
    fn test_simple_line_breaks() {
        assert_eq!(
            CmarkConverter::new().to_html("one\ntwo"),
            "<p>one<br />\ntwo</p>"
        );
        assert_eq!(
            CmarkConverter::new()
                .with_simple_line_breaks(false)
                .to_html("one\ntwo"),
            "<p>one\ntwo</p>"
        );
    }

    #[test]
    fn test_mid_word_underscores_literal() {
        assert_eq!(
            CmarkConverter::new().to_html("snake_case_name"),
            "<p>snake_case_name</p>"
        );
    }

    #[test]
    fn test_headings_without_ids() {
        assert_eq!(CmarkConverter::new().to_html("# Title"), "<h1>Title</h1>");
    }

    #[test]
    fn test_tables_toggle() {
        let markdown = "| a |\n| - |\n| 1 |";
        assert!(CmarkConverter::new().to_html(markdown).starts_with("<table>"));
        assert!(
            !CmarkConverter::new()
                .with_tables(false)
                .to_html(markdown)
                .contains("<table>")
        );
    }

    #[test]
    fn test_strikethrough_toggle() {
        assert_eq!(
            CmarkConverter::new()
                .with_strikethrough(true)
                .to_html("~~gone~~"),
            "<p><del>gone</del></p>"
        );
        assert_eq!(CmarkConverter::new().to_html("~~gone~~"), "<p>~~gone~~</p>");
    }

    #[test]
    fn test_from_config() {
        let config = MarkdownConfig {
            tables: false,
            strikethrough: true,
            simple_line_breaks: false,
        };
        let options = CmarkConverter::from_config(&config).parser_options();
        assert!(!options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
    }

    #[test]
    fn test_correct_chat_markdown() {
        assert_eq!(correct_chat_markdown("```code```"), "```\ncode\n```");
        assert_eq!(
            correct_chat_markdown("before\n```let x = 1;```\nafter"),
            "before\n```\nlet x = 1;\n```\nafter"
        );
        assert_eq!(correct_chat_markdown("inline `code` only"), "inline `code` only");
    }
}
