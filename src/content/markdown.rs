//! Markdown rendering with syntax highlighting
//!
//! Code is highlighted with CSS classes rather than inline styles so that
//! [`MarkdownRenderer::stylesheet`] can style every rendered block.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::HighlightConfig;

/// Prefix of every class emitted by the highlighter
const CLASS_PREFIX: &str = "hl-";
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    css_class: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default highlight settings
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            css_class: config.css_class.clone(),
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Fenced code is core CommonMark; front-matter is split off before this
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // (language, accumulated source) of the open code block
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// CSS for the configured theme, scoped under the code block class
    pub fn stylesheet(&self) -> String {
        let Some(theme) = self.theme() else {
            tracing::warn!("No highlight themes available, stylesheet is empty");
            return String::new();
        };

        match css_for_theme_with_class_style(theme, CLASS_STYLE) {
            Ok(css) => scope_css(&css, &self.css_class),
            Err(e) => {
                tracing::warn!("Failed to generate highlight stylesheet: {}", e);
                String::new()
            }
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set.themes.get(&self.theme_name).or_else(|| {
            tracing::warn!(
                "Unknown highlight theme {:?}, using the first bundled theme",
                self.theme_name
            );
            self.theme_set.themes.values().next()
        })
    }

    fn find_syntax(&self, lang: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let syntax = self.find_syntax(lang);

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        let highlighted = LinesWithEndings::from(code)
            .try_for_each(|line| generator.parse_html_for_line_which_includes_newline(line))
            .map(|_| generator.finalize())
            .unwrap_or_else(|e| {
                tracing::debug!("Highlighting {} block failed: {}", lang, e);
                html_escape(code)
            });

        let block = format!(
            r#"<pre class="{}code"><code class="language-{}">{}</code></pre>"#,
            CLASS_PREFIX,
            html_escape(lang),
            highlighted
        );

        if self.line_numbers {
            self.add_line_numbers(&block, code.lines().count())
        } else {
            format!(r#"<div class="{}">{}</div>"#, self.css_class, block)
        }
    }

    /// Put a line-number gutter next to a highlighted block
    fn add_line_numbers(&self, block: &str, line_count: usize) -> String {
        let gutter = (1..=line_count.max(1))
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<div class="{}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></div>"#,
            self.css_class, gutter, block
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix every rule selector with `.{class} `
fn scope_css(css: &str, class: &str) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    for line in css.lines() {
        match line.strip_suffix('{') {
            Some(selectors) if line.starts_with('.') => {
                let scoped = selectors
                    .split(',')
                    .map(|s| format!(".{} {}", class, s.trim()))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&scoped);
                out.push_str(" {");
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test with **bold** text.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<div class="highlight">"#));
        assert!(html.contains(r#"class="language-rust""#));
        assert!(html.contains("hl-source"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_render_python_keeps_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```python\nprint(\"Hello, World!\")\n```\n");
        assert!(html.contains("Hello, World!"));
        assert!(html.contains("language-python"));
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\na < b\n```");
        assert!(html.contains("language-nosuchlang"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_render_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```\none\ntwo\n```");
        assert!(html.contains(r#"<td class="gutter">"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
        assert!(!html.contains(r#"<span class="line-number">3</span>"#));
    }

    #[test]
    fn test_stylesheet_is_scoped() {
        let renderer = MarkdownRenderer::new();
        let css = renderer.stylesheet();
        assert!(!css.is_empty());
        assert!(css.contains(".highlight .hl-"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            theme: "no-such-theme".to_string(),
            ..Default::default()
        });
        assert!(!renderer.stylesheet().is_empty());
    }

    #[test]
    fn test_scope_css() {
        let css = "/* c */\n.hl-code {\n color: #000;\n}\n.hl-a, .hl-b.hl-c {\n}\n";
        let scoped = scope_css(css, "highlight");
        assert!(scoped.contains(".highlight .hl-code {"));
        assert!(scoped.contains(".highlight .hl-a, .highlight .hl-b.hl-c {"));
        assert!(scoped.contains("/* c */"));
    }
}
