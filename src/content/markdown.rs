//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::normalize::{rewrite_anchors, AssetResolver, LinkTarget};
use crate::config::SiteConfig;
use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting and link resolution
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
    raw_html: bool,
    resolver: AssetResolver,
}

impl MarkdownRenderer {
    /// Create a renderer for a site served from `/`
    pub fn new() -> Self {
        Self::from_config(&SiteConfig::default())
    }

    /// Create a renderer from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.markdown.highlight_theme.clone(),
            line_numbers: config.markdown.line_number,
            raw_html: config.markdown.raw_html,
            resolver: AssetResolver::from_config(config),
        }
    }

    /// Normalize a post body and render it to HTML
    pub fn render_post(&self, body: &str) -> Result<String> {
        self.render(&rewrite_anchors(body))
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut in_model_link = false;

        for event in parser {
            if let Some((lang, content)) = code_block.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let highlighted = self.highlight_code(content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                        code_block = None;
                    }
                    Event::Text(text) => content.push_str(&text),
                    _ => {}
                }
                continue;
            }

            // Model previews replace the whole link, including its text
            if in_model_link {
                if matches!(event, Event::End(TagEnd::Link)) {
                    in_model_link = false;
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            (!lang.is_empty()).then_some(lang)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let href = self.resolver.resolve(&dest_url).into_owned();
                    match LinkTarget::classify(&href, &title) {
                        LinkTarget::ModelPreview { href, label } => {
                            events.push(Event::Html(CowStr::from(model_preview_html(
                                &href, &label,
                            ))));
                            in_model_link = true;
                        }
                        LinkTarget::Plain { href, title } => {
                            events.push(Event::Start(Tag::Link {
                                link_type,
                                dest_url: CowStr::from(href),
                                title: CowStr::from(title),
                                id,
                            }));
                        }
                    }
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let src = self.resolver.resolve(&dest_url).into_owned();
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: CowStr::from(src),
                        title,
                        id,
                    }));
                }
                Event::Html(raw) | Event::InlineHtml(raw) if !self.raw_html => {
                    events.push(Event::Text(raw));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Markup the 3D preview script attaches to. The link stays usable when
/// the preview cannot start.
pub fn model_preview_html(href: &str, label: &str) -> String {
    let href = html_escape(href);
    format!(
        concat!(
            r#"<figure class="model-preview" data-model-src="{href}">"#,
            r#"<div class="model-preview-canvas" data-fallback="3D preview unavailable"></div>"#,
            r#"<figcaption><a href="{href}" download>{label}</a></figcaption>"#,
            "</figure>"
        ),
        href = href,
        label = html_escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer_for(base: &str) -> MarkdownRenderer {
        let mut config = SiteConfig::default();
        config.set_base_path(base);
        MarkdownRenderer::from_config(&config)
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(html.contains("main"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_gfm_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |").unwrap();
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_links_and_images_resolved() {
        let renderer = renderer_for("/blog/");
        let html = renderer
            .render("![pic](./assets/pic.png) [home](/about) [ext](https://example.com)")
            .unwrap();
        assert!(html.contains(r#"src="/blog/post-assets/pic.png""#));
        assert!(html.contains(r#"href="/blog/about""#));
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn test_stl_link_becomes_preview() {
        let renderer = renderer_for("/");
        let html = renderer
            .render_post(r#"Download: <a href="assets/part.stl" download="Bracket">get</a>"#)
            .unwrap();
        assert!(html.contains(r#"<figure class="model-preview" data-model-src="/post-assets/part.stl">"#));
        assert!(html.contains(r#"<a href="/post-assets/part.stl" download>Bracket</a>"#));
        assert!(!html.contains(">get<"));
    }

    #[test]
    fn test_raw_html_escaped_by_default() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        let mut config = SiteConfig::default();
        config.markdown.raw_html = true;
        let html = MarkdownRenderer::from_config(&config)
            .render("<div class=\"note\">hi</div>")
            .unwrap();
        assert!(html.contains(r#"<div class="note">"#));
    }

    #[test]
    fn test_model_preview_html_escapes() {
        let html = model_preview_html("/a\"b.stl", "<x>");
        assert!(html.contains("data-model-src=\"/a&quot;b.stl\""));
        assert!(html.contains("&lt;x&gt;"));
    }
}
