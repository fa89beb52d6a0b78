//! Generator module - writes the static site using the built-in Tera templates

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use tera::Context;
use walkdir::WalkDir;

use crate::content::{Catalog, MarkdownRenderer, Post};
use crate::nav::{self, NavNode};
use crate::templates::{flatten_nav, ConfigData, PostData, TemplateRenderer};
use crate::Folio;

/// Directory under the public directory holding one page per post
const ARTICLE_DIR: &str = "article";

/// Static site generator
pub struct Generator<'a> {
    folio: &'a Folio,
    markdown: MarkdownRenderer,
    renderer: TemplateRenderer,
    config_data: ConfigData,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(folio: &'a Folio) -> Result<Self> {
        Ok(Self {
            folio,
            markdown: MarkdownRenderer::from_config(&folio.config),
            renderer: TemplateRenderer::new()?,
            config_data: ConfigData::from_config(&folio.config),
        })
    }

    /// Generate the entire site from a catalog
    pub fn generate(&self, catalog: &Catalog) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        self.clear_article_pages()?;
        self.copy_static_files()?;

        let published = catalog.published_posts();
        let tree = nav::build_tree(&published);

        self.write("index.html", &self.render_index(&tree, &published)?)?;
        self.generate_article_pages(&tree, &published)?;
        self.write("404.html", &self.render_not_found(&tree)?)?;

        self.generate_posts_json(&published)?;
        self.generate_nav_json(&tree)?;

        Ok(())
    }

    /// Post index: date and title of every published post
    pub fn render_index(&self, tree: &[NavNode], posts: &[&Post]) -> Result<String> {
        let mut context = self.page_context(tree, None, "");
        context.insert("posts", &self.post_data(posts));
        self.renderer.render("index.html", &context)
    }

    /// Article reader for one post with its rendered body
    pub fn render_article(&self, tree: &[NavNode], post: &Post, body_html: &str) -> Result<String> {
        let mut context = self.page_context(tree, Some(&post.id), &post.title);
        context.insert("post", &PostData::from_post(&self.folio.config, post));
        context.insert("content", body_html);
        self.renderer.render("article.html", &context)
    }

    /// Shown for unknown ids and drafts
    pub fn render_not_found(&self, tree: &[NavNode]) -> Result<String> {
        let context = self.page_context(tree, None, "Article non trouvé");
        self.renderer.render("not_found.html", &context)
    }

    fn page_context(&self, tree: &[NavNode], current: Option<&str>, title: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config_data);
        context.insert("nav", &flatten_nav(&self.folio.config, tree, current));
        context.insert("page_title", title);
        context
    }

    fn post_data(&self, posts: &[&Post]) -> Vec<PostData> {
        posts
            .iter()
            .map(|p| PostData::from_post(&self.folio.config, p))
            .collect()
    }

    /// Reader pages for published posts; drafts get none
    fn generate_article_pages(&self, tree: &[NavNode], posts: &[&Post]) -> Result<()> {
        for post in posts {
            let body = self.markdown.render_post(&post.content)?;
            let html = self.render_article(tree, post, &body)?;
            let relative = Path::new(ARTICLE_DIR).join(&post.id).join("index.html");
            self.write(&relative, &html)?;
            tracing::debug!("Generated article {}", post.id);
        }

        tracing::info!("Generated {} article pages", posts.len());
        Ok(())
    }

    /// Remove pages of a previous build, so posts that became drafts or
    /// were deleted lose theirs
    fn clear_article_pages(&self) -> Result<()> {
        let article_dir = self.folio.public_dir.join(ARTICLE_DIR);
        if article_dir.exists() {
            fs::remove_dir_all(&article_dir)
                .with_context(|| format!("Failed to remove {:?}", article_dir))?;
            tracing::debug!("Cleared {:?}", article_dir);
        }
        Ok(())
    }

    fn generate_posts_json(&self, posts: &[&Post]) -> Result<()> {
        let summaries = self.post_data(posts);
        self.write("posts.json", &serde_json::to_string_pretty(&summaries)?)?;
        tracing::info!("Generated posts.json");
        Ok(())
    }

    fn generate_nav_json(&self, tree: &[NavNode]) -> Result<()> {
        self.write("nav.json", &serde_json::to_string_pretty(tree)?)?;
        tracing::info!("Generated nav.json");
        Ok(())
    }

    /// Copy the site's static front-end files (scripts, styles, fonts)
    fn copy_static_files(&self) -> Result<()> {
        let static_dir = self.folio.static_dir();
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        tracing::info!("Copied static files from {:?}", static_dir);
        Ok(())
    }

    fn write<P: AsRef<Path>>(&self, relative: P, content: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn write_post(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn sample_post() -> Post {
        Post {
            id: "hello".to_string(),
            title: "Hello <World>".to_string(),
            date: "2024-03-01".to_string(),
            tags: vec!["go".to_string(), "web".to_string()],
            content: "body".to_string(),
            draft: false,
            source: "post/hello.md".to_string(),
        }
    }

    #[test]
    fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("post");
        fs::create_dir_all(&posts).unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/app.css"), "body {}").unwrap();
        write_post(
            &posts,
            "hello.md",
            "---\ntitle: Hello\ndate: 2024-03-01\ntags: [go]\n---\n\n![pic](./assets/pic.png)\n",
        );
        write_post(
            &posts,
            "secret.md",
            "---\ntitle: Secret\ndate: 2024-04-01\ntags: [go]\ndraft: true\n---\nWIP\n",
        );

        let folio = Folio::new(dir.path()).unwrap();
        let catalog = folio.load_catalog().unwrap();
        Generator::new(&folio).unwrap().generate(&catalog).unwrap();

        let public = dir.path().join("public");
        assert!(public.join("index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("app.css").exists());
        assert!(!public.join("article/secret").exists());

        let article = fs::read_to_string(public.join("article/hello/index.html")).unwrap();
        assert!(article.contains(r#"src="/post-assets/pic.png""#));

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Hello"));
        assert!(!index.contains("Secret"));

        let posts_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("posts.json")).unwrap()).unwrap();
        assert_eq!(posts_json.as_array().unwrap().len(), 1);
        assert_eq!(posts_json[0]["url"], "/article/hello/");

        let nav_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("nav.json")).unwrap()).unwrap();
        assert_eq!(nav_json[0]["name"], "2024");
        assert_eq!(nav_json[0]["type"], "folder");
    }

    #[test]
    fn test_regenerate_drops_stale_article_pages() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("post");
        fs::create_dir_all(&posts).unwrap();
        write_post(
            &posts,
            "hello.md",
            "---\ntitle: Hello\ndate: 2024-03-01\ntags: [go]\n---\nHi\n",
        );
        write_post(
            &posts,
            "gone.md",
            "---\ntitle: Gone\ndate: 2024-03-02\ntags: [go]\n---\nBye\n",
        );

        let folio = Folio::new(dir.path()).unwrap();
        let generator = Generator::new(&folio).unwrap();
        generator.generate(&folio.load_catalog().unwrap()).unwrap();

        let public = dir.path().join("public");
        assert!(public.join("article/hello/index.html").exists());
        assert!(public.join("article/gone/index.html").exists());

        write_post(
            &posts,
            "hello.md",
            "---\ntitle: Hello\ndate: 2024-03-01\ntags: [go]\ndraft: true\n---\nHi\n",
        );
        fs::remove_file(posts.join("gone.md")).unwrap();
        generator.generate(&folio.load_catalog().unwrap()).unwrap();

        assert!(!public.join("article/hello").exists());
        assert!(!public.join("article/gone").exists());
        assert!(public.join("index.html").exists());
    }

    #[test]
    fn test_index_lists_posts_under_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.set_base_path("/blog/");
        let folio = Folio::with_config(dir.path(), config);
        let generator = Generator::new(&folio).unwrap();

        let post = sample_post();
        let tree = nav::build_tree(&[&post]);
        let html = generator.render_index(&tree, &[&post]).unwrap();

        assert!(html.contains(r#"href="/blog/article/hello/""#));
        assert!(html.contains("Hello &lt;World&gt;"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/blog/app.css">"#));
        assert!(html.contains("<summary>2024</summary>"));
        assert!(html.contains("<title>Random Things</title>"));
    }

    #[test]
    fn test_article_marks_current_post() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let generator = Generator::new(&folio).unwrap();

        let post = sample_post();
        let tree = nav::build_tree(&[&post]);
        let html = generator
            .render_article(&tree, &post, "<p>rendered</p>")
            .unwrap();

        assert!(html.contains("<p>rendered</p>"));
        assert!(html.contains(r#"<span class="tag">web</span>"#));
        assert!(html.contains(r#"class="nav-file selected""#));
        assert!(html.contains("<title>Hello &lt;World&gt; | Random Things</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost/article/hello/">"#));
    }

    #[test]
    fn test_not_found_links_home() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let html = Generator::new(&folio).unwrap().render_not_found(&[]).unwrap();

        assert!(html.contains("Article non trouvé"));
        assert!(html.contains(r#"<a href="/">Retour à l'accueil</a>"#));
        assert!(html.contains("No result"));
    }
}
