//! Markdown normalization before rendering
//!
//! Post bodies may contain raw `<a>` elements, which the renderer does not
//! pass through. They are rewritten into markdown links first. Link and image
//! targets are then resolved against the deployment base path while the
//! markdown is rendered, and `.stl` links become 3D model previews.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::ops::Range;

use crate::config::SiteConfig;
use crate::helpers::strip_html;

/// Rewrite every `<a ...>...</a>` element into markdown.
///
/// `<a href="u" download="t">text</a>` becomes `[text](u "t")`; an anchor
/// without `href` is replaced by its text. The text has nested tags removed
/// and whitespace collapsed. `dowload` is accepted as a spelling of
/// `download`. Unterminated anchors are left as they are, and so is
/// everything inside fenced code blocks and inline code spans.
pub fn rewrite_anchors(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    for code in code_ranges(text) {
        rewrite_prose(&text[pos..code.start], &mut out);
        out.push_str(&text[code.clone()]);
        pos = code.end;
    }
    rewrite_prose(&text[pos..], &mut out);

    out
}

fn rewrite_prose(text: &str, out: &mut String) {
    let mut rest = text;

    while let Some(start) = find_anchor_open(rest) {
        let candidate = &rest[start..];
        match Anchor::parse(candidate) {
            Some((anchor, consumed)) => {
                out.push_str(&rest[..start]);
                out.push_str(&anchor.to_markdown());
                rest = &candidate[consumed..];
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = &candidate[2..];
            }
        }
    }

    out.push_str(rest);
}

/// Byte ranges of fenced code blocks and inline code spans, in order.
/// An unclosed fence runs to the end of the text.
fn code_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    // (fence char, fence length, block start)
    let mut fence: Option<(u8, usize, usize)> = None;
    let mut prose_start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match fence {
            Some((ch, len, start)) => {
                if let Some((c, n, info)) = fence_marker(line) {
                    if c == ch && n >= len && info.trim().is_empty() {
                        ranges.push(start..offset);
                        fence = None;
                        prose_start = offset;
                    }
                }
            }
            None => {
                let opener = fence_marker(line).filter(|(c, _, info)| *c != b'`' || !info.contains('`'));
                if let Some((c, n, _)) = opener {
                    inline_code_ranges(text, prose_start..line_start, &mut ranges);
                    fence = Some((c, n, line_start));
                }
            }
        }
    }

    match fence {
        Some((_, _, start)) => ranges.push(start..text.len()),
        None => inline_code_ranges(text, prose_start..text.len(), &mut ranges),
    }
    ranges
}

/// A line opening or closing a fence: up to three spaces, then three or more
/// backticks or tildes. Returns the fence char, its length and the rest.
fn fence_marker(line: &str) -> Option<(u8, usize, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }

    let ch = *trimmed.as_bytes().first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let len = trimmed.bytes().take_while(|&b| b == ch).count();
    (len >= 3).then(|| (ch, len, &trimmed[len..]))
}

/// Backtick spans inside `region`: a run of N backticks up to the next run
/// of exactly N. A run without a match is literal text.
fn inline_code_ranges(text: &str, region: Range<usize>, ranges: &mut Vec<Range<usize>>) {
    let bytes = &text.as_bytes()[..region.end];
    let mut i = region.start;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run = i - open;

        let mut j = i;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let start = j;
            while j < bytes.len() && bytes[j] == b'`' {
                j += 1;
            }
            if j - start == run {
                close = Some(j);
                break;
            }
        }

        if let Some(end) = close {
            ranges.push(open..end);
            i = end;
        }
    }
}

/// Byte offset of the next `<a` that opens an anchor tag
fn find_anchor_open(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1].eq_ignore_ascii_case(&b'a')
            && (bytes[i + 2].is_ascii_whitespace() || bytes[i + 2] == b'>')
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Find `needle` ignoring ASCII case
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// A parsed anchor element
#[derive(Debug, Default, PartialEq, Eq)]
struct Anchor {
    href: Option<String>,
    title: Option<String>,
    text: String,
}

impl Anchor {
    /// Parse an anchor starting at `<a`; returns it with the bytes consumed
    fn parse(s: &str) -> Option<(Self, usize)> {
        let open_end = find_tag_end(s)?;
        let attrs = parse_attributes(&s[2..open_end]);

        let inner_start = open_end + 1;
        let close = inner_start + find_ignore_case(&s[inner_start..], "</a>")?;
        let inner = &s[inner_start..close];

        let mut anchor = Anchor {
            text: strip_html(inner)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            ..Default::default()
        };
        for (name, value) in attrs {
            match name.as_str() {
                "href" if !value.is_empty() => anchor.href = Some(value),
                "download" | "dowload" if !value.is_empty() => anchor.title = Some(value),
                _ => {}
            }
        }

        Some((anchor, close + "</a>".len()))
    }

    fn to_markdown(&self) -> String {
        let Some(href) = &self.href else {
            return self.text.clone();
        };

        let text = self.text.replace('[', "\\[").replace(']', "\\]");
        let dest = if href.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            format!("<{}>", href)
        } else {
            href.clone()
        };

        match &self.title {
            Some(title) => format!("[{}]({} \"{}\")", text, dest, title.replace('"', "\\\"")),
            None => format!("[{}]({})", text, dest),
        }
    }
}

/// Index of the `>` closing the opening tag, skipping quoted values
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in s.as_bytes().iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Parse `name="value" name='value' name=value name` attribute lists.
/// Names are lowercased; valueless attributes get an empty value.
fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let bytes = s.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    let skip_ws = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    loop {
        i = skip_ws(i);
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'/'
        {
            i += 1;
        }
        let name = s[name_start..i].to_ascii_lowercase();
        if name.is_empty() {
            // Stray `/` or `=`
            i += 1;
            continue;
        }

        let after_name = skip_ws(i);
        let mut value = String::new();
        if after_name < bytes.len() && bytes[after_name] == b'=' {
            i = skip_ws(after_name + 1);
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                let mut end = value_start;
                while end < bytes.len() && bytes[end] != quote {
                    end += 1;
                }
                value = s[value_start..end].to_string();
                i = (end + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = s[value_start..i].to_string();
            }
        }

        attrs.push((name, value));
    }

    attrs
}

/// Resolves link and image targets against the deployment paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    base_path: String,
    post_assets_base: String,
}

impl AssetResolver {
    /// `base_path` and `post_assets_base` are expected to end with `/`
    pub fn new(base_path: &str, post_assets_base: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            post_assets_base: post_assets_base.to_string(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.base_path, &config.post_assets_base())
    }

    /// Resolve a link or image target
    pub fn resolve<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if is_absolute(url) {
            return Cow::Borrowed(url);
        }

        if url.starts_with('/') {
            let base = self.base_path.trim_end_matches('/');
            if base.is_empty() || url.starts_with(&self.base_path) || url == base {
                return Cow::Borrowed(url);
            }
            return Cow::Owned(format!("{}{}", base, url));
        }

        let relative = url.strip_prefix("./").unwrap_or(url);
        if let Some(asset) = relative.strip_prefix("assets/") {
            return Cow::Owned(format!("{}{}", self.post_assets_base, asset));
        }

        Cow::Borrowed(url)
    }
}

/// Targets that never get rewritten
fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://", "mailto:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
        || url.starts_with('#')
        || url.starts_with("//")
        || url == "/"
}

/// How a markdown link is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Regular hyperlink
    Plain { href: String, title: String },
    /// Downloadable 3D model shown with a preview widget
    ModelPreview { href: String, label: String },
}

impl LinkTarget {
    /// Classify an already resolved link target
    pub fn classify(href: &str, title: &str) -> Self {
        if is_model_url(href) {
            LinkTarget::ModelPreview {
                href: href.to_string(),
                label: model_label(href, title),
            }
        } else {
            LinkTarget::Plain {
                href: href.to_string(),
                title: title.to_string(),
            }
        }
    }
}

/// Strip query and fragment
fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// True when the URL points at an `.stl` file
pub fn is_model_url(url: &str) -> bool {
    url_path(url).to_ascii_lowercase().ends_with(".stl")
}

/// Label for a model preview: the title, else the decoded file name
fn model_label(href: &str, title: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }

    url_path(href)
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(|name| percent_decode_str(name).decode_utf8_lossy().into_owned())
        .unwrap_or_else(|| "3D model".to_string())
}
