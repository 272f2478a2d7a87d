//! Article body rendering and HTML sanitisation.
//!
//! Submitted content is either Markdown (rendered to HTML first) or raw HTML.
//! Both paths end in the same allow-list sanitiser, so stored HTML only ever
//! contains the tags and attributes listed here.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use ammonia::Builder;
use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};

/// Tags that survive sanitisation.
pub const ALLOWED_TAGS: [&str; 23] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "b", "i", "u", "em", "strong", "a", "ul", "ol", "li",
    "br", "span", "img", "blockquote", "code", "pre", "hr",
];

const LINK_REL: &str = "noopener noreferrer";

/// Validation errors for article content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    /// The submitted source was blank.
    #[error("content must not be empty")]
    Empty,
    /// The format name was not recognised.
    #[error("format must be markdown or html")]
    UnknownFormat,
}

/// Source format of submitted article content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// CommonMark source rendered to HTML before sanitising.
    #[default]
    Markdown,
    /// Raw HTML, sanitised directly.
    Html,
}

impl ContentFormat {
    /// Lowercase wire and storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentFormat {
    type Err = ContentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(ContentValidationError::UnknownFormat),
        }
    }
}

/// Article body: the submitted source plus its sanitised HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContent {
    format: ContentFormat,
    source: String,
    html: String,
}

impl ArticleContent {
    /// Rebuild content previously produced by [`render`], e.g. from storage.
    pub fn from_parts(format: ContentFormat, source: String, html: String) -> Self {
        Self {
            format,
            source,
            html,
        }
    }

    /// Submitted format.
    pub fn format(&self) -> ContentFormat {
        self.format
    }

    /// Submitted source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sanitised HTML safe to embed in a page.
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Render and sanitise submitted content.
///
/// # Examples
/// ```
/// use newsroom::domain::{render, ContentFormat};
///
/// let content = render(ContentFormat::Markdown, "# Hi\n\n<script>x()</script>").unwrap();
/// assert!(content.html().contains("<h1>Hi</h1>"));
/// assert!(!content.html().contains("script"));
/// ```
pub fn render(format: ContentFormat, source: &str) -> Result<ArticleContent, ContentValidationError> {
    if source.trim().is_empty() {
        return Err(ContentValidationError::Empty);
    }
    let unsafe_html = match format {
        ContentFormat::Markdown => markdown_to_html(source),
        ContentFormat::Html => source.to_owned(),
    };
    Ok(ArticleContent {
        format,
        source: source.to_owned(),
        html: sanitize(&unsafe_html),
    })
}

fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::empty());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Apply the allow-list policy to an HTML fragment.
///
/// Disallowed tags are removed but their text is kept; `script` and `style`
/// elements are dropped with their contents.
pub fn sanitize(fragment: &str) -> String {
    let tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::from([
        ("a", HashSet::from(["href", "title"])),
        ("img", HashSet::from(["src", "alt"])),
    ]);

    Builder::default()
        .tags(ALLOWED_TAGS.into_iter().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .link_rel(Some(LINK_REL))
        .clean(fragment)
        .to_string()
}
