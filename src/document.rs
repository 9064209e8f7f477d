//! Schema matching for export documents.
//!
//! An export document is a saved game page with one fixed shape:
//!
//! ```html
//! <body>
//!   <h1>Broken Picture Phone 1/15/2021, 3:04:05 PM</h1>
//!   <article>
//!     <h2>Ann's Book</h2>
//!     <section>
//!       <h3>Page 1, Ann:</h3>
//!       <h4>a cat riding a bicycle</h4>
//!     </section>
//!     <section>
//!       <h3>Page 2, Bob:</h3>
//!       <img src="data:image/png;base64,...">
//!     </section>
//!   </article>
//!   ...
//! </body>
//! ```
//!
//! [`parse_document`] matches the parsed HTML against that shape once, up
//! front, and returns a typed [`ExportDocument`]. Shape problems below the
//! document root do not fail the document; each article becomes a
//! [`BookNode`] variant saying whether it is well formed, missing its heading,
//! or missing its pages, so extraction can drop exactly that book.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static SECTION: LazyLock<Selector> = LazyLock::new(|| selector("section"));
static PAGE_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static PAGE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("h4"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));

static BOOK_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+)'s Book").expect("static regex"));
static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page (\d+), (.*):").expect("static regex"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("expected <h1> as the first element of the body, found {found}")]
    MissingTitle { found: String },
    #[error("book {position}: expected <h2> as the first element, found {found}")]
    MissingBookHeading { position: usize, found: String },
    #[error("book {position} ({heading}) has no page sections")]
    MissingSections { position: usize, heading: String },
    #[error("book {position}: duplicate book id {id}")]
    DuplicateBook { position: usize, id: String },
    #[error("document has no usable books")]
    NoBooks,
}

/// A document that matched the expected root shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// Text of the leading `<h1>`.
    pub title: String,
    /// One node per `<article>`, in document order.
    pub books: Vec<BookNode>,
}

/// One `<article>` after schema matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookNode {
    WellFormed(BookTree),
    /// The article's first element is not an `<h2>`.
    MissingHeading { position: usize, found: String },
    /// The article has a heading but no `<section>` pages.
    MissingSections { position: usize, heading: String },
}

impl BookNode {
    pub fn into_tree(self) -> Result<BookTree, StructureError> {
        match self {
            BookNode::WellFormed(tree) => Ok(tree),
            BookNode::MissingHeading { position, found } => {
                Err(StructureError::MissingBookHeading { position, found })
            }
            BookNode::MissingSections { position, heading } => {
                Err(StructureError::MissingSections { position, heading })
            }
        }
    }
}

/// A well-formed book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTree {
    /// 1-based article position in the document.
    pub position: usize,
    /// Text of the `<h2>`, e.g. `"Ann's Book"`.
    pub heading: String,
    pub pages: Vec<PageTree>,
}

impl BookTree {
    /// Owner parsed from `"<author>'s Book"`; `None` when the heading doesn't match.
    pub fn author(&self) -> Option<String> {
        BOOK_AUTHOR
            .captures(&self.heading)
            .map(|caps| caps[1].to_string())
    }
}

/// One `<section>`; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTree {
    /// Text of the first `<h3>`, e.g. `"Page 2, Bob:"`.
    pub heading: Option<String>,
    /// Text of the first `<h4>`.
    pub text: Option<String>,
    /// `src` of the first `<img>`.
    pub image_src: Option<String>,
}

/// Page number and author from a `"Page <n>, <author>:"` heading.
pub fn parse_page_heading(heading: &str) -> Option<(u32, String)> {
    let caps = PAGE_NUMBER.captures(heading)?;
    let number = caps[1].parse::<u32>().ok()?;
    Some((number, caps[2].to_string()))
}

/// Match raw HTML against the export document shape.
pub fn parse_document(html: &str) -> Result<ExportDocument, StructureError> {
    let dom = Html::parse_document(html);

    let first = dom
        .select(&BODY)
        .next()
        .and_then(|body| first_element_child(&body));
    let title = match first {
        Some(el) if el.value().name() == "h1" => text_of(&el),
        other => {
            return Err(StructureError::MissingTitle {
                found: describe(other),
            });
        }
    };

    let books = dom
        .select(&ARTICLE)
        .enumerate()
        .map(|(i, article)| match_book(i + 1, &article))
        .collect();

    Ok(ExportDocument { title, books })
}

fn match_book(position: usize, article: &ElementRef<'_>) -> BookNode {
    let heading = match first_element_child(article) {
        Some(el) if el.value().name() == "h2" => text_of(&el),
        other => {
            return BookNode::MissingHeading {
                position,
                found: describe(other),
            };
        }
    };

    let pages: Vec<PageTree> = article.select(&SECTION).map(|s| match_page(&s)).collect();
    if pages.is_empty() {
        return BookNode::MissingSections { position, heading };
    }

    BookNode::WellFormed(BookTree {
        position,
        heading,
        pages,
    })
}

fn match_page(section: &ElementRef<'_>) -> PageTree {
    PageTree {
        heading: section.select(&PAGE_HEADING).next().map(|el| text_of(&el)),
        text: section.select(&PAGE_TEXT).next().map(|el| text_of(&el)),
        image_src: section
            .select(&IMAGE)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(String::from),
    }
}

fn first_element_child<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.children().find_map(ElementRef::wrap)
}

fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn describe(el: Option<ElementRef<'_>>) -> String {
    match el {
        Some(el) => format!("<{}>", el.value().name()),
        None => "nothing".to_string(),
    }
}
