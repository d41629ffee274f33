//! Query a parsed HTML document with simple CSS selectors.
//!
//! ```ignore
//! let query = hquery::query_html(r#"<div class="foo"><a href="/x">X</a></div>"#)?;
//! assert_eq!(query.find(".foo a")?.href()?, Some("/x"));
//! ```
//!
//! Only type selectors, class selectors and the descendant combinator are
//! matched; any other token fails the query with
//! [`Error::UnsupportedSelectorToken`].

use nom::combinator::all_consuming;
use tracing::{debug, span, Level};

/// Read-only accessors over a single match
mod element;
mod error;
/// Walking a document against a selector
mod matcher;
/// Ordered sets of matches
mod selection;

pub use element::Element;
pub use error::{Error, Input, Result};
pub use selection::Selection;

pub use css::SelectorToken;
pub use html::{DOMContent, DOMElement, Document};

/// A parsed document, ready to be queried any number of times
#[derive(Debug, Clone)]
pub struct Query {
    document: Document,
}

impl Query {
    /// Parse `text` into a document. Fails if any of the input cannot be
    /// parsed, such as an unterminated tag or comment.
    pub fn parse(text: &str) -> Result<Self> {
        let span = span!(Level::DEBUG, "Parsing document", bytes = text.len());
        let _enter = span.enter();
        let (_, document) = all_consuming(html::document)(text)
            .map_err(|e| Error::from_nom(Input::Html, text, e))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Find every element matching `selector`, in document order.
    ///
    /// Only the first of several comma separated selectors is used; the
    /// others must still parse but are otherwise ignored.
    pub fn find(&self, selector: &str) -> Result<Selection<'_>> {
        let span = span!(Level::DEBUG, "Finding", selector);
        let _enter = span.enter();
        let (_, groups) = all_consuming(css::selector_list)(selector)
            .map_err(|e| Error::from_nom(Input::Selector, selector, e))?;
        let mut groups = groups.into_iter();
        let tokens = groups.next().unwrap_or_default();
        let ignored = groups.count();
        if ignored > 0 {
            debug!(ignored, "Ignoring all but the first selector group");
        }
        let mut nodes = Vec::new();
        matcher::find_in_document(&self.document, &tokens, &mut |n| nodes.push(n))?;
        debug!(matches = nodes.len(), "Query complete");
        Ok(Selection::new(nodes))
    }
}

impl From<Document> for Query {
    fn from(document: Document) -> Self {
        Self { document }
    }
}

/// Shorthand for [`Query::parse`]
pub fn query_html(text: &str) -> Result<Query> {
    Query::parse(text)
}

#[cfg(test)]
mod tests;
