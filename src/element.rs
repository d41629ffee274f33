use crate::error::{Error, Result};
use crate::matcher::has_class;
use html::{DOMContent, DOMElement};

/// A read-only view of at most one element.
///
/// An empty view stands in for a missing result (an empty query, or an index
/// past the end). Creating one never fails; reading from it returns
/// [`Error::NoElement`]. Only `children` is lenient and yields nothing.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    node: Option<&'a DOMElement>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(node: Option<&'a DOMElement>) -> Self {
        Self { node }
    }

    /// The underlying element, if there is one
    pub fn node(&self) -> Option<&'a DOMElement> {
        self.node
    }

    fn get(&self) -> Result<&'a DOMElement> {
        self.node.ok_or(Error::NoElement)
    }

    /// Value of the first attribute called `name`. A missing attribute is
    /// `Ok(None)`; only a missing element is an error.
    pub fn attr(&self, name: &str) -> Result<Option<&'a str>> {
        Ok(self.get()?.get_attribute(name))
    }

    /// Substring check on the `class` attribute, so `ted` is found in `tedious`
    pub fn has_class(&self, name: &str) -> Result<bool> {
        Ok(has_class(self.get()?, name))
    }

    /// Concatenation of every descendant text node, each trimmed on its own
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        build_text(self.get()?, &mut text);
        Ok(text)
    }

    /// Direct children which are elements
    pub fn children(&self) -> Vec<Element<'a>> {
        self.node
            .map(|n| n.elements().map(Element::from).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> Result<&'a str> {
        Ok(self.get()?.name.as_str())
    }

    pub fn href(&self) -> Result<Option<&'a str>> {
        self.attr("href")
    }
}

impl<'a> From<&'a DOMElement> for Element<'a> {
    fn from(node: &'a DOMElement) -> Self {
        Self::new(Some(node))
    }
}

fn build_text(elt: &DOMElement, text: &mut String) {
    for child in &elt.contents {
        match child {
            DOMContent::Text(t) => text.push_str(t.trim()),
            DOMContent::Element(e) => build_text(e, text),
        }
    }
}
