use crate::element::Element;
use crate::error::Result;
use html::DOMElement;

/// The ordered result of a query.
///
/// Besides indexing and iteration, every [`Element`] accessor is available
/// directly and reads from the first match, so `selection.text()` is
/// `selection.first().text()`.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    nodes: Vec<&'a DOMElement>,
}

impl<'a> Selection<'a> {
    pub(crate) fn new(nodes: Vec<&'a DOMElement>) -> Self {
        Self { nodes }
    }

    /// The match at `index`, or an empty [`Element`] when out of range
    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, index: usize) -> Element<'a> {
        Element::new(self.nodes.get(index).copied())
    }

    pub fn first(&self) -> Element<'a> {
        self.eq(0)
    }

    pub fn last(&self) -> Element<'a> {
        Element::new(self.nodes.last().copied())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Element<'a>> + '_ {
        self.nodes.iter().map(|&n| Element::from(n))
    }

    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(Element<'a>) -> T,
    {
        self.iter().map(f).collect()
    }

    pub fn attr(&self, name: &str) -> Result<Option<&'a str>> {
        self.first().attr(name)
    }

    pub fn has_class(&self, name: &str) -> Result<bool> {
        self.first().has_class(name)
    }

    pub fn text(&self) -> Result<String> {
        self.first().text()
    }

    pub fn children(&self) -> Vec<Element<'a>> {
        self.first().children()
    }

    pub fn name(&self) -> Result<&'a str> {
        self.first().name()
    }

    pub fn href(&self) -> Result<Option<&'a str>> {
        self.first().href()
    }
}

impl<'a> IntoIterator for Selection<'a> {
    type Item = Element<'a>;
    type IntoIter = std::iter::Map<std::vec::IntoIter<&'a DOMElement>, fn(&'a DOMElement) -> Element<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes
            .into_iter()
            .map(Element::from as fn(&'a DOMElement) -> Element<'a>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn items() -> Vec<DOMElement> {
        ["one", "two", "three"]
            .iter()
            .map(|t| DOMElement::new("li", None, vec![(*t).into()]))
            .collect()
    }

    #[test]
    fn test_indexing() {
        let items = items();
        let selection = Selection::new(items.iter().collect());
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.eq(1).text(), Ok("two".to_string()));
        assert_eq!(selection.first().text(), Ok("one".to_string()));
        assert_eq!(selection.last().text(), Ok("three".to_string()));
        // Out of range is only an error once read
        let missing = selection.eq(5);
        assert_eq!(missing.text(), Err(Error::NoElement));
    }

    #[test]
    fn test_forwarding() {
        let items = items();
        let selection = Selection::new(items.iter().collect());
        assert_eq!(selection.text(), selection.first().text());
        assert_eq!(selection.name(), Ok("li"));
        assert_eq!(selection.attr("key"), Ok(None));
        assert_eq!(selection.has_class("x"), Ok(false));
        assert!(selection.children().is_empty());
    }

    #[test]
    fn test_map_and_iterate() {
        let items = items();
        let selection = Selection::new(items.iter().collect());
        let texts = selection.map(|e| e.text().unwrap());
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(selection.iter().count(), 3);
        let names: Vec<_> = selection.into_iter().map(|e| e.name()).collect();
        assert_eq!(names, vec![Ok("li"); 3]);
    }

    #[test]
    fn test_empty() {
        let selection = Selection::default();
        assert!(selection.is_empty());
        assert!(selection.map(|e| e.name()).is_empty());
        assert!(selection.first().node().is_none());
        assert!(selection.last().node().is_none());
        assert_eq!(selection.text(), Err(Error::NoElement));
        assert_eq!(selection.attr("x"), Err(Error::NoElement));
        assert_eq!(selection.href(), Err(Error::NoElement));
        assert_eq!(selection.name(), Err(Error::NoElement));
        assert_eq!(selection.has_class("x"), Err(Error::NoElement));
        assert!(selection.children().is_empty());
    }
}
