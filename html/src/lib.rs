#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Document {
    pub contents: Vec<DOMContent>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
}

/// Attributes in source order. Keys may repeat; lookups see the first one.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct DOMAttributes(pub Vec<(String, String)>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Build a [`DOMAttributes`] from `key => value` pairs
///
/// Bare identifiers are stringified, so `attributes!(lang => en)` works
/// without quoting; anything else needs a literal.
#[macro_export]
macro_rules! attributes {
    (@str $x:literal) => { ($x).to_string() };
    (@str $x:tt) => { stringify!($x).to_string() };
    ($($k:tt => $v:tt),* $(,)?) => {
        $crate::DOMAttributes(vec![$((
            $crate::attributes!(@str $k),
            $crate::attributes!(@str $v),
        )),*])
    };
}

impl DOMElement {
    pub fn new(
        name: impl Into<String>,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.unwrap_or_default(),
            contents,
        }
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Direct children which are elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(e) => Some(e),
            DOMContent::Text(_) => None,
        })
    }
}

impl DOMContent {
    pub fn children(&self) -> &[DOMContent] {
        match self {
            DOMContent::Element(e) => &e.contents,
            DOMContent::Text(_) => &[],
        }
    }
}

impl From<DOMElement> for DOMContent {
    fn from(e: DOMElement) -> Self {
        DOMContent::Element(e)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        DOMContent::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        DOMContent::Text(s)
    }
}

mod parsing;

pub use parsing::{document, MAX_DEPTH};
