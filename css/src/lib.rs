use std::fmt;

/// One atom of a parsed selector.
///
/// Class and ID selectors are sugar for attribute selectors, so `.foo` is
/// `[class~=foo]` and `#bar` is `[id=bar]`. A complex selector is a flat
/// sequence of these, with [`SelectorToken::Combinator`] separating compounds.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum SelectorToken {
    Tag(String),
    Universal,
    Attribute(AttributeSelector),
    PseudoClass {
        name: String,
        argument: Option<String>,
    },
    PseudoElement(String),
    Combinator(Combinator),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Combinator {
    // ( )
    Descendant,
    // (>)
    Child,
    // (+)
    NextSibling,
    // (~)
    SubsequentSibling,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AttributeSelector {
    pub name: String,
    pub action: AttributeAction,
    pub value: String,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AttributeAction {
    // [att]
    Exists,
    // [att=val]
    Equals,
    // [att~=val]
    Includes,
    // [att|=val]
    // `att` is `val` or begins with `val-`
    DashMatch,
    // [att^=val]
    Prefix,
    // [att$=val]
    Suffix,
    // [att*=val]
    Substring,
    // [att!=val]
    NotEqual,
}

impl SelectorToken {
    pub fn tag(name: impl Into<String>) -> Self {
        SelectorToken::Tag(name.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        SelectorToken::Attribute(AttributeSelector {
            name: "class".to_string(),
            action: AttributeAction::Includes,
            value: name.into(),
        })
    }

    pub fn id(name: impl Into<String>) -> Self {
        SelectorToken::Attribute(AttributeSelector {
            name: "id".to_string(),
            action: AttributeAction::Equals,
            value: name.into(),
        })
    }
}

impl From<Combinator> for SelectorToken {
    fn from(c: Combinator) -> Self {
        SelectorToken::Combinator(c)
    }
}

#[macro_export]
macro_rules! token {
    (#$x:ident) => {
        $crate::SelectorToken::id(stringify!($x))
    };
    (.$x:ident) => {
        $crate::SelectorToken::class(stringify!($x))
    };
    (*) => {
        $crate::SelectorToken::Universal
    };
    (>) => {
        $crate::SelectorToken::Combinator($crate::Combinator::Child)
    };
    (+) => {
        $crate::SelectorToken::Combinator($crate::Combinator::NextSibling)
    };
    (~) => {
        $crate::SelectorToken::Combinator($crate::Combinator::SubsequentSibling)
    };
    ($x:ident) => {
        $crate::SelectorToken::tag(stringify!($x))
    };
}

impl AttributeAction {
    fn operator(self) -> &'static str {
        match self {
            AttributeAction::Exists => "",
            AttributeAction::Equals => "=",
            AttributeAction::Includes => "~=",
            AttributeAction::DashMatch => "|=",
            AttributeAction::Prefix => "^=",
            AttributeAction::Suffix => "$=",
            AttributeAction::Substring => "*=",
            AttributeAction::NotEqual => "!=",
        }
    }
}

/// Renders the token back into selector syntax
impl fmt::Display for SelectorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorToken::Tag(name) => f.write_str(name),
            SelectorToken::Universal => f.write_str("*"),
            SelectorToken::Attribute(attr) => match (attr.name.as_str(), attr.action) {
                ("class", AttributeAction::Includes) => write!(f, ".{}", attr.value),
                ("id", AttributeAction::Equals) => write!(f, "#{}", attr.value),
                (name, AttributeAction::Exists) => write!(f, "[{}]", name),
                (name, action) => write!(f, "[{}{}{:?}]", name, action.operator(), attr.value),
            },
            SelectorToken::PseudoClass { name, argument } => match argument {
                Some(arg) => write!(f, ":{}({})", name, arg),
                None => write!(f, ":{}", name),
            },
            SelectorToken::PseudoElement(name) => write!(f, "::{}", name),
            SelectorToken::Combinator(Combinator::Descendant) => f.write_str(" "),
            SelectorToken::Combinator(Combinator::Child) => f.write_str(" > "),
            SelectorToken::Combinator(Combinator::NextSibling) => f.write_str(" + "),
            SelectorToken::Combinator(Combinator::SubsequentSibling) => f.write_str(" ~ "),
        }
    }
}

mod parsing;

pub use parsing::selector_list;
