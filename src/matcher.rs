use crate::error::{Error, Result};
use css::{Combinator, SelectorToken};
use html::{DOMContent, DOMElement, Document};

/// Run `tokens` against every node of `doc`, calling `on_match` with each
/// matching element in document order.
///
/// The document root takes part in matching like any other node, but since
/// it is not an element it can never satisfy a token itself.
pub fn find_in_document<'a, F>(doc: &'a Document, tokens: &[SelectorToken], on_match: &mut F) -> Result<()>
where
    F: FnMut(&'a DOMElement),
{
    visit(None, &doc.contents, tokens, on_match)
}

/// Run `tokens` against `node` and its descendants
pub fn find_nodes<'a, F>(node: &'a DOMContent, tokens: &[SelectorToken], on_match: &mut F) -> Result<()>
where
    F: FnMut(&'a DOMElement),
{
    let element = match node {
        DOMContent::Element(elt) => Some(elt),
        DOMContent::Text(_) => None,
    };
    visit(element, node.children(), tokens, on_match)
}

/// Match the first compound of `tokens` against one node.
///
/// On a match with no descendant combinator left, the node is reported and
/// its subtree is not searched any further. On a match with more compounds to
/// go, the children continue with the remaining tokens. Otherwise the children
/// start again with the whole sequence.
fn visit<'a, F>(
    element: Option<&'a DOMElement>,
    children: &'a [DOMContent],
    tokens: &[SelectorToken],
    on_match: &mut F,
) -> Result<()>
where
    F: FnMut(&'a DOMElement),
{
    let split = tokens
        .iter()
        .position(|t| *t == SelectorToken::Combinator(Combinator::Descendant));
    let (compound, rest) = match split {
        Some(i) => (&tokens[..i], Some(&tokens[i + 1..])),
        None => (tokens, None),
    };
    let matched = does_compound_apply(element, compound)?;
    match (element, rest) {
        (Some(elt), None) if matched => on_match(elt),
        (Some(_), Some(rest)) if matched => {
            for child in children {
                find_nodes(child, rest, on_match)?;
            }
        }
        _ => {
            for child in children {
                find_nodes(child, tokens, on_match)?;
            }
        }
    }
    Ok(())
}

/// Check every token of a compound against a node, `None` standing for a
/// node which is not an element. Tokens are checked in order and checking
/// stops at the first one that fails, so an unsupported token is only
/// reported once every token before it has matched.
fn does_compound_apply(element: Option<&DOMElement>, compound: &[SelectorToken]) -> Result<bool> {
    for token in compound {
        let applies = match token {
            SelectorToken::Tag(name) => element.map_or(false, |e| &e.name == name),
            SelectorToken::Attribute(attr) if attr.name == "class" => {
                element.map_or(false, |e| has_class(e, &attr.value))
            }
            other => return Err(Error::UnsupportedSelectorToken(other.clone())),
        };
        if !applies {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Check if any `class` attribute contains `name`.
///
/// This is a plain substring test on the raw attribute value, so `ted` is
/// found in `class="tedious"`.
pub(crate) fn has_class(element: &DOMElement, name: &str) -> bool {
    element
        .attributes
        .0
        .iter()
        .any(|(k, v)| k == "class" && v.contains(name))
}

#[cfg(test)]
fn collect<'a>(doc: &'a Document, tokens: &[SelectorToken]) -> Result<Vec<&'a DOMElement>> {
    let mut found = Vec::new();
    find_in_document(doc, tokens, &mut |e| found.push(e))?;
    Ok(found)
}

#[cfg(test)]
fn doc(contents: Vec<DOMContent>) -> Document {
    Document { contents }
}

#[cfg(test)]
#[test]
fn test_does_apply() {
    use css::token;
    use html::attributes;

    let div = DOMElement::new("div", Some(attributes!(class => "wide tall")), vec![]);
    assert!(does_compound_apply(Some(&div), &[token!(div)]).unwrap());
    assert!(does_compound_apply(Some(&div), &[token!(div), token!(.wide)]).unwrap());
    assert!(does_compound_apply(Some(&div), &[token!(.all)]).unwrap());
    assert!(!does_compound_apply(Some(&div), &[token!(p), token!(.wide)]).unwrap());
    assert!(!does_compound_apply(None, &[token!(div)]).unwrap());
    assert!(does_compound_apply(Some(&div), &[]).unwrap());
}

#[cfg(test)]
#[test]
fn test_unsupported_tokens() {
    use css::token;

    let p = DOMElement::new("p", None, vec![]);
    assert_eq!(
        does_compound_apply(Some(&p), &[token!(p), token!(#main)]),
        Err(Error::UnsupportedSelectorToken(token!(#main)))
    );
    // Never reached: the tag check fails first
    assert_eq!(does_compound_apply(Some(&p), &[token!(a), token!(#main)]), Ok(false));
    assert_eq!(
        does_compound_apply(None, &[token!(*)]),
        Err(Error::UnsupportedSelectorToken(token!(*)))
    );
}

#[cfg(test)]
#[test]
fn test_descendant_matching() {
    use css::token;
    use html::attributes;

    let tree = doc(vec![DOMElement::new(
        "div",
        None,
        vec![
            DOMElement::new(
                "div",
                Some(attributes!(class => foo)),
                vec![DOMElement::new(
                    "ul",
                    None,
                    vec![
                        DOMElement::new("li", None, vec!["Hello".into()]).into(),
                        DOMElement::new("li", None, vec!["World!".into()]).into(),
                    ],
                )
                .into()],
            )
            .into(),
            DOMElement::new("li", None, vec!["Outside".into()]).into(),
        ],
    )
    .into()]);
    let descendant = SelectorToken::from(Combinator::Descendant);

    let found = collect(&tree, &[token!(.foo), descendant.clone(), token!(li)]).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].contents, vec![DOMContent::from("Hello")]);
    assert_eq!(found[1].contents, vec![DOMContent::from("World!")]);

    // A terminal match hides any nested match of the same selector
    let found = collect(&tree, &[token!(div)]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].elements().count(), 2);

    let found = collect(&tree, &[token!(li)]).unwrap();
    assert_eq!(found.len(), 3);

    let found = collect(&tree, &[token!(.missing), descendant, token!(li)]).unwrap();
    assert!(found.is_empty());
}

#[cfg(test)]
#[test]
fn test_error_aborts_walk() {
    use css::token;

    let tree = doc(vec![
        DOMElement::new("a", None, vec![]).into(),
        DOMElement::new("p", None, vec![]).into(),
    ]);
    let mut seen = 0;
    let result = find_in_document(&tree, &[token!(p), token!(>), token!(a)], &mut |_| seen += 1);
    assert_eq!(result, Err(Error::UnsupportedSelectorToken(token!(>))));
    assert_eq!(seen, 0);
}
