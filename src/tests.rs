use super::*;
use css::{token, Combinator};
use html::DOMAttributes;
use proptest::prelude::*;

static MOCK: &str = r#"
<div>
  <div class="zed ted">
    <a name="skywalker">Luke</a>
  </div>
  <div class="foo">
    <ul>
      <li key="hello">Hello</li>
      <li>World!</li>
    </ul>
  </div>
  <div class="bar">
    <a href="/luke">Luke</a>
  </div>
</div>
"#;

static MOVIES: &str = include_str!("../resources/movies.html");

#[test]
fn test_inner_text() {
    let query = query_html(MOCK).unwrap();
    assert_eq!(query.find(".foo").unwrap().text().unwrap(), "HelloWorld!");
    assert_eq!(query.find(".bar").unwrap().text().unwrap(), "Luke");
}

#[test]
fn test_attribute_values() {
    let query = query_html(MOCK).unwrap();
    assert_eq!(query.find(".bar a").unwrap().attr("href"), Ok(Some("/luke")));
    assert_eq!(query.find(".bar a").unwrap().href(), Ok(Some("/luke")));
    assert_eq!(query.find(".foo a").unwrap().href(), Err(Error::NoElement));
    assert_eq!(query.find(".zed a").unwrap().href(), Ok(None));

    let items = query.find(".foo ul li").unwrap();
    assert_eq!(items.eq(0).attr("key"), Ok(Some("hello")));
    assert_eq!(items.first().attr("key"), Ok(Some("hello")));
    assert_eq!(items.last().text(), Ok("World!".to_string()));
    assert_eq!(items.eq(5).text(), Err(Error::NoElement));
    assert_eq!(
        items.eq(5).text().unwrap_err().to_string(),
        "No element found"
    );
}

#[test]
fn test_class_names() {
    let query = query_html(MOCK).unwrap();
    assert_eq!(query.find(".zed").unwrap().has_class("ted"), Ok(true));
    assert_eq!(query.find(".zed").unwrap().has_class("tom"), Ok(false));
    // Substring containment, not a class list lookup
    assert_eq!(query.find(".ted").unwrap().has_class("ed t"), Ok(true));
}

#[test]
fn test_node_properties() {
    let query = query_html(MOCK).unwrap();
    assert_eq!(query.find(".foo ul").unwrap().children().len(), 2);
    assert_eq!(query.find(".foo ul").unwrap().name(), Ok("ul"));
    assert_eq!(query.find("div").unwrap().children().len(), 3);
}

#[test]
fn test_iterate_over_elements() {
    let query = query_html(MOVIES).unwrap();
    let titles = query
        .find("h3.title span")
        .unwrap()
        .map(|el| el.text().unwrap())
        .join(", ");
    assert_eq!(
        titles,
        "Star Wars: The Rise of Skywalker, Solo: A Star Wars Story, Star Wars: The Last Jedi, \
         Rogue One: A Star Wars Story, Star Wars: The Force Awakens, Star Wars: Return of the Jedi, \
         Star Wars: The Empire Strikes Back, Star Wars: A New Hope, Star Wars: Revenge of the Sith, \
         Star Wars: Attack of the Clones, Star Wars: The Phantom Menace"
    );
}

#[test]
fn test_missing_attribute_is_none() {
    let query =
        query_html(r#"<div><div class="foo"><ul><li>Hello</li><li>World!</li></ul></div></div>"#)
            .unwrap();
    assert_eq!(query.find(".foo").unwrap().text(), Ok("HelloWorld!".to_string()));
    assert_eq!(query.find(".foo ul li").unwrap().first().attr("key"), Ok(None));
}

#[test]
fn test_empty_result() {
    let query = query_html(MOCK).unwrap();
    let missing = query.find(".missing").unwrap();
    assert!(missing.is_empty());
    assert_eq!(missing.attr("x"), Err(Error::NoElement));
    assert!(missing.last().node().is_none());
    assert!(missing.map(|e| e.name()).is_empty());
}

#[test]
fn test_children_skip_text_nodes() {
    let query = query_html("<div><div>1</div>loose text<div>2</div><div>3</div></div>").unwrap();
    let children = query.find("div").unwrap().children();
    assert_eq!(children.len(), 3);
    assert_eq!(children[2].text(), Ok("3".to_string()));
}

#[test]
fn test_tag_names_are_case_sensitive() {
    let query = query_html("<DIV>shout</DIV><div>quiet</div>").unwrap();
    assert_eq!(query.find("div").unwrap().len(), 1);
    assert_eq!(query.find("DIV").unwrap().text(), Ok("shout".to_string()));
}

#[test]
fn test_only_first_group_is_used() {
    let query = query_html(MOCK).unwrap();
    let found = query.find("li, a").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|e| e.name() == Ok("li")));
    // Later groups are still parsed
    assert!(matches!(
        query.find("li, a >"),
        Err(Error::Parse {
            input: Input::Selector,
            ..
        })
    ));
}

#[test]
fn test_unsupported_tokens() {
    let query = query_html(MOCK).unwrap();
    assert_eq!(
        query.find("#main").unwrap_err(),
        Error::UnsupportedSelectorToken(token!(#main))
    );
    let err = query.find("ul > li").unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedSelectorToken(Combinator::Child.into())
    );
    assert_eq!(err.to_string(), "Unsupported selector token:  > ");
    // The root is visited even when the document is empty
    let empty = query_html("").unwrap();
    assert!(matches!(
        empty.find("li:first-child"),
        Ok(ref s) if s.is_empty()
    ));
    assert!(empty.find("*").is_err());
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        query_html(r#"<p>ok</p><div class="open"#).unwrap_err(),
        Error::Parse {
            input: Input::Html,
            offset: 9,
            kind: "unexpected input".to_string(),
        }
    );
    let query = query_html(MOCK).unwrap();
    assert!(matches!(
        query.find("a >"),
        Err(Error::Parse {
            input: Input::Selector,
            offset: 2,
            ..
        })
    ));
    assert!(matches!(
        query.find(""),
        Err(Error::Parse {
            input: Input::Selector,
            offset: 0,
            ..
        })
    ));
}

#[test]
fn test_markup_quirks() {
    let query = query_html(r#"<div><a href=/search?q=star class="x"id="y">Go</a></div>"#).unwrap();
    let link = query.find("div a").unwrap();
    assert_eq!(link.href(), Ok(Some("/search?q=star")));
    assert_eq!(link.attr("id"), Ok(Some("y")));

    let query = query_html("<div><script>var x;</SCRIPT><p>after</p></div>").unwrap();
    assert_eq!(query.find("div p").unwrap().text(), Ok("after".to_string()));
    assert_eq!(query.find("script").unwrap().text(), Ok("var x;".to_string()));

    let query = query_html("<p>1 </ 2</p>").unwrap();
    assert_eq!(query.find("p").unwrap().text(), Ok("1 </ 2".to_string()));
}

#[test]
fn test_deeply_nested_document() {
    let depth = 5000;
    let text = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let query = query_html(&text).unwrap();
    let found = query.find("div").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.text(), Ok("x".to_string()));
    assert_eq!(query.find("div div").unwrap().len(), 1);
}

#[test]
fn test_class_attribute_tokens() {
    let query = query_html(r#"<p class="foo">1</p><p class="a" class="b">2</p><p>3</p>"#).unwrap();
    // Any selector on `class` is a substring test, whatever its operator
    assert_eq!(query.find("[class=oo]").unwrap().text(), Ok("1".to_string()));
    assert_eq!(query.find("[class^=oo]").unwrap().len(), 1);
    assert_eq!(query.find("[class]").unwrap().len(), 2);

    let second = query.find(".b").unwrap();
    assert_eq!(second.text(), Ok("2".to_string()));
    assert_eq!(second.attr("class"), Ok(Some("a")));
    assert_eq!(second.has_class("b"), Ok(true));
}

#[test]
fn test_shared_between_threads() {
    let query = query_html(MOVIES).unwrap();
    let counts: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = ["h3.title span", "li.film", "p.year", "nav a"]
            .into_iter()
            .map(|selector| {
                let query = &query;
                s.spawn(move || query.find(selector).map(|found| found.len()))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });
    assert_eq!(counts, vec![11, 11, 11, 2]);
}

// Generated documents, checked against a matcher written independently of the
// one under test

type Compound = (Option<&'static str>, Option<&'static str>);

fn element(name: &str, class: Option<&str>, children: Vec<DOMElement>) -> DOMElement {
    DOMElement::new(
        name,
        class.map(|c| DOMAttributes(vec![("class".to_string(), c.to_string())])),
        children.into_iter().map(DOMContent::from).collect(),
    )
}

fn arb_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["div", "ul", "li", "span"])
}

fn arb_class() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec!["foo", "bar", "foo bar", "food"]))
}

fn arb_element() -> impl Strategy<Value = DOMElement> {
    let leaf = (arb_name(), arb_class()).prop_map(|(n, c)| element(n, c, vec![]));
    leaf.prop_recursive(4, 48, 4, |inner| {
        (arb_name(), arb_class(), prop::collection::vec(inner, 0..4))
            .prop_map(|(n, c, children)| element(n, c, children))
    })
}

fn arb_selector() -> impl Strategy<Value = (Vec<Compound>, String)> {
    let compound = (
        prop::option::of(arb_name()),
        prop::option::of(prop::sample::select(vec!["foo", "bar", "oo"])),
    )
        .prop_filter("compound needs a tag or a class", |(t, c)| {
            t.is_some() || c.is_some()
        });
    prop::collection::vec(compound, 1..4).prop_map(|compounds| {
        let text = compounds
            .iter()
            .map(|(t, c)| {
                format!(
                    "{}{}",
                    t.unwrap_or(""),
                    c.map(|c| format!(".{}", c)).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        (compounds, text)
    })
}

fn compound_holds(elt: &DOMElement, (tag, class): &Compound) -> bool {
    tag.map_or(true, |t| elt.name == t)
        && class.map_or(true, |c| {
            elt.get_attribute("class").map_or(false, |v| v.contains(c))
        })
}

/// The last compound must hold for `elt`, the others for some chain of its
/// ancestors, outermost first
fn satisfies(ancestors: &[&DOMElement], elt: &DOMElement, compounds: &[Compound]) -> bool {
    let Some((last, init)) = compounds.split_last() else {
        return false;
    };
    if !compound_holds(elt, last) {
        return false;
    }
    let mut pending = init.iter().peekable();
    for ancestor in ancestors {
        if let Some(c) = pending.peek() {
            if compound_holds(ancestor, c) {
                pending.next();
            }
        }
    }
    pending.peek().is_none()
}

/// Every element with its ancestors, in document order
fn preorder<'a>(
    elt: &'a DOMElement,
    ancestors: &mut Vec<&'a DOMElement>,
    out: &mut Vec<(&'a DOMElement, Vec<&'a DOMElement>)>,
) {
    out.push((elt, ancestors.clone()));
    ancestors.push(elt);
    for child in elt.elements() {
        preorder(child, ancestors, out);
    }
    ancestors.pop();
}

proptest! {
    #[test]
    fn matches_are_ordered_and_satisfy_selector(
        roots in prop::collection::vec(arb_element(), 1..3),
        generated in arb_selector(),
    ) {
        let (compounds, selector) = generated;
        let query = Query::from(Document {
            contents: roots.into_iter().map(DOMContent::from).collect(),
        });
        let mut order = Vec::new();
        for root in &query.document().contents {
            if let DOMContent::Element(elt) = root {
                preorder(elt, &mut Vec::new(), &mut order);
            }
        }

        let found = query.find(&selector).unwrap();
        let mut previous = None;
        for el in found.iter() {
            let node = el.node().unwrap();
            let position = order.iter().position(|(e, _)| std::ptr::eq(*e, node)).unwrap();
            prop_assert!(previous.map_or(true, |p| position > p));
            previous = Some(position);
            prop_assert!(satisfies(&order[position].1, node, &compounds));
        }
    }

    #[test]
    fn single_compound_finds_outermost_matches(
        roots in prop::collection::vec(arb_element(), 1..3),
        generated in arb_selector(),
    ) {
        let (compounds, selector) = generated;
        let compound = &compounds[0];
        let selector = selector.split(' ').next().unwrap_or_default().to_string();
        let query = Query::from(Document {
            contents: roots.into_iter().map(DOMContent::from).collect(),
        });
        let mut order = Vec::new();
        for root in &query.document().contents {
            if let DOMContent::Element(elt) = root {
                preorder(elt, &mut Vec::new(), &mut order);
            }
        }
        let expected = order
            .iter()
            .filter(|(e, ancestors)| {
                compound_holds(e, compound) && !ancestors.iter().any(|a| compound_holds(a, compound))
            })
            .count();
        prop_assert_eq!(query.find(&selector).unwrap().len(), expected);
    }
}
