use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_till, take_till1, take_until, take_while},
    character::complete::{anychar, char, multispace0, satisfy},
    combinator::{map, not, opt, peek, recognize, value, verify},
    multi::{many0, many_till},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::*;
use tracing::trace;

/// Elements which never have contents or a closing tag
static VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose contents are kept verbatim as a single text node
static RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Deepest nesting kept in the tree. A tag opened any deeper first closes the
/// innermost open element, so it lands beside it instead of inside it.
pub const MAX_DEPTH: usize = 512;

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// A single piece of markup, before nesting is worked out
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open(&'a str, DOMAttributes),
    Close(&'a str),
    /// An element which can't contain further markup: void, self-closing or raw text
    Complete(DOMElement),
    Text(&'a str),
    /// Comments and declarations
    Skipped,
}

/// Parse a complete document. Closing tags which match no open element are
/// skipped; anything left unparsed is returned as the remaining input.
pub fn document(input: &str) -> IResult<&str, Document> {
    let (input, tokens) = many0(token)(input)?;
    Ok((input, build_tree(tokens)))
}

#[cfg(test)]
#[test]
fn test_document_fragments() {
    let (rest, doc) = document("\n<p>one</p>\n</div><p>two</p>").unwrap();
    assert_eq!(rest, "");
    let target: Vec<DOMContent> = vec![
        "\n".into(),
        DOMElement::new("p", None, vec!["one".into()]).into(),
        "\n".into(),
        DOMElement::new("p", None, vec!["two".into()]).into(),
    ];
    assert_eq!(doc.contents, target);
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Skipped, comment),
        value(Token::Skipped, declaration),
        map(close_tag, Token::Close),
        element_start,
        map(text, Token::Text),
        map(stray_angle_bracket, Token::Text),
    ))(input)
}

/// Nest the tokens with a stack of open elements.
///
/// A closing tag closes the innermost open element of that name, along with
/// everything opened inside it, so `<li>a<li>b</li>` nests rather than failing.
fn build_tree(tokens: Vec<Token<'_>>) -> Document {
    let mut root = Vec::new();
    let mut open: Vec<DOMElement> = Vec::new();
    for token in tokens {
        match token {
            Token::Open(name, attributes) => {
                if open.len() == MAX_DEPTH {
                    close_implicitly(&mut open, &mut root);
                }
                open.push(DOMElement::new(name, Some(attributes), vec![]));
            }
            Token::Close(name) => {
                let matching = open.iter().rposition(|e| e.name.eq_ignore_ascii_case(name));
                match matching {
                    Some(at) => {
                        while open.len() > at + 1 {
                            close_implicitly(&mut open, &mut root);
                        }
                        close_innermost(&mut open, &mut root);
                    }
                    None => trace!(element = name, "skipping stray closing tag"),
                }
            }
            Token::Complete(elt) => push_content(innermost(&mut open, &mut root), elt.into()),
            Token::Text(text) => push_content(innermost(&mut open, &mut root), text.into()),
            Token::Skipped => {}
        }
    }
    while !open.is_empty() {
        close_implicitly(&mut open, &mut root);
    }
    Document { contents: root }
}

/// Contents of the innermost open element, or the root when nothing is open
fn innermost<'t>(open: &'t mut [DOMElement], root: &'t mut Vec<DOMContent>) -> &'t mut Vec<DOMContent> {
    match open.last_mut() {
        Some(elt) => &mut elt.contents,
        None => root,
    }
}

fn close_innermost(open: &mut Vec<DOMElement>, root: &mut Vec<DOMContent>) {
    if let Some(elt) = open.pop() {
        innermost(open, root).push(elt.into());
    }
}

fn close_implicitly(open: &mut Vec<DOMElement>, root: &mut Vec<DOMContent>) {
    if let Some(elt) = open.last() {
        trace!(element = elt.name.as_str(), "closing element implicitly");
    }
    close_innermost(open, root);
}

/// Append to `contents`, joining adjacent text nodes, which appear when a
/// literal `<` or a comment splits a run of text
fn push_content(contents: &mut Vec<DOMContent>, node: DOMContent) {
    if let DOMContent::Text(next) = &node {
        if let Some(DOMContent::Text(prev)) = contents.last_mut() {
            prev.push_str(next);
            return;
        }
    }
    contents.push(node);
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

/// `<!DOCTYPE html>`, `<?xml ...?>` and friends
fn declaration(input: &str) -> IResult<&str, &str> {
    preceded(
        not(tag("<!--")),
        delimited(alt((tag("<!"), tag("<?"))), take_until(">"), char('>')),
    )(input)
}

#[cfg(test)]
#[test]
fn test_skipped_markup() {
    let (rest, doc) = document("<!DOCTYPE html><!-- <p>hidden</p> --><br>").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        doc.contents,
        vec![DOMContent::Element(DOMElement::new("br", None, vec![]))]
    );
}

/// Parse the text between two tags
fn text(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == '<')(input)
}

/// A `<` which cannot start any markup is plain text, as is a `</` which
/// doesn't start a closing tag
fn stray_angle_bracket(input: &str) -> IResult<&str, &str> {
    alt((
        terminated(
            tag("<"),
            not(satisfy(|c: char| {
                c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?'
            })),
        ),
        preceded(not(close_tag), tag("</")),
    ))(input)
}

#[cfg(test)]
#[test]
fn test_text_with_angle_bracket() {
    let (rest, doc) = document("<p>1 < 2</p>").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        doc.contents,
        vec![DOMContent::Element(DOMElement::new("p", None, vec!["1 < 2".into()]))]
    );

    let (rest, doc) = document("<p>1 </ 2</p>").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        doc.contents,
        vec![DOMContent::Element(DOMElement::new("p", None, vec!["1 </ 2".into()]))]
    );
}

/// Attempt to parse a string as a valid tag name
fn tag_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')),
    ))(input)
}

/// Parse a tag in the form `</name>`, returning `name`
fn close_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), tag_name, pair(multispace0, char('>')))(input)
}

/// Parse a tag in the form `<name attr=value ...>` or `<name ... />`, returning
/// the name, the attributes and whether the tag closed itself
fn open_tag(input: &str) -> IResult<&str, (&str, DOMAttributes, bool)> {
    let (rest, (_, name, attrs, _, closing, _)) = tuple((
        char('<'),
        tag_name,
        many0(preceded(multispace0, attribute)),
        multispace0,
        opt(char('/')),
        char('>'),
    ))(input)?;
    let attributes = DOMAttributes(
        attrs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    Ok((rest, (name, attributes, closing.is_some())))
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    assert_eq!(
        open_tag("<div>").unwrap(),
        ("", ("div", DOMAttributes::empty(), false))
    );
    assert_eq!(
        open_tag("<div class=nothing>").unwrap(),
        ("", ("div", crate::attributes!(class => nothing), false))
    );
    assert_eq!(
        open_tag(r#"<div attr1 attr2=two attr3='three' attr4="number four">"#).unwrap(),
        (
            "",
            (
                "div",
                crate::attributes!(attr1 => "", attr2 => two, attr3 => three, attr4 => "number four"),
                false
            )
        )
    );
    assert_eq!(
        open_tag(r#"<img src="a.png" />"#).unwrap(),
        ("", ("img", crate::attributes!(src => "a.png"), true))
    );
    assert_eq!(
        open_tag(r#"<div class="a"id="b">"#).unwrap(),
        ("", ("div", crate::attributes!(class => a, id => b), false))
    );
    assert_eq!(
        open_tag("<a href=/search?q=star>").unwrap(),
        ("", ("a", crate::attributes!(href => "/search?q=star"), false))
    );
}

/// Parse an open tag. Elements which can't hold markup are parsed whole,
/// including the verbatim contents and closing tag of raw text elements.
fn element_start(input: &str) -> IResult<&str, Token<'_>> {
    let (input, (name, attributes, self_closing)) = open_tag(input)?;
    if self_closing || is_void(name) {
        return Ok((
            input,
            Token::Complete(DOMElement::new(name, Some(attributes), vec![])),
        ));
    }
    if is_raw_text(name) {
        let (input, raw) = raw_text(name, input)?;
        let (input, _) = verify(close_tag, |close: &str| close.eq_ignore_ascii_case(name))(input)?;
        let contents = if raw.is_empty() { vec![] } else { vec![raw.into()] };
        return Ok((
            input,
            Token::Complete(DOMElement::new(name, Some(attributes), contents)),
        ));
    }
    Ok((input, Token::Open(name, attributes)))
}

/// Everything up to `</name`, whatever its case
fn raw_text<'a>(name: &str, input: &'a str) -> IResult<&'a str, &'a str> {
    let end = format!("</{}", name);
    let result = recognize(many_till(anychar, peek(tag_no_case(end.as_str()))))(input);
    result
}

#[cfg(test)]
#[test]
fn test_node_parse() {
    let (rest, doc) = document(r#"<html><div class=nothing><h1></h1></div></html>"#).unwrap();
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new(
            "div",
            Some(crate::attributes!(class => nothing)),
            vec![DOMElement::new("h1", None, vec![]).into()],
        )
        .into()],
    );
    assert_eq!(rest, "");
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);

    let (rest, doc) = document(r#"<html><h1>Hello, world</h1></html>"#).unwrap();
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("h1", None, vec!["Hello, world".into()]).into()],
    );
    assert_eq!(rest, "");
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);
}

#[cfg(test)]
#[test]
fn test_implicit_close() {
    let (_, doc) = document("<ul><li>a<li>b</li></ul>").unwrap();
    let target = DOMElement::new(
        "ul",
        None,
        vec![DOMElement::new(
            "li",
            None,
            vec![
                "a".into(),
                DOMElement::new("li", None, vec!["b".into()]).into(),
            ],
        )
        .into()],
    );
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);

    // A closing tag with nothing open to close is dropped
    let (_, doc) = document("<div><p>a</span>b</div>").unwrap();
    let target = DOMElement::new(
        "div",
        None,
        vec![DOMElement::new("p", None, vec!["ab".into()]).into()],
    );
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);

    let (_, doc) = document("<div><p>unclosed").unwrap();
    let target = DOMElement::new(
        "div",
        None,
        vec![DOMElement::new("p", None, vec!["unclosed".into()]).into()],
    );
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);
}

#[cfg(test)]
#[test]
fn test_deep_nesting() {
    let depth = 5000;
    let text = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let (rest, doc) = document(&text).unwrap();
    assert_eq!(rest, "");

    let mut levels = 0;
    let mut elt = match &doc.contents[..] {
        [DOMContent::Element(elt)] => elt,
        other => panic!("expected a single <div>, got {} nodes", other.len()),
    };
    while let Some(child) = elt.elements().last() {
        levels += 1;
        elt = child;
    }
    assert_eq!(levels + 1, MAX_DEPTH);
    assert_eq!(elt.contents, vec![DOMContent::from("x")]);
}

#[cfg(test)]
#[test]
fn test_raw_text() {
    let data = r#"<script>if (a < b && c > d) { x = "</p>"; }</script>"#;
    let target = DOMElement::new(
        "script",
        None,
        vec![r#"if (a < b && c > d) { x = "</p>"; }"#.into()],
    );
    let (rest, doc) = document(data).unwrap();
    assert_eq!(rest, "");
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);

    let (rest, doc) = document("<div><script>x</SCRIPT></div>").unwrap();
    let target = DOMElement::new(
        "div",
        None,
        vec![DOMElement::new("script", None, vec!["x".into()]).into()],
    );
    assert_eq!(rest, "");
    assert_eq!(doc.contents, vec![DOMContent::Element(target)]);

    let (rest, doc) = document("<style></style>").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        doc.contents,
        vec![DOMContent::Element(DOMElement::new("style", None, vec![]))]
    );
}

#[cfg(test)]
#[test]
fn test_parse_malformed() {
    let (rest, _) = document(r#"<div class="open"#).unwrap();
    assert_eq!(rest, r#"<div class="open"#);
    let (rest, _) = document("<p>text<!-- never closed</p>").unwrap();
    assert_eq!(rest, "<!-- never closed</p>");
    let (rest, _) = document("<script>never closed").unwrap();
    assert_eq!(rest, "<script>never closed");
    assert!(open_tag("<---></--->").is_err());
}

// Attribute parsing below

fn double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\''))(input)
}

fn unquoted(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n>")(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((double_quoted, single_quoted, unquoted))(input)
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

/// `name`, `name=value`, `name = "value"`; a bare name has an empty value
fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, name) = attribute_name(input)?;
    let (input, value) = opt(preceded(
        tuple((multispace0, char('='), multispace0)),
        attribute_value,
    ))(input)?;
    Ok((input, (name, value.unwrap_or(""))))
}

#[cfg(test)]
#[test]
fn test_attribute_parse() {
    assert_eq!(attribute("checked"), Ok(("", ("checked", ""))));
    assert_eq!(attribute(r#"key="hello""#), Ok(("", ("key", "hello"))));
    assert_eq!(attribute(r#"title = 'it"s'"#), Ok(("", ("title", r#"it"s"#))));
    assert_eq!(attribute(r#"class="""#), Ok(("", ("class", ""))));
    assert_eq!(attribute("href=/luke>"), Ok((">", ("href", "/luke"))));
    assert_eq!(attribute("href=/?a=1&b=2"), Ok(("", ("href", "/?a=1&b=2"))));
}
