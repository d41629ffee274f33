use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_while};
use nom::character::complete::{char, multispace0, multispace1, satisfy};
use nom::combinator::{map, opt, recognize, value, verify};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use super::*;

/// Parse a comma separated list of selectors, returning one token sequence per group
pub fn selector_list(input: &str) -> IResult<&str, Vec<Vec<SelectorToken>>> {
    delimited(
        multispace0,
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            complex_selector,
        ),
        multispace0,
    )(input)
}

#[cfg(test)]
#[test]
fn test_selector_list() {
    let i = " h1 , .title span ";
    let target = vec![
        vec![token!(h1)],
        vec![
            token!(.title),
            Combinator::Descendant.into(),
            token!(span),
        ],
    ];
    assert_eq!(selector_list(i), Ok(("", target)));
}

/// Compound selectors joined by combinators, flattened into one sequence
fn complex_selector(input: &str) -> IResult<&str, Vec<SelectorToken>> {
    let (input, mut tokens) = compound_selector(input)?;
    let (input, rest) = many0(pair(combinator, compound_selector))(input)?;
    for (comb, compound) in rest {
        tokens.push(comb.into());
        tokens.extend(compound);
    }
    Ok((input, tokens))
}

/// Explicit combinators may be surrounded by whitespace; otherwise whitespace
/// is itself the descendant combinator
fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        delimited(
            multispace0,
            alt((
                value(Combinator::Child, char('>')),
                value(Combinator::NextSibling, char('+')),
                value(Combinator::SubsequentSibling, char('~')),
            )),
            multispace0,
        ),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

#[cfg(test)]
#[test]
fn test_combinators() {
    assert_eq!(
        complex_selector("ul>li"),
        Ok(("", vec![token!(ul), token!(>), token!(li)]))
    );
    assert_eq!(
        complex_selector("h1 + p ~ p"),
        Ok(("", vec![token!(h1), token!(+), token!(p), token!(~), token!(p)]))
    );
    // A trailing combinator is left for the caller to reject
    assert_eq!(complex_selector("ul > "), Ok((" > ", vec![token!(ul)])));
}

/// A type or universal selector followed by any number of class, ID,
/// attribute and pseudo selectors. At least one part must be present.
fn compound_selector(input: &str) -> IResult<&str, Vec<SelectorToken>> {
    let (input, (head, tail)) = verify(
        pair(
            opt(alt((type_selector, universal_selector))),
            many0(alt((
                class_selector,
                id_selector,
                attribute_selector,
                pseudo_selector,
            ))),
        ),
        |(head, tail): &(Option<SelectorToken>, Vec<SelectorToken>)| {
            head.is_some() || !tail.is_empty()
        },
    )(input)?;
    Ok((input, head.into_iter().chain(tail).collect()))
}

#[cfg(test)]
#[test]
fn test_compound_selector() {
    assert_eq!(
        compound_selector("h3.title"),
        Ok(("", vec![token!(h3), token!(.title)]))
    );
    assert_eq!(
        compound_selector("*#main.a.b"),
        Ok(("", vec![token!(*), token!(#main), token!(.a), token!(.b)]))
    );
    assert!(compound_selector("").is_err());
    assert!(compound_selector(", a").is_err());
}

fn type_selector(input: &str) -> IResult<&str, SelectorToken> {
    map(identifier, |name: &str| SelectorToken::tag(name))(input)
}

fn universal_selector(input: &str) -> IResult<&str, SelectorToken> {
    value(SelectorToken::Universal, char('*'))(input)
}

fn class_selector(input: &str) -> IResult<&str, SelectorToken> {
    map(preceded(char('.'), identifier), |name: &str| {
        SelectorToken::class(name)
    })(input)
}

fn id_selector(input: &str) -> IResult<&str, SelectorToken> {
    map(preceded(char('#'), identifier), |name: &str| {
        SelectorToken::id(name)
    })(input)
}

/// `[name]`, `[name=value]`, `[name~="value"]` and the other matchers
fn attribute_selector(input: &str) -> IResult<&str, SelectorToken> {
    let (input, (_, _, name, _, matcher, _, _)) = tuple((
        char('['),
        multispace0,
        identifier,
        multispace0,
        opt(pair(
            attribute_action,
            preceded(multispace0, attribute_value),
        )),
        multispace0,
        char(']'),
    ))(input)?;
    let (action, value) = matcher.unwrap_or((AttributeAction::Exists, ""));
    Ok((
        input,
        SelectorToken::Attribute(AttributeSelector {
            name: name.to_string(),
            action,
            value: value.to_string(),
        }),
    ))
}

fn attribute_action(input: &str) -> IResult<&str, AttributeAction> {
    alt((
        value(AttributeAction::Includes, tag("~=")),
        value(AttributeAction::DashMatch, tag("|=")),
        value(AttributeAction::Prefix, tag("^=")),
        value(AttributeAction::Suffix, tag("$=")),
        value(AttributeAction::Substring, tag("*=")),
        value(AttributeAction::NotEqual, tag("!=")),
        value(AttributeAction::Equals, tag("=")),
    ))(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
        identifier,
    ))(input)
}

#[cfg(test)]
#[test]
fn test_attribute_selector() {
    let attr = |name: &str, action, value: &str| {
        SelectorToken::Attribute(AttributeSelector {
            name: name.to_string(),
            action,
            value: value.to_string(),
        })
    };
    assert_eq!(
        attribute_selector("[href]"),
        Ok(("", attr("href", AttributeAction::Exists, "")))
    );
    assert_eq!(
        attribute_selector(r#"[ href ^= "/luke" ]"#),
        Ok(("", attr("href", AttributeAction::Prefix, "/luke")))
    );
    assert_eq!(
        attribute_selector("[lang|=en]"),
        Ok(("", attr("lang", AttributeAction::DashMatch, "en")))
    );
    assert_eq!(
        attribute_selector("[class='foo bar']"),
        Ok(("", attr("class", AttributeAction::Equals, "foo bar")))
    );
    assert!(attribute_selector("[href").is_err());
}

/// `:name`, `:name(argument)` or `::name`
fn pseudo_selector(input: &str) -> IResult<&str, SelectorToken> {
    alt((
        map(preceded(tag("::"), identifier), |name: &str| {
            SelectorToken::PseudoElement(name.to_string())
        }),
        map(
            preceded(
                char(':'),
                pair(
                    identifier,
                    opt(delimited(char('('), take_till(|c: char| c == ')'), char(')'))),
                ),
            ),
            |(name, argument): (&str, Option<&str>)| SelectorToken::PseudoClass {
                name: name.to_string(),
                argument: argument.map(|a| a.trim().to_string()),
            },
        ),
    ))(input)
}

#[cfg(test)]
#[test]
fn test_pseudo_selector() {
    assert_eq!(
        pseudo_selector(":nth-child( 2n+1 )"),
        Ok((
            "",
            SelectorToken::PseudoClass {
                name: "nth-child".to_string(),
                argument: Some("2n+1".to_string()),
            }
        ))
    );
    assert_eq!(
        pseudo_selector(":hover"),
        Ok((
            "",
            SelectorToken::PseudoClass {
                name: "hover".to_string(),
                argument: None,
            }
        ))
    );
    assert_eq!(
        pseudo_selector("::before"),
        Ok(("", SelectorToken::PseudoElement("before".to_string())))
    );
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

/// A CSS identifier, optionally starting with a single `-`
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        satisfy(is_name_start),
        take_while(is_name_char),
    )))(input)
}

#[cfg(test)]
#[test]
fn test_parse_ident() {
    assert_eq!(identifier("test"), Ok(("", "test")));
    assert_eq!(identifier("_test"), Ok(("", "_test")));
    assert_eq!(identifier("-webkit-box."), Ok((".", "-webkit-box")));
    assert!(identifier("--test").is_err());
    assert!(identifier("2col").is_err());
}
