//! # Parser - Event-Based View Construction
//!
//! The parser walks the token stream once and emits a flat list of
//! [`Event`]s. Tags are matched against a stack of open element names while
//! events are produced, so every error (a stray close tag, a close tag that
//! does not match, an element left open) is reported with the byte offset
//! of the token that caused it. The [`Sink`] then folds the balanced event
//! list into [`ViewNode`]s.
//!
//! Void elements (`<br>`, `<img>`, ...) never take a close tag; any element
//! may be written self-closing (`<td/>`).
//!
//! ## Public API
//!
//! ```
//! use vellum_markup::parse;
//!
//! let nodes = parse("<p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(nodes.len(), 1);
//! ```
//!
//! [`ViewNode`]: crate::view::ViewNode

pub mod event;
pub mod sink;

use crate::error::{MarkupError, Result};
use crate::lexer::{Token, TokenKind, close_tag_name, decode, lex, parse_open_tag};
use crate::view::ViewNode;
use event::Event;
use sink::Sink;

/// Elements that have no content and no close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// The parser state machine.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    open: Vec<String>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Parse the tokens and return the top-level nodes.
    pub fn parse(mut self) -> Result<Vec<ViewNode>> {
        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Text => self.events.push(Event::Text(decode(token.text))),
                TokenKind::OpenTag => self.open_tag(token)?,
                TokenKind::CloseTag => self.close_tag(token)?,
            }
            self.pos += 1;
        }
        if let Some(tag) = self.open.pop() {
            return Err(MarkupError::Unclosed { tag });
        }
        Ok(Sink::new(self.events).finish())
    }

    fn current(&self) -> Option<&'t Token<'input>> {
        self.tokens.get(self.pos)
    }

    fn open_tag(&mut self, token: &Token<'input>) -> Result<()> {
        let tag = parse_open_tag(token)?;
        let closes_itself = tag.self_closing || is_void(&tag.name);
        self.events.push(Event::Open {
            tag: tag.name.clone(),
            attributes: tag.attributes,
        });
        if closes_itself {
            self.events.push(Event::Close);
        } else {
            self.open.push(tag.name);
        }
        Ok(())
    }

    fn close_tag(&mut self, token: &Token<'input>) -> Result<()> {
        let name = close_tag_name(token);
        match self.open.pop() {
            Some(expected) if expected.eq_ignore_ascii_case(name) => {
                self.events.push(Event::Close);
                Ok(())
            }
            Some(expected) => Err(MarkupError::MismatchedClose {
                expected,
                found: name.to_string(),
                offset: token.offset,
            }),
            None => Err(MarkupError::UnbalancedClose {
                tag: name.to_string(),
                offset: token.offset,
            }),
        }
    }
}

/// Parse markup into its top-level nodes.
pub fn parse(source: &str) -> Result<Vec<ViewNode>> {
    let tokens = lex(source)?;
    Parser::new(&tokens).parse()
}

/// Parse markup that must consist of exactly one element, ignoring
/// whitespace around it.
pub fn parse_element(source: &str) -> Result<ViewNode> {
    let mut nodes: Vec<ViewNode> = parse(source)?
        .into_iter()
        .filter(|node| !node.is_blank())
        .collect();
    match (nodes.pop(), nodes.is_empty()) {
        (Some(node @ ViewNode::Element(_)), true) => Ok(node),
        (Some(_), true) => Err(MarkupError::NotASingleRoot { count: 1 }),
        (None, _) => Err(MarkupError::NotASingleRoot { count: 0 }),
        (Some(_), false) => Err(MarkupError::NotASingleRoot {
            count: nodes.len() + 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parse_empty_input() {
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn parse_decodes_entities() {
        assert_eq!(
            parse("<p>a &lt; b &amp;&amp; c</p>").unwrap(),
            vec![ViewNode::element("p", [ViewNode::text("a < b && c")])]
        );
    }

    #[test]
    fn void_and_self_closing_elements_need_no_close() {
        assert_eq!(
            parse("<p>a<br>b<span/></p>").unwrap(),
            vec![ViewNode::element(
                "p",
                [
                    ViewNode::text("a"),
                    ViewNode::element("br", []),
                    ViewNode::text("b"),
                    ViewNode::element("span", []),
                ]
            )]
        );
    }

    #[rstest]
    #[case("</p>", MarkupError::UnbalancedClose { tag: "p".into(), offset: 0 })]
    #[case("<p><b></p>", MarkupError::MismatchedClose { expected: "b".into(), found: "p".into(), offset: 6 })]
    #[case("<p>text", MarkupError::Unclosed { tag: "p".into() })]
    fn unbalanced_markup_is_rejected(#[case] input: &str, #[case] expected: MarkupError) {
        assert_eq!(parse(input), Err(expected));
    }

    #[test]
    fn parse_element_ignores_surrounding_whitespace() {
        let node = parse_element("\n  <div>x</div>\n").unwrap();
        assert_eq!(node, ViewNode::element("div", [ViewNode::text("x")]));
    }

    #[rstest]
    #[case("", 0)]
    #[case("<p></p><p></p>", 2)]
    #[case("just text", 1)]
    fn parse_element_requires_one_element(#[case] input: &str, #[case] count: usize) {
        assert_eq!(parse_element(input), Err(MarkupError::NotASingleRoot { count }));
    }
}
