//! # Lexer - Tokenizing Markup Source
//!
//! The first stage of reading markup: the source is cut into three kinds of
//! token with a [Logos] generated lexer.
//!
//! [Logos]: https://docs.rs/logos
//!
//! - `OpenTag`: `<p>`, `<span class="x">`, `<br/>`
//! - `CloseTag`: `</p>`
//! - `Text`: every run of characters that is not a tag
//!
//! Every byte of the input lands in exactly one token, so concatenating the
//! token texts gives the input back:
//!
//! ```
//! use vellum_markup::lexer::lex;
//!
//! let input = "<p>Hello <b>world</b></p>";
//! let tokens = lex(input).unwrap();
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! A tag token is lexed as a whole. Its inside (name and attributes) is
//! taken apart by a second, smaller lexer in [`parse_open_tag`], which keeps
//! the outer token set context-free: `=` or `"` in running text is just text.
//!
//! A `<` that does not start a well-formed tag is an error rather than text.

use logos::Logos;

use crate::error::{MarkupError, Result};

/// Token kinds produced by the outer lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name attr="value" ...>` or the self-closing `<name .../>`
    #[regex(
        r#"<[A-Za-z][A-Za-z0-9_:.-]*([ \t\r\n]+[^ \t\r\n=/>"'<]+([ \t\r\n]*=[ \t\r\n]*("[^"]*"|'[^']*'|[^ \t\r\n"'=<>`/]+))?)*[ \t\r\n]*/?>"#
    )]
    OpenTag,

    /// `</name>`
    #[regex(r"</[A-Za-z][A-Za-z0-9_:.-]*[ \t\r\n]*>")]
    CloseTag,

    /// Character data, entities still encoded
    #[regex(r"[^<]+")]
    Text,
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

/// Lex the input into a sequence of tokens.
pub fn lex(input: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text,
                offset: span.start,
            }),
            Err(()) => {
                return Err(MarkupError::UnexpectedCharacter {
                    found: text.to_string(),
                    offset: span.start,
                });
            }
        }
    }

    Ok(tokens)
}

/// Tokens inside an open tag, after the `<` and before the `>`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum AttrToken {
    #[regex(r#"[^ \t\r\n=/>"'<]+"#)]
    Name,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[token("/")]
    Slash,
}

/// The pieces of an open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub name: String,
    /// Attributes in source order, values entity-decoded.
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Take an `OpenTag` token apart.
pub fn parse_open_tag(token: &Token<'_>) -> Result<OpenTag> {
    let malformed = || MarkupError::MalformedTag {
        text: token.text.to_string(),
        offset: token.offset,
    };
    let inner = token
        .text
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .ok_or_else(malformed)?;

    let mut lexer = AttrToken::lexer(inner);
    let mut parts = Vec::new();
    while let Some(result) = lexer.next() {
        parts.push((result.map_err(|()| malformed())?, lexer.slice()));
    }
    let mut parts = parts.into_iter().peekable();

    let name = match parts.next() {
        Some((AttrToken::Name, text)) => text.to_string(),
        _ => return Err(malformed()),
    };

    let mut attributes = Vec::new();
    let mut self_closing = false;
    while let Some((kind, text)) = parts.next() {
        match kind {
            AttrToken::Name if !self_closing => {
                let value = if parts.next_if(|(k, _)| *k == AttrToken::Eq).is_some() {
                    match parts.next() {
                        Some((AttrToken::DoubleQuoted | AttrToken::SingleQuoted, quoted)) => {
                            decode(&quoted[1..quoted.len() - 1])
                        }
                        Some((AttrToken::Name, bare)) => decode(bare),
                        _ => return Err(malformed()),
                    }
                } else {
                    String::new()
                };
                attributes.push((text.to_string(), value));
            }
            AttrToken::Slash if !self_closing => self_closing = true,
            _ => return Err(malformed()),
        }
    }

    Ok(OpenTag {
        name,
        attributes,
        self_closing,
    })
}

/// Name of a `CloseTag` token.
pub fn close_tag_name<'a>(token: &Token<'a>) -> &'a str {
    token
        .text
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim_end()
}

/// Decode character references (`&amp;`, `&#60;`, ...).
pub fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
