//! Lexing and parsing: source text to a root `Block` of Values. This
//! module knows nothing about evaluation — it only turns characters into
//! [`Value`]s, producing a sequence of root-level values plus
//! per-element source locations for diagnostics.
//!
//! No external grammar crate covers Viro's small Rebol-style syntax, so
//! the scanner and recursive-descent builder are hand-written, following
//! the same `CodeRange`/token-position bookkeeping conventions the rest
//! of the crate uses for diagnostics.

mod lexer;

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::{error::Error, intern::intern, value::Value};
use lexer::{Lexer, Token};

/// One root-level value's source span, in byte offsets into the original
/// text — used for near-expression capture when the
/// evaluator wants to show surrounding source on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A parsed program: the root block plus one span per root-level element,
/// in the same order.
pub struct Parsed {
    pub root: Value,
    pub spans: Vec<Span>,
}

/// Parses `source` into a root [`Value::Block`].
pub fn parse(source: &str) -> Result<Parsed, Error> {
    let mut lexer = Lexer::new(source);
    let (items, spans) = parse_sequence(&mut lexer, None)?;
    Ok(Parsed { root: Value::block(items), spans })
}

/// Parses the elements up to a closing delimiter (`None` for end-of-input
/// at the top level, `Some(']')`/`Some(')')` for nested groups).
fn parse_sequence(lexer: &mut Lexer<'_>, closing: Option<char>) -> Result<(Vec<Value>, Vec<Span>), Error> {
    let mut items = Vec::new();
    let mut spans = Vec::new();
    loop {
        let start = lexer.position();
        match lexer.next_token()? {
            Token::Eof => {
                if closing.is_some() {
                    return Err(Error::invalid_operation("unterminated group: missing closing delimiter"));
                }
                return Ok((items, spans));
            }
            Token::BlockClose if closing == Some(']') => return Ok((items, spans)),
            Token::ParenClose if closing == Some(')') => return Ok((items, spans)),
            Token::BlockClose | Token::ParenClose => {
                return Err(Error::invalid_operation("unexpected closing delimiter"));
            }
            Token::BlockOpen => {
                let (inner, _) = parse_sequence(lexer, Some(']'))?;
                items.push(Value::block(inner));
                spans.push(Span { start, end: lexer.position() });
            }
            Token::ParenOpen => {
                let (inner, _) = parse_sequence(lexer, Some(')'))?;
                items.push(Value::paren(inner));
                spans.push(Span { start, end: lexer.position() });
            }
            other => {
                items.push(token_to_value(other)?);
                spans.push(Span { start, end: lexer.position() });
            }
        }
    }
}

fn token_to_value(token: Token) -> Result<Value, Error> {
    match token {
        Token::Integer(text) => i64::from_str(&text)
            .map(Value::Integer)
            .map_err(|_| Error::invalid_operation(&format!("malformed integer literal '{text}'"))),
        Token::Decimal(text) => BigDecimal::from_str(&text)
            .map(Value::Decimal)
            .map_err(|_| Error::invalid_operation(&format!("malformed decimal literal '{text}'"))),
        Token::StringLit(text) => Ok(Value::string(&text)),
        Token::BinaryLit(bytes) => Ok(Value::binary(bytes)),
        Token::Word(text) => Ok(Value::Word(intern(&text))),
        Token::SetWord(text) => Ok(Value::SetWord(intern(&text))),
        Token::GetWord(text) => Ok(Value::GetWord(intern(&text))),
        Token::LitWord(text) => Ok(Value::LitWord(intern(&text))),
        Token::BlockOpen | Token::BlockClose | Token::ParenOpen | Token::ParenClose | Token::Eof => {
            unreachable!("structural tokens are consumed by parse_sequence directly")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Vec<Value> {
        parse(src).unwrap().root.as_block().unwrap().snapshot()
    }

    #[test]
    fn parses_literals() {
        let items = parse_ok(r#"5 -3 1.5 "abc" #{DEAD} true none"#);
        assert_eq!(items[0], Value::Integer(5));
        assert_eq!(items[1], Value::Integer(-3));
        assert_eq!(items[2].as_decimal().unwrap().to_string(), "1.5");
        assert_eq!(items[3], Value::string("abc"));
        assert_eq!(items[4], Value::binary(vec![0xDE, 0xAD]));
        assert_eq!(items[5], Value::Word(intern("true")));
        assert_eq!(items[6], Value::Word(intern("none")));
    }

    #[test]
    fn parses_word_family() {
        let items = parse_ok("foo foo: :foo 'foo --loud");
        assert_eq!(items[0], Value::Word(intern("foo")));
        assert_eq!(items[1], Value::SetWord(intern("foo")));
        assert_eq!(items[2], Value::GetWord(intern("foo")));
        assert_eq!(items[3], Value::LitWord(intern("foo")));
        assert_eq!(items[4], Value::Word(intern("--loud")));
    }

    #[test]
    fn parses_nested_blocks_and_parens() {
        let items = parse_ok("[1 2 (3 + 4)]");
        let block = items[0].as_block().unwrap().snapshot();
        assert_eq!(block[0], Value::Integer(1));
        assert!(matches!(block[2], Value::Paren(_)));
    }

    #[test]
    fn infix_minus_needs_preceding_space() {
        let items = parse_ok("n - 1");
        assert_eq!(items[0], Value::Word(intern("n")));
        assert_eq!(items[1], Value::Word(intern("-")));
        assert_eq!(items[2], Value::Integer(1));
    }

    #[test]
    fn unterminated_block_is_an_error() {
        assert!(parse("[1 2").is_err());
    }

    #[test]
    fn string_escapes_decode() {
        let items = parse_ok(r#""a^"b^/c""#);
        assert_eq!(items[0], Value::string("a\"b\nc"));
    }
}
