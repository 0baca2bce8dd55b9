//! CSS streaming lexer: the token set needed to structurally parse
//! rulesets, at-rules (`@import`, `@media`, `@keyframes`) and nested
//! rules, per spec.md §4.5. Declaration *values* are lexed as opaque
//! runs up to the next `;`/`}` — this layer targets structural
//! extraction and pretty-printing, not full CSS value-grammar parsing
//! (spec.md §1 Non-goals).

use crate::lexer::core::{is_ident_continue, is_ident_start, Cursor, LexMode, LexState, Payload, StringEnd, Token};
use crate::registry::{common, css};
use crate::span::{RuleId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    LBrace,
    RBrace,
    Colon,
    Semicolon,
    Comma,
    AtKeyword,
    Ident,
    String,
    Hash,
    Number,
    Percentage,
    Delim,
    Whitespace,
    Comment,
    Invalid,
    Eof,
}

impl From<Kind> for RuleId {
    fn from(k: Kind) -> RuleId {
        match k {
            Kind::LBrace => css::LBRACE,
            Kind::RBrace => css::RBRACE,
            Kind::Colon => css::COLON,
            Kind::Semicolon => css::SEMICOLON,
            Kind::Comma | Kind::Hash | Kind::Number | Kind::Percentage | Kind::Delim => css::VALUE,
            Kind::AtKeyword => css::AT_RULE,
            Kind::Ident => css::IDENT,
            Kind::String => css::STRING,
            Kind::Whitespace => common::WHITESPACE,
            Kind::Comment => css::COMMENT,
            Kind::Invalid => common::INVALID,
            Kind::Eof => common::EOF,
        }
    }
}

pub fn tokenize_chunk<'a>(
    mut state: LexState,
    chunk: &'a str,
    base_offset: u32,
    is_final: bool,
) -> (Vec<Token<'a, Kind>>, LexState, usize) {
    let mut cursor = Cursor::new(chunk, base_offset);
    let mut tokens = Vec::new();

    if let LexMode::InString { quote, escaped } = state.mode {
        match cursor.scan_string_tail(quote, escaped) {
            StringEnd::Closed => {
                tokens.push(Token {
                    kind: Kind::String,
                    span: Span::new(state.token_start, cursor.abs(cursor.pos())),
                    depth: state.depth,
                    payload: Payload::None,
                });
                state.mode = LexMode::Top;
            }
            StringEnd::Open { escaped } => {
                state.mode = LexMode::InString { quote, escaped };
                return (tokens, state, chunk.len());
            }
        }
    } else if state.mode == LexMode::InBlockComment {
        match find_comment_end(chunk.as_bytes(), 0) {
            Some(end) => {
                cursor_seek(&mut cursor, end);
                tokens.push(Token {
                    kind: Kind::Comment,
                    span: Span::new(state.token_start, cursor.abs(cursor.pos())),
                    depth: state.depth,
                    payload: Payload::None,
                });
                state.mode = LexMode::Top;
            }
            None => return (tokens, state, chunk.len()),
        }
    }

    loop {
        match cursor.scan_run(true, |b| b.is_ascii_whitespace()) {
            Some((s, e)) if e > s => {
                // Whitespace is retained as a token (round-trip property
                // 1) but discarded by the structural scanner/parser.
                tokens.push(Token {
                    kind: Kind::Whitespace,
                    span: Span::new(base_offset + s as u32, base_offset + e as u32),
                    depth: state.depth,
                    payload: Payload::None,
                });
            }
            _ => {}
        }
        if cursor.is_eof() {
            break;
        }
        let start = cursor.pos();
        let b = cursor.peek().unwrap();
        match b {
            b'{' => {
                cursor.advance();
                state.depth += 1;
                tokens.push(simple(Kind::LBrace, start, &cursor, state.depth, base_offset));
            }
            b'}' => {
                cursor.advance();
                tokens.push(simple(Kind::RBrace, start, &cursor, state.depth, base_offset));
                state.depth = state.depth.saturating_sub(1);
            }
            b':' => {
                cursor.advance();
                tokens.push(simple(Kind::Colon, start, &cursor, state.depth, base_offset));
            }
            b';' => {
                cursor.advance();
                tokens.push(simple(Kind::Semicolon, start, &cursor, state.depth, base_offset));
            }
            b',' => {
                cursor.advance();
                tokens.push(simple(Kind::Comma, start, &cursor, state.depth, base_offset));
            }
            b'"' | b'\'' => {
                let quote = b;
                cursor.advance();
                match cursor.scan_string_tail(quote, false) {
                    StringEnd::Closed => {
                        tokens.push(Token {
                            kind: Kind::String,
                            span: Span::new(base_offset + start as u32, cursor.abs(cursor.pos())),
                            depth: state.depth,
                            payload: Payload::Text(cursor.slice_inner(start)),
                        });
                    }
                    StringEnd::Open { escaped } => {
                        state.mode = LexMode::InString { quote, escaped };
                        state.token_start = base_offset + start as u32;
                        return (tokens, state, start);
                    }
                }
            }
            b'/' if cursor.peek_at(1) == Some(b'*') => {
                cursor.advance();
                cursor.advance();
                match find_comment_end(chunk.as_bytes(), cursor.pos()) {
                    Some(end) => {
                        cursor_seek(&mut cursor, end);
                        tokens.push(Token {
                            kind: Kind::Comment,
                            span: Span::new(base_offset + start as u32, cursor.abs(cursor.pos())),
                            depth: state.depth,
                            payload: Payload::None,
                        });
                    }
                    None => {
                        state.mode = LexMode::InBlockComment;
                        state.token_start = base_offset + start as u32;
                        return (tokens, state, start);
                    }
                }
            }
            b'@' => {
                cursor.advance();
                match cursor.scan_run(is_final, is_ident_continue) {
                    Some((s, e)) => {
                        tokens.push(Token {
                            kind: Kind::AtKeyword,
                            span: Span::new(base_offset + start as u32, base_offset + e as u32),
                            depth: state.depth,
                            payload: Payload::Text(&chunk[s..e]),
                        });
                    }
                    None => return (tokens, state, start),
                }
            }
            b'#' => {
                cursor.advance();
                match cursor.scan_run(is_final, |b| b.is_ascii_alphanumeric()) {
                    Some((_, e)) => {
                        tokens.push(Token {
                            kind: Kind::Hash,
                            span: Span::new(base_offset + start as u32, base_offset + e as u32),
                            depth: state.depth,
                            payload: Payload::None,
                        });
                    }
                    None => return (tokens, state, start),
                }
            }
            b if b.is_ascii_digit() => match cursor.scan_run(is_final, |b| b.is_ascii_digit() || matches!(b, b'.')) {
                Some((s, e)) => {
                    let percent = cursor.eat(b'%');
                    tokens.push(Token {
                        kind: if percent { Kind::Percentage } else { Kind::Number },
                        span: Span::new(base_offset + s as u32, cursor.abs(cursor.pos())),
                        depth: state.depth,
                        payload: Payload::Text(&chunk[s..e]),
                    });
                }
                None => return (tokens, state, start),
            },
            b if is_ident_start(b) || b == b'-' => match cursor.scan_run(is_final, |b| is_ident_continue(b) || b == b'-') {
                Some((s, e)) => {
                    tokens.push(Token {
                        kind: Kind::Ident,
                        span: Span::new(base_offset + s as u32, base_offset + e as u32),
                        depth: state.depth,
                        payload: Payload::Text(&chunk[s..e]),
                    });
                }
                None => return (tokens, state, start),
            },
            _ => {
                cursor.advance();
                tokens.push(simple(Kind::Delim, start, &cursor, state.depth, base_offset));
            }
        }
    }

    (tokens, state, chunk.len())
}

pub fn tokenize(source: &str) -> Vec<Token<'_, Kind>> {
    let (mut tokens, state, consumed) = tokenize_chunk(LexState::reset(), source, 0, true);
    debug_assert_eq!(consumed, source.len());
    if state.mode != LexMode::Top {
        tokens.push(Token {
            kind: Kind::Invalid,
            span: Span::new(state.token_start, source.len() as u32),
            depth: state.depth,
            payload: Payload::None,
        });
    }
    tokens.push(Token {
        kind: Kind::Eof,
        span: Span::new(source.len() as u32, source.len() as u32),
        depth: 0,
        payload: Payload::None,
    });
    tokens
}

fn simple<'a>(kind: Kind, start: usize, cursor: &Cursor<'a>, depth: u16, base_offset: u32) -> Token<'a, Kind> {
    Token {
        kind,
        span: Span::new(base_offset + start as u32, base_offset + cursor.pos() as u32),
        depth,
        payload: Payload::None,
    }
}

fn find_comment_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Some(i + 2);
        }
        i += 1;
    }
    None
}

fn cursor_seek(cursor: &mut Cursor<'_>, pos: usize) {
    while cursor.pos() < pos {
        cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Kind> {
        tokenize(src)
            .into_iter()
            .filter(|t| t.kind != Kind::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_s4_ruleset() {
        let k = kinds("a{color:red;padding:1rem}");
        assert_eq!(
            k,
            vec![
                Kind::Ident,
                Kind::LBrace,
                Kind::Ident,
                Kind::Colon,
                Kind::Ident,
                Kind::Semicolon,
                Kind::Ident,
                Kind::Colon,
                Kind::Number,
                Kind::Ident,
                Kind::RBrace,
                Kind::Eof,
            ]
        );
    }

    #[test]
    fn at_rules_are_tokenized() {
        let k = kinds("@media screen { a { color: red; } }");
        assert_eq!(k.first(), Some(&Kind::AtKeyword));
    }
}
