//! JSON / JSON5 streaming lexer.
//!
//! Strict JSON by default; [`Dialect::Json5`] additionally recognizes
//! `//` and `/* */` comments, unquoted identifier keys, trailing commas,
//! and single-quoted strings (spec.md §4.5).

use crate::lexer::core::{is_ident_continue, is_ident_start, Cursor, LexMode, LexState, Payload, StringEnd, Token};
use crate::registry::{common, json};
use crate::span::{RuleId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Strict,
    Json5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    String,
    Number,
    True,
    False,
    Null,
    Identifier,
    CommentLine,
    CommentBlock,
    Invalid,
    Eof,
}

impl From<Kind> for RuleId {
    fn from(k: Kind) -> RuleId {
        match k {
            Kind::LBrace => json::LBRACE,
            Kind::RBrace => json::RBRACE,
            Kind::LBracket => json::LBRACKET,
            Kind::RBracket => json::RBRACKET,
            Kind::Colon => json::COLON,
            Kind::Comma => json::COMMA,
            Kind::String => json::STRING,
            Kind::Number => json::NUMBER,
            Kind::True | Kind::False => json::BOOL,
            Kind::Null => json::NULL,
            Kind::Identifier => common::IDENTIFIER,
            Kind::CommentLine => json::COMMENT_LINE,
            Kind::CommentBlock => json::COMMENT_BLOCK,
            Kind::Invalid => common::INVALID,
            Kind::Eof => common::EOF,
        }
    }
}

fn is_number_lead(b: u8) -> bool {
    b.is_ascii_digit() || b == b'-'
}

fn is_number_continue(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')
}

/// Tokenizes one chunk. `is_final` tells the lexer no more bytes follow
/// this chunk, so any in-progress numeric/identifier run at the chunk's
/// end should be treated as complete rather than held back for the next
/// call. Returns the tokens produced, the resumption state, and how many
/// bytes of `chunk` were consumed (less than `chunk.len()` when a token
/// was held back for the next call).
pub fn tokenize_chunk<'a>(
    mut state: LexState,
    chunk: &'a str,
    base_offset: u32,
    is_final: bool,
    dialect: Dialect,
) -> (Vec<Token<'a, Kind>>, LexState, usize) {
    let mut cursor = Cursor::new(chunk, base_offset);
    let mut tokens = Vec::new();

    // Resume a string/comment left open at the previous chunk boundary.
    // A token spanning two chunks can't be sliced as one contiguous
    // `&str`, so its payload is `None` even where a same-chunk token of
    // the same kind would carry a decoded value; its span is still exact
    // via `state.token_start`.
    match state.mode {
        LexMode::InString { quote, escaped } => match cursor.scan_string_tail(quote, escaped) {
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
        },
        LexMode::InBlockComment => match find_block_comment_end(chunk.as_bytes(), 0) {
            Some(end) => {
                cursor_seek(&mut cursor, end);
                tokens.push(Token {
                    kind: Kind::CommentBlock,
                    span: Span::new(state.token_start, cursor.abs(cursor.pos())),
                    depth: state.depth,
                    payload: Payload::None,
                });
                state.mode = LexMode::Top;
            }
            None => return (tokens, state, chunk.len()),
        },
        _ => {}
    }

    loop {
        cursor.bump_while(|b| b.is_ascii_whitespace());
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
            b'[' => {
                cursor.advance();
                state.depth += 1;
                tokens.push(simple(Kind::LBracket, start, &cursor, state.depth, base_offset));
            }
            b']' => {
                cursor.advance();
                tokens.push(simple(Kind::RBracket, start, &cursor, state.depth, base_offset));
                state.depth = state.depth.saturating_sub(1);
            }
            b':' => {
                cursor.advance();
                tokens.push(simple(Kind::Colon, start, &cursor, state.depth, base_offset));
            }
            b',' => {
                cursor.advance();
                tokens.push(simple(Kind::Comma, start, &cursor, state.depth, base_offset));
            }
            b'"' | b'\'' if b == b'"' || dialect == Dialect::Json5 => {
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
            b'/' if dialect == Dialect::Json5 && cursor.peek_at(1) == Some(b'/') => {
                cursor.advance();
                cursor.advance();
                cursor.bump_while(|b| b != b'\n');
                tokens.push(Token {
                    kind: Kind::CommentLine,
                    span: Span::new(base_offset + start as u32, cursor.abs(cursor.pos())),
                    depth: state.depth,
                    payload: Payload::None,
                });
            }
            b'/' if dialect == Dialect::Json5 && cursor.peek_at(1) == Some(b'*') => {
                cursor.advance();
                cursor.advance();
                match find_block_comment_end(chunk.as_bytes(), cursor.pos()) {
                    Some(end) => {
                        cursor_seek(&mut cursor, end);
                        tokens.push(Token {
                            kind: Kind::CommentBlock,
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
            b if is_number_lead(b) => match cursor.scan_run(is_final, is_number_continue) {
                Some((s, e)) => {
                    let text = &chunk[s..e];
                    let value: f64 = text.parse().unwrap_or(f64::NAN);
                    tokens.push(Token {
                        kind: Kind::Number,
                        span: Span::new(base_offset + s as u32, base_offset + e as u32),
                        depth: state.depth,
                        payload: Payload::Float(value),
                    });
                }
                None => return (tokens, state, start),
            },
            b if is_ident_start(b) => match cursor.scan_run(is_final, is_ident_continue) {
                Some((s, e)) => {
                    let text = &chunk[s..e];
                    let kind = match text {
                        "true" => Kind::True,
                        "false" => Kind::False,
                        "null" => Kind::Null,
                        _ if dialect == Dialect::Json5 => Kind::Identifier,
                        _ => Kind::Invalid,
                    };
                    tokens.push(Token {
                        kind,
                        span: Span::new(base_offset + s as u32, base_offset + e as u32),
                        depth: state.depth,
                        payload: if kind == Kind::Identifier {
                            Payload::Text(text)
                        } else {
                            Payload::None
                        },
                    });
                }
                None => return (tokens, state, start),
            },
            _ => {
                cursor.advance();
                tokens.push(simple(Kind::Invalid, start, &cursor, state.depth, base_offset));
            }
        }
    }

    (tokens, state, chunk.len())
}

/// Tokenizes a complete, standalone source string and appends the EOF
/// sentinel (spec.md §8 property 10).
pub fn tokenize(source: &str, dialect: Dialect) -> Vec<Token<'_, Kind>> {
    let (mut tokens, state, consumed) = tokenize_chunk(LexState::reset(), source, 0, true, dialect);
    debug_assert_eq!(consumed, source.len(), "final chunk must fully consume input");
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

fn find_block_comment_end(bytes: &[u8], from: usize) -> Option<usize> {
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

    fn kinds(src: &str, dialect: Dialect) -> Vec<Kind> {
        tokenize(src, dialect).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_s1_object() {
        let k = kinds(r#"{"a":1,"b":[2,3]}"#, Dialect::Strict);
        assert_eq!(
            k,
            vec![
                Kind::LBrace,
                Kind::String,
                Kind::Colon,
                Kind::Number,
                Kind::Comma,
                Kind::String,
                Kind::Colon,
                Kind::LBracket,
                Kind::Number,
                Kind::Comma,
                Kind::Number,
                Kind::RBracket,
                Kind::RBrace,
                Kind::Eof,
            ]
        );
    }

    #[test]
    fn json5_allows_comments_and_unquoted_keys() {
        let k = kinds("{a:1,/*c*/b:2,}", Dialect::Json5);
        assert!(k.contains(&Kind::Identifier));
        assert!(k.contains(&Kind::CommentBlock));
    }

    #[test]
    fn strict_mode_rejects_unquoted_keys_as_invalid() {
        let k = kinds("{a:1}", Dialect::Strict);
        assert!(k.contains(&Kind::Invalid));
    }

    #[test]
    fn depth_tracks_nesting() {
        let tokens = tokenize("[[1]]", Dialect::Strict);
        let inner_number = tokens.iter().find(|t| t.kind == Kind::Number).unwrap();
        assert_eq!(inner_number.depth, 2);
    }

    #[test]
    fn chunked_string_resumes_across_boundary() {
        let (t1, s1, consumed1) = tokenize_chunk(LexState::reset(), r#""hel"#, 0, false, Dialect::Strict);
        assert!(t1.is_empty());
        assert_eq!(consumed1, 0);
        let (t2, s2, _) = tokenize_chunk(s1, r#"lo""#, 4, true, Dialect::Strict);
        assert_eq!(s2.mode, LexMode::Top);
        assert_eq!(t2.len(), 1);
        assert_eq!(t2[0].kind, Kind::String);
        assert_eq!(t2[0].span, Span::new(0, 8));
    }

    #[test]
    fn eof_sentinel_is_always_last_and_empty() {
        let tokens = tokenize("{}", Dialect::Strict);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, Kind::Eof);
        assert!(last.span.is_empty());
    }
}
