//! TypeScript streaming lexer for the declarations-level subset spec.md
//! §4.5 requires: imports/exports, function/class/interface/enum/type
//! declarations, top-level statements. Bodies (anything between a
//! matching `{`/`}` after a declaration header) are not re-lexed token
//! by token beyond bracket matching — the parser (C7) captures them as
//! opaque spans.

use crate::lexer::core::{is_ident_continue, is_ident_start, Cursor, LexMode, LexState, Payload, StringEnd, Token};
use crate::registry::{common, typescript};
use crate::span::{RuleId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Identifier,
    Keyword,
    String,
    TemplateString,
    Number,
    CommentLine,
    CommentBlock,
    DocComment,
    Punct,
    Invalid,
    Eof,
}

impl From<Kind> for RuleId {
    fn from(k: Kind) -> RuleId {
        match k {
            Kind::LBrace => typescript::OPAQUE_BODY,
            Kind::RBrace => typescript::OPAQUE_BODY,
            Kind::LParen | Kind::RParen | Kind::LBracket | Kind::RBracket | Kind::Semicolon | Kind::Comma
            | Kind::Colon | Kind::Punct => common::INVALID,
            Kind::Identifier | Kind::Keyword => typescript::IDENTIFIER,
            Kind::String | Kind::TemplateString | Kind::Number => typescript::STRING,
            Kind::CommentLine | Kind::CommentBlock => typescript::COMMENT,
            Kind::DocComment => typescript::DOC_COMMENT,
            Kind::Invalid => common::INVALID,
            Kind::Eof => common::EOF,
        }
    }
}

pub const KEYWORDS: &[&str] = &[
    "import", "export", "from", "function", "class", "interface", "enum", "type", "const", "let", "var", "default",
    "extends", "implements", "async", "return", "public", "private", "protected", "readonly", "static", "as",
    "namespace", "declare", "abstract", "void", "new",
];

pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
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
                    kind: Kind::CommentBlock,
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
            b'(' => {
                cursor.advance();
                tokens.push(simple(Kind::LParen, start, &cursor, state.depth, base_offset));
            }
            b')' => {
                cursor.advance();
                tokens.push(simple(Kind::RParen, start, &cursor, state.depth, base_offset));
            }
            b'[' => {
                cursor.advance();
                tokens.push(simple(Kind::LBracket, start, &cursor, state.depth, base_offset));
            }
            b']' => {
                cursor.advance();
                tokens.push(simple(Kind::RBracket, start, &cursor, state.depth, base_offset));
            }
            b';' => {
                cursor.advance();
                tokens.push(simple(Kind::Semicolon, start, &cursor, state.depth, base_offset));
            }
            b',' => {
                cursor.advance();
                tokens.push(simple(Kind::Comma, start, &cursor, state.depth, base_offset));
            }
            b':' => {
                cursor.advance();
                tokens.push(simple(Kind::Colon, start, &cursor, state.depth, base_offset));
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
            b'`' => {
                // Template literals: not resumable across chunk
                // boundaries (no `${}` interpolation tracking at this
                // layer); scanned as a single opaque run.
                cursor.advance();
                cursor.bump_while(|b| b != b'`');
                cursor.eat(b'`');
                tokens.push(Token {
                    kind: Kind::TemplateString,
                    span: Span::new(base_offset + start as u32, cursor.abs(cursor.pos())),
                    depth: state.depth,
                    payload: Payload::None,
                });
            }
            b'/' if cursor.peek_at(1) == Some(b'/') => {
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
            b'/' if cursor.peek_at(1) == Some(b'*') => {
                let is_doc = cursor.peek_at(2) == Some(b'*');
                cursor.advance();
                cursor.advance();
                match find_comment_end(chunk.as_bytes(), cursor.pos()) {
                    Some(end) => {
                        cursor_seek(&mut cursor, end);
                        tokens.push(Token {
                            kind: if is_doc { Kind::DocComment } else { Kind::CommentBlock },
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
            b if b.is_ascii_digit() => match cursor.scan_run(is_final, |b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_') {
                Some((s, e)) => {
                    tokens.push(Token {
                        kind: Kind::Number,
                        span: Span::new(base_offset + s as u32, base_offset + e as u32),
                        depth: state.depth,
                        payload: Payload::Text(&chunk[s..e]),
                    });
                }
                None => return (tokens, state, start),
            },
            b if is_ident_start(b) => match cursor.scan_run(is_final, is_ident_continue) {
                Some((s, e)) => {
                    let text = &chunk[s..e];
                    tokens.push(Token {
                        kind: if is_keyword(text) { Kind::Keyword } else { Kind::Identifier },
                        span: Span::new(base_offset + s as u32, base_offset + e as u32),
                        depth: state.depth,
                        payload: Payload::Text(text),
                    });
                }
                None => return (tokens, state, start),
            },
            _ => {
                cursor.advance();
                tokens.push(simple(Kind::Punct, start, &cursor, state.depth, base_offset));
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

    #[test]
    fn keywords_are_distinguished_from_identifiers() {
        let tokens = tokenize("import x from \"./y\";");
        assert_eq!(tokens[0].kind, Kind::Keyword);
        assert_eq!(tokens[1].kind, Kind::Identifier);
    }

    #[test]
    fn doc_comment_vs_block_comment() {
        let tokens = tokenize("/** doc */ /* plain */");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&Kind::DocComment));
        assert!(kinds.contains(&Kind::CommentBlock));
    }
}
