//! Property 10 (spec.md §8): every completed tokenization ends with
//! exactly one EOF token whose text is empty, across every language.
//! Property 1 (lex round-trip) is checked for CSS, the one lexer here
//! that retains whitespace tokens (spec.md §4.1: "usually discarded
//! unless options request it" — the other lexers discard it, so a
//! flat concatenation of their tokens is not expected to reconstruct
//! the source and isn't asserted here).

use zz::lexer::core::Payload;
use zz::lexer::json::Dialect;

fn assert_single_trailing_eof<K: PartialEq + std::fmt::Debug + Copy>(
    kinds: &[K],
    payloads: &[Payload<'_>],
    eof: K,
) {
    let eof_count = kinds.iter().filter(|&&k| k == eof).count();
    assert_eq!(eof_count, 1, "expected exactly one EOF token, found {eof_count}");
    assert_eq!(*kinds.last().unwrap(), eof, "EOF must be the last token");
    let eof_idx = kinds.len() - 1;
    match payloads[eof_idx] {
        Payload::None => {}
        ref other => panic!("EOF token must carry no payload, found {other:?}"),
    }
}

#[test]
fn json_ends_with_one_eof() {
    let tokens = zz::lexer::json::tokenize(r#"{"a": [1, 2, null]}"#, Dialect::Strict);
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::json::Kind::Eof);
    let last = tokens.last().unwrap();
    assert_eq!(last.span.start, last.span.end);
}

#[test]
fn zon_ends_with_one_eof() {
    let tokens = zz::lexer::zon::tokenize(r#".{ .a = 1, .b = .{} }"#);
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::zon::Kind::Eof);
}

#[test]
fn css_ends_with_one_eof() {
    let tokens = zz::lexer::css::tokenize("a { color: red; }");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::css::Kind::Eof);
}

#[test]
fn html_ends_with_one_eof() {
    let tokens = zz::lexer::html::tokenize("<div><p>hi</p></div>");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::html::Kind::Eof);
}

#[test]
fn typescript_ends_with_one_eof() {
    let tokens = zz::lexer::typescript::tokenize("import x from \"./y\";");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::typescript::Kind::Eof);
}

#[test]
fn zig_ends_with_one_eof() {
    let tokens = zz::lexer::zig::tokenize("const std = @import(\"std\");");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    let payloads: Vec<_> = tokens.iter().map(|t| t.payload).collect();
    assert_single_trailing_eof(&kinds, &payloads, zz::lexer::zig::Kind::Eof);
}

#[test]
fn css_lex_round_trip_including_retained_whitespace() {
    let src = "a {\n  color: red;\n  padding: 1rem;\n}\n";
    let tokens = zz::lexer::css::tokenize(src);
    let mut reconstructed = String::new();
    for t in &tokens {
        if t.kind == zz::lexer::css::Kind::Eof {
            continue;
        }
        reconstructed.push_str(t.span.slice(src));
    }
    assert_eq!(reconstructed, src);
}
