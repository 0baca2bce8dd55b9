//! Property 7 (spec.md §8): extractor output is a subsequence of the
//! source — every extracted line must appear verbatim in the source,
//! and no bytes are invented.

use zz::extract::{extract, ExtractFlags};

#[test]
fn typescript_signatures_and_imports_are_drawn_from_source() {
    let src = "import { readFile } from \"fs\";\n\nexport function load(path: string): string {\n    return readFile(path);\n}\n\ninterface Options {\n    verbose: boolean;\n}\n";
    let ast = zz::parser::typescript::parse(src);
    let out = extract(
        &ast,
        ExtractFlags { imports: true, signatures: true, types: true, ..Default::default() },
    );
    let text = String::from_utf8(out).unwrap();
    for line in text.lines() {
        assert!(
            src.contains(line),
            "extracted line {:?} was not found verbatim in the source",
            line
        );
    }
}

#[test]
fn css_structure_extraction_is_drawn_from_source() {
    let src = "a { color: red; }\n\n@media (min-width: 1px) {\n  b { color: blue; }\n}\n";
    let ast = zz::parser::css::parse(src);
    let out = extract(&ast, ExtractFlags { structure: true, ..Default::default() });
    let text = String::from_utf8(out).unwrap();
    assert!(!text.is_empty());
    for line in text.lines() {
        assert!(src.contains(line.trim()), "extracted line {:?} not in source", line);
    }
}

#[test]
fn zon_imports_flag_alone_yields_empty_output_for_no_imports() {
    // ZON has no import/use construct; requesting only `imports` on a
    // file with none should emit nothing, not invented content.
    let src = r#".{ .name = "x" }"#;
    let ast = zz::parser::zon::parse(src);
    let out = extract(&ast, ExtractFlags { imports: true, ..Default::default() });
    assert!(out.is_empty());
}
