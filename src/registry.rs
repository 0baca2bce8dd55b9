//! Grammar / Rule registry (C6).
//!
//! A static, process-wide table mapping [`RuleId`]s to `{name, language,
//! category}`. The namespace is partitioned into contiguous 256-wide
//! ranges per language so that `id / 256` alone identifies the owning
//! language without a lookup. Consumers dispatch on rule ID via a dense
//! `match`; category drives generic visitors (extractor, linter) so they
//! never need language-specific code.

use crate::span::RuleId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Common,
    Json,
    Zon,
    Css,
    Html,
    TypeScript,
    Svelte,
    Zig,
}

impl Language {
    pub fn base(self) -> u16 {
        match self {
            Language::Common => 0,
            Language::Json => 256,
            Language::Zon => 512,
            Language::Css => 768,
            Language::Html => 1024,
            Language::TypeScript => 1280,
            Language::Svelte => 1536,
            Language::Zig => 1792,
        }
    }

    pub fn from_id(id: RuleId) -> Language {
        match id.0 / 256 {
            0 => Language::Common,
            1 => Language::Json,
            2 => Language::Zon,
            3 => Language::Css,
            4 => Language::Html,
            5 => Language::TypeScript,
            6 => Language::Svelte,
            7 => Language::Zig,
            _ => Language::Common,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Common => "common",
            Language::Json => "json",
            Language::Zon => "zon",
            Language::Css => "css",
            Language::Html => "html",
            Language::TypeScript => "typescript",
            Language::Svelte => "svelte",
            Language::Zig => "zig",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The category a rule falls under for language-neutral dispatch. Not
/// every rule ID belongs to an AST-visible category (punctuation and
/// whitespace tokens use `Other`), but every rule ID a node can carry
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    DocumentRoot,
    Container,
    Field,
    Key,
    Value,
    Literal,
    Identifier,
    Comment,
    Import,
    Export,
    TypeDecl,
    FnDecl,
    TestDecl,
    ErrorNode,
    Other,
}

impl RuleCategory {
    /// Lowercase name used by query attribute selectors (`rule[field]`)
    /// and the extractor's flag-to-category table.
    pub fn name(self) -> &'static str {
        match self {
            RuleCategory::DocumentRoot => "document_root",
            RuleCategory::Container => "container",
            RuleCategory::Field => "field",
            RuleCategory::Key => "key",
            RuleCategory::Value => "value",
            RuleCategory::Literal => "literal",
            RuleCategory::Identifier => "identifier",
            RuleCategory::Comment => "comment",
            RuleCategory::Import => "import",
            RuleCategory::Export => "export",
            RuleCategory::TypeDecl => "type_decl",
            RuleCategory::FnDecl => "fn_decl",
            RuleCategory::TestDecl => "test_decl",
            RuleCategory::ErrorNode => "error",
            RuleCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    pub id: RuleId,
    pub name: &'static str,
    pub language: Language,
    pub category: RuleCategory,
}

/// Common (language-neutral) rule IDs, base 0.
pub mod common {
    use crate::span::RuleId;
    pub const EOF: RuleId = RuleId(0);
    pub const INVALID: RuleId = RuleId(1);
    pub const WHITESPACE: RuleId = RuleId(2);
    pub const IDENTIFIER: RuleId = RuleId(3);
    pub const COMMENT_LINE: RuleId = RuleId(4);
    pub const COMMENT_BLOCK: RuleId = RuleId(5);
    pub const COMMENT_DOC: RuleId = RuleId(6);
    pub const ERROR_NODE: RuleId = RuleId(7);
}

/// JSON rule IDs, base 256.
pub mod json {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(256);
    pub const OBJECT: RuleId = RuleId(257);
    pub const ARRAY: RuleId = RuleId(258);
    pub const FIELD: RuleId = RuleId(259);
    pub const KEY: RuleId = RuleId(260);
    pub const STRING: RuleId = RuleId(261);
    pub const NUMBER: RuleId = RuleId(262);
    pub const BOOL: RuleId = RuleId(263);
    pub const NULL: RuleId = RuleId(264);
    pub const COMMA: RuleId = RuleId(265);
    pub const COLON: RuleId = RuleId(266);
    pub const LBRACE: RuleId = RuleId(267);
    pub const RBRACE: RuleId = RuleId(268);
    pub const LBRACKET: RuleId = RuleId(269);
    pub const RBRACKET: RuleId = RuleId(270);
    pub const COMMENT_LINE: RuleId = RuleId(271);
    pub const COMMENT_BLOCK: RuleId = RuleId(272);
}

/// ZON rule IDs, base 512.
pub mod zon {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(512);
    pub const STRUCT_LITERAL: RuleId = RuleId(513);
    pub const FIELD_ASSIGNMENT: RuleId = RuleId(514);
    pub const ENUM_LITERAL: RuleId = RuleId(515);
    pub const CHAR_LITERAL: RuleId = RuleId(516);
    pub const STRING: RuleId = RuleId(517);
    pub const NUMBER_DEC: RuleId = RuleId(518);
    pub const NUMBER_HEX: RuleId = RuleId(519);
    pub const NUMBER_BIN: RuleId = RuleId(520);
    pub const NUMBER_OCT: RuleId = RuleId(521);
    pub const NUMBER_FLOAT: RuleId = RuleId(522);
    pub const BUILTIN_IDENT: RuleId = RuleId(523);
    pub const NULL: RuleId = RuleId(524);
    pub const UNDEFINED: RuleId = RuleId(525);
    pub const BOOL: RuleId = RuleId(526);
    pub const DOT: RuleId = RuleId(527);
    pub const EQUALS: RuleId = RuleId(528);
    pub const COLON: RuleId = RuleId(529);
    pub const COMMA: RuleId = RuleId(530);
    pub const LBRACE: RuleId = RuleId(531);
    pub const RBRACE: RuleId = RuleId(532);
    pub const IDENTIFIER: RuleId = RuleId(533);
    pub const FIELD_NAME: RuleId = RuleId(534);
}

/// CSS rule IDs, base 768.
pub mod css {
    use crate::span::RuleId;
    pub const STYLESHEET: RuleId = RuleId(768);
    pub const RULESET: RuleId = RuleId(769);
    pub const SELECTOR_LIST: RuleId = RuleId(770);
    pub const SELECTOR: RuleId = RuleId(771);
    pub const DECLARATION: RuleId = RuleId(772);
    pub const PROPERTY: RuleId = RuleId(773);
    pub const VALUE: RuleId = RuleId(774);
    pub const AT_RULE: RuleId = RuleId(775);
    pub const BLOCK: RuleId = RuleId(776);
    pub const COMMENT: RuleId = RuleId(777);
    pub const STRING: RuleId = RuleId(778);
    pub const LBRACE: RuleId = RuleId(779);
    pub const RBRACE: RuleId = RuleId(780);
    pub const COLON: RuleId = RuleId(781);
    pub const SEMICOLON: RuleId = RuleId(782);
    pub const IDENT: RuleId = RuleId(783);
}

/// HTML rule IDs, base 1024.
pub mod html {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(1024);
    pub const ELEMENT: RuleId = RuleId(1025);
    pub const TAG_OPEN: RuleId = RuleId(1026);
    pub const TAG_CLOSE: RuleId = RuleId(1027);
    pub const ATTRIBUTE: RuleId = RuleId(1028);
    pub const ATTR_NAME: RuleId = RuleId(1029);
    pub const ATTR_VALUE: RuleId = RuleId(1030);
    pub const TEXT: RuleId = RuleId(1031);
    pub const COMMENT: RuleId = RuleId(1032);
    pub const DOCTYPE: RuleId = RuleId(1033);
    pub const SCRIPT: RuleId = RuleId(1034);
    pub const STYLE: RuleId = RuleId(1035);
}

/// TypeScript rule IDs, base 1280.
pub mod typescript {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(1280);
    pub const IMPORT: RuleId = RuleId(1281);
    pub const EXPORT: RuleId = RuleId(1282);
    pub const FN_DECL: RuleId = RuleId(1283);
    pub const CLASS_DECL: RuleId = RuleId(1284);
    pub const INTERFACE_DECL: RuleId = RuleId(1285);
    pub const ENUM_DECL: RuleId = RuleId(1286);
    pub const TYPE_ALIAS: RuleId = RuleId(1287);
    pub const STATEMENT: RuleId = RuleId(1288);
    pub const IDENTIFIER: RuleId = RuleId(1289);
    pub const STRING: RuleId = RuleId(1290);
    pub const COMMENT: RuleId = RuleId(1291);
    pub const DOC_COMMENT: RuleId = RuleId(1292);
    pub const OPAQUE_BODY: RuleId = RuleId(1293);
}

/// Svelte rule IDs, base 1536.
pub mod svelte {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(1536);
    pub const SCRIPT_SECTION: RuleId = RuleId(1537);
    pub const STYLE_SECTION: RuleId = RuleId(1538);
    pub const TEMPLATE_SECTION: RuleId = RuleId(1539);
}

/// Zig rule IDs, base 1792.
pub mod zig {
    use crate::span::RuleId;
    pub const DOCUMENT: RuleId = RuleId(1792);
    pub const FN_DECL: RuleId = RuleId(1793);
    pub const TEST_DECL: RuleId = RuleId(1794);
    pub const IMPORT_CALL: RuleId = RuleId(1795);
    pub const CONTAINER_DECL: RuleId = RuleId(1796);
    pub const IDENTIFIER: RuleId = RuleId(1797);
    pub const STRING: RuleId = RuleId(1798);
    pub const COMMENT: RuleId = RuleId(1799);
    pub const DOC_COMMENT: RuleId = RuleId(1800);
    pub const OPAQUE_BODY: RuleId = RuleId(1801);
}

/// Compile-time dispatch table: resolves a [`RuleId`] to its `{name,
/// language, category}`. A dense `match` on `(language, local id)`, never
/// a runtime hash.
pub fn lookup(id: RuleId) -> Option<RuleInfo> {
    use RuleCategory::*;
    let language = Language::from_id(id);
    let (name, category) = match language {
        Language::Common => match id.0 {
            0 => ("common.eof", Other),
            1 => ("common.invalid", Other),
            2 => ("common.whitespace", Other),
            3 => ("common.identifier", Identifier),
            4 => ("common.comment_line", Comment),
            5 => ("common.comment_block", Comment),
            6 => ("common.comment_doc", Comment),
            7 => ("common.error", ErrorNode),
            _ => return None,
        },
        Language::Json => match id.0 {
            256 => ("json.document", DocumentRoot),
            257 => ("json.object", Container),
            258 => ("json.array", Container),
            259 => ("json.field", Field),
            260 => ("json.key", Key),
            261 => ("json.string", Literal),
            262 => ("json.number", Literal),
            263 => ("json.bool", Literal),
            264 => ("json.null", Literal),
            265 => ("json.comma", Other),
            266 => ("json.colon", Other),
            267 => ("json.lbrace", Other),
            268 => ("json.rbrace", Other),
            269 => ("json.lbracket", Other),
            270 => ("json.rbracket", Other),
            271 => ("json.comment_line", Comment),
            272 => ("json.comment_block", Comment),
            _ => return None,
        },
        Language::Zon => match id.0 {
            512 => ("zon.document", DocumentRoot),
            513 => ("zon.struct_literal", Container),
            514 => ("zon.field_assignment", Field),
            515 => ("zon.enum_literal", Literal),
            516 => ("zon.char_literal", Literal),
            517 => ("zon.string", Literal),
            518 => ("zon.number_dec", Literal),
            519 => ("zon.number_hex", Literal),
            520 => ("zon.number_bin", Literal),
            521 => ("zon.number_oct", Literal),
            522 => ("zon.number_float", Literal),
            523 => ("zon.builtin_identifier", Identifier),
            524 => ("zon.null", Literal),
            525 => ("zon.undefined", Literal),
            526 => ("zon.bool", Literal),
            527 => ("zon.dot", Other),
            528 => ("zon.equals", Other),
            529 => ("zon.colon", Other),
            530 => ("zon.comma", Other),
            531 => ("zon.lbrace", Other),
            532 => ("zon.rbrace", Other),
            533 => ("zon.identifier", Identifier),
            534 => ("zon.field_name", Key),
            _ => return None,
        },
        Language::Css => match id.0 {
            768 => ("css.stylesheet", DocumentRoot),
            769 => ("css.ruleset", Container),
            770 => ("css.selector_list", Other),
            771 => ("css.selector", Other),
            772 => ("css.declaration", Field),
            773 => ("css.property", Key),
            774 => ("css.value", Value),
            775 => ("css.at_rule", Container),
            776 => ("css.block", Container),
            777 => ("css.comment", Comment),
            778 => ("css.string", Literal),
            779 => ("css.lbrace", Other),
            780 => ("css.rbrace", Other),
            781 => ("css.colon", Other),
            782 => ("css.semicolon", Other),
            783 => ("css.ident", Identifier),
            _ => return None,
        },
        Language::Html => match id.0 {
            1024 => ("html.document", DocumentRoot),
            1025 => ("html.element", Container),
            1026 => ("html.tag_open", Other),
            1027 => ("html.tag_close", Other),
            1028 => ("html.attribute", Field),
            1029 => ("html.attr_name", Key),
            1030 => ("html.attr_value", Value),
            1031 => ("html.text", Literal),
            1032 => ("html.comment", Comment),
            1033 => ("html.doctype", Other),
            1034 => ("html.script", Container),
            1035 => ("html.style", Container),
            _ => return None,
        },
        Language::TypeScript => match id.0 {
            1280 => ("typescript.document", DocumentRoot),
            1281 => ("typescript.import", Import),
            1282 => ("typescript.export", Export),
            1283 => ("typescript.fn_decl", FnDecl),
            1284 => ("typescript.class_decl", TypeDecl),
            1285 => ("typescript.interface_decl", TypeDecl),
            1286 => ("typescript.enum_decl", TypeDecl),
            1287 => ("typescript.type_alias", TypeDecl),
            1288 => ("typescript.statement", Other),
            1289 => ("typescript.identifier", Identifier),
            1290 => ("typescript.string", Literal),
            1291 => ("typescript.comment", Comment),
            1292 => ("typescript.doc_comment", Comment),
            1293 => ("typescript.opaque_body", Other),
            _ => return None,
        },
        Language::Svelte => match id.0 {
            1536 => ("svelte.document", DocumentRoot),
            1537 => ("svelte.script_section", Container),
            1538 => ("svelte.style_section", Container),
            1539 => ("svelte.template_section", Container),
            _ => return None,
        },
        Language::Zig => match id.0 {
            1792 => ("zig.document", DocumentRoot),
            1793 => ("zig.fn_decl", FnDecl),
            1794 => ("zig.test_decl", TestDecl),
            1795 => ("zig.import_call", Import),
            1796 => ("zig.container_decl", TypeDecl),
            1797 => ("zig.identifier", Identifier),
            1798 => ("zig.string", Literal),
            1799 => ("zig.comment", Comment),
            1800 => ("zig.doc_comment", Comment),
            1801 => ("zig.opaque_body", Other),
            _ => return None,
        },
    };
    Some(RuleInfo {
        id,
        name,
        language,
        category,
    })
}

/// Reverse lookup used by the query compiler: resolves a dotted rule
/// name (e.g. `"json.object"`) back to its [`RuleId`]. Walks the full
/// ID space once per compile call; query compilation happens once per
/// selector, not per match, so a linear scan over ~2000 candidate IDs
/// costs nothing a hash map would meaningfully improve on.
pub fn id_by_name(name: &str) -> Option<RuleId> {
    (0..=zig::OPAQUE_BODY.0).find_map(|raw| {
        let id = RuleId(raw);
        lookup(id).filter(|info| info.name == name).map(|_| id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_by_name_resolves_known_rule() {
        assert_eq!(id_by_name("json.object"), Some(json::OBJECT));
        assert_eq!(id_by_name("zig.test_decl"), Some(zig::TEST_DECL));
    }

    #[test]
    fn id_by_name_rejects_unknown_rule() {
        assert_eq!(id_by_name("json.nonexistent"), None);
    }

    #[test]
    fn language_from_id_matches_base() {
        assert_eq!(Language::from_id(json::OBJECT), Language::Json);
        assert_eq!(Language::from_id(zig::FN_DECL), Language::Zig);
    }

    #[test]
    fn every_declared_const_resolves() {
        for id in [
            json::DOCUMENT,
            zon::STRUCT_LITERAL,
            css::RULESET,
            html::ELEMENT,
            typescript::FN_DECL,
            svelte::TEMPLATE_SECTION,
            zig::TEST_DECL,
        ] {
            assert!(lookup(id).is_some(), "{id:?} missing from registry");
        }
    }

    #[test]
    fn unknown_id_in_known_language_is_none() {
        assert!(lookup(RuleId(300)).is_none());
    }
}
