//! Layer 0: streaming, chunked, resumable lexers (C2).
//!
//! Each submodule owns one language's token grammar and exposes a
//! `tokenize_chunk(state, chunk, base_offset, is_final) -> (tokens,
//! state, consumed)` entry point plus a convenience `tokenize(source)`
//! for the common single-chunk case. `core` holds the shared cursor,
//! resumable state, and uniform token projection all of them build on.

pub mod core;

pub mod css;
pub mod html;
pub mod json;
pub mod svelte;
pub mod typescript;
pub mod zig;
pub mod zon;

pub use core::{is_ident_continue, is_ident_start, Cursor, LexMode, LexState, Payload, Projected, StringEnd, Token};
