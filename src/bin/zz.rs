//! # zz — the Stratified Parsing & Fact Engine CLI
//!
//! A thin wrapper around the core library: `tree` visualizes a
//! directory, `prompt` concatenates extracted slices of matching files
//! for pasting into an LLM context, `format` rewrites or checks
//! formatting, `deps` is a stub dependency-refresh command. None of
//! this is the engine itself (spec.md explicitly scopes the CLI out of
//! core), so each subcommand is a short dispatch into `zz::{extract,
//! format, lint, config, walk}`.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use zz::config::Config;
use zz::diagnostics::{Diagnostic, Severity, ZzError};
use zz::extract::ExtractFlags;
use zz::format::FormatOptions;
use zz::registry::Language;
use zz::walk::walk_files;

#[derive(Parser, Debug)]
#[command(name = "zz", version, about = "Stratified parsing and fact engine for JSON, ZON, TypeScript, CSS, HTML, Svelte and Zig")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Directory-tree visualization.
    Tree {
        path: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "tree")]
        format: TreeFormat,
        #[arg(long)]
        hidden: bool,
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Concatenate extracted slices of matching files.
    Prompt {
        globs: Vec<PathBuf>,
        #[arg(long)]
        signatures: bool,
        #[arg(long)]
        types: bool,
        #[arg(long)]
        docs: bool,
        #[arg(long)]
        imports: bool,
        #[arg(long)]
        tests: bool,
        #[arg(long)]
        structure: bool,
        #[arg(long)]
        errors: bool,
        #[arg(long)]
        full: bool,
    },
    /// Format matching files in place, check, or via stdin.
    Format {
        globs: Vec<PathBuf>,
        #[arg(long)]
        write: bool,
        #[arg(long)]
        check: bool,
        #[arg(long)]
        stdin: bool,
        #[arg(long, default_value_t = 2)]
        indent_size: usize,
        #[arg(long, value_enum, default_value = "space")]
        indent_style: IndentStyle,
        #[arg(long, default_value_t = 80)]
        line_width: usize,
    },
    /// Dependency-refresh stub.
    Deps {
        #[arg(long)]
        check: bool,
        #[arg(long)]
        update: bool,
        #[arg(long)]
        generate_manifest: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TreeFormat {
    Tree,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndentStyle {
    Space,
    Tab,
}

fn main() -> ExitCode {
    zz::logging::init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", Diagnostic::new(zz::registry::common::INVALID, Severity::Error, err.to_string(), zz::span::Span::EMPTY).render("zz", 0));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, ZzError> {
    match command {
        Command::Tree { path, format, hidden, max_depth } => cmd_tree(path, format, hidden, max_depth),
        Command::Prompt { globs, signatures, types, docs, imports, tests, structure, errors, full } => {
            let flags = ExtractFlags { signatures, types, docs, structure, imports, errors, tests, full };
            cmd_prompt(&globs, flags)
        }
        Command::Format { globs, write, check, stdin, indent_size, indent_style, line_width } => {
            let options = FormatOptions {
                line_width,
                indent_width: indent_size,
                sort_keys: false,
                trailing_comma: false,
            };
            let _ = indent_style; // only space-width affects this formatter; tab rendering is a printer concern not yet modeled per-language.
            cmd_format(&globs, write, check, stdin, options)
        }
        Command::Deps { check, update, generate_manifest } => cmd_deps(check, update, generate_manifest),
    }
}

fn cmd_tree(path: Option<PathBuf>, format: TreeFormat, hidden: bool, max_depth: Option<usize>) -> Result<ExitCode, ZzError> {
    let root = path.unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::load(&root);
    if hidden {
        config.hidden_files.clear();
    }
    let mut files = walk_files(&root, &config);
    files.sort();
    if let Some(depth) = max_depth {
        files.retain(|p| p.strip_prefix(&root).map(|rel| rel.components().count() <= depth).unwrap_or(true));
    }

    match format {
        TreeFormat::List => {
            for file in &files {
                println!("{}", file.display());
            }
        }
        TreeFormat::Tree => {
            for file in &files {
                let rel = file.strip_prefix(&root).unwrap_or(file);
                let depth = rel.components().count().saturating_sub(1);
                println!("{}{}", "  ".repeat(depth), rel.file_name().map(|n| n.to_string_lossy()).unwrap_or_default());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_prompt(globs: &[PathBuf], flags: ExtractFlags) -> Result<ExitCode, ZzError> {
    let mut stdout = io::stdout();
    for path in resolve_paths(globs)? {
        let Some(language) = language_for_path(&path) else { continue };
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping file");
                continue;
            }
        };
        let bytes = if language == Language::Svelte {
            extract_svelte(&source, flags)
        } else {
            let ast = parse_source(&source, language);
            zz::extract::extract(&ast, flags)
        };
        stdout.write_all(&bytes).map_err(ZzError::from)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Extracts from each of a Svelte file's sections in source order
/// (script, then style, then template), since [`zz::extract::extract`]
/// walks a single same-language [`zz::ast::Ast`] and a Svelte document
/// is three of those glued together (spec.md §4.5).
fn extract_svelte(source: &str, flags: ExtractFlags) -> Vec<u8> {
    let doc = zz::parser::svelte::parse(source);
    let mut out = Vec::new();
    for section in [&doc.script, &doc.style, &doc.template] {
        if let Some(ast) = section {
            out.extend(zz::extract::extract(ast, flags));
        }
    }
    out
}

fn cmd_format(globs: &[PathBuf], write: bool, check: bool, stdin: bool, options: FormatOptions) -> Result<ExitCode, ZzError> {
    if stdin {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).map_err(ZzError::from)?;
        let language = globs.first().and_then(|p| language_for_path(p)).unwrap_or(Language::Json);
        let formatted = format_source(&source, language, &options);
        io::stdout().write_all(&formatted).map_err(ZzError::from)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut would_change = false;
    for path in resolve_paths(globs)? {
        let Some(language) = language_for_path(&path) else { continue };
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping file");
                continue;
            }
        };
        let formatted = format_source(&source, language, &options);
        let changed = formatted != source.as_bytes();

        if check {
            if changed {
                would_change = true;
                print_diagnostic(&path, "file is not formatted");
            }
            continue;
        }

        if write && changed {
            atomic_write(&path, &formatted).map_err(ZzError::from)?;
        } else if !write {
            io::stdout().write_all(&formatted).map_err(ZzError::from)?;
        }
    }

    Ok(if check && would_change { ExitCode::from(1) } else { ExitCode::SUCCESS })
}

fn cmd_deps(check: bool, update: bool, generate_manifest: bool) -> Result<ExitCode, ZzError> {
    if update || generate_manifest {
        return Err(ZzError::NotImplemented { what: "deps --update/--generate-manifest".to_string() });
    }
    if check {
        let lock = Path::new("Cargo.lock");
        let manifest = Path::new("Cargo.toml");
        let needs_refresh = match (lock.metadata(), manifest.metadata()) {
            (Ok(lock_meta), Ok(manifest_meta)) => {
                matches!((lock_meta.modified(), manifest_meta.modified()), (Ok(l), Ok(m)) if l < m)
            }
            (Err(_), _) => true,
            _ => false,
        };
        println!("{}", if needs_refresh { "refresh needed" } else { "up to date" });
    }
    Ok(ExitCode::SUCCESS)
}

fn resolve_paths(globs: &[PathBuf]) -> Result<Vec<PathBuf>, ZzError> {
    let mut out = Vec::new();
    for entry in globs {
        if entry.is_dir() {
            let config = Config::load(entry);
            out.extend(walk_files(entry, &config));
        } else {
            out.push(entry.clone());
        }
    }
    Ok(out)
}

fn language_for_path(path: &Path) -> Option<Language> {
    match path.extension().and_then(|e| e.to_str())? {
        "json" => Some(Language::Json),
        "zon" => Some(Language::Zon),
        "css" => Some(Language::Css),
        "html" | "htm" => Some(Language::Html),
        "ts" | "tsx" => Some(Language::TypeScript),
        "svelte" => Some(Language::Svelte),
        "zig" => Some(Language::Zig),
        _ => None,
    }
}

/// Parses `source` for every language except Svelte, whose document
/// doesn't fit a single [`zz::ast::Ast`] (see [`format_source`] and
/// [`extract_svelte`], which dispatch through [`zz::parser::svelte`]
/// instead of calling this).
fn parse_source(source: &str, language: Language) -> zz::ast::Ast<'_> {
    match language {
        Language::Json => zz::parser::json::parse(source, zz::lexer::json::Dialect::Strict),
        Language::Zon => zz::parser::zon::parse(source),
        Language::Css => zz::parser::css::parse(source),
        Language::Html => zz::parser::html::parse(source),
        Language::TypeScript => zz::parser::typescript::parse(source),
        Language::Zig => zz::parser::zig::parse(source),
        Language::Svelte | Language::Common => zz::parser::json::parse(source, zz::lexer::json::Dialect::Strict),
    }
}

/// Formats `source`, dispatching Svelte through its own
/// [`zz::parser::svelte::parse`]/[`zz::format::format_svelte`] pipeline
/// (a Svelte document is three per-section sub-ASTs, not one [`Ast`]
/// that [`zz::format::format`] could take directly).
fn format_source(source: &str, language: Language, options: &FormatOptions) -> Vec<u8> {
    if language == Language::Svelte {
        let doc = zz::parser::svelte::parse(source);
        return zz::format::format_svelte(&doc, options);
    }
    let ast = parse_source(source, language);
    zz::format::format(&ast, options)
}

/// Writes `bytes` via a sibling `.zz-tmp-<pid>` file plus a rename, so a
/// reader never observes a half-written file (spec.md §6's `--write`
/// contract). `tempfile` stays a dev-dependency (it backs the CLI's own
/// integration tests instead) rather than a runtime one for this single
/// call site.
fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    let tmp_path = path.with_file_name(format!(".{file_name}.zz-tmp-{}", std::process::id()));
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)
}

fn print_diagnostic(path: &Path, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(stderr, "WARNING: {message}  at {}", path.display());
    let _ = stderr.reset();
}
