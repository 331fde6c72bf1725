//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::frontend::diagnostics::{Severity, render};
use crate::frontend::location::FileId;
use crate::frontend::source::read_source;
use crate::frontend::workspace::{CancellationToken, Workspace};
use crate::frontend::{lexer, parser};
use crate::query::{completions_at, find_definition, find_references};

use super::{CliError, CliResult, ExitCode, Level};

/// Maximum source file size for the debug commands (100 MB)
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a single document for the debug commands.
fn read_document(path: &Path) -> CliResult<String> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }
    read_source(path).map_err(|e| CliError::failure(e.to_string()))
}

pub fn lex_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_document(path)?;
    for tok in lexer::lex(&source) {
        println!(
            "{}:{} {} {:?}",
            tok.position.line + 1,
            tok.position.column + 1,
            tok.kind.label(),
            tok.text
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn parse_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_document(path)?;
    let output = parser::parse_source(&source);
    println!("{}", output.root.sexpr());
    let name = path.display().to_string();
    for diagnostic in &output.diagnostics {
        eprintln!("{}", render(&name, &source, diagnostic));
    }
    if output.diagnostics.iter().any(|d| d.severity == Severity::Error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Load and analyze the whole corpus, reusing persisted units when a cache is configured.
fn load(config: &WorkspaceConfig) -> CliResult<Workspace> {
    if !config.root.is_dir() {
        return Err(CliError::failure(format!(
            "Corpus root '{}' is not a directory",
            config.root.display()
        )));
    }
    let mut workspace = Workspace::open(config.clone()).map_err(|e| CliError::failure(e.to_string()))?;
    let report = workspace
        .update_from_disk(&CancellationToken::new())
        .map_err(|e| CliError::failure(e.to_string()))?;
    for file in &report.failed {
        eprintln!("warning: could not read {file}");
    }
    Ok(workspace)
}

/// Identity of a document given on the command line, relative to the root or absolute.
fn document(workspace: &Workspace, path: &Path) -> CliResult<FileId> {
    let full: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.config().root.join(path)
    };
    workspace
        .convention()
        .file_id(&full)
        .ok_or_else(|| CliError::failure(format!("'{}' is not a document of this corpus", path.display())))
}

pub fn check(config: &WorkspaceConfig, level: Level) -> CliResult<ExitCode> {
    let workspace = load(config)?;
    let diagnostics = workspace.graph().diagnostics();

    let mut errors = 0usize;
    let mut shown = 0usize;
    let mut current: Option<(FileId, String)> = None;
    for item in &diagnostics {
        if item.diagnostic.severity == Severity::Error {
            errors += 1;
        }
        if !level.admits(item.diagnostic.severity) {
            continue;
        }
        if current.as_ref().is_none_or(|(file, _)| *file != item.file) {
            let path = workspace.convention().path_of(&item.file);
            // A file that vanished since analysis still gets its plain message.
            let text = read_source(&path).unwrap_or_default();
            current = Some((item.file.clone(), text));
        }
        if let Some((_, text)) = &current {
            println!("{}", render(&item.file.to_string(), text, &item.diagnostic));
        }
        shown += 1;
    }

    println!(
        "{} files, {} diagnostics ({} errors), {} shown",
        workspace.graph().units().len(),
        diagnostics.len(),
        errors,
        shown
    );
    Ok(if errors > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

pub fn find(config: &WorkspaceConfig, path: &Path, line: u32, column: u32) -> CliResult<ExitCode> {
    let workspace = load(config)?;
    let file = document(&workspace, path)?;
    let graph = workspace.graph();
    let Some(symbol) = find_definition(graph, &file, line.saturating_sub(1), column.saturating_sub(1)) else {
        return Err(CliError::failure(format!("no symbol at {file}:{line}:{column}")));
    };

    let position = |file: &FileId, offset: usize| {
        graph
            .unit(file)
            .map(|u| u.line_index.position(offset))
            .map(|p| format!("{file}:{}:{}", p.line + 1, p.column + 1))
            .unwrap_or_else(|| file.to_string())
    };
    println!(
        "{} ({}) at {}",
        symbol.id,
        symbol.family.as_str(),
        position(&symbol.id.module.file, symbol.span.start)
    );
    for reference in find_references(graph, &symbol.id) {
        println!("  {} {}", position(&reference.id.file, reference.span.start), reference.display);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn complete(config: &WorkspaceConfig, path: &Path, partial: &str) -> CliResult<ExitCode> {
    let workspace = load(config)?;
    let file = document(&workspace, path)?;
    for completion in completions_at(workspace.graph(), &file, partial) {
        println!("{completion}");
    }
    Ok(ExitCode::SUCCESS)
}
