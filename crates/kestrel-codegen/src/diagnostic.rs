//! Diagnostic rendering for code generation errors
//!
//! Errors carry front-end source locations (file, line, column, optional
//! byte span). When the source text of a file is registered, the error is
//! rendered with a labelled snippet; otherwise the location goes into a note.

use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{self, Files, SimpleFiles};
use codespan_reporting::term;
use rustc_hash::FxHashMap;
use termcolor::{NoColor, WriteColor};

use crate::error::CodegenError;
use crate::ir::SourceLocation;

/// Stable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// Get the error code for a CodegenError
pub fn error_code(error: &CodegenError) -> ErrorCode {
    use CodegenError::*;

    match error {
        DuplicateSymbol { .. } => ErrorCode("K0001"),
        UnresolvedSymbol { .. } => ErrorCode("K0002"),
        InheritanceCycle { .. } => ErrorCode("K0003"),
        CyclicDeclarativeTree { .. } => ErrorCode("K0101"),
        SharedDeclarativeNode { .. } => ErrorCode("K0102"),
        DanglingNodeReference { .. } => ErrorCode("K0103"),
        MalformedDeclarativeTree { .. } => ErrorCode("K0104"),
        DuplicateIdentityBinding { .. } => ErrorCode("K0105"),
        UnknownEventTarget { .. } => ErrorCode("K0106"),
        EmptyModule { .. } => ErrorCode("K0201"),
        Cancelled => ErrorCode("K0900"),
        Internal { .. } => ErrorCode("K0999"),
    }
}

fn label_message(error: &CodegenError) -> &'static str {
    use CodegenError::*;

    match error {
        DuplicateSymbol { .. } => "redefined here",
        UnresolvedSymbol { .. } => "not a registered class or interface",
        InheritanceCycle { .. } => "inheritance cycle starts here",
        CyclicDeclarativeTree { .. } => "node contains itself",
        SharedDeclarativeNode { .. } => "node has more than one parent",
        DanglingNodeReference { .. } => "unknown node",
        MalformedDeclarativeTree { .. } => "in this tree",
        DuplicateIdentityBinding { .. } => "identity name already used",
        UnknownEventTarget { .. } => "event bound here",
        EmptyModule { .. } => "module has no classes",
        Cancelled | Internal { .. } => "",
    }
}

/// Renders [`CodegenError`]s against registered source files
pub struct DiagnosticRenderer {
    files: SimpleFiles<String, String>,
    ids: FxHashMap<String, usize>,
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticRenderer {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            ids: FxHashMap::default(),
        }
    }

    /// Register the text of a source file so labels can show snippets
    pub fn add_source(&mut self, path: impl Into<String>, source: impl Into<String>) -> usize {
        let path = path.into();
        let id = self.files.add(path.clone(), source.into());
        self.ids.insert(path, id);
        id
    }

    /// Build the codespan diagnostic for `error`
    pub fn to_diagnostic(&self, error: &CodegenError) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::error()
            .with_message(error.to_string())
            .with_code(error_code(error).0);

        let mut labels = Vec::new();
        let mut notes = Vec::new();

        if let Some(location) = error.location() {
            match self.label_range(location) {
                Some((file, range)) => {
                    labels.push(Label::primary(file, range).with_message(label_message(error)));
                }
                None => notes.push(format!("at {}", location)),
            }
        }

        if let CodegenError::DuplicateSymbol { first: Some(first), .. } = error {
            match self.label_range(first) {
                Some((file, range)) => {
                    labels.push(Label::secondary(file, range).with_message("first defined here"));
                }
                None => notes.push(format!("first defined at {}", first)),
            }
        }

        if let CodegenError::InheritanceCycle { cycle, .. } = error {
            if let Some(first) = cycle.first() {
                notes.push(format!("help: break the cycle by changing the base class of {}", first));
            }
        }

        diagnostic = diagnostic.with_labels(labels);
        diagnostic.with_notes(notes)
    }

    /// Write `error` to `writer`
    pub fn emit(&self, writer: &mut dyn WriteColor, error: &CodegenError) -> Result<(), files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, &self.files, &self.to_diagnostic(error))
    }

    /// Render `error` without colors
    pub fn render_to_string(&self, error: &CodegenError) -> Result<String, files::Error> {
        let mut writer = NoColor::new(Vec::new());
        self.emit(&mut writer, error)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    fn label_range(&self, location: &SourceLocation) -> Option<(usize, Range<usize>)> {
        let file = *self.ids.get(&location.file)?;
        if let Some(span) = location.span {
            return Some((file, span.start as usize..span.end as usize));
        }
        let line = self
            .files
            .line_range(file, location.line.saturating_sub(1) as usize)
            .ok()?;
        let start = (line.start + location.column.saturating_sub(1) as usize).min(line.end);
        let text = self.files.source(file).ok()?;
        let end = text[start..line.end]
            .find(|c: char| c.is_whitespace())
            .map(|offset| start + offset)
            .unwrap_or(line.end)
            .max(start);
        Some((file, start..end))
    }
}
