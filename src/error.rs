use std::io::Write;

use thiserror::Error;

use crate::token::{Token, Type};

/// A scan-time error, anchored only to a line (no token exists yet).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// A syntax error raised while parsing a token stream.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

/// A static error raised by the resolver (syntactically valid, semantically not).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

/// An error raised while evaluating a well-formed, well-resolved program.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

/// The injected error-reporter threaded through every pipeline stage (spec §2).
/// Replaces a pair of `static mut` flags with an explicit, non-`unsafe` collaborator
/// that also owns the diagnostic sink.
pub struct Diagnostics<W: Write> {
    sink: W,
    had_error: bool,
    had_runtime_error: bool,
}

impl<W: Write> Diagnostics<W> {
    pub fn new(sink: W) -> Self {
        Diagnostics { sink, had_error: false, had_runtime_error: false }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Resets both flags between REPL lines; the interpreter's globals and the
    /// resolver's side-table are untouched by this.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    pub fn scan_error(&mut self, err: &ScanError) {
        let _ = writeln!(self.sink, "[line {}] Error: {}", err.line, err.message);
        self.had_error = true;
    }

    fn token_error(&mut self, token: &Token, message: &str) {
        let location = if token.r#type == Type::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        let _ = writeln!(self.sink, "[line {}] Error{}: {}", token.line, location, message);
        self.had_error = true;
    }

    pub fn parse_error(&mut self, err: &ParseError) {
        self.token_error(&err.token, &err.message);
    }

    pub fn resolve_error(&mut self, err: &ResolveError) {
        self.token_error(&err.token, &err.message);
    }

    pub fn runtime_error(&mut self, err: &RuntimeError) {
        let _ = writeln!(self.sink, "{}\n[line {}]", err.message, err.token.line);
        self.had_runtime_error = true;
    }
}
