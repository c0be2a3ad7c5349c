#![allow(clippy::needless_return)]

//! loxrs is a tree-walking interpreter for Lox, the teaching language from
//! Bob Nystrom's *Crafting Interpreters*. Lox is dynamically typed, lexically
//! scoped, and has first-class functions and single-inheritance classes.
//!
//! ## Scanning
//! The first stage turns source text into a flat token stream. The scanner
//! lives in [`scanner`] as a single forward pass over the characters with a
//! little lookahead, and reports lexical problems (an unterminated string, an
//! unrecognized character) through a [`ScanError`](error::ScanError) per
//! occurrence rather than stopping at the first one.
//!
//! ## Parsing
//! The token stream becomes an AST: [`Expr`](expr::Expr) nodes that produce
//! an [`Object`](object::Object) when evaluated, and [`Stmt`](stmt::Stmt)
//! nodes that run for effect. [`parser`] is a hand-written recursive descent
//! parser; a malformed program is reported one [`ParseError`](error::ParseError)
//! at a time and the parser resynchronizes at the next statement boundary so
//! later mistakes surface too.
//!
//! ## Resolving
//! Before anything runs, [`resolver`] walks the AST once more to bind every
//! variable reference to the number of scopes between its use and its
//! declaration, and to catch mistakes that are syntactically fine but make no
//! sense lexically (reading a variable in its own initializer, `return`
//! outside a function, `this` outside a class). These surface as
//! [`ResolveError`](error::ResolveError)s.
//!
//! ## Interpreting
//! [`interpreter`] walks the resolved AST directly, maintaining a chain of
//! [`Environment`](environment::Environment)s for lexical scoping. Problems
//! that can only be caught while running (adding a number to a class, calling
//! something that isn't callable) are reported as
//! [`RuntimeError`](error::RuntimeError)s.

use std::io::{self, Write};
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use error::Diagnostics;
use interpreter::Interpreter;
use parser::{Interpretable, Parser};
use resolver::Resolver;
use scanner::Scanner;
use stmt::Stmt;

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

/// Drives the scan/parse/resolve/interpret pipeline for a single program, and
/// keeps the state that has to survive across individual REPL lines: the
/// interpreter's environment chain, and the expression-id counter the parser
/// and resolver share.
pub struct Lox<'a> {
    interpreter: Interpreter<'a>,
    diagnostics: Diagnostics<io::Stderr>,
    next_expr_id: u32,
}

impl<'a> Lox<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        Lox {
            interpreter: Interpreter::new(output),
            diagnostics: Diagnostics::new(io::stderr()),
            next_expr_id: 0,
        }
    }

    pub fn run_file(&mut self, path: String) {
        let contents = fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("Could not read file {path}: {err}");
            process::exit(66);
        });

        self.run(&contents);

        if self.diagnostics.had_error() {
            process::exit(65);
        }
        if self.diagnostics.had_runtime_error() {
            process::exit(70);
        }
    }

    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("terminal supports line editing");

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    self.diagnostics.reset();
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    break;
                }
            }
        }
    }

    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens(|err| self.diagnostics.scan_error(&err));
        tracing::debug!(tokens = tokens.len(), "scanned");

        if self.diagnostics.had_error() {
            return;
        }

        let mut parser = Parser::new(tokens, self.next_expr_id);
        let interpretable = parser.parse(|err| self.diagnostics.parse_error(&err));
        self.next_expr_id = parser.next_id();

        if self.diagnostics.had_error() {
            return;
        }

        match interpretable {
            Interpretable::Statements(statements) => {
                {
                    let mut resolver = Resolver::new(&mut self.interpreter, |err| self.diagnostics.resolve_error(&err));
                    resolver.resolve(&statements);
                }

                if self.diagnostics.had_error() {
                    return;
                }

                tracing::debug!(statements = statements.len(), "running");
                if let Err(err) = self.interpreter.interpret(&statements) {
                    self.diagnostics.runtime_error(&err);
                }
            }
            Interpretable::Expression(Some(expr)) => {
                let statements = [Stmt::Expression(stmt::ExpressionData { expr })];

                {
                    let mut resolver = Resolver::new(&mut self.interpreter, |err| self.diagnostics.resolve_error(&err));
                    resolver.resolve(&statements);
                }

                if self.diagnostics.had_error() {
                    return;
                }

                let [Stmt::Expression(stmt::ExpressionData { expr })] = statements else { unreachable!() };

                match self.interpreter.evaluate(&expr) {
                    Ok(value) => self.interpreter.print_value(&value),
                    Err(err) => self.diagnostics.runtime_error(&err),
                }
            }
            Interpretable::Expression(None) => {}
        }
    }
}
