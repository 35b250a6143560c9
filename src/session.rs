// ABOUTME: Session facade exposing evaluate_source and evaluate_line to external collaborators

use crate::ast::Stmt;
use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::SharkError;
use crate::eval::{eval_stmt, Signal};
use crate::lexer::tokenize;
use crate::parser::Parser;
use std::rc::Rc;

/// A persistent evaluator instance for REPL use. The global frame survives
/// across calls to `evaluate_line`; a failed statement's partial effects are
/// rolled back before the error is surfaced (spec §5).
pub struct Session {
    env: Rc<Environment>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let env = Environment::global();
        register_builtins(&env);
        Session { env }
    }

    /// Parses `text` as zero or more top-level statements and evaluates each
    /// against this session's global frame. Returns the display form of the
    /// last statement, if it is an expression statement; `None` otherwise.
    /// On error, the global frame is restored to its state before this call.
    pub fn evaluate_line(&mut self, text: &str) -> Result<Option<String>, SharkError> {
        let tokens = tokenize(text)?;
        let stmts = Parser::new(tokens).parse_program()?;

        let mut last_display = None;
        for (i, stmt) in stmts.iter().enumerate() {
            let snapshot = self.env.snapshot();
            match eval_stmt(stmt, &self.env) {
                Ok(signal) => {
                    last_display = if i == stmts.len() - 1 {
                        match (stmt, signal) {
                            (Stmt::ExprStmt(_), Signal::Normal(value)) => Some(value.to_string()),
                            _ => None,
                        }
                    } else {
                        None
                    };
                }
                Err(err) => {
                    self.env.restore(snapshot);
                    return Err(SharkError::Runtime(err));
                }
            }
        }
        Ok(last_display)
    }
}

/// Drives a fresh interpreter session to completion over `text`. Aborts on
/// the first lex/parse/runtime error (no rollback — the whole program is one
/// unit, per spec §7).
pub fn evaluate_source(text: &str) -> Result<(), SharkError> {
    let tokens = tokenize(text)?;
    let stmts = Parser::new(tokens).parse_program()?;
    let env = Environment::global();
    register_builtins(&env);
    for stmt in &stmts {
        eval_stmt(stmt, &env)?;
    }
    Ok(())
}
