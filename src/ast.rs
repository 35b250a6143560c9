// ABOUTME: AST node types produced by the parser and consumed by the evaluator

use crate::lexer::NumberLit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// A function parameter with an optional, evaluator-ignored type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberLit, usize),
    String(String, usize),
    Bool(bool, usize),
    Ident(String, usize),
    Array(Vec<Expr>, usize),
    Range(Box<Expr>, Box<Expr>, usize),
    Binary(BinOp, Box<Expr>, Box<Expr>, usize),
    Unary(UnOp, Box<Expr>, usize),
    Call(Box<Expr>, Vec<Expr>, usize),
    /// Reserved for future indexing support; never produced by the parser.
    #[allow(dead_code)]
    Index(Box<Expr>, Box<Expr>, usize),
    FunctionLiteral(Vec<Param>, Vec<Stmt>, usize),
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Number(_, line)
            | Expr::String(_, line)
            | Expr::Bool(_, line)
            | Expr::Ident(_, line)
            | Expr::Array(_, line)
            | Expr::Range(_, _, line)
            | Expr::Binary(_, _, _, line)
            | Expr::Unary(_, _, line)
            | Expr::Call(_, _, line)
            | Expr::Index(_, _, line)
            | Expr::FunctionLiteral(_, _, line) => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        name: String,
        type_annotation: Option<String>,
        init: Expr,
        line: usize,
    },
    Assign {
        name: String,
        expr: Expr,
        line: usize,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
        line: usize,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        line: usize,
    },
    For {
        var_name: String,
        iterable: Expr,
        body: Vec<Stmt>,
        line: usize,
    },
    Return {
        expr: Option<Expr>,
        line: usize,
    },
    FunctionDecl {
        name: String,
        params: Vec<Param>,
        return_type: Option<String>,
        body: Vec<Stmt>,
        line: usize,
    },
    ExprStmt(Expr),
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::VarDecl { line, .. }
            | Stmt::Assign { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::FunctionDecl { line, .. } => *line,
            Stmt::ExprStmt(e) => e.line(),
        }
    }
}
