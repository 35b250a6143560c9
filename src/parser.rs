// ABOUTME: Recursive-descent parser turning a token stream into an AST

use crate::ast::{BinOp, Expr, Param, Stmt, UnOp};
use crate::error::ParseError;
use crate::lexer::{Keyword, Punct, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parses the full token stream into a sequence of top-level statements.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    // -- token stream helpers -------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check_punct(&self, p: Punct) -> bool {
        matches!(&self.peek().kind, TokenKind::Punct(k) if *k == p)
    }

    fn check_keyword(&self, k: Keyword) -> bool {
        matches!(&self.peek().kind, TokenKind::Keyword(kw) if *kw == k)
    }

    fn expect_punct(&mut self, p: Punct, expected: &str) -> Result<(), ParseError> {
        if self.check_punct(p) {
            self.advance();
            Ok(())
        } else {
            let tok = self.peek().clone();
            Err(ParseError::UnexpectedToken {
                line: tok.line,
                expected: expected.to_string(),
                found: tok.describe(),
            })
        }
    }

    fn expect_ident(&mut self, context: &str) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => {
                let tok = self.peek().clone();
                Err(ParseError::UnexpectedToken {
                    line: tok.line,
                    expected: context.to_string(),
                    found: tok.describe(),
                })
            }
        }
    }

    fn take_ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(s) = &self.peek().kind {
            let s = s.clone();
            self.advance();
            Some(s)
        } else {
            None
        }
    }

    /// `? … { … } otherwise { … }` and similar block forms tolerate an
    /// optional trailing `;`.
    fn maybe_consume_semicolon(&mut self) {
        if self.check_punct(Punct::Semicolon) {
            self.advance();
        }
    }

    // -- statements -------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match &self.peek().kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_var_decl(),
            TokenKind::Punct(Punct::Question) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Ident(_)
                if matches!(self.peek_at(1).kind, TokenKind::Punct(Punct::LParen))
                    || matches!(self.peek_at(1).kind, TokenKind::Punct(Punct::Eq)) =>
            {
                self.parse_ident_led_statement()
            }
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // 'var'
        let name = self.expect_ident("identifier")?;
        let mut type_annotation = None;
        if self.check_punct(Punct::Colon) {
            self.advance();
            type_annotation = Some(self.expect_ident("type name")?);
        }
        self.expect_punct(Punct::Eq, "'='")?;
        let init = self.parse_expr()?;
        self.expect_punct(Punct::Semicolon, "';'")?;
        Ok(Stmt::VarDecl {
            name,
            type_annotation,
            init,
            line,
        })
    }

    /// Disambiguates `IDENT = expr;` (assignment), `IDENT(...) => ...`
    /// (function declaration), and a bare expression/call statement that
    /// happens to start with an identifier.
    fn parse_ident_led_statement(&mut self) -> Result<Stmt, ParseError> {
        let checkpoint = self.pos;
        let line = self.peek().line;
        let name = self.expect_ident("identifier")?;

        if self.check_punct(Punct::LParen) {
            if let Some(stmt) = self.try_parse_function_decl(name.clone(), line) {
                return Ok(stmt);
            }
            self.pos = checkpoint;
            return self.parse_expr_statement();
        }

        if self.check_punct(Punct::Eq) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect_punct(Punct::Semicolon, "';'")?;
            return Ok(Stmt::Assign { name, expr, line });
        }

        self.pos = checkpoint;
        self.parse_expr_statement()
    }

    /// Attempts to parse `( params ) [: type] => body` starting at the `(`.
    /// Returns `None` (without caring how far it consumed) if the pattern
    /// doesn't match; the caller resets the cursor on `None`.
    fn try_parse_function_decl(&mut self, name: String, line: usize) -> Option<Stmt> {
        self.advance(); // '('
        let mut params = Vec::new();
        if !self.check_punct(Punct::RParen) {
            loop {
                let pname = self.take_ident()?;
                let mut type_annotation = None;
                if self.check_punct(Punct::Colon) {
                    self.advance();
                    type_annotation = Some(self.take_ident()?);
                }
                params.push(Param {
                    name: pname,
                    type_annotation,
                });
                if self.check_punct(Punct::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        if !self.check_punct(Punct::RParen) {
            return None;
        }
        self.advance(); // ')'

        let mut return_type = None;
        if self.check_punct(Punct::Colon) {
            self.advance();
            return_type = Some(self.take_ident()?);
        }

        if !self.check_punct(Punct::FatArrow) {
            return None;
        }
        self.advance(); // '=>'

        let body = self.parse_function_body().ok()?;
        Some(Stmt::FunctionDecl {
            name,
            params,
            return_type,
            body,
            line,
        })
    }

    /// `=> expr;` desugars to a single `return expr;`. `=> { … }` is a block
    /// containing arbitrary statements.
    fn parse_function_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check_punct(Punct::LBrace) {
            let body = self.parse_block()?;
            self.maybe_consume_semicolon();
            Ok(body)
        } else {
            let line = self.peek().line;
            let expr = self.parse_expr()?;
            self.expect_punct(Punct::Semicolon, "';'")?;
            Ok(vec![Stmt::Return {
                expr: Some(expr),
                line,
            }])
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect_punct(Punct::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check_punct(Punct::RBrace) {
            if self.is_eof() {
                return Err(ParseError::MissingTerminator {
                    line: self.peek().line,
                    expected: "'}'".to_string(),
                });
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance(); // '}'
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // '?'
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let mut else_block = None;
        if self.check_keyword(Keyword::Otherwise) {
            self.advance();
            if self.check_punct(Punct::Question) {
                else_block = Some(vec![self.parse_if()?]);
            } else {
                else_block = Some(self.parse_block()?);
            }
        }
        self.maybe_consume_semicolon();
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            line,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // 'while'
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        self.maybe_consume_semicolon();
        Ok(Stmt::While { cond, body, line })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // 'for'
        let var_name = self.expect_ident("loop variable")?;
        if !self.check_keyword(Keyword::In) {
            let tok = self.peek().clone();
            return Err(ParseError::UnexpectedToken {
                line: tok.line,
                expected: "'in'".to_string(),
                found: tok.describe(),
            });
        }
        self.advance(); // 'in'
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        self.maybe_consume_semicolon();
        Ok(Stmt::For {
            var_name,
            iterable,
            body,
            line,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // 'return'
        if self.check_punct(Punct::Semicolon) {
            self.advance();
            return Ok(Stmt::Return { expr: None, line });
        }
        let expr = self.parse_expr()?;
        self.expect_punct(Punct::Semicolon, "';'")?;
        Ok(Stmt::Return {
            expr: Some(expr),
            line,
        })
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        self.expect_punct(Punct::Semicolon, "';'")?;
        Ok(Stmt::ExprStmt(expr))
    }

    // -- expressions, lowest to highest precedence -------------------------

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check_keyword(Keyword::Or) {
            let line = self.peek().line;
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right), line);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.check_keyword(Keyword::And) {
            let line = self.peek().line;
            self.advance();
            let right = self.parse_not()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right), line);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check_keyword(Keyword::Not) {
            let line = self.peek().line;
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::Unary(UnOp::Not, Box::new(operand), line));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_range()?;
        let op = match &self.peek().kind {
            TokenKind::Punct(Punct::EqEq) => Some(BinOp::Eq),
            TokenKind::Punct(Punct::NotEq) => Some(BinOp::NotEq),
            TokenKind::Punct(Punct::Lt) => Some(BinOp::Lt),
            TokenKind::Punct(Punct::Gt) => Some(BinOp::Gt),
            TokenKind::Punct(Punct::LtEq) => Some(BinOp::LtEq),
            TokenKind::Punct(Punct::GtEq) => Some(BinOp::GtEq),
            _ => None,
        };
        match op {
            Some(op) => {
                let line = self.peek().line;
                self.advance();
                let right = self.parse_range()?;
                Ok(Expr::Binary(op, Box::new(left), Box::new(right), line))
            }
            None => Ok(left),
        }
    }

    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        if self.check_punct(Punct::DotDot) {
            let line = self.peek().line;
            self.advance();
            let right = self.parse_additive()?;
            return Ok(Expr::Range(Box::new(left), Box::new(right), line));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Punct(Punct::Plus) => BinOp::Add,
                TokenKind::Punct(Punct::Minus) => BinOp::Sub,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right), line);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Punct(Punct::Star) => BinOp::Mul,
                TokenKind::Punct(Punct::Slash) => BinOp::Div,
                TokenKind::Punct(Punct::Percent) => BinOp::Rem,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.parse_exponent()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right), line);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_unary()?;
        if self.check_punct(Punct::Pow) {
            let line = self.peek().line;
            self.advance();
            let right = self.parse_exponent()?; // right-associative
            return Ok(Expr::Binary(BinOp::Pow, Box::new(left), Box::new(right), line));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check_punct(Punct::Minus) {
            let line = self.peek().line;
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnOp::Neg, Box::new(operand), line));
        }
        self.parse_call()
    }

    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.check_punct(Punct::LParen) {
            let line = self.peek().line;
            self.advance();
            let mut args = Vec::new();
            if !self.check_punct(Punct::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if self.check_punct(Punct::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            self.expect_punct(Punct::RParen, "')'")?;
            expr = Expr::Call(Box::new(expr), args, line);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n, tok.line))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::String(s, tok.line))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Bool(true, tok.line))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Bool(false, tok.line))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name, tok.line))
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(Punct::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check_punct(Punct::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        if self.check_punct(Punct::Comma) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect_punct(Punct::RBracket, "']'")?;
                Ok(Expr::Array(elements, tok.line))
            }
            _ => Err(ParseError::UnexpectedToken {
                line: tok.line,
                expected: "expression".to_string(),
                found: tok.describe(),
            }),
        }
    }
}

/// Convenience wrapper: tokenizes and parses a full source text.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, crate::error::SharkError> {
    let tokens = crate::lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse_program()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = tokenize(src).expect("lex ok");
        Parser::new(tokens).parse_program().expect("parse ok")
    }

    #[test]
    fn test_var_decl() {
        let stmts = parse("var x = 1 + 2;");
        assert_eq!(stmts.len(), 1);
        assert!(matches!(&stmts[0], Stmt::VarDecl { name, .. } if name == "x"));
    }

    #[test]
    fn test_var_decl_with_type_annotation_is_parsed_and_ignored() {
        let stmts = parse("var x: int = 1;");
        match &stmts[0] {
            Stmt::VarDecl {
                type_annotation, ..
            } => assert_eq!(type_annotation.as_deref(), Some("int")),
            _ => panic!("expected var decl"),
        }
    }

    #[test]
    fn test_assignment_vs_function_decl() {
        let stmts = parse("x = 5; f(x) => x + 1;");
        assert!(matches!(&stmts[0], Stmt::Assign { name, .. } if name == "x"));
        assert!(matches!(&stmts[1], Stmt::FunctionDecl { name, .. } if name == "f"));
    }

    #[test]
    fn test_call_statement_not_mistaken_for_decl() {
        let stmts = parse(r#"print("hi");"#);
        assert!(matches!(&stmts[0], Stmt::ExprStmt(Expr::Call(..))));
    }

    #[test]
    fn test_block_function_decl() {
        let stmts = parse(
            r#"fatorial(n) => {
                ? n <= 1 { return 1; }
                return n * fatorial(n - 1);
            }"#,
        );
        match &stmts[0] {
            Stmt::FunctionDecl { name, body, .. } => {
                assert_eq!(name, "fatorial");
                assert_eq!(body.len(), 2);
            }
            _ => panic!("expected function decl"),
        }
    }

    #[test]
    fn test_if_otherwise_chain() {
        let stmts = parse(
            r#"? a >= 9 { print("A"); } otherwise {
                ? a >= 7 { print("B"); } otherwise { print("C"); }
            }"#,
        );
        match &stmts[0] {
            Stmt::If {
                else_block: Some(else_body),
                ..
            } => {
                assert_eq!(else_body.len(), 1);
                assert!(matches!(else_body[0], Stmt::If { .. }));
            }
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn test_chained_otherwise_question_form() {
        let stmts = parse(r#"? a { print(1); } otherwise ? b { print(2); }"#);
        match &stmts[0] {
            Stmt::If {
                else_block: Some(else_body),
                ..
            } => assert_eq!(else_body.len(), 1),
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn test_for_range() {
        let stmts = parse("for i in 1..11 { s = s + i; }");
        assert!(matches!(&stmts[0], Stmt::For { var_name, .. } if var_name == "i"));
    }

    #[test]
    fn test_precedence_additive_before_comparison() {
        // a + 1 < b should parse as (a + 1) < b, not a + (1 < b)
        let stmts = parse("var r = a + 1 < b;");
        match &stmts[0] {
            Stmt::VarDecl { init, .. } => match init {
                Expr::Binary(BinOp::Lt, lhs, _, _) => {
                    assert!(matches!(**lhs, Expr::Binary(BinOp::Add, ..)));
                }
                _ => panic!("expected comparison at top"),
            },
            _ => panic!("expected var decl"),
        }
    }

    #[test]
    fn test_exponent_right_associative() {
        // 2 ** 3 ** 2 == 2 ** (3 ** 2)
        let stmts = parse("var r = 2 ** 3 ** 2;");
        match &stmts[0] {
            Stmt::VarDecl { init, .. } => match init {
                Expr::Binary(BinOp::Pow, _, rhs, _) => {
                    assert!(matches!(**rhs, Expr::Binary(BinOp::Pow, ..)));
                }
                _ => panic!("expected pow"),
            },
            _ => panic!("expected var decl"),
        }
    }

    #[test]
    fn test_array_literal() {
        let stmts = parse("var v = [1, 2, 3];");
        match &stmts[0] {
            Stmt::VarDecl { init, .. } => match init {
                Expr::Array(elements, _) => assert_eq!(elements.len(), 3),
                _ => panic!("expected array"),
            },
            _ => panic!("expected var decl"),
        }
    }

    #[test]
    fn test_missing_semicolon_errors() {
        let tokens = tokenize("var x = 1").unwrap();
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }
}
