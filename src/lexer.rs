// ABOUTME: Lexer turning Shark source text into a line-annotated token stream

use crate::error::LexError;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{opt, value},
    sequence::pair,
    IResult, Parser,
};

/// A numeric literal, preserving the integer/float distinction from the
/// source text (a literal is a float iff it contains `.`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLit {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    For,
    In,
    While,
    Return,
    Otherwise,
    True,
    False,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Pow,      // **
    EqEq,     // ==
    NotEq,    // !=
    LtEq,     // <=
    GtEq,     // >=
    DotDot,   // ..
    FatArrow, // =>
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Question,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(NumberLit),
    String(String),
    Ident(String),
    Keyword(Keyword),
    Punct(Punct),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(_) => "number".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Ident(s) => format!("identifier '{s}'"),
            TokenKind::Keyword(k) => format!("'{}'", keyword_text(*k)),
            TokenKind::Punct(p) => format!("'{}'", punct_text(*p)),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

fn keyword_text(k: Keyword) -> &'static str {
    match k {
        Keyword::Var => "var",
        Keyword::For => "for",
        Keyword::In => "in",
        Keyword::While => "while",
        Keyword::Return => "return",
        Keyword::Otherwise => "otherwise",
        Keyword::True => "true",
        Keyword::False => "false",
        Keyword::And => "and",
        Keyword::Or => "or",
        Keyword::Not => "not",
    }
}

fn punct_text(p: Punct) -> &'static str {
    match p {
        Punct::Pow => "**",
        Punct::EqEq => "==",
        Punct::NotEq => "!=",
        Punct::LtEq => "<=",
        Punct::GtEq => ">=",
        Punct::DotDot => "..",
        Punct::FatArrow => "=>",
        Punct::Plus => "+",
        Punct::Minus => "-",
        Punct::Star => "*",
        Punct::Slash => "/",
        Punct::Percent => "%",
        Punct::Lt => "<",
        Punct::Gt => ">",
        Punct::Eq => "=",
        Punct::LParen => "(",
        Punct::RParen => ")",
        Punct::LBrace => "{",
        Punct::RBrace => "}",
        Punct::LBracket => "[",
        Punct::RBracket => "]",
        Punct::Comma => ",",
        Punct::Semicolon => ";",
        Punct::Colon => ":",
        Punct::Question => "?",
    }
}

fn keyword_from_ident(s: &str) -> Option<Keyword> {
    Some(match s {
        "var" => Keyword::Var,
        "for" => Keyword::For,
        "in" => Keyword::In,
        "while" => Keyword::While,
        "return" => Keyword::Return,
        "otherwise" => Keyword::Otherwise,
        "true" => Keyword::True,
        "false" => Keyword::False,
        "and" => Keyword::And,
        "or" => Keyword::Or,
        "not" => Keyword::Not,
        _ => return None,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '\u{03BC}' || c == '\u{03C3}' || c == '\u{03A3}'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parses a numeric literal: leading digits, optionally `.` followed by at
/// least one digit to make it a float. Negative numbers are produced by
/// unary minus at the parser stage, not here.
fn parse_number(input: &str) -> IResult<&str, NumberLit> {
    let (input, int_part) = digit1(input)?;
    match opt(pair(char('.'), digit1)).parse(input)? {
        (rest, Some((_, frac))) => {
            let text = format!("{int_part}.{frac}");
            let value: f64 = text.parse().expect("validated float literal");
            Ok((rest, NumberLit::Float(value)))
        }
        (rest, None) => {
            let value: i64 = int_part.parse().expect("validated int literal");
            Ok((rest, NumberLit::Int(value)))
        }
    }
}

fn parse_ident_or_keyword(input: &str) -> IResult<&str, TokenKind> {
    let (input, first) = nom::character::complete::satisfy(is_ident_start)(input)?;
    let (input, rest) = nom::bytes::complete::take_while(is_ident_continue)(input)?;
    let mut name = String::new();
    name.push(first);
    name.push_str(rest);
    match keyword_from_ident(&name) {
        Some(kw) => Ok((input, TokenKind::Keyword(kw))),
        None => Ok((input, TokenKind::Ident(name))),
    }
}

fn parse_string_body(input: &str) -> Result<(String, &str), LexError> {
    let mut result = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((result, &input[idx + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, other)) => {
                    result.push('\\');
                    result.push(other);
                }
                None => break,
            },
            other => result.push(other),
        }
    }
    Err(LexError::UnterminatedString(0))
}

fn parse_punct(input: &str) -> IResult<&str, Punct> {
    alt((
        value(Punct::Pow, tag("**")),
        value(Punct::EqEq, tag("==")),
        value(Punct::NotEq, tag("!=")),
        value(Punct::LtEq, tag("<=")),
        value(Punct::GtEq, tag(">=")),
        value(Punct::DotDot, tag("..")),
        value(Punct::FatArrow, tag("=>")),
        value(Punct::Plus, char('+')),
        value(Punct::Minus, char('-')),
        value(Punct::Star, char('*')),
        value(Punct::Slash, char('/')),
        value(Punct::Percent, char('%')),
        value(Punct::Lt, char('<')),
        value(Punct::Gt, char('>')),
        value(Punct::Eq, char('=')),
        value(Punct::LParen, char('(')),
        value(Punct::RParen, char(')')),
        value(Punct::LBrace, char('{')),
        value(Punct::RBrace, char('}')),
        value(Punct::LBracket, char('[')),
        value(Punct::RBracket, char(']')),
        value(Punct::Comma, char(',')),
        value(Punct::Semicolon, char(';')),
        value(Punct::Colon, char(':')),
        value(Punct::Question, char('?')),
    ))
    .parse(input)
}

/// Consumes a run of whitespace and `//` line comments, returning how many
/// newlines were skipped so the driving loop can keep the line counter.
fn skip_ws_and_comments(input: &str) -> (&str, usize) {
    let mut rest = input;
    let mut newlines = 0;
    loop {
        if let Some(stripped) = rest.strip_prefix("//") {
            let end = stripped.find('\n').unwrap_or(stripped.len());
            rest = &stripped[end..];
            continue;
        }
        let ws_len = rest
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| c.len_utf8())
            .sum::<usize>();
        if ws_len == 0 {
            break;
        }
        newlines += rest[..ws_len].matches('\n').count();
        rest = &rest[ws_len..];
        if !rest.starts_with("//") {
            break;
        }
    }
    (rest, newlines)
}

/// Tokenizes the full source text, producing a stream terminated by `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1usize;

    loop {
        let (after_ws, newlines) = skip_ws_and_comments(rest);
        line += newlines;
        rest = after_ws;

        if rest.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
            });
            break;
        }

        let start_line = line;
        let c = rest.chars().next().expect("non-empty");

        if c == '"' {
            let body_start = &rest[1..];
            match parse_string_body(body_start) {
                Ok((text, after)) => {
                    line += rest[..rest.len() - after.len()].matches('\n').count();
                    tokens.push(Token {
                        kind: TokenKind::String(text),
                        line: start_line,
                    });
                    rest = after;
                }
                Err(_) => return Err(LexError::UnterminatedString(start_line)),
            }
            continue;
        }

        if c.is_ascii_digit() {
            let (after, num) = parse_number(rest).map_err(|_| LexError::UnexpectedChar(c, start_line))?;
            tokens.push(Token {
                kind: TokenKind::Number(num),
                line: start_line,
            });
            rest = after;
            continue;
        }

        if is_ident_start(c) {
            let (after, kind) =
                parse_ident_or_keyword(rest).map_err(|_| LexError::UnexpectedChar(c, start_line))?;
            tokens.push(Token {
                kind,
                line: start_line,
            });
            rest = after;
            continue;
        }

        if let Ok((after, punct)) = parse_punct(rest) {
            tokens.push(Token {
                kind: TokenKind::Punct(punct),
                line: start_line,
            });
            rest = after;
            continue;
        }

        return Err(LexError::UnexpectedChar(c, start_line));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind.clone()).collect()
    }

    #[test]
    fn test_number_int_vs_float() {
        let t = tokenize("42 3.14").unwrap();
        assert_eq!(
            kinds(&t),
            vec![
                TokenKind::Number(NumberLit::Int(42)),
                TokenKind::Number(NumberLit::Float(3.14)),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_greek_identifiers() {
        let t = tokenize("μ σ Σ").unwrap();
        assert_eq!(
            kinds(&t),
            vec![
                TokenKind::Ident("\u{03BC}".to_string()),
                TokenKind::Ident("\u{03C3}".to_string()),
                TokenKind::Ident("\u{03A3}".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_vs_idents() {
        let t = tokenize("var x otherwise notx").unwrap();
        assert_eq!(
            kinds(&t),
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Ident("x".to_string()),
                TokenKind::Keyword(Keyword::Otherwise),
                TokenKind::Ident("notx".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators_longest_match_first() {
        let t = tokenize("** == != <= >= .. => = < >").unwrap();
        assert_eq!(
            kinds(&t),
            vec![
                TokenKind::Punct(Punct::Pow),
                TokenKind::Punct(Punct::EqEq),
                TokenKind::Punct(Punct::NotEq),
                TokenKind::Punct(Punct::LtEq),
                TokenKind::Punct(Punct::GtEq),
                TokenKind::Punct(Punct::DotDot),
                TokenKind::Punct(Punct::FatArrow),
                TokenKind::Punct(Punct::Eq),
                TokenKind::Punct(Punct::Lt),
                TokenKind::Punct(Punct::Gt),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let t = tokenize(r#""hello\nworld\t\"x\"""#).unwrap();
        match &t[0].kind {
            TokenKind::String(s) => assert_eq!(s, "hello\nworld\t\"x\""),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_string_reports_line() {
        let err = tokenize("1;\n\"oops").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString(2));
    }

    #[test]
    fn test_line_comment_skipped() {
        let t = tokenize("1 // comment\n2").unwrap();
        assert_eq!(
            kinds(&t),
            vec![
                TokenKind::Number(NumberLit::Int(1)),
                TokenKind::Number(NumberLit::Int(2)),
                TokenKind::Eof
            ]
        );
        assert_eq!(t[1].line, 2);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("1 @ 2").unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar('@', 1));
    }
}
