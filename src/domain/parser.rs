//! Rule DSL parser.
//!
//! Recursive descent over the token stream from [`lexer`](crate::domain::lexer).
//! Converts `ENTRY: <expr>` / `EXIT: <expr>` text into a raw [`Expr`] pair with
//! meaningful error messages carrying byte offsets and expected/found tokens.
//!
//! # Precedence
//!
//! The informal grammar leaves precedence open, so it is fixed here, lowest
//! to highest:
//!
//! 1. `OR` (left-associative)
//! 2. `AND` (left-associative)
//! 3. comparison (`>` `<` `>=` `<=`) and `CROSSES ABOVE`/`CROSSES BELOW`,
//!    non-chaining: both operands are primaries, so comparisons of
//!    comparisons cannot be expressed.
//!
//! There is no parenthesized grouping; nesting happens only inside indicator
//! argument lists.

use crate::domain::error::SyntaxError;
use crate::domain::expr::{CrossDir, Expr, LogicOp, Strategy};
use crate::domain::lexer::{tokenize, Keyword, Token, TokenKind};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn here(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.end)
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => token.kind.describe(),
            None => "end of input".to_string(),
        }
    }

    fn error(&self, expected: &str) -> SyntaxError {
        SyntaxError {
            message: format!("expected {}, found {}", expected, self.found()),
            position: self.here(),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Keyword(keyword) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(&format!("'{}'", keyword.as_str()))),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(expected)),
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Keyword(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// strategy := ENTRY ':' expr EXIT ':' expr
    fn parse_strategy(&mut self) -> Result<Strategy, SyntaxError> {
        self.expect_keyword(Keyword::Entry)?;
        self.expect(TokenKind::Colon, "':'")?;
        let entry = self.parse_expr()?;

        self.expect_keyword(Keyword::Exit)?;
        self.expect(TokenKind::Colon, "':'")?;
        let exit = self.parse_expr()?;

        if self.peek().is_some() {
            return Err(self.error("end of input"));
        }

        Ok(Strategy { entry, exit })
    }

    /// expr := and_expr (OR and_expr)*
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and_expr()?;
        while self.consume_keyword(Keyword::Or) {
            let right = self.parse_and_expr()?;
            left = Expr::Logical {
                op: LogicOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// and_expr := rel_expr (AND rel_expr)*
    fn parse_and_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_rel_expr()?;
        while self.consume_keyword(Keyword::And) {
            let right = self.parse_rel_expr()?;
            left = Expr::Logical {
                op: LogicOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// rel_expr := primary (cmp primary | CROSSES (ABOVE|BELOW) primary)?
    ///
    /// A bare primary is returned as-is; the builder rejects it wherever a
    /// boolean expression is required.
    fn parse_rel_expr(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_primary()?;

        if let Some(Token {
            kind: TokenKind::Cmp(op),
            ..
        }) = self.peek()
        {
            let op = *op;
            self.pos += 1;
            let right = self.parse_primary()?;
            return Ok(Expr::Comparison {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        if self.consume_keyword(Keyword::Crosses) {
            let dir = if self.consume_keyword(Keyword::Above) {
                CrossDir::Above
            } else if self.consume_keyword(Keyword::Below) {
                CrossDir::Below
            } else {
                return Err(self.error("'ABOVE' or 'BELOW'"));
            };
            let right = self.parse_primary()?;
            return Ok(Expr::Cross {
                dir,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    /// primary := NUMBER | IDENT ('(' primary (',' primary)* ')')?
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().cloned() {
            Some(Token {
                kind: TokenKind::Number(value),
                ..
            }) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                self.pos += 1;
                if self.peek().map(|t| &t.kind) == Some(&TokenKind::LParen) {
                    self.pos += 1;
                    let mut args = vec![self.parse_primary()?];
                    while self.peek().map(|t| &t.kind) == Some(&TokenKind::Comma) {
                        self.pos += 1;
                        args.push(self.parse_primary()?);
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    Ok(Expr::Indicator { name, args })
                } else {
                    Ok(Expr::Column(name))
                }
            }
            _ => Err(self.error("identifier or number")),
        }
    }
}

/// Parse DSL text into a raw, unvalidated [`Strategy`]. Indicator names and
/// argument kinds are checked afterwards by [`builder`](crate::domain::builder).
pub fn parse(input: &str) -> Result<Strategy, SyntaxError> {
    Parser::new(input)?.parse_strategy()
}

/// Parse a single expression (one section's rule) without the section headers.
pub fn parse_expr(input: &str) -> Result<Expr, SyntaxError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expr()?;
    if parser.peek().is_some() {
        return Err(parser.error("end of input"));
    }
    Ok(expr)
}
