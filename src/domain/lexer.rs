//! Rule DSL lexer.
//!
//! Turns DSL text into a token stream with byte positions so parse errors can
//! point back into the source. Keywords are reserved and case-sensitive;
//! `>=`/`<=` are lexed greedily before `>`/`<`.

use crate::domain::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Entry,
    Exit,
    And,
    Or,
    Crosses,
    Above,
    Below,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Entry => "ENTRY",
            Keyword::Exit => "EXIT",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Crosses => "CROSSES",
            Keyword::Above => "ABOVE",
            Keyword::Below => "BELOW",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "ENTRY" => Some(Keyword::Entry),
            "EXIT" => Some(Keyword::Exit),
            "AND" => Some(Keyword::And),
            "OR" => Some(Keyword::Or),
            "CROSSES" => Some(Keyword::Crosses),
            "ABOVE" => Some(Keyword::Above),
            "BELOW" => Some(Keyword::Below),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        }
    }

    /// Row-wise truth of the operator. NaN operands compare false for every
    /// variant, which is exactly the warm-up policy the evaluator needs.
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            CmpOp::Gt => left > right,
            CmpOp::Lt => left < right,
            CmpOp::Ge => left >= right,
            CmpOp::Le => left <= right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Keyword(Keyword),
    Cmp(CmpOp),
    LParen,
    RParen,
    Comma,
    Colon,
}

impl TokenKind {
    /// Short description for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Number(v) => format!("number {}", v),
            TokenKind::Keyword(kw) => format!("'{}'", kw.as_str()),
            TokenKind::Cmp(op) => format!("'{}'", op.as_str()),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Colon => "':'".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Tokenize DSL text. Whitespace (including newlines between the ENTRY and
/// EXIT sections) separates tokens and is otherwise insignificant.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = input[pos..].chars().next().unwrap_or('\0');

        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let start = pos;
            while pos < bytes.len()
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
            {
                pos += 1;
            }
            let word = &input[start..pos];
            let kind = match Keyword::from_word(word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token { kind, pos: start });
            continue;
        }

        if ch.is_ascii_digit() {
            let start = pos;
            let mut has_dot = false;
            while pos < bytes.len() {
                if bytes[pos].is_ascii_digit() {
                    pos += 1;
                } else if bytes[pos] == b'.' && !has_dot {
                    has_dot = true;
                    pos += 1;
                } else {
                    break;
                }
            }
            let text = &input[start..pos];
            let value: f64 = text.parse().map_err(|_| SyntaxError {
                message: format!("invalid number: {}", text),
                position: start,
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                pos: start,
            });
            continue;
        }

        let start = pos;
        let kind = match ch {
            '>' if bytes.get(pos + 1) == Some(&b'=') => {
                pos += 2;
                TokenKind::Cmp(CmpOp::Ge)
            }
            '<' if bytes.get(pos + 1) == Some(&b'=') => {
                pos += 2;
                TokenKind::Cmp(CmpOp::Le)
            }
            '>' => {
                pos += 1;
                TokenKind::Cmp(CmpOp::Gt)
            }
            '<' => {
                pos += 1;
                TokenKind::Cmp(CmpOp::Lt)
            }
            '(' => {
                pos += 1;
                TokenKind::LParen
            }
            ')' => {
                pos += 1;
                TokenKind::RParen
            }
            ',' => {
                pos += 1;
                TokenKind::Comma
            }
            ':' => {
                pos += 1;
                TokenKind::Colon
            }
            other => {
                return Err(SyntaxError {
                    message: format!("unexpected character '{}'", other),
                    position: start,
                });
            }
        };
        tokens.push(Token { kind, pos: start });
    }

    Ok(tokens)
}
