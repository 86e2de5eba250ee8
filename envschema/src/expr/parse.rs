//! Tokenizer and recursive-descent parser for type expressions

use super::keyword::Keyword;
use crate::coerce::number_value;
use crate::error::ExpressionError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparator {
    /// The comparator seen from the other side (`0 < x` is `x > 0`)
    fn flip(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            Self::Eq => Self::Eq,
        }
    }

    pub(crate) fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Self::Lt => value < limit,
            Self::Le => value <= limit,
            Self::Gt => value > limit,
            Self::Ge => value >= limit,
            Self::Eq => value == limit,
        }
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::Lt => "less than",
            Self::Le => "at most",
            Self::Gt => "more than",
            Self::Ge => "at least",
            Self::Eq => "exactly",
        }
    }
}

/// `value <op> limit`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bound {
    pub(crate) op: Comparator,
    pub(crate) limit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Keyword(Keyword),
    Literal(Value),
    Bounded { inner: Box<Node>, bounds: Vec<Bound> },
    Union(Vec<Node>),
    Intersection(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Num(f64),
    Str(String),
    Pipe,
    Amp,
    LParen,
    RParen,
    Cmp(Comparator),
}

/// Parse the type part of an expression (no inline default).
pub(crate) fn parse(source: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let node = parser.union()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("unexpected token after type"));
    }
    Ok(node)
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        let start = i;

        let token = match b {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'|' => {
                i += 1;
                Token::Pipe
            }
            b'&' => {
                i += 1;
                Token::Amp
            }
            b'(' => {
                i += 1;
                Token::LParen
            }
            b')' => {
                i += 1;
                Token::RParen
            }
            b'<' | b'>' | b'=' => {
                let (op, len) = match (b, next) {
                    (b'<', Some(b'=')) => (Comparator::Le, 2),
                    (b'>', Some(b'=')) => (Comparator::Ge, 2),
                    (b'=', Some(b'=')) => (Comparator::Eq, 2),
                    (b'<', _) => (Comparator::Lt, 1),
                    (b'>', _) => (Comparator::Gt, 1),
                    _ => return Err(syntax(source, i, "unexpected '='")),
                };
                i += len;
                Token::Cmp(op)
            }
            b'\'' | b'"' => {
                let end = source[i + 1..]
                    .find(b as char)
                    .ok_or_else(|| syntax(source, i, "unterminated string literal"))?;
                let text = &source[i + 1..i + 1 + end];
                i += end + 2;
                Token::Str(text.to_string())
            }
            b'0'..=b'9' | b'-' | b'.' => {
                if b != b'-' && b != b'.' || next.is_some_and(|n| n.is_ascii_digit()) {
                    i += 1;
                    while i < bytes.len() {
                        let c = bytes[i];
                        let exponent_sign =
                            matches!(c, b'-' | b'+') && matches!(bytes[i - 1], b'e' | b'E');
                        if c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E') || exponent_sign {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    let text = &source[start..i];
                    let n = text
                        .parse::<f64>()
                        .map_err(|_| syntax(source, start, "invalid number literal"))?;
                    Token::Num(n)
                } else {
                    return Err(syntax(source, i, "unexpected character"));
                }
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'.'))
                {
                    i += 1;
                }
                Token::Ident(source[start..i].to_string())
            }
            _ => return Err(syntax(source, i, "unexpected character")),
        };

        tokens.push((token, start));
    }

    Ok(tokens)
}

fn syntax(source: &str, offset: usize, message: &str) -> ExpressionError {
    ExpressionError::Syntax {
        expression: source.to_string(),
        offset,
        message: message.to_string(),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn error(&self, message: &str) -> ExpressionError {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|(_, offset)| *offset)
            .unwrap_or(self.source.len());
        syntax(self.source, offset, message)
    }

    fn union(&mut self) -> Result<Node, ExpressionError> {
        let mut branches = vec![self.intersection()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            branches.push(self.intersection()?);
        }
        Ok(collapse(branches, Node::Union))
    }

    fn intersection(&mut self) -> Result<Node, ExpressionError> {
        let mut parts = vec![self.bounded()?];
        while self.peek() == Some(&Token::Amp) {
            self.pos += 1;
            parts.push(self.bounded()?);
        }
        Ok(collapse(parts, Node::Intersection))
    }

    fn bounded(&mut self) -> Result<Node, ExpressionError> {
        let mut bounds = Vec::new();

        if let (Some(Token::Num(limit)), Some(Token::Cmp(op))) = (self.peek(), self.peek_second())
        {
            bounds.push(Bound {
                op: op.flip(),
                limit: *limit,
            });
            self.pos += 2;
        }

        let inner = self.atom()?;

        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            match self.advance() {
                Some(Token::Num(limit)) => bounds.push(Bound { op, limit }),
                _ => {
                    self.pos -= 1;
                    return Err(self.error("expected a number after comparator"));
                }
            }
        }

        if bounds.is_empty() {
            Ok(inner)
        } else {
            Ok(Node::Bounded {
                inner: Box::new(inner),
                bounds,
            })
        }
    }

    fn atom(&mut self) -> Result<Node, ExpressionError> {
        match self.advance() {
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Node::Literal(Value::Bool(true))),
                "false" => Ok(Node::Literal(Value::Bool(false))),
                _ => Keyword::lookup(&name).map(Node::Keyword),
            },
            Some(Token::Num(n)) => Ok(Node::Literal(number_value(n))),
            Some(Token::Str(s)) => Ok(Node::Literal(Value::String(s))),
            Some(Token::LParen) => {
                let inner = self.union()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => {
                        self.pos -= 1;
                        Err(self.error("expected ')'"))
                    }
                }
            }
            _ => {
                self.pos -= 1;
                Err(self.error("expected a type"))
            }
        }
    }
}

fn collapse(mut nodes: Vec<Node>, wrap: fn(Vec<Node>) -> Node) -> Node {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}
