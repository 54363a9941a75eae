// Arithmetic expression parsing.
//
// `parse` turns user input into an `Expr` tree. The tree's `Display` output is
// the normalized echo shown back to the user ("2+2" prints as "2 + 2"), and
// parenthesis groups survive as `Expr::Group` so the echo keeps the user's
// grouping. Numeric evaluation lives in `evaluator`.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("{message} (char {position})")]
    Syntax { message: String, position: usize },
    #[error("Undefined symbol {0}")]
    UndefinedSymbol(String),
    #[error("Undefined function {0}")]
    UndefinedFunction(String),
    #[error("Wrong number of arguments in function {name} ({given} provided, {expected} expected)")]
    Arity {
        name: String,
        expected: &'static str,
        given: usize,
    },
    #[error("{0}")]
    Domain(String),
}

impl MathError {
    /// Error class shown in front of the message in replies.
    pub fn kind(&self) -> &'static str {
        match self {
            MathError::Syntax { .. } => "SyntaxError",
            MathError::Arity { .. } => "TypeError",
            _ => "Error",
        }
    }

    fn syntax(message: impl Into<String>, position: usize) -> Self {
        MathError::Syntax {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Mod => '%',
            BinaryOp::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        /// Written as juxtaposition, e.g. `2 pi`.
        implicit: bool,
    },
    Factorial(Box<Expr>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Group(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => f.write_str(&format_number(*value)),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Plus => write!(f, "+{}", operand),
            },
            Expr::Binary {
                op,
                lhs,
                rhs,
                implicit,
            } => {
                if *implicit {
                    write!(f, "{} {}", lhs, rhs)
                } else {
                    write!(f, "{} {} {}", lhs, op.symbol(), rhs)
                }
            }
            Expr::Factorial(operand) => write!(f, "{}!", operand),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Group(inner) => write!(f, "({})", inner),
        }
    }
}

/// Render a number the way a JavaScript `Number` prints.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// PARSER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => f.write_str(&format_number(*value)),
            Token::Ident(name) => f.write_str(name),
            Token::Op(op) => write!(f, "{}", op),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

/// Token plus its 1-based character position in the input.
struct Lexeme {
    token: Token,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Lexeme>, MathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let position = i + 1;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Exponent only when digits follow, so `2e` stays `2 * e`.
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text.parse::<f64>().map_err(|_| {
                MathError::syntax(format!("Invalid number \"{}\"", text), position)
            })?;
            lexemes.push(Lexeme {
                token: Token::Number(value),
                position,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            lexemes.push(Lexeme {
                token: Token::Ident(chars[start..i].iter().collect()),
                position,
            });
            continue;
        }

        let token = match c {
            '+' | '-' | '*' | '/' | '%' | '^' | '!' => Token::Op(c),
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            _ => {
                return Err(MathError::syntax(
                    format!("Syntax error in part \"{}\"", c),
                    position,
                ))
            }
        };
        lexemes.push(Lexeme { token, position });
        i += 1;
    }

    Ok(lexemes)
}

/// Deepest nesting the parser accepts. Parentheses, call arguments, prefix
/// signs, exponents and operator chains each count one level.
pub const MAX_DEPTH: usize = 256;

struct Parser {
    lexemes: Vec<Lexeme>,
    cursor: usize,
    end_position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.lexemes.get(self.cursor).map(|l| &l.token)
    }

    fn position(&self) -> usize {
        self.lexemes
            .get(self.cursor)
            .map(|l| l.position)
            .unwrap_or(self.end_position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.lexemes.get(self.cursor).map(|l| l.token.clone());
        self.cursor += 1;
        token
    }

    fn peek_op(&self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn starts_value(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Number(_)) | Some(Token::Ident(_)) | Some(Token::LParen)
        )
    }

    /// Go one level deeper. Callers reset `depth` to their entry value on success.
    fn descend(&mut self) -> Result<(), MathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MathError::syntax(
                "Maximum nesting depth exceeded",
                self.position(),
            ));
        }
        Ok(())
    }

    fn parse_additive(&mut self) -> Result<Expr, MathError> {
        let entry = self.depth;
        self.descend()?;

        let mut lhs = self.parse_multiplicative()?;
        while let Some(op) = self.peek_op(&['+', '-']) {
            self.advance();
            self.descend()?;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary {
                op: if op == '+' { BinaryOp::Add } else { BinaryOp::Sub },
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                implicit: false,
            };
        }

        self.depth = entry;
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, MathError> {
        let entry = self.depth;

        let mut lhs = self.parse_unary()?;
        loop {
            let (op, implicit) = if let Some(op) = self.peek_op(&['*', '/', '%']) {
                self.advance();
                let op = match op {
                    '*' => BinaryOp::Mul,
                    '/' => BinaryOp::Div,
                    _ => BinaryOp::Mod,
                };
                (op, false)
            } else if self.starts_value() {
                (BinaryOp::Mul, true)
            } else {
                break;
            };

            self.descend()?;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                implicit,
            };
        }

        self.depth = entry;
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, MathError> {
        if let Some(op) = self.peek_op(&['-', '+']) {
            let entry = self.depth;
            self.advance();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.depth = entry;
            return Ok(Expr::Unary {
                op: if op == '-' { UnaryOp::Neg } else { UnaryOp::Plus },
                operand: Box::new(operand),
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, MathError> {
        let base = self.parse_postfix()?;
        if self.peek_op(&['^']).is_some() {
            let entry = self.depth;
            self.advance();
            self.descend()?;
            // Right-associative, and the exponent may carry its own sign.
            let exponent = self.parse_unary()?;
            self.depth = entry;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
                implicit: false,
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, MathError> {
        let entry = self.depth;
        let mut expr = self.parse_primary()?;
        while self.peek_op(&['!']).is_some() {
            self.descend()?;
            self.advance();
            expr = Expr::Factorial(Box::new(expr));
        }
        self.depth = entry;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, MathError> {
        let position = self.position();
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Symbol(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_additive()?;
                self.expect_close()?;
                Ok(Expr::Group(Box::new(inner)))
            }
            Some(_) => Err(MathError::syntax("Value expected", position)),
            None => Err(MathError::syntax("Unexpected end of expression", position)),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, MathError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_additive()?);
            if self.peek() == Some(&Token::Comma) {
                self.advance();
                continue;
            }
            self.expect_close()?;
            return Ok(args);
        }
    }

    fn expect_close(&mut self) -> Result<(), MathError> {
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            Ok(())
        } else {
            Err(MathError::syntax("Parenthesis ) expected", self.position()))
        }
    }
}

/// Parse `input` into an expression tree no deeper than `MAX_DEPTH`.
pub fn parse(input: &str) -> Result<Expr, MathError> {
    let lexemes = tokenize(input)?;
    let mut parser = Parser {
        lexemes,
        cursor: 0,
        end_position: input.chars().count() + 1,
        depth: 0,
    };

    let expr = parser.parse_additive()?;
    if let Some(token) = parser.peek() {
        let message = format!("Unexpected \"{}\"", token);
        return Err(MathError::syntax(message, parser.position()));
    }
    Ok(expr)
}
