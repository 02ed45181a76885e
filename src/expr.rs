//! Boolean expression parsing and evaluation
//!
//! Equation text is parsed into an explicit expression tree and evaluated
//! by tree walk, so the grammar is testable on its own and nothing is
//! interpreted at evaluation time. Input literals are resolved to physical
//! address bits once, when the equation file is compiled.

use std::fmt;

use fxhash::FxHashSet;

use crate::remap::PinRemapTable;

/// Expression tree for one output function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Constant 0 or 1
    Const(bool),
    /// Test of one physical address bit
    Input(usize),
    /// Logical negation
    Not(Box<Expr>),
    /// Logical conjunction
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate the expression against an address word
    pub fn eval(&self, addr: u64) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::Input(bit) => (addr >> bit) & 1 != 0,
            Expr::Not(e) => !e.eval(addr),
            Expr::And(a, b) => a.eval(addr) && b.eval(addr),
            Expr::Or(a, b) => a.eval(addr) || b.eval(addr),
        }
    }
}

/// A compiled output function: a named pure map from address word to bit
#[derive(Debug, Clone)]
pub struct OutputFn {
    /// Declared output name
    pub name: String,
    expr: Expr,
}

impl OutputFn {
    /// Evaluate the output at the given address
    pub fn eval(&self, addr: u64) -> bool {
        self.expr.eval(addr)
    }
}

/// Errors aborting an equation file compile
///
/// A single bad equation fails the whole file; nothing is skipped
/// silently and no partial function set is returned.
#[derive(Debug)]
pub enum ExprError {
    /// Statement without `=`
    MissingEquals {
        /// The statement text
        statement: String,
    },
    /// Output with an empty right-hand side
    EmptyExpression {
        /// Name of the output
        name: String,
    },
    /// The same output name is defined twice
    DuplicateOutput {
        /// Name of the output
        name: String,
    },
    /// A name that is not an input literal
    UnknownName {
        /// The unresolvable name
        name: String,
        /// Output whose expression uses it
        output: String,
    },
    /// Input literal outside `A1..A<num_inputs>`
    LiteralOutOfRange {
        /// The literal text
        name: String,
        /// Declared number of inputs
        num_inputs: usize,
        /// Output whose expression uses it
        output: String,
    },
    /// A literal whose remapped position does not fit the address word
    AddressBitOutOfRange {
        /// The literal text
        name: String,
        /// Remapped physical bit
        physical: usize,
        /// Output whose expression uses it
        output: String,
    },
    /// Token that does not fit the grammar at this position
    UnexpectedToken {
        /// The token text
        token: String,
        /// Output being parsed
        output: String,
    },
    /// Expression ends too early: unbalanced parenthesis or missing operand
    UnexpectedEnd {
        /// Output being parsed
        output: String,
    },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::MissingEquals { statement } => {
                write!(f, "statement {:?} has no '='", statement)
            }
            ExprError::EmptyExpression { name } => {
                write!(f, "output {}: empty right-hand side", name)
            }
            ExprError::DuplicateOutput { name } => {
                write!(f, "output {} is defined twice", name)
            }
            ExprError::UnknownName { name, output } => {
                write!(f, "output {}: unknown literal {:?}", output, name)
            }
            ExprError::LiteralOutOfRange {
                name,
                num_inputs,
                output,
            } => write!(
                f,
                "output {}: literal {} outside A1..A{}",
                output, name, num_inputs
            ),
            ExprError::AddressBitOutOfRange {
                name,
                physical,
                output,
            } => write!(
                f,
                "output {}: literal {} maps to bit {} beyond the address word",
                output, name, physical
            ),
            ExprError::UnexpectedToken { token, output } => {
                write!(f, "output {}: unexpected token {:?}", output, token)
            }
            ExprError::UnexpectedEnd { output } => {
                write!(f, "output {}: unexpected end of expression", output)
            }
        }
    }
}

impl std::error::Error for ExprError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Digits(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "{}", name),
            Token::Digits(digits) => write!(f, "{}", digits),
            Token::Not => write!(f, "!"),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(text: &str, output: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '!' => tokens.push(Token::Not),
            '&' => tokens.push(Token::And),
            // `+` is an alternative spelling of OR
            '|' | '+' => tokens.push(Token::Or),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            c if c.is_whitespace() => (),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                name.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                digits.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() {
                        digits.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Digits(digits));
            }
            c => {
                return Err(ExprError::UnexpectedToken {
                    token: c.to_string(),
                    output: output.to_string(),
                })
            }
        }
    }
    Ok(tokens)
}

/// Recursive descent over the token list, NOT > AND > OR, left-associative
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    output: &'a str,
    remap: &'a PinRemapTable,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(ExprError::UnexpectedToken {
                token: token.to_string(),
                output: self.output.to_string(),
            }),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_factor()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.pos += 1;
            let rhs = self.parse_factor()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.parse_factor()?))),
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    Some(token) => Err(ExprError::UnexpectedToken {
                        token: token.to_string(),
                        output: self.output.to_string(),
                    }),
                    None => Err(ExprError::UnexpectedEnd {
                        output: self.output.to_string(),
                    }),
                }
            }
            Some(Token::Name(name)) => self.resolve(&name),
            Some(Token::Digits(digits)) => match digits.as_str() {
                "0" => Ok(Expr::Const(false)),
                "1" => Ok(Expr::Const(true)),
                _ => Err(ExprError::UnexpectedToken {
                    token: digits,
                    output: self.output.to_string(),
                }),
            },
            Some(token) => Err(ExprError::UnexpectedToken {
                token: token.to_string(),
                output: self.output.to_string(),
            }),
            None => Err(ExprError::UnexpectedEnd {
                output: self.output.to_string(),
            }),
        }
    }

    /// Resolve `A<k>` to its physical address bit through the address map
    fn resolve(&self, name: &str) -> Result<Expr, ExprError> {
        let digits = name
            .strip_prefix('A')
            .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
        let Some(digits) = digits else {
            return Err(ExprError::UnknownName {
                name: name.to_string(),
                output: self.output.to_string(),
            });
        };
        let k: usize = digits.parse().map_err(|_| ExprError::LiteralOutOfRange {
            name: name.to_string(),
            num_inputs: self.remap.num_inputs,
            output: self.output.to_string(),
        })?;
        if k == 0 || k > self.remap.num_inputs {
            return Err(ExprError::LiteralOutOfRange {
                name: name.to_string(),
                num_inputs: self.remap.num_inputs,
                output: self.output.to_string(),
            });
        }
        let physical = self.remap.address_bit(k - 1);
        if physical >= u64::BITS as usize {
            return Err(ExprError::AddressBitOutOfRange {
                name: name.to_string(),
                physical,
                output: self.output.to_string(),
            });
        }
        Ok(Expr::Input(physical))
    }
}

/// Compile an equation file into output functions, in declaration order
///
/// Statements are `Name = <expr>;`, `#`-prefixed lines are comments, and
/// whitespace including newlines is insignificant inside an expression.
/// Any malformed statement aborts the whole compile.
pub fn compile_equations(text: &str, remap: &PinRemapTable) -> Result<Vec<OutputFn>, ExprError> {
    let stream = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let mut ret = Vec::new();
    let mut seen = FxHashSet::default();
    for statement in stream.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        let Some((name, rhs)) = statement.split_once('=') else {
            return Err(ExprError::MissingEquals {
                statement: statement.to_string(),
            });
        };
        let name = name.trim().to_string();
        let rhs = rhs.trim();
        if name.is_empty() {
            return Err(ExprError::MissingEquals {
                statement: statement.to_string(),
            });
        }
        if rhs.is_empty() {
            return Err(ExprError::EmptyExpression { name });
        }
        if !seen.insert(name.clone()) {
            return Err(ExprError::DuplicateOutput { name });
        }
        let tokens = tokenize(rhs, &name)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            output: &name,
            remap,
        };
        let expr = parser.parse_expression()?;
        ret.push(OutputFn { name, expr });
    }
    Ok(ret)
}
