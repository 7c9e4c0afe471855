//! Restricted arithmetic evaluator backing the Math model.
//!
//! Accepts digits, `+ - * / ( ) . ^ %` and spaces. `^` is an alias for `**`.
//! Operators follow the usual precedence: `**` binds tighter than a unary
//! minus on its left and is right associative, `//` floors and `%` takes the
//! sign of the divisor. Integers are arbitrary precision. Anything that would
//! not yield a finite number (division by zero, overflow, complex results)
//! evaluates to `None`.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

const ALLOWED_SYMBOLS: &str = "+-*/().^% ";

/// Deepest nesting of parentheses and unary minus signs the parser follows.
const MAX_DEPTH: usize = 200;

/// Integer results and literals are capped to a few thousand decimal digits.
const MAX_INT_DIGITS: usize = 4300;
const MAX_INT_BITS: u64 = 14_300;

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    /// Float view of the number, `None` when an integer is too large for `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Int(i) => i.to_f64().filter(|f| f.is_finite()),
            Number::Float(f) => Some(*f),
        }
    }

    fn int(value: BigInt) -> Option<Number> {
        (value.bits() <= MAX_INT_BITS).then_some(Number::Int(value))
    }

    fn finite(value: f64) -> Option<Number> {
        value.is_finite().then_some(Number::Float(value))
    }

    fn floats(&self, rhs: &Number) -> Option<(f64, f64)> {
        Some((self.as_f64()?, rhs.as_f64()?))
    }

    fn neg(self) -> Option<Number> {
        match self {
            Number::Int(i) => Some(Number::Int(-i)),
            Number::Float(f) => Some(Number::Float(-f)),
        }
    }

    fn add(self, rhs: Number) -> Option<Number> {
        match (&self, &rhs) {
            (Number::Int(a), Number::Int(b)) => Number::int(a + b),
            _ => {
                let (a, b) = self.floats(&rhs)?;
                Number::finite(a + b)
            }
        }
    }

    fn sub(self, rhs: Number) -> Option<Number> {
        match (&self, &rhs) {
            (Number::Int(a), Number::Int(b)) => Number::int(a - b),
            _ => {
                let (a, b) = self.floats(&rhs)?;
                Number::finite(a - b)
            }
        }
    }

    fn mul(self, rhs: Number) -> Option<Number> {
        match (&self, &rhs) {
            (Number::Int(a), Number::Int(b)) => {
                if a.bits() + b.bits() > MAX_INT_BITS + 1 {
                    return None;
                }
                Number::int(a * b)
            }
            _ => {
                let (a, b) = self.floats(&rhs)?;
                Number::finite(a * b)
            }
        }
    }

    fn div(self, rhs: Number) -> Option<Number> {
        let (a, b) = self.floats(&rhs)?;
        if b == 0.0 {
            return None;
        }
        Number::finite(a / b)
    }

    fn floor_div(self, rhs: Number) -> Option<Number> {
        match (&self, &rhs) {
            (Number::Int(a), Number::Int(b)) => {
                let (quotient, _) = int_divmod(a, b)?;
                Number::int(quotient)
            }
            _ => {
                let (a, b) = self.floats(&rhs)?;
                let (quotient, _) = float_divmod(a, b)?;
                Number::finite(quotient)
            }
        }
    }

    fn rem(self, rhs: Number) -> Option<Number> {
        match (&self, &rhs) {
            (Number::Int(a), Number::Int(b)) => {
                let (_, remainder) = int_divmod(a, b)?;
                Number::int(remainder)
            }
            _ => {
                let (a, b) = self.floats(&rhs)?;
                let (_, remainder) = float_divmod(a, b)?;
                Number::finite(remainder)
            }
        }
    }

    fn pow(self, rhs: Number) -> Option<Number> {
        if let (Number::Int(base), Number::Int(exp)) = (&self, &rhs) {
            if !exp.is_negative() {
                return int_pow(base, exp).and_then(Number::int);
            }
        }

        let (base, exp) = self.floats(&rhs)?;
        if base == 0.0 && exp < 0.0 {
            return None;
        }
        // NaN here means a complex result (negative base, fractional exponent)
        Number::finite(base.powf(exp))
    }
}

/// Floored quotient and remainder; the remainder takes the divisor's sign.
fn int_divmod(a: &BigInt, b: &BigInt) -> Option<(BigInt, BigInt)> {
    if b.is_zero() {
        return None;
    }
    let mut quotient = a / b;
    let mut remainder = a % b;
    if !remainder.is_zero() && remainder.is_negative() != b.is_negative() {
        quotient -= BigInt::one();
        remainder += b;
    }
    Some((quotient, remainder))
}

/// Float division with a floored quotient, kept consistent with the
/// remainder so that `a == b * q + r` holds as closely as rounding allows.
fn float_divmod(a: f64, b: f64) -> Option<(f64, f64)> {
    if b == 0.0 {
        return None;
    }
    let mut remainder = a % b;
    let mut quotient = (a - remainder) / b;
    if remainder != 0.0 {
        if (b < 0.0) != (remainder < 0.0) {
            remainder += b;
            quotient -= 1.0;
        }
    } else {
        remainder = 0.0_f64.copysign(b);
    }

    let floored = if quotient != 0.0 {
        let floor = quotient.floor();
        if quotient - floor > 0.5 {
            floor + 1.0
        } else {
            floor
        }
    } else {
        0.0_f64.copysign(a / b)
    };
    Some((floored, remainder))
}

fn int_pow(base: &BigInt, exp: &BigInt) -> Option<BigInt> {
    if base.is_zero() {
        return Some(if exp.is_zero() {
            BigInt::one()
        } else {
            BigInt::zero()
        });
    }
    if base.is_one() {
        return Some(BigInt::one());
    }
    if *base == -BigInt::one() {
        let odd = !(exp % BigInt::from(2)).is_zero();
        return Some(if odd { -BigInt::one() } else { BigInt::one() });
    }

    // |base| >= 2, so the result has at least `exp` bits
    let exp = exp.to_u32().filter(|&e| u64::from(e) <= MAX_INT_BITS)?;
    if (base.bits() - 1).saturating_mul(u64::from(exp)) > MAX_INT_BITS {
        return None;
    }
    Some(base.pow(exp))
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip rendering that always carries a decimal point or an
/// exponent: `2.0`, `0.30000000000000004`, `1e+16`, `1.5e-05`.
fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let scientific = format!("{:e}", value);
        match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => scientific,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let token = match c {
            ' ' => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_literal(&literal)?));
                continue;
            }
            '*' if next == Some('*') => Token::DoubleStar,
            '/' if next == Some('/') => Token::DoubleSlash,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => return None,
        };
        i += match token {
            Token::DoubleStar | Token::DoubleSlash => 2,
            _ => 1,
        };
        tokens.push(token);
    }

    Some(tokens)
}

fn parse_literal(literal: &str) -> Option<Number> {
    if literal == "." {
        return None;
    }
    if literal.contains('.') {
        return literal.parse::<f64>().ok().and_then(Number::finite);
    }
    // decimal integers may not carry leading zeros, except zero itself
    if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
        return None;
    }
    if literal.len() > MAX_INT_DIGITS {
        return None;
    }
    literal.parse::<BigInt>().ok().map(Number::Int)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<Number> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = value.add(self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = value.sub(self.term()?)?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<Number> {
        let mut value = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) => {
                    op.clone()
                }
                _ => return Some(value),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value.mul(rhs)?,
                Token::Slash => value.div(rhs)?,
                Token::DoubleSlash => value.floor_div(rhs)?,
                _ => value.rem(rhs)?,
            };
        }
    }

    /// Every nested parenthesis and every stacked sign passes through here,
    /// so this is where recursion depth is bounded.
    fn unary(&mut self) -> Option<Number> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().and_then(Number::neg)
            }
            // unary plus is not on the operator allow-list
            Some(Token::Plus) => None,
            _ => self.power(),
        };
        self.depth -= 1;
        value
    }

    fn power(&mut self) -> Option<Number> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::DoubleStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return base.pow(exponent);
        }
        Some(base)
    }

    fn atom(&mut self) -> Option<Number> {
        match self.bump()? {
            Token::Num(n) => Some(n),
            Token::LParen => {
                let value = self.expr()?;
                match self.bump()? {
                    Token::RParen => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Evaluates `expr`, returning `None` for anything outside the allowed
/// character set or grammar, or without a finite result.
pub fn evaluate(expr: &str) -> Option<Number> {
    if !expr
        .chars()
        .all(|c| c.is_ascii_digit() || ALLOWED_SYMBOLS.contains(c))
    {
        return None;
    }

    let tokens = tokenize(&expr.replace('^', "**"))?;
    let mut parser = Parser::new(tokens);
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(value)
}
