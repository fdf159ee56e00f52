//! Formula tokenizer

use std::fmt;

/// Whitelisted math functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Abs,
    Sqrt,
    Pow,
    Exp,
    Log,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Function {
    pub const ALL: [Function; 13] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Abs,
        Self::Sqrt,
        Self::Pow,
        Self::Exp,
        Self::Log,
        Self::Floor,
        Self::Ceil,
        Self::Round,
        Self::Min,
        Self::Max,
    ];

    /// Case-insensitive lookup
    pub fn from_name(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(word))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Apply to already-evaluated arguments
    ///
    /// Returns `None` on an arity mismatch.
    pub fn apply(self, args: &[f64]) -> Option<f64> {
        let unary = |f: fn(f64) -> f64| match args {
            [v] => Some(f(*v)),
            _ => None,
        };
        match self {
            Self::Sin => unary(f64::sin),
            Self::Cos => unary(f64::cos),
            Self::Tan => unary(f64::tan),
            Self::Abs => unary(f64::abs),
            Self::Sqrt => unary(f64::sqrt),
            Self::Exp => unary(f64::exp),
            Self::Log => unary(f64::ln),
            Self::Floor => unary(f64::floor),
            Self::Ceil => unary(f64::ceil),
            // Half rounds up, including for negatives
            Self::Round => unary(|v| (v + 0.5).floor()),
            Self::Pow => match args {
                [base, exp] => Some(base.powf(*exp)),
                _ => None,
            },
            Self::Min => args.iter().copied().reduce(f64::min),
            Self::Max => args.iter().copied().reduce(f64::max),
        }
    }

    /// Human-readable arity, used in error messages
    pub fn arity(self) -> &'static str {
        match self {
            Self::Pow => "2 arguments",
            Self::Min | Self::Max => "at least 1 argument",
            _ => "1 argument",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Number(f64),
    /// One of `+ - * / ^`
    Operator(char),
    LParen,
    RParen,
    Comma,
    Function(Function),
    /// A non-whitelisted word directly followed by `(`
    UnknownFunction(&'a str),
    Variable(&'a str),
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | ')' | ',')
}

fn classify(word: &str) -> Token<'_> {
    let numeric = word.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if numeric {
        if let Ok(v) = word.parse::<f64>() {
            return Token::Number(v);
        }
    }
    match Function::from_name(word) {
        Some(f) => Token::Function(f),
        None => Token::Variable(word),
    }
}

/// True for a mantissa followed by `e`, such as `1.5e`; a sign after it
/// belongs to the exponent
fn awaits_exponent(word: &str) -> bool {
    let Some(mantissa) = word.strip_suffix(['e', 'E']) else {
        return false;
    };
    mantissa.chars().any(|c| c.is_ascii_digit())
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Split a formula body (text after the `=`) into tokens
///
/// Tokenizing never fails; words that are not numbers or functions become
/// variables and are judged later by the parser.
pub fn tokenize(body: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if is_separator(c) {
            chars.next();
            tokens.push(match c {
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                op => Token::Operator(op),
            });
            continue;
        }

        let mut end = body.len();
        while let Some(&(i, c)) = chars.peek() {
            let exponent_sign = matches!(c, '+' | '-') && awaits_exponent(&body[start..i]);
            if is_separator(c) && !exponent_sign {
                end = i;
                break;
            }
            chars.next();
        }
        let word = &body[start..end];

        // Look past whitespace for a call
        let called = body[end..].trim_start().starts_with('(');
        let token = match classify(word) {
            Token::Variable(name) if called => Token::UnknownFunction(name),
            other => other,
        };
        tokens.push(token);
    }

    tokens
}
