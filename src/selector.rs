//! Parser for the label-selector expression language.
//!
//! ```text
//! expr  := and ("||" and)*
//! and   := unary ("&&" unary)*
//! unary := "!" unary | "(" expr ")" | term
//! term  := all() | global() | has(label)
//!        | label ("==" | "!=" | contains | starts with | ends with) string
//!        | label ["not"] in "{" [string ("," string)*] "}"
//! ```
//!
//! An empty (or all-whitespace) selector is `all()`.

use std::fmt;

const MAX_DEPTH: usize = 128;

/// Parsed selector expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    All,
    Global,
    Has(String),
    Equal(String, String),
    NotEqual(String, String),
    In(String, Vec<String>),
    NotIn(String, Vec<String>),
    Contains(String, String),
    StartsWith(String, String),
    EndsWith(String, String),
    Not(Box<Selector>),
    And(Vec<Selector>),
    Or(Vec<Selector>),
}

impl Selector {
    /// True if `global()` appears anywhere in the expression.
    pub fn contains_global(&self) -> bool {
        match self {
            Selector::Global => true,
            Selector::Not(inner) => inner.contains_global(),
            Selector::And(terms) | Selector::Or(terms) => terms.iter().any(Selector::contains_global),
            _ => false,
        }
    }

    /// True if `global()` appears alongside any other term.
    pub fn combines_global(&self) -> bool {
        self.contains_global() && *self != Selector::Global
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "all()"),
            Selector::Global => write!(f, "global()"),
            Selector::Has(label) => write!(f, "has({})", label),
            Selector::Equal(k, v) => write!(f, "{} == {}", k, Quoted(v)),
            Selector::NotEqual(k, v) => write!(f, "{} != {}", k, Quoted(v)),
            Selector::In(k, vs) => write!(f, "{} in {}", k, SetDisplay(vs)),
            Selector::NotIn(k, vs) => write!(f, "{} not in {}", k, SetDisplay(vs)),
            Selector::Contains(k, v) => write!(f, "{} contains {}", k, Quoted(v)),
            Selector::StartsWith(k, v) => write!(f, "{} starts with {}", k, Quoted(v)),
            Selector::EndsWith(k, v) => write!(f, "{} ends with {}", k, Quoted(v)),
            Selector::Not(inner) => write!(f, "!{}", inner),
            Selector::And(terms) => write_joined(f, terms, " && "),
            Selector::Or(terms) => write_joined(f, terms, " || "),
        }
    }
}

struct SetDisplay<'a>(&'a [String]);

impl fmt::Display for SetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", Quoted(v))?;
        }
        write!(f, "}}")
    }
}

/// Strings have no escapes, so a value holding `"` is wrapped in `'` instead.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.contains('"') {
            write!(f, "'{}'", self.0)
        } else {
            write!(f, "\"{}\"", self.0)
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Selector], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", t)?;
    }
    write!(f, ")")
}

/// Selector syntax error with the byte offset it was detected at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector at offset {}: {}", self.position, self.message)
    }
}

impl std::error::Error for SelectorError {}

/// Parses a selector expression.
pub fn parse(input: &str) -> Result<Selector, SelectorError> {
    let tokens = tokenize(input)?;
    if tokens.len() == 1 {
        return Ok(Selector::All);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let sel = parser.parse_or()?;
    let (tok, at) = parser.peek();
    if *tok != Token::Eof {
        return Err(SelectorError {
            message: format!("unexpected {} after expression", tok),
            position: at,
        });
    }
    Ok(sel)
}

// ─── Tokenizer ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    All,
    Global,
    Has(String),
    Label(String),
    Str(String),
    Eq,
    Ne,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    Not,
    And,
    Or,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::All => write!(f, "'all()'"),
            Token::Global => write!(f, "'global()'"),
            Token::Has(l) => write!(f, "'has({})'", l),
            Token::Label(l) => write!(f, "label '{}'", l),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::In => write!(f, "'in'"),
            Token::NotIn => write!(f, "'not in'"),
            Token::Contains => write!(f, "'contains'"),
            Token::StartsWith => write!(f, "'starts with'"),
            Token::EndsWith => write!(f, "'ends with'"),
            Token::Not => write!(f, "'!'"),
            Token::And => write!(f, "'&&'"),
            Token::Or => write!(f, "'||'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

/// Matches `word` at the start of `s` when not followed by a label character.
fn keyword(s: &str, word: &str) -> bool {
    s.starts_with(word) && !s[word.len()..].chars().next().is_some_and(is_label_char)
}

/// Matches `name(` + optional whitespace + `)` and returns the consumed length.
fn call0(s: &str, name: &str) -> Option<usize> {
    let rest = s.strip_prefix(name)?.strip_prefix('(')?;
    let inner = rest.len() - rest.trim_start().len();
    rest[inner..].starts_with(')').then_some(name.len() + 1 + inner + 1)
}

/// Collapses runs of whitespace between two keywords, e.g. `not   in`.
fn two_words(s: &str, first: &str, second: &str) -> Option<usize> {
    let rest = s.strip_prefix(first)?;
    let gap = rest.len() - rest.trim_start().len();
    if gap == 0 {
        return None;
    }
    keyword(&rest[gap..], second).then_some(first.len() + gap + second.len())
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, SelectorError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let rest = &input[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();
        let s = trimmed;
        let start = pos;

        let (tok, len) = if let Some(n) = call0(s, "all") {
            (Token::All, n)
        } else if let Some(n) = call0(s, "global") {
            (Token::Global, n)
        } else if let Some(rest) = s.strip_prefix("has(") {
            let ws = rest.len() - rest.trim_start().len();
            let label_len = rest[ws..].chars().take_while(|c| is_label_char(*c)).count();
            let after = &rest[ws + label_len..];
            let ws2 = after.len() - after.trim_start().len();
            if label_len == 0 || !after[ws2..].starts_with(')') {
                return Err(SelectorError {
                    message: "expected has(<label>)".to_string(),
                    position: start,
                });
            }
            let label = rest[ws..ws + label_len].to_string();
            (Token::Has(label), 4 + ws + label_len + ws2 + 1)
        } else if let Some(n) = two_words(s, "not", "in") {
            (Token::NotIn, n)
        } else if let Some(n) = two_words(s, "starts", "with") {
            (Token::StartsWith, n)
        } else if let Some(n) = two_words(s, "ends", "with") {
            (Token::EndsWith, n)
        } else if keyword(s, "in") {
            (Token::In, 2)
        } else if keyword(s, "contains") {
            (Token::Contains, 8)
        } else if s.starts_with("==") {
            (Token::Eq, 2)
        } else if s.starts_with("!=") {
            (Token::Ne, 2)
        } else if s.starts_with("&&") {
            (Token::And, 2)
        } else if s.starts_with("||") {
            (Token::Or, 2)
        } else if s.starts_with('!') {
            (Token::Not, 1)
        } else if s.starts_with('(') {
            (Token::LParen, 1)
        } else if s.starts_with(')') {
            (Token::RParen, 1)
        } else if s.starts_with('{') {
            (Token::LBrace, 1)
        } else if s.starts_with('}') {
            (Token::RBrace, 1)
        } else if s.starts_with(',') {
            (Token::Comma, 1)
        } else if s.starts_with('"') || s.starts_with('\'') {
            let quote = &s[..1];
            match s[1..].find(quote) {
                Some(end) => (Token::Str(s[1..1 + end].to_string()), end + 2),
                None => {
                    return Err(SelectorError {
                        message: "unterminated string".to_string(),
                        position: start,
                    });
                }
            }
        } else {
            let len: usize = s
                .chars()
                .take_while(|c| is_label_char(*c))
                .map(char::len_utf8)
                .sum();
            if len == 0 {
                let c = s.chars().next().unwrap_or_default();
                return Err(SelectorError {
                    message: format!("unexpected character '{}'", c),
                    position: start,
                });
            }
            (Token::Label(s[..len].to_string()), len)
        };
        tokens.push((tok, start));
        pos += len;
    }
    tokens.push((Token::Eof, input.len()));
    Ok(tokens)
}

// ─── Parser ─────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> (&Token, usize) {
        let (tok, at) = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        (tok, *at)
    }

    fn next(&mut self) -> (Token, usize) {
        let (tok, at) = self.peek();
        let out = (tok.clone(), at);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        out
    }

    fn error<T>(&self, expected: &str) -> Result<T, SelectorError> {
        let (tok, at) = self.peek();
        Err(SelectorError {
            message: format!("expected {}, found {}", expected, tok),
            position: at,
        })
    }

    fn parse_or(&mut self) -> Result<Selector, SelectorError> {
        let mut terms = vec![self.parse_and()?];
        while *self.peek().0 == Token::Or {
            self.next();
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Selector::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Selector, SelectorError> {
        let mut terms = vec![self.parse_unary()?];
        while *self.peek().0 == Token::And {
            self.next();
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Selector::And(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<Selector, SelectorError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return self.error("a shallower expression");
        }
        let result = self.parse_unary_inner();
        self.depth -= 1;
        result
    }

    fn parse_unary_inner(&mut self) -> Result<Selector, SelectorError> {
        match self.peek().0.clone() {
            Token::Not => {
                self.next();
                Ok(Selector::Not(Box::new(self.parse_unary()?)))
            }
            Token::LParen => {
                self.next();
                let inner = self.parse_or()?;
                if *self.peek().0 != Token::RParen {
                    return self.error("')'");
                }
                self.next();
                Ok(inner)
            }
            Token::All => {
                self.next();
                Ok(Selector::All)
            }
            Token::Global => {
                self.next();
                Ok(Selector::Global)
            }
            Token::Has(label) => {
                self.next();
                Ok(Selector::Has(label))
            }
            Token::Label(label) => {
                self.next();
                self.parse_operation(label)
            }
            _ => self.error("a selector term"),
        }
    }

    fn parse_operation(&mut self, label: String) -> Result<Selector, SelectorError> {
        let op = self.peek().0.clone();
        match op {
            Token::Eq | Token::Ne | Token::Contains | Token::StartsWith | Token::EndsWith => {
                self.next();
                let value = self.parse_string()?;
                Ok(match op {
                    Token::Eq => Selector::Equal(label, value),
                    Token::Ne => Selector::NotEqual(label, value),
                    Token::Contains => Selector::Contains(label, value),
                    Token::StartsWith => Selector::StartsWith(label, value),
                    _ => Selector::EndsWith(label, value),
                })
            }
            Token::In | Token::NotIn => {
                self.next();
                let values = self.parse_set()?;
                Ok(if op == Token::In {
                    Selector::In(label, values)
                } else {
                    Selector::NotIn(label, values)
                })
            }
            _ => self.error("an operator"),
        }
    }

    fn parse_string(&mut self) -> Result<String, SelectorError> {
        if let Token::Str(s) = self.peek().0.clone() {
            self.next();
            return Ok(s);
        }
        self.error("a quoted string")
    }

    fn parse_set(&mut self) -> Result<Vec<String>, SelectorError> {
        if *self.peek().0 != Token::LBrace {
            return self.error("'{'");
        }
        self.next();
        let mut values = Vec::new();
        if *self.peek().0 == Token::RBrace {
            self.next();
            return Ok(values);
        }
        loop {
            values.push(self.parse_string()?);
            let tok = self.peek().0.clone();
            match tok {
                Token::Comma => {
                    self.next();
                }
                Token::RBrace => {
                    self.next();
                    break;
                }
                _ => return self.error("',' or '}'"),
            }
        }
        values.sort();
        values.dedup();
        Ok(values)
    }
}
