//! Parser for the dataset query language used by alert specs, plus the
//! per-dataset vocabularies that decide which atoms a query may contain.
//!
//! ```text
//! query := or
//! or    := and (OR and)*
//! and   := unary (AND unary)*
//! unary := NOT unary | "(" or ")" | atom
//! atom  := key ("=" | "!=" | "<" | "<=" | ">" | ">=") value
//!        | key (IN | NOTIN) "{" quoted ("," quoted)* "}"
//! ```
//!
//! Keywords are case-insensitive. Keys and values are bare words or
//! double-quoted strings with backslash escapes.

use std::fmt;

use crate::enums::Dataset;

const MAX_DEPTH: usize = 128;

// ─── AST ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

impl Comparator {
    /// Lt/Lte/Gt/Gte.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Comparator::Lt | Comparator::Lte | Comparator::Gt | Comparator::Gte
        )
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Eq => "=",
            Comparator::NotEq => "!=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::In => "IN",
            Comparator::NotIn => "NOTIN",
        };
        write!(f, "{}", s)
    }
}

/// One `key op value` comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atom {
    pub key: String,
    pub comparator: Comparator,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Atom(Atom),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

/// A parsed query. An empty query string has no expression and matches everything.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Query {
    pub expr: Option<Expr>,
}

impl Query {
    /// All atoms, left to right.
    pub fn atoms(&self) -> Vec<&Atom> {
        fn walk<'a>(e: &'a Expr, out: &mut Vec<&'a Atom>) {
            match e {
                Expr::Atom(a) => out.push(a),
                Expr::Not(inner) => walk(inner, out),
                Expr::And(terms) | Expr::Or(terms) => terms.iter().for_each(|t| walk(t, out)),
            }
        }
        let mut out = Vec::new();
        if let Some(e) = &self.expr {
            walk(e, &mut out);
        }
        out
    }

    /// Runs `is_valid_atom` over every atom and returns the first failure.
    pub fn validate(&self, is_valid_atom: impl Fn(&Atom) -> Result<(), String>) -> Result<(), String> {
        self.atoms().into_iter().try_for_each(is_valid_atom)
    }

    /// Validates every atom against the vocabulary of `dataset`.
    pub fn validate_for(&self, dataset: Dataset) -> Result<(), String> {
        self.validate(|atom| validate_atom(dataset, atom))
    }
}

/// Query syntax error with the byte offset it was detected at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid query at offset {}: {}", self.position, self.message)
    }
}

impl std::error::Error for QueryError {}

/// Parses a query string.
pub fn parse(input: &str) -> Result<Query, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.len() == 1 {
        return Ok(Query::default());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    let (tok, at) = parser.peek();
    if *tok != Token::Eof {
        return Err(QueryError {
            message: format!("unexpected {} after expression", tok),
            position: at,
        });
    }
    Ok(Query { expr: Some(expr) })
}

// ─── Tokenizer ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Op(Comparator),
    And,
    Or,
    Not,
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
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Quoted(q) => write!(f, "\"{}\"", q),
            Token::Op(op) => write!(f, "'{}'", op),
            Token::And => write!(f, "'AND'"),
            Token::Or => write!(f, "'OR'"),
            Token::Not => write!(f, "'NOT'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of query"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/' | '*' | '?' | ':')
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let tok = match c {
            '(' | ')' | '{' | '}' | ',' => {
                chars.next();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    _ => Token::Comma,
                }
            }
            '=' => {
                chars.next();
                Token::Op(Comparator::Eq)
            }
            '!' | '<' | '>' => {
                chars.next();
                let eq = chars.peek().is_some_and(|&(_, n)| n == '=');
                if eq {
                    chars.next();
                }
                match (c, eq) {
                    ('!', true) => Token::Op(Comparator::NotEq),
                    ('<', false) => Token::Op(Comparator::Lt),
                    ('<', true) => Token::Op(Comparator::Lte),
                    ('>', false) => Token::Op(Comparator::Gt),
                    ('>', true) => Token::Op(Comparator::Gte),
                    _ => {
                        return Err(QueryError {
                            message: "expected '=' after '!'".to_string(),
                            position: start,
                        });
                    }
                }
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => s.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        c => s.push(c),
                    }
                }
                if !closed {
                    return Err(QueryError {
                        message: "unterminated quoted string".to_string(),
                        position: start,
                    });
                }
                Token::Quoted(s)
            }
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "IN" => Token::Op(Comparator::In),
                    "NOTIN" => Token::Op(Comparator::NotIn),
                    _ => Token::Word(word),
                }
            }
            other => {
                return Err(QueryError {
                    message: format!("unexpected character '{}'", other),
                    position: start,
                });
            }
        };
        tokens.push((tok, start));
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

    fn advance(&mut self) -> Token {
        let tok = self.peek().0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn error<T>(&self, expected: &str) -> Result<T, QueryError> {
        let (tok, at) = self.peek();
        Err(QueryError {
            message: format!("expected {}, found {}", expected, tok),
            position: at,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut terms = vec![self.parse_and()?];
        while *self.peek().0 == Token::Or {
            self.advance();
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut terms = vec![self.parse_unary()?];
        while *self.peek().0 == Token::And {
            self.advance();
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, QueryError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return self.error("a shallower expression");
        }
        let result = match self.peek().0.clone() {
            Token::Not => {
                self.advance();
                self.parse_unary().map(|e| Expr::Not(Box::new(e)))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_or();
                match inner {
                    Ok(e) if *self.peek().0 == Token::RParen => {
                        self.advance();
                        Ok(e)
                    }
                    Ok(_) => self.error("')'"),
                    Err(e) => Err(e),
                }
            }
            Token::Word(_) | Token::Quoted(_) => self.parse_atom(),
            _ => self.error("a comparison"),
        };
        self.depth -= 1;
        result
    }

    fn parse_atom(&mut self) -> Result<Expr, QueryError> {
        let key = match self.advance() {
            Token::Word(k) | Token::Quoted(k) => k,
            _ => return self.error("a key"),
        };
        let comparator = match self.peek().0.clone() {
            Token::Op(op) => {
                self.advance();
                op
            }
            _ => return self.error(&format!("an operator after '{}'", key)),
        };

        let values = match comparator {
            Comparator::In | Comparator::NotIn => self.parse_set()?,
            _ => match self.peek().0.clone() {
                Token::Word(v) | Token::Quoted(v) => {
                    self.advance();
                    vec![v]
                }
                _ => return self.error(&format!("a value after '{}'", comparator)),
            },
        };
        Ok(Expr::Atom(Atom {
            key,
            comparator,
            values,
        }))
    }

    fn parse_set(&mut self) -> Result<Vec<String>, QueryError> {
        if *self.peek().0 != Token::LBrace {
            return self.error("'{'");
        }
        self.advance();
        let mut values = Vec::new();
        loop {
            match self.peek().0.clone() {
                Token::Quoted(v) => {
                    self.advance();
                    values.push(v);
                }
                _ => return self.error("a quoted string in set"),
            }
            match self.peek().0.clone() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBrace => {
                    self.advance();
                    return Ok(values);
                }
                _ => return self.error("',' or '}'"),
            }
        }
    }
}

// ─── Dataset vocabularies ───────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum KeyKind {
    Text,
    Number,
    OneOf(&'static [&'static str]),
}

/// Keys ending in `.` match any key with that prefix.
type Vocabulary = &'static [(&'static str, KeyKind)];

const AUDIT_KEYS: Vocabulary = &[
    (
        "verb",
        KeyKind::OneOf(&["get", "list", "watch", "create", "update", "patch", "delete"]),
    ),
    (
        "stage",
        KeyKind::OneOf(&["RequestReceived", "ResponseStarted", "ResponseComplete", "Panic"]),
    ),
    (
        "level",
        KeyKind::OneOf(&["None", "Metadata", "Request", "RequestResponse"]),
    ),
    ("auditID", KeyKind::Text),
    ("requestURI", KeyKind::Text),
    ("sourceIPs", KeyKind::Text),
    ("userAgent", KeyKind::Text),
    ("responseStatus.code", KeyKind::Number),
    ("user.", KeyKind::Text),
    ("impersonatedUser.", KeyKind::Text),
    ("objectRef.", KeyKind::Text),
    ("requestObject.", KeyKind::Text),
    ("responseObject.", KeyKind::Text),
    ("annotations.", KeyKind::Text),
];

const DNS_TYPES: &[&str] = &[
    "A", "NS", "MD", "MF", "CNAME", "SOA", "MB", "MG", "MR", "NULL", "WKS", "PTR", "HINFO",
    "MINFO", "MX", "TXT", "RP", "AFSDB", "X25", "ISDN", "RT", "NSAP", "NSAP-PTR", "SIG", "KEY",
    "PX", "GPOS", "AAAA", "LOC", "NXT", "EID", "NIMLOC", "SRV", "ATMA", "NAPTR", "KX", "CERT",
    "A6", "DNAME", "SINK", "OPT", "APL", "DS", "SSHFP", "IPSECKEY", "RRSIG", "NSEC", "DNSKEY",
    "DHCID", "NSEC3", "NSEC3PARAM", "TLSA", "HIP", "NINFO", "RKEY", "TALINK", "CDS", "CDNSKEY",
    "OPENPGPKEY", "CSYNC", "SPF", "UINFO", "UID", "GID", "UNSPEC", "NID", "L32", "L64", "LP",
    "EUI48", "EUI64", "TKEY", "TSIG", "IXFR", "AXFR", "MAILB", "MAILA", "ANY", "URI", "CAA",
    "TA", "DLV",
];

const DNS_KEYS: Vocabulary = &[
    ("count", KeyKind::Number),
    ("latency_count", KeyKind::Number),
    ("latency_mean", KeyKind::Number),
    ("latency_max", KeyKind::Number),
    ("qname", KeyKind::Text),
    ("qtype", KeyKind::OneOf(DNS_TYPES)),
    (
        "qclass",
        KeyKind::OneOf(&["IN", "CS", "CH", "HS", "ANY", "NONE"]),
    ),
    (
        "rcode",
        KeyKind::OneOf(&[
            "NoError", "FormErr", "ServFail", "NXDomain", "NotImp", "Refused", "YXDomain",
            "YXRRSet", "NXRRSet", "NotAuth", "NotZone", "BADVERS", "BADSIG", "BADKEY", "BADTIME",
            "BADMODE", "BADNAME", "BADALG", "BADTRUNC", "BADCOOKIE",
        ]),
    ),
    ("client_ip", KeyKind::Text),
    ("client_name", KeyKind::Text),
    ("client_name_aggr", KeyKind::Text),
    ("client_namespace", KeyKind::Text),
    ("client_labels.", KeyKind::Text),
    ("servers.", KeyKind::Text),
    ("rrsets.", KeyKind::Text),
];

const ENDPOINT_TYPES: &[&str] = &["wep", "hep", "ns", "net"];

const FLOWS_KEYS: Vocabulary = &[
    ("num_flows", KeyKind::Number),
    ("num_flows_started", KeyKind::Number),
    ("num_flows_completed", KeyKind::Number),
    ("packets_in", KeyKind::Number),
    ("packets_out", KeyKind::Number),
    ("bytes_in", KeyKind::Number),
    ("bytes_out", KeyKind::Number),
    ("http_requests_allowed_in", KeyKind::Number),
    ("http_requests_denied_in", KeyKind::Number),
    ("source_port", KeyKind::Number),
    ("dest_port", KeyKind::Number),
    ("dest_service_port", KeyKind::Number),
    ("action", KeyKind::OneOf(&["allow", "deny"])),
    ("reporter", KeyKind::OneOf(&["src", "dst"])),
    ("source_type", KeyKind::OneOf(ENDPOINT_TYPES)),
    ("dest_type", KeyKind::OneOf(ENDPOINT_TYPES)),
    ("proto", KeyKind::Text),
    ("source_ip", KeyKind::Text),
    ("source_name", KeyKind::Text),
    ("source_name_aggr", KeyKind::Text),
    ("source_namespace", KeyKind::Text),
    ("dest_ip", KeyKind::Text),
    ("dest_name", KeyKind::Text),
    ("dest_name_aggr", KeyKind::Text),
    ("dest_namespace", KeyKind::Text),
    ("dest_service_name", KeyKind::Text),
    ("dest_service_namespace", KeyKind::Text),
    ("process_name", KeyKind::Text),
    ("original_source_ips", KeyKind::Text),
    ("source_labels.", KeyKind::Text),
    ("dest_labels.", KeyKind::Text),
    ("policies.", KeyKind::Text),
];

const L7_KEYS: Vocabulary = &[
    ("method", KeyKind::Text),
    ("url", KeyKind::Text),
    ("user_agent", KeyKind::Text),
    ("type", KeyKind::Text),
    ("src_name_aggr", KeyKind::Text),
    ("src_namespace", KeyKind::Text),
    ("dest_name_aggr", KeyKind::Text),
    ("dest_namespace", KeyKind::Text),
    ("dest_service_name", KeyKind::Text),
    ("dest_service_namespace", KeyKind::Text),
    ("response_code", KeyKind::Number),
    ("count", KeyKind::Number),
    ("duration_mean", KeyKind::Number),
    ("duration_max", KeyKind::Number),
    ("bytes_in", KeyKind::Number),
    ("bytes_out", KeyKind::Number),
];

const WAF_KEYS: Vocabulary = &[
    ("rule_info", KeyKind::Text),
    ("host", KeyKind::Text),
    ("path", KeyKind::Text),
    ("method", KeyKind::Text),
    ("protocol", KeyKind::Text),
    ("level", KeyKind::Text),
    ("msg", KeyKind::Text),
    ("request_id", KeyKind::Text),
    ("source.", KeyKind::Text),
    ("destination.", KeyKind::Text),
    ("rules.", KeyKind::Text),
];

const VULNERABILITY_KEYS: Vocabulary = &[
    ("registry", KeyKind::Text),
    ("repository", KeyKind::Text),
    ("tag", KeyKind::Text),
];

/// Keys of the security events index that alert exceptions may match on.
const EVENTS_KEYS: Vocabulary = &[
    ("type", KeyKind::Text),
    ("name", KeyKind::Text),
    ("origin", KeyKind::Text),
    ("severity", KeyKind::Number),
    ("host", KeyKind::Text),
    ("source_ip", KeyKind::Text),
    ("source_name", KeyKind::Text),
    ("source_namespace", KeyKind::Text),
    ("source_port", KeyKind::Number),
    ("dest_ip", KeyKind::Text),
    ("dest_name", KeyKind::Text),
    ("dest_namespace", KeyKind::Text),
    ("dest_port", KeyKind::Number),
    ("attack_vector", KeyKind::Text),
    ("mitre_tactic", KeyKind::Text),
    ("mitre_ids", KeyKind::Text),
    ("dismissed", KeyKind::OneOf(&["true", "false"])),
];

fn vocabulary(dataset: Dataset) -> Vocabulary {
    match dataset {
        Dataset::Audit => AUDIT_KEYS,
        Dataset::Dns => DNS_KEYS,
        Dataset::Flows => FLOWS_KEYS,
        Dataset::L7 => L7_KEYS,
        Dataset::Waf => WAF_KEYS,
        Dataset::Vulnerability => VULNERABILITY_KEYS,
    }
}

/// Checks one atom against the keys, value sets and operators allowed for `dataset`.
pub fn validate_atom(dataset: Dataset, atom: &Atom) -> Result<(), String> {
    check_atom(vocabulary(dataset), atom)
}

/// Checks one atom against the security events vocabulary.
pub fn validate_events_atom(atom: &Atom) -> Result<(), String> {
    check_atom(EVENTS_KEYS, atom)
}

fn check_atom(vocabulary: Vocabulary, atom: &Atom) -> Result<(), String> {
    let kind = vocabulary
        .iter()
        .find(|(name, _)| match name.strip_suffix('.') {
            Some(prefix) => atom
                .key
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.')),
            None => atom.key == *name,
        })
        .map(|(_, kind)| *kind)
        .ok_or_else(|| format!("invalid key: {}", atom.key))?;

    if atom.comparator.is_ordering() && !matches!(kind, KeyKind::Number) {
        return Err(format!(
            "operator {} is only valid for numeric keys, not {}",
            atom.comparator, atom.key
        ));
    }

    for value in &atom.values {
        let ok = match kind {
            KeyKind::Text => true,
            KeyKind::Number => value.parse::<f64>().is_ok_and(f64::is_finite),
            KeyKind::OneOf(allowed) => allowed.contains(&value.as_str()),
        };
        if !ok {
            return Err(format!("invalid value for {}: {}", atom.key, value));
        }
    }
    Ok(())
}
