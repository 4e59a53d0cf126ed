//! Static checking of compliance report templates.
//!
//! Report types carry Go `text/template` sources that are rendered against the
//! report data of each run. Instead of rendering sample data, [`check`] walks
//! every action once: field chains are resolved against the report data model,
//! block structure is verified, and sections that may be absent from a report
//! (the endpoint selection, its namespaces and service accounts, the audit
//! selection, the CIS parameters) must be guarded by an enclosing `if` or
//! `with` before anything inside them is read.
//!
//! Function names are not checked; the renderer carries a large function
//! library. Variables other than `$` are opaque.

use std::fmt;

// ─── Report data model ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum Ty {
    Struct(&'static StructTy),
    /// A section that may be absent from a report.
    Nullable(&'static StructTy),
    List(&'static Ty),
    Scalar(&'static str),
    /// Times, maps and audit events: any field access is accepted.
    Opaque,
}

#[derive(Debug)]
struct StructTy {
    name: &'static str,
    fields: &'static [(&'static str, Ty)],
}

fn type_name(ty: Ty) -> String {
    match ty {
        Ty::Struct(s) => s.name.to_string(),
        Ty::Nullable(s) => format!("*{}", s.name),
        Ty::List(inner) => format!("[]{}", type_name(*inner)),
        Ty::Scalar(name) => name.to_string(),
        Ty::Opaque => "interface {}".to_string(),
    }
}

const TEXT: Ty = Ty::Scalar("string");
const FLAG: Ty = Ty::Scalar("bool");
const COUNT: Ty = Ty::Scalar("int");
const TEXT_LIST: Ty = Ty::List(&TEXT);

const RESOURCE_ID: StructTy = StructTy {
    name: "ResourceID",
    fields: &[
        ("Kind", TEXT),
        ("APIVersion", TEXT),
        ("Name", TEXT),
        ("Namespace", TEXT),
        ("UID", TEXT),
    ],
};
const RESOURCE_ID_TY: Ty = Ty::Struct(&RESOURCE_ID);
const RESOURCE_IDS: Ty = Ty::List(&RESOURCE_ID_TY);

const REPORT_ENDPOINT: StructTy = StructTy {
    name: "EndpointsReportEndpoint",
    fields: &[
        ("Endpoint", RESOURCE_ID_TY),
        ("IngressProtected", FLAG),
        ("EgressProtected", FLAG),
        ("IngressFromInternet", FLAG),
        ("EgressToInternet", FLAG),
        ("IngressFromOtherNamespace", FLAG),
        ("EgressToOtherNamespace", FLAG),
        ("EnvoyEnabled", FLAG),
        ("AppliedPolicies", RESOURCE_IDS),
        ("Services", RESOURCE_IDS),
        ("FlowLogAggregationName", TEXT),
    ],
};
const REPORT_ENDPOINT_TY: Ty = Ty::Struct(&REPORT_ENDPOINT);

const REPORT_NAMESPACE: StructTy = StructTy {
    name: "EndpointsReportNamespace",
    fields: &[
        ("Namespace", RESOURCE_ID_TY),
        ("IngressProtected", FLAG),
        ("EgressProtected", FLAG),
        ("IngressFromInternet", FLAG),
        ("EgressToInternet", FLAG),
        ("IngressFromOtherNamespace", FLAG),
        ("EgressToOtherNamespace", FLAG),
        ("EnvoyEnabled", FLAG),
    ],
};
const REPORT_NAMESPACE_TY: Ty = Ty::Struct(&REPORT_NAMESPACE);

const REPORT_SERVICE: StructTy = StructTy {
    name: "EndpointsReportService",
    fields: &[
        ("Service", RESOURCE_ID_TY),
        ("IngressProtected", FLAG),
        ("IngressFromInternet", FLAG),
        ("IngressFromOtherNamespace", FLAG),
        ("EnvoyEnabled", FLAG),
    ],
};
const REPORT_SERVICE_TY: Ty = Ty::Struct(&REPORT_SERVICE);

const ENDPOINTS_SUMMARY: StructTy = StructTy {
    name: "EndpointsSummary",
    fields: &[
        ("NumTotal", COUNT),
        ("NumIngressProtected", COUNT),
        ("NumEgressProtected", COUNT),
        ("NumIngressFromInternet", COUNT),
        ("NumEgressToInternet", COUNT),
        ("NumIngressFromOtherNamespace", COUNT),
        ("NumEgressToOtherNamespace", COUNT),
        ("NumEnvoyEnabled", COUNT),
    ],
};

const AUDIT_SUMMARY: StructTy = StructTy {
    name: "AuditSummary",
    fields: &[
        ("NumTotal", COUNT),
        ("NumCreate", COUNT),
        ("NumModify", COUNT),
        ("NumDelete", COUNT),
    ],
};

const FLOW_ENDPOINT: StructTy = StructTy {
    name: "FlowEndpoint",
    fields: &[
        ("Kind", TEXT),
        ("Name", TEXT),
        ("NameIsAggregationPrefix", FLAG),
        ("Namespace", TEXT),
    ],
};

const FLOW: StructTy = StructTy {
    name: "EndpointsReportFlow",
    fields: &[
        ("Source", Ty::Struct(&FLOW_ENDPOINT)),
        ("Destination", Ty::Struct(&FLOW_ENDPOINT)),
    ],
};
const FLOW_TY: Ty = Ty::Struct(&FLOW);

const NAMES_AND_SELECTOR: StructTy = StructTy {
    name: "NamesAndLabelsMatch",
    fields: &[("Names", TEXT_LIST), ("Selector", TEXT)],
};

const ENDPOINTS_SELECTION: StructTy = StructTy {
    name: "EndpointsSelection",
    fields: &[
        ("Selector", TEXT),
        ("Namespaces", Ty::Nullable(&NAMES_AND_SELECTOR)),
        ("ServiceAccounts", Ty::Nullable(&NAMES_AND_SELECTOR)),
    ],
};

const CIS_PARAMS: StructTy = StructTy {
    name: "CISBenchmarkParams",
    fields: &[
        ("HighThreshold", Ty::Opaque),
        ("MedThreshold", Ty::Opaque),
        ("IncludeUnscoredTests", FLAG),
        ("NumFailedTests", Ty::Opaque),
        ("ResultsFilters", Ty::Opaque),
    ],
};

const REPORT_SPEC: StructTy = StructTy {
    name: "ReportSpec",
    fields: &[
        ("ReportType", TEXT),
        ("Endpoints", Ty::Nullable(&ENDPOINTS_SELECTION)),
        ("Schedule", TEXT),
        ("JobNodeSelector", Ty::Opaque),
        ("Suspend", Ty::Opaque),
        ("CIS", Ty::Nullable(&CIS_PARAMS)),
    ],
};

const TEMPLATE: StructTy = StructTy {
    name: "ReportTemplate",
    fields: &[("Name", TEXT), ("Description", TEXT), ("Template", TEXT)],
};
const TEMPLATE_TY: Ty = Ty::Struct(&TEMPLATE);

const AUDIT_RESOURCE: StructTy = StructTy {
    name: "AuditResource",
    fields: &[
        ("Resource", TEXT),
        ("APIGroup", TEXT),
        ("APIVersion", TEXT),
        ("Name", TEXT),
        ("Namespace", TEXT),
    ],
};
const AUDIT_RESOURCE_TY: Ty = Ty::Struct(&AUDIT_RESOURCE);

const AUDIT_SELECTION: StructTy = StructTy {
    name: "AuditEventsSelection",
    fields: &[("Resources", Ty::List(&AUDIT_RESOURCE_TY))],
};

const REPORT_TYPE_SPEC: StructTy = StructTy {
    name: "ReportTypeSpec",
    fields: &[
        ("UISummaryTemplate", TEMPLATE_TY),
        ("DownloadTemplates", Ty::List(&TEMPLATE_TY)),
        ("IncludeEndpointData", FLAG),
        ("IncludeEndpointFlowLogData", FLAG),
        ("AuditEventsSelection", Ty::Nullable(&AUDIT_SELECTION)),
        ("IncludeCISBenchmarkData", FLAG),
    ],
};

const CIS_RESULT: StructTy = StructTy {
    name: "CISBenchmarkResult",
    fields: &[
        ("TestNumber", TEXT),
        ("TestDesc", TEXT),
        ("TestInfo", TEXT),
        ("Status", TEXT),
        ("Scored", FLAG),
    ],
};
const CIS_RESULT_TY: Ty = Ty::Struct(&CIS_RESULT);

const CIS_SECTION: StructTy = StructTy {
    name: "CISBenchmarkSectionResult",
    fields: &[
        ("Status", TEXT),
        ("Section", TEXT),
        ("Desc", TEXT),
        ("Pass", COUNT),
        ("Fail", COUNT),
        ("Info", COUNT),
        ("Results", Ty::List(&CIS_RESULT_TY)),
    ],
};
const CIS_SECTION_TY: Ty = Ty::Struct(&CIS_SECTION);

const CIS_NODE_SUMMARY: StructTy = StructTy {
    name: "CISBenchmarkNodeSummary",
    fields: &[
        ("Status", TEXT),
        ("TotalPass", COUNT),
        ("TotalFail", COUNT),
        ("TotalInfo", COUNT),
        ("Total", COUNT),
    ],
};

const CIS_NODE: StructTy = StructTy {
    name: "CISBenchmarkNode",
    fields: &[
        ("NodeName", TEXT),
        ("KubernetesVersion", TEXT),
        ("BenchmarksVersion", TEXT),
        ("Summary", Ty::Struct(&CIS_NODE_SUMMARY)),
        ("Results", Ty::List(&CIS_SECTION_TY)),
    ],
};
const CIS_NODE_TY: Ty = Ty::Struct(&CIS_NODE);

const CIS_SUMMARY: StructTy = StructTy {
    name: "CISBenchmarkSummary",
    fields: &[
        ("Type", TEXT),
        ("HighCount", COUNT),
        ("MedCount", COUNT),
        ("LowCount", COUNT),
    ],
};

const REPORT_DATA: StructTy = StructTy {
    name: "ReportData",
    fields: &[
        ("ReportName", TEXT),
        ("ReportTypeName", TEXT),
        ("ReportSpec", Ty::Struct(&REPORT_SPEC)),
        ("ReportTypeSpec", Ty::Struct(&REPORT_TYPE_SPEC)),
        ("StartTime", Ty::Opaque),
        ("EndTime", Ty::Opaque),
        ("GenerationTime", Ty::Opaque),
        ("EndpointsSummary", Ty::Struct(&ENDPOINTS_SUMMARY)),
        ("NamespacesSummary", Ty::Struct(&ENDPOINTS_SUMMARY)),
        ("ServicesSummary", Ty::Struct(&ENDPOINTS_SUMMARY)),
        ("Endpoints", Ty::List(&REPORT_ENDPOINT_TY)),
        ("Namespaces", Ty::List(&REPORT_NAMESPACE_TY)),
        ("Services", Ty::List(&REPORT_SERVICE_TY)),
        ("AuditEvents", Ty::List(&Ty::Opaque)),
        ("AuditSummary", Ty::Struct(&AUDIT_SUMMARY)),
        ("Flows", Ty::List(&FLOW_TY)),
        ("CISBenchmarkParams", Ty::Struct(&CIS_PARAMS)),
        ("CISBenchmark", Ty::List(&CIS_NODE_TY)),
        ("CISBenchmarkSummary", Ty::Struct(&CIS_SUMMARY)),
    ],
};

// ─── Faults ─────────────────────────────────────────────────────────────────

/// Why a template would fail to render some report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateFault {
    /// The source does not parse.
    Syntax(String),
    /// A field chain names a field its value does not have.
    UnknownField {
        chain: String,
        field: String,
        type_name: String,
    },
    /// `range` over something that is not a list.
    NotIterable { chain: String, type_name: String },
    /// A section that may be absent is read without a guard.
    NilPointer { section: String, chain: String },
}

impl fmt::Display for TemplateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateFault::Syntax(msg) => write!(f, "template: {}", msg),
            TemplateFault::UnknownField {
                chain,
                field,
                type_name,
            } => write!(
                f,
                "executing at <{}>: can't evaluate field {} in type {}",
                chain, field, type_name
            ),
            TemplateFault::NotIterable { chain, type_name } => {
                write!(f, "executing at <{}>: range can't iterate over {}", chain, type_name)
            }
            TemplateFault::NilPointer { section, chain } => {
                write!(f, "executing at <{}>: nil pointer evaluating {}", chain, section)
            }
        }
    }
}

impl std::error::Error for TemplateFault {}

/// Checks `template` against the report data model.
///
/// A syntax, field or range fault stops the walk and is returned alone.
/// Otherwise every unguarded optional section is reported once, in order of
/// first use.
pub fn check(template: &str) -> Result<(), Vec<TemplateFault>> {
    let mut checker = Checker::new();
    let walked = split_actions(template).and_then(|actions| {
        actions
            .iter()
            .try_for_each(|action| checker.action(action))
            .and_then(|()| checker.finish())
    });
    match walked {
        Err(fault) => Err(vec![fault]),
        Ok(()) if checker.nil.is_empty() => Ok(()),
        Ok(()) => Err(checker.nil),
    }
}

fn syntax(msg: impl Into<String>) -> TemplateFault {
    TemplateFault::Syntax(msg.into())
}

// ─── Actions ────────────────────────────────────────────────────────────────

/// The bodies of every `{{ … }}` action with trim markers removed and
/// comments dropped.
fn split_actions(src: &str) -> Result<Vec<&str>, TemplateFault> {
    let mut actions = Vec::new();
    let mut rest = src;
    while let Some(open) = rest.find("{{") {
        let mut body = &rest[open + 2..];
        if let Some(after) = body.strip_prefix('-') {
            if after.starts_with(char::is_whitespace) {
                body = after;
            }
        }
        let trimmed = body.trim_start();
        if let Some(comment) = trimmed.strip_prefix("/*") {
            let end = comment.find("*/").ok_or_else(|| syntax("unclosed comment"))?;
            let tail = &comment[end + 2..];
            let tail = tail.trim_start().strip_prefix('-').unwrap_or(tail).trim_start();
            rest = tail
                .strip_prefix("}}")
                .ok_or_else(|| syntax("comment ends before closing delimiter"))?;
            continue;
        }
        let close = find_close(body)?;
        let mut inner = &body[..close];
        if let Some(before) = inner.strip_suffix('-') {
            if before.ends_with(char::is_whitespace) {
                inner = before;
            }
        }
        actions.push(inner);
        rest = &body[close + 2..];
    }
    Ok(actions)
}

/// Offset of the `}}` closing an action, skipping quoted text.
fn find_close(body: &str) -> Result<usize, TemplateFault> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_quoted(body, i)?,
            b'`' => {
                let end = body[i + 1..]
                    .find('`')
                    .ok_or_else(|| syntax("unterminated raw quoted string"))?;
                i += end + 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Ok(i),
            _ => i += 1,
        }
    }
    Err(syntax("unclosed action"))
}

/// Skips a `"…"` or `'…'` literal starting at `start`; returns the offset after it.
fn skip_quoted(body: &str, start: usize) -> Result<usize, TemplateFault> {
    let bytes = body.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(syntax(if quote == b'"' {
        "unterminated quoted string"
    } else {
        "unterminated character constant"
    }))
}

// ─── Tokens ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tok<'a> {
    /// `.` or `.A.B`.
    Field(&'a str),
    /// `$`, `$.A`, `$x` or `$x.A`.
    Var(&'a str),
    /// `.A` straight after `)`.
    Chain,
    Ident(&'a str),
    Literal,
    Pipe,
    LParen,
    RParen,
    Declare,
    Comma,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn tokenize(body: &str) -> Result<Vec<Tok<'_>>, TemplateFault> {
    let bytes = body.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0;
    // `.A.B`: dots followed by identifiers.
    let chain_end = |mut j: usize| {
        while j < bytes.len() && bytes[j] == b'.' {
            j += 1;
            while j < bytes.len() && is_ident_byte(bytes[j]) {
                j += 1;
            }
        }
        j
    };
    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        match b {
            _ if b.is_ascii_whitespace() => i += 1,
            b'.' if toks.last() == Some(&Tok::RParen) && start > 0 && bytes[start - 1] == b')' => {
                i = chain_end(i);
                toks.push(Tok::Chain);
            }
            b'.' if bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                i = number_end(bytes, i);
                toks.push(Tok::Literal);
            }
            b'.' => {
                i = chain_end(i);
                toks.push(Tok::Field(&body[start..i]));
            }
            b'$' => {
                i += 1;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                i = chain_end(i);
                toks.push(Tok::Var(&body[start..i]));
            }
            b'"' | b'\'' => {
                i = skip_quoted(body, i)?;
                toks.push(Tok::Literal);
            }
            b'`' => {
                let end = body[i + 1..]
                    .find('`')
                    .ok_or_else(|| syntax("unterminated raw quoted string"))?;
                i += end + 2;
                toks.push(Tok::Literal);
            }
            b'0'..=b'9' => {
                i = number_end(bytes, i);
                toks.push(Tok::Literal);
            }
            b'-' | b'+' if bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit() || *c == b'.') => {
                i = number_end(bytes, i + 1);
                toks.push(Tok::Literal);
            }
            b'|' => {
                i += 1;
                toks.push(Tok::Pipe);
            }
            b'(' => {
                i += 1;
                toks.push(Tok::LParen);
            }
            b')' => {
                i += 1;
                toks.push(Tok::RParen);
            }
            b',' => {
                i += 1;
                toks.push(Tok::Comma);
            }
            b':' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                toks.push(Tok::Declare);
            }
            b'=' => {
                i += 1;
                toks.push(Tok::Declare);
            }
            _ if is_ident_byte(b) => {
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                toks.push(Tok::Ident(&body[start..i]));
            }
            _ => {
                let c = body[i..].chars().next().unwrap_or('?');
                return Err(syntax(format!("unexpected {:?} in command", c)));
            }
        }
    }
    Ok(toks)
}

fn number_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        let b = bytes[i];
        let exponent_sign = matches!(b, b'+' | b'-') && matches!(bytes[i - 1], b'e' | b'E' | b'p' | b'P');
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

// ─── Walk ───────────────────────────────────────────────────────────────────

const MAX_PAREN_DEPTH: usize = 100;

/// The value `.` refers to: its type and, when rooted in the report data,
/// its dotted path.
#[derive(Clone, Debug)]
struct Dot {
    ty: Ty,
    path: Option<String>,
}

impl Dot {
    fn root() -> Self {
        Dot {
            ty: Ty::Struct(&REPORT_DATA),
            path: Some(String::new()),
        }
    }

    fn opaque() -> Self {
        Dot {
            ty: Ty::Opaque,
            path: None,
        }
    }
}

/// A pipeline's result and the sections it proves present when truthy.
struct Eval {
    value: Dot,
    guards: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    If,
    With,
    Range,
    Define,
}

struct Frame {
    kind: FrameKind,
    saved: Dot,
    guard_base: usize,
    in_else: bool,
    /// Opened by `else if`/`else with`; the same `end` closes the parent too.
    chained: bool,
}

struct Checker {
    dot: Dot,
    guards: Vec<String>,
    frames: Vec<Frame>,
    nil: Vec<TemplateFault>,
}

impl Checker {
    fn new() -> Self {
        Checker {
            dot: Dot::root(),
            guards: Vec::new(),
            frames: Vec::new(),
            nil: Vec::new(),
        }
    }

    fn finish(&self) -> Result<(), TemplateFault> {
        if self.frames.is_empty() {
            Ok(())
        } else {
            Err(syntax("unexpected EOF"))
        }
    }

    fn action(&mut self, body: &str) -> Result<(), TemplateFault> {
        let toks = tokenize(body)?;
        let Some(first) = toks.first() else {
            return Err(syntax("missing value for command"));
        };
        let rest = &toks[1..];
        match *first {
            Tok::Ident("if") => self.open(FrameKind::If, rest, false),
            Tok::Ident("with") => self.open(FrameKind::With, rest, false),
            Tok::Ident("range") => self.open(FrameKind::Range, rest, false),
            Tok::Ident("else") => self.otherwise(rest),
            Tok::Ident("end") => self.end(rest),
            Tok::Ident("define") => {
                if !matches!(rest, [Tok::Literal]) {
                    return Err(syntax("define requires a template name"));
                }
                self.push(FrameKind::Define, Dot::opaque(), false);
                Ok(())
            }
            Tok::Ident("block") => {
                let Some((Tok::Literal, pipeline)) = rest.split_first() else {
                    return Err(syntax("block requires a template name"));
                };
                let eval = self.pipeline(pipeline, body)?;
                self.push(FrameKind::Define, eval.value, false);
                Ok(())
            }
            Tok::Ident("template") => match rest.split_first() {
                Some((Tok::Literal, [])) => Ok(()),
                Some((Tok::Literal, pipeline)) => self.pipeline(pipeline, body).map(|_| ()),
                _ => Err(syntax("template requires a template name")),
            },
            Tok::Ident(word @ ("break" | "continue")) => {
                if !rest.is_empty() {
                    return Err(syntax(format!("unexpected arguments to {{{{{}}}}}", word)));
                }
                if !self.frames.iter().any(|f| f.kind == FrameKind::Range) {
                    return Err(syntax(format!("{{{{{}}}}} outside {{{{range}}}}", word)));
                }
                Ok(())
            }
            _ => self.pipeline(&toks, body).map(|_| ()),
        }
    }

    fn push(&mut self, kind: FrameKind, dot: Dot, chained: bool) {
        let saved = std::mem::replace(&mut self.dot, dot);
        self.frames.push(Frame {
            kind,
            saved,
            guard_base: self.guards.len(),
            in_else: false,
            chained,
        });
    }

    fn open(&mut self, kind: FrameKind, toks: &[Tok<'_>], chained: bool) -> Result<(), TemplateFault> {
        if toks.is_empty() {
            return Err(syntax("missing value for command"));
        }
        let chain = render(toks);
        let eval = self.pipeline(toks, &chain)?;
        let dot = match kind {
            FrameKind::With => eval.value,
            FrameKind::Range => Dot {
                ty: element(eval.value.ty, &chain)?,
                path: None,
            },
            _ => self.dot.clone(),
        };
        self.push(kind, dot, chained);
        if kind != FrameKind::Range {
            self.guards.extend(eval.guards);
        }
        Ok(())
    }

    fn otherwise(&mut self, toks: &[Tok<'_>]) -> Result<(), TemplateFault> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(syntax("unexpected {{else}}"));
        };
        if frame.kind == FrameKind::Define || frame.in_else {
            return Err(syntax("unexpected {{else}}"));
        }
        frame.in_else = true;
        self.guards.truncate(frame.guard_base);
        self.dot = frame.saved.clone();
        match toks.split_first() {
            None => Ok(()),
            Some((Tok::Ident("if"), rest)) => self.open(FrameKind::If, rest, true),
            Some((Tok::Ident("with"), rest)) => self.open(FrameKind::With, rest, true),
            Some(_) => Err(syntax("unexpected arguments to {{else}}")),
        }
    }

    fn end(&mut self, toks: &[Tok<'_>]) -> Result<(), TemplateFault> {
        if !toks.is_empty() {
            return Err(syntax("unexpected arguments to {{end}}"));
        }
        loop {
            let frame = self.frames.pop().ok_or_else(|| syntax("unexpected {{end}}"))?;
            self.guards.truncate(frame.guard_base);
            self.dot = frame.saved;
            if !frame.chained {
                return Ok(());
            }
        }
    }

    /// `[$a[, $b] :=] command | command …`
    fn pipeline(&mut self, toks: &[Tok<'_>], chain: &str) -> Result<Eval, TemplateFault> {
        let toks = match toks {
            [Tok::Var(_), Tok::Declare, rest @ ..] => rest,
            [Tok::Var(_), Tok::Comma, Tok::Var(_), Tok::Declare, rest @ ..] => rest,
            _ => toks,
        };
        let mut commands = Vec::new();
        let (mut depth, mut start) = (0usize, 0usize);
        for (i, tok) in toks.iter().enumerate() {
            match tok {
                Tok::LParen => {
                    depth += 1;
                    if depth > MAX_PAREN_DEPTH {
                        return Err(syntax("max expression depth exceeded"));
                    }
                }
                Tok::RParen => {
                    depth = depth.checked_sub(1).ok_or_else(|| syntax("unexpected right paren"))?
                }
                Tok::Pipe if depth == 0 => {
                    commands.push(&toks[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(syntax("unclosed left paren"));
        }
        commands.push(&toks[start..]);

        let single = commands.len() == 1;
        let mut last = None;
        for command in commands {
            if command.is_empty() {
                return Err(syntax("missing command"));
            }
            last = Some(self.command(command, chain)?);
        }
        let mut eval = last.ok_or_else(|| syntax("missing command"))?;
        if !single {
            eval.guards.clear();
        }
        Ok(eval)
    }

    fn command(&mut self, toks: &[Tok<'_>], chain: &str) -> Result<Eval, TemplateFault> {
        let guarding_and = toks.first() == Some(&Tok::Ident("and"));
        let base = self.guards.len();
        let mut guards = Vec::new();
        let mut operands = 0;
        let mut value = Dot::opaque();
        let mut i = 0;
        while i < toks.len() {
            let (dot, next) = match toks[i] {
                Tok::LParen => {
                    let close = matching_paren(toks, i)?;
                    self.pipeline(&toks[i + 1..close], chain)?;
                    let mut next = close + 1;
                    while toks.get(next) == Some(&Tok::Chain) {
                        next += 1;
                    }
                    (Dot::opaque(), next)
                }
                Tok::Field(text) => {
                    let dot = self.dot.clone();
                    (self.field(&dot, text, text)?, i + 1)
                }
                Tok::Var(text) => (self.variable(text)?, i + 1),
                Tok::Declare | Tok::Comma | Tok::RParen | Tok::Pipe | Tok::Chain => {
                    return Err(syntax(format!("unexpected token in command <{}>", chain)));
                }
                Tok::Ident(_) | Tok::Literal => (Dot::opaque(), i + 1),
            };
            if let Some(path) = dot.path.clone().filter(|p| !p.is_empty()) {
                if guarding_and {
                    self.guards.push(path.clone());
                }
                if guarding_and || toks.len() == 1 {
                    guards.push(path);
                }
            }
            value = dot;
            operands += 1;
            i = next;
        }
        self.guards.truncate(base);
        if operands != 1 {
            value = Dot::opaque();
        }
        Ok(Eval { value, guards })
    }

    fn variable(&mut self, text: &str) -> Result<Dot, TemplateFault> {
        match text.strip_prefix('$') {
            Some("") => Ok(Dot::root()),
            Some(fields) if fields.starts_with('.') => self.field(&Dot::root(), fields, text),
            _ => Ok(Dot::opaque()),
        }
    }

    /// Resolves `.A.B` from `start`, recording reads through unguarded sections.
    fn field(&mut self, start: &Dot, text: &str, chain: &str) -> Result<Dot, TemplateFault> {
        let mut ty = start.ty;
        let mut path = start.path.clone();
        for seg in text.split('.').filter(|s| !s.is_empty()) {
            let def = match ty {
                Ty::Opaque => return Ok(Dot::opaque()),
                Ty::Struct(def) => def,
                Ty::Nullable(def) => {
                    if let Some(section) = path.as_ref().filter(|p| !self.guards.contains(p)) {
                        self.unguarded(section, chain);
                    }
                    def
                }
                other => {
                    return Err(TemplateFault::UnknownField {
                        chain: chain.to_string(),
                        field: seg.to_string(),
                        type_name: type_name(other),
                    });
                }
            };
            let Some((_, next)) = def.fields.iter().find(|(name, _)| *name == seg) else {
                return Err(TemplateFault::UnknownField {
                    chain: chain.to_string(),
                    field: seg.to_string(),
                    type_name: def.name.to_string(),
                });
            };
            ty = *next;
            path = path.map(|p| if p.is_empty() { seg.to_string() } else { format!("{}.{}", p, seg) });
        }
        Ok(Dot { ty, path })
    }

    fn unguarded(&mut self, section: &str, chain: &str) {
        let seen = self
            .nil
            .iter()
            .any(|f| matches!(f, TemplateFault::NilPointer { section: s, .. } if s == section));
        if !seen {
            self.nil.push(TemplateFault::NilPointer {
                section: section.to_string(),
                chain: chain.to_string(),
            });
        }
    }
}

fn matching_paren(toks: &[Tok<'_>], open: usize) -> Result<usize, TemplateFault> {
    let mut depth = 0usize;
    for (i, tok) in toks.iter().enumerate().skip(open) {
        match tok {
            Tok::LParen => depth += 1,
            Tok::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(syntax("unclosed left paren"))
}

/// The element type `range` binds to `.`.
fn element(ty: Ty, chain: &str) -> Result<Ty, TemplateFault> {
    match ty {
        Ty::List(inner) => Ok(*inner),
        Ty::Opaque | Ty::Scalar("int") => Ok(Ty::Opaque),
        other => Err(TemplateFault::NotIterable {
            chain: chain.to_string(),
            type_name: type_name(other),
        }),
    }
}

/// Source-like text for a token run, used in fault messages.
fn render(toks: &[Tok<'_>]) -> String {
    toks.iter()
        .map(|t| match t {
            Tok::Field(s) | Tok::Var(s) | Tok::Ident(s) => *s,
            Tok::Chain => ".…",
            Tok::Literal => "…",
            Tok::Pipe => "|",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::Declare => ":=",
            Tok::Comma => ",",
        })
        .collect::<Vec<_>>()
        .join(" ")
}
