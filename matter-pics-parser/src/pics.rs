//! PICS files: one `CODE=VALUE` pair per line, where VALUE is `0` or `1`.
//!
//! ```text
//! # Microwave Oven Mode, server side
//! MWOM.S.A0000=1
//! MWOM.S.A0001 = 1   # CurrentMode
//! MWOM.S.C00.Rsp=0
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use miette::{Diagnostic, NamedSource, SourceSpan};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, line_ending, multispace0, not_line_ending, satisfy, space0},
    combinator::{not, opt, peek, recognize, value},
    error::context,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, terminated},
    Parser,
};
use nom_greedyerror::{error_position, GreedyErrorKind};
use nom_supreme::ParserExt;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{ParseResult, Span};

/// A validated PICS code such as `MWOM.S.A0000`: dot separated segments of
/// ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PicsCode(String);

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("`{0}` is not a valid PICS code")]
#[diagnostic(
    code(pics::invalid_code),
    help("PICS codes are dot separated segments like `MWOM.S.A0000`")
)]
pub struct InvalidPicsCode(pub String);

impl PicsCode {
    pub fn new(code: &str) -> Result<Self, InvalidPicsCode> {
        let trimmed = code.trim();
        match pics_code.all_consuming().parse(Span::new(trimmed)) {
            Ok(_) => Ok(Self(trimmed.to_string())),
            Err(_) => Err(InvalidPicsCode(code.to_string())),
        }
    }

    /// `<PREFIX>.S.A<attribute id as 4 hex digits>`
    pub fn server_attribute(prefix: &str, attribute: u32) -> Self {
        Self(format!("{prefix}.S.A{attribute:04X}"))
    }

    /// `<PREFIX>.S.C<command id as 2 hex digits>.Rsp`: the server accepts
    /// (responds to) the command.
    pub fn server_command_response(prefix: &str, command: u32) -> Self {
        Self(format!("{prefix}.S.C{command:02X}.Rsp"))
    }

    /// `<PREFIX>.S.C<command id as 2 hex digits>.Tx`: the server generates
    /// (transmits) the command.
    pub fn server_command_transmit(prefix: &str, command: u32) -> Self {
        Self(format!("{prefix}.S.C{command:02X}.Tx"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PicsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PicsCode {
    type Err = InvalidPicsCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PicsCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The set of PICS values declared for a device. Codes that were never
/// declared read as unsupported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PicsSet {
    values: BTreeMap<String, bool>,
}

impl PicsSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `code`, replacing any earlier value.
    pub fn insert(&mut self, code: PicsCode, supported: bool) -> Option<bool> {
        self.values.insert(code.0, supported)
    }

    /// The declared value, if `code` was declared at all.
    pub fn get(&self, code: &str) -> Option<bool> {
        self.values.get(code.trim()).copied()
    }

    pub fn supports(&self, code: &str) -> bool {
        self.get(code).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Copies every value of `other` over this set.
    pub fn extend_from(&mut self, other: &PicsSet) {
        for (code, supported) in other.iter() {
            self.values.insert(code.to_string(), supported);
        }
    }
}

impl FromIterator<(PicsCode, bool)> for PicsSet {
    fn from_iter<T: IntoIterator<Item = (PicsCode, bool)>>(iter: T) -> Self {
        let mut set = PicsSet::new();
        for (code, supported) in iter {
            set.insert(code, supported);
        }
        set
    }
}

impl FromStr for PicsSet {
    type Err = PicsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pics("<pics>", s)
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("invalid PICS file {name} at line {line}: {reason}")]
#[diagnostic(
    code(pics::parse),
    help("each line must look like `CODE=0` or `CODE=1`; `#` starts a comment")
)]
pub struct PicsParseError {
    pub name: String,
    pub line: u32,
    pub reason: String,
    #[source_code]
    src: NamedSource,
    #[label("here")]
    span: SourceSpan,
}

impl PicsParseError {
    pub fn offset(&self) -> usize {
        self.span.offset()
    }

    /// Length in bytes of the highlighted input.
    pub fn span_len(&self) -> usize {
        self.span.len()
    }
}

fn segment(input: Span) -> ParseResult<Span> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn pics_code(input: Span) -> ParseResult<Span> {
    context("PICS code", recognize(separated_list1(char('.'), segment)))(input)
}

fn support_flag(input: Span) -> ParseResult<bool> {
    context(
        "value `0` or `1`",
        terminated(
            alt((value(true, char('1')), value(false, char('0')))),
            peek(not(satisfy(|c| c.is_ascii_alphanumeric()))),
        ),
    )(input)
}

fn comment(input: Span) -> ParseResult<()> {
    value((), pair(char('#'), not_line_ending))(input)
}

/// `CODE = VALUE`. Once a code was read the rest of the entry is mandatory.
fn entry(input: Span) -> ParseResult<(Span, bool)> {
    let assignment = context("`=` after the PICS code", char('=')).preceded_by(space0);
    let flag = support_flag.preceded_by(space0);
    pair(pics_code, assignment.precedes(flag).cut())(input)
}

fn line(input: Span) -> ParseResult<Option<(Span, bool)>> {
    delimited(space0, opt(entry), pair(space0, opt(comment)))(input)
}

fn pics_file(input: Span) -> ParseResult<Vec<Option<(Span, bool)>>> {
    separated_list0(line_ending, line)
        .terminated(multispace0)
        .all_consuming()
        .parse(input)
}

/// Parses the content of a PICS file. `name` is only used for diagnostics.
pub fn parse_pics(name: &str, input: &str) -> Result<PicsSet, PicsParseError> {
    let entries = match pics_file(Span::new(input)) {
        Ok((_, entries)) => entries,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = error_position(&e).unwrap_or(input.len()).min(input.len());
            let reason = e
                .errors
                .iter()
                .find_map(|(_, kind)| match kind {
                    GreedyErrorKind::Context(ctx) => Some(format!("expected {ctx}")),
                    _ => None,
                })
                .unwrap_or_else(|| "unexpected text".to_string());
            return Err(error_at(name, input, offset, reason));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(error_at(
                name,
                input,
                input.len(),
                "unexpected end of input".to_string(),
            ))
        }
    };

    let mut set = PicsSet::new();
    for (code, supported) in entries.into_iter().flatten() {
        trace!(code = code.fragment(), supported, "PICS entry");
        if let Some(previous) = set.insert(PicsCode(code.fragment().to_string()), supported) {
            debug!(
                code = code.fragment(),
                line = code.location_line(),
                previous,
                supported,
                "PICS code declared more than once, last value wins"
            );
        }
    }
    debug!(name, count = set.len(), "parsed PICS file");
    Ok(set)
}

fn error_at(name: &str, input: &str, offset: usize, reason: String) -> PicsParseError {
    let line = input[..offset].matches('\n').count() as u32 + 1;
    let len = input[offset..]
        .find(|c: char| c.is_whitespace() || c == '#')
        .unwrap_or(input.len() - offset);
    PicsParseError {
        name: name.to_string(),
        line,
        reason,
        src: NamedSource::new(name, input.to_string()),
        span: (offset, len).into(),
    }
}
