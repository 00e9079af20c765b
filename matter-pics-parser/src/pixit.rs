//! PIXIT named arguments, as given on the harness command line
//! (`--int-arg PIXIT_ENDPOINT:1`, `--bool-arg PIXIT_FLAG:true`, ...).

use std::collections::BTreeMap;
use std::fmt;

use miette::Diagnostic;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1, hex_digit1},
    combinator::{map, map_res, opt, recognize, rest, value, verify},
    sequence::{pair, preceded, separated_pair},
    IResult, Parser,
};
use nom_supreme::ParserExt;
use thiserror::Error;

/// The value types a named argument can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Int,
    Bool,
    String,
    Hex,
}

impl ArgKind {
    fn expected(&self) -> &'static str {
        match self {
            ArgKind::Int => "decimal integer or 0x-prefixed hex",
            ArgKind::Bool => "true, false, 1 or 0",
            ArgKind::String => "any text",
            ArgKind::Hex => "an even number of hex digits, optionally prefixed with hex:",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Int => "int",
            ArgKind::Bool => "bool",
            ArgKind::String => "string",
            ArgKind::Hex => "hex",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Hex(Vec<u8>),
}

impl TestParamValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            TestParamValue::Int(_) => ArgKind::Int,
            TestParamValue::Bool(_) => ArgKind::Bool,
            TestParamValue::Str(_) => ArgKind::String,
            TestParamValue::Hex(_) => ArgKind::Hex,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TestParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TestParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestParamValue::Int(v) => write!(f, "{v}"),
            TestParamValue::Bool(v) => write!(f, "{v}"),
            TestParamValue::Str(v) => write!(f, "{v:?}"),
            TestParamValue::Hex(bytes) => {
                f.write_str("hex:")?;
                bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg {
    pub name: String,
    pub value: TestParamValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("invalid {kind} argument `{input}`: expected NAME:VALUE where VALUE is {}", .kind.expected())]
#[diagnostic(code(pixit::parse), help("NAME may contain letters, digits, `_` and `.`"))]
pub struct PixitParseError {
    pub kind: ArgKind,
    pub input: String,
}

fn arg_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.')(input)
}

fn hex_int(input: &str) -> IResult<&str, i64> {
    map_res(
        preceded(
            tag("0x"),
            take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
        ),
        |digits: &str| i64::from_str_radix(&digits.replace('_', ""), 16),
    )(input)
}

fn decimal_int(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>)(input)
}

fn int_value(input: &str) -> IResult<&str, TestParamValue> {
    map(alt((hex_int, decimal_int)), TestParamValue::Int)(input)
}

fn bool_value(input: &str) -> IResult<&str, TestParamValue> {
    map(
        alt((
            value(true, tag_no_case("true")),
            value(false, tag_no_case("false")),
            value(true, char('1')),
            value(false, char('0')),
        )),
        TestParamValue::Bool,
    )(input)
}

fn string_value(input: &str) -> IResult<&str, TestParamValue> {
    map(rest, |s: &str| TestParamValue::Str(s.to_string()))(input)
}

fn decode_hex(digits: &str) -> Result<Vec<u8>, std::num::ParseIntError> {
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            // hex_digit1 only yields ASCII, so every chunk is valid UTF-8
            let pair = std::str::from_utf8(pair).unwrap_or_default();
            u8::from_str_radix(pair, 16)
        })
        .collect()
}

fn hex_value(input: &str) -> IResult<&str, TestParamValue> {
    map(
        map_res(
            preceded(
                opt(tag_no_case("hex:")),
                verify(hex_digit1, |digits: &str| digits.len() % 2 == 0),
            ),
            decode_hex,
        ),
        TestParamValue::Hex,
    )(input)
}

fn named_arg(kind: ArgKind, input: &str) -> IResult<&str, NamedArg> {
    let value_parser: fn(&str) -> IResult<&str, TestParamValue> = match kind {
        ArgKind::Int => int_value,
        ArgKind::Bool => bool_value,
        ArgKind::String => string_value,
        ArgKind::Hex => hex_value,
    };
    map(
        separated_pair(arg_name, char(':'), value_parser),
        |(name, value)| NamedArg {
            name: name.to_string(),
            value,
        },
    )
    .all_consuming()
    .parse(input)
}

/// Parses `NAME:VALUE` for the given argument kind.
pub fn parse_named_arg(kind: ArgKind, input: &str) -> Result<NamedArg, PixitParseError> {
    named_arg(kind, input)
        .map(|(_, arg)| arg)
        .map_err(|_| PixitParseError {
            kind,
            input: input.to_string(),
        })
}

pub fn int_arg(input: &str) -> Result<NamedArg, PixitParseError> {
    parse_named_arg(ArgKind::Int, input)
}

pub fn bool_arg(input: &str) -> Result<NamedArg, PixitParseError> {
    parse_named_arg(ArgKind::Bool, input)
}

pub fn string_arg(input: &str) -> Result<NamedArg, PixitParseError> {
    parse_named_arg(ArgKind::String, input)
}

pub fn hex_arg(input: &str) -> Result<NamedArg, PixitParseError> {
    parse_named_arg(ArgKind::Hex, input)
}

/// Test parameters for one run, keyed by name. Inserting a name twice keeps
/// the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestParameters {
    values: BTreeMap<String, TestParamValue>,
}

impl TestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TestParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&TestParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Extend<NamedArg> for TestParameters {
    fn extend<T: IntoIterator<Item = NamedArg>>(&mut self, iter: T) {
        for arg in iter {
            self.insert(arg.name, arg.value);
        }
    }
}

impl FromIterator<NamedArg> for TestParameters {
    fn from_iter<T: IntoIterator<Item = NamedArg>>(iter: T) -> Self {
        let mut params = TestParameters::new();
        params.extend(iter);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PIXIT_ENDPOINT:1", 1)]
    #[case("PIXIT.MWOM.TIMEOUT:-20", -20)]
    #[case("MASK:0xff", 255)]
    #[case("MASK:0x1_00", 256)]
    fn int_args(#[case] input: &str, #[case] expected: i64) {
        let arg = int_arg(input).unwrap();
        assert_eq!(arg.value, TestParamValue::Int(expected));
    }

    #[rstest]
    #[case("PIXIT_ENDPOINT")]
    #[case("PIXIT_ENDPOINT:")]
    #[case("PIXIT_ENDPOINT:one")]
    #[case("PIXIT_ENDPOINT:1.5")]
    #[case(":1")]
    #[case("PIXIT ENDPOINT:1")]
    #[case("X:0xZZ")]
    fn bad_int_args(#[case] input: &str) {
        let err = int_arg(input).unwrap_err();
        assert_eq!(err.kind, ArgKind::Int);
        assert_eq!(err.input, input);
    }

    #[rstest]
    #[case("FLAG:true", true)]
    #[case("FLAG:FALSE", false)]
    #[case("FLAG:1", true)]
    #[case("FLAG:0", false)]
    fn bool_args(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(bool_arg(input).unwrap().value, TestParamValue::Bool(expected));
    }

    #[test]
    fn bool_rejects_other_words() {
        assert!(bool_arg("FLAG:yes").is_err());
        assert!(bool_arg("FLAG:10").is_err());
    }

    #[test]
    fn string_keeps_everything_after_first_colon() {
        let arg = string_arg("PIXIT_URL:http://dut:5540").unwrap();
        assert_eq!(arg.name, "PIXIT_URL");
        assert_eq!(arg.value, TestParamValue::Str("http://dut:5540".into()));
    }

    #[rstest]
    #[case("KEY:00ff10", vec![0x00, 0xff, 0x10])]
    #[case("KEY:hex:ABCD", vec![0xab, 0xcd])]
    fn hex_args(#[case] input: &str, #[case] expected: Vec<u8>) {
        assert_eq!(hex_arg(input).unwrap().value, TestParamValue::Hex(expected));
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert!(hex_arg("KEY:abc").is_err());
    }

    #[test]
    fn later_arguments_override_earlier_ones() {
        let params: TestParameters = ["PIXIT_ENDPOINT:1", "PIXIT_ENDPOINT:2"]
            .into_iter()
            .map(|s| int_arg(s).unwrap())
            .collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("PIXIT_ENDPOINT"), Some(&TestParamValue::Int(2)));
        assert!(!params.contains("PIXIT_OTHER"));
    }

    #[test]
    fn values_display_like_cli_input() {
        assert_eq!(TestParamValue::Int(-3).to_string(), "-3");
        assert_eq!(TestParamValue::Hex(vec![0xab, 1]).to_string(), "hex:ab01");
        assert_eq!(TestParamValue::Str("a".into()).to_string(), "\"a\"");
    }
}
