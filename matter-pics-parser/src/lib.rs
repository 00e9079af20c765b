//! Parsers for the externally supplied inputs of a Matter certification test
//! run: PICS files (which features the device claims) and PIXIT named
//! arguments (extra values such as the endpoint to test).

use nom::error::ErrorKind;
use nom_greedyerror::GreedyError;
use nom_locate::LocatedSpan;

pub mod pics;
pub mod pixit;

pub use pics::{parse_pics, InvalidPicsCode, PicsCode, PicsParseError, PicsSet};
pub use pixit::{ArgKind, NamedArg, PixitParseError, TestParamValue, TestParameters};

pub type Span<'a> = LocatedSpan<&'a str>;
pub type ParseResult<'a, T> = nom::IResult<Span<'a>, T, GreedyError<Span<'a>, ErrorKind>>;
