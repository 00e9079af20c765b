//! Command invocation shapes and explicit response schemas.
//!
//! A device may answer an invoke either with a data response (a command of
//! its own, carrying tagged fields) or with a bare interaction-model status.
//! Callers that expect a particular response describe it with a
//! [`ResponseSchema`] and check what came back with
//! [`ResponseSchema::check`].

use std::collections::BTreeMap;
use std::fmt;

use crate::{ClusterId, CommandId, Value, ValueKind};

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub cluster: ClusterId,
    pub command: CommandId,
    pub fields: BTreeMap<u8, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    pub cluster: ClusterId,
    pub command: CommandId,
    pub fields: BTreeMap<u8, Value>,
}

impl CommandResponse {
    /// The response fields viewed as a single structure value.
    pub fn as_value(&self) -> Value {
        Value::Struct(self.fields.clone())
    }
}

/// Interaction model status codes a device may answer with instead of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImStatus {
    Success,
    Failure,
    UnsupportedEndpoint,
    UnsupportedCommand,
    InvalidCommand,
    UnsupportedAttribute,
    ConstraintError,
    InvalidInState,
    Busy,
    UnsupportedCluster,
    Other(u8),
}

impl ImStatus {
    pub fn code(&self) -> u8 {
        match self {
            ImStatus::Success => 0x00,
            ImStatus::Failure => 0x01,
            ImStatus::UnsupportedEndpoint => 0x7F,
            ImStatus::UnsupportedCommand => 0x81,
            ImStatus::InvalidCommand => 0x85,
            ImStatus::UnsupportedAttribute => 0x86,
            ImStatus::ConstraintError => 0x87,
            ImStatus::InvalidInState => 0xCB,
            ImStatus::Busy => 0x9C,
            ImStatus::UnsupportedCluster => 0xC3,
            ImStatus::Other(code) => *code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ImStatus::Success,
            0x01 => ImStatus::Failure,
            0x7F => ImStatus::UnsupportedEndpoint,
            0x81 => ImStatus::UnsupportedCommand,
            0x85 => ImStatus::InvalidCommand,
            0x86 => ImStatus::UnsupportedAttribute,
            0x87 => ImStatus::ConstraintError,
            0xCB => ImStatus::InvalidInState,
            0x9C => ImStatus::Busy,
            0xC3 => ImStatus::UnsupportedCluster,
            other => ImStatus::Other(other),
        }
    }
}

impl fmt::Display for ImStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImStatus::Other(code) => write!(f, "status 0x{code:02X}"),
            named => write!(f, "{named:?} (0x{:02X})", named.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvokeResponse {
    Command(CommandResponse),
    Status(ImStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: u8,
    pub name: &'static str,
    pub kind: ValueKind,
    pub optional: bool,
}

impl FieldSpec {
    pub const fn required(tag: u8, name: &'static str, kind: ValueKind) -> Self {
        Self {
            tag,
            name,
            kind,
            optional: false,
        }
    }

    pub const fn optional(tag: u8, name: &'static str, kind: ValueKind) -> Self {
        Self {
            tag,
            name,
            kind,
            optional: true,
        }
    }
}

/// The expected shape of a data response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub cluster: ClusterId,
    pub command: CommandId,
    pub fields: &'static [FieldSpec],
}

/// Outcome of matching a response against a [`ResponseSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeCheck {
    pub matches: bool,
    pub diagnostic: String,
}

impl ShapeCheck {
    fn ok(schema: &ResponseSchema) -> Self {
        Self {
            matches: true,
            diagnostic: format!("response matches {}", schema.name),
        }
    }

    fn mismatch(diagnostic: String) -> Self {
        Self {
            matches: false,
            diagnostic,
        }
    }
}

impl ResponseSchema {
    pub fn check(&self, response: &InvokeResponse) -> ShapeCheck {
        let response = match response {
            InvokeResponse::Command(r) => r,
            InvokeResponse::Status(status) => {
                return ShapeCheck::mismatch(format!(
                    "expected {}, device answered with {status}",
                    self.name
                ))
            }
        };

        if response.cluster != self.cluster || response.command != self.command {
            return ShapeCheck::mismatch(format!(
                "expected {} (cluster {}, command {}), got cluster {} command {}",
                self.name, self.cluster, self.command, response.cluster, response.command
            ));
        }

        let mut problems = Vec::new();
        for spec in self.fields {
            match response.fields.get(&spec.tag) {
                None | Some(Value::Null) if spec.optional => {}
                None => problems.push(format!("missing field `{}` (tag {})", spec.name, spec.tag)),
                Some(value) if value.kind() != spec.kind => problems.push(format!(
                    "field `{}` is {}, expected {}",
                    spec.name,
                    value.kind(),
                    spec.kind
                )),
                Some(_) => {}
            }
        }

        if problems.is_empty() {
            ShapeCheck::ok(self)
        } else {
            ShapeCheck::mismatch(format!("{}: {}", self.name, problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SCHEMA: ResponseSchema = ResponseSchema {
        name: "ProbeResponse",
        cluster: ClusterId(0x10),
        command: CommandId(0x01),
        fields: &[
            FieldSpec::required(0, "Status", ValueKind::Unsigned),
            FieldSpec::optional(1, "Text", ValueKind::String),
        ],
    };

    fn response(fields: impl IntoIterator<Item = (u8, Value)>) -> InvokeResponse {
        InvokeResponse::Command(CommandResponse {
            cluster: ClusterId(0x10),
            command: CommandId(0x01),
            fields: fields.into_iter().collect(),
        })
    }

    #[rstest]
    #[case::minimal(response([(0, Value::Unsigned(0))]))]
    #[case::with_optional(response([(0, Value::Unsigned(0)), (1, Value::from("ok"))]))]
    #[case::optional_null(response([(0, Value::Unsigned(0)), (1, Value::Null)]))]
    fn accepts(#[case] input: InvokeResponse) {
        let check = SCHEMA.check(&input);
        assert!(check.matches, "{}", check.diagnostic);
    }

    #[rstest]
    #[case::missing_required(response([]), "missing field `Status`")]
    #[case::wrong_kind(response([(0, Value::from("0"))]), "field `Status` is string")]
    #[case::wrong_optional_kind(
        response([(0, Value::Unsigned(0)), (1, Value::Bool(true))]),
        "field `Text` is bool"
    )]
    #[case::status(InvokeResponse::Status(ImStatus::UnsupportedCommand), "UnsupportedCommand")]
    fn rejects(#[case] input: InvokeResponse, #[case] needle: &str) {
        let check = SCHEMA.check(&input);
        assert!(!check.matches);
        assert!(
            check.diagnostic.contains(needle),
            "{:?} should mention {needle:?}",
            check.diagnostic
        );
    }

    #[test]
    fn rejects_other_command() {
        let input = InvokeResponse::Command(CommandResponse {
            cluster: ClusterId(0x10),
            command: CommandId(0x02),
            fields: BTreeMap::new(),
        });
        let check = SCHEMA.check(&input);
        assert!(!check.matches);
        assert!(check.diagnostic.contains("command 0x02"));
    }

    #[test]
    fn status_codes_round_trip_through_known_names() {
        for status in [
            ImStatus::Success,
            ImStatus::UnsupportedCommand,
            ImStatus::UnsupportedCluster,
            ImStatus::Other(0x42),
        ] {
            assert_eq!(ImStatus::from_code(status.code()), status);
        }
    }
}
