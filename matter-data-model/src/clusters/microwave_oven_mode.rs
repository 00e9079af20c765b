//! Microwave Oven Mode cluster (0x005E), a derivation of the Mode Base
//! cluster.
//!
//! The server exposes its modes through `SupportedModes` and the active one
//! through `CurrentMode`. Microwave ovens do not accept `ChangeToMode` from
//! clients, so the command pair is defined here only so that its absence (or
//! presence on non-conforming devices) can be checked.

use std::collections::BTreeMap;

use crate::value::in_field;
use crate::{
    ClusterId, CommandRequest, CommandResponse, DecodeError, FieldSpec, ResponseSchema, Value,
    ValueKind,
};

pub const CLUSTER_ID: ClusterId = ClusterId(0x005E);
pub const CLUSTER_NAME: &str = "MicrowaveOvenMode";
pub const PICS_PREFIX: &str = "MWOM";

/// Device type code of a Microwave Oven.
pub const MICROWAVE_OVEN_DEVICE_TYPE: u32 = 0x0079;

pub mod attributes {
    use super::CLUSTER_ID;
    use crate::{AttributeDescriptor, AttributeId};

    pub const SUPPORTED_MODES: AttributeId = AttributeId(0x0000);
    pub const CURRENT_MODE: AttributeId = AttributeId(0x0001);

    pub const SUPPORTED_MODES_ATTRIBUTE: AttributeDescriptor = AttributeDescriptor {
        cluster: CLUSTER_ID,
        attribute: SUPPORTED_MODES,
        name: "SupportedModes",
    };
    pub const CURRENT_MODE_ATTRIBUTE: AttributeDescriptor = AttributeDescriptor {
        cluster: CLUSTER_ID,
        attribute: CURRENT_MODE,
        name: "CurrentMode",
    };
}

pub mod commands {
    use crate::CommandId;

    pub const CHANGE_TO_MODE: CommandId = CommandId(0x00);
    pub const CHANGE_TO_MODE_RESPONSE: CommandId = CommandId(0x01);
}

/// Semantic tag values. Values below 0x4000 are the common Mode Base tags,
/// 0x4000 and above are specific to this cluster.
pub mod mode_tags {
    use std::ops::RangeInclusive;

    pub const AUTO: u16 = 0x0000;
    pub const QUICK: u16 = 0x0001;
    pub const QUIET: u16 = 0x0002;
    pub const LOW_NOISE: u16 = 0x0003;
    pub const LOW_ENERGY: u16 = 0x0004;
    pub const VACATION: u16 = 0x0005;
    pub const MIN: u16 = 0x0006;
    pub const MAX: u16 = 0x0007;
    pub const NIGHT: u16 = 0x0008;
    pub const DAY: u16 = 0x0009;
    pub const NORMAL: u16 = 0x4000;
    pub const DEFROST: u16 = 0x4001;

    /// Manufacturer-defined tag values. A tag carrying a `MfgCode` must use
    /// one of these.
    pub const MANUFACTURER: RangeInclusive<u16> = 0x8000..=0xBFFF;
}

pub const MAX_LABEL_LENGTH: usize = 64;
pub const MIN_SUPPORTED_MODES: usize = 2;
pub const MAX_SUPPORTED_MODES: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTag {
    pub mfg_code: Option<u16>,
    pub value: u16,
}

impl ModeTag {
    pub fn standard(value: u16) -> Self {
        Self {
            mfg_code: None,
            value,
        }
    }

    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let mfg_code = value
            .optional_field(0)?
            .map(|v| in_field("MfgCode", v.as_u16()))
            .transpose()?;
        Ok(Self {
            mfg_code,
            value: in_field("Value", value.field(1, "Value")?.as_u16())?,
        })
    }

    pub fn encode(&self) -> Value {
        let mut fields = BTreeMap::new();
        if let Some(code) = self.mfg_code {
            fields.insert(0, Value::from(code));
        }
        fields.insert(1, Value::from(self.value));
        Value::Struct(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOption {
    pub label: String,
    pub mode: u8,
    pub mode_tags: Vec<ModeTag>,
}

impl ModeOption {
    pub fn new(label: &str, mode: u8, tags: &[u16]) -> Self {
        Self {
            label: label.to_string(),
            mode,
            mode_tags: tags.iter().copied().map(ModeTag::standard).collect(),
        }
    }

    pub fn has_tag(&self, value: u16) -> bool {
        self.mode_tags
            .iter()
            .any(|t| t.mfg_code.is_none() && t.value == value)
    }

    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let tags = in_field("ModeTags", value.field(2, "ModeTags")?.as_list())?;
        Ok(Self {
            label: in_field("Label", value.field(0, "Label")?.as_str())?.to_string(),
            mode: in_field("Mode", value.field(1, "Mode")?.as_u8())?,
            mode_tags: tags
                .iter()
                .map(|t| in_field("ModeTags", ModeTag::decode(t)))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn encode(&self) -> Value {
        Value::structure([
            (0, Value::from(self.label.as_str())),
            (1, Value::from(self.mode)),
            (
                2,
                Value::List(self.mode_tags.iter().map(ModeTag::encode).collect()),
            ),
        ])
    }
}

/// Decodes the `SupportedModes` attribute.
pub fn decode_supported_modes(value: &Value) -> Result<Vec<ModeOption>, DecodeError> {
    value.as_list()?.iter().map(ModeOption::decode).collect()
}

pub fn encode_supported_modes(modes: &[ModeOption]) -> Value {
    Value::List(modes.iter().map(ModeOption::encode).collect())
}

/// Decodes the `CurrentMode` attribute.
pub fn decode_current_mode(value: &Value) -> Result<u8, DecodeError> {
    value.as_u8()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeToMode {
    pub new_mode: u8,
}

impl ChangeToMode {
    pub fn request(&self) -> CommandRequest {
        CommandRequest {
            cluster: CLUSTER_ID,
            command: commands::CHANGE_TO_MODE,
            fields: BTreeMap::from([(0, Value::from(self.new_mode))]),
        }
    }

    pub fn decode(request: &CommandRequest) -> Result<Self, DecodeError> {
        let new_mode = request
            .fields
            .get(&0)
            .ok_or(DecodeError::MissingField {
                tag: 0,
                name: "NewMode",
            })?;
        Ok(Self {
            new_mode: in_field("NewMode", new_mode.as_u8())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChangeStatus {
    Success,
    UnsupportedMode,
    GenericFailure,
    InvalidInMode,
    ClusterSpecific(u8),
    ManufacturerSpecific(u8),
}

impl ModeChangeStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Success),
            0x01 => Some(Self::UnsupportedMode),
            0x02 => Some(Self::GenericFailure),
            0x03 => Some(Self::InvalidInMode),
            0x40..=0x7F => Some(Self::ClusterSpecific(code)),
            0x80..=0xBF => Some(Self::ManufacturerSpecific(code)),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::UnsupportedMode => 0x01,
            Self::GenericFailure => 0x02,
            Self::InvalidInMode => 0x03,
            Self::ClusterSpecific(c) | Self::ManufacturerSpecific(c) => *c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeToModeResponse {
    pub status: ModeChangeStatus,
    pub status_text: Option<String>,
}

impl ChangeToModeResponse {
    pub const SCHEMA: ResponseSchema = ResponseSchema {
        name: "ChangeToModeResponse",
        cluster: CLUSTER_ID,
        command: commands::CHANGE_TO_MODE_RESPONSE,
        fields: &[
            FieldSpec::required(0, "Status", ValueKind::Unsigned),
            FieldSpec::optional(1, "StatusText", ValueKind::String),
        ],
    };

    pub fn decode(response: &CommandResponse) -> Result<Self, DecodeError> {
        let value = response.as_value();
        let code = in_field("Status", value.field(0, "Status")?.as_u8())?;
        let status = ModeChangeStatus::from_code(code).ok_or(DecodeError::InField {
            name: "Status",
            source: Box::new(DecodeError::OutOfRange {
                value: code.into(),
                target: "ModeChangeStatus",
            }),
        })?;
        let status_text = value
            .optional_field(1)?
            .map(|v| in_field("StatusText", v.as_str()).map(str::to_string))
            .transpose()?;
        Ok(Self {
            status,
            status_text,
        })
    }

    pub fn encode(&self) -> CommandResponse {
        let mut fields = BTreeMap::from([(0, Value::from(self.status.code()))]);
        if let Some(text) = &self.status_text {
            fields.insert(1, Value::from(text.as_str()));
        }
        CommandResponse {
            cluster: CLUSTER_ID,
            command: commands::CHANGE_TO_MODE_RESPONSE,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvokeResponse;
    use rstest::rstest;

    #[test]
    fn decodes_supported_modes() {
        let modes = vec![
            ModeOption::new("Normal", 0, &[mode_tags::NORMAL]),
            ModeOption {
                label: "Vendor".into(),
                mode: 7,
                mode_tags: vec![ModeTag {
                    mfg_code: Some(0xFFF1),
                    value: 0x8000,
                }],
            },
        ];
        let decoded = decode_supported_modes(&encode_supported_modes(&modes)).unwrap();
        assert_eq!(decoded, modes);
        assert!(decoded[0].has_tag(mode_tags::NORMAL));
        // Manufacturer tags never count as standard ones.
        assert!(!decoded[1].has_tag(0x8000));
    }

    #[test]
    fn missing_label_names_the_field() {
        let broken = Value::List(vec![Value::structure([
            (1, Value::from(0u8)),
            (2, Value::List(vec![])),
        ])]);
        let err = decode_supported_modes(&broken).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                tag: 0,
                name: "Label"
            }
        );
    }

    #[test]
    fn oversized_mode_is_rejected() {
        let broken = Value::structure([
            (0, Value::from("x")),
            (1, Value::Unsigned(300)),
            (2, Value::List(vec![])),
        ]);
        assert!(matches!(
            ModeOption::decode(&broken),
            Err(DecodeError::InField { name: "Mode", .. })
        ));
    }

    #[rstest]
    #[case(0x00, Some(ModeChangeStatus::Success))]
    #[case(0x03, Some(ModeChangeStatus::InvalidInMode))]
    #[case(0x41, Some(ModeChangeStatus::ClusterSpecific(0x41)))]
    #[case(0x90, Some(ModeChangeStatus::ManufacturerSpecific(0x90)))]
    #[case(0x04, None)]
    #[case(0xC0, None)]
    fn mode_change_status_ranges(#[case] code: u8, #[case] expected: Option<ModeChangeStatus>) {
        assert_eq!(ModeChangeStatus::from_code(code), expected);
    }

    #[test]
    fn change_to_mode_response_matches_its_schema() {
        let response = ChangeToModeResponse {
            status: ModeChangeStatus::UnsupportedMode,
            status_text: Some("no such mode".into()),
        }
        .encode();
        let check = ChangeToModeResponse::SCHEMA.check(&InvokeResponse::Command(response.clone()));
        assert!(check.matches, "{}", check.diagnostic);

        let decoded = ChangeToModeResponse::decode(&response).unwrap();
        assert_eq!(decoded.status, ModeChangeStatus::UnsupportedMode);
        assert_eq!(decoded.status_text.as_deref(), Some("no such mode"));
    }

    #[test]
    fn change_to_mode_request_carries_new_mode() {
        let request = ChangeToMode { new_mode: 4 }.request();
        assert_eq!(request.cluster, CLUSTER_ID);
        assert_eq!(request.command, commands::CHANGE_TO_MODE);
        assert_eq!(ChangeToMode::decode(&request), Ok(ChangeToMode { new_mode: 4 }));
    }
}
