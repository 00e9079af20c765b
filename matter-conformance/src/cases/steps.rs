use matter_data_model::clusters::mwom::{
    self, attributes, ChangeToMode, ChangeToModeResponse, ModeOption,
};
use matter_data_model::{AttributeDescriptor, EndpointId, Value};
use matter_pics_parser::PicsCode;

use crate::checker::ConformanceChecker;
use crate::error::ConformanceError;

/// Microwave Oven Mode operations bound to the endpoint under test.
pub struct MicrowaveOvenModeSteps<'c, 'a> {
    checker: &'c ConformanceChecker<'a>,
    endpoint: EndpointId,
}

impl<'c, 'a> MicrowaveOvenModeSteps<'c, 'a> {
    pub fn new(checker: &'c ConformanceChecker<'a>, endpoint: EndpointId) -> Self {
        Self { checker, endpoint }
    }

    pub async fn read_mode_attribute(
        &self,
        attribute: AttributeDescriptor,
    ) -> Result<Value, ConformanceError> {
        self.checker.read_attribute(self.endpoint, attribute).await
    }

    pub async fn read_supported_modes(&self) -> Result<Vec<ModeOption>, ConformanceError> {
        let value = self
            .read_mode_attribute(attributes::SUPPORTED_MODES_ATTRIBUTE)
            .await?;
        mwom::decode_supported_modes(&value).map_err(|e| {
            ConformanceError::assertion(
                attribute_code(attributes::SUPPORTED_MODES_ATTRIBUTE),
                format!("SupportedModes is not a list of ModeOptionStruct: {e}"),
            )
        })
    }

    pub async fn read_current_mode(&self) -> Result<u8, ConformanceError> {
        let value = self
            .read_mode_attribute(attributes::CURRENT_MODE_ATTRIBUTE)
            .await?;
        mwom::decode_current_mode(&value).map_err(|e| {
            ConformanceError::assertion(
                attribute_code(attributes::CURRENT_MODE_ATTRIBUTE),
                format!("CurrentMode is not a uint8: {e}"),
            )
        })
    }

    pub async fn send_change_to_mode(
        &self,
        new_mode: u8,
    ) -> Result<ChangeToModeResponse, ConformanceError> {
        let response = self
            .checker
            .invoke_command(
                self.endpoint,
                ChangeToMode { new_mode }.request(),
                &ChangeToModeResponse::SCHEMA,
            )
            .await?;
        ChangeToModeResponse::decode(&response).map_err(|e| ConformanceError::ShapeMismatch {
            command: ChangeToModeResponse::SCHEMA.name,
            diagnostic: e.to_string(),
        })
    }
}

pub(crate) fn attribute_code(attribute: AttributeDescriptor) -> String {
    PicsCode::server_attribute(mwom::PICS_PREFIX, attribute.attribute.0).to_string()
}
