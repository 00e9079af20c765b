use std::collections::HashSet;

use async_trait::async_trait;
use matter_data_model::clusters::mwom::{
    attributes, mode_tags, ModeOption, MAX_LABEL_LENGTH, MAX_SUPPORTED_MODES, MIN_SUPPORTED_MODES,
};
use tracing::{debug, info};

use super::steps::{attribute_code, MicrowaveOvenModeSteps};
use super::{ConformanceTest, PIXIT_ENDPOINT};
use crate::checker::ConformanceChecker;
use crate::error::ConformanceError;

/// Microwave Oven Mode server: `SupportedModes` and `CurrentMode` hold
/// well-formed values.
pub struct TcMwom12;

fn is_standard_tag(value: u16) -> bool {
    (mode_tags::AUTO..=mode_tags::DAY).contains(&value)
        || value == mode_tags::NORMAL
        || value == mode_tags::DEFROST
}

fn check_supported_modes(requirement: &str, modes: &[ModeOption]) -> Result<(), ConformanceError> {
    let fail = |message: String| Err(ConformanceError::assertion(requirement, message));

    if !(MIN_SUPPORTED_MODES..=MAX_SUPPORTED_MODES).contains(&modes.len()) {
        return fail(format!(
            "SupportedModes must have {MIN_SUPPORTED_MODES} to {MAX_SUPPORTED_MODES} entries, found {}",
            modes.len()
        ));
    }

    let mut seen_modes = HashSet::new();
    let mut seen_labels = HashSet::new();
    for option in modes {
        if !seen_modes.insert(option.mode) {
            return fail(format!("mode {} is listed more than once", option.mode));
        }
        if !seen_labels.insert(option.label.as_str()) {
            return fail(format!("label {:?} is used more than once", option.label));
        }
        if option.label.chars().count() > MAX_LABEL_LENGTH {
            return fail(format!(
                "label {:?} is longer than {MAX_LABEL_LENGTH} characters",
                option.label
            ));
        }
        if option.mode_tags.is_empty() {
            return fail(format!("mode {} has no mode tags", option.mode));
        }
        for tag in &option.mode_tags {
            let manufacturer = mode_tags::MANUFACTURER.contains(&tag.value);
            if tag.mfg_code.is_some() && !manufacturer {
                return fail(format!(
                    "mode {} tag 0x{:04X} has a MfgCode but is not a manufacturer tag value",
                    option.mode, tag.value
                ));
            }
            if !manufacturer && !is_standard_tag(tag.value) {
                return fail(format!(
                    "mode {} uses undefined standard tag 0x{:04X}",
                    option.mode, tag.value
                ));
            }
        }
    }

    if !modes.iter().any(|m| m.has_tag(mode_tags::NORMAL)) {
        return fail("no mode carries the Normal tag".to_string());
    }
    Ok(())
}

#[async_trait]
impl ConformanceTest for TcMwom12 {
    fn name(&self) -> &'static str {
        "TC_MWOM_1_2"
    }

    fn description(&self) -> &'static str {
        "Microwave Oven Mode: SupportedModes and CurrentMode values"
    }

    async fn run(&self, checker: &ConformanceChecker<'_>) -> Result<(), ConformanceError> {
        let endpoint = checker.require_endpoint(PIXIT_ENDPOINT)?;
        let steps = MicrowaveOvenModeSteps::new(checker, endpoint);

        let supported_modes_code = attribute_code(attributes::SUPPORTED_MODES_ATTRIBUTE);
        checker.require_capability(&supported_modes_code)?;
        let modes = steps.read_supported_modes().await?;
        info!(count = modes.len(), "read SupportedModes");
        check_supported_modes(&supported_modes_code, &modes)?;

        let current_mode_code = attribute_code(attributes::CURRENT_MODE_ATTRIBUTE);
        checker.require_capability(&current_mode_code)?;
        let current = steps.read_current_mode().await?;
        debug!(current, "read CurrentMode");
        if !modes.iter().any(|m| m.mode == current) {
            return Err(ConformanceError::assertion(
                current_mode_code,
                format!("CurrentMode {current} is not one of the supported modes"),
            ));
        }
        Ok(())
    }
}
