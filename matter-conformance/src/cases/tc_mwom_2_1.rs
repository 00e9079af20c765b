use async_trait::async_trait;
use matter_data_model::clusters::mwom::{attributes, commands, PICS_PREFIX};
use matter_pics_parser::PicsCode;
use tracing::info;

use super::{ConformanceTest, PIXIT_ENDPOINT};
use crate::checker::ConformanceChecker;
use crate::error::ConformanceError;

/// Microwave Oven Mode server: both mode attributes are mandatory and the
/// `ChangeToMode` command pair must not be implemented.
///
/// Run with `--int-arg PIXIT_ENDPOINT:<endpoint>`.
pub struct TcMwom21;

#[async_trait]
impl ConformanceTest for TcMwom21 {
    fn name(&self) -> &'static str {
        "TC_MWOM_2_1"
    }

    fn description(&self) -> &'static str {
        "Microwave Oven Mode: mandatory attributes present, ChangeToMode absent"
    }

    async fn run(&self, checker: &ConformanceChecker<'_>) -> Result<(), ConformanceError> {
        let endpoint = checker.require_endpoint(PIXIT_ENDPOINT)?;
        info!(%endpoint, "checking Microwave Oven Mode PICS");

        let supported_modes =
            PicsCode::server_attribute(PICS_PREFIX, attributes::SUPPORTED_MODES.0);
        let current_mode = PicsCode::server_attribute(PICS_PREFIX, attributes::CURRENT_MODE.0);
        let change_to_mode =
            PicsCode::server_command_response(PICS_PREFIX, commands::CHANGE_TO_MODE.0);
        let change_to_mode_response =
            PicsCode::server_command_transmit(PICS_PREFIX, commands::CHANGE_TO_MODE_RESPONSE.0);

        checker.require_capability(supported_modes.as_str())?;
        checker.require_capability(current_mode.as_str())?;
        checker.forbid_capability(change_to_mode.as_str())?;
        checker.forbid_capability(change_to_mode_response.as_str())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedDevice;
    use matter_pics_parser::{PicsSet, TestParamValue, TestParameters};

    fn conforming_pics() -> PicsSet {
        "MWOM.S.A0000=1\nMWOM.S.A0001=1\nMWOM.S.C00.Rsp=0\nMWOM.S.C01.Tx=0\n"
            .parse()
            .unwrap()
    }

    fn endpoint_one() -> TestParameters {
        let mut params = TestParameters::new();
        params.insert(PIXIT_ENDPOINT, TestParamValue::Int(1));
        params
    }

    #[tokio::test]
    async fn passes_without_remote_calls() {
        let params = endpoint_one();
        let pics = conforming_pics();
        let device = SimulatedDevice::microwave_oven(1);
        let checker = ConformanceChecker::from_parts(&params, &pics, &device);

        TcMwom21.run(&checker).await.unwrap();
        assert_eq!(checker.remote_calls(), 0);
        assert_eq!(device.reads() + device.invokes(), 0);
    }

    #[tokio::test]
    async fn missing_endpoint_fails_before_capability_checks() {
        let params = TestParameters::new();
        // would fail the first capability check if it were reached
        let pics = PicsSet::new();
        let device = SimulatedDevice::microwave_oven(1);
        let checker = ConformanceChecker::from_parts(&params, &pics, &device);

        let err = TcMwom21.run(&checker).await.unwrap_err();
        assert!(matches!(err, ConformanceError::MissingParameter { .. }), "{err:?}");
    }
}
