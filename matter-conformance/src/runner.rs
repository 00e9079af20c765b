use tracing::{error, info, info_span, Instrument};

use crate::cases::ConformanceTest;
use crate::checker::ConformanceChecker;
use crate::config::MatterTestConfig;
use crate::controller::DeviceController;
use crate::error::ConformanceError;

#[derive(Debug)]
pub struct TestOutcome {
    pub name: &'static str,
    pub result: Result<(), ConformanceError>,
    /// Reads and invokes the test issued before it finished.
    pub remote_calls: usize,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one test case with its own [`ConformanceChecker`].
pub async fn run_test(
    test: &dyn ConformanceTest,
    config: &MatterTestConfig,
    controller: &dyn DeviceController,
) -> TestOutcome {
    let checker = ConformanceChecker::new(config, controller);
    let span = info_span!("test", name = test.name());

    async {
        info!(description = test.description(), "starting");
        let result = test.run(&checker).await;
        match &result {
            Ok(()) => info!(remote_calls = checker.remote_calls(), "passed"),
            Err(e) => error!(error = %e, remote_calls = checker.remote_calls(), "failed"),
        }
        TestOutcome {
            name: test.name(),
            result,
            remote_calls: checker.remote_calls(),
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::{TcMwom12, TcMwom21, PIXIT_ENDPOINT};
    use crate::simulated::SimulatedDevice;
    use matter_pics_parser::pixit::int_arg;

    fn config(pics: &str) -> MatterTestConfig {
        MatterTestConfig::new(
            [int_arg(&format!("{PIXIT_ENDPOINT}:1")).unwrap()],
            pics.parse().unwrap(),
            vec![],
        )
    }

    #[tokio::test]
    async fn each_run_counts_its_own_calls() {
        let config = config("MWOM.S.A0000=1\nMWOM.S.A0001=1\n");
        let device = SimulatedDevice::microwave_oven(1);

        let first = run_test(&TcMwom12, &config, &device).await;
        let second = run_test(&TcMwom12, &config, &device).await;
        assert!(first.passed() && second.passed());
        assert_eq!(first.remote_calls, 2);
        assert_eq!(second.remote_calls, 2);
        assert_eq!(device.reads(), 4);
    }

    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let config = config("MWOM.S.A0000=1\nMWOM.S.A0001=1\nMWOM.S.C00.Rsp=1\n");
        let device = SimulatedDevice::microwave_oven(1);

        let outcome = run_test(&TcMwom21, &config, &device).await;
        assert_eq!(outcome.name, "TC_MWOM_2_1");
        assert!(!outcome.passed());
        assert_eq!(outcome.remote_calls, 0);
    }
}
