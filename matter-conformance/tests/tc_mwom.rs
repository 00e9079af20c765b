use matter_conformance::cases::{self, TcMwom12, TcMwom21, PIXIT_ENDPOINT};
use matter_conformance::{
    run_test, ConformanceError, Expectation, MatterTestConfig, SimulatedDevice,
};
use matter_pics_parser::parse_pics;
use matter_pics_parser::pixit::int_arg;
use rstest::rstest;

const CONFORMING_PICS: &str = r#"
# Microwave Oven Mode server
MWOM.S=1
MWOM.S.A0000=1
MWOM.S.A0001=1
MWOM.S.C00.Rsp=0
MWOM.S.C01.Tx=0
"#;

fn config_with(args: &[&str], pics: &str) -> MatterTestConfig {
    MatterTestConfig::new(
        args.iter().map(|a| int_arg(a).unwrap()),
        parse_pics("test.pics", pics).unwrap(),
        vec!["TC_MWOM_2_1".into()],
    )
}

fn override_pics(code: &str, value: u8) -> String {
    format!("{CONFORMING_PICS}{code}={value}\n")
}

#[tokio::test]
async fn conforming_declarations_pass_without_touching_the_device() {
    let config = config_with(&["PIXIT_ENDPOINT:1"], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(1);

    let outcome = run_test(&TcMwom21, &config, &device).await;
    assert!(outcome.passed(), "{:?}", outcome.result);
    assert_eq!(outcome.remote_calls, 0);
    assert_eq!(device.reads() + device.invokes(), 0);
}

#[rstest]
#[case::supported_modes_absent("MWOM.S.A0000", 0, Expectation::Supported)]
#[case::current_mode_absent("MWOM.S.A0001", 0, Expectation::Supported)]
#[case::change_to_mode_present("MWOM.S.C00.Rsp", 1, Expectation::NotSupported)]
#[case::response_present("MWOM.S.C01.Tx", 1, Expectation::NotSupported)]
#[tokio::test]
async fn wrong_declaration_is_a_capability_mismatch(
    #[case] code: &str,
    #[case] value: u8,
    #[case] expected: Expectation,
) {
    let config = config_with(&["PIXIT_ENDPOINT:1"], &override_pics(code, value));
    let device = SimulatedDevice::microwave_oven(1);

    let outcome = run_test(&TcMwom21, &config, &device).await;
    match outcome.result {
        Err(ConformanceError::CapabilityMismatch {
            code: failed,
            expectation,
        }) => {
            assert_eq!(failed, code);
            assert_eq!(expectation, expected);
        }
        other => panic!("expected a capability mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn undeclared_mandatory_attribute_fails() {
    let config = config_with(&["PIXIT_ENDPOINT:1"], "MWOM.S.A0000=1\n");
    let device = SimulatedDevice::microwave_oven(1);

    let err = run_test(&TcMwom21, &config, &device)
        .await
        .result
        .unwrap_err();
    assert_eq!(err.to_string(), "MWOM.S.A0001 must be supported");
}

#[tokio::test]
async fn missing_endpoint_parameter_is_reported_by_name() {
    let config = config_with(&[], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(1);

    let err = run_test(&TcMwom21, &config, &device)
        .await
        .result
        .unwrap_err();
    assert!(matches!(
        err,
        ConformanceError::MissingParameter { ref name } if name == PIXIT_ENDPOINT
    ));
    assert!(err.to_string().contains("--int-arg PIXIT_ENDPOINT:<value>"));
}

#[tokio::test]
async fn hex_endpoint_parameter_is_accepted() {
    let config = config_with(&["PIXIT_ENDPOINT:0x1"], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(1);

    assert!(run_test(&TcMwom21, &config, &device).await.passed());
}

#[tokio::test]
async fn attribute_values_are_checked_on_the_configured_endpoint() {
    let config = config_with(&["PIXIT_ENDPOINT:3"], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(3);

    let outcome = run_test(&TcMwom12, &config, &device).await;
    assert!(outcome.passed(), "{:?}", outcome.result);
    assert_eq!(outcome.remote_calls, 2);
}

#[tokio::test]
async fn unreachable_device_is_a_transport_failure() {
    let config = config_with(&["PIXIT_ENDPOINT:1"], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(1);
    device.disconnect();

    let err = run_test(&TcMwom12, &config, &device)
        .await
        .result
        .unwrap_err();
    assert!(matches!(err, ConformanceError::TransportFailure { .. }), "{err:?}");
}

#[tokio::test]
async fn every_registered_case_runs_against_a_conforming_device() {
    let config = config_with(&["PIXIT_ENDPOINT:1"], CONFORMING_PICS);
    let device = SimulatedDevice::microwave_oven(1);

    for test in cases::all() {
        let outcome = run_test(test.as_ref(), &config, &device).await;
        assert!(outcome.passed(), "{}: {:?}", outcome.name, outcome.result);
    }
}
