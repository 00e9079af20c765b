//! Conformance test cases for the Microwave Oven Mode cluster.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::checker::ConformanceChecker;
use crate::error::ConformanceError;

mod steps;
mod tc_mwom_1_2;
mod tc_mwom_2_1;

pub use steps::MicrowaveOvenModeSteps;
pub use tc_mwom_1_2::TcMwom12;
pub use tc_mwom_2_1::TcMwom21;

/// Integer test parameter holding the endpoint to test.
pub const PIXIT_ENDPOINT: &str = "PIXIT_ENDPOINT";

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
#[error("unknown test case `{0}`")]
#[diagnostic(code(conformance::unknown_test), help("known test cases: TC_MWOM_1_2, TC_MWOM_2_1"))]
pub struct UnknownTestCase(pub String);

#[async_trait]
pub trait ConformanceTest: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn run(&self, checker: &ConformanceChecker<'_>) -> Result<(), ConformanceError>;
}

pub fn all() -> Vec<Box<dyn ConformanceTest>> {
    vec![Box::new(TcMwom12), Box::new(TcMwom21)]
}

/// Looks a test case up by name. The `test_` prefix used by harness method
/// names is accepted too.
pub fn find(name: &str) -> Option<Box<dyn ConformanceTest>> {
    let name = name.strip_prefix("test_").unwrap_or(name);
    all().into_iter().find(|t| t.name() == name)
}

/// Resolves every name in `names`, keeping their order.
pub fn select(names: &[String]) -> Result<Vec<Box<dyn ConformanceTest>>, UnknownTestCase> {
    names
        .iter()
        .map(|name| find(name).ok_or_else(|| UnknownTestCase(name.clone())))
        .collect()
}
