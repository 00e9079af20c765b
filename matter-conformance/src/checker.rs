//! [`ConformanceChecker`]: the assertions a conformance test case is built
//! from.
//!
//! Every method either succeeds or returns the [`ConformanceError`] that ends
//! the test case. Nothing is retried and failures are never aggregated: the
//! first failing step is the result of the run.

use std::sync::atomic::{AtomicUsize, Ordering};

use matter_data_model::{
    AttributeDescriptor, CommandRequest, CommandResponse, EndpointId, InvokeResponse,
    ResponseSchema, Value,
};
use matter_pics_parser::{ArgKind, TestParamValue, TestParameters};
use tracing::{debug, info, instrument, warn};

use crate::capability::CapabilitySource;
use crate::config::MatterTestConfig;
use crate::controller::DeviceController;
use crate::error::{ConformanceError, Expectation};

pub struct ConformanceChecker<'a> {
    params: &'a TestParameters,
    capabilities: &'a dyn CapabilitySource,
    controller: &'a dyn DeviceController,
    remote_calls: AtomicUsize,
}

impl<'a> ConformanceChecker<'a> {
    pub fn new(config: &'a MatterTestConfig, controller: &'a dyn DeviceController) -> Self {
        Self::from_parts(&config.global_test_params, &config.pics, controller)
    }

    pub fn from_parts(
        params: &'a TestParameters,
        capabilities: &'a dyn CapabilitySource,
        controller: &'a dyn DeviceController,
    ) -> Self {
        Self {
            params,
            capabilities,
            controller,
            remote_calls: AtomicUsize::new(0),
        }
    }

    /// Number of reads and invokes issued through this checker so far.
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn require_parameter(&self, name: &str) -> Result<&'a TestParamValue, ConformanceError> {
        self.params.get(name).ok_or_else(|| {
            warn!(name, "required test parameter is missing");
            ConformanceError::MissingParameter {
                name: name.to_string(),
            }
        })
    }

    pub fn require_int_parameter(&self, name: &str) -> Result<i64, ConformanceError> {
        let value = self.require_parameter(name)?;
        value
            .as_int()
            .ok_or_else(|| ConformanceError::WrongParameterType {
                name: name.to_string(),
                expected: ArgKind::Int,
                found: value.kind(),
            })
    }

    /// Resolves an integer parameter naming the endpoint the run targets.
    pub fn require_endpoint(&self, name: &str) -> Result<EndpointId, ConformanceError> {
        let raw = self.require_int_parameter(name)?;
        let endpoint = u16::try_from(raw)
            .ok()
            .and_then(EndpointId::new)
            .ok_or_else(|| ConformanceError::InvalidParameter {
                name: name.to_string(),
                value: raw.to_string(),
                reason: "endpoint ids range from 0 to 65534",
            })?;
        info!(%endpoint, "resolved endpoint under test");
        Ok(endpoint)
    }

    pub fn require_capability(&self, code: &str) -> Result<(), ConformanceError> {
        self.check_capability(code, Expectation::Supported)
    }

    pub fn forbid_capability(&self, code: &str) -> Result<(), ConformanceError> {
        self.check_capability(code, Expectation::NotSupported)
    }

    fn check_capability(&self, code: &str, expectation: Expectation) -> Result<(), ConformanceError> {
        let declared = self.capabilities.has(code);
        let holds = match expectation {
            Expectation::Supported => declared,
            Expectation::NotSupported => !declared,
        };
        if holds {
            debug!(code, declared, "capability check passed");
            Ok(())
        } else {
            warn!(code, declared, %expectation, "capability check failed");
            Err(ConformanceError::CapabilityMismatch {
                code: code.to_string(),
                expectation,
            })
        }
    }

    #[instrument(skip(self, attribute), fields(attribute = %attribute))]
    pub async fn read_attribute(
        &self,
        endpoint: EndpointId,
        attribute: AttributeDescriptor,
    ) -> Result<Value, ConformanceError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        let value = self
            .controller
            .read_attribute(endpoint, attribute.cluster, attribute.attribute)
            .await
            .map_err(|source| ConformanceError::TransportFailure {
                operation: format!("reading {} on endpoint {endpoint}", attribute.name),
                source,
            })?;
        debug!(?value, "attribute read");
        Ok(value)
    }

    /// Invokes `request` and requires the answer to match `expected`.
    #[instrument(skip(self, request, expected), fields(command = expected.name))]
    pub async fn invoke_command(
        &self,
        endpoint: EndpointId,
        request: CommandRequest,
        expected: &ResponseSchema,
    ) -> Result<CommandResponse, ConformanceError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .controller
            .invoke(endpoint, request)
            .await
            .map_err(|source| ConformanceError::TransportFailure {
                operation: format!("invoking {} on endpoint {endpoint}", expected.name),
                source,
            })?;

        let shape = expected.check(&response);
        if !shape.matches {
            warn!(diagnostic = %shape.diagnostic, "unexpected response shape");
            return Err(ConformanceError::ShapeMismatch {
                command: expected.name,
                diagnostic: shape.diagnostic,
            });
        }
        match response {
            InvokeResponse::Command(response) => Ok(response),
            // a status answer never matches a data response schema
            InvokeResponse::Status(status) => Err(ConformanceError::ShapeMismatch {
                command: expected.name,
                diagnostic: format!("device answered with {status}"),
            }),
        }
    }
}
