use std::fmt;

use matter_pics_parser::ArgKind;
use miette::Diagnostic;
use thiserror::Error;

use crate::controller::TransportError;

/// Whether a capability flag had to be declared present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Supported,
    NotSupported,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Supported => f.write_str("must be supported"),
            Expectation::NotSupported => f.write_str("must NOT be supported"),
        }
    }
}

/// A failed conformance step. Every variant ends the test case it came from.
#[derive(Debug, Error, Diagnostic)]
pub enum ConformanceError {
    #[error("{name} must be included on the command line, e.g. --int-arg {name}:<value>")]
    #[diagnostic(code(conformance::missing_parameter))]
    MissingParameter { name: String },

    #[error("{name} must be a {expected} argument, got a {found} argument")]
    #[diagnostic(code(conformance::parameter_type))]
    WrongParameterType {
        name: String,
        expected: ArgKind,
        found: ArgKind,
    },

    #[error("{name}={value} is not usable: {reason}")]
    #[diagnostic(code(conformance::invalid_parameter))]
    InvalidParameter {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("{code} {expectation}")]
    #[diagnostic(
        code(conformance::capability_mismatch),
        help("check the PICS file given with --PICS against the device under test")
    )]
    CapabilityMismatch {
        code: String,
        expectation: Expectation,
    },

    #[error("{operation} failed: {source}")]
    #[diagnostic(code(conformance::transport))]
    TransportFailure {
        operation: String,
        #[source]
        source: TransportError,
    },

    #[error("Unexpected return type for {command}: {diagnostic}")]
    #[diagnostic(code(conformance::shape_mismatch))]
    ShapeMismatch {
        command: &'static str,
        diagnostic: String,
    },

    #[error("{requirement}: {message}")]
    #[diagnostic(code(conformance::assertion))]
    AssertionFailed {
        requirement: String,
        message: String,
    },
}

impl ConformanceError {
    pub(crate) fn assertion(requirement: impl Into<String>, message: impl Into<String>) -> Self {
        ConformanceError::AssertionFailed {
            requirement: requirement.into(),
            message: message.into(),
        }
    }
}
