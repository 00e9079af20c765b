//! Conformance checks for Matter Microwave Oven Mode servers.
//!
//! A test case pulls its parameters and capability flags from a
//! [`MatterTestConfig`] through a [`ConformanceChecker`], and talks to the
//! device under test through a [`DeviceController`].

pub mod capability;
pub mod cases;
pub mod checker;
pub mod config;
pub mod controller;
pub mod error;
pub mod runner;
pub mod simulated;

pub use capability::CapabilitySource;
pub use cases::ConformanceTest;
pub use checker::ConformanceChecker;
pub use config::{load_pics, ConfigError, MatterTestConfig};
pub use controller::{DeviceController, TransportError};
pub use error::{ConformanceError, Expectation};
pub use runner::{run_test, TestOutcome};
pub use simulated::SimulatedDevice;
