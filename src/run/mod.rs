//! Bridged test execution module

pub mod execution;
pub mod params;
pub mod process;
pub mod sandbox;

// Re-export public types
pub use execution::Phase;
pub use params::{AssertFn, RunParams};
pub use process::{ProcessOutput, ProcessRunner};
pub use sandbox::Sandbox;

use crate::descriptor::{Descriptor, Registry};
use crate::error::Result;
use crate::result::TestResult;

/// Run the external test attached to `test` in a registry
pub fn run_registered(registry: &Registry, test: &str, params: &RunParams) -> Result<TestResult> {
    run_bridge(test, registry.descriptors(test), params)
}

/// Run the external test described by `descriptors`
pub fn run_bridge(
    test: &str,
    descriptors: &[Descriptor],
    params: &RunParams,
) -> Result<TestResult> {
    execution::run_bridge_impl(test, descriptors, params)
}
