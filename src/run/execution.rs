//! Orchestration of one bridged invocation

use crate::descriptor::{self, Descriptor, Resolution};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::parser;
use crate::report;
use crate::result::TestResult;
use crate::run::params::RunParams;
use crate::run::process::ProcessRunner;
use crate::run::sandbox::Sandbox;
use std::fmt;
use std::path::Path;

/// Stage of a bridged invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Extracting,
    Running,
    Parsing,
    Reporting,
    CleaningUp,
    Done,
    Faulted,
}

impl Phase {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (_, CleaningUp) => !matches!(self, CleaningUp | Done),
            (Idle, Resolving)
            | (Resolving, Extracting)
            | (Extracting, Running)
            | (Running, Parsing)
            | (Parsing, Reporting)
            | (CleaningUp, Done) => true,
            (Resolving | Extracting | Running, Faulted) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the phase of the current invocation
struct Lifecycle {
    phase: Phase,
}

impl Lifecycle {
    fn new() -> Self {
        Lifecycle { phase: Phase::Idle }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "bridge phase");
        self.phase = next;
    }

    fn fault(&mut self, error: Error) -> Error {
        tracing::debug!(phase = %self.phase, error = %error, "bridge faulted");
        self.advance(Phase::Faulted);
        error
    }
}

/// Run the external test described by `descriptors` - main implementation
///
/// `test` names the calling test in errors and logs.
pub fn run_bridge_impl(
    test: &str,
    descriptors: &[Descriptor],
    params: &RunParams,
) -> Result<TestResult> {
    let span = tracing::debug_span!("bridge", test);
    let _enter = span.enter();
    let mut lifecycle = Lifecycle::new();

    lifecycle.advance(Phase::Resolving);
    let resolution = match descriptor::resolve(test, descriptors) {
        Ok(resolution) => resolution,
        Err(e) => {
            let e = lifecycle.fault(e);
            lifecycle.advance(Phase::CleaningUp);
            return Err(e);
        }
    };

    lifecycle.advance(Phase::Extracting);
    let mut sandbox = match Sandbox::create(
        params.config.sandbox_root.as_deref(),
        params.config.retain_sandbox(),
    ) {
        Ok(sandbox) => sandbox,
        Err(e) => {
            let e = lifecycle.fault(e);
            lifecycle.advance(Phase::CleaningUp);
            return Err(e);
        }
    };

    let outcome = execute_in_sandbox(&mut sandbox, &resolution, params, &mut lifecycle);
    let outcome = match outcome {
        Ok(result) => Ok(result),
        Err(e) => Err(lifecycle.fault(e)),
    };

    lifecycle.advance(Phase::CleaningUp);
    if let Err(e) = sandbox.cleanup() {
        tracing::warn!(error = %e, "sandbox cleanup failed");
    }
    let result = outcome?;
    lifecycle.advance(Phase::Done);

    if let Some(assert) = &params.assert {
        let message = if result.success() {
            String::new()
        } else {
            report::failure_message(&resolution.test, &result, &params.config)
        };
        assert(result.success(), &message);
    }

    Ok(result)
}

/// Extract, run, parse and report inside an existing sandbox
fn execute_in_sandbox(
    sandbox: &mut Sandbox,
    resolution: &Resolution,
    params: &RunParams,
    lifecycle: &mut Lifecycle,
) -> Result<TestResult> {
    let test = &resolution.test;
    let root = sandbox.base_path.clone();
    let store = &*params.store;

    let script_name = script_file_name(test.script_locator())?;
    let script_path = extract(
        store,
        test.origin().or(params.default_origin.as_deref()),
        test.script_locator(),
        &root.join(script_name),
        &root,
    )?;
    sandbox.track(script_path.clone());

    for support in &resolution.supports {
        let written = extract(
            store,
            support.origin().or(params.default_origin.as_deref()),
            support.source_locator(),
            &root.join(support.target_relative_path()),
            &root,
        )?;
        sandbox.track(written);
    }
    tracing::debug!(files = sandbox.tracked_files().len(), "sandbox populated");

    lifecycle.advance(Phase::Running);
    let runner = ProcessRunner::from_config(&params.config);
    let output = runner.run(
        &script_path,
        test.test_method_name(),
        test.variant(),
        &root,
        params.config.suppress_display(),
    )?;

    lifecycle.advance(Phase::Parsing);
    let result = parser::parse(&output.stdout);
    tracing::info!(
        test = test.test_method_name(),
        success = result.success(),
        summary = %result,
        "bridged test finished"
    );

    lifecycle.advance(Phase::Reporting);
    if let Err(e) = report::report(test, &result, &params.config) {
        tracing::warn!(error = %e, "cannot write test summary");
    }

    Ok(result)
}

/// Last path segment of a script locator
fn script_file_name(locator: &str) -> Result<&str> {
    locator
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && Path::new(name).file_name().is_some())
        .ok_or_else(|| Error::extraction(locator, "locator does not name a file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use Phase::*;
        let happy = [Idle, Resolving, Extracting, Running, Parsing, Reporting, CleaningUp, Done];
        for pair in happy.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }

        for from in [Resolving, Extracting, Running] {
            assert!(from.can_advance_to(Faulted));
        }
        assert!(!Parsing.can_advance_to(Faulted));
        assert!(!Idle.can_advance_to(Running));
        assert!(!Done.can_advance_to(CleaningUp));

        for from in [Idle, Resolving, Extracting, Running, Parsing, Reporting, Faulted] {
            assert!(from.can_advance_to(CleaningUp));
        }
    }

    #[test]
    fn test_script_file_name() {
        assert_eq!(script_file_name("tests/math.js").unwrap(), "math.js");
        assert_eq!(script_file_name("tests\\ui\\render.js").unwrap(), "render.js");
        assert_eq!(script_file_name("math.js").unwrap(), "math.js");
        assert!(script_file_name("tests/").is_err());
        assert!(script_file_name("tests/..").is_err());
    }
}
