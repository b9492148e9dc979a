//! Present/absent orchestration
//!
//! Each case runs strictly in sequence:
//!
//! ```text
//! compose -> render -> install -> apply -> exit code -> describe -> match
//! ```
//!
//! first with `ensure => present`, then with `ensure => absent`. An
//! unacceptable exit code ends the case; an expectation mismatch is recorded
//! and the case continues so the absent phase still cleans up.
//!
//! Positional titles reach the agent fully qualified, so the title pattern
//! itself is exercised by composition here rather than by the agent's own
//! title parsing. Only opaque names are submitted as written.

use crate::case::{CaseReport, Phase, Scenario, ScenarioReport, StepKind, StepOutcome, TestCase};
use crate::config::HarnessConfig;
use crate::driver::{DescribeRequest, Driver, ManifestUpload};
use crate::error::HarnessError;
use crate::exit_code::AcceptableExitCodes;
use probity_expect::{ExpectationMatcher, ExpectationResult};
use probity_identity::ResourceIdentity;
use probity_manifest::{wrap_node, EnsureState, ManifestRenderer, PropertyMap, ShellCommand};

/// Runs test cases against a [`Driver`]
#[derive(Debug)]
pub struct Harness<D> {
    config: HarnessConfig,
    driver: D,
    renderer: ManifestRenderer,
    matcher: ExpectationMatcher,
}

impl<D: Driver> Harness<D> {
    /// Create harness
    #[must_use]
    pub fn new(config: HarnessConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            renderer: ManifestRenderer::new(),
            matcher: ExpectationMatcher::new(),
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Underlying driver
    #[inline]
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Consume the harness, returning the driver
    #[inline]
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Run setup then every case of a scenario
    ///
    /// Setup declares absent every identity the scenario touches. A rejected
    /// setup run stops the scenario; case failures do not.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> ScenarioReport {
        tracing::info!("TestCase :: {} :: Start", scenario.description);
        let mut report = ScenarioReport::new(&scenario.id);

        match self.setup(scenario) {
            Ok(Some(step)) => {
                let accepted = step.passed();
                tracing::info!("TestStep :: {}", step);
                report.setup = Some(step);
                if !accepted {
                    tracing::warn!("setup for '{}' rejected; skipping cases", scenario.id);
                    return report;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("setup for '{}' failed: {}", scenario.id, e);
                report.error = Some(e.to_string());
                return report;
            }
        }

        for case in &scenario.cases {
            report.cases.push(self.run_case(case));
        }

        tracing::info!("TestCase :: {} :: End", scenario.description);
        report
    }

    /// Run one case through both phases
    ///
    /// Identity and driver errors abort the case; they are recorded in the
    /// report rather than returned.
    pub fn run_case(&mut self, case: &TestCase) -> CaseReport {
        let mut report = CaseReport::new(case.desc());
        if let Err(e) = self.try_run_case(case, &mut report) {
            tracing::warn!("TestCase :: {} :: aborted: {}", case.desc(), e);
            report.error = Some(e.to_string());
        }
        tracing::info!("TestCase :: {} :: {}", case.desc(), if report.passed() { "PASS" } else { "FAIL" });
        report
    }

    fn try_run_case(&mut self, case: &TestCase, report: &mut CaseReport) -> Result<(), HarnessError> {
        let identity = ResourceIdentity::compose(case.schema(), case.title(), case.identity_props())?;
        tracing::info!("TestCase :: {} :: {}", case.desc(), identity);
        report.identity = Some(identity.to_string());

        for phase in [Phase::Present, Phase::Absent] {
            if !self.run_phase(case, &identity, phase, report)? {
                break;
            }
        }
        Ok(())
    }

    /// Returns whether the case may continue
    fn run_phase(
        &mut self,
        case: &TestCase,
        identity: &ResourceIdentity,
        phase: Phase,
        report: &mut CaseReport,
    ) -> Result<bool, HarnessError> {
        let body = match phase {
            Phase::Present => self.renderer.render(identity, EnsureState::Present, &case.declared_props()),
            Phase::Absent => self.renderer.render_block(
                identity.resource_type(),
                &identity.render(),
                EnsureState::Absent,
                &PropertyMap::new(),
            ),
        };

        let acceptable = self.config.acceptable_exit_codes.apply.clone();
        let apply = self.apply(format!("apply ensure => {phase}"), Some(phase), &body, acceptable)?;
        let accepted = apply.passed();
        log_step(&apply);
        report.steps.push(apply);
        if !accepted {
            return Ok(false);
        }

        let request =
            DescribeRequest::for_identity(&self.config.puppet_binpath, identity, self.config.namespace.as_deref());
        let output = self.driver.describe(&request)?;
        tracing::debug!("{}:\n{}", request.command, output);

        let present = self.matcher.matches(&output, &case.presence_expectation(phase), true);
        record_verify(format!("verify ensure => {phase}"), phase, present, report);

        if let Some(expected) = case.absence_expectation(phase) {
            let absent = self.matcher.matches(&output, &expected, false);
            record_verify("verify properties removed".to_string(), phase, absent, report);
        }
        Ok(true)
    }

    fn setup(&mut self, scenario: &Scenario) -> Result<Option<StepOutcome>, HarnessError> {
        let mut titles: Vec<(String, String)> = Vec::new();
        for case in &scenario.cases {
            // Cases that cannot compose report that themselves.
            if let Ok(identity) = ResourceIdentity::compose(case.schema(), case.title(), case.identity_props()) {
                let key = (identity.resource_type().to_string(), identity.render());
                if !titles.contains(&key) {
                    titles.push(key);
                }
            }
        }
        if titles.is_empty() {
            return Ok(None);
        }

        let body: String = titles
            .iter()
            .map(|(ty, title)| self.renderer.render_block(ty, title, EnsureState::Absent, &PropertyMap::new()))
            .collect();
        let acceptable = self.config.acceptable_exit_codes.setup.clone();
        let step = self.apply(format!("setup {} resource(s) absent", titles.len()), None, &body, acceptable)?;
        Ok(Some(step))
    }

    fn apply(
        &mut self,
        name: String,
        phase: Option<Phase>,
        body: &str,
        acceptable: AcceptableExitCodes,
    ) -> Result<StepOutcome, HarnessError> {
        let upload = ManifestUpload::new(&self.config.manifest_path, wrap_node(&self.config.node, body));
        self.driver.install_manifest(&upload)?;

        let command =
            ShellCommand::puppet_agent(&self.config.puppet_binpath).in_namespace(self.config.namespace.as_deref());
        let exit_code = self.driver.apply(&command)?;
        Ok(StepOutcome {
            name,
            phase,
            kind: StepKind::Apply { exit_code, acceptable },
        })
    }
}

fn record_verify(name: String, phase: Phase, result: ExpectationResult, report: &mut CaseReport) {
    let step = StepOutcome {
        name,
        phase: Some(phase),
        kind: StepKind::Verify { result },
    };
    log_step(&step);
    report.steps.push(step);
}

fn log_step(step: &StepOutcome) {
    if step.passed() {
        tracing::info!("TestStep :: {}", step);
    } else {
        tracing::warn!("TestStep :: {}", step);
    }
}
