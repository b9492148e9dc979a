//! Test cases, scenarios and their reports
//!
//! A [`TestCase`] is immutable fixture data. Each phase derives the maps it
//! needs from it, so one case can be run any number of times.

use crate::exit_code::{AcceptableExitCodes, DetailedExitCode};
use probity_expect::ExpectationResult;
use probity_identity::IdentitySchema;
use probity_manifest::{EnsureState, PropertyMap, ENSURE};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Phase of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Resource declared present and verified
    Present,
    /// Resource declared absent and verified gone
    Absent,
}

impl Phase {
    /// Ensure state declared in this phase
    #[inline]
    #[must_use]
    pub fn ensure(self) -> EnsureState {
        match self {
            Self::Present => EnsureState::Present,
            Self::Absent => EnsureState::Absent,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.ensure().as_str())
    }
}

/// One title-pattern test case
#[derive(Debug, Clone)]
pub struct TestCase {
    desc: String,
    schema: IdentitySchema,
    title: String,
    identity_props: PropertyMap,
    manifest_props: PropertyMap,
    resource_props: PropertyMap,
}

impl TestCase {
    /// Start building a case
    #[must_use]
    pub fn builder(desc: impl Into<String>, schema: IdentitySchema) -> TestCaseBuilder {
        TestCaseBuilder {
            desc: desc.into(),
            schema,
            title: None,
            identity_props: PropertyMap::new(),
            manifest_props: PropertyMap::new(),
            resource_props: None,
        }
    }

    /// Description used in logs and reports
    #[inline]
    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Identity schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &IdentitySchema {
        &self.schema
    }

    /// Title as written in the fixture
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Identity fields supplied as properties
    #[inline]
    #[must_use]
    pub fn identity_props(&self) -> &PropertyMap {
        &self.identity_props
    }

    /// Non-identity properties declared in the manifest
    #[inline]
    #[must_use]
    pub fn manifest_props(&self) -> &PropertyMap {
        &self.manifest_props
    }

    /// Properties the present phase expects to see
    #[inline]
    #[must_use]
    pub fn resource_props(&self) -> &PropertyMap {
        &self.resource_props
    }

    /// Properties rendered into the present-phase manifest
    #[must_use]
    pub fn declared_props(&self) -> PropertyMap {
        self.identity_props.merged(&self.manifest_props)
    }

    /// Expectation checked for presence in the given phase
    #[must_use]
    pub fn presence_expectation(&self, phase: Phase) -> PropertyMap {
        match phase {
            Phase::Present => self.resource_props.clone(),
            Phase::Absent => PropertyMap::builder().ensure(EnsureState::Absent).build(),
        }
    }

    /// Expectation checked for absence in the given phase
    #[must_use]
    pub fn absence_expectation(&self, phase: Phase) -> Option<PropertyMap> {
        match phase {
            Phase::Present => None,
            Phase::Absent => Some(self.resource_props.clone()),
        }
    }
}

/// Builder for [`TestCase`]
#[derive(Debug)]
pub struct TestCaseBuilder {
    desc: String,
    schema: IdentitySchema,
    title: Option<String>,
    identity_props: PropertyMap,
    manifest_props: PropertyMap,
    resource_props: Option<PropertyMap>,
}

impl TestCaseBuilder {
    /// Manifest title; defaults to the description
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Identity fields supplied as properties
    #[must_use]
    pub fn identity(mut self, props: PropertyMap) -> Self {
        self.identity_props = props;
        self
    }

    /// Additional manifest properties
    #[must_use]
    pub fn manifest(mut self, props: PropertyMap) -> Self {
        self.manifest_props = props;
        self
    }

    /// Expected introspection properties; defaults to `ensure => present`
    #[must_use]
    pub fn expect(mut self, props: PropertyMap) -> Self {
        self.resource_props = Some(props);
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> TestCase {
        let title = self.title.unwrap_or_else(|| self.desc.clone());
        let resource_props = self
            .resource_props
            .unwrap_or_else(|| PropertyMap::builder().set(ENSURE, "present").build());
        TestCase {
            desc: self.desc,
            schema: self.schema,
            title,
            identity_props: self.identity_props,
            manifest_props: self.manifest_props,
            resource_props,
        }
    }
}

/// Named, ordered group of cases
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Registry identifier
    pub id: String,
    /// Human-readable header
    pub description: String,
    /// Cases in run order
    pub cases: Vec<TestCase>,
}

impl Scenario {
    /// Create scenario
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            cases,
        }
    }
}

/// What a step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Agent run with its exit code
    Apply {
        /// Code returned
        exit_code: DetailedExitCode,
        /// Codes that were acceptable
        acceptable: AcceptableExitCodes,
    },
    /// Introspection check
    Verify {
        /// Matcher outcome
        result: ExpectationResult,
    },
}

/// One executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Step label
    pub name: String,
    /// Phase the step belongs to; `None` for scenario setup
    pub phase: Option<Phase>,
    /// What happened
    #[serde(flatten)]
    pub kind: StepKind,
}

impl StepOutcome {
    /// Whether the step succeeded
    #[must_use]
    pub fn passed(&self) -> bool {
        match &self.kind {
            StepKind::Apply { exit_code, acceptable } => acceptable.accepts(*exit_code),
            StepKind::Verify { result } => result.passed(),
        }
    }
}

impl Display for StepOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        match &self.kind {
            StepKind::Apply { exit_code, acceptable } => write!(
                f,
                "{} :: {} :: exit {} (acceptable {:?})",
                status,
                self.name,
                exit_code,
                acceptable.codes()
            ),
            StepKind::Verify { result } => write!(f, "{} :: {} :: {}", status, self.name, result.summary()),
        }
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Case description
    pub desc: String,
    /// Fully-qualified identity, when it could be composed
    pub identity: Option<String>,
    /// Steps in execution order
    pub steps: Vec<StepOutcome>,
    /// Abort reason
    pub error: Option<String>,
}

impl CaseReport {
    /// Empty report for a case
    #[must_use]
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            identity: None,
            steps: Vec::new(),
            error: None,
        }
    }

    /// No abort and every step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.steps.iter().all(StepOutcome::passed)
    }
}

impl Display for CaseReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        write!(f, "TestCase :: {} :: {}", self.desc, status)?;
        if let Some(identity) = &self.identity {
            write!(f, " [{identity}]")?;
        }
        for step in &self.steps {
            write!(f, "\n  {step}")?;
        }
        if let Some(error) = &self.error {
            write!(f, "\n  ABORTED :: {error}")?;
        }
        Ok(())
    }
}

/// Outcome of a scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario identifier
    pub id: String,
    /// Setup run, if one was needed
    pub setup: Option<StepOutcome>,
    /// One report per case that ran
    pub cases: Vec<CaseReport>,
    /// Why the scenario stopped before its cases, if it did
    pub error: Option<String>,
}

impl ScenarioReport {
    /// Empty report for a scenario
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            setup: None,
            cases: Vec::new(),
            error: None,
        }
    }

    /// Setup accepted and every case passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self.setup.as_ref().map_or(true, StepOutcome::passed)
            && self.cases.iter().all(CaseReport::passed)
    }

    /// Number of failing cases
    #[must_use]
    pub fn failed_cases(&self) -> usize {
        self.cases.iter().filter(|c| !c.passed()).count()
    }
}

impl Display for ScenarioReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario :: {}", self.id)?;
        if let Some(setup) = &self.setup {
            writeln!(f, "  {setup}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  ABORTED :: {error}")?;
        }
        for case in &self.cases {
            writeln!(f, "{case}")?;
        }
        let status = if self.passed() { "PASS" } else { "FAIL" };
        write!(
            f,
            "Scenario :: {} :: {} ({} of {} cases failed)",
            self.id,
            status,
            self.failed_cases(),
            self.cases.len()
        )
    }
}
