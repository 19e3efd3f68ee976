use super::assertions::{Assertion, ErrorKind};
use super::clock::MockClock;
use super::cluster::{FakeCluster, RolloutTiming};
use super::resources::{Deployment, NAMESPACE};
use super::steps::{PollStep, ScenarioStep};
use anyhow::{anyhow, bail, Context, Result};
use jpmatch_core::{match_subject, Eventually, MatchError, Matcher, PollReport};
use std::sync::Arc;
use std::time::Duration;

/// What the last `Eventually` step produced
struct PollOutcome {
    result: std::result::Result<PollReport, MatchError>,
    fetches: u32,
}

/// Executes scenarios against a fake cluster driven by mock time
pub struct ScenarioRunner {
    cluster: FakeCluster,
    clock: MockClock,
    timeout: Duration,
    interval: Duration,
    current_step: usize,
    last_poll: Option<PollOutcome>,
}

impl ScenarioRunner {
    /// Create a new runner
    pub fn new(timing: RolloutTiming, timeout: Duration, interval: Duration) -> Result<Self> {
        let clock = MockClock::new();
        let cluster = FakeCluster::new(clock.clone(), timing)?;

        Ok(Self {
            cluster,
            clock,
            timeout,
            interval,
            current_step: 0,
            last_poll: None,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::CreateDeployment { deployment } => self.handle_create(deployment),
            ScenarioStep::ScaleDeployment { name, replicas } => self.handle_scale(name, *replicas),
            ScenarioStep::DeleteDeployment { name } => self.handle_delete(name),

            ScenarioStep::Wait { duration } => self.handle_wait(*duration),

            ScenarioStep::Eventually(poll) => self.handle_eventually(poll),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Cluster action handlers =====

    fn handle_create(&mut self, deployment: &Deployment) -> Result<()> {
        self.cluster.create(deployment)
    }

    fn handle_scale(&mut self, name: &str, replicas: i32) -> Result<()> {
        self.cluster.scale(NAMESPACE, name, replicas)
    }

    fn handle_delete(&mut self, name: &str) -> Result<()> {
        self.cluster.delete(NAMESPACE, name)
    }

    // ===== Time control =====

    fn handle_wait(&mut self, duration: Duration) -> Result<()> {
        self.clock.advance(duration);
        Ok(())
    }

    // ===== Polling =====

    fn handle_eventually(&mut self, poll: &PollStep) -> Result<()> {
        let before = self.cluster.get_count();
        let cluster = &self.cluster;

        let result = Eventually::new(|| cluster.get(NAMESPACE, &poll.name))
            .within(poll.timeout.unwrap_or(self.timeout))
            .polling_every(self.interval)
            .with_clock(Arc::new(self.clock.clone()))
            .should(&poll.matcher);

        let fetches = self.cluster.get_count() - before;
        self.last_poll = Some(PollOutcome { result, fetches });
        Ok(())
    }

    fn last_poll(&self) -> Result<&PollOutcome> {
        self.last_poll
            .as_ref()
            .ok_or_else(|| anyhow!("No Eventually step has run yet"))
    }

    // ===== Assertions =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::PollPassed => {
                if let Err(e) = &self.last_poll()?.result {
                    bail!("Expected poll to pass, got: {}", e);
                }
            }
            Assertion::PollTimedOut => {
                self.expect_error_kind(ErrorKind::Timeout)?;
            }
            Assertion::PollFailedWith(kind) => {
                self.expect_error_kind(*kind)?;
            }
            Assertion::PollAttempts(expected) => {
                let attempts = match &self.last_poll()?.result {
                    Ok(report) => report.attempts,
                    Err(MatchError::Timeout { attempts, .. }) => *attempts,
                    Err(e) => bail!("Poll aborted without an attempt count: {}", e),
                };
                if attempts != *expected {
                    bail!("Expected {} attempts, got {}", expected, attempts);
                }
            }
            Assertion::PollElapsedAtLeast(min) => {
                let elapsed = match &self.last_poll()?.result {
                    Ok(report) => report.elapsed,
                    Err(MatchError::Timeout { elapsed_ms, .. }) => {
                        Duration::from_millis(*elapsed_ms)
                    }
                    Err(e) => bail!("Poll aborted without an elapsed time: {}", e),
                };
                if elapsed < *min {
                    bail!("Expected poll to take at least {:?}, took {:?}", min, elapsed);
                }
            }
            Assertion::FailureContains(text) => {
                let failure = match &self.last_poll()?.result {
                    Ok(_) => bail!("Poll passed, there is no failure to inspect"),
                    Err(MatchError::Timeout { last_failure, .. }) => last_failure.clone(),
                    Err(e) => e.to_string(),
                };
                if !failure.contains(text.as_str()) {
                    bail!("Failure does not contain {:?}:\n{}", text, failure);
                }
            }
            Assertion::PassMessageContains(text) => {
                let message = match &self.last_poll()?.result {
                    Ok(report) => &report.message,
                    Err(e) => bail!("Expected poll to pass, got: {}", e),
                };
                if !message.contains(text.as_str()) {
                    bail!("Pass message does not contain {:?}:\n{}", text, message);
                }
            }
            Assertion::FetchCount(expected) => {
                let fetches = self.last_poll()?.fetches;
                if fetches != *expected {
                    bail!("Expected {} fetches, got {}", expected, fetches);
                }
            }
            Assertion::DeploymentExists(name) => {
                if !self.cluster.exists(NAMESPACE, name) {
                    bail!("Deployment {} does not exist", name);
                }
            }
            Assertion::NoDeployment(name) => {
                if self.cluster.exists(NAMESPACE, name) {
                    bail!("Deployment {} still exists", name);
                }
            }
            Assertion::Matches { name, matcher } => {
                let verdict = self.match_now(name, matcher.as_ref())?;
                if !verdict.success {
                    bail!("Expected a match:\n{}", verdict.message);
                }
            }
            Assertion::DoesNotMatch { name, matcher } => {
                let verdict = self.match_now(name, matcher.as_ref())?;
                if verdict.success {
                    bail!("Expected no match:\n{}", verdict.message);
                }
            }
            Assertion::Custom(check) => check(&self.cluster)?,
        }
        Ok(())
    }

    fn expect_error_kind(&self, expected: ErrorKind) -> Result<()> {
        match &self.last_poll()?.result {
            Ok(report) => bail!(
                "Expected {:?}, but poll passed after {} attempts",
                expected,
                report.attempts
            ),
            Err(e) if ErrorKind::of(e) == Some(expected) => Ok(()),
            Err(e) => bail!("Expected {:?}, got: {}", expected, e),
        }
    }

    fn match_now(&self, name: &str, matcher: &dyn Matcher) -> Result<jpmatch_core::Verdict> {
        let deployment = self.cluster.get(NAMESPACE, name)?;
        match_subject(&deployment, matcher).context("Matcher could not be evaluated")
    }
}
