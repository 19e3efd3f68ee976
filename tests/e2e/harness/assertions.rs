use anyhow::Result;
use jpmatch_core::{MatchError, Matcher};
use std::time::Duration;

use super::cluster::FakeCluster;

/// Declarative assertions on the last poll and the cluster
pub enum Assertion {
    // Last poll outcome
    PollPassed,
    PollTimedOut,
    PollFailedWith(ErrorKind),
    PollAttempts(u32),
    PollElapsedAtLeast(Duration),
    FailureContains(String),
    PassMessageContains(String),

    // Fetches served during the last poll
    FetchCount(u32),

    // Cluster state
    DeploymentExists(String),
    NoDeployment(String),

    // One-shot match against the current object, no polling
    Matches {
        name: String,
        matcher: Box<dyn Matcher>,
    },
    DoesNotMatch {
        name: String,
        matcher: Box<dyn Matcher>,
    },

    // Custom
    Custom(Box<dyn Fn(&FakeCluster) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PollPassed => write!(f, "PollPassed"),
            Self::PollTimedOut => write!(f, "PollTimedOut"),
            Self::PollFailedWith(kind) => write!(f, "PollFailedWith({:?})", kind),
            Self::PollAttempts(n) => write!(f, "PollAttempts({})", n),
            Self::PollElapsedAtLeast(d) => write!(f, "PollElapsedAtLeast({:?})", d),
            Self::FailureContains(s) => write!(f, "FailureContains({:?})", s),
            Self::PassMessageContains(s) => write!(f, "PassMessageContains({:?})", s),
            Self::FetchCount(n) => write!(f, "FetchCount({})", n),
            Self::DeploymentExists(name) => write!(f, "DeploymentExists({:?})", name),
            Self::NoDeployment(name) => write!(f, "NoDeployment({:?})", name),
            Self::Matches { name, matcher } => write!(
                f,
                "Matches {{ name: {:?}, matcher: {:?} }}",
                name,
                matcher.describe()
            ),
            Self::DoesNotMatch { name, matcher } => write!(
                f,
                "DoesNotMatch {{ name: {:?}, matcher: {:?} }}",
                name,
                matcher.describe()
            ),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Match against error kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    PathSyntax,
    NotFound,
    Serialization,
    Timeout,
}

impl ErrorKind {
    pub fn of(error: &MatchError) -> Option<Self> {
        match error {
            MatchError::PathSyntax { .. } => Some(Self::PathSyntax),
            MatchError::NotFound { .. } => Some(Self::NotFound),
            MatchError::Serialization(_) => Some(Self::Serialization),
            MatchError::Timeout { .. } => Some(Self::Timeout),
            _ => None,
        }
    }
}
