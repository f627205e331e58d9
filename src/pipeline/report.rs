//! End-of-run report

use std::fmt;

use crate::fetcher::FetchOutcome;
use crate::handoff::HandoffOutcome;
use crate::manifest::PatchOutcome;

/// Which branch of the bootstrap flow the run took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPath {
    /// Required modules were loaded; went straight to handoff
    AlreadyPresent,
    Provisioned,
    /// The user declined provisioning
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub name: String,
    pub fetch: FetchOutcome,
    /// None when the mirror was not materialized and patching was skipped
    pub patch: Option<PatchOutcome>,
    /// Manifest I/O failure
    pub error: Option<String>,
}

impl ModuleReport {
    /// Mirror on disk and referenced from the manifest
    pub fn is_installed(&self) -> bool {
        self.fetch.is_materialized() && self.patch.is_some_and(PatchOutcome::is_registered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    NotRequested,
    Resolved {
        added: Vec<String>,
        removed: Vec<String>,
    },
    TimedOut,
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::NotRequested => write!(f, "not requested"),
            ResolutionOutcome::Resolved { added, removed } => {
                write!(f, "resolved (+{} -{})", added.len(), removed.len())
            }
            ResolutionOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub path: RunPath,
    pub modules: Vec<ModuleReport>,
    pub resolution: ResolutionOutcome,
    pub handoff: HandoffOutcome,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            path: RunPath::Provisioned,
            modules: Vec::new(),
            resolution: ResolutionOutcome::NotRequested,
            handoff: HandoffOutcome::NotAttempted,
        }
    }
}

impl RunReport {
    pub fn installed_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_installed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.modules.len() - self.installed_count()
    }

    /// Modules were provisioned and not one of them made it
    pub fn all_failed(&self) -> bool {
        !self.modules.is_empty() && self.installed_count() == 0
    }

    /// The installer was started
    pub fn is_success(&self) -> bool {
        self.handoff.is_invoked()
    }
}
