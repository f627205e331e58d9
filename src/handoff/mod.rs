//! Handoff dispatcher
//!
//! Finds the downstream installer's entry point among the host's loaded
//! modules and invokes it. Locating and invoking are separate steps so the
//! pipeline can run the invocation on a later tick.

pub mod exports;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

pub use registry::{EntryPoint, EntryPointRegistry, ModuleExports};

use crate::config::HandoffTarget;
use crate::host::Host;

/// How the handoff ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    NotAttempted,
    Invoked,
    TypeNotFound,
    MethodNotFound,
    InvocationError(String),
}

impl HandoffOutcome {
    pub fn is_invoked(&self) -> bool {
        matches!(self, HandoffOutcome::Invoked)
    }
}

impl fmt::Display for HandoffOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffOutcome::NotAttempted => write!(f, "not attempted"),
            HandoffOutcome::Invoked => write!(f, "invoked"),
            HandoffOutcome::TypeNotFound => write!(f, "type not found"),
            HandoffOutcome::MethodNotFound => write!(f, "entry point not found"),
            HandoffOutcome::InvocationError(reason) => write!(f, "invocation failed: {reason}"),
        }
    }
}

/// Result of searching the loaded modules
pub enum Located {
    Found {
        module: String,
        entry: Arc<dyn EntryPoint>,
    },
    Missing(HandoffOutcome),
}

impl fmt::Debug for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Located::Found { module, .. } => f.debug_struct("Found").field("module", module).finish(),
            Located::Missing(outcome) => f.debug_tuple("Missing").field(outcome).finish(),
        }
    }
}

fn matches_prefix(name: &str, prefixes: &[String]) -> bool {
    let name = name.to_lowercase();
    prefixes
        .iter()
        .any(|prefix| name.starts_with(&prefix.to_lowercase()))
}

/// Search loaded modules matching the target's prefixes for its entry point
///
/// A module whose exports cannot be read is logged and skipped. The first
/// module exporting the type decides between found and method-not-found.
pub fn locate_entry_point(host: &dyn Host, target: &HandoffTarget) -> Located {
    let mut type_seen = false;

    for module in host.loaded_modules() {
        if !matches_prefix(&module.name, &target.module_prefixes) {
            continue;
        }

        let exports = match host.module_exports(&module) {
            Ok(exports) => exports,
            Err(e) => {
                warn!(module = %module.name, error = %e, "skipping module with unreadable exports");
                continue;
            }
        };

        let Some(exported) = exports.find_type(&target.type_name) else {
            debug!(module = %module.name, type_name = %target.type_name, "type not exported here");
            continue;
        };
        type_seen = true;

        if let Some(entry) = exported.entry_point(&target.entry_point) {
            info!(module = %module.name, type_name = %target.type_name, entry_point = %target.entry_point, "located installer entry point");
            return Located::Found {
                module: module.name,
                entry,
            };
        }
    }

    let outcome = if type_seen {
        HandoffOutcome::MethodNotFound
    } else {
        HandoffOutcome::TypeNotFound
    };
    error!(
        type_name = %target.type_name,
        entry_point = %target.entry_point,
        %outcome,
        "installer handoff unavailable; run `modstrap install` once the installer module is fixed"
    );
    Located::Missing(outcome)
}

/// Invoke a located entry point
pub fn invoke(module: &str, entry: &dyn EntryPoint) -> HandoffOutcome {
    match entry.invoke() {
        Ok(()) => {
            info!(module, "installer entry point returned");
            HandoffOutcome::Invoked
        }
        Err(e) => {
            error!(module, error = %e, "installer entry point failed");
            HandoffOutcome::InvocationError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::registry::ExportedType;
    use super::*;
    use crate::error::{Result, handoff as handoff_error};
    use crate::test_fixtures::FakeHost;

    fn target() -> HandoffTarget {
        HandoffTarget::default()
    }

    fn exports_with(type_name: &str, entry: &str) -> ModuleExports {
        ModuleExports::default().with_type(
            type_name,
            ExportedType::default()
                .with_entry_point(entry, Arc::new(|| -> Result<()> { Ok(()) })),
        )
    }

    #[test]
    fn test_locate_and_invoke() {
        let mut host = FakeHost::with_loaded(&["com.modkit.installer"]);
        host.registry_mut().register(
            "com.modkit.installer",
            exports_with("ModKit.Installer.Bootstrap", "Run"),
        );

        match locate_entry_point(&host, &target()) {
            Located::Found { module, entry } => {
                assert_eq!(module, "com.modkit.installer");
                assert_eq!(invoke(&module, entry.as_ref()), HandoffOutcome::Invoked);
            }
            Located::Missing(outcome) => panic!("expected entry point, got {outcome}"),
        }
    }

    #[test]
    fn test_type_not_found() {
        let mut host = FakeHost::with_loaded(&["com.modkit.core"]);
        host.registry_mut()
            .register("com.modkit.core", exports_with("ModKit.Core.Other", "Run"));

        let located = locate_entry_point(&host, &target());
        assert!(matches!(
            located,
            Located::Missing(HandoffOutcome::TypeNotFound)
        ));
    }

    #[test]
    fn test_method_not_found() {
        let mut host = FakeHost::with_loaded(&["com.modkit.installer"]);
        host.registry_mut().register(
            "com.modkit.installer",
            exports_with("ModKit.Installer.Bootstrap", "Start"),
        );

        let located = locate_entry_point(&host, &target());
        assert!(matches!(
            located,
            Located::Missing(HandoffOutcome::MethodNotFound)
        ));
    }

    #[test]
    fn test_unmatched_prefix_is_not_searched() {
        let mut host = FakeHost::with_loaded(&["org.other.tools"]);
        host.registry_mut().register(
            "org.other.tools",
            exports_with("ModKit.Installer.Bootstrap", "Run"),
        );

        assert!(matches!(
            locate_entry_point(&host, &target()),
            Located::Missing(HandoffOutcome::TypeNotFound)
        ));
    }

    #[test]
    fn test_broken_module_is_skipped() {
        let mut host = FakeHost::with_loaded(&["com.modkit.broken", "COM.MODKIT.INSTALLER"]);
        host.registry_mut()
            .register_failure("com.modkit.broken", "module.yaml is not valid");
        host.registry_mut().register(
            "com.modkit.installer",
            exports_with("ModKit.Installer.Bootstrap", "Run"),
        );

        assert!(matches!(
            locate_entry_point(&host, &target()),
            Located::Found { .. }
        ));
    }

    #[test]
    fn test_invocation_error_is_reported() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let failing = move || -> Result<()> {
            counter.set(counter.get() + 1);
            Err(handoff_error::entry_point_failed("Run", "boom"))
        };

        let outcome = invoke("com.modkit.installer", &failing);
        assert_eq!(calls.get(), 1);
        match outcome {
            HandoffOutcome::InvocationError(reason) => assert!(reason.contains("boom")),
            other => panic!("unexpected outcome {other}"),
        }
    }
}
