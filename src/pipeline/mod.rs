//! Provisioning pipeline driver
//!
//! Runs the [`state`] machine on a cooperative loop. Each loop iteration is
//! one host tick:
//! 1. Deliver the host's pending change notifications.
//! 2. Check the resolution deadline.
//! 3. Process at most one deferred event, executing the effects its
//!    transition yields. Events produced by effects are deferred again.
//!
//! With nothing queued the driver sleeps for the poll interval while it
//! waits on the host, and stops once the machine has finished.

pub mod context;
pub mod report;
pub mod state;


use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

pub use context::BootstrapContext;
pub use report::{ModuleReport, ResolutionOutcome, RunPath, RunReport};
pub use state::{Effect, Event, State, transition};

use crate::config::ModuleDescriptor;
use crate::detector::required_modules_present;
use crate::fetcher::Fetcher;
use crate::git::Vcs;
use crate::handoff::{self, EntryPoint, Located};
use crate::host::{DeferredQueue, Host};
use crate::manifest::{self, PatchOutcome};
use crate::progress::ProgressDisplay;
use crate::resolution::ResolutionBridge;

/// Decides whether provisioning may start; receives the modules to install
pub type ConfirmFn<'a> = Box<dyn FnMut(&[ModuleDescriptor]) -> bool + 'a>;

/// One bootstrap run against a host
pub struct Bootstrap<'a> {
    ctx: &'a BootstrapContext,
    host: &'a mut dyn Host,
    fetcher: Fetcher<'a>,
    confirm: ConfirmFn<'a>,
    progress: Option<ProgressDisplay>,
    state: State,
    queue: DeferredQueue<Event>,
    bridge: ResolutionBridge,
    located: Option<(String, Arc<dyn EntryPoint>)>,
    report: RunReport,
}

impl<'a> Bootstrap<'a> {
    /// A run that provisions without asking
    pub fn new(ctx: &'a BootstrapContext, host: &'a mut dyn Host, vcs: &'a dyn Vcs) -> Self {
        Self {
            fetcher: Fetcher::new(vcs, ctx.remote.clone(), ctx.branch.clone()),
            bridge: ResolutionBridge::new(ctx.resolve_timeout),
            ctx,
            host,
            confirm: Box::new(|_| true),
            progress: None,
            state: State::Idle,
            queue: DeferredQueue::new(),
            located: None,
            report: RunReport::default(),
        }
    }

    /// Ask before provisioning absent modules
    #[must_use]
    pub fn with_confirmation(mut self, confirm: ConfirmFn<'a>) -> Self {
        self.confirm = confirm;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressDisplay) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Drive the run to completion
    pub fn run(mut self) -> RunReport {
        info!(project = %self.ctx.project_root.display(), modules = self.ctx.modules.len(), "bootstrap started");
        self.queue.defer(Event::Start);

        loop {
            self.host_tick();

            if let Some(event) = self.queue.next() {
                self.step(event);
                continue;
            }

            if self.state == State::Finished {
                break;
            }
            if self.bridge.is_waiting() {
                thread::sleep(self.ctx.poll_interval);
                continue;
            }

            warn!(state = %self.state, "nothing left to run, stopping");
            break;
        }

        if let Some(progress) = &self.progress {
            progress.finish();
        }
        info!(
            installed = self.report.installed_count(),
            failed = self.report.failed_count(),
            resolution = %self.report.resolution,
            handoff = %self.report.handoff,
            "bootstrap finished"
        );
        self.report
    }

    fn host_tick(&mut self) {
        let delivered = self.host.changes().deliver();
        if let Some(change) = self.bridge.take_notification(self.host, &delivered) {
            self.report.resolution = ResolutionOutcome::Resolved {
                added: change.added,
                removed: change.removed,
            };
            self.queue.defer(Event::ModulesChanged);
        }

        if self.bridge.poll_deadline(Instant::now()) {
            self.report.resolution = ResolutionOutcome::TimedOut;
            self.queue.defer(Event::ResolutionTimedOut);
        }
    }

    fn step(&mut self, event: Event) {
        let (next, effects) = transition(self.state, event, self.ctx.modules.len());
        if effects.is_empty() {
            debug!(state = %self.state, ?event, "event ignored");
            return;
        }

        debug!(from = %self.state, to = %next, ?event, "transition");
        self.state = next;
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::DetectModules => {
                let present = required_modules_present(&*self.host, &self.ctx.required);
                if present {
                    info!("required modules already loaded, skipping provisioning");
                    self.report.path = RunPath::AlreadyPresent;
                }
                self.queue.defer(Event::Detected(present));
            }
            Effect::AskConfirmation => {
                let confirmed = (self.confirm)(&self.ctx.modules);
                self.report.path = if confirmed {
                    RunPath::Provisioned
                } else {
                    info!("provisioning declined");
                    RunPath::Declined
                };
                self.queue.defer(Event::Confirmed(confirmed));
            }
            Effect::ProvisionModule(index) => {
                self.provision(index);
                self.queue.defer(Event::ModuleFinished { index });
            }
            Effect::SubscribeAndResolve => self.bridge.begin(self.host),
            Effect::Unsubscribe => self.bridge.cancel(self.host),
            Effect::LocateEntryPoint => {
                match handoff::locate_entry_point(&*self.host, &self.ctx.handoff) {
                    Located::Found { module, entry } => {
                        self.located = Some((module, entry));
                        self.queue.defer(Event::EntryPointLocated);
                    }
                    Located::Missing(outcome) => {
                        self.report.handoff = outcome;
                        self.queue.defer(Event::HandoffFinished);
                    }
                }
            }
            Effect::InvokeEntryPoint => {
                if let Some((module, entry)) = self.located.take() {
                    self.report.handoff = handoff::invoke(&module, entry.as_ref());
                }
                self.queue.defer(Event::HandoffFinished);
            }
            Effect::Finish => {}
        }
    }

    /// Fetch then patch one module; never fails the run
    fn provision(&mut self, index: usize) {
        let Some(module) = self.ctx.modules.get(index) else {
            return;
        };
        let total = self.ctx.modules.len();
        if let Some(progress) = &self.progress {
            progress.update_module(&module.name, index + 1, total);
        }
        info!(module = %module.name, position = index + 1, total, "provisioning module");

        let fetch = self.fetcher.fetch(module, &self.ctx.mirror_root);
        let mut report = ModuleReport {
            name: module.name.clone(),
            patch: None,
            error: None,
            fetch,
        };

        if report.fetch.is_materialized() {
            let mirror = self.ctx.mirror_path(module);
            match manifest::ensure_dependency(&self.ctx.manifest_path, &module.name, &mirror) {
                Ok(outcome) => {
                    if outcome == PatchOutcome::Inserted {
                        self.host.refresh_assets();
                    }
                    report.patch = Some(outcome);
                }
                Err(e) => {
                    warn!(module = %module.name, error = %e, "manifest update failed");
                    report.error = Some(e.to_string());
                }
            }
        }

        if let Some(progress) = &self.progress {
            progress.inc_module();
        }
        self.report.modules.push(report);
    }
}
