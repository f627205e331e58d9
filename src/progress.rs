//! Progress bar display for module provisioning

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress display for provisioning
pub struct ProgressDisplay {
    module_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total module count
    ///
    /// A hidden display tracks position without drawing anything.
    pub fn new(total_modules: u64, visible: bool) -> Self {
        let module_pb = ProgressBar::with_draw_target(
            Some(total_modules),
            if visible {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );
        if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            module_pb.set_style(style.progress_chars("#>-"));
        }

        Self { module_pb }
    }

    /// Display drawn on stderr, shown only when stderr is a terminal
    pub fn for_stderr(total_modules: u64) -> Self {
        Self::new(total_modules, Term::stderr().is_term())
    }

    /// Update to show the module being provisioned
    pub fn update_module(&self, module_name: &str, current: usize, total: usize) {
        self.module_pb
            .set_message(format!("({current}/{total}) {module_name}"));
    }

    /// Increment module progress
    pub fn inc_module(&self) {
        self.module_pb.inc(1);
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.module_pb.position()
    }

    pub fn finish(&self) {
        self.module_pb.finish_and_clear();
    }
}
