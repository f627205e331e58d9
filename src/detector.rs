//! Detector: is the framework already installed?

use tracing::debug;

use crate::host::Host;

/// True when at least one of the required modules is loaded
pub fn required_modules_present(host: &dyn Host, required: &[String]) -> bool {
    let present = required.iter().find(|name| host.is_module_loaded(name));
    debug!(present = ?present, "checked required modules");
    present.is_some()
}
