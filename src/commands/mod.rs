//! Command implementations for modstrap CLI

pub mod completions;
pub mod helpers;
pub mod install;
pub mod run;
pub mod status;
pub mod version;
