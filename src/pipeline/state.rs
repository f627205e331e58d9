//! Bootstrap state machine
//!
//! [`transition`] is pure: it maps the current state and one event to the
//! next state and the effects the driver must execute. Effects never run
//! the next stage directly; whatever they produce comes back as a new event
//! on a later tick.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Detecting,
    Confirming,
    Provisioning { cursor: usize },
    AwaitingResolution,
    HandingOff,
    Finished,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => write!(f, "idle"),
            State::Detecting => write!(f, "detecting"),
            State::Confirming => write!(f, "confirming"),
            State::Provisioning { cursor } => write!(f, "provisioning({cursor})"),
            State::AwaitingResolution => write!(f, "awaiting resolution"),
            State::HandingOff => write!(f, "handing off"),
            State::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    /// Detector answer: required modules already loaded
    Detected(bool),
    Confirmed(bool),
    /// Fetch and patch of module `index` completed, successfully or not
    ModuleFinished { index: usize },
    ModulesChanged,
    ResolutionTimedOut,
    EntryPointLocated,
    /// Handoff reached a final outcome (invoked or not found)
    HandoffFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    DetectModules,
    AskConfirmation,
    ProvisionModule(usize),
    SubscribeAndResolve,
    Unsubscribe,
    LocateEntryPoint,
    InvokeEntryPoint,
    Finish,
}

fn after_module(index: usize, module_count: usize) -> (State, Vec<Effect>) {
    let next = index + 1;
    if next >= module_count {
        (State::AwaitingResolution, vec![Effect::SubscribeAndResolve])
    } else {
        (
            State::Provisioning { cursor: next },
            vec![Effect::ProvisionModule(next)],
        )
    }
}

/// Next state and effects for `event` in `state`
///
/// An event that does not apply to `state` leaves it unchanged and yields
/// no effects.
pub fn transition(state: State, event: Event, module_count: usize) -> (State, Vec<Effect>) {
    match (state, event) {
        (State::Idle, Event::Start) => (State::Detecting, vec![Effect::DetectModules]),

        (State::Detecting, Event::Detected(true)) => {
            (State::HandingOff, vec![Effect::LocateEntryPoint])
        }
        (State::Detecting, Event::Detected(false)) => {
            (State::Confirming, vec![Effect::AskConfirmation])
        }

        (State::Confirming, Event::Confirmed(true)) if module_count == 0 => {
            (State::AwaitingResolution, vec![Effect::SubscribeAndResolve])
        }
        (State::Confirming, Event::Confirmed(true)) => (
            State::Provisioning { cursor: 0 },
            vec![Effect::ProvisionModule(0)],
        ),
        (State::Confirming, Event::Confirmed(false)) => (State::Finished, vec![Effect::Finish]),

        (State::Provisioning { cursor }, Event::ModuleFinished { index }) if index == cursor => {
            after_module(index, module_count)
        }

        (State::AwaitingResolution, Event::ModulesChanged) => {
            (State::HandingOff, vec![Effect::LocateEntryPoint])
        }
        (State::AwaitingResolution, Event::ResolutionTimedOut) => {
            (State::Finished, vec![Effect::Unsubscribe, Effect::Finish])
        }

        (State::HandingOff, Event::EntryPointLocated) => {
            (State::HandingOff, vec![Effect::InvokeEntryPoint])
        }
        (State::HandingOff, Event::HandoffFinished) => (State::Finished, vec![Effect::Finish]),

        (state, _) => (state, Vec::new()),
    }
}
