//! Process-wide default graph.
//!
//! The default graph is created on first use and lives until the end of the process.
//! All callers of the functions in this module share it: code which needs isolation
//! (tests in particular) should own a [Graph] instead. [reset] empties the shared graph
//! for every caller at once.

use once_cell::sync::Lazy;

use crate::*;

static DEFAULT: Lazy<Graph> = Lazy::new(Graph::new);

/// The shared default graph
pub fn graph() -> &'static Graph {
    &DEFAULT
}

pub fn register(candidate: Candidate) -> Result<(), WiringError> {
    DEFAULT.register(candidate)
}

pub fn register_all<I>(candidates: I) -> Result<(), WiringError>
where
    I: IntoIterator<Item = Candidate>,
{
    DEFAULT.register_all(candidates)
}

pub fn resolve<S: Slot + ?Sized>(target: &mut S) -> Result<(), WiringError> {
    DEFAULT.resolve(target)
}

pub fn resolve_all(targets: &mut [&mut dyn Slot]) -> Result<(), WiringError> {
    DEFAULT.resolve_all(targets)
}

pub fn inject<P: Describe>() -> Result<P, WiringError> {
    DEFAULT.inject()
}

pub fn must_register(candidate: Candidate) {
    DEFAULT.must_register(candidate)
}

pub fn must_inject<P: Describe>() -> P {
    DEFAULT.must_inject()
}

pub fn reset() {
    DEFAULT.reset()
}

pub fn debug_dump() -> String {
    DEFAULT.debug_dump()
}
