//! Operator-event reporting trait.
//!
//! A long-running transfer's only externally visible signal of trouble is
//! its log stream, so every state transition, resolved path change, and
//! progress line flows through this trait in real time. Implementing it is
//! how a front-end (CLI, GUI, test harness) observes the engine; all methods
//! default to no-ops so an implementation only handles what it cares about.

use std::fmt;
use std::path::Path;

/// Which end of the transfer a device event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Source,
    Target,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Target => write!(f, "target"),
        }
    }
}

/// Callbacks invoked by the resolver, the transfer backend, and the copy
/// engine as a transfer progresses. All methods are called synchronously.
pub trait Reporter {
    /// A model-name reference was not found on the first poll. Emitted once
    /// per resolution, not once per poll.
    fn on_waiting(&mut self, _reference: &str) {}

    /// A reference resolved to a path that differs from the one used by the
    /// previous attempt (first discovery or a replug).
    fn on_device(&mut self, _role: Role, _path: &Path, _reference: &str) {}

    /// The current sector offset, reported at start and after every change.
    fn on_offset(&mut self, _offset: u64) {}

    /// The rendered command line of a child process about to run.
    fn on_shell(&mut self, _command: &str) {}

    /// One verbatim segment of the copy attempt's progress channel,
    /// delimiter included. Forward it unmodified for a live dd display.
    fn on_raw_line(&mut self, _line: &str) {}

    /// The progress channel reported a transferred-sector count.
    fn on_sectors_read(&mut self, _sectors: u64) {}

    /// A copy attempt ended with a non-zero exit status.
    fn on_attempt_failed(&mut self, _status: i32) {}

    /// A copy attempt failed without ever reporting a transferred count;
    /// the engine will skip a single sector on a heuristic basis.
    fn on_count_unknown(&mut self) {}

    /// A zero-filled sector is about to be written at `offset` on `target`.
    fn on_zero_fill(&mut self, _target: &Path, _offset: u64) {}

    /// The full requested range copied successfully; `offset` is the final
    /// sector offset.
    fn on_complete(&mut self, _offset: u64) {}
}
