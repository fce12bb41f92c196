//! The sector copy engine.
//!
//! One call to [`run`] owns an entire transfer. Each iteration re-resolves
//! both devices (their paths may have changed across a replug), optionally
//! recovers from the previous failed attempt by zero-filling one sector on
//! the target and skipping past it, then issues the next copy attempt. A
//! clean attempt ends the transfer; a failed one has its successfully copied
//! prefix folded into the state so the next attempt resumes exactly where
//! the fault occurred. There is no retry cap: the engine is built for
//! best-effort imaging of a degrading disk and keeps going until the full
//! requested range reports success.
//!
//! The engine is intentionally serial. At most one copy attempt or recovery
//! write is in flight at any time, since overlapping writes to the same
//! target offset would corrupt the offset accounting.

use crate::report::{Reporter, Role};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// The outcome of a single copy attempt.
#[derive(Clone, Debug)]
pub struct Attempt {
    /// The latest transferred-sector count reported on the progress channel,
    /// or `None` if no count was ever reported (the attempt died before
    /// moving anything, or its progress output was unparseable).
    pub sectors_in: Option<u64>,
    /// The attempt's exit status. Zero means the full range was copied.
    pub status: i32,
}

/// A backend that performs the actual byte-range transfers.
///
/// The production implementation is [`crate::dd::DdTransfer`]; tests script
/// a fake. A non-zero exit of an attempt is a normal [`Attempt`] outcome,
/// not an `Err` — only resource-level faults (the backend cannot run at
/// all, the target is unwritable) are errors, and those abort the transfer.
pub trait Transfer {
    /// Copies up to `limit` sectors (unbounded if `None`) from `source` to
    /// `target`, reading and writing at sector `offset`. Progress segments
    /// and parsed counts are fed to `reporter` as they arrive.
    fn copy_range(
        &mut self,
        source: &Path,
        target: &Path,
        offset: u64,
        limit: Option<u64>,
        reporter: &mut dyn Reporter,
    ) -> Result<Attempt>;

    /// Writes exactly one zero-filled sector at sector `offset` on `target`.
    fn zero_fill(&mut self, target: &Path, offset: u64) -> Result<()>;
}

/// The mutable state of a transfer, in sector units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferState {
    /// Current sector offset into both devices. Only ever increases.
    pub offset: u64,
    /// Remaining sectors to copy, or `None` for an unbounded transfer. Only
    /// ever decreases; the engine stops once it reaches zero.
    pub limit: Option<u64>,
    /// Exit status of the most recent attempt; `None` before the first.
    pub last_status: Option<i32>,
}

impl TransferState {
    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self {
            offset,
            limit,
            last_status: None,
        }
    }

    /// True once a bounded transfer has no sectors left to copy.
    pub fn exhausted(&self) -> bool {
        self.limit == Some(0)
    }

    fn advance(&mut self, sectors: u64) {
        self.offset += sectors;
        if let Some(limit) = self.limit.as_mut() {
            *limit = limit.saturating_sub(sectors);
        }
    }
}

/// Runs a transfer to completion.
///
/// Loops RESOLVE → COPY, detouring through RECOVER after every failed
/// attempt, until an attempt exits cleanly or the sector limit is exhausted.
/// `resolve` is consulted for both references on every iteration so that
/// replugged devices are picked up; `reporter` sees every path change,
/// offset update, and progress segment in real time.
///
/// # Arguments
///
/// * `source` - Source device reference (path or model name).
/// * `target` - Target device reference (path or model name).
/// * `state` - Offset/limit state, pre-seeded for resumed transfers.
/// * `resolve` - Binds a reference to its current device path, blocking
///   until the device is attached.
/// * `backend` - Performs the copy attempts and recovery writes.
/// * `reporter` - Receives all operator-visible events.
///
/// # Errors
///
/// Sector-level faults never surface here; they are absorbed by the
/// zero-fill recovery. This function only fails on resource-level faults:
/// the resolver's enumeration backend, spawning an attempt, or the recovery
/// write itself (which means the target is unwritable and no further
/// progress is possible).
pub fn run<B, R>(
    source: &str,
    target: &str,
    state: &mut TransferState,
    mut resolve: impl FnMut(&str, &mut dyn Reporter) -> Result<PathBuf>,
    backend: &mut B,
    reporter: &mut R,
) -> Result<()>
where
    B: Transfer,
    R: Reporter,
{
    reporter.on_offset(state.offset);

    let mut source_path: Option<PathBuf> = None;
    let mut target_path: Option<PathBuf> = None;

    loop {
        if state.exhausted() {
            break;
        }

        let tgt = resolve(target, reporter)?;
        if target_path.as_deref() != Some(&tgt) {
            reporter.on_device(Role::Target, &tgt, target);
            target_path = Some(tgt.clone());
        }
        let src = resolve(source, reporter)?;
        if source_path.as_deref() != Some(&src) {
            reporter.on_device(Role::Source, &src, source);
            source_path = Some(src.clone());
        }

        if state.last_status.is_some_and(|status| status != 0) {
            // The sector at the current offset is presumed unreadable:
            // leave a deterministic zero marker on the target and step over
            // it. This is what guarantees forward progress.
            reporter.on_zero_fill(&tgt, state.offset);
            backend.zero_fill(&tgt, state.offset)?;
            state.advance(1);
            reporter.on_offset(state.offset);
            if state.exhausted() {
                break;
            }
        }

        let attempt = backend.copy_range(&src, &tgt, state.offset, state.limit, reporter)?;
        if attempt.status == 0 {
            if let Some(sectors) = attempt.sectors_in {
                if sectors > 0 {
                    state.advance(sectors);
                }
            }
            break;
        }

        state.last_status = Some(attempt.status);
        reporter.on_attempt_failed(attempt.status);
        match attempt.sectors_in {
            Some(sectors) => {
                // A prefix of the range made it across before the fault;
                // account for it so the retry resumes at the bad sector.
                if sectors > 0 {
                    state.advance(sectors);
                    reporter.on_offset(state.offset);
                }
            }
            None => {
                // No count was ever reported. Whether zero sectors made it
                // or the report was simply never flushed is unknowable, so
                // assume nothing was copied and let the recovery skip a
                // single sector from the original offset.
                reporter.on_count_unknown();
            }
        }
    }

    reporter.on_complete(state.offset);
    Ok(())
}
