//! The core, UI-agnostic library for the `scopy` sector copier.
//!
//! `scopy-core` implements a best-effort, sector-by-sector copy between two
//! block devices. It is built for imaging degrading disks: a copy attempt
//! that dies on an unreadable sector does not abort the transfer. Instead the
//! engine zero-fills the bad sector on the target, advances past it, and
//! retries from there, indefinitely, until the full range reports success.
//! Devices may be referenced by model name and are re-resolved before every
//! attempt, so a disk that is unplugged and reattached under a new path is
//! picked up transparently.
//!
//! The library is structured into several key modules:
//! - [`device`]: the `Device` record produced by enumeration.
//! - [`platform`]: platform-specific block-device discovery.
//! - [`resolve`]: binding a path or model-name reference to a device path,
//!   polling until the device appears.
//! - [`progress`]: parsing the line-oriented progress channel of a copy
//!   attempt.
//! - [`copy`]: the transfer state machine; its [`copy::run`] function is the
//!   primary entry point.
//! - [`dd`]: the production transfer backend, which drives `dd(1)`.
//! - [`report`]: the [`report::Reporter`] callback trait through which a
//!   front-end observes the transfer in real time.
//!
//! ## Example: resuming an unbounded copy
//!
//! ```rust,no_run
//! use scopy_core::copy::{self, TransferState};
//! use scopy_core::dd::DdTransfer;
//! use scopy_core::report::Reporter;
//! use scopy_core::resolve;
//! use anyhow::Result;
//!
//! struct Quiet;
//! impl Reporter for Quiet {}
//!
//! fn main() -> Result<()> {
//!     // Resume a previous partial run at sector 4096. References may be
//!     // device paths or model names; a model name blocks until the
//!     // matching device is attached.
//!     let mut state = TransferState::new(4096, None);
//!     copy::run(
//!         "WDC WD40EFRX-68N32N0",
//!         "/dev/sdb",
//!         &mut state,
//!         resolve::resolve,
//!         &mut DdTransfer::default(),
//!         &mut Quiet,
//!     )
//! }
//! ```

pub mod copy;
pub mod dd;
pub mod device;
pub mod platform;
pub mod progress;
pub mod report;
pub mod resolve;

/// Fixed size of one sector in bytes. All offsets and limits in this crate
/// are expressed in units of this size, matching the zero-fill write.
pub const SECTOR_SIZE: u64 = 512;
