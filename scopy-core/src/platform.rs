//! Provides platform-specific functionality.
//!
//! This module contains the logic for interacting with the operating system
//! to enumerate attached block devices. The transfer backend shells out to
//! `dd(1)` and enumeration reads `/sys/block`, so Linux is the only
//! supported platform.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::*;
