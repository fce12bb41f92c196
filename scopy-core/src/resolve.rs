//! Binds a device reference to its current device path.
//!
//! A reference is either a literal path (anything rooted under `/dev/`) or a
//! hardware model name. Paths pass through untouched. Model names are looked
//! up in the current device list; if the device is not attached yet, the
//! resolver polls once per second until it appears, with no upper bound on
//! the wait. Cancellation is external (the operator kills the process).
//!
//! Resolution is intentionally not cached: a device's path may change across
//! replug events, so callers re-resolve before every copy attempt.

use crate::device::Device;
use crate::platform;
use crate::report::Reporter;
use anyhow::Result;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// How long to wait between device-list polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Edge-triggered flag for the one-time "waiting" notice. Polling may go on
/// for hours; a notice per poll would drown the operator log.
#[derive(Debug, Default)]
pub struct WaitNotice {
    notified: bool,
}

impl WaitNotice {
    /// Returns `true` exactly once, on the first call.
    pub fn first(&mut self) -> bool {
        !std::mem::replace(&mut self.notified, true)
    }
}

/// Resolves a device reference to its current path, blocking until the
/// device is attached if the reference is a model name.
///
/// `reporter` receives a single [`Reporter::on_waiting`] call the first time
/// a model name comes up empty.
///
/// # Errors
///
/// Returns an error only if device enumeration itself fails; an absent
/// device is not an error and is waited out indefinitely.
pub fn resolve(reference: &str, reporter: &mut dyn Reporter) -> Result<PathBuf> {
    resolve_with(reference, platform::list_block_devices, reporter, || {
        thread::sleep(POLL_INTERVAL)
    })
}

/// The polling loop behind [`resolve`], with the enumeration and the
/// inter-poll wait supplied by the caller.
pub fn resolve_with(
    reference: &str,
    mut lookup: impl FnMut() -> Result<Vec<Device>>,
    reporter: &mut dyn Reporter,
    mut idle: impl FnMut(),
) -> Result<PathBuf> {
    if reference.starts_with("/dev/") {
        return Ok(PathBuf::from(reference));
    }

    let mut wait = WaitNotice::default();
    loop {
        if let Some(device) = lookup()?.into_iter().find(|d| d.model == reference) {
            return Ok(device.path);
        }
        if wait.first() {
            reporter.on_waiting(reference);
        }
        idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Notices(usize);

    impl Reporter for Notices {
        fn on_waiting(&mut self, _reference: &str) {
            self.0 += 1;
        }
    }

    fn device(name: &str, model: &str) -> Device {
        Device {
            path: PathBuf::from("/dev/").join(name),
            name: name.to_string(),
            model: model.to_string(),
            size_gb: 0.0,
            mount_point: String::new(),
        }
    }

    #[test]
    fn path_reference_passes_through_without_lookup() {
        let mut notices = Notices::default();
        let path = resolve_with(
            "/dev/sdz",
            || panic!("explicit paths must not enumerate"),
            &mut notices,
            || {},
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/dev/sdz"));
        assert_eq!(notices.0, 0);
    }

    #[test]
    fn model_match_resolves_immediately() {
        let mut notices = Notices::default();
        let mut sleeps = 0;
        let path = resolve_with(
            "Foo",
            || Ok(vec![device("sda", "Foo")]),
            &mut notices,
            || sleeps += 1,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/dev/sda"));
        assert_eq!(sleeps, 0);
        assert_eq!(notices.0, 0);
    }

    #[test]
    fn absent_model_polls_until_it_appears() {
        let mut notices = Notices::default();
        let mut calls = 0;
        let mut sleeps = 0;
        let path = resolve_with(
            "Bar",
            || {
                calls += 1;
                let mut list = vec![device("sda", "Foo")];
                if calls >= 3 {
                    list.push(device("sdb", "Bar"));
                }
                Ok(list)
            },
            &mut notices,
            || sleeps += 1,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/dev/sdb"));
        assert_eq!(sleeps, 2);
        // One notice total, not one per empty poll.
        assert_eq!(notices.0, 1);
    }

    #[test]
    fn enumeration_failure_propagates() {
        let mut notices = Notices::default();
        let err = resolve_with(
            "Bar",
            || Err(anyhow::anyhow!("lsblk backend gone")),
            &mut notices,
            || {},
        );
        assert!(err.is_err());
    }
}
