use std::path::PathBuf;

/// Represents a block device discovered on the system.
///
/// This struct holds the information about a device that the resolver and
/// the device listing need. It is populated by the platform-specific
/// discovery functions in the [`crate::platform`] module.
#[derive(Clone, Debug)]
pub struct Device {
    /// The system path to the device (e.g., `/dev/sda`).
    pub path: PathBuf,
    /// The kernel-provided name of the device (e.g., "sda").
    pub name: String,
    /// The hardware model string reported by the device. Empty for devices
    /// that do not report one. References are matched against this string,
    /// so it is the stable way to name a disk across replug events.
    pub model: String,
    /// The total size of the device in gigabytes (GB).
    pub size_gb: f64,
    /// The primary mount point of the device, if any.
    pub mount_point: String,
}
