use crate::SECTOR_SIZE;
use crate::device::Device;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use sysinfo;

/// Helper to read a specific file from the /sys/block filesystem.
fn read_sys_file(device_name: &str, file: &str) -> io::Result<String> {
    let path = PathBuf::from("/sys/block").join(device_name).join(file);
    fs::read_to_string(path).map(|s| s.trim().to_string())
}

/// Enumerates the attached block devices on a Linux system.
///
/// This function discovers devices by iterating through the `/sys/block`
/// directory, performing a single pass with no polling or waiting. Loop and
/// ram pseudo-devices are skipped; everything else is returned, including
/// the system drive, since a failing internal disk is a legitimate source
/// and model-name resolution must be able to see every disk.
///
/// For each device the hardware model is read from
/// `/sys/block/<device>/device/model` (empty if the device reports none),
/// the size from `/sys/block/<device>/size`, and the mount point, if any,
/// from the `sysinfo` disk list.
///
/// # Returns
///
/// A `Result<Vec<Device>>` which is a list of discovered [`Device`]s on
/// success, or an error if `/sys/block` cannot be read.
pub fn list_block_devices() -> Result<Vec<Device>> {
    let disks = sysinfo::Disks::new_with_refreshed_list();

    let mut devices = Vec::new();
    let block_dir = fs::read_dir("/sys/block")?;

    for entry in block_dir.filter_map(Result::ok) {
        let device_name = entry.file_name().to_string_lossy().to_string();

        if device_name.starts_with("loop")
            || device_name.starts_with("ram")
            || device_name.starts_with("zram")
        {
            continue;
        }

        let model = read_sys_file(&device_name, "device/model").unwrap_or_default();

        let size_sectors = read_sys_file(&device_name, "size")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        let size_gb = (size_sectors * SECTOR_SIZE) as f64 / (1024.0 * 1024.0 * 1024.0);

        // Try to find a mount point by checking the `sysinfo` list.
        let mut mount_point = "".to_string();
        for disk in disks.iter() {
            if disk.name().to_string_lossy().starts_with(&device_name) {
                let mp = disk.mount_point().to_string_lossy().to_string();
                if !mp.is_empty() {
                    mount_point = mp;
                    break;
                }
            }
        }

        devices.push(Device {
            path: PathBuf::from("/dev/").join(&device_name),
            name: device_name,
            model,
            size_gb,
            mount_point,
        });
    }

    Ok(devices)
}
