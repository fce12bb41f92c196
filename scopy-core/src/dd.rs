//! The production transfer backend, built on `dd(1)`.
//!
//! Each copy attempt is one dd child process with `status=progress`, so its
//! stderr doubles as the progress channel. The engine consumes that channel
//! synchronously, segment by segment, while the child runs; a non-zero exit
//! comes back as a normal [`Attempt`] for the recovery loop to absorb. The
//! zero-fill recovery write is performed natively, one sector at a time.

use crate::SECTOR_SIZE;
use crate::copy::{Attempt, Transfer};
use crate::progress::{Segments, parse_records_in};
use crate::report::Reporter;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Renders a command the way a shell would show it, for the operator log.
fn render(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sector-range transfers via dd child processes.
#[derive(Debug, Default)]
pub struct DdTransfer;

impl Transfer for DdTransfer {
    fn copy_range(
        &mut self,
        source: &Path,
        target: &Path,
        offset: u64,
        limit: Option<u64>,
        reporter: &mut dyn Reporter,
    ) -> Result<Attempt> {
        let mut command = Command::new("dd");
        command
            .arg(format!("if={}", source.display()))
            .arg(format!("of={}", target.display()))
            .arg(format!("bs={SECTOR_SIZE}"))
            .arg("status=progress")
            .arg(format!("skip={offset}"))
            .arg(format!("seek={offset}"));
        if let Some(sectors) = limit {
            command.arg(format!("count={sectors}"));
        }
        reporter.on_shell(&render(&command));

        let mut child = command
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn dd")?;
        let stderr = child.stderr.take().context("dd stderr not captured")?;

        let mut sectors_in = None;
        for segment in Segments::new(BufReader::new(stderr)) {
            let segment = segment.context("reading dd progress channel")?;
            reporter.on_raw_line(&segment);
            if let Some(sectors) = parse_records_in(&segment) {
                sectors_in = Some(sectors);
                reporter.on_sectors_read(sectors);
            }
        }

        let status = child.wait().context("waiting for dd")?;
        Ok(Attempt {
            sectors_in,
            // A signal-killed dd has no exit code; any non-zero value sends
            // the engine into recovery the same way.
            status: status.code().unwrap_or(-1),
        })
    }

    fn zero_fill(&mut self, target: &Path, offset: u64) -> Result<()> {
        let mut device = OpenOptions::new()
            .write(true)
            .open(target)
            .with_context(|| format!("opening {} for zero fill", target.display()))?;
        device
            .seek(SeekFrom::Start(offset * SECTOR_SIZE))
            .with_context(|| format!("seeking to sector {offset} on {}", target.display()))?;
        device
            .write_all(&[0u8; SECTOR_SIZE as usize])
            .with_context(|| format!("zero-filling sector {offset} on {}", target.display()))?;
        device.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn zero_fill_overwrites_exactly_one_sector() {
        let sector = SECTOR_SIZE as usize;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0xAA; sector * 3]).unwrap();
        file.flush().unwrap();

        DdTransfer.zero_fill(file.path(), 1).unwrap();

        let contents = std::fs::read(file.path()).unwrap();
        assert_eq!(contents.len(), sector * 3);
        assert!(contents[..sector].iter().all(|&b| b == 0xAA));
        assert!(contents[sector..sector * 2].iter().all(|&b| b == 0));
        assert!(contents[sector * 2..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn zero_fill_on_a_missing_target_is_an_error() {
        let result = DdTransfer.zero_fill(Path::new("/nonexistent/device"), 0);
        assert!(result.is_err());
    }

    #[test]
    fn rendered_command_includes_every_argument() {
        let mut command = Command::new("dd");
        command.arg("if=/dev/sda").arg("bs=512");
        assert_eq!(render(&command), "dd if=/dev/sda bs=512");
    }
}
