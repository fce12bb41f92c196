use anyhow::Result;
use clap::{CommandFactory, Parser};
use console::style;
use scopy_core::copy::{self, TransferState};
use scopy_core::dd::DdTransfer;
use scopy_core::report::{Reporter, Role};
use scopy_core::{platform, resolve};
use std::io::{self, Write};
use std::path::Path;

#[derive(Parser)]
#[command(name = "scopy")]
#[command(
    about = "A resilient sector copier for imaging failing or hot-plugged disks",
    version
)]
struct Cli {
    /// Sector offset to start copying from (for resuming a partial run)
    #[arg(short = 'o', long, default_value_t = 0)]
    offset: u64,

    /// Maximum number of sectors to copy
    #[arg(short = 'l', long)]
    limit: Option<u64>,

    /// List attached block devices and exit
    #[arg(short = 'L', long = "llist")]
    llist: bool,

    /// Source device path or model name
    #[arg(required_unless_present = "llist")]
    source: Option<String>,

    /// Target device path or model name
    #[arg(required_unless_present = "llist")]
    target: Option<String>,
}

/// Writes operator messages with an explicit flush after every write.
///
/// A transfer can run for hours with stdout redirected to a log file, so
/// nothing may sit in a stream buffer: the log is the operator's only
/// visibility into the run. Status messages go to stdout; the verbatim dd
/// progress segments go to stderr, where dd itself would have written them.
#[derive(Default)]
struct ConsoleReporter;

impl ConsoleReporter {
    fn say(&self, message: String) {
        let mut out = io::stdout();
        let _ = writeln!(out, "{message}");
        let _ = out.flush();
    }
}

impl Reporter for ConsoleReporter {
    fn on_waiting(&mut self, reference: &str) {
        self.say(format!(
            "Waiting for device {} to appear",
            style(reference).cyan()
        ));
    }

    fn on_device(&mut self, role: Role, path: &Path, reference: &str) {
        self.say(format!(
            "Using {role} device {} ({reference})",
            style(path.display()).cyan()
        ));
    }

    fn on_offset(&mut self, offset: u64) {
        self.say(format!("Using offset {offset}"));
    }

    fn on_shell(&mut self, command: &str) {
        self.say(format!("{} {command}", style("$").dim()));
    }

    fn on_raw_line(&mut self, line: &str) {
        let mut err = io::stderr();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }

    fn on_sectors_read(&mut self, sectors: u64) {
        self.say(format!("{sectors} sectors read"));
    }

    fn on_attempt_failed(&mut self, status: i32) {
        self.say(format!(
            "{} copy attempt exited with status {status}, recovering",
            style("WARNING:").red().bold()
        ));
    }

    fn on_count_unknown(&mut self) {
        self.say(format!(
            "{} transferred sector count unknown, assuming none copied",
            style("WARNING:").red().bold()
        ));
    }

    fn on_zero_fill(&mut self, target: &Path, offset: u64) {
        self.say(format!(
            "Zero-filling sector {offset} on {}",
            style(target.display()).cyan()
        ));
    }

    fn on_complete(&mut self, offset: u64) {
        self.say(format!(
            "\n✨ Copy complete, final offset {}",
            style(offset).green()
        ));
    }
}

/// Prints the one-shot device table for `-L`.
fn list_devices() -> Result<()> {
    let devices = platform::list_block_devices()?;
    if devices.is_empty() {
        println!("No block devices found.");
        return Ok(());
    }

    println!("Found {} block devices:", devices.len());
    println!(
        "\n  {:<14} {:<24} {:<12} {}",
        "DEVICE", "MODEL", "SIZE", "LOCATION"
    );
    println!("  {:-<14} {:-<24} {:-<12} {:-<20}", "", "", "", "");
    for device in &devices {
        let model = if device.model.is_empty() {
            "-"
        } else {
            device.model.as_str()
        };
        let location = if device.mount_point.is_empty() {
            "(Not mounted)"
        } else {
            device.mount_point.as_str()
        };
        println!(
            "  {:<14} {:<24} {:>9.1} GB {}",
            device.path.display(),
            model,
            device.size_gb,
            location
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.llist {
        return list_devices();
    }

    let (Some(source), Some(target)) = (cli.source, cli.target) else {
        // Unreachable through clap, which enforces the positionals unless
        // -L is present, but keep the usage-and-exit-2 contract regardless.
        Cli::command().print_help()?;
        std::process::exit(2);
    };

    let mut state = TransferState::new(cli.offset, cli.limit);
    copy::run(
        &source,
        &target,
        &mut state,
        resolve::resolve,
        &mut DdTransfer,
        &mut ConsoleReporter,
    )
}
