use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use bytesize::ByteSize;
use log::info;

use sparseness_probe::sys::{file_disk_allocation, seekhole::hole_bytes};
use sparseness_probe::*;

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a file with a hole and check it reads back as zeroes from a separate process. This
    /// is the default.
    Run(RunArgs),
    /// Check an existing probe file in this process.
    Verify {
        /// Expected logical size of the file in bytes.
        #[arg(long)]
        size: u64,
        path: PathBuf,
    },
    // ( ͡° ͜ʖ ͡°)
    ShowHoles { files: Vec<PathBuf> },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory to create the probe file in. Selects the filesystem under test.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Probe size in 512 byte blocks.
    #[arg(long, default_value_t = DEFAULT_BLOCKS, conflicts_with = "size")]
    blocks: u64,
    /// Probe size in bytes, like 4MiB.
    #[arg(long)]
    size: Option<ByteSize>,
    #[arg(long, value_enum, default_value_t = Cleanup::Never)]
    cleanup: Cleanup,
}

impl RunArgs {
    fn probe_size(&self) -> anyhow::Result<u64> {
        match self.size {
            Some(size) => Ok(size.as_u64()),
            None => self
                .blocks
                .checked_mul(BLOCK_SIZE)
                .context("block count overflows file size"),
        }
    }
}

#[derive(clap::Parser)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli: Cli = clap::Parser::parse();
    match run(cli) {
        Ok(result) => ExitCode::from(result.exit_code()),
        Err(err) => {
            eprintln!("{:#}", err);
            let result = err
                .downcast_ref::<Error>()
                .map_or(ProbeResult::IoError, Error::probe_result);
            ExitCode::from(result.exit_code())
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ProbeResult> {
    use Commands::*;
    match cli.command.unwrap_or(Run(cli.run)) {
        Run(args) => {
            let verifier = std::env::current_exe().context("locating verifier executable")?;
            let config = ProbeConfig {
                dir: args.dir.clone(),
                size: args.probe_size()?,
                cleanup: args.cleanup,
                verifier,
            };
            let result = run_probe(&config)
                .with_context(|| format!("probing sparse files in {:?}", config.dir))?;
            info!("probe result: {:?}", result);
            Ok(result)
        }
        Verify { size, path } => {
            verify_zero_region(&path, size).with_context(|| format!("verifying {:?}", path))?;
            Ok(ProbeResult::Success)
        }
        ShowHoles { files: paths } => {
            for path in paths {
                let mut file = OpenOptions::new()
                    .read(true)
                    .open(&path)
                    .with_context(|| format!("opening {:?}", path))?;
                let regions = file_regions(&mut file)?;
                for region in &regions {
                    println!("{}: {}", path.display(), region);
                }
                println!(
                    "{}: {} holes, {} allocated",
                    path.display(),
                    ByteSize(hole_bytes(&regions)),
                    ByteSize(file_disk_allocation(&file)?)
                );
            }
            Ok(ProbeResult::Success)
        }
    }
}
