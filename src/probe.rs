use bytesize::ByteSize;

use super::*;
use crate::sys::seekhole::{hole_bytes, Regions};
use crate::sys::Allocation;

/// What to do with the probe file once the verifier is done with it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Cleanup {
    /// Leave the file behind for inspection.
    #[default]
    Never,
    /// Remove the file only if the probe passed.
    OnSuccess,
    Always,
}

impl Cleanup {
    pub fn should_remove(self, result: Option<ProbeResult>) -> bool {
        match self {
            Cleanup::Never => false,
            Cleanup::OnSuccess => result.is_some_and(ProbeResult::is_success),
            Cleanup::Always => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Where the probe file is created. Determines which filesystem is tested.
    pub dir: PathBuf,
    pub size: u64,
    pub cleanup: Cleanup,
    /// Program run as the verifier process. Normally the current executable.
    pub verifier: PathBuf,
}

impl ProbeConfig {
    pub fn new(verifier: PathBuf) -> Self {
        Self {
            dir: PathBuf::from("."),
            size: DEFAULT_PROBE_SIZE,
            cleanup: Cleanup::default(),
            verifier,
        }
    }
}

/// Creates a probe file, verifies it from a separate process, and applies the cleanup policy.
/// Errors are failures to set up or run the verifier; what the verifier found is in the
/// [ProbeResult].
pub fn run_probe(config: &ProbeConfig) -> Result<ProbeResult> {
    let probe_file = create_hole(&config.dir, config.size)?;
    info!(
        "created probe file {:?} of size {} ({})",
        probe_file.path(),
        config.size,
        ByteSize(config.size)
    );
    log_layout(&probe_file);
    let result = spawn_verifier(&config.verifier, probe_file.path(), config.size);
    let outcome = result.as_ref().ok().copied();
    finish(probe_file, config.cleanup.should_remove(outcome));
    result
}

fn log_layout(probe_file: &ProbeFile) {
    match Allocation::of_file(probe_file.as_file()) {
        Ok(allocation) if allocation.is_sparse() => info!(
            "{} of {} allocated (block size {})",
            ByteSize(allocation.allocated),
            ByteSize(allocation.logical),
            allocation.block_size
        ),
        Ok(allocation) => warn!(
            "probe file isn't sparse: {} of {} allocated",
            ByteSize(allocation.allocated),
            ByteSize(allocation.logical)
        ),
        Err(err) => warn!("getting probe file allocation: {}", err),
    }
    // Only the probe's own extent is of interest, whatever the file is doing now.
    let regions = File::open(probe_file.path()).and_then(|mut file| {
        Regions::new(&mut file, probe_file.size()).collect::<io::Result<Vec<_>>>()
    });
    match regions {
        Ok(regions) => {
            for region in &regions {
                debug!("{}", region);
            }
            info!("filesystem reports {} hole bytes", hole_bytes(&regions));
        }
        Err(err) => warn!("seeking probe file holes: {}", err),
    }
}

fn finish(probe_file: ProbeFile, remove: bool) {
    let path = probe_file.path().to_owned();
    if remove {
        match probe_file.remove() {
            Ok(()) => debug!("removed {:?}", path),
            Err(err) => warn!("removing {:?}: {}", path, err),
        }
    } else {
        match probe_file.keep() {
            Ok(path) => info!("left probe file at {:?}", path),
            Err(err) => warn!("keeping {:?}: {}", path, err),
        }
    }
}
