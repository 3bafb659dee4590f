use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

use nix::sys::signal::Signal;

use super::*;

/// Subcommand the verifier binary must accept as `<program> verify --size <size> <path>`.
pub const VERIFY_SUBCOMMAND: &str = "verify";

/// Runs the verifier for `path` in a separate process so that it gets its own file descriptor and
/// goes through a fresh page cache lookup, then blocks until it exits. There is no timeout.
pub fn spawn_verifier(program: &Path, path: &Path, size: u64) -> Result<ProbeResult> {
    let mut child = Command::new(program)
        .arg(VERIFY_SUBCOMMAND)
        .arg("--size")
        .arg(size.to_string())
        .arg(path)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_owned(),
            source,
        })?;
    debug!("spawned verifier {:?} with pid {}", program, child.id());
    let status = child.wait().map_err(Error::Wait)?;
    debug!("verifier exited: {}", status);
    Ok(exit_status_result(status))
}

fn exit_status_result(status: ExitStatus) -> ProbeResult {
    if let Some(code) = status.code() {
        return ProbeResult::from_exit_code(code);
    }
    match status.signal().map(Signal::try_from) {
        Some(Ok(signal)) => warn!("verifier killed by {:?}", signal),
        Some(Err(_)) => warn!("verifier killed by unknown signal: {}", status),
        None => warn!("verifier ended abnormally: {}", status),
    }
    ProbeResult::IoError
}
