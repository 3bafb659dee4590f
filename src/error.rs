use thiserror::Error;

use super::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("probe size must be positive")]
    InvalidSize,
    #[error("creating probe file in {dir:?}")]
    Creation { dir: PathBuf, source: io::Error },
    #[error("seeking to offset {offset}")]
    Seek { offset: u64, source: io::Error },
    #[error("failed to write sentinel at offset {offset} ({written} != 1)")]
    ShortWrite { offset: u64, written: usize },
    #[error("writing sentinel at offset {offset}")]
    Write { offset: u64, source: io::Error },
    #[error("syncing probe file")]
    Sync(#[source] io::Error),
    #[error("file has size {actual}, expected {expected}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("opening {path:?}")]
    Open { path: PathBuf, source: io::Error },
    #[error("stat of {path:?}")]
    Stat { path: PathBuf, source: io::Error },
    #[error("failed to read (0 != 1) in position {offset} (size {size})")]
    ShortRead { offset: u64, size: u64 },
    #[error("failed to read in position {offset} (size {size})")]
    Read {
        offset: u64,
        size: u64,
        source: io::Error,
    },
    #[error("read non-zero in position {offset} (size {size}): expected 0x00, got {value:#04x}")]
    Corruption { offset: u64, size: u64, value: u8 },
    #[error("spawning verifier {program:?}")]
    Spawn { program: PathBuf, source: io::Error },
    #[error("waiting for verifier")]
    Wait(#[source] io::Error),
}

impl Error {
    pub fn probe_result(&self) -> ProbeResult {
        use Error::*;
        match self {
            Corruption { .. } => ProbeResult::DataCorruption,
            _ => ProbeResult::IoError,
        }
    }

    /// The file offset the failure was observed at, if there is one.
    pub fn offset(&self) -> Option<u64> {
        use Error::*;
        match self {
            Seek { offset, .. }
            | ShortWrite { offset, .. }
            | Write { offset, .. }
            | ShortRead { offset, .. }
            | Read { offset, .. }
            | Corruption { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
