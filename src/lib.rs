//! Checks whether a filesystem honours sparse file semantics: a file with a hole must report its
//! full logical size, and every byte in the hole must read back as zero.

use std::fs::File;
use std::io;
use std::io::SeekFrom::Current;
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use cfg_if::cfg_if;
use log::{debug, info, warn};

mod error;
mod hole;
mod macros;
mod probe;
pub mod sys;
mod verify;
mod worker;

pub use error::Error;
pub use hole::{create_hole, ProbeFile};
pub use probe::{run_probe, Cleanup, ProbeConfig};
pub use sys::seekhole::{file_regions, Region, RegionType};
pub use verify::{scan_zero_region, verify_zero_region};
pub use worker::{spawn_verifier, VERIFY_SUBCOMMAND};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unit of the historic block count. Holes are counted in these, not in filesystem blocks.
pub const BLOCK_SIZE: u64 = 512;

/// 1Mi blocks, giving a 512 MiB probe file.
pub const DEFAULT_BLOCKS: u64 = 1024 * 1024;

pub const DEFAULT_PROBE_SIZE: u64 = DEFAULT_BLOCKS * BLOCK_SIZE;

/// The only byte the probe ever writes, at offset `size - 1`.
pub const SENTINEL: u8 = b'X';

pub const PROBE_FILE_PREFIX: &str = "zero-file-";

/// Outcome of a probe, as seen by whoever runs it. Doubles as the process exit code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Success,
    IoError,
    DataCorruption,
}

impl ProbeResult {
    pub fn exit_code(self) -> u8 {
        match self {
            ProbeResult::Success => 0,
            ProbeResult::IoError => 1,
            ProbeResult::DataCorruption => 2,
        }
    }

    /// Interprets the exit code of a verifier process. Anything unrecognized is an I/O failure,
    /// since the child didn't get far enough to say otherwise.
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => ProbeResult::Success,
            2 => ProbeResult::DataCorruption,
            _ => ProbeResult::IoError,
        }
    }

    pub fn is_success(self) -> bool {
        self == ProbeResult::Success
    }
}

impl<T> From<&Result<T>> for ProbeResult {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => ProbeResult::Success,
            Err(err) => err.probe_result(),
        }
    }
}
