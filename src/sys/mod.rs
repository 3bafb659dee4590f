//! Exposes the lower-level OS primitives needed to look at how a file is laid out on disk: hole
//! seeking, allocation and block size.

use super::*;

pub mod seekhole;

cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::*;
        pub(crate) use std::os::fd::AsRawFd;
        pub(crate) use nix::errno::Errno;
    } else {
        compile_error!("sparse file probing needs SEEK_HOLE and st_blocks, which are unix only");
    }
}

// These are typedefs for 64bit file syscalls.
cfg_if! {
    if #[cfg(not(target_pointer_width = "64"))] {
        pub(crate) use nix::libc::lseek64 as lseek;
    } else {
        pub(crate) use nix::libc::lseek;
    }
}

/// Physical allocation compared to logical size, as observed right after a probe file is made.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub logical: u64,
    pub allocated: u64,
    pub block_size: u64,
}

impl Allocation {
    pub fn of_file(file: &File) -> io::Result<Self> {
        Ok(Self {
            logical: file.metadata()?.len(),
            allocated: file_disk_allocation(file)?,
            block_size: fd_min_hole_size(file)?,
        })
    }

    /// Whether less was allocated than the logical size. A filesystem can zero-fill holes correctly
    /// and still allocate them, so this is informational.
    pub fn is_sparse(&self) -> bool {
        self.allocated < self.logical
    }
}
