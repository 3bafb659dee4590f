use std::ffi::c_int;

use libc::{ENXIO, SEEK_DATA, SEEK_HOLE};

use super::*;

type SeekWhence = c_int;

/// Returns None when there is no region of the given type at or after offset.
pub fn seek_hole_whence(
    file: &mut File,
    offset: RegionOffset,
    whence: impl Into<SeekWhence>,
) -> io::Result<Option<RegionOffset>> {
    let offset = offset
        .try_into()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds off_t"))?;
    match lseek(file.as_raw_fd(), offset, whence) {
        Ok(offset) => Ok(Some(offset)),
        Err(errno) if errno == ENXIO => Ok(None),
        Err(errno) => Err(io::Error::from_raw_os_error(errno)),
    }
}

/// Using i64 rather than off_t to enforce 64-bit offsets (the libc wrappers all use type aliases
/// anyway).
fn lseek(fd: c_int, offset: i64, whence: impl Into<SeekWhence>) -> Result<RegionOffset, i32> {
    let new_offset = unsafe { crate::sys::lseek(fd, offset, whence.into()) };
    if new_offset == -1 {
        return Err(Errno::last() as i32);
    }
    Ok(new_offset as RegionOffset)
}

impl From<RegionType> for SeekWhence {
    fn from(value: RegionType) -> Self {
        match value {
            Hole => SEEK_HOLE,
            Data => SEEK_DATA,
        }
    }
}
