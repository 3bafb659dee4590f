use std::os::unix::fs::MetadataExt;

use super::*;

/// st_blocks is always in 512 byte units, regardless of st_blksize.
const ST_BLOCKS_UNIT: u64 = 512;

pub fn file_disk_allocation(file: &File) -> io::Result<u64> {
    Ok(file.metadata()?.blocks() * ST_BLOCKS_UNIT)
}

pub fn path_disk_allocation(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.blocks() * ST_BLOCKS_UNIT)
}

/// Preferred I/O block size, which is the smallest hole most filesystems will leave unallocated.
/// fpathconf(_PC_MIN_HOLE_SIZE) isn't reliable outside of macOS and the BSDs.
pub fn fd_min_hole_size(file: &File) -> io::Result<u64> {
    Ok(file.metadata()?.blksize())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use test_log::test;

    use super::*;

    #[test]
    fn allocation_of_hole() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let probe_file = create_hole(dir.path(), 1 << 20)?;
        let allocation = Allocation::of_file(probe_file.as_file())?;
        assert_eq!(allocation.logical, 1 << 20);
        assert!(allocation.block_size > 0);
        assert_eq!(
            allocation.allocated,
            path_disk_allocation(probe_file.path())?
        );
        // Not asserting sparseness: tmpfs and friends are free to allocate the whole thing.
        debug!("{:?}, sparse: {}", allocation, allocation.is_sparse());
        Ok(())
    }
}
