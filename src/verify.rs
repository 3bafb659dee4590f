use super::*;

/// Large enough that the scan isn't dominated by syscalls, small enough not to matter.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Reads `[0, size - 1)` from `reader` one byte at a time, failing on the first byte that isn't
/// zero or the first read that doesn't yield exactly one byte. `on_progress` is called with the
/// offset at every hundredth of `size`. Returns the number of bytes checked.
pub fn scan_zero_region(
    mut reader: impl Read,
    size: u64,
    mut on_progress: impl FnMut(u64),
) -> Result<u64> {
    let end = size.saturating_sub(1);
    let progress_interval = (size / 100).max(1);
    let mut buf = [0; 1];
    for offset in 0..end {
        let n = reader
            .read(&mut buf)
            .map_err(|source| Error::Read {
                offset,
                size,
                source,
            })?;
        if n != 1 {
            return Err(Error::ShortRead { offset, size });
        }
        if buf[0] != 0 {
            return Err(Error::Corruption {
                offset,
                size,
                value: buf[0],
            });
        }
        if offset % progress_interval == 0 {
            on_progress(offset);
        }
    }
    Ok(end)
}

/// Opens `path` independently of whoever wrote it, checks it is `size` bytes long, and checks that
/// everything before the sentinel reads as zero. Progress goes to stdout.
pub fn verify_zero_region(path: &Path, size: u64) -> Result<u64> {
    if size == 0 {
        return Err(Error::InvalidSize);
    }
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })?;
    let actual = file
        .metadata()
        .map_err(|source| Error::Stat {
            path: path.to_owned(),
            source,
        })?
        .len();
    println!(
        "child process opened file {} of size {}",
        path.display(),
        actual
    );
    if actual != size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual,
        });
    }
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let checked = crate::log_rate!(
        "scanned zero region",
        size - 1,
        scan_zero_region(reader, size, |offset| {
            println!(
                "checked {} bytes, {:.2}%",
                offset,
                offset as f64 / size as f64 * 100.0
            )
        })
    )?;
    info!("{} bytes before the sentinel in {:?} are zero", checked, path);
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Cursor;
    use std::io::SeekFrom::Start;

    use tempfile::tempdir;
    use test_log::test;

    use super::*;

    /// Yields `available` zero bytes and then reports end of file.
    struct TruncatedReader {
        available: u64,
    }

    impl Read for TruncatedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.available == 0 || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = 0;
            self.available -= 1;
            Ok(1)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device went away"))
        }
    }

    #[test]
    fn one_block() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let probe_file = create_hole(dir.path(), BLOCK_SIZE)?;
        let result = verify_zero_region(probe_file.path(), BLOCK_SIZE);
        assert_eq!(ProbeResult::from(&result), ProbeResult::Success);
        assert_eq!(result?, 511);
        Ok(())
    }

    #[test]
    fn single_byte_checks_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let probe_file = create_hole(dir.path(), 1)?;
        assert_eq!(verify_zero_region(probe_file.path(), 1)?, 0);
        Ok(())
    }

    #[test]
    fn non_zero_byte_in_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let probe_file = create_hole(dir.path(), 4096)?;
        {
            let mut file = OpenOptions::new().write(true).open(probe_file.path())?;
            file.seek(Start(1000))?;
            file.write_all(&[0xab, 0xcd])?;
        }
        let result = verify_zero_region(probe_file.path(), 4096);
        assert_eq!(ProbeResult::from(&result), ProbeResult::DataCorruption);
        match result.unwrap_err() {
            Error::Corruption {
                offset,
                size,
                value,
            } => {
                assert_eq!(offset, 1000);
                assert_eq!(size, 4096);
                assert_eq!(value, 0xab);
            }
            err => panic!("unexpected error: {err}"),
        }
        Ok(())
    }

    #[test]
    fn first_non_zero_offset_reported() {
        let mut contents = vec![0; 512];
        contents[17] = b'?';
        contents[300] = b'!';
        let err = scan_zero_region(Cursor::new(contents), 512, |_| {}).unwrap_err();
        assert_eq!(err.offset(), Some(17));
        assert_eq!(err.probe_result(), ProbeResult::DataCorruption);
    }

    #[test]
    fn short_read_is_io_error() {
        let err = scan_zero_region(TruncatedReader { available: 100 }, 512, |_| {}).unwrap_err();
        assert!(matches!(err, Error::ShortRead { offset: 100, size: 512 }), "{err}");
        assert_eq!(err.probe_result(), ProbeResult::IoError);
    }

    #[test]
    fn read_error_carries_offset() {
        let err = scan_zero_region(FailingReader, 512, |_| {}).unwrap_err();
        assert!(matches!(err, Error::Read { offset: 0, .. }), "{err}");
        assert_eq!(err.probe_result(), ProbeResult::IoError);
    }

    #[test]
    fn sentinel_is_not_checked() -> anyhow::Result<()> {
        let mut contents = vec![0; 64];
        contents[63] = SENTINEL;
        assert_eq!(scan_zero_region(Cursor::new(contents), 64, |_| {})?, 63);
        Ok(())
    }

    #[test]
    fn progress_every_hundredth() -> anyhow::Result<()> {
        let mut offsets = vec![];
        scan_zero_region(io::repeat(0), 1000, |offset| offsets.push(offset))?;
        assert_eq!(offsets.len(), 100);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], 10);
        assert_eq!(offsets.last(), Some(&990));
        // Sizes below 100 report every byte rather than dividing by zero.
        let mut calls = 0;
        scan_zero_region(io::repeat(0), 10, |_| calls += 1)?;
        assert_eq!(calls, 9);
        Ok(())
    }

    #[test]
    fn size_mismatch() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let probe_file = create_hole(dir.path(), 512)?;
        let err = verify_zero_region(probe_file.path(), 1024).unwrap_err();
        assert!(
            matches!(
                err,
                Error::SizeMismatch {
                    expected: 1024,
                    actual: 512
                }
            ),
            "{err}"
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_open_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let err = verify_zero_region(&dir.path().join("missing"), 512).unwrap_err();
        assert!(matches!(err, Error::Open { .. }), "{err}");
        assert_eq!(err.probe_result(), ProbeResult::IoError);
        Ok(())
    }
}
