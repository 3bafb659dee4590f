use tempfile::NamedTempFile;

use super::*;

/// A freshly created file whose only written byte is the last one. Dropping it removes the file,
/// so callers that want it left behind must call [ProbeFile::keep].
#[derive(Debug)]
pub struct ProbeFile {
    temp_file: NamedTempFile,
    size: u64,
}

impl ProbeFile {
    pub fn path(&self) -> &Path {
        self.temp_file.path()
    }

    /// Logical size the file was extended to.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn as_file(&self) -> &File {
        self.temp_file.as_file()
    }

    /// Leaves the file on disk and returns where it is.
    pub fn keep(self) -> io::Result<PathBuf> {
        let (_file, path) = self.temp_file.keep().map_err(|err| err.error)?;
        Ok(path)
    }

    pub fn remove(self) -> io::Result<()> {
        self.temp_file.close()
    }
}

/// Creates a uniquely named file in `dir` with a hole covering `[0, size - 1)` by seeking past
/// the end and writing [SENTINEL] at `size - 1`. The file is synced before returning.
pub fn create_hole(dir: &Path, size: u64) -> Result<ProbeFile> {
    if size == 0 {
        return Err(Error::InvalidSize);
    }
    let mut temp_file = tempfile::Builder::new()
        .prefix(PROBE_FILE_PREFIX)
        .rand_bytes(6)
        .tempfile_in(dir)
        .map_err(|source| Error::Creation {
            dir: dir.to_owned(),
            source,
        })?;
    let path = temp_file.path().to_owned();
    let offset = size - 1;
    let file = temp_file.as_file_mut();
    // The file is new, so seeking from the current offset is the same as seeking from the start.
    let relative: i64 = offset.try_into().map_err(|_| Error::Seek {
        offset,
        source: io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds off_t"),
    })?;
    let new_offset = file
        .seek(Current(relative))
        .map_err(|source| Error::Seek { offset, source })?;
    if new_offset != offset {
        return Err(Error::Seek {
            offset,
            source: io::Error::new(
                io::ErrorKind::Other,
                format!("seek landed at {new_offset}"),
            ),
        });
    }
    // Not write_all: a partial write is a finding, not something to paper over.
    let written = file
        .write(&[SENTINEL])
        .map_err(|source| Error::Write { offset, source })?;
    if written != 1 {
        return Err(Error::ShortWrite { offset, written });
    }
    file.sync_all().map_err(Error::Sync)?;
    let actual = file
        .metadata()
        .map_err(|source| Error::Stat { path: path.clone(), source })?
        .len();
    if actual != size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual,
        });
    }
    debug!("created hole of {} bytes in {:?}", offset, path);
    Ok(ProbeFile { temp_file, size })
}
