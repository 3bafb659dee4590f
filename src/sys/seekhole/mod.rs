//! Walks the hole and data regions of a file with SEEK_HOLE and SEEK_DATA ( ͡° ͜ʖ ͡°).

use std::fmt;

pub use RegionType::*;

use super::*;

mod unix;
pub use self::unix::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegionType {
    Hole,
    Data,
}

impl std::ops::Not for RegionType {
    type Output = RegionType;

    fn not(self) -> Self::Output {
        match self {
            Hole => Data,
            Data => Hole,
        }
    }
}

pub type RegionOffset = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub region_type: RegionType,
    pub start: RegionOffset,
    pub end: RegionOffset,
}

impl Region {
    pub fn length(&self) -> RegionOffset {
        self.end - self.start
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}, {}-{} (length {})",
            self.region_type,
            self.start,
            self.end,
            self.length()
        )
    }
}

/// Regions of the whole file, as long as it currently is.
pub fn file_regions(file: &mut File) -> io::Result<Vec<Region>> {
    let len = file.metadata()?.len();
    Regions::new(file, len).collect()
}

/// Total bytes the filesystem reports as holes.
pub fn hole_bytes<'a>(regions: impl IntoIterator<Item = &'a Region>) -> u64 {
    regions
        .into_iter()
        .filter(|region| region.region_type == Hole)
        .map(Region::length)
        .sum()
}

/// Walks `[0, len)` of a file one region at a time. Each step asks where the next data starts; if
/// that's the current offset we're in data and SEEK_HOLE finds where it ends. Offsets past `len`
/// are clamped, so a file that grows while being walked doesn't extend the walk.
pub struct Regions<'a> {
    file: &'a mut File,
    offset: RegionOffset,
    len: RegionOffset,
}

impl<'a> Regions<'a> {
    pub fn new(file: &'a mut File, len: RegionOffset) -> Self {
        Self {
            file,
            offset: 0,
            len,
        }
    }

    /// ENXIO from either whence means there's nothing of that type before the end.
    fn seek_clamped(&mut self, whence: RegionType) -> io::Result<RegionOffset> {
        let found = seek_hole_whence(self.file, self.offset, whence)?;
        Ok(found.map_or(self.len, |offset| offset.min(self.len)))
    }

    fn next_region(&mut self) -> io::Result<Region> {
        let data_start = self.seek_clamped(Data)?;
        let (region_type, end) = if data_start > self.offset {
            (Hole, data_start)
        } else {
            (Data, self.seek_clamped(Hole)?)
        };
        if end <= self.offset {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SEEK_HOLE didn't advance past data at {}", self.offset),
            ));
        }
        let region = Region {
            region_type,
            start: self.offset,
            end,
        };
        self.offset = end;
        Ok(region)
    }
}

impl Iterator for Regions<'_> {
    type Item = io::Result<Region>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.len {
            return None;
        }
        let region = self.next_region();
        if region.is_err() {
            // Don't spin on a file the filesystem can't describe.
            self.offset = self.len;
        }
        Some(region)
    }
}
