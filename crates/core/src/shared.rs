//! File-backed shared memory region holding exactly one clock value.
//!
//! The scheduler creates the region and is its only writer; workers open the
//! same path and read it. Read-only access for workers is a convention, not
//! enforced by the mapping.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use memmap2::MmapMut;
use tracing::debug;

use crate::clock::{ClockSink, ClockSource, VirtualClock};
use crate::error::{OssError, Result};

/// Environment variable through which the scheduler tells workers where the
/// clock region lives.
pub const REGION_ENV: &str = "OSS_CLOCK_REGION";

const REGION_LEN: usize = std::mem::size_of::<AtomicU64>();

pub struct ClockRegion {
    path: PathBuf,
    map: MmapMut,
    owner: bool,
    released: bool,
}

impl ClockRegion {
    /// Create (or truncate) the region at `path` and zero the clock.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let acquire = |source: std::io::Error| OssError::ResourceAcquisition {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(acquire)?;
        file.set_len(REGION_LEN as u64).map_err(acquire)?;
        let map = unsafe { MmapMut::map_mut(&file) }.map_err(acquire)?;

        let region = Self {
            path,
            map,
            owner: true,
            released: false,
        };
        region.publish(VirtualClock::ZERO);
        debug!(path = %region.path.display(), "created clock region");
        Ok(region)
    }

    /// Attach to a region previously created by the scheduler.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let acquire = |source: std::io::Error| OssError::ResourceAcquisition {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(acquire)?;
        let len = file.metadata().map_err(acquire)?.len();
        if len < REGION_LEN as u64 {
            return Err(acquire(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("region is {len} bytes, expected {REGION_LEN}"),
            )));
        }
        let map = unsafe { MmapMut::map_mut(&file) }.map_err(acquire)?;

        Ok(Self {
            path,
            map,
            owner: false,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cell(&self) -> &AtomicU64 {
        // SAFETY: the mapping is page-aligned, at least REGION_LEN bytes, and
        // lives as long as `self`. All access to those bytes goes through this
        // atomic, in this process and in every other process mapping the file.
        unsafe { &*(self.map.as_ptr() as *const AtomicU64) }
    }

    /// Unmap the region and, if this handle created it, remove the backing file.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        if !self.owner {
            return Ok(());
        }
        fs::remove_file(&self.path).map_err(|source| OssError::ResourceRelease {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "removed clock region");
        Ok(())
    }
}

impl ClockSource for ClockRegion {
    fn now(&self) -> VirtualClock {
        VirtualClock::from_nanos(self.cell().load(Ordering::Acquire))
    }
}

impl ClockSink for ClockRegion {
    fn publish(&self, clock: VirtualClock) {
        self.cell().store(clock.as_nanos(), Ordering::Release);
    }
}

impl Drop for ClockRegion {
    fn drop(&mut self) {
        if self.owner && !self.released {
            let _ = fs::remove_file(&self.path);
        }
    }
}
