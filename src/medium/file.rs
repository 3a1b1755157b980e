//! Image-file medium.
//!
//! _Requires Cargo feature `std`._

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
};

use tracing::debug;

use crate::layout::{IMAGE_SIZE, SENTINEL};

use super::Medium;

/// A medium backed by a fixed-size file.
///
/// Every write is synced before returning, so the image survives the process
/// and the host. A new or short file is extended with
/// [`SENTINEL`] bytes up to the requested capacity.
#[derive(Debug)]
pub struct FileImage {
    file: File,
    capacity: usize,
}

impl FileImage {
    /// Open an image file of [`IMAGE_SIZE`] bytes, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_capacity(path, IMAGE_SIZE)
    }

    /// Open an image file of `capacity` bytes, creating it if needed.
    ///
    /// Existing content is kept. A longer file is not truncated, but only the
    /// first `capacity` bytes are addressable.
    pub fn open_with_capacity(path: impl AsRef<Path>, capacity: usize) -> io::Result<Self> {
        let path = path.as_ref();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len() as usize;
        if len < capacity {
            debug!(path = %path.display(), len, capacity, "extending image file");

            file.seek(SeekFrom::Start(len as u64))?;
            file.write_all(&std::vec![SENTINEL; capacity - len])?;
            file.sync_all()?;
        }

        Ok(Self { file, capacity })
    }

    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Medium for FileImage {
    type Error = io::Error;

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, offset: usize) -> Result<u8, Self::Error> {
        let mut buf = [0; 1];
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(&[value])?;
        self.file.sync_data()
    }
}
