//! Volatile in-process medium.

use core::convert::Infallible;

use crate::layout::{IMAGE_SIZE, SENTINEL};

use super::Medium;

/// A medium held in memory, lost when dropped.
///
/// Bytes start as [`SENTINEL`], so a new `Ram` reads exactly like erased
/// non-volatile memory. Reads past the end return the sentinel and writes
/// past the end are dropped.
#[derive(Debug, Clone)]
pub struct Ram<const N: usize = IMAGE_SIZE> {
    bytes: [u8; N],
}

impl<const N: usize> Ram<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [SENTINEL; N],
        }
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for Ram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Medium for Ram<N> {
    type Error = Infallible;

    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize) -> Result<u8, Self::Error> {
        Ok(self.bytes.get(offset).copied().unwrap_or(SENTINEL))
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error> {
        if let Some(b) = self.bytes.get_mut(offset) {
            *b = value;
        }
        Ok(())
    }
}
