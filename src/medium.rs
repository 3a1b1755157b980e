//! Byte-addressed storage underneath a store.
//!
//! A [`Medium`] is a flat address space of bytes starting at offset zero. The
//! store never asks for more than [`IMAGE_SIZE`](crate::layout::IMAGE_SIZE)
//! bytes, but media may be larger.
//!
//! Three adapters are provided:
//!
//! - [`Ram`]: volatile memory, lost when dropped. It starts filled with the
//! sentinel, like freshly erased non-volatile memory.
//! - [`Eeprom`]: any byte-addressable non-volatile storage implementing
//! [`embedded_storage::Storage`].
//! - [`FileImage`]: a fixed-size image file on a hosted platform.
//! _Requires Cargo feature `std`._

pub mod eeprom;
#[cfg(feature = "std")]
pub mod file;
pub mod ram;

pub use eeprom::Eeprom;
#[cfg(feature = "std")]
pub use file::FileImage;
pub use ram::Ram;

/// Byte-at-a-time access to a fixed address space.
pub trait Medium {
    /// An error from the underlying storage.
    type Error;

    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read the byte at an offset.
    fn read(&mut self, offset: usize) -> Result<u8, Self::Error>;

    /// Write the byte at an offset.
    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error>;
}

impl<M: Medium + ?Sized> Medium for &mut M {
    type Error = M::Error;

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, offset: usize) -> Result<u8, Self::Error> {
        (**self).read(offset)
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error> {
        (**self).write(offset, value)
    }
}
