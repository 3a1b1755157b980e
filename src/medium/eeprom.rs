//! Non-volatile medium over `embedded-storage`.

use embedded_storage::{ReadStorage, Storage};

use super::Medium;

/// A medium backed by byte-addressable non-volatile storage.
///
/// Any [`Storage`] implementation works: a HAL's EEPROM driver, or a NOR flash
/// wrapped in [`embedded_storage::nor_flash::RmwNorFlashStorage`]. Content
/// survives power loss; erased cells read as
/// [`SENTINEL`](crate::layout::SENTINEL).
#[derive(Debug)]
pub struct Eeprom<S> {
    storage: S,
}

impl<S: Storage> Eeprom<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: Storage> Medium for Eeprom<S> {
    type Error = S::Error;

    fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    fn read(&mut self, offset: usize) -> Result<u8, Self::Error> {
        let mut buf = [0; 1];
        ReadStorage::read(&mut self.storage, offset as u32, &mut buf)?;
        Ok(buf[0])
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error> {
        Storage::write(&mut self.storage, offset as u32, &[value])
    }
}
