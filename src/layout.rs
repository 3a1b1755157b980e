//! The fixed byte layout of a state image.
//!
//! Every medium holds the same [`Image`], starting at offset zero. Offsets are
//! never written by hand: the [`SlotTable`] derive turns each field of the
//! `#[repr(C)]` image struct into a [`Slot`] constant, and all reads and writes
//! go through those constants.

use core::ops::Range;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[cfg(feature = "derive")]
pub use lockstate_derive::SlotTable;
#[cfg(not(feature = "derive"))]
use lockstate_derive::SlotTable;

use crate::model::RfidSlot;

/// The value of a byte that has never been written.
///
/// This is the erased state of EEPROM and flash cells. Volatile media are
/// filled with it too, so that a fresh store reads the same everywhere.
pub const SENTINEL: u8 = 0xFF;

/// Width of the PIN digit slot, in characters.
pub const PIN_WIDTH: usize = 4;

/// Width of a single RFID credential, in characters.
pub const RFID_WIDTH: usize = 8;

/// Number of RFID credential slots.
pub const RFID_SLOTS: usize = 3;

/// Number of bytes a medium must provide to hold an [`Image`].
pub const IMAGE_SIZE: usize = size_of::<Image>();

/// A contiguous run of bytes in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Name used in diagnostics.
    pub name: &'static str,
    /// Offset of the first byte.
    pub offset: usize,
    /// Number of bytes.
    pub width: usize,
}

impl Slot {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Offset of the `i`th byte of this slot.
    pub const fn byte(&self, i: usize) -> usize {
        debug_assert!(i < self.width);
        self.offset + i
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.offset + self.width
    }
}

/// A struct whose fields map onto slots of a byte image.
///
/// See the [`SlotTable`](macro@SlotTable) derive macro for an automatic
/// implementation of this trait.
pub trait SlotTable {
    /// Every slot, in field order.
    const SLOTS: &'static [Slot];

    /// Find the slot holding a byte offset.
    fn slot_at(offset: usize) -> Option<&'static Slot> {
        Self::SLOTS.iter().find(|s| s.contains(offset))
    }
}

/// The state image, exactly as laid out on a medium.
///
/// Fields hold raw encoded bytes; see [`crate::codec`] for their meaning.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, SlotTable,
)]
pub struct Image {
    pub door: u8,
    pub pir_state: u8,
    pub pin_state: u8,
    pub otp_state: u8,
    pub rfid_state: u8,
    #[slot("pin_validity")]
    pub pin_valid: u8,
    pub pin: [u8; PIN_WIDTH],
    #[slot("rfid_presence")]
    pub rfid_mask: u8,
    #[slot("rfid_credentials")]
    pub rfid: [[u8; RFID_WIDTH]; RFID_SLOTS],
}

impl Image {
    /// An image in which every byte is [`SENTINEL`].
    pub fn erased() -> Self {
        zerocopy::transmute!([SENTINEL; IMAGE_SIZE])
    }
}

/// Offset of byte `j` of an RFID credential slot.
pub const fn rfid_byte(slot: RfidSlot, j: usize) -> usize {
    debug_assert!(j < RFID_WIDTH);
    Image::RFID.byte(RFID_WIDTH * slot.index() + j)
}
