//! Encoding of domain values to and from image bytes.
//!
//! All knowledge of the [`SENTINEL`] lives here and in [`crate::layout`]: every
//! byte value decodes to some domain value, so reads cannot fail on content.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;

use crate::{
    layout::{PIN_WIDTH, RFID_WIDTH, SENTINEL},
    model::{Factor, FactorState, RfidSlot, RfidTag},
};

const CLOSED: u8 = 0x00;
const OPEN: u8 = 0x01;
const INACTIVE: u8 = 0x02;

/// Tag bits of a PIN validity byte carrying the stored length.
const PIN_LENGTH_TAG: u8 = 0x80;
const PIN_LENGTH_MASK: u8 = 0x07;

pub fn encode_door(is_open: bool) -> u8 {
    if is_open { OPEN } else { CLOSED }
}

/// Decode the door byte. Anything but the open encoding is closed.
pub fn decode_door(b: u8) -> bool {
    b == OPEN
}

pub fn encode_factor(state: FactorState) -> u8 {
    match state {
        FactorState::Closed => CLOSED,
        FactorState::Open => OPEN,
        FactorState::Inactive => INACTIVE,
    }
}

/// Decode a tri-state byte.
///
/// Returns the undecoded byte if it is not one of the three encodings; see
/// [`resolve_factor`].
pub fn decode_factor(b: u8) -> Either<FactorState, u8> {
    match b {
        CLOSED => Left(FactorState::Closed),
        OPEN => Left(FactorState::Open),
        INACTIVE => Left(FactorState::Inactive),
        _ => Right(b),
    }
}

/// Resolve a byte that [`decode_factor`] could not decode.
///
/// A [`SENTINEL`] byte has never been written and takes the factor's default.
/// Any other byte is corrupt and resolves to `on_corrupt`.
pub fn resolve_factor(factor: Factor, b: u8, on_corrupt: FactorState) -> FactorState {
    if b == SENTINEL {
        factor.default_state()
    } else {
        on_corrupt
    }
}

/// Encode the PIN validity byte for a PIN of `len` characters.
pub fn encode_pin_validity(len: usize) -> u8 {
    debug_assert!(len <= PIN_WIDTH);
    PIN_LENGTH_TAG | (len as u8 & PIN_LENGTH_MASK)
}

/// A decoded PIN validity byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinValidity {
    /// No PIN has been configured.
    Unset,
    /// A PIN is configured. The length is known if the byte carries it.
    Set(Option<usize>),
}

pub fn decode_pin_validity(b: u8) -> PinValidity {
    if b == SENTINEL {
        return PinValidity::Unset;
    }

    let len = (b & PIN_LENGTH_MASK) as usize;
    if b & !PIN_LENGTH_MASK == PIN_LENGTH_TAG && len <= PIN_WIDTH {
        PinValidity::Set(Some(len))
    } else {
        // Written by firmware that did not record a length.
        PinValidity::Set(None)
    }
}

bitfield! {
    struct PresenceMask(u8) {
        [0] slot0,
        [1] slot1,
        [2] slot2,
    }
}

/// Mask of the bits a presence byte may carry.
const PRESENCE_BITS: u8 = 0b111;

/// The RFID presence mask, indexed by slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence(u8);

impl Presence {
    pub fn is_set(&self, slot: RfidSlot) -> bool {
        let mask = PresenceMask(self.0);
        match slot {
            RfidSlot::Slot0 => mask.slot0(),
            RfidSlot::Slot1 => mask.slot1(),
            RfidSlot::Slot2 => mask.slot2(),
        }
    }

    pub fn set(&mut self, slot: RfidSlot, value: bool) {
        let mut mask = PresenceMask(self.0);
        match slot {
            RfidSlot::Slot0 => mask.set_slot0(value),
            RfidSlot::Slot1 => mask.set_slot1(value),
            RfidSlot::Slot2 => mask.set_slot2(value),
        }
        self.0 = mask.0;
    }
}

/// Decode the presence byte. An erased byte marks no slots.
pub fn decode_presence(b: u8) -> Presence {
    if b == SENTINEL {
        Presence::default()
    } else {
        Presence(b & PRESENCE_BITS)
    }
}

pub fn encode_presence(p: Presence) -> u8 {
    p.0 & PRESENCE_BITS
}

/// Whether `data` may be stored as a present credential.
///
/// It must be exactly [`RFID_WIDTH`] characters, none of them the sentinel.
pub fn is_well_formed_credential(data: &[u8]) -> bool {
    data.len() == RFID_WIDTH && !data.contains(&SENTINEL)
}

/// Decode the raw bytes of a slot whose presence bit is set.
pub fn decode_credential(raw: [u8; RFID_WIDTH]) -> Option<RfidTag> {
    is_well_formed_credential(&raw).then(|| RfidTag::new(raw))
}
