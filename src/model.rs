//! Domain values reported and accepted by the store.

use core::fmt;

use crate::layout::{RFID_SLOTS, RFID_WIDTH};

/// An authentication or sensing input gating the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    /// Passive infrared motion sensor.
    Pir,
    Pin,
    /// One-time password.
    Otp,
    Rfid,
}

impl Factor {
    pub const ALL: [Factor; 4] = [Factor::Pir, Factor::Pin, Factor::Otp, Factor::Rfid];

    /// State reported for a factor whose slot has never been written.
    pub const fn default_state(self) -> FactorState {
        match self {
            Factor::Pir | Factor::Pin | Factor::Otp => FactorState::Closed,
            Factor::Rfid => FactorState::Inactive,
        }
    }
}

/// The state of a single factor.
///
/// `Closed` and `Open` apply to a factor taking part in the current policy;
/// `Inactive` removes the factor from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorState {
    Closed,
    Open,
    Inactive,
}

/// The states of every factor, read in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorStates {
    pub pir: FactorState,
    pub pin: FactorState,
    pub otp: FactorState,
    pub rfid: FactorState,
}

impl FactorStates {
    pub fn get(&self, factor: Factor) -> FactorState {
        match factor {
            Factor::Pir => self.pir,
            Factor::Pin => self.pin,
            Factor::Otp => self.otp,
            Factor::Rfid => self.rfid,
        }
    }

    /// Iterate over factors that are part of the current policy.
    pub fn active(&self) -> impl Iterator<Item = (Factor, FactorState)> + '_ {
        Factor::ALL
            .into_iter()
            .map(|f| (f, self.get(f)))
            .filter(|(_, s)| *s != FactorState::Inactive)
    }
}

/// One of the three RFID credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RfidSlot {
    Slot0,
    Slot1,
    Slot2,
}

impl RfidSlot {
    pub const ALL: [RfidSlot; RFID_SLOTS] = [RfidSlot::Slot0, RfidSlot::Slot1, RfidSlot::Slot2];

    /// Look up a slot by index, if in range.
    pub const fn new(index: u8) -> Option<Self> {
        match index {
            0 => Some(RfidSlot::Slot0),
            1 => Some(RfidSlot::Slot1),
            2 => Some(RfidSlot::Slot2),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A complete RFID credential.
///
/// Credentials are stored as raw characters, exactly [`RFID_WIDTH`] of them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfidTag([u8; RFID_WIDTH]);

impl RfidTag {
    pub const fn new(bytes: [u8; RFID_WIDTH]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; RFID_WIDTH] {
        &self.0
    }

    /// The credential as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }
}

impl From<[u8; RFID_WIDTH]> for RfidTag {
    fn from(bytes: [u8; RFID_WIDTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for RfidTag {
    type Error = core::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.try_into()?))
    }
}

impl TryFrom<&str> for RfidTag {
    type Error = core::array::TryFromSliceError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.as_bytes().try_into()
    }
}

impl AsRef<[u8]> for RfidTag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<&str> for RfidTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl fmt::Debug for RfidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "RfidTag({s:?})"),
            None => write!(f, "RfidTag({:02x?})", self.0),
        }
    }
}

/// The contents of every RFID slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RfidSlots(pub [Option<RfidTag>; RFID_SLOTS]);

impl RfidSlots {
    pub fn get(&self, slot: RfidSlot) -> Option<&RfidTag> {
        self.0[slot.index()].as_ref()
    }

    /// Iterate over present credentials.
    pub fn iter(&self) -> impl Iterator<Item = (RfidSlot, &RfidTag)> + '_ {
        RfidSlot::ALL
            .into_iter()
            .filter_map(|s| self.get(s).map(|t| (s, t)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}
