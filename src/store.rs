//! The state store contract.
//!
//! [`StateStore`] owns a [`Medium`] and exposes the lock state in domain terms.
//! Each operation is a short, bounded sequence of byte reads and writes; there
//! is no caching, so the medium is always the source of truth.
//!
//! # Example
//!
//! ```
//! use lockstate::{Factor, FactorState, StateStore, medium::Ram};
//!
//! let mut store = StateStore::new(Ram::<512>::new())?;
//!
//! // Erased memory reads as the per-factor default.
//! assert_eq!(store.get_factor_state(Factor::Rfid)?, FactorState::Inactive);
//!
//! store.set_pin("1234")?;
//! assert!(store.validate_pin("1234")?);
//! # Ok::<(), lockstate::Error<core::convert::Infallible>>(())
//! ```

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    codec::{self, PinValidity},
    layout::{IMAGE_SIZE, Image, PIN_WIDTH, RFID_WIDTH, SENTINEL, rfid_byte},
    medium::Medium,
    model::{Factor, FactorState, FactorStates, RfidSlot, RfidSlots, RfidTag},
};

/// Errors occurring while operating a store.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// The medium failed to read or write a byte.
    #[error("Medium access failed at offset {offset}.")]
    Medium { offset: usize, cause: E },
    /// The medium cannot hold a full image.
    #[error("Medium holds {capacity} bytes, {required} are required.")]
    MediumTooSmall { capacity: usize, required: usize },
    /// A PIN longer than the PIN slot was supplied.
    #[error("PIN of {len} characters does not fit the four-character slot.")]
    PinTooLong { len: usize },
}

/// How a PIN entry is compared against the stored PIN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PinMatch {
    /// Compare only as many characters as were entered.
    ///
    /// A correct prefix of the stored PIN is accepted, as existing lock
    /// firmware does. Entries longer than the stored PIN are rejected.
    #[default]
    Prefix,
    /// The entry must have the stored length and match every character.
    ///
    /// PINs written without a recorded length are treated as four characters
    /// long.
    Exact,
}

/// How a factor byte holding neither a valid encoding nor the sentinel is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptFactor {
    /// Report the factor as open.
    #[default]
    Open,
    /// Report the factor's never-written default.
    Default,
}

/// Runtime options of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub pin_match: PinMatch,
    pub corrupt_factor: CorruptFactor,
}

impl Config {
    pub fn with_pin_match(mut self, pin_match: PinMatch) -> Self {
        self.pin_match = pin_match;
        self
    }

    pub fn with_corrupt_factor(mut self, corrupt_factor: CorruptFactor) -> Self {
        self.corrupt_factor = corrupt_factor;
        self
    }
}

/// Persistent lock state over a byte medium.
#[derive(Debug)]
pub struct StateStore<M> {
    medium: M,
    config: Config,
}

impl<M: Medium> StateStore<M> {
    /// Create a store with the default [`Config`].
    pub fn new(medium: M) -> Result<Self, Error<M::Error>> {
        Self::with_config(medium, Config::default())
    }

    pub fn with_config(medium: M, config: Config) -> Result<Self, Error<M::Error>> {
        let capacity = medium.capacity();
        if capacity < IMAGE_SIZE {
            Err(Error::MediumTooSmall {
                capacity,
                required: IMAGE_SIZE,
            })?;
        }

        Ok(Self { medium, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn into_inner(self) -> M {
        self.medium
    }

    pub fn set_door_state(&mut self, is_open: bool) -> Result<(), Error<M::Error>> {
        self.write(Image::DOOR.offset, codec::encode_door(is_open))?;

        debug!(is_open, "door state updated");
        Ok(())
    }

    /// Whether the door was last recorded open. Never-written state is closed.
    pub fn get_door_state(&mut self) -> Result<bool, Error<M::Error>> {
        Ok(codec::decode_door(self.read(Image::DOOR.offset)?))
    }

    pub fn set_factor_state(
        &mut self,
        factor: Factor,
        state: FactorState,
    ) -> Result<(), Error<M::Error>> {
        self.write(factor_offset(factor), codec::encode_factor(state))?;

        debug!(?factor, ?state, "factor state updated");
        Ok(())
    }

    pub fn get_factor_state(&mut self, factor: Factor) -> Result<FactorState, Error<M::Error>> {
        let b = self.read(factor_offset(factor))?;

        Ok(codec::decode_factor(b).left_or_else(|b| {
            if b != SENTINEL {
                warn!(?factor, byte = b, "corrupt factor state");
            }

            let on_corrupt = match self.config.corrupt_factor {
                CorruptFactor::Open => FactorState::Open,
                CorruptFactor::Default => factor.default_state(),
            };

            codec::resolve_factor(factor, b, on_corrupt)
        }))
    }

    pub fn factor_states(&mut self) -> Result<FactorStates, Error<M::Error>> {
        Ok(FactorStates {
            pir: self.get_factor_state(Factor::Pir)?,
            pin: self.get_factor_state(Factor::Pin)?,
            otp: self.get_factor_state(Factor::Otp)?,
            rfid: self.get_factor_state(Factor::Rfid)?,
        })
    }

    pub fn has_pin(&mut self) -> Result<bool, Error<M::Error>> {
        Ok(self.pin_validity()? != PinValidity::Unset)
    }

    /// Store a PIN of up to four characters.
    ///
    /// Longer PINs are rejected without touching the medium. Stored characters
    /// past the new PIN's length are left as they were.
    pub fn set_pin(&mut self, pin: impl AsRef<[u8]>) -> Result<(), Error<M::Error>> {
        let pin = pin.as_ref();
        if pin.len() > PIN_WIDTH {
            Err(Error::PinTooLong { len: pin.len() })?;
        }

        self.write(Image::PIN_VALID.offset, codec::encode_pin_validity(pin.len()))?;
        for (i, c) in pin.iter().enumerate() {
            self.write(Image::PIN.byte(i), *c)?;
        }

        debug!(len = pin.len(), "pin updated");
        Ok(())
    }

    /// Check a PIN entry against the stored PIN.
    ///
    /// If no PIN is configured, every entry is accepted: the PIN factor is
    /// satisfied, which is not the same as access being granted. Otherwise the
    /// entry is compared according to [`Config::pin_match`].
    pub fn validate_pin(&mut self, input: impl AsRef<[u8]>) -> Result<bool, Error<M::Error>> {
        let input = input.as_ref();

        let stored_len = match self.pin_validity()? {
            PinValidity::Unset => return Ok(true),
            PinValidity::Set(len) => len.unwrap_or(PIN_WIDTH),
        };

        // Characters past the stored length are stale.
        let too_long = input.len() > stored_len;
        if too_long || self.config.pin_match == PinMatch::Exact && input.len() != stored_len {
            return Ok(false);
        }

        for (i, c) in input.iter().enumerate() {
            if self.read(Image::PIN.byte(i))? != *c {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Read every RFID slot.
    ///
    /// A slot is reported only if its presence bit is set and it holds a
    /// complete credential.
    pub fn get_rfid_slots(&mut self) -> Result<RfidSlots, Error<M::Error>> {
        let presence = codec::decode_presence(self.read(Image::RFID_MASK.offset)?);

        let mut slots = RfidSlots::default();
        for slot in RfidSlot::ALL {
            if presence.is_set(slot) {
                slots.0[slot.index()] = self.read_credential(slot)?;
            }
        }

        Ok(slots)
    }

    /// Write a credential to an RFID slot.
    ///
    /// Up to eight characters of `data` are written. The slot is marked
    /// present only if `data` is a complete credential; otherwise it is marked
    /// absent, since its previous content has been overwritten.
    ///
    /// This deliberately differs from existing lock firmware, which leaves the
    /// presence bit untouched on a malformed write and can then report a
    /// partially overwritten credential as present.
    pub fn set_rfid_slot(
        &mut self,
        slot: RfidSlot,
        data: impl AsRef<[u8]>,
    ) -> Result<(), Error<M::Error>> {
        let data = data.as_ref();

        for (j, c) in data.iter().take(RFID_WIDTH).enumerate() {
            self.write(rfid_byte(slot, j), *c)?;
        }

        let present = codec::is_well_formed_credential(data);
        if !present {
            warn!(?slot, len = data.len(), "malformed rfid credential");
        }

        self.update_presence(slot, present)?;

        debug!(?slot, present, "rfid slot written");
        Ok(())
    }

    /// Mark an RFID slot absent. The credential bytes are not wiped.
    pub fn delete_rfid_slot(&mut self, slot: RfidSlot) -> Result<(), Error<M::Error>> {
        self.update_presence(slot, false)?;

        debug!(?slot, "rfid slot deleted");
        Ok(())
    }

    /// Find the first present slot holding a credential.
    pub fn find_rfid(&mut self, tag: &RfidTag) -> Result<Option<RfidSlot>, Error<M::Error>> {
        Ok(self
            .get_rfid_slots()?
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(s, _)| s))
    }

    /// Return every slot to its never-written state.
    pub fn erase(&mut self) -> Result<(), Error<M::Error>> {
        for offset in 0..IMAGE_SIZE {
            self.write(offset, SENTINEL)?;
        }

        debug!("image erased");
        Ok(())
    }

    /// Read the raw image.
    pub fn snapshot(&mut self) -> Result<Image, Error<M::Error>> {
        let mut bytes = [0; IMAGE_SIZE];
        for (offset, b) in bytes.iter_mut().enumerate() {
            *b = self.read(offset)?;
        }

        Ok(zerocopy::transmute!(bytes))
    }

    fn pin_validity(&mut self) -> Result<PinValidity, Error<M::Error>> {
        Ok(codec::decode_pin_validity(self.read(Image::PIN_VALID.offset)?))
    }

    fn read_credential(&mut self, slot: RfidSlot) -> Result<Option<RfidTag>, Error<M::Error>> {
        let mut raw = [0; RFID_WIDTH];
        for (j, b) in raw.iter_mut().enumerate() {
            *b = self.read(rfid_byte(slot, j))?;
        }

        Ok(codec::decode_credential(raw))
    }

    /// Set or clear a presence bit, writing only if it changes.
    fn update_presence(&mut self, slot: RfidSlot, present: bool) -> Result<(), Error<M::Error>> {
        let mut presence = codec::decode_presence(self.read(Image::RFID_MASK.offset)?);
        if presence.is_set(slot) == present {
            return Ok(());
        }

        presence.set(slot, present);
        self.write(Image::RFID_MASK.offset, codec::encode_presence(presence))
    }

    fn read(&mut self, offset: usize) -> Result<u8, Error<M::Error>> {
        self.medium
            .read(offset)
            .map_err(|cause| Error::Medium { offset, cause })
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), Error<M::Error>> {
        self.medium
            .write(offset, value)
            .map_err(|cause| Error::Medium { offset, cause })
    }
}

fn factor_offset(factor: Factor) -> usize {
    match factor {
        Factor::Pir => Image::PIR_STATE.offset,
        Factor::Pin => Image::PIN_STATE.offset,
        Factor::Otp => Image::OTP_STATE.offset,
        Factor::Rfid => Image::RFID_STATE.offset,
    }
}
