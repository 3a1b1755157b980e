#![no_std]

//! A fixed-layout persistent state store for multi-factor door-lock
//! controllers.
//!
//! Lockstate keeps the door sensor state, the per-factor state of the PIR, PIN,
//! OTP and RFID factors, the configured PIN and up to three RFID credentials in
//! a small byte image. The image is addressed one byte at a time, which suits
//! EEPROM-style non-volatile memory, and it reads back sensibly before anything
//! has ever been written: erased bytes resolve to safe per-factor defaults.
//!
//! Most users should begin with [`StateStore`] in the [`store`] module, backed
//! by one of the adapters in the [`medium`] module. The byte layout itself is
//! described by [`layout::Image`], and the rules for turning bytes into domain
//! values live in [`codec`].
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable the [`layout::SlotTable`] derive macro (default).
//! - `std`: enable the file-backed medium (default).

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod layout;
pub mod medium;
pub mod model;
pub mod store;

pub use model::{Factor, FactorState, FactorStates, RfidSlot, RfidSlots, RfidTag};
pub use store::{Config, CorruptFactor, Error, PinMatch, StateStore};
