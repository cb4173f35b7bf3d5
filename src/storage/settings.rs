//! User-adjustable settings kept across power cycles.

use crate::config::units::StepsPerSec;
use crate::config::MachineConfig;
use crate::error::{Result, StorageError};

use super::{ByteStore, Record, TypedStore};

/// Marks a settings record as written by this crate ("SB").
pub const SETTINGS_SIGNATURE: u16 = 0x5342;

/// Settings record.
///
/// Layout, little-endian: signature `u16`, pen up `u8`, pen down `u8`,
/// default feedrate `f32`, max feedrate `f32`, zoom factor `f32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredSettings {
    /// Record signature, [`SETTINGS_SIGNATURE`] when valid.
    pub signature: u16,
    /// Pen lifted position in degrees.
    pub pen_up: u8,
    /// Pen lowered position in degrees.
    pub pen_down: u8,
    /// Feedrate used until a block sets one.
    pub default_feedrate: f32,
    /// Speed ceiling.
    pub max_feedrate: f32,
    /// G-code unit to step scale.
    pub zoom_factor: f32,
}

impl StoredSettings {
    /// Capture the adjustable part of a configuration.
    pub fn from_config(config: &MachineConfig) -> Self {
        Self {
            signature: SETTINGS_SIGNATURE,
            pen_up: config.pen.up_position,
            pen_down: config.pen.down_position,
            default_feedrate: config.motion.default_feedrate.value(),
            max_feedrate: config.motion.max_feedrate.value(),
            zoom_factor: config.motion.zoom_factor,
        }
    }

    /// Overwrite the matching fields of `config`.
    ///
    /// The result is not validated; run
    /// [`validate_config`](crate::config::validate_config) afterwards.
    pub fn apply_to(&self, config: &mut MachineConfig) {
        config.pen.up_position = self.pen_up;
        config.pen.down_position = self.pen_down;
        config.motion.default_feedrate = StepsPerSec(self.default_feedrate);
        config.motion.max_feedrate = StepsPerSec(self.max_feedrate);
        config.motion.zoom_factor = self.zoom_factor;
    }

    /// Read settings from `address`.
    ///
    /// # Errors
    ///
    /// Returns `BadSignature` for an erased or foreign record.
    pub fn load<S: ByteStore>(store: &mut TypedStore<S>, address: usize) -> Result<Self> {
        let settings: Self = store.read(address)?;

        if settings.signature != SETTINGS_SIGNATURE {
            warn!("no settings at {}", address);
            return Err(StorageError::BadSignature {
                found: settings.signature,
                expected: SETTINGS_SIGNATURE,
            }
            .into());
        }

        Ok(settings)
    }

    /// Write settings to `address`, returning the bytes changed.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` when the record does not fit.
    pub fn save<S: ByteStore>(&self, store: &mut TypedStore<S>, address: usize) -> Result<usize> {
        let record = Self {
            signature: SETTINGS_SIGNATURE,
            ..*self
        };
        let written = store.write(address, &record)?;
        info!("settings saved, {} bytes changed", written);
        Ok(written)
    }
}

impl Record for StoredSettings {
    const SIZE: usize = 16;

    fn encode(&self, out: &mut [u8]) {
        self.signature.encode(&mut out[0..2]);
        self.pen_up.encode(&mut out[2..3]);
        self.pen_down.encode(&mut out[3..4]);
        self.default_feedrate.encode(&mut out[4..8]);
        self.max_feedrate.encode(&mut out[8..12]);
        self.zoom_factor.encode(&mut out[12..16]);
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            signature: u16::decode(&bytes[0..2]),
            pen_up: u8::decode(&bytes[2..3]),
            pen_down: u8::decode(&bytes[3..4]),
            default_feedrate: f32::decode(&bytes[4..8]),
            max_feedrate: f32::decode(&bytes[8..12]),
            zoom_factor: f32::decode(&bytes[12..16]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::RamStore;

    #[test]
    fn test_save_and_load() {
        let mut config = MachineConfig::default();
        config.pen.up_position = 150;
        config.motion.zoom_factor = 2.5;

        let mut store = TypedStore::new(RamStore::<64>::new());
        StoredSettings::from_config(&config).save(&mut store, 8).unwrap();

        let loaded = StoredSettings::load(&mut store, 8).unwrap();
        assert_eq!(loaded.pen_up, 150);
        assert_eq!(loaded.pen_down, 115);
        assert_eq!(loaded.zoom_factor, 2.5);

        let mut fresh = MachineConfig::default();
        loaded.apply_to(&mut fresh);
        assert_eq!(fresh.pen.up_position, 150);
        assert_eq!(fresh.motion.zoom_factor, 2.5);
        assert_eq!(fresh.motion.max_feedrate, StepsPerSec(775.0));
    }

    #[test]
    fn test_erased_store_has_no_settings() {
        let mut store = TypedStore::new(RamStore::<64>::new());
        assert_eq!(
            StoredSettings::load(&mut store, 0),
            Err(Error::Storage(StorageError::BadSignature {
                found: 0xFFFF,
                expected: SETTINGS_SIGNATURE,
            }))
        );
    }

    #[test]
    fn test_layout() {
        let settings = StoredSettings::from_config(&MachineConfig::default());
        let mut out = [0u8; StoredSettings::SIZE];
        settings.encode(&mut out);

        assert_eq!(&out[0..2], &[0x42, 0x53]);
        assert_eq!(out[2], 145);
        assert_eq!(out[3], 115);
        assert_eq!(&out[4..8], &400.0f32.to_le_bytes());
    }

    #[test]
    fn test_resave_touches_only_changes() {
        let config = MachineConfig::default();
        let mut store = TypedStore::new(RamStore::<16>::new());
        let mut settings = StoredSettings::from_config(&config);

        settings.save(&mut store, 0).unwrap();
        settings.pen_down = 120;
        assert_eq!(settings.save(&mut store, 0).unwrap(), 1);
    }
}
