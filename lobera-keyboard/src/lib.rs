//! High-level keyboard interface for Lobera keyboards
//!
//! Wire codecs for the device's configuration tables plus
//! [`KeyboardInterface`], which sequences profile-level reads and writes
//! through a [`PacedTransport`].
//!
//! Multi-request writes are not transactional. If one request fails the
//! device keeps whatever tables were already written; re-run the write to
//! repair it.

pub mod error;
pub mod key_setting;
pub mod key_settings;
pub mod led;
pub mod macros;
pub mod offsets;
pub mod repeats;
pub mod settings;
pub mod thumb;

pub use error::KeyboardError;
pub use key_setting::{KeyAction, KeySetting, RepeatMode, KEY_CODE_DISABLE};
pub use key_settings::{
    batch_count, decode_keys_settings, encode_keys_settings, EncodedKeySettings, KeysSettings,
    MAX_KEYS,
};
pub use led::{LightMode, ProfileColors, RgbColor};
pub use macros::{decode_macro, encode_macro, Macro, MacroEntry};
pub use offsets::{decode_offset_table, encode_offset_table, OffsetEntry, OffsetTable};
pub use repeats::{decode_repeat_table, encode_repeat_table, RepeatEntry};
pub use settings::DeviceStatus;

use lobera_transport::protocol::{
    batch_index, pacing, req, size, thumb_enable_value, PROFILE_COUNT, THUMB_COUNT,
};
use lobera_transport::{Clock, ControlChannel, Cooldown, PacedTransport, SystemClock};
use tracing::{debug, info};

use settings::{field as status_field, status_byte};

/// Profile-level operations on one keyboard
///
/// Every request goes through the pacing layer, so calls block for as
/// long as the firmware needs to settle (up to several seconds per key
/// data batch).
pub struct KeyboardInterface<C, K = SystemClock> {
    transport: PacedTransport<C, K>,
}

impl<C: ControlChannel> KeyboardInterface<C> {
    /// Create an interface over a raw channel, pacing on the wall clock
    pub fn new(channel: C) -> Self {
        Self::with_transport(PacedTransport::new(channel))
    }
}

#[cfg(feature = "usb")]
impl KeyboardInterface<lobera_transport::UsbChannel> {
    /// Open the first supported keyboard on the USB bus
    pub fn open() -> Result<Self, KeyboardError> {
        Ok(Self::new(lobera_transport::UsbChannel::open_any()?))
    }
}

impl<C: ControlChannel, K: Clock> KeyboardInterface<C, K> {
    pub fn with_transport(transport: PacedTransport<C, K>) -> Self {
        Self { transport }
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &PacedTransport<C, K> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut PacedTransport<C, K> {
        &mut self.transport
    }

    pub fn into_transport(self) -> PacedTransport<C, K> {
        self.transport
    }

    // === Profile ===

    /// Get the active profile (1-5)
    pub fn get_profile(&mut self) -> Result<u8, KeyboardError> {
        let data = self.read_exact(req::GET_PROFILE, 0, 0, 1, Cooldown::NONE)?;
        Ok(data[0])
    }

    /// Switch the active profile
    pub fn set_profile(&mut self, profile: u8) -> Result<(), KeyboardError> {
        check_profile(profile)?;
        info!("Switching to profile {}", profile);
        self.transport.write(
            req::SET_PROFILE,
            u16::from(profile),
            0,
            &[],
            Cooldown::both(pacing::PROFILE_SWITCH_MS),
        )?;
        Ok(())
    }

    /// Commit pending configuration writes
    pub fn finalize(&mut self) -> Result<(), KeyboardError> {
        self.transport
            .write(req::FINALIZE, 0, 0, &[], Cooldown::NONE)?;
        Ok(())
    }

    // === Status ===

    /// Read the status block (NKRO flag, brightness, light mode)
    pub fn get_status(&mut self) -> Result<DeviceStatus, KeyboardError> {
        DeviceStatus::from_bytes(&self.read_status()?)
    }

    pub fn get_brightness(&mut self) -> Result<u8, KeyboardError> {
        status_byte(&self.read_status()?, status_field::BRIGHTNESS)
    }

    /// Whether full N-key rollover is enabled
    pub fn get_full_nkro(&mut self) -> Result<bool, KeyboardError> {
        Ok(status_byte(&self.read_status()?, status_field::FULL_NKRO)? != 0)
    }

    pub fn get_light_mode(&mut self) -> Result<LightMode, KeyboardError> {
        LightMode::try_from(status_byte(&self.read_status()?, status_field::LIGHT_MODE)?)
    }

    fn read_status(&mut self) -> Result<Vec<u8>, KeyboardError> {
        Ok(self
            .transport
            .read(req::GET_STATUS, 0, 0, size::STATUS, Cooldown::NONE)?)
    }

    /// Set the backlight mode and finalize
    pub fn set_light_mode(&mut self, mode: LightMode) -> Result<(), KeyboardError> {
        info!("Setting light mode {}", mode);
        self.transport.write(
            req::SET_LIGHT_MODE,
            u16::from(mode as u8),
            0,
            &[],
            Cooldown::both(pacing::LIGHT_MODE_MS),
        )?;
        self.finalize()
    }

    // === Colors ===

    /// Read all six accent colors
    pub fn get_profile_colors(&mut self) -> Result<ProfileColors, KeyboardError> {
        let data = self.read_exact(req::GET_COLORS, 0, 0, size::COLORS, Cooldown::NONE)?;
        Ok(ProfileColors::from_bytes(&data))
    }

    /// Read the accent color of one slot (0-5)
    pub fn get_profile_color(&mut self, slot: u8) -> Result<RgbColor, KeyboardError> {
        let slot = check_color_slot(slot)?;
        let colors = self.get_profile_colors()?;
        colors
            .get(slot)
            .ok_or_else(|| KeyboardError::InvalidArgument(format!("color slot {slot}")))
    }

    /// Write all six accent colors and finalize
    pub fn set_profile_colors(&mut self, colors: &ProfileColors) -> Result<(), KeyboardError> {
        self.transport.write(
            req::SET_COLORS,
            0,
            0,
            &colors.to_bytes(),
            Cooldown::write_only(pacing::COLORS_MS),
        )?;
        self.finalize()
    }

    /// Change one slot's accent color, leaving the others as they are
    pub fn set_profile_color(&mut self, slot: u8, color: RgbColor) -> Result<(), KeyboardError> {
        let slot = check_color_slot(slot)?;
        let mut colors = self.get_profile_colors()?;
        colors.set(slot, color)?;
        info!("Setting color slot {} to {}", slot, color);
        self.set_profile_colors(&colors)
    }

    // === Thumb buttons ===

    /// Whether a thumb button's macro is enabled
    pub fn get_thumb_enabled(&mut self, profile: u8, thumb: u8) -> Result<bool, KeyboardError> {
        check_profile(profile)?;
        check_thumb(thumb)?;
        let data = self.read_exact(
            req::GET_THUMB_ENABLED,
            u16::from(thumb),
            u16::from(profile),
            1,
            Cooldown::NONE,
        )?;
        Ok(data[0] != 0)
    }

    /// Read a thumb button's macro; empty if the button is disabled
    pub fn get_thumb_macro(&mut self, profile: u8, thumb: u8) -> Result<Macro, KeyboardError> {
        if !self.get_thumb_enabled(profile, thumb)? {
            return Ok(Macro::new());
        }
        let block = self.read_exact(
            req::GET_THUMB_MACROS,
            0,
            u16::from(profile),
            size::THUMB_BLOCK,
            Cooldown::NONE,
        )?;
        thumb::decode_thumb_macro(&block, thumb)
    }

    /// Replace a thumb button's macro
    ///
    /// An empty macro disables the button. The other buttons keep their
    /// macro and enabled flag.
    pub fn set_thumb_macro(
        &mut self,
        profile: u8,
        thumb: u8,
        entries: &[MacroEntry],
    ) -> Result<(), KeyboardError> {
        check_profile(profile)?;
        check_thumb(thumb)?;

        let mut enabled = [false; THUMB_COUNT as usize];
        for t in 1..=THUMB_COUNT {
            enabled[usize::from(t - 1)] = if t == thumb {
                !entries.is_empty()
            } else {
                self.get_thumb_enabled(profile, t)?
            };
        }
        debug!("Thumb flags for profile {}: {:?}", profile, enabled);

        let current = self.read_exact(
            req::GET_THUMB_MACROS,
            0,
            u16::from(profile),
            size::THUMB_BLOCK,
            Cooldown::NONE,
        )?;
        let block = thumb::compose_thumb_block(&current, enabled, thumb, entries)?;

        info!(
            "Writing thumb {} macro ({} entries) to profile {}",
            thumb,
            entries.len(),
            profile
        );
        self.transport.write(
            req::SET_THUMB_MACROS,
            0,
            u16::from(profile),
            &block,
            Cooldown::both(pacing::THUMB_MACROS_MS),
        )?;
        for t in 1..=THUMB_COUNT {
            self.transport.write(
                req::SET_THUMB_ENABLED,
                thumb_enable_value(enabled[usize::from(t - 1)], t),
                u16::from(profile),
                &[],
                Cooldown::both(pacing::THUMB_ENABLED_MS),
            )?;
        }
        Ok(())
    }

    // === Key map ===

    /// Read a profile's key map
    pub fn get_profile_buttons(&mut self, profile: u8) -> Result<KeysSettings, KeyboardError> {
        check_profile(profile)?;

        let table = self.read_exact(
            req::GET_KEY_OFFSETS,
            0,
            u16::from(profile),
            size::OFFSET_TABLE,
            Cooldown::NONE,
        )?;
        let offsets = decode_offset_table(&table)?;

        let batches = batch_count(usize::from(offsets.payload_size));
        debug!(
            "Profile {}: {} keys, {} payload bytes, {} batches",
            profile,
            offsets.entries.len(),
            offsets.payload_size,
            batches
        );
        let mut blob = Vec::with_capacity(batches * size::BATCH);
        for batch in 0..batches {
            let data = self.read_exact(
                req::GET_KEY_DATA,
                0,
                batch_index(batch as u8, profile),
                size::BATCH,
                Cooldown::NONE,
            )?;
            blob.extend_from_slice(&data);
        }

        let table = self.read_exact(
            req::GET_KEY_REPEATS,
            0,
            u16::from(profile),
            size::REPEAT_TABLE,
            Cooldown::NONE,
        )?;
        let repeats = decode_repeat_table(&table)?;

        decode_keys_settings(&offsets.entries, &repeats, &blob)
    }

    /// Replace a profile's key map
    ///
    /// Writes the offset table, every data batch and the repeat table,
    /// then finalizes. This takes at least four seconds per batch.
    pub fn set_profile_buttons(
        &mut self,
        profile: u8,
        settings: &KeysSettings,
    ) -> Result<(), KeyboardError> {
        check_profile(profile)?;
        let encoded = encode_keys_settings(settings)?;

        info!(
            "Writing {} keys to profile {} ({} batches)",
            settings.len().min(MAX_KEYS),
            profile,
            encoded.batch_count()
        );
        self.transport.write(
            req::SET_KEY_OFFSETS,
            0,
            u16::from(profile),
            &encoded.offset_table,
            Cooldown::both(pacing::KEY_OFFSETS_MS),
        )?;
        for (batch, data) in encoded.batches().enumerate() {
            self.transport.write(
                req::SET_KEY_DATA,
                0,
                batch_index(batch as u8, profile),
                data,
                Cooldown::both(pacing::KEY_DATA_MS),
            )?;
        }
        self.transport.write(
            req::SET_KEY_REPEATS,
            0,
            u16::from(profile),
            &encoded.repeat_table,
            Cooldown::both(pacing::KEY_REPEATS_MS),
        )?;
        self.finalize()
    }

    // === Reset ===

    /// Restore factory configuration
    ///
    /// Light mode single, default colors, every thumb macro cleared and
    /// disabled, every profile's key map emptied.
    pub fn reset_config(&mut self) -> Result<(), KeyboardError> {
        info!("Resetting configuration");
        self.set_light_mode(LightMode::Single)?;
        self.set_profile_colors(&ProfileColors::default())?;

        let empty_block = vec![0u8; size::THUMB_BLOCK];
        let thumb_cooldown = Cooldown::write_only(pacing::RESET_THUMB_MS);
        for profile in 1..=PROFILE_COUNT {
            self.transport.write(
                req::SET_THUMB_MACROS,
                0,
                u16::from(profile),
                &empty_block,
                thumb_cooldown,
            )?;
            for t in 1..=THUMB_COUNT {
                self.transport.write(
                    req::SET_THUMB_ENABLED,
                    thumb_enable_value(false, t),
                    u16::from(profile),
                    &[],
                    thumb_cooldown,
                )?;
            }
        }

        let empty = KeysSettings::new();
        for profile in 1..=PROFILE_COUNT {
            self.set_profile_buttons(profile, &empty)?;
        }
        Ok(())
    }

    /// Paced read that must return exactly `size` bytes
    fn read_exact(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
        cooldown: Cooldown,
    ) -> Result<Vec<u8>, KeyboardError> {
        let data = self.transport.read(request, value, index, size, cooldown)?;
        if data.len() != size {
            return Err(KeyboardError::InconsistentState(format!(
                "{} returned {} bytes, expected {}",
                req::read_name(request),
                data.len(),
                size
            )));
        }
        Ok(data)
    }
}

fn check_profile(profile: u8) -> Result<(), KeyboardError> {
    if (1..=PROFILE_COUNT).contains(&profile) {
        Ok(())
    } else {
        Err(KeyboardError::InvalidArgument(format!(
            "profile {profile} out of range 1..={PROFILE_COUNT}"
        )))
    }
}

fn check_thumb(thumb: u8) -> Result<(), KeyboardError> {
    if (1..=THUMB_COUNT).contains(&thumb) {
        Ok(())
    } else {
        Err(KeyboardError::InvalidArgument(format!(
            "thumb button {thumb} out of range 1..={THUMB_COUNT}"
        )))
    }
}

fn check_color_slot(slot: u8) -> Result<usize, KeyboardError> {
    let slot = usize::from(slot);
    if slot < led::COLOR_SLOTS {
        Ok(slot)
    } else {
        Err(KeyboardError::InvalidArgument(format!(
            "color slot {slot} out of range 0..={}",
            led::COLOR_SLOTS - 1
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_range() {
        assert!(check_profile(0).is_err());
        assert!(check_profile(1).is_ok());
        assert!(check_profile(5).is_ok());
        assert!(check_profile(6).is_err());
    }

    #[test]
    fn test_thumb_range() {
        assert!(check_thumb(0).is_err());
        assert!(check_thumb(3).is_ok());
        assert!(check_thumb(4).is_err());
    }

    #[test]
    fn test_color_slot_range() {
        assert_eq!(check_color_slot(0).unwrap(), 0);
        assert_eq!(check_color_slot(5).unwrap(), 5);
        assert!(matches!(
            check_color_slot(6),
            Err(KeyboardError::InvalidArgument(_))
        ));
    }
}
