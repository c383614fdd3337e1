//! JSON key map files
//!
//! A profile's key map in a hand-editable form: keys and substitutions
//! by HID name, macros in [`crate::macro_seq`] syntax.
//!
//! ```json
//! {
//!   "keys": {
//!     "1": { "macro": "A:down,50ms,A:up,50ms,x3" },
//!     "2": { "substitute": "S", "repeat": "press" },
//!     "3": { "disable": true }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use lobera_keyboard::{KeyAction, KeySetting, KeysSettings, RepeatMode, KEY_CODE_DISABLE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::hid;
use crate::macro_seq::{MacroSeq, ParseMacroSeqError};

/// Errors reading or interpreting a key map file
#[derive(Debug, Error)]
pub enum KeysFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid key map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown key name: \"{0}\"")]
    UnknownKey(String),

    #[error("Key {key}: {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("Key {key}: {source}")]
    Macro {
        key: String,
        source: ParseMacroSeqError,
    },
}

/// One key's entry; exactly one of `substitute`, `macro`, `disable`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute: Option<String>,
    #[serde(rename = "macro", default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable: bool,
    #[serde(default)]
    pub repeat: RepeatMode,
}

/// Top-level key map document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapFile {
    pub keys: BTreeMap<String, KeyEntry>,
}

impl KeyMapFile {
    /// Describe a key map read from the device
    pub fn from_settings(settings: &KeysSettings) -> Self {
        let keys = settings
            .iter()
            .map(|(&code, setting)| {
                let mut entry = KeyEntry {
                    repeat: setting.repeat,
                    ..Default::default()
                };
                match &setting.action {
                    KeyAction::Disable => entry.disable = true,
                    KeyAction::Substitute(to) => entry.substitute = Some(hid::key_label(*to)),
                    KeyAction::Macro(m) => {
                        entry.script = Some(MacroSeq::from_entries(m).to_string())
                    }
                }
                (hid::key_label(code), entry)
            })
            .collect();
        Self { keys }
    }

    /// Resolve names and macros into a key map
    pub fn to_settings(&self) -> Result<KeysSettings, KeysFileError> {
        let mut settings = KeysSettings::new();
        for (name, entry) in &self.keys {
            let code = hid::key_code_from_name(name)
                .filter(|&c| c != 0)
                .ok_or_else(|| KeysFileError::UnknownKey(name.clone()))?;
            let action = entry_action(name, entry)?;
            if settings
                .insert(code, KeySetting::new(action, entry.repeat))
                .is_some()
            {
                return Err(KeysFileError::InvalidEntry {
                    key: name.clone(),
                    reason: format!("key 0x{code:02X} listed more than once"),
                });
            }
        }
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, KeysFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, KeysFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, KeysFileError> {
        let json = std::fs::read_to_string(path).map_err(|source| KeysFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn entry_action(name: &str, entry: &KeyEntry) -> Result<KeyAction, KeysFileError> {
    let invalid = |reason: &str| KeysFileError::InvalidEntry {
        key: name.to_string(),
        reason: reason.to_string(),
    };

    match (&entry.substitute, &entry.script, entry.disable) {
        (None, None, true) => Ok(KeyAction::Disable),
        (Some(to), None, false) => {
            let code = hid::key_code_from_name(to)
                .ok_or_else(|| KeysFileError::UnknownKey(to.clone()))?;
            if code >= KEY_CODE_DISABLE {
                warn!(
                    "Key {}: substitution 0x{:02X} is at or above 0x{:02X} and will act as disabled",
                    name, code, KEY_CODE_DISABLE
                );
            }
            Ok(KeyAction::Substitute(code))
        }
        // Empty script: the key is assigned a macro that does nothing
        (None, Some(text), false) if text.trim().is_empty() => {
            Ok(KeyAction::Macro(Vec::new()))
        }
        (None, Some(text), false) => {
            let seq: MacroSeq = text.parse().map_err(|source| KeysFileError::Macro {
                key: name.to_string(),
                source,
            })?;
            Ok(KeyAction::Macro(seq.to_entries()))
        }
        (None, None, false) => Err(invalid("needs one of substitute, macro or disable")),
        _ => Err(invalid("substitute, macro and disable are mutually exclusive")),
    }
}
