//! Macro sequence parser and display.
//!
//! Parses a comma-separated macro sequence into steps, expands them into
//! the keyboard's macro instructions, and reconstructs the syntax from
//! instructions read back from the device.
//!
//! # Syntax
//!
//! ```text
//! A,B,C                 tap keys in sequence
//! LCtrl+C,LCtrl+V       modifier combos
//! A:down,50ms,A:up      explicit press/release with a pause
//! A,100ms,x3            repeat the whole script three times
//! 0x1e                  raw HID usage code
//! ```
//!
//! `press`/`release` are accepted as synonyms for `down`/`up`.

use std::fmt;
use std::str::FromStr;

use lobera_keyboard::{Macro, MacroEntry};
use thiserror::Error;

use crate::hid;

/// A single step in a macro sequence (user-facing, before expansion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroStep {
    /// Key tap (press + release).
    Tap(u8),
    /// Modifier combo: press modifiers then key, release in reverse.
    Combo { mods: Vec<u8>, key: u8 },
    /// Explicit key down.
    Down(u8),
    /// Explicit key up.
    Up(u8),
    /// Pause in milliseconds.
    Sleep(u16),
    /// Repeat count for the script.
    Repeat(u16),
}

/// A parsed macro sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacroSeq {
    pub steps: Vec<MacroStep>,
}

/// Error type for parsing a macro sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMacroSeqError {
    #[error("empty macro sequence")]
    EmptySequence,
    #[error("unknown key: \"{0}\"")]
    UnknownKey(String),
    #[error("\"{0}\" is not a modifier key")]
    NotAModifier(String),
    #[error("invalid delay: \"{0}\"")]
    InvalidDelay(String),
    #[error("invalid repeat count: \"{0}\"")]
    InvalidRepeat(String),
    #[error("invalid direction: \"{0}\" (expected down/press or up/release)")]
    InvalidDirection(String),
}

fn resolve_key(name: &str) -> Result<u8, ParseMacroSeqError> {
    let name = name.trim();
    hid::key_code_from_name(name).ok_or_else(|| ParseMacroSeqError::UnknownKey(name.to_string()))
}

/// Parse a delay like `50ms`. Returns milliseconds.
fn parse_delay(s: &str) -> Option<Result<u16, ParseMacroSeqError>> {
    let num = s.strip_suffix("ms")?.trim();
    if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        num.parse::<u16>()
            .map_err(|_| ParseMacroSeqError::InvalidDelay(s.to_string())),
    )
}

/// Parse a repeat token like `x3`.
fn parse_repeat(s: &str) -> Option<Result<u16, ParseMacroSeqError>> {
    let num = s.strip_prefix(['x', 'X'])?;
    if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        num.parse::<u16>()
            .map_err(|_| ParseMacroSeqError::InvalidRepeat(s.to_string())),
    )
}

fn parse_step(token: &str) -> Result<MacroStep, ParseMacroSeqError> {
    if let Some(ms) = parse_delay(token) {
        return ms.map(MacroStep::Sleep);
    }
    if let Some(count) = parse_repeat(token) {
        return count.map(MacroStep::Repeat);
    }

    if let Some((key_part, dir_part)) = token.rsplit_once(':') {
        let key = resolve_key(key_part)?;
        return match dir_part.trim().to_ascii_lowercase().as_str() {
            "down" | "press" => Ok(MacroStep::Down(key)),
            "up" | "release" => Ok(MacroStep::Up(key)),
            _ => Err(ParseMacroSeqError::InvalidDirection(dir_part.to_string())),
        };
    }

    if let Some((mod_part, key_part)) = token.rsplit_once('+') {
        let mut mods = Vec::new();
        for name in mod_part.split('+') {
            let code = resolve_key(name)?;
            if !hid::is_modifier(code) {
                return Err(ParseMacroSeqError::NotAModifier(name.trim().to_string()));
            }
            mods.push(code);
        }
        return Ok(MacroStep::Combo {
            mods,
            key: resolve_key(key_part)?,
        });
    }

    resolve_key(token).map(MacroStep::Tap)
}

impl FromStr for MacroSeq {
    type Err = ParseMacroSeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(ParseMacroSeqError::EmptySequence);
        }
        Ok(Self { steps })
    }
}

impl MacroSeq {
    /// Expand into macro instructions.
    pub fn to_entries(&self) -> Macro {
        let mut entries = Vec::new();
        for step in &self.steps {
            match step {
                MacroStep::Tap(key) => {
                    entries.push(MacroEntry::KeyDown(*key));
                    entries.push(MacroEntry::KeyUp(*key));
                }
                MacroStep::Combo { mods, key } => {
                    entries.extend(mods.iter().map(|&m| MacroEntry::KeyDown(m)));
                    entries.push(MacroEntry::KeyDown(*key));
                    entries.push(MacroEntry::KeyUp(*key));
                    entries.extend(mods.iter().rev().map(|&m| MacroEntry::KeyUp(m)));
                }
                MacroStep::Down(key) => entries.push(MacroEntry::KeyDown(*key)),
                MacroStep::Up(key) => entries.push(MacroEntry::KeyUp(*key)),
                MacroStep::Sleep(ms) => entries.push(MacroEntry::Sleep(*ms)),
                MacroStep::Repeat(n) => entries.push(MacroEntry::Repeat(*n)),
            }
        }
        entries
    }

    /// Reconstruct steps from macro instructions, folding press/release
    /// pairs back into taps and combos.
    pub fn from_entries(entries: &[MacroEntry]) -> Self {
        let mut steps = Vec::new();
        let mut i = 0;

        while i < entries.len() {
            if let Some((step, consumed)) = match_combo(&entries[i..]) {
                steps.push(step);
                i += consumed;
                continue;
            }

            let step = match (entries[i], entries.get(i + 1)) {
                (MacroEntry::KeyDown(k), Some(&MacroEntry::KeyUp(u))) if k == u => {
                    i += 1;
                    MacroStep::Tap(k)
                }
                (MacroEntry::KeyDown(k), _) => MacroStep::Down(k),
                (MacroEntry::KeyUp(k), _) => MacroStep::Up(k),
                (MacroEntry::Sleep(ms), _) => MacroStep::Sleep(ms),
                (MacroEntry::Repeat(n), _) => MacroStep::Repeat(n),
            };
            steps.push(step);
            i += 1;
        }

        Self { steps }
    }
}

/// Match `↓Mod1..↓ModN ↓Key ↑Key ↑ModN..↑Mod1` at the start of `entries`.
fn match_combo(entries: &[MacroEntry]) -> Option<(MacroStep, usize)> {
    let mods: Vec<u8> = entries
        .iter()
        .map_while(|e| match *e {
            MacroEntry::KeyDown(m) if hid::is_modifier(m) => Some(m),
            _ => None,
        })
        .collect();
    if mods.is_empty() {
        return None;
    }

    let n = mods.len();
    let key = match (entries.get(n), entries.get(n + 1)) {
        (Some(&MacroEntry::KeyDown(k)), Some(&MacroEntry::KeyUp(u)))
            if k == u && !hid::is_modifier(k) =>
        {
            k
        }
        _ => return None,
    };

    let releases = entries.get(n + 2..n + 2 + n)?;
    let released_in_order = releases
        .iter()
        .zip(mods.iter().rev())
        .all(|(e, &m)| *e == MacroEntry::KeyUp(m));
    if !released_in_order {
        return None;
    }

    Some((MacroStep::Combo { mods, key }, 2 * n + 2))
}

impl fmt::Display for MacroStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroStep::Tap(key) => f.write_str(&hid::key_label(*key)),
            MacroStep::Combo { mods, key } => {
                for m in mods {
                    write!(f, "{}+", hid::key_label(*m))?;
                }
                f.write_str(&hid::key_label(*key))
            }
            MacroStep::Down(key) => write!(f, "{}:down", hid::key_label(*key)),
            MacroStep::Up(key) => write!(f, "{}:up", hid::key_label(*key)),
            MacroStep::Sleep(ms) => write!(f, "{ms}ms"),
            MacroStep::Repeat(n) => write!(f, "x{n}"),
        }
    }
}

impl fmt::Display for MacroSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
