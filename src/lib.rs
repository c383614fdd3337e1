//! Lobera keyboard configuration tool - shared library
//!
//! Key names, macro text syntax and key map files used by the `lobera`
//! command-line tool.

pub mod hid;
pub mod keys_file;
pub mod macro_seq;

pub use keys_file::{KeyEntry, KeyMapFile, KeysFileError};
pub use macro_seq::{MacroSeq, MacroStep, ParseMacroSeqError};
