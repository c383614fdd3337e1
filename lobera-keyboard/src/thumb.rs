//! Thumb button macro block
//!
//! All three thumb macros of a profile share one 4096-byte block: thumb
//! *t* owns bytes `(t-1)*1024 .. t*1024`, the rest is unused. Whether a
//! thumb's macro is active is a separate per-thumb flag.

use std::ops::Range;

use lobera_transport::protocol::{size, THUMB_COUNT};

use crate::error::KeyboardError;
use crate::macros::{self, Macro, MacroEntry};

/// Byte range of `thumb` (1-based) inside the block
pub fn thumb_region(thumb: u8) -> Range<usize> {
    let start = usize::from(thumb.saturating_sub(1)) * size::THUMB_MACRO;
    start..start + size::THUMB_MACRO
}

/// Decode `thumb`'s macro from a block
pub fn decode_thumb_macro(block: &[u8], thumb: u8) -> Result<Macro, KeyboardError> {
    let region = block.get(thumb_region(thumb)).ok_or_else(|| {
        KeyboardError::InconsistentState(format!(
            "thumb macro block of {} bytes has no region for thumb {thumb}",
            block.len()
        ))
    })?;
    macros::decode_macro(region)
}

/// Build the block to write when `thumb`'s macro changes
///
/// `enabled[i]` is the flag of thumb `i + 1` after the change. Regions of
/// disabled thumbs, the target region and the unused tail are cleared;
/// enabled thumbs keep their bytes from `current`.
pub fn compose_thumb_block(
    current: &[u8],
    enabled: [bool; THUMB_COUNT as usize],
    thumb: u8,
    entries: &[MacroEntry],
) -> Result<Vec<u8>, KeyboardError> {
    let mut block = vec![0u8; size::THUMB_BLOCK];
    let n = current.len().min(block.len());
    block[..n].copy_from_slice(&current[..n]);

    for t in 1..=THUMB_COUNT {
        if t == thumb || !enabled[usize::from(t - 1)] {
            block[thumb_region(t)].fill(0);
        }
    }
    let used = usize::from(THUMB_COUNT) * size::THUMB_MACRO;
    block[used..].fill(0);

    macros::write_macro(entries, &mut block[thumb_region(thumb)])?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::encode_macro;
    use crate::macros::MacroEntry::*;

    fn block_with(thumbs: [&[MacroEntry]; 3]) -> Vec<u8> {
        let mut block = vec![0xeeu8; size::THUMB_BLOCK];
        for (i, m) in thumbs.iter().enumerate() {
            let region = thumb_region(i as u8 + 1);
            block[region.clone()].fill(0);
            let bytes = encode_macro(m);
            block[region.start..region.start + bytes.len()].copy_from_slice(&bytes);
        }
        block
    }

    #[test]
    fn test_regions() {
        assert_eq!(thumb_region(1), 0..1024);
        assert_eq!(thumb_region(3), 2048..3072);
    }

    #[test]
    fn test_decode_each_thumb() {
        let block = block_with([&[KeyDown(4)], &[], &[Sleep(10), Repeat(2)]]);
        assert_eq!(decode_thumb_macro(&block, 1).unwrap(), vec![KeyDown(4)]);
        assert!(decode_thumb_macro(&block, 2).unwrap().is_empty());
        assert_eq!(decode_thumb_macro(&block, 3).unwrap(), vec![Sleep(10), Repeat(2)]);
    }

    #[test]
    fn test_decode_short_block() {
        assert!(matches!(
            decode_thumb_macro(&[0u8; 100], 2),
            Err(KeyboardError::InconsistentState(_))
        ));
    }

    #[test]
    fn test_compose_keeps_enabled_and_clears_disabled() {
        let current = block_with([&[KeyDown(4)], &[KeyDown(5)], &[KeyDown(6)]]);
        let block =
            compose_thumb_block(&current, [true, true, false], 2, &[KeyUp(7)]).unwrap();
        assert_eq!(block.len(), 4096);
        assert_eq!(decode_thumb_macro(&block, 1).unwrap(), vec![KeyDown(4)]);
        assert_eq!(decode_thumb_macro(&block, 2).unwrap(), vec![KeyUp(7)]);
        assert!(block[thumb_region(3)].iter().all(|&b| b == 0));
        assert!(block[3072..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_compose_clears_old_target_bytes() {
        let current = block_with([&[Sleep(1), Sleep(2), Sleep(3)], &[], &[]]);
        let block = compose_thumb_block(&current, [true, false, false], 1, &[Sleep(9)]).unwrap();
        assert_eq!(decode_thumb_macro(&block, 1).unwrap(), vec![Sleep(9)]);
    }

    #[test]
    fn test_compose_macro_too_large() {
        let big = vec![Sleep(1); 342];
        assert!(matches!(
            compose_thumb_block(&[], [true; 3], 1, &big),
            Err(KeyboardError::BufferTooSmall { needed: 1026, available: 1024 })
        ));
    }
}
