// ABOUTME: Bounded stream reading so oversized inputs fail before they are buffered
// ABOUTME: Reads at most max_bytes + 1 bytes and reports TooLarge when the cap is hit

use crate::error::{DecodeError, Limit};
use std::io::Read;

/// Read `reader` to the end, failing once more than `max_bytes` bytes arrive.
/// `None` reads without a cap.
pub fn read_all_limit<R: Read>(mut reader: R, max_bytes: Option<u64>) -> Result<Vec<u8>, DecodeError> {
    let mut data = Vec::new();
    match max_bytes {
        None => {
            reader.read_to_end(&mut data)?;
        }
        Some(max) => {
            reader.take(max.saturating_add(1)).read_to_end(&mut data)?;
            if data.len() as u64 > max {
                return Err(DecodeError::too_large(Limit::Bytes, max, data.len() as u64));
            }
        }
    }
    Ok(data)
}
