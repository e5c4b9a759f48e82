//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Memory-safety bounds.
//!
//! Four constants bound every length field read from untrusted input and
//! every allocation the codec performs on the caller's behalf. Encode limits
//! are strictly tighter than decode limits, on the theory that the encoder
//! sees trusted, already-materialized data while the decoder sees bytes from
//! the wire: defence in depth on the read path.

use crate::error::{Error, Result};

/// Ceiling on any `u32` element count read during decode.
pub const MAX_DECODE_ARRAY_SIZE: usize = 1_000_000;

/// Ceiling on count * element size, and on cumulative byte sums, during decode.
pub const MAX_DECODE_TOTAL_BYTES: usize = 256 * 1024 * 1024;

/// Ceiling on a caller-supplied array length passed to an encoder.
pub const MAX_ENCODE_ARRAY_SIZE: usize = 100_000;

/// Ceiling on a caller-supplied aggregate byte size passed to an encoder.
pub const MAX_ENCODE_TOTAL_BYTES: usize = 64 * 1024 * 1024;

/// Ceiling on the number of entries in a V2 entity index.
pub const MAX_ENTITY_INDEX_ENTRIES: usize = 10_000_000;

/// Checks a count read during decode against `MAX_DECODE_ARRAY_SIZE`.
pub fn check_decode_array_size(count: usize, context: &'static str) -> Result<()> {
    if count > MAX_DECODE_ARRAY_SIZE {
        Err(Error::ResourceExhausted { count, limit: MAX_DECODE_ARRAY_SIZE, context })
    } else {
        Ok(())
    }
}

/// Checks a cumulative byte total accrued during decode against `MAX_DECODE_TOTAL_BYTES`.
///
/// Callers are expected to invoke this incrementally as bytes are consumed
/// (e.g. once per row of a binary column) rather than once at the end, so a
/// maliciously large forged length cannot be used to allocate before the
/// check fires.
pub fn check_decode_total_bytes(total: usize, context: &'static str) -> Result<()> {
    if total > MAX_DECODE_TOTAL_BYTES {
        Err(Error::ResourceExhausted { count: total, limit: MAX_DECODE_TOTAL_BYTES, context })
    } else {
        Ok(())
    }
}

/// Checks a caller-supplied array length against `MAX_ENCODE_ARRAY_SIZE`.
pub fn check_encode_array_size(count: usize, context: &'static str) -> Result<()> {
    if count > MAX_ENCODE_ARRAY_SIZE {
        Err(Error::ResourceExhausted { count, limit: MAX_ENCODE_ARRAY_SIZE, context })
    } else {
        Ok(())
    }
}

/// Checks a caller-supplied aggregate byte size against `MAX_ENCODE_TOTAL_BYTES`.
pub fn check_encode_total_bytes(total: usize, context: &'static str) -> Result<()> {
    if total > MAX_ENCODE_TOTAL_BYTES {
        Err(Error::ResourceExhausted { count: total, limit: MAX_ENCODE_TOTAL_BYTES, context })
    } else {
        Ok(())
    }
}

/// Checks an entity index entry count against `MAX_ENTITY_INDEX_ENTRIES`.
pub fn check_entity_index_entries(count: usize) -> Result<()> {
    if count > MAX_ENTITY_INDEX_ENTRIES {
        Err(Error::ResourceExhausted {
            count,
            limit: MAX_ENTITY_INDEX_ENTRIES,
            context: "entity index entry count",
        })
    } else {
        Ok(())
    }
}
