//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # V2 entity index.
//!
//! A sorted `(entity_id -> row_range)` table wrapped by the V2 footer. Entry
//! `offset`/`length` denote a row range over the sorted triple batch the
//! accompanying V1 payload encodes — `(start_row, row_count)`, not a byte
//! range; `spec.md` §9 records this as a known, deliberately preserved
//! suboptimality. Wire layout: `u32 entry_count (LE)`, then per entry
//! `varint id_len, id_bytes, varint offset, varint length`, then a trailing
//! `u32 crc32` over everything before it.

use std::convert::{TryFrom, TryInto};

use crate::crc32::crc32;
use crate::error::{ChecksumScope, Error, Result};
use crate::limits::{check_decode_array_size, check_decode_total_bytes, check_entity_index_entries};
use crate::reader::Cursor;
use crate::writer::Writer;

/// One row-range entry in a V2 entity index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityIndexEntry {
    pub entity_id: String,
    /// First row index, within the sorted batch, carrying this entity.
    pub offset: u32,
    /// Number of contiguous rows carrying this entity.
    pub length: u32,
}

/// Encodes `entries` (already sorted bytewise ascending by `entity_id`) as an
/// entity index with its trailing CRC.
pub fn encode(entries: &[EntityIndexEntry]) -> Result<Vec<u8>> {
    check_entity_index_entries(entries.len())?;

    let mut writer = Writer::with_capacity(8 + entries.len() * 16);
    writer.u32_le(entries.len() as u32);
    for entry in entries {
        writer.uvarint(entry.entity_id.len() as u64);
        writer.bytes_raw(entry.entity_id.as_bytes());
        writer.uvarint(entry.offset as u64);
        writer.uvarint(entry.length as u64);
    }
    let crc = crc32(writer.bytes());
    writer.u32_le(crc);
    Ok(writer.into_bytes())
}

/// Decodes an entity index, validating its trailing CRC and bounds-checking
/// every length field before the byte slice it governs is taken.
pub fn decode(bytes: &[u8]) -> Result<Vec<EntityIndexEntry>> {
    if bytes.len() < 8 {
        return Err(Error::Truncated("entity index"));
    }
    let region = &bytes[..bytes.len() - 4];
    let stored = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    let computed = crc32(region);
    if stored != computed {
        return Err(Error::Checksum { stored, computed, scope: ChecksumScope::EntityIndex });
    }

    let mut cursor = Cursor::new(bytes);
    let entry_count = cursor.u32_le("entity index entry count")? as usize;
    check_entity_index_entries(entry_count)?;
    check_decode_array_size(entry_count, "entity index entry count")?;

    let mut entries = Vec::with_capacity(entry_count);
    let mut total_id_bytes = 0usize;
    for _ in 0..entry_count {
        let id_len = cursor.uvarint()? as usize;
        total_id_bytes = total_id_bytes.saturating_add(id_len);
        check_decode_total_bytes(total_id_bytes, "entity index id bytes")?;
        let id_bytes = cursor.take(id_len, "entity index entity id")?;
        let entity_id = String::from_utf8(id_bytes.to_vec())
            .map_err(|_| Error::BadEncoding("entity index entity id utf-8"))?;
        let offset = u32::try_from(cursor.uvarint()?)
            .map_err(|_| Error::BadEncoding("entity index offset exceeds u32"))?;
        let length = u32::try_from(cursor.uvarint()?)
            .map_err(|_| Error::BadEncoding("entity index length exceeds u32"))?;
        entries.push(EntityIndexEntry { entity_id, offset, length });
    }

    if cursor.offset() != bytes.len() - 4 {
        return Err(Error::BadEncoding("entity index has trailing bytes before its crc"));
    }

    Ok(entries)
}

/// Exact bytewise lookup by entity id, `O(log n)` comparisons.
pub fn find_exact<'a>(entries: &'a [EntityIndexEntry], entity_id: &str) -> Option<&'a EntityIndexEntry> {
    entries
        .binary_search_by(|entry| entry.entity_id.as_str().cmp(entity_id))
        .ok()
        .map(|i| &entries[i])
}

/// All entries whose id starts with `prefix`, in sorted order. An empty
/// prefix returns a full owned copy.
pub fn find_prefix(entries: &[EntityIndexEntry], prefix: &str) -> Vec<EntityIndexEntry> {
    if prefix.is_empty() {
        return entries.to_vec();
    }
    let start = entries.partition_point(|entry| entry.entity_id.as_str() < prefix);
    let end = start + entries[start..].partition_point(|entry| entry.entity_id.starts_with(prefix));
    entries[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<EntityIndexEntry> {
        vec![
            EntityIndexEntry { entity_id: "a".into(), offset: 0, length: 1 },
            EntityIndexEntry { entity_id: "aa".into(), offset: 1, length: 2 },
            EntityIndexEntry { entity_id: "b".into(), offset: 3, length: 1 },
            EntityIndexEntry { entity_id: "c".into(), offset: 4, length: 1 },
        ]
    }

    #[test]
    fn round_trips_through_encode_and_decode() {
        let original = entries();
        let bytes = encode(&original).unwrap();
        assert_eq!(decode(&bytes).unwrap(), original);
    }

    #[test]
    fn find_exact_locates_a_present_id_and_misses_an_absent_one() {
        let entries = entries();
        assert_eq!(find_exact(&entries, "b").unwrap().offset, 3);
        assert!(find_exact(&entries, "z").is_none());
    }

    #[test]
    fn find_prefix_returns_the_contiguous_matching_range() {
        let entries = entries();
        let matches = find_prefix(&entries, "a");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].entity_id, "a");
        assert_eq!(matches[1].entity_id, "aa");
    }

    #[test]
    fn find_prefix_with_empty_prefix_returns_everything() {
        let entries = entries();
        assert_eq!(find_prefix(&entries, "").len(), entries.len());
    }

    #[test]
    fn single_bit_flip_is_caught_by_the_crc() {
        let bytes_ok = encode(&entries()).unwrap();
        let mut corrupted = bytes_ok.clone();
        corrupted[5] ^= 0x01;
        assert!(matches!(decode(&corrupted), Err(Error::Checksum { .. })));
    }

    #[test]
    fn entry_count_over_the_cap_is_rejected_at_encode_time() {
        // Cheap proxy for the 10,000,000 cap: verify the check function directly
        // rather than materializing ten million strings in a test.
        assert!(check_entity_index_entries(10_000_001).is_err());
    }
}
