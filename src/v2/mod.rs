//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # V2 envelope.
//!
//! Wraps a V1 payload with an entity index and a fixed-size footer/trailer
//! so a single entity can be located, by id, without decoding the whole
//! chunk: `[v1 payload][entity index][48-byte footer][8-byte trailer]`. The
//! trailer ends the file and locates the footer; the footer locates the
//! payload and the index and carries its own 36-byte-scoped CRC.
//!
//! Per `spec.md` §9's design note, the V2 decode paths call `crate::v1`
//! directly rather than the crate's generic `decode` entry point, so a
//! misdetected V2 file can never recurse back into this module.

use std::collections::HashSet;
use std::convert::TryFrom;

use crate::crc32::crc32;
use crate::entity_index::{self, EntityIndexEntry};
use crate::error::{ChecksumScope, Error, Result};
use crate::limits::check_encode_array_size;
use crate::triple::Triple;
use crate::v1;
use crate::writer::Writer;

pub const FOOTER_SIZE: usize = 48;
pub const TRAILER_SIZE: usize = 8;
/// Fixed value of the trailer's `footer_offset_from_end` field: footer plus trailer.
pub const FOOTER_OFFSET_FROM_END: u32 = (FOOTER_SIZE + TRAILER_SIZE) as u32;

/// Parsed and validated V2 footer, plus the byte offset it was found at
/// (useful to callers that need to slice the file themselves).
#[derive(Clone, Debug, PartialEq)]
pub struct FooterMetadata {
    pub version: u32,
    pub data_length: u32,
    pub index_offset: u32,
    pub index_length: u32,
    pub entity_count: u32,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
    pub footer_start: usize,
}

/// Cheap structural check used by the generic `decode` entry point to
/// dispatch between V1 and V2: minimum size and trailer magic only. Does
/// not validate the footer itself — `read_footer` does that.
pub fn is_v2(bytes: &[u8]) -> bool {
    if bytes.len() <= FOOTER_SIZE + TRAILER_SIZE {
        return false;
    }
    let trailer = &bytes[bytes.len() - TRAILER_SIZE..];
    let magic = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    magic == v1::MAGIC
}

/// Sorts `triples` by subject (stably, so ties preserve input order), then
/// encodes a V1 payload over the sorted batch and wraps it with an entity
/// index, footer, and trailer.
pub fn encode_v2(triples: &[Triple], namespace: &str) -> Result<Vec<u8>> {
    check_encode_array_size(triples.len(), "triple batch length")?;

    let mut sorted = triples.to_vec();
    sorted.sort_by(|a, b| a.subject.cmp(&b.subject));

    let payload = v1::encode(&sorted, namespace)?;

    let mut entries = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = i;
        let subject = sorted[i].subject.clone();
        while i < sorted.len() && sorted[i].subject == subject {
            i += 1;
        }
        let row_count = i - start;
        entries.push(EntityIndexEntry {
            entity_id: subject,
            offset: u32::try_from(start).map_err(|_| Error::BadArgument("row offset exceeds u32"))?,
            length: u32::try_from(row_count).map_err(|_| Error::BadArgument("row count exceeds u32"))?,
        });
    }

    let index_bytes = entity_index::encode(&entries)?;

    let (min_ts, max_ts) = if sorted.is_empty() {
        (0i64, 0i64)
    } else {
        let mut min = sorted[0].timestamp;
        let mut max = sorted[0].timestamp;
        for triple in &sorted {
            min = min.min(triple.timestamp);
            max = max.max(triple.timestamp);
        }
        (min, max)
    };

    let data_length = u32::try_from(payload.len()).map_err(|_| Error::BadArgument("v1 payload exceeds 4 GiB"))?;
    let index_offset = data_length;
    let index_length =
        u32::try_from(index_bytes.len()).map_err(|_| Error::BadArgument("entity index exceeds 4 GiB"))?;
    let entity_count =
        u32::try_from(entries.len()).map_err(|_| Error::BadArgument("entity count exceeds u32"))?;

    let mut footer = Writer::with_capacity(FOOTER_SIZE);
    footer.u32_le(2);
    footer.u32_le(data_length);
    footer.u32_le(index_offset);
    footer.u32_le(index_length);
    footer.u32_le(entity_count);
    footer.i64_le(min_ts);
    footer.i64_le(max_ts);
    debug_assert_eq!(footer.len(), 36);
    let footer_crc = crc32(footer.bytes());
    footer.u32_le(footer_crc);
    footer.bytes_raw(&[0u8; 8]);
    debug_assert_eq!(footer.len(), FOOTER_SIZE);

    let mut out = Writer::with_capacity(payload.len() + index_bytes.len() + FOOTER_SIZE + TRAILER_SIZE);
    out.bytes_raw(&payload);
    out.bytes_raw(&index_bytes);
    out.bytes_raw(footer.bytes());
    out.u32_le(FOOTER_OFFSET_FROM_END);
    out.u32_le(v1::MAGIC);

    Ok(out.into_bytes())
}

/// Locates, validates, and parses the V2 footer at the end of `bytes`.
pub fn read_footer(bytes: &[u8]) -> Result<FooterMetadata> {
    if bytes.len() <= FOOTER_SIZE + TRAILER_SIZE {
        return Err(Error::Truncated("v2 footer"));
    }

    let trailer = &bytes[bytes.len() - TRAILER_SIZE..];
    let footer_offset_from_end = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let magic = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    if magic != v1::MAGIC {
        return Err(Error::BadMagic { expected: v1::MAGIC, found: magic });
    }
    if footer_offset_from_end != FOOTER_OFFSET_FROM_END {
        return Err(Error::InternalInconsistency("trailer footer_offset_from_end is not 56"));
    }

    let footer_start = bytes.len() - footer_offset_from_end as usize;
    let footer = &bytes[footer_start..footer_start + FOOTER_SIZE];

    let stored = u32::from_le_bytes([footer[36], footer[37], footer[38], footer[39]]);
    let computed = crc32(&footer[..36]);
    if stored != computed {
        return Err(Error::Checksum { stored, computed, scope: ChecksumScope::V2Footer });
    }

    let version = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
    if version != 2 {
        return Err(Error::BadVersion(version as u16));
    }
    let data_length = u32::from_le_bytes([footer[4], footer[5], footer[6], footer[7]]);
    let index_offset = u32::from_le_bytes([footer[8], footer[9], footer[10], footer[11]]);
    let index_length = u32::from_le_bytes([footer[12], footer[13], footer[14], footer[15]]);
    let entity_count = u32::from_le_bytes([footer[16], footer[17], footer[18], footer[19]]);
    let min_timestamp = i64::from_le_bytes([
        footer[20], footer[21], footer[22], footer[23], footer[24], footer[25], footer[26], footer[27],
    ]);
    let max_timestamp = i64::from_le_bytes([
        footer[28], footer[29], footer[30], footer[31], footer[32], footer[33], footer[34], footer[35],
    ]);

    if data_length as usize > footer_start {
        return Err(Error::InternalInconsistency("data_length exceeds footer start"));
    }
    if (index_offset as usize) < data_length as usize {
        return Err(Error::InternalInconsistency("index_offset precedes data_length"));
    }
    let index_end = (index_offset as usize)
        .checked_add(index_length as usize)
        .ok_or(Error::InternalInconsistency("index_offset + index_length overflow"))?;
    if index_end > footer_start {
        return Err(Error::InternalInconsistency("index region exceeds footer start"));
    }

    Ok(FooterMetadata {
        version,
        data_length,
        index_offset,
        index_length,
        entity_count,
        min_timestamp,
        max_timestamp,
        footer_start,
    })
}

/// Reads and validates the entity index embedded in a V2 chunk.
pub fn read_entity_index(bytes: &[u8]) -> Result<Vec<EntityIndexEntry>> {
    let footer = read_footer(bytes)?;
    let index_bytes = &bytes[footer.index_offset as usize..footer.index_offset as usize + footer.index_length as usize];
    entity_index::decode(index_bytes)
}

/// Decodes the whole embedded V1 payload. Calls `v1::decode` directly, never
/// the crate's generic `decode`. Also validates the entity index's own CRC,
/// even though this path never reads the index's entries, so that corruption
/// confined to the index region does not silently decode as success.
pub fn decode_v2(bytes: &[u8], predicates: Option<&HashSet<String>>) -> Result<Vec<Triple>> {
    let footer = read_footer(bytes)?;
    read_entity_index(bytes)?;
    let data = &bytes[..footer.data_length as usize];
    v1::decode(data, predicates)
}

/// Looks up `entity_id` in the embedded entity index in `O(log n)`, then
/// decodes only as much of the embedded V1 payload as is needed to answer:
/// the whole payload (no byte-range seek into the columnar body is
/// implemented yet, per `spec.md` §4.6), sliced down to the entity's row
/// range.
pub fn decode_entity(bytes: &[u8], entity_id: &str) -> Result<Option<Vec<Triple>>> {
    let footer = read_footer(bytes)?;
    if footer.entity_count == 0 {
        return Ok(None);
    }

    let index_bytes = &bytes[footer.index_offset as usize..footer.index_offset as usize + footer.index_length as usize];
    let entries = entity_index::decode(index_bytes)?;
    let entry = match entity_index::find_exact(&entries, entity_id) {
        Some(entry) => entry.clone(),
        None => return Ok(None),
    };

    let data = &bytes[..footer.data_length as usize];
    let all = v1::decode(data, None)?;

    let start = entry.offset as usize;
    let end = start
        .checked_add(entry.length as usize)
        .ok_or(Error::InternalInconsistency("entity index row range overflow"))?;
    if end > all.len() {
        return Err(Error::InternalInconsistency("entity index row range exceeds decoded triple count"));
    }

    Ok(Some(all[start..end].to_vec()))
}
