//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Chunk statistics.
//!
//! `chunk_stats` answers cheaply, from header metadata alone, never
//! decoding a column: row count, timestamp bounds, and whether a chunk
//! carries a V2 entity index. Accepts either a bare V1 payload or a V2
//! envelope.

use crate::error::Result;
use crate::v1;
use crate::v2;

/// Header-level summary of a chunk, obtainable without decoding any column.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkStats {
    pub triple_count: u32,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
    pub namespace: String,
    pub predicates: Vec<String>,
    pub size_bytes: usize,
    pub is_v2: bool,
    pub entity_count: Option<u32>,
}

/// Reads only the header of `bytes` — a bare V1 payload or a V2 envelope —
/// and returns its summary.
pub fn chunk_stats(bytes: &[u8]) -> Result<ChunkStats> {
    if v2::is_v2(bytes) {
        let footer = v2::read_footer(bytes)?;
        let payload = &bytes[..footer.data_length as usize];
        let header = v1::read_header(payload)?;
        return Ok(ChunkStats {
            triple_count: header.triple_count,
            min_timestamp: footer.min_timestamp,
            max_timestamp: footer.max_timestamp,
            namespace: header.namespace,
            predicates: header.predicates,
            size_bytes: bytes.len(),
            is_v2: true,
            entity_count: Some(footer.entity_count),
        });
    }

    let header = v1::read_header(bytes)?;
    Ok(ChunkStats {
        triple_count: header.triple_count,
        min_timestamp: header.min_timestamp,
        max_timestamp: header.max_timestamp,
        namespace: header.namespace,
        predicates: header.predicates,
        size_bytes: bytes.len(),
        is_v2: false,
        entity_count: None,
    })
}
