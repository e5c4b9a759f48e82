//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # GraphCol
//!
//! A columnar binary codec for a graph database's triple stream. `encode`
//! and `decode` handle the bare V1 chunk format; `encode_v2`/`decode_v2`
//! wrap it with an entity index and footer so a single entity can be
//! located, by id, without decoding the whole chunk (`decode_entity`).
//!
//! The codec is pure: no I/O, no query execution, no index maintenance.

mod column;
mod crc32;
mod entity_index;
mod error;
mod limits;
mod object;
mod reader;
mod stats;
mod stream;
mod triple;
mod v1;
mod v2;
mod varint;
mod writer;

use std::collections::HashSet;

pub use entity_index::EntityIndexEntry;
pub use error::{ChecksumScope, Error, Result};
pub use object::{GeoPoint, Object, ObjectTag};
pub use stats::{chunk_stats, ChunkStats};
pub use stream::StreamingEncoder;
pub use triple::Triple;
pub use v2::FooterMetadata;

/// Encodes `triples` as a bare V1 chunk under `namespace`.
pub fn encode(triples: &[Triple], namespace: &str) -> Result<Vec<u8>> {
    v1::encode(triples, namespace)
}

/// Encodes `triples` as a V2 chunk: a V1 payload sorted by subject, wrapped
/// with an entity index, footer, and trailer.
pub fn encode_v2(triples: &[Triple], namespace: &str) -> Result<Vec<u8>> {
    v2::encode_v2(triples, namespace)
}

/// Decodes `bytes`, dispatching on whether it is a bare V1 payload or a V2
/// envelope. `predicates`, when `Some` and non-empty, projects the result
/// down to triples whose predicate is in the set; `None` or an empty set
/// both mean "all predicates".
pub fn decode(bytes: &[u8], predicates: Option<&HashSet<String>>) -> Result<Vec<Triple>> {
    if v2::is_v2(bytes) {
        v2::decode_v2(bytes, predicates)
    } else {
        v1::decode(bytes, predicates)
    }
}

/// Decodes a V2 chunk specifically, rejecting a bare V1 payload.
pub fn decode_v2(bytes: &[u8], predicates: Option<&HashSet<String>>) -> Result<Vec<Triple>> {
    v2::decode_v2(bytes, predicates)
}

/// Looks up `entity_id` in a V2 chunk's entity index and returns just that
/// entity's rows, or `None` if the id is absent.
pub fn decode_entity(bytes: &[u8], entity_id: &str) -> Result<Option<Vec<Triple>>> {
    v2::decode_entity(bytes, entity_id)
}

/// Parses and validates a V2 chunk's footer.
pub fn read_footer(bytes: &[u8]) -> Result<FooterMetadata> {
    v2::read_footer(bytes)
}

/// Reads and validates a V2 chunk's entity index.
pub fn read_entity_index(bytes: &[u8]) -> Result<Vec<EntityIndexEntry>> {
    v2::read_entity_index(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<Triple> {
        vec![
            Triple::new("e2", "name", Object::Str("Bob".into()), 5, "tx1"),
            Triple::new("e1", "name", Object::Str("Alice".into()), 1, "tx0"),
        ]
    }

    #[test]
    fn generic_decode_handles_both_v1_and_v2_chunks() {
        let v1_bytes = encode(&batch(), "ns").unwrap();
        let v1_decoded = decode(&v1_bytes, None).unwrap();
        assert_eq!(v1_decoded.len(), 2);

        let v2_bytes = encode_v2(&batch(), "ns").unwrap();
        let v2_decoded = decode(&v2_bytes, None).unwrap();
        assert_eq!(v2_decoded.len(), 2);
        assert_eq!(v2_decoded[0].subject, "e1");
    }

    #[test]
    fn decode_entity_and_stats_agree_on_entity_count() {
        let bytes = encode_v2(&batch(), "ns").unwrap();
        let stats = chunk_stats(&bytes).unwrap();
        assert_eq!(stats.entity_count, Some(2));

        let alice = decode_entity(&bytes, "e1").unwrap().unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].subject, "e1");
    }

    #[test]
    fn streaming_encoder_output_decodes_like_a_direct_encode() {
        let mut stream = StreamingEncoder::new("ns");
        for triple in batch() {
            stream.add(triple).unwrap();
        }
        let bytes = stream.flush().unwrap();
        assert_eq!(decode(&bytes, None).unwrap().len(), 2);
    }
}
