//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Streaming encoder.
//!
//! Buffers triples in memory and flushes them as a single V1 chunk on
//! demand — a convenience wrapper over [`crate::v1::encode`] for producers
//! that append one triple at a time instead of holding a batch up front.
//! It enforces the same encode-side size limits as a direct call to
//! `encode` would, just incrementally as triples are added rather than all
//! at once on flush.

use crate::error::Result;
use crate::limits::check_encode_array_size;
use crate::triple::Triple;
use crate::v1;

/// Accumulates triples for a single namespace and encodes them as a V1
/// chunk on [`flush`](StreamingEncoder::flush).
pub struct StreamingEncoder {
    namespace: String,
    buffered: Vec<Triple>,
}

impl StreamingEncoder {
    pub fn new(namespace: impl Into<String>) -> Self {
        StreamingEncoder { namespace: namespace.into(), buffered: Vec::new() }
    }

    /// Appends one triple to the pending batch. Rejected once the batch
    /// would exceed the encode-side array size limit, leaving the buffer
    /// unchanged so the caller can flush what it already has.
    pub fn add(&mut self, triple: Triple) -> Result<()> {
        check_encode_array_size(self.buffered.len() + 1, "streaming encoder batch length")?;
        self.buffered.push(triple);
        Ok(())
    }

    /// Number of triples currently buffered.
    pub fn len(&self) -> usize {
        self.buffered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffered.is_empty()
    }

    /// Encodes the buffered triples as a V1 chunk and clears the buffer.
    /// Returns an empty-batch chunk if nothing was buffered.
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        let bytes = v1::encode(&self.buffered, &self.namespace)?;
        self.buffered.clear();
        Ok(bytes)
    }

    /// Discards any buffered triples without encoding them.
    pub fn reset(&mut self) {
        self.buffered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn flush_encodes_and_clears_the_buffer() {
        let mut encoder = StreamingEncoder::new("ns");
        encoder.add(Triple::new("e1", "name", Object::Str("a".into()), 0, "tx")).unwrap();
        encoder.add(Triple::new("e2", "name", Object::Str("b".into()), 0, "tx")).unwrap();
        assert_eq!(encoder.len(), 2);

        let bytes = encoder.flush().unwrap();
        assert!(encoder.is_empty());

        let decoded = v1::decode(&bytes, None).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn flush_with_nothing_buffered_yields_an_empty_chunk() {
        let mut encoder = StreamingEncoder::new("ns");
        let bytes = encoder.flush().unwrap();
        assert_eq!(v1::decode(&bytes, None).unwrap().len(), 0);
    }

    #[test]
    fn reset_discards_buffered_triples() {
        let mut encoder = StreamingEncoder::new("ns");
        encoder.add(Triple::new("e1", "name", Object::Str("a".into()), 0, "tx")).unwrap();
        encoder.reset();
        assert!(encoder.is_empty());
    }

    #[test]
    fn add_after_flush_starts_a_fresh_batch() {
        let mut encoder = StreamingEncoder::new("ns");
        encoder.add(Triple::new("e1", "name", Object::Str("a".into()), 0, "tx")).unwrap();
        encoder.flush().unwrap();
        encoder.add(Triple::new("e2", "name", Object::Str("b".into()), 0, "tx")).unwrap();
        assert_eq!(encoder.len(), 1);
    }
}
