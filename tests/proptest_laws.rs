use std::collections::HashSet;

use graphcol::{chunk_stats, decode, decode_entity, encode, encode_v2, read_entity_index, Object, Triple};
use proptest::prelude::*;

/// A small alphabet keeps generated identifiers short and distinct-looking
/// without dragging proptest's shrinker through arbitrary Unicode.
fn ident() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn object() -> impl Strategy<Value = Object> {
    prop_oneof![
        Just(Object::Null),
        any::<bool>().prop_map(Object::Bool),
        any::<i32>().prop_map(Object::Int32),
        any::<i64>().prop_map(Object::Int64),
        // NaN deliberately excluded: it round-trips bitwise (covered by a
        // dedicated `to_bits` test in `src/v1/mod.rs`) but `NaN != NaN`
        // under `PartialEq`, which would make this property flaky.
        any::<f64>().prop_filter("exclude NaN", |f| !f.is_nan()).prop_map(Object::Float64),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Object::Str),
    ]
}

fn triple() -> impl Strategy<Value = Triple> {
    (ident(), ident(), object(), any::<i64>(), ident())
        .prop_map(|(s, p, o, ts, tx)| Triple::new(s, p, o, ts, tx))
}

fn batch(max_len: usize) -> impl Strategy<Value = Vec<Triple>> {
    prop::collection::vec(triple(), 0..max_len)
}

proptest! {
    /// Law 1: round-trip. V1 preserves row order exactly.
    #[test]
    fn round_trip_preserves_v1_row_order(triples in batch(40)) {
        let bytes = encode(&triples, "ns").unwrap();
        let decoded = decode(&bytes, None).unwrap();
        prop_assert_eq!(decoded, triples);
    }

    /// Law 1 (V2 half): the decoded multiset matches, sorted by subject.
    #[test]
    fn round_trip_v2_preserves_the_multiset_sorted_by_subject(triples in batch(40)) {
        let bytes = encode_v2(&triples, "ns").unwrap();
        let decoded = decode(&bytes, None).unwrap();

        let mut expected = triples.clone();
        expected.sort_by(|a, b| a.subject.cmp(&b.subject));
        prop_assert_eq!(decoded.clone(), expected);

        for pair in decoded.windows(2) {
            prop_assert!(pair[0].subject <= pair[1].subject);
        }
    }

    /// Law 2: column pruning soundness.
    #[test]
    fn predicate_projection_matches_filtering_the_full_decode(triples in batch(40), keep in ident()) {
        let bytes = encode(&triples, "ns").unwrap();
        let mut wanted = HashSet::new();
        wanted.insert(keep.clone());

        let projected = decode(&bytes, Some(&wanted)).unwrap();
        let expected: Vec<Triple> = decode(&bytes, None).unwrap().into_iter().filter(|t| t.predicate == keep).collect();
        prop_assert_eq!(projected, expected);
    }

    /// Law 3: corruption detection. A single bit flip anywhere in a non-empty
    /// V1 chunk either fails the CRC or fails an earlier structural check —
    /// it never silently decodes to something different.
    #[test]
    fn a_single_bit_flip_is_never_silently_accepted(triples in batch(20).prop_filter("need at least one row", |t| !t.is_empty()), flip_index in any::<usize>()) {
        let original = encode(&triples, "ns").unwrap();
        let mut corrupted = original.clone();
        let i = flip_index % corrupted.len();
        corrupted[i] ^= 0x01;

        match decode(&corrupted, None) {
            Err(_) => {}
            Ok(decoded) => prop_assert_eq!(decoded, triples),
        }
    }

    /// Law 3 (V2 half): a bit flip confined to the entity index region of a
    /// V2 chunk is caught too, not just flips inside the V1 payload.
    #[test]
    fn a_bit_flip_inside_the_v2_entity_index_is_never_silently_accepted(triples in batch(20).prop_filter("need at least one row", |t| !t.is_empty())) {
        let original = encode_v2(&triples, "ns").unwrap();
        let footer = graphcol::read_footer(&original).unwrap();
        prop_assume!(footer.index_length > 0);

        let mut corrupted = original.clone();
        let index_mid = footer.index_offset as usize + footer.index_length as usize / 2;
        corrupted[index_mid] ^= 0x01;

        prop_assert!(decode(&corrupted, None).is_err());
    }

    /// Law 4: varint/zigzag inverse, exercised through INT64 objects (the
    /// codec's varint layer is internal, so this checks it via the public
    /// round-trip surface instead of calling it directly).
    #[test]
    fn int64_objects_round_trip_through_the_signed_varint_layer(n in any::<i64>()) {
        let triples = vec![Triple::new("s", "p", Object::Int64(n), 0, "tx")];
        let bytes = encode(&triples, "ns").unwrap();
        let decoded = decode(&bytes, None).unwrap();
        prop_assert_eq!(decoded[0].object.clone(), Object::Int64(n));
    }

    /// Law 5: CRC stability — encoding the same batch twice is deterministic.
    #[test]
    fn encoding_the_same_batch_twice_produces_identical_bytes(triples in batch(30)) {
        let a = encode(&triples, "ns").unwrap();
        let b = encode(&triples, "ns").unwrap();
        prop_assert_eq!(a, b);
    }

    /// Law 8: entity index monotonicity.
    #[test]
    fn entity_index_entries_are_sorted_and_unique(triples in batch(40)) {
        let bytes = encode_v2(&triples, "ns").unwrap();
        let entries = read_entity_index(&bytes).unwrap();
        for pair in entries.windows(2) {
            prop_assert!(pair[0].entity_id < pair[1].entity_id);
        }
    }

    /// Law 9: decode_entity completeness.
    #[test]
    fn decode_entity_returns_exactly_a_subjects_rows_or_none(triples in batch(40), probe in ident()) {
        let bytes = encode_v2(&triples, "ns").unwrap();
        let expected: Vec<Triple> = triples.iter().cloned().filter(|t| t.subject == probe).collect();

        let got = decode_entity(&bytes, &probe).unwrap().unwrap_or_default();
        let mut got_sorted = got;
        got_sorted.sort_by_key(|t| format!("{:?}", t));
        let mut expected_sorted = expected;
        expected_sorted.sort_by_key(|t| format!("{:?}", t));
        prop_assert_eq!(got_sorted, expected_sorted);
    }

    /// Law 10: empty-chunk validity, generalized to "no triples carry this
    /// namespace's predicate" rather than just the literal empty batch.
    #[test]
    fn chunk_stats_triple_count_matches_the_encoded_batch_length(triples in batch(40)) {
        let bytes = encode(&triples, "ns").unwrap();
        let stats = chunk_stats(&bytes).unwrap();
        prop_assert_eq!(stats.triple_count as usize, triples.len());
    }
}
