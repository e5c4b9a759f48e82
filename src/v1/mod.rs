//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Triple codec — V1.
//!
//! A self-describing header (magic, version, triple count, timestamp
//! bounds, namespace, a predicate-name list kept for metadata purposes
//! only, and a column directory) followed by the six fixed structural
//! columns in order — subjects, predicates, object-type RLE, object-value
//! index, timestamps, tx ids — and then one optional value column per
//! object type actually present in the batch, in ascending tag order. A
//! trailing `u32` CRC-32/IEEE covers every byte that precedes it.

use std::collections::{HashMap, HashSet};
use std::convert::{TryFrom, TryInto};

use crate::column::{binary, bool_bits, dictionary, float64, geo, int32, int64, ref_array, rle};
use crate::crc32::crc32;
use crate::error::{ChecksumScope, Error, Result};
use crate::limits::{
    check_decode_array_size, check_encode_array_size, check_encode_total_bytes,
};
use crate::object::{GeoPoint, Object, ObjectTag, VALUE_COLUMN_TAGS};
use crate::reader::Cursor;
use crate::triple::Triple;
use crate::writer::Writer;

/// `'GCOL'` read as a little-endian `u32`.
pub const MAGIC: u32 = 0x4C4F_4347;
pub const VERSION: u16 = 1;

/// Below this size a V1 parse is not even attempted (`spec.md` §3 invariant 6,
/// tightened to the 36-byte floor `spec.md` §4.5 actually enforces).
pub const MIN_SIZE: usize = 36;

/// Header fields read ahead of the column payload, exposed separately so
/// `chunk_stats` can answer without decoding a single column.
pub struct HeaderInfo {
    pub triple_count: u32,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
    pub namespace: String,
    pub predicates: Vec<String>,
}

/// Accumulates per-object-type payload values while a batch is bucketed by
/// type, in row order. `Null` has no bucket: it is represented solely by the
/// `-1`/`0` value-index sentinel.
#[derive(Default)]
struct TypeBuckets {
    bools: Vec<bool>,
    int32s: Vec<i32>,
    int64s: Vec<i64>,
    float64s: Vec<f64>,
    strs: Vec<String>,
    binaries: Vec<Vec<u8>>,
    timestamps: Vec<i64>,
    dates: Vec<i32>,
    durations: Vec<String>,
    refs: Vec<String>,
    ref_arrays: Vec<Vec<String>>,
    jsons: Vec<String>,
    geo_points: Vec<GeoPoint>,
    urls: Vec<String>,
}

impl TypeBuckets {
    /// Appends `object`'s value to its type's bucket and returns the
    /// zero-based index it landed at, or `None` for `Null`.
    fn push(&mut self, object: &Object) -> Option<usize> {
        match object {
            Object::Null => None,
            Object::Bool(v) => { self.bools.push(*v); Some(self.bools.len() - 1) }
            Object::Int32(v) => { self.int32s.push(*v); Some(self.int32s.len() - 1) }
            Object::Int64(v) => { self.int64s.push(*v); Some(self.int64s.len() - 1) }
            Object::Float64(v) => { self.float64s.push(*v); Some(self.float64s.len() - 1) }
            Object::Str(v) => { self.strs.push(v.clone()); Some(self.strs.len() - 1) }
            Object::Binary(v) => { self.binaries.push(v.clone()); Some(self.binaries.len() - 1) }
            Object::Timestamp(v) => { self.timestamps.push(*v); Some(self.timestamps.len() - 1) }
            Object::Date(v) => { self.dates.push(*v); Some(self.dates.len() - 1) }
            Object::Duration(v) => { self.durations.push(v.clone()); Some(self.durations.len() - 1) }
            Object::Ref(v) => { self.refs.push(v.clone()); Some(self.refs.len() - 1) }
            Object::RefArray(v) => { self.ref_arrays.push(v.clone()); Some(self.ref_arrays.len() - 1) }
            Object::Json(v) => { self.jsons.push(v.clone()); Some(self.jsons.len() - 1) }
            Object::GeoPoint(v) => { self.geo_points.push(*v); Some(self.geo_points.len() - 1) }
            Object::Url(v) => { self.urls.push(v.clone()); Some(self.urls.len() - 1) }
        }
    }

    /// Encodes the value column for `tag`, or `None` if no row carried that type.
    fn encode_column(&self, tag: ObjectTag) -> Option<Vec<u8>> {
        let mut writer = Writer::new();
        let non_empty = match tag {
            ObjectTag::Bool => !self.bools.is_empty(),
            ObjectTag::Int32 => !self.int32s.is_empty(),
            ObjectTag::Int64 => !self.int64s.is_empty(),
            ObjectTag::Float64 => !self.float64s.is_empty(),
            ObjectTag::Str => !self.strs.is_empty(),
            ObjectTag::Binary => !self.binaries.is_empty(),
            ObjectTag::Timestamp => !self.timestamps.is_empty(),
            ObjectTag::Date => !self.dates.is_empty(),
            ObjectTag::Duration => !self.durations.is_empty(),
            ObjectTag::Ref => !self.refs.is_empty(),
            ObjectTag::RefArray => !self.ref_arrays.is_empty(),
            ObjectTag::Json => !self.jsons.is_empty(),
            ObjectTag::GeoPoint => !self.geo_points.is_empty(),
            ObjectTag::Url => !self.urls.is_empty(),
            ObjectTag::Null | ObjectTag::Vector => false,
        };
        if !non_empty {
            return None;
        }
        match tag {
            ObjectTag::Bool => bool_bits::write(&mut writer, &self.bools),
            ObjectTag::Int32 => int32::write(&mut writer, &self.int32s),
            ObjectTag::Int64 => int64::write_plain(&mut writer, &self.int64s),
            ObjectTag::Float64 => float64::write(&mut writer, &self.float64s),
            ObjectTag::Str => write_string_dictionary(&mut writer, &self.strs),
            ObjectTag::Binary => binary::write(&mut writer, &self.binaries),
            ObjectTag::Timestamp => int64::write_delta(&mut writer, &self.timestamps),
            ObjectTag::Date => int32::write(&mut writer, &self.dates),
            ObjectTag::Duration => write_string_dictionary(&mut writer, &self.durations),
            ObjectTag::Ref => write_string_dictionary(&mut writer, &self.refs),
            ObjectTag::RefArray => ref_array::write(&mut writer, &self.ref_arrays),
            ObjectTag::Json => write_string_dictionary(&mut writer, &self.jsons),
            ObjectTag::GeoPoint => geo::write(&mut writer, &self.geo_points),
            ObjectTag::Url => write_string_dictionary(&mut writer, &self.urls),
            ObjectTag::Null | ObjectTag::Vector => unreachable!(),
        }
        Some(writer.into_bytes())
    }
}

fn write_string_dictionary(writer: &mut Writer, values: &[String]) {
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    let (dict, indices) = dictionary::build(&refs);
    dictionary::write(writer, &dict, &indices);
}

/// Rough pre-flight size estimate used to reject oversized batches before any
/// allocation beyond this pass. Deliberately coarse: per-row overhead plus the
/// byte length of every string/binary/ref-array payload.
fn estimate_encoded_bytes(triples: &[Triple], namespace: &str) -> usize {
    let mut total = namespace.len() + 64;
    for triple in triples {
        total += triple.subject.len() + triple.predicate.len() + triple.tx_id.len() + 24;
        total += match &triple.object {
            Object::Null => 0,
            Object::Bool(_) => 1,
            Object::Int32(_) | Object::Date(_) => 5,
            Object::Int64(_) | Object::Timestamp(_) => 10,
            Object::Float64(_) => 8,
            Object::Str(v) | Object::Duration(v) | Object::Ref(v) | Object::Json(v) | Object::Url(v) => v.len(),
            Object::Binary(v) => v.len(),
            Object::RefArray(v) => v.iter().map(String::len).sum(),
            Object::GeoPoint(_) => 16,
        };
    }
    total
}

/// Encodes `triples` as a V1 chunk under `namespace`.
pub fn encode(triples: &[Triple], namespace: &str) -> Result<Vec<u8>> {
    check_encode_array_size(triples.len(), "triple batch length")?;
    check_encode_total_bytes(estimate_encoded_bytes(triples, namespace), "triple batch size estimate")?;
    if namespace.len() > u16::MAX as usize {
        return Err(Error::BadArgument("namespace exceeds 65535 bytes"));
    }

    let triple_count = triples.len();
    let subjects: Vec<&str> = triples.iter().map(|t| t.subject.as_str()).collect();
    let predicates: Vec<&str> = triples.iter().map(|t| t.predicate.as_str()).collect();
    let tx_ids: Vec<&str> = triples.iter().map(|t| t.tx_id.as_str()).collect();
    let timestamps: Vec<i64> = triples.iter().map(|t| t.timestamp).collect();

    let mut buckets = TypeBuckets::default();
    let mut type_tags = Vec::with_capacity(triple_count);
    let mut value_indices = Vec::with_capacity(triple_count);
    for triple in triples {
        type_tags.push(triple.object.tag() as u8);
        value_indices.push(buckets.push(&triple.object));
    }

    let (subj_dict, subj_idx) = dictionary::build(&subjects);
    let mut subj_col = Writer::new();
    dictionary::write(&mut subj_col, &subj_dict, &subj_idx);

    let (pred_dict, pred_idx) = dictionary::build(&predicates);
    if pred_dict.len() > u16::MAX as usize {
        return Err(Error::BadArgument("distinct predicate count exceeds 65535"));
    }
    let mut pred_col = Writer::new();
    dictionary::write(&mut pred_col, &pred_dict, &pred_idx);

    let mut type_col = Writer::new();
    rle::write(&mut type_col, &rle::build_runs(&type_tags));

    let mut value_index_col = Writer::new();
    for &index in &value_indices {
        let wire = match index {
            None => 0u64,
            Some(i) => (i as u64) + 1,
        };
        value_index_col.uvarint(wire);
    }

    let mut ts_col = Writer::new();
    int64::write_delta(&mut ts_col, &timestamps);

    let (txid_dict, txid_idx) = dictionary::build(&tx_ids);
    let mut txid_col = Writer::new();
    dictionary::write(&mut txid_col, &txid_dict, &txid_idx);

    let mut columns: Vec<Vec<u8>> = vec![
        subj_col.into_bytes(),
        pred_col.into_bytes(),
        type_col.into_bytes(),
        value_index_col.into_bytes(),
        ts_col.into_bytes(),
        txid_col.into_bytes(),
    ];

    for tag in VALUE_COLUMN_TAGS.iter().copied() {
        if let Some(body) = buckets.encode_column(tag) {
            let mut marked = Vec::with_capacity(body.len() + 1);
            marked.push(tag as u8);
            marked.extend_from_slice(&body);
            columns.push(marked);
        }
    }

    let (min_ts, max_ts) = if timestamps.is_empty() {
        (0i64, 0i64)
    } else {
        (
            *timestamps.iter().min().unwrap(),
            *timestamps.iter().max().unwrap(),
        )
    };

    let column_count = columns.len();
    let mut header_len = 4 + 2 + 4 + 2 + 8 + 8;
    header_len += 2 + namespace.len();
    header_len += 2;
    for predicate in &pred_dict {
        if predicate.len() > u16::MAX as usize {
            return Err(Error::BadArgument("predicate name exceeds 65535 bytes"));
        }
        header_len += 2 + predicate.len();
    }
    header_len += 2;
    header_len += column_count * 8;

    let mut offset = header_len;
    let mut directory = Vec::with_capacity(column_count);
    for column in &columns {
        directory.push((offset, column.len()));
        offset += column.len();
    }

    check_encode_total_bytes(offset + 4, "encoded payload size")?;
    if offset > u32::MAX as usize {
        return Err(Error::BadArgument("encoded payload exceeds 4 GiB"));
    }

    let mut writer = Writer::with_capacity(offset + 4);
    writer.u32_le(MAGIC);
    writer.u16_le(VERSION);
    writer.u32_le(triple_count as u32);
    writer.u16_le(0);
    writer.i64_le(min_ts);
    writer.i64_le(max_ts);
    writer.string_u16_len(namespace);
    writer.u16_le(pred_dict.len() as u16);
    for predicate in &pred_dict {
        writer.string_u16_len(predicate);
    }
    writer.u16_le(column_count as u16);
    for &(col_offset, col_len) in &directory {
        writer.u32_le(col_offset as u32);
        writer.u32_le(col_len as u32);
    }
    for column in &columns {
        writer.bytes_raw(column);
    }

    debug_assert_eq!(writer.len(), offset);
    let crc = crc32(writer.bytes());
    writer.u32_le(crc);
    Ok(writer.into_bytes())
}

fn verify_crc(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 4 {
        return Err(Error::Truncated("v1 trailing crc"));
    }
    let region = &bytes[..bytes.len() - 4];
    let stored = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    let computed = crc32(region);
    if stored != computed {
        return Err(Error::Checksum { stored, computed, scope: ChecksumScope::Payload });
    }
    Ok(())
}

/// Parses the header only (magic, version, counts, namespace, header
/// predicate list, column directory) without touching any column payload.
/// Still verifies the whole-payload CRC: a corrupted chunk must not be
/// trusted even for metadata-only reads.
pub fn read_header(bytes: &[u8]) -> Result<HeaderInfo> {
    if bytes.len() < MIN_SIZE {
        return Err(Error::Truncated("v1 header"));
    }
    verify_crc(bytes)?;

    let mut cursor = Cursor::new(bytes);
    let magic = cursor.u32_le("magic")?;
    if magic != MAGIC {
        return Err(Error::BadMagic { expected: MAGIC, found: magic });
    }
    let version = cursor.u16_le("version")?;
    if version != VERSION {
        return Err(Error::BadVersion(version));
    }
    let triple_count = cursor.u32_le("triple count")?;
    check_decode_array_size(triple_count as usize, "triple count")?;
    let _flags = cursor.u16_le("flags")?;
    let min_timestamp = cursor.i64_le("min timestamp")?;
    let max_timestamp = cursor.i64_le("max timestamp")?;
    let namespace = cursor.string_u16_len("namespace")?;

    let predicate_count = cursor.u16_le("predicate count")? as usize;
    check_decode_array_size(predicate_count, "predicate count")?;
    let mut predicates = Vec::with_capacity(predicate_count);
    for _ in 0..predicate_count {
        predicates.push(cursor.string_u16_len("header predicate name")?);
    }

    let column_count = cursor.u16_le("column count")? as usize;
    check_decode_array_size(column_count, "column count")?;
    for _ in 0..column_count {
        let _column_offset = cursor.u32_le("column offset")?;
        let _column_length = cursor.u32_le("column length")?;
    }

    Ok(HeaderInfo { triple_count, min_timestamp, max_timestamp, namespace, predicates })
}

/// The value columns actually present, keyed by tag, decoded lazily in the
/// order their type markers appear on the wire.
enum DecodedColumn {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Str(Vec<String>),
    Binary(Vec<Vec<u8>>),
    Timestamp(Vec<i64>),
    Date(Vec<i32>),
    Duration(Vec<String>),
    Ref(Vec<String>),
    RefArray(Vec<Vec<String>>),
    Json(Vec<String>),
    GeoPoint(Vec<GeoPoint>),
    Url(Vec<String>),
}

fn read_string_dictionary(cursor: &mut Cursor, n: usize) -> Result<Vec<String>> {
    let (dict, indices) = dictionary::read(cursor, n)?;
    Ok(indices.into_iter().map(|i| dict[i as usize].clone()).collect())
}

fn read_value_column(cursor: &mut Cursor, tag: ObjectTag, n: usize) -> Result<DecodedColumn> {
    Ok(match tag {
        ObjectTag::Bool => DecodedColumn::Bool(bool_bits::read(cursor)?),
        ObjectTag::Int32 => DecodedColumn::Int32(int32::read(cursor)?),
        ObjectTag::Int64 => DecodedColumn::Int64(int64::read_plain(cursor)?),
        ObjectTag::Float64 => DecodedColumn::Float64(float64::read(cursor)?),
        ObjectTag::Str => DecodedColumn::Str(read_string_dictionary(cursor, n)?),
        ObjectTag::Binary => DecodedColumn::Binary(binary::read(cursor)?),
        ObjectTag::Timestamp => DecodedColumn::Timestamp(int64::read_delta(cursor)?),
        ObjectTag::Date => DecodedColumn::Date(int32::read(cursor)?),
        ObjectTag::Duration => DecodedColumn::Duration(read_string_dictionary(cursor, n)?),
        ObjectTag::Ref => DecodedColumn::Ref(read_string_dictionary(cursor, n)?),
        ObjectTag::RefArray => DecodedColumn::RefArray(ref_array::read(cursor)?),
        ObjectTag::Json => DecodedColumn::Json(read_string_dictionary(cursor, n)?),
        ObjectTag::GeoPoint => DecodedColumn::GeoPoint(geo::read(cursor)?),
        ObjectTag::Url => DecodedColumn::Url(read_string_dictionary(cursor, n)?),
        ObjectTag::Null | ObjectTag::Vector => {
            return Err(Error::BadEncoding("unexpected value column type marker"));
        }
    })
}

fn build_object(tag: ObjectTag, index: usize, columns: &HashMap<u8, DecodedColumn>) -> Result<Object> {
    let column = columns
        .get(&(tag as u8))
        .ok_or(Error::BadEncoding("value column missing for referenced object type"))?;
    let value = match column {
        DecodedColumn::Bool(v) => v.get(index).copied().map(Object::Bool),
        DecodedColumn::Int32(v) => v.get(index).copied().map(Object::Int32),
        DecodedColumn::Int64(v) => v.get(index).copied().map(Object::Int64),
        DecodedColumn::Float64(v) => v.get(index).copied().map(Object::Float64),
        DecodedColumn::Str(v) => v.get(index).cloned().map(Object::Str),
        DecodedColumn::Binary(v) => v.get(index).cloned().map(Object::Binary),
        DecodedColumn::Timestamp(v) => v.get(index).copied().map(Object::Timestamp),
        DecodedColumn::Date(v) => v.get(index).copied().map(Object::Date),
        DecodedColumn::Duration(v) => v.get(index).cloned().map(Object::Duration),
        DecodedColumn::Ref(v) => v.get(index).cloned().map(Object::Ref),
        DecodedColumn::RefArray(v) => v.get(index).cloned().map(Object::RefArray),
        DecodedColumn::Json(v) => v.get(index).cloned().map(Object::Json),
        DecodedColumn::GeoPoint(v) => v.get(index).copied().map(Object::GeoPoint),
        DecodedColumn::Url(v) => v.get(index).cloned().map(Object::Url),
    };
    value.ok_or(Error::BadEncoding("value index out of range for its column"))
}

/// Decodes a V1 chunk, auto-counting per-type occurrences from the expanded
/// object-type column so every value column's implicit row count can be
/// recovered without re-reading the structural columns. `predicates`, when
/// `Some` and non-empty, projects the output down to triples whose predicate
/// is in the set — every row is still walked so per-type value counters stay
/// consistent, matching `spec.md` §4.5.
pub fn decode(bytes: &[u8], predicates: Option<&HashSet<String>>) -> Result<Vec<Triple>> {
    if bytes.len() < MIN_SIZE {
        return Err(Error::Truncated("v1 payload"));
    }
    verify_crc(bytes)?;
    let crc_boundary = bytes.len() - 4;

    let mut cursor = Cursor::new(bytes);
    let magic = cursor.u32_le("magic")?;
    if magic != MAGIC {
        return Err(Error::BadMagic { expected: MAGIC, found: magic });
    }
    let version = cursor.u16_le("version")?;
    if version != VERSION {
        return Err(Error::BadVersion(version));
    }
    let triple_count = cursor.u32_le("triple count")? as usize;
    check_decode_array_size(triple_count, "triple count")?;
    let _flags = cursor.u16_le("flags")?;
    let _min_timestamp = cursor.i64_le("min timestamp")?;
    let _max_timestamp = cursor.i64_le("max timestamp")?;
    let _namespace = cursor.string_u16_len("namespace")?;

    let predicate_count = cursor.u16_le("predicate count")? as usize;
    check_decode_array_size(predicate_count, "predicate count")?;
    for _ in 0..predicate_count {
        let _ = cursor.string_u16_len("header predicate name")?;
    }

    let column_count = cursor.u16_le("column count")? as usize;
    check_decode_array_size(column_count, "column count")?;
    for _ in 0..column_count {
        let _column_offset = cursor.u32_le("column offset")?;
        let _column_length = cursor.u32_le("column length")?;
    }

    if triple_count == 0 {
        return Ok(Vec::new());
    }

    let (subj_dict, subj_idx) = dictionary::read(&mut cursor, triple_count)?;
    let (pred_dict, pred_idx) = dictionary::read(&mut cursor, triple_count)?;
    let type_tags = rle::read(&mut cursor)?;
    if type_tags.len() != triple_count {
        return Err(Error::BadEncoding("object-type column length does not match triple count"));
    }

    let mut value_indices = Vec::with_capacity(triple_count);
    for _ in 0..triple_count {
        let raw = cursor.uvarint()?;
        value_indices.push(if raw == 0 { None } else { Some((raw - 1) as usize) });
    }

    let timestamps = int64::read_delta(&mut cursor)?;
    if timestamps.len() != triple_count {
        return Err(Error::BadEncoding("timestamp column length does not match triple count"));
    }

    let (txid_dict, txid_idx) = dictionary::read(&mut cursor, triple_count)?;

    let mut occurrences: HashMap<u8, usize> = HashMap::new();
    for &tag in &type_tags {
        *occurrences.entry(tag).or_insert(0) += 1;
    }

    let mut decoded_columns: HashMap<u8, DecodedColumn> = HashMap::new();
    while cursor.offset() < crc_boundary {
        let marker = cursor.u8("value column type marker")?;
        let tag = ObjectTag::try_from(marker)?;
        let n = *occurrences.get(&marker).unwrap_or(&0);
        let column = read_value_column(&mut cursor, tag, n)?;
        if cursor.offset() > crc_boundary {
            return Err(Error::BadEncoding("value column overran payload"));
        }
        decoded_columns.insert(marker, column);
    }

    let mut triples = Vec::with_capacity(triple_count);
    for i in 0..triple_count {
        let tag = ObjectTag::try_from(type_tags[i])?;
        let object = match (tag, value_indices[i]) {
            (ObjectTag::Null, None) => Object::Null,
            (ObjectTag::Null, Some(_)) => return Err(Error::BadEncoding("null row carries a value index")),
            (_, None) => return Err(Error::BadEncoding("non-null row missing a value index")),
            (_, Some(index)) => build_object(tag, index, &decoded_columns)?,
        };

        let predicate = pred_dict[pred_idx[i] as usize].clone();
        if let Some(wanted) = predicates {
            if !wanted.is_empty() && !wanted.contains(&predicate) {
                continue;
            }
        }

        triples.push(Triple {
            subject: subj_dict[subj_idx[i] as usize].clone(),
            predicate,
            object,
            timestamp: timestamps[i],
            tx_id: txid_dict[txid_idx[i] as usize].clone(),
        });
    }

    Ok(triples)
}
