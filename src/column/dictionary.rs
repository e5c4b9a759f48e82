//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Dictionary column.
//!
//! Wire layout: `u32 dict_size (LE)`, then `dict_size` entries each
//! `u32 len (LE)` + raw bytes, then `n` varint indices (`n` supplied by the
//! surrounding context, not stored in the column). Used for subjects,
//! predicates, tx ids, and every string-ish object type.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::limits::{check_decode_array_size, check_decode_total_bytes};
use crate::reader::Cursor;
use crate::writer::Writer;

/// Builds a dictionary in first-occurrence order and returns it alongside the
/// per-row index into it.
pub fn build(values: &[&str]) -> (Vec<String>, Vec<u32>) {
    let mut dict = Vec::new();
    let mut index_of: HashMap<&str, u32> = HashMap::new();
    let mut indices = Vec::with_capacity(values.len());

    for value in values {
        let index = *index_of.entry(*value).or_insert_with(|| {
            dict.push((*value).to_string());
            (dict.len() - 1) as u32
        });
        indices.push(index);
    }

    (dict, indices)
}

/// Writes the dictionary and its indices in wire order.
pub fn write(writer: &mut Writer, dict: &[String], indices: &[u32]) {
    writer.u32_le(dict.len() as u32);
    for entry in dict {
        writer.string_u32_len(entry);
    }
    for &index in indices {
        writer.uvarint(index as u64);
    }
}

/// Reads a dictionary column given the row count `n` (the index count is implicit).
pub fn read(cursor: &mut Cursor, n: usize) -> Result<(Vec<String>, Vec<u32>)> {
    let dict_size = cursor.u32_le("dictionary size")? as usize;
    check_decode_array_size(dict_size, "dictionary entry count")?;

    let mut dict = Vec::with_capacity(dict_size);
    let mut total_bytes = 0usize;
    for _ in 0..dict_size {
        let len = cursor.u32_le("dictionary entry length")? as usize;
        total_bytes = total_bytes.saturating_add(len);
        check_decode_total_bytes(total_bytes, "dictionary entry bytes")?;
        let bytes = cursor.take(len, "dictionary entry bytes")?;
        let value = String::from_utf8(bytes.to_vec()).map_err(|_| Error::BadEncoding("dictionary entry utf-8"))?;
        dict.push(value);
    }

    let mut indices = Vec::with_capacity(n);
    for _ in 0..n {
        let index = cursor.uvarint()?;
        if index as usize >= dict.len() {
            return Err(Error::BadEncoding("dictionary index out of range"));
        }
        indices.push(index as u32);
    }

    Ok((dict, indices))
}
