//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # INT64 / TIMESTAMP column.
//!
//! Wire layout: `u32 n (LE)`, then `n` signed varints. For a plain INT64
//! column each varint is the value itself; for a TIMESTAMP column the first
//! varint is the value as-is and every subsequent one is the zigzag-encoded
//! signed difference from the previous value.

use crate::limits::check_decode_array_size;
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

/// Writes `values` as a plain (non-delta) signed varint column.
pub fn write_plain(writer: &mut Writer, values: &[i64]) {
    writer.u32_le(values.len() as u32);
    for &value in values {
        writer.ivarint(value);
    }
}

/// Reads a plain signed varint column of `n` values (count is on the wire).
pub fn read_plain(cursor: &mut Cursor) -> Result<Vec<i64>> {
    let n = cursor.u32_le("int64 column length")? as usize;
    check_decode_array_size(n, "int64 column length")?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        values.push(cursor.ivarint()?);
    }
    Ok(values)
}

/// Writes `values` delta-coded: the first value as-is, each subsequent value as
/// the signed difference from its predecessor.
pub fn write_delta(writer: &mut Writer, values: &[i64]) {
    writer.u32_le(values.len() as u32);
    let mut previous = 0i64;
    for (i, &value) in values.iter().enumerate() {
        if i == 0 {
            writer.ivarint(value);
        } else {
            writer.ivarint(value.wrapping_sub(previous));
        }
        previous = value;
    }
}

/// Reads a delta-coded column of timestamps.
pub fn read_delta(cursor: &mut Cursor) -> Result<Vec<i64>> {
    let n = cursor.u32_le("timestamp column length")? as usize;
    check_decode_array_size(n, "timestamp column length")?;
    let mut values = Vec::with_capacity(n);
    let mut previous = 0i64;
    for i in 0..n {
        let raw = cursor.ivarint()?;
        let value = if i == 0 { raw } else { previous.wrapping_add(raw) };
        values.push(value);
        previous = value;
    }
    Ok(values)
}
