//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # FLOAT64 column.
//!
//! Wire layout: `u32 n (LE)`, then `n * 8` bytes little-endian. Values are
//! stored bit-for-bit: `NaN`, `±∞` and `-0.0` round-trip exactly, they are
//! never normalized.

use std::convert::TryInto;

use crate::limits::{check_decode_array_size, check_decode_total_bytes};
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

pub fn write(writer: &mut Writer, values: &[f64]) {
    writer.u32_le(values.len() as u32);
    for &value in values {
        writer.f64_le(value);
    }
}

pub fn read(cursor: &mut Cursor) -> Result<Vec<f64>> {
    let n = cursor.u32_le("float64 column length")? as usize;
    check_decode_array_size(n, "float64 column length")?;
    check_decode_total_bytes(n * 8, "float64 column bytes")?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let bytes = cursor.take(8, "float64 value")?;
        let array: [u8; 8] = bytes.try_into().map_err(|_| crate::error::Error::Truncated("float64 value"))?;
        values.push(f64::from_le_bytes(array));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bit_for_bit_including_special_values() {
        let values = vec![0.0f64, -0.0, 1.5, -1.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        let mut writer = Writer::new();
        write(&mut writer, &values);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        let decoded = read(&mut cursor).unwrap();
        assert_eq!(decoded.len(), values.len());
        for (a, b) in decoded.iter().zip(values.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
