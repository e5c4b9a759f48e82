//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # BOOL column.
//!
//! Wire layout: `u32 n (LE)`, then `ceil(n/8)` bytes, bit `i` stored at
//! byte `i >> 3`, bit `i & 7` (LSB-first within a byte).

use crate::limits::{check_decode_array_size, check_decode_total_bytes};
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

pub fn write(writer: &mut Writer, values: &[bool]) {
    writer.u32_le(values.len() as u32);
    let mut packed = vec![0u8; (values.len() + 7) / 8];
    for (i, &value) in values.iter().enumerate() {
        if value {
            packed[i >> 3] |= 1 << (i & 7);
        }
    }
    writer.bytes_raw(&packed);
}

pub fn read(cursor: &mut Cursor) -> Result<Vec<bool>> {
    let n = cursor.u32_le("bool column length")? as usize;
    check_decode_array_size(n, "bool column length")?;
    let byte_count = (n + 7) / 8;
    check_decode_total_bytes(byte_count, "bool column bytes")?;
    let packed = cursor.take(byte_count, "bool column bytes")?;
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let byte = packed[i >> 3];
        values.push((byte >> (i & 7)) & 1 != 0);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_across_byte_boundaries() {
        let values: Vec<bool> = (0..20).map(|i| i % 3 == 0).collect();
        let mut writer = Writer::new();
        write(&mut writer, &values);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), values);
    }

    #[test]
    fn round_trips_empty_column() {
        let mut writer = Writer::new();
        write(&mut writer, &[]);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), Vec::<bool>::new());
    }
}
