//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # BINARY column.
//!
//! Wire layout: `u32 n (LE)`, then each element `u32 len (LE)` + bytes.
//! Cumulative size is checked incrementally against `MAX_DECODE_TOTAL_BYTES`
//! as each element is read.

use crate::limits::{check_decode_array_size, check_decode_total_bytes};
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

pub fn write(writer: &mut Writer, values: &[Vec<u8>]) {
    writer.u32_le(values.len() as u32);
    for value in values {
        writer.u32_le(value.len() as u32);
        writer.bytes_raw(value);
    }
}

pub fn read(cursor: &mut Cursor) -> Result<Vec<Vec<u8>>> {
    let n = cursor.u32_le("binary column length")? as usize;
    check_decode_array_size(n, "binary column length")?;

    let mut values = Vec::with_capacity(n);
    let mut total_bytes = 0usize;
    for _ in 0..n {
        let len = cursor.u32_le("binary element length")? as usize;
        total_bytes = total_bytes.saturating_add(len);
        check_decode_total_bytes(total_bytes, "binary column bytes")?;
        let bytes = cursor.take(len, "binary element bytes")?;
        values.push(bytes.to_vec());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let values = vec![vec![1u8, 2, 3], vec![], vec![9u8; 40]];
        let mut writer = Writer::new();
        write(&mut writer, &values);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), values);
    }

    #[test]
    fn incremental_check_fires_before_allocating_the_whole_claimed_size() {
        let mut writer = Writer::new();
        writer.u32_le(1);
        writer.u32_le(300 * 1024 * 1024);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert!(read(&mut cursor).is_err());
    }
}
