//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # INT32 / DATE column.
//!
//! Wire layout: `u32 n (LE)`, then `n` zigzagged unsigned varints. Used for
//! plain `Int32` values and for `Date` (signed day counts).

use crate::limits::check_decode_array_size;
use crate::reader::Cursor;
use crate::varint::{zigzag_decode_i32, zigzag_encode_i32};
use crate::writer::Writer;
use crate::Result;

pub fn write(writer: &mut Writer, values: &[i32]) {
    writer.u32_le(values.len() as u32);
    for &value in values {
        writer.uvarint(zigzag_encode_i32(value) as u64);
    }
}

pub fn read(cursor: &mut Cursor) -> Result<Vec<i32>> {
    let n = cursor.u32_le("int32 column length")? as usize;
    check_decode_array_size(n, "int32 column length")?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let z = cursor.uvarint()?;
        values.push(zigzag_decode_i32(z as u32));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_extreme_and_ordinary_values() {
        let values = vec![0i32, 1, -1, i32::MAX, i32::MIN, 19_723];
        let mut writer = Writer::new();
        write(&mut writer, &values);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), values);
    }
}
