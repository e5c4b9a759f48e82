//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # REF_ARRAY column.
//!
//! Wire layout: `u32 outer_n (LE)`, `outer_n * u32` per-row lengths, then a
//! single flat dictionary column whose index count equals the sum of the
//! row lengths.

use crate::column::dictionary;
use crate::error::Error;
use crate::limits::check_decode_array_size;
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

/// Writes `rows` (each row a list of ref strings) as a REF_ARRAY column.
pub fn write(writer: &mut Writer, rows: &[Vec<String>]) {
    writer.u32_le(rows.len() as u32);
    for row in rows {
        writer.u32_le(row.len() as u32);
    }

    let flat: Vec<&str> = rows.iter().flat_map(|row| row.iter().map(String::as_str)).collect();
    let (dict, indices) = dictionary::build(&flat);
    dictionary::write(writer, &dict, &indices);
}

/// Reads a REF_ARRAY column back into per-row vectors of ref strings.
pub fn read(cursor: &mut Cursor) -> Result<Vec<Vec<String>>> {
    let outer_n = cursor.u32_le("ref_array row count")? as usize;
    check_decode_array_size(outer_n, "ref_array row count")?;

    let mut lengths = Vec::with_capacity(outer_n);
    let mut total: usize = 0;
    for _ in 0..outer_n {
        let len = cursor.u32_le("ref_array row length")? as usize;
        total = total.checked_add(len).ok_or(Error::BadEncoding("ref_array total length overflow"))?;
        check_decode_array_size(total, "ref_array flattened element count")?;
        lengths.push(len);
    }

    let (dict, indices) = dictionary::read(cursor, total)?;

    let mut rows = Vec::with_capacity(outer_n);
    let mut cursor_pos = 0usize;
    for len in lengths {
        let row: Vec<String> = indices[cursor_pos..cursor_pos + len]
            .iter()
            .map(|&index| dict[index as usize].clone())
            .collect();
        rows.push(row);
        cursor_pos += len;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rows_of_varying_length() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec![],
            vec!["a".to_string(), "c".to_string(), "b".to_string()],
        ];
        let mut writer = Writer::new();
        write(&mut writer, &rows);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), rows);
    }

    #[test]
    fn round_trips_when_empty() {
        let mut writer = Writer::new();
        write(&mut writer, &[]);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), Vec::<Vec<String>>::new());
    }
}
