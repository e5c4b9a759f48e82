//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # RLE column.
//!
//! Used only for the object-type tag column. Wire layout: `u32 run_count
//! (LE)`, then each run is `u8 value`, `u16 count (LE)`. A run stops at
//! `count == 65535` or when the next byte differs, so no single run can
//! silently claim an unbounded expansion.

use crate::error::Error;
use crate::limits::check_decode_array_size;
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

/// Splits `values` into `(value, run_length)` runs, capping each run at `u16::MAX`.
pub fn build_runs(values: &[u8]) -> Vec<(u8, u16)> {
    let mut runs = Vec::new();
    let mut iter = values.iter().copied();
    let Some(mut current) = iter.next() else {
        return runs;
    };
    let mut count: u16 = 1;

    for value in iter {
        if value == current && count < u16::MAX {
            count += 1;
        } else {
            runs.push((current, count));
            current = value;
            count = 1;
        }
    }
    runs.push((current, count));
    runs
}

/// Writes the run list in wire order.
pub fn write(writer: &mut Writer, runs: &[(u8, u16)]) {
    writer.u32_le(runs.len() as u32);
    for &(value, count) in runs {
        writer.u8(value);
        writer.u16_le(count);
    }
}

/// Reads and fully expands an RLE column, checking the running total against
/// `MAX_DECODE_ARRAY_SIZE` after every run rather than only at the end.
pub fn read(cursor: &mut Cursor) -> Result<Vec<u8>> {
    let run_count = cursor.u32_le("rle run count")? as usize;
    check_decode_array_size(run_count, "rle run count")?;

    let mut expanded = Vec::new();
    for _ in 0..run_count {
        let value = cursor.u8("rle run value")?;
        let count = cursor.u16_le("rle run count")? as usize;
        if count == 0 {
            return Err(Error::BadEncoding("rle run of zero length"));
        }
        check_decode_array_size(expanded.len() + count, "object-type column length")?;
        expanded.extend(std::iter::repeat(value).take(count));
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_runs_groups_consecutive_equal_values() {
        let runs = build_runs(&[1, 1, 1, 2, 2, 3]);
        assert_eq!(runs, vec![(1, 3), (2, 2), (3, 1)]);
    }

    #[test]
    fn build_runs_on_empty_input_is_empty() {
        assert_eq!(build_runs(&[]), Vec::<(u8, u16)>::new());
    }

    #[test]
    fn build_runs_splits_at_u16_max() {
        let values = vec![7u8; u16::MAX as usize + 5];
        let runs = build_runs(&values);
        assert_eq!(runs[0], (7, u16::MAX));
        assert_eq!(runs[1], (7, 5));
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let values = vec![5u8, 5, 5, 9, 9, 1];
        let runs = build_runs(&values);
        let mut writer = Writer::new();
        write(&mut writer, &runs);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        let decoded = read(&mut cursor).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn read_rejects_forged_run_count_over_the_limit() {
        let mut writer = Writer::new();
        writer.u32_le(2_000_000);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert!(read(&mut cursor).is_err());
    }
}
