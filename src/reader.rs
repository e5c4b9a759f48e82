//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Byte cursor.
//!
//! Every decode path reads through a `Cursor`, which bounds-checks before it
//! dereferences and surfaces [`Error::Truncated`] on underflow rather than
//! panicking. Fixed-width reads are implemented with `nom`'s bounds-checked
//! primitive parsers; the offset bookkeeping and safety-limit checks around
//! them are plain Rust, since those are running totals across many reads.

use nom::bytes::complete::take;
use nom::number::complete::{le_u16, le_u32, le_u64};
use nom::IResult;

use crate::error::{Error, Result};
use crate::varint;

/// A read cursor over a borrowed byte slice.
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Cursor { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    fn apply<T>(&mut self, context: &'static str, result: IResult<&'a [u8], T>) -> Result<T> {
        match result {
            Ok((rest, value)) => {
                self.offset = self.input.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(Error::Truncated(context)),
        }
    }

    pub fn u8(&mut self, context: &'static str) -> Result<u8> {
        if self.offset >= self.input.len() {
            return Err(Error::Truncated(context));
        }
        let value = self.input[self.offset];
        self.offset += 1;
        Ok(value)
    }

    pub fn u16_le(&mut self, context: &'static str) -> Result<u16> {
        let result = le_u16(&self.input[self.offset..]);
        self.apply(context, result)
    }

    pub fn u32_le(&mut self, context: &'static str) -> Result<u32> {
        let result = le_u32(&self.input[self.offset..]);
        self.apply(context, result)
    }

    pub fn u64_le(&mut self, context: &'static str) -> Result<u64> {
        let result = le_u64(&self.input[self.offset..]);
        self.apply(context, result)
    }

    pub fn i64_le(&mut self, context: &'static str) -> Result<i64> {
        Ok(self.u64_le(context)? as i64)
    }

    /// Reads exactly `n` bytes, returning a borrowed slice into the input.
    pub fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8]> {
        let result = take(n)(&self.input[self.offset..]);
        self.apply(context, result)
    }

    pub fn uvarint(&mut self) -> Result<u64> {
        let (value, next) = varint::read_uvarint(self.input, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn ivarint(&mut self) -> Result<i64> {
        let (value, next) = varint::read_ivarint(self.input, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Reads a length-prefixed (`u32` LE) UTF-8 string.
    pub fn string_u32_len(&mut self, context: &'static str) -> Result<String> {
        let len = self.u32_le(context)? as usize;
        let bytes = self.take(len, context)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::BadEncoding(context))
    }

    /// Reads a length-prefixed (`u16` LE) UTF-8 string, used for header metadata fields.
    pub fn string_u16_len(&mut self, context: &'static str) -> Result<String> {
        let len = self.u16_le(context)? as usize;
        let bytes = self.take(len, context)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::BadEncoding(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fixed_width_little_endian_integers_in_sequence() {
        let buf = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.u16_le("a").unwrap(), 1);
        assert_eq!(cursor.u32_le("b").unwrap(), 2);
        assert_eq!(cursor.offset(), 6);
    }

    #[test]
    fn fails_with_truncated_on_short_buffer() {
        let buf = [0x01];
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.u32_le("x"), Err(Error::Truncated("x")));
    }

    #[test]
    fn take_borrows_without_copying() {
        let buf = [1, 2, 3, 4, 5];
        let mut cursor = Cursor::new(&buf);
        let slice = cursor.take(3, "s").unwrap();
        assert_eq!(slice, &[1, 2, 3]);
        assert_eq!(cursor.remaining(), 2);
    }
}
