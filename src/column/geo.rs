//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # GEO_POINT column.
//!
//! Wire layout: `u32 n (LE)`, then `n * 16` bytes: `lat` LE float64, `lng` LE
//! float64.

use std::convert::TryInto;

use crate::limits::{check_decode_array_size, check_decode_total_bytes};
use crate::object::GeoPoint;
use crate::reader::Cursor;
use crate::writer::Writer;
use crate::Result;

pub fn write(writer: &mut Writer, values: &[GeoPoint]) {
    writer.u32_le(values.len() as u32);
    for point in values {
        writer.f64_le(point.lat);
        writer.f64_le(point.lng);
    }
}

pub fn read(cursor: &mut Cursor) -> Result<Vec<GeoPoint>> {
    let n = cursor.u32_le("geo_point column length")? as usize;
    check_decode_array_size(n, "geo_point column length")?;
    check_decode_total_bytes(n * 16, "geo_point column bytes")?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let lat_bytes = cursor.take(8, "geo_point lat")?;
        let lng_bytes = cursor.take(8, "geo_point lng")?;
        let lat = f64::from_le_bytes(lat_bytes.try_into().unwrap());
        let lng = f64::from_le_bytes(lng_bytes.try_into().unwrap());
        values.push(GeoPoint { lat, lng });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let values = vec![
            GeoPoint { lat: 40.7128, lng: -74.0060 },
            GeoPoint { lat: -33.8688, lng: 151.2093 },
        ];
        let mut writer = Writer::new();
        write(&mut writer, &values);
        let bytes = writer.into_bytes();
        let mut cursor = Cursor::new(&bytes);
        let decoded = read(&mut cursor).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].lat, values[0].lat);
        assert_eq!(decoded[0].lng, values[0].lng);
    }
}
