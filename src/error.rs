//
// Copyright 2024 GraphCol Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// Identifies which CRC-covered region a checksum mismatch occurred in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ChecksumScope {
    /// The whole-file CRC of a V1 payload.
    Payload,
    /// The entity index's own trailing CRC.
    EntityIndex,
    /// The 36-byte-covered CRC embedded in a V2 footer.
    V2Footer,
}

impl Display for ChecksumScope {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChecksumScope::Payload => formatter.write_str("payload"),
            ChecksumScope::EntityIndex => formatter.write_str("entity index"),
            ChecksumScope::V2Footer => formatter.write_str("v2 footer"),
        }
    }
}

/// GraphCol codec encode/decode error.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Error {
    /// The buffer ended before a required field could be read.
    Truncated(&'static str),
    /// A varint overran its maximum byte count, or a structural encoding was malformed.
    BadEncoding(&'static str),
    /// The magic number at the start of a V1 payload (or in a V2 trailer) did not match.
    BadMagic { expected: u32, found: u32 },
    /// The version field did not match a version this codec understands.
    BadVersion(u16),
    /// A stored checksum did not match the one computed over its covered region.
    Checksum { stored: u32, computed: u32, scope: ChecksumScope },
    /// A count or byte total read from untrusted input, or supplied by the caller,
    /// exceeded the limit in effect for that context.
    ResourceExhausted { count: usize, limit: usize, context: &'static str },
    /// A caller-supplied argument violated an invariant the codec requires.
    BadArgument(&'static str),
    /// Two fields that must agree with each other (typically in a V2 footer) did not.
    InternalInconsistency(&'static str),
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated(context) =>
                write!(formatter, "buffer truncated while reading {}", context),
            Error::BadEncoding(context) =>
                write!(formatter, "malformed encoding: {}", context),
            Error::BadMagic { expected, found } =>
                write!(formatter, "bad magic number: expected {:#010x}, found {:#010x}", expected, found),
            Error::BadVersion(found) =>
                write!(formatter, "unsupported version: {}", found),
            Error::Checksum { stored, computed, scope } =>
                write!(formatter, "{} checksum mismatch: stored {:#010x}, computed {:#010x}", scope, stored, computed),
            Error::ResourceExhausted { count, limit, context } =>
                write!(formatter, "{} of {} exceeds limit {}", context, count, limit),
            Error::BadArgument(reason) =>
                write!(formatter, "bad argument: {}", reason),
            Error::InternalInconsistency(reason) =>
                write!(formatter, "internal inconsistency: {}", reason),
        }
    }
}

impl std::error::Error for Error {}
