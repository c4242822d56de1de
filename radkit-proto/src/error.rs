//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

// RADIUS attribute decoding errors.
//
// Shape problems in attribute values never surface as errors: the decoder
// demotes the offending attribute to raw octets instead. What remains here
// are malformed containers, bad top-level headers and internal invariant
// violations, all of which abort the current attribute.
#[derive(Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DecodeError {
    ReadOutOfBounds,
    InsufficientData,
    InvalidArguments,
    InvalidAttrLength(usize),
    HeaderOverflow,
    ZeroAttrType,
    AttrTooWide,
    LengthTooWide,
    AttrOverflow,
    InvalidWidths(u8, u8),
    TunnelPasswordTooShort,
    TunnelPasswordTooLong,
    TagOnInvalidType,
    EncryptedStructural,
    SanityCheck,
}

// ===== impl DecodeError =====

impl DecodeError {
    pub(crate) fn log(&self) {
        warn!("{}", self);
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
            DecodeError::InsufficientData => {
                write!(f, "insufficient data for attribute header")
            }
            DecodeError::InvalidArguments => {
                write!(f, "invalid arguments")
            }
            DecodeError::InvalidAttrLength(attr_len) => {
                write!(f, "attribute header has invalid length: {attr_len}")
            }
            DecodeError::HeaderOverflow => {
                write!(f, "attribute header overflow")
            }
            DecodeError::ZeroAttrType => {
                write!(f, "invalid attribute 0")
            }
            DecodeError::AttrTooWide => {
                write!(f, "invalid attribute number larger than 2^24")
            }
            DecodeError::LengthTooWide => {
                write!(f, "attribute is longer than 256 octets")
            }
            DecodeError::AttrOverflow => {
                write!(f, "attribute overflows container")
            }
            DecodeError::InvalidWidths(type_width, length_width) => {
                write!(
                    f,
                    "invalid vendor field widths: {type_width}/{length_width}"
                )
            }
            DecodeError::TunnelPasswordTooShort => {
                write!(f, "tunnel password is too short")
            }
            DecodeError::TunnelPasswordTooLong => {
                write!(f, "tunnel password is too long for the attribute")
            }
            DecodeError::TagOnInvalidType => {
                write!(f, "tagged attribute is not a string or integer")
            }
            DecodeError::EncryptedStructural => {
                write!(f, "structural attribute cannot be encrypted")
            }
            DecodeError::SanityCheck => {
                write!(f, "internal sanity check failed")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::ReadOutOfBounds
    }
}
