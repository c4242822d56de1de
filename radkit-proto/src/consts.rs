//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// RADIUS attribute header size (type + length).
pub const ATTR_HDR_SIZE: usize = 2;
// Request/Response Authenticator length.
pub const AUTH_VECTOR_LEN: usize = 16;
// Cipher block size of the password obfuscation schemes.
pub const AUTH_PASS_LEN: usize = 16;
// Maximum User-Password length (RFC 2865 section 5.2).
pub const MAX_PASS_LEN: usize = 128;
// Maximum value length of a classic-format attribute.
pub const MAX_STRING_LEN: usize = 253;
// Maximum length of an Ascend binary filter value.
pub const MAX_FILTER_LEN: usize = 32;
// Upper bound on a reassembled attribute value.
pub const MAX_ATTR_LEN: usize = 128 * 1024;

// Attribute numbers the decoder needs to recognize by itself.
pub const ATTR_VENDOR_SPECIFIC: u8 = 26;
pub const ATTR_CHARGEABLE_USER_IDENTITY: u8 = 89;

// Wire data types an attribute can be defined with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttrType {
    // Leaf types.
    Byte,
    Short,
    Integer,
    Integer64,
    Signed,
    Date,
    String,
    Octets,
    Abinary,
    Ipv4Addr,
    Ipv6Addr,
    Ipv4Prefix,
    Ipv6Prefix,
    Ethernet,
    Ifid,
    ComboIp,
    // Structural types.
    Tlv,
    Vsa,
    Evs,
    Extended,
    LongExtended,
    Vendor,
}

// In-protocol encryption scheme of an attribute value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttrEncrypt {
    #[default]
    None,
    UserPassword,
    TunnelPassword,
    AscendSecret,
}

bitflags! {
    // Flags octet of Long-Extended and WiMAX continuation headers.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct ContFlags: u8 {
        const MORE = 0x80;
    }
}

// ===== impl AttrType =====

impl AttrType {
    // Structural types contain sub-attributes rather than a leaf value.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AttrType::Tlv
                | AttrType::Vsa
                | AttrType::Evs
                | AttrType::Extended
                | AttrType::LongExtended
                | AttrType::Vendor
        )
    }
}
