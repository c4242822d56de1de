//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use bytes::{Buf, Bytes};
use derive_new::new;
use enum_as_inner::EnumAsInner;
use ipnetwork::{Ipv4Network, Ipv6Network};
use radkit_utils::bytes::BytesExt;
use radkit_utils::ip::Ipv4NetworkExt;
use radkit_utils::mac_addr::MacAddr;
use serde::{Deserialize, Serialize};

use crate::consts::AttrType;
use crate::dictionary::AttrDesc;
use crate::error::{DecodeError, DecodeResult};

// Decoded leaf value of an attribute.
//
// The variant always matches the descriptor's declared type; the shape and
// width checks happen before materialization, in the structural decoder.
#[derive(Clone, Debug, EnumAsInner, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LeafValue {
    Byte(u8),
    Short(u16),
    Integer(u32),
    Integer64(u64),
    Signed(i32),
    Date(u32),
    String(String),
    Octets(Bytes),
    Abinary(Bytes),
    Ipv4Addr(Ipv4Addr),
    Ipv6Addr(Ipv6Addr),
    Ipv4Prefix(Ipv4Network),
    Ipv6Prefix(Ipv6Network),
    Ethernet(MacAddr),
    Ifid([u8; 8]),
}

// One decoded attribute: the dictionary descriptor it resolved to, the
// RFC 2868 tag (if any) and the leaf value. Pairs own their value buffers,
// so dropping a list of pairs releases everything decoded so far.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[derive(new)]
pub struct ValuePair {
    pub desc: Arc<AttrDesc>,
    pub tag: Option<u8>,
    pub value: LeafValue,
}

// ===== impl LeafValue =====

impl LeafValue {
    // Materializes a leaf value from validated bytes.
    //
    // Callers are expected to have checked the value width against the
    // declared type; a mismatch that still slips through surfaces as an
    // internal error rather than a demotion.
    pub(crate) fn decode(
        attr_type: AttrType,
        data: &[u8],
    ) -> DecodeResult<LeafValue> {
        let mut buf = data;
        let value = match attr_type {
            AttrType::String => LeafValue::String(
                String::from_utf8_lossy(data).into_owned(),
            ),
            AttrType::Octets => {
                LeafValue::Octets(Bytes::copy_from_slice(data))
            }
            AttrType::Abinary => {
                LeafValue::Abinary(Bytes::copy_from_slice(data))
            }
            AttrType::Byte => LeafValue::Byte(buf.try_get_u8()?),
            AttrType::Short => LeafValue::Short(buf.try_get_u16()?),
            AttrType::Integer => LeafValue::Integer(buf.try_get_u32()?),
            AttrType::Integer64 => {
                LeafValue::Integer64(buf.try_get_u64()?)
            }
            AttrType::Signed => LeafValue::Signed(buf.try_get_i32()?),
            AttrType::Date => LeafValue::Date(buf.try_get_u32()?),
            AttrType::Ipv4Addr => LeafValue::Ipv4Addr(buf.try_get_ipv4()?),
            AttrType::Ipv6Addr => LeafValue::Ipv6Addr(buf.try_get_ipv6()?),
            AttrType::Ethernet => LeafValue::Ethernet(buf.try_get_mac()?),
            AttrType::Ifid => {
                let mut ifid = [0; 8];
                buf.try_copy_to_slice(&mut ifid)?;
                LeafValue::Ifid(ifid)
            }
            AttrType::Ipv4Prefix => {
                let _reserved = buf.try_get_u8()?;
                let plen = buf.try_get_u8()? & 0x3f;
                let addr = buf.try_get_ipv4()?;
                let prefix = Ipv4Network::new(addr, plen)
                    .map_err(|_| DecodeError::SanityCheck)?;
                // Mask out any host bits the sender left in.
                LeafValue::Ipv4Prefix(prefix.apply_mask())
            }
            AttrType::Ipv6Prefix => {
                let _reserved = buf.try_get_u8()?;
                let plen = buf.try_get_u8()?;
                // The address is transmitted truncated to the prefix
                // length and zero-extended to the full 16 octets.
                let mut octets = [0; 16];
                if buf.remaining() > octets.len() {
                    return Err(DecodeError::SanityCheck);
                }
                octets[..buf.remaining()].copy_from_slice(buf);
                let prefix = Ipv6Network::new(Ipv6Addr::from(octets), plen)
                    .map_err(|_| DecodeError::SanityCheck)?;
                LeafValue::Ipv6Prefix(prefix)
            }
            _ => return Err(DecodeError::SanityCheck),
        };

        Ok(value)
    }
}
