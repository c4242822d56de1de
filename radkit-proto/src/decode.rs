//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::consts::{
    ATTR_CHARGEABLE_USER_IDENTITY, ATTR_HDR_SIZE, ATTR_VENDOR_SPECIFIC,
    AUTH_VECTOR_LEN, AttrEncrypt, AttrType, ContFlags, MAX_ATTR_LEN,
    MAX_FILTER_LEN, MAX_STRING_LEN,
};
use crate::crypto;
use crate::dictionary::{AttrDesc, Dictionary, VendorDesc};
use crate::error::{DecodeError, DecodeResult};
use crate::value::{LeafValue, ValuePair};

// Decryption context of the packet being decoded.
#[derive(Clone, Debug)]
pub struct PacketCxt {
    // Shared secret with the peer. Without it, encrypted attributes are
    // left as they came in.
    pub secret: Option<String>,
    // This packet's authenticator.
    pub vector: [u8; AUTH_VECTOR_LEN],
    // Authenticator of the request this packet replies to. Required to
    // decrypt reply-side Tunnel-Password and Ascend-Send-Secret.
    pub original_vector: Option<[u8; AUTH_VECTOR_LEN]>,
}

// ===== global functions =====

// Decodes the full attributes region of a packet.
pub fn decode_attrs(
    dict: &Dictionary,
    cxt: &PacketCxt,
    data: &[u8],
) -> DecodeResult<Vec<ValuePair>> {
    let mut pairs = vec![];
    let mut offset = 0;

    while offset < data.len() {
        let (mut decoded, size) = decode_pair(dict, cxt, &data[offset..])?;
        pairs.append(&mut decoded);
        offset += size;
    }

    Ok(pairs)
}

// Decodes one top-level attribute.
//
// The input must span from the attribute header to the end of the packet:
// concatenated, Long-Extended and WiMAX attributes read past their own
// header into their successors. Returns the decoded pairs and the total
// number of octets consumed from the packet.
pub fn decode_pair(
    dict: &Dictionary,
    cxt: &PacketCxt,
    data: &[u8],
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    if data.len() < ATTR_HDR_SIZE {
        return Err(DecodeError::InsufficientData);
    }
    let attr_len = usize::from(data[1]);
    if attr_len < ATTR_HDR_SIZE || attr_len > data.len() {
        return Err(DecodeError::InsufficientData);
    }

    let root = dict.root();
    let desc = match dict.child_by_num(&root, data[0].into()) {
        Some(desc) => desc,
        None => {
            debug!(attr = data[0], "unknown top-level attribute");
            dict.unknown_attr(&root, 0, data[0].into())
        }
    };

    if desc.flags.concat {
        return decode_concat(&desc, data);
    }

    let (pairs, size) = decode_pair_value(
        dict,
        cxt,
        &desc,
        &data[ATTR_HDR_SIZE..],
        attr_len - ATTR_HDR_SIZE,
    )?;
    Ok((pairs, ATTR_HDR_SIZE + size))
}

// Decodes an attribute value of any declared type.
//
// `data` spans from the value octets to the end of the packet and
// `attr_len` is the length of this attribute's own value; fragmented
// formats read beyond it into their successor attributes. Returns the
// decoded pairs and the number of value octets consumed (`attr_len`,
// plus the full length of any extra fragments).
//
// Whenever the value fails a shape or width check, the attribute is
// demoted to an unknown descriptor typed as raw octets instead of
// failing the packet.
pub fn decode_pair_value(
    dict: &Dictionary,
    cxt: &PacketCxt,
    parent: &Arc<AttrDesc>,
    data: &[u8],
    attr_len: usize,
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    let packet_len = data.len();

    if attr_len > packet_len
        || (attr_len > MAX_STRING_LEN && attr_len != packet_len)
        || attr_len > MAX_ATTR_LEN
    {
        return Err(DecodeError::InvalidArguments);
    }

    // Zero-length values produce no pair. The one exception is the
    // zero-length Chargeable-User-Identity the WiMAX forum insists on.
    if attr_len == 0 {
        if parent.vendor == 0
            && parent.attr == u32::from(ATTR_CHARGEABLE_USER_IDENTITY)
            && parent.attr_type == AttrType::Octets
        {
            let pair =
                ValuePair::new(parent.clone(), None, LeafValue::Octets(Bytes::new()));
            return Ok((vec![pair], 0));
        }
        return Ok((vec![], 0));
    }

    let mut scratch = [0; 256];
    let mut in_scratch = false;
    let mut value_len = attr_len;
    let mut tag = None;

    // Tag handling (RFC 2868 section 3.5). Tunnel-Password carries its
    // tag unconditionally, even when the tag octet collides with the
    // high bit of the salt.
    if parent.flags.has_tag
        && value_len > 1
        && (data[0] < 0x20
            || parent.flags.encrypt == AttrEncrypt::TunnelPassword)
    {
        // Only "short" attributes can be tagged.
        if value_len >= scratch.len() {
            return Err(DecodeError::InvalidAttrLength(value_len));
        }

        match parent.attr_type {
            AttrType::String => {
                scratch[..attr_len - 1].copy_from_slice(&data[1..attr_len]);
                tag = Some(data[0]);
                value_len -= 1;
            }
            AttrType::Integer => {
                scratch[..attr_len].copy_from_slice(&data[..attr_len]);
                tag = Some(scratch[0]);
                scratch[0] = 0;
            }
            _ => return Err(DecodeError::TagOnInvalidType),
        }
        in_scratch = true;
    }

    // Decrypt the value into the scratch copy.
    let mut demote = false;
    if let Some(secret) = &cxt.secret
        && parent.flags.encrypt != AttrEncrypt::None
    {
        if parent.attr_type.is_structural() {
            return Err(DecodeError::EncryptedStructural);
        }
        // Encrypted values only exist in the classic format.
        if attr_len > MAX_STRING_LEN {
            return Err(DecodeError::InvalidAttrLength(attr_len));
        }

        if !in_scratch {
            scratch[..attr_len].copy_from_slice(&data[..attr_len]);
            in_scratch = true;
        }

        match parent.flags.encrypt {
            AttrEncrypt::UserPassword => {
                let vector =
                    cxt.original_vector.as_ref().unwrap_or(&cxt.vector);
                crypto::decode_user_password(
                    &mut scratch,
                    value_len,
                    secret,
                    vector,
                );

                if let Some(length) = parent.flags.length {
                    // Fixed-length values (e.g. MS-CHAP-MPPE-Keys) are
                    // binary and cannot be null-stripped.
                    value_len = value_len.min(usize::from(length));
                } else {
                    // Strip the padding from the end, preserving any
                    // nulls embedded in the password itself.
                    while value_len > 0 && scratch[value_len - 1] == 0 {
                        value_len -= 1;
                    }
                }
            }
            AttrEncrypt::TunnelPassword => {
                // Tunnel-Passwords only go in responses; without the
                // matching request all that's left is a null vector.
                let vector =
                    cxt.original_vector.unwrap_or([0; AUTH_VECTOR_LEN]);
                match crypto::decode_tunnel_password(
                    &mut scratch,
                    value_len,
                    secret,
                    &vector,
                ) {
                    Ok(real_len) => value_len = real_len,
                    Err(error) => {
                        error.log();
                        demote = true;
                    }
                }
            }
            AttrEncrypt::AscendSecret => match cxt.original_vector {
                Some(vector) => {
                    let digest = crypto::make_secret(
                        &vector,
                        secret,
                        &scratch[..AUTH_VECTOR_LEN],
                    );
                    scratch[..AUTH_VECTOR_LEN].copy_from_slice(&digest);
                    value_len = digest
                        .iter()
                        .position(|byte| *byte == 0)
                        .unwrap_or(AUTH_VECTOR_LEN);
                }
                None => demote = true,
            },
            AttrEncrypt::None => (),
        }
    }

    let value: &[u8] = if in_scratch {
        &scratch[..value_len]
    } else {
        &data[..value_len]
    };

    // Check the decrypted value against the shape the declared type
    // mandates. Structural types recurse from here instead.
    let mut desc = parent.clone();
    let mut skip = 0;
    let mut raw = demote;

    if !raw {
        match parent.attr_type {
            AttrType::String | AttrType::Octets => (),
            AttrType::Abinary => {
                if value_len > MAX_FILTER_LEN {
                    raw = true;
                }
            }
            AttrType::Integer
            | AttrType::Ipv4Addr
            | AttrType::Date
            | AttrType::Signed => {
                if value_len != 4 {
                    raw = true;
                }
            }
            AttrType::Integer64 | AttrType::Ifid => {
                if value_len != 8 {
                    raw = true;
                }
            }
            AttrType::Ipv6Addr => {
                if value_len != 16 {
                    raw = true;
                }
            }
            AttrType::Ipv6Prefix => {
                if value_len < 2 || value_len > 18 || value[1] > 128 {
                    raw = true;
                }
            }
            AttrType::Byte => {
                if value_len != 1 {
                    raw = true;
                }
            }
            AttrType::Short => {
                if value_len != 2 {
                    raw = true;
                }
            }
            AttrType::Ethernet => {
                if value_len != 6 {
                    raw = true;
                }
            }
            AttrType::Ipv4Prefix => {
                if value_len != 6 || (value[1] & 0x3f) > 32 {
                    raw = true;
                }
            }
            AttrType::ComboIp => {
                // The value width picks the actual address family.
                let attr_type = match value_len {
                    4 => Some(AttrType::Ipv4Addr),
                    16 => Some(AttrType::Ipv6Addr),
                    _ => None,
                };
                match attr_type {
                    Some(attr_type) => {
                        desc = Arc::new(AttrDesc {
                            attr_type,
                            ..(**parent).clone()
                        });
                    }
                    None => raw = true,
                }
            }
            AttrType::Extended => {
                // One octet of extended type, then the value.
                if value_len < 2 {
                    raw = true;
                } else {
                    match dict.child_by_num(parent, value[0].into()) {
                        Some(child) => {
                            match decode_pair_value(
                                dict,
                                cxt,
                                &child,
                                &data[1..attr_len],
                                attr_len - 1,
                            ) {
                                Ok((pairs, size)) => {
                                    return Ok((pairs, 1 + size));
                                }
                                Err(error) => {
                                    error.log();
                                    raw = true;
                                }
                            }
                        }
                        None => raw = true,
                    }
                }
            }
            AttrType::LongExtended => {
                // Extended type, flags octet, then the value.
                if value_len < 3 {
                    raw = true;
                } else {
                    match long_extended_child(dict, parent, value, value_len) {
                        None => raw = true,
                        Some(child) => {
                            if ContFlags::from_bits_retain(value[1])
                                .contains(ContFlags::MORE)
                            {
                                // The value continues in the following
                                // attributes of the packet.
                                return decode_extended_fragments(
                                    dict,
                                    cxt,
                                    &child,
                                    parent.attr as u8,
                                    value[0],
                                    data,
                                    attr_len,
                                );
                            }
                            match decode_pair_value(
                                dict,
                                cxt,
                                &child,
                                &data[2..attr_len],
                                attr_len - 2,
                            ) {
                                Ok((pairs, size)) => {
                                    return Ok((pairs, 2 + size));
                                }
                                Err(error) => {
                                    error.log();
                                    raw = true;
                                }
                            }
                        }
                    }
                }
            }
            AttrType::Evs => {
                // Vendor ID (24-bit, zero-padded), vendor type, value.
                if value_len < 6 || value[0] != 0 {
                    raw = true;
                } else {
                    let vendor = u32::from_be_bytes([
                        value[0], value[1], value[2], value[3],
                    ]);
                    let vendor_node = dict.child_by_num(parent, vendor);
                    let child = vendor_node.as_ref().and_then(|vendor_node| {
                        dict.child_by_num(vendor_node, value[4].into())
                    });
                    match child {
                        Some(child) => {
                            match decode_pair_value(
                                dict,
                                cxt,
                                &child,
                                &data[5..attr_len],
                                attr_len - 5,
                            ) {
                                Ok((pairs, size)) => {
                                    return Ok((pairs, 5 + size));
                                }
                                Err(error) => {
                                    error.log();
                                    raw = true;
                                }
                            }
                        }
                        None => {
                            // Unknown vendor or unknown vendor attribute:
                            // register it and keep the payload as opaque
                            // octets.
                            let vendor_node = vendor_node.unwrap_or_else(
                                || dict.unknown_vendor_attr(parent, vendor),
                            );
                            desc = dict.unknown_attr(
                                &vendor_node,
                                vendor,
                                value[4].into(),
                            );
                            skip = 5;
                        }
                    }
                }
            }
            AttrType::Tlv => {
                // TLVs either fit in one attribute or have already been
                // reassembled into a contiguous buffer.
                match decode_tlv(dict, cxt, parent, &data[..attr_len]) {
                    Ok((pairs, size)) => return Ok((pairs, size)),
                    Err(error) => {
                        error.log();
                        raw = true;
                    }
                }
            }
            AttrType::Vsa => {
                // VSAs can be WiMAX, in which case they don't fit into
                // one attribute.
                match decode_vsa(dict, cxt, parent, data, attr_len) {
                    Ok((pairs, size)) => return Ok((pairs, size)),
                    Err(error) => {
                        error.log();
                        raw = true;
                    }
                }
            }
            AttrType::Vendor => raw = true,
        }
    }

    if raw {
        debug!(attr = %parent.name, "demoting malformed attribute to raw");
        let grandparent =
            parent.parent.clone().unwrap_or_else(|| dict.root());
        desc = dict.unknown_attr(&grandparent, parent.vendor, parent.attr);
        tag = None;
        skip = 0;
    }

    let leaf = LeafValue::decode(desc.attr_type, &value[skip..])?;
    let pair = ValuePair::new(desc, tag, leaf);
    Ok((vec![pair], attr_len))
}

// Checks that a byte window parses as a contiguous sequence of
// well-formed sub-attributes with the given header field widths, so the
// recursive construction phase can assume its input is sound.
pub fn tlv_shape_ok(
    data: &[u8],
    type_width: u8,
    length_width: u8,
) -> DecodeResult<()> {
    if length_width > 2 || !matches!(type_width, 1 | 2 | 4) {
        return Err(DecodeError::InvalidWidths(type_width, length_width));
    }
    let type_width = usize::from(type_width);
    let length_width = usize::from(length_width);

    let mut offset = 0;
    while offset < data.len() {
        if offset + type_width + length_width > data.len() {
            return Err(DecodeError::HeaderOverflow);
        }
        let header = &data[offset..];

        match type_width {
            4 => {
                if header[..4] == [0; 4] {
                    return Err(DecodeError::ZeroAttrType);
                }
                // All registered 32-bit attribute numbers fit in 24 bits.
                if header[0] != 0 {
                    return Err(DecodeError::AttrTooWide);
                }
            }
            2 => {
                if header[..2] == [0; 2] {
                    return Err(DecodeError::ZeroAttrType);
                }
            }
            // Type zero is allowed here; some vendors actually use it.
            _ => (),
        }

        let attr_len = match length_width {
            // No length field: a single value fills the container.
            0 => return Ok(()),
            2 => {
                if header[type_width] != 0 {
                    return Err(DecodeError::LengthTooWide);
                }
                usize::from(header[type_width + 1])
            }
            _ => usize::from(header[type_width]),
        };

        if attr_len < type_width + length_width {
            return Err(DecodeError::InvalidAttrLength(attr_len));
        }
        if attr_len > data.len() - offset {
            return Err(DecodeError::AttrOverflow);
        }
        offset += attr_len;
    }

    Ok(())
}

// Decodes a sequence of TLV sub-attributes into sibling pairs.
pub fn decode_tlv(
    dict: &Dictionary,
    cxt: &PacketCxt,
    parent: &Arc<AttrDesc>,
    data: &[u8],
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    // Type, length, value.
    if data.len() < 3 {
        return Err(DecodeError::InsufficientData);
    }
    tlv_shape_ok(data, 1, 1)?;

    let mut pairs = vec![];
    let mut offset = 0;
    while offset < data.len() {
        let sub_type = u32::from(data[offset]);
        let sub_len = usize::from(data[offset + 1]);

        let child = match dict.child_by_num(parent, sub_type) {
            Some(child) => child,
            None => {
                debug!(
                    tlv = %parent.name, sub_type,
                    "unknown TLV sub-attribute"
                );
                dict.unknown_attr(parent, parent.vendor, sub_type)
            }
        };

        let (mut sub_pairs, _) = decode_pair_value(
            dict,
            cxt,
            &child,
            &data[offset + 2..offset + sub_len],
            sub_len - 2,
        )?;
        pairs.append(&mut sub_pairs);
        offset += sub_len;
    }

    Ok((pairs, data.len()))
}

// ===== helper functions =====

// Joins a run of consecutive attributes of the same type into a single
// octets pair (RFC 2865 section 2.3).
fn decode_concat(
    desc: &Arc<AttrDesc>,
    data: &[u8],
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    let attr = data[0];
    let mut value = Vec::new();
    let mut offset = 0;

    loop {
        let attr_len = usize::from(data[offset + 1]);
        value.extend_from_slice(&data[offset + 2..offset + attr_len]);
        offset += attr_len;

        // Attributes MUST be consecutive to concatenate.
        if offset + ATTR_HDR_SIZE > data.len()
            || data[offset] != attr
            || usize::from(data[offset + 1]) < ATTR_HDR_SIZE
            || offset + usize::from(data[offset + 1]) > data.len()
        {
            break;
        }
    }

    let pair =
        ValuePair::new(desc.clone(), None, LeafValue::Octets(value.into()));
    Ok((vec![pair], offset))
}

// Resolves the child of a Long-Extended attribute, synthesizing an
// unknown one if needed. An unknown child wrapping a Vendor-Specific
// payload is registered under the embedded vendor instead.
fn long_extended_child(
    dict: &Dictionary,
    parent: &Arc<AttrDesc>,
    value: &[u8],
    value_len: usize,
) -> Option<Arc<AttrDesc>> {
    if let Some(child) = dict.child_by_num(parent, value[0].into()) {
        return Some(child);
    }

    if value[0] != ATTR_VENDOR_SPECIFIC || value_len < 3 + 4 + 1 {
        return Some(dict.unknown_attr(parent, 0, value[0].into()));
    }

    let vendor =
        u32::from_be_bytes([value[3], value[4], value[5], value[6]]);
    if vendor == 0 {
        return None;
    }
    Some(dict.unknown_attr(parent, vendor, value[7].into()))
}

// Reassembles a fragmented Long-Extended attribute and decodes the
// joined value (RFC 6929 section 2.2).
//
// Fragments must be contiguous in the packet and carry the same
// attribute type and extended type; the chain ends at the first
// fragment without the MORE bit, at the end of the packet, or at any
// fragment whose shape disagrees.
fn decode_extended_fragments(
    dict: &Dictionary,
    cxt: &PacketCxt,
    child: &Arc<AttrDesc>,
    attr_number: u8,
    ext_type: u8,
    data: &[u8],
    attr_len: usize,
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    if attr_len < 3 {
        return Err(DecodeError::InsufficientData);
    }

    // Add up the fragment payloads first.
    let mut frag_len = attr_len - 2;
    let mut fragments = 1;
    let mut offset = attr_len;
    let mut last_frag = false;
    while offset < data.len() {
        let frag = &data[offset..];
        if last_frag
            || frag.len() < 4
            || frag[0] != attr_number
            || frag[1] < 4
            || usize::from(frag[1]) > frag.len()
            || frag[2] != ext_type
        {
            break;
        }
        last_frag =
            !ContFlags::from_bits_retain(frag[3]).contains(ContFlags::MORE);
        frag_len += usize::from(frag[1]) - 4;
        fragments += 1;
        offset += usize::from(frag[1]);
    }

    // Concatenate the payloads: the first fragment, then the rest.
    let mut value = Vec::with_capacity(frag_len);
    value.extend_from_slice(&data[2..attr_len]);
    let mut frag_offset = attr_len;
    while frag_offset < offset {
        let frag = &data[frag_offset..];
        value.extend_from_slice(&frag[4..usize::from(frag[1])]);
        frag_offset += usize::from(frag[1]);
    }
    debug!(fragments, total = value.len(), "reassembled extended attribute");

    let (pairs, _) =
        decode_pair_value(dict, cxt, child, &value, value.len())?;
    Ok((pairs, offset))
}

// Decodes a Vendor-Specific value: vendor ID resolution, WiMAX
// delegation, then one pair per vendor sub-attribute.
fn decode_vsa(
    dict: &Dictionary,
    cxt: &PacketCxt,
    parent: &Arc<AttrDesc>,
    data: &[u8],
    attr_len: usize,
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    // Container must be a VSA.
    if parent.attr_type != AttrType::Vsa {
        return Err(DecodeError::SanityCheck);
    }
    // Vendor ID plus at least one sub-attribute header.
    if attr_len > data.len() || attr_len < 5 {
        return Err(DecodeError::InsufficientData);
    }
    // 24-bit vendor IDs only.
    if data[0] != 0 {
        return Err(DecodeError::AttrTooWide);
    }

    let vendor = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);

    let (vendor_node, vendor_desc) = match dict.child_by_num(parent, vendor)
    {
        Some(vendor_node) => {
            let vendor_desc = dict
                .vendor_by_num(vendor)
                .ok_or(DecodeError::SanityCheck)?;

            if vendor_desc.wimax {
                return decode_wimax(
                    dict,
                    cxt,
                    vendor,
                    &vendor_node,
                    data,
                    attr_len,
                );
            }

            tlv_shape_ok(
                &data[4..attr_len],
                vendor_desc.type_width,
                vendor_desc.length_width,
            )?;
            (vendor_node, vendor_desc)
        }
        None => {
            // The vendor is unknown, but vendor attributes have a
            // standard format, so the data can be decoded anyway.
            tlv_shape_ok(&data[4..attr_len], 1, 1)?;
            debug!(vendor, "registering unknown vendor");
            let vendor_node = dict.unknown_vendor_attr(parent, vendor);
            (vendor_node, dict.unknown_vendor(vendor))
        }
    };

    // There may be more than one sub-attribute after the vendor ID.
    let mut pairs = vec![];
    let mut offset = 4;
    while offset < attr_len {
        let (mut sub_pairs, sub_len) = decode_vsa_sub(
            dict,
            cxt,
            &vendor_desc,
            &vendor_node,
            &data[offset..attr_len],
        )?;
        pairs.append(&mut sub_pairs);
        offset += sub_len;
    }

    Ok((pairs, offset))
}

// Decodes a single vendor sub-attribute using the vendor's header
// layout. Zero-length sub-attributes are legal and produce no pair.
fn decode_vsa_sub(
    dict: &Dictionary,
    cxt: &PacketCxt,
    vendor_desc: &VendorDesc,
    vendor_node: &Arc<AttrDesc>,
    data: &[u8],
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    // Parent must be a vendor.
    if vendor_node.attr_type != AttrType::Vendor {
        return Err(DecodeError::SanityCheck);
    }

    let type_width = usize::from(vendor_desc.type_width);
    let length_width = usize::from(vendor_desc.length_width);
    if data.len() < type_width + length_width {
        return Err(DecodeError::SanityCheck);
    }

    let attribute = match type_width {
        // The leading octet is zero, from the shape check.
        4 => u32::from_be_bytes([0, data[1], data[2], data[3]]),
        2 => u32::from(u16::from_be_bytes([data[0], data[1]])),
        1 => u32::from(data[0]),
        _ => return Err(DecodeError::SanityCheck),
    };
    let attr_len = match length_width {
        2 => usize::from(data[type_width + 1]),
        1 => usize::from(data[type_width]),
        0 => data.len(),
        _ => return Err(DecodeError::SanityCheck),
    };

    let child = match dict.child_by_num(vendor_node, attribute) {
        Some(child) => child,
        None => {
            debug!(
                vendor = vendor_desc.vendor_id, attribute,
                "unknown vendor attribute"
            );
            dict.unknown_attr(vendor_node, vendor_desc.vendor_id, attribute)
        }
    };

    let header_len = type_width + length_width;
    let (pairs, _) = decode_pair_value(
        dict,
        cxt,
        &child,
        &data[header_len..attr_len],
        attr_len - header_len,
    )?;

    Ok((pairs, attr_len))
}

// Reassembles a fragmented WiMAX sub-VSA and decodes the joined value.
//
// WiMAX sub-attributes carry their own continuation octet; successor
// fragments are Vendor-Specific attributes wrapping the same vendor ID
// and vendor type, contiguous in the packet.
fn decode_wimax(
    dict: &Dictionary,
    cxt: &PacketCxt,
    vendor: u32,
    vendor_node: &Arc<AttrDesc>,
    data: &[u8],
    attr_len: usize,
) -> DecodeResult<(Vec<ValuePair>, usize)> {
    // Vendor ID, type, length, continuation, at least one value octet.
    if attr_len < 8 {
        return Err(DecodeError::InsufficientData);
    }
    // The sub-attribute must fill the container exactly.
    if usize::from(data[5]) + 4 != attr_len {
        return Err(DecodeError::InvalidAttrLength(attr_len));
    }

    let child = match dict.child_by_num(vendor_node, data[4].into()) {
        Some(child) => child,
        None => dict.unknown_attr(vendor_node, vendor, data[4].into()),
    };

    // Without the continuation bit this is an ordinary sub-attribute.
    if !ContFlags::from_bits_retain(data[6]).contains(ContFlags::MORE) {
        let payload_len = usize::from(data[5]) - 3;
        let (pairs, size) = decode_pair_value(
            dict,
            cxt,
            &child,
            &data[7..7 + payload_len],
            payload_len,
        )?;
        return Ok((pairs, 7 + size));
    }

    // Add up the fragment payloads. Fragments must be contiguous and
    // carry the same vendor ID and vendor type, each filling its
    // Vendor-Specific container exactly.
    let mut frag_len = usize::from(data[5]) - 3;
    let mut offset = attr_len;
    let mut last_frag = false;
    while offset < data.len() {
        let frag = &data[offset..];
        if last_frag
            || frag.len() < 9
            || frag[0] != ATTR_VENDOR_SPECIFIC
            || frag[1] < 9
            || usize::from(frag[1]) > frag.len()
            || frag[2..6] != data[..4]
            || frag[6] != data[4]
            || usize::from(frag[7]) + 6 != usize::from(frag[1])
        {
            break;
        }
        last_frag =
            !ContFlags::from_bits_retain(frag[8]).contains(ContFlags::MORE);
        frag_len += usize::from(frag[7]) - 3;
        offset += usize::from(frag[1]);
    }

    // Concatenate the payloads, dropping each fragment's type, length
    // and continuation octets.
    let mut value = Vec::with_capacity(frag_len);
    value.extend_from_slice(&data[7..4 + usize::from(data[5])]);
    let mut frag_offset = attr_len;
    while frag_offset < offset {
        let frag = &data[frag_offset..];
        value.extend_from_slice(&frag[9..9 + usize::from(frag[7]) - 3]);
        frag_offset += usize::from(frag[1]);
    }
    debug!(total = value.len(), "reassembled WiMAX attribute");

    let (pairs, _) =
        decode_pair_value(dict, cxt, &child, &value, value.len())?;
    Ok((pairs, offset))
}
