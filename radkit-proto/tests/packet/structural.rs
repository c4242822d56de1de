//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::Bytes;
use radkit_proto::consts::AttrType;
use radkit_proto::decode::{decode_attrs, decode_pair, tlv_shape_ok};
use radkit_proto::error::DecodeError;
use radkit_proto::value::LeafValue;

use super::*;

#[test]
fn decode_vsa_integer() {
    let dict = test_dict();
    // Cisco-Disconnect-Cause = 5.
    let data = [
        0x1a, 0x0c, 0x00, 0x00, 0x00, 0x09, 0xc3, 0x06, 0x00, 0x00, 0x00,
        0x05,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 12);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].desc.name, "Cisco-Disconnect-Cause");
    assert_eq!(pairs[0].desc.vendor, 9);
    assert_eq!(pairs[0].value, LeafValue::Integer(5));
}

#[test]
fn decode_vsa_with_multiple_sub_attrs() {
    let dict = test_dict();
    // Two Cisco sub-attributes in one Vendor-Specific.
    let data = [
        0x1a, 0x12, 0x00, 0x00, 0x00, 0x09, 0xc3, 0x06, 0x00, 0x00, 0x00,
        0x01, 0xc3, 0x06, 0x00, 0x00, 0x00, 0x02,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 18);
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].value, LeafValue::Integer(1));
    assert_eq!(pairs[1].value, LeafValue::Integer(2));
}

#[test]
fn unknown_vendor_attr_is_registered() {
    let dict = test_dict();
    // Cisco sub-attribute 77 is not in the dictionary.
    let data = [
        0x1a, 0x0a, 0x00, 0x00, 0x00, 0x09, 0x4d, 0x04, 0xbe, 0xef,
    ];

    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Attr-26.9.77");
    assert!(pairs[0].desc.flags.unknown);
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[0xbe, 0xef]))
    );
}

#[test]
fn unknown_vendor_is_registered() {
    let dict = test_dict();
    // Vendor 4242 is not in the dictionary; the RFC sub-attribute
    // format still applies.
    let data = [
        0x1a, 0x0b, 0x00, 0x00, 0x10, 0x92, 0x01, 0x05, b'a', b'b', b'c',
    ];

    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Attr-26.4242.1");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(b"abc"))
    );
    assert_eq!(dict.vendor_by_num(4242).unwrap().type_width, 1);
}

#[test]
fn zero_length_sub_vsa_produces_no_pair() {
    let dict = test_dict();
    // A header-only Cisco sub-attribute.
    let data = [0x1a, 0x08, 0x00, 0x00, 0x00, 0x09, 0xc3, 0x02];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 8);
    assert!(pairs.is_empty());
}

#[test]
fn malformed_vsa_demotes_to_raw() {
    let dict = test_dict();
    // Sub-attribute length overflows the container.
    let data = [0x1a, 0x09, 0x00, 0x00, 0x00, 0x09, 0xc3, 0x09, 0x01];

    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Attr-26");
    assert_eq!(pairs[0].desc.attr_type, AttrType::Octets);
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[
            0x00, 0x00, 0x00, 0x09, 0xc3, 0x09, 0x01
        ]))
    );
}

#[test]
fn combo_ip_picks_the_address_family() {
    let dict = test_dict();
    // Example-Host with a 4-octet value.
    let data = [
        0x1a, 0x0c, 0x00, 0x00, 0x7e, 0xd9, 0x03, 0x06, 0x0a, 0x00, 0x00,
        0x07,
    ];
    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Example-Host");
    assert_eq!(pairs[0].desc.attr_type, AttrType::Ipv4Addr);
    assert_eq!(
        pairs[0].value,
        LeafValue::Ipv4Addr("10.0.0.7".parse().unwrap())
    );

    // Same attribute with a 16-octet value.
    let mut data = vec![0x1a, 0x18, 0x00, 0x00, 0x7e, 0xd9, 0x03, 0x12];
    data.extend_from_slice(&[
        0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    ]);
    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.attr_type, AttrType::Ipv6Addr);
    assert_eq!(
        pairs[0].value,
        LeafValue::Ipv6Addr("2001:db8::1".parse().unwrap())
    );

    // Neither width: raw.
    let data = [
        0x1a, 0x0d, 0x00, 0x00, 0x7e, 0xd9, 0x03, 0x07, 0x01, 0x02, 0x03,
        0x04, 0x05,
    ];
    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Attr-26.32473.3");
    assert_eq!(pairs[0].desc.attr_type, AttrType::Octets);
}

#[test]
fn decode_extended_attr() {
    let dict = test_dict();
    // Frag-Status = 2 in the first extended space.
    let data = [0xf1, 0x07, 0x01, 0x00, 0x00, 0x00, 0x02];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 7);
    assert_eq!(pairs[0].desc.name, "Frag-Status");
    assert_eq!(pairs[0].value, LeafValue::Integer(2));
}

#[test]
fn extended_with_unknown_child_demotes_to_raw() {
    let dict = test_dict();
    let data = [0xf1, 0x04, 0x63, 0xff];

    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    // The whole value, extended-type octet included, comes back raw.
    assert_eq!(pairs[0].desc.name, "Attr-241");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[0x63, 0xff]))
    );
}

#[test]
fn decode_evs_attr() {
    let dict = test_dict();
    // Example-Identifier = "doc" under Extended-Vendor-Specific-1.
    let data = [
        0xf1, 0x0b, 0x1a, 0x00, 0x00, 0x7e, 0xd9, 0x01, b'd', b'o', b'c',
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 11);
    assert_eq!(pairs[0].desc.name, "Example-Identifier");
    assert_eq!(pairs[0].value, LeafValue::String("doc".to_owned()));
}

#[test]
fn evs_with_unknown_vendor_keeps_octets() {
    let dict = test_dict();
    // Vendor 12345, vendor type 7.
    let data = [
        0xf1, 0x0b, 0x1a, 0x00, 0x00, 0x30, 0x39, 0x07, 0x01, 0x02, 0x03,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 11);
    assert_eq!(pairs[0].desc.name, "Attr-241.26.12345.7");
    assert!(pairs[0].desc.flags.unknown);
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[0x01, 0x02, 0x03]))
    );
}

#[test]
fn concat_attrs_join_into_one_pair() {
    let dict = test_dict();
    // Two EAP-Message attributes followed by a User-Name.
    let data = [
        0x4f, 0x06, 0x01, 0x02, 0x03, 0x04, 0x4f, 0x05, 0x05, 0x06, 0x07,
        0x01, 0x06, b'n', b'e', b'm', b'o',
    ];

    let pairs = decode_attrs(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].desc.name, "EAP-Message");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07
        ]))
    );
    assert_eq!(pairs[1].desc.name, "User-Name");
    assert_eq!(pairs[1].value, LeafValue::String("nemo".to_owned()));
}

#[test]
fn shape_check_accepts_well_formed_windows() {
    // One-octet type and length.
    tlv_shape_ok(&[0x01, 0x03, 0xff, 0x02, 0x02], 1, 1).unwrap();
    // Two-octet type, one-octet length.
    tlv_shape_ok(&[0x00, 0x01, 0x04, 0xaa], 2, 1).unwrap();
    // Four-octet type, two-octet length.
    tlv_shape_ok(&[0x00, 0x01, 0x02, 0x03, 0x00, 0x07, 0xbb], 4, 2)
        .unwrap();
    // No length field: the value fills the window.
    tlv_shape_ok(&[0x05, 0xde, 0xad, 0xbe, 0xef], 1, 0).unwrap();
    // An empty window holds no sub-attributes.
    tlv_shape_ok(&[], 1, 1).unwrap();
}

#[test]
fn shape_check_rejects_malformed_windows() {
    // Header past the end of the buffer.
    assert_eq!(
        tlv_shape_ok(&[0x01], 1, 1),
        Err(DecodeError::HeaderOverflow)
    );
    // Declared length smaller than the header.
    assert_eq!(
        tlv_shape_ok(&[0x01, 0x01], 1, 1),
        Err(DecodeError::InvalidAttrLength(1))
    );
    // Declared length past the end of the buffer.
    assert_eq!(
        tlv_shape_ok(&[0x01, 0x09, 0xff], 1, 1),
        Err(DecodeError::AttrOverflow)
    );
    // Zero type.
    assert_eq!(
        tlv_shape_ok(&[0x00, 0x00, 0x03, 0xff], 2, 1),
        Err(DecodeError::ZeroAttrType)
    );
    // 32-bit type with a non-zero top octet.
    assert_eq!(
        tlv_shape_ok(&[0x01, 0x00, 0x00, 0x01, 0x06, 0xff], 4, 1),
        Err(DecodeError::AttrTooWide)
    );
    // Two-octet length larger than 255.
    assert_eq!(
        tlv_shape_ok(&[0x01, 0x01, 0x00, 0x04], 1, 2),
        Err(DecodeError::LengthTooWide)
    );
    // Unsupported field widths.
    assert_eq!(
        tlv_shape_ok(&[0x01, 0x03, 0xff], 3, 1),
        Err(DecodeError::InvalidWidths(3, 1))
    );
}
