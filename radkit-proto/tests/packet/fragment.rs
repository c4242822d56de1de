//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::Bytes;
use radkit_proto::consts::AttrType;
use radkit_proto::decode::decode_pair;
use radkit_proto::value::LeafValue;

use super::*;

#[test]
fn long_extended_without_more_bit() {
    let dict = test_dict();
    // SAML-Assertion in a single attribute: no continuation.
    let data = [
        0xf5, 0x09, 0x01, 0x00, b's', b'h', b'o', b'r', b't',
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 9);
    assert_eq!(pairs[0].desc.name, "SAML-Assertion");
    assert_eq!(pairs[0].value, LeafValue::String("short".to_owned()));
}

#[test]
fn long_extended_reassembly() {
    let dict = test_dict();
    // SAML-Assertion split over two fragments; the first carries the
    // MORE bit.
    let mut data = vec![0xf5, 0x15, 0x01, 0x80];
    data.extend_from_slice(b"This value spans ");
    data.extend_from_slice(&[0xf5, 0x11, 0x01, 0x00]);
    data.extend_from_slice(b"two fragments");

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    // Both attributes are consumed by the one logical value.
    assert_eq!(size, data.len());
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].desc.name, "SAML-Assertion");
    assert_eq!(
        pairs[0].value,
        LeafValue::String("This value spans two fragments".to_owned())
    );
}

#[test]
fn long_extended_reassembly_of_unknown_child() {
    let dict = test_dict();
    // Extended type 7 is not in the dictionary; the fragments still
    // reassemble into one opaque value.
    let data = [
        0xf5, 0x06, 0x07, 0x80, 0xaa, 0xbb, 0xf5, 0x06, 0x07, 0x00, 0xcc,
        0xdd,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 12);
    assert_eq!(pairs[0].desc.name, "Attr-245.7");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[0xaa, 0xbb, 0xcc, 0xdd]))
    );
}

#[test]
fn long_extended_chain_stops_at_foreign_attr() {
    let dict = test_dict();
    // The second attribute has a different extended type, so the chain
    // ends after the first fragment.
    let data = [
        0xf5, 0x06, 0x07, 0x80, 0xaa, 0xbb, 0xf5, 0x06, 0x02, 0x00, 0xcc,
        0xdd,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 6);
    assert_eq!(pairs[0].desc.name, "Attr-245.7");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(&[0xaa, 0xbb]))
    );
}

#[test]
fn wimax_single_sub_attr() {
    let dict = test_dict();
    // WiMAX-Capability TLV holding WiMAX-Release = "2.0".
    let data = [
        0x1a, 0x0e, 0x00, 0x00, 0x60, 0xb5, 0x01, 0x08, 0x00, 0x01, 0x05,
        b'2', b'.', b'0',
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 14);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].desc.name, "WiMAX-Release");
    assert_eq!(pairs[0].value, LeafValue::String("2.0".to_owned()));
}

#[test]
fn wimax_reassembly() {
    let dict = test_dict();
    // WiMAX-MSK split over two Vendor-Specific attributes.
    let data = [
        0x1a, 0x0e, 0x00, 0x00, 0x60, 0xb5, 0x05, 0x08, 0x80, 0x41, 0x41,
        0x41, 0x41, 0x41, 0x1a, 0x0d, 0x00, 0x00, 0x60, 0xb5, 0x05, 0x07,
        0x00, 0x42, 0x42, 0x42, 0x42,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 27);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].desc.name, "WiMAX-MSK");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(b"AAAAABBBB"))
    );
}

#[test]
fn wimax_chain_stops_at_other_vendor_attr() {
    let dict = test_dict();
    // The second Vendor-Specific carries a different WiMAX type; only
    // the first fragment is consumed.
    let data = [
        0x1a, 0x0e, 0x00, 0x00, 0x60, 0xb5, 0x05, 0x08, 0x80, 0x41, 0x41,
        0x41, 0x41, 0x41, 0x1a, 0x0d, 0x00, 0x00, 0x60, 0xb5, 0x06, 0x07,
        0x00, 0x42, 0x42, 0x42, 0x42,
    ];

    let (pairs, size) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(size, 14);
    assert_eq!(pairs[0].desc.name, "WiMAX-MSK");
    assert_eq!(
        pairs[0].value,
        LeafValue::Octets(Bytes::from_static(b"AAAAA"))
    );
}

#[test]
fn wimax_sub_attr_not_filling_the_vsa_demotes_to_raw() {
    let dict = test_dict();
    // The WiMAX length octet disagrees with the VSA length.
    let data = [
        0x1a, 0x0e, 0x00, 0x00, 0x60, 0xb5, 0x05, 0x06, 0x00, 0x41, 0x41,
        0x41, 0x41, 0x41,
    ];

    let (pairs, _) = decode_pair(&dict, &request_cxt(), &data).unwrap();
    assert_eq!(pairs[0].desc.name, "Attr-26");
    assert_eq!(pairs[0].desc.attr_type, AttrType::Octets);
}
