//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

mod fragment;
mod structural;

use radkit_proto::consts::{AttrEncrypt, AttrType};
use radkit_proto::decode::PacketCxt;
use radkit_proto::dictionary::{AttrFlags, Dictionary};

// RFC 2865 section 7.1 example credentials: user "nemo", password
// "arctangent", shared secret "xyzzy5461".
const SECRET: &str = "xyzzy5461";
const VECTOR: [u8; 16] = [
    0x0f, 0x40, 0x3f, 0x94, 0x73, 0x97, 0x80, 0x57, 0xbd, 0x83, 0xd5, 0xcb,
    0x98, 0xf4, 0x22, 0x7a,
];

//
// Helper functions.
//

// Base dictionary extended with the vendors and attributes the tests
// exercise.
fn test_dict() -> Dictionary {
    let dict = Dictionary::new();
    let root = dict.root();
    let vsa = dict.child_by_num(&root, 26).unwrap();

    let cisco = dict.add_vendor(&vsa, "Cisco", 9, 1, 1, false);
    dict.add_attr(
        &cisco,
        "Cisco-Disconnect-Cause",
        195,
        AttrType::Integer,
        AttrFlags::default(),
    );

    let microsoft = dict.add_vendor(&vsa, "Microsoft", 311, 1, 1, false);
    dict.add_attr(
        &microsoft,
        "MS-CHAP-MPPE-Keys",
        12,
        AttrType::Octets,
        AttrFlags {
            encrypt: AttrEncrypt::UserPassword,
            length: Some(24),
            ..Default::default()
        },
    );

    let example = dict.add_vendor(&vsa, "Example", 32473, 1, 1, false);
    dict.add_attr(
        &example,
        "Example-Host",
        3,
        AttrType::ComboIp,
        AttrFlags::default(),
    );

    let wimax = dict.add_vendor(&vsa, "WiMAX", 24757, 1, 1, true);
    let capability = dict.add_attr(
        &wimax,
        "WiMAX-Capability",
        1,
        AttrType::Tlv,
        AttrFlags::default(),
    );
    dict.add_attr(
        &capability,
        "WiMAX-Release",
        1,
        AttrType::String,
        AttrFlags::default(),
    );
    dict.add_attr(
        &wimax,
        "WiMAX-MSK",
        5,
        AttrType::Octets,
        AttrFlags::default(),
    );

    // RFC 6572 mobile IPv4 home address prefix.
    dict.add_attr(
        &root,
        "PMIP6-Home-IPv4-HoA",
        155,
        AttrType::Ipv4Prefix,
        AttrFlags::default(),
    );

    // RFC 7499 fragmentation status, a leaf in the first extended space.
    let ext1 = dict.child_by_num(&root, 241).unwrap();
    dict.add_attr(
        &ext1,
        "Frag-Status",
        1,
        AttrType::Integer,
        AttrFlags::default(),
    );

    // RFC 7833 SAML assertion, fragmentable over Long-Extended-5.
    let ext5 = dict.child_by_num(&root, 245).unwrap();
    dict.add_attr(
        &ext5,
        "SAML-Assertion",
        1,
        AttrType::String,
        AttrFlags::default(),
    );

    // Vendor space under Extended-Vendor-Specific-1.
    let evs1 = dict.child_by_num(&ext1, 26).unwrap();
    let example_evs = dict.add_vendor(&evs1, "Example-EVS", 32473, 1, 1, false);
    dict.add_attr(
        &example_evs,
        "Example-Identifier",
        1,
        AttrType::String,
        AttrFlags::default(),
    );

    dict
}

// Context of a request packet.
fn request_cxt() -> PacketCxt {
    PacketCxt {
        secret: Some(SECRET.to_owned()),
        vector: VECTOR,
        original_vector: None,
    }
}

// Context of a response packet, with the matching request vector.
fn response_cxt() -> PacketCxt {
    PacketCxt {
        secret: Some(SECRET.to_owned()),
        vector: [0xa5; 16],
        original_vector: Some(VECTOR),
    }
}
