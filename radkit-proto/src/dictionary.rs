//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::consts::{AttrEncrypt, AttrType};

// Attribute flags from the dictionary definition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrFlags {
    // RFC 2868 tagged attribute.
    pub has_tag: bool,
    // RFC 2865 section 2.3 concatenation.
    pub concat: bool,
    pub encrypt: AttrEncrypt,
    // Fixed plaintext length for encrypted values that cannot be
    // null-stripped (e.g. MS-CHAP-MPPE-Keys).
    pub length: Option<u8>,
    // Synthesized at decode time for attributes missing from the dictionary.
    pub unknown: bool,
}

// Dictionary definition of a single attribute.
//
// Attributes form a tree: the children of the root are the top-level packet
// attributes, VSA-typed attributes have one Vendor-typed child per vendor,
// and vendors/TLVs have their sub-attributes as children.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrDesc {
    pub name: String,
    pub vendor: u32,
    pub attr: u32,
    pub attr_type: AttrType,
    pub flags: AttrFlags,
    pub parent: Option<Arc<AttrDesc>>,
    #[serde(skip)]
    pub(crate) id: u64,
}

// Per-vendor header layout of Vendor-Specific sub-attributes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[derive(new)]
pub struct VendorDesc {
    pub vendor_id: u32,
    // Width of the sub-attribute type field (1, 2 or 4 octets).
    pub type_width: u8,
    // Width of the sub-attribute length field (0, 1 or 2 octets).
    pub length_width: u8,
    // Vendor uses the WiMAX continuation-octet fragmentation scheme.
    pub wimax: bool,
}

// Process-wide attribute dictionary.
//
// Lookups take the read lock only. Attributes discovered on the wire but
// missing from the dictionary are registered through the `unknown_*`
// methods; registration is an insert-if-absent under the write lock, so a
// given (parent, number) resolves to the same descriptor for the lifetime
// of the dictionary.
#[derive(Debug)]
pub struct Dictionary {
    root: Arc<AttrDesc>,
    inner: RwLock<DictionaryInner>,
}

#[derive(Debug, Default)]
struct DictionaryInner {
    next_id: u64,
    // Dictionary-defined attributes, keyed by parent and number.
    children: BTreeMap<(u64, u32), Arc<AttrDesc>>,
    // Attributes registered at decode time, keyed by parent and number.
    unknowns: BTreeMap<(u64, u32), Arc<AttrDesc>>,
    vendors: BTreeMap<u32, VendorDesc>,
    // Name index (lowercase) over dictionary-defined attributes.
    names: BTreeMap<String, Arc<AttrDesc>>,
}

// ===== impl AttrDesc =====

impl AttrDesc {
    // Builds the dotted-number name of an attribute absent from the
    // dictionary, e.g. "Attr-26.9.1".
    fn unknown_name(parent: &Arc<AttrDesc>, number: u32) -> String {
        let mut oid = vec![number];
        let mut node = parent;
        while let Some(parent) = &node.parent {
            oid.push(node.attr);
            node = parent;
        }
        let oid = oid
            .iter()
            .rev()
            .map(|number| number.to_string())
            .collect::<Vec<_>>()
            .join(".");
        format!("Attr-{oid}")
    }
}

impl std::fmt::Display for AttrDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ===== impl Dictionary =====

impl Dictionary {
    pub fn new() -> Dictionary {
        let root = Arc::new(AttrDesc {
            name: "root".to_owned(),
            vendor: 0,
            attr: 0,
            attr_type: AttrType::Tlv,
            flags: AttrFlags::default(),
            parent: None,
            id: 0,
        });
        let dict = Dictionary {
            root: root.clone(),
            inner: RwLock::new(DictionaryInner {
                next_id: 1,
                ..Default::default()
            }),
        };
        dict.load_base(&root);
        dict
    }

    // Returns the root of the attribute tree.
    pub fn root(&self) -> Arc<AttrDesc> {
        self.root.clone()
    }

    // Looks up a child attribute by number.
    //
    // Unknown attributes registered by previous decodes are visible here,
    // but never shadow dictionary-defined ones.
    pub fn child_by_num(
        &self,
        parent: &Arc<AttrDesc>,
        number: u32,
    ) -> Option<Arc<AttrDesc>> {
        let inner = self.inner.read().unwrap();
        inner
            .children
            .get(&(parent.id, number))
            .or_else(|| inner.unknowns.get(&(parent.id, number)))
            .cloned()
    }

    // Looks up an attribute by name (case-insensitive).
    pub fn attr_by_name(&self, name: &str) -> Option<Arc<AttrDesc>> {
        let inner = self.inner.read().unwrap();
        inner.names.get(&name.to_ascii_lowercase()).cloned()
    }

    // Looks up a vendor definition by vendor ID.
    pub fn vendor_by_num(&self, vendor_id: u32) -> Option<VendorDesc> {
        let inner = self.inner.read().unwrap();
        inner.vendors.get(&vendor_id).copied()
    }

    // Defines a new attribute under the given parent.
    pub fn add_attr(
        &self,
        parent: &Arc<AttrDesc>,
        name: &str,
        number: u32,
        attr_type: AttrType,
        flags: AttrFlags,
    ) -> Arc<AttrDesc> {
        let vendor = match parent.attr_type {
            AttrType::Vendor => parent.attr,
            _ => parent.vendor,
        };
        let mut inner = self.inner.write().unwrap();
        let desc = Arc::new(AttrDesc {
            name: name.to_owned(),
            vendor,
            attr: number,
            attr_type,
            flags,
            parent: Some(parent.clone()),
            id: inner.alloc_id(),
        });
        inner.children.insert((parent.id, number), desc.clone());
        inner.names.insert(name.to_ascii_lowercase(), desc.clone());
        desc
    }

    // Defines a new vendor: its header layout and its Vendor-typed node
    // under the given VSA or EVS attribute.
    pub fn add_vendor(
        &self,
        parent: &Arc<AttrDesc>,
        name: &str,
        vendor_id: u32,
        type_width: u8,
        length_width: u8,
        wimax: bool,
    ) -> Arc<AttrDesc> {
        let mut inner = self.inner.write().unwrap();
        inner.vendors.insert(
            vendor_id,
            VendorDesc::new(vendor_id, type_width, length_width, wimax),
        );
        let desc = Arc::new(AttrDesc {
            name: name.to_owned(),
            vendor: vendor_id,
            attr: vendor_id,
            attr_type: AttrType::Vendor,
            flags: AttrFlags::default(),
            parent: Some(parent.clone()),
            id: inner.alloc_id(),
        });
        inner.children.insert((parent.id, vendor_id), desc.clone());
        inner.names.insert(name.to_ascii_lowercase(), desc.clone());
        desc
    }

    // Registers an attribute discovered on the wire but absent from the
    // dictionary. The registered descriptor is typed as opaque octets.
    pub fn unknown_attr(
        &self,
        parent: &Arc<AttrDesc>,
        vendor: u32,
        number: u32,
    ) -> Arc<AttrDesc> {
        let mut inner = self.inner.write().unwrap();
        if let Some(desc) = inner.unknowns.get(&(parent.id, number)) {
            return desc.clone();
        }
        let desc = Arc::new(AttrDesc {
            name: AttrDesc::unknown_name(parent, number),
            vendor,
            attr: number,
            attr_type: AttrType::Octets,
            flags: AttrFlags {
                unknown: true,
                ..Default::default()
            },
            parent: Some(parent.clone()),
            id: inner.alloc_id(),
        });
        inner.unknowns.insert((parent.id, number), desc.clone());
        desc
    }

    // Registers a Vendor-typed node for a vendor absent from the dictionary.
    pub fn unknown_vendor_attr(
        &self,
        parent: &Arc<AttrDesc>,
        vendor_id: u32,
    ) -> Arc<AttrDesc> {
        let mut inner = self.inner.write().unwrap();
        if let Some(desc) = inner.unknowns.get(&(parent.id, vendor_id)) {
            return desc.clone();
        }
        let desc = Arc::new(AttrDesc {
            name: format!("Vendor-{vendor_id}"),
            vendor: vendor_id,
            attr: vendor_id,
            attr_type: AttrType::Vendor,
            flags: AttrFlags {
                unknown: true,
                ..Default::default()
            },
            parent: Some(parent.clone()),
            id: inner.alloc_id(),
        });
        inner.unknowns.insert((parent.id, vendor_id), desc.clone());
        desc
    }

    // Registers an unknown vendor with the standard one-octet type and
    // length fields.
    pub fn unknown_vendor(&self, vendor_id: u32) -> VendorDesc {
        let mut inner = self.inner.write().unwrap();
        *inner
            .vendors
            .entry(vendor_id)
            .or_insert_with(|| VendorDesc::new(vendor_id, 1, 1, false))
    }

    // Seeds the RFC 2865/2868/6929 base attributes.
    fn load_base(&self, root: &Arc<AttrDesc>) {
        use AttrType::*;

        for (number, name, attr_type) in [
            (1, "User-Name", String),
            (3, "CHAP-Password", Octets),
            (4, "NAS-IP-Address", Ipv4Addr),
            (5, "NAS-Port", Integer),
            (6, "Service-Type", Integer),
            (7, "Framed-Protocol", Integer),
            (8, "Framed-IP-Address", Ipv4Addr),
            (9, "Framed-IP-Netmask", Ipv4Addr),
            (10, "Framed-Routing", Integer),
            (11, "Filter-Id", String),
            (12, "Framed-MTU", Integer),
            (13, "Framed-Compression", Integer),
            (18, "Reply-Message", String),
            (22, "Framed-Route", String),
            (24, "State", Octets),
            (25, "Class", Octets),
            (27, "Session-Timeout", Integer),
            (28, "Idle-Timeout", Integer),
            (30, "Called-Station-Id", String),
            (31, "Calling-Station-Id", String),
            (32, "NAS-Identifier", String),
            (33, "Proxy-State", Octets),
            (40, "Acct-Status-Type", Integer),
            (42, "Acct-Input-Octets", Integer),
            (43, "Acct-Output-Octets", Integer),
            (44, "Acct-Session-Id", String),
            (46, "Acct-Session-Time", Integer),
            (55, "Event-Timestamp", Date),
            (61, "NAS-Port-Type", Integer),
            (77, "Connect-Info", String),
            (80, "Message-Authenticator", Octets),
            (87, "NAS-Port-Id", String),
            (89, "Chargeable-User-Identity", Octets),
            (95, "NAS-IPv6-Address", Ipv6Addr),
            (96, "Framed-Interface-Id", Ifid),
            (97, "Framed-IPv6-Prefix", Ipv6Prefix),
            (98, "Login-IPv6-Host", Ipv6Addr),
            (100, "Framed-IPv6-Pool", String),
            (123, "Delegated-IPv6-Prefix", Ipv6Prefix),
            (168, "Framed-IPv6-Address", Ipv6Addr),
            (169, "DNS-Server-IPv6-Address", Ipv6Addr),
        ] {
            self.add_attr(root, name, number, attr_type, AttrFlags::default());
        }

        self.add_attr(
            root,
            "User-Password",
            2,
            String,
            AttrFlags {
                encrypt: AttrEncrypt::UserPassword,
                ..Default::default()
            },
        );
        self.add_attr(root, "Vendor-Specific", 26, Vsa, AttrFlags::default());
        for (number, name, attr_type) in [
            (64, "Tunnel-Type", Integer),
            (65, "Tunnel-Medium-Type", Integer),
            (66, "Tunnel-Client-Endpoint", String),
            (67, "Tunnel-Server-Endpoint", String),
            (81, "Tunnel-Private-Group-Id", String),
            (82, "Tunnel-Assignment-Id", String),
            (83, "Tunnel-Preference", Integer),
            (90, "Tunnel-Client-Auth-Id", String),
            (91, "Tunnel-Server-Auth-Id", String),
        ] {
            self.add_attr(
                root,
                name,
                number,
                attr_type,
                AttrFlags {
                    has_tag: true,
                    ..Default::default()
                },
            );
        }
        self.add_attr(
            root,
            "Tunnel-Password",
            69,
            String,
            AttrFlags {
                has_tag: true,
                encrypt: AttrEncrypt::TunnelPassword,
                ..Default::default()
            },
        );
        self.add_attr(
            root,
            "EAP-Message",
            79,
            Octets,
            AttrFlags {
                concat: true,
                ..Default::default()
            },
        );
        self.add_attr(
            root,
            "Ascend-Send-Secret",
            214,
            String,
            AttrFlags {
                encrypt: AttrEncrypt::AscendSecret,
                ..Default::default()
            },
        );

        // RFC 6929 extended spaces, each with its EVS sub-space.
        for (number, name, attr_type) in [
            (241, "Extended-Attribute-1", Extended),
            (242, "Extended-Attribute-2", Extended),
            (243, "Extended-Attribute-3", Extended),
            (244, "Extended-Attribute-4", Extended),
            (245, "Extended-Attribute-5", LongExtended),
            (246, "Extended-Attribute-6", LongExtended),
        ] {
            let ext =
                self.add_attr(root, name, number, attr_type, AttrFlags::default());
            let evs_name = format!(
                "Extended-Vendor-Specific-{}",
                number - 240
            );
            self.add_attr(&ext, &evs_name, 26, Evs, AttrFlags::default());
        }
    }
}

impl Default for Dictionary {
    fn default() -> Dictionary {
        Dictionary::new()
    }
}

// ===== impl DictionaryInner =====

impl DictionaryInner {
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
