//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use bytes::Bytes;
use maplit::btreeset;
use switchyard_ospf::packet::Options;
use switchyard_ospf::packet::error::DecodeError;
use switchyard_ospf::packet::lsa::{
    Lsa, LsaAsExternal, LsaAsExternalFlags, LsaBody, LsaHdr, LsaNetwork,
    LsaRouter, LsaRouterFlags, LsaRouterLink, LsaRouterLinkType, LsaSummary,
    LsaType,
};

fn addr(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}

fn assert_roundtrip(lsa: &Lsa) {
    let mut buf = lsa.raw.clone();
    let decoded = Lsa::decode(&mut buf).expect("failed to decode LSA");
    assert_eq!(*lsa, decoded);
    assert!(decoded.is_checksum_valid());
}

#[test]
fn decode_router_lsa() {
    let lsa = Lsa::new(
        10,
        Options::E,
        addr(1, 1, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Router(LsaRouter {
            flags: LsaRouterFlags::B,
            links: vec![
                LsaRouterLink::new(
                    LsaRouterLinkType::TransitNetwork,
                    addr(10, 0, 1, 1),
                    addr(10, 0, 1, 2),
                    0,
                    10,
                ),
                LsaRouterLink::new(
                    LsaRouterLinkType::StubNetwork,
                    addr(10, 0, 2, 0),
                    addr(255, 255, 255, 0),
                    0,
                    10,
                ),
            ],
        }),
    );
    assert_eq!(lsa.hdr.length, LsaHdr::LENGTH + 4 + 2 * 12);
    assert_roundtrip(&lsa);
}

#[test]
fn decode_network_lsa() {
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(10, 0, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Network(LsaNetwork {
            mask: addr(255, 255, 255, 0),
            attached_rtrs: btreeset![addr(1, 1, 1, 1), addr(2, 2, 2, 2)],
        }),
    );
    assert_eq!(lsa.hdr.length, LsaHdr::LENGTH + 4 + 2 * 4);
    assert_roundtrip(&lsa);
}

#[test]
fn decode_summary_lsas() {
    for (lsa_type, body) in [
        (
            LsaType::SummaryNetwork,
            LsaBody::SummaryNetwork(LsaSummary {
                mask: addr(255, 255, 0, 0),
                metric: 20,
            }),
        ),
        (
            LsaType::SummaryRouter,
            LsaBody::SummaryRouter(LsaSummary {
                mask: addr(0, 0, 0, 0),
                metric: 30,
            }),
        ),
    ] {
        let lsa = Lsa::new(
            0,
            Options::E,
            addr(172, 16, 0, 0),
            addr(1, 1, 1, 1),
            0x8000_0001,
            body,
        );
        assert_eq!(lsa.hdr.lsa_type, lsa_type);
        assert_roundtrip(&lsa);
    }
}

#[test]
fn decode_as_external_lsa() {
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(192, 0, 2, 0),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::AsExternal(LsaAsExternal {
            mask: addr(255, 255, 255, 0),
            flags: LsaAsExternalFlags::E,
            metric: 100,
            fwd_addr: Some(addr(10, 0, 1, 254)),
            tag: 64512,
        }),
    );
    assert_roundtrip(&lsa);

    // Absent forwarding address encodes as 0.0.0.0 and decodes as None.
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(192, 0, 2, 0),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::AsExternal(LsaAsExternal {
            mask: addr(255, 255, 255, 0),
            flags: LsaAsExternalFlags::empty(),
            metric: 1,
            fwd_addr: None,
            tag: 0,
        }),
    );
    let mut buf = lsa.raw.clone();
    let decoded = Lsa::decode(&mut buf).unwrap();
    assert_eq!(decoded.body.as_as_external().unwrap().fwd_addr, None);
}

#[test]
fn decode_router_lsa_with_tos_entries() {
    // Hand-crafted Router-LSA carrying one link followed by a single TOS
    // metric, which decoders must skip.
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(1, 1, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Router(LsaRouter {
            flags: LsaRouterFlags::empty(),
            links: vec![LsaRouterLink::new(
                LsaRouterLinkType::StubNetwork,
                addr(10, 0, 1, 0),
                addr(255, 255, 255, 0),
                0,
                10,
            )],
        }),
    );
    let mut raw = lsa.raw.to_vec();
    // One TOS entry.
    raw[33] = 1;
    raw.extend_from_slice(&[5, 0, 0, 50]);
    let length = raw.len() as u16;
    raw[18..20].copy_from_slice(&length.to_be_bytes());
    raw[16..18].copy_from_slice(&[0, 0]);
    let cksum = Lsa::checksum(&raw[2..], 14);
    raw[16..18].copy_from_slice(&cksum);

    let mut buf = Bytes::from(raw);
    let decoded = Lsa::decode(&mut buf).unwrap();
    assert!(decoded.is_checksum_valid());
    let body = decoded.body.as_router().unwrap();
    assert_eq!(body.links.len(), 1);
    assert_eq!(body.links[0].metric, 10);
}

#[test]
fn checksum_detects_corruption() {
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(10, 0, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Network(LsaNetwork {
            mask: addr(255, 255, 255, 0),
            attached_rtrs: btreeset![addr(1, 1, 1, 1)],
        }),
    );
    assert!(lsa.is_checksum_valid());

    // Flip one body byte.
    let mut raw = lsa.raw.to_vec();
    let last = raw.len() - 1;
    raw[last] ^= 0xff;
    let mut buf = Bytes::from(raw);
    let corrupted = Lsa::decode(&mut buf).unwrap();
    assert!(!corrupted.is_checksum_valid());
}

#[test]
fn checksum_ignores_age() {
    let lsa = Lsa::new(
        0,
        Options::E,
        addr(10, 0, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Network(LsaNetwork {
            mask: addr(255, 255, 255, 0),
            attached_rtrs: BTreeSet::new(),
        }),
    );

    // Aging an LSA in place must not invalidate its checksum.
    let mut raw = lsa.raw.to_vec();
    raw[0..2].copy_from_slice(&1200u16.to_be_bytes());
    let mut buf = Bytes::from(raw);
    let aged = Lsa::decode(&mut buf).unwrap();
    assert_eq!(aged.hdr.age, 1200);
    assert!(aged.is_checksum_valid());
}

#[test]
fn lsa_age_is_monotonic() {
    let lsa = Lsa::new(
        100,
        Options::E,
        addr(10, 0, 1, 1),
        addr(1, 1, 1, 1),
        0x8000_0001,
        LsaBody::Network(LsaNetwork {
            mask: addr(255, 255, 255, 0),
            attached_rtrs: BTreeSet::new(),
        }),
    );
    assert!(lsa.age() >= lsa.hdr.age);
    assert!(lsa.age() <= 3600);
}

#[test]
fn decode_unknown_lsa_type() {
    let mut raw = vec![0; 20];
    raw[3] = 9;
    raw[19] = 20;
    let mut buf = Bytes::from(raw);
    assert_eq!(Lsa::decode(&mut buf), Err(DecodeError::UnknownLsaType(9)));
}

#[test]
fn decode_truncated_lsa() {
    // Buffer shorter than an LSA header.
    let mut buf = Bytes::from(vec![0; 10]);
    assert_eq!(Lsa::decode(&mut buf), Err(DecodeError::InvalidLength(10)));

    // Length field smaller than the header itself.
    let mut raw = vec![0; 20];
    raw[3] = 1;
    raw[19] = 19;
    let mut buf = Bytes::from(raw);
    assert_eq!(Lsa::decode(&mut buf), Err(DecodeError::InvalidLsaLength));

    // Length field pointing past the end of the buffer.
    let mut raw = vec![0; 20];
    raw[3] = 1;
    raw[19] = 48;
    let mut buf = Bytes::from(raw);
    assert_eq!(Lsa::decode(&mut buf), Err(DecodeError::InvalidLsaLength));
}
