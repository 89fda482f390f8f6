//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::Ipv4Addr;

use bytes::Bytes;
use chrono::Utc;
use tracing::debug;

use crate::debug::Debug;
use crate::error::Error;
use crate::instance::Instance;
use crate::interface::{InterfaceKey, InterfaceType};
use crate::packet::Options;
use crate::packet::lsa::{
    Lsa, LsaBody, LsaKey, LsaNetwork, LsaRouter, LsaRouterFlags,
    LsaRouterLink, LsaRouterLinkType, LsaType,
};

pub const LSA_INIT_SEQ_NO: u32 = 0x8000_0001;
pub const LSA_MAX_SEQ_NO: u32 = 0x7fff_ffff;
pub const LSA_MAX_AGE: u16 = 3600;
pub const DEFAULT_LINK_METRIC: u16 = 10;

// Per-area link-state database.
//
// LSAs are kept in separate tables per type so that database exchange can
// walk them in type order.
#[derive(Debug, Default)]
pub struct AreaLsdb {
    router: HashMap<LsaKey, Lsa>,
    network: HashMap<LsaKey, Lsa>,
    summary_network: HashMap<LsaKey, Lsa>,
    summary_router: HashMap<LsaKey, Lsa>,
    as_external: HashMap<LsaKey, Lsa>,
    // Keys of the LSAs this router originated into this area.
    self_originated: HashSet<LsaKey>,
}

// ===== impl AreaLsdb =====

impl AreaLsdb {
    fn table(&self, lsa_type: LsaType) -> &HashMap<LsaKey, Lsa> {
        match lsa_type {
            LsaType::Router => &self.router,
            LsaType::Network => &self.network,
            LsaType::SummaryNetwork => &self.summary_network,
            LsaType::SummaryRouter => &self.summary_router,
            LsaType::AsExternal => &self.as_external,
        }
    }

    fn table_mut(&mut self, lsa_type: LsaType) -> &mut HashMap<LsaKey, Lsa> {
        match lsa_type {
            LsaType::Router => &mut self.router,
            LsaType::Network => &mut self.network,
            LsaType::SummaryNetwork => &mut self.summary_network,
            LsaType::SummaryRouter => &mut self.summary_router,
            LsaType::AsExternal => &mut self.as_external,
        }
    }

    pub fn get(&self, key: &LsaKey) -> Option<&Lsa> {
        self.table(key.lsa_type).get(key)
    }

    // Installs the given LSA, replacing any previous instance under the
    // same key.
    pub(crate) fn install(&mut self, lsa: Lsa) {
        Debug::LsaInstall(&lsa.hdr).log();
        self.table_mut(lsa.hdr.lsa_type).insert(lsa.hdr.key(), lsa);
    }

    pub(crate) fn remove(&mut self, key: &LsaKey) -> Option<Lsa> {
        self.table_mut(key.lsa_type).remove(key)
    }

    pub(crate) fn mark_self_originated(&mut self, key: LsaKey) {
        self.self_originated.insert(key);
    }

    pub(crate) fn unmark_self_originated(&mut self, key: &LsaKey) {
        self.self_originated.remove(key);
    }

    pub fn is_self_originated(&self, key: &LsaKey) -> bool {
        self.self_originated.contains(key)
    }

    pub fn iter(&self, lsa_type: LsaType) -> impl Iterator<Item = &Lsa> + '_ {
        self.table(lsa_type).values()
    }
}

// ===== global functions =====

// Returns the sequence number the next instance of the given LSA should
// carry. Sequence numbers restart at the initial value after reaching the
// maximum, skipping the reserved value 0x80000000 in between.
fn next_seq_no(lsdb: &AreaLsdb, key: &LsaKey) -> u32 {
    match lsdb.get(key) {
        Some(old) if old.hdr.seq_no == LSA_MAX_SEQ_NO => LSA_INIT_SEQ_NO,
        Some(old) => old.hdr.seq_no.wrapping_add(1),
        None => LSA_INIT_SEQ_NO,
    }
}

// (Re)originates the Router-LSA for the given area, deriving one link per
// eligible interface.
pub fn originate_router_lsa(instance: &mut Instance, area_id: Ipv4Addr) {
    let router_id = instance.config.router_id;

    // Build the link list from the current interface snapshots.
    let mut links = vec![];
    for iface in instance.interfaces.iter_area(area_id) {
        if !iface.is_past_waiting() {
            continue;
        }

        match iface.if_type {
            InterfaceType::Broadcast | InterfaceType::NonBroadcast => {
                if iface.full_neighbors().next().is_none() {
                    // No adjacency over this network yet, so advertise it
                    // as a stub link to the prefix itself.
                    links.push(LsaRouterLink::new(
                        LsaRouterLinkType::StubNetwork,
                        iface.addr.network(),
                        iface.addr.mask(),
                        0,
                        DEFAULT_LINK_METRIC,
                    ));
                } else if let Some(dr_addr) = iface.dr_addr {
                    links.push(LsaRouterLink::new(
                        LsaRouterLinkType::TransitNetwork,
                        dr_addr,
                        iface.addr.ip(),
                        0,
                        DEFAULT_LINK_METRIC,
                    ));
                } else {
                    // Full neighbors but no elected DR in the snapshot.
                    Debug::InterfaceNoDr(&iface.name).log();
                }
            }
            InterfaceType::PointToPoint | InterfaceType::PointToMultipoint => {
                // TODO: originate a point-to-point link (link ID set to the
                // neighbor's Router ID, link data set to the local interface
                // address) once p2p adjacency bring-up is wired in.
                debug!(name = %iface.name, "skipping p2p interface");
            }
        }
    }

    let lsa_key = LsaKey::new(LsaType::Router, router_id, router_id);
    let area = instance.state.areas.get_or_create(area_id);

    if links.is_empty() {
        // Nothing left to advertise, withdraw the LSA.
        if area.lsdb.remove(&lsa_key).is_some() {
            area.lsdb.unmark_self_originated(&lsa_key);
            Debug::LsaWithdraw(&lsa_key).log();
        }
        return;
    }

    let seq_no = next_seq_no(&area.lsdb, &lsa_key);
    let lsa = Lsa::new(
        0,
        Options::E,
        router_id,
        router_id,
        seq_no,
        LsaBody::Router(LsaRouter {
            flags: LsaRouterFlags::empty(),
            links,
        }),
    );
    Debug::LsaOriginate(&lsa.hdr).log();
    area.lsdb.install(lsa);
    area.lsdb.mark_self_originated(lsa_key);
    instance.state.orig_lsa_count += 1;
    instance.state.discontinuity_time = Utc::now();
}

// Originates the Network-LSA for the given interface. Only the DR of a
// network that has at least one fully adjacent neighbor originates one.
pub fn originate_network_lsa(
    instance: &mut Instance,
    area_id: Ipv4Addr,
    iface_key: &InterfaceKey,
) -> Result<(), Error> {
    let router_id = instance.config.router_id;

    let iface = instance
        .interfaces
        .get(iface_key)
        .ok_or(Error::InterfaceNotFound(*iface_key))?;
    if iface.area_id != area_id
        || !iface.is_past_waiting()
        || iface.dr_router_id != Some(router_id)
    {
        return Ok(());
    }

    let attached_rtrs = iface
        .full_neighbors()
        .map(|nbr| nbr.router_id)
        .collect::<BTreeSet<_>>();
    // A network with no full adjacency isn't advertised. Withdrawal of a
    // previously advertised network is the flush signal's job.
    if attached_rtrs.is_empty() {
        return Ok(());
    }

    let mask = iface.addr.mask();
    let lsa_id = iface.addr.ip();

    let lsa_key = LsaKey::new(LsaType::Network, router_id, lsa_id);
    let area = instance.state.areas.get_or_create(area_id);

    let seq_no = next_seq_no(&area.lsdb, &lsa_key);
    let lsa = Lsa::new(
        0,
        Options::E,
        lsa_id,
        router_id,
        seq_no,
        LsaBody::Network(LsaNetwork {
            mask,
            attached_rtrs,
        }),
    );
    Debug::LsaOriginate(&lsa.hdr).log();
    area.lsdb.install(lsa);
    area.lsdb.mark_self_originated(lsa_key);
    instance.state.orig_lsa_count += 1;
    instance.state.discontinuity_time = Utc::now();

    Ok(())
}

// Flushes the Network-LSA for the given interface. The flush is
// unconditional so a router that just lost DR status (or its last
// adjacency) withdraws the LSA regardless of the interface state.
pub fn flush_network_lsa(
    instance: &mut Instance,
    area_id: Ipv4Addr,
    iface_key: &InterfaceKey,
) -> Result<(), Error> {
    let router_id = instance.config.router_id;

    let iface = instance
        .interfaces
        .get(iface_key)
        .ok_or(Error::InterfaceNotFound(*iface_key))?;
    if iface.area_id != area_id {
        return Ok(());
    }
    let lsa_id = iface.addr.ip();

    let lsa_key = LsaKey::new(LsaType::Network, router_id, lsa_id);
    // A flush only removes state, so an area that was never created has
    // nothing to flush.
    let Some(area) = instance.state.areas.get_mut(&area_id) else {
        return Ok(());
    };

    if area.lsdb.remove(&lsa_key).is_some() {
        area.lsdb.unmark_self_originated(&lsa_key);
        Debug::LsaFlush(&lsa_key).log();
    }

    Ok(())
}

// Validates a received LSA and installs it verbatim when it's more recent
// than the database copy.
pub fn process_received_lsa(
    instance: &mut Instance,
    area_id: Ipv4Addr,
    data: &Bytes,
) -> Result<LsaKey, Error> {
    let mut buf = data.clone();
    let lsa = Lsa::decode(&mut buf)?;
    let lsa_key = lsa.hdr.key();

    let area = instance.state.areas.get_or_create(area_id);

    // A received copy of one of our own LSAs never overwrites the local
    // instance.
    if area.lsdb.is_self_originated(&lsa_key) {
        return Err(Error::SelfOriginatedLoopback(lsa_key));
    }

    if !lsa.is_checksum_valid() {
        return Err(Error::CorruptLsa(lsa_key));
    }

    // Sequence number arbitration (signed comparison, so the initial
    // sequence number is the smallest value).
    if let Some(old) = area.lsdb.get(&lsa_key)
        && old.hdr.seq_no as i32 >= lsa.hdr.seq_no as i32
    {
        return Err(Error::StaleInstance(lsa_key));
    }

    area.lsdb.install(lsa);
    instance.state.rx_lsa_count += 1;
    instance.state.discontinuity_time = Utc::now();

    Ok(lsa_key)
}
