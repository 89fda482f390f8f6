//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use derive_new::new;
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

use crate::neighbor::Neighbor;

// Key used to identify an interface in the interface table.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, new)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceKey {
    pub addr: Ipv4Addr,
    pub ifindex: u32,
}

// OSPF interface snapshot as reported by the interface layer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Interface {
    pub name: String,
    pub area_id: Ipv4Addr,
    pub if_type: InterfaceType,
    pub state: ism::State,
    // Primary address (including prefix length).
    pub addr: Ipv4Network,
    // Designated Router for the attached network, if elected.
    pub dr_addr: Option<Ipv4Addr>,
    pub dr_router_id: Option<Ipv4Addr>,
    // Neighbors reachable through this interface, keyed by source address.
    pub neighbors: BTreeMap<Ipv4Addr, Neighbor>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum InterfaceType {
    Broadcast,
    NonBroadcast,
    PointToMultipoint,
    PointToPoint,
}

// Interface table.
#[derive(Debug, Default)]
pub struct Interfaces {
    entries: BTreeMap<InterfaceKey, Interface>,
}

// OSPF interface state machine.
pub mod ism {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    pub enum State {
        Down,
        Loopback,
        Waiting,
        PointToPoint,
        DrOther,
        Backup,
        Dr,
    }
}

// ===== impl Interface =====

impl Interface {
    // Checks if the interface has left the Waiting state (i.e. DR election
    // has already taken place).
    pub fn is_past_waiting(&self) -> bool {
        self.state > ism::State::Waiting
    }

    // Returns an iterator over the fully adjacent neighbors of this
    // interface.
    pub fn full_neighbors(&self) -> impl Iterator<Item = &Neighbor> + '_ {
        self.neighbors.values().filter(|nbr| nbr.is_full())
    }
}

// ===== impl Interfaces =====

impl Interfaces {
    pub fn get(&self, key: &InterfaceKey) -> Option<&Interface> {
        self.entries.get(key)
    }

    // Inserts or replaces the snapshot for the given interface.
    pub fn update(&mut self, key: InterfaceKey, iface: Interface) {
        self.entries.insert(key, iface);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> + '_ {
        self.entries.values()
    }

    // Returns an iterator over the interfaces attached to the given area.
    pub fn iter_area(
        &self,
        area_id: Ipv4Addr,
    ) -> impl Iterator<Item = &Interface> + '_ {
        self.entries
            .values()
            .filter(move |iface| iface.area_id == area_id)
    }
}

// ===== impl ism::State =====

impl std::fmt::Display for ism::State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ism::State::Down => write!(f, "down"),
            ism::State::Loopback => write!(f, "loopback"),
            ism::State::Waiting => write!(f, "waiting"),
            ism::State::PointToPoint => write!(f, "point-to-point"),
            ism::State::DrOther => write!(f, "dr-other"),
            ism::State::Backup => write!(f, "backup"),
            ism::State::Dr => write!(f, "dr"),
        }
    }
}
