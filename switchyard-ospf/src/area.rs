//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::debug::Debug;
use crate::lsdb::AreaLsdb;

// OSPF area.
#[derive(Debug)]
pub struct Area {
    pub area_id: Ipv4Addr,
    pub lsdb: AreaLsdb,
}

// Area table.
#[derive(Debug, Default)]
pub struct Areas {
    entries: BTreeMap<Ipv4Addr, Area>,
}

// ===== impl Area =====

impl Area {
    pub(crate) fn new(area_id: Ipv4Addr) -> Area {
        Area {
            area_id,
            lsdb: Default::default(),
        }
    }
}

// ===== impl Areas =====

impl Areas {
    pub fn get(&self, area_id: &Ipv4Addr) -> Option<&Area> {
        self.entries.get(area_id)
    }

    pub fn get_mut(&mut self, area_id: &Ipv4Addr) -> Option<&mut Area> {
        self.entries.get_mut(area_id)
    }

    // Returns the area associated to the given ID, creating it first if it
    // doesn't exist yet.
    pub fn get_or_create(&mut self, area_id: Ipv4Addr) -> &mut Area {
        self.entries.entry(area_id).or_insert_with(|| {
            Debug::AreaCreate(area_id).log();
            Area::new(area_id)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> + '_ {
        self.entries.values()
    }
}
