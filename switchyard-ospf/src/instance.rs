//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchyard_utils::{UnboundedReceiver, UnboundedSender};
use tokio::sync::mpsc;

use crate::area::Areas;
use crate::debug::Debug;
use crate::events;
use crate::interface::Interfaces;
use crate::tasks::messages::input::{
    IfStateChangeMsg, IfaceUpdateMsg, LsdbUpdateMsg, NetworkDrChangeMsg,
    NetworkLsaMsg,
};
use crate::tasks::messages::output::LsaUpdateResultMsg;

// OSPF instance configuration.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct Config {
    pub router_id: Ipv4Addr,
    // Areas to activate at startup. Further areas are created on demand as
    // LSAs for them arrive.
    pub areas: Vec<Ipv4Addr>,
}

// OSPF instance state.
#[derive(Debug, Default)]
pub struct InstanceState {
    pub areas: Areas,
    // Statistics.
    pub orig_lsa_count: u32,
    pub rx_lsa_count: u32,
    pub discontinuity_time: DateTime<Utc>,
}

// Instance output channels.
#[derive(Clone, Debug)]
pub struct InstanceChannelsTx {
    pub lsa_result: UnboundedSender<LsaUpdateResultMsg>,
}

// Instance input channels.
#[derive(Debug)]
pub struct InstanceChannelsRx {
    pub lsdb_update: UnboundedReceiver<LsdbUpdateMsg>,
    pub iface_update: UnboundedReceiver<IfaceUpdateMsg>,
    pub if_state_change: UnboundedReceiver<IfStateChangeMsg>,
    pub network_dr_change: UnboundedReceiver<NetworkDrChangeMsg>,
    pub create_network_lsa: UnboundedReceiver<NetworkLsaMsg>,
    pub flush_network_lsa: UnboundedReceiver<NetworkLsaMsg>,
}

// Sending halves of the instance input channels, handed out to the
// collaborating tasks.
#[derive(Clone, Debug)]
pub struct InstanceChannelsTxInput {
    pub lsdb_update: UnboundedSender<LsdbUpdateMsg>,
    pub iface_update: UnboundedSender<IfaceUpdateMsg>,
    pub if_state_change: UnboundedSender<IfStateChangeMsg>,
    pub network_dr_change: UnboundedSender<NetworkDrChangeMsg>,
    pub create_network_lsa: UnboundedSender<NetworkLsaMsg>,
    pub flush_network_lsa: UnboundedSender<NetworkLsaMsg>,
}

// OSPF instance.
#[derive(Debug)]
pub struct Instance {
    pub config: Config,
    pub state: InstanceState,
    pub interfaces: Interfaces,
    pub tx: InstanceChannelsTx,
}

// ===== impl Instance =====

impl Instance {
    pub fn new(config: Config, tx: InstanceChannelsTx) -> Instance {
        Debug::InstanceStart.log();

        let mut state = InstanceState::default();
        for area_id in &config.areas {
            state.areas.get_or_create(*area_id);
        }

        Instance {
            config,
            state,
            interfaces: Default::default(),
            tx,
        }
    }

    // Instance event loop.
    //
    // All LSDB state is owned by this task. Events arriving on the same
    // channel are processed in FIFO order; ordering across different
    // channels is unspecified. The loop ends once every input channel is
    // closed, returning the instance for final inspection.
    pub async fn run(mut self, mut channels: InstanceChannelsRx) -> Instance {
        loop {
            tokio::select! {
                Some(msg) = channels.lsdb_update.recv() => {
                    if let Err(error) = events::process_lsdb_update(&mut self, msg) {
                        error.log();
                    }
                }
                Some(msg) = channels.iface_update.recv() => {
                    if let Err(error) = events::process_iface_update(&mut self, msg) {
                        error.log();
                    }
                }
                Some(msg) = channels.if_state_change.recv() => {
                    if let Err(error) = events::process_if_state_change(&mut self, msg) {
                        error.log();
                    }
                }
                Some(msg) = channels.network_dr_change.recv() => {
                    if let Err(error) = events::process_network_dr_change(&mut self, msg) {
                        error.log();
                    }
                }
                Some(msg) = channels.create_network_lsa.recv() => {
                    if let Err(error) = events::process_create_network_lsa(&mut self, msg) {
                        error.log();
                    }
                }
                Some(msg) = channels.flush_network_lsa.recv() => {
                    if let Err(error) = events::process_flush_network_lsa(&mut self, msg) {
                        error.log();
                    }
                }
                else => break,
            }
        }

        self
    }
}

// ===== global functions =====

// Creates the instance input channels, returning the sending halves
// alongside the receiver set consumed by `Instance::run`.
pub fn instance_channels() -> (InstanceChannelsTxInput, InstanceChannelsRx) {
    let (lsdb_updatep, lsdb_updatec) = mpsc::unbounded_channel();
    let (iface_updatep, iface_updatec) = mpsc::unbounded_channel();
    let (if_state_changep, if_state_changec) = mpsc::unbounded_channel();
    let (network_dr_changep, network_dr_changec) = mpsc::unbounded_channel();
    let (create_network_lsap, create_network_lsac) = mpsc::unbounded_channel();
    let (flush_network_lsap, flush_network_lsac) = mpsc::unbounded_channel();

    let tx = InstanceChannelsTxInput {
        lsdb_update: lsdb_updatep,
        iface_update: iface_updatep,
        if_state_change: if_state_changep,
        network_dr_change: network_dr_changep,
        create_network_lsa: create_network_lsap,
        flush_network_lsa: flush_network_lsap,
    };
    let rx = InstanceChannelsRx {
        lsdb_update: lsdb_updatec,
        iface_update: iface_updatec,
        if_state_change: if_state_changec,
        network_dr_change: network_dr_changec,
        create_network_lsa: create_network_lsac,
        flush_network_lsa: flush_network_lsac,
    };

    (tx, rx)
}
