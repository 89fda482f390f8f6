//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::debug::Debug;
use crate::error::Error;
use crate::instance::Instance;
use crate::lsdb;
use crate::tasks::messages::input::{
    IfStateChangeMsg, IfaceUpdateMsg, LsdbUpdateMsg, LsdbUpdateType,
    NetworkDrChangeMsg, NetworkLsaMsg,
};
use crate::tasks::messages::output::LsaUpdateResultMsg;

// ===== LSDB update =====

pub fn process_lsdb_update(
    instance: &mut Instance,
    msg: LsdbUpdateMsg,
) -> Result<(), Error> {
    match msg.msg_type {
        LsdbUpdateType::Add => {
            let accepted = match lsdb::process_received_lsa(
                instance,
                msg.area_id,
                &msg.data,
            ) {
                Ok(lsa_key) => {
                    Debug::LsaAccept(&lsa_key).log();
                    true
                }
                Err(error) => {
                    error.log();
                    false
                }
            };

            // Report the outcome to the flooding layer.
            let _ = instance.tx.lsa_result.send(LsaUpdateResultMsg {
                area_id: msg.area_id,
                accepted,
            });
        }
        LsdbUpdateType::Delete => {
            // Premature aging isn't handled here yet.
            Debug::LsdbUpdateIgnored("delete").log();
        }
        LsdbUpdateType::Update => {
            Debug::LsdbUpdateIgnored("update").log();
        }
    }

    Ok(())
}

// ===== interface snapshot update =====

pub fn process_iface_update(
    instance: &mut Instance,
    msg: IfaceUpdateMsg,
) -> Result<(), Error> {
    Debug::InterfaceUpdate(&msg.key).log();
    instance.interfaces.update(msg.key, msg.iface);
    Ok(())
}

// ===== interface state change =====

pub fn process_if_state_change(
    instance: &mut Instance,
    msg: IfStateChangeMsg,
) -> Result<(), Error> {
    lsdb::originate_router_lsa(instance, msg.area_id);
    Ok(())
}

// ===== network DR change =====

pub fn process_network_dr_change(
    instance: &mut Instance,
    msg: NetworkDrChangeMsg,
) -> Result<(), Error> {
    // A DR change alters the transit links of the Router-LSA.
    lsdb::originate_router_lsa(instance, msg.area_id);
    Ok(())
}

// ===== Network-LSA origination =====

pub fn process_create_network_lsa(
    instance: &mut Instance,
    msg: NetworkLsaMsg,
) -> Result<(), Error> {
    lsdb::originate_network_lsa(instance, msg.area_id, &msg.iface_key)
}

// ===== Network-LSA flush =====

pub fn process_flush_network_lsa(
    instance: &mut Instance,
    msg: NetworkLsaMsg,
) -> Result<(), Error> {
    lsdb::flush_network_lsa(instance, msg.area_id, &msg.iface_key)
}
