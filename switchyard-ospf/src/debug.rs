//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use tracing::{debug, debug_span};

use crate::interface::InterfaceKey;
use crate::packet::lsa::{LsaHdr, LsaKey};

// OSPF debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    InstanceStart,
    AreaCreate(Ipv4Addr),
    InterfaceUpdate(&'a InterfaceKey),
    InterfaceNoDr(&'a str),
    LsaInstall(&'a LsaHdr),
    LsaOriginate(&'a LsaHdr),
    LsaWithdraw(&'a LsaKey),
    LsaFlush(&'a LsaKey),
    LsaAccept(&'a LsaKey),
    LsdbUpdateIgnored(&'a str),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::InstanceStart => {
                debug!("{}", self);
            }
            Debug::AreaCreate(area_id) => {
                debug!(%area_id, "{}", self);
            }
            Debug::InterfaceUpdate(key) => {
                debug!(?key, "{}", self);
            }
            Debug::InterfaceNoDr(name) => {
                debug!(%name, "{}", self);
            }
            Debug::LsaInstall(hdr) | Debug::LsaOriginate(hdr) => {
                // Parse LSA header.
                let data = serde_json::to_string(&hdr).unwrap();
                debug_span!("lsa").in_scope(|| {
                    debug!(%data, "{}", self);
                });
            }
            Debug::LsaWithdraw(lsa_key)
            | Debug::LsaFlush(lsa_key)
            | Debug::LsaAccept(lsa_key) => {
                debug!(?lsa_key, "{}", self);
            }
            Debug::LsdbUpdateIgnored(msg_type) => {
                debug!(%msg_type, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InstanceStart => {
                write!(f, "starting instance")
            }
            Debug::AreaCreate(..) => {
                write!(f, "creating area")
            }
            Debug::InterfaceUpdate(..) => {
                write!(f, "interface update")
            }
            Debug::InterfaceNoDr(..) => {
                write!(f, "skipping transit link, no DR address in snapshot")
            }
            Debug::LsaInstall(..) => {
                write!(f, "installing LSA")
            }
            Debug::LsaOriginate(..) => {
                write!(f, "originating LSA")
            }
            Debug::LsaWithdraw(..) => {
                write!(f, "withdrawing LSA")
            }
            Debug::LsaFlush(..) => {
                write!(f, "flushing LSA")
            }
            Debug::LsaAccept(..) => {
                write!(f, "accepting received LSA")
            }
            Debug::LsdbUpdateIgnored(..) => {
                write!(f, "ignoring LSDB update")
            }
        }
    }
}
