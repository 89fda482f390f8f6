//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

// OSPF inter-task message definitions.
pub mod messages {
    use serde::{Deserialize, Serialize};

    // Messages sent to the instance task.
    pub mod input {
        use std::net::Ipv4Addr;

        use bytes::Bytes;

        use super::*;
        use crate::interface::{Interface, InterfaceKey};

        // LSDB update request from the flooding layer.
        #[derive(Clone, Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct LsdbUpdateMsg {
            pub msg_type: LsdbUpdateType,
            pub area_id: Ipv4Addr,
            // Encoded LSA, verbatim as received from the wire.
            pub data: Bytes,
        }

        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        #[derive(Deserialize, Serialize)]
        pub enum LsdbUpdateType {
            Add,
            Delete,
            Update,
        }

        // Interface snapshot pushed by the interface layer.
        #[derive(Clone, Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct IfaceUpdateMsg {
            pub key: InterfaceKey,
            pub iface: Interface,
        }

        // Interface state machine transition notification.
        #[derive(Clone, Copy, Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct IfStateChangeMsg {
            pub area_id: Ipv4Addr,
        }

        // DR change notification for an attached network.
        #[derive(Clone, Copy, Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct NetworkDrChangeMsg {
            pub area_id: Ipv4Addr,
        }

        // Network-LSA origination/flush request.
        #[derive(Clone, Copy, Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct NetworkLsaMsg {
            pub area_id: Ipv4Addr,
            pub iface_key: InterfaceKey,
        }
    }

    // Messages sent by the instance task.
    pub mod output {
        use std::net::Ipv4Addr;

        use super::*;

        // Outcome of an LSDB update request.
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        #[derive(Deserialize, Serialize)]
        pub struct LsaUpdateResultMsg {
            pub area_id: Ipv4Addr,
            pub accepted: bool,
        }
    }
}
