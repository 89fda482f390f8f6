//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

// OSPF neighbor as reported by the adjacency layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Neighbor {
    pub router_id: Ipv4Addr,
    pub addr: Ipv4Addr,
    pub state: nsm::State,
}

// OSPF neighbor state machine.
pub mod nsm {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    pub enum State {
        Down,
        Attempt,
        Init,
        TwoWay,
        ExStart,
        Exchange,
        Loading,
        Full,
    }
}

// ===== impl Neighbor =====

impl Neighbor {
    pub fn is_full(&self) -> bool {
        self.state == nsm::State::Full
    }
}

// ===== impl nsm::State =====

impl std::fmt::Display for nsm::State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            nsm::State::Down => write!(f, "down"),
            nsm::State::Attempt => write!(f, "attempt"),
            nsm::State::Init => write!(f, "init"),
            nsm::State::TwoWay => write!(f, "2-way"),
            nsm::State::ExStart => write!(f, "exstart"),
            nsm::State::Exchange => write!(f, "exchange"),
            nsm::State::Loading => write!(f, "loading"),
            nsm::State::Full => write!(f, "full"),
        }
    }
}
