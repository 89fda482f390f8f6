//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod area;
pub mod debug;
pub mod error;
pub mod events;
pub mod instance;
pub mod interface;
pub mod lsdb;
pub mod neighbor;
pub mod packet;
pub mod tasks;
