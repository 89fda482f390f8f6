//
// Copyright (c) The Switchyard Project Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, warn};

use crate::interface::InterfaceKey;
use crate::packet::error::DecodeError;
use crate::packet::lsa::LsaKey;

// OSPF errors.
#[derive(Debug)]
pub enum Error {
    InterfaceNotFound(InterfaceKey),
    LsaDecodeError(DecodeError),
    UnsupportedLsaType(u8),
    CorruptLsa(LsaKey),
    StaleInstance(LsaKey),
    SelfOriginatedLoopback(LsaKey),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::InterfaceNotFound(key) => {
                warn!(?key, "{}", self);
            }
            Error::LsaDecodeError(error) => {
                warn!(%error, "{}", self);
            }
            Error::UnsupportedLsaType(lsa_type) => {
                warn!(%lsa_type, "{}", self);
            }
            Error::CorruptLsa(lsa_key) => {
                warn!(?lsa_key, "{}", self);
            }
            Error::StaleInstance(lsa_key) => {
                warn!(?lsa_key, "{}", self);
            }
            // Copies of our own LSAs come back routinely during flooding.
            Error::SelfOriginatedLoopback(lsa_key) => {
                debug!(?lsa_key, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InterfaceNotFound(..) => {
                write!(f, "interface not found")
            }
            Error::LsaDecodeError(..) => {
                write!(f, "failed to decode LSA")
            }
            Error::UnsupportedLsaType(..) => {
                write!(f, "unsupported LSA type")
            }
            Error::CorruptLsa(..) => {
                write!(f, "LSA checksum validation failed")
            }
            Error::StaleInstance(..) => {
                write!(f, "LSA instance is not more recent than the database copy")
            }
            Error::SelfOriginatedLoopback(..) => {
                write!(f, "discarded received copy of self-originated LSA")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LsaDecodeError(error) => Some(error),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(error: DecodeError) -> Error {
        match error {
            DecodeError::UnknownLsaType(lsa_type) => {
                Error::UnsupportedLsaType(lsa_type)
            }
            _ => Error::LsaDecodeError(error),
        }
    }
}
