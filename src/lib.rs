//! Revocation and suspension of Verifiable Credentials using bitstring status
//! lists held by on-ledger Manager objects.
//!
//! Two variants are supported:
//!
//! * [Status List 2021](https://www.w3.org/TR/vc-status-list/), where each
//!   Manager has a fixed purpose (`revocation` or `suspension`) and stores its
//!   list as `base64url(gzip(bits))`. See [`status_list::StatusList`].
//! * The legacy Revocation List 2020, where a Manager stores its list as an
//!   unsigned integer. See [`revocation_list::RevocationList`].
//!
//! Ledger access goes through the traits in [`provider`]. An in-memory
//! implementation is provided in [`local`].

pub mod bitstring;
pub mod codec;
pub mod config;
pub mod error;
pub mod local;
pub mod model;
pub mod provider;
pub mod revocation_list;
pub mod status_list;
pub mod validate;

pub mod test_utils;

pub use crate::bitstring::Bitstring;
pub use crate::config::ListConfig;
pub use crate::error::{Error, Violation};
pub use crate::model::{StatusListCredential, StatusPurpose, Variant};
pub use crate::revocation_list::RevocationList;
pub use crate::status_list::{Action, Originated, StatusList};
