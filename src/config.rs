//! # Configuration for status lists
//!
//! Settings shared by the status list protocols.

use serde::{Deserialize, Serialize};

use crate::codec::MIN_LENGTH;

/// Default TZIP-16 metadata for Status List 2021 Managers.
pub const STATUS_LIST_METADATA: &str =
    "https://static.gravity.earth/json/status-manager-metadata.json";

/// Default TZIP-16 metadata for Revocation List 2020 Managers.
pub const REVOCATION_LIST_METADATA: &str =
    "https://static.gravity.earth/json/revocation-manager-metadata.json";

/// Default confirmation depth awaited after each submission.
pub const DEFAULT_CONFIRMATIONS: u32 = 3;

/// Configuration for a status list protocol.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    /// Minimum list length in bytes.
    ///
    /// Lists shorter than this are rejected on origination. The default of
    /// 16,384 bytes gives 131,072 entries and is also the floor: smaller
    /// values are treated as 16,384.
    pub min_length: usize,

    /// Number of blocks to wait for after a submission before reporting it as
    /// confirmed.
    pub confirmations: u32,

    /// URL of the contract metadata stored with newly originated Managers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            min_length: MIN_LENGTH,
            confirmations: DEFAULT_CONFIRMATIONS,
            metadata: None,
        }
    }
}

impl ListConfig {
    /// Metadata URL, falling back to `default`.
    #[must_use]
    pub fn metadata_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.metadata.as_deref().unwrap_or(default)
    }
}
