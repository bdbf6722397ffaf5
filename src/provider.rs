//! # Ledger Provider
//!
//! Traits implemented by a ledger client to give the status list protocols
//! access to Manager objects. Each call is a suspension point: reading a
//! view, submitting a state change, and waiting for its confirmation. No
//! other part of a protocol operation awaits.
//!
//! Implementations own transport, signing, and sequencing. A submission that
//! loses a race against a concurrent writer must surface as an error from
//! [`PendingOperation::confirmation`], never be merged.

use std::fmt::{self, Display};
use std::future::Future;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::model::StatusPurpose;

/// Result is used for all external errors.
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// A ledger hosting Manager objects.
pub trait Ledger: Send + Sync {
    /// Pending state change returned by submissions and deployments.
    type Operation: PendingOperation;

    /// Accessor for a single Manager.
    type Manager: Manager<Operation = Self::Operation>;

    /// Returns an accessor for the Manager at `address`.
    fn manager(&self, address: &str) -> impl Future<Output = Result<Self::Manager>> + Send;

    /// Deploy a new Manager with the given initial storage, on behalf of
    /// `signer`.
    fn deploy(
        &self, signer: &str, storage: Storage,
    ) -> impl Future<Output = Result<Self::Operation>> + Send;
}

/// Views and entrypoint of a single Manager object.
pub trait Manager: Send + Sync {
    /// Pending state change returned by [`Manager::submit`].
    type Operation: PendingOperation;

    /// The `getOwner` view: the issuer's account address.
    fn owner(&self) -> impl Future<Output = Result<String>> + Send;

    /// The `getPurpose` view. Only Status List 2021 Managers have one.
    fn purpose(&self) -> impl Future<Output = Result<StatusPurpose>> + Send;

    /// The `getList` view: the current list.
    fn list(&self) -> impl Future<Output = Result<ListValue>> + Send;

    /// Replace the list, on behalf of `signer`.
    fn submit(
        &self, signer: &str, list: ListValue,
    ) -> impl Future<Output = Result<Self::Operation>> + Send;
}

/// A state change that has been submitted but is not yet confirmed.
pub trait PendingOperation: Send + Sync {
    /// Operation hash.
    fn hash(&self) -> &str;

    /// Wait until the operation is `depth` blocks deep.
    fn confirmation(&self, depth: u32) -> impl Future<Output = Result<Confirmation>> + Send;
}

/// A list as stored by a Manager.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ListValue {
    /// `base64url(gzip(list))`, used by Status List 2021 Managers.
    Encoded(String),

    /// The list as an unsigned integer, used by Revocation List 2020 Managers.
    Number(#[serde(with = "decimal")] BigUint),
}

impl ListValue {
    /// The kind of value, for error reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Encoded(_) => "encoded",
            Self::Number(_) => "number",
        }
    }
}

/// Initial storage of a new Manager.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Storage {
    /// Account address of the issuer.
    pub owner: String,

    /// Fixed purpose. `None` for Revocation List 2020 Managers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<StatusPurpose>,

    /// Initial list.
    pub list: ListValue,

    /// TZIP-16 metadata URL.
    pub metadata: String,
}

/// A confirmed operation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Confirmation {
    /// Operation hash.
    pub hash: String,

    /// Level of the block the operation was included in.
    pub level: u64,

    /// Address of the contract deployed by the operation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

impl Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash: {}\nIncluded in block: {}", self.hash, self.level)?;
        if let Some(address) = &self.contract_address {
            write!(f, "\nContract: {address}")?;
        }
        Ok(())
    }
}

// Ledger integers are carried as decimal strings.
mod decimal {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&n.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal integer: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_value_json() {
        let value = ListValue::Number(BigUint::from(1u8) << 70);
        let json = serde_json::to_value(&value).expect("should serialize");
        assert_eq!(json, json!({"number": "1180591620717411303424"}));

        let de: ListValue = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(de, value);

        let err = serde_json::from_value::<ListValue>(json!({"number": "-1"}));
        assert!(err.is_err());
    }
}
