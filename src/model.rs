//! # Status Model
//!
//! Types for the `credentialStatus` entry carried by a Verifiable Credential
//! and for the status list credential a Manager resolves to. Two variants are
//! supported:
//!
//! - [Status List 2021], where each Manager has a fixed purpose.
//! - [Revocation List 2020], the legacy variant with revocation only.
//!
//! [Status List 2021]: https://w3c-ccg.github.io/vc-status-list-2021
//! [Revocation List 2020]: https://w3c-ccg.github.io/vc-status-rl-2020

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Violation;

/// Base context of every Verifiable Credential.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Prefix of the issuer DID derived from a Manager's owner.
pub const ISSUER_PREFIX: &str = "did:pkh:tz:";

/// The purpose of a status list.
///
/// Revocation is permanent: bits are only ever set. Suspension can be undone.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    /// Used to cancel the validity of a credential.
    #[default]
    Revocation,

    /// Used to temporarily prevent the acceptance of a credential.
    Suspension,
}

impl Display for StatusPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revocation => write!(f, "revocation"),
            Self::Suspension => write!(f, "suspension"),
        }
    }
}

impl FromStr for StatusPurpose {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revocation" => Ok(Self::Revocation),
            "suspension" => Ok(Self::Suspension),
            _ => Err(Violation::Purpose),
        }
    }
}

/// Status list variant, fixing the literals used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// `StatusList2021` lists, addressed as `slist://{address}`.
    StatusList2021,

    /// Legacy `RevocationList2020` lists, addressed as `rlist://{address}`.
    RevocationList2020,
}

impl Variant {
    /// URI scheme of Manager ids.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::StatusList2021 => "slist",
            Self::RevocationList2020 => "rlist",
        }
    }

    /// Prefix of `statusListCredential` / `revocationListCredential` values.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::StatusList2021 => "slist://",
            Self::RevocationList2020 => "rlist://",
        }
    }

    /// `type` of a credential's status entry.
    #[must_use]
    pub const fn entry_type(self) -> &'static str {
        match self {
            Self::StatusList2021 => "StatusList2021Entry",
            Self::RevocationList2020 => "RevocationList2020Status",
        }
    }

    /// Keys a status entry must have, no more and no fewer.
    #[must_use]
    pub const fn entry_keys(self) -> &'static [&'static str] {
        match self {
            Self::StatusList2021 => {
                &["id", "type", "statusPurpose", "statusListIndex", "statusListCredential"]
            }
            Self::RevocationList2020 => {
                &["id", "type", "revocationListIndex", "revocationListCredential"]
            }
        }
    }

    /// `@context` of the resolved list credential.
    #[must_use]
    pub const fn context(self) -> [&'static str; 2] {
        match self {
            Self::StatusList2021 => {
                [CREDENTIALS_CONTEXT, "https://w3id.org/vc/status-list/2021/v1"]
            }
            Self::RevocationList2020 => {
                [CREDENTIALS_CONTEXT, "https://w3id.org/vc-revocation-list-2020/v1"]
            }
        }
    }

    /// `type` of the resolved list credential.
    #[must_use]
    pub const fn credential_type(self) -> [&'static str; 2] {
        match self {
            Self::StatusList2021 => ["VerifiableCredential", "StatusList2021Credential"],
            Self::RevocationList2020 => ["VerifiableCredential", "RevocationList2020Credential"],
        }
    }

    /// `type` of the resolved list credential's subject.
    #[must_use]
    pub const fn subject_type(self) -> &'static str {
        match self {
            Self::StatusList2021 => "StatusList2021",
            Self::RevocationList2020 => "RevocationList2020",
        }
    }
}

/// A `credentialStatus` entry, discriminated by variant.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CredentialStatus {
    /// Status List 2021 entry.
    StatusList2021(StatusList2021Entry),

    /// Revocation List 2020 entry.
    RevocationList2020(RevocationList2020Status),
}

impl CredentialStatus {
    /// The variant of the entry.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        match self {
            Self::StatusList2021(_) => Variant::StatusList2021,
            Self::RevocationList2020(_) => Variant::RevocationList2020,
        }
    }
}

/// Status List 2021 `credentialStatus` entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusList2021Entry {
    /// `{statusListCredential}#{statusListIndex}`.
    pub id: String,

    /// Always `StatusList2021Entry`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The purpose of the list the entry points into.
    pub status_purpose: StatusPurpose,

    /// Bit index, as a decimal string.
    pub status_list_index: String,

    /// `slist://{address}` of the Manager.
    pub status_list_credential: String,
}

impl StatusList2021Entry {
    /// A well-formed entry for bit `index` of the Manager at `address`.
    #[must_use]
    pub fn new(address: &str, index: usize, purpose: StatusPurpose) -> Self {
        let credential = format!("{}{address}", Variant::StatusList2021.prefix());
        Self {
            id: format!("{credential}#{index}"),
            type_: Variant::StatusList2021.entry_type().to_string(),
            status_purpose: purpose,
            status_list_index: index.to_string(),
            status_list_credential: credential,
        }
    }
}

/// Revocation List 2020 `credentialStatus` entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RevocationList2020Status {
    /// Any absolute `http(s)` URL.
    pub id: String,

    /// Always `RevocationList2020Status`.
    #[serde(rename = "type")]
    pub type_: String,

    /// Bit index, as a decimal string.
    pub revocation_list_index: String,

    /// `rlist://{address}` of the Manager.
    pub revocation_list_credential: String,
}

impl RevocationList2020Status {
    /// A well-formed entry for bit `index` of the Manager at `address`.
    #[must_use]
    pub fn new(id: impl Into<String>, address: &str, index: usize) -> Self {
        Self {
            id: id.into(),
            type_: Variant::RevocationList2020.entry_type().to_string(),
            revocation_list_index: index.to_string(),
            revocation_list_credential: format!(
                "{}{address}",
                Variant::RevocationList2020.prefix()
            ),
        }
    }
}

/// The credential a Manager resolves to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListCredential {
    /// Fixed per variant.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The Manager id, e.g. `slist://KT1...`.
    pub id: String,

    /// Fixed per variant.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// `did:pkh:tz:{owner}`.
    pub issuer: String,

    /// The list itself.
    pub credential_subject: StatusListSubject,
}

/// Subject of a [`StatusListCredential`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListSubject {
    /// `{id}#list`.
    pub id: String,

    /// `StatusList2021` or `RevocationList2020`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The Manager's purpose. Absent for the legacy variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<StatusPurpose>,

    /// `base64url(gzip(list))`.
    pub encoded_list: String,
}

impl StatusListCredential {
    /// Assemble the list credential for a Manager.
    #[must_use]
    pub fn new(
        variant: Variant, id: &str, owner: &str, purpose: Option<StatusPurpose>,
        encoded_list: String,
    ) -> Self {
        Self {
            context: variant.context().iter().map(ToString::to_string).collect(),
            id: id.to_string(),
            type_: variant.credential_type().iter().map(ToString::to_string).collect(),
            issuer: format!("{ISSUER_PREFIX}{owner}"),
            credential_subject: StatusListSubject {
                id: format!("{id}#list"),
                type_: variant.subject_type().to_string(),
                status_purpose: purpose,
                encoded_list,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn purpose_strings() {
        assert_eq!(StatusPurpose::Suspension.to_string(), "suspension");
        assert_eq!("revocation".parse::<StatusPurpose>(), Ok(StatusPurpose::Revocation));
        assert_eq!("message".parse::<StatusPurpose>(), Err(Violation::Purpose));
        assert_eq!(serde_json::to_value(StatusPurpose::Suspension).unwrap(), json!("suspension"));
    }

    #[test]
    fn entry_shape() {
        let entry = StatusList2021Entry::new("KT1Example", 42, StatusPurpose::Revocation);
        assert_eq!(
            serde_json::to_value(&entry).expect("should serialize"),
            json!({
                "id": "slist://KT1Example#42",
                "type": "StatusList2021Entry",
                "statusPurpose": "revocation",
                "statusListIndex": "42",
                "statusListCredential": "slist://KT1Example"
            })
        );
    }

    #[test]
    fn untagged_status() {
        let entry = RevocationList2020Status::new("https://example.com/credentials/1", "KT1X", 7);
        let json = serde_json::to_value(&entry).expect("should serialize");
        let status: CredentialStatus = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(status.variant(), Variant::RevocationList2020);
    }

    #[test]
    fn legacy_credential_has_no_purpose() {
        let vc = StatusListCredential::new(
            Variant::RevocationList2020,
            "rlist://KT1X",
            "tz1Owner",
            None,
            "H4sI".into(),
        );
        let json = serde_json::to_value(&vc).expect("should serialize");
        assert_eq!(
            json,
            json!({
                "@context": [
                    "https://www.w3.org/2018/credentials/v1",
                    "https://w3id.org/vc-revocation-list-2020/v1"
                ],
                "id": "rlist://KT1X",
                "type": ["VerifiableCredential", "RevocationList2020Credential"],
                "issuer": "did:pkh:tz:tz1Owner",
                "credentialSubject": {
                    "id": "rlist://KT1X#list",
                    "type": "RevocationList2020",
                    "encodedList": "H4sI"
                }
            })
        );
    }
}
