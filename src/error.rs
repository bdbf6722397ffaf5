//! # Status List Errors
//!
//! Errors raised while encoding, validating, or mutating a status list.
//!
//! Each error renders as a problem-details object using the processing codes
//! of the status list and VC data model recommendations, so it can be handed
//! straight back to a caller.
//!
//! [Processing Errors](https://www.w3.org/TR/vc-bitstring-status-list/#processing-errors)

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status list processing errors.
#[derive(Error, Debug, Deserialize)]
pub enum Error {
    /// A bit position lies outside the list's capacity.
    #[error("{}", problem(&RANGE, .0))]
    Range(String),

    /// An encoded list is not valid base64url or gzip.
    #[error("{}", problem(&PARSING, .0))]
    Decode(String),

    /// The `credentialStatus` of a credential, or a Manager id, is malformed.
    #[error("{}", problem(&MALFORMED, .0))]
    Validation(#[from] Violation),

    /// Credentials in a batch do not share one status list or purpose.
    #[error("{}", problem(&VERIFICATION, .0))]
    Consistency(String),

    /// The list is shorter than the minimum length required for herd privacy.
    #[error("{}", problem(&LIST_LENGTH, .0))]
    ListLength(String),

    /// The ledger failed to return or accept a status list.
    #[error("{}", problem(&RETRIEVAL, .0))]
    Ledger(String),
}

// The fixed part of each error's problem details.
struct Kind {
    type_: &'static str,
    code: i32,
    title: &'static str,
}

const RANGE: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials#RANGE_ERROR",
    code: -67,
    title: "range error",
};
const PARSING: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials#PARSING_ERROR",
    code: -64,
    title: "parsing error",
};
const MALFORMED: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials#MALFORMED_VALUE_ERROR",
    code: -66,
    title: "malformed value error",
};
const VERIFICATION: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials/status-list#STATUS_VERIFICATION_ERROR",
    code: -129,
    title: "status verification error",
};
const LIST_LENGTH: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials/status-list#STATUS_LIST_LENGTH_ERROR",
    code: -130,
    title: "status list length error",
};
const RETRIEVAL: Kind = Kind {
    type_: "https://www.w3.org/ns/credentials/status-list#STATUS_RETRIEVAL_ERROR",
    code: -128,
    title: "status retrieval error",
};

fn problem(kind: &Kind, detail: &impl Display) -> ProblemDetails {
    ProblemDetails {
        type_: kind.type_.to_string(),
        code: kind.code,
        title: Some(kind.title.to_string()),
        detail: Some(detail.to_string()),
    }
}

/// The rule a credential status or Manager id failed.
///
/// Validation stops at the first violated rule.
#[derive(Error, Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum Violation {
    /// The credential is not a JSON object.
    #[error("credential is not an object")]
    NotAnObject,

    /// `credentialStatus` is missing or is not an object.
    #[error("credentialStatus is missing or not an object")]
    MissingStatus,

    /// `credentialStatus` does not have exactly the keys of its variant.
    #[error("credentialStatus has an unexpected set of keys")]
    KeySet,

    /// `id` is not in the format required by the variant.
    #[error("credentialStatus.id is malformed")]
    Id,

    /// `type` is not the literal required by the variant.
    #[error("credentialStatus.type is not supported")]
    Type,

    /// `statusPurpose` is not `revocation` or `suspension`.
    #[error("credentialStatus.statusPurpose is not a supported purpose")]
    Purpose,

    /// The list index is not a non-negative integer.
    #[error("list index is not a non-negative integer")]
    Index,

    /// The list credential does not use the variant's URI scheme.
    #[error("unauthorized scheme")]
    UnauthorizedScheme,

    /// The Manager address is not a valid contract address.
    #[error("invalid manager address")]
    Address,

    /// The purpose of a credential or Manager differs from the one required.
    #[error("purpose mismatch")]
    PurposeMismatch,
}

impl Serialize for Error {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.problem_details().serialize(serializer)
    }
}

impl Error {
    /// The error as RFC 9457 problem details.
    #[must_use]
    pub fn problem_details(&self) -> ProblemDetails {
        match self {
            Self::Range(detail) => problem(&RANGE, detail),
            Self::Decode(detail) => problem(&PARSING, detail),
            Self::Validation(violation) => problem(&MALFORMED, violation),
            Self::Consistency(detail) => problem(&VERIFICATION, detail),
            Self::ListLength(detail) => problem(&LIST_LENGTH, detail),
            Self::Ledger(detail) => problem(&RETRIEVAL, detail),
        }
    }

    /// Transform error to `ProblemDetails` compatible json format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.problem_details()).unwrap_or_default()
    }
}

/// Error response for status list processing.
///
/// [RFC 9457: Problem Details for HTTP APIs](https://www.rfc-editor.org/rfc/rfc9457)
#[derive(Debug, Deserialize, Serialize)]
pub struct ProblemDetails {
    /// Type of error in URL format.
    #[serde(rename = "type")]
    pub type_: String,

    /// Integer code.
    pub code: i32,

    /// A short, human-readable summary of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Raise a `Error::Ledger` from any displayable external error.
#[doc(hidden)]
#[macro_export]
macro_rules! ledger {
    ($($msg:tt)+) => {
        $crate::Error::Ledger(format!($($msg)+))
    };
}
