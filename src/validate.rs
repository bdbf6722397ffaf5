//! # Credential Status Validation
//!
//! Turns an arbitrary JSON value purporting to be a Verifiable Credential into
//! the `(address, index, purpose)` triple its `credentialStatus` points at.
//!
//! Rules are checked in order and validation stops at the first failure:
//!
//! 1. `credentialStatus` is an object with exactly the variant's keys.
//! 2. `id` is well-formed for the variant.
//! 3. `type` is the variant's entry type.
//! 4. `statusPurpose` is a known purpose (Status List 2021 only).
//! 5. The list index is a non-negative integer.
//! 6. The list credential uses the variant's scheme and a valid address.

pub mod address;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Violation};
use crate::model::{StatusPurpose, Variant};

static INDEX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^(?<sign>[-+]?)(?<digits>[0-9]+|Infinity)$").expect("should compile")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b",
        r"([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    ))
    .expect("should compile")
});

/// The status list position a credential's status entry points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedStatus {
    /// Ledger address of the Manager.
    pub address: String,

    /// Bit index in the Manager's list.
    pub index: usize,

    /// Purpose of the entry. `None` for the legacy variant.
    pub purpose: Option<StatusPurpose>,
}

/// Validate a credential's status entry, selecting the variant from the
/// entry's `type`, or failing that, its keys.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first rule the entry breaks.
pub fn credential_status(vc: &Value) -> Result<ValidatedStatus, Error> {
    let status = status_object(vc)?;

    let variant = match status.get("type").and_then(Value::as_str) {
        Some(t) if t == Variant::StatusList2021.entry_type() => Variant::StatusList2021,
        Some(t) if t == Variant::RevocationList2020.entry_type() => Variant::RevocationList2020,
        _ if status.contains_key("statusListIndex") => Variant::StatusList2021,
        _ if status.contains_key("revocationListIndex") => Variant::RevocationList2020,
        _ => return Err(Violation::Type.into()),
    };

    validate(vc, variant)
}

/// Validate a credential's status entry as the given variant.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first rule the entry breaks.
pub fn validate(vc: &Value, variant: Variant) -> Result<ValidatedStatus, Error> {
    match variant {
        Variant::StatusList2021 => status_list_entry(vc),
        Variant::RevocationList2020 => revocation_list_status(vc),
    }
}

/// Validate a Status List 2021 entry.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first rule the entry breaks.
pub fn status_list_entry(vc: &Value) -> Result<ValidatedStatus, Error> {
    tracing::debug!("validate::status_list_entry");

    let variant = Variant::StatusList2021;
    let status = status_object(vc)?;
    check_keys(status, variant)?;

    let credential = string(status, "statusListCredential");
    let index = string(status, "statusListIndex");

    let Some(id) = string(status, "id") else {
        return Err(Violation::Id.into());
    };
    let (Some(credential), Some(index)) = (credential, index) else {
        return Err(Violation::Id.into());
    };
    if id != format!("{credential}#{index}") {
        return Err(Violation::Id.into());
    }

    check_type(status, variant)?;

    let purpose: StatusPurpose =
        string(status, "statusPurpose").ok_or(Violation::Purpose)?.parse()?;
    let index = parse_index(index).ok_or(Violation::Index)?;
    let address = parse_address(credential, variant)?;

    Ok(ValidatedStatus {
        address: address.to_string(),
        index,
        purpose: Some(purpose),
    })
}

/// Validate a Revocation List 2020 entry.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first rule the entry breaks.
pub fn revocation_list_status(vc: &Value) -> Result<ValidatedStatus, Error> {
    tracing::debug!("validate::revocation_list_status");

    let variant = Variant::RevocationList2020;
    let status = status_object(vc)?;
    check_keys(status, variant)?;

    match string(status, "id") {
        Some(id) if URL_REGEX.is_match(id) => {}
        _ => return Err(Violation::Id.into()),
    }

    check_type(status, variant)?;

    let index = string(status, "revocationListIndex")
        .and_then(parse_index)
        .ok_or(Violation::Index)?;
    let credential =
        string(status, "revocationListCredential").ok_or(Violation::UnauthorizedScheme)?;
    let address = parse_address(credential, variant)?;

    Ok(ValidatedStatus {
        address: address.to_string(),
        index,
        purpose: None,
    })
}

/// Split a Manager id (`{scheme}://{address}`) and return its address.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the scheme is not the variant's or the
/// address is not a contract address.
pub fn manager_id(id: &str, variant: Variant) -> Result<&str, Error> {
    parse_address(id, variant)
}

/// Parse a list index the way the index of a published entry is read: an
/// optionally signed run of ASCII digits with a non-negative value. `-0` is
/// zero. `Infinity` is not finite and is rejected.
#[must_use]
pub fn parse_index(value: &str) -> Option<usize> {
    let caps = INDEX_REGEX.captures(value)?;
    let digits = &caps["digits"];

    if digits == "Infinity" {
        return None;
    }
    if &caps["sign"] == "-" && digits.bytes().any(|b| b != b'0') {
        return None;
    }
    digits.parse().ok()
}

fn status_object(vc: &Value) -> Result<&Map<String, Value>, Error> {
    let Some(vc) = vc.as_object() else {
        return Err(Violation::NotAnObject.into());
    };
    let Some(status) = vc.get("credentialStatus").and_then(Value::as_object) else {
        return Err(Violation::MissingStatus.into());
    };
    Ok(status)
}

fn check_keys(status: &Map<String, Value>, variant: Variant) -> Result<(), Error> {
    let expected = variant.entry_keys();
    if status.len() != expected.len() || !expected.iter().all(|k| status.contains_key(*k)) {
        return Err(Violation::KeySet.into());
    }
    Ok(())
}

fn check_type(status: &Map<String, Value>, variant: Variant) -> Result<(), Error> {
    if string(status, "type") != Some(variant.entry_type()) {
        return Err(Violation::Type.into());
    }
    Ok(())
}

fn parse_address(credential: &str, variant: Variant) -> Result<&str, Error> {
    let Some(address) = credential.strip_prefix(variant.prefix()) else {
        return Err(Violation::UnauthorizedScheme.into());
    };
    if !address::is_contract_address(address) {
        return Err(Violation::Address.into());
    }
    Ok(address)
}

fn string<'a>(status: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    status.get(key).and_then(Value::as_str)
}
