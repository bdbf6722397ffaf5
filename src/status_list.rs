//! # Status List 2021
//!
//! Revocation and suspension of credentials whose `credentialStatus` is a
//! `StatusList2021Entry` pointing at a Manager (`slist://{address}`).
//!
//! A Manager's purpose is fixed when it is originated. Under `revocation`
//! bits are only ever set. Under `suspension` they may be set and cleared.
//!
//! Every mutation is a single read-modify-write: read the Manager's list,
//! flip the bits of each credential in the batch, and submit the new list.
//! Nothing is cached between operations and a failed submission is not
//! retried.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::bitstring::Bitstring;
use crate::codec::MIN_LENGTH;
use crate::config::{ListConfig, STATUS_LIST_METADATA};
use crate::error::{Error, Violation};
use crate::ledger;
use crate::model::{StatusListCredential, StatusPurpose, Variant, ISSUER_PREFIX};
use crate::provider::{Confirmation, Ledger, ListValue, Manager, PendingOperation, Storage};
use crate::validate::{self, ValidatedStatus};

/// A change to the status of a batch of credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Set the credentials' bits in a `revocation` list.
    Revoke,

    /// Set the credentials' bits in a `suspension` list.
    Suspend,

    /// Clear the credentials' bits in a `suspension` list.
    Unsuspend,
}

impl Action {
    /// The purpose a Manager must have for this action.
    #[must_use]
    pub const fn purpose(self) -> StatusPurpose {
        match self {
            Self::Revoke => StatusPurpose::Revocation,
            Self::Suspend | Self::Unsuspend => StatusPurpose::Suspension,
        }
    }

    const fn sets(self) -> bool {
        matches!(self, Self::Revoke | Self::Suspend)
    }
}

/// A newly originated Manager.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Originated {
    /// Manager id, e.g. `slist://KT1...`.
    pub id: String,

    /// Contract address.
    pub address: String,

    /// Issuer DID of the Manager's owner.
    pub issuer: String,

    /// Confirmed deployment.
    pub confirmation: Confirmation,
}

/// Status List 2021 operations against a ledger.
#[derive(Clone, Debug)]
pub struct StatusList<L: Ledger> {
    ledger: L,
    config: ListConfig,
}

impl<L: Ledger> StatusList<L> {
    /// Operate on `ledger` with the default configuration.
    pub fn new(ledger: L) -> Self {
        Self::with_config(ledger, ListConfig::default())
    }

    /// Operate on `ledger` with the given configuration.
    pub const fn with_config(ledger: L, config: ListConfig) -> Self {
        Self { ledger, config }
    }

    /// The underlying ledger.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Deploy a new Manager with an all-zero list of `size` bytes.
    ///
    /// `size` defaults to, and may not be less than, the configured minimum
    /// length (at least 16,384 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListLength`] if `size` is too small, or
    /// [`Error::Ledger`] if the deployment fails or is not confirmed.
    #[instrument(level = "debug", skip(self))]
    pub async fn originate(
        &self, signer: &str, purpose: StatusPurpose, size: Option<usize>,
    ) -> Result<Originated, Error> {
        tracing::debug!("status_list::originate");

        let min_length = self.config.min_length.max(MIN_LENGTH);
        let size = size.unwrap_or(min_length);
        if size < min_length {
            return Err(Error::ListLength(format!("list must be at least {min_length} bytes long")));
        }

        let storage = Storage {
            owner: signer.to_string(),
            purpose: Some(purpose),
            list: ListValue::Encoded(Bitstring::zeroed(size).encode()?),
            metadata: self.config.metadata_or(STATUS_LIST_METADATA).to_string(),
        };
        let operation =
            self.ledger.deploy(signer, storage).await.map_err(|e| ledger!("issue deploying: {e}"))?;
        let confirmation = confirm(&operation, self.config.confirmations).await?;

        let Some(address) = confirmation.contract_address.clone() else {
            return Err(ledger!("contract not deployed"));
        };

        Ok(Originated {
            id: format!("{}{address}", Variant::StatusList2021.prefix()),
            address,
            issuer: format!("{ISSUER_PREFIX}{signer}"),
            confirmation,
        })
    }

    /// Build the `StatusList2021Credential` for the Manager `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `id` is not an `slist://` Manager id,
    /// or [`Error::Ledger`] if the Manager's views cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<StatusListCredential, Error> {
        tracing::debug!("status_list::resolve");

        let address = validate::manager_id(id, Variant::StatusList2021)?;
        let manager = self.manager(address).await?;

        let owner = manager.owner().await.map_err(|e| ledger!("issue reading owner: {e}"))?;
        let purpose = manager.purpose().await.map_err(|e| ledger!("issue reading purpose: {e}"))?;
        let list = encoded_list(&manager).await?;

        Ok(StatusListCredential::new(Variant::StatusList2021, id, &owner, Some(purpose), list))
    }

    /// Revoke each credential in `vcs`.
    ///
    /// # Errors
    ///
    /// See [`StatusList::mutate`].
    pub async fn revoke(&self, signer: &str, vcs: &[Value]) -> Result<Confirmation, Error> {
        self.mutate(signer, vcs, Action::Revoke).await
    }

    /// Suspend each credential in `vcs`.
    ///
    /// # Errors
    ///
    /// See [`StatusList::mutate`].
    pub async fn suspend(&self, signer: &str, vcs: &[Value]) -> Result<Confirmation, Error> {
        self.mutate(signer, vcs, Action::Suspend).await
    }

    /// Lift the suspension of each credential in `vcs`.
    ///
    /// # Errors
    ///
    /// See [`StatusList::mutate`].
    pub async fn unsuspend(&self, signer: &str, vcs: &[Value]) -> Result<Confirmation, Error> {
        self.mutate(signer, vcs, Action::Unsuspend).await
    }

    /// Apply `action` to every credential in `vcs` with one update of their
    /// shared Manager, returning once the update is confirmed.
    ///
    /// All credentials must point at the same Manager with the same purpose.
    /// Repeated indices are harmless.
    ///
    /// # Errors
    ///
    /// Nothing is submitted if any of these fail:
    ///
    /// - [`Error::Consistency`] if `vcs` is empty or its credentials do not
    ///   share one Manager and purpose.
    /// - [`Error::Validation`] if a credential's status entry is malformed, or
    ///   the credentials' or Manager's purpose does not suit `action`.
    /// - [`Error::Decode`] if the Manager's list cannot be decoded.
    /// - [`Error::Range`] if an index lies outside the list.
    ///
    /// [`Error::Ledger`] is returned if the Manager cannot be read, or the
    /// submission is rejected or not confirmed.
    #[instrument(level = "debug", skip(self, vcs), fields(count = vcs.len()))]
    pub async fn mutate(
        &self, signer: &str, vcs: &[Value], action: Action,
    ) -> Result<Confirmation, Error> {
        tracing::debug!("status_list::mutate");

        let statuses =
            vcs.iter().map(validate::status_list_entry).collect::<Result<Vec<_>, _>>()?;
        let (address, purpose) = shared(&statuses)?;
        if purpose != Some(action.purpose()) {
            return Err(Violation::PurposeMismatch.into());
        }

        let manager = self.manager(address).await?;
        check_purpose(&manager, action.purpose()).await?;

        let mut bitstring = Bitstring::decode(&encoded_list(&manager).await?)?;
        for status in &statuses {
            if action.sets() {
                bitstring.set(status.index)?;
            } else {
                bitstring.clear(status.index)?;
            }
        }

        let operation = manager
            .submit(signer, ListValue::Encoded(bitstring.encode()?))
            .await
            .map_err(|e| ledger!("issue submitting list: {e}"))?;
        tracing::debug!("submitted {}", operation.hash());

        confirm(&operation, self.config.confirmations).await
    }

    /// Returns `true` if the credential is revoked.
    ///
    /// # Errors
    ///
    /// See [`StatusList::status`].
    pub async fn is_revoked(&self, vc: &Value) -> Result<bool, Error> {
        self.status(vc, StatusPurpose::Revocation).await
    }

    /// Returns `true` if the credential is suspended.
    ///
    /// # Errors
    ///
    /// See [`StatusList::status`].
    pub async fn is_suspended(&self, vc: &Value) -> Result<bool, Error> {
        self.status(vc, StatusPurpose::Suspension).await
    }

    /// Returns the credential's bit in its Manager's list. The credential and
    /// the Manager must both have `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the credential's status entry is
    /// malformed or a purpose differs, [`Error::Ledger`] if the Manager cannot
    /// be read, [`Error::Decode`] if its list cannot be decoded, and
    /// [`Error::Range`] if the index lies outside the list.
    #[instrument(level = "debug", skip(self, vc))]
    pub async fn status(&self, vc: &Value, purpose: StatusPurpose) -> Result<bool, Error> {
        tracing::debug!("status_list::status");

        let status = validate::status_list_entry(vc)?;
        if status.purpose != Some(purpose) {
            return Err(Violation::PurposeMismatch.into());
        }

        let manager = self.manager(&status.address).await?;
        check_purpose(&manager, purpose).await?;

        let bitstring = Bitstring::decode(&encoded_list(&manager).await?)?;
        bitstring.test(status.index)
    }

    async fn manager(&self, address: &str) -> Result<L::Manager, Error> {
        self.ledger.manager(address).await.map_err(|e| ledger!("issue fetching manager: {e}"))
    }
}

// The Manager and purpose shared by every status in a batch.
fn shared(statuses: &[ValidatedStatus]) -> Result<(&str, Option<StatusPurpose>), Error> {
    let Some(first) = statuses.first() else {
        return Err(Error::Consistency("at least one credential is required".into()));
    };
    if statuses.iter().any(|s| s.address != first.address) {
        return Err(Error::Consistency("status lists must be the same".into()));
    }
    if statuses.iter().any(|s| s.purpose != first.purpose) {
        return Err(Error::Consistency("status purposes must be the same".into()));
    }
    Ok((&first.address, first.purpose))
}

async fn check_purpose(manager: &impl Manager, expected: StatusPurpose) -> Result<(), Error> {
    let purpose = manager.purpose().await.map_err(|e| ledger!("issue reading purpose: {e}"))?;
    if purpose != expected {
        tracing::debug!("manager purpose is {purpose}, expected {expected}");
        return Err(Violation::PurposeMismatch.into());
    }
    Ok(())
}

async fn encoded_list(manager: &impl Manager) -> Result<String, Error> {
    match manager.list().await.map_err(|e| ledger!("issue reading list: {e}"))? {
        ListValue::Encoded(list) => Ok(list),
        ListValue::Number(_) => Err(Error::Decode("manager holds a numeric list".into())),
    }
}

pub(crate) async fn confirm(
    operation: &impl PendingOperation, depth: u32,
) -> Result<Confirmation, Error> {
    let confirmation = operation
        .confirmation(depth)
        .await
        .map_err(|e| ledger!("operation {} failed: {e}", operation.hash()))?;
    tracing::debug!("confirmed {} at level {}", confirmation.hash, confirmation.level);
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_address;

    fn status(address: &str, purpose: StatusPurpose) -> ValidatedStatus {
        ValidatedStatus {
            address: address.into(),
            index: 1,
            purpose: Some(purpose),
        }
    }

    #[test]
    fn actions() {
        assert_eq!(Action::Revoke.purpose(), StatusPurpose::Revocation);
        assert_eq!(Action::Unsuspend.purpose(), StatusPurpose::Suspension);
        assert!(Action::Suspend.sets());
        assert!(!Action::Unsuspend.sets());
    }

    #[test]
    fn shared_batch() {
        let a = sample_address(1);
        let b = sample_address(2);

        let batch = [status(&a, StatusPurpose::Revocation), status(&a, StatusPurpose::Revocation)];
        let expected = (a.as_str(), Some(StatusPurpose::Revocation));
        assert_eq!(shared(&batch).expect("should share"), expected);

        let batch = [status(&a, StatusPurpose::Revocation), status(&b, StatusPurpose::Revocation)];
        assert!(matches!(shared(&batch), Err(Error::Consistency(_))));

        let batch = [status(&a, StatusPurpose::Revocation), status(&a, StatusPurpose::Suspension)];
        assert!(matches!(shared(&batch), Err(Error::Consistency(_))));

        assert!(matches!(shared(&[]), Err(Error::Consistency(_))));
    }
}
