//! # Revocation List 2020
//!
//! The legacy variant. Credentials carry a `RevocationList2020Status` entry
//! pointing at a Manager (`rlist://{address}`) that stores its list as an
//! unsigned integer rather than an encoded string. Bits may be set and
//! cleared, and there is no purpose.
//!
//! Credential indices address the integer as a big-endian list of 16,384
//! bytes, whatever the configured minimum length. The configured length only
//! widens the list published by `resolve`.

use num_bigint::BigUint;
use serde_json::Value;
use tracing::instrument;

use crate::codec::{self, MIN_LENGTH};
use crate::config::{ListConfig, REVOCATION_LIST_METADATA};
use crate::error::Error;
use crate::ledger;
use crate::model::{StatusListCredential, Variant, ISSUER_PREFIX};
use crate::provider::{Confirmation, Ledger, ListValue, Manager, PendingOperation, Storage};
use crate::status_list::{confirm, Originated};
use crate::validate;

/// Revocation List 2020 operations against a ledger.
#[derive(Clone, Debug)]
pub struct RevocationList<L: Ledger> {
    ledger: L,
    config: ListConfig,
}

impl<L: Ledger> RevocationList<L> {
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

    /// Deploy a new Manager with an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ledger`] if the deployment fails or is not confirmed.
    #[instrument(level = "debug", skip(self))]
    pub async fn originate(&self, signer: &str) -> Result<Originated, Error> {
        tracing::debug!("revocation_list::originate");

        let storage = Storage {
            owner: signer.to_string(),
            purpose: None,
            list: ListValue::Number(BigUint::default()),
            metadata: self.config.metadata_or(REVOCATION_LIST_METADATA).to_string(),
        };
        let operation =
            self.ledger.deploy(signer, storage).await.map_err(|e| ledger!("issue deploying: {e}"))?;
        let confirmation = confirm(&operation, self.config.confirmations).await?;

        let Some(address) = confirmation.contract_address.clone() else {
            return Err(ledger!("contract not deployed"));
        };

        Ok(Originated {
            id: format!("{}{address}", Variant::RevocationList2020.prefix()),
            address,
            issuer: format!("{ISSUER_PREFIX}{signer}"),
            confirmation,
        })
    }

    /// Build the `RevocationList2020Credential` for the Manager `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `id` is not an `rlist://` Manager id,
    /// or [`Error::Ledger`] if the Manager's views cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<StatusListCredential, Error> {
        tracing::debug!("revocation_list::resolve");

        let address = validate::manager_id(id, Variant::RevocationList2020)?;
        let manager = self.manager(address).await?;

        let owner = manager.owner().await.map_err(|e| ledger!("issue reading owner: {e}"))?;
        let number = number(&manager).await?;
        let encoded = codec::number_to_encoded_list(&number, self.length())?;

        Ok(StatusListCredential::new(Variant::RevocationList2020, id, &owner, None, encoded))
    }

    /// Revoke the credential.
    ///
    /// # Errors
    ///
    /// See [`RevocationList::update`].
    pub async fn revoke(&self, signer: &str, vc: &Value) -> Result<Confirmation, Error> {
        self.update(signer, vc, true).await
    }

    /// Reinstate a revoked credential.
    ///
    /// # Errors
    ///
    /// See [`RevocationList::update`].
    pub async fn unrevoke(&self, signer: &str, vc: &Value) -> Result<Confirmation, Error> {
        self.update(signer, vc, false).await
    }

    /// Set (`revoked`) or clear the credential's bit, returning once the
    /// update is confirmed.
    ///
    /// # Errors
    ///
    /// Nothing is submitted if the credential's status entry is malformed
    /// ([`Error::Validation`]) or its index lies outside the list
    /// ([`Error::Range`]). [`Error::Ledger`] is returned if the Manager
    /// cannot be read, or the submission is rejected or not confirmed.
    #[instrument(level = "debug", skip(self, vc))]
    pub async fn update(
        &self, signer: &str, vc: &Value, revoked: bool,
    ) -> Result<Confirmation, Error> {
        tracing::debug!("revocation_list::update");

        let status = validate::revocation_list_status(vc)?;
        let manager = self.manager(&status.address).await?;

        let mut bitstring = codec::number_to_bitstring(&number(&manager).await?, MIN_LENGTH)?;
        if revoked {
            bitstring.set(status.index)?;
        } else {
            bitstring.clear(status.index)?;
        }

        let operation = manager
            .submit(signer, ListValue::Number(codec::bitstring_to_number(&bitstring)))
            .await
            .map_err(|e| ledger!("issue submitting list: {e}"))?;
        tracing::debug!("submitted {}", operation.hash());

        confirm(&operation, self.config.confirmations).await
    }

    /// Returns `true` if the credential is revoked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the credential's status entry is
    /// malformed, [`Error::Ledger`] if the Manager cannot be read, and
    /// [`Error::Range`] if the index lies outside the list.
    #[instrument(level = "debug", skip(self, vc))]
    pub async fn is_revoked(&self, vc: &Value) -> Result<bool, Error> {
        tracing::debug!("revocation_list::is_revoked");

        let status = validate::revocation_list_status(vc)?;
        let manager = self.manager(&status.address).await?;

        let bitstring = codec::number_to_bitstring(&number(&manager).await?, MIN_LENGTH)?;
        bitstring.test(status.index)
    }

    async fn manager(&self, address: &str) -> Result<L::Manager, Error> {
        self.ledger.manager(address).await.map_err(|e| ledger!("issue fetching manager: {e}"))
    }

    fn length(&self) -> usize {
        self.config.min_length.max(MIN_LENGTH)
    }
}

async fn number(manager: &impl Manager) -> Result<BigUint, Error> {
    match manager.list().await.map_err(|e| ledger!("issue reading list: {e}"))? {
        ListValue::Number(n) => Ok(n),
        ListValue::Encoded(_) => Err(Error::Decode("manager holds an encoded list".into())),
    }
}
