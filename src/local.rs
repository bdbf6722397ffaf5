//! # Local Ledger
//!
//! An in-process [`Ledger`] holding Manager storage in memory. Operations are
//! queued on submission and applied when their confirmation is awaited, so
//! "submitted" and "confirmed" are observable as separate states.
//!
//! Each [`LocalManager`] accessor remembers the version of the Manager it
//! was obtained at. A submission made through an accessor whose Manager has
//! since changed is rejected at confirmation, the way a ledger rejects an
//! operation built on a stale counter.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use anyhow::anyhow;
use multibase::Base;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::StatusPurpose;
use crate::provider::{
    Confirmation, Ledger, ListValue, Manager, PendingOperation, Result, Storage,
};
use crate::validate::address;

/// Persistent state of a [`LocalLedger`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LedgerState {
    /// Current block level.
    pub level: u64,

    /// Operations injected so far. Used to derive hashes and addresses.
    pub counter: u64,

    /// Deployed Managers by address.
    pub contracts: BTreeMap<String, Contract>,
}

/// A deployed Manager.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Contract {
    /// Current storage.
    pub storage: Storage,

    /// Incremented on every applied update.
    pub version: u64,
}

#[derive(Debug)]
enum Change {
    Deploy {
        address: String,
        storage: Storage,
    },
    Update {
        address: String,
        version: u64,
        list: ListValue,
    },
}

#[derive(Debug, Default)]
struct Chain {
    state: LedgerState,
    pending: HashMap<String, Change>,
}

/// In-memory ledger.
#[derive(Clone, Debug, Default)]
pub struct LocalLedger {
    chain: Arc<Mutex<Chain>>,
}

impl LocalLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger restored from previously saved state.
    #[must_use]
    pub fn from_state(state: LedgerState) -> Self {
        Self {
            chain: Arc::new(Mutex::new(Chain {
                state,
                ..Chain::default()
            })),
        }
    }

    /// A copy of the current state. Pending operations are not included.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn state(&self) -> Result<LedgerState> {
        Ok(self.lock()?.state.clone())
    }

    /// Number of submitted operations not yet confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.lock()?.pending.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Chain>> {
        self.chain.lock().map_err(|e| anyhow!("could not lock ledger: {e}"))
    }

    // Queue a change built from the operation's counter.
    fn inject(&self, change: impl FnOnce(u64) -> Result<Change>) -> Result<LocalOperation> {
        let mut chain = self.lock()?;
        let counter = chain.state.counter + 1;
        let change = change(counter)?;
        chain.state.counter = counter;

        let hash = operation_hash(counter);
        chain.pending.insert(hash.clone(), change);

        tracing::debug!("injected operation {hash}");

        Ok(LocalOperation {
            hash,
            ledger: self.clone(),
            confirmed: Arc::default(),
        })
    }
}

impl Ledger for LocalLedger {
    type Manager = LocalManager;
    type Operation = LocalOperation;

    async fn manager(&self, address: &str) -> Result<LocalManager> {
        let chain = self.lock()?;
        let Some(contract) = chain.state.contracts.get(address) else {
            return Err(anyhow!("contract not found: {address}"));
        };

        Ok(LocalManager {
            address: address.to_string(),
            version: contract.version,
            ledger: self.clone(),
        })
    }

    async fn deploy(&self, signer: &str, storage: Storage) -> Result<LocalOperation> {
        if storage.owner != signer {
            return Err(anyhow!("owner must be the signer of the origination"));
        }

        self.inject(|counter| {
            let hash: [u8; 20] = Sha256::new()
                .chain_update(signer.as_bytes())
                .chain_update(counter.to_be_bytes())
                .finalize()[..20]
                .try_into()?;

            Ok(Change::Deploy {
                address: address::encode_contract(&hash),
                storage,
            })
        })
    }
}

/// Accessor for a Manager on a [`LocalLedger`].
#[derive(Clone, Debug)]
pub struct LocalManager {
    address: String,
    version: u64,
    ledger: LocalLedger,
}

impl LocalManager {
    /// Address of the Manager.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    fn storage(&self) -> Result<Storage> {
        let chain = self.ledger.lock()?;
        let Some(contract) = chain.state.contracts.get(&self.address) else {
            return Err(anyhow!("contract not found: {}", self.address));
        };
        Ok(contract.storage.clone())
    }
}

impl Manager for LocalManager {
    type Operation = LocalOperation;

    async fn owner(&self) -> Result<String> {
        Ok(self.storage()?.owner)
    }

    async fn purpose(&self) -> Result<StatusPurpose> {
        self.storage()?.purpose.ok_or_else(|| anyhow!("view not found: getPurpose"))
    }

    async fn list(&self) -> Result<ListValue> {
        Ok(self.storage()?.list)
    }

    async fn submit(&self, signer: &str, list: ListValue) -> Result<LocalOperation> {
        let storage = self.storage()?;
        if storage.owner != signer {
            return Err(anyhow!("unauthorized: {signer} does not own {}", self.address));
        }
        if storage.list.kind() != list.kind() {
            return Err(anyhow!(
                "manager {} expects a {} list, got {}",
                self.address,
                storage.list.kind(),
                list.kind()
            ));
        }

        self.ledger.inject(|_| {
            Ok(Change::Update {
                address: self.address.clone(),
                version: self.version,
                list,
            })
        })
    }
}

/// An operation submitted to a [`LocalLedger`].
#[derive(Clone, Debug)]
pub struct LocalOperation {
    hash: String,
    ledger: LocalLedger,
    confirmed: Arc<OnceLock<Confirmation>>,
}

impl PendingOperation for LocalOperation {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn confirmation(&self, depth: u32) -> Result<Confirmation> {
        let mut chain = self.ledger.lock()?;
        if let Some(confirmation) = self.confirmed.get() {
            return Ok(confirmation.clone());
        }
        let Some(change) = chain.pending.remove(&self.hash) else {
            return Err(anyhow!("unknown operation: {}", self.hash));
        };

        let level = chain.state.level + 1;
        let contract_address = match change {
            Change::Deploy { address, storage } => {
                chain.state.contracts.insert(address.clone(), Contract { storage, version: 0 });
                Some(address)
            }
            Change::Update {
                address,
                version,
                list,
            } => {
                let Some(contract) = chain.state.contracts.get_mut(&address) else {
                    return Err(anyhow!("contract not found: {address}"));
                };
                if contract.version != version {
                    return Err(anyhow!(
                        "operation {} rejected: manager {address} changed since it was read",
                        self.hash
                    ));
                }
                contract.storage.list = list;
                contract.version += 1;
                None
            }
        };
        chain.state.level += u64::from(depth.max(1));

        let confirmation = Confirmation {
            hash: self.hash.clone(),
            level,
            contract_address,
        };
        tracing::debug!("confirmed operation {} at level {level}", self.hash);

        Ok(self.confirmed.get_or_init(|| confirmation).clone())
    }
}

fn operation_hash(counter: u64) -> String {
    let digest =
        Sha256::new().chain_update(b"operation").chain_update(counter.to_be_bytes()).finalize();
    let encoded = multibase::encode(Base::Base58Btc, digest);
    format!("o{}", &encoded[1..])
}
