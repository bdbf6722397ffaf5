//! # Test Utilities for Credibil Status
//!
//! Sample credentials and addresses that can be used for testing and
//! examples.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Once;

use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::model::{
    RevocationList2020Status, StatusList2021Entry, StatusPurpose, CREDENTIALS_CONTEXT,
};
use crate::validate::address;

/// Account address of the sample issuer.
pub const ISSUER: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

/// An account that does not own any sample Manager.
pub const INTRUDER: &str = "tz1burnburnburnburnburnburnburjAYjjX";

// initalise tracing once for all tests
static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

/// A valid contract address derived from `seed`.
#[must_use]
pub fn sample_address(seed: u8) -> String {
    address::encode_contract(&[seed; 20])
}

/// A credential whose status is bit `index` of the Status List 2021 Manager
/// at `address`.
#[must_use]
pub fn sample_vc(address: &str, index: usize, purpose: StatusPurpose) -> Value {
    let status = StatusList2021Entry::new(address, index, purpose);
    credential(&format!("urn:uuid:sample-{index}"), &json!(status))
}

/// A credential whose status is bit `index` of the Revocation List 2020
/// Manager at `address`.
#[must_use]
pub fn sample_legacy_vc(address: &str, index: usize) -> Value {
    let status = RevocationList2020Status::new(
        format!("https://example.com/credentials/status/{index}"),
        address,
        index,
    );
    credential(&format!("https://example.com/credentials/{index}"), &json!(status))
}

fn credential(id: &str, status: &Value) -> Value {
    json!({
        "@context": [CREDENTIALS_CONTEXT],
        "id": id,
        "type": ["VerifiableCredential", "EmployeeIDCredential"],
        "issuer": format!("did:pkh:tz:{ISSUER}"),
        "issuanceDate": "2024-01-01T00:00:00Z",
        "credentialSubject": {
            "id": "did:example:ebfeb1f712ebc6f1c276e12ec21",
            "employeeId": "1234567890",
            "familyName": "Person",
            "givenName": "Normal"
        },
        "credentialStatus": status
    })
}
