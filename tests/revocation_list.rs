//! Tests for Revocation List 2020 Managers

use credibil_status::codec::{self, MIN_LENGTH};
use credibil_status::local::LocalLedger;
use credibil_status::provider::ListValue;
use credibil_status::test_utils::{self, INTRUDER, ISSUER, sample_address, sample_legacy_vc};
use credibil_status::{Error, ListConfig, RevocationList, Violation};
use num_bigint::BigUint;
use serde_json::json;

fn revocation_list() -> RevocationList<LocalLedger> {
    test_utils::init_tracer();
    RevocationList::new(LocalLedger::new())
}

#[tokio::test]
async fn originate_and_resolve() {
    let revocation_list = revocation_list();

    let originated = revocation_list.originate(ISSUER).await.expect("should originate");
    assert_eq!(originated.id, format!("rlist://{}", originated.address));

    let state = revocation_list.ledger().state().expect("should lock");
    let storage = &state.contracts[&originated.address].storage;
    assert_eq!(storage.list, ListValue::Number(BigUint::default()));
    assert_eq!(storage.purpose, None);

    let credential = revocation_list.resolve(&originated.id).await.expect("should resolve");
    let json = serde_json::to_value(&credential).expect("should serialize");
    assert_eq!(json["type"], json!(["VerifiableCredential", "RevocationList2020Credential"]));
    assert_eq!(json["credentialSubject"]["type"], json!("RevocationList2020"));
    assert!(json["credentialSubject"].get("statusPurpose").is_none());

    let bitstring =
        codec::decode(&credential.credential_subject.encoded_list).expect("should decode");
    assert_eq!(bitstring.capacity(), MIN_LENGTH * 8);
    assert_eq!(bitstring.count_ones(), 0);
}

#[tokio::test]
async fn revoke_and_unrevoke() {
    let revocation_list = revocation_list();
    let originated = revocation_list.originate(ISSUER).await.expect("should originate");
    let vc = sample_legacy_vc(&originated.address, 42);

    assert!(!revocation_list.is_revoked(&vc).await.expect("should query"));

    revocation_list.revoke(ISSUER, &vc).await.expect("should revoke");
    assert!(revocation_list.is_revoked(&vc).await.expect("should query"));

    let credential = revocation_list.resolve(&originated.id).await.expect("should resolve");
    let number = codec::encoded_list_to_number(&credential.credential_subject.encoded_list)
        .expect("should decode");
    let state = revocation_list.ledger().state().expect("should lock");
    assert_eq!(state.contracts[&originated.address].storage.list, ListValue::Number(number));

    revocation_list.unrevoke(ISSUER, &vc).await.expect("should unrevoke");
    assert!(!revocation_list.is_revoked(&vc).await.expect("should query"));

    let state = revocation_list.ledger().state().expect("should lock");
    assert_eq!(
        state.contracts[&originated.address].storage.list,
        ListValue::Number(BigUint::default())
    );
}

#[tokio::test]
async fn unauthorized_signer() {
    let revocation_list = revocation_list();
    let originated = revocation_list.originate(ISSUER).await.expect("should originate");
    let vc = sample_legacy_vc(&originated.address, 1);

    let Err(Error::Ledger(_)) = revocation_list.revoke(INTRUDER, &vc).await else {
        panic!("expected a ledger error");
    };
    assert!(!revocation_list.is_revoked(&vc).await.expect("should query"));
}

#[tokio::test]
async fn invalid_status() {
    let revocation_list = revocation_list();
    let address = sample_address(3);

    let mut vc = sample_legacy_vc(&address, 1);
    vc["credentialStatus"]["id"] = json!("ftp://example.com/status/1");
    let Err(Error::Validation(violation)) = revocation_list.is_revoked(&vc).await else {
        panic!("expected a validation error");
    };
    assert_eq!(violation, Violation::Id);

    let mut vc = sample_legacy_vc(&address, 1);
    vc["credentialStatus"]["revocationListCredential"] = json!(format!("slist://{address}"));
    let Err(Error::Validation(violation)) = revocation_list.revoke(ISSUER, &vc).await else {
        panic!("expected a validation error");
    };
    assert_eq!(violation, Violation::UnauthorizedScheme);
}

#[tokio::test]
async fn wrong_variant() {
    test_utils::init_tracer();
    let ledger = LocalLedger::new();
    let status_list = credibil_status::StatusList::new(ledger.clone());
    let revocation_list = RevocationList::new(ledger);

    // a Status List 2021 Manager cannot be read as a Revocation List 2020 one
    let originated = status_list
        .originate(ISSUER, credibil_status::StatusPurpose::Revocation, None)
        .await
        .expect("should originate");
    let vc = sample_legacy_vc(&originated.address, 1);

    let Err(Error::Decode(_)) = revocation_list.is_revoked(&vc).await else {
        panic!("expected a decode error");
    };
}

#[tokio::test]
async fn config_independent_index() {
    test_utils::init_tracer();
    let ledger = LocalLedger::new();
    let narrow = RevocationList::new(ledger.clone());
    let wide = RevocationList::with_config(
        ledger,
        ListConfig {
            min_length: MIN_LENGTH * 2,
            ..ListConfig::default()
        },
    );

    let originated = narrow.originate(ISSUER).await.expect("should originate");
    let vc = sample_legacy_vc(&originated.address, 42);
    let other = sample_legacy_vc(&originated.address, 43);

    narrow.revoke(ISSUER, &vc).await.expect("should revoke");
    assert!(wide.is_revoked(&vc).await.expect("should query"));
    assert!(!wide.is_revoked(&other).await.expect("should query"));

    wide.revoke(ISSUER, &other).await.expect("should revoke");
    assert!(narrow.is_revoked(&other).await.expect("should query"));

    wide.unrevoke(ISSUER, &vc).await.expect("should unrevoke");
    assert!(!narrow.is_revoked(&vc).await.expect("should query"));
    assert!(narrow.is_revoked(&other).await.expect("should query"));

    // only the published list is widened
    let credential = wide.resolve(&originated.id).await.expect("should resolve");
    let bitstring =
        codec::decode(&credential.credential_subject.encoded_list).expect("should decode");
    assert_eq!(bitstring.capacity(), MIN_LENGTH * 16);
}

#[tokio::test]
async fn out_of_range() {
    let revocation_list = revocation_list();
    let originated = revocation_list.originate(ISSUER).await.expect("should originate");
    let before = revocation_list.ledger().state().expect("should lock");
    let vc = sample_legacy_vc(&originated.address, MIN_LENGTH * 8);

    let Err(Error::Range(_)) = revocation_list.revoke(ISSUER, &vc).await else {
        panic!("expected a range error");
    };
    let Err(Error::Range(_)) = revocation_list.is_revoked(&vc).await else {
        panic!("expected a range error");
    };

    assert_eq!(revocation_list.ledger().pending().expect("should lock"), 0);
    assert_eq!(revocation_list.ledger().state().expect("should lock"), before);
}
