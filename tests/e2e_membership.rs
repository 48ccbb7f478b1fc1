//! End-to-end coverage of the happy path and the everyday edge cases named
//! in the protocol: voter rolls and trusted-root revocation.

mod common;

use common::Fixture;
use credential_membership::api::types::VerifyProofRequest;

#[test]
fn member_proves_and_verifies_without_revealing_identity() {
    let fx = Fixture::new(1);
    let (set_id, _root) = fx.trusted_set("voters", &["alice", "bob", "carol", "dave"]);

    let proof = fx.prove(set_id, "carol", 101);
    let outcome = fx
        .system
        .verify_proof(VerifyProofRequest { proof })
        .unwrap();

    assert!(outcome.valid);
    assert_eq!(outcome.credential_set_id, Some(set_id));
}

#[test]
fn every_member_of_a_larger_set_can_prove_membership() {
    let fx = Fixture::new(2);
    let credentials: Vec<String> = (0..37).map(|i| format!("member-{i}")).collect();
    let refs: Vec<&str> = credentials.iter().map(String::as_str).collect();
    let (set_id, _root) = fx.trusted_set("large-set", &refs);

    for (i, credential) in credentials.iter().enumerate() {
        let proof = fx.prove(set_id, credential, 200 + i as u64);
        let outcome = fx
            .system
            .verify_proof(VerifyProofRequest { proof })
            .unwrap();
        assert!(outcome.valid, "credential {credential} failed to verify");
    }
}

#[test]
fn single_credential_set_proves_and_verifies() {
    let fx = Fixture::new(3);
    let (set_id, _root) = fx.trusted_set("solo", &["only-member"]);
    let proof = fx.prove(set_id, "only-member", 300);
    let outcome = fx
        .system
        .verify_proof(VerifyProofRequest { proof })
        .unwrap();
    assert!(outcome.valid);
}

#[test]
fn revoking_a_trusted_root_invalidates_every_proof_issued_against_it() {
    let fx = Fixture::new(4);
    let (set_id, root) = fx.trusted_set("revocable", &["alice", "bob"]);
    let proof = fx.prove(set_id, "alice", 400);

    let outcome = fx
        .system
        .verify_proof(VerifyProofRequest {
            proof: proof.clone(),
        })
        .unwrap();
    assert!(outcome.valid);

    fx.system.revoke_trusted_root(set_id, &root).unwrap();
    let outcome = fx
        .system
        .verify_proof(VerifyProofRequest { proof })
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.errors, vec!["UNTRUSTED_ROOT"]);
}
