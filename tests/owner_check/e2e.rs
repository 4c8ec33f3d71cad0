//! End-to-end ownership checks against a local guardian network.

#![allow(
    unused_crate_dependencies,
    reason = "test dependencies shared across test suite"
)]

use alloy_primitives::address;
use ccq_crypto::{verify_quorum, GuardianSigner};
use ccq_owner_check::{run, FlowError};
use ccq_pda::associated_token_address;
use ccq_primitives::{
    constants::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID},
    ChainId,
};
use ccq_proxy::{QueryProxy, MOCK_REQUEST_ID};
use ccq_query_types::{
    decode_exact, response_digest, ChainQuery, ChainQueryResponse, QueryResponse,
};
use ccq_verifier::{
    encode_verify_owner, ReplayPolicy, VerificationResult, VerificationState, VerifyError,
};
use integration_tests::harness::*;

#[test]
fn test_known_associated_token_account() {
    let derived = associated_token_address(&owner(), &TOKEN_PROGRAM_ID, &mint()).unwrap();
    assert_eq!(derived.address, owner_ata());
    assert_eq!(derived.bump, OWNER_ATA_BUMP);
}

#[test]
fn test_owner_verified_end_to_end() {
    let network = TestNetwork::new(5);
    let mut verifier = network.verifier();

    let outcome = run(&params(), &network.proxy(), &mut verifier).unwrap();

    assert_eq!(outcome.derived.address, owner_ata());
    assert_eq!(outcome.derived.bump, OWNER_ATA_BUMP);
    assert_eq!(
        outcome.result,
        VerificationResult {
            slot_number: SLOT,
            block_time_us: BLOCK_TIME_SECS * 1_000_000,
            owner: owner(),
            account: owner_ata(),
        }
    );
    assert_eq!(
        verifier.state(&outcome.signed.digest()),
        VerificationState::Verified(outcome.result.clone())
    );
}

#[test]
fn test_signed_response_shape() {
    let network = TestNetwork::new(4);
    let signed = network.proxy().query(&params().request()).unwrap();

    assert_eq!(signed.signatures.len(), 4);
    let indices: Vec<u8> = signed.signatures.iter().map(|s| s.guardian_index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(signed.digest(), response_digest(&signed.bytes));
    assert!(verify_quorum(&network.guardian_set(), &signed.signatures, &signed.digest()).is_ok());

    let response = decode_exact::<QueryResponse>(&signed.bytes).unwrap();
    assert_eq!(response.request_chain_id, ChainId::OFF_CHAIN);
    assert_eq!(response.request_id, MOCK_REQUEST_ID.to_vec());
    assert_eq!(response.request, params().request());

    let ChainQuery::SolanaPda(query) = &response.request.requests[0].query else {
        panic!("expected a pda query");
    };
    assert_eq!(query.pdas[0].program, ASSOCIATED_TOKEN_PROGRAM_ID);
    assert_eq!(
        query.pdas[0].seeds,
        vec![
            owner().to_bytes().to_vec(),
            TOKEN_PROGRAM_ID.to_bytes().to_vec(),
            mint().to_bytes().to_vec(),
        ]
    );

    let ChainQueryResponse::SolanaPda(body) = &response.responses[0].response else {
        panic!("expected a pda response");
    };
    assert_eq!(body.slot_number, SLOT);
    assert_eq!(body.results[0].account, owner_ata());
    assert_eq!(body.results[0].bump, OWNER_ATA_BUMP);
    assert_eq!(body.results[0].owner, TOKEN_PROGRAM_ID);
}

#[test]
fn test_event_emitted_from_verifier_address() {
    let network = TestNetwork::new(1);
    let mut verifier = network.verifier();
    let signed = network.proxy().query(&params().request()).unwrap();

    let calldata = encode_verify_owner(&signed.bytes, &signed.signatures);
    let receipt = verifier.execute(&calldata).unwrap();

    assert_eq!(receipt.logs.len(), 1);
    assert_eq!(receipt.logs[0].address, network.verifier_address());
    let result = VerificationResult::from_receipt(Some(&receipt)).unwrap();
    assert_eq!(result.owner, owner());
    assert_eq!(result.account, owner_ata());
}

#[test]
fn test_devnet_guardian() {
    let signer = GuardianSigner::from_hex(
        0,
        "cfb12303a19cde580bb4dd771639b0d26bc68353645571a8cff516ab2ee113a0",
    )
    .unwrap();
    assert_eq!(
        signer.address(),
        address!("beFA429d57cD18b7F8A4d91A2da9AB4AF05d0FBe")
    );
}

#[test]
fn test_replay_is_idempotent_by_default() {
    let network = TestNetwork::new(3);
    let proxy = network.proxy();
    let mut verifier = network.verifier();

    let first = run(&params(), &proxy, &mut verifier).unwrap();
    let second = run(&params(), &proxy, &mut verifier).unwrap();

    assert_eq!(first.signed.digest(), second.signed.digest());
    assert_eq!(first.result, second.result);
}

#[test]
fn test_replay_rejected_when_configured() {
    let network = TestNetwork::new(3);
    let proxy = network.proxy();
    let mut config = network.verifier_config();
    config.replay_policy = ReplayPolicy::Reject;
    let mut verifier = network.verifier_with(config, BLOCK_TIME_SECS);

    let first = run(&params(), &proxy, &mut verifier).unwrap();
    let err = run(&params(), &proxy, &mut verifier).unwrap_err();

    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::AlreadyVerified(digest)) if digest == first.signed.digest()
    ));
}

#[test]
fn test_new_nonce_is_a_new_response() {
    let network = TestNetwork::new(3);
    let proxy = network.proxy();
    let mut config = network.verifier_config();
    config.replay_policy = ReplayPolicy::Reject;
    let mut verifier = network.verifier_with(config, BLOCK_TIME_SECS);

    let first = run(&params(), &proxy, &mut verifier).unwrap();
    let mut again = params();
    again.nonce += 1;
    let second = run(&again, &proxy, &mut verifier).unwrap();

    assert_ne!(first.signed.digest(), second.signed.digest());
    assert_eq!(first.result, second.result);
}
