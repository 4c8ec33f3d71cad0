//! Ownership checks that must fail, and how they fail.

#![allow(
    unused_crate_dependencies,
    reason = "test dependencies shared across test suite"
)]

use ccq_crypto::{GuardianSignature, QuorumError};
use ccq_owner_check::{derive, query, run, submit, FlowError};
use ccq_primitives::{Finality, Pubkey};
use ccq_proxy::{ProxyError, QueryProxy, SignedQueryResponse};
use ccq_verifier::{
    FixedClock, OwnerVerifier, PredicateError, TokenAccountOwnership, VerificationState,
    VerifyError,
};
use integration_tests::harness::*;

#[test]
fn test_tampered_bytes_fail_quorum() {
    let network = TestNetwork::new(5);
    let mut verifier = network.verifier();
    let derived = derive(&params()).unwrap();
    let (mut signed, _) = query(&network.proxy(), &params().request(), &derived).unwrap();

    // Last byte of the token account data.
    let last = signed.bytes.len() - 1;
    signed.bytes[last] ^= 0x01;

    let err = submit(&mut verifier, &signed).unwrap_err();
    assert!(
        matches!(
            err,
            FlowError::QuorumFailure(VerifyError::Quorum(QuorumError::InvalidSignature { .. }))
        ),
        "unexpected error: {err:?}"
    );
    assert!(matches!(
        verifier.state(&signed.digest()),
        VerificationState::Rejected(_)
    ));
}

#[test]
fn test_insufficient_quorum_then_full_set() {
    let network = TestNetwork::new(5);
    let mut verifier = network.verifier();

    // 5 guardians need 4 signatures.
    let err = run(&params(), &network.proxy_signed_by(&[0, 2, 4]), &mut verifier).unwrap_err();
    assert!(matches!(
        err,
        FlowError::QuorumFailure(VerifyError::Quorum(QuorumError::InsufficientSignatures {
            provided: 3,
            required: 4
        }))
    ));

    // Same response bytes, now with enough signatures.
    let outcome = run(&params(), &network.proxy(), &mut verifier).unwrap();
    assert_eq!(outcome.result.owner, owner());
}

#[test]
fn test_exact_quorum_is_enough() {
    let network = TestNetwork::new(5);
    let outcome = run(
        &params(),
        &network.proxy_signed_by(&[0, 1, 3, 4]),
        &mut network.verifier(),
    )
    .unwrap();
    assert_eq!(outcome.signed.signatures.len(), 4);
}

#[test]
fn test_signatures_from_another_set() {
    let network = TestNetwork::new(3);
    let impostors = TestNetwork::new(4);

    // The impostor guardians 1..=3 take indices 0..=2 of the real set.
    let signers = (1..4).map(|i| impostors.signer(i)).collect::<Vec<_>>();
    let signed = network.proxy().query(&params().request()).unwrap();
    let forged = signers
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let sig = s.sign_digest(&signed.digest().0);
            GuardianSignature::new(
                *sig.r(),
                *sig.s(),
                sig.recovery_id(),
                u8::try_from(index).unwrap(),
            )
        })
        .collect();

    let mut verifier = network.verifier();
    let forged = SignedQueryResponse::new(signed.bytes.clone(), forged);
    let err = submit(&mut verifier, &forged).unwrap_err();
    assert!(matches!(
        err,
        FlowError::QuorumFailure(VerifyError::Quorum(QuorumError::InvalidSignature {
            index: 0
        }))
    ));
}

#[test]
fn test_token_held_by_someone_else() {
    let mut network = TestNetwork::new(3);
    let thief = Pubkey::new([0x77; 32]);
    network.set_token_account(Finality::Finalized, thief, mint());

    let err = run(&params(), &network.proxy(), &mut network.verifier()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::Predicate(PredicateError::OwnerMismatch { data, .. }))
            if data == thief
    ));
}

#[test]
fn test_token_account_for_another_mint() {
    let mut network = TestNetwork::new(3);
    let other_mint = Pubkey::new([0x55; 32]);
    network.set_token_account(Finality::Finalized, owner(), other_mint);

    let err = run(&params(), &network.proxy(), &mut network.verifier()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::Predicate(PredicateError::WrongMint { got, .. }))
            if got == other_mint
    ));
}

#[test]
fn test_verifier_configured_for_another_mint() {
    let network = TestNetwork::new(3);
    let mut verifier = OwnerVerifier::new(
        network.verifier_config(),
        TokenAccountOwnership::new(Pubkey::new([0x55; 32])),
        FixedClock(BLOCK_TIME_SECS),
    );

    let err = run(&params(), &network.proxy(), &mut verifier).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::Predicate(PredicateError::WrongMintSeed))
    ));
}

#[test]
fn test_stale_block_time() {
    let network = TestNetwork::new(3);
    let config = network.verifier_config();
    let window = config.allowed_staleness_secs;

    // Oldest accepted block time is exactly the snapshot's.
    let mut verifier = network.verifier_with(config.clone(), BLOCK_TIME_SECS + window);
    assert!(run(&params(), &network.proxy(), &mut verifier).is_ok());

    let mut verifier = network.verifier_with(config, BLOCK_TIME_SECS + window + 1);
    let err = run(&params(), &network.proxy(), &mut verifier).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::StaleBlockTime {
            block_time: BLOCK_TIME_SECS,
            ..
        })
    ));
}

#[test]
fn test_confirmed_commitment_rejected() {
    let network = TestNetwork::new(3);
    let mut confirmed = params();
    confirmed.finality = Finality::Confirmed;

    let err = run(&confirmed, &network.proxy(), &mut network.verifier()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Rejected(VerifyError::UnexpectedCommitment(Finality::Confirmed))
    ));
}

#[test]
fn test_owner_without_token_account() {
    let network = TestNetwork::new(3);
    let mut stranger = params();
    stranger.owner = Pubkey::new([0x99; 32]);

    let err = run(&stranger, &network.proxy(), &mut network.verifier()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Proxy(ProxyError::AccountNotFound { .. })
    ));
}
