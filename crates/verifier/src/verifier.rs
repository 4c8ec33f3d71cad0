//! The owner verifier: checks a signed query response and records the
//! attested ownership.

use std::collections::{HashMap, VecDeque};

use alloy_primitives::{Address, Log, B256};
use alloy_sol_types::{SolCall, SolEvent};
use ccq_crypto::{verify_quorum, GuardianSet, GuardianSignature};
use ccq_primitives::{ChainId, Finality};
use ccq_query_types::{
    decode_exact, response_digest, ChainQuery, ChainQueryResponse, QueryResponse,
    SolanaPdaQueryRequest, SolanaPdaQueryResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    abi::{evm_struct_to_signatures, verifyOwnerCall},
    Clock, OwnershipPredicate, Receipt, VerificationResult, VerifyError,
};

/// Default window within which an attested block time is accepted.
pub const DEFAULT_ALLOWED_STALENESS_SECS: u64 = 30 * 60;

/// Default number of rejection reasons kept for [`OwnerVerifier::state`].
pub const DEFAULT_REJECTED_CAPACITY: usize = 4096;

/// What happens when an already verified response is submitted again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayPolicy {
    /// Returns the recorded result again.
    #[default]
    Idempotent,
    /// Fails with [`VerifyError::AlreadyVerified`].
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Address logs are emitted from.
    pub address: Address,
    pub guardian_set: GuardianSet,
    pub allowed_staleness_secs: u64,
    pub replay_policy: ReplayPolicy,
}

impl VerifierConfig {
    pub fn new(address: Address, guardian_set: GuardianSet) -> Self {
        Self {
            address,
            guardian_set,
            allowed_staleness_secs: DEFAULT_ALLOWED_STALENESS_SECS,
            replay_policy: ReplayPolicy::default(),
        }
    }
}

/// Where a response stands with the verifier.
///
/// `Verified` is terminal. A rejected response may be submitted again, for
/// example with a complete signature set, and is evaluated from scratch.
/// Rejections are kept in a bounded log, so an old one can fall back to
/// `Unverified`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationState {
    Unverified,
    Rejected(String),
    Verified(VerificationResult),
}

/// Submits ABI-encoded calls to a verifier.
pub trait VerifierClient {
    /// Returns `Ok(None)` if the call went through without producing a
    /// receipt.
    fn submit(&mut self, calldata: &[u8]) -> Result<Option<Receipt>, VerifyError>;
}

/// In-process verifier for a fixed guardian set and ownership predicate.
#[derive(Debug)]
pub struct OwnerVerifier<P, C> {
    config: VerifierConfig,
    predicate: P,
    clock: C,
    verified: HashMap<B256, VerificationResult>,
    rejected: HashMap<B256, String>,
    /// Insertion order of `rejected`, oldest first.
    rejected_order: VecDeque<B256>,
    rejected_capacity: usize,
    transactions: u64,
}

impl<P: OwnershipPredicate, C: Clock> OwnerVerifier<P, C> {
    pub fn new(config: VerifierConfig, predicate: P, clock: C) -> Self {
        Self {
            config,
            predicate,
            clock,
            verified: HashMap::new(),
            rejected: HashMap::new(),
            rejected_order: VecDeque::new(),
            rejected_capacity: DEFAULT_REJECTED_CAPACITY,
            transactions: 0,
        }
    }

    /// Caps how many rejection reasons are kept. Older ones are dropped
    /// first and their responses read as [`VerificationState::Unverified`].
    pub fn with_rejected_capacity(mut self, capacity: usize) -> Self {
        self.rejected_capacity = capacity;
        self.trim_rejected();
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// State of the response with the given digest.
    pub fn state(&self, digest: &B256) -> VerificationState {
        if let Some(result) = self.verified.get(digest) {
            return VerificationState::Verified(result.clone());
        }
        match self.rejected.get(digest) {
            Some(reason) => VerificationState::Rejected(reason.clone()),
            None => VerificationState::Unverified,
        }
    }

    /// Decodes and executes a `verifyOwner` call, returning a receipt with
    /// the `OwnerVerified` log.
    pub fn execute(&mut self, calldata: &[u8]) -> Result<Receipt, VerifyError> {
        let call = verifyOwnerCall::abi_decode(calldata)?;
        let signatures = evm_struct_to_signatures(&call.signatures)?;
        let result = self.verify_owner(&call.response, &signatures)?;

        let receipt = Receipt {
            transaction_index: self.transactions,
            logs: vec![Log {
                address: self.config.address,
                data: result.to_event().encode_log_data(),
            }],
        };
        self.transactions += 1;
        Ok(receipt)
    }

    /// Checks `response` and its signatures, recording the outcome.
    ///
    /// Signatures are checked on every submission, including replays of a
    /// response that was already verified.
    pub fn verify_owner(
        &mut self,
        response: &[u8],
        signatures: &[GuardianSignature],
    ) -> Result<VerificationResult, VerifyError> {
        let digest = response_digest(response);
        let now = self.clock.now();

        let guardians = &self.config.guardian_set;
        let signed = guardians
            .ensure_active(now)
            .and_then(|()| verify_quorum(guardians, signatures, &digest.0));
        if let Err(e) = signed {
            return Err(self.reject(digest, e.into()));
        }

        if let Some(result) = self.verified.get(&digest) {
            return match self.config.replay_policy {
                ReplayPolicy::Idempotent => {
                    debug!(%digest, "response already verified");
                    Ok(result.clone())
                }
                ReplayPolicy::Reject => Err(VerifyError::AlreadyVerified(digest)),
            };
        }

        match self.evaluate(now, response) {
            Ok(result) => {
                info!(
                    %digest,
                    slot = result.slot_number,
                    owner = %result.owner,
                    account = %result.account,
                    "owner verified"
                );
                self.forget_rejection(&digest);
                self.verified.insert(digest, result.clone());
                Ok(result)
            }
            Err(e) => Err(self.reject(digest, e)),
        }
    }

    /// Records why `digest` was turned down. A verified response stays
    /// verified, and the oldest records go first once the log is full.
    fn reject(&mut self, digest: B256, err: VerifyError) -> VerifyError {
        warn!(%digest, %err, "response rejected");
        if self.verified.contains_key(&digest) || self.rejected_capacity == 0 {
            return err;
        }

        if self.rejected.insert(digest, err.to_string()).is_none() {
            self.rejected_order.push_back(digest);
        }
        self.trim_rejected();
        err
    }

    fn trim_rejected(&mut self) {
        while self.rejected.len() > self.rejected_capacity {
            let Some(oldest) = self.rejected_order.pop_front() else {
                break;
            };
            self.rejected.remove(&oldest);
        }
    }

    fn forget_rejection(&mut self, digest: &B256) {
        if self.rejected.remove(digest).is_some() {
            self.rejected_order.retain(|d| d != digest);
        }
    }

    fn evaluate(&self, now: u64, response: &[u8]) -> Result<VerificationResult, VerifyError> {
        let parsed: QueryResponse = decode_exact(response)?;
        let (request, body) = single_pda_response(&parsed)?;

        if request.commitment != Finality::Finalized {
            return Err(VerifyError::UnexpectedCommitment(request.commitment));
        }
        // Counts per lookup are already matched by decoding.
        let [result] = body.results.as_slice() else {
            return Err(VerifyError::UnexpectedResultCount(body.results.len()));
        };

        let block_time = body.block_time_us / 1_000_000;
        let min_block_time = now.saturating_sub(self.config.allowed_staleness_secs);
        if block_time < min_block_time {
            return Err(VerifyError::StaleBlockTime {
                block_time,
                min_block_time,
            });
        }

        let owner = self.predicate.check(&request.pdas[0], result)?;

        Ok(VerificationResult {
            slot_number: body.slot_number,
            block_time_us: body.block_time_us,
            owner,
            account: result.account,
        })
    }
}

impl<P: OwnershipPredicate, C: Clock> VerifierClient for OwnerVerifier<P, C> {
    fn submit(&mut self, calldata: &[u8]) -> Result<Option<Receipt>, VerifyError> {
        self.execute(calldata).map(Some)
    }
}

/// The only per-chain request and response, which must be a Solana PDA query.
fn single_pda_response(
    parsed: &QueryResponse,
) -> Result<(&SolanaPdaQueryRequest, &SolanaPdaQueryResponse), VerifyError> {
    if parsed.responses.len() != 1 {
        return Err(VerifyError::UnexpectedResponseCount(parsed.responses.len()));
    }

    let per_chain = &parsed.responses[0];
    if per_chain.chain_id != ChainId::SOLANA {
        return Err(VerifyError::UnexpectedChain(per_chain.chain_id));
    }

    match (parsed.request_for(0), &per_chain.response) {
        (Some(ChainQuery::SolanaPda(request)), ChainQueryResponse::SolanaPda(body)) => {
            Ok((request, body))
        }
        _ => Err(VerifyError::UnexpectedQueryType),
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use alloy_primitives::hex;
    use ccq_crypto::{GuardianSigner, QuorumError};
    use ccq_primitives::{
        constants::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID},
        Pubkey,
    };
    use ccq_query_types::{
        encode_to_vec, PdaLookup, PerChainQueryRequest, PerChainQueryResponse, QueryRequest,
        SolanaPdaResult, OFF_CHAIN_REQUEST_ID_LEN,
    };

    use super::*;
    use crate::{
        abi::encode_verify_owner,
        token_account::{TokenAccount, TokenAccountState},
        FixedClock, PredicateError, TokenAccountOwnership,
    };

    const NOW: u64 = 1_700_000_000;

    fn owner() -> Pubkey {
        Pubkey::new([0x11; 32])
    }

    fn mint() -> Pubkey {
        Pubkey::new([0x22; 32])
    }

    fn signers() -> Vec<GuardianSigner> {
        (1u8..=4)
            .map(|seed| {
                let mut key = [0u8; 32];
                key[31] = seed;
                GuardianSigner::from_hex(seed - 1, &hex::encode(key)).unwrap()
            })
            .collect()
    }

    fn verifier(policy: ReplayPolicy) -> OwnerVerifier<TokenAccountOwnership, FixedClock> {
        let keys = signers().iter().map(GuardianSigner::address).collect();
        let mut config = VerifierConfig::new(
            Address::repeat_byte(0x0b),
            GuardianSet::try_new(0, keys, 0).unwrap(),
        );
        config.replay_policy = policy;
        OwnerVerifier::new(config, TokenAccountOwnership::new(mint()), FixedClock(NOW))
    }

    fn response_bytes(commitment: Finality, block_time_us: u64) -> Vec<u8> {
        let request = QueryRequest::new(
            42,
            vec![PerChainQueryRequest::new(
                ChainId::SOLANA,
                ChainQuery::SolanaPda(SolanaPdaQueryRequest::new(
                    commitment,
                    vec![PdaLookup::new(
                        ASSOCIATED_TOKEN_PROGRAM_ID,
                        vec![
                            owner().to_bytes().to_vec(),
                            TOKEN_PROGRAM_ID.to_bytes().to_vec(),
                            mint().to_bytes().to_vec(),
                        ],
                    )],
                )),
            )],
        );
        let data = TokenAccount {
            mint: mint(),
            owner: owner(),
            amount: 1,
            state: TokenAccountState::Initialized,
            ..Default::default()
        }
        .pack()
        .to_vec();
        let body = SolanaPdaQueryResponse {
            slot_number: 250_000_000,
            block_time_us,
            block_hash: [0x42; 32],
            results: vec![SolanaPdaResult {
                account: Pubkey::new([0xaa; 32]),
                bump: 254,
                lamports: 2_039_280,
                rent_epoch: 0,
                executable: false,
                owner: TOKEN_PROGRAM_ID,
                data,
            }],
        };
        let response = QueryResponse::try_new(
            ChainId::OFF_CHAIN,
            vec![0; OFF_CHAIN_REQUEST_ID_LEN],
            request,
            vec![PerChainQueryResponse::new(
                ChainId::SOLANA,
                ChainQueryResponse::SolanaPda(body),
            )],
        )
        .unwrap();
        encode_to_vec(&response).unwrap()
    }

    fn sign(bytes: &[u8]) -> Vec<GuardianSignature> {
        let digest = response_digest(bytes);
        signers().iter().map(|s| s.sign_digest(&digest.0)).collect()
    }

    fn fresh() -> Vec<u8> {
        response_bytes(Finality::Finalized, (NOW - 60) * 1_000_000)
    }

    #[test]
    fn test_verifies_and_emits_event() {
        let mut verifier = verifier(ReplayPolicy::Idempotent);
        let bytes = fresh();
        let receipt = verifier.execute(&encode_verify_owner(&bytes, &sign(&bytes))).unwrap();

        let result = VerificationResult::from_receipt(Some(&receipt)).unwrap();
        assert_eq!(result.owner, owner());
        assert_eq!(result.account, Pubkey::new([0xaa; 32]));
        assert_eq!(result.slot_number, 250_000_000);
        assert_eq!(receipt.logs[0].address, Address::repeat_byte(0x0b));
        assert_eq!(
            verifier.state(&response_digest(&bytes)),
            VerificationState::Verified(result)
        );
    }

    #[test]
    fn test_any_flipped_byte_fails_quorum() {
        let bytes = fresh();
        let signatures = sign(&bytes);

        let mut verifier = verifier(ReplayPolicy::Idempotent);
        for i in 0..bytes.len() {
            for mask in [0x01, 0x80] {
                let mut tampered = bytes.clone();
                tampered[i] ^= mask;
                let err = verifier.verify_owner(&tampered, &signatures).unwrap_err();
                assert!(err.is_quorum_failure(), "byte {i} mask {mask:#04x}: {err}");
            }
        }
    }

    #[test]
    fn test_missing_quorum_is_rejected() {
        let mut verifier = verifier(ReplayPolicy::Idempotent);
        let bytes = fresh();
        let mut signatures = sign(&bytes);
        signatures.truncate(2);

        let err = verifier.verify_owner(&bytes, &signatures).unwrap_err();
        assert!(err.is_quorum_failure());
        assert!(matches!(
            verifier.state(&response_digest(&bytes)),
            VerificationState::Rejected(_)
        ));

        // A complete signature set for the same bytes still goes through.
        verifier.verify_owner(&bytes, &sign(&bytes)).unwrap();
    }

    #[test]
    fn test_stale_block_time() {
        let bytes = response_bytes(
            Finality::Finalized,
            (NOW - DEFAULT_ALLOWED_STALENESS_SECS - 1) * 1_000_000,
        );
        assert!(matches!(
            verifier(ReplayPolicy::Idempotent).verify_owner(&bytes, &sign(&bytes)),
            Err(VerifyError::StaleBlockTime { .. })
        ));

        let edge = response_bytes(
            Finality::Finalized,
            (NOW - DEFAULT_ALLOWED_STALENESS_SECS) * 1_000_000,
        );
        assert!(verifier(ReplayPolicy::Idempotent)
            .verify_owner(&edge, &sign(&edge))
            .is_ok());
    }

    #[test]
    fn test_confirmed_commitment_is_rejected() {
        let bytes = response_bytes(Finality::Confirmed, NOW * 1_000_000);
        assert!(matches!(
            verifier(ReplayPolicy::Idempotent).verify_owner(&bytes, &sign(&bytes)),
            Err(VerifyError::UnexpectedCommitment(Finality::Confirmed))
        ));
    }

    #[test]
    fn test_wrong_mint_is_rejected() {
        let bytes = fresh();
        let keys = signers().iter().map(GuardianSigner::address).collect();
        let config = VerifierConfig::new(Address::ZERO, GuardianSet::try_new(0, keys, 0).unwrap());
        let mut verifier = OwnerVerifier::new(
            config,
            TokenAccountOwnership::new(Pubkey::new([0x99; 32])),
            FixedClock(NOW),
        );

        assert!(matches!(
            verifier.verify_owner(&bytes, &sign(&bytes)),
            Err(VerifyError::Predicate(PredicateError::WrongMintSeed))
        ));
    }

    #[test]
    fn test_expired_guardian_set() {
        let bytes = fresh();
        let keys = signers().iter().map(GuardianSigner::address).collect();
        let set = GuardianSet::try_new(0, keys, (NOW - 1) as u32).unwrap();
        let mut verifier = OwnerVerifier::new(
            VerifierConfig::new(Address::ZERO, set),
            TokenAccountOwnership::new(mint()),
            FixedClock(NOW),
        );

        assert!(matches!(
            verifier.verify_owner(&bytes, &sign(&bytes)),
            Err(VerifyError::Quorum(QuorumError::GuardianSetExpired { .. }))
        ));
    }

    #[test]
    fn test_replay_policies() {
        let bytes = fresh();
        let calldata = encode_verify_owner(&bytes, &sign(&bytes));

        let mut idempotent = verifier(ReplayPolicy::Idempotent);
        let first = idempotent.execute(&calldata).unwrap();
        let second = idempotent.execute(&calldata).unwrap();
        assert_eq!(first.logs, second.logs);
        assert_eq!(second.transaction_index, 1);

        let mut reject = verifier(ReplayPolicy::Reject);
        reject.execute(&calldata).unwrap();
        assert!(matches!(
            reject.execute(&calldata),
            Err(VerifyError::AlreadyVerified(_))
        ));
    }

    #[test]
    fn test_replay_still_needs_quorum() {
        let bytes = fresh();
        let signatures = sign(&bytes);
        let short = &signatures[..2];

        for policy in [ReplayPolicy::Idempotent, ReplayPolicy::Reject] {
            let mut verifier = verifier(policy);
            let verified = verifier.verify_owner(&bytes, &signatures).unwrap();

            for replay in [&[][..], short] {
                let err = verifier.verify_owner(&bytes, replay).unwrap_err();
                assert!(err.is_quorum_failure(), "{policy:?}: {err}");

                let calldata = encode_verify_owner(&bytes, replay);
                let err = verifier.execute(&calldata).unwrap_err();
                assert!(err.is_quorum_failure(), "{policy:?}: {err}");
            }

            // Failed replays leave the recorded result alone.
            assert_eq!(
                verifier.state(&response_digest(&bytes)),
                VerificationState::Verified(verified)
            );
        }
    }

    #[derive(Clone, Debug)]
    struct SharedClock(Rc<Cell<u64>>);

    impl Clock for SharedClock {
        fn now(&self) -> u64 {
            self.0.get()
        }
    }

    #[test]
    fn test_replay_after_guardian_set_expiry() {
        let bytes = fresh();
        let signatures = sign(&bytes);
        let keys = signers().iter().map(GuardianSigner::address).collect();
        let set = GuardianSet::try_new(0, keys, (NOW + 10) as u32).unwrap();
        let time = Rc::new(Cell::new(NOW));
        let mut verifier = OwnerVerifier::new(
            VerifierConfig::new(Address::ZERO, set),
            TokenAccountOwnership::new(mint()),
            SharedClock(time.clone()),
        );

        verifier.verify_owner(&bytes, &signatures).unwrap();
        time.set(NOW + 20);
        assert!(matches!(
            verifier.verify_owner(&bytes, &signatures),
            Err(VerifyError::Quorum(QuorumError::GuardianSetExpired { .. }))
        ));
    }

    #[test]
    fn test_rejection_log_is_bounded() {
        let mut verifier = verifier(ReplayPolicy::Idempotent).with_rejected_capacity(2);
        let responses: Vec<_> = (1..=3)
            .map(|age| response_bytes(Finality::Finalized, (NOW - age) * 1_000_000))
            .collect();

        for bytes in &responses {
            let signatures = sign(bytes);
            verifier.verify_owner(bytes, &signatures[..2]).unwrap_err();
        }

        assert_eq!(
            verifier.state(&response_digest(&responses[0])),
            VerificationState::Unverified
        );
        for bytes in &responses[1..] {
            assert!(matches!(
                verifier.state(&response_digest(bytes)),
                VerificationState::Rejected(_)
            ));
        }

        // Verifying a rejected response frees its slot for the next rejection.
        verifier.verify_owner(&responses[1], &sign(&responses[1])).unwrap();
        let next = response_bytes(Finality::Finalized, (NOW - 4) * 1_000_000);
        verifier.verify_owner(&next, &[]).unwrap_err();
        assert!(matches!(
            verifier.state(&response_digest(&responses[2])),
            VerificationState::Rejected(_)
        ));
        assert!(matches!(
            verifier.state(&response_digest(&next)),
            VerificationState::Rejected(_)
        ));
    }

    #[test]
    fn test_garbage_calldata() {
        assert!(matches!(
            verifier(ReplayPolicy::Idempotent).execute(&[0xde, 0xad, 0xbe, 0xef]),
            Err(VerifyError::Abi(_))
        ));
    }
}
