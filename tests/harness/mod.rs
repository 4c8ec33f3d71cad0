//! A local network: guardians, an account snapshot holding the test owner's
//! token account, and builders for the proxy and verifier over them.

use alloy_primitives::Address;
use ccq_crypto::{GuardianSet, GuardianSigner};
use ccq_owner_check::OwnerCheckParams;
use ccq_primitives::{constants::TOKEN_PROGRAM_ID, Finality, Pubkey};
use ccq_proxy::{AccountState, InMemoryAccountSource, MockQueryProxy, SlotInfo, Snapshot};
use ccq_verifier::{
    token_account::{TokenAccount, TokenAccountState},
    FixedClock, OwnerVerifier, TokenAccountOwnership, VerifierConfig,
};

pub const OWNER: &str = "99mjQz6jfKpZw5dE3Bxq1RUV311u2EBG4mSKAH49CEep";
pub const MINT: &str = "FudkRodUCGiK2xs5egx9YpSP4iyQsfr7SsEVSRAkj8qA";

/// Associated token account of [`OWNER`] for [`MINT`] and its bump.
pub const OWNER_ATA: &str = "9jf2CqJVSYW7SmvTZPLBrQ5LWQiFndmQznx85SG5d8A4";
pub const OWNER_ATA_BUMP: u8 = 254;

pub const SLOT: u64 = 250_000_000;
pub const BLOCK_TIME_SECS: u64 = 1_700_000_000;
pub const TOKEN_AMOUNT: u64 = 1_000_000;

pub type TestVerifier = OwnerVerifier<TokenAccountOwnership, FixedClock>;
pub type TestProxy = MockQueryProxy<InMemoryAccountSource>;

pub fn owner() -> Pubkey {
    OWNER.parse().expect("valid owner")
}

pub fn mint() -> Pubkey {
    MINT.parse().expect("valid mint")
}

pub fn owner_ata() -> Pubkey {
    OWNER_ATA.parse().expect("valid account")
}

/// Deterministic guardian key: every byte is `seed`.
fn guardian_key(seed: u8) -> String {
    format!("{seed:02x}").repeat(32)
}

/// Guardians, chain state and verifier settings for one test.
#[derive(Debug)]
pub struct TestNetwork {
    key_seeds: Vec<u8>,
    source: InMemoryAccountSource,
    verifier_address: Address,
}

impl TestNetwork {
    /// `guardians` guardians and a finalized snapshot holding the owner's
    /// token account at [`BLOCK_TIME_SECS`].
    pub fn new(guardians: u8) -> Self {
        let key_seeds = (1..=guardians).collect();
        let mut network = Self {
            key_seeds,
            source: InMemoryAccountSource::new(),
            verifier_address: Address::repeat_byte(0x0b),
        };
        for (finality, offset) in [(Finality::Finalized, 0), (Finality::Confirmed, 32)] {
            network.source = network.source.with_snapshot(
                finality,
                Snapshot::new(SlotInfo {
                    slot: SLOT + offset,
                    block_time_us: (BLOCK_TIME_SECS + offset / 2) * 1_000_000,
                    block_hash: [0x42; 32],
                }),
            );
            network.set_token_account(finality, owner(), mint());
        }
        network
    }

    /// Replaces the owner's token account data in the `finality` snapshot.
    pub fn set_token_account(&mut self, finality: Finality, token_owner: Pubkey, token_mint: Pubkey) {
        let data = TokenAccount {
            mint: token_mint,
            owner: token_owner,
            amount: TOKEN_AMOUNT,
            state: TokenAccountState::Initialized,
            ..Default::default()
        }
        .pack()
        .to_vec();
        let state = AccountState {
            lamports: 2_039_280,
            rent_epoch: 0,
            executable: false,
            owner: TOKEN_PROGRAM_ID,
            data,
        };
        self.source
            .insert_account(finality, owner_ata(), state)
            .expect("snapshot exists");
    }

    pub fn signer(&self, index: usize) -> GuardianSigner {
        let index_u8 = u8::try_from(index).expect("guardian index fits u8");
        GuardianSigner::from_hex(index_u8, &guardian_key(self.key_seeds[index])).expect("valid key")
    }

    pub fn guardian_set(&self) -> GuardianSet {
        let keys = (0..self.key_seeds.len())
            .map(|i| self.signer(i).address())
            .collect();
        GuardianSet::try_new(0, keys, 0).expect("valid guardian set")
    }

    /// Proxy signing with the guardians at `indices`.
    pub fn proxy_signed_by(&self, indices: &[usize]) -> TestProxy {
        let signers = indices.iter().map(|&i| self.signer(i)).collect();
        MockQueryProxy::new(self.source.clone(), signers).expect("at least one signer")
    }

    /// Proxy signing with every guardian.
    pub fn proxy(&self) -> TestProxy {
        let all: Vec<usize> = (0..self.key_seeds.len()).collect();
        self.proxy_signed_by(&all)
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig::new(self.verifier_address, self.guardian_set())
    }

    pub fn verifier_with(&self, config: VerifierConfig, now: u64) -> TestVerifier {
        OwnerVerifier::new(config, TokenAccountOwnership::new(mint()), FixedClock(now))
    }

    /// Verifier whose clock reads the snapshot's block time.
    pub fn verifier(&self) -> TestVerifier {
        self.verifier_with(self.verifier_config(), BLOCK_TIME_SECS)
    }

    pub fn verifier_address(&self) -> Address {
        self.verifier_address
    }
}

/// Check parameters for [`OWNER`]'s [`MINT`] account.
pub fn params() -> OwnerCheckParams {
    OwnerCheckParams {
        owner: owner(),
        mint: mint(),
        token_program: TOKEN_PROGRAM_ID,
        finality: Finality::Finalized,
        nonce: 42,
    }
}
