//! Quorum verification of guardian signatures.

use super::{GuardianSet, GuardianSignature, QuorumError, SignatureSet};

mod ecdsa;

/// Verifies a set of guardian signatures over `digest`.
///
/// # Verification Steps
///
/// 1. Construct and validate the [`SignatureSet`] (strictly ascending indices)
/// 2. Check that the number of signatures meets the guardian set quorum
/// 3. For each signature, verify that:
///    - The guardian index is within the set
///    - The signature recovers to that guardian's address
///
/// Expiry of the guardian set is a policy of the caller, see
/// [`GuardianSet::ensure_active`].
pub fn verify_quorum(
    guardians: &GuardianSet,
    signatures: &[GuardianSignature],
    digest: &[u8; 32],
) -> Result<(), QuorumError> {
    let signature_set = SignatureSet::new(signatures.to_vec())?;

    if signature_set.len() < guardians.quorum() {
        return Err(QuorumError::InsufficientSignatures {
            provided: signature_set.len(),
            required: guardians.quorum(),
        });
    }

    ecdsa::verify_ecdsa_signatures(guardians, &signature_set, digest)
}
