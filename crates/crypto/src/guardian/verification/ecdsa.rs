//! ECDSA-specific signature verification implementation.

use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, SECP256K1,
};

use crate::guardian::{pubkey_to_address, GuardianSet, GuardianSignature, QuorumError, SignatureSet};

/// Recovers the signer of each signature and checks it against the guardian
/// at the claimed index.
///
/// Assumes the set ordering was already validated.
pub(super) fn verify_ecdsa_signatures(
    guardians: &GuardianSet,
    signatures: &SignatureSet,
    digest: &[u8; 32],
) -> Result<(), QuorumError> {
    let message = Message::from_digest(*digest);

    for sig in signatures.signatures() {
        let index = sig.guardian_index();
        let expected = guardians
            .keys()
            .get(index as usize)
            .ok_or(QuorumError::GuardianIndexOutOfBounds {
                index,
                max: guardians.len(),
            })?;

        let recoverable = to_recoverable(sig)?;
        let pubkey = SECP256K1
            .recover_ecdsa(&message, &recoverable)
            .map_err(|_| QuorumError::InvalidSignature { index })?;

        if pubkey_to_address(&pubkey) != *expected {
            return Err(QuorumError::InvalidSignature { index });
        }
    }

    Ok(())
}

fn to_recoverable(sig: &GuardianSignature) -> Result<RecoverableSignature, QuorumError> {
    let recovery_id = RecoveryId::from_i32(i32::from(sig.recovery_id()))
        .map_err(|_| QuorumError::InvalidSignatureFormat)?;
    RecoverableSignature::from_compact(&sig.compact(), recovery_id)
        .map_err(|_| QuorumError::InvalidSignatureFormat)
}
