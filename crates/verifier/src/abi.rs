//! Solidity interface of the owner verifier and the signature adapter.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::{sol, SolCall};
use ccq_crypto::GuardianSignature;

use crate::VerifyError;

sol! {
    #![sol(all_derives)]

    /// Guardian signature as the core bridge contract takes it.
    struct Signature {
        bytes32 r;
        bytes32 s;
        /// Recovery id plus 27.
        uint8 v;
        uint8 guardianIndex;
    }

    /// Emitted once the attested token account passed every check.
    event OwnerVerified(
        uint64 slotNumber,
        /// Microseconds since the unix epoch.
        uint64 blockTime,
        bytes32 owner,
        bytes32 account,
    );

    function verifyOwner(bytes response, Signature[] signatures) external;
}

/// Offset between a raw recovery id and the EVM `v` value.
pub const V_OFFSET: u8 = 27;

/// Reshapes proxy signatures into the verifier's call struct.
pub fn signatures_to_evm_struct(signatures: &[GuardianSignature]) -> Vec<Signature> {
    signatures
        .iter()
        .map(|sig| Signature {
            r: B256::from(*sig.r()),
            s: B256::from(*sig.s()),
            v: sig.recovery_id() + V_OFFSET,
            guardianIndex: sig.guardian_index(),
        })
        .collect()
}

/// Inverse of [`signatures_to_evm_struct`]. Only `v` of 27 or 28 is accepted,
/// like `ecrecover`.
pub fn evm_struct_to_signatures(
    signatures: &[Signature],
) -> Result<Vec<GuardianSignature>, VerifyError> {
    signatures
        .iter()
        .map(|sig| {
            let recovery_id = match sig.v {
                27 | 28 => sig.v - V_OFFSET,
                v => return Err(VerifyError::InvalidV(v)),
            };
            Ok(GuardianSignature::new(
                sig.r.0,
                sig.s.0,
                recovery_id,
                sig.guardianIndex,
            ))
        })
        .collect()
}

/// ABI-encodes a `verifyOwner` call.
pub fn encode_verify_owner(response: &[u8], signatures: &[GuardianSignature]) -> Vec<u8> {
    verifyOwnerCall {
        response: Bytes::copy_from_slice(response),
        signatures: signatures_to_evm_struct(signatures),
    }
    .abi_encode()
}
