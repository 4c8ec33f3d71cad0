//! Pipeline steps. Each consumes the previous step's output; the first
//! failure aborts the check.

use ccq_pda::{DerivedAddress, SeedSet};
use ccq_primitives::{constants::ASSOCIATED_TOKEN_PROGRAM_ID, Pubkey};
use ccq_proxy::{QueryProxy, SignedQueryResponse};
use ccq_query_types::{ChainQueryResponse, QueryRequest, QueryResponse};
use ccq_verifier::{encode_verify_owner, Receipt, VerificationResult, VerifierClient};
use tracing::{debug, info, instrument};

use crate::{FlowError, OwnerCheckParams};

/// Everything a successful check produced.
#[derive(Clone, Debug)]
pub struct FlowOutcome {
    pub derived: DerivedAddress,
    pub signed: SignedQueryResponse,
    pub response: QueryResponse,
    pub result: VerificationResult,
}

/// Derives the owner's associated token account.
#[instrument(skip_all, fields(component = "owner_check", owner = %params.owner, mint = %params.mint))]
pub fn derive(params: &OwnerCheckParams) -> Result<DerivedAddress, FlowError> {
    let seeds: SeedSet = params.seeds();
    let derived = seeds.derive(&ASSOCIATED_TOKEN_PROGRAM_ID)?;
    info!(account = %derived.address, bump = derived.bump, "derived token account");
    Ok(derived)
}

/// Queries the proxy and checks the attested account is the derived one.
#[instrument(skip_all, fields(component = "owner_check", nonce = request.nonce))]
pub fn query<Q: QueryProxy>(
    proxy: &Q,
    request: &QueryRequest,
    expected: &DerivedAddress,
) -> Result<(SignedQueryResponse, QueryResponse), FlowError> {
    let signed = proxy.query(request)?;
    let response = signed.parse()?;

    let result = match response.responses.first().map(|r| &r.response) {
        Some(ChainQueryResponse::SolanaPda(body)) => body.results.first(),
        _ => None,
    }
    .ok_or(FlowError::MissingPdaResult)?;

    if result.account != expected.address {
        return Err(FlowError::Mismatch {
            field: "account",
            expected: expected.address,
            got: result.account,
        });
    }

    debug!(
        owner_program = %result.owner,
        data_len = result.data.len(),
        signatures = signed.signatures.len(),
        "received signed response"
    );
    Ok((signed, response))
}

/// Submits the signed response as a `verifyOwner` call.
#[instrument(skip_all, fields(component = "owner_check"))]
pub fn submit<V: VerifierClient>(
    verifier: &mut V,
    signed: &SignedQueryResponse,
) -> Result<Option<Receipt>, FlowError> {
    let calldata = encode_verify_owner(&signed.bytes, &signed.signatures);
    Ok(verifier.submit(&calldata)?)
}

/// Decodes the `OwnerVerified` event from a receipt.
pub fn decode(receipt: Option<&Receipt>) -> Result<VerificationResult, FlowError> {
    Ok(VerificationResult::from_receipt(receipt)?)
}

/// Checks the verifier recorded exactly the expected owner and account.
pub fn compare(
    result: &VerificationResult,
    owner: &Pubkey,
    account: &Pubkey,
) -> Result<(), FlowError> {
    if result.owner != *owner {
        return Err(FlowError::Mismatch {
            field: "owner",
            expected: *owner,
            got: result.owner,
        });
    }
    if result.account != *account {
        return Err(FlowError::Mismatch {
            field: "account",
            expected: *account,
            got: result.account,
        });
    }
    Ok(())
}

/// Runs the full check: derive, query, submit, decode, compare.
#[instrument(skip_all, fields(component = "owner_check"))]
pub fn run<Q: QueryProxy, V: VerifierClient>(
    params: &OwnerCheckParams,
    proxy: &Q,
    verifier: &mut V,
) -> Result<FlowOutcome, FlowError> {
    let derived = derive(params)?;
    let (signed, response) = query(proxy, &params.request(), &derived)?;
    let receipt = submit(verifier, &signed)?;
    let result = decode(receipt.as_ref())?;
    compare(&result, &params.owner, &derived.address)?;

    info!(
        slot = result.slot_number,
        owner = %result.owner,
        account = %result.account,
        "owner verified"
    );
    Ok(FlowOutcome {
        derived,
        signed,
        response,
        result,
    })
}
