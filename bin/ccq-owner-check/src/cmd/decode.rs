use std::fs;

use ccq_config::Config;
use ccq_crypto::verify_quorum;
use ccq_primitives::{constants::TOKEN_PROGRAM_ID, Pubkey};
use ccq_proxy::SignedQueryResponse;
use ccq_query_types::{ChainQueryResponse, SolanaPdaResult};
use ccq_verifier::{
    token_account::{TokenAccount, TokenAccountError},
    Clock, SystemClock,
};

use super::format_block_time;
use crate::{args::SubcDecode, context::CmdContext};

pub(super) fn exec_decode(subc: SubcDecode, ctx: &CmdContext) -> anyhow::Result<()> {
    let json = fs::read_to_string(&subc.path)?;
    let signed: SignedQueryResponse = serde_json::from_str(&json)?;
    let response = signed.parse()?;
    let digest = signed.digest();
    let token_program = token_program(ctx.config().ok());

    println!("digest:        {digest}");
    println!("signatures:    {}", signed.signatures.len());

    // Quorum can only be checked against a configured guardian set.
    if ctx.config().is_ok() {
        let verifier = ctx.verifier(SystemClock.now())?;
        let guardians = &verifier.config().guardian_set;
        let status = match verify_quorum(guardians, &signed.signatures, &digest.0) {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        println!("quorum:        {status}");
    }

    println!("request chain: {}", response.request_chain_id);
    println!("nonce:         {}", response.request.nonce);

    for (i, per_chain) in response.responses.iter().enumerate() {
        println!("response {i}: chain {}", per_chain.chain_id);
        match &per_chain.response {
            ChainQueryResponse::SolanaPda(body) => {
                println!("  slot:        {}", body.slot_number);
                println!("  block time:  {}", format_block_time(body.block_time_us));
                println!("  block hash:  {}", hex::encode(body.block_hash));
                for result in &body.results {
                    print_pda_result(result, &token_program);
                }
            }
            ChainQueryResponse::SolanaAccount(body) => {
                println!("  slot:        {}", body.slot_number);
                println!("  block time:  {}", format_block_time(body.block_time_us));
                for result in &body.results {
                    println!("  owner:       {}", result.owner);
                    println!("  lamports:    {}", result.lamports);
                    println!("  data:        {} bytes", result.data.len());
                }
            }
        }
    }
    Ok(())
}

/// Token program whose accounts get their data decoded.
fn token_program(config: Option<&Config>) -> Pubkey {
    config.map_or(TOKEN_PROGRAM_ID, |c| c.query.token_program)
}

/// Unpacks the account data if `token_program` owns the account.
fn unpack_token(
    result: &SolanaPdaResult,
    token_program: &Pubkey,
) -> Option<Result<TokenAccount, TokenAccountError>> {
    (result.owner == *token_program).then(|| TokenAccount::unpack(&result.data))
}

fn print_pda_result(result: &SolanaPdaResult, token_program: &Pubkey) {
    println!("  account:     {} (bump {})", result.account, result.bump);
    println!("  owner:       {}", result.owner);
    println!("  lamports:    {}", result.lamports);

    match unpack_token(result, token_program) {
        Some(Ok(token)) => {
            println!("  token mint:  {}", token.mint);
            println!("  token owner: {}", token.owner);
            println!("  amount:      {}", token.amount);
            println!("  state:       {:?}", token.state);
        }
        Some(Err(e)) => println!("  token data:  {e}"),
        None => println!("  data:        {} bytes", result.data.len()),
    }
}
