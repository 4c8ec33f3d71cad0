use ccq_owner_check::run;
use ccq_verifier::{Clock, SystemClock};

use super::format_block_time;
use crate::{args::SubcCheck, context::CmdContext};

pub(super) fn exec_check(subc: SubcCheck, ctx: &CmdContext) -> anyhow::Result<()> {
    let now = subc.now.unwrap_or_else(|| SystemClock.now());
    let params = ctx.params()?;
    let proxy = ctx.proxy()?;
    let mut verifier = ctx.verifier(now)?;

    let outcome = run(&params, &proxy, &mut verifier)?;

    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    println!("block time: {}", format_block_time(outcome.result.block_time_us));
    println!("digest:     {}", outcome.signed.digest());
    Ok(())
}
