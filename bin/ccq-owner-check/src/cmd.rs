//! Subcommand execution.

mod check;
mod decode;
mod derive;
mod query;

use chrono::{DateTime, SecondsFormat};

use crate::{args::Subcommand, context::CmdContext};

pub(crate) fn exec_subc(cmd: Subcommand, ctx: &CmdContext) -> anyhow::Result<()> {
    match cmd {
        Subcommand::Derive(subc) => derive::exec_derive(subc, ctx),
        Subcommand::Query(subc) => query::exec_query(subc, ctx),
        Subcommand::Check(subc) => check::exec_check(subc, ctx),
        Subcommand::Decode(subc) => decode::exec_decode(subc, ctx),
    }
}

/// Renders a block time in microseconds as an ISO-8601 UTC timestamp with
/// millisecond precision.
fn format_block_time(block_time_us: u64) -> String {
    i64::try_from(block_time_us / 1_000)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| format!("<{block_time_us}us out of range>"))
}
