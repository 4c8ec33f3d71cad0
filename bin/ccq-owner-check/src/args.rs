//! Command line arguments.

use std::path::PathBuf;

use argh::FromArgs;

#[derive(Debug, FromArgs)]
#[argh(description = "Solana token account ownership checks through signed cross-chain queries")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub(crate) config: Option<PathBuf>,

    /// Will be used, for example, as `-o query.nonce=7 -o verifier.replay_policy=reject`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub(crate) overrides: Vec<String>,

    #[argh(subcommand)]
    pub(crate) subc: Subcommand,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand)]
pub(crate) enum Subcommand {
    Derive(SubcDerive),
    Query(SubcQuery),
    Check(SubcCheck),
    Decode(SubcDecode),
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(
    subcommand,
    name = "derive",
    description = "derives the configured owner's token account, or a PDA from explicit seeds"
)]
pub(crate) struct SubcDerive {
    #[argh(option, description = "program owning the address (base58)")]
    pub(crate) program: Option<String>,

    /// Hex with a `0x` prefix, a UTF-8 string otherwise.
    #[argh(option, short = 's', description = "seed, repeatable (0x-prefixed hex or text)")]
    pub(crate) seed: Vec<String>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(
    subcommand,
    name = "query",
    description = "queries the mock proxy and prints the signed response as JSON"
)]
pub(crate) struct SubcQuery {
    #[argh(option, description = "write the response to a file instead of stdout")]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(
    subcommand,
    name = "check",
    description = "runs the full ownership check and prints the verified result"
)]
pub(crate) struct SubcCheck {
    #[argh(option, description = "verifier clock in unix seconds (default: system time)")]
    pub(crate) now: Option<u64>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(
    subcommand,
    name = "decode",
    description = "decodes a signed response JSON file"
)]
pub(crate) struct SubcDecode {
    #[argh(positional, description = "signed response path")]
    pub(crate) path: PathBuf,
}
