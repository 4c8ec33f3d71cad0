//! Operator tool for cross-chain token account ownership checks.
//!
//! # Warning
//!
//! The query proxy is a local mock that serves accounts from a JSON fixture
//! and signs with keys read from the config. It is meant for development
//! networks only.

mod args;
mod cmd;
mod context;
mod errors;

use std::process;

use args::Args;
use cmd::exec_subc;

fn main() {
    let args: Args = argh::from_env();
    let inner = || -> anyhow::Result<()> {
        let ctx = context::CmdContext::from_args(&args)?;
        exec_subc(args.subc, &ctx)?;
        Ok(())
    };
    if let Err(e) = inner() {
        eprintln!("ERROR\n{e:?}");
        process::exit(1);
    }
}
