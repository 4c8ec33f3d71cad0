use std::fs;

use ccq_owner_check::{derive, query};
use tracing::info;

use crate::{args::SubcQuery, context::CmdContext};

pub(super) fn exec_query(subc: SubcQuery, ctx: &CmdContext) -> anyhow::Result<()> {
    let params = ctx.params()?;
    let proxy = ctx.proxy()?;

    let derived = derive(&params)?;
    let (signed, _) = query(&proxy, &params.request(), &derived)?;
    let json = serde_json::to_string_pretty(&signed)?;

    match subc.out {
        Some(path) => {
            fs::write(&path, json)?;
            info!(path = %path.display(), digest = %signed.digest(), "wrote signed response");
        }
        None => println!("{json}"),
    }
    Ok(())
}
