use ccq_owner_check::derive;
use ccq_pda::SeedSet;
use ccq_primitives::Pubkey;

use crate::{args::SubcDerive, context::CmdContext, errors::InitError};

pub(super) fn exec_derive(subc: SubcDerive, ctx: &CmdContext) -> anyhow::Result<()> {
    let Some(program) = subc.program else {
        if !subc.seed.is_empty() {
            anyhow::bail!("--seed needs --program");
        }

        let params = ctx.params()?;
        let derived = derive(&params)?;
        println!("owner:         {}", params.owner);
        println!("mint:          {}", params.mint);
        println!("token program: {}", params.token_program);
        println!("account:       {}", derived.address);
        println!("bump:          {}", derived.bump);
        return Ok(());
    };

    let program: Pubkey = program.parse().map_err(InitError::from)?;
    let seeds = subc
        .seed
        .iter()
        .map(|s| parse_seed(s))
        .collect::<Result<Vec<_>, _>>()?;

    let derived = SeedSet::new(seeds)?.derive(&program)?;
    println!("address: {}", derived.address);
    println!("bump:    {}", derived.bump);
    Ok(())
}

/// `0x`-prefixed seeds are hex, anything else is taken as UTF-8 bytes.
fn parse_seed(seed: &str) -> Result<Vec<u8>, InitError> {
    match seed.strip_prefix("0x") {
        Some(h) => hex::decode(h).map_err(|_| InitError::InvalidSeed(seed.to_string())),
        None => Ok(seed.as_bytes().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("vault").unwrap(), b"vault".to_vec());
        assert_eq!(parse_seed("0x01ff").unwrap(), vec![0x01, 0xff]);
        assert_eq!(parse_seed("0x").unwrap(), Vec::<u8>::new());
        assert!(matches!(
            parse_seed("0xzz"),
            Err(InitError::InvalidSeed(s)) if s == "0xzz"
        ));
    }
}
