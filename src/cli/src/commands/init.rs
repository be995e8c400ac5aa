//! `attestify init` command — Generate and persist the provider identity.

use clap::Args;

use super::{open_provider, IdentityArgs};

#[derive(Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,
}

pub fn execute(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider = open_provider(&args.identity)?;
    provider.initialize()?;

    let identity = provider.identity()?;
    println!("{}", identity.fingerprint());
    eprintln!("Certificate valid until {}", identity.not_after());
    Ok(())
}
