//! `attestify challenge` command — Generate a random base64 challenge.

use base64::Engine;
use clap::Args;

/// Default challenge size; fills the 32-byte challenge half of the report data.
const DEFAULT_CHALLENGE_BYTES: usize = 32;

#[derive(Args)]
pub struct ChallengeArgs {
    /// Number of random bytes before encoding
    #[arg(long, default_value_t = DEFAULT_CHALLENGE_BYTES)]
    pub bytes: usize,
}

pub fn execute(args: ChallengeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.bytes == 0 {
        return Err("Challenge must be at least one byte".into());
    }
    if args.bytes < DEFAULT_CHALLENGE_BYTES {
        tracing::warn!(
            bytes = args.bytes,
            "Challenges shorter than 32 bytes only partially fill the report data"
        );
    }
    println!("{}", generate_challenge(args.bytes));
    Ok(())
}

/// Random challenge of `len` bytes, standard base64 encoded.
fn generate_challenge(len: usize) -> String {
    use rand::RngCore;

    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
