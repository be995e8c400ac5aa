//! `attestify fingerprint` command — Re-derive a certificate fingerprint.

use std::path::PathBuf;

use clap::Args;

use attestify_runtime::tee::fingerprint_pem;

#[derive(Args)]
pub struct FingerprintArgs {
    /// Path to a PEM-encoded certificate (e.g. the persisted cert.pem)
    pub certificate: PathBuf,
}

pub fn execute(args: FingerprintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pem = std::fs::read_to_string(&args.certificate).map_err(|e| {
        format!(
            "Failed to read certificate {}: {}",
            args.certificate.display(),
            e
        )
    })?;
    println!("{}", fingerprint_pem(&pem)?);
    Ok(())
}
