//! Property-based tests for report-data binding
//!
//! These tests use proptest to verify:
//! - Determinism (same challenge and fingerprint always produce the same data)
//! - Acceptance of honestly constructed report data
//! - Tamper sensitivity (any single-bit flip is rejected)

use attestify_core::BindingError;
use attestify_runtime::tee::{provider_report_data, ReportData, REPORT_DATA_SIZE};
use attestify_runtime::BindingVerifier;
use base64::Engine;
use proptest::prelude::*;

fn b64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn fingerprint_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<u8>(), 32).prop_map(hex::encode)
}

/// Flip one bit of a hex string's underlying bytes, keeping it valid hex.
fn flip_hex(fingerprint: &str, bit: usize) -> String {
    let mut bytes = hex::decode(fingerprint).unwrap();
    let bit = bit % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

proptest! {
    /// GenerateEvidence report data is a pure function of its inputs
    #[test]
    fn test_provider_report_data_deterministic(
        challenge in ".{0,128}",
        fingerprint in fingerprint_strategy(),
    ) {
        let a = provider_report_data(challenge.as_bytes(), &fingerprint);
        let b = provider_report_data(challenge.as_bytes(), &fingerprint);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), 64);
    }

    /// Honestly constructed report data always verifies
    #[test]
    fn test_honest_report_data_accepted(
        challenge in proptest::collection::vec(any::<u8>(), 0..96),
        fingerprint in fingerprint_strategy(),
    ) {
        let verifier = BindingVerifier::new();
        let reported = ReportData::bind(&challenge, &fingerprint).to_base64();
        prop_assert!(verifier.verify_tls_bound(&b64(&challenge), &fingerprint, &reported).is_ok());
    }

    /// Flipping any bit of the reported data is rejected
    #[test]
    fn test_reported_data_bit_flip_rejected(
        challenge in proptest::collection::vec(any::<u8>(), 32..64),
        fingerprint in fingerprint_strategy(),
        bit in 0usize..(REPORT_DATA_SIZE * 8),
    ) {
        let verifier = BindingVerifier::new();
        let mut reported = *ReportData::bind(&challenge, &fingerprint).as_bytes();
        reported[bit / 8] ^= 1 << (bit % 8);

        let result = verifier.verify_tls_bound(&b64(&challenge), &fingerprint, &b64(&reported));
        prop_assert!(matches!(result, Err(BindingError::BindingVerification)));
    }

    /// Flipping any bit of the challenge is rejected
    #[test]
    fn test_challenge_bit_flip_rejected(
        challenge in proptest::collection::vec(any::<u8>(), 1..64),
        fingerprint in fingerprint_strategy(),
        bit in any::<usize>(),
    ) {
        let verifier = BindingVerifier::new();
        let reported = ReportData::bind(&challenge, &fingerprint).to_base64();

        let mut tampered = challenge.clone();
        let bit = bit % (tampered.len() * 8);
        tampered[bit / 8] ^= 1 << (bit % 8);

        let result = verifier.verify_tls_bound(&b64(&tampered), &fingerprint, &reported);
        prop_assert!(matches!(result, Err(BindingError::BindingVerification)));
    }

    /// Flipping any bit of the claimed fingerprint is rejected
    #[test]
    fn test_fingerprint_bit_flip_rejected(
        challenge in proptest::collection::vec(any::<u8>(), 0..64),
        fingerprint in fingerprint_strategy(),
        bit in any::<usize>(),
    ) {
        let verifier = BindingVerifier::new();
        let reported = ReportData::bind(&challenge, &fingerprint).to_base64();
        let tampered = flip_hex(&fingerprint, bit);

        let result = verifier.verify_tls_bound(&b64(&challenge), &tampered, &reported);
        prop_assert!(matches!(result, Err(BindingError::BindingVerification)));
    }

    /// The embedded challenge fragment is exactly the available prefix
    #[test]
    fn test_challenge_prefix_exact(
        challenge in proptest::collection::vec(any::<u8>(), 0..64),
        fingerprint in fingerprint_strategy(),
    ) {
        let data = ReportData::bind(&challenge, &fingerprint);
        let n = challenge.len().min(32);
        prop_assert_eq!(data.challenge_prefix(), &challenge[..n]);
        prop_assert_eq!(data.is_short_challenge(), challenge.len() < 32);
    }
}
