mod common;

use common::read_fixture;
use ecclab::fletcher::{BlockSize, FletcherConfig};
use ecclab::hamming::decode_report;
use ecclab::{Algorithm, DecodeResult, Diagnostic, Status};
use test_case::test_case;

fn fletcher(block_size: BlockSize) -> Algorithm {
    Algorithm::Fletcher(FletcherConfig::new(block_size))
}

#[test_case(Algorithm::Crc32, "crc32/hola_ok.txt", "hola")]
#[test_case(fletcher(BlockSize::Bits16), "fletcher/abcd_fletcher16.txt", "abcd")]
#[test_case(Algorithm::Fletcher16, "fletcher/abcde_fletcher8.txt", "abcde")]
#[test_case(fletcher(BlockSize::Bits8), "fletcher/abcde_fletcher8.txt", "abcde")]
#[test_case(Algorithm::Hamming, "hamming/hola_ok.txt", "Hola")]
fn clean_fixture_is_ok(alg: Algorithm, fixture: &str, expected: &str) {
    let zult = alg.decode(&read_fixture(fixture));
    assert_eq!(zult.status(), Status::Ok, "{fixture}: {zult:?}");
    assert_eq!(zult.payload().unwrap().to_ascii(), expected);
}

#[test_case(Algorithm::Crc32, "crc32/hola_err.txt")]
#[test_case(fletcher(BlockSize::Bits16), "fletcher/abcd_fletcher16_err.txt")]
fn corrupted_fixture_is_detected(alg: Algorithm, fixture: &str) {
    let zult = alg.decode(&read_fixture(fixture));
    assert_eq!(zult.status(), Status::Error);
    assert!(matches!(
        zult.diagnostic(),
        Some(Diagnostic::CrcMismatch { .. } | Diagnostic::FletcherMismatch { .. })
    ));
}

#[test]
fn fletcher_block_size_must_match_frame() {
    // a 16-bit block frame checked as 32-bit blocks fails its check
    let frame = read_fixture("fletcher/abcd_fletcher16.txt");
    assert_eq!(fletcher(BlockSize::Bits32).decode(&frame).status(), Status::Error);
}

#[test]
fn hamming_single_error_fixture() {
    let zult = decode_report(&read_fixture("hamming/hola_err1.txt"));
    assert_eq!(zult.n, 38);
    assert_eq!(zult.r, 6);
    match zult.result {
        DecodeResult::Fix {
            position,
            payload,
            corrected,
        } => {
            assert_eq!(position, 13);
            assert_eq!(payload.to_ascii(), "Hola");
            assert_eq!(corrected, read_fixture("hamming/hola_ok.txt"));
        }
        other => panic!("expected Fix, got {other:?}"),
    }
}

#[test]
fn hamming_double_error_fixture_is_miscorrected() {
    // positions 13 and 21 => syndrome 24, which names a valid position
    let zult = decode_report(&read_fixture("hamming/hola_err2.txt"));
    assert_eq!(zult.syndrome, 24);
    assert_eq!(zult.result.status(), Status::Fix);
    assert_ne!(zult.result.payload().unwrap().to_ascii(), "Hola");
}

#[test]
fn hamming_out_of_range_fixture_drops() {
    // positions 7 and 32 => syndrome 39 > 38
    let zult = decode_report(&read_fixture("hamming/hola_drop.txt"));
    assert_eq!(zult.syndrome, 39);
    assert_eq!(zult.result.status(), Status::Drop);
    assert_eq!(zult.result.payload().unwrap().len(), 32);
}
