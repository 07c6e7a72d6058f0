use rstest::rstest;

use super::*;

#[test]
fn calculate_numeric_hash_test() {
    assert_eq!(calculate_numeric_hash(b"config"), calculate_numeric_hash(b"config"));
    assert_ne!(calculate_numeric_hash(b"config"), calculate_numeric_hash(b"config2"));
    assert!(calculate_numeric_hash(b"config") < 2f64.powi(53));
}

#[rstest]
#[case(b"", 0xcbf2_9ce4_8422_2325)]
#[case(b"a", 0xaf63_dc4c_8601_ec8c)]
fn fnv1a_64_test(#[case] data: &[u8], #[case] expected: u64) {
    assert_eq!(expected, fnv1a_64(data));
}

#[test]
fn jump_hash_bounds_test() {
    assert_eq!(0, jump_hash(12_345, 0));
    for key in 0..1_000u64 {
        assert_eq!(0, jump_hash(key, 1));
        assert!(jump_hash(fnv1a_64(&key.to_le_bytes()), 7) < 7);
    }
}

#[test]
fn jump_hash_moves_keys_only_to_new_bucket_test() {
    for key in 0..1_000u64 {
        let key = fnv1a_64(&key.to_le_bytes());
        for buckets in 1..20 {
            let before = jump_hash(key, buckets);
            let after = jump_hash(key, buckets + 1);
            assert!(after == before || after == buckets);
        }
    }
}
