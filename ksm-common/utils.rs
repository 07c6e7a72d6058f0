use sha1::{Digest, Sha1};

#[cfg(test)]
#[path = "./utils.tests.rs"]
mod utils_tests;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Returns the first 8 bytes of the SHA1 digest as a number, suitable for a gauge value.
pub fn calculate_numeric_hash(t: &[u8]) -> f64 {
    let mut hasher = Sha1::new();
    hasher.update(t);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);

    // f64 holds 53 bits of mantissa exactly
    (u64::from_be_bytes(bytes) >> 11) as f64
}

/// Computes 64-bit FNV-1a hash of the given bytes.
pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter()
        .fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

/// Maps `key` to one of the `buckets` using Lamping and Veach jump consistent hash.\
/// Returns `0` when `buckets` is `0`.
pub fn jump_hash(mut key: u64, buckets: u32) -> u32 {
    if buckets == 0 {
        return 0;
    }

    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < i64::from(buckets) {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }

    b as u32
}
