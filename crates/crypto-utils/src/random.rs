use rand::RngCore;
use rand_core::OsRng;

/// Length in bytes of the identifiers produced by [`random_id`].
pub const ID_BYTES: usize = 16;

/// Generates `len` cryptographically secure random bytes.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Generates a fixed-size array of cryptographically secure random bytes.
///
/// Used for single-use Ed25519 seeds, so callers are expected to zeroize the
/// result once the key has been constructed.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Generates an opaque, lowercase-hex identifier (128 bits of entropy).
pub fn random_id() -> String {
    hex::encode(random_bytes_fixed::<ID_BYTES>())
}
