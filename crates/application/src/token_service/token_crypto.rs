use classroom_core::{AppError, AppResult};

const TOKEN_ENTROPY_BYTES: usize = 16;

/// Generates a random token plaintext: 16 bytes from the OS RNG encoded as
/// unpadded RFC 4648 base32 (26 characters).
pub(crate) fn generate_plaintext() -> AppResult<String> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate token: {error}")))?;

    Ok(encode_plaintext(&bytes))
}

/// Computes the hex SHA-256 digest of a token plaintext for storage.
pub(crate) fn hash_token(plaintext: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

fn encode_plaintext(bytes: &[u8]) -> String {
    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, bytes)
}
