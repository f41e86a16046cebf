use sha2::{Digest, Sha256};

pub fn sha256_hex_str(s: &str) -> String {
    sha256_hex(s.as_bytes())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
