use sha1::{Digest, Sha1};

pub fn sha1_hex_str(s: &str) -> String {
    sha1_hex(s.as_bytes())
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
