pub mod sha1;
pub mod sha256;

pub use sha1::{sha1_hex, sha1_hex_str};
pub use sha256::{sha256_hex, sha256_hex_str};

/// Short digest used to embed binary identities (drawings, pictures) into
/// canonical paragraph text as structural tokens.
pub fn short_hash(bytes: &[u8]) -> String {
    sha1_hex(bytes)[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_eight_hex_chars() {
        let h = short_hash(b"image bytes");
        assert_eq!(h.len(), 8);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
