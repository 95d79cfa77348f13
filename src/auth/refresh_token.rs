/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from a cryptographically secure
/// source, hex-encoded. No structure and no embedded claims, so possession
/// of the session store is required to learn anything about a token's owner
/// or validity.

use rand::{thread_rng, Rng};

/// Generate a new opaque refresh token (64 lowercase-hex characters).
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = generate_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_no_collisions_in_large_sample() {
        let tokens: HashSet<String> = (0..10_000).map(|_| generate_refresh_token()).collect();

        assert_eq!(tokens.len(), 10_000);
    }
}
