//! Password hashing for user credentials.
//!
//! bcrypt with a configurable cost factor; the encoded hash carries its own
//! salt and cost, so verification needs no side channel. The `*_async`
//! wrappers run the CPU-bound work on the blocking worker pool so it cannot
//! stall request handling.

use crate::errors::{Error, Result};

/// Hash a plaintext password with the given bcrypt cost factor.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost)
        .map_err(|err| Error::internal(format!("Failed to hash password: {}", err)))
}

/// Verify a plaintext password against a stored bcrypt hash.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(plaintext, hash)
        .map_err(|err| Error::internal(format!("Failed to verify password: {}", err)))
}

/// Hash on the blocking worker pool.
pub async fn hash_password_async(plaintext: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext, cost))
        .await
        .map_err(|err| Error::internal(format!("Password hashing task failed: {}", err)))?
}

/// Verify on the blocking worker pool.
pub async fn verify_password_async(plaintext: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
        .await
        .map_err(|err| Error::internal(format!("Password verification task failed: {}", err)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps these tests fast; production cost comes from config.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple", TEST_COST).unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input", TEST_COST).unwrap();
        let b = hash_password("same input", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test]
    async fn async_wrappers_round_trip() {
        let hash = hash_password_async("pw-offloaded".to_string(), TEST_COST).await.unwrap();
        assert!(verify_password_async("pw-offloaded".to_string(), hash).await.unwrap());
    }
}
