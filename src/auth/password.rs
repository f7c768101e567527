use bcrypt::{DEFAULT_COST, hash, verify};

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verifies a candidate password against a stored hash. Any bcrypt error
/// reads as a failed match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the test fast; the handler path uses DEFAULT_COST.
    #[test]
    fn verify_accepts_matching_password() {
        let stored = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &stored));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let stored = bcrypt::hash("hunter2", 4).unwrap();
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
