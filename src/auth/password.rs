use thiserror::Error;

/// Cheapest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

/// Hashing failed: invalid cost, a plaintext longer than bcrypt's 72-byte input
/// (terminator included), or an exhausted randomness source.
#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// PasswordHasher
///
/// One-way bcrypt transform for admin passwords. Every call to [`PasswordHasher::hash`]
/// draws a fresh salt, so hashing the same plaintext twice yields two different strings.
/// The salt and cost are embedded in the output, which is all [`PasswordHasher::verify`] needs.
///
/// Plaintexts are never truncated: input bcrypt cannot hold in full is rejected on hash and
/// never verifies.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Builds a hasher with an explicit bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::non_truncating_hash(plaintext, self.cost)?)
    }

    /// Returns true iff `plaintext` reproduces `hash`.
    ///
    /// A structurally invalid hash yields `false`, indistinguishable from a wrong password.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::non_truncating_verify(plaintext, hash).unwrap_or(false)
    }

    /// Spends the same work as [`PasswordHasher::verify`] and always returns `false`.
    /// Used when there is no stored hash to compare against.
    pub fn verify_missing(&self, plaintext: &str) -> bool {
        let _ = self.hash(plaintext);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(MIN_COST)
    }

    #[test]
    fn hash_then_verify_accepts_the_same_plaintext() {
        let hasher = hasher();
        let hash = hasher.hash("77290").unwrap();
        assert_ne!(hash, "77290");
        assert!(hasher.verify("77290", &hash));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = hasher();
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("correct horse", &first));
        assert!(hasher.verify("correct horse", &second));
    }

    #[test]
    fn different_plaintext_is_rejected() {
        let hasher = hasher();
        for (p, q) in [("77290", "77291"), ("", "x"), ("admin", "Admin"), ("pässword", "password")] {
            let hash = hasher.hash(q).unwrap();
            assert!(!hasher.verify(p, &hash), "{p:?} must not verify against hash of {q:?}");
        }
    }

    #[test]
    fn malformed_hash_returns_false_instead_of_erroring() {
        let hasher = hasher();
        assert!(!hasher.verify("77290", ""));
        assert!(!hasher.verify("77290", "not-a-bcrypt-hash"));
        assert!(!hasher.verify("77290", "$2b$04$tooshort"));
    }

    #[test]
    fn long_plaintexts_sharing_a_prefix_do_not_collide() {
        let hasher = hasher();
        let prefix = "a".repeat(72);
        let stored = format!("{prefix}correct");
        let attempt = format!("{prefix}WRONG");

        assert!(hasher.hash(&stored).is_err());

        let hash_of_prefix = hasher.hash(&"a".repeat(71)).unwrap();
        assert!(hasher.verify(&"a".repeat(71), &hash_of_prefix));
        assert!(!hasher.verify(&attempt, &hash_of_prefix));
        assert!(!hasher.verify(&format!("{}b", "a".repeat(71)), &hash_of_prefix));
    }

    #[test]
    fn verify_missing_never_accepts() {
        let hasher = hasher();
        assert!(!hasher.verify_missing("77290"));
        assert!(!hasher.verify_missing(""));
    }

    #[test]
    fn invalid_cost_surfaces_as_error() {
        let hasher = PasswordHasher::with_cost(99);
        assert!(hasher.hash("whatever").is_err());
    }
}
