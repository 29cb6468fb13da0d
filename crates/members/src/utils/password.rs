//! Password hashing and verification utilities.
//!
//! New hashes are Argon2. Imported members may carry bcrypt hashes
//! (`$2a$`, `$2b$`, `$2y$`), which are still accepted for verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::{MemberError, MemberResult};

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> MemberResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MemberError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored Argon2 or bcrypt hash.
///
/// `Ok(false)` is a mismatch; `Err` means the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> MemberResult<bool> {
    if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
        return bcrypt::verify(password, hash).map_err(|e| MemberError::PasswordHash(e.to_string()));
    }

    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| MemberError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random alphanumeric password
pub fn generate_random_password(length: usize) -> String {
    use rand::{distributions::Alphanumeric, Rng};

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn verifies_imported_bcrypt_hashes() {
        let hash = bcrypt::hash("member123", 4).unwrap();
        assert!(verify_password("member123", &hash).unwrap());
        assert!(!verify_password("member124", &hash).unwrap());

        let legacy_prefix = hash.replacen("$2b$", "$2a$", 1);
        assert!(verify_password("member123", &legacy_prefix).unwrap());
    }

    #[test]
    fn unusable_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-hash").is_err());
    }

    #[test]
    fn test_random_password_generation() {
        let password1 = generate_random_password(16);
        let password2 = generate_random_password(16);

        assert_eq!(password1.len(), 16);
        assert!(password1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(password1, password2);
    }
}
