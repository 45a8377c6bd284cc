use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Argon2Config;

/// Argon2id password hasher
///
/// Produces salted PHC strings (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`)
/// with the work factor taken from [`Argon2Config`]. Verification reads the
/// algorithm and parameters back out of the stored string, so `argon2i` and
/// `argon2d` rows hashed elsewhere verify as well.
///
/// Hashing is deliberately slow. Call it from `web::block`, never directly on
/// a request worker.
///
/// # Example
/// ```no_run
/// use sqlshield::config::Argon2Config;
/// use sqlshield::security::PasswordHasher;
///
/// let hasher = PasswordHasher::from_config(&Argon2Config::default()).unwrap();
/// let hash = hasher.hash("my_secure_password").unwrap();
///
/// assert!(hasher.verify("my_secure_password", &hash).unwrap());
/// ```
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy: String,
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    /// Build a hasher from the configured Argon2 parameters
    ///
    /// # Errors
    /// Returns an error if the parameters are rejected by Argon2
    /// (for example memory cost below `8 * parallelism`).
    #[tracing::instrument(skip(config))]
    pub fn from_config(config: &Argon2Config) -> Result<Self, argon2::password_hash::Error> {
        let params = Params::new(
            config.memory_cost,
            config.time_cost,
            config.parallelism,
            Some(config.hash_length as usize),
        )?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        // Verified against when the username does not exist
        let salt = SaltString::generate(&mut OsRng);
        let dummy = argon2
            .hash_password(b"sqlshield-dummy-password", &salt)?
            .to_string();

        Ok(Self {
            argon2,
            dummy,
            verifications: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Hash a password into a PHC string with a fresh random salt
    #[tracing::instrument(skip(self, password))]
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a PHC string
    ///
    /// * `Ok(true)` - password matches
    /// * `Ok(false)` - password does not match
    /// * `Err(_)` - `hash` is not a valid PHC string
    #[tracing::instrument(skip(self, password, hash))]
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        self.verifications.fetch_add(1, Ordering::Relaxed);
        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Spend the same work as a real verification and discard the result.
    /// Keeps "no such user" as slow as "wrong password".
    #[tracing::instrument(skip(self, password))]
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy);
    }

    /// Argon2 verifications run by this hasher and its clones, dummy ones included
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::Relaxed)
    }
}

/// Hash families recognized in the `password` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Argon2id,
    Argon2i,
    Argon2d,
    /// `$2a$`, `$2b$` and `$2y$` digests written by bcrypt-based registrations
    Bcrypt,
}

impl HashAlgorithm {
    const PREFIXES: [(&'static str, HashAlgorithm); 6] = [
        ("$argon2id$", HashAlgorithm::Argon2id),
        ("$argon2i$", HashAlgorithm::Argon2i),
        ("$argon2d$", HashAlgorithm::Argon2d),
        ("$2a$", HashAlgorithm::Bcrypt),
        ("$2b$", HashAlgorithm::Bcrypt),
        ("$2y$", HashAlgorithm::Bcrypt),
    ];

    fn detect(value: &str) -> Option<Self> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| value.starts_with(prefix))
            .map(|(_, algorithm)| *algorithm)
    }
}

/// The `password` column, classified
#[derive(Clone, PartialEq, Eq)]
pub enum StoredPassword {
    Hashed {
        algorithm: HashAlgorithm,
        digest: String,
    },
    /// Plaintext left over from before hashing was introduced. Deprecated.
    Legacy(String),
}

impl std::fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoredPassword::Hashed { algorithm, .. } => f
                .debug_struct("Hashed")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            StoredPassword::Legacy(_) => f.write_str("Legacy([redacted])"),
        }
    }
}

impl StoredPassword {
    pub fn parse(value: &str) -> Self {
        match HashAlgorithm::detect(value) {
            Some(algorithm) => StoredPassword::Hashed {
                algorithm,
                digest: value.to_string(),
            },
            None => StoredPassword::Legacy(value.to_string()),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredPassword::Legacy(_))
    }

    /// Check `candidate` against the stored value with the matching algorithm.
    /// Malformed digests and disabled variants fail closed.
    ///
    /// Every path that does not run a real slow hash runs the dummy Argon2
    /// verification instead, so a wrong password costs the same whatever the
    /// stored variant.
    pub fn verify(&self, hasher: &PasswordHasher, candidate: &str, allow_legacy: bool) -> bool {
        match self {
            StoredPassword::Hashed {
                algorithm: HashAlgorithm::Bcrypt,
                digest,
            } => match bcrypt::verify(candidate, digest) {
                Ok(matched) => matched,
                Err(e) => {
                    hasher.verify_dummy(candidate);
                    tracing::error!(error = %e, "Stored bcrypt hash is malformed");
                    false
                }
            },
            StoredPassword::Hashed { digest, .. } => match hasher.verify(candidate, digest) {
                Ok(matched) => matched,
                Err(e) => {
                    hasher.verify_dummy(candidate);
                    tracing::error!(error = %e, "Stored password hash is malformed");
                    false
                }
            },
            StoredPassword::Legacy(_) if !allow_legacy => {
                hasher.verify_dummy(candidate);
                tracing::warn!("Legacy plaintext password rejected, legacy verification disabled");
                false
            }
            StoredPassword::Legacy(plaintext) => {
                hasher.verify_dummy(candidate);
                let matched = constant_time_eq(plaintext.as_bytes(), candidate.as_bytes());
                if matched {
                    tracing::warn!("Login matched a legacy plaintext password; rehash this account");
                }
                matched
            }
        }
    }
}

/// Equality whose running time depends only on the lengths of the inputs
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
