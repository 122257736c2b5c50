//! Password hashing and session tokens

use anyhow::Result;

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use std::time::SystemTime;

use super::ArtistId;

const SESSION_TOKEN_LENGTH: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct SessionTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SessionToken {
    pub artist_id: ArtistId,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
    pub value: SessionTokenValue,
}

impl SessionTokenValue {
    pub fn generate() -> SessionTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        SessionTokenValue(random_string)
    }
}

impl SessionToken {
    pub fn new(artist_id: ArtistId) -> SessionToken {
        SessionToken {
            artist_id,
            created: SystemTime::now(),
            last_used: None,
            value: SessionTokenValue::generate(),
        }
    }
}

mod streaming_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    #[cfg(not(feature = "test-fast-hasher"))]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }

    #[cfg(feature = "test-fast-hasher")]
    fn argon2() -> Argon2<'static> {
        match argon2::Params::new(8, 1, 1, None) {
            Ok(params) => Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
            Err(_) => Argon2::default(),
        }
    }

    /// Returns a PHC string, salt and params included.
    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = argon2()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        // Params are read back from the PHC string, not from `argon2()`.
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

pub fn hash_password<T: AsRef<str>>(plain: T) -> Result<String> {
    streaming_argon2::hash(plain.as_ref().as_bytes())
}

pub fn verify_password<P: AsRef<str>, H: AsRef<str>>(plain: P, target_hash: H) -> Result<bool> {
    streaming_argon2::verify(plain.as_ref().as_bytes(), target_hash)
}
