use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Itérations par défaut (quelques dizaines de ms par hash en release)
pub const DEFAULT_ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash un mot de passe au format `pbkdf2:sha256:iterations$salt$hash`
/// (PBKDF2-HMAC-SHA256, salt aléatoire de 16 bytes, base64 URL-safe sans padding)
pub fn hash_password(password: &str, iterations: u32) -> AppResult<String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|e| AppError::Password(e.to_string()))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash produit par `hash_password`.
/// Les itérations sont lues dans le hash, donc un changement de configuration
/// n'invalide pas les anciens mots de passe.
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(AppError::Password("Invalid hash format".to_string()));
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err(AppError::Password("Invalid hash header".to_string()));
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| AppError::Password("Invalid iterations".to_string()))?;

    let salt = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AppError::Password(format!("Salt decode failed: {}", e)))?;
    let expected = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|e| AppError::Password(format!("Hash decode failed: {}", e)))?;

    if expected.is_empty() {
        return Err(AppError::Password("Empty hash".to_string()));
    }

    let mut computed = vec![0u8; expected.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| AppError::Password(e.to_string()))?;

    Ok(computed[..].ct_eq(&expected[..]).into())
}
