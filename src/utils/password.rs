use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD}};

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;

/// Hash un mot de passe au format Werkzeug (compatible avec les comptes de l'ancienne boutique)
/// Utilise PBKDF2-HMAC-SHA256 avec 260000 itérations et un salt de 16 bytes
pub fn hash_password(password: &str) -> Result<String, String> {
    hash_password_with_iterations(password, ITERATIONS)
}

pub fn hash_password_with_iterations(password: &str, iterations: u32) -> Result<String, String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);

    let key = derive_key(password, &salt, iterations, KEY_LENGTH)?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    // Format: pbkdf2:sha256:iterations$salt$hash
    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash Werkzeug
/// Supporte les formats: base64 (nouveau) et hex (ancien Python)
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err("Invalid hash format".to_string());
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err("Invalid header".to_string());
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    // Werkzeug utilise le salt tel quel (texte), les anciens hashs Rust le salt décodé
    let expected_hash = decode_flexible(parts[2])?;

    if let Ok(salt) = decode_flexible(parts[1]) {
        let computed = derive_key(password, &salt, iterations, expected_hash.len())?;
        if constant_time_eq(&computed, &expected_hash) {
            return Ok(true);
        }
    }

    let computed_raw_salt = derive_key(password, parts[1].as_bytes(), iterations, expected_hash.len())?;
    Ok(constant_time_eq(&computed_raw_salt, &expected_hash))
}

fn derive_key(password: &str, salt: &[u8], iterations: u32, len: usize) -> Result<Vec<u8>, String> {
    let mut key = vec![0u8; len];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;
    Ok(key)
}

// Comparaison sans sortie anticipée (timing attacks)
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Décode une chaîne encodée en base64 ou hexadécimal
fn decode_flexible(input: &str) -> Result<Vec<u8>, String> {
    // Format hexadécimal (64 caractères = 32 bytes)
    if input.len() == 64 && input.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(input)
            .map_err(|e| format!("Hex decode failed: {}", e));
    }

    let padded = add_base64_padding(input);

    if let Ok(decoded) = STANDARD.decode(&padded) {
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE.decode(&padded) {
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(input) {
        return Ok(decoded);
    }
    if let Ok(decoded) = STANDARD_NO_PAD.decode(input) {
        return Ok(decoded);
    }

    hex::decode(input)
        .map_err(|_| "Failed to decode".to_string())
}

/// Ajoute le padding '=' manquant pour base64
fn add_base64_padding(input: &str) -> String {
    let padding_needed = (4 - (input.len() % 4)) % 4;
    format!("{}{}", input, "=".repeat(padding_needed))
}
