use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

/// Contenu du cookie de session signé
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub username: String,
    pub is_admin: bool,
    pub exp: i64,        // expiration timestamp
}

/// Génère le token de session d'un utilisateur
pub fn generate_token(
    secret: &str,
    user_id: i32,
    username: &str,
    is_admin: bool,
    valid_hours: i64,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(valid_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        is_admin,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un token de session
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}
