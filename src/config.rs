use std::env;
use std::path::PathBuf;

const DEV_SECRET_KEY: &str = "dev-insecure-secret-change-this";

/// Identifiants du compte admin fournis par l'opérateur
#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub session_hours: i64,
    pub upload_folder: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    /// Charge la configuration depuis l'environnement (.env compris)
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("SECRET_KEY not set, using development default (INSECURE)");
            DEV_SECRET_KEY.to_string()
        });

        let session_hours = match env::var("SESSION_HOURS") {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("Invalid SESSION_HOURS: {}", value))?,
            Err(_) => 24,
        };

        let server_port = match env::var("SERVER_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("Invalid SERVER_PORT: {}", value))?,
            Err(_) => 8080,
        };

        // Les trois variables ensemble, ou aucune
        let admin_seed = match (
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(AdminSeed { username, email, password }),
            (Err(_), Err(_), Err(_)) => None,
            _ => {
                return Err(
                    "ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
                );
            }
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:site.db?mode=rwc".to_string()),
            secret_key,
            session_hours,
            upload_folder: env::var("UPLOAD_FOLDER")
                .unwrap_or_else(|_| "static/product_images".to_string())
                .into(),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port,
            admin_seed,
        })
    }
}
