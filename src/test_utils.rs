// Helpers de test : une base SQLite jetable par test

use actix_web::cookie::Cookie;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::Config;
use crate::db;
use crate::models::{product, users};
use crate::services::image_store::LocalImageStore;
use crate::state::AppState;
use crate::utils::{jwt, password};

pub const TEST_SECRET: &str = "test-secret-key";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestDb {
    pub db: DatabaseConnection,
    pub dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_url = format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display());
        let db = db::establish_connection(&db_url).await.unwrap();
        db::init_schema(&db).await.unwrap();
        Self { db, dir }
    }

    pub fn state(&self) -> AppState {
        let upload_folder = self.dir.path().join("uploads");
        AppState {
            db: self.db.clone(),
            config: Config {
                database_url: String::new(),
                secret_key: TEST_SECRET.to_string(),
                session_hours: 1,
                upload_folder: upload_folder.clone(),
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
                admin_seed: None,
            },
            images: Arc::new(LocalImageStore::new(upload_folder).unwrap()),
        }
    }
}

pub async fn create_user(db: &DatabaseConnection, username: &str, is_admin: bool) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@shop.test", username)),
        password_hash: Set(password::hash_password_with_iterations(TEST_PASSWORD, 1000).unwrap()),
        is_admin: Set(is_admin),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    material: &str,
    price: Decimal,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_string()),
        category: Set(category.to_string()),
        material: Set(material.to_string()),
        price: Set(price),
        description: Set(format!("{} in {}", name, material)),
        image_filename: Set(None),
        date_added: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Cookie de session valide pour `user`
pub fn session_cookie(user: &users::Model) -> Cookie<'static> {
    let token = jwt::generate_token(TEST_SECRET, user.id, &user.username, user.is_admin, 1).unwrap();
    Cookie::new(crate::middleware::auth::SESSION_COOKIE_NAME, token)
}
