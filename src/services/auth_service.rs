use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::users;
use crate::utils::password;

pub struct AuthService;

impl AuthService {
    /// Crée un compte client (jamais admin)
    /// Refuse un username ou un email déjà utilisé, le compte existant n'est pas modifié
    pub async fn register(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        plain_password: &str,
    ) -> AppResult<users::Model> {
        if Self::username_taken(db, username).await? {
            return Err(AppError::Duplicate(
                "That username is taken. Please choose a different one.".to_string(),
            ));
        }
        if Self::email_taken(db, email).await? {
            return Err(AppError::Duplicate(
                "That email is taken. Please choose a different one.".to_string(),
            ));
        }

        let password_hash = password::hash_password(plain_password).map_err(AppError::Internal)?;

        let new_user = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            is_admin: Set(false),
            ..Default::default()
        };

        // La contrainte UNIQUE couvre deux inscriptions simultanées
        let user = new_user.insert(db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Duplicate("That username or email is taken.".to_string())
            }
            _ => AppError::Database(e),
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Vérifie email + mot de passe
    /// Même erreur pour un email inconnu et un mauvais mot de passe
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> AppResult<users::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let is_valid = password::verify_password(plain_password, &user.password_hash)
            .map_err(|e| {
                tracing::error!(user_id = user.id, "Unreadable password hash: {}", e);
                AppError::InvalidCredentials
            })?;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn username_taken(db: &DatabaseConnection, username: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    pub async fn email_taken(db: &DatabaseConnection, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))
    }

    /// Tous les comptes, triés par username (back-office)
    pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(db)
            .await
    }

    /// Le compte admin de référence (le premier créé)
    pub async fn find_admin(db: &DatabaseConnection) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::IsAdmin.eq(true))
            .order_by_asc(users::Column::Id)
            .one(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_user, TestDb, TEST_PASSWORD};

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let test_db = TestDb::new().await;
        let db = &test_db.db;

        let user = AuthService::register(db, "alice", "alice@shop.test", "secret123").await.unwrap();
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "secret123");

        let logged = AuthService::authenticate(db, "alice@shop.test", "secret123").await.unwrap();
        assert_eq!(logged.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let test_db = TestDb::new().await;
        let db = &test_db.db;
        let existing = create_user(db, "alice", false).await;

        let same_username = AuthService::register(db, "alice", "other@shop.test", "secret123").await;
        assert!(matches!(same_username, Err(AppError::Duplicate(_))));

        let same_email = AuthService::register(db, "bob", "alice@shop.test", "secret123").await;
        assert!(matches!(same_email, Err(AppError::Duplicate(_))));

        // Compte existant inchangé
        let reloaded = AuthService::find_user(db, existing.id).await.unwrap();
        assert_eq!(reloaded, existing);
        assert_eq!(AuthService::list_users(db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let test_db = TestDb::new().await;
        let db = &test_db.db;
        create_user(db, "alice", false).await;

        let wrong_password = AuthService::authenticate(db, "alice@shop.test", "nope").await;
        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));

        let unknown_email = AuthService::authenticate(db, "ghost@shop.test", TEST_PASSWORD).await;
        assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));

        assert!(AuthService::authenticate(db, "alice@shop.test", TEST_PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_admin() {
        let test_db = TestDb::new().await;
        let db = &test_db.db;
        assert!(AuthService::find_admin(db).await.unwrap().is_none());

        create_user(db, "alice", false).await;
        let admin = create_user(db, "boss", true).await;
        assert_eq!(AuthService::find_admin(db).await.unwrap().unwrap().id, admin.id);
    }
}
