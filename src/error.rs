use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Erreurs métier remontées par les services
#[derive(Debug, Error)]
pub enum AppError {
    /// Formulaire invalide (400), erreurs par champ
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Nom d'utilisateur / email déjà pris (409)
    #[error("{0}")]
    Duplicate(String),

    /// Email ou mot de passe incorrect (401)
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Valeur refusée, ex. statut de commande inconnu (400)
    #[error("{0}")]
    InvalidInput(String),

    /// Opération impossible dans l'état actuel, ex. supprimer un produit déjà commandé (409)
    #[error("{0}")]
    Conflict(String),

    /// Fichier image refusé (400)
    #[error("{0}")]
    Upload(String),

    /// Ex. pas de compte admin pour la messagerie (503)
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Duplicate(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Ne pas exposer le détail des erreurs internes
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal Server Error");
            "Internal server error".to_string()
        } else if status == StatusCode::NOT_FOUND {
            "Page not found".to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({
            "error": message,
            "status": status.as_u16(),
        });
        if let AppError::Validation(errors) = self {
            body["fields"] = json!(errors);
        }

        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("product 3".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Duplicate("taken".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::ServiceUnavailable("no admin".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = AppError::Internal("secret path /var/db".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
