//pour les formulaires (validation) et les réponses structurées
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{order, product::CATEGORIES};

// DataRequired : un champ qui ne contient que des espaces est vide
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required.".into()));
    }
    Ok(())
}

fn valid_category(value: &str) -> Result<(), ValidationError> {
    if !CATEGORIES.contains(&value) {
        return Err(ValidationError::new("category").with_message("Not a valid choice.".into()));
    }
    Ok(())
}

fn positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::new(1, 2) {
        return Err(ValidationError::new("price").with_message("Price must be at least 0.01.".into()));
    }
    Ok(())
}

// DTO pour l'inscription (POST /signup)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 2, max = 20), custom(function = "not_blank"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Field must be equal to password."))]
    pub confirm_password: String,
}

// DTO pour la connexion (POST /login)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// DTO pour passer une commande (POST /product/{id})
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderForm {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub customer_name: String,
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub customer_address: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub customer_contact: String,
    #[validate(range(min = 1, max = 5))]
    pub quantity: i32,
}

// DTO pour un message (POST /messages, POST /admin/messages)
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub message_text: String,
}

// Champs texte du formulaire produit (l'image arrive à part)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "valid_category"))]
    pub category: String,
    #[validate(length(max = 50), custom(function = "not_blank"))]
    pub material: String,
    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
}

// DTO pour changer le statut d'une commande
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: Option<String>,
}

/// 1 ligne de commande avec le nom du produit
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub product_id: i32,
    pub product_name: Option<String>, // None si le produit n'existe plus
    pub quantity: i32,
    pub price_at_order: Decimal,
}

/// 1 commande avec ses lignes (profil et back-office)
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub customer_username: Option<String>,
    pub items: Vec<OrderItemView>,
}

/// Compteurs du tableau de bord admin
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_users: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> MessageForm {
        MessageForm { message_text: text.to_string() }
    }

    #[test]
    fn test_message_length_bounds() {
        assert!(message("").validate().is_err());
        assert!(message("   ").validate().is_err());
        assert!(message("a").validate().is_ok());
        assert!(message(&"a".repeat(500)).validate().is_ok());
        assert!(message(&"a".repeat(501)).validate().is_err());
        // Longueur en caractères, pas en octets
        assert!(message(&"é".repeat(500)).validate().is_ok());
    }

    #[test]
    fn test_register_form() {
        let form = RegisterForm {
            username: "alice".to_string(),
            email: "alice@shop.test".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        };
        assert!(form.validate().is_ok());

        let mismatch = RegisterForm { confirm_password: "other".to_string(), ..form };
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));

        let bad = RegisterForm {
            username: "a".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            confirm_password: "123".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_order_form_quantity() {
        let form = OrderForm {
            customer_name: "Alice".to_string(),
            customer_address: "1 rue des Lilas".to_string(),
            customer_contact: "0600000000".to_string(),
            quantity: 5,
        };
        assert!(form.validate().is_ok());
        assert!(OrderForm { quantity: 0, ..form.clone() }.validate().is_err());
        assert!(OrderForm { quantity: 6, ..form.clone() }.validate().is_err());
        assert!(OrderForm { customer_contact: "x".repeat(21), ..form }.validate().is_err());
    }

    #[test]
    fn test_product_form() {
        let form = ProductForm {
            name: "Sunrise Ring".to_string(),
            category: "Ring".to_string(),
            material: "Gold".to_string(),
            price: Decimal::new(12000, 2),
            description: "18k".to_string(),
        };
        assert!(form.validate().is_ok());
        assert!(ProductForm { category: "Watch".to_string(), ..form.clone() }.validate().is_err());
        assert!(ProductForm { price: Decimal::ZERO, ..form.clone() }.validate().is_err());
        assert!(ProductForm { price: Decimal::new(1, 2), ..form }.validate().is_ok());
    }
}
