use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::dto::ProductForm;
use crate::models::{order_item, product};
use crate::services::image_store::ImageStore;
use crate::utils::filename::{allowed_file, secure_filename};

pub const INVALID_IMAGE_MESSAGE: &str =
    "Invalid image file or no file uploaded. Please upload a PNG, JPG, JPEG, or GIF.";
pub const INVALID_REPLACEMENT_IMAGE_MESSAGE: &str =
    "Invalid image file. Please upload a PNG, JPG, JPEG, or GIF.";

/// Fichier image reçu du formulaire produit
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Nom sûr et unique à stocker, None si l'extension n'est pas autorisée
    /// Le préfixe aléatoire évite que deux produits partagent "ring.png"
    fn stored_name(&self) -> Option<String> {
        if !allowed_file(&self.file_name) {
            return None;
        }
        let name = secure_filename(&self.file_name);
        // Le nettoyage peut manger l'extension ("..png")
        if !allowed_file(&name) {
            return None;
        }
        Some(format!("{:08x}_{}", rand::random::<u32>(), name))
    }
}

pub struct ProductService;

impl ProductService {
    pub async fn find(db: &DatabaseConnection, product_id: i32) -> AppResult<product::Model> {
        product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))
    }

    /// Vrai si un autre produit référence encore ce fichier image
    async fn image_shared(
        db: &DatabaseConnection,
        filename: &str,
        product_id: i32,
    ) -> Result<bool, DbErr> {
        let others = product::Entity::find()
            .filter(product::Column::ImageFilename.eq(filename))
            .filter(product::Column::Id.ne(product_id))
            .count(db)
            .await?;
        Ok(others > 0)
    }

    /// Tous les produits triés par nom (back-office)
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<product::Model>, DbErr> {
        product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
    }

    /// Crée un produit, l'image est obligatoire
    pub async fn create(
        db: &DatabaseConnection,
        images: &dyn ImageStore,
        form: ProductForm,
        image: Option<ImageUpload>,
    ) -> AppResult<product::Model> {
        let (filename, data) = match image {
            Some(upload) => match upload.stored_name() {
                Some(name) => (name, upload.data),
                None => return Err(AppError::Upload(INVALID_IMAGE_MESSAGE.to_string())),
            },
            None => return Err(AppError::Upload(INVALID_IMAGE_MESSAGE.to_string())),
        };

        images.save(&filename, &data).await?;

        let new_product = product::ActiveModel {
            name: Set(form.name.trim().to_string()),
            category: Set(form.category),
            material: Set(form.material.trim().to_string()),
            price: Set(form.price),
            description: Set(form.description),
            image_filename: Set(Some(filename)),
            date_added: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let product = new_product.insert(db).await?;

        tracing::info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Met à jour un produit
    /// Une nouvelle image valide remplace l'ancienne (fichier supprimé),
    /// une image invalide est refusée et rien n'est modifié
    pub async fn update(
        db: &DatabaseConnection,
        images: &dyn ImageStore,
        product_id: i32,
        form: ProductForm,
        image: Option<ImageUpload>,
    ) -> AppResult<product::Model> {
        let existing = Self::find(db, product_id).await?;

        let new_image = match image {
            Some(upload) => match upload.stored_name() {
                Some(name) => Some((name, upload.data)),
                None => {
                    return Err(AppError::Upload(INVALID_REPLACEMENT_IMAGE_MESSAGE.to_string()))
                }
            },
            None => None,
        };

        let old_filename = existing.image_filename.clone();
        let mut active_product: product::ActiveModel = existing.into();
        active_product.name = Set(form.name.trim().to_string());
        active_product.category = Set(form.category);
        active_product.material = Set(form.material.trim().to_string());
        active_product.price = Set(form.price);
        active_product.description = Set(form.description);

        if let Some((filename, data)) = &new_image {
            images.save(filename, data).await?;
            active_product.image_filename = Set(Some(filename.clone()));
        }

        let updated = active_product.update(db).await?;

        if let (Some((new_name, _)), Some(old_name)) = (&new_image, old_filename) {
            if *new_name != old_name && !Self::image_shared(db, &old_name, product_id).await? {
                if let Err(e) = images.delete(&old_name).await {
                    tracing::warn!(product_id, file = %old_name, "Could not delete old image: {}", e);
                }
            }
        }

        tracing::info!(product_id, "Product updated");
        Ok(updated)
    }

    /// Supprime un produit et son image
    /// Refusé si le produit apparaît dans une commande (les lignes gardent leur référence)
    pub async fn delete(
        db: &DatabaseConnection,
        images: &dyn ImageStore,
        product_id: i32,
    ) -> AppResult<product::Model> {
        let product = Self::find(db, product_id).await?;

        let ordered = order_item::Entity::find()
            .filter(order_item::Column::ProductId.eq(product_id))
            .count(db)
            .await?;
        if ordered > 0 {
            return Err(AppError::Conflict(format!(
                "Product \"{}\" has been ordered and cannot be deleted.",
                product.name
            )));
        }

        if let Some(filename) = &product.image_filename {
            if Self::image_shared(db, filename, product_id).await? {
                tracing::debug!(product_id, file = %filename, "Image still used by another product");
            } else {
                images.delete(filename).await?;
            }
        }

        product::Entity::delete_by_id(product_id).exec(db).await?;

        tracing::info!(product_id, name = %product.name, "Product deleted");
        Ok(product)
    }
}
