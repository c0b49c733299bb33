use rust_decimal::Decimal;
use sea_orm::*;
use sea_orm::sea_query::{Expr, Func};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::product;

/// Filtres du catalogue (query string de GET /products)
/// Un filtre absent ou vide n'impose aucune contrainte
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub material: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
}

// Un prix illisible ("", "abc") est ignoré plutôt que de rejeter la page
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

impl ProductFilters {
    /// Les champs vides du formulaire comptent comme absents
    pub fn normalized(self) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        Self {
            category: non_empty(self.category),
            material: non_empty(self.material),
            min_price: self.min_price,
            max_price: self.max_price,
            search: non_empty(self.search),
        }
    }
}

pub struct CatalogService;

impl CatalogService {
    /// Produits qui satisfont tous les filtres fournis, triés par nom
    pub async fn list_products(
        db: &DatabaseConnection,
        filters: &ProductFilters,
    ) -> Result<Vec<product::Model>, DbErr> {
        let mut query = product::Entity::find();

        if let Some(category) = &filters.category {
            query = query.filter(product::Column::Category.eq(category.as_str()));
        }
        if let Some(material) = &filters.material {
            query = query.filter(product::Column::Material.eq(material.as_str()));
        }
        if let Some(min_price) = filters.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filters.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }
        if let Some(search) = &filters.search {
            // Sous-chaîne insensible à la casse sur nom / description / catégorie / matière
            let pattern = format!("%{}%", search.to_lowercase());
            let mut any_field = Condition::any();
            for column in [
                product::Column::Name,
                product::Column::Description,
                product::Column::Category,
                product::Column::Material,
            ] {
                any_field = any_field.add(
                    Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()),
                );
            }
            query = query.filter(any_field);
        }

        query
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
    }

    /// Les `limit` derniers produits ajoutés (page d'accueil)
    pub async fn latest_products(
        db: &DatabaseConnection,
        limit: u64,
    ) -> Result<Vec<product::Model>, DbErr> {
        product::Entity::find()
            .order_by_desc(product::Column::DateAdded)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// Catégories présentes dans le catalogue, triées
    pub async fn distinct_categories(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
        Self::distinct_values(db, product::Column::Category).await
    }

    /// Matières présentes dans le catalogue, triées
    pub async fn distinct_materials(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
        Self::distinct_values(db, product::Column::Material).await
    }

    async fn distinct_values(
        db: &DatabaseConnection,
        column: product::Column,
    ) -> Result<Vec<String>, DbErr> {
        product::Entity::find()
            .select_only()
            .column(column)
            .distinct()
            .order_by_asc(column)
            .into_tuple::<String>()
            .all(db)
            .await
    }
}
