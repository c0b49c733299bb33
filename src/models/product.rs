use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Catégories proposées à la création d'un produit
pub const CATEGORIES: [&str; 5] = ["Ring", "Necklace", "Earring", "Bracelet", "Pendant"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,      // une des CATEGORIES
    pub material: String,      // texte libre: 'Gold', 'Silver', ...
    pub price: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image_filename: Option<String>, // nom du fichier dans UPLOAD_FOLDER
    pub date_added: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
