// connexion BD + création du schéma + compte admin

use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter, ColumnTrait,
    Schema, Set, ActiveModelTrait,
};

use crate::config::AdminSeed;
use crate::models::{message, order, order_item, product, users};
use crate::utils::password;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Crée les tables manquantes à partir des entités (ordre imposé par les clés étrangères)
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(users::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(product::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(order::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(order_item::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(message::Entity).if_not_exists().to_owned(),
    ];

    for statement in statements.iter() {
        db.execute(backend.build(statement)).await?;
    }

    Ok(())
}

/// Crée le compte admin s'il n'existe aucun admin
/// Retourne true si un compte a été créé
pub async fn seed_admin(db: &DatabaseConnection, seed: Option<&AdminSeed>) -> Result<bool, DbErr> {
    let existing_admin = users::Entity::find()
        .filter(users::Column::IsAdmin.eq(true))
        .one(db)
        .await?;

    if existing_admin.is_some() {
        return Ok(false);
    }

    let Some(seed) = seed else {
        tracing::warn!("No admin account and no ADMIN_* credentials set: messaging is unavailable");
        return Ok(false);
    };

    let password_hash = password::hash_password(&seed.password).map_err(DbErr::Custom)?;

    let admin = users::ActiveModel {
        username: Set(seed.username.clone()),
        email: Set(seed.email.clone()),
        password_hash: Set(password_hash),
        is_admin: Set(true),
        ..Default::default()
    };
    admin.insert(db).await?;

    tracing::info!(username = %seed.username, "Admin account created");
    Ok(true)
}
