use sea_orm::*;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::dto::{OrderForm, OrderItemView, OrderWithItems};
use crate::models::order::OrderStatus;
use crate::models::{order, order_item, product, users};

pub struct OrderService;

impl OrderService {
    /// Passe une commande d'un produit pour un utilisateur connecté
    /// total = prix actuel * quantité, figé dans la commande
    /// La commande et sa ligne sont écrites dans la même transaction
    pub async fn place_order(
        db: &DatabaseConnection,
        user_id: i32,
        product_id: i32,
        form: OrderForm,
    ) -> AppResult<(order::Model, order_item::Model)> {
        let product = product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;

        let total_price = product.price * rust_decimal::Decimal::from(form.quantity);

        let txn = db.begin().await?;

        let new_order = order::ActiveModel {
            user_id: Set(user_id),
            order_date: Set(chrono::Utc::now()),
            total_price: Set(total_price),
            customer_name: Set(form.customer_name.trim().to_string()),
            customer_address: Set(form.customer_address.trim().to_string()),
            customer_contact: Set(form.customer_contact.trim().to_string()),
            status: Set(OrderStatus::Pending.to_string()),
            ..Default::default()
        };
        let order = new_order.insert(&txn).await?;

        let new_item = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(form.quantity),
            price_at_order: Set(product.price),
            ..Default::default()
        };
        let item = new_item.insert(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            order_id = order.id,
            user_id,
            product_id,
            quantity = form.quantity,
            total = %order.total_price,
            "Order placed"
        );

        Ok((order, item))
    }

    /// Change le statut d'une commande (admin)
    /// Toute valeur de OrderStatus est acceptée, même un retour en arrière (journalisé)
    /// Une valeur inconnue est refusée et la commande reste inchangée
    pub async fn set_status(
        db: &DatabaseConnection,
        order_id: i32,
        new_status: &str,
    ) -> AppResult<order::Model> {
        let order = Self::find_order(db, order_id).await?;

        let next: OrderStatus = new_status
            .parse()
            .map_err(|_| AppError::InvalidInput("Invalid status provided.".to_string()))?;

        if let Ok(current) = order.status.parse::<OrderStatus>() {
            if current.is_backward(next) {
                tracing::warn!(
                    order_id,
                    from = %current,
                    to = %next,
                    "Order status moved backward"
                );
            }
        }

        let mut active_order: order::ActiveModel = order.into();
        active_order.status = Set(next.to_string());
        let updated = active_order.update(db).await?;

        tracing::info!(order_id, status = %next, "Order status updated");
        Ok(updated)
    }

    pub async fn find_order(db: &DatabaseConnection, order_id: i32) -> AppResult<order::Model> {
        order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))
    }

    /// Commandes d'un utilisateur, les plus récentes d'abord
    pub async fn orders_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrderWithItems>, DbErr> {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::Id)
            .all(db)
            .await?;

        Self::with_items(db, orders).await
    }

    /// Toutes les commandes, les plus récentes d'abord (back-office)
    pub async fn all_orders(db: &DatabaseConnection) -> Result<Vec<OrderWithItems>, DbErr> {
        let orders = order::Entity::find()
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::Id)
            .all(db)
            .await?;

        Self::with_items(db, orders).await
    }

    pub async fn count_with_status(
        db: &DatabaseConnection,
        status: OrderStatus,
    ) -> Result<u64, DbErr> {
        order::Entity::find()
            .filter(order::Column::Status.eq(status.as_str()))
            .count(db)
            .await
    }

    /// Charge les lignes, les produits et les clients en 3 requêtes (pas de N+1)
    async fn with_items(
        db: &DatabaseConnection,
        orders: Vec<order::Model>,
    ) -> Result<Vec<OrderWithItems>, DbErr> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?;

        let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
        let product_names: HashMap<i32, String> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let user_ids: Vec<i32> = orders.iter().map(|o| o.user_id).collect();
        let usernames: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let mut items_by_order: HashMap<i32, Vec<OrderItemView>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(OrderItemView {
                product_id: item.product_id,
                product_name: product_names.get(&item.product_id).cloned(),
                quantity: item.quantity,
                price_at_order: item.price_at_order,
            });
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                customer_username: usernames.get(&order.user_id).cloned(),
                items: items_by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }
}
