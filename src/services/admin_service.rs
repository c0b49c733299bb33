use sea_orm::*;

use crate::models::dto::DashboardStats;
use crate::models::order::OrderStatus;
use crate::models::{order, product, users};
use crate::services::order_service::OrderService;

pub struct AdminService;

impl AdminService {
    /// Compteurs du tableau de bord
    pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats, DbErr> {
        Ok(DashboardStats {
            total_products: product::Entity::find().count(db).await?,
            total_users: users::Entity::find().count(db).await?,
            total_orders: order::Entity::find().count(db).await?,
            pending_orders: OrderService::count_with_status(db, OrderStatus::Pending).await?,
        })
    }
}
