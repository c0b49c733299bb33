use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::{message, users};
use crate::services::auth_service::AuthService;

pub const MAX_MESSAGE_CHARS: usize = 500;

pub struct MessageService;

impl MessageService {
    /// Ajoute un message au fil (horodaté côté serveur, non lu)
    /// Le texte doit faire entre 1 et 500 caractères et ne pas être vide
    pub async fn send_message(
        db: &DatabaseConnection,
        sender_id: i32,
        receiver_id: i32,
        text: &str,
    ) -> AppResult<message::Model> {
        let len = text.chars().count();
        if text.trim().is_empty() || len > MAX_MESSAGE_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Message must be between 1 and {} characters.",
                MAX_MESSAGE_CHARS
            )));
        }

        let new_message = message::ActiveModel {
            sender_id: Set(sender_id),
            receiver_id: Set(Some(receiver_id)),
            message_text: Set(text.to_string()),
            timestamp: Set(chrono::Utc::now()),
            is_read: Set(false),
            ..Default::default()
        };

        let message = new_message.insert(db).await?;
        tracing::info!(message_id = message.id, sender_id, receiver_id, "Message sent");
        Ok(message)
    }

    /// Messages échangés entre `a` et `b`, dans les deux sens, du plus ancien au plus récent
    pub async fn conversation(
        db: &DatabaseConnection,
        a: i32,
        b: i32,
    ) -> Result<Vec<message::Model>, DbErr> {
        message::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(message::Column::SenderId.eq(a))
                            .add(message::Column::ReceiverId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(message::Column::SenderId.eq(b))
                            .add(message::Column::ReceiverId.eq(a)),
                    ),
            )
            .order_by_asc(message::Column::Timestamp)
            .order_by_asc(message::Column::Id)
            .all(db)
            .await
    }

    /// L'admin destinataire des messages clients
    pub async fn admin_for_messaging(db: &DatabaseConnection) -> AppResult<users::Model> {
        AuthService::find_admin(db).await?.ok_or_else(|| {
            AppError::ServiceUnavailable(
                "Admin user not found. Messaging not available.".to_string(),
            )
        })
    }

    /// Clients (non admin) ayant échangé au moins un message avec l'admin, triés par username
    pub async fn counterparties_with_messages(
        db: &DatabaseConnection,
        admin_id: i32,
    ) -> Result<Vec<users::Model>, DbErr> {
        let involving_admin = message::Entity::find()
            .filter(
                Condition::any()
                    .add(message::Column::SenderId.eq(admin_id))
                    .add(message::Column::ReceiverId.eq(admin_id)),
            )
            .all(db)
            .await?;

        let mut ids: Vec<i32> = involving_admin
            .iter()
            .flat_map(|m| [Some(m.sender_id), m.receiver_id])
            .flatten()
            .filter(|id| *id != admin_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .filter(users::Column::IsAdmin.eq(false))
            .order_by_asc(users::Column::Username)
            .all(db)
            .await
    }

    /// Marque lus les messages de `counterparty_id` vers `admin_id`
    /// Le sens admin -> client n'est pas touché
    pub async fn mark_read_from(
        db: &DatabaseConnection,
        counterparty_id: i32,
        admin_id: i32,
    ) -> Result<u64, DbErr> {
        let result = message::Entity::update_many()
            .col_expr(message::Column::IsRead, sea_query::Expr::value(true))
            .filter(message::Column::SenderId.eq(counterparty_id))
            .filter(message::Column::ReceiverId.eq(admin_id))
            .filter(message::Column::IsRead.eq(false))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Ouvre le fil d'un client dans la boîte admin : marque ses messages lus
    /// puis renvoie la conversation
    pub async fn open_thread(
        db: &DatabaseConnection,
        counterparty_id: i32,
        admin_id: i32,
    ) -> Result<Vec<message::Model>, DbErr> {
        let marked = Self::mark_read_from(db, counterparty_id, admin_id).await?;
        if marked > 0 {
            tracing::debug!(counterparty_id, marked, "Messages marked as read");
        }
        Self::conversation(db, counterparty_id, admin_id).await
    }
}
