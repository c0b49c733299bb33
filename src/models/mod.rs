// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table SQLite avec SeaORM.
//
// Liste des modules:
//   - health : Health check
//   - users : Clients et compte admin (is_admin)
//   - product : Bijoux du catalogue
//   - order : Commandes + OrderStatus
//   - order_item : Lignes de commande (prix figé au moment de la commande)
//   - message : Messagerie client <-> admin
//   - dto : View-models renvoyés par les routes
//
// Points d'attention:
//   - Les tables sont créées au démarrage depuis les entités (db::init_schema)
//   - Pas de navigation implicite : les services font des requêtes explicites
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod product;
pub mod order;
pub mod order_item;
pub mod message;
