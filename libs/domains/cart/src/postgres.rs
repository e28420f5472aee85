use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{cart, cart_item};
use crate::error::{CartError, CartResult};
use crate::models::{Cart, CartItem, CartStatus, MAX_LINE_QUANTITY};
use crate::repository::{CartRepository, quantity_overflow};

/// Finds or creates the user's active cart. Relies on the partial unique
/// index `uq_carts_user_active`.
const UPSERT_ACTIVE_CART: &str = r#"
    INSERT INTO carts (id, user_id, status)
    VALUES ($1, $2, 'active')
    ON CONFLICT (user_id) WHERE status = 'active'
    DO UPDATE SET updated_at = now()
    RETURNING id
"#;

/// Inserts a line or increments the existing one. Returns no row when the
/// summed quantity would exceed the cap.
const UPSERT_CART_ITEM: &str = r#"
    INSERT INTO cart_items (id, cart_id, product_id, quantity, price_at_time)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (cart_id, product_id)
    DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                  price_at_time = EXCLUDED.price_at_time,
                  updated_at = now()
    WHERE cart_items.quantity + EXCLUDED.quantity <= $6
    RETURNING *
"#;

const UPDATE_OWNED_ITEM: &str = r#"
    UPDATE cart_items AS ci
    SET quantity = $3, updated_at = now()
    FROM carts AS c
    WHERE ci.id = $1 AND ci.cart_id = c.id
      AND c.user_id = $2 AND c.status = 'active'
    RETURNING ci.*
"#;

const DELETE_OWNED_ITEM: &str = r#"
    DELETE FROM cart_items AS ci
    USING carts AS c
    WHERE ci.id = $1 AND ci.cart_id = c.id
      AND c.user_id = $2 AND c.status = 'active'
"#;

const CLEAR_ACTIVE_CART: &str = r#"
    DELETE FROM cart_items
    WHERE cart_id IN (SELECT id FROM carts WHERE user_id = $1 AND status = 'active')
"#;

#[derive(FromQueryResult)]
struct CartIdRow {
    id: Uuid,
}

#[derive(Clone)]
pub struct PgCartRepository {
    db: DatabaseConnection,
}

impl PgCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn get_active_cart(&self, user_id: &str) -> CartResult<Option<Cart>> {
        let model = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .filter(cart::Column::Status.eq(CartStatus::Active))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list_items(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
        let models = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn add_item(
        &self,
        user_id: &str,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> CartResult<CartItem> {
        let txn = self.db.begin().await?;

        let cart = CartIdRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPSERT_ACTIVE_CART,
            [Uuid::now_v7().into(), user_id.into()],
        ))
        .one(&txn)
        .await?
        .ok_or_else(|| CartError::Internal("Active cart upsert returned no row".to_string()))?;

        let item = cart_item::Model::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPSERT_CART_ITEM,
            [
                Uuid::now_v7().into(),
                cart.id.into(),
                product_id.into(),
                quantity.into(),
                unit_price.into(),
                MAX_LINE_QUANTITY.into(),
            ],
        ))
        .one(&txn)
        .await?
        // Dropping the transaction rolls back the cart upsert.
        .ok_or_else(quantity_overflow)?;

        txn.commit().await?;

        tracing::debug!(cart_id = %cart.id, item_id = %item.id, quantity = item.quantity, "Added cart item");
        Ok(item.into())
    }

    async fn update_item_quantity(
        &self,
        user_id: &str,
        item_id: Uuid,
        quantity: i32,
    ) -> CartResult<Option<CartItem>> {
        let model = cart_item::Model::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPDATE_OWNED_ITEM,
            [item_id.into(), user_id.into(), quantity.into()],
        ))
        .one(&self.db)
        .await?;
        Ok(model.map(Into::into))
    }

    async fn remove_item(&self, user_id: &str, item_id: Uuid) -> CartResult<bool> {
        let result = self
            .db
            .execute_raw(Statement::from_sql_and_values(
                DbBackend::Postgres,
                DELETE_OWNED_ITEM,
                [item_id.into(), user_id.into()],
            ))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: &str) -> CartResult<u64> {
        let result = self
            .db
            .execute_raw(Statement::from_sql_and_values(
                DbBackend::Postgres,
                CLEAR_ACTIVE_CART,
                [user_id.into()],
            ))
            .await?;
        Ok(result.rows_affected())
    }
}
