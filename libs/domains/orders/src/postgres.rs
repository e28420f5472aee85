use async_trait::async_trait;
use chrono::Utc;
use domain_cart::entity::{cart, cart_item};
use domain_cart::{CartItem, CartStatus};
use domain_catalog::Product;
use domain_catalog::entity::product;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::checkout::plan_order;
use crate::entity::{order, order_item};
use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderDetail, OrderFilter, OrderStatus};
use crate::repository::OrderRepository;

const UPDATE_STATUS_IF: &str = r#"
    UPDATE orders
    SET status = $3, updated_at = now()
    WHERE id = $1 AND status = $2
    RETURNING *
"#;

#[derive(Clone)]
pub struct PgOrderRepository {
    db: DatabaseConnection,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn checkout(
        &self,
        user_id: &str,
        currency: &str,
        metadata: serde_json::Value,
    ) -> OrderResult<OrderDetail> {
        let txn = self.db.begin().await?;

        // Concurrent checkouts and cart writes for this user queue here.
        let cart = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .filter(cart::Column::Status.eq(CartStatus::Active))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(OrderError::EmptyCart)?;

        let lines: Vec<CartItem> = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .all(&txn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, Product> = if ids.is_empty() {
            HashMap::new()
        } else {
            product::Entity::find()
                .filter(product::Column::Id.is_in(ids))
                .lock_shared()
                .all(&txn)
                .await?
                .into_iter()
                .map(|m| (m.id, Product::from(m)))
                .collect()
        };

        let now = Utc::now();
        // An early return drops `txn`, which rolls everything back.
        let plan = plan_order(user_id, currency, metadata, &lines, &products, now)?;

        order::ActiveModel::from(plan.order.clone()).insert(&txn).await?;
        order_item::Entity::insert_many(plan.items.iter().cloned().map(order_item::ActiveModel::from))
            .exec_without_returning(&txn)
            .await?;

        let mut converted = cart.into_active_model();
        converted.status = Set(CartStatus::Converted);
        converted.updated_at = Set(now.into());
        let converted = converted.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            order_id = %plan.order.id,
            order_number = %plan.order.order_number,
            cart_id = %converted.id,
            total = %plan.order.total_amount,
            "Checked out cart"
        );
        Ok(plan.into())
    }

    async fn list_for_user(&self, user_id: &str, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .limit(filter.page_size())
            .offset(filter.offset)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> OrderResult<Option<OrderDetail>> {
        let Some(model) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(id))
            .order_by_asc(order_item::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(OrderDetail {
            order: model.into(),
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>> {
        let model = order::Model::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPDATE_STATUS_IF,
            [id.into(), from.to_string().into(), to.to_string().into()],
        ))
        .one(&self.db)
        .await?;
        Ok(model.map(Into::into))
    }
}
