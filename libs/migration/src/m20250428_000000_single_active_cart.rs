use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Older rows may hold several active carts per user; keep the newest.
        db.execute_unprepared(
            r#"
            UPDATE carts SET status = 'abandoned'
            WHERE status = 'active'
              AND id NOT IN (
                SELECT DISTINCT ON (user_id) id
                FROM carts
                WHERE status = 'active'
                ORDER BY user_id, created_at DESC
              )
            "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_carts_user_active \
             ON carts (user_id) WHERE status = 'active'",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uq_carts_user_active")
            .await?;
        Ok(())
    }
}
