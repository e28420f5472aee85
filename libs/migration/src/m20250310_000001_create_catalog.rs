use crate::{drop_touch_trigger_sql, touch_trigger_sql};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    pk_uuid(col).default(Expr::cust("gen_random_uuid()")).to_owned()
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    timestamp_with_time_zone(col)
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(id_col(Categories::Id))
                    .col(string(Categories::Name))
                    .col(string_uniq(Categories::Slug))
                    .col(text_null(Categories::Description))
                    .col(uuid_null(Categories::ParentId))
                    .col(created_at(Categories::CreatedAt))
                    .col(created_at(Categories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(id_col(Brands::Id))
                    .col(string(Brands::Name))
                    .col(string_uniq(Brands::Slug))
                    .col(created_at(Brands::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(id_col(Products::Id))
                    .col(string(Products::Name))
                    .col(string_uniq(Products::Slug))
                    .col(string_uniq(Products::Sku))
                    .col(text_null(Products::Description))
                    .col(decimal_len(Products::Price, 10, 2))
                    .col(integer(Products::StockQuantity).default(0))
                    .col(boolean(Products::InStock).default(true))
                    .col(uuid_null(Products::CategoryId))
                    .col(uuid_null(Products::BrandId))
                    .col(json_binary(Products::Attributes).default("{}"))
                    .col(json_binary(Products::Specifications).default("{}"))
                    .col(json_binary(Products::Tags).default("[]"))
                    .col(string_null(Products::FeaturedImage))
                    .col(created_at(Products::CreatedAt))
                    .col(created_at(Products::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_brand_id")
                            .from(Products::Table, Products::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE products ADD CONSTRAINT chk_products_stock_quantity \
                 CHECK (stock_quantity >= 0)",
            )
            .await?;

        for (name, col) in [
            ("idx_products_category_id", Products::CategoryId),
            ("idx_products_created_at", Products::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(id_col(Tags::Id))
                    .col(string(Tags::Name))
                    .col(string_uniq(Tags::Slug))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(id_col(Collections::Id))
                    .col(string(Collections::Name))
                    .col(string_uniq(Collections::Slug))
                    .col(text_null(Collections::Description))
                    .col(created_at(Collections::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CollectionProducts::Table)
                    .if_not_exists()
                    .col(uuid(CollectionProducts::CollectionId))
                    .col(uuid(CollectionProducts::ProductId))
                    .col(integer(CollectionProducts::Position).default(0))
                    .primary_key(
                        Index::create()
                            .col(CollectionProducts::CollectionId)
                            .col(CollectionProducts::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collection_products_collection_id")
                            .from(CollectionProducts::Table, CollectionProducts::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collection_products_product_id")
                            .from(CollectionProducts::Table, CollectionProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger_sql("categories")).await?;
        db.execute_unprepared(&touch_trigger_sql("products")).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_touch_trigger_sql("products")).await?;
        db.execute_unprepared(&drop_touch_trigger_sql("categories")).await?;

        manager
            .drop_table(Table::drop().table(CollectionProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Slug,
    Sku,
    Description,
    Price,
    StockQuantity,
    InStock,
    CategoryId,
    BrandId,
    Attributes,
    Specifications,
    Tags,
    FeaturedImage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    Id,
    Name,
    Slug,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CollectionProducts {
    Table,
    CollectionId,
    ProductId,
    Position,
}
