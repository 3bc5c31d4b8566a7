use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Quantity at or below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Product record in the database. Inventory is global, not per-user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Product {
    /// Products whose name contains `q` case-insensitively, newest first.
    /// An empty filter returns everything.
    pub async fn search(db: &SqlitePool, q: &str) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, quantity, price, created_at
            FROM products
            WHERE name LIKE '%' || $1 || '%'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(q)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, quantity, price, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn create(
        db: &SqlitePool,
        name: &str,
        category: &str,
        quantity: i64,
        price: f64,
    ) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category, quantity, price, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, category, quantity, price, created_at
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(quantity)
        .bind(price)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    /// Full overwrite of every mutable field; the row must exist.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        name: &str,
        category: &str,
        quantity: i64,
        price: f64,
    ) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, category = $3, quantity = $4, price = $5
            WHERE id = $1
            RETURNING id, name, category, quantity, price, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(quantity)
        .bind(price)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Total inventory value over all products; 0.0 for an empty table.
    pub async fn total_value(db: &SqlitePool) -> anyhow::Result<f64> {
        let total = sqlx::query_scalar::<_, f64>(
            "SELECT CAST(COALESCE(SUM(quantity * price), 0) AS REAL) FROM products",
        )
        .fetch_one(db)
        .await?;
        Ok(total)
    }

    /// Products at or below the low-stock threshold, most depleted first.
    pub async fn low_stock(db: &SqlitePool) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, quantity, price, created_at
            FROM products
            WHERE quantity <= $1
            ORDER BY quantity ASC
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    async fn seed(db: &SqlitePool, name: &str, quantity: i64, price: f64) -> Product {
        Product::create(db, name, "", quantity, price)
            .await
            .expect("create product")
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_empty_filter_returns_all() {
        let state = AppState::for_tests().await;
        seed(&state.db, "Sardines", 5, 25.5).await;
        seed(&state.db, "Tuna", 2, 12.0).await;

        let all = Product::search(&state.db, "").await.expect("search");
        assert_eq!(all.len(), 2);

        let hits = Product::search(&state.db, "ARD").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sardines");

        let none = Product::search(&state.db, "beans").await.expect("search");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn search_orders_newest_first() {
        let state = AppState::for_tests().await;
        let first = seed(&state.db, "First", 1, 1.0).await;
        let second = seed(&state.db, "Second", 1, 1.0).await;

        let all = Product::search(&state.db, "").await.expect("search");
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let state = AppState::for_tests().await;
        let created = seed(&state.db, "Sardines", 5, 25.5).await;

        let updated = Product::update(&state.db, created.id, "Sardines", "Canned", 7, 26.0)
            .await
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.category, "Canned");
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.price, 26.0);

        let found = Product::find(&state.db, created.id)
            .await
            .expect("find")
            .expect("row");
        assert_eq!(found.quantity, 7);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let state = AppState::for_tests().await;
        let created = seed(&state.db, "Sardines", 5, 25.5).await;

        Product::delete(&state.db, created.id).await.expect("delete");
        assert!(Product::find(&state.db, created.id)
            .await
            .expect("find")
            .is_none());
        assert_eq!(Product::count(&state.db).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn total_value_is_zero_for_empty_table() {
        let state = AppState::for_tests().await;
        assert_eq!(Product::total_value(&state.db).await.expect("total"), 0.0);
    }

    #[tokio::test]
    async fn total_value_sums_quantity_times_price() {
        let state = AppState::for_tests().await;
        seed(&state.db, "Sardines", 5, 25.5).await;
        seed(&state.db, "Tuna", 2, 12.0).await;

        let total = Product::total_value(&state.db).await.expect("total");
        assert!((total - (5.0 * 25.5 + 2.0 * 12.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn low_stock_filters_at_threshold_and_orders_ascending() {
        let state = AppState::for_tests().await;
        seed(&state.db, "At threshold", 5, 1.0).await;
        seed(&state.db, "Depleted", 0, 1.0).await;
        seed(&state.db, "Just above", 6, 1.0).await;
        seed(&state.db, "Low", 3, 1.0).await;

        let low = Product::low_stock(&state.db).await.expect("low stock");
        let quantities: Vec<i64> = low.iter().map(|p| p.quantity).collect();
        assert_eq!(quantities, vec![0, 3, 5]);
        assert!(low.iter().all(|p| p.name != "Just above"));
    }
}
