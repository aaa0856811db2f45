//! # Category Repository
//!
//! Database operations for product categories.
//!
//! A category can only be deleted once no product points at it; otherwise
//! the caller gets `DbError::InUse` with the number of products still filed
//! under it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use kasir_core::catalog::{CategoryFilter, CategoryInput};
use kasir_core::{Category, CategorySummary};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, status, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Case-insensitive lookup by display name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, status, created_at, updated_at FROM categories \
             WHERE name = ?1 COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// One category with its product count.
    pub async fn summary(&self, id: &str) -> DbResult<Option<CategorySummary>> {
        let summary = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT c.id, c.name, c.description, c.status, c.created_at, c.updated_at,
                   COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.id = ?1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Creates a category. Names are unique.
    pub async fn insert(&self, input: &CategoryInput) -> DbResult<Category> {
        input.validate()?;

        let now = Utc::now();
        let category = Category {
            id: generate_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            status: input.status,
            created_at: now,
            updated_at: now,
        };

        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&category.name))?;

        Ok(category)
    }

    pub async fn update(&self, id: &str, input: &CategoryInput) -> DbResult<Category> {
        input.validate()?;

        debug!(id = %id, "Updating category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = ?2, description = ?3, status = ?4, updated_at = ?5
            WHERE id = ?1
            RETURNING id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(input.name.trim()))?;

        category.ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category that no product references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let mut tx = self.pool.begin().await?;

        let dependents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if dependents > 0 {
            return Err(DbError::InUse {
                entity: "Category".to_string(),
                id: id.to_string(),
                dependents,
            });
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Categories by name, each with its product count.
    pub async fn list(&self, filter: &CategoryFilter) -> DbResult<Vec<CategorySummary>> {
        let filter = filter.clone().normalized()?;

        let rows = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT c.id, c.name, c.description, c.status, c.created_at, c.updated_at,
                   COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE (?1 IS NULL OR c.name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR c.status = ?2)
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .bind(filter.search_pattern())
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_category, seed_product, setup};
    use kasir_core::{CatalogStatus, Money};

    #[tokio::test]
    async fn test_insert_update_get() {
        let db = setup().await;
        let repo = db.categories();

        let created = repo.insert(&CategoryInput::new("Minuman")).await.unwrap();
        assert_eq!(created.status, CatalogStatus::Active);

        let mut input = CategoryInput::new("Minuman Dingin");
        input.status = CatalogStatus::Inactive;
        let updated = repo.update(&created.id, &input).await.unwrap();
        assert_eq!(updated.name, "Minuman Dingin");
        assert_eq!(updated.status, CatalogStatus::Inactive);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Minuman Dingin");

        assert!(matches!(
            repo.update("missing", &input).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = setup().await;
        seed_category(&db, "Sembako").await;

        let err = db.categories().insert(&CategoryInput::new("Sembako")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "Sembako"));
    }

    #[tokio::test]
    async fn test_delete_refused_while_products_reference_it() {
        let db = setup().await;
        let used = seed_category(&db, "Sembako").await;
        let empty = seed_category(&db, "Kosong").await;
        seed_product(&db, &used.id, "A", Money::from_rupiah(1_000), 1).await;

        let err = db.categories().delete(&used.id).await.unwrap_err();
        assert!(matches!(err, DbError::InUse { dependents: 1, .. }));

        db.categories().delete(&empty.id).await.unwrap();
        assert!(db.categories().get_by_id(&empty.id).await.unwrap().is_none());
        assert!(matches!(
            db.categories().delete(&empty.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_with_counts_and_filters() {
        let db = setup().await;
        let drinks = seed_category(&db, "Minuman").await;
        let food = seed_category(&db, "Makanan").await;
        seed_product(&db, &drinks.id, "A", Money::from_rupiah(1_000), 1).await;
        seed_product(&db, &drinks.id, "B", Money::from_rupiah(1_000), 1).await;

        let mut inactive = CategoryInput::new("Makanan");
        inactive.status = CatalogStatus::Inactive;
        db.categories().update(&food.id, &inactive).await.unwrap();

        let all = db.categories().list(&CategoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].category.name, "Makanan");
        assert_eq!(all[0].product_count, 0);
        assert_eq!(all[1].product_count, 2);

        let active = CategoryFilter {
            status: Some(CatalogStatus::Active),
            ..Default::default()
        };
        assert_eq!(db.categories().list(&active).await.unwrap().len(), 1);

        let search = CategoryFilter {
            search: Some("minum".to_string()),
            ..Default::default()
        };
        let found = db.categories().list(&search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category.id, drinks.id);

        assert_eq!(db.categories().count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_name_and_summary() {
        let db = setup().await;
        let drinks = seed_category(&db, "Minuman").await;
        seed_product(&db, &drinks.id, "A", Money::from_rupiah(1_000), 1).await;

        let found = db.categories().get_by_name(" minuman ").await.unwrap().unwrap();
        assert_eq!(found.id, drinks.id);
        assert!(db.categories().get_by_name("Minum").await.unwrap().is_none());

        let summary = db.categories().summary(&drinks.id).await.unwrap().unwrap();
        assert_eq!(summary.category.name, "Minuman");
        assert_eq!(summary.product_count, 1);
        assert!(db.categories().summary("missing").await.unwrap().is_none());
    }
}
