use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewProduct {
    pub fn validate(self) -> anyhow::Result<Self> {
        let name = self.name.trim().to_string();
        anyhow::ensure!(!name.is_empty(), "name must be non-empty");
        let category = self
            .category
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(Self { name, category })
    }
}

pub async fn list_products(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, DateTime<Utc>)>(
        "SELECT id, name, category, created_at FROM products ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await
    .context("select products failed")?;

    Ok(rows
        .into_iter()
        .map(|(id, name, category, created_at)| Product {
            id,
            name,
            category,
            created_at,
        })
        .collect())
}

/// Inserts a product, or returns `None` when the name is already taken.
pub async fn create_product(
    pool: &sqlx::PgPool,
    product: &NewProduct,
) -> anyhow::Result<Option<Product>> {
    let row = sqlx::query_as::<_, (i64, String, Option<String>, DateTime<Utc>)>(
        "INSERT INTO products (name, category) VALUES ($1, $2) \
         ON CONFLICT (name) DO NOTHING \
         RETURNING id, name, category, created_at",
    )
    .bind(&product.name)
    .bind(&product.category)
    .fetch_optional(pool)
    .await
    .context("insert products failed")?;

    Ok(row.map(|(id, name, category, created_at)| Product {
        id,
        name,
        category,
        created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_trimmed() {
        let p = NewProduct {
            name: "  Oat Milk ".to_string(),
            category: Some("   ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(p.name, "Oat Milk");
        assert_eq!(p.category, None);

        let blank = NewProduct {
            name: " ".to_string(),
            category: None,
        };
        assert!(blank.validate().is_err());
    }
}
