use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{PgPool, Postgres};

use crate::catalog::models::{Category, Product};
use crate::catalog::query::{QueryParam, SQLQueryBuilder, ValidatedQuery};
use crate::error::ApiError;

const PRODUCT_SELECT: &str = r#"
    SELECT id, title, slug, description, image_url, price, sale_price,
           category_id, is_active, created_at, updated_at
    FROM products
"#;

/// Repository for catalog reads
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active product by ID
    pub async fn find_active_by_id(&self, id: i32) -> Result<Option<Product>, ApiError> {
        let sql = format!("{} WHERE id = $1 AND is_active = TRUE", PRODUCT_SELECT);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Find active products by IDs; unknown ids are skipped
    pub async fn find_active_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE id = ANY($1) AND is_active = TRUE ORDER BY id",
            PRODUCT_SELECT
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// One page of active products plus the total match count
    pub async fn list(&self, query: &ValidatedQuery) -> Result<(Vec<Product>, i64), ApiError> {
        let builder = SQLQueryBuilder::from_validated(query);

        let (sql, params) = builder.build();
        tracing::debug!("Product listing query: {}", sql);
        let products = bind_all(sqlx::query_as::<_, Product>(&sql), &params)
            .fetch_all(&self.pool)
            .await?;

        let (count_sql, count_params) = builder.build_count();
        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), &count_params)
            .fetch_one(&self.pool)
            .await?;

        Ok((products, total))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }
}

fn bind_all<'q, T>(
    mut query: QueryAs<'q, Postgres, T, PgArguments>,
    params: &'q [QueryParam],
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Text(value) => query.bind(value.as_str()),
            QueryParam::Int(value) => query.bind(*value),
            QueryParam::Decimal(value) => query.bind(*value),
        };
    }
    query
}

fn bind_scalar<'q, T>(
    mut query: QueryScalar<'q, Postgres, T, PgArguments>,
    params: &'q [QueryParam],
) -> QueryScalar<'q, Postgres, T, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Text(value) => query.bind(value.as_str()),
            QueryParam::Int(value) => query.bind(*value),
            QueryParam::Decimal(value) => query.bind(*value),
        };
    }
    query
}
