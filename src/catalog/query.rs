use rust_decimal::Decimal;
use serde::Deserialize;
use std::borrow::Cow;
use utoipa::IntoParams;

const PRODUCT_COLUMNS: &str = "p.id, p.title, p.slug, p.description, p.image_url, p.price, \
    p.sale_price, p.category_id, p.is_active, p.created_at, p.updated_at";

/// Price used for filtering and sorting: sale price when set
const SHELF_PRICE: &str = "COALESCE(p.sale_price, p.price)";

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Typed bind value for a built query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Int(i32),
    Decimal(Decimal),
}

/// SQL query builder for the product listing
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds a single parameterized query with filters, sorting, and pagination
pub struct SQLQueryBuilder {
    where_clauses: Vec<String>,
    params: Vec<QueryParam>,
    order_clause: String,
    limit: u32,
    offset: u32,
}

impl Default for SQLQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SQLQueryBuilder {
    /// Active products only, newest first
    pub fn new() -> Self {
        Self {
            where_clauses: vec!["p.is_active = TRUE".to_string()],
            params: Vec::new(),
            order_clause: "p.created_at DESC, p.id DESC".to_string(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    fn push_param(&mut self, param: QueryParam) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Case-insensitive partial match on title or description;
    /// `%` and `_` in the term match literally
    pub fn add_search_filter(&mut self, search: &str) {
        let index = self.push_param(QueryParam::Text(format!("%{}%", escape_like(search))));
        self.where_clauses.push(format!(
            r"(p.title ILIKE ${0} ESCAPE '\' OR p.description ILIKE ${0} ESCAPE '\')",
            index
        ));
    }

    pub fn add_category_filter(&mut self, category_id: i32) {
        let index = self.push_param(QueryParam::Int(category_id));
        self.where_clauses.push(format!("p.category_id = ${}", index));
    }

    /// Both bounds are inclusive and apply to the pre-campaign price
    pub fn add_price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        if let Some(min_price) = min {
            let index = self.push_param(QueryParam::Decimal(min_price));
            self.where_clauses.push(format!("{} >= ${}", SHELF_PRICE, index));
        }

        if let Some(max_price) = max {
            let index = self.push_param(QueryParam::Decimal(max_price));
            self.where_clauses.push(format!("{} <= ${}", SHELF_PRICE, index));
        }
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Price => SHELF_PRICE,
            SortField::Title => "p.title",
            SortField::Newest => "p.created_at",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        // id keeps pages stable when the sort key ties
        self.order_clause = format!("{} {}, p.id {}", field_name, order_str, order_str);
    }

    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1).saturating_mul(limit);
    }

    fn where_sql(&self) -> String {
        format!(" WHERE {}", self.where_clauses.join(" AND "))
    }

    /// Page query and its bind values
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let query = format!(
            "SELECT {} FROM products p{} ORDER BY {} LIMIT {} OFFSET {}",
            PRODUCT_COLUMNS,
            self.where_sql(),
            self.order_clause,
            self.limit,
            self.offset
        );

        (query, self.params.clone())
    }

    /// Total row count for the same filters
    pub fn build_count(&self) -> (String, Vec<QueryParam>) {
        (
            format!("SELECT COUNT(*) FROM products p{}", self.where_sql()),
            self.params.clone(),
        )
    }

    pub fn from_validated(query: &ValidatedQuery) -> Self {
        let mut builder = Self::new();

        if let Some(ref search) = query.search {
            builder.add_search_filter(search);
        }
        if let Some(category_id) = query.category_id {
            builder.add_category_filter(category_id);
        }
        builder.add_price_range(query.min_price, query.max_price);
        if let Some(field) = query.sort_field {
            builder.set_sort(field, query.sort_order);
        }
        builder.set_pagination(query.page, query.limit);

        builder
    }
}

/// Query parameters for `GET /api/products`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Partial title/description match (case-insensitive)
    pub search: Option<String>,
    pub category_id: Option<i32>,
    /// Minimum shelf price (inclusive)
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Maximum shelf price (inclusive)
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// "price", "title" or "newest"
    pub sort: Option<String>,
    /// "asc" or "desc"
    pub order: Option<String>,
    /// 1-indexed page, default 1
    pub page: Option<u32>,
    /// Items per page, default 20, max 100
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Title,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized listing query
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for validator::ValidationErrors {
    fn from(err: ValidationError) -> Self {
        let mut field_error = validator::ValidationError::new("invalid");
        field_error.message = Some(Cow::Owned(err.message));

        let mut errors = validator::ValidationErrors::new();
        errors.add(err.field, field_error);
        errors
    }
}

pub struct QueryValidator;

impl QueryValidator {
    pub fn validate(params: ProductQuery) -> Result<ValidatedQuery, ValidationError> {
        let search = Self::normalize_string(params.search);

        if let Some(category_id) = params.category_id {
            if category_id <= 0 {
                return Err(ValidationError::new(
                    "category_id",
                    "category_id must be a positive number",
                ));
            }
        }

        let min_price = params
            .min_price
            .map(|price| Self::validate_price(price, "min_price"))
            .transpose()?;
        let max_price = params
            .max_price
            .map(|price| Self::validate_price(price, "max_price"))
            .transpose()?;

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(ValidationError::new(
                    "min_price",
                    "min_price cannot be greater than max_price",
                ));
            }
        }

        let sort_field = params
            .sort
            .as_deref()
            .map(Self::parse_sort_field)
            .transpose()?;

        let sort_order = match params.order {
            Some(order_str) => Self::parse_sort_order(&order_str)?,
            None => match sort_field {
                Some(SortField::Price) | Some(SortField::Title) => SortOrder::Asc,
                Some(SortField::Newest) | None => SortOrder::Desc,
            },
        };

        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(ValidationError::new(
                "page",
                "page must be a positive number (greater than 0)",
            ));
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ValidationError::new(
                "limit",
                format!("limit must be between 1 and {}", MAX_LIMIT),
            ));
        }

        Ok(ValidatedQuery {
            search,
            category_id: params.category_id,
            min_price,
            max_price,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Trimmed, None if empty
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }

    fn validate_price(price: Decimal, field: &'static str) -> Result<Decimal, ValidationError> {
        if price.is_sign_negative() {
            return Err(ValidationError::new(
                field,
                format!("{} must not be negative", field),
            ));
        }
        Ok(price)
    }

    fn parse_sort_field(s: &str) -> Result<SortField, ValidationError> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortField::Price),
            "title" => Ok(SortField::Title),
            "newest" => Ok(SortField::Newest),
            _ => Err(ValidationError::new(
                "sort",
                format!(
                    "Invalid sort field '{}'. Must be 'price', 'title' or 'newest'",
                    s
                ),
            )),
        }
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, ValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::new(
                "order",
                format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sql_builder_basic_query() {
        let (query, params) = SQLQueryBuilder::new().build();

        assert!(query.starts_with("SELECT p.id, p.title"));
        assert!(query.contains("WHERE p.is_active = TRUE"));
        assert!(query.contains("ORDER BY p.created_at DESC, p.id DESC"));
        assert!(query.contains("LIMIT 20 OFFSET 0"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_sql_builder_with_search() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter("kapı");
        let (query, params) = builder.build();

        assert!(query.contains(r"(p.title ILIKE $1 ESCAPE '\' OR p.description ILIKE $1 ESCAPE '\')"));
        assert_eq!(params, vec![QueryParam::Text("%kapı%".to_string())]);
    }

    #[test]
    fn test_search_wildcards_match_literally() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter(r"50%_off\");
        let (_, params) = builder.build();

        assert_eq!(params, vec![QueryParam::Text(r"%50\%\_off\\%".to_string())]);
    }

    #[test]
    fn test_sql_builder_binds_typed_values() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_category_filter(4);
        builder.add_price_range(Some(dec!(50)), Some(dec!(199.90)));
        let (query, params) = builder.build();

        assert!(query.contains("p.category_id = $1"));
        assert!(query.contains("COALESCE(p.sale_price, p.price) >= $2"));
        assert!(query.contains("COALESCE(p.sale_price, p.price) <= $3"));
        assert_eq!(
            params,
            vec![
                QueryParam::Int(4),
                QueryParam::Decimal(dec!(50)),
                QueryParam::Decimal(dec!(199.90)),
            ]
        );
    }

    #[test]
    fn test_sql_builder_with_sorting_and_pagination() {
        let mut builder = SQLQueryBuilder::new();
        builder.set_sort(SortField::Title, SortOrder::Asc);
        builder.set_pagination(3, 20);
        let (query, _) = builder.build();

        assert!(query.contains("ORDER BY p.title ASC, p.id ASC"));
        assert!(query.contains("LIMIT 20 OFFSET 40"));
    }

    #[test]
    fn test_count_query_shares_filters() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter("jant");
        builder.set_pagination(2, 10);
        let (count, params) = builder.build_count();

        assert!(count.starts_with("SELECT COUNT(*) FROM products p WHERE"));
        assert!(count.contains("ILIKE $1"));
        assert!(!count.contains("LIMIT"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_validate_defaults() {
        let validated = QueryValidator::validate(ProductQuery::default()).unwrap();

        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 20);
        assert_eq!(validated.sort_field, None);
        assert_eq!(validated.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_validate_sort_defaults() {
        let validated = QueryValidator::validate(ProductQuery {
            sort: Some("PRICE".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(validated.sort_field, Some(SortField::Price));
        assert_eq!(validated.sort_order, SortOrder::Asc);

        let validated = QueryValidator::validate(ProductQuery {
            sort: Some("newest".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(validated.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = vec![
            ProductQuery {
                sort: Some("rating".to_string()),
                ..Default::default()
            },
            ProductQuery {
                order: Some("up".to_string()),
                ..Default::default()
            },
            ProductQuery {
                page: Some(0),
                ..Default::default()
            },
            ProductQuery {
                limit: Some(101),
                ..Default::default()
            },
            ProductQuery {
                min_price: Some(dec!(-1)),
                ..Default::default()
            },
            ProductQuery {
                min_price: Some(dec!(100)),
                max_price: Some(dec!(50)),
                ..Default::default()
            },
            ProductQuery {
                category_id: Some(0),
                ..Default::default()
            },
        ];

        for case in cases {
            assert!(QueryValidator::validate(case).is_err());
        }
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let validated = QueryValidator::validate(ProductQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(validated.search, None);
    }

    #[test]
    fn test_validation_error_converts_to_field_error() {
        let err = QueryValidator::validate(ProductQuery {
            limit: Some(500),
            ..Default::default()
        })
        .unwrap_err();

        let errors: validator::ValidationErrors = err.into();
        assert!(errors.field_errors().contains_key("limit"));
    }
}
