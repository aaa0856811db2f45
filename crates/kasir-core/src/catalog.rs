//! # Catalog Inputs and Listings
//!
//! Create/update payloads for products and categories, the filters the
//! listing screens offer, and page arithmetic.
//!
//! ## Listing Flow
//! ```text
//! ProductFilter { search, category_id, status, low_stock }
//!        +
//! PageRequest { page: 2, per_page: 15 }  ──► LIMIT 15 OFFSET 15
//!        │
//!        ▼
//! Page<CatalogProduct> { items, page: 2, per_page: 15, total: 40, last_page: 3 }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::CatalogStatus;
use crate::validation::{
    validate_name, validate_non_negative_amount, validate_optional_text, validate_product_code,
    validate_search_query, validate_stock_level, validate_unit, validate_uuid, ValidationResult,
    MAX_TEXT_LEN,
};
use crate::{DEFAULT_MIN_STOCK_LEVEL, DEFAULT_UNIT};

// =============================================================================
// Product Input
// =============================================================================

/// Full set of editable product fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock_quantity: i64,
    #[serde(default = "default_min_stock_level")]
    pub min_stock_level: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub status: CatalogStatus,
}

fn default_min_stock_level() -> i64 {
    DEFAULT_MIN_STOCK_LEVEL
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

impl ProductInput {
    /// A new active product with the default threshold and unit.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category_id: impl Into<String>,
        purchase_price: Money,
        selling_price: Money,
        stock_quantity: i64,
    ) -> Self {
        ProductInput {
            code: code.into(),
            name: name.into(),
            description: None,
            category_id: category_id.into(),
            purchase_price,
            selling_price,
            stock_quantity,
            min_stock_level: DEFAULT_MIN_STOCK_LEVEL,
            unit: DEFAULT_UNIT.to_string(),
            status: CatalogStatus::Active,
        }
    }

    /// ## Rules
    /// - code: required, ≤ 255 (uniqueness enforced by the database)
    /// - name: required, ≤ 255
    /// - category_id: a UUID
    /// - prices: ≥ 0
    /// - stock_quantity, min_stock_level: 0 to MAX_STOCK_LEVEL
    /// - unit: required, ≤ 50
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_code(&self.code)?;
        validate_name(&self.name)?;
        validate_optional_text("description", self.description.as_deref(), 2000)?;
        validate_uuid("category_id", &self.category_id)?;
        validate_non_negative_amount("purchase_price", self.purchase_price)?;
        validate_non_negative_amount("selling_price", self.selling_price)?;
        validate_stock_level("stock_quantity", self.stock_quantity)?;
        validate_stock_level("min_stock_level", self.min_stock_level)?;
        validate_unit(&self.unit)?;
        Ok(())
    }
}

// =============================================================================
// Category Input
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: CatalogStatus,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryInput {
            name: name.into(),
            description: None,
            status: CatalogStatus::Active,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_optional_text("description", self.description.as_deref(), MAX_TEXT_LEN * 4)?;
        Ok(())
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Product listing filters. Every field is optional; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFilter {
    /// Matches code or name, case-insensitively, anywhere in the text.
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<CatalogStatus>,
    /// Only products at or below their threshold.
    #[serde(default)]
    pub low_stock: bool,
}

impl ProductFilter {
    /// Trims the search term and drops it when blank.
    pub fn normalized(mut self) -> ValidationResult<Self> {
        self.search = match self.search.as_deref() {
            Some(q) => validate_search_query(q)?,
            None => None,
        };
        Ok(self)
    }

    /// The search term as a SQL `LIKE` pattern.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// Category listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryFilter {
    pub search: Option<String>,
    pub status: Option<CatalogStatus>,
}

impl CategoryFilter {
    pub fn normalized(mut self) -> ValidationResult<Self> {
        self.search = match self.search.as_deref() {
            Some(q) => validate_search_query(q)?,
            None => None,
        };
        Ok(self)
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// `%term%` with LIKE wildcards in the term escaped (`ESCAPE '\'`).
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Pagination
// =============================================================================

/// Default page size of listing screens.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Largest page size a caller may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> ValidationResult<Self> {
        if page == 0 {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ValidationError::OutOfRange {
                field: "per_page".to_string(),
                min: 1,
                max: MAX_PER_PAGE as i64,
            });
        }
        Ok(PageRequest { page, per_page })
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the numbers a pager needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    /// Always at least 1, even for an empty result.
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let per_page = request.per_page as i64;
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Page {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            last_page: last_page as u32,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
