//! Catalog and stock commands.

use serde::Serialize;
use tracing::info;

use super::{authorize, resolve_category, resolve_product, AppContext};
use crate::cli::{AdjustmentArgs, ProductCreateArgs, ProductUpdateArgs};
use crate::error::ApiError;
use kasir_core::catalog::{CategoryFilter, CategoryInput, Page, PageRequest, ProductFilter, ProductInput};
use kasir_core::{
    Capability, CatalogProduct, CatalogStatus, Category, CategorySummary, Money, Product,
    StockMovement, StockMovementView,
};
use kasir_db::StockAdjustment;

use super::pos::enum_label;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub category_name: Option<String>,
    pub purchase_price: i64,
    pub selling_price: i64,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub unit: String,
    pub status: String,
    pub is_low_stock: bool,
    pub updated_at: String,
}

impl ProductDto {
    fn new(p: Product, category_name: Option<String>) -> Self {
        ProductDto {
            is_low_stock: p.is_low_stock(),
            status: p.status.as_str().to_string(),
            purchase_price: p.purchase_price.minor_units(),
            selling_price: p.selling_price.minor_units(),
            updated_at: p.updated_at.to_rfc3339(),
            id: p.id,
            code: p.code,
            name: p.name,
            description: p.description,
            category_id: p.category_id,
            category_name,
            stock_quantity: p.stock_quantity,
            min_stock_level: p.min_stock_level,
            unit: p.unit,
        }
    }
}

impl From<CatalogProduct> for ProductDto {
    fn from(c: CatalogProduct) -> Self {
        ProductDto::new(c.product, c.category_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub product_count: i64,
}

impl CategoryDto {
    fn new(c: Category, product_count: i64) -> Self {
        CategoryDto {
            status: c.status.as_str().to_string(),
            id: c.id,
            name: c.name,
            description: c.description,
            product_count,
        }
    }
}

impl From<CategorySummary> for CategoryDto {
    fn from(s: CategorySummary) -> Self {
        CategoryDto::new(s.category, s.product_count)
    }
}

/// One ledger row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub user_id: String,
    pub user_name: Option<String>,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub notes: Option<String>,
    pub reference: Option<String>,
    pub timestamp: String,
}

impl From<StockMovement> for MovementDto {
    fn from(m: StockMovement) -> Self {
        MovementDto {
            movement_type: enum_label(&m.movement_type),
            timestamp: m.created_at.to_rfc3339(),
            id: m.id,
            product_id: m.product_id,
            product_name: None,
            user_id: m.user_id,
            user_name: None,
            quantity: m.quantity,
            stock_before: m.stock_before,
            stock_after: m.stock_after,
            notes: m.notes,
            reference: m.reference,
        }
    }
}

impl From<StockMovementView> for MovementDto {
    fn from(v: StockMovementView) -> Self {
        MovementDto {
            product_name: Some(v.product_name),
            user_name: Some(v.user_name),
            ..MovementDto::from(v.movement)
        }
    }
}

/// Result of a restock or write-off.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentDto {
    pub product: ProductDto,
    pub movement: MovementDto,
}

impl From<StockAdjustment> for AdjustmentDto {
    fn from(a: StockAdjustment) -> Self {
        AdjustmentDto {
            product: ProductDto::new(a.product, None),
            movement: a.movement.into(),
        }
    }
}

pub async fn list_products(
    ctx: &AppContext,
    filter: &ProductFilter,
    page: PageRequest,
) -> Result<Page<ProductDto>, ApiError> {
    let result = ctx.db.products().list(filter, page).await?;
    Ok(Page {
        items: result.items.into_iter().map(ProductDto::from).collect(),
        page: result.page,
        per_page: result.per_page,
        total: result.total,
        last_page: result.last_page,
    })
}

pub async fn list_categories(
    ctx: &AppContext,
    filter: &CategoryFilter,
) -> Result<Vec<CategoryDto>, ApiError> {
    let categories = ctx.db.categories().list(filter).await?;
    Ok(categories.into_iter().map(CategoryDto::from).collect())
}

/// Books a delivery of `args.quantity` units.
pub async fn restock(ctx: &AppContext, args: &AdjustmentArgs) -> Result<AdjustmentDto, ApiError> {
    let user = authorize(&ctx.db, &args.user, Capability::InventoryUpdate).await?;
    let product = resolve_product(&ctx.db, &args.product).await?;

    let adjustment = ctx
        .db
        .inventory()
        .restock(
            &product.id,
            args.quantity,
            &user.id,
            args.notes.as_deref(),
            args.reference.as_deref(),
        )
        .await?;

    Ok(adjustment.into())
}

/// Takes damaged or expired units off the shelf.
pub async fn write_off(ctx: &AppContext, args: &AdjustmentArgs) -> Result<AdjustmentDto, ApiError> {
    let user = authorize(&ctx.db, &args.user, Capability::InventoryUpdate).await?;
    let product = resolve_product(&ctx.db, &args.product).await?;

    let adjustment = ctx
        .db
        .inventory()
        .write_off(
            &product.id,
            args.quantity,
            &user.id,
            args.notes.as_deref(),
            args.reference.as_deref(),
        )
        .await?;

    Ok(adjustment.into())
}

// =============================================================================
// Catalog Maintenance
// =============================================================================

/// Adds a product under an existing category.
pub async fn create_product(
    ctx: &AppContext,
    args: &ProductCreateArgs,
) -> Result<ProductDto, ApiError> {
    authorize(&ctx.db, &args.user, Capability::InventoryCreate).await?;
    let category = resolve_category(&ctx.db, &args.category).await?;

    let mut input = ProductInput::new(
        &args.code,
        &args.name,
        &category.id,
        args.purchase_price(),
        args.selling_price(),
        args.stock,
    );
    input.min_stock_level = args.min_stock;
    input.unit = args.unit.clone();
    input.description = args.description.clone();

    let product = ctx.db.products().insert(&input).await?;
    info!(code = %product.code, "Product created");

    Ok(ProductDto::new(product, Some(category.name)))
}

/// Applies the given fields over the stored product. A changed stock level
/// is written to the ledger as a manual adjustment by the acting user.
pub async fn update_product(
    ctx: &AppContext,
    args: &ProductUpdateArgs,
) -> Result<ProductDto, ApiError> {
    let user = authorize(&ctx.db, &args.user, Capability::InventoryUpdate).await?;
    let product = resolve_product(&ctx.db, &args.product).await?;

    let category = match &args.category {
        Some(key) => Some(resolve_category(&ctx.db, key).await?),
        None => ctx.db.categories().get_by_id(&product.category_id).await?,
    };

    let input = ProductInput {
        code: args.code.clone().unwrap_or(product.code),
        name: args.name.clone().unwrap_or(product.name),
        description: args.description.clone().or(product.description),
        category_id: category
            .as_ref()
            .map(|c| c.id.clone())
            .unwrap_or(product.category_id),
        purchase_price: args
            .purchase_price
            .map(Money::from_minor)
            .unwrap_or(product.purchase_price),
        selling_price: args
            .selling_price
            .map(Money::from_minor)
            .unwrap_or(product.selling_price),
        stock_quantity: args.stock.unwrap_or(product.stock_quantity),
        min_stock_level: args.min_stock.unwrap_or(product.min_stock_level),
        unit: args.unit.clone().unwrap_or(product.unit),
        status: args.status.unwrap_or(product.status),
    };

    let updated = ctx.db.products().update(&product.id, &input, &user.id).await?;
    info!(code = %updated.code, user = %user.email, "Product updated");

    Ok(ProductDto::new(updated, category.map(|c| c.name)))
}

/// Takes a product off the till. Past sales and movements keep it.
pub async fn deactivate_product(
    ctx: &AppContext,
    key: &str,
    user: &str,
) -> Result<ProductDto, ApiError> {
    authorize(&ctx.db, user, Capability::InventoryDelete).await?;
    let product = resolve_product(&ctx.db, key).await?;

    ctx.db.products().deactivate(&product.id).await?;

    let product = ctx
        .db
        .products()
        .get_by_id(&product.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", key))?;
    Ok(ProductDto::new(product, None))
}

pub async fn create_category(
    ctx: &AppContext,
    name: &str,
    description: Option<String>,
    user: &str,
) -> Result<CategoryDto, ApiError> {
    authorize(&ctx.db, user, Capability::CategoriesCreate).await?;

    let mut input = CategoryInput::new(name);
    input.description = description;
    let category = ctx.db.categories().insert(&input).await?;

    Ok(CategoryDto::new(category, 0))
}

/// Category fields to change; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CatalogStatus>,
}

pub async fn update_category(
    ctx: &AppContext,
    key: &str,
    changes: CategoryChanges,
    user: &str,
) -> Result<CategoryDto, ApiError> {
    authorize(&ctx.db, user, Capability::CategoriesUpdate).await?;
    let category = resolve_category(&ctx.db, key).await?;

    let input = CategoryInput {
        name: changes.name.unwrap_or(category.name),
        description: changes.description.or(category.description),
        status: changes.status.unwrap_or(category.status),
    };
    let updated = ctx.db.categories().update(&category.id, &input).await?;

    let summary = ctx
        .db
        .categories()
        .summary(&updated.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", key))?;
    Ok(summary.into())
}

/// Removes an unused category. One that still has products is refused.
pub async fn delete_category(
    ctx: &AppContext,
    key: &str,
    user: &str,
) -> Result<CategoryDto, ApiError> {
    authorize(&ctx.db, user, Capability::CategoriesDelete).await?;
    let category = resolve_category(&ctx.db, key).await?;

    ctx.db.categories().delete(&category.id).await?;
    info!(name = %category.name, "Category deleted");

    Ok(CategoryDto::new(category, 0))
}

/// Ledger of one product, or of the whole shop when `product` is `None`.
pub async fn movements(
    ctx: &AppContext,
    product: Option<&str>,
    limit: u32,
) -> Result<Vec<MovementDto>, ApiError> {
    let repo = ctx.db.stock_movements();
    let rows = match product {
        Some(key) => {
            let product = resolve_product(&ctx.db, key).await?;
            repo.for_product(&product.id, limit).await?
        }
        None => repo.recent(limit).await?,
    };
    Ok(rows.into_iter().map(MovementDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::pos::checkout_request;
    use crate::commands::test_support::shop;
    use crate::error::ErrorCode;
    use kasir_core::{CartLine, CheckoutRequest, Money, PaymentMethod};

    fn adjustment(product: &str, quantity: i64, user: &str) -> AdjustmentArgs {
        AdjustmentArgs {
            product: product.to_string(),
            quantity,
            user: user.to_string(),
            notes: None,
            reference: Some("SJ-0192".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_products_and_categories() {
        let shop = shop().await;

        let page = list_products(&shop.ctx, &ProductFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].code, "GULA-01");
        assert!(page.items[0].is_low_stock);
        assert_eq!(page.items[1].selling_price, 1_450_000);

        let low = ProductFilter {
            low_stock: true,
            ..Default::default()
        };
        let page = list_products(&shop.ctx, &low, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);

        let categories = list_categories(&shop.ctx, &CategoryFilter::default()).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].product_count, 2);
        assert_eq!(categories[0].status, "active");
    }

    #[tokio::test]
    async fn test_restock_and_write_off() {
        let shop = shop().await;

        let restocked = restock(&shop.ctx, &adjustment("GULA-01", 20, "warehouse@umkm.com"))
            .await
            .unwrap();
        assert_eq!(restocked.product.stock_quantity, 24);
        assert_eq!(restocked.movement.movement_type, "in");
        assert_eq!(restocked.movement.stock_before, 4);
        assert_eq!(restocked.movement.reference.as_deref(), Some("SJ-0192"));

        let written_off = write_off(&shop.ctx, &adjustment(&shop.gula.id, 3, "owner@umkm.com"))
            .await
            .unwrap();
        assert_eq!(written_off.product.stock_quantity, 21);
        assert_eq!(written_off.movement.movement_type, "out");

        let err = write_off(&shop.ctx, &adjustment("GULA-01", 100, "owner@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = restock(&shop.ctx, &adjustment("GULA-01", 5, "cashier@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = restock(&shop.ctx, &adjustment("TEH-99", 5, "owner@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = restock(&shop.ctx, &adjustment("GULA-01", 0, "owner@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_movements_include_sales() {
        let shop = shop().await;

        let request = CheckoutRequest {
            items: vec![CartLine::new(&shop.kopi.id, 3, Money::from_rupiah(14_500))],
            customer_name: None,
            payment_method: PaymentMethod::Qris,
            amount_paid: Money::from_rupiah(50_000),
            discount_amount: Money::zero(),
        };
        let receipt = checkout_request(&shop.ctx, &request, &shop.cashier.id).await.unwrap();

        let rows = movements(&shop.ctx, Some("KOPI-01"), 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movement_type, "out");
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[0].stock_after, 27);
        assert_eq!(rows[0].reference.as_deref(), Some(receipt.invoice_number.as_str()));
        assert_eq!(rows[0].user_name.as_deref(), Some("Kasir"));

        assert_eq!(movements(&shop.ctx, None, 10).await.unwrap().len(), 1);
        assert!(movements(&shop.ctx, Some("GULA-01"), 10).await.unwrap().is_empty());
    }

    fn create_args(code: &str, category: &str, user: &str) -> ProductCreateArgs {
        ProductCreateArgs {
            code: code.to_string(),
            name: "Teh Celup 25s".to_string(),
            category: category.to_string(),
            purchase_price: 600_000,
            selling_price: 750_000,
            stock: 12,
            min_stock: 5,
            unit: "box".to_string(),
            description: None,
            user: user.to_string(),
        }
    }

    fn update_args(product: &str, user: &str) -> ProductUpdateArgs {
        ProductUpdateArgs {
            product: product.to_string(),
            code: None,
            name: None,
            category: None,
            purchase_price: None,
            selling_price: None,
            stock: None,
            min_stock: None,
            unit: None,
            description: None,
            status: None,
            user: user.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_under_named_category() {
        let shop = shop().await;

        let created = create_product(&shop.ctx, &create_args("TEH-01", "sembako", "owner@umkm.com"))
            .await
            .unwrap();
        assert_eq!(created.code, "TEH-01");
        assert_eq!(created.category_id, shop.kopi.category_id);
        assert_eq!(created.category_name.as_deref(), Some("Sembako"));
        assert_eq!(created.selling_price, 750_000);
        assert_eq!(created.stock_quantity, 12);
        assert_eq!(created.unit, "box");

        let err = create_product(&shop.ctx, &create_args("TEH-01", "Sembako", "owner@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&shop.ctx, &create_args("TEH-02", "Minuman", "owner@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = create_product(&shop.ctx, &create_args("TEH-03", "Sembako", "cashier@umkm.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_stock_edit_is_booked_as_manual_adjustment() {
        let shop = shop().await;

        let mut args = update_args("KOPI-01", "warehouse@umkm.com");
        args.stock = Some(25);
        let updated = update_product(&shop.ctx, &args).await.unwrap();
        assert_eq!(updated.stock_quantity, 25);
        assert_eq!(updated.name, "Kopi Bubuk 165g");
        assert_eq!(updated.category_name.as_deref(), Some("Sembako"));

        let rows = movements(&shop.ctx, Some("KOPI-01"), 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movement_type, "out");
        assert_eq!(rows[0].quantity, 5);
        assert_eq!(rows[0].stock_before, 30);
        assert_eq!(rows[0].stock_after, 25);
        assert_eq!(rows[0].notes.as_deref(), Some(kasir_core::MANUAL_ADJUSTMENT_NOTE));
        assert_eq!(rows[0].user_name.as_deref(), Some("Gudang"));

        // No stock change, no ledger row
        let mut args = update_args(&shop.kopi.id, "owner@umkm.com");
        args.name = Some("Kopi Bubuk 200g".to_string());
        let renamed = update_product(&shop.ctx, &args).await.unwrap();
        assert_eq!(renamed.name, "Kopi Bubuk 200g");
        assert_eq!(renamed.stock_quantity, 25);
        assert_eq!(movements(&shop.ctx, Some("KOPI-01"), 10).await.unwrap().len(), 1);

        let mut args = update_args("KOPI-01", "cashier@umkm.com");
        args.stock = Some(100);
        let err = update_product(&shop.ctx, &args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let mut args = update_args("KOPI-01", "owner@umkm.com");
        args.selling_price = Some(-1);
        let err = update_product(&shop.ctx, &args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(resolve_product(&shop.ctx.db, "KOPI-01").await.unwrap().stock_quantity, 25);
    }

    #[tokio::test]
    async fn test_deactivate_product() {
        let shop = shop().await;

        let err = deactivate_product(&shop.ctx, "GULA-01", "cashier@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let retired = deactivate_product(&shop.ctx, "GULA-01", "warehouse@umkm.com")
            .await
            .unwrap();
        assert_eq!(retired.status, "inactive");

        let active = ProductFilter {
            status: Some(CatalogStatus::Active),
            ..Default::default()
        };
        let page = list_products(&shop.ctx, &active, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "KOPI-01");

        let err = deactivate_product(&shop.ctx, "TEH-99", "owner@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_category_maintenance() {
        let shop = shop().await;

        let drinks = create_category(
            &shop.ctx,
            "Minuman",
            Some("Teh, kopi siap minum".to_string()),
            "warehouse@umkm.com",
        )
        .await
        .unwrap();
        assert_eq!(drinks.product_count, 0);
        assert_eq!(drinks.status, "active");

        let changes = CategoryChanges {
            name: Some("Minuman Dingin".to_string()),
            status: Some(CatalogStatus::Inactive),
            ..Default::default()
        };
        let renamed = update_category(&shop.ctx, "minuman", changes, "owner@umkm.com")
            .await
            .unwrap();
        assert_eq!(renamed.id, drinks.id);
        assert_eq!(renamed.name, "Minuman Dingin");
        assert_eq!(renamed.status, "inactive");
        assert_eq!(renamed.description.as_deref(), Some("Teh, kopi siap minum"));

        let sembako = update_category(&shop.ctx, "Sembako", CategoryChanges::default(), "owner@umkm.com")
            .await
            .unwrap();
        assert_eq!(sembako.product_count, 2);

        // Still holds KOPI-01 and GULA-01
        let err = delete_category(&shop.ctx, "Sembako", "owner@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("in use"));

        let err = delete_category(&shop.ctx, &drinks.id, "cashier@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let deleted = delete_category(&shop.ctx, &drinks.id, "warehouse@umkm.com")
            .await
            .unwrap();
        assert_eq!(deleted.name, "Minuman Dingin");

        let categories = list_categories(&shop.ctx, &CategoryFilter::default()).await.unwrap();
        assert_eq!(categories.len(), 1);

        let err = create_category(&shop.ctx, "Sembako", None, "owner@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = create_category(&shop.ctx, "Roti", None, "cashier@umkm.com")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
