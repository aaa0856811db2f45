//! # Commands
//!
//! One function per CLI command. Each returns a serializable DTO; `execute`
//! turns it into the JSON printed on stdout.
//!
//! ```text
//! commands/
//! ├── mod.rs        ◄─── dispatch, lookups shared by commands
//! ├── pos.rs        ◄─── checkout, sale lookup, recent sales, POS catalog
//! ├── product.rs    ◄─── catalog, categories, maintenance, restock / write-off, ledger
//! └── dashboard.rs  ◄─── role-dependent dashboard
//! ```

pub mod dashboard;
pub mod pos;
pub mod product;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::cli::{CategoryCommand, Command, ProductCommand};
use crate::config::AppConfig;
use crate::error::ApiError;
use kasir_core::{Capability, Category, Product, User};
use kasir_db::Database;

/// What every command gets to work with.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: Database,
    pub config: AppConfig,
}

/// Runs one command and renders its result.
pub async fn execute(ctx: &AppContext, command: Command) -> Result<String, ApiError> {
    debug!(?command, "Executing command");

    match command {
        Command::Checkout { cart, cashier } => {
            to_json(&pos::checkout(ctx, &cart, &cashier).await?)
        }
        Command::Sale { key } => to_json(&pos::get_sale(ctx, &key).await?),
        Command::Sales { limit } => to_json(&pos::recent_sales(ctx, limit).await?),
        Command::PosCatalog => to_json(&pos::pos_catalog(ctx).await?),
        Command::Products(args) => {
            to_json(&product::list_products(ctx, &args.filter(), args.page_request()?).await?)
        }
        Command::Categories(args) => {
            to_json(&product::list_categories(ctx, &args.filter()).await?)
        }
        Command::Restock(args) => to_json(&product::restock(ctx, &args).await?),
        Command::WriteOff(args) => to_json(&product::write_off(ctx, &args).await?),
        Command::Movements { product, limit } => {
            to_json(&product::movements(ctx, product.as_deref(), limit).await?)
        }
        Command::Dashboard { user } => to_json(&dashboard::dashboard(ctx, &user).await?),
        Command::Users => to_json(&list_users(ctx).await?),
        Command::Health => {
            let healthy = ctx.db.health_check().await;
            let (embedded, applied) = ctx.db.migration_status().await?;
            to_json(&json!({
                "healthy": healthy,
                "database": ctx.config.db_path.display().to_string(),
                "migrations": { "embedded": embedded, "applied": applied },
            }))
        }
        Command::Product(action) => match action {
            ProductCommand::Create(args) => to_json(&product::create_product(ctx, &args).await?),
            ProductCommand::Update(args) => to_json(&product::update_product(ctx, &args).await?),
            ProductCommand::Deactivate { product, user } => {
                to_json(&product::deactivate_product(ctx, &product, &user).await?)
            }
        },
        Command::Category(action) => match action {
            CategoryCommand::Create {
                name,
                description,
                user,
            } => to_json(&product::create_category(ctx, &name, description, &user).await?),
            CategoryCommand::Update {
                category,
                name,
                description,
                status,
                user,
            } => {
                let changes = product::CategoryChanges {
                    name,
                    description,
                    status,
                };
                to_json(&product::update_category(ctx, &category, changes, &user).await?)
            }
            CategoryCommand::Delete { category, user } => {
                to_json(&product::delete_category(ctx, &category, &user).await?)
            }
        },
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Finds a user by id, or by email when the key contains `@`.
pub(crate) async fn resolve_user(db: &Database, key: &str) -> Result<User, ApiError> {
    let user = if key.contains('@') {
        db.users().get_by_email(key).await?
    } else {
        db.users().get_by_id(key).await?
    };
    user.ok_or_else(|| ApiError::not_found("User", key))
}

/// Like `resolve_user`, but also requires `capability`.
pub(crate) async fn authorize(
    db: &Database,
    key: &str,
    capability: Capability,
) -> Result<User, ApiError> {
    let user = resolve_user(db, key).await?;
    if !user.role.can(capability) {
        return Err(ApiError::forbidden(format!(
            "{} ({}) lacks {}",
            user.name,
            user.role.as_str(),
            capability
        )));
    }
    Ok(user)
}

/// Finds a product by id, then by code.
pub(crate) async fn resolve_product(db: &Database, key: &str) -> Result<Product, ApiError> {
    if let Some(product) = db.products().get_by_id(key).await? {
        return Ok(product);
    }
    db.products()
        .get_by_code(key)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", key))
}

/// Finds a category by id, then by name (case-insensitive).
pub(crate) async fn resolve_category(db: &Database, key: &str) -> Result<Category, ApiError> {
    if let Some(category) = db.categories().get_by_id(key).await? {
        return Ok(category);
    }
    db.categories()
        .get_by_name(key)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", key))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub capabilities: Vec<String>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            capabilities: u.role.capabilities().iter().map(|c| c.to_string()).collect(),
            role: u.role.as_str().to_string(),
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

async fn list_users(ctx: &AppContext) -> Result<Vec<UserDto>, ApiError> {
    let users = ctx.db.users().list().await?;
    Ok(users.into_iter().map(UserDto::from).collect())
}
