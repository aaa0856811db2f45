//! Fixtures shared by the in-crate tests.

use kasir_core::catalog::{CategoryInput, ProductInput};
use kasir_core::{Category, Money, Product, Role, User};

use crate::pool::{Database, DbConfig};

pub async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_user(db: &Database, role: Role) -> User {
    let email = format!("{}-{}@kasir.test", role.as_str(), uuid::Uuid::new_v4().simple());
    let name = match role {
        Role::ShopOwner => "Pemilik Toko",
        Role::WarehouseManager => "Kepala Gudang",
        Role::Cashier => "Kasir",
    };
    db.users().insert(name, &email, role).await.unwrap()
}

pub async fn seed_category(db: &Database, name: &str) -> Category {
    db.categories().insert(&CategoryInput::new(name)).await.unwrap()
}

pub async fn seed_product(
    db: &Database,
    category_id: &str,
    code: &str,
    price: Money,
    stock: i64,
) -> Product {
    let input = ProductInput::new(
        code,
        format!("Produk {code}"),
        category_id,
        price,
        price,
        stock,
    );
    db.products().insert(&input).await.unwrap()
}
