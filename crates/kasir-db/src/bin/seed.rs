//! # Seed Data Generator
//!
//! Populates an empty database with staff accounts, the standard categories,
//! sample products and a handful of demo sales.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir_dev.db
//! cargo run -p kasir-db --bin seed
//!
//! # Specify database path and number of demo sales
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db --sales 20
//! ```
//!
//! ## Accounts
//! - owner@umkm.com      (shop owner)
//! - warehouse@umkm.com  (warehouse manager)
//! - cashier@umkm.com    (cashier)

use std::env;

use kasir_core::catalog::{CategoryInput, ProductInput};
use kasir_core::{CartLine, CheckoutRequest, Money, PaymentMethod, Role};
use kasir_db::{Database, DbConfig};

const USERS: &[(&str, &str, Role)] = &[
    ("Shop Owner", "owner@umkm.com", Role::ShopOwner),
    ("Warehouse Manager", "warehouse@umkm.com", Role::WarehouseManager),
    ("Cashier", "cashier@umkm.com", Role::Cashier),
];

/// (name, description, code prefix)
const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Makanan & Minuman", "Produk makanan dan minuman", "MKN"),
    ("Elektronik", "Produk elektronik dan gadget", "ELK"),
    ("Pakaian", "Pakaian dan aksesoris fashion", "PKN"),
    ("Rumah Tangga", "Peralatan dan perlengkapan rumah tangga", "RMT"),
    ("Kesehatan & Kecantikan", "Produk kesehatan dan kecantikan", "KSH"),
    ("Alat Tulis Kantor", "Alat tulis dan perlengkapan kantor", "ATK"),
];

/// (category prefix, name, selling price in rupiah, unit)
const PRODUCTS: &[(&str, &str, i64, &str)] = &[
    ("MKN", "Beras Premium 5kg", 68_000, "karung"),
    ("MKN", "Minyak Goreng 2L", 36_500, "botol"),
    ("MKN", "Gula Pasir 1kg", 17_000, "kg"),
    ("MKN", "Indomie Goreng", 3_500, "pcs"),
    ("MKN", "Teh Botol 350ml", 5_000, "botol"),
    ("MKN", "Kopi Kapal Api 165g", 14_500, "pcs"),
    ("ELK", "Lampu LED 12W", 32_000, "pcs"),
    ("ELK", "Baterai AA (4)", 24_000, "pack"),
    ("ELK", "Kabel Data USB-C", 25_000, "pcs"),
    ("PKN", "Kaos Polos Hitam", 45_000, "pcs"),
    ("PKN", "Kaus Kaki", 12_000, "pasang"),
    ("RMT", "Sabun Cuci Piring 800ml", 15_500, "botol"),
    ("RMT", "Sapu Ijuk", 27_000, "pcs"),
    ("RMT", "Deterjen Bubuk 1kg", 22_000, "pcs"),
    ("KSH", "Sabun Mandi", 4_500, "pcs"),
    ("KSH", "Pasta Gigi 190g", 13_000, "pcs"),
    ("KSH", "Sampo Sachet", 1_000, "sachet"),
    ("ATK", "Buku Tulis 58 Lembar", 5_500, "pcs"),
    ("ATK", "Pulpen Hitam", 3_000, "pcs"),
    ("ATK", "Kertas HVS A4 70g", 52_000, "rim"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 5;
    let mut db_path = String::from("./kasir_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(5);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of demo sales to record (default: 5)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Staff
    println!();
    let mut cashier_id = None;
    let mut manager_id = None;
    for (name, email, role) in USERS {
        let user = db.users().insert(name, email, *role).await?;
        println!("  {} <{}> ({})", user.name, user.email, role.as_str());
        match role {
            Role::Cashier => cashier_id = Some(user.id),
            Role::WarehouseManager => manager_id = Some(user.id),
            Role::ShopOwner => {}
        }
    }
    let cashier_id = cashier_id.ok_or("no cashier account seeded")?;
    let manager_id = manager_id.ok_or("no warehouse account seeded")?;
    println!("✓ {} users", USERS.len());

    // Catalog
    let mut product_ids = Vec::new();
    for (category_name, description, prefix) in CATEGORIES {
        let mut input = CategoryInput::new(*category_name);
        input.description = Some(description.to_string());
        let category = db.categories().insert(&input).await?;

        let mut index = 0;
        for (product_prefix, name, price, unit) in PRODUCTS.iter().filter(|p| p.0 == *prefix) {
            index += 1;
            let selling = Money::from_rupiah(*price);
            // Purchase price 75-90% of the selling price
            let purchase = Money::from_minor(selling.minor_units() * (75 + (index as i64 * 5) % 16) / 100);
            let stock = (index as i64 * 37) % 120;

            let mut input = ProductInput::new(
                format!("{}-{:03}", product_prefix, index),
                *name,
                &category.id,
                purchase,
                selling,
                stock,
            );
            input.unit = unit.to_string();

            match db.products().insert(&input).await {
                Ok(product) => product_ids.push(product.id),
                Err(e) => eprintln!("Failed to insert {}: {}", input.code, e),
            }
        }
    }
    println!("✓ {} categories, {} products", CATEGORIES.len(), product_ids.len());

    // Top every product up so the demo sales have something to sell
    for id in &product_ids {
        db.inventory()
            .restock(id, 24, &manager_id, Some("Stok awal"), Some("SEED"))
            .await?;
    }
    println!("✓ Opening stock received");

    // Demo sales
    let checkout = db.checkout();
    let mut recorded = 0;
    for n in 0..sales {
        let lines: Vec<CartLine> = product_ids
            .iter()
            .skip(n % product_ids.len().max(1))
            .step_by(5)
            .take(3)
            .map(|id| CartLine::new(id, 1 + (n as i64 % 3), Money::zero()))
            .collect();
        if lines.is_empty() {
            break;
        }

        let mut priced = Vec::with_capacity(lines.len());
        for mut line in lines {
            if let Some(product) = db.products().get_by_id(&line.product_id).await? {
                line.price = product.selling_price;
                priced.push(line);
            }
        }

        let request = CheckoutRequest {
            items: priced,
            customer_name: None,
            payment_method: PaymentMethod::Cash,
            amount_paid: Money::from_rupiah(1_000_000),
            discount_amount: Money::zero(),
        };

        match checkout.process(&request, &cashier_id).await {
            Ok(receipt) => {
                recorded += 1;
                println!(
                    "  {}  {}",
                    receipt.sale.invoice_number, receipt.sale.total_amount
                );
            }
            Err(e) => eprintln!("Demo sale {} failed: {}", n + 1, e),
        }
    }
    println!("✓ {} demo sales", recorded);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
