//! # Command-Line Parsing
//!
//! ```text
//! kasir checkout <cart.json | -> --cashier <user>
//! kasir sale <invoice-number | sale-id>
//! kasir sales [--limit N]
//! kasir products [--search TEXT] [--category ID] [--status active|inactive]
//!                [--low-stock] [--page N] [--per-page N]
//! kasir pos-catalog
//! kasir categories [--search TEXT] [--status active|inactive]
//! kasir restock <product> <qty> --user <user> [--notes TEXT] [--ref TEXT]
//! kasir write-off <product> <qty> --user <user> [--notes TEXT] [--ref TEXT]
//! kasir movements [<product>] [--limit N]
//! kasir dashboard --user <user>
//! kasir users
//! kasir health
//! kasir product create|update|deactivate ...
//! kasir category create|update|delete ...
//! ```
//!
//! `<user>` is a user id or email; `<product>` a product id or code;
//! `<category>` a category id or name. Prices are integer sen.

use clap::{Args, Parser, Subcommand};

use kasir_core::catalog::{CategoryFilter, PageRequest, ProductFilter, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use kasir_core::{CatalogStatus, Money, ValidationError, DEFAULT_MIN_STOCK_LEVEL, DEFAULT_UNIT};

const DEFAULT_LIST_LIMIT: u32 = 20;

const ENVIRONMENT_HELP: &str = "\
Environment:
  KASIR_DB_PATH, KASIR_STORE_NAME, KASIR_DB_MAX_CONNECTIONS,
  KASIR_LOW_STOCK_LIMIT, RUST_LOG";

#[derive(Debug, Parser)]
#[command(name = "kasir", version, about = "Kasir POS operator terminal")]
#[command(after_help = ENVIRONMENT_HELP, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Record a sale from a JSON cart
    Checkout {
        /// Cart file, or `-` for stdin
        cart: String,

        /// Cashier id or email
        #[arg(long)]
        cashier: String,
    },

    /// Show one sale with its lines
    Sale {
        /// Invoice number or sale id
        key: String,
    },

    /// Latest sales
    Sales {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },

    /// Catalog listing
    Products(ProductsArgs),

    /// Products a cashier can sell
    PosCatalog,

    /// Categories with product counts
    Categories(CategoriesArgs),

    /// Book a delivery
    Restock(AdjustmentArgs),

    /// Take damaged or expired units off the shelf
    WriteOff(AdjustmentArgs),

    /// Stock ledger, of one product or the whole shop
    Movements {
        /// Product id or code
        product: Option<String>,

        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },

    /// Dashboard for that user's role
    Dashboard {
        #[arg(long)]
        user: String,
    },

    /// Staff accounts
    Users,

    /// Database status
    Health,

    /// Create, edit or retire products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Create, edit or remove categories
    #[command(subcommand)]
    Category(CategoryCommand),
}

// =============================================================================
// Listings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ProductsArgs {
    /// Match against code or name
    #[arg(long)]
    pub search: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,

    /// active or inactive
    #[arg(long)]
    pub status: Option<CatalogStatus>,

    /// Only products at or below their threshold
    #[arg(long)]
    pub low_stock: bool,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    #[arg(
        long,
        default_value_t = DEFAULT_PER_PAGE,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PER_PAGE as i64)
    )]
    pub per_page: u32,
}

impl ProductsArgs {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone(),
            category_id: self.category.clone(),
            status: self.status,
            low_stock: self.low_stock,
        }
    }

    pub fn page_request(&self) -> Result<PageRequest, ValidationError> {
        PageRequest::new(self.page, self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CategoriesArgs {
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<CatalogStatus>,
}

impl CategoriesArgs {
    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter {
            search: self.search.clone(),
            status: self.status,
        }
    }
}

// =============================================================================
// Stock Adjustments
// =============================================================================

/// Arguments of a restock or write-off.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct AdjustmentArgs {
    /// Product id or code
    pub product: String,

    /// Units moved
    pub quantity: i64,

    /// Acting user id or email
    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub notes: Option<String>,

    /// Delivery note or other document number
    #[arg(long = "ref")]
    pub reference: Option<String>,
}

// =============================================================================
// Catalog Maintenance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ProductCommand {
    /// Add a product to the catalog
    Create(ProductCreateArgs),

    /// Change product fields; a new --stock is booked as a manual adjustment
    Update(ProductUpdateArgs),

    /// Hide a product from the till; its sales stay intact
    Deactivate {
        /// Product id or code
        product: String,

        #[arg(long)]
        user: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ProductCreateArgs {
    pub code: String,

    pub name: String,

    /// Category id or name
    #[arg(long)]
    pub category: String,

    /// Cost per unit, in sen
    #[arg(long)]
    pub purchase_price: i64,

    /// Shelf price per unit, in sen
    #[arg(long)]
    pub selling_price: i64,

    /// Opening stock
    #[arg(long, default_value_t = 0)]
    pub stock: i64,

    /// Low-stock threshold
    #[arg(long, default_value_t = DEFAULT_MIN_STOCK_LEVEL)]
    pub min_stock: i64,

    #[arg(long, default_value = DEFAULT_UNIT)]
    pub unit: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Acting user id or email
    #[arg(long)]
    pub user: String,
}

// Fields left out keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ProductUpdateArgs {
    /// Product id or code
    pub product: String,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Category id or name
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub purchase_price: Option<i64>,

    #[arg(long)]
    pub selling_price: Option<i64>,

    /// Counted stock; the difference goes to the ledger
    #[arg(long)]
    pub stock: Option<i64>,

    #[arg(long)]
    pub min_stock: Option<i64>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<CatalogStatus>,

    /// Acting user id or email
    #[arg(long)]
    pub user: String,
}

impl ProductCreateArgs {
    pub fn purchase_price(&self) -> Money {
        Money::from_minor(self.purchase_price)
    }

    pub fn selling_price(&self) -> Money {
        Money::from_minor(self.selling_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CategoryCommand {
    /// Add a category
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        user: String,
    },

    /// Rename, describe or retire a category
    Update {
        /// Category id or name
        category: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<CatalogStatus>,

        #[arg(long)]
        user: String,
    },

    /// Remove a category no product uses
    Delete {
        /// Category id or name
        category: String,

        #[arg(long)]
        user: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse_line(line: &str) -> Result<Command, clap::Error> {
        let args = std::iter::once("kasir").chain(line.split_whitespace());
        Cli::try_parse_from(args).map(|cli| cli.command)
    }

    #[test]
    fn test_checkout() {
        assert_eq!(
            parse_line("checkout cart.json --cashier cashier@umkm.com").unwrap(),
            Command::Checkout {
                cart: "cart.json".to_string(),
                cashier: "cashier@umkm.com".to_string(),
            }
        );
        // Options may come first; "-" reads stdin
        assert_eq!(
            parse_line("checkout --cashier u-1 -").unwrap(),
            Command::Checkout {
                cart: "-".to_string(),
                cashier: "u-1".to_string(),
            }
        );
        let err = parse_line("checkout cart.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_products_filters() {
        let command =
            parse_line("products --search kopi --status active --low-stock --page 2 --per-page 50")
                .unwrap();
        match command {
            Command::Products(args) => {
                let filter = args.filter();
                assert_eq!(filter.search.as_deref(), Some("kopi"));
                assert_eq!(filter.status, Some(CatalogStatus::Active));
                assert!(filter.low_stock);
                let page = args.page_request().unwrap();
                assert_eq!(page.page, 2);
                assert_eq!(page.per_page, 50);
            }
            other => panic!("unexpected {other:?}"),
        }

        match parse_line("products").unwrap() {
            Command::Products(args) => {
                assert_eq!(args.page, 1);
                assert_eq!(args.per_page, DEFAULT_PER_PAGE);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(parse_line("products --status archived").is_err());
        assert!(parse_line("products --per-page 500").is_err());
        assert!(parse_line("products --page 0").is_err());
    }

    #[test]
    fn test_adjustments() {
        let command = parse_line("restock BRG-001 24 --user warehouse@umkm.com --ref SJ-0192").unwrap();
        assert_eq!(
            command,
            Command::Restock(AdjustmentArgs {
                product: "BRG-001".to_string(),
                quantity: 24,
                user: "warehouse@umkm.com".to_string(),
                notes: None,
                reference: Some("SJ-0192".to_string()),
            })
        );

        let err = parse_line("write-off BRG-001 lots --user u").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(parse_line("write-off BRG-001 --user u").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse_line("sales").unwrap(), Command::Sales { limit: 20 });
        assert_eq!(
            parse_line("movements BRG-001 --limit 5").unwrap(),
            Command::Movements {
                product: Some("BRG-001".to_string()),
                limit: 5,
            }
        );
        assert_eq!(parse_line("pos-catalog").unwrap(), Command::PosCatalog);
    }

    #[test]
    fn test_product_maintenance() {
        let command = parse_line(
            "product create TEH-01 Teh --category Sembako --purchase-price 300000 \
             --selling-price 400000 --stock 12 --user owner@umkm.com",
        )
        .unwrap();
        match command {
            Command::Product(ProductCommand::Create(args)) => {
                assert_eq!(args.code, "TEH-01");
                assert_eq!(args.selling_price(), Money::from_rupiah(4_000));
                assert_eq!(args.stock, 12);
                assert_eq!(args.min_stock, DEFAULT_MIN_STOCK_LEVEL);
                assert_eq!(args.unit, DEFAULT_UNIT);
            }
            other => panic!("unexpected {other:?}"),
        }

        match parse_line("product update KOPI-01 --stock 25 --user warehouse@umkm.com").unwrap() {
            Command::Product(ProductCommand::Update(args)) => {
                assert_eq!(args.product, "KOPI-01");
                assert_eq!(args.stock, Some(25));
                assert_eq!(args.name, None);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            parse_line("product deactivate KOPI-01 --user owner@umkm.com").unwrap(),
            Command::Product(ProductCommand::Deactivate {
                product: "KOPI-01".to_string(),
                user: "owner@umkm.com".to_string(),
            })
        );

        // --user is always required
        assert!(parse_line("product deactivate KOPI-01").is_err());
    }

    #[test]
    fn test_category_maintenance() {
        assert_eq!(
            parse_line("category update Sembako --status inactive --user owner@umkm.com").unwrap(),
            Command::Category(CategoryCommand::Update {
                category: "Sembako".to_string(),
                name: None,
                description: None,
                status: Some(CatalogStatus::Inactive),
                user: "owner@umkm.com".to_string(),
            })
        );
        assert!(parse_line("category delete --user owner@umkm.com").is_err());
    }

    #[test]
    fn test_rejects_unknown_input() {
        let err = parse_line("refund INV-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);

        let err = parse_line("users --verbose").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        assert!(parse_line("dashboard --user").is_err());
    }

    #[test]
    fn test_help_is_a_clap_display() {
        let err = parse_line("--help").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("pos-catalog"));

        let err = parse_line("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
    }

    #[test]
    fn test_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
