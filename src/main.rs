use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use sweetcart::application::engine::CartEngine;
use sweetcart::domain::cart::{ProductId, Quantity};
use sweetcart::domain::ports::{CartSlotBox, Catalog, Notifier, PurchaseServiceBox};
use sweetcart::domain::product::{Product, ProductQuery};
use sweetcart::domain::store::CartStore;
use sweetcart::infrastructure::console::ConsoleNotifier;
use sweetcart::infrastructure::file::FileSlot;
use sweetcart::infrastructure::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT, HttpStorefront};
use sweetcart::infrastructure::in_memory::InMemoryInventory;
use sweetcart::interfaces::csv::cart_writer::CartWriter;
use sweetcart::interfaces::csv::product_reader::ProductReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the persisted cart.
    #[arg(long, env = "SWEETCART_CART_DIR", default_value = ".sweetcart")]
    cart_dir: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "SWEETCART_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Base URL of the storefront API.
    #[arg(long, env = "SWEETCART_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token attached to API requests.
    #[arg(long, env = "SWEETCART_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Products CSV to use instead of the API. Purchases then run against
    /// the file's stock, in memory.
    #[arg(long, env = "SWEETCART_CATALOG")]
    catalog: Option<PathBuf>,

    /// Request timeout for API calls, in seconds.
    #[arg(long, env = "SWEETCART_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cart's lines as CSV.
    Show,
    /// Print item count and subtotal as CSV.
    Totals,
    /// Add a catalog product to the cart.
    Add {
        product_id: String,
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove a product from the cart.
    Remove { product_id: String },
    /// Set the quantity of a product already in the cart.
    Update {
        product_id: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Empty the cart.
    Clear,
    /// List catalog products as CSV.
    Catalog {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Purchase every line in the cart.
    Checkout,
    /// Purchase a product directly, bypassing the cart.
    Buy {
        product_id: String,
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },
}

/// Where products come from and where purchases go.
enum Storefront {
    Remote(HttpStorefront),
    Offline(InMemoryInventory),
}

impl Storefront {
    fn catalog(&self) -> &dyn Catalog {
        match self {
            Storefront::Remote(http) => http,
            Storefront::Offline(inventory) => inventory,
        }
    }

    fn purchases(&self) -> PurchaseServiceBox {
        match self {
            Storefront::Remote(http) => Box::new(http.clone()),
            Storefront::Offline(inventory) => Box::new(inventory.clone()),
        }
    }

    /// Purchases against the API need a signed-in user.
    fn requires_login(&self) -> bool {
        match self {
            Storefront::Remote(http) => !http.has_token(),
            Storefront::Offline(_) => false,
        }
    }
}

fn open_slot(cli: &Cli) -> Result<CartSlotBox> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &cli.db_path {
        let slot = sweetcart::infrastructure::rocksdb::RocksDBSlot::open(db_path).into_diagnostic()?;
        return Ok(Box::new(slot));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if cli.db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to file storage."
        );
    }

    Ok(Box::new(FileSlot::open(&cli.cart_dir).into_diagnostic()?))
}

fn open_storefront(cli: &Cli) -> Result<Storefront> {
    if let Some(path) = &cli.catalog {
        let file = File::open(path).into_diagnostic()?;
        let mut products = Vec::new();
        for product in ProductReader::new(file).products() {
            match product {
                Ok(product) => products.push(product),
                Err(e) => eprintln!("Error reading product: {}", e),
            }
        }
        return Ok(Storefront::Offline(InMemoryInventory::new(products)));
    }

    let http = HttpStorefront::new(
        &cli.api_url,
        cli.token.clone(),
        Duration::from_secs(cli.timeout_secs),
    )
    .into_diagnostic()?;
    Ok(Storefront::Remote(http))
}

async fn find_product(catalog: &dyn Catalog, product_id: &ProductId) -> Result<Product> {
    catalog
        .search(&ProductQuery::default())
        .await
        .into_diagnostic()?
        .into_iter()
        .find(|p| &p.id == product_id)
        .ok_or_else(|| miette!("Unknown product: {}", product_id))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let slot = open_slot(&cli)?;
    let storefront = open_storefront(&cli)?;
    let notifier = ConsoleNotifier::new();
    let mut engine = CartEngine::new(
        CartStore::new(slot),
        storefront.purchases(),
        Box::new(notifier),
    );

    let stdout = io::stdout();
    let mut writer = CartWriter::new(stdout.lock());

    match cli.command {
        Command::Show => writer.write_lines(engine.lines()).into_diagnostic()?,
        Command::Totals => writer
            .write_totals(engine.total_items(), engine.subtotal())
            .into_diagnostic()?,
        Command::Add {
            product_id,
            quantity,
        } => {
            let product = find_product(storefront.catalog(), &ProductId::from(product_id)).await?;
            let quantity = Quantity::parse_lenient(&quantity);
            engine.add_item(&product, i64::from(quantity.get()));
            notifier.info(&format!("Added {} × {} to cart", quantity, product.name));
        }
        Command::Remove { product_id } => engine.remove_item(&ProductId::from(product_id)),
        Command::Update {
            product_id,
            quantity,
        } => {
            let quantity = Quantity::parse_lenient(&quantity);
            engine.update_quantity(&ProductId::from(product_id), i64::from(quantity.get()));
        }
        Command::Clear => engine.clear_cart(),
        Command::Catalog {
            query,
            category,
            min_price,
            max_price,
        } => {
            let query = ProductQuery {
                q: query,
                category,
                min_price,
                max_price,
            };
            let products = storefront.catalog().search(&query).await.into_diagnostic()?;
            writer.write_products(&products).into_diagnostic()?;
        }
        Command::Checkout => {
            if !engine.cart().is_empty() && storefront.requires_login() {
                notifier.info("Please login to purchase");
                return Ok(());
            }
            engine.checkout().await;
        }
        Command::Buy {
            product_id,
            quantity,
        } => {
            if storefront.requires_login() {
                notifier.info("Please login to purchase");
                return Ok(());
            }
            let product = find_product(storefront.catalog(), &ProductId::from(product_id)).await?;
            let quantity = Quantity::parse_lenient(&quantity);
            // Failure was already reported through the notifier.
            let _ = engine.buy_now(&product, i64::from(quantity.get())).await;
        }
    }

    Ok(())
}
