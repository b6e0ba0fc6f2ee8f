//! # Seed Data Generator
//!
//! Populates the database with demo products, clients, and promo codes for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default) plus clients and promo codes
//! cargo run -p vega-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p vega-db --bin seed -- --count 120
//!
//! # Specify database path
//! cargo run -p vega-db --bin seed -- --db ./data/vega.db
//! ```
//!
//! ## Generated Data
//! Products are built from a grid of families and variants:
//! - Audio (headphones, speakers, microphones)
//! - Office (desks, chairs, peripherals)
//! - Kitchen (appliances, cookware)
//! - Outdoor (camping and trail gear)
//!
//! Each product has:
//! - Unique name: `{base} {variant}`
//! - Deterministic price: $19.99 - $139.98 + variant addon
//! - Deterministic stock: 0 - 40 (some start sold out on purpose)
//!
//! Clients and promo codes come from fixed lists so demo flows are
//! reproducible run to run.

use chrono::Utc;
use std::env;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vega_core::{Client, LoyaltyTier, Product, PromoCode};
use vega_db::{Database, DbConfig};

/// Product families for demo data
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "Audio",
        &[
            "Studio Headphones",
            "Wireless Earbuds",
            "Bookshelf Speaker",
            "Soundbar",
            "Turntable",
            "USB Microphone",
            "Guitar Amp",
            "Portable Speaker",
            "AV Receiver",
            "Subwoofer",
        ],
    ),
    (
        "Office",
        &[
            "Standing Desk",
            "Ergonomic Chair",
            "Monitor Arm",
            "Desk Lamp",
            "Mechanical Keyboard",
            "Laser Printer",
            "Paper Shredder",
            "Whiteboard",
            "Filing Cabinet",
            "Webcam",
        ],
    ),
    (
        "Kitchen",
        &[
            "Espresso Machine",
            "Stand Mixer",
            "Air Fryer",
            "Chef Knife",
            "Cast Iron Skillet",
            "Blender",
            "Toaster Oven",
            "Rice Cooker",
            "Electric Kettle",
            "Food Scale",
        ],
    ),
    (
        "Outdoor",
        &[
            "Camping Tent",
            "Sleeping Bag",
            "Trekking Poles",
            "Camp Stove",
            "Headlamp",
            "Water Filter",
            "Hammock",
            "Rolling Cooler",
            "Dry Bag",
            "Folding Chair",
        ],
    ),
];

/// Variant suffixes with price addons in cents
const VARIANTS: &[(&str, i64)] = &[
    ("Compact", 0),
    ("Standard", 1_500),
    ("Pro", 4_000),
    ("Max", 7_500),
    ("Bundle", 12_000),
    ("Refurb", -1_000),
];

/// Demo clients: (name, email)
const CLIENTS: &[(&str, &str)] = &[
    ("Ada Moreno", "ada.moreno@example.com"),
    ("Bruno Keller", "bruno.keller@example.com"),
    ("Chiara Fontaine", "chiara.fontaine@example.com"),
    ("Daniyar Osman", "daniyar.osman@example.com"),
    ("Elif Carter", "elif.carter@example.com"),
    ("Farid Nasser", "farid.nasser@example.com"),
    ("Greta Lindqvist", "greta.lindqvist@example.com"),
    ("Hiro Tanaka", "hiro.tanaka@example.com"),
    ("Imani Walsh", "imani.walsh@example.com"),
    ("Jonas Petry", "jonas.petry@example.com"),
];

/// Demo promo codes: (code, discount in basis points)
const PROMO_CODES: &[(&str, u32)] = &[
    ("PROMO-START", 1_000),
    ("PROMO-SAVE5", 500),
    ("PROMO-TEN10", 1_000),
    ("PROMO-VIP15", 1_500),
    ("PROMO-FALL5", 500),
    ("PROMO-NEW20", 2_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./vega_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Vega Orders Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./vega_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vega Orders Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (family_idx, (_family, names)) in FAMILIES.iter().enumerate() {
        for (name_idx, base_name) in names.iter().enumerate() {
            for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
                if generated >= count {
                    break;
                }

                let product = generate_product(
                    base_name,
                    variant,
                    *price_addon,
                    family_idx * 100 + name_idx * 10 + variant_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }

            if generated >= count {
                break;
            }
        }

        if generated >= count {
            break;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} products/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    // Clients
    println!();
    println!("Creating clients...");
    let now = Utc::now();
    for (name, email) in CLIENTS {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            tier: LoyaltyTier::Basic,
            total_orders: 0,
            total_spent_cents: 0,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = db.clients().insert(&client).await {
            eprintln!("Failed to insert {}: {}", client.email, e);
        }
    }
    println!("✓ Created {} clients", db.clients().count().await?);

    // Promo codes
    println!();
    println!("Creating promo codes...");
    for (code, discount_bps) in PROMO_CODES {
        let promo = PromoCode {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            discount_bps: *discount_bps,
            available: true,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = db.promo_codes().insert(&promo).await {
            eprintln!("Failed to insert {}: {}", promo.code, e);
        }
    }
    println!("✓ Created {} promo codes", db.promo_codes().count().await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic demo data.
fn generate_product(name: &str, variant: &str, price_addon: i64, seed: usize) -> Product {
    let now = Utc::now();

    // Base price $19.99 - $139.98, nudged by the variant addon
    let base_price = 1_999 + ((seed * 37) % 12_000) as i64;
    let price_cents = base_price + price_addon;

    // Stock 0-40; a few products start sold out
    let stock = (seed % 41) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {}", name, variant),
        price_cents,
        stock,
        created_at: now,
        updated_at: now,
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vega=trace` - Show trace for vega crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vega=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
