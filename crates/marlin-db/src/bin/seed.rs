//! # Seed Data Generator
//!
//! Populates the database with a realistic seafood catalogue for
//! development: products, variants, export variants, freight tariffs and an
//! exchange rate.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p marlin-db --bin seed
//!
//! # Specify database path
//! cargo run -p marlin-db --bin seed -- --db ./data/marlin.db
//! ```
//!
//! ## Generated Data
//! - Products across three categories (fresh fish, crustaceans,
//!   cephalopods), each with size variants and LKR purchase costs
//! - Export variants priced cost-plus at a 15% profit margin
//! - Air tariffs for Japan (NRT/HND), UAE (DXB) and USA (JFK)
//! - Sea tariffs for Yokohama and Jebel Ali
//! - A current LKR/USD exchange rate

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::env;

use marlin_core::costplus::{derive_ex_factory, CostInputs, ProfitInput};
use marlin_core::{
    AirFreightRate, ExportVariant, Product, ProductVariant, SeaFreightRate, TierSet, UsdRate,
};
use marlin_db::repository::generate_id;
use marlin_db::{Database, DbConfig};

/// Catalogue species per category: (common name, scientific name).
const CATEGORIES: &[(&str, &[(&str, &str)])] = &[
    (
        "Fresh Fish",
        &[
            ("Yellowfin Tuna", "Thunnus albacares"),
            ("Bigeye Tuna", "Thunnus obesus"),
            ("Swordfish", "Xiphias gladius"),
            ("Mahi Mahi", "Coryphaena hippurus"),
            ("Wahoo", "Acanthocybium solandri"),
            ("Red Snapper", "Lutjanus campechanus"),
            ("Grouper", "Epinephelus marginatus"),
            ("Barramundi", "Lates calcarifer"),
        ],
    ),
    (
        "Crustaceans",
        &[
            ("Tiger Prawns", "Penaeus monodon"),
            ("White Prawns", "Litopenaeus vannamei"),
            ("Mud Crab", "Scylla serrata"),
            ("Blue Swimming Crab", "Portunus pelagicus"),
            ("Spiny Lobster", "Panulirus homarus"),
        ],
    ),
    (
        "Cephalopods",
        &[
            ("Squid", "Loligo duvauceli"),
            ("Cuttlefish", "Sepia pharaonis"),
            ("Octopus", "Octopus vulgaris"),
        ],
    ),
];

/// Size variants: (label, LKR addon in cents on top of the base cost).
const SIZES: &[(&str, i64)] = &[
    ("1-2kg", 0),
    ("2-4kg", 15_000),
    ("4-6kg", 32_500),
    ("6kg+", 55_000),
];

/// LKR per USD used for the seeded exchange rate and snapshots.
const USD_RATE_CENTS: i64 = 30_275; // 302.75

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./marlin_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Marlin Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./marlin_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Marlin Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let usd_rate = Decimal::new(USD_RATE_CENTS, 2);
    seed_rates(&db, usd_rate).await?;
    println!("✓ Seeded exchange rate and freight tariffs");

    println!();
    println!("Generating catalogue...");

    let mut products = 0;
    let mut variants = 0;
    let start = std::time::Instant::now();

    for (category_idx, (category, species)) in CATEGORIES.iter().enumerate() {
        for (species_idx, (common_name, scientific_name)) in species.iter().enumerate() {
            let now = Utc::now();
            let product = Product {
                id: generate_id(),
                common_name: common_name.to_string(),
                scientific_name: Some(scientific_name.to_string()),
                category: category.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", common_name, e);
                continue;
            }
            products += 1;

            // Base cost varies by species so price lists look realistic
            let base_cents = 80_000 + (category_idx * 60_000 + species_idx * 12_500) as i64;

            for (size, addon_cents) in SIZES {
                let purchasing_price = Decimal::new(base_cents + addon_cents, 2);

                let variant = ProductVariant {
                    id: generate_id(),
                    product_id: product.id.clone(),
                    size: size.to_string(),
                    unit: "kg".to_string(),
                    purchasing_price,
                    created_at: now,
                    updated_at: now,
                };
                db.variants().insert(&variant).await?;

                let inputs = CostInputs {
                    purchasing_price,
                    packing_cost: Decimal::new(150, 2),   // 1.50 USD
                    labour_overhead: Decimal::new(75, 2), // 0.75 USD
                    usd_rate,
                };
                let breakdown =
                    derive_ex_factory(&inputs, ProfitInput::MarginPercent(Decimal::from(15)));

                let export = ExportVariant {
                    id: generate_id(),
                    product_id: product.id.clone(),
                    size: size.to_string(),
                    unit: "kg".to_string(),
                    purchasing_price,
                    usd_rate,
                    packing_cost: inputs.packing_cost,
                    labour_overhead: inputs.labour_overhead,
                    profit: breakdown.profit,
                    profit_margin: breakdown.profit_margin,
                    ex_factory_price: breakdown.ex_factory_price,
                    multiplier: Some(Decimal::from(150)),
                    divisor: Decimal::ONE,
                    created_at: now,
                    updated_at: now,
                };
                db.export_variants().insert(&export).await?;
                variants += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} products / {} variant pairs in {:?}",
        products, variants, elapsed
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Seeds the exchange rate and a small freight tariff history.
async fn seed_rates(db: &Database, usd_rate: Decimal) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let effective = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default();

    db.usd_rates()
        .insert(&UsdRate {
            id: generate_id(),
            rate: usd_rate,
            effective_date: effective,
            updated_at: now,
        })
        .await?;

    let air_tariffs: &[(&str, Option<&str>, [i64; 4])] = &[
        ("Japan", Some("NRT"), [369, 320, 295, 280]),
        ("Japan", Some("HND"), [375, 328, 301, 286]),
        ("UAE", Some("DXB"), [285, 250, 230, 215]),
        ("USA", Some("JFK"), [512, 470, 441, 420]),
    ];
    for &(country, airport, cents) in air_tariffs {
        db.freight_rates()
            .insert_air(&AirFreightRate {
                id: generate_id(),
                country: country.to_string(),
                airport_code: airport.map(str::to_string),
                rates: TierSet {
                    kg45: Decimal::new(cents[0], 2),
                    kg100: Decimal::new(cents[1], 2),
                    kg300: Decimal::new(cents[2], 2),
                    kg500: Decimal::new(cents[3], 2),
                },
                effective_date: effective,
                updated_at: now,
            })
            .await?;
    }

    let sea_tariffs: &[(&str, &str, &str, i64, i64)] = &[
        ("Japan", "JPYOK", "Yokohama", 245_000, 390_000),
        ("UAE", "AEJEA", "Jebel Ali", 198_000, 322_000),
    ];
    for &(country, port_code, port_name, rate_20ft_cents, rate_40ft_cents) in sea_tariffs {
        let mut rate = SeaFreightRate {
            id: generate_id(),
            country: country.to_string(),
            port_code: port_code.to_string(),
            port_name: port_name.to_string(),
            rate_20ft: Decimal::new(rate_20ft_cents, 2),
            kilos_20ft: Decimal::from(26_000),
            rate_40ft: Decimal::new(rate_40ft_cents, 2),
            kilos_40ft: Decimal::from(52_000),
            freight_per_kilo_20ft: Decimal::ZERO,
            freight_per_kilo_40ft: Decimal::ZERO,
            effective_date: effective,
            updated_at: now,
        };
        rate.derive_per_kilo();
        db.freight_rates().insert_sea(&rate).await?;
    }

    Ok(())
}
