//! Catalog seeding command.
//!
//! Inserts a small demo catalog so a fresh install has something to list.
//! Idempotent: products already present (by name) are left untouched.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use clementine_core::{Category, ProductStatus};

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    original_price: Option<Decimal>,
    category: Category,
    stock: i32,
    rating: f32,
    reviews: i32,
    tags: &'static [&'static str],
}

fn dollars(units: i64) -> Decimal {
    Decimal::from_i128_with_scale(units as i128, 0)
}

fn cents(hundredths: i64) -> Decimal {
    Decimal::from_i128_with_scale(hundredths as i128, 2)
}

fn demo_catalog() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            name: "Aurora Wireless Headphones",
            description: "Over-ear wireless headphones with 30 hours of battery life.",
            price: cents(12999),
            original_price: Some(cents(15999)),
            category: Category::Electronics,
            stock: 42,
            rating: 4.6,
            reviews: 182,
            tags: &["audio", "wireless"],
        },
        DemoProduct {
            name: "Linen Throw Blanket",
            description: "Stone-washed linen blanket, 130x170cm.",
            price: cents(5450),
            original_price: None,
            category: Category::HomeLiving,
            stock: 18,
            rating: 4.3,
            reviews: 47,
            tags: &["linen", "cozy"],
        },
        DemoProduct {
            name: "Trail Runner Shoes",
            description: "Lightweight trail running shoes with aggressive grip.",
            price: cents(8990),
            original_price: None,
            category: Category::Sports,
            stock: 7,
            rating: 4.1,
            reviews: 63,
            tags: &["running", "outdoor"],
        },
        DemoProduct {
            name: "Ceramic Pour-Over Set",
            description: "Two-piece ceramic pour-over coffee set with filter stand.",
            price: cents(3875),
            original_price: Some(dollars(45)),
            category: Category::HomeLiving,
            stock: 31,
            rating: 4.8,
            reviews: 29,
            tags: &["coffee", "ceramic"],
        },
        DemoProduct {
            name: "Vitamin C Serum",
            description: "Brightening facial serum with 15% vitamin C.",
            price: cents(2450),
            original_price: None,
            category: Category::Beauty,
            stock: 64,
            rating: 4.0,
            reviews: 211,
            tags: &["skincare"],
        },
        DemoProduct {
            name: "The Silent Orchard",
            description: "A novel about three generations of orchard keepers.",
            price: cents(1699),
            original_price: None,
            category: Category::Books,
            stock: 120,
            rating: 4.4,
            reviews: 95,
            tags: &["fiction"],
        },
    ]
}

/// Seed the demo catalog.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let mut inserted = 0_u32;
    for product in demo_catalog() {
        let status = ProductStatus::from_stock(product.stock);
        let tags: Vec<String> = product.tags.iter().map(|&t| t.to_owned()).collect();

        let result = sqlx::query(
            "INSERT INTO products \
                 (name, description, price, original_price, images, category, stock, rating, \
                  reviews, status, tags) \
             SELECT $1, $2, $3, $4, '{}', $5, $6, $7, $8, $9, $10 \
             WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.category.as_str())
        .bind(product.stock)
        .bind(product.rating)
        .bind(product.reviews)
        .bind(status.to_string())
        .bind(&tags)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
            tracing::info!(product = product.name, "seeded");
        } else {
            tracing::debug!(product = product.name, "already present, skipped");
        }
    }

    tracing::info!(inserted, "Seeding complete");
    Ok(())
}
