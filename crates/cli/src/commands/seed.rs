//! `seed` command: populate the catalog with demo products.

use rust_decimal::Decimal;

use voltline_api::models::NewProduct;
use voltline_api::store::{PgStore, ProductStore, StoreError, create_pool};
use voltline_core::{Category, ProductTag, Slug};

use super::{CliError, database_url};

struct SeedProduct {
    name: &'static str,
    category: Category,
    price: i64,
    old_price: Option<i64>,
    stock: i32,
    tag: Option<ProductTag>,
    description: &'static str,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Pixel 9",
        category: Category::Smartphones,
        price: 999,
        old_price: None,
        stock: 25,
        tag: Some(ProductTag::New),
        description: "Flagship smartphone with a 6.3-inch display and all-day battery.",
    },
    SeedProduct {
        name: "Galaxy Tab S10",
        category: Category::Tablets,
        price: 749,
        old_price: Some(829),
        stock: 12,
        tag: Some(ProductTag::Sale),
        description: "11-inch AMOLED tablet for work and play.",
    },
    SeedProduct {
        name: "Watch SE 2nd gen",
        category: Category::Smartwatches,
        price: 249,
        old_price: None,
        stock: 40,
        tag: Some(ProductTag::Popular),
        description: "Lightweight smartwatch with heart-rate tracking and GPS.",
    },
    SeedProduct {
        name: "Braided USB-C Cable 2m",
        category: Category::Accessories,
        price: 19,
        old_price: None,
        stock: 200,
        tag: None,
        description: "Durable braided charging cable, 100W capable.",
    },
    SeedProduct {
        name: "Clear Case for Pixel 9",
        category: Category::Accessories,
        price: 29,
        old_price: Some(39),
        stock: 80,
        tag: Some(ProductTag::Sale),
        description: "Slim transparent case with reinforced corners.",
    },
];

/// Insert the demo catalog, skipping products whose slug already exists.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails
/// for a reason other than an existing slug.
pub async fn run() -> Result<(), CliError> {
    let pool = create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);

    let mut inserted = 0usize;
    for seed in SEED_PRODUCTS {
        let slug = Slug::from_name(seed.name)?;
        let new = NewProduct {
            name: seed.name.to_owned(),
            slug: slug.clone(),
            category: seed.category,
            price: Decimal::new(seed.price, 0),
            old_price: seed.old_price.map(|p| Decimal::new(p, 0)),
            stock: seed.stock,
            image: format!("/uploads/seed/{slug}.jpg"),
            tag: seed.tag,
            description: seed.description.to_owned(),
        };

        match store.insert_product(new).await {
            Ok(product) => {
                inserted += 1;
                tracing::info!(slug = %product.slug, "seeded product");
            }
            Err(StoreError::Conflict(_)) => {
                tracing::info!(slug = %slug, "already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, total = SEED_PRODUCTS.len(), "seeding complete");
    Ok(())
}
