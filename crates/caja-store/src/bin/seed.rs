//! Seeds a store with demo catalog data.
//!
//! Usage: `seed [path-to-db]` (defaults to `caja.db` in the working
//! directory). Safe to re-run; duplicate tag names fail individually and
//! are reported, everything else is inserted again.

use caja_core::{BusinessConfig, ProductInput};
use caja_store::{Register, Store, StoreConfig, StoreResult};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> StoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "caja.db".into());
    let store = Store::open(StoreConfig::new(&path)).await?;
    let register = Register::new(store);

    register
        .set_config(&BusinessConfig {
            name: "INVERSIONES CIELO Y DYLAN".to_string(),
            tax_id: "20602953638".to_string(),
            address: "Imperial, Cañete".to_string(),
            phone: "918944885".to_string(),
        })
        .await?;

    for name in ["Abarrotes", "Bebidas", "Limpieza"] {
        if let Err(err) = register.add_category(name).await {
            warn!(name, error = %err, "Category not added");
        }
    }

    for name in ["und", "kg", "lt", "paquete"] {
        if let Err(err) = register.add_unit(name).await {
            warn!(name, error = %err, "Unit not added");
        }
    }

    for name in ["Admin", "Turno Mañana", "Turno Tarde"] {
        if let Err(err) = register.add_user(name).await {
            warn!(name, error = %err, "User not added");
        }
    }

    let products = [
        ("Arroz Extra", 450, "Abarrotes", "kg", 50),
        ("Aceite Primor 1L", 1100, "Abarrotes", "und", 24),
        ("Azúcar Rubia", 380, "Abarrotes", "kg", 40),
        ("Gaseosa Inca Kola 1.5L", 850, "Bebidas", "und", 30),
        ("Agua San Luis 625ml", 150, "Bebidas", "und", 48),
        ("Detergente Bolívar 780g", 990, "Limpieza", "paquete", 18),
    ];

    for (name, price_cents, category, unit, stock) in products {
        register
            .add_product(&ProductInput {
                name: name.to_string(),
                price_cents,
                category: category.to_string(),
                unit: unit.to_string(),
                image: None,
                stock,
            })
            .await?;
    }

    let product_count = register.store().products().count().await?;
    info!(path = %path, product_count, "Seed complete");

    Ok(())
}
