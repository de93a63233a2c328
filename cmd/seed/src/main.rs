//! # Seed
//!
//! Bootstraps a PostgreSQL deployment: applies migrations, provisions an
//! administrator and prints a development token for it.
//!
//! ```text
//! seed <subject> [email] [--demo]
//! ```
//!
//! `--demo` also loads a handful of catalog products (skipped when their SKU
//! already exists).

use anyhow::{bail, Context};
use auth_adapters::JwtIdentityProvider;
use chrono::{Duration, Utc};
use configs::Settings;
use domains::{DomainError, ExternalIdentity, NewProduct, ProductRepo, ProductSpecs, Role, UserRepo};
use secrecy::ExposeSecret;
use storage_adapters::PgStore;
use tracing::{info, warn};

const TOKEN_TTL_DAYS: i64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let demo = match args.iter().position(|a| a == "--demo") {
        Some(at) => {
            args.remove(at);
            true
        }
        None => false,
    };
    let Some(subject) = args.first().cloned() else {
        bail!("usage: seed <subject> [email] [--demo]");
    };
    let email = args.get(1).cloned();

    let settings = Settings::load().context("loading configuration")?;

    // 1. Connect + migrate
    let url = settings
        .database
        .url
        .as_ref()
        .context("database.url is required to seed")?;
    let store = PgStore::connect(url.expose_secret(), 2).await?;
    store.migrate().await?;

    // 2. Provision the administrator
    let identity = ExternalIdentity { subject: subject.clone(), email, name: Some("Administrator".into()) };
    store.upsert_user(&identity, "seed", Utc::now()).await?;
    let admin = store
        .update_role(&subject, Role::Admin)
        .await?
        .context("administrator vanished after upsert")?;
    info!(user_id = %admin.id, "administrator ready");

    // 3. Optional demo catalog
    if demo {
        seed_products(&store).await?;
    }

    // 4. Development token
    let secret = settings.auth.jwt_secret.as_ref().context("auth.jwt_secret is required")?;
    let jwt = JwtIdentityProvider::new(secret.expose_secret(), settings.auth.audience.clone())?;
    let token = jwt.issue(&identity, Duration::days(TOKEN_TTL_DAYS))?;
    println!("{token}");
    Ok(())
}

async fn seed_products(store: &PgStore) -> anyhow::Result<()> {
    let now = Utc::now();
    for (sku, name, application, stock) in [
        ("RP-1001", "Rack & pinion boot kit", "Toyota Corolla", 24),
        ("TR-2040", "Outer tie rod end", "Honda Civic", 6),
        ("SR-3300", "Steering rack, remanufactured", "Ford F-150", 2),
    ] {
        let product = NewProduct {
            sku: sku.into(),
            name: name.into(),
            category: Some("steering".into()),
            specs: ProductSpecs { application: Some(application.into()), ..Default::default() },
            stock_quantity: Some(stock),
            ..Default::default()
        }
        .into_product(now);

        match store.insert_product(&product).await {
            Ok(()) => info!(sku, "product seeded"),
            Err(DomainError::Conflict(_)) => warn!(sku, "product exists; skipped"),
            Err(other) => return Err(other.into()),
        }
    }
    Ok(())
}
