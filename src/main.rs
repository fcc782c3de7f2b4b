//! Tiffinbox - Food-Ordering Storefront Backend

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiffinbox::config::Config;
use tiffinbox::domain::{Role, User};
use tiffinbox::http::auth::Sessions;
use tiffinbox::http::{self, AppState};
use tiffinbox::notify::{LogNotifier, NatsNotifier, Notifier};
use tiffinbox::payment::{OfflineGateway, PaymentGateway};
use tiffinbox::service::{CartService, OrderService};
use tiffinbox::store::{CartStore, MemoryStore, OrderStore, PgStore, ProductStore, UserStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (carts, orders, users, products): (
        Arc<dyn CartStore>,
        Arc<dyn OrderStore>,
        Arc<dyn UserStore>,
        Arc<dyn ProductStore>,
    ) = match &config.database_url {
        Some(url) => {
            let store = Arc::new(PgStore::connect(url).await?);
            let carts: Arc<dyn CartStore> = store.clone();
            let orders: Arc<dyn OrderStore> = store.clone();
            let users: Arc<dyn UserStore> = store.clone();
            let products: Arc<dyn ProductStore> = store;
            (carts, orders, users, products)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            let store = Arc::new(MemoryStore::new());
            let carts: Arc<dyn CartStore> = store.clone();
            let orders: Arc<dyn OrderStore> = store.clone();
            let users: Arc<dyn UserStore> = store.clone();
            let products: Arc<dyn ProductStore> = store;
            (carts, orders, users, products)
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Arc::new(NatsNotifier::new(client)),
            Err(err) => {
                tracing::warn!(error = %err, "NATS connect failed, notifications go to the log");
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    };

    let sessions = Arc::new(Sessions::new(config.session_ttl));

    if let Some(seed) = &config.admin_seed {
        let admin = match users.find_by_email(&seed.email).await? {
            Some(existing) => existing,
            None => {
                let admin = User::new("Admin", seed.email.clone(), Role::Admin);
                users.upsert(&admin).await?;
                admin
            }
        };
        sessions.issue(seed.token.clone(), admin.id).await;
        tracing::info!(email = %seed.email, "seeded admin session");
    }

    let payments: Arc<dyn PaymentGateway> = Arc::new(OfflineGateway);

    let state = AppState {
        carts: Arc::new(CartService::new(Arc::clone(&carts))),
        orders: Arc::new(OrderService::new(
            carts,
            orders,
            Arc::clone(&users),
            notifier,
        )),
        products,
        users,
        payments,
        sessions,
        currency: config.currency.clone(),
    };

    let app = http::router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("tiffinbox listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
