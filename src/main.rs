use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hiring_pipeline::{
    config::{get_config, init_config, StoreBackend},
    database::{memory_store::MemoryApplicationStore, pg_store::PgApplicationStore, pool::create_pool, store::ApplicationStore},
    routes,
    services::notification_service::{EventSink, LogNotifier, WebhookNotifier},
    utils::time::now,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_format_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let store: Arc<dyn ApplicationStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;
            let pool = create_pool(url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PgApplicationStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Arc::new(MemoryApplicationStore::new())
        }
    };

    let sink: Arc<dyn EventSink> = match &config.notification_webhook_url {
        Some(url) => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?;
            Arc::new(WebhookNotifier::new(client, url.clone(), config.webhook_secret.clone()))
        }
        None => Arc::new(LogNotifier),
    };

    let app_state = AppState::new(store, sink, config.engine_settings(), &config.jwt_secret);

    {
        let interviews = app_state.interview_service.clone();
        let poll = Duration::from_secs(config.reminder_poll_seconds.max(1));
        tokio::spawn(async move {
            loop {
                if let Err(e) = interviews.send_due_reminders(now()).await {
                    tracing::error!(error = %e, "interview reminder sweep failed");
                }
                tokio::time::sleep(poll).await;
            }
        });
    }

    let app = routes::build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
