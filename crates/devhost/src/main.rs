use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;

const DEFAULT_PORT: u16 = 34115;

/// Local stand-in for the desktop host: serves the bridge and runtime wire
/// protocol backed by the in-memory substitutes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stonk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let app = app::router(app::AppState::default());

    let port: u16 = match std::env::var("DEVHOST_PORT") {
        Ok(raw) => match raw.trim().parse() {
            Ok(port) => port,
            Err(e) => {
                let err = anyhow::Error::new(e).context(format!("DEVHOST_PORT {raw:?} is not a port"));
                sentry_anyhow::capture_anyhow(&err);
                tracing::warn!(error = %err, port = DEFAULT_PORT, "falling back to default port");
                DEFAULT_PORT
            }
        },
        Err(_) => DEFAULT_PORT,
    };
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, "devhost listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_sentry(settings: &stonk_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
