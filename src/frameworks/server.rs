use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::entities::ServiceAccounts;
use crate::frameworks::{config, db};
use crate::interface_adapters::clients::identity::FirebaseTokenVerifier;
use crate::interface_adapters::clients::minting::IamCredentialsClient;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, PostgresRoomStore, SystemClock};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let project_id = match config::project_id() {
        Some(value) => value,
        None => {
            tracing::error!("GCP_PROJECT must be set");
            return;
        }
    };
    let gateway_audience = match config::api_gateway_audience() {
        Some(value) => value,
        None => {
            tracing::error!("API_GATEWAY_AUDIENCE must be set");
            return;
        }
    };
    let database_url = match config::database_url() {
        Some(value) => value,
        None => {
            tracing::error!("DATABASE_URL must be set");
            return;
        }
    };

    let db = match db::connect_pool(&database_url).await {
        Ok(pool) => pool,
        Err(error) => {
            tracing::error!(%error, "failed to connect to database");
            return;
        }
    };
    if let Err(error) = db::run_migrations(&db).await {
        tracing::error!(%error, "failed to run migrations");
        return;
    }

    // Provider handles are built once here and injected into the state.
    let verifier = match FirebaseTokenVerifier::new(
        project_id.clone(),
        config::jwks_url(),
        config::verify_timeout(),
    ) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "failed to build identity verifier");
            return;
        }
    };
    let minter = match IamCredentialsClient::new(
        config::iam_credentials_url(),
        config::metadata_token_url(),
        gateway_audience,
        config::mint_timeout(),
    ) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "failed to build minting client");
            return;
        }
    };

    let accounts = ServiceAccounts {
        anonymous: config::guest_service_account(&project_id),
        password: config::admin_service_account(&project_id),
    };

    let state = Arc::new(AppState {
        verifier: Arc::new(verifier),
        rooms: Arc::new(PostgresRoomStore { db }),
        minter: Arc::new(minter),
        clock: Arc::new(SystemClock),
        accounts,
    });

    // Wire the HTTP route for the token exchange.
    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    // Bind TCP listener with error handling.
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%addr, %error, "failed to bind");
            return; // Abort startup on bind failure.
        }
    };
    tracing::info!(%addr, "listening");

    // Serve app and report errors rather than panicking.
    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server error");
    }
}
