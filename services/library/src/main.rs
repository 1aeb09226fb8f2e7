use gcmn_auth_types::session::SessionKey;
use tracing::info;

use gcmn_library::config::{LibraryConfig, StorageBackend};
use gcmn_library::domain::repository::Storage;
use gcmn_library::infra::db::DbStore;
use gcmn_library::infra::json::JsonStore;
use gcmn_library::router::build_router;
use gcmn_library::state::AppState;
use gcmn_library::usecase::account::AdminCredentials;

#[tokio::main]
async fn main() {
    gcmn_core::tracing::init_tracing();

    let config = LibraryConfig::from_env();

    match config.storage_backend {
        StorageBackend::Json => {
            let store = JsonStore::open(&config.data_file)
                .await
                .expect("failed to open data file");
            info!(path = %config.data_file.display(), "using document storage");
            serve(store, config).await;
        }
        StorageBackend::Database => {
            let url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is required for the database backend");
            let store = DbStore::connect(url)
                .await
                .expect("failed to connect to database");
            info!("using relational storage");
            serve(store, config).await;
        }
    }
}

async fn serve<S: Storage>(store: S, config: LibraryConfig) {
    let admin = AdminCredentials {
        email: config.admin_email,
        password: config.admin_password,
        secret_key: config.admin_secret_key,
    };
    let state = AppState::new(
        store,
        SessionKey::new(config.session_secret),
        admin,
        config.cookie_domain,
    );

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.library_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("library service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
