use std::net::TcpListener;
use std::sync::Arc;

use credential_service::auth::{AuthenticationFacade, BcryptVerifier, SystemClock, TokenCodec};
use credential_service::configuration::get_configuration;
use credential_service::startup::run;
use credential_service::store::{AccountStore, InMemoryAccountStore, PostgresAccountStore};
use credential_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = init_telemetry("info") {
        eprintln!("Failed to initialize telemetry: {}", e);
    }

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store: Arc<dyn AccountStore> = match &configuration.database {
        Some(database) => {
            tracing::info!("Connecting to account database");
            let store = PostgresAccountStore::connect(database).await.map_err(|e| {
                tracing::error!("Failed to connect to account database: {}", e);
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Database connection error",
                )
            })?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let verifier = Arc::new(BcryptVerifier::new(configuration.hashing.bcrypt_cost));
    let codec = TokenCodec::new(configuration.jwt.issuer.clone(), Arc::new(SystemClock));
    let auth = AuthenticationFacade::new(store, verifier, codec, &configuration.jwt);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, auth)?.await
}
