//! Flexin relay server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin flexin-server
//! cargo run --bin flexin-server -- --jwt-secret change-me --identity-mode token --users-file users.json
//! ```

use std::sync::Arc;

use clap::Parser;
use flexin_server::{
    config::{Config, load_users},
    domain::TokenVerifier,
    infrastructure::{
        auth::JwtTokenService,
        registry::WebSocketConnectionRegistry,
        repository::{InMemoryMessageRepository, InMemoryUserRepository},
    },
    ui::{AppState, Server},
    usecase::{ConnectUserUseCase, ConversationUseCase, DisconnectUserUseCase, RelayMessageUseCase},
};
use flexin_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    let config = Config::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. Connection registry and credential service
    // 3. UseCases
    // 4. AppState
    // 5. Server

    // 1. Repositories (in-memory)
    let users = match &config.users_file {
        Some(path) => match load_users(path) {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No users file given; every relayed message will be rejected");
            Vec::new()
        }
    };
    tracing::info!("Loaded {} users", users.len());
    let user_repository = Arc::new(InMemoryUserRepository::with_users(users));
    let message_repository = Arc::new(InMemoryMessageRepository::new(
        user_repository,
        Arc::new(SystemClock),
    ));

    // 2. Connection registry and credential service
    let registry = Arc::new(WebSocketConnectionRegistry::new());
    let token_service: Arc<dyn TokenVerifier> =
        Arc::new(JwtTokenService::new(config.jwt_secret.as_bytes()));

    // 3. UseCases
    let connect_user_usecase = Arc::new(ConnectUserUseCase::new(
        registry.clone(),
        token_service.clone(),
    ));
    let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(registry.clone()));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        message_repository.clone(),
        registry.clone(),
    ));
    let conversation_usecase = Arc::new(ConversationUseCase::new(message_repository));

    // 4. AppState
    let settings = config.relay_settings();
    tracing::info!(
        identity_mode = ?settings.identity_mode,
        frame_error_policy = ?settings.frame_error_policy,
        allowed_origins = ?settings.allowed_origins,
        "Relay settings"
    );
    let app_state = Arc::new(AppState {
        connect_user_usecase,
        disconnect_user_usecase,
        relay_message_usecase,
        conversation_usecase,
        token_verifier: token_service,
        settings,
    });

    // 5. Create and run the server
    let server = Server::new(app_state);
    if let Err(e) = server.run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
