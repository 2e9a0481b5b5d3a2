use crate::config::{GatewayConfig, ProviderBackend};
use crate::handlers;
use crate::middleware::require_api_key;
use crate::services::providers::mock::MockChatProvider;
use crate::services::providers::openai::OpenAiProvider;
use crate::services::providers::ChatProvider;
use crate::services::ExcelClient;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub provider: Arc<dyn ChatProvider>,
    pub excel: ExcelClient,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn ChatProvider> = match config.provider.backend {
            ProviderBackend::OpenAi => Arc::new(OpenAiProvider::new(config.openai.clone())),
            ProviderBackend::Mock => Arc::new(MockChatProvider::new()),
        };

        tracing::info!(
            backend = ?config.provider.backend,
            model = %config.openai.model,
            "Initialized chat provider"
        );

        let excel = ExcelClient::new(&config.excel)?;

        let state = AppState {
            config: config.clone(),
            provider,
            excel,
        };

        let app = Router::new()
            .route(
                "/api/generate-test-cases",
                post(handlers::generate_test_cases),
            )
            .route("/generate-excel-proxy", post(handlers::generate_excel_proxy))
            .route_layer(from_fn_with_state(state.clone(), require_api_key))
            .route("/health", get(handlers::health_check))
            // Screenshot batches routinely exceed the 2 MB default cap.
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state);

        let host: IpAddr = config.common.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid bind host '{}': {}",
                config.common.host,
                e
            ))
        })?;
        let addr = SocketAddr::from((host, config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
