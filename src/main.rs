use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use rsvp_backend::{
    AppState,
    auth::{SecurityService, SessionManager, TokenService},
    cache::MemoryCache,
    config::Config,
    database::{CategoryOperation, InvitationOperation, RsvpOperation},
    routes,
    services::{CategoryService, InvitationService, RsvpService},
    sms::TwilioService,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    if !config.twilio.is_configured() {
        tracing::warn!("Twilio is not configured, invitations cannot be sent by SMS");
    }

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'rsvp_backend';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let pool = Arc::new(pool);

    // 会话依赖的缓存和令牌服务
    let cache = Arc::new(MemoryCache::new());
    let tokens = Arc::new(TokenService::new(&config.jwt));
    let sessions = Arc::new(SessionManager::new(config.session.clone(), tokens, cache));

    // 设置应用状态
    let state = AppState {
        sessions,
        security: Arc::new(SecurityService::new(
            config.admin_credentials.clone(),
            config.recaptcha_secret.clone(),
        )),
        sms: Arc::new(TwilioService::new(config.twilio.clone())),
        categories: Arc::new(CategoryService::new(Arc::new(CategoryOperation::new(
            pool.clone(),
        )))),
        invitations: Arc::new(InvitationService::new(Arc::new(InvitationOperation::new(
            pool.clone(),
        )))),
        rsvps: Arc::new(RsvpService::new(Arc::new(RsvpOperation::new(pool)))),
        config: Arc::new(config),
    };

    let router = routes::create_router(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
