//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use otica_backend::{
    build_router,
    config::{AppState, Config},
};

#[tokio::main]
async fn main() {
    // RUST_LOG manda; sem ele, só o nosso crate em info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("otica_backend=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Falha ao ler a configuração do ambiente.");

    let app_state = AppState::new(&config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", config.bind_addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
