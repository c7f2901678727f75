use campusswap::logging::init_tracing;
use campusswap::metrics::{init_metrics, metrics_app};
use campusswap::router::init_router;
use campusswap::state::init_app_state;
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    if let Some(handle) = init_metrics() {
        let metrics_port =
            std::env::var("METRICS_PORT").unwrap_or_else(|_| "9091".to_string());
        let metrics_addr = format!("0.0.0.0:{}", metrics_port);
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&metrics_addr)
                .await
                .expect("Failed to bind metrics listener");
            println!("📊 Metrics available at http://localhost:{}/metrics", metrics_port);
            axum::serve(listener, metrics_app(handle))
                .await
                .expect("Metrics server failed");
        });
    }

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}
