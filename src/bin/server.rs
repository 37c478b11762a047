use std::sync::{Arc, Mutex};

use relint::env_config;
use relint::server::{create_router, ServerState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = env_config::server_port();
    let progress_path = env_config::progress_path();
    println!("Starting relint API server...");
    println!("Progress store: {}", progress_path.display());

    let state = Arc::new(ServerState {
        session: Mutex::new(None),
        progress_path,
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    println!("Server is running on port {}. Press Ctrl+C to stop.", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("\nStopping server...");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
