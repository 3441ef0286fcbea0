//! FILENAME: app/src/main.rs

#[tokio::main]
async fn main() {
    if let Err(e) = app_lib::run().await {
        eprintln!("[FATAL] {}", e);
        std::process::exit(1);
    }
}
