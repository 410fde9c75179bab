use expense_agent::{api::start_server, interpreter::Interpreter, store::SqliteStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://expense_agent.db".to_string());

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("WhatsApp Expense Agent");
    info!("Database: {}", database_url);
    info!("Port: {}", port);

    // Open the store and create the schema if needed
    let store = SqliteStore::connect(&database_url).await?;
    let interpreter = Arc::new(Interpreter::new(Box::new(store)));

    info!("Interpreter initialized");

    start_server(interpreter, port).await?;

    Ok(())
}
