/// flowstash: versioned document store for workflows, folders and variables
///
/// Main entry point. Loads configuration from the environment and starts the HTTP
/// server. The server provides:
/// - Record APIs at /api/workflows, /api/env-vars, /api/global-vars
/// - Folder trees at /api/folders
/// - Config at /api/config and schema status at /api/version
/// - Health check at /healthz

use flowstash::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and a SQLite store under ./data)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
