use anyhow::Result;

use crate::cli::ServeArgs;
use crate::config::AppConfig;

pub async fn handle_serve_command(args: ServeArgs, config: AppConfig) -> Result<()> {
    let mut server = config.server;
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    crate::web::run_server(config.store, config.access, server).await
}
