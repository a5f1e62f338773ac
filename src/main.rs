use std::sync::Arc;

use filedrop::config::{AppState, Config};
use filedrop::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path (without extension) may be passed as the first argument
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg)?);

    logger::log_server_start(&listener.local_addr()?, &cfg);
    if !state.relay.has_credential() {
        logger::log_warning("relay.api_key is empty, posts will be rejected by the posting service");
    }

    server::run(listener, state, server::shutdown_signal()).await;
    logger::log_info("Server stopped");
    Ok(())
}
