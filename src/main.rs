use path_dispatcher::config::Config;
use path_dispatcher::handler::build_route_table;
use path_dispatcher::{logger, server};

/// Configuration file used when none is given, extension optional
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // the table is frozen here, before any request can observe it
    let routes = build_route_table(&cfg.routes, &cfg.http)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(server::run(cfg, routes))
}
