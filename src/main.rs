use std::path::PathBuf;

use anyhow::Context;
use api::api::start_server;

#[macro_use]
extern crate diesel;

use clap::Parser;
use config::Config;

mod api;
mod config;
mod models;
mod schema;

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = "Todo list http api backed by sqlite")]
struct ServerArgs {
    /// Address to bind, overrides HOST
    #[clap(long = "host")]
    host: Option<String>,

    /// Port to listen on, overrides PORT and the platform default
    #[clap(short = 'p', long = "port")]
    port: Option<u16>,

    /// Sqlite file to store todos in, overrides the platform default
    #[clap(long = "db-path")]
    db_path: Option<PathBuf>,

    /// Number of http worker threads
    #[clap(short = 'w', long = "workers", value_parser = clap::value_parser!(u32).range(1..))]
    workers: Option<u32>,

    /// Maximum number of pooled database connections
    #[clap(
        long = "pool-size",
        default_value = "8",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pool_size: u32,
}

impl ServerArgs {
    /// Command line flags win over whatever the environment resolved to
    fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        config
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();

    let config = args.apply(Config::from_env());

    config
        .prepare_store_dir()
        .with_context(|| format!("Failed to create directory for {}", config.db_path_display()))?;

    let pool = models::build_pool(&config.db_path_display(), args.pool_size)
        .with_context(|| format!("Failed to open sqlite database {}", config.db_path_display()))?;

    models::init_database(&pool).context("Failed to create todos table")?;

    start_server(config, pool, args.workers.map(|n| n as usize))
        .await
        .context("Http server stopped with an error")?;

    Ok(())
}
