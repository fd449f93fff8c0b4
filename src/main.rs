use std::io;
use std::sync::Arc;

use cart_service::{
    build_server, create_pool, run_migrations, CartService, Config, DieselCartRepository,
};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let service = CartService::new(Arc::new(DieselCartRepository::new(pool)));

    log::info!(
        "Starting server at http://{}:{}",
        config.host,
        config.port
    );

    build_server(service, &config.host, config.port)?.await
}
