pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

use actix_web::dev::Service as _;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::CartService;
pub use config::Config;
pub use db::{create_pool, DbPool};
pub use infrastructure::DieselCartRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::view_cart,
        handlers::cart::cart_count,
        handlers::cart::add_item,
        handlers::cart::decrement_item,
        handlers::cart::remove_item,
    ),
    components(schemas(
        handlers::cart::CartResponse,
        handlers::cart::CartItemResponse,
        handlers::cart::CartCountResponse,
    )),
    tags((name = "cart", description = "Session-scoped shopping cart"))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Register the cart routes.
///
/// Any response from the scope carries the cookie of a session created while
/// handling the request, including error responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(handlers::cart::view_cart))
            .route("/count", web::get().to(handlers::cart::cart_count))
            .route("/add/{product_id}", web::post().to(handlers::cart::add_item))
            .route(
                "/remove/{product_id}",
                web::post().to(handlers::cart::decrement_item),
            )
            .route(
                "/remove_item/{product_id}",
                web::post().to(handlers::cart::remove_item),
            )
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async move {
                    let mut res = fut.await?;
                    session::attach_new_session(&mut res);
                    Ok(res)
                }
            }),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: CartService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
