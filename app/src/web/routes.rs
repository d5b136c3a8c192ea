// glowcart/app/src/web/routes.rs

use actix_web::{
  error::{JsonPayloadError, PathError},
  web, HttpRequest,
};
use glowcart::OrderStore;
use tracing::warn;

use crate::errors::AppError;
use crate::web::handlers::{
  auth_handlers, cart_handlers, favorite_handlers, health_handlers, order_handlers, product_handlers,
};

/// Malformed JSON bodies get the same `{ "message": ... }` shape as every other error.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
    warn!(error = %err, "Rejected request body.");
    AppError::Validation(format!("Invalid request body: {}", err)).into()
  })
}

/// Ids in the path that do not parse (`/orders/abc`) are a 400 with a JSON body.
pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
    warn!(error = %err, "Rejected path parameter.");
    AppError::Validation(format!("Invalid path parameter: {}", err)).into()
  })
}

/// Mounts every route. `S` is the store behind the order workflow registered
/// as `web::Data<OrderPlacement<S>>`.
pub fn configure_app_routes<S>(cfg: &mut web::ServiceConfig)
where
  S: OrderStore + 'static,
{
  cfg
    .route("/health", web::get().to(health_handlers::health_check_handler))
    // Authentication and profile
    .service(
      web::scope("/auth")
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler))
        .route(
          "/additional-info",
          web::put().to(auth_handlers::update_additional_info_handler),
        )
        .service(
          web::resource("/profile")
            .route(web::get().to(auth_handlers::get_profile_handler))
            .route(web::put().to(auth_handlers::update_profile_handler))
            .route(web::delete().to(auth_handlers::delete_profile_handler)),
        ),
    )
    // Catalog
    .service(
      web::scope("/products")
        .service(
          web::resource("")
            .route(web::get().to(product_handlers::list_products_handler))
            .route(web::post().to(product_handlers::create_product_handler)),
        )
        .service(
          web::resource("/{product_id}")
            .route(web::get().to(product_handlers::get_product_handler))
            .route(web::put().to(product_handlers::update_product_handler))
            .route(web::delete().to(product_handlers::delete_product_handler)),
        ),
    )
    // Cart
    .service(
      web::scope("/cart")
        .service(
          web::resource("")
            .route(web::get().to(cart_handlers::get_cart_handler))
            .route(web::post().to(cart_handlers::add_to_cart_handler)),
        )
        .service(
          web::resource("/{product_id}")
            .route(web::put().to(cart_handlers::update_cart_quantity_handler))
            .route(web::delete().to(cart_handlers::remove_from_cart_handler)),
        ),
    )
    // Favorites
    .service(
      web::scope("/favorites")
        .service(
          web::resource("")
            .route(web::get().to(favorite_handlers::get_favorites_handler))
            .route(web::post().to(favorite_handlers::add_favorite_handler)),
        )
        .route(
          "/{product_id}",
          web::delete().to(favorite_handlers::remove_favorite_handler),
        ),
    )
    // Orders
    .service(
      web::scope("/orders")
        .service(
          web::resource("")
            .route(web::get().to(order_handlers::order_history_handler))
            .route(web::post().to(order_handlers::create_order_handler::<S>)),
        )
        .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
    );
}
