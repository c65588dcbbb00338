// src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  appointment_handlers, auth_handlers, order_handlers, plant_swap_handlers, product_handlers, user_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      // Authentication
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      // Users: caretaker directory, profile, admin moderation, caretaker reviews
      .service(
        web::scope("/users")
          .route("", web::get().to(user_handlers::list_users_handler))
          .route("/caretakers", web::get().to(user_handlers::list_caretakers_handler))
          .route(
            "/caretakers/{caretaker_id}",
            web::get().to(user_handlers::get_caretaker_handler),
          )
          .route("/me", web::patch().to(user_handlers::update_profile_handler))
          .route("/{user_id}/block", web::patch().to(user_handlers::set_user_blocked_handler))
          .route(
            "/{caretaker_id}/reviews",
            web::get().to(user_handlers::list_caretaker_reviews_handler),
          )
          .route(
            "/{caretaker_id}/reviews",
            web::post().to(user_handlers::create_caretaker_review_handler),
          )
          .route(
            "/reviews/{review_id}",
            web::put().to(user_handlers::update_caretaker_review_handler),
          )
          .route(
            "/reviews/{review_id}",
            web::delete().to(user_handlers::delete_caretaker_review_handler),
          )
          .route("/{user_id}", web::get().to(user_handlers::get_user_handler)),
      )
      // Products and their reviews
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route(
            "/reviews/{review_id}",
            web::put().to(product_handlers::update_product_review_handler),
          )
          .route(
            "/reviews/{review_id}",
            web::delete().to(product_handlers::delete_product_review_handler),
          )
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::patch().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
          .route(
            "/{product_id}/reviews",
            web::get().to(product_handlers::list_product_reviews_handler),
          )
          .route(
            "/{product_id}/reviews",
            web::post().to(product_handlers::create_product_review_handler),
          ),
      )
      // Appointments
      .service(
        web::scope("/appointments")
          .route("", web::post().to(appointment_handlers::create_appointment_handler))
          .route("", web::get().to(appointment_handlers::list_appointments_handler))
          .route(
            "/{appointment_id}",
            web::get().to(appointment_handlers::get_appointment_handler),
          )
          .route(
            "/{appointment_id}",
            web::patch().to(appointment_handlers::update_appointment_handler),
          )
          .route(
            "/{appointment_id}",
            web::delete().to(appointment_handlers::delete_appointment_handler),
          ),
      )
      // Orders
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/status",
            web::patch().to(order_handlers::update_order_status_handler),
          )
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler)),
      )
      // Plant swaps
      .service(
        web::scope("/plant-swaps")
          .route("", web::post().to(plant_swap_handlers::create_plant_swap_handler))
          .route("", web::get().to(plant_swap_handlers::list_plant_swaps_handler))
          .route("/user/me", web::get().to(plant_swap_handlers::list_my_plant_swaps_handler))
          .route(
            "/partner/me",
            web::get().to(plant_swap_handlers::list_partner_plant_swaps_handler),
          )
          .route("/{swap_id}", web::get().to(plant_swap_handlers::get_plant_swap_handler))
          .route("/{swap_id}", web::put().to(plant_swap_handlers::update_plant_swap_handler))
          .route(
            "/{swap_id}/deal",
            web::post().to(plant_swap_handlers::make_plant_swap_deal_handler),
          )
          .route(
            "/{swap_id}",
            web::delete().to(plant_swap_handlers::delete_plant_swap_handler),
          ),
      ),
  );
}
