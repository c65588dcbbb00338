// src/web/handlers/mod.rs

// Declare handler modules
pub mod appointment_handlers;
pub mod auth_handlers;
pub mod order_handlers;
pub mod plant_swap_handlers;
pub mod product_handlers;
pub mod user_handlers;
