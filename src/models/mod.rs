// src/models/mod.rs

//! Data structures representing database entities.

pub mod appointment;
pub mod order;
pub mod plant_swap;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod};
pub use plant_swap::{PlantSwap, SwapStatus};
pub use product::Product;
pub use review::{CaretakerReview, ProductReview};
pub use session::Session;
pub use user::{Role, User};
