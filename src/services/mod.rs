// src/services/mod.rs

//! Business logic: availability checking, payment-token acquisition, session
//! handling, and record lifecycle for each aggregate. Handlers stay thin and
//! delegate here.

pub mod appointments;
pub mod auth;
pub mod availability;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod swaps;
