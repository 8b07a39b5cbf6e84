//! API endpoint handlers.
//!
//! Handlers validate the posted data and delegate to `intelligence`,
//! `models` and `summary`. None of them touch storage.

pub mod alerts;
pub mod health;
pub mod summary;
pub mod vitals;
