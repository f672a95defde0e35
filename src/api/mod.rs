//! API handlers for the Aklatan REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod patrons;
pub mod stats;
