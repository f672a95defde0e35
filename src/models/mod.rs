//! Data models for the circulation engine

pub mod book;
pub mod copy;
pub mod loan;
pub mod patron;
