//! Persistence for courses, the question bank, exam configuration and chapter scores.

pub mod repository;
pub mod sqlite;
