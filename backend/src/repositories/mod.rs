//! Persistence layer: one repository per entity.

pub mod user_repository;
