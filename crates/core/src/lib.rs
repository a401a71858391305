//! `tours-core` — identifiers and error primitives shared by the catalog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{AccountId, SalidaId, TourId, UserId, ZoneId};
