//! Core types for EcoPonto.
//!
//! This module provides validated wrappers for common domain concepts.

pub mod coordinates;
pub mod email;
pub mod id;
pub mod phone;
pub mod uf;

pub use coordinates::{Coordinates, CoordinatesError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use uf::{Uf, UfError};
