//! EcoPonto Client - registration workflow and browsing library.
//!
//! This crate is the client half of the point registration workflow,
//! independent of any particular UI framework. A UI embeds it by:
//!
//! 1. Rendering [`form::RegistrationForm`] (the single source of truth for
//!    form state),
//! 2. Feeding user interactions to [`workflow::RegistrationWorkflow`],
//!    which applies them through the reducer and executes the resulting
//!    async effects (geography fetches, position acquisition, submit).
//!
//! # Modules
//!
//! - [`form`] - Form state and the pure reducer (`apply`)
//! - [`workflow`] - Effect driver connecting the reducer to the network
//! - [`geo`] - State/city directory and postal-code lookup client
//! - [`location`] - Device geolocation seam and the position pipeline
//! - [`api`] - Typed client for the EcoPonto REST API
//! - [`config`] - Endpoint configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod form;
pub mod geo;
pub mod location;
pub mod workflow;

pub use api::{ApiClient, ApiError, PickedImage, PointSubmission};
pub use config::ClientConfig;
pub use form::{Effect, FormEvent, FormStatus, RegistrationForm};
pub use geo::{GeoClient, GeoDirectory, GeoError};
pub use location::{AcquiredPosition, LocationError, LocationProvider, PositionError};
pub use workflow::RegistrationWorkflow;
