//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the domain layer and infrastructure.
//! These traits are owned by the domain and implemented by adapters or by the
//! environments the agents learn in.

pub mod environment;
pub mod observer;
pub mod repository;

pub use environment::{Environment, Step};
pub use observer::Observer;
pub use repository::ModelRepository;
