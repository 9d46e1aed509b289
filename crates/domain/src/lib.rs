//! # edgecmd-domain
//!
//! Pure domain model for the edgecmd device command gateway.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (registered endpoints with admin/operating state and an address)
//! - Define **Profiles** (device resources, profile resources and their resource operations)
//! - Define **Command values** (typed, timestamped values) and the coercion of raw
//!   request strings into them
//! - Define **Transforms** (scale/offset style data transforms, assertions, value mappings)
//! - Define **Readings** and **Events** produced by read commands
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod device;
pub mod event;
pub mod profile;
pub mod transform;
pub mod value;
