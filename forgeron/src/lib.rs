//! Assisted-injection factories for Rust structs.
//!
//! A factory built by this crate constructs a target whose dependencies come
//! from two places: values the dependency-injection framework resolves
//! ("provided", stored as lazy [`Provider`]s), and values the caller hands
//! over at creation time ("assisted"). Derive [`AssistedFactory`] on the
//! target and the generated peer type implements your factory trait,
//! accepting exactly the assisted values.

pub use forgeron_core::Provider;
pub use forgeron_derive::{AssistedFactory, inject, injectable};
