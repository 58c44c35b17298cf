//! onboard-flow — configurable multi-page onboarding flows.
//!
//! Operators author a flow as a graph of pages ([`graph`]), which the
//! [`codec`] persists through the backend [`gateway`]. Users walk a saved
//! flow through the [`wizard`], which registers them on the first page and
//! updates their profile on the last.

pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod graph;
pub mod wizard;
