//! # Scene interface crate.
//!
//! Provides the wire protocol and shared scene data model used to talk to the
//! driving simulator.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Vector geometry used by the scene model
pub mod geom;

/// Wire message definitions
pub mod msg;

/// Framed JSON-over-TCP transport
pub mod net;

/// Scene data model and wire conversions
pub mod scene;
