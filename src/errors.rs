//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`GaleError`] covers every failure the core can report:
//! - Dereferencing an invalid or foreign reference handle
//! - Scene construction mismatches (unknown entity classes, broken asset tables)
//! - Failed node lookups and mistyped node properties
//! - Particle emitter pool exhaustion
//!
//! Construction-time errors abort scene loading entirely. Soft runtime
//! failures (an exhausted particle buffer, a missing particle material) are
//! logged instead and never surface here.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, GaleError>`.
//!
//! ```rust,ignore
//! use gale::errors::Result;
//!
//! fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
//!     self.sensor = ctx.base()?.find(ctx.nodes(), "*.*.Sensor")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Gale engine.
#[derive(Error, Debug)]
pub enum GaleError {
    // ========================================================================
    // Reference Handle Errors
    // ========================================================================
    /// A handle was default-constructed, belongs to another scene, or points
    /// past the end of its array.
    #[error("Invalid {kind} reference (index: {index})")]
    InvalidReference {
        /// Which handle type was dereferenced
        kind: &'static str,
        /// The offending index, `u32::MAX` for a default handle
        index: u32,
    },

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// No child matched a segment of a `find()` path.
    #[error("Could not find a node matching '{pattern}' of path '{path}' from '{from}'")]
    NodeNotFound {
        /// The path segment that failed to match
        pattern: String,
        /// The full path being resolved
        path: String,
        /// Name of the node the failing segment was matched against
        from: String,
    },

    /// A node property was read that the asset never defined.
    #[error("Property '{key}' does not exist")]
    PropertyMissing {
        /// Property key
        key: String,
    },

    /// A node property exists but holds a different variant.
    #[error("Property '{key}' is a {found}, expected {expected}")]
    PropertyType {
        /// Property key
        key: String,
        /// Requested type
        expected: &'static str,
        /// Stored variant
        found: &'static str,
    },

    // ========================================================================
    // Entity Errors
    // ========================================================================
    /// The asset names an entity class that was never registered.
    #[error("Unknown entity class: {0}")]
    UnknownEntityClass(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// An asset table index points outside its table.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: &'static str,
        /// The invalid index
        index: usize,
    },

    /// The asset node tree is not a tree (cycles, shared children).
    #[error("Malformed scene asset: {0}")]
    MalformedAsset(String),

    // ========================================================================
    // Particle Errors
    // ========================================================================
    /// Every emitter slot of the particle system is taken.
    #[error("Maximum count of particle emitters reached ({max})")]
    EmitterLimitReached {
        /// Configured emitter limit
        max: u32,
    },

    /// The emitter handle was already removed.
    #[error("Emitter is not part of this particle system")]
    UnknownEmitter,

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GaleError {
    pub(crate) fn invalid(kind: &'static str, index: u32) -> Self {
        GaleError::InvalidReference { kind, index }
    }
}

/// Alias for `Result<T, GaleError>`.
pub type Result<T> = std::result::Result<T, GaleError>;
