// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for timeline operations.

use crate::keyframe::KeyframeId;
use crate::track::TrackId;
use crate::value::{AnimationProperty, ValueShape};
use thiserror::Error;

/// Errors surfaced by the keyframe store and persistence layer
#[derive(Debug, Error)]
pub enum TimelineError {
    /// No keyframe with this ID exists in any track
    #[error("Keyframe not found: {0:?}")]
    KeyframeNotFound(KeyframeId),

    /// No track with this ID exists
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// Value shape does not match the property
    #[error("Malformed value for {property}: expected {expected}")]
    MalformedValue {
        /// Property the value was given for
        property: AnimationProperty,
        /// Shape the property requires
        expected: ValueShape,
    },

    /// Property name outside the closed set
    #[error("Unknown animation property: {0:?}")]
    UnknownProperty(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
}

impl TimelineError {
    /// Whether this error only reports a missing ID
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyframeNotFound(_) | Self::TrackNotFound(_))
    }
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
