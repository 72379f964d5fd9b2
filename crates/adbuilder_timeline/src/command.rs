// SPDX-License-Identifier: MIT OR Apache-2.0
//! Commands the UI layer sends to a timeline session.

use crate::element::ElementId;
use crate::keyframe::{KeyframeId, KeyframePatch};
use crate::track::TrackId;
use crate::value::{AnimationProperty, AnimationValue};

/// Every mutation of the timeline, as data
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineCommand {
    /// Start playback from the playhead
    Play,
    /// Pause and re-sync with the sampler
    Pause,
    /// Play if paused, pause if playing
    TogglePlay,
    /// Move the playhead
    Seek(f64),
    /// Set the timeline length in seconds
    SetDuration(f64),
    /// Set the playback speed multiplier
    SetPlaybackSpeed(f64),
    /// Flip looping
    ToggleLoop,
    /// Ensure an element has a track
    CreateTrack(ElementId),
    /// Remove an element's track
    RemoveTrack(ElementId),
    /// Add a keyframe; the time is clamped to the timeline
    AddKeyframe {
        /// Target element
        element_id: ElementId,
        /// Animated property
        property: AnimationProperty,
        /// Time in seconds
        time: f64,
        /// Value, must match the property's shape
        value: AnimationValue,
    },
    /// Patch a keyframe
    UpdateKeyframe {
        /// Keyframe to patch
        id: KeyframeId,
        /// Fields to change
        patch: KeyframePatch,
    },
    /// Delete a keyframe
    RemoveKeyframe(KeyframeId),
    /// Flip a track's visibility
    ToggleVisibility(TrackId),
    /// Flip a track's lock
    ToggleLock(TrackId),
    /// Flip a track's expansion
    ToggleExpansion(TrackId),
}

impl TimelineCommand {
    /// Whether the command edits keyframe data rather than transport state
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::CreateTrack(_)
                | Self::RemoveTrack(_)
                | Self::AddKeyframe { .. }
                | Self::UpdateKeyframe { .. }
                | Self::RemoveKeyframe(_)
        )
    }
}
