// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline animation engine for the ad builder.
//!
//! This crate provides keyframed property animation for banner layouts:
//! - Easing curves shared by scrubbing and playback
//! - Per-element tracks of typed keyframes
//! - A pure sampler for scrubbing and paused frames
//! - A fixed-rate playback driver
//! - A native bridge that hands tween schedules to an animation host
//! - Static CSS keyframe-table export
//!
//! ## Architecture
//!
//! A [`TimelineSession`] owns the [`TimelineState`], the [`PlaybackDriver`]
//! and an [`AnimationHost`]. The UI sends [`TimelineCommand`]s; the
//! rendering layer reads [`sample_element`] while paused and lets the host
//! run tweens while playing.

pub mod bridge;
pub mod command;
pub mod easing;
pub mod element;
pub mod error;
pub mod export;
pub mod keyframe;
pub mod playback;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod timeline;
pub mod track;
pub mod ui;
pub mod value;

pub use bridge::{build_schedule, AnimationHost, ElementSchedule, NativeBridge, Tween};
pub use command::TimelineCommand;
pub use easing::{ease, Easing};
pub use element::{Element, ElementId, ElementKind, VisualState};
pub use error::{Result, TimelineError};
pub use export::{element_selector, export_css, KeyframeStop, KeyframeTable};
pub use keyframe::{Keyframe, KeyframeId, KeyframePatch};
pub use playback::{PlaybackConfig, PlaybackDriver, TickOutcome};
pub use runtime::TweenRuntime;
pub use sampler::{sample_element, sample_elements, sample_property, sample_visual_state};
pub use session::TimelineSession;
pub use timeline::TimelineState;
pub use track::{AnimationTrack, TrackId};
pub use ui::{format_time, TimelinePanel};
pub use value::{AnimationProperty, AnimationValue, Point, PropertyValue, ValueShape};
