// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-document timeline session.
//!
//! Owns the timeline state, the playback driver and the animation host.
//! Elements stay with the document and are passed in on every call.

use crate::bridge::AnimationHost;
use crate::command::TimelineCommand;
use crate::element::{Element, ElementId};
use crate::error::Result;
use crate::playback::{PlaybackConfig, PlaybackDriver, TickOutcome};
use crate::timeline::TimelineState;

/// Timeline state plus the machinery that plays it
pub struct TimelineSession<H: AnimationHost> {
    state: TimelineState,
    driver: PlaybackDriver,
    host: H,
}

impl<H: AnimationHost> TimelineSession<H> {
    /// Create a session with an empty timeline
    pub fn new(host: H, config: PlaybackConfig) -> Self {
        let driver = PlaybackDriver::new(config);
        Self {
            state: driver.new_timeline(),
            driver,
            host,
        }
    }

    /// Create a session around existing state. Playback starts paused.
    pub fn with_state(host: H, config: PlaybackConfig, state: TimelineState) -> Self {
        Self {
            state: state.into_loaded(),
            driver: PlaybackDriver::new(config),
            host,
        }
    }

    /// Read-only view for rendering markers and the scrubber
    pub fn snapshot(&self) -> &TimelineState {
        &self.state
    }

    /// Playback driver
    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    /// Animation host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable animation host, for advancing its clock or attaching nodes
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Run one command.
    ///
    /// Missing IDs are logged and ignored. Values of the wrong shape are
    /// returned as errors and leave the timeline unchanged.
    pub fn apply(&mut self, command: TimelineCommand, elements: &[Element]) -> Result<()> {
        tracing::trace!("Timeline command: {:?}", command);
        let is_edit = command.is_edit();
        let result = self.dispatch(command, elements);

        if is_edit {
            self.driver.refresh(&self.state, &mut self.host, elements);
        }

        match result {
            Err(e) if e.is_not_found() => {
                tracing::warn!("Ignoring timeline command: {}", e);
                Ok(())
            }
            other => other,
        }
    }

    fn dispatch(&mut self, command: TimelineCommand, elements: &[Element]) -> Result<()> {
        let state = &mut self.state;
        let host = &mut self.host;
        match command {
            TimelineCommand::Play => self.driver.play(state, host, elements),
            TimelineCommand::Pause => self.driver.pause(state, host, elements),
            TimelineCommand::TogglePlay => self.driver.toggle_play(state, host, elements),
            TimelineCommand::Seek(time) => self.driver.seek(state, host, elements, time),
            TimelineCommand::SetDuration(duration) => self.driver.set_duration(state, duration),
            TimelineCommand::SetPlaybackSpeed(speed) => {
                self.driver.set_playback_speed(state, host, elements, speed)
            }
            TimelineCommand::ToggleLoop => state.toggle_loop(),
            TimelineCommand::CreateTrack(element_id) => {
                state.create_track(&element_id);
            }
            TimelineCommand::RemoveTrack(element_id) => {
                self.driver.element_removed(host, &element_id);
                state.remove_track(&element_id);
            }
            TimelineCommand::AddKeyframe {
                element_id,
                property,
                time,
                value,
            } => {
                let time = if time.is_nan() { 0.0 } else { time.clamp(0.0, state.duration) };
                state.add_keyframe(&element_id, property, time, value)?;
            }
            TimelineCommand::UpdateKeyframe { id, patch } => state.update_keyframe(id, &patch)?,
            TimelineCommand::RemoveKeyframe(id) => {
                state.remove_keyframe(id)?;
            }
            TimelineCommand::ToggleVisibility(id) => state.toggle_visibility(id)?,
            TimelineCommand::ToggleLock(id) => state.toggle_lock(id)?,
            TimelineCommand::ToggleExpansion(id) => state.toggle_expansion(id)?,
        }
        Ok(())
    }

    /// Run a batch of commands. Rejected ones are logged and skipped.
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = TimelineCommand>, elements: &[Element]) {
        for command in commands {
            if let Err(e) = self.apply(command, elements) {
                tracing::warn!("Timeline command rejected: {}", e);
            }
        }
    }

    /// Fixed-rate tick from the host's timer
    pub fn tick(&mut self, elements: &[Element]) -> TickOutcome {
        self.driver.tick(&mut self.state, &mut self.host, elements)
    }

    /// Document created: fresh timeline
    pub fn new_document(&mut self) {
        self.driver.cancel_all(&mut self.host);
        self.state = self.driver.new_timeline();
        tracing::debug!("Timeline reset for new document");
    }

    /// Document cleared: fresh timeline
    pub fn clear_document(&mut self) {
        self.new_document();
    }

    /// Document imported: replace the timeline with the saved one.
    ///
    /// On a parse error the current timeline is kept.
    pub fn import(&mut self, json: &str, elements: &[Element]) -> Result<()> {
        let state = TimelineState::from_json(json)?;
        self.driver.cancel_all(&mut self.host);
        self.state = state;
        self.driver.refresh(&self.state, &mut self.host, elements);
        tracing::debug!("Imported timeline with {} tracks", self.state.tracks.len());
        Ok(())
    }

    /// Saved form of the timeline, with playback cleared
    pub fn export_json(&self) -> Result<String> {
        let mut state = self.state.clone();
        state.is_playing = false;
        state.to_json()
    }

    /// An element left the document: stop its tweens and drop its track
    pub fn element_removed(&mut self, element: &ElementId) {
        self.driver.element_removed(&mut self.host, element);
        self.state.remove_track(element);
    }
}
