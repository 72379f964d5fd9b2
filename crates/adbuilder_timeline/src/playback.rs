// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback driver.
//!
//! Two states, paused and playing, stored as `TimelineState::is_playing`.
//! While playing the native host owns visual state; the driver only moves
//! the logical clock. Every transition back to paused re-syncs the host
//! with the sampler.

use crate::bridge::{AnimationHost, NativeBridge};
use crate::element::{Element, ElementId};
use crate::error::Result;
use crate::sampler::sample_visual_state;
use crate::timeline::{TimelineState, DEFAULT_DURATION, MIN_DURATION};
use serde::{Deserialize, Serialize};

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Ticks per second while playing
    pub tick_rate_hz: f64,
    /// Duration of a new timeline, in seconds
    pub default_duration: f64,
    /// Shortest allowed duration, in seconds
    pub min_duration: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30.0,
            default_duration: DEFAULT_DURATION,
            min_duration: MIN_DURATION,
        }
    }
}

impl PlaybackConfig {
    /// Parse from RON; missing fields take their defaults
    pub fn from_ron(ron_str: &str) -> Result<Self> {
        Ok(ron::from_str(ron_str)?)
    }

    /// Seconds between ticks. Falls back to 30 Hz for unusable rates.
    pub fn tick_seconds(&self) -> f64 {
        if self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 {
            1.0 / self.tick_rate_hz
        } else {
            tracing::warn!("Invalid tick rate {}, using 30 Hz", self.tick_rate_hz);
            1.0 / 30.0
        }
    }

    /// Milliseconds between ticks
    pub fn tick_millis(&self) -> f64 {
        self.tick_seconds() * 1000.0
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed
    Idle,
    /// Clock moved forward
    Advanced,
    /// Reached the end and wrapped to 0
    Wrapped,
    /// Reached the end and paused there
    Finished,
}

/// Advances the timeline clock and keeps the native host in step
#[derive(Debug, Default)]
pub struct PlaybackDriver {
    config: PlaybackConfig,
    bridge: NativeBridge,
}

impl PlaybackDriver {
    /// Create a driver
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            bridge: NativeBridge::new(),
        }
    }

    /// Driver configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Bridge bookkeeping
    pub fn bridge(&self) -> &NativeBridge {
        &self.bridge
    }

    /// Fresh timeline using the configured default duration
    pub fn new_timeline(&self) -> TimelineState {
        let mut state = TimelineState::with_duration(self.config.default_duration);
        state.duration = state.duration.max(self.config.min_duration);
        state
    }

    /// Paused to playing. Schedules every animated element from the playhead.
    ///
    /// Playing from the very end restarts from 0.
    pub fn play<H: AnimationHost>(&mut self, state: &mut TimelineState, host: &mut H, elements: &[Element]) {
        if state.is_playing {
            return;
        }
        if state.current_time >= state.duration {
            state.current_time = 0.0;
        }
        state.is_playing = true;
        tracing::debug!("Play from {:.3}s at {}x", state.current_time, state.playback_speed);
        self.bridge
            .schedule_all(host, elements, &state.tracks, state.current_time, state.playback_speed);
    }

    /// Playing to paused. Cancels every tween, then snaps each element to
    /// the sampled frame at the playhead.
    pub fn pause<H: AnimationHost>(&mut self, state: &mut TimelineState, host: &mut H, elements: &[Element]) {
        if !state.is_playing {
            return;
        }
        state.is_playing = false;
        self.bridge.cancel_all(host);
        tracing::debug!("Paused at {:.3}s", state.current_time);
        self.snap(state, host, elements);
    }

    /// Flip between playing and paused
    pub fn toggle_play<H: AnimationHost>(&mut self, state: &mut TimelineState, host: &mut H, elements: &[Element]) {
        if state.is_playing {
            self.pause(state, host, elements);
        } else {
            self.play(state, host, elements);
        }
    }

    /// One fixed-rate step. The clock advances exactly once before any
    /// boundary handling.
    pub fn tick<H: AnimationHost>(
        &mut self,
        state: &mut TimelineState,
        host: &mut H,
        elements: &[Element],
    ) -> TickOutcome {
        if !state.is_playing {
            return TickOutcome::Idle;
        }

        let delta = self.config.tick_seconds() * state.playback_speed;
        state.current_time = (state.current_time + delta).max(0.0);

        if state.current_time < state.duration {
            return TickOutcome::Advanced;
        }

        if state.looping {
            state.current_time = 0.0;
            self.bridge.cancel_all(host);
            tracing::debug!("Loop wrap, rescheduling from 0");
            self.bridge
                .schedule_all(host, elements, &state.tracks, 0.0, state.playback_speed);
            TickOutcome::Wrapped
        } else {
            state.current_time = state.duration;
            self.pause(state, host, elements);
            TickOutcome::Finished
        }
    }

    /// Move the playhead, clamped to `[0, duration]`.
    ///
    /// Only visible while paused; during playback it relocates the cursor
    /// used when playback next pauses.
    pub fn seek<H: AnimationHost>(&mut self, state: &mut TimelineState, host: &mut H, elements: &[Element], time: f64) {
        state.seek(time);
        if !state.is_playing {
            self.snap(state, host, elements);
        }
    }

    /// Change speed. A running playback is rescheduled at the new speed.
    pub fn set_playback_speed<H: AnimationHost>(
        &mut self,
        state: &mut TimelineState,
        host: &mut H,
        elements: &[Element],
        speed: f64,
    ) {
        state.set_playback_speed(speed);
        if state.is_playing {
            self.bridge.cancel_all(host);
            self.bridge
                .schedule_all(host, elements, &state.tracks, state.current_time, state.playback_speed);
        }
    }

    /// Set the timeline length, honoring the configured minimum
    pub fn set_duration(&self, state: &mut TimelineState, duration: f64) {
        state.set_duration(duration.max(self.config.min_duration));
    }

    /// Re-sync the host after the timeline changed under a paused playhead
    pub fn refresh<H: AnimationHost>(&self, state: &TimelineState, host: &mut H, elements: &[Element]) {
        if !state.is_playing {
            self.snap(state, host, elements);
        }
    }

    /// Cancel an element's tweens before it goes away
    pub fn element_removed<H: AnimationHost>(&mut self, host: &mut H, element: &ElementId) {
        self.bridge.cancel_element(host, element);
    }

    /// Stop all native playback without touching the timeline
    pub fn cancel_all<H: AnimationHost>(&mut self, host: &mut H) {
        self.bridge.cancel_all(host);
    }

    fn snap<H: AnimationHost>(&self, state: &TimelineState, host: &mut H, elements: &[Element]) {
        for element in elements {
            if host.is_attached(&element.id) {
                host.apply(&element.id, &sample_visual_state(element, state.current_time, &state.tracks));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::runtime::TweenRuntime;
    use crate::value::{AnimationProperty, Point, PropertyValue};

    struct Fixture {
        state: TimelineState,
        host: TweenRuntime,
        elements: Vec<Element>,
        driver: PlaybackDriver,
    }

    impl Fixture {
        fn new(duration: f64) -> Self {
            let elements = vec![Element::text("a", "Sale"), Element::button("b", "Buy")];
            let mut state = TimelineState::with_duration(duration);
            let a = &elements[0].id;
            state.insert_keyframe(a, 0.0, PropertyValue::Position(Point::new(0.0, 0.0)), Easing::Linear);
            state.insert_keyframe(a, 1.3, PropertyValue::Position(Point::new(100.0, 50.0)), Easing::Bounce);
            state.insert_keyframe(a, 0.0, PropertyValue::Opacity(0.0), Easing::Linear);
            state.insert_keyframe(a, 1.0, PropertyValue::Opacity(1.0), Easing::Elastic);
            state.insert_keyframe(a, 0.5, PropertyValue::Scale(1.0), Easing::Linear);
            state.insert_keyframe(a, 1.9, PropertyValue::Scale(2.0), Easing::EaseInOut);
            let b = &elements[1].id;
            state.insert_keyframe(b, 0.2, PropertyValue::Rotation(0.0), Easing::Linear);
            state.insert_keyframe(b, 1.5, PropertyValue::Rotation(180.0), Easing::Ease);

            Self {
                host: TweenRuntime::with_elements(&elements),
                state,
                elements,
                driver: PlaybackDriver::new(PlaybackConfig::default()),
            }
        }

        fn tick(&mut self) -> TickOutcome {
            let outcome = self.driver.tick(&mut self.state, &mut self.host, &self.elements);
            if outcome == TickOutcome::Advanced {
                self.host.advance(self.driver.config().tick_millis());
            }
            outcome
        }

        fn play(&mut self) {
            self.driver.play(&mut self.state, &mut self.host, &self.elements);
        }

        fn pause(&mut self) {
            self.driver.pause(&mut self.state, &mut self.host, &self.elements);
        }

        fn assert_host_matches_sampler(&self) {
            for element in &self.elements {
                let live = self.host.live_state(&element.id).unwrap();
                let sampled = sample_visual_state(element, self.state.current_time, &self.state.tracks);
                assert!(live.approx_eq(&sampled, 1e-6), "{}: {live:?} vs {sampled:?}", element.id);
            }
        }
    }

    #[test]
    fn test_pause_matches_scrub_at_any_point() {
        for ticks in [0, 1, 7, 15, 31, 44] {
            let mut f = Fixture::new(5.0);
            f.play();
            for _ in 0..ticks {
                assert_eq!(f.tick(), TickOutcome::Advanced);
            }
            // Native state just before the pause already agrees with the sampler
            f.assert_host_matches_sampler();
            f.pause();
            assert_eq!(f.host.running_count(), 0);
            f.assert_host_matches_sampler();
        }
    }

    #[test]
    fn test_pause_consistency_at_other_speeds() {
        for speed in [0.25, 0.5, 2.0] {
            let mut f = Fixture::new(5.0);
            f.state.set_playback_speed(speed);
            f.state.seek(0.35);
            f.play();
            for _ in 0..17 {
                f.tick();
            }
            f.pause();
            f.assert_host_matches_sampler();
        }
    }

    #[test]
    fn test_loop_wrap_resets_to_zero() {
        let mut f = Fixture::new(2.0);
        f.state.looping = true;
        f.play();

        let mut wrapped = false;
        for _ in 0..70 {
            if f.tick() == TickOutcome::Wrapped {
                wrapped = true;
                break;
            }
        }
        assert!(wrapped);
        assert_eq!(f.state.current_time, 0.0);
        assert!(f.state.is_playing);
        f.assert_host_matches_sampler();

        // The fresh schedule runs from zero again
        f.tick();
        f.assert_host_matches_sampler();
    }

    #[test]
    fn test_end_without_loop_pauses_at_duration() {
        let mut f = Fixture::new(1.0);
        f.play();
        let mut outcome = TickOutcome::Advanced;
        for _ in 0..40 {
            outcome = f.tick();
            if outcome != TickOutcome::Advanced {
                break;
            }
        }
        assert_eq!(outcome, TickOutcome::Finished);
        assert!(!f.state.is_playing);
        assert_eq!(f.state.current_time, 1.0);
        f.assert_host_matches_sampler();
        assert_eq!(f.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_tick_step_uses_speed() {
        let mut f = Fixture::new(10.0);
        f.state.set_playback_speed(2.0);
        f.play();
        f.tick();
        assert!((f.state.current_time - 2.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_seek_clamps_and_snaps_while_paused() {
        let mut f = Fixture::new(5.0);
        f.driver.seek(&mut f.state, &mut f.host, &f.elements, 0.65);
        f.assert_host_matches_sampler();

        f.driver.seek(&mut f.state, &mut f.host, &f.elements, 99.0);
        assert_eq!(f.state.current_time, 5.0);
        f.driver.seek(&mut f.state, &mut f.host, &f.elements, -1.0);
        assert_eq!(f.state.current_time, 0.0);
    }

    #[test]
    fn test_seek_while_playing_only_moves_cursor() {
        let mut f = Fixture::new(5.0);
        f.play();
        f.tick();
        let before = f.host.live_state(&f.elements[0].id).unwrap();
        f.driver.seek(&mut f.state, &mut f.host, &f.elements, 1.2);
        assert_eq!(f.host.live_state(&f.elements[0].id).unwrap(), before);

        f.pause();
        assert_eq!(f.state.current_time, 1.2);
        f.assert_host_matches_sampler();
    }

    #[test]
    fn test_edits_during_playback_do_not_touch_running_tweens() {
        let mut f = Fixture::new(5.0);
        f.play();
        let id = f.state.tracks[0].keyframes_for(AnimationProperty::Opacity)[1].id;
        f.state
            .update_keyframe(id, &crate::keyframe::KeyframePatch::value(0.1))
            .unwrap();
        for _ in 0..40 {
            f.tick();
        }
        // Opacity tween still lands on the value it was scheduled with
        assert_eq!(f.host.live_state(&f.elements[0].id).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_zero_speed_refuses_to_schedule() {
        let mut f = Fixture::new(5.0);
        f.state.set_playback_speed(0.0);
        f.play();
        assert_eq!(f.host.running_count(), 0);
        assert_eq!(f.tick(), TickOutcome::Advanced);
        assert_eq!(f.state.current_time, 0.0);
    }

    #[test]
    fn test_detached_element_is_skipped() {
        let mut f = Fixture::new(5.0);
        f.host.detach(&f.elements[1].id);
        f.play();
        assert_eq!(f.host.running_count(), 1);
        assert!(f.driver.bridge().is_active(&f.elements[0].id));
        assert!(!f.driver.bridge().is_active(&f.elements[1].id));
    }

    #[test]
    fn test_config_from_ron_fills_defaults() {
        let config = PlaybackConfig::from_ron("(tick_rate_hz: 60.0)").unwrap();
        assert_eq!(config.tick_rate_hz, 60.0);
        assert_eq!(config.min_duration, 1.0);
        assert!((config.tick_millis() - 1000.0 / 60.0).abs() < 1e-12);
    }
}
