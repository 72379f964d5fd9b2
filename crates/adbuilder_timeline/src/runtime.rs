// SPDX-License-Identifier: MIT OR Apache-2.0
//! Software tween runtime.
//!
//! An [`AnimationHost`] with its own millisecond clock. Used by the headless
//! preview and in tests wherever a real rendering engine would run tweens.

use crate::bridge::{AnimationHost, ElementSchedule};
use crate::element::{Element, ElementId, VisualState};
use crate::value::AnimationProperty;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct Running {
    schedule: ElementSchedule,
    started_at_ms: f64,
}

#[derive(Debug, Clone)]
struct Node {
    /// Last written attributes
    base: VisualState,
    running: Option<Running>,
}

impl Node {
    fn state_at(&self, clock_ms: f64) -> VisualState {
        let mut state = self.base;
        if let Some(running) = &self.running {
            let elapsed = clock_ms - running.started_at_ms;
            for property in AnimationProperty::ALL {
                if let Some(value) = running.schedule.value_at(property, elapsed) {
                    state.set(value);
                }
            }
        }
        state
    }
}

/// Render nodes plus the tweens running on them
#[derive(Debug, Clone, Default)]
pub struct TweenRuntime {
    nodes: IndexMap<ElementId, Node>,
    clock_ms: f64,
}

impl TweenRuntime {
    /// Create an empty runtime at clock 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime with one node per element, at rest
    pub fn with_elements(elements: &[Element]) -> Self {
        let mut runtime = Self::new();
        for element in elements {
            runtime.attach(element.id.clone(), element.rest_state());
        }
        runtime
    }

    /// Add (or reset) a render node
    pub fn attach(&mut self, element: ElementId, state: VisualState) {
        self.nodes.insert(element, Node { base: state, running: None });
    }

    /// Remove a render node and everything running on it
    pub fn detach(&mut self, element: &ElementId) -> bool {
        self.nodes.shift_remove(element).is_some()
    }

    /// Runtime clock in milliseconds
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Whether a schedule is running on an element
    pub fn is_running(&self, element: &ElementId) -> bool {
        self.nodes.get(element).is_some_and(|n| n.running.is_some())
    }

    /// Number of elements with a running schedule
    pub fn running_count(&self) -> usize {
        self.nodes.values().filter(|n| n.running.is_some()).count()
    }

    /// Advance the clock. Finished schedules write their final values and
    /// are dropped.
    pub fn advance(&mut self, delta_ms: f64) {
        if !(delta_ms.is_finite() && delta_ms > 0.0) {
            return;
        }
        self.clock_ms += delta_ms;
        let clock = self.clock_ms;
        for (id, node) in &mut self.nodes {
            let finished = node
                .running
                .as_ref()
                .is_some_and(|r| clock - r.started_at_ms >= r.schedule.end_offset_ms());
            if finished {
                node.base = node.state_at(clock);
                node.running = None;
                tracing::trace!("Schedule finished for {}", id);
            }
        }
    }
}

impl AnimationHost for TweenRuntime {
    fn is_attached(&self, element: &ElementId) -> bool {
        self.nodes.contains_key(element)
    }

    fn apply(&mut self, element: &ElementId, state: &VisualState) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.base = *state;
        }
    }

    fn start(&mut self, schedule: ElementSchedule) {
        let clock = self.clock_ms;
        match self.nodes.get_mut(&schedule.element_id) {
            Some(node) => {
                node.base = node.state_at(clock);
                node.running = Some(Running { schedule, started_at_ms: clock });
            }
            None => tracing::warn!("Dropping schedule for detached element {}", schedule.element_id),
        }
    }

    fn cancel(&mut self, element: &ElementId) {
        let clock = self.clock_ms;
        if let Some(node) = self.nodes.get_mut(element) {
            // The node keeps whatever the tweens last wrote
            node.base = node.state_at(clock);
            node.running = None;
        }
    }

    fn live_state(&self, element: &ElementId) -> Option<VisualState> {
        self.nodes.get(element).map(|n| n.state_at(self.clock_ms))
    }
}
