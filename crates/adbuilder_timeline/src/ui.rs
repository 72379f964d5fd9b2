// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline panel rendering.
//!
//! Features:
//! - Transport toolbar (play/pause, rewind, speed, loop, duration)
//! - Time ruler with scrubbing
//! - One row per track, per-property rows when expanded
//! - Keyframe markers (click to seek, shift-click to delete)
//! - Add keyframe at the playhead
//!
//! The panel never mutates the timeline. It reads a snapshot and returns the
//! commands the user issued this frame.

use crate::command::TimelineCommand;
use crate::element::{Element, ElementId, ElementKind};
use crate::sampler::{sample_property, track_for};
use crate::timeline::TimelineState;
use crate::track::AnimationTrack;
use crate::value::AnimationProperty;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};

const ROW_HEIGHT: f32 = 24.0;
const TRACK_HEADER_WIDTH: f32 = 180.0;
const RULER_HEIGHT: f32 = 24.0;
const MARKER_SIZE: f32 = 10.0;
const PLAYHEAD_WIDTH: f32 = 2.0;
const MIN_PIXELS_PER_SECOND: f32 = 20.0;
const MIN_LABEL_SPACING: f32 = 48.0;

/// Ruler steps in seconds, smallest first
const RULER_STEPS: [f64; 12] = [1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0];

/// Speeds offered by the speed selector
pub const SPEED_CHOICES: [f64; 4] = [0.25, 0.5, 1.0, 2.0];

/// Duration range accepted by the duration field, in seconds
pub const DURATION_RANGE: std::ops::RangeInclusive<f64> = 1.0..=60.0;

/// Format seconds as `m:ss.cc`
pub fn format_time(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    format!("{}:{:02}.{:02}", centis / 6000, (centis % 6000) / 100, centis % 100)
}

/// Short label for an element row
fn element_label(element: Option<&Element>, id: &ElementId) -> String {
    match element.map(|e| &e.kind) {
        Some(ElementKind::Text { text, .. }) => format!("T {}", truncate(text, 18)),
        Some(ElementKind::Image { .. }) => format!("Image {}", truncate(id.as_str(), 12)),
        Some(ElementKind::Button { label, .. }) => format!("Btn {}", truncate(label, 16)),
        None => format!("? {}", truncate(id.as_str(), 16)),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn property_color(property: AnimationProperty) -> Color32 {
    let [r, g, b] = property.color();
    Color32::from_rgb(r, g, b)
}

/// Horizontal time axis of the track area
#[derive(Debug, Clone, Copy)]
struct TimeAxis {
    origin_x: f32,
    pixels_per_second: f32,
    duration: f64,
}

impl TimeAxis {
    fn fit(rect: Rect, duration: f64) -> Self {
        let width = (rect.width() - TRACK_HEADER_WIDTH - 8.0).max(1.0);
        Self {
            origin_x: rect.min.x + TRACK_HEADER_WIDTH,
            pixels_per_second: (width / duration.max(1.0) as f32).max(MIN_PIXELS_PER_SECOND),
            duration,
        }
    }

    fn time_to_x(&self, time: f64) -> f32 {
        self.origin_x + time as f32 * self.pixels_per_second
    }

    /// Pointer x to a time inside the timeline
    fn x_to_time(&self, x: f32) -> f64 {
        (((x - self.origin_x) / self.pixels_per_second) as f64).clamp(0.0, self.duration)
    }

    /// Smallest step keeping ruler labels at least `MIN_LABEL_SPACING` apart
    fn ruler_step(&self) -> f64 {
        RULER_STEPS
            .into_iter()
            .find(|step| *step as f32 * self.pixels_per_second >= MIN_LABEL_SPACING)
            .unwrap_or_else(|| {
                let seconds = (MIN_LABEL_SPACING / self.pixels_per_second) as f64;
                (seconds / 3600.0).ceil() * 3600.0
            })
    }

    /// Tick times that fall between the origin and `max_x`
    fn ruler_ticks(&self, max_x: f32) -> Vec<f64> {
        let step = self.ruler_step();
        let end = self.x_to_time(max_x);
        let count = (end / step).floor() as usize;
        (0..=count).map(|i| i as f64 * step).collect()
    }
}

/// Timeline panel state (view-only; the timeline lives in the session)
#[derive(Debug, Clone)]
pub struct TimelinePanel {
    /// Element the "add keyframe" control targets
    pub selected_element: Option<ElementId>,
    /// Property the "add keyframe" control captures
    pub add_property: AnimationProperty,
    scrubbing: bool,
}

impl Default for TimelinePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelinePanel {
    /// Create a panel
    pub fn new() -> Self {
        Self {
            selected_element: None,
            add_property: AnimationProperty::Position,
            scrubbing: false,
        }
    }

    /// Draw the panel and collect this frame's commands
    pub fn ui(&mut self, ui: &mut egui::Ui, state: &TimelineState, elements: &[Element]) -> Vec<TimelineCommand> {
        let mut commands = Vec::new();

        self.render_toolbar(ui, state, &mut commands);
        ui.separator();
        self.render_add_keyframe(ui, state, elements, &mut commands);
        ui.separator();

        let row_count: usize = state
            .tracks
            .iter()
            .map(|t| 1 + if t.expanded { t.animated_properties().len() } else { 0 })
            .sum();
        let height = RULER_HEIGHT + row_count.max(1) as f32 * ROW_HEIGHT;
        let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), height), Sense::hover());
        let axis = TimeAxis::fit(rect, state.duration);

        let ruler_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), RULER_HEIGHT));
        self.render_ruler(ui, ruler_rect, axis, state, &mut commands);

        let rows_rect = Rect::from_min_max(Pos2::new(rect.min.x, ruler_rect.max.y), rect.max);
        self.render_tracks(ui, rows_rect, axis, state, elements, &mut commands);

        commands
    }

    /// Transport controls
    fn render_toolbar(&mut self, ui: &mut egui::Ui, state: &TimelineState, commands: &mut Vec<TimelineCommand>) {
        ui.horizontal(|ui| {
            let play_label = if state.is_playing { "⏸" } else { "▶" };
            if ui.button(play_label).on_hover_text("Play/Pause").clicked() {
                commands.push(TimelineCommand::TogglePlay);
            }
            if ui.button("⏮").on_hover_text("Go to Start").clicked() {
                commands.push(TimelineCommand::Seek(0.0));
            }

            ui.separator();
            ui.monospace(format!("{} / {}", format_time(state.current_time), format_time(state.duration)));
            ui.separator();

            ui.label("Speed:");
            let mut speed = state.playback_speed;
            egui::ComboBox::from_id_salt("timeline_speed")
                .selected_text(format!("{}x", speed))
                .show_ui(ui, |ui| {
                    for choice in SPEED_CHOICES {
                        ui.selectable_value(&mut speed, choice, format!("{}x", choice));
                    }
                });
            if speed != state.playback_speed {
                commands.push(TimelineCommand::SetPlaybackSpeed(speed));
            }

            let mut looping = state.looping;
            if ui.checkbox(&mut looping, "Loop").changed() {
                commands.push(TimelineCommand::ToggleLoop);
            }

            ui.separator();
            ui.label("Duration:");
            let mut duration = state.duration;
            let response = ui.add(
                egui::DragValue::new(&mut duration)
                    .range(DURATION_RANGE)
                    .clamp_existing_to_range(false)
                    .speed(0.1)
                    .suffix("s"),
            );
            if response.changed() && duration != state.duration {
                commands.push(TimelineCommand::SetDuration(duration));
            }
        });
    }

    /// Element/property pickers and the "+" button
    fn render_add_keyframe(
        &mut self,
        ui: &mut egui::Ui,
        state: &TimelineState,
        elements: &[Element],
        commands: &mut Vec<TimelineCommand>,
    ) {
        if self
            .selected_element
            .as_ref()
            .is_some_and(|id| !elements.iter().any(|e| &e.id == id))
        {
            self.selected_element = None;
        }

        ui.horizontal(|ui| {
            let selected = self
                .selected_element
                .as_ref()
                .and_then(|id| elements.iter().find(|e| &e.id == id));
            let selected_text = selected
                .map(|e| element_label(Some(e), &e.id))
                .unwrap_or_else(|| "Select element".to_string());

            egui::ComboBox::from_id_salt("timeline_element")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for element in elements {
                        ui.selectable_value(
                            &mut self.selected_element,
                            Some(element.id.clone()),
                            element_label(Some(element), &element.id),
                        );
                    }
                });

            egui::ComboBox::from_id_salt("timeline_property")
                .selected_text(self.add_property.name())
                .show_ui(ui, |ui| {
                    for property in AnimationProperty::ALL {
                        ui.selectable_value(&mut self.add_property, property, property.name());
                    }
                });

            let locked = selected
                .and_then(|e| state.track_for(&e.id))
                .is_some_and(|t| t.locked);
            let enabled = selected.is_some() && !locked;
            let add = ui
                .add_enabled(enabled, egui::Button::new("+ Keyframe"))
                .on_hover_text("Add keyframe at the playhead");
            if add.clicked() {
                if let Some(element) = selected {
                    commands.push(add_keyframe_command(state, element, self.add_property));
                }
            }
        });
    }

    /// Ruler with one tick per second; click or drag to scrub
    fn render_ruler(
        &mut self,
        ui: &mut egui::Ui,
        rect: Rect,
        axis: TimeAxis,
        state: &TimelineState,
        commands: &mut Vec<TimelineCommand>,
    ) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        for second in axis.ruler_ticks(rect.max.x) {
            let x = axis.time_to_x(second);
            painter.line_segment(
                [Pos2::new(x, rect.max.y - 8.0), Pos2::new(x, rect.max.y)],
                Stroke::new(1.0, Color32::from_gray(160)),
            );
            painter.text(
                Pos2::new(x + 2.0, rect.min.y + 3.0),
                egui::Align2::LEFT_TOP,
                format!("{}s", second),
                egui::FontId::monospace(10.0),
                Color32::from_gray(180),
            );
        }

        let playhead_x = axis.time_to_x(state.current_time);
        let triangle = vec![
            Pos2::new(playhead_x, rect.max.y - 8.0),
            Pos2::new(playhead_x - 6.0, rect.max.y),
            Pos2::new(playhead_x + 6.0, rect.max.y),
        ];
        painter.add(egui::Shape::convex_polygon(
            triangle,
            Color32::from_rgb(255, 100, 100),
            Stroke::NONE,
        ));

        let scrub_rect = Rect::from_min_max(Pos2::new(axis.origin_x, rect.min.y), rect.max);
        let response = ui.interact(scrub_rect, ui.id().with("timeline_ruler"), Sense::click_and_drag());
        if response.drag_started() {
            self.scrubbing = true;
        }
        if response.clicked() || (self.scrubbing && response.dragged()) {
            if let Some(pos) = response.interact_pointer_pos() {
                commands.push(TimelineCommand::Seek(axis.x_to_time(pos.x)));
            }
        }
        if response.drag_stopped() {
            self.scrubbing = false;
        }
    }

    /// Track rows with headers and markers
    fn render_tracks(
        &mut self,
        ui: &mut egui::Ui,
        rect: Rect,
        axis: TimeAxis,
        state: &TimelineState,
        elements: &[Element],
        commands: &mut Vec<TimelineCommand>,
    ) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));

        if state.tracks.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No animations yet",
                egui::FontId::proportional(12.0),
                Color32::from_gray(120),
            );
        }

        let mut y = rect.min.y;
        for (index, track) in state.tracks.iter().enumerate() {
            let element = elements.iter().find(|e| e.id == track.element_id);
            let row = Rect::from_min_size(Pos2::new(rect.min.x, y), Vec2::new(rect.width(), ROW_HEIGHT));
            self.render_track_header(ui, &painter, row, track, element, index, commands);
            self.render_markers(ui, &painter, row, axis, track, None, commands);
            y += ROW_HEIGHT;

            if track.expanded {
                for property in track.animated_properties() {
                    let row = Rect::from_min_size(Pos2::new(rect.min.x, y), Vec2::new(rect.width(), ROW_HEIGHT));
                    painter.text(
                        Pos2::new(row.min.x + 24.0, row.center().y),
                        egui::Align2::LEFT_CENTER,
                        property.name(),
                        egui::FontId::proportional(11.0),
                        property_color(property),
                    );
                    self.render_markers(ui, &painter, row, axis, track, Some(property), commands);
                    y += ROW_HEIGHT;
                }
            }
        }

        let playhead_x = axis.time_to_x(state.current_time);
        painter.line_segment(
            [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
            Stroke::new(PLAYHEAD_WIDTH, Color32::from_rgb(255, 100, 100)),
        );
    }

    /// Name plus visibility/lock/expand toggles
    fn render_track_header(
        &self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        row: Rect,
        track: &AnimationTrack,
        element: Option<&Element>,
        index: usize,
        commands: &mut Vec<TimelineCommand>,
    ) {
        let bg = if index % 2 == 0 { Color32::from_gray(34) } else { Color32::from_gray(28) };
        painter.rect_filled(row, 0.0, bg);

        let text_color = if track.visible { Color32::from_gray(210) } else { Color32::from_gray(110) };
        painter.text(
            Pos2::new(row.min.x + 8.0, row.center().y),
            egui::Align2::LEFT_CENTER,
            element_label(element, &track.element_id),
            egui::FontId::proportional(12.0),
            text_color,
        );

        let buttons = [
            (if track.expanded { "▾" } else { "▸" }, TimelineCommand::ToggleExpansion(track.id)),
            (if track.locked { "🔒" } else { "🔓" }, TimelineCommand::ToggleLock(track.id)),
            (if track.visible { "👁" } else { "–" }, TimelineCommand::ToggleVisibility(track.id)),
        ];
        let mut x = row.min.x + TRACK_HEADER_WIDTH - 4.0;
        for (label, command) in buttons {
            x -= 20.0;
            let button_rect = Rect::from_min_size(Pos2::new(x, row.min.y + 2.0), Vec2::new(18.0, ROW_HEIGHT - 4.0));
            if ui.put(button_rect, egui::Button::new(label).small()).clicked() {
                commands.push(command);
            }
        }

        painter.line_segment(
            [Pos2::new(row.min.x, row.max.y), Pos2::new(row.max.x, row.max.y)],
            Stroke::new(1.0, Color32::from_gray(45)),
        );
    }

    /// Diamonds for a track (all properties) or one property row
    fn render_markers(
        &self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        row: Rect,
        axis: TimeAxis,
        track: &AnimationTrack,
        property: Option<AnimationProperty>,
        commands: &mut Vec<TimelineCommand>,
    ) {
        let center_y = row.center().y;
        let half = MARKER_SIZE / 2.0;

        for keyframe in track
            .keyframes
            .iter()
            .filter(|k| property.map_or(true, |p| k.property() == p))
        {
            let x = axis.time_to_x(keyframe.time);
            let beyond = keyframe.time < 0.0 || keyframe.time > axis.duration;
            let x = x.clamp(axis.origin_x, row.max.x - half);

            let diamond = vec![
                Pos2::new(x, center_y - half),
                Pos2::new(x + half, center_y),
                Pos2::new(x, center_y + half),
                Pos2::new(x - half, center_y),
            ];
            let fill = if beyond {
                Color32::from_gray(70)
            } else {
                property_color(keyframe.property())
            };
            painter.add(egui::Shape::convex_polygon(diamond, fill, Stroke::new(1.0, Color32::from_gray(80))));

            let hit = Rect::from_center_size(Pos2::new(x, center_y), Vec2::splat(MARKER_SIZE + 2.0));
            let id = ui.id().with(("keyframe", keyframe.id.0, property.map(|p| p.name())));
            let response = ui
                .interact(hit, id, Sense::click())
                .on_hover_text(format!(
                    "{} @ {} ({})",
                    keyframe.property(),
                    format_time(keyframe.time),
                    keyframe.easing
                ));
            if response.clicked() {
                let shift = ui.input(|i| i.modifiers.shift);
                if shift && !track.locked {
                    commands.push(TimelineCommand::RemoveKeyframe(keyframe.id));
                } else if !beyond {
                    commands.push(TimelineCommand::Seek(keyframe.time));
                }
            }
        }
    }
}

/// Keyframe capturing the property's sampled value at the playhead
pub fn add_keyframe_command(state: &TimelineState, element: &Element, property: AnimationProperty) -> TimelineCommand {
    let rest = element.rest_value(property);
    let value = sample_property(track_for(&state.tracks, element), property, state.current_time, rest);
    TimelineCommand::AddKeyframe {
        element_id: element.id.clone(),
        property,
        time: state.current_time,
        value: value.value(),
    }
}
