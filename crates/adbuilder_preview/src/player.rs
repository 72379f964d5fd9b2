// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless playback of a document on the software tween runtime.

use crate::document::Document;
use crate::error::{PreviewError, Result};
use crate::settings::PreviewSettings;
use adbuilder_timeline::{
    export_css, format_time, sample_visual_state, AnimationHost, TickOutcome, TimelineCommand, TimelineSession,
    TweenRuntime,
};
use std::path::PathBuf;

/// Largest allowed gap between native and sampled state at a pause
const SYNC_EPSILON: f64 = 1e-6;

/// Outcome of a preview run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewReport {
    /// Ticks simulated
    pub ticks: u32,
    /// Loop wraps seen
    pub wraps: u32,
    /// Whether playback reached the end and stopped on its own
    pub finished: bool,
    /// Playhead when the run ended
    pub final_time: f64,
    /// Largest native/sampled mismatch found at the final pause
    pub max_sync_error: f64,
}

/// Play a document until it finishes or the tick budget runs out
pub fn play(document: &Document, settings: &PreviewSettings) -> Result<PreviewReport> {
    let elements = &document.elements;
    let host = TweenRuntime::with_elements(elements);
    let mut session = TimelineSession::with_state(host, settings.playback, document.timeline.clone());
    let tick_ms = settings.playback.tick_millis();

    tracing::info!(
        "Playing {} elements ({} animated), {:.2}s at {}x{}",
        elements.len(),
        document.animated_element_count(),
        session.snapshot().duration,
        session.snapshot().playback_speed,
        if session.snapshot().looping { ", looping" } else { "" }
    );

    session.apply(TimelineCommand::Seek(0.0), elements)?;
    session.apply(TimelineCommand::Play, elements)?;

    let mut report = PreviewReport::default();
    while report.ticks < settings.max_ticks {
        let outcome = session.tick(elements);
        report.ticks += 1;
        match outcome {
            TickOutcome::Advanced => session.host_mut().advance(tick_ms),
            TickOutcome::Wrapped => {
                report.wraps += 1;
                tracing::info!("Loop {} wrapped to 0:00.00", report.wraps);
            }
            TickOutcome::Finished => {
                report.finished = true;
                break;
            }
            TickOutcome::Idle => break,
        }

        if settings.log_every > 0 && report.ticks % settings.log_every == 0 {
            log_frame(&session);
        }
    }

    if !report.finished {
        session.apply(TimelineCommand::Pause, elements)?;
    }
    report.final_time = session.snapshot().current_time;

    // Paused frames must agree with scrubbing
    for element in elements {
        let Some(live) = session.host().live_state(&element.id) else {
            continue;
        };
        let sampled = sample_visual_state(element, report.final_time, &session.snapshot().tracks);
        let error = live.max_distance(&sampled);
        if error > SYNC_EPSILON {
            tracing::warn!("{} out of sync by {:.3e} at pause", element.id, error);
        }
        report.max_sync_error = report.max_sync_error.max(error);
    }

    tracing::info!(
        "Stopped after {} ticks at {} ({} wraps)",
        report.ticks,
        format_time(report.final_time),
        report.wraps
    );
    Ok(report)
}

fn log_frame(session: &TimelineSession<TweenRuntime>) {
    let time = session.snapshot().current_time;
    for element_id in session.driver().bridge().active_elements() {
        if let Some(state) = session.host().live_state(element_id) {
            let (width, height) = state.effective_size();
            tracing::info!(
                "[{}] {}: pos=({:.1}, {:.1}) size={:.1}x{:.1} rot={:.1} opacity={:.2}",
                format_time(time),
                element_id,
                state.x,
                state.y,
                width,
                height,
                state.rotation,
                state.opacity
            );
        }
    }
}

/// Write one stylesheet with every animated element's keyframe table
pub fn export_stylesheet(document: &Document, settings: &PreviewSettings, file_stem: &str) -> Result<PathBuf> {
    let dir = &settings.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| PreviewError::io(dir, e))?;

    let css = export_css(&document.elements, &document.timeline, settings.samples_per_segment);
    tracing::debug!("{} animated elements exported", document.animated_element_count());

    let path = dir.join(format!("{}.css", file_stem));
    std::fs::write(&path, css).map_err(|e| PreviewError::io(&path, e))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
