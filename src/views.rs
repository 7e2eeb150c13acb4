use serde::Serialize;
use tracing::warn;

use crate::festival::{FestivalData, Performance, PerformanceIdentity};
use crate::likes::LikeStore;
use crate::schedule::{absolute_span, day_spans, resolve_now_playing};
use crate::time::{FestivalWeek, Weekday};

/// Base horizontal scale of the timeline before zoom is applied.
pub const PIXELS_PER_MINUTE: f64 = 2.0;

/// Numeric zoom factor clamped to a configured range. Two input channels:
/// discrete steps (+/- controls) and a continuous two-point distance ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Zoom {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            factor: 1.0f64.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() {
            self.factor = factor.clamp(self.min, self.max);
        }
        self
    }

    pub fn factor(self) -> f64 {
        self.factor
    }

    pub fn step_in(&mut self) {
        self.factor = (self.factor + self.step).clamp(self.min, self.max);
    }

    pub fn step_out(&mut self) {
        self.factor = (self.factor - self.step).clamp(self.min, self.max);
    }

    /// Applies a pinch gesture's distance ratio. Non-positive or non-finite
    /// ratios are ignored.
    pub fn pinch(&mut self, ratio: f64) {
        if ratio.is_finite() && ratio > 0.0 {
            self.factor = (self.factor * ratio).clamp(self.min, self.max);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub time: String,
    pub artist: String,
    pub identity: PerformanceIdentity,
    pub liked: bool,
}

impl SlotView {
    fn new(stage: &str, day: Weekday, performance: &Performance, likes: &LikeStore) -> Self {
        let identity = PerformanceIdentity::derive(stage, day, performance);
        let liked = likes.is_liked(&identity);
        Self {
            time: performance.time.clone(),
            artist: performance.artist.clone(),
            identity,
            liked,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NowPlayingView {
    pub day: Weekday,
    pub stages: Vec<StageNow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageNow {
    pub stage: String,
    pub now_playing: Option<SlotView>,
}

/// The per-stage current performance at `now_minutes` on `day`.
pub fn now_playing_view(
    data: &FestivalData,
    likes: &LikeStore,
    day: Weekday,
    now_minutes: u32,
    default_len: u32,
) -> NowPlayingView {
    let stages = data
        .stages
        .iter()
        .map(|stage| StageNow {
            stage: stage.name.clone(),
            now_playing: resolve_now_playing(stage, day, now_minutes, default_len)
                .map(|performance| SlotView::new(&stage.name, day, performance, likes)),
        })
        .collect();
    NowPlayingView { day, stages }
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedEntry {
    pub identity: PerformanceIdentity,
    pub artist: String,
    pub stage: String,
    pub day: Weekday,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedView {
    pub entries: Vec<LikedEntry>,
}

/// Every liked identity resolved back to display info. Identities that no
/// longer resolve against the document are skipped.
pub fn liked_view(data: &FestivalData, likes: &LikeStore) -> LikedView {
    let entries = likes
        .snapshot()
        .into_iter()
        .filter_map(|id| match data.resolve_identity(&id) {
            Some(slot) => Some(LikedEntry {
                identity: id,
                artist: slot.performance.artist.clone(),
                stage: slot.stage.to_string(),
                day: slot.day,
                time: slot.performance.time.clone(),
            }),
            None => {
                warn!(identity = %id, "liked identity no longer resolves, hiding");
                None
            }
        })
        .collect();
    LikedView { entries }
}

#[derive(Debug, Clone, Serialize)]
pub struct FullScheduleView {
    pub festival_name: String,
    pub stages: Vec<StageSchedule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageSchedule {
    pub stage: String,
    pub description: String,
    pub days: Vec<DaySchedule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub day: Weekday,
    pub slots: Vec<SlotView>,
}

/// The complete stage x day x performance listing. Days run in configured
/// festival order; days the document has but the configuration does not are
/// appended after them so nothing is hidden.
pub fn full_schedule_view(
    data: &FestivalData,
    likes: &LikeStore,
    week: &FestivalWeek,
) -> FullScheduleView {
    let stages = data
        .stages
        .iter()
        .map(|stage| {
            let mut days: Vec<Weekday> = stage.schedule.keys().copied().collect();
            days.sort_by_key(|day| {
                week.days()
                    .iter()
                    .position(|d| d == day)
                    .unwrap_or(week.days().len() + *day as usize)
            });

            StageSchedule {
                stage: stage.name.clone(),
                description: stage.description.clone(),
                days: days
                    .into_iter()
                    .map(|day| DaySchedule {
                        day,
                        slots: stage
                            .performances_on(day)
                            .iter()
                            .map(|performance| {
                                SlotView::new(&stage.name, day, performance, likes)
                            })
                            .collect(),
                    })
                    .collect(),
            }
        })
        .collect();

    FullScheduleView {
        festival_name: data.festival_name.clone(),
        stages,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub zoom: f64,
    pub total_width_px: f64,
    pub rows: Vec<TimelineRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineRow {
    pub stage: String,
    pub blocks: Vec<TimelineBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineBlock {
    pub artist: String,
    pub identity: PerformanceIdentity,
    pub liked: bool,
    pub left_px: f64,
    pub width_px: f64,
}

/// Absolute-minute positions of every well-formed performance, scaled to
/// pixels at the given zoom. Block widths come from the same span chain as
/// now-playing resolution.
pub fn timeline_view(
    data: &FestivalData,
    likes: &LikeStore,
    week: &FestivalWeek,
    default_len: u32,
    zoom: Zoom,
) -> TimelineView {
    let scale = PIXELS_PER_MINUTE * zoom.factor();
    let rows = data
        .stages
        .iter()
        .map(|stage| {
            let mut blocks = Vec::new();
            for day in week.days() {
                for (performance, span) in day_spans(stage, *day, default_len) {
                    let Some(abs) = absolute_span(week, *day, span) else {
                        continue;
                    };
                    let identity = PerformanceIdentity::derive(&stage.name, *day, performance);
                    blocks.push(TimelineBlock {
                        artist: performance.artist.clone(),
                        liked: likes.is_liked(&identity),
                        identity,
                        left_px: abs.start_absolute_minutes as f64 * scale,
                        width_px: abs.duration_minutes as f64 * scale,
                    });
                }
            }
            TimelineRow {
                stage: stage.name.clone(),
                blocks,
            }
        })
        .collect();

    TimelineView {
        zoom: zoom.factor(),
        total_width_px: week.span_minutes() as f64 * scale,
        rows,
    }
}
