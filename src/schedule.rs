use serde::Serialize;
use tracing::warn;

use crate::festival::{Performance, Stage};
use crate::time::{FestivalWeek, Weekday};

/// A performance's resolved position within its day, in minutes since
/// midnight. The same span feeds both now-playing resolution and timeline
/// layout so the two can never disagree about a set's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start_minutes: u32,
    pub duration_minutes: u32,
}

impl Span {
    pub fn end_minutes(self) -> u32 {
        self.start_minutes + self.duration_minutes
    }

    pub fn contains(self, minutes: u32) -> bool {
        self.start_minutes <= minutes && minutes < self.end_minutes()
    }
}

/// A span lifted onto the festival's multi-day absolute timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbsoluteSpan {
    pub start_absolute_minutes: u32,
    pub duration_minutes: u32,
}

/// Performances of one stage-day whose time parses, with start minutes.
/// Malformed entries are logged and dropped without failing their siblings.
fn well_formed<'a>(
    stage: &Stage,
    day: Weekday,
    sequence: &'a [Performance],
) -> Vec<(&'a Performance, u32)> {
    sequence
        .iter()
        .filter_map(|performance| match performance.start() {
            Ok(time) => Some((performance, time.minutes())),
            Err(err) => {
                warn!(
                    stage = %stage.name,
                    day = %day,
                    artist = %performance.artist,
                    %err,
                    "skipping performance with malformed time"
                );
                None
            }
        })
        .collect()
}

fn explicit_window_minutes(performance: &Performance) -> Option<u32> {
    let start = performance.start_time?;
    let end = performance.end_time?;
    let span = end.since((jiff::Unit::Minute, start)).ok()?;
    u32::try_from(span.get_minutes()).ok().filter(|m| *m > 0)
}

/// Set length in minutes, resolved in fixed precedence order: explicit
/// end-time, explicit duration, gap to the next performance, configured
/// default. Always positive.
fn set_length(
    performance: &Performance,
    start_minutes: u32,
    next_start_minutes: Option<u32>,
    default_len: u32,
) -> u32 {
    explicit_window_minutes(performance)
        .or(performance.duration.filter(|d| *d > 0))
        .or(next_start_minutes
            .filter(|next| *next > start_minutes)
            .map(|next| next - start_minutes))
        .unwrap_or(default_len)
}

/// Every well-formed performance of `stage` on `day` with its resolved span,
/// in document order. An empty or missing day yields an empty vec.
pub fn day_spans<'a>(
    stage: &'a Stage,
    day: Weekday,
    default_len: u32,
) -> Vec<(&'a Performance, Span)> {
    let sequence = well_formed(stage, day, stage.performances_on(day));
    sequence
        .iter()
        .enumerate()
        .map(|(i, (performance, start_minutes))| {
            let next_start = sequence.get(i + 1).map(|(_, start)| *start);
            let span = Span {
                start_minutes: *start_minutes,
                duration_minutes: set_length(performance, *start_minutes, next_start, default_len),
            };
            (*performance, span)
        })
        .collect()
}

/// The performance whose `[start, end)` window contains `now_minutes`, if any.
pub fn resolve_now_playing<'a>(
    stage: &'a Stage,
    day: Weekday,
    now_minutes: u32,
    default_len: u32,
) -> Option<&'a Performance> {
    day_spans(stage, day, default_len)
        .into_iter()
        .find(|(_, span)| span.contains(now_minutes))
        .map(|(performance, _)| performance)
}

/// Lifts a day-local span to absolute festival minutes, or `None` when the
/// configured festival span does not cover `day`.
pub fn absolute_span(week: &FestivalWeek, day: Weekday, span: Span) -> Option<AbsoluteSpan> {
    let Some(day_offset) = week.day_offset_minutes(day) else {
        warn!(day = %day, "day is outside the configured festival span, skipping");
        return None;
    };
    Some(AbsoluteSpan {
        start_absolute_minutes: day_offset + span.start_minutes,
        duration_minutes: span.duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::festival::tests::performance;
    use std::collections::BTreeMap;

    const DEFAULT_LEN: u32 = 90;

    fn stage_with(day: Weekday, performances: Vec<Performance>) -> Stage {
        Stage {
            name: "Main Stage".to_string(),
            description: String::new(),
            schedule: BTreeMap::from([(day, performances)]),
        }
    }

    fn morning_stage() -> Stage {
        stage_with(
            Weekday::Friday,
            vec![
                performance("07:00", "A"),
                performance("08:30", "B"),
                performance("10:00", "C"),
            ],
        )
    }

    fn artist_at(stage: &Stage, minutes: u32) -> Option<String> {
        resolve_now_playing(stage, Weekday::Friday, minutes, DEFAULT_LEN)
            .map(|p| p.artist.clone())
    }

    #[test]
    fn test_now_playing_uses_next_start_then_default() {
        let stage = morning_stage();
        assert_eq!(artist_at(&stage, 7 * 60 + 30), Some("A".to_string()));
        assert_eq!(artist_at(&stage, 8 * 60 + 30), Some("B".to_string()));
        assert_eq!(artist_at(&stage, 9 * 60 + 59), Some("B".to_string()));
        assert_eq!(artist_at(&stage, 10 * 60), Some("C".to_string()));
        // Last act runs the default 90 minutes, ending 11:30.
        assert_eq!(artist_at(&stage, 11 * 60 + 29), Some("C".to_string()));
        assert_eq!(artist_at(&stage, 23 * 60), None);
    }

    #[test]
    fn test_nothing_before_first_act() {
        let stage = morning_stage();
        assert_eq!(artist_at(&stage, 6 * 60 + 59), None);
    }

    #[test]
    fn test_empty_or_missing_day_yields_none() {
        let stage = stage_with(Weekday::Friday, vec![]);
        assert_eq!(artist_at(&stage, 12 * 60), None);
        assert!(resolve_now_playing(&stage, Weekday::Sunday, 12 * 60, DEFAULT_LEN).is_none());
    }

    #[test]
    fn test_explicit_end_time_beats_duration_and_next() {
        let mut headliner = performance("20:00", "Gamma");
        headliner.start_time = Some("2026-08-28T20:00:00".parse().unwrap());
        headliner.end_time = Some("2026-08-28T21:15:00".parse().unwrap());
        headliner.duration = Some(30);
        let stage = stage_with(
            Weekday::Friday,
            vec![headliner, performance("20:10", "Next")],
        );

        let spans = day_spans(&stage, Weekday::Friday, DEFAULT_LEN);
        assert_eq!(spans[0].1.duration_minutes, 75);
    }

    #[test]
    fn test_explicit_duration_beats_next_start() {
        let mut opener = performance("18:00", "Delta");
        opener.duration = Some(30);
        let stage = stage_with(
            Weekday::Friday,
            vec![opener, performance("19:00", "Next")],
        );

        let spans = day_spans(&stage, Weekday::Friday, DEFAULT_LEN);
        assert_eq!(spans[0].1.duration_minutes, 30);
        assert_eq!(artist_at(&stage, 18 * 60 + 45), None);
    }

    #[test]
    fn test_degenerate_explicit_window_falls_through() {
        // end == start carries no information; the chain continues to the
        // next performance's start.
        let mut broken = performance("18:00", "Epsilon");
        broken.start_time = Some("2026-08-28T18:00:00".parse().unwrap());
        broken.end_time = Some("2026-08-28T18:00:00".parse().unwrap());
        let stage = stage_with(
            Weekday::Friday,
            vec![broken, performance("19:00", "Next")],
        );

        let spans = day_spans(&stage, Weekday::Friday, DEFAULT_LEN);
        assert_eq!(spans[0].1.duration_minutes, 60);
    }

    #[test]
    fn test_spans_are_always_positive() {
        // Out-of-order data: the "next" start is behind this one.
        let stage = stage_with(
            Weekday::Friday,
            vec![performance("20:00", "Late"), performance("19:00", "Early")],
        );
        for (_, span) in day_spans(&stage, Weekday::Friday, DEFAULT_LEN) {
            assert!(span.duration_minutes > 0);
        }
    }

    #[test]
    fn test_malformed_time_skips_only_that_performance() {
        let stage = stage_with(
            Weekday::Friday,
            vec![
                performance("07:00", "A"),
                performance("AB:CD", "Broken"),
                performance("08:30", "B"),
            ],
        );
        let spans = day_spans(&stage, Weekday::Friday, DEFAULT_LEN);
        assert_eq!(spans.len(), 2);
        // A's slot still ends at B's start; the broken entry is invisible.
        assert_eq!(spans[0].1.duration_minutes, 90);
        assert_eq!(artist_at(&stage, 8 * 60), Some("A".to_string()));
        assert_eq!(artist_at(&stage, 8 * 60 + 45), Some("B".to_string()));
    }

    #[test]
    fn test_absolute_span_adds_day_offset() {
        let week = FestivalWeek::new(vec![Weekday::Thursday, Weekday::Friday]);
        let span = Span {
            start_minutes: 19 * 60,
            duration_minutes: 90,
        };
        let abs = absolute_span(&week, Weekday::Friday, span).unwrap();
        assert_eq!(abs.start_absolute_minutes, 1440 + 19 * 60);
        assert_eq!(abs.duration_minutes, 90);

        assert!(absolute_span(&week, Weekday::Monday, span).is_none());
    }
}
