//! Time-Block Advisor
//!
//! Scores each same-day forecast slot and suggests the best one, but only
//! when it strictly beats the score for right now.

use crate::models::{ForecastSlot, GoNowScore, TimeBlock, VenueRecord};
use crate::playground::GoNowEngine;

/// Best slot that strictly improves on `current`. Among equally good slots
/// the earliest wins.
#[must_use]
pub fn advise(
    engine: &GoNowEngine,
    venue: &VenueRecord,
    current: &GoNowScore,
    slots: &[ForecastSlot],
) -> Option<(TimeBlock, GoNowScore)> {
    let mut best: Option<(TimeBlock, GoNowScore)> = None;
    for slot in slots {
        let candidate = engine.score(venue, &slot.weather);
        let improves = best
            .as_ref()
            .is_none_or(|(_, incumbent)| candidate.score > incumbent.score);
        if improves {
            best = Some((slot.time_block, candidate));
        }
    }

    best.filter(|(_, slot_score)| slot_score.score > current.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, ShadeLevel, SurfaceMaterial, WeatherCode, WeatherSnapshot};
    use std::collections::BTreeSet;

    fn venue() -> VenueRecord {
        VenueRecord {
            id: "advisor-park".to_string(),
            name: "Advisor Park".to_string(),
            suburb: None,
            coordinate: Coordinate::new(-37.8, 144.9).unwrap(),
            shade: ShadeLevel::None,
            has_covered_structure: false,
            has_metal_equipment: false,
            surface: SurfaceMaterial::Grass,
            facilities: BTreeSet::new(),
            equipment: BTreeSet::new(),
            age_groups: BTreeSet::new(),
        }
    }

    fn slot(block: TimeBlock, uv: f64, code: WeatherCode) -> ForecastSlot {
        ForecastSlot::new(block, WeatherSnapshot::new(24.0, uv, 10.0, code))
    }

    fn current(uv: f64, code: WeatherCode) -> GoNowScore {
        GoNowEngine::default().score(&venue(), &WeatherSnapshot::new(24.0, uv, 10.0, code))
    }

    #[test]
    fn test_suggests_strictly_better_slot() {
        let now = current(11.0, WeatherCode::CLEAR); // 6
        let slots = [
            slot(TimeBlock::Morning, 11.0, WeatherCode::CLEAR),
            slot(TimeBlock::Afternoon, 7.0, WeatherCode::CLEAR),
            slot(TimeBlock::Evening, 2.0, WeatherCode::CLEAR),
        ];
        let (block, score) = advise(&GoNowEngine::default(), &venue(), &now, &slots).unwrap();
        assert_eq!(block, TimeBlock::Evening);
        assert_eq!(score.score, 10);
    }

    #[test]
    fn test_ties_with_current_do_not_suggest() {
        let now = current(2.0, WeatherCode::CLEAR); // 10
        let slots = [
            slot(TimeBlock::Morning, 2.0, WeatherCode::CLEAR),
            slot(TimeBlock::Afternoon, 9.0, WeatherCode::CLEAR),
        ];
        assert!(advise(&GoNowEngine::default(), &venue(), &now, &slots).is_none());
    }

    #[test]
    fn test_all_worse_slots_do_not_suggest() {
        let now = current(7.0, WeatherCode::CLEAR); // 8
        let slots = [
            slot(TimeBlock::Afternoon, 9.0, WeatherCode::CLEAR),
            slot(TimeBlock::Evening, 3.0, WeatherCode::MODERATE_RAIN),
        ];
        assert!(advise(&GoNowEngine::default(), &venue(), &now, &slots).is_none());
    }

    #[test]
    fn test_earliest_of_equal_best_slots_wins() {
        let now = current(3.0, WeatherCode::THUNDERSTORM); // 5
        let slots = [
            slot(TimeBlock::Morning, 3.0, WeatherCode::THUNDERSTORM),
            slot(TimeBlock::Afternoon, 3.0, WeatherCode::OVERCAST),
            slot(TimeBlock::Evening, 3.0, WeatherCode::CLEAR),
        ];
        let (block, score) = advise(&GoNowEngine::default(), &venue(), &now, &slots).unwrap();
        assert_eq!(block, TimeBlock::Afternoon);
        assert_eq!(score.score, 10);
    }

    #[test]
    fn test_no_slots_no_suggestion() {
        let now = current(11.0, WeatherCode::CLEAR);
        assert!(advise(&GoNowEngine::default(), &venue(), &now, &[]).is_none());
    }

    #[test]
    fn test_suggestion_always_beats_current() {
        let engine = GoNowEngine::default();
        let uvs = [0.0, 6.5, 9.0];
        let codes = [WeatherCode::CLEAR, WeatherCode::MODERATE_RAIN, WeatherCode::THUNDERSTORM];
        for now_uv in uvs {
            for now_code in codes {
                let now = current(now_uv, now_code);
                for uv in uvs {
                    for code in codes {
                        let slots = [
                            slot(TimeBlock::Morning, now_uv, now_code),
                            slot(TimeBlock::Evening, uv, code),
                        ];
                        if let Some((_, s)) = advise(&engine, &venue(), &now, &slots) {
                            assert!(s.score > now.score);
                        }
                    }
                }
            }
        }
    }
}
