//! Go-Now Scoring Engine
//!
//! Turns a venue's attributes and a weather snapshot into a bounded,
//! explainable score. The score starts at 10 and each factor subtracts an
//! independent penalty; the result is clamped to 0..=10 and mapped to a
//! status. The rationale cites the single largest penalty and tips follow the
//! factor priority order.

use crate::models::score::MAX_SCORE;
use crate::models::{
    ConditionBucket, Factor, GoNowScore, Penalty, ShadeLevel, Status, SurfaceMaterial,
    VenueRecord, WeatherSnapshot,
};
use serde::{Deserialize, Serialize};

/// Tips surfaced to the user per score
pub const MAX_TIPS: usize = 3;

/// Thresholds and penalties for every scoring factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// UV index at or above which exposure is extreme
    pub uv_extreme: f64,
    /// UV index at or above which exposure is high
    pub uv_high: f64,
    pub uv_extreme_no_shade_penalty: u8,
    pub uv_extreme_partial_shade_penalty: u8,
    pub uv_extreme_full_shade_penalty: u8,
    pub uv_high_no_shade_penalty: u8,
    pub heat_threshold_c: f64,
    pub heat_penalty: u8,
    /// Compared against the feels-like temperature
    pub cold_threshold_c: f64,
    pub cold_penalty: u8,
    pub wind_threshold_kmh: f64,
    pub wind_penalty: u8,
    /// Rain or storm
    pub wet_penalty: u8,
    pub hot_metal_threshold_c: f64,
    pub hot_metal_penalty: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            uv_extreme: 8.0,
            uv_high: 6.0,
            uv_extreme_no_shade_penalty: 4,
            uv_extreme_partial_shade_penalty: 2,
            uv_extreme_full_shade_penalty: 1,
            uv_high_no_shade_penalty: 2,
            heat_threshold_c: 35.0,
            heat_penalty: 3,
            cold_threshold_c: 10.0,
            cold_penalty: 2,
            wind_threshold_kmh: 40.0,
            wind_penalty: 2,
            wet_penalty: 5,
            hot_metal_threshold_c: 30.0,
            hot_metal_penalty: 1,
        }
    }
}

impl ScoringPolicy {
    /// Reject policies that would break monotonicity or let rain score `Go`
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = [
            ("uv_extreme", self.uv_extreme),
            ("uv_high", self.uv_high),
            ("heat_threshold_c", self.heat_threshold_c),
            ("cold_threshold_c", self.cold_threshold_c),
            ("wind_threshold_kmh", self.wind_threshold_kmh),
            ("hot_metal_threshold_c", self.hot_metal_threshold_c),
        ];
        if let Some((name, _)) = thresholds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{name} must be a finite number"));
        }
        if self.uv_high > self.uv_extreme {
            return Err("uv_high must not exceed uv_extreme".to_string());
        }
        if self.uv_high_no_shade_penalty > self.uv_extreme_no_shade_penalty {
            return Err("UV penalty without shade must not drop as UV rises".to_string());
        }
        if !(self.uv_extreme_no_shade_penalty >= self.uv_extreme_partial_shade_penalty
            && self.uv_extreme_partial_shade_penalty >= self.uv_extreme_full_shade_penalty)
        {
            return Err("UV penalties must shrink as shade increases".to_string());
        }
        if self.cold_threshold_c >= self.heat_threshold_c {
            return Err("cold_threshold_c must be below heat_threshold_c".to_string());
        }
        let penalties = [
            self.uv_extreme_no_shade_penalty,
            self.heat_penalty,
            self.cold_penalty,
            self.wind_penalty,
            self.wet_penalty,
            self.hot_metal_penalty,
        ];
        if penalties.iter().any(|&p| p > MAX_SCORE) {
            return Err(format!("penalties cannot exceed {MAX_SCORE}"));
        }
        // rain alone must pull a perfect score below the Go band
        if Status::from_score(MAX_SCORE - self.wet_penalty) == Status::Go {
            return Err("wet_penalty too small: rain could still score Go".to_string());
        }
        Ok(())
    }
}

/// Scores venues against weather using a fixed policy
#[derive(Debug, Clone, Default)]
pub struct GoNowEngine {
    policy: ScoringPolicy,
}

impl GoNowEngine {
    #[must_use]
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score a venue under the given conditions. Pure and total.
    #[must_use]
    pub fn score(&self, venue: &VenueRecord, weather: &WeatherSnapshot) -> GoNowScore {
        let penalties = self.penalties(venue, weather);
        let total: u32 = penalties.iter().map(|p| u32::from(p.points)).sum();
        let score = u8::try_from(u32::from(MAX_SCORE).saturating_sub(total)).unwrap_or(0);
        let status = Status::from_score(score);

        let leading_factor = leading(&penalties);
        let reason = match leading_factor {
            Some(factor) => reason_for(factor, venue, weather),
            None => format!("Conditions are ideal at {}.", venue.name),
        };
        let message = format!("{} {reason}", status.headline());

        let tips = penalties
            .iter()
            .map(|p| tip_for(p.factor, venue, weather))
            .take(MAX_TIPS)
            .collect();

        GoNowScore {
            score,
            status,
            message,
            tips,
            penalties,
            leading_factor,
            alternate: None,
        }
    }

    /// Nonzero penalties in factor priority order
    #[must_use]
    pub fn penalties(&self, venue: &VenueRecord, weather: &WeatherSnapshot) -> Vec<Penalty> {
        let p = &self.policy;
        let candidates = [
            (Factor::Uv, self.uv_penalty(venue.effective_shade(), weather.uv_index)),
            (
                Factor::Heat,
                if weather.temperature_c >= p.heat_threshold_c { p.heat_penalty } else { 0 },
            ),
            (
                Factor::Cold,
                if weather.feels_like_c() <= p.cold_threshold_c { p.cold_penalty } else { 0 },
            ),
            (
                Factor::Wind,
                if weather.wind_speed_kmh >= p.wind_threshold_kmh { p.wind_penalty } else { 0 },
            ),
            (
                Factor::RainOrStorm,
                if weather.weather_code.is_wet() { p.wet_penalty } else { 0 },
            ),
            (
                Factor::HotMetal,
                if venue.has_metal_equipment
                    && venue.effective_shade() != ShadeLevel::Full
                    && weather.temperature_c >= p.hot_metal_threshold_c
                {
                    p.hot_metal_penalty
                } else {
                    0
                },
            ),
        ];

        candidates
            .into_iter()
            .filter(|&(_, points)| points > 0)
            .map(|(factor, points)| Penalty { factor, points })
            .collect()
    }

    fn uv_penalty(&self, shade: ShadeLevel, uv_index: f64) -> u8 {
        let p = &self.policy;
        if uv_index >= p.uv_extreme {
            match shade {
                ShadeLevel::None => p.uv_extreme_no_shade_penalty,
                ShadeLevel::Partial => p.uv_extreme_partial_shade_penalty,
                ShadeLevel::Full => p.uv_extreme_full_shade_penalty,
            }
        } else if uv_index >= p.uv_high && shade == ShadeLevel::None {
            p.uv_high_no_shade_penalty
        } else {
            0
        }
    }
}

/// Score with the default policy
#[must_use]
pub fn score(venue: &VenueRecord, weather: &WeatherSnapshot) -> GoNowScore {
    GoNowEngine::default().score(venue, weather)
}

/// Largest penalty; on a tie the earlier factor wins
fn leading(penalties: &[Penalty]) -> Option<Factor> {
    penalties
        .iter()
        .fold(None::<&Penalty>, |best, p| match best {
            Some(b) if b.points >= p.points => Some(b),
            _ => Some(p),
        })
        .map(|p| p.factor)
}

fn shade_label(shade: ShadeLevel) -> &'static str {
    match shade {
        ShadeLevel::None => "no",
        ShadeLevel::Partial => "only partial",
        ShadeLevel::Full => "full",
    }
}

fn surface_label(surface: SurfaceMaterial) -> &'static str {
    match surface {
        SurfaceMaterial::Rubber => "rubber",
        SurfaceMaterial::Bark => "bark",
        SurfaceMaterial::Sand => "sand",
        SurfaceMaterial::Grass => "grass",
        SurfaceMaterial::SyntheticTurf => "synthetic turf",
        SurfaceMaterial::Concrete => "concrete",
    }
}

fn reason_for(factor: Factor, venue: &VenueRecord, weather: &WeatherSnapshot) -> String {
    match factor {
        Factor::Uv => format!(
            "UV index is {:.0} with {} shade.",
            weather.uv_index,
            shade_label(venue.effective_shade())
        ),
        Factor::Heat => format!(
            "It's {}, hot enough to risk heat stress.",
            weather.format_temperature()
        ),
        Factor::Cold => format!("It feels like {:.0}°C, chilly for little ones.", weather.feels_like_c()),
        Factor::Wind => format!(
            "Winds of {} make climbing equipment unsafe.",
            weather.format_wind()
        ),
        Factor::RainOrStorm => match weather.weather_code.bucket() {
            ConditionBucket::Storm => {
                "A thunderstorm makes outdoor play unsafe right now.".to_string()
            }
            _ => format!(
                "{} makes outdoor play unsafe right now.",
                weather.weather_code.description()
            ),
        },
        Factor::HotMetal => format!(
            "Metal equipment heats up fast at {}.",
            weather.format_temperature()
        ),
    }
}

fn tip_for(factor: Factor, venue: &VenueRecord, weather: &WeatherSnapshot) -> String {
    match factor {
        Factor::Uv => match venue.effective_shade() {
            ShadeLevel::None => "Pack hats and SPF 50+ sunscreen, there's no shade here.".to_string(),
            ShadeLevel::Partial => "Apply sunscreen and stick to the shaded equipment.".to_string(),
            ShadeLevel::Full => "Sunscreen still matters, even under full shade.".to_string(),
        },
        Factor::Heat if venue.surface.retains_heat() => format!(
            "Bring plenty of water, the {} surface gets hot underfoot.",
            surface_label(venue.surface)
        ),
        Factor::Heat => "Bring plenty of water and take breaks in the shade.".to_string(),
        Factor::Cold => "Rug up with layers and a beanie.".to_string(),
        Factor::Wind => "Skip the high platforms and keep toddlers close.".to_string(),
        Factor::RainOrStorm if weather.weather_code.bucket() == ConditionBucket::Storm => {
            "Wait for the storm to pass before heading out.".to_string()
        }
        Factor::RainOrStorm => "Pack wet-weather gear or try an indoor play space.".to_string(),
        Factor::HotMetal => "Touch-test metal slides before little ones use them.".to_string(),
    }
}
