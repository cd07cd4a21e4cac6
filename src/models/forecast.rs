//! Same-day forecast model: time blocks, slots and the daily outlook

use super::WeatherSnapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Part of the day a forecast slot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBlock {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBlock {
    /// All blocks in chronological order
    pub const ALL: [TimeBlock; 3] = [TimeBlock::Morning, TimeBlock::Afternoon, TimeBlock::Evening];

    /// Local hours of the day covered by this block
    #[must_use]
    pub fn hours(self) -> Range<u32> {
        match self {
            TimeBlock::Morning => 6..12,
            TimeBlock::Afternoon => 12..17,
            TimeBlock::Evening => 17..21,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TimeBlock::Morning => "morning",
            TimeBlock::Afternoon => "afternoon",
            TimeBlock::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Forecast conditions for one time block of the current day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlot {
    pub time_block: TimeBlock,
    pub weather: WeatherSnapshot,
    /// Wind-chill adjusted temperature in Celsius
    pub feels_like_c: f64,
}

impl ForecastSlot {
    #[must_use]
    pub fn new(time_block: TimeBlock, weather: WeatherSnapshot) -> Self {
        Self {
            time_block,
            feels_like_c: weather.feels_like_c(),
            weather,
        }
    }
}

/// Current conditions plus the morning/afternoon/evening forecast for today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOutlook {
    pub current: WeatherSnapshot,
    slots: Vec<ForecastSlot>,
    /// Local date the forecast covers
    pub local_date: NaiveDate,
    /// Local hour at retrieval time (0-23)
    pub local_hour: u32,
    pub retrieved_at: DateTime<Utc>,
}

impl DailyOutlook {
    /// Build an outlook; exactly one slot per time block, in order
    pub fn new(
        current: WeatherSnapshot,
        slots: Vec<ForecastSlot>,
        local_date: NaiveDate,
        local_hour: u32,
    ) -> Result<Self, String> {
        current.validate()?;

        let blocks: Vec<TimeBlock> = slots.iter().map(|slot| slot.time_block).collect();
        if blocks != TimeBlock::ALL {
            return Err(format!(
                "expected morning, afternoon and evening slots, got {blocks:?}"
            ));
        }
        for slot in &slots {
            slot.weather
                .validate()
                .map_err(|e| format!("{} slot: {e}", slot.time_block))?;
        }
        if local_hour > 23 {
            return Err(format!("local hour out of range: {local_hour}"));
        }

        Ok(Self {
            current,
            slots,
            local_date,
            local_hour,
            retrieved_at: Utc::now(),
        })
    }

    /// All three slots, morning first
    #[must_use]
    pub fn slots(&self) -> &[ForecastSlot] {
        &self.slots
    }

    /// Slots whose block has not ended yet at retrieval time
    #[must_use]
    pub fn upcoming_slots(&self) -> Vec<ForecastSlot> {
        self.slots
            .iter()
            .filter(|slot| self.local_hour < slot.time_block.hours().end)
            .copied()
            .collect()
    }
}
