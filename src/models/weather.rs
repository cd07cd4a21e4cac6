//! Weather snapshot model and weather code buckets

use serde::{Deserialize, Serialize};

/// Coarse condition bucket, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionBucket {
    Clear,
    Cloud,
    Rain,
    Storm,
}

/// WMO weather interpretation code as reported by Open-Meteo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub u8);

impl WeatherCode {
    pub const CLEAR: WeatherCode = WeatherCode(0);
    pub const OVERCAST: WeatherCode = WeatherCode(3);
    pub const MODERATE_RAIN: WeatherCode = WeatherCode(63);
    pub const THUNDERSTORM: WeatherCode = WeatherCode(95);

    /// Bucket this code falls into. Drizzle and snow count as rain; codes
    /// outside the WMO table count as cloud.
    #[must_use]
    pub fn bucket(self) -> ConditionBucket {
        match self.0 {
            0 | 1 => ConditionBucket::Clear,
            2 | 3 | 45 | 48 => ConditionBucket::Cloud,
            51..=67 | 71..=77 | 80..=86 => ConditionBucket::Rain,
            95..=99 => ConditionBucket::Storm,
            _ => ConditionBucket::Cloud,
        }
    }

    /// Rain or storm
    #[must_use]
    pub fn is_wet(self) -> bool {
        matches!(self.bucket(), ConditionBucket::Rain | ConditionBucket::Storm)
    }

    /// Sort key for picking the harsher of two codes
    #[must_use]
    pub fn severity(self) -> (ConditionBucket, u8) {
        (self.bucket(), self.0)
    }

    /// Human-readable description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            56 => "Light freezing drizzle",
            57 => "Dense freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snow fall",
            73 => "Moderate snow fall",
            75 => "Heavy snow fall",
            77 => "Snow grains",
            80 => "Slight rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Slight snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            _ => "Unknown",
        }
    }
}

/// Conditions at a single point in time
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WeatherSnapshot {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// UV index, unitless, >= 0
    pub uv_index: f64,
    /// Wind speed in km/h, >= 0
    pub wind_speed_kmh: f64,
    pub weather_code: WeatherCode,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(temperature_c: f64, uv_index: f64, wind_speed_kmh: f64, weather_code: WeatherCode) -> Self {
        Self {
            temperature_c,
            uv_index,
            wind_speed_kmh,
            weather_code,
        }
    }

    /// Check the numeric fields are usable for scoring
    pub fn validate(&self) -> Result<(), String> {
        if !self.temperature_c.is_finite() {
            return Err(format!("temperature is not finite: {}", self.temperature_c));
        }
        if !self.uv_index.is_finite() || self.uv_index < 0.0 {
            return Err(format!("UV index out of range: {}", self.uv_index));
        }
        if !self.wind_speed_kmh.is_finite() || self.wind_speed_kmh < 0.0 {
            return Err(format!("wind speed out of range: {}", self.wind_speed_kmh));
        }
        Ok(())
    }

    /// Wind-chill adjusted temperature (Environment Canada formula).
    ///
    /// Only defined for air temperatures at or below 10 °C with wind above
    /// 4.8 km/h; outside that range the air temperature is returned. Never
    /// exceeds the air temperature.
    #[must_use]
    pub fn feels_like_c(&self) -> f64 {
        let t = self.temperature_c;
        let v = self.wind_speed_kmh;
        if t > 10.0 || v <= 4.8 {
            return t;
        }
        let v16 = v.powf(0.16);
        let chill = 13.12 + 0.6215 * t - 11.37 * v16 + 0.3965 * t * v16;
        chill.min(t)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    /// Format wind with unit
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.0} km/h", self.wind_speed_kmh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_code_buckets() {
        assert_eq!(WeatherCode(0).bucket(), ConditionBucket::Clear);
        assert_eq!(WeatherCode(3).bucket(), ConditionBucket::Cloud);
        assert_eq!(WeatherCode(45).bucket(), ConditionBucket::Cloud);
        assert_eq!(WeatherCode(53).bucket(), ConditionBucket::Rain);
        assert_eq!(WeatherCode(81).bucket(), ConditionBucket::Rain);
        assert_eq!(WeatherCode(73).bucket(), ConditionBucket::Rain);
        assert_eq!(WeatherCode(95).bucket(), ConditionBucket::Storm);
        assert_eq!(WeatherCode(99).bucket(), ConditionBucket::Storm);
        assert_eq!(WeatherCode(42).bucket(), ConditionBucket::Cloud);
        assert!(WeatherCode::MODERATE_RAIN.is_wet());
        assert!(!WeatherCode::OVERCAST.is_wet());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(WeatherCode(95).severity() > WeatherCode(65).severity());
        assert!(WeatherCode(61).severity() > WeatherCode(3).severity());
        assert!(WeatherCode(2).severity() > WeatherCode(1).severity());
    }

    #[test]
    fn test_feels_like() {
        let mild = WeatherSnapshot::new(22.0, 3.0, 30.0, WeatherCode::CLEAR);
        assert_eq!(mild.feels_like_c(), 22.0);

        let calm_cold = WeatherSnapshot::new(5.0, 1.0, 3.0, WeatherCode::CLEAR);
        assert_eq!(calm_cold.feels_like_c(), 5.0);

        let windy_cold = WeatherSnapshot::new(5.0, 1.0, 30.0, WeatherCode::CLEAR);
        let feels = windy_cold.feels_like_c();
        assert!(feels < 5.0 && feels > -5.0, "got {feels}");

        let windier = WeatherSnapshot::new(5.0, 1.0, 50.0, WeatherCode::CLEAR);
        assert!(windier.feels_like_c() <= feels);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(WeatherSnapshot::new(20.0, 5.0, 10.0, WeatherCode::CLEAR).validate().is_ok());
        assert!(WeatherSnapshot::new(f64::NAN, 5.0, 10.0, WeatherCode::CLEAR).validate().is_err());
        assert!(WeatherSnapshot::new(20.0, -1.0, 10.0, WeatherCode::CLEAR).validate().is_err());
        assert!(WeatherSnapshot::new(20.0, 5.0, -3.0, WeatherCode::CLEAR).validate().is_err());
    }
}
