//! Exponential smoothing of the acidity probe.
//!
//! Formula: `filtered = alpha * map(raw) + (1 - alpha) * filtered`, with
//! `map(raw) = 14 * raw / raw_max`.

pub const ACIDITY_SCALE: f64 = 14.0;
pub const NEUTRAL_ACIDITY: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub alpha: f64,
    pub raw_max: u16,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            raw_max: 4095,
        }
    }
}

/// Linear calibration of a raw sample onto the 0-14 pH scale. Samples above
/// `raw_max` are clamped.
pub fn map_raw(raw: u16, raw_max: u16) -> f64 {
    if raw_max == 0 {
        return 0.0;
    }
    let raw = raw.min(raw_max);
    ACIDITY_SCALE * f64::from(raw) / f64::from(raw_max)
}

#[derive(Debug, Clone)]
pub struct AcidityFilter {
    settings: FilterSettings,
    value: f64,
}

impl AcidityFilter {
    pub fn new(settings: FilterSettings) -> Self {
        Self {
            settings,
            value: NEUTRAL_ACIDITY,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn update(&mut self, raw: u16) -> f64 {
        let sample = map_raw(raw, self.settings.raw_max);
        let alpha = self.settings.alpha;
        self.value = alpha * sample + (1.0 - alpha) * self.value;
        self.value
    }
}
