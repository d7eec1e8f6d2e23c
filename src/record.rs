//! Archive records as served by the station logger.

use chrono::{DateTime, Local};
use serde::Deserialize;

/// One fixed-interval observation from the station logger's archive.
///
/// The station serves these newest first, with consecutive timestamps separated by the
/// logging interval. The `timestamp` is the end of the interval the record covers.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    /// End of the interval this record covers.
    pub timestamp: DateTime<Local>,
    /// Barometric pressure in inches of mercury.
    pub barometric_pressure: f64,
    /// Outdoor temperature in Fahrenheit.
    pub outdoor_temperature: f64,
    /// Outdoor relative humidity, 0-100 percent.
    pub outdoor_humidity: i32,
    /// Rain that fell during this interval only, in inches.
    pub rain_accumulation: f64,
    /// Highest rain rate seen during the interval, in inches per hour.
    pub rain_rate_high: f64,
    /// Solar radiation in watts per square meter.
    pub solar_radiation: i32,
    /// Average UV index over the interval.
    pub uv_index_average: f64,
    /// Prevailing wind direction in degrees.
    pub wind_direction_prevailing: i32,
    /// Average wind speed in miles per hour.
    pub wind_speed_average: i32,
    /// Highest wind speed seen during the interval, in miles per hour.
    pub wind_speed_high: i32,
    /// Wind direction at the time of the highest speed, in degrees.
    pub wind_direction_at_high_speed: i32,
    /// Soil moisture readings in centibars, one slot per sensor, `None` where no sensor
    /// is attached.
    #[serde(default)]
    pub soil_moisture: Vec<Option<i32>>,
    /// Soil temperature readings in Fahrenheit, same shape as `soil_moisture`.
    #[serde(default)]
    pub soil_temperature: Vec<Option<i32>>,
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
