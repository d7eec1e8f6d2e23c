//! Transformation of archive records into remote upload payloads.

use chrono::{DateTime, Duration, Local};

use crate::errors::WuFillErr;
use crate::record::ArchiveRecord;
use crate::wxcalc;

/// A wind gust observation. Only reported when the interval's high wind speed exceeded
/// the average.
#[derive(Clone, Debug, PartialEq)]
pub struct WindGust {
    /// Direction the gust came from, in degrees.
    pub direction: i32,
    /// Gust speed in miles per hour.
    pub speed: f64,
}

/// Everything the remote service needs to record one observation.
///
/// Built fresh for each missing archive record and never read back. Fields the station
/// did not measure are absent rather than zero filled, so the remote service sees "not
/// reported" instead of a bogus reading.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadPayload {
    /// Time of the observation.
    pub timestamp: DateTime<Local>,
    /// Duration between consecutive archive records, the same for every upload in a run.
    pub interval: Duration,
    /// Barometric pressure in inches of mercury.
    pub barometric_pressure: f64,
    /// Outdoor temperature in Fahrenheit.
    pub outdoor_temperature: f64,
    /// Outdoor relative humidity, percent.
    pub outdoor_humidity: i32,
    /// Dew point in Fahrenheit, derived from temperature and humidity.
    pub dew_point: f64,
    /// Rain so far this local calendar day, inclusive of this record's interval, in
    /// inches.
    pub daily_rain: f64,
    /// Highest rain rate during the interval, in inches per hour.
    pub rain_rate: f64,
    /// Solar radiation in watts per square meter.
    pub solar_radiation: i32,
    /// Average UV index.
    pub uv_index: f64,
    /// Prevailing wind direction in degrees.
    pub wind_direction: i32,
    /// Average wind speed in miles per hour.
    pub wind_speed: f64,
    /// Gust, only when the high speed exceeded the average.
    pub wind_gust: Option<WindGust>,
    /// Soil moisture readings in centibars, one entry per populated sensor slot.
    pub soil_moisture: Vec<i32>,
    /// Soil temperature readings in Fahrenheit, one entry per populated sensor slot.
    pub soil_temperature: Vec<f64>,
}

impl UploadPayload {
    /// Build the payload for one archive record.
    ///
    /// `daily_rain` is the accumulator total after folding this record in, and
    /// `interval` is the run-wide value estimated from the archive.
    pub fn build(
        record: &ArchiveRecord,
        daily_rain: f64,
        interval: Duration,
    ) -> Result<UploadPayload, WuFillErr> {
        let dew_point = wxcalc::dew_point(record.outdoor_temperature, record.outdoor_humidity)?;

        let wind_gust = if record.wind_speed_high > record.wind_speed_average {
            Some(WindGust {
                direction: record.wind_direction_at_high_speed,
                speed: f64::from(record.wind_speed_high),
            })
        } else {
            None
        };

        let soil_moisture: Vec<i32> = record.soil_moisture.iter().filter_map(|&v| v).collect();
        let soil_temperature: Vec<f64> = record
            .soil_temperature
            .iter()
            .filter_map(|&v| v.map(f64::from))
            .collect();

        Ok(UploadPayload {
            timestamp: record.timestamp,
            interval,
            barometric_pressure: record.barometric_pressure,
            outdoor_temperature: record.outdoor_temperature,
            outdoor_humidity: record.outdoor_humidity,
            dew_point,
            daily_rain,
            rain_rate: record.rain_rate_high,
            solar_radiation: record.solar_radiation,
            uv_index: record.uv_index_average,
            wind_direction: record.wind_direction_prevailing,
            wind_speed: f64::from(record.wind_speed_average),
            wind_gust,
            soil_moisture,
            soil_temperature,
        })
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
