//! The Weather Underground personal weather station service.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::blocking::Client;
use tracing::debug;

use crate::errors::WuFillErr;
use crate::fill::RemoteService;
use crate::payload::UploadPayload;

static HISTORY_URL: &str = "https://www.wunderground.com/weatherstation/WXDailyHistory.asp";
static UPLOAD_URL: &str =
    "https://weatherstation.wunderground.com/weatherstation/updateweatherstation.php";
static SOFTWARE_TYPE: &str = concat!("wu-fill ", env!("CARGO_PKG_VERSION"));

/// A personal weather station registered with Weather Underground.
pub struct Pws {
    id: String,
    password: String,
    client: Client,
}

impl Pws {
    /// Create a client for the station with the given id.
    ///
    /// The password may be empty, in which case downloads still work but any upload
    /// attempt fails with [`WuFillErr::MissingPassword`].
    pub fn new(id: &str, password: &str) -> Pws {
        Pws {
            id: id.to_owned(),
            password: password.to_owned(),
            client: Client::new(),
        }
    }

    // Query parameters for the updateweatherstation.php protocol. Fields the station
    // did not report are left out of the request entirely.
    fn upload_query(&self, payload: &UploadPayload) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = vec![
            ("action".to_owned(), "updateraw".to_owned()),
            ("ID".to_owned(), self.id.clone()),
            ("PASSWORD".to_owned(), self.password.clone()),
            (
                "dateutc".to_owned(),
                payload
                    .timestamp
                    .with_timezone(&Utc)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
            (
                "rtfreq".to_owned(),
                payload.interval.num_seconds().to_string(),
            ),
            (
                "baromin".to_owned(),
                payload.barometric_pressure.to_string(),
            ),
            ("tempf".to_owned(), payload.outdoor_temperature.to_string()),
            ("dewptf".to_owned(), payload.dew_point.to_string()),
            ("humidity".to_owned(), payload.outdoor_humidity.to_string()),
            ("rainin".to_owned(), payload.rain_rate.to_string()),
            ("dailyrainin".to_owned(), payload.daily_rain.to_string()),
            (
                "solarradiation".to_owned(),
                payload.solar_radiation.to_string(),
            ),
            ("UV".to_owned(), payload.uv_index.to_string()),
            ("winddir".to_owned(), payload.wind_direction.to_string()),
            ("windspeedmph".to_owned(), payload.wind_speed.to_string()),
        ];

        if let Some(gust) = &payload.wind_gust {
            query.push(("windgustdir".to_owned(), gust.direction.to_string()));
            query.push(("windgustmph".to_owned(), gust.speed.to_string()));
        }

        for (i, v) in payload.soil_moisture.iter().enumerate() {
            let name = if i == 0 {
                "soilmoisture".to_owned()
            } else {
                format!("soilmoisture{}", i + 1)
            };
            query.push((name, v.to_string()));
        }

        for (i, v) in payload.soil_temperature.iter().enumerate() {
            let name = if i == 0 {
                "soiltempf".to_owned()
            } else {
                format!("soiltemp{}f", i + 1)
            };
            query.push((name, v.to_string()));
        }

        query.push(("softwaretype".to_owned(), SOFTWARE_TYPE.to_owned()));

        query
    }
}

impl RemoteService for Pws {
    fn times_for_day(&self, day: NaiveDate) -> Result<Vec<DateTime<Local>>, WuFillErr> {
        debug!("downloading daily history for {} on {}", self.id, day);

        let day_of_month = day.day().to_string();
        let month = day.month().to_string();
        let year = day.year().to_string();

        let response = self
            .client
            .get(HISTORY_URL)
            .query(&[
                ("ID", self.id.as_str()),
                ("day", day_of_month.as_str()),
                ("month", month.as_str()),
                ("year", year.as_str()),
                ("format", "1"),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(WuFillErr::UnexpectedStatus(response.status()));
        }

        let body = response.text()?;

        // A day with no observations comes back empty.
        if body.trim().is_empty() {
            return Ok(vec![]);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let time_column = reader
            .headers()?
            .iter()
            .position(|h| h == "Time")
            .ok_or_else(|| {
                WuFillErr::MalformedResponse("daily history has no Time column".to_owned())
            })?;

        let mut times = Vec::new();
        for row in reader.records() {
            let row = row?;

            let field = match row.get(time_column) {
                Some(f) if !f.is_empty() => f,
                _ => continue,
            };

            let naive = NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S")?;
            if let Some(time) = Local.from_local_datetime(&naive).earliest() {
                times.push(time);
            }
        }

        Ok(times)
    }

    fn upload(&self, payload: &UploadPayload) -> Result<(), WuFillErr> {
        if self.password.is_empty() {
            return Err(WuFillErr::MissingPassword);
        }

        let response = self
            .client
            .get(UPLOAD_URL)
            .query(&self.upload_query(payload))
            .send()?;

        if !response.status().is_success() {
            return Err(WuFillErr::UnexpectedStatus(response.status()));
        }

        let body = response.text()?;
        if body.trim() == "success" {
            Ok(())
        } else {
            Err(WuFillErr::UploadRejected(body.trim().to_owned()))
        }
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
