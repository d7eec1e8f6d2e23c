//! Gap detection between the station archive and the remote record.

use chrono::{DateTime, Duration, Local};

use crate::record::ArchiveRecord;

/// The default tolerance used when matching archive timestamps against remote observation
/// times. 2.5 minutes absorbs clock and reporting-interval skew between the two sources.
pub fn default_splay() -> Duration {
    Duration::seconds(150)
}

/// Return true if any of `times` falls within `splay` of `time`.
///
/// The window is open on both ends, so a remote observation exactly `splay` away does
/// not count as a match.
pub fn fuzzy_time_match(time: DateTime<Local>, times: &[DateTime<Local>], splay: Duration) -> bool {
    let min = time - splay;
    let max = time + splay;

    times.iter().any(|&t| t > min && t < max)
}

/// Flag the archive records that have no remote observation within `splay` of their
/// timestamp.
///
/// Returns one flag per record in delivery order, true meaning the record is missing
/// from the remote record. An empty `times` slice flags every record as missing.
pub fn find_missing(
    records: &[ArchiveRecord],
    times: &[DateTime<Local>],
    splay: Duration,
) -> Vec<bool> {
    records
        .iter()
        .map(|record| !fuzzy_time_match(record.timestamp, times, splay))
        .collect()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use chrono::TimeZone;

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2018, 8, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_splay_boundary_is_exclusive() {
        let t = local(12, 0, 0);

        // Exactly 150 seconds away on either side does not match.
        assert!(!fuzzy_time_match(t, &[local(12, 2, 30)], default_splay()));
        assert!(!fuzzy_time_match(t, &[local(11, 57, 30)], default_splay()));

        // One second inside the window matches.
        assert!(fuzzy_time_match(t, &[local(12, 2, 29)], default_splay()));
        assert!(fuzzy_time_match(t, &[local(11, 57, 31)], default_splay()));
    }

    #[test]
    fn test_no_remote_times_means_no_match() {
        assert!(!fuzzy_time_match(local(12, 0, 0), &[], default_splay()));
    }

    #[test]
    fn test_find_missing() {
        let mut record: ArchiveRecord = serde_json::from_str(
            r#"{
                "timestamp": "2018-08-01T12:00:00-04:00",
                "barometricPressure": 29.92,
                "outdoorTemperature": 75.0,
                "outdoorHumidity": 50,
                "rainAccumulation": 0.0,
                "rainRateHigh": 0.0,
                "solarRadiation": 0,
                "uvIndexAverage": 0.0,
                "windDirectionPrevailing": 0,
                "windSpeedAverage": 0,
                "windSpeedHigh": 0,
                "windDirectionAtHighSpeed": 0
            }"#,
        )
        .unwrap();

        let newer = record.clone();
        record.timestamp = record.timestamp - Duration::minutes(5);
        let records = vec![newer.clone(), record];

        // Remote only has an observation near the newer record.
        let times = vec![newer.timestamp + Duration::seconds(30)];

        assert_eq!(
            find_missing(&records, &times, default_splay()),
            vec![false, true]
        );

        // An empty remote record means everything is missing.
        assert_eq!(find_missing(&records, &[], default_splay()), vec![true, true]);
    }
}
