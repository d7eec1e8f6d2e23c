//! The fill process: find archive records missing from the remote record and upload them.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use crate::daily::DailyAccumulator;
use crate::errors::WuFillErr;
use crate::gap;
use crate::payload::UploadPayload;
use crate::record::ArchiveRecord;

/// Source of archive records, usually the station logger queried over HTTP.
pub trait ArchiveSource {
    /// Fetch all records with timestamps in `[begin, end)`, newest first.
    fn fetch(
        &self,
        begin: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<ArchiveRecord>, WuFillErr>;
}

/// The remote weather sharing service.
pub trait RemoteService {
    /// Times of the observations the service already has for one local calendar day.
    fn times_for_day(&self, day: NaiveDate) -> Result<Vec<DateTime<Local>>, WuFillErr>;

    /// Record one observation with the service.
    fn upload(&self, payload: &UploadPayload) -> Result<(), WuFillErr>;
}

/// Options for one fill run.
#[derive(Clone, Debug)]
pub struct FillOpts {
    /// Start of the window, inclusive.
    pub begin: DateTime<Local>,
    /// End of the window, exclusive.
    pub end: DateTime<Local>,
    /// Report what would be uploaded without invoking the remote service.
    pub test: bool,
}

/// What happened to a single archive record during a run.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordStatus {
    /// The remote service already had an observation within the match tolerance.
    AlreadyPresent,
    /// The record was missing and was uploaded.
    Uploaded,
    /// The record was missing and the upload failed for the given reason.
    UploadFailed(String),
    /// The record was missing but the run was in test mode, so nothing was uploaded.
    SkippedTestMode,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use crate::fill::RecordStatus::*;

        match self {
            AlreadyPresent => write!(f, "already present"),
            Uploaded => write!(f, "successfully uploaded"),
            UploadFailed(reason) => write!(f, "upload failed: {}", reason),
            SkippedTestMode => write!(f, "not uploaded (test mode)"),
        }
    }
}

/// Per-record outcome of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordOutcome {
    /// Timestamp of the archive record.
    pub timestamp: DateTime<Local>,
    /// What happened to it.
    pub status: RecordStatus,
}

/// Everything that happened during one fill run, for reporting.
#[derive(Clone, Debug)]
pub struct FillReport {
    /// The upload interval estimated from the archive.
    pub interval: Duration,
    /// How many observations the remote service already had in the window.
    pub remote_observations: usize,
    /// One outcome per archive record, in chronological order.
    pub outcomes: Vec<RecordOutcome>,
}

impl FillReport {
    /// Number of archive records examined.
    pub fn archive_records(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of records with no remote counterpart.
    pub fn missing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != RecordStatus::AlreadyPresent)
            .count()
    }

    /// Number of records uploaded successfully.
    pub fn uploaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RecordStatus::Uploaded)
            .count()
    }

    /// Number of records whose upload failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::UploadFailed(_)))
            .count()
    }
}

/// Estimate the station's logging interval from the two newest archive records.
///
/// Using the newest pair avoids being skewed by historical interval changes further back
/// in the archive. With fewer than two records the common 5 minute default is assumed.
pub fn estimate_interval(records: &[ArchiveRecord]) -> Duration {
    if records.len() > 1 {
        records[0].timestamp - records[1].timestamp
    } else {
        Duration::minutes(5)
    }
}

// The local calendar days covered by [begin, end): every day from begin's day up to,
// but not including, the first day that starts at or after end.
fn days_in_window(begin: DateTime<Local>, end: DateTime<Local>) -> Vec<NaiveDate> {
    let mut days = Vec::new();

    if begin >= end {
        return days;
    }

    let end_day = if end.time() == NaiveTime::MIN {
        end.date_naive()
    } else {
        end.date_naive() + Duration::days(1)
    };

    let mut day = begin.date_naive();
    while day < end_day {
        days.push(day);
        day = day + Duration::days(1);
    }

    days
}

/// Run the fill process over `[opts.begin, opts.end)`.
///
/// Fetches the archive and the remote observation times, flags the archive records with
/// no remote counterpart, and uploads each of them with a reconstructed daily rain total
/// and a derived dew point. A fetch failure aborts the run; an upload failure is
/// recorded in that record's outcome and the run continues.
pub fn fill<A, R>(archive_source: &A, remote: &R, opts: &FillOpts) -> Result<FillReport, WuFillErr>
where
    A: ArchiveSource,
    R: RemoteService,
{
    let records = archive_source.fetch(opts.begin, opts.end)?;
    let interval = estimate_interval(&records);
    debug!(
        "found {} archive records, upload interval {}s",
        records.len(),
        interval.num_seconds()
    );

    let mut times = Vec::new();
    for day in days_in_window(opts.begin, opts.end) {
        times.extend(remote.times_for_day(day)?);
    }
    debug!("found {} remote observations", times.len());

    let missing = gap::find_missing(&records, &times, gap::default_splay());

    // Replay oldest first. The archive arrives newest first, but the rain accumulator
    // only makes sense in chronological order.
    let mut acc = DailyAccumulator::new();
    let mut outcomes = Vec::with_capacity(records.len());
    for (record, &is_missing) in records.iter().rev().zip(missing.iter().rev()) {
        acc = acc.observe(record.timestamp, record.rain_accumulation);

        let status = if !is_missing {
            RecordStatus::AlreadyPresent
        } else if opts.test {
            info!("missing {}: not uploaded (test mode)", record.timestamp);
            RecordStatus::SkippedTestMode
        } else {
            let attempt = UploadPayload::build(record, acc.daily_rain(), interval)
                .and_then(|payload| remote.upload(&payload));

            match attempt {
                Ok(()) => {
                    info!("missing {}: successfully uploaded", record.timestamp);
                    RecordStatus::Uploaded
                }
                Err(err) => {
                    warn!("missing {}: {}", record.timestamp, err);
                    RecordStatus::UploadFailed(err.to_string())
                }
            }
        };

        outcomes.push(RecordOutcome {
            timestamp: record.timestamp,
            status,
        });
    }

    Ok(FillReport {
        interval,
        remote_observations: times.len(),
        outcomes,
    })
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use std::cell::RefCell;

    use chrono::TimeZone;

    fn record_at(timestamp: DateTime<Local>, rain: f64) -> ArchiveRecord {
        ArchiveRecord {
            timestamp,
            barometric_pressure: 29.92,
            outdoor_temperature: 75.0,
            outdoor_humidity: 50,
            rain_accumulation: rain,
            rain_rate_high: 0.0,
            solar_radiation: 0,
            uv_index_average: 0.0,
            wind_direction_prevailing: 0,
            wind_speed_average: 0,
            wind_speed_high: 0,
            wind_direction_at_high_speed: 0,
            soil_moisture: vec![],
            soil_temperature: vec![],
        }
    }

    // Newest-first records at 5 minute intervals ending at `newest`.
    fn archive_ending_at(newest: DateTime<Local>, rains: &[f64]) -> Vec<ArchiveRecord> {
        rains
            .iter()
            .enumerate()
            .map(|(i, &rain)| record_at(newest - Duration::minutes(5 * i as i64), rain))
            .collect()
    }

    struct FakeArchive {
        records: Vec<ArchiveRecord>,
    }

    impl ArchiveSource for FakeArchive {
        fn fetch(
            &self,
            _begin: DateTime<Local>,
            _end: DateTime<Local>,
        ) -> Result<Vec<ArchiveRecord>, WuFillErr> {
            Ok(self.records.clone())
        }
    }

    struct FakeRemote {
        times: Vec<DateTime<Local>>,
        days_queried: RefCell<Vec<NaiveDate>>,
        uploads: RefCell<Vec<UploadPayload>>,
        // Reject the nth upload attempt, counting from zero.
        fail_attempt: Option<usize>,
        attempts: RefCell<usize>,
    }

    impl FakeRemote {
        fn with_times(times: Vec<DateTime<Local>>) -> Self {
            FakeRemote {
                times,
                days_queried: RefCell::new(vec![]),
                uploads: RefCell::new(vec![]),
                fail_attempt: None,
                attempts: RefCell::new(0),
            }
        }

        fn empty() -> Self {
            Self::with_times(vec![])
        }
    }

    impl RemoteService for FakeRemote {
        fn times_for_day(&self, day: NaiveDate) -> Result<Vec<DateTime<Local>>, WuFillErr> {
            self.days_queried.borrow_mut().push(day);

            Ok(self
                .times
                .iter()
                .filter(|t| t.date_naive() == day)
                .cloned()
                .collect())
        }

        fn upload(&self, payload: &UploadPayload) -> Result<(), WuFillErr> {
            let attempt = *self.attempts.borrow();
            *self.attempts.borrow_mut() += 1;

            if self.fail_attempt == Some(attempt) {
                return Err(WuFillErr::UploadRejected("simulated failure".to_owned()));
            }

            self.uploads.borrow_mut().push(payload.clone());
            Ok(())
        }
    }

    fn opts(begin: DateTime<Local>, end: DateTime<Local>) -> FillOpts {
        FillOpts {
            begin,
            end,
            test: false,
        }
    }

    #[test]
    fn test_estimate_interval() {
        let newest = Local.with_ymd_and_hms(2018, 8, 1, 12, 0, 0).unwrap();

        let records = archive_ending_at(newest, &[0.0, 0.0, 0.0]);
        assert_eq!(estimate_interval(&records), Duration::minutes(5));

        let records = vec![record_at(newest, 0.0), record_at(newest - Duration::minutes(10), 0.0)];
        assert_eq!(estimate_interval(&records), Duration::minutes(10));

        // Fewer than two records falls back to the 5 minute default.
        assert_eq!(estimate_interval(&[record_at(newest, 0.0)]), Duration::minutes(5));
        assert_eq!(estimate_interval(&[]), Duration::minutes(5));
    }

    #[test]
    fn test_uploads_only_missing_records() {
        let newest = Local.with_ymd_and_hms(2018, 8, 1, 12, 0, 0).unwrap();
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 2, 0, 0, 0).unwrap();

        let archive = FakeArchive {
            records: archive_ending_at(newest, &[0.0, 0.0, 0.0]),
        };

        // Remote already has the middle record, a minute off its archive timestamp.
        let remote =
            FakeRemote::with_times(vec![newest - Duration::minutes(5) + Duration::seconds(60)]);

        let report = fill(&archive, &remote, &opts(begin, end)).unwrap();

        assert_eq!(report.archive_records(), 3);
        assert_eq!(report.missing(), 2);
        assert_eq!(report.uploaded(), 2);
        assert_eq!(report.failed(), 0);

        // Outcomes are chronological and the middle record was left alone.
        assert_eq!(report.outcomes[0].status, RecordStatus::Uploaded);
        assert_eq!(report.outcomes[1].status, RecordStatus::AlreadyPresent);
        assert_eq!(report.outcomes[2].status, RecordStatus::Uploaded);

        let uploads = remote.uploads.borrow();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].timestamp, newest - Duration::minutes(10));
        assert_eq!(uploads[1].timestamp, newest);
    }

    #[test]
    fn test_test_mode_never_invokes_upload() {
        let newest = Local.with_ymd_and_hms(2018, 8, 1, 12, 0, 0).unwrap();
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 2, 0, 0, 0).unwrap();

        let archive = FakeArchive {
            records: archive_ending_at(newest, &[0.0, 0.0, 0.0]),
        };
        let remote = FakeRemote::empty();

        let mut test_opts = opts(begin, end);
        test_opts.test = true;

        let report = fill(&archive, &remote, &test_opts).unwrap();

        assert_eq!(report.missing(), 3);
        assert_eq!(report.uploaded(), 0);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == RecordStatus::SkippedTestMode));

        assert_eq!(*remote.attempts.borrow(), 0);
        assert!(remote.uploads.borrow().is_empty());
    }

    #[test]
    fn test_second_run_finds_nothing_missing() {
        let newest = Local.with_ymd_and_hms(2018, 8, 1, 12, 0, 0).unwrap();
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 2, 0, 0, 0).unwrap();

        let archive = FakeArchive {
            records: archive_ending_at(newest, &[0.0, 0.0, 0.0]),
        };

        let remote = FakeRemote::empty();
        let report = fill(&archive, &remote, &opts(begin, end)).unwrap();
        assert_eq!(report.uploaded(), 3);

        // Second run with the remote record now reflecting the first run's uploads.
        let uploaded_times: Vec<_> = remote
            .uploads
            .borrow()
            .iter()
            .map(|p| p.timestamp)
            .collect();
        let remote = FakeRemote::with_times(uploaded_times);

        let report = fill(&archive, &remote, &opts(begin, end)).unwrap();
        assert_eq!(report.missing(), 0);
        assert!(remote.uploads.borrow().is_empty());
    }

    #[test]
    fn test_daily_rain_resets_at_midnight() {
        // Three records straddling midnight, each with 0.1" of rain.
        let newest = Local.with_ymd_and_hms(2018, 8, 2, 0, 0, 0).unwrap();
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 3, 0, 0, 0).unwrap();

        let archive = FakeArchive {
            records: archive_ending_at(newest, &[0.1, 0.1, 0.1]),
        };
        let remote = FakeRemote::empty();

        fill(&archive, &remote, &opts(begin, end)).unwrap();

        let uploads = remote.uploads.borrow();
        let totals: Vec<f64> = uploads.iter().map(|p| p.daily_rain).collect();

        assert_eq!(totals.len(), 3);
        assert!((totals[0] - 0.1).abs() < 1.0e-9);
        assert!((totals[1] - 0.2).abs() < 1.0e-9);
        // Midnight record belongs to the new day and starts over.
        assert!((totals[2] - 0.1).abs() < 1.0e-9);
    }

    #[test]
    fn test_upload_failure_does_not_abort_the_run() {
        let newest = Local.with_ymd_and_hms(2018, 8, 1, 12, 0, 0).unwrap();
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 2, 0, 0, 0).unwrap();

        let archive = FakeArchive {
            records: archive_ending_at(newest, &[0.0, 0.0, 0.0]),
        };

        let mut remote = FakeRemote::empty();
        remote.fail_attempt = Some(0);

        let report = fill(&archive, &remote, &opts(begin, end)).unwrap();

        assert_eq!(report.missing(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.uploaded(), 2);

        match &report.outcomes[0].status {
            RecordStatus::UploadFailed(reason) => {
                assert!(reason.contains("simulated failure"), "reason = {}", reason)
            }
            other => panic!("expected UploadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_queried_once_per_day_in_window() {
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 3, 0, 0, 0).unwrap();

        let archive = FakeArchive { records: vec![] };
        let remote = FakeRemote::empty();

        fill(&archive, &remote, &opts(begin, end)).unwrap();

        // End is exclusive, so August 3rd is never queried.
        assert_eq!(
            *remote.days_queried.borrow(),
            vec![
                NaiveDate::from_ymd_opt(2018, 8, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 8, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn test_window_end_mid_day_still_covers_that_day() {
        let begin = Local.with_ymd_and_hms(2018, 8, 1, 0, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2018, 8, 2, 12, 0, 0).unwrap();

        assert_eq!(
            days_in_window(begin, end),
            vec![
                NaiveDate::from_ymd_opt(2018, 8, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 8, 2).unwrap(),
            ]
        );

        assert!(days_in_window(end, begin).is_empty());
    }
}
