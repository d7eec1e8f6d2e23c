#![deny(missing_docs)]
//! Package to reconcile a weather station's local archive with Weather Underground.
//!
//! The station logger keeps an authoritative archive of fixed-interval observations.
//! Weather Underground keeps its own record of what it has received for the station.
//! This crate finds the archive records Weather Underground is missing, reconstructs the
//! derived values the service wants but the archive does not carry per record (the daily
//! rainfall total and the dew point), and uploads exactly those records.

//
// Public API
//
pub use crate::cmd_line::CmdLineArgs;
pub use crate::daily::DailyAccumulator;
pub use crate::errors::WuFillErr;
pub use crate::fill::{
    estimate_interval, fill, ArchiveSource, FillOpts, FillReport, RecordOutcome, RecordStatus,
    RemoteService,
};
pub use crate::gap::{default_splay, find_missing, fuzzy_time_match};
pub use crate::payload::{UploadPayload, WindGust};
pub use crate::record::ArchiveRecord;
pub use crate::station::Station;
pub use crate::wu::Pws;
pub use crate::wxcalc::dew_point;

//
// Implementation only
//
mod cmd_line;
mod daily;
mod errors;
mod fill;
mod gap;
mod payload;
mod record;
mod station;
mod wu;
mod wxcalc;
