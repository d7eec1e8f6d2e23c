//! The station logger's HTTP archive feed.

use chrono::{DateTime, Local};
use reqwest::blocking::Client;
use tracing::debug;

use crate::errors::WuFillErr;
use crate::fill::ArchiveSource;
use crate::record::ArchiveRecord;

/// A weather station logger reachable over HTTP.
///
/// The logger serves its archive at `http://{addr}/archive` as a JSON array of records,
/// newest first, filtered by `begin`/`end` query parameters in RFC 3339 format.
pub struct Station {
    addr: String,
    client: Client,
}

impl Station {
    /// Create a client for the logger at the given network address, e.g. `wx:8080`.
    pub fn new(addr: &str) -> Station {
        Station {
            addr: addr.to_owned(),
            client: Client::new(),
        }
    }
}

impl ArchiveSource for Station {
    fn fetch(
        &self,
        begin: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<ArchiveRecord>, WuFillErr> {
        let url = format!("http://{}/archive", self.addr);
        debug!("fetching {} for {} to {}", url, begin, end);

        let response = self
            .client
            .get(&url)
            .query(&[("begin", begin.to_rfc3339()), ("end", end.to_rfc3339())])
            .send()?;

        if !response.status().is_success() {
            return Err(WuFillErr::UnexpectedStatus(response.status()));
        }

        let records: Vec<ArchiveRecord> = response.json()?;
        Ok(records)
    }
}
