//! Contacted-date propagation from meeting notes to people notes.
//!
//! A meeting note carries a date key and an attendee list of wiki links.
//! Each attendee with a matching note under the people directory gets its
//! contacted key set to the meeting date. Existing later dates are kept.

use crate::{BatchResult, FileChange};
use chrono::NaiveDate;
use notekeep_core::prelude::*;
use notekeep_core::RunTracker;
use notekeep_vault::NoteStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `"[[People/Jane Doe|Jane]]"` -> `Jane Doe`
pub fn sanitize_person_link(link: &str) -> String {
    let mut name = link.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    name = name.strip_prefix("[[").unwrap_or(name);
    name = name.strip_suffix("]]").unwrap_or(name);
    if let Some((target, _alias)) = name.split_once('|') {
        name = target;
    }
    if let Some((target, _heading)) = name.split_once('#') {
        name = target;
    }
    if let Some((_, stem)) = name.rsplit_once('/') {
        name = stem;
    }
    name.trim().to_string()
}

/// Sanitized attendee names, skipping entries that sanitize to nothing
pub fn sanitize_person_links(value: &Value) -> Vec<String> {
    value
        .to_items()
        .iter()
        .map(|item| sanitize_person_link(item))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Leading `YYYY-MM-DD` of a value such as `2025-03-04` or `2025-03-04 10:30`
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_scalar()?;
    let token = text.split_whitespace().next()?;
    NaiveDate::parse_from_str(token.trim_matches('"'), DATE_FORMAT).ok()
}

/// Meetings already propagated, kept alongside any other fields in the file
#[derive(Debug, Default, Serialize, Deserialize)]
struct Ledger {
    #[serde(default)]
    meetings: Vec<String>,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

/// Propagates meeting dates into people notes
pub struct ContactPropagator {
    store: Arc<NoteStore>,
}

impl ContactPropagator {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    fn contacts(&self) -> &ContactConfig {
        &self.store.config().contacts
    }

    /// Date of a meeting note, if it has a parseable date key
    pub fn meeting_date(&self, meeting: &Path) -> Result<Option<NaiveDate>> {
        let value = self.store.value(meeting, &self.contacts().date_key)?;
        Ok(value.as_ref().and_then(parse_date))
    }

    /// Meeting notes sorted by date. Undated meetings sort first; ties by path.
    ///
    /// A meeting that cannot be read is logged and sorted with the undated
    /// ones; propagating it reports the read error for that meeting alone.
    pub fn meetings_oldest_first(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .scan_meetings()?
            .into_iter()
            .map(|(_, path, _)| path)
            .collect())
    }

    /// `(date, path, readable)` for every meeting note, oldest first
    fn scan_meetings(&self) -> Result<Vec<(Option<NaiveDate>, PathBuf, bool)>> {
        let meetings = self
            .store
            .gather_notes(&self.contacts().meetings_dir)?;

        let mut dated: Vec<_> = meetings
            .into_iter()
            .map(|path| match self.meeting_date(&path) {
                Ok(date) => (date, path, true),
                Err(e) => {
                    log::warn!("Skipping unreadable meeting {}: {}", path.display(), e);
                    (None, path, false)
                }
            })
            .collect();

        dated.sort();
        Ok(dated)
    }

    /// People notes whose file stem matches a sanitized attendee name
    pub fn people_for_meeting(&self, meeting: &Path) -> Result<Vec<PathBuf>> {
        let Some(attendees) = self.store.value(meeting, &self.contacts().attendees_key)? else {
            return Ok(vec![]);
        };
        let names: HashSet<String> = sanitize_person_links(&attendees).into_iter().collect();
        if names.is_empty() {
            return Ok(vec![]);
        }

        let people = self
            .store
            .gather_notes(&self.contacts().people_dir)?;
        Ok(people
            .into_iter()
            .filter(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| names.contains(stem))
            })
            .collect())
    }

    /// Set each attendee's contacted date from one meeting
    #[instrument(skip(self), fields(meeting = ?meeting), name = "contacted_meeting")]
    pub fn propagate_from_meeting(&self, meeting: &Path) -> BatchResult {
        let tracker = RunTracker::new();
        let date = match self.meeting_date(meeting) {
            Ok(Some(date)) => date,
            Ok(None) => {
                log::debug!("No {} in {}", self.contacts().date_key, meeting.display());
                return BatchResult::from_outcomes(&tracker, vec![]);
            }
            Err(e) => return BatchResult::rejected(&tracker, 0, e),
        };
        let people = match self.people_for_meeting(meeting) {
            Ok(people) => people,
            Err(e) => return BatchResult::rejected(&tracker, 0, e),
        };

        let executor = crate::BatchExecutor::new(Arc::clone(&self.store));
        let contacted_key = self.contacts().contacted_key.clone();
        let formatted = date.format(DATE_FORMAT).to_string();

        executor.run_each_tracked(tracker, &people, |person| {
            if let Some(existing) = self.store.value(person, &contacted_key)?
                && parse_date(&existing).is_some_and(|current| current >= date)
            {
                return Ok(FileChange {
                    changed: false,
                    message: format!("Kept {} ({})", contacted_key, existing),
                });
            }

            let changed = self
                .store
                .update_key(person, &contacted_key, &Value::scalar(formatted.as_str()))?;
            Ok(FileChange {
                changed,
                message: format!("{} -> {}", contacted_key, formatted),
            })
        })
    }

    /// Propagate every meeting, oldest first
    pub fn propagate_all(&self) -> Result<Vec<(PathBuf, BatchResult)>> {
        let meetings = self.meetings_oldest_first()?;
        Ok(self.propagate(meetings))
    }

    /// Propagate only meetings missing from the ledger
    pub fn propagate_new(&self) -> Result<Vec<(PathBuf, BatchResult)>> {
        let ledger = self.load_ledger()?;
        let seen: HashSet<&str> = ledger.meetings.iter().map(String::as_str).collect();

        let meetings: Vec<PathBuf> = self
            .meetings_oldest_first()?
            .into_iter()
            .filter(|m| !seen.contains(self.store.display_path(m).as_str()))
            .collect();

        log::info!("{} meetings not yet in the ledger", meetings.len());
        Ok(self.propagate(meetings))
    }

    fn propagate(&self, meetings: Vec<PathBuf>) -> Vec<(PathBuf, BatchResult)> {
        meetings
            .into_iter()
            .map(|meeting| {
                let result = self.propagate_from_meeting(&meeting);
                (meeting, result)
            })
            .collect()
    }

    /// Rewrite the ledger with every readable meeting, oldest first
    pub fn record_ledger(&self) -> Result<usize> {
        let mut ledger = self.load_ledger()?;
        ledger.meetings = self
            .scan_meetings()?
            .iter()
            .filter(|(_, _, readable)| *readable)
            .map(|(_, m, _)| self.store.display_path(m))
            .collect();

        let json = serde_json::to_string_pretty(&ledger)
            .map_err(|e| Error::other(format!("Failed to serialize ledger: {}", e)))?;
        self.store
            .write_text(&self.contacts().ledger_path, &format!("{}\n", json))?;
        Ok(ledger.meetings.len())
    }

    fn load_ledger(&self) -> Result<Ledger> {
        let path = self.contacts().ledger_path.as_path();
        match self.store.read_text(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Error::parse_error(format!("Invalid ledger {}: {}", path.display(), e))
            }),
            Err(Error::FileNotFound { .. }) => Ok(Ledger::default()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_person_link() {
        assert_eq!(sanitize_person_link("\"[[Jane Doe]]\""), "Jane Doe");
        assert_eq!(sanitize_person_link("[[People/Jane Doe|Jane]]"), "Jane Doe");
        assert_eq!(sanitize_person_link("[[Bob#Notes]]"), "Bob");
        assert_eq!(sanitize_person_link("  Carol "), "Carol");
    }

    #[test]
    fn test_sanitize_person_links_scalar_and_list() {
        assert_eq!(sanitize_person_links(&Value::scalar("[[a]]")), vec!["a"]);
        assert_eq!(
            sanitize_person_links(&Value::list(["\"[[a]]\"", "", "[[b|B]]"])),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_parse_date_takes_leading_token() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 4);
        assert_eq!(parse_date(&Value::scalar("2025-03-04")), expected);
        assert_eq!(parse_date(&Value::scalar("2025-03-04 10:30")), expected);
        assert_eq!(parse_date(&Value::scalar("next week")), None);
        assert_eq!(parse_date(&Value::list(["2025-03-04"])), None);
    }

    #[test]
    fn test_ledger_keeps_unknown_fields() {
        let ledger: Ledger =
            serde_json::from_str(r#"{"meetings":["a.md"],"daily":["x"]}"#).unwrap();
        assert_eq!(ledger.meetings, vec!["a.md"]);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["daily"][0], "x");
    }
}
