//! Section parser shared by the `avdmanager list ...` outputs.
//!
//! The listings are blocks of `Key: value` lines separated by a row of dashes:
//!
//! ```text
//! id: 0 or "automotive_1024p_landscape"
//!     Name: Automotive (1024p landscape)
//!     OEM : Google
//!     Tag : android-automotive-playstore
//! ---------
//! id: 1 or "Galaxy Nexus"
//! ...
//! ```
//!
//! Each record kind supplies a [`Section`] draft that is fed the recognised
//! lines of one block and then finished into a record, if it saw enough to
//! make one.

use std::mem;

use tracing::trace;

pub(crate) trait Section {
    type Record;

    /// Line that closes a block. Differs between listings.
    const SEPARATOR: &'static str;

    /// Handle one `KEY: segment: segment...` line. `key` is trimmed and
    /// upper-cased; `segments` are the untrimmed pieces after the first `:`.
    fn field(&mut self, key: &str, segments: &[&str]);

    /// `None` when the block never produced a record.
    fn finish(self) -> Option<Self::Record>;
}

pub(crate) fn parse_sections<S, F>(text: &str, mut fresh: F) -> Vec<S::Record>
where
    S: Section,
    F: FnMut() -> S,
{
    let mut records = Vec::new();
    let mut current = fresh();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line == S::SEPARATOR {
            let done = mem::replace(&mut current, fresh());
            records.extend(done.finish());
            continue;
        }

        let mut segments = line.split(':');
        let key = segments.next().unwrap_or_default().trim().to_uppercase();
        let segments: Vec<&str> = segments.collect();
        if segments.is_empty() {
            trace!(skipped = %line);
            continue;
        }
        current.field(&key, &segments);
    }

    records.extend(current.finish());
    records
}

/// Everything after the key, colons included.
pub(crate) fn joined(segments: &[&str]) -> String {
    segments.join(":").trim().to_owned()
}

/// Parses `7 or "Nexus_5"` into the numeric id and its alias.
pub(crate) fn parse_id(value: &str) -> Option<(u32, String)> {
    let mut parts = value.splitn(2, " or ");
    let id = parts.next()?.trim().parse().ok()?;
    let alias = parts.next()?.trim().replace('"', "");
    Some((id, alias))
}
