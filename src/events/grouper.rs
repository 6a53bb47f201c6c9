use indexmap::IndexMap;
use tracing::debug;

use crate::models::{Record, first_key};

/// Records bucketed by a key. Groups appear in the order their key was first seen;
/// records inside a group keep input order.
pub type EventGroups<'a> = IndexMap<String, Vec<&'a Record>>;

/// Bucket `records` by `key_of`. Records for which it returns `None` are left out.
pub fn group_by<'a, I, F>(records: I, mut key_of: F) -> EventGroups<'a>
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&'a Record) -> Option<String>,
{
    let mut groups = EventGroups::new();
    for record in records {
        if let Some(key) = key_of(record) {
            groups.entry(key).or_default().push(record);
        }
    }
    groups
}

/// Bucket records by the name of their first key.
///
/// Only the key name matters: two records whose first key is `Event` share a group whatever
/// their event values are. Empty records have no first key and are left out.
pub fn group_by_first_key(records: &[Record]) -> EventGroups<'_> {
    group_by(records, |record| {
        let key = first_key(record).map(str::to_string);
        if key.is_none() {
            debug!("Skipping empty record in first-key grouping");
        }
        key
    })
}
