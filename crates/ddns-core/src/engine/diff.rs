//! Diff between remote and desired record state

use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::records::{DesiredRecord, RecordChange, RecordType, RemoteRecord};

/// Whether `current` must be rewritten to reach `desired`
///
/// Values are compared as sets, so ordering differences on the provider side
/// are not a change; a TTL mismatch is. A missing record always needs an
/// update.
pub fn needs_update(current: Option<&RemoteRecord>, desired: &DesiredRecord) -> bool {
    let Some(current) = current else {
        return true;
    };

    let remote: BTreeSet<&str> = current.values.iter().map(String::as_str).collect();
    let wanted: BTreeSet<&str> = desired.values.iter().map(String::as_str).collect();

    remote != wanted || current.ttl != desired.ttl
}

/// Find the managed record `name` of `record_type` in a zone listing
///
/// Records of other types under the same name are ignored.
pub fn find_record<'a>(
    remote: &'a [RemoteRecord],
    name: &str,
    record_type: RecordType,
) -> Option<&'a RemoteRecord> {
    remote.iter().find(|r| r.is(name, record_type))
}

/// Compute the changes needed for `names` to point at `ip`
///
/// The result keeps the order of `names`.
pub fn compute_diff(
    names: &[String],
    remote: &[RemoteRecord],
    ip: IpAddr,
    ttl: u32,
) -> Vec<RecordChange> {
    names
        .iter()
        .filter_map(|name| {
            let desired = DesiredRecord::for_ip(name.as_str(), ip, ttl);
            let current = find_record(remote, name, desired.record_type);

            needs_update(current, &desired).then(|| RecordChange {
                name: name.clone(),
                current: current.cloned(),
                desired,
            })
        })
        .collect()
}
