/// Backend storage growth caused by a load.
///
/// Only computed when both snapshots are known; a missing snapshot yields
/// `None` rather than a fabricated zero or negative figure. The result is signed
/// because compaction during a load can shrink storage.
pub fn backend_byte_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => {
            i64::try_from(i128::from(after) - i128::from(before)).ok()
        }
        _ => None,
    }
}
