use std::collections::BTreeSet;

/// File name portion of `path`. Both `/` and `\` count as separators so
/// Windows paths recorded by the test engine behave the same everywhere.
pub fn base_file_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Decides candidate by candidate whether a path still needs attaching.
///
/// The check runs against `existing` only. Two candidates sharing a base name
/// are both admitted unless `skip_queued_duplicates` is set, in which case the
/// later one is dropped.
pub struct Reconciler<'a> {
    existing: &'a BTreeSet<String>,
    queued: BTreeSet<String>,
    skip_queued_duplicates: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(existing: &'a BTreeSet<String>, skip_queued_duplicates: bool) -> Self {
        Self {
            existing,
            queued: BTreeSet::new(),
            skip_queued_duplicates,
        }
    }

    pub fn admits(&mut self, path: &str) -> bool {
        let name = base_file_name(path);
        if self.existing.contains(name) {
            tracing::debug!(path, "already attached");
            return false;
        }
        if self.skip_queued_duplicates && !self.queued.insert(name.to_string()) {
            tracing::debug!(path, "name already queued");
            return false;
        }
        true
    }
}

/// Candidates whose base name is not already attached, in input order.
pub fn reconcile(
    existing: &BTreeSet<String>,
    candidates: &[String],
    skip_queued_duplicates: bool,
) -> Vec<String> {
    let mut reconciler = Reconciler::new(existing, skip_queued_duplicates);
    candidates
        .iter()
        .filter(|path| reconciler.admits(path))
        .cloned()
        .collect()
}
