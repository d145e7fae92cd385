use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Timelike, Utc};

use crate::error::LoadError;

/// Cooperative cancellation flag shared by every load in one aggregation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a loader needs besides the entity directory itself.
///
/// Paths are always composed from `root`; nothing reads or changes the
/// process working directory.
#[derive(Debug, Clone)]
pub struct LoadContext {
    root: PathBuf,
    language: String,
    started_at: DateTime<Utc>,
    cancel: CancelToken,
    parallel: bool,
}

impl LoadContext {
    pub fn new(root: &Path, language: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            language: language.to_string(),
            started_at: Utc::now(),
            cancel: CancelToken::new(),
            parallel: false,
        }
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The moment the aggregation started, unrounded.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Cancelled)` once the token has been triggered.
    pub fn check_cancelled(&self) -> Result<(), LoadError> {
        if self.is_cancelled() {
            Err(LoadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Round `t` down to the whole minute.
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncation_rounds_down() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(
            truncate_to_minute(t),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let ctx = LoadContext::new(Path::new("/r"), "en").with_cancel(token.clone());
        assert!(ctx.check_cancelled().is_ok());

        token.cancel();
        assert!(matches!(ctx.check_cancelled(), Err(LoadError::Cancelled)));
        assert!(ctx.clone().is_cancelled());
    }
}
