//! The consumer side of the pipeline: the category set a dashboard shows.
//!
//! A [`Dashboard`] holds exactly one category set at a time. Every load
//! (initial, upload, reload, reset) produces a complete new set which
//! replaces the old one in a single assignment, after which the registered
//! [`DataUpdateListener`] is told once. A failed load changes nothing.
//!
//! The built-in default set is normalized once, with a fixed seed, when the
//! dashboard is created. Reset clones it, so reset is exact and idempotent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{LoadResult, PipelineResult};
use crate::models::CategoryNode;
use crate::source::TextSource;
use crate::transform::columns::{ColumnClassification, PeriodGroups};
use crate::transform::pipeline::{
    normalize_bytes, normalize_text, LoadStats, NormalizeOptions, NormalizeResult,
};

mod template;

pub use template::{template_csv, template_headers};

/// Built-in report shown before any custom data is loaded.
pub const DEFAULT_DATA: &str = include_str!("../../data/default_metrics.csv");

/// Seed for the built-in set's synthesized trend points.
pub const DEFAULT_SEED: u64 = 20230316;

/// Receives each new category set. Called exactly once per successful load.
pub trait DataUpdateListener {
    fn on_data_update(&mut self, categories: &[CategoryNode]);
}

impl<F: FnMut(&[CategoryNode])> DataUpdateListener for F {
    fn on_data_update(&mut self, categories: &[CategoryNode]) {
        self(categories)
    }
}

/// What started a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadTrigger {
    Initial,
    Upload,
    Reload,
    Reset,
}

/// Metadata of the set currently held.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadInfo {
    pub load_id: Uuid,
    pub trigger: LoadTrigger,
    pub loaded_at: DateTime<Utc>,
    pub using_default: bool,
    pub classification: ColumnClassification,
    pub period_groups: PeriodGroups,
    pub stats: LoadStats,
}

impl LoadInfo {
    fn new(result: &NormalizeResult, trigger: LoadTrigger, using_default: bool) -> Self {
        Self {
            load_id: Uuid::new_v4(),
            trigger,
            loaded_at: Utc::now(),
            using_default,
            classification: result.classification.clone(),
            period_groups: result.period_groups.clone(),
            stats: result.stats.clone(),
        }
    }
}

pub struct Dashboard {
    categories: Vec<CategoryNode>,
    info: LoadInfo,
    defaults: NormalizeResult,
    options: NormalizeOptions,
}

impl Dashboard {
    /// Dashboard showing the embedded default report.
    ///
    /// `options` applies to later custom loads; the default set always uses
    /// the standard columns and [`DEFAULT_SEED`].
    pub fn builtin(options: NormalizeOptions) -> PipelineResult<Self> {
        let defaults = normalize_text(DEFAULT_DATA, &NormalizeOptions::with_seed(DEFAULT_SEED))?;
        Ok(Self::with_defaults(defaults, options))
    }

    /// Dashboard whose default set is an already-normalized result.
    pub fn with_defaults(defaults: NormalizeResult, options: NormalizeOptions) -> Self {
        Self {
            categories: defaults.categories.clone(),
            info: LoadInfo::new(&defaults, LoadTrigger::Initial, true),
            defaults,
            options,
        }
    }

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories
    }

    pub fn info(&self) -> &LoadInfo {
        &self.info
    }

    pub fn is_using_default(&self) -> bool {
        self.info.using_default
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Swap in a fully built result and notify the listener.
    pub fn replace(
        &mut self,
        result: NormalizeResult,
        trigger: LoadTrigger,
        listener: &mut impl DataUpdateListener,
    ) -> &LoadInfo {
        self.info = LoadInfo::new(&result, trigger, false);
        self.categories = result.categories;
        listener.on_data_update(&self.categories);
        &self.info
    }

    /// Normalize a document and, on success, replace the held set.
    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        trigger: LoadTrigger,
        listener: &mut impl DataUpdateListener,
    ) -> PipelineResult<&LoadInfo> {
        let result = normalize_bytes(bytes, &self.options)?;
        Ok(self.replace(result, trigger, listener))
    }

    /// Restore the built-in set.
    pub fn reset_to_default(&mut self, listener: &mut impl DataUpdateListener) -> &LoadInfo {
        self.info = LoadInfo::new(&self.defaults, LoadTrigger::Reset, true);
        self.categories = self.defaults.categories.clone();
        listener.on_data_update(&self.categories);
        &self.info
    }
}

/// Acquire a document and normalize it without touching any dashboard.
///
/// Acquisition failures come back as [`crate::error::LoadError::Source`],
/// normalization failures as [`crate::error::LoadError::Pipeline`].
pub async fn acquire(
    source: &TextSource,
    options: &NormalizeOptions,
) -> LoadResult<NormalizeResult> {
    let bytes = source.fetch().await?;
    Ok(normalize_bytes(&bytes, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, PipelineError};
    use crate::models::PeriodValue;

    fn ignore(_: &[CategoryNode]) {}

    const CUSTOM: &str = "L1 metric,MTM,10 Mar - 16 Mar,03 Mar - 09 Mar\nRevenue,Net,10,8\n";

    #[test]
    fn test_builtin_default_set() {
        let dashboard = Dashboard::builtin(NormalizeOptions::default()).unwrap();
        let ids: Vec<&str> = dashboard.categories().iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, vec!["bookings", "conversion-and-market-share", "pricing-&-offers"]);
        assert!(dashboard.is_using_default());
        assert_eq!(dashboard.info().trigger, LoadTrigger::Initial);

        let bookings = &dashboard.categories()[0];
        assert_eq!(bookings.metrics.len(), 8);
        assert!(bookings.metrics.iter().all(|m| m.l1_category == "Bookings"));

        let conversion = &dashboard.categories()[1];
        let brand = conversion.metric("brand-app-conversion").unwrap();
        assert_eq!(brand.current_period.value, PeriodValue::Text("1.38%".into()));
        let domestic = conversion.metric("market-share-domestic").unwrap();
        assert_eq!(domestic.current_period.value, PeriodValue::Empty);
    }

    #[test]
    fn test_builtin_is_deterministic() {
        let a = Dashboard::builtin(NormalizeOptions::default()).unwrap();
        let b = Dashboard::builtin(NormalizeOptions::default()).unwrap();
        assert_eq!(a.categories(), b.categories());
    }

    #[test]
    fn test_load_replaces_and_notifies_once() {
        let mut dashboard = Dashboard::builtin(NormalizeOptions::with_seed(1)).unwrap();
        let mut calls = Vec::new();
        let mut listener = |cats: &[CategoryNode]| calls.push(cats.len());

        let info = dashboard
            .load_bytes(CUSTOM.as_bytes(), LoadTrigger::Upload, &mut listener)
            .unwrap();
        assert_eq!(info.trigger, LoadTrigger::Upload);
        assert!(!info.using_default);

        assert_eq!(calls, vec![1]);
        assert_eq!(dashboard.categories()[0].id, "revenue");
    }

    #[test]
    fn test_failed_load_keeps_previous_set() {
        let mut dashboard = Dashboard::builtin(NormalizeOptions::with_seed(1)).unwrap();
        dashboard
            .load_bytes(CUSTOM.as_bytes(), LoadTrigger::Upload, &mut ignore)
            .unwrap();
        let before = dashboard.categories().to_vec();
        let load_id = dashboard.info().load_id;

        let mut calls = 0;
        let mut listener = |_: &[CategoryNode]| calls += 1;
        let err = dashboard
            .load_bytes(b"L1 metric,MTM\n", LoadTrigger::Upload, &mut listener)
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmptyInput));
        assert_eq!(calls, 0);
        assert_eq!(dashboard.categories(), before.as_slice());
        assert_eq!(dashboard.info().load_id, load_id);
    }

    #[test]
    fn test_reset_round_trip_is_exact() {
        let mut dashboard = Dashboard::builtin(NormalizeOptions::default()).unwrap();
        let original = dashboard.categories().to_vec();

        dashboard
            .load_bytes(CUSTOM.as_bytes(), LoadTrigger::Upload, &mut ignore)
            .unwrap();
        assert_ne!(dashboard.categories(), original.as_slice());

        let info = dashboard.reset_to_default(&mut ignore);
        assert!(info.using_default);
        assert_eq!(info.trigger, LoadTrigger::Reset);
        assert_eq!(dashboard.categories(), original.as_slice());

        dashboard.reset_to_default(&mut ignore);
        assert_eq!(dashboard.categories(), original.as_slice());
    }

    #[tokio::test]
    async fn test_acquire_keeps_failures_apart() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TextSource::File(dir.path().join("nope.csv"));
        let err = acquire(&missing, &NormalizeOptions::default()).await.unwrap_err();
        assert!(matches!(err, LoadError::Source(_)));

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "").unwrap();
        let err = acquire(&TextSource::File(empty), &NormalizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Pipeline(_)));
    }
}
