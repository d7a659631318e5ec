//! Axes discovery.
//!
//! The engine decides which selectors and values are reachable from a
//! partial key; this module only serializes the key and folds the returned
//! pairs into an [`AxesMap`].

use gribjump_core::RequestKey;
use indexmap::{IndexMap, IndexSet};

use crate::config::validate_axes_level;
use crate::engine::Engine;
use crate::error::GribJumpError;
use crate::observability::log_debug;

/// Selector names mapped to the values observed for each, at one level.
///
/// Keys keep the order the engine reported them in. Values are
/// de-duplicated, first occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AxesMap {
    level: u32,
    axes: IndexMap<String, IndexSet<String>>,
}

impl AxesMap {
    /// Fold engine pairs into a map. Repeated names merge their values.
    pub fn from_pairs<I, V>(level: u32, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        let mut axes: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for (name, values) in pairs {
            axes.entry(name).or_default().extend(values);
        }
        Self { level, axes }
    }

    /// Specificity level this map was discovered at.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Values observed for `name`.
    pub fn get(&self, name: &str) -> Option<&IndexSet<String>> {
        self.axes.get(name)
    }

    /// Whether `name` is an axis.
    pub fn contains(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    /// Axis names in engine order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    /// `(name, values)` pairs in engine order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.axes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether no axis was reported.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Plain owned form, values in observation order.
    pub fn into_map(self) -> IndexMap<String, Vec<String>> {
        self.axes
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect()
    }
}

/// Ask `engine` which axes are reachable from `key` at `level`.
pub fn discover<E: Engine + ?Sized>(
    engine: &E,
    key: &RequestKey,
    level: u32,
    context: &str,
) -> Result<AxesMap, GribJumpError> {
    validate_axes_level(level)?;
    let request = key.serialize();
    let pairs = engine.axes(&request, level, context)?;
    let map = AxesMap::from_pairs(level, pairs);
    log_debug!(
        event = "axes_discovered",
        component = "axes",
        axes_level = level,
        keys = map.len(),
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::engine::ResultSource;
    use gribjump_core::{EngineError, EngineStatus, ExtractionRequest, PathExtractionRequest};
    use std::sync::Mutex;

    struct FixedAxes {
        seen: Mutex<Vec<(String, u32)>>,
        fail: bool,
    }

    impl FixedAxes {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl Engine for FixedAxes {
        fn version(&self) -> String {
            "test".into()
        }

        fn extract(
            &self,
            _: &[ExtractionRequest],
            _: &str,
        ) -> Result<Box<dyn ResultSource>, EngineError> {
            Err(EngineError::new("extract", EngineStatus::Failure, "unused"))
        }

        fn extract_from_paths(
            &self,
            _: &[PathExtractionRequest],
            _: &str,
        ) -> Result<Box<dyn ResultSource>, EngineError> {
            Err(EngineError::new("extract_from_paths", EngineStatus::Failure, "unused"))
        }

        fn extract_single(
            &self,
            _: &str,
            _: &[usize],
            _: Option<&str>,
            _: &str,
        ) -> Result<Box<dyn ResultSource>, EngineError> {
            Err(EngineError::new("extract_single", EngineStatus::Failure, "unused"))
        }

        fn axes(
            &self,
            request: &str,
            level: u32,
            _: &str,
        ) -> Result<Vec<(String, Vec<String>)>, EngineError> {
            self.seen.lock().unwrap().push((request.to_string(), level));
            if self.fail {
                return Err(EngineError::new("axes", EngineStatus::NotFound, "no match"));
            }
            Ok(vec![
                ("step".into(), vec!["0".into(), "6".into(), "0".into()]),
                ("param".into(), vec!["2t".into()]),
                ("step".into(), vec!["12".into()]),
            ])
        }
    }

    fn key() -> RequestKey {
        RequestKey::builder()
            .select("class", "od")
            .select("date", "20230508")
            .build()
    }

    #[test]
    fn folds_and_dedupes_in_engine_order() {
        let engine = FixedAxes::new(false);
        let map = discover(&engine, &key(), 2, "{}").unwrap();
        assert_eq!(map.level(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["step", "param"]);
        let steps: Vec<&str> = map.get("step").unwrap().iter().map(String::as_str).collect();
        assert_eq!(steps, vec!["0", "6", "12"]);
        assert_eq!(
            engine.seen.lock().unwrap().as_slice(),
            &[("class=od,date=20230508".to_string(), 2)]
        );
    }

    #[test]
    fn level_checked_before_engine_call() {
        let engine = FixedAxes::new(false);
        let err = discover(&engine, &key(), 4, "{}").unwrap_err();
        assert!(matches!(
            err,
            GribJumpError::Config(ConfigError::AxesLevelOutOfRange { level: 4 })
        ));
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn engine_error_passes_through() {
        let engine = FixedAxes::new(true);
        match discover(&engine, &key(), 3, "{}") {
            Err(GribJumpError::Engine(e)) => assert_eq!(e.status(), Some(EngineStatus::NotFound)),
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn into_map_keeps_order() {
        let map = AxesMap::from_pairs(
            1,
            vec![("b".to_string(), vec!["2".to_string()]), ("a".to_string(), vec![])],
        );
        let plain = map.into_map();
        assert_eq!(plain.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(plain["a"].is_empty());
    }
}
