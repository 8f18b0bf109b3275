//! Configuration loading

use std::path::{Path, PathBuf};

use gantry_core::manifest::LEGACY_CONFIG_KEY;
use gantry_core::{ConfigError, Diagnostic, Diagnostics, PackageJson, Parsed, Result};
use gantry_tasks::task::strip_package_name;
use gantry_tasks::{Pipeline, TaskId, TrackedTaskDefinition};
use tracing::{debug, info, instrument};

use super::defaults::{CONFIG_FILE, NOT_FOUND_REMEDIATION};
use super::types::Configuration;

/// Path of the configuration file inside a directory
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Read and parse a configuration file, or `None` if it does not exist
pub fn read_config(path: &Path) -> Result<Option<Parsed<Configuration>>> {
    if !path.is_file() {
        debug!(path = %path.display(), "no configuration file");
        return Ok(None);
    }

    info!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    Configuration::from_jsonc(&content, path).map(Some)
}

/// Load the configuration file from a directory. Fails if it is missing.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_config(dir: &Path) -> Result<Configuration> {
    let path = config_path(dir);
    match read_config(&path)? {
        Some(parsed) => Ok(parsed.into_logged()),
        None => Err(not_found(path)),
    }
}

/// Load the configuration, synthesizing one from the manifest when allowed.
///
/// Diagnostics are logged through `tracing`.
#[instrument(skip_all, fields(dir = %dir.display(), allow_synthesis = allow_synthesis))]
pub fn load_or_synthesize(
    dir: &Path,
    manifest: &PackageJson,
    allow_synthesis: bool,
) -> Result<Configuration> {
    load_or_synthesize_with_diagnostics(dir, manifest, allow_synthesis).map(Parsed::into_logged)
}

/// Like [`load_or_synthesize`], returning diagnostics instead of logging them.
///
/// Synthesis is used for single-package repositories: the pipeline may only
/// contain bare task names (root-scoped `//#task` keys are rewritten to
/// `task`), and every manifest script without a pipeline entry becomes an
/// uncached task.
pub fn load_or_synthesize_with_diagnostics(
    dir: &Path,
    manifest: &PackageJson,
    allow_synthesis: bool,
) -> Result<Parsed<Configuration>> {
    let mut diagnostics = Diagnostics::new();
    if manifest.legacy_config.is_some() {
        diagnostics.push(Diagnostic::LegacyManifestConfig {
            key: LEGACY_CONFIG_KEY.to_string(),
        });
    }

    let path = config_path(dir);
    let from_file = read_config(&path)?;

    if !allow_synthesis {
        let parsed = from_file.ok_or_else(|| not_found(path))?;
        diagnostics.extend(parsed.diagnostics);
        return Ok(Parsed::new(parsed.value, diagnostics));
    }

    let mut config = match from_file {
        Some(parsed) => {
            diagnostics.extend(parsed.diagnostics);
            let mut config = parsed.value;
            config.pipeline = single_package_pipeline(config.pipeline)?;
            config
        }
        None => {
            debug!("synthesizing configuration from manifest");
            Configuration::empty()
        }
    };

    add_script_tasks(&mut config.pipeline, manifest);
    Ok(Parsed::new(config, diagnostics))
}

/// Rewrite root-scoped keys to bare task names, rejecting any other package task.
///
/// A task declared both as `//#task` and `task` is an error.
pub fn single_package_pipeline(pipeline: Pipeline) -> Result<Pipeline> {
    let mut rewritten = Pipeline::new();
    for (task_id, definition) in pipeline {
        let id = TaskId::parse(&task_id);
        let key = if id.is_root_task() {
            strip_package_name(&task_id).to_string()
        } else if id.is_package_task() {
            return Err(ConfigError::PackageTaskInSingleWorkspace(task_id).into());
        } else {
            task_id
        };

        if rewritten.contains_key(&key) {
            return Err(ConfigError::InvalidValue {
                field: format!("pipeline.{}", key),
                message: format!(
                    "declared both as \"{}\" and \"{}\"",
                    key,
                    TaskId::root(key.as_str())
                ),
            }
            .into());
        }
        rewritten.insert(key, definition);
    }
    Ok(rewritten)
}

/// Give every manifest script without a pipeline entry an explicitly uncached definition
pub fn add_script_tasks(pipeline: &mut Pipeline, manifest: &PackageJson) {
    for script in manifest.script_names() {
        if !pipeline.has_task(script) {
            debug!(script, "adding uncached task for manifest script");
            pipeline.insert(script, TrackedTaskDefinition::new().with_cache(false));
        }
    }
}

fn not_found(path: PathBuf) -> gantry_core::GantryError {
    ConfigError::NotFound {
        path,
        remediation: NOT_FOUND_REMEDIATION.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use gantry_core::GantryError;
    use gantry_tasks::FieldId;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_load_config() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"build": {"outputs": ["dist/**"]}}}"#);

        let config = load_config(temp.path()).unwrap();
        assert!(config.pipeline.contains_key("build"));
    }

    #[test]
    fn test_load_config_missing() {
        let temp = TempDir::new().unwrap();
        let err = load_config(temp.path()).unwrap_err();
        match err {
            GantryError::Config(ConfigError::NotFound { path, remediation }) => {
                assert_eq!(path, temp.path().join(CONFIG_FILE));
                assert!(!remediation.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_config_malformed() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "{ \"pipeline\": [ }");
        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, GantryError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_no_synthesis_requires_file() {
        let temp = TempDir::new().unwrap();
        let err = load_or_synthesize(temp.path(), &PackageJson::default(), false).unwrap_err();
        assert!(matches!(err, GantryError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_no_synthesis_keeps_package_tasks() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"web#build": {}}}"#);
        let manifest = PackageJson::with_scripts([("test", "jest")]);

        let config = load_or_synthesize(temp.path(), &manifest, false).unwrap();
        assert!(config.pipeline.contains_key("web#build"));
        assert!(!config.pipeline.contains_key("test"));
    }

    #[test]
    fn test_synthesize_without_file() {
        let temp = TempDir::new().unwrap();
        let manifest = PackageJson::with_scripts([("build", "tsc"), ("test", "jest")]);

        let config = load_or_synthesize(temp.path(), &manifest, true).unwrap();
        assert!(config.global_env.is_empty());
        assert_eq!(config.pipeline.len(), 2);
        let test = config.pipeline.get("test").unwrap();
        assert_eq!(test.cache, Some(false));
        assert!(!test.resolve().cache);
    }

    #[test]
    fn test_synthesize_adds_missing_scripts() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"build": {"outputs": ["dist/**"]}}}"#);
        let manifest = PackageJson::with_scripts([("test", "jest"), ("build", "tsc")]);

        let config = load_or_synthesize(temp.path(), &manifest, true).unwrap();
        let test = config.pipeline.get("test").unwrap();
        assert!(test.has_field(FieldId::Cache));
        assert_eq!(test.defined_fields().len(), 1);
        assert!(!test.resolve().cache);

        let build = config.pipeline.get("build").unwrap();
        assert!(build.cache.is_none());
        assert!(build.resolve().cache);
    }

    #[test]
    fn test_single_package_rejects_package_tasks() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"pkgA#build": {}}}"#);

        let err = load_or_synthesize(temp.path(), &PackageJson::default(), true).unwrap_err();
        assert!(matches!(
            err,
            GantryError::Config(ConfigError::PackageTaskInSingleWorkspace(ref id)) if id == "pkgA#build"
        ));
    }

    #[test]
    fn test_single_package_rewrites_root_tasks() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"//#lint": {"cache": false}}}"#);
        let manifest = PackageJson::with_scripts([("lint", "eslint .")]);

        let config = load_or_synthesize(temp.path(), &manifest, true).unwrap();
        assert!(config.pipeline.contains_key("lint"));
        assert!(!config.pipeline.contains_key("//#lint"));
        assert_eq!(config.pipeline.len(), 1);
    }

    #[test]
    fn test_single_package_rejects_root_and_bare_duplicates() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"{"pipeline": {"//#lint": {"cache": false}, "lint": {"outputs": ["x"]}}}"#,
        );

        let err = load_or_synthesize(temp.path(), &PackageJson::default(), true).unwrap_err();
        match err {
            GantryError::Config(ConfigError::InvalidValue { field, message }) => {
                assert_eq!(field, "pipeline.lint");
                assert!(message.contains("//#lint"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Default)]
    struct SpanFields(std::sync::Mutex<Vec<(String, String)>>);

    impl tracing::field::Visit for &SpanFields {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0
                .lock()
                .unwrap()
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl tracing::Subscriber for SpanFields {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            let mut visitor = self;
            attrs.record(&mut visitor);
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, _: &tracing::Event<'_>) {}
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_load_span_records_synthesis_flag() {
        let temp = TempDir::new().unwrap();
        let fields = std::sync::Arc::new(SpanFields::default());

        tracing::subscriber::with_default(std::sync::Arc::clone(&fields), || {
            load_or_synthesize(temp.path(), &PackageJson::default(), true).unwrap();
        });

        let recorded = fields.0.lock().unwrap();
        assert!(recorded
            .iter()
            .any(|(name, value)| name == "allow_synthesis" && value == "true"));
    }

    #[test]
    fn test_legacy_manifest_block_is_ignored_with_diagnostic() {
        let temp = TempDir::new().unwrap();
        let manifest = PackageJson {
            legacy_config: Some(serde_json::json!({"pipeline": {"build": {}}})),
            ..PackageJson::default()
        };

        let parsed = load_or_synthesize_with_diagnostics(temp.path(), &manifest, true).unwrap();
        assert!(parsed.value.pipeline.is_empty());
        assert!(parsed
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::LegacyManifestConfig { .. })));
    }

    #[test]
    fn test_file_diagnostics_are_returned() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"pipeline": {"build": {"dependsOn": ["$TOKEN"]}}}"#);

        let parsed =
            load_or_synthesize_with_diagnostics(temp.path(), &PackageJson::default(), false).unwrap();
        assert_eq!(parsed.diagnostics.len(), 1);
        let build = parsed.value.pipeline.get("build").unwrap();
        assert!(build.env.as_ref().unwrap().contains("TOKEN"));
    }
}
