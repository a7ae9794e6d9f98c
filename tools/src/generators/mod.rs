//! Scaffolding tools — component, service, model, module, theme, devops and analysis
//!
//! Each submodule exposes `register(reg, files)` adding its descriptors and
//! handlers. Handlers receive validated arguments and write through the
//! shared [`FileWriter`].

pub mod analysis;
pub mod component;
pub mod devops;
pub mod model;
pub mod module;
pub mod service;
pub mod theme;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::naming;
use crate::registry::ToolRegistry;

/// Register every built-in tool, in advertisement order
pub fn register_tools(
    reg: &mut ToolRegistry,
    files: Arc<dyn FileWriter>,
) -> Result<(), RegistryError> {
    component::register(reg, &files)?;
    service::register(reg, &files)?;
    model::register(reg, &files)?;
    module::register(reg, &files)?;
    theme::register(reg, &files)?;
    devops::register(reg, &files)?;
    analysis::register(reg, &files)?;
    Ok(())
}

/// A registry holding every built-in tool
pub fn build_registry(files: Arc<dyn FileWriter>) -> Result<ToolRegistry, RegistryError> {
    let mut reg = ToolRegistry::new();
    register_tools(&mut reg, files)?;
    Ok(reg)
}

/// `field` must contain at least one letter or digit; names become file stems
fn require_words(args: &Map<String, Value>, field: &str) -> Result<(), String> {
    let value = args.get(field).and_then(Value::as_str).unwrap_or_default();
    if naming::has_words(value) {
        Ok(())
    } else {
        Err(format!("{field}: must contain at least one letter or digit"))
    }
}

pub(crate) fn check_name(args: &Map<String, Value>) -> Result<(), String> {
    require_words(args, "name")
}

pub(crate) fn check_theme_name(args: &Map<String, Value>) -> Result<(), String> {
    require_words(args, "themeName")
}

pub(crate) fn check_variable_set(args: &Map<String, Value>) -> Result<(), String> {
    require_words(args, "variableSet")
}

/// Writes a handler's files under one base directory and records them
pub(crate) struct Emitter {
    files: Arc<dyn FileWriter>,
    base: PathBuf,
    written: Vec<(String, PathBuf)>,
}

impl Emitter {
    /// Ensure `base` exists and start recording writes beneath it
    pub(crate) async fn open(files: &Arc<dyn FileWriter>, base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        files
            .ensure_directory(&base)
            .await
            .with_context(|| format!("failed to prepare {}", base.display()))?;
        Ok(Self {
            files: Arc::clone(files),
            base,
            written: Vec::new(),
        })
    }

    pub(crate) fn base(&self) -> &Path {
        &self.base
    }

    /// Write `content` to `relative` (forward slashes) under the base
    pub(crate) async fn emit(&mut self, relative: &str, content: &str) -> Result<()> {
        let path = relative
            .split('/')
            .fold(self.base.clone(), |acc, part| acc.join(part));
        let written = self
            .files
            .write_file(&path, content)
            .await
            .with_context(|| format!("failed to generate {relative}"))?;
        self.written.push((relative.to_string(), written));
        Ok(())
    }

    /// Success output: `headline`, then the generated file list
    pub(crate) fn finish(self, headline: &str) -> ToolOutput {
        let listing: Vec<String> = self.written.iter().map(|(n, _)| format!("- {n}")).collect();
        let text = format!("{headline}\n\nGenerated files:\n{}", listing.join("\n"));
        ToolOutput::text(text).with_generated(self.written.into_iter().map(|(_, p)| p).collect())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory writer shared by generator tests

    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::FileError;
    use crate::files::FileWriter;

    #[derive(Default)]
    pub struct MemoryWriter {
        pub files: Mutex<BTreeMap<PathBuf, String>>,
        pub dirs: Mutex<Vec<PathBuf>>,
    }

    impl MemoryWriter {
        pub fn get(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }

        pub fn paths(&self) -> Vec<String> {
            self.files
                .lock()
                .unwrap()
                .keys()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        }
    }

    #[async_trait]
    impl FileWriter for MemoryWriter {
        async fn ensure_directory(&self, path: &Path) -> Result<PathBuf, FileError> {
            self.dirs.lock().unwrap().push(path.to_path_buf());
            Ok(path.to_path_buf())
        }

        async fn write_file(&self, path: &Path, content: &str) -> Result<PathBuf, FileError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(path.to_path_buf())
        }

        async fn file_exists(&self, path: &Path) -> bool {
            let files = self.files.lock().unwrap();
            files.keys().any(|p| p.starts_with(path))
        }

        async fn read_file(&self, path: &Path) -> Result<String, FileError> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| {
                    FileError::new(
                        "read",
                        path,
                        std::io::Error::from(std::io::ErrorKind::NotFound),
                    )
                })
        }

        async fn list_files_recursively(
            &self,
            path: &Path,
            extensions: Option<&[&str]>,
        ) -> Result<Vec<PathBuf>, FileError> {
            let files = self.files.lock().unwrap();
            Ok(files
                .keys()
                .filter(|p| p.starts_with(path))
                .filter(|p| {
                    let name = p.to_string_lossy();
                    extensions.map_or(true, |exts| exts.iter().any(|e| name.ends_with(e)))
                })
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryWriter;
    use super::*;

    #[test]
    fn test_build_registry_has_full_catalogue() {
        let files: Arc<dyn FileWriter> = Arc::new(MemoryWriter::default());
        let reg = build_registry(files).unwrap();
        assert_eq!(
            reg.names(),
            vec![
                "create_spartacus_component",
                "create_component_variant",
                "generate_spartacus_service",
                "create_spartacus_model",
                "generate_spartacus_module",
                "generate_theme",
                "generate_css_variables",
                "generate_ci_pipeline",
                "generate_docker_config",
                "generate_monitoring_config",
                "analyze_spartacus_structure",
            ]
        );
    }

    #[test]
    fn test_registering_twice_is_duplicate() {
        let files: Arc<dyn FileWriter> = Arc::new(MemoryWriter::default());
        let mut reg = build_registry(Arc::clone(&files)).unwrap();
        let err = register_tools(&mut reg, files).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_emitter_records_relative_names() {
        let mem = Arc::new(MemoryWriter::default());
        let files: Arc<dyn FileWriter> = mem.clone();
        let mut out = Emitter::open(&files, "/out").await.unwrap();
        out.emit("a.ts", "a").await.unwrap();
        out.emit("sub/b.scss", "b").await.unwrap();
        assert_eq!(out.base(), Path::new("/out"));

        let output = out.finish("Done");
        assert_eq!(
            output.content[0].as_text(),
            "Done\n\nGenerated files:\n- a.ts\n- sub/b.scss"
        );
        assert_eq!(output.generated[1], PathBuf::from("/out/sub/b.scss"));
        assert_eq!(mem.get("/out/sub/b.scss").as_deref(), Some("b"));
    }
}
