//! analyze_spartacus_structure

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisArgs {
    project_path: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Structure {
    has_projects: bool,
    has_feature_libs: bool,
    has_integration_libs: bool,
    has_app: bool,
}

#[derive(Debug, Default, Serialize)]
struct FileCounts {
    components: usize,
    services: usize,
    modules: usize,
    models: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Analysis {
    project_path: String,
    structure: Structure,
    files: FileCounts,
    projects: Vec<String>,
    feature_libs: Vec<String>,
    recommendations: Vec<String>,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "analyze_spartacus_structure",
            "Analyze the Spartacus project structure and provide insights",
            InputSchema::new().required(
                "projectPath",
                FieldKind::Path,
                "Path to the Spartacus project root",
            ),
        ),
        typed_handler(move |args: AnalysisArgs| {
            let files = Arc::clone(&writer);
            async move { analyze(&files, args).await }
        }),
    )
}

/// First path segment below `dir` for every file listed under it
fn top_level_names(listing: &[PathBuf], dir: &Path) -> Vec<String> {
    let names: BTreeSet<String> = listing
        .iter()
        .filter_map(|p| p.strip_prefix(dir).ok())
        .filter(|rest| rest.components().count() > 1)
        .filter_map(|rest| rest.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    names.into_iter().collect()
}

async fn analyze(files: &Arc<dyn FileWriter>, args: AnalysisArgs) -> Result<ToolOutput> {
    let project = Path::new(&args.project_path);
    if !files.file_exists(project).await {
        bail!("Project path not found: {}", args.project_path);
    }
    info!("Analyzing project structure at {}", args.project_path);

    let structure = Structure {
        has_projects: files.file_exists(&project.join("projects")).await,
        has_feature_libs: files.file_exists(&project.join("feature-libs")).await,
        has_integration_libs: files.file_exists(&project.join("integration-libs")).await,
        has_app: files.file_exists(&project.join("src").join("app")).await,
    };

    let listing = files
        .list_files_recursively(project, Some(&[".ts"]))
        .await
        .context("failed to scan project sources")?;

    let mut counts = FileCounts::default();
    for path in &listing {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if name.ends_with(".component.ts") {
            counts.components += 1;
        } else if name.ends_with(".service.ts") {
            counts.services += 1;
        } else if name.ends_with(".module.ts") {
            counts.modules += 1;
        } else if name.ends_with(".model.ts") {
            counts.models += 1;
        }
    }

    let root = files.resolve_path(project);
    let projects = top_level_names(&listing, &root.join("projects"));
    let feature_libs = top_level_names(&listing, &root.join("feature-libs"));

    let mut recommendations = Vec::new();
    if !projects.is_empty() {
        recommendations.push(format!(
            "Found {} projects: {}",
            projects.len(),
            projects.join(", ")
        ));
    }
    if !feature_libs.is_empty() {
        recommendations.push(format!(
            "Found {} feature libraries: {}",
            feature_libs.len(),
            feature_libs.join(", ")
        ));
    }
    if !structure.has_feature_libs {
        recommendations.push(
            "Consider a feature-libs directory for reusable feature modules".to_string(),
        );
    }
    recommendations.extend(
        [
            "Recommended component structure:",
            "- Place custom components in feature-libs for reusability",
            "- Follow the established naming conventions (kebab-case for files, PascalCase for classes)",
            "- Include proper CMS component configuration",
            "- Add comprehensive unit tests",
        ]
        .map(str::to_string),
    );

    let analysis = Analysis {
        project_path: args.project_path,
        structure,
        files: counts,
        projects,
        feature_libs,
        recommendations,
    };
    let report = serde_json::to_value(&analysis).context("failed to encode analysis")?;
    let body = serde_json::to_string_pretty(&report).context("failed to encode analysis")?;
    Ok(ToolOutput::text(format!("Spartacus Project Analysis:\n\n{body}")).with_report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Dispatcher, InvocationRequest};
    use crate::error::FaultKind;
    use crate::generators::testing::MemoryWriter;
    use serde_json::{json, Value};

    async fn seeded() -> (Dispatcher, Arc<MemoryWriter>) {
        let mem = Arc::new(MemoryWriter::default());
        for path in [
            "/shop/projects/storefront/src/app.module.ts",
            "/shop/projects/storefront/src/cart.service.ts",
            "/shop/feature-libs/rating/rating.component.ts",
            "/shop/feature-libs/rating/rating.model.ts",
            "/shop/feature-libs/rating/README.md",
            "/shop/src/app/app.component.ts",
        ] {
            mem.write_file(Path::new(path), "").await.unwrap();
        }
        let files: Arc<dyn FileWriter> = mem.clone();
        let mut reg = ToolRegistry::new();
        register(&mut reg, &files).unwrap();
        (Dispatcher::new(Arc::new(reg)), mem)
    }

    #[tokio::test]
    async fn test_counts_and_libraries() {
        let (d, _) = seeded().await;
        let env = d
            .dispatch(InvocationRequest::new(
                "analyze_spartacus_structure",
                json!({"projectPath": "/shop"}),
            ))
            .await;
        assert!(!env.is_error, "{}", env.text());

        let text = env.text();
        let body = text
            .strip_prefix("Spartacus Project Analysis:\n\n")
            .unwrap();
        let report: Value = serde_json::from_str(body).unwrap();
        assert_eq!(report["structure"]["hasProjects"], true);
        assert_eq!(report["structure"]["hasIntegrationLibs"], false);
        assert_eq!(report["structure"]["hasApp"], true);
        assert_eq!(
            report["files"],
            json!({"components": 2, "services": 1, "modules": 1, "models": 1})
        );
        assert_eq!(report["projects"], json!(["storefront"]));
        assert_eq!(report["featureLibs"], json!(["rating"]));
        assert!(env.generated.is_empty());
        assert_eq!(env.report, Some(report));
    }

    #[tokio::test]
    async fn test_missing_project_is_handler_error() {
        let (d, _) = seeded().await;
        let fault = d
            .try_dispatch(InvocationRequest::new(
                "analyze_spartacus_structure",
                json!({"projectPath": "/nowhere"}),
            ))
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InternalError);
        assert_eq!(fault.message, "Project path not found: /nowhere");
    }
}
