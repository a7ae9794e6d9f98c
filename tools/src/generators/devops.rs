//! generate_ci_pipeline / generate_docker_config / generate_monitoring_config

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::envelope::ToolOutput;
use crate::error::RegistryError;
use crate::files::FileWriter;
use crate::registry::{typed_handler, ToolDescriptor, ToolRegistry};
use crate::schema::{FieldKind, InputSchema};
use crate::templates::devops::{self as tpl, DockerOptions, ENVIRONMENTS};

use super::Emitter;

pub const PLATFORMS: [&str; 4] = ["github", "gitlab", "azure", "jenkins"];
pub const STAGES: [&str; 6] = ["build", "test", "lint", "e2e", "deploy", "security-scan"];
pub const DOCKER_ENVIRONMENTS: [&str; 3] = ["development", "production", "staging"];
pub const MONITORING_TOOLS: [&str; 4] = ["lighthouse", "web-vitals", "bundle-analyzer", "performance-budget"];

/// Metric thresholds in reporting order: key, label, unit
const THRESHOLDS: [(&str, &str, &str); 5] = [
    ("fcp", "First Contentful Paint", "ms"),
    ("lcp", "Largest Contentful Paint", "ms"),
    ("cls", "Cumulative Layout Shift", ""),
    ("fid", "First Input Delay", "ms"),
    ("bundleSize", "Bundle Size", ""),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipelineArgs {
    platform: String,
    output_path: String,
    stages: Vec<String>,
    node_version: String,
    deployment_targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DockerArgs {
    output_path: String,
    base_image: String,
    environment: String,
    include_nginx: bool,
    multi_stage: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitoringArgs {
    output_path: String,
    project_path: Option<String>,
    tools: Vec<String>,
    thresholds: Map<String, Value>,
    app_url: String,
}

pub fn register(reg: &mut ToolRegistry, files: &Arc<dyn FileWriter>) -> Result<(), RegistryError> {
    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_ci_pipeline",
            "Generate a CI/CD pipeline, deployment script and environment files",
            InputSchema::new()
                .required("platform", FieldKind::String, "CI platform")
                .one_of(&PLATFORMS)
                .required("outputPath", FieldKind::Path, "Project root")
                .optional("stages", FieldKind::StringArray, "Pipeline stages in run order")
                .one_of(&STAGES)
                .default_value(json!(["build", "test", "lint"]))
                .optional("nodeVersion", FieldKind::String, "Node.js version")
                .default_value(json!("18"))
                .optional("deploymentTargets", FieldKind::StringArray, "Deployment targets")
                .default_value(json!([])),
        ),
        typed_handler(move |args: PipelineArgs| {
            let files = Arc::clone(&writer);
            async move { generate_pipeline(&files, args).await }
        }),
    )?;

    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_docker_config",
            "Generate Dockerfile, docker-compose and nginx configuration",
            InputSchema::new()
                .required("outputPath", FieldKind::Path, "Project root")
                .optional("baseImage", FieldKind::String, "Base image for the build stage")
                .default_value(json!("node:18-alpine"))
                .optional("environment", FieldKind::String, "Target environment")
                .one_of(&DOCKER_ENVIRONMENTS)
                .default_value(json!("production"))
                .optional("includeNginx", FieldKind::Boolean, "Serve the build with nginx")
                .default_value(json!(true))
                .optional("multiStage", FieldKind::Boolean, "Use a multi-stage build")
                .default_value(json!(true)),
        ),
        typed_handler(move |args: DockerArgs| {
            let files = Arc::clone(&writer);
            async move { generate_docker(&files, args).await }
        }),
    )?;

    let writer = Arc::clone(files);
    reg.register(
        ToolDescriptor::new(
            "generate_monitoring_config",
            "Set up performance monitoring: Lighthouse and Web Vitals configs, a performance budget and a monitoring script",
            InputSchema::new()
                .required("outputPath", FieldKind::Path, "Output directory path")
                .optional("projectPath", FieldKind::String, "Project path")
                .optional("tools", FieldKind::StringArray, "Monitoring tools to configure")
                .one_of(&MONITORING_TOOLS)
                .default_value(json!(["lighthouse", "web-vitals"]))
                .optional("thresholds", FieldKind::Object, "Metric thresholds (fcp, lcp, fid in ms; cls; bundleSize)")
                .default_value(json!({}))
                .optional("appUrl", FieldKind::String, "URL the monitoring script audits")
                .default_value(json!("http://localhost:4200")),
        )
        .with_check(check_thresholds),
        typed_handler(move |args: MonitoringArgs| {
            let files = Arc::clone(&writer);
            async move { generate_monitoring(&files, args).await }
        }),
    )
}

fn check_thresholds(args: &Map<String, Value>) -> Result<(), String> {
    let Some(thresholds) = args.get("thresholds").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in thresholds {
        let valid = match key.as_str() {
            "bundleSize" => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            "fcp" | "lcp" | "cls" | "fid" => value.as_f64().is_some_and(|n| n >= 0.0),
            _ => return Err(format!("thresholds.{key} is not a known metric")),
        };
        if !valid {
            return Err(format!("thresholds.{key} has an invalid value"));
        }
    }
    Ok(())
}

/// Pipeline file location and contents for a platform
fn pipeline_file(platform: &str, stages: &[String], node_version: &str) -> (&'static str, String) {
    match platform {
        "gitlab" => (".gitlab-ci.yml", tpl::gitlab_ci(stages, node_version)),
        "azure" => ("azure-pipelines.yml", tpl::azure_pipeline(stages, node_version)),
        "jenkins" => ("Jenkinsfile", tpl::jenkinsfile(stages, node_version)),
        _ => (
            ".github/workflows/ci-cd.yml",
            tpl::github_workflow(stages, node_version),
        ),
    }
}

async fn generate_pipeline(files: &Arc<dyn FileWriter>, args: PipelineArgs) -> Result<ToolOutput> {
    info!(
        "Generating {} pipeline with stages {:?}",
        args.platform, args.stages
    );
    let (pipeline_path, pipeline) =
        pipeline_file(&args.platform, &args.stages, &args.node_version);

    let mut out = Emitter::open(files, &args.output_path).await?;
    out.emit(pipeline_path, &pipeline).await?;
    out.emit("scripts/deploy.sh", &tpl::deploy_script(&args.deployment_targets))
        .await?;
    for env in ENVIRONMENTS {
        out.emit(&format!("config/{env}.env"), &tpl::environment_config(env))
            .await?;
    }

    let headline = format!(
        "Successfully generated {} CI/CD pipeline in {}",
        args.platform, args.output_path
    );
    Ok(out.finish(&headline))
}

async fn generate_docker(files: &Arc<dyn FileWriter>, args: DockerArgs) -> Result<ToolOutput> {
    let opts = DockerOptions {
        base_image: &args.base_image,
        environment: &args.environment,
        include_nginx: args.include_nginx,
        multi_stage: args.multi_stage,
    };
    info!("Generating Docker configuration for {}", opts.environment);

    let mut out = Emitter::open(files, &args.output_path).await?;
    out.emit("Dockerfile", &tpl::dockerfile(&opts)).await?;
    out.emit("docker-compose.yml", &tpl::docker_compose(&opts))
        .await?;
    out.emit(".dockerignore", tpl::dockerignore()).await?;
    if opts.include_nginx {
        out.emit("nginx.conf", tpl::nginx_conf()).await?;
    }

    let headline = format!(
        "Successfully generated Docker configuration in {}",
        args.output_path
    );
    Ok(out.finish(&headline))
}

async fn generate_monitoring(files: &Arc<dyn FileWriter>, args: MonitoringArgs) -> Result<ToolOutput> {
    let project = args.project_path.as_deref().unwrap_or(&args.output_path);
    info!("Setting up performance monitoring for {project} ({:?})", args.tools);
    let uses = |tool: &str| args.tools.iter().any(|t| t == tool);

    let mut out = Emitter::open(files, &args.output_path).await?;
    if uses("lighthouse") {
        out.emit("lighthouse.config.js", tpl::lighthouse_config()).await?;
    }
    if uses("web-vitals") {
        out.emit("web-vitals.config.js", tpl::web_vitals_config()).await?;
    }
    let budget = serde_json::to_string_pretty(&tpl::performance_budget(&args.thresholds))
        .context("failed to render performance budget")?;
    out.emit("performance-budget.json", &budget).await?;
    out.emit(
        "scripts/performance-monitor.js",
        &tpl::performance_monitor_script(&args.app_url),
    )
    .await?;

    let mut headline = format!(
        "Successfully set up performance monitoring for {project} in {}\n\nMonitoring tools:\n{}",
        args.output_path,
        args.tools
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
    let thresholds: Vec<String> = THRESHOLDS
        .iter()
        .filter_map(|(key, label, unit)| {
            let value = args.thresholds.get(*key)?;
            let shown = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            Some(format!("- {label}: {shown}{unit}"))
        })
        .collect();
    if !thresholds.is_empty() {
        headline.push_str("\n\nPerformance thresholds:\n");
        headline.push_str(&thresholds.join("\n"));
    }
    Ok(out.finish(&headline))
}
