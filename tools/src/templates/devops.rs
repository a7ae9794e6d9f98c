//! CI pipelines, deployment scripts, container and performance monitoring configuration

use serde_json::{json, Map, Value};

/// Environments that get a `config/<env>.env` file
pub const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// npm script run for a stage
fn stage_command(stage: &str) -> String {
    match stage {
        "test" => "npm run test:ci".to_string(),
        "e2e" => "npm run e2e:ci".to_string(),
        "deploy" => "./scripts/deploy.sh".to_string(),
        other => format!("npm run {other}"),
    }
}

pub fn github_workflow(stages: &[String], node_version: &str) -> String {
    let mut out = String::from(
        "name: CI/CD Pipeline\n\non:\n  push:\n    branches: [ main, develop ]\n  pull_request:\n    branches: [ main ]\n\njobs:\n",
    );
    let mut previous: Option<&str> = None;
    for stage in stages {
        out.push_str(&format!("  {stage}:\n    runs-on: ubuntu-latest\n"));
        if let Some(prev) = previous {
            out.push_str(&format!("    needs: {prev}\n"));
        }
        out.push_str(&format!(
            "    steps:\n      - uses: actions/checkout@v4\n      - uses: actions/setup-node@v4\n        with:\n          node-version: '{node_version}'\n          cache: 'npm'\n      - run: npm ci\n      - run: {}\n",
            stage_command(stage)
        ));
        previous = Some(stage.as_str());
    }
    out
}

pub fn gitlab_ci(stages: &[String], node_version: &str) -> String {
    let mut out = String::from("stages:\n");
    for stage in stages {
        out.push_str(&format!("  - {stage}\n"));
    }
    out.push_str(&format!(
        "\nimage: node:{node_version}\n\ncache:\n  paths:\n    - node_modules/\n\nbefore_script:\n  - npm ci\n"
    ));
    for stage in stages {
        out.push_str(&format!(
            "\n{stage}:\n  stage: {stage}\n  script:\n    - {}\n",
            stage_command(stage)
        ));
        if stage == "build" {
            out.push_str("  artifacts:\n    paths:\n      - dist/\n");
        }
    }
    out
}

pub fn azure_pipeline(stages: &[String], node_version: &str) -> String {
    let mut out = format!(
        "trigger:\n  - main\n  - develop\n\npool:\n  vmImage: 'ubuntu-latest'\n\nvariables:\n  nodeVersion: '{node_version}.x'\n\nstages:\n"
    );
    for stage in stages {
        let title = capitalize(stage);
        out.push_str(&format!(
            "  - stage: {title}\n    jobs:\n      - job: {title}\n        steps:\n          - task: NodeTool@0\n            inputs:\n              versionSpec: $(nodeVersion)\n          - script: npm ci && {}\n",
            stage_command(stage)
        ));
    }
    out
}

pub fn jenkinsfile(stages: &[String], node_version: &str) -> String {
    let stage_blocks: Vec<String> = stages
        .iter()
        .map(|stage| {
            format!(
                "        stage('{}') {{\n            steps {{\n                sh '{}'\n            }}\n        }}",
                capitalize(stage),
                stage_command(stage)
            )
        })
        .collect();
    format!(
        "pipeline {{\n    agent any\n\n    tools {{\n        nodejs '{node_version}'\n    }}\n\n    stages {{\n        stage('Install') {{\n            steps {{\n                sh 'npm ci'\n            }}\n        }}\n{}\n    }}\n}}\n",
        stage_blocks.join("\n")
    )
}

pub fn deploy_script(targets: &[String]) -> String {
    let steps = if targets.is_empty() {
        "# No deployment targets configured".to_string()
    } else {
        targets
            .iter()
            .map(|t| format!("echo \"Deploying to {t}...\""))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "#!/bin/bash\nset -euo pipefail\n\necho \"Starting deployment...\"\n\nnpm run build:prod\n\n{steps}\n\necho \"Deployment completed\"\n"
    )
}

pub fn environment_config(environment: &str) -> String {
    let production = environment == "production";
    format!(
        "# {} environment\nNODE_ENV={environment}\nAPI_URL=https://api-{environment}.example.com\nCDN_URL=https://cdn-{environment}.example.com\nENABLE_ANALYTICS={production}\nLOG_LEVEL={}\n",
        environment.to_ascii_uppercase(),
        if production { "error" } else { "debug" }
    )
}

/// Options for the container files
#[derive(Debug, Clone)]
pub struct DockerOptions<'a> {
    pub base_image: &'a str,
    pub environment: &'a str,
    pub include_nginx: bool,
    pub multi_stage: bool,
}

pub fn dockerfile(opts: &DockerOptions<'_>) -> String {
    let base = opts.base_image;
    if !opts.multi_stage {
        return format!(
            "FROM {base}\n\nWORKDIR /app\nCOPY package*.json ./\nRUN npm ci\n\nCOPY . .\nRUN npm run build\n\nENV NODE_ENV={}\nEXPOSE 4200\nCMD [\"npm\", \"start\"]\n",
            opts.environment
        );
    }

    let runtime = if opts.include_nginx {
        "FROM nginx:alpine AS runtime\n\nCOPY --from=builder /app/dist /usr/share/nginx/html\nCOPY nginx.conf /etc/nginx/nginx.conf\nEXPOSE 80\nCMD [\"nginx\", \"-g\", \"daemon off;\"]\n".to_string()
    } else {
        format!(
            "FROM {base} AS runtime\n\nWORKDIR /app\nCOPY --from=builder /app/dist ./dist\nCOPY --from=builder /app/node_modules ./node_modules\nCOPY package*.json ./\nENV NODE_ENV={}\nEXPOSE 4200\nCMD [\"npm\", \"start\"]\n",
            opts.environment
        )
    };
    format!(
        "# Build stage\nFROM {base} AS builder\n\nWORKDIR /app\nCOPY package*.json ./\nRUN npm ci\n\nCOPY . .\nRUN npm run build:prod\n\n# Runtime stage\n{runtime}"
    )
}

pub fn docker_compose(opts: &DockerOptions<'_>) -> String {
    let container_port = if opts.include_nginx { 80 } else { 4200 };
    format!(
        "services:\n  spartacus-app:\n    build: .\n    ports:\n      - \"4200:{container_port}\"\n    environment:\n      - NODE_ENV={}\n    restart: unless-stopped\n",
        opts.environment
    )
}

pub fn dockerignore() -> &'static str {
    "node_modules\nnpm-debug.log\n.git\n.gitignore\n.env\ncoverage\n.nyc_output\n.vscode\n.idea\n*.log\ndist\n.angular\n"
}

pub fn nginx_conf() -> &'static str {
    r#"events {
    worker_connections 1024;
}

http {
    include /etc/nginx/mime.types;
    default_type application/octet-stream;

    gzip on;
    gzip_types text/plain text/css application/json application/javascript text/xml application/xml;

    server {
        listen 80;
        server_name localhost;
        root /usr/share/nginx/html;
        index index.html;

        location / {
            try_files $uri $uri/ /index.html;
        }
    }
}
"#
}

pub fn lighthouse_config() -> &'static str {
    r#"module.exports = {
  extends: 'lighthouse:default',
  settings: {
    onlyAudits: [
      'first-contentful-paint',
      'largest-contentful-paint',
      'cumulative-layout-shift',
      'first-input-delay'
    ]
  },
  audits: [
    'metrics/first-contentful-paint',
    'metrics/largest-contentful-paint',
    'metrics/cumulative-layout-shift'
  ]
};
"#
}

pub fn web_vitals_config() -> &'static str {
    r#"import { getCLS, getFID, getFCP, getLCP, getTTFB } from 'web-vitals';

function sendToAnalytics(metric) {
  // Send metrics to your analytics service
  console.log(metric);
}

getCLS(sendToAnalytics);
getFID(sendToAnalytics);
getFCP(sendToAnalytics);
getLCP(sendToAnalytics);
getTTFB(sendToAnalytics);
"#
}

/// Angular-style bundle budgets plus the caller's metric thresholds
pub fn performance_budget(thresholds: &Map<String, Value>) -> Value {
    json!({
        "budget": [
            { "type": "bundle", "maximumWarning": "500kb", "maximumError": "1mb" },
            { "type": "initial", "maximumWarning": "300kb", "maximumError": "500kb" },
        ],
        "thresholds": thresholds,
    })
}

/// Headless Lighthouse run against `url`
pub fn performance_monitor_script(url: &str) -> String {
    format!(
        r#"#!/usr/bin/env node
// Performance monitoring script generated by Spartacus MCP

const lighthouse = require('lighthouse');
const chromeLauncher = require('chrome-launcher');

async function runPerformanceTests() {{
  const chrome = await chromeLauncher.launch({{ chromeFlags: ['--headless'] }});
  const options = {{ logLevel: 'info', output: 'html', onlyCategories: ['performance'], port: chrome.port }};
  const runnerResult = await lighthouse('{url}', options);

  console.log('Performance test completed!');
  console.log('Performance score:', runnerResult.lhr.categories.performance.score * 100);

  await chrome.kill();
}}

runPerformanceTests().catch(console.error);
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages() -> Vec<String> {
        vec!["build".into(), "test".into(), "lint".into()]
    }

    #[test]
    fn test_github_jobs_chain() {
        let yml = github_workflow(&stages(), "18");
        assert!(yml.contains("  build:\n    runs-on: ubuntu-latest\n    steps:"));
        assert!(yml.contains("  test:\n    runs-on: ubuntu-latest\n    needs: build\n"));
        assert!(yml.contains("- run: npm run test:ci"));
        assert!(yml.contains("node-version: '18'"));
    }

    #[test]
    fn test_gitlab_stages_listed() {
        let yml = gitlab_ci(&stages(), "20");
        assert!(yml.starts_with("stages:\n  - build\n  - test\n  - lint\n"));
        assert!(yml.contains("image: node:20"));
        assert!(yml.contains("      - dist/"));
    }

    #[test]
    fn test_jenkins_and_azure_capitalize() {
        assert!(jenkinsfile(&stages(), "18").contains("stage('Lint')"));
        assert!(azure_pipeline(&stages(), "18").contains("- stage: Test"));
    }

    #[test]
    fn test_environment_config() {
        let prod = environment_config("production");
        assert!(prod.contains("ENABLE_ANALYTICS=true"));
        assert!(prod.contains("LOG_LEVEL=error"));
        assert!(environment_config("staging").contains("LOG_LEVEL=debug"));
    }

    #[test]
    fn test_deploy_script_targets() {
        let sh = deploy_script(&["eu-west".into()]);
        assert!(sh.starts_with("#!/bin/bash\n"));
        assert!(sh.contains("echo \"Deploying to eu-west...\""));
    }

    #[test]
    fn test_dockerfile_variants() {
        let nginx = DockerOptions {
            base_image: "node:18-alpine",
            environment: "production",
            include_nginx: true,
            multi_stage: true,
        };
        let df = dockerfile(&nginx);
        assert!(df.contains("FROM node:18-alpine AS builder"));
        assert!(df.contains("FROM nginx:alpine AS runtime"));
        assert!(docker_compose(&nginx).contains("\"4200:80\""));

        let single = DockerOptions {
            multi_stage: false,
            include_nginx: false,
            ..nginx
        };
        let df = dockerfile(&single);
        assert!(!df.contains("AS builder"));
        assert!(docker_compose(&single).contains("\"4200:4200\""));
    }

    #[test]
    fn test_performance_budget_carries_thresholds() {
        let mut thresholds = Map::new();
        thresholds.insert("lcp".into(), json!(2500));
        let budget = performance_budget(&thresholds);
        assert_eq!(budget["budget"][0]["maximumError"], "1mb");
        assert_eq!(budget["budget"][1]["type"], "initial");
        assert_eq!(budget["thresholds"]["lcp"], 2500);
    }

    #[test]
    fn test_monitor_script_targets_url() {
        let script = performance_monitor_script("http://localhost:4200");
        assert!(script.starts_with("#!/usr/bin/env node\n"));
        assert!(script.contains("lighthouse('http://localhost:4200', options)"));
        assert!(script.contains("chromeFlags: ['--headless']"));
    }
}
