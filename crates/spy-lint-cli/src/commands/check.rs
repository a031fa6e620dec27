//! Check command implementation.

use anyhow::{Context, Result};
use spy_lint_core::{Config, Engine, LintResult, RuleBox, SourceModel};
use spy_lint_rules::{is_known_rule, rules_from_config};
use std::path::PathBuf;

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Arguments of the check command.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Source model files to analyze.
    pub models: Vec<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule codes or names to run.
    pub rules: Option<String>,
    /// Project root overriding the configured default.
    pub project_root: Option<PathBuf>,
}

/// Runs the check command.
///
/// Returns `false` when any diagnostic reaches the configured `fail_on` severity.
pub fn run(options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let config = config_resolver::load(source)?;
    let fail_on = config.fail_on();

    let mut result = analyze(options, config)?;
    result.sort();

    super::output::print(&result, options.format)?;

    Ok(!result.has_diagnostics_at(fail_on))
}

/// Loads the models and runs the selected rules over them.
fn analyze(options: &CheckOptions, config: Config) -> Result<LintResult> {
    let mut model = SourceModel::new();
    for path in &options.models {
        let loaded = SourceModel::from_file(path)
            .with_context(|| format!("Failed to load source model: {}", path.display()))?;
        tracing::debug!("Loaded {} unit(s) from {}", loaded.units.len(), path.display());
        model.extend(loaded);
    }

    let root = options
        .project_root
        .clone()
        .or_else(|| config.engine.project_root.clone());
    if let Some(root) = root {
        model.apply_default_project_root(&root);
    }

    let rules = select_rules(&config, options.rules.as_deref());
    let engine = Engine::builder()
        .rules(rules)
        .config(config)
        .build()
        .context("Failed to build engine")?;

    tracing::info!(
        "Analyzing {} unit(s) with {} rules",
        model.units.len(),
        engine.rule_count()
    );

    match engine.run(&model) {
        Ok(result) => Ok(result),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            anyhow::bail!("Analysis aborted")
        }
    }
}

fn select_rules(config: &Config, filter: Option<&str>) -> Vec<RuleBox> {
    let rules = rules_from_config(config);
    let Some(filter) = filter else {
        return rules;
    };

    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    for name in &wanted {
        if !is_known_rule(name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    rules
        .into_iter()
        .filter(|r| wanted.iter().any(|w| *w == r.code() || *w == r.name()))
        .collect()
}
