//! Engine that dispatches compilation units to rules and aggregates diagnostics.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::context::FileContext;
use crate::model::{CompilationUnit, SourceModel};
use crate::rule::{Rule, RuleBox, RuleError, Trigger};
use crate::semantic::{Symbol, SymbolKind};
use crate::syntax::{NodeRef, SyntaxKind};
use crate::types::{Diagnostic, LintResult, Severity};

/// Errors that abort a run.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EngineError {
    /// A rule reported a source model contract violation.
    #[error("rule {rule} failed on {}: {source}", file.display())]
    #[diagnostic(
        code(spy_lint::rule_failed),
        help("the source model does not satisfy the shape this rule relies on")
    )]
    Rule {
        /// Code of the failing rule.
        rule: String,
        /// File being analyzed.
        file: PathBuf,
        /// Underlying rule error.
        #[source]
        source: RuleError,
    },

    /// Two registered rules share a code.
    #[error("rule code {0} is registered more than once")]
    #[diagnostic(code(spy_lint::duplicate_rule))]
    DuplicateRule(String),

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    #[diagnostic(code(spy_lint::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    parallelism: Option<usize>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the engine.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the engine.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Runs the engine inside a dedicated pool of `threads` workers.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share a code or the worker pool
    /// cannot be created.
    pub fn build(self) -> Result<Engine, EngineError> {
        let config = self.config.unwrap_or_default();

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in self.rules {
            if !seen.insert(rule.code()) {
                return Err(EngineError::DuplicateRule(rule.code().to_string()));
            }
            if !config.is_rule_enabled(rule.name(), rule.code()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            rules.push(rule);
        }

        let severities = rules
            .iter()
            .map(|r| config.rule_severity(r.name(), r.code()))
            .collect();
        let dispatch = Dispatch::index(&rules);

        let pool = match self.parallelism.or(config.engine.parallelism) {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("spy-lint-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(Engine {
            rules,
            severities,
            dispatch,
            pool,
        })
    }
}

/// Rule indices grouped by trigger.
#[derive(Debug, Default)]
struct Dispatch {
    file: Vec<usize>,
    nodes: HashMap<SyntaxKind, Vec<usize>>,
    symbols: HashMap<SymbolKind, Vec<usize>>,
}

impl Dispatch {
    fn index(rules: &[RuleBox]) -> Self {
        let mut dispatch = Self::default();
        for (i, rule) in rules.iter().enumerate() {
            for trigger in rule.triggers() {
                let slot = match *trigger {
                    Trigger::File => &mut dispatch.file,
                    Trigger::Node(kind) => dispatch.nodes.entry(kind).or_default(),
                    Trigger::Symbol(kind) => dispatch.symbols.entry(kind).or_default(),
                };
                if !slot.contains(&i) {
                    slot.push(i);
                }
            }
        }
        dispatch
    }
}

/// One (rule, input) evaluation inside a compilation unit.
enum Job<'a> {
    File(usize),
    Node(usize, NodeRef<'a>),
    Symbol(usize, &'a Symbol),
}

impl Job<'_> {
    fn rule_index(&self) -> usize {
        match *self {
            Self::File(i) | Self::Node(i, _) | Self::Symbol(i, _) => i,
        }
    }
}

/// Dispatches source models to registered rules.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    rules: Vec<RuleBox>,
    severities: Vec<Option<Severity>>,
    dispatch: Dispatch,
    pool: Option<rayon::ThreadPool>,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of enabled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Enabled rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Runs every enabled rule over every compilation unit.
    ///
    /// Diagnostics are returned in discovery order: unit order, then file
    /// rules, node rules in pre-order, and symbol rules in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if any rule reports a source model contract violation.
    pub fn run(&self, model: &SourceModel) -> Result<LintResult, EngineError> {
        info!(
            "Starting run over {} compilation unit(s) with {} rule(s)",
            model.units.len(),
            self.rules.len()
        );

        let run = || -> Result<Vec<Vec<Diagnostic>>, EngineError> {
            model
                .units
                .par_iter()
                .filter(|unit| !unit.generated)
                .map(|unit| self.analyze_unit(unit))
                .collect()
        };
        for unit in model.units.iter().filter(|u| u.generated) {
            debug!("Skipping generated code: {}", unit.display_path().display());
        }
        let per_unit = match &self.pool {
            Some(pool) => pool.install(run)?,
            None => run()?,
        };

        let result = LintResult {
            diagnostics: per_unit.into_iter().flatten().collect(),
            files_checked: model.units.iter().filter(|u| !u.generated).count(),
        };

        info!(
            "Run complete: {} diagnostic(s) in {} file(s)",
            result.diagnostics.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn analyze_unit(&self, unit: &CompilationUnit) -> Result<Vec<Diagnostic>, EngineError> {
        let ctx = FileContext::new(unit);
        debug!("Analyzing: {}", ctx.path.display());

        let jobs = self.collect_jobs(&ctx);
        let per_job: Vec<Vec<Diagnostic>> = jobs
            .par_iter()
            .map(|job| self.evaluate(&ctx, job))
            .collect::<Result<_, _>>()?;

        Ok(per_job.into_iter().flatten().collect())
    }

    fn collect_jobs<'a>(&self, ctx: &FileContext<'a>) -> Vec<Job<'a>> {
        let mut jobs: Vec<Job<'a>> = self.dispatch.file.iter().map(|&i| Job::File(i)).collect();

        if !self.dispatch.nodes.is_empty() {
            for node in ctx.tree().descendants() {
                if let Some(indices) = self.dispatch.nodes.get(&node.kind()) {
                    jobs.extend(indices.iter().map(|&i| Job::Node(i, node)));
                }
            }
        }

        if !self.dispatch.symbols.is_empty() {
            for (_, symbol) in ctx.semantic().declared_symbols() {
                if let Some(indices) = self.dispatch.symbols.get(&symbol.kind) {
                    jobs.extend(indices.iter().map(|&i| Job::Symbol(i, symbol)));
                }
            }
        }

        jobs
    }

    fn evaluate(&self, ctx: &FileContext<'_>, job: &Job<'_>) -> Result<Vec<Diagnostic>, EngineError> {
        let index = job.rule_index();
        let rule = &self.rules[index];

        let outcome = match *job {
            Job::File(_) => rule.check_file(ctx),
            Job::Node(_, node) => rule.check_node(ctx, node),
            Job::Symbol(_, symbol) => rule.check_symbol(ctx, symbol),
        };

        let mut diagnostics = outcome.map_err(|source| EngineError::Rule {
            rule: rule.code().to_string(),
            file: ctx.path.to_path_buf(),
            source,
        })?;

        if let Some(severity) = self.severities[index] {
            for d in &mut diagnostics {
                d.severity = severity;
            }
        }

        Ok(diagnostics)
    }
}
