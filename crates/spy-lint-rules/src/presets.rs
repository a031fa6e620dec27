//! Rule sets built from defaults or configuration.

use spy_lint_core::{Config, RuleBox};

use crate::{
    unconsumed_async_result, AsyncMethodNaming, NamespaceMatchesFolder, NoAllCapsIdSuffix,
    SingleTopLevelType, UnconsumedAsyncResult,
};

/// Returns all available rules with default options.
///
/// Includes:
/// - `single-top-level-type` (SPY01)
/// - `no-all-caps-id-suffix` (SPY02)
/// - `async-method-naming` (SPY03)
/// - `namespace-matches-folder` (SPY04)
/// - `unconsumed-async-result` (SPY05)
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SingleTopLevelType::new()),
        Box::new(NoAllCapsIdSuffix::new()),
        Box::new(AsyncMethodNaming::new()),
        Box::new(NamespaceMatchesFolder::new()),
        Box::new(UnconsumedAsyncResult::new()),
    ]
}

/// Returns all available rules with options taken from `config`.
///
/// Enabled flags and severities are applied by the engine, not here.
#[must_use]
pub fn rules_from_config(config: &Config) -> Vec<RuleBox> {
    let async_config =
        config.rule_config(unconsumed_async_result::NAME, unconsumed_async_result::CODE);
    vec![
        Box::new(SingleTopLevelType::new()),
        Box::new(NoAllCapsIdSuffix::new()),
        Box::new(AsyncMethodNaming::new()),
        Box::new(NamespaceMatchesFolder::new()),
        Box::new(UnconsumedAsyncResult::from_config(async_config)),
    ]
}

/// Returns true if `key` names a built-in rule by code or name.
#[must_use]
pub fn is_known_rule(key: &str) -> bool {
    all_rules()
        .iter()
        .any(|r| r.code() == key || r.name() == key)
}
