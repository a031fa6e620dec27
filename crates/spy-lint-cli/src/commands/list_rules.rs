//! List rules command implementation.

use spy_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<26} {:<10} Description", "Code", "Name", "Category");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<8} {:<26} {:<10} {}",
            rule.code(),
            rule.name(),
            rule.descriptor().category,
            rule.description()
        );
    }

    println!("\nAll rules are enabled with severity 'error' unless configured otherwise.");
    println!("\nUse --rules to run a subset, e.g.:");
    println!("  spy-lint check model.json --rules SPY01,unconsumed-async-result");
}
