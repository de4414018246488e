//! List rules command implementation.

use codemark_rules::{builtin_line_rules, builtin_plugins, builtin_rules};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<18} {:<28} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in builtin_rules() {
        println!("{:<18} {:<28} {}", rule.code(), rule.name(), rule.description());
    }
    for rule in builtin_line_rules() {
        println!("{:<18} {:<28} {}", rule.code(), rule.name(), rule.description());
    }

    println!("\nBuilt-in plugins:\n");
    for plugin in builtin_plugins() {
        println!("  {:<26} {}", plugin.name(), plugin.description());
    }

    println!("\nSuppress codes with ignore_rules, e.g.:");
    println!("  ignore_rules = [\"LineLength\", \"BareTry\"]");
}
