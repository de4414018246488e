//! Built-in rule and plugin sets.

use crate::{BareTry, LineLength, LongFile, MissingFunctionDocstring, MissingModuleDocstring};
use codemark_core::{
    Analyzer, AnalyzerBuilder, Config, LineRuleBox, PluginBox, PluginRegistry, RuleBox,
};

/// Structural rules in evaluation order.
#[must_use]
pub fn builtin_rules() -> Vec<RuleBox> {
    vec![
        Box::new(MissingModuleDocstring::new()),
        Box::new(MissingFunctionDocstring::new()),
        Box::new(BareTry::new()),
    ]
}

/// Line rules in evaluation order.
#[must_use]
pub fn builtin_line_rules() -> Vec<LineRuleBox> {
    vec![Box::new(LineLength::new())]
}

/// Statically linked plugins.
#[must_use]
pub fn builtin_plugins() -> Vec<PluginBox> {
    vec![Box::new(LongFile::new())]
}

/// Returns an analyzer builder with every built-in rule, the suggestion
/// table, and the plugins enabled by `config`.
#[must_use]
pub fn analyzer_builder(config: &Config) -> AnalyzerBuilder {
    let builder = Analyzer::builder()
        .config(config.clone())
        .plugins(PluginRegistry::from_config(config, builtin_plugins()))
        .suggestions(crate::suggestion_for);
    let builder = builtin_rules().into_iter().fold(builder, AnalyzerBuilder::rule_box);
    builtin_line_rules()
        .into_iter()
        .fold(builder, AnalyzerBuilder::line_rule_box)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes() {
        let codes: Vec<_> = builtin_rules().iter().map(|r| r.code()).collect();
        assert_eq!(codes, ["MissingDocstring", "MissingDocstring", "BareTry"]);
        let codes: Vec<_> = builtin_line_rules().iter().map(|r| r.code()).collect();
        assert_eq!(codes, ["LineLength"]);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = builtin_rules().iter().map(|r| r.name()).collect();
        names.extend(builtin_line_rules().iter().map(|r| r.name()));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_analyzer_builder_registers_everything() {
        let analyzer = analyzer_builder(&Config::default()).build().unwrap();
        assert_eq!(analyzer.rule_count(), 4);
        assert!(analyzer.plugins().is_empty());

        let mut config = Config::default();
        config.plugins.builtin = Some(vec!["long-file".to_string()]);
        let analyzer = analyzer_builder(&config).build().unwrap();
        assert_eq!(analyzer.plugins().len(), 1);
    }
}
