use std::path::Path;

use rayon::prelude::*;

use crate::{
    ast::Expr,
    engine::{context::Context, lexer::tokenize, parser::parse, registry::FunctionRegistry, value::Value},
    error::ParseError,
};

/// A named predicate to be evaluated against targets.
///
/// The expression is the rule body as text; where it came from (a YAML
/// document, a CLI flag, a file) is the loader's business, not the
/// engine's.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identifier reported with every outcome.
    pub id:         String,
    /// The predicate source text.
    pub expression: String,
}

impl Rule {
    /// Creates a rule from an identifier and a predicate expression.
    #[must_use]
    pub fn new(id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self { id:         id.into(),
               expression: expression.into(), }
    }

    /// Parses the rule once so the AST can be reused across many targets.
    ///
    /// # Errors
    /// Returns the `ParseError` if the expression is not well-formed; the
    /// caller records it as a rule-execution error rather than skipping
    /// the rule silently.
    pub fn compile(&self) -> Result<CompiledRule, ParseError> {
        let ast = parse(&tokenize(&self.expression))?;
        Ok(CompiledRule { id: self.id.clone(),
                          ast })
    }
}

/// A rule with its expression parsed; immutable and reusable across any
/// number of evaluations, including concurrent ones.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    id:  String,
    ast: Expr,
}

impl CompiledRule {
    /// Gets the rule identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Evaluates this rule against one target path.
    ///
    /// A fresh root context is created, seeded with `target` (the path
    /// under test) and `target_dir` (its parent directory, or the path
    /// itself for directories). The result maps onto an outcome:
    /// `true` is a pass, `false` a violation, a non-boolean a
    /// configuration error (the rule did not express a predicate), and an
    /// evaluation error a rule-execution error. Nothing here can abort
    /// the surrounding run.
    #[must_use]
    pub fn evaluate(&self, registry: &FunctionRegistry, target: &str) -> RuleOutcome {
        let path = Path::new(target);
        let target_dir = if path.is_dir() {
            target.to_string()
        } else {
            path.parent()
                .map_or_else(String::new, |p| p.display().to_string())
        };

        let mut ctx = Context::new(registry);
        ctx.bind("target", Value::Str(target.to_string()));
        ctx.bind("target_dir", Value::Str(target_dir));

        match ctx.eval(&self.ast) {
            Ok(Value::Bool(true)) => RuleOutcome::Pass,
            Ok(Value::Bool(false)) => {
                RuleOutcome::Violation(Violation { rule_id: self.id.clone(),
                                                   target:  target.to_string(),
                                                   message: format!("rule '{}' failed for '{target}'",
                                                                    self.id), })
            },
            Ok(other) => RuleOutcome::NotAPredicate { rule_id: self.id.clone(),
                                                      target:  target.to_string(),
                                                      found:   other.kind().to_string(), },
            Err(error) => RuleOutcome::ExecutionError { rule_id: self.id.clone(),
                                                        target:  target.to_string(),
                                                        message: error.to_string(), },
        }
    }
}

/// The structured record produced when a rule's predicate evaluates to
/// `false` against a specific target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Identifier of the violated rule.
    pub rule_id: String,
    /// The target the rule was evaluated against.
    pub target:  String,
    /// Human-readable description.
    pub message: String,
}

/// One (rule, target) evaluation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The predicate evaluated to `true`.
    Pass,
    /// The predicate evaluated to `false`.
    Violation(Violation),
    /// The rule failed to evaluate; an engine-level fault, reported in its
    /// own category so it can never be mistaken for compliance.
    ExecutionError {
        /// Identifier of the failing rule.
        rule_id: String,
        /// The target being checked when the rule failed.
        target:  String,
        /// The rendered parse or evaluation diagnostic.
        message: String,
    },
    /// The rule produced a non-boolean top-level value: a configuration
    /// error in the rule itself.
    NotAPredicate {
        /// Identifier of the misconfigured rule.
        rule_id: String,
        /// The target being checked.
        target:  String,
        /// The kind the rule produced instead of a boolean.
        found:   String,
    },
}

/// Aggregated results of one validation run.
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// Number of (rule, target) pairs that passed.
    pub passed:     usize,
    /// Violations, in deterministic (rule, target) order.
    pub violations: Vec<Violation>,
    /// Rule-execution and configuration errors, rendered.
    pub errors:     Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no violation and no error was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.errors.is_empty()
    }

    fn record(&mut self, outcome: RuleOutcome) {
        match outcome {
            RuleOutcome::Pass => self.passed += 1,
            RuleOutcome::Violation(violation) => self.violations.push(violation),
            RuleOutcome::ExecutionError { rule_id,
                                          target,
                                          message, } => {
                self.errors
                    .push(format!("rule '{rule_id}' could not be evaluated for '{target}': {message}"));
            },
            RuleOutcome::NotAPredicate { rule_id, target, found } => {
                self.errors.push(format!(
                    "rule '{rule_id}' produced {found} instead of a Boolean for '{target}'"
                ));
            },
        }
    }
}

/// Evaluates every rule against every target on a worker pool.
///
/// Each (rule, target) pair is independent: workers share only the
/// read-only registry and the immutable compiled rules, and each
/// evaluation builds its own context chain, so no synchronization beyond
/// collecting the results is needed. Pairs are evaluated in parallel but
/// recorded in deterministic (rule, target) order. One rule's failure
/// never prevents evaluation of the others.
#[must_use]
pub fn validate_all(rules: &[CompiledRule],
                    targets: &[String],
                    registry: &FunctionRegistry)
                    -> ValidationReport {
    let pairs: Vec<(&CompiledRule, &String)> = rules.iter()
                                                    .flat_map(|rule| {
                                                        targets.iter().map(move |t| (rule, t))
                                                    })
                                                    .collect();

    log::debug!("validating {} rules against {} targets", rules.len(), targets.len());

    let outcomes: Vec<RuleOutcome> = pairs.par_iter()
                                          .map(|(rule, target)| rule.evaluate(registry, target))
                                          .collect();

    let mut report = ValidationReport::default();
    for outcome in outcomes {
        report.record(outcome);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(id: &str, expression: &str) -> CompiledRule {
        Rule::new(id, expression).compile().expect("rule should parse")
    }

    #[test]
    fn outcomes_map_results_onto_categories() {
        let registry = FunctionRegistry::with_builtins();

        let pass = compiled("always-pass", "1 < 2");
        let fail = compiled("always-fail", "1 > 2");
        let broken = compiled("undefined-var", "missing == 1");
        let nonsense = compiled("not-a-predicate", "1 + 1");

        assert_eq!(pass.evaluate(&registry, "x"), RuleOutcome::Pass);
        assert!(matches!(fail.evaluate(&registry, "x"), RuleOutcome::Violation(_)));
        assert!(matches!(broken.evaluate(&registry, "x"),
                         RuleOutcome::ExecutionError { .. }));
        assert!(matches!(nonsense.evaluate(&registry, "x"),
                         RuleOutcome::NotAPredicate { .. }));
    }

    #[test]
    fn one_broken_rule_never_stops_the_run() {
        let registry = FunctionRegistry::with_builtins();
        let rules = vec![compiled("broken", "no.such_function()"),
                         compiled("fine", "string.length($target) > 0")];
        let targets = vec!["a.rs".to_string(), "b.rs".to_string()];

        let report = validate_all(&rules, &targets, &registry);

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.passed, 2);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn targets_are_seeded_into_the_root_context() {
        let registry = FunctionRegistry::with_builtins();
        let rule = compiled("ends-with-rs", "string.ends_with($target, \".rs\")");

        assert_eq!(rule.evaluate(&registry, "src/lib.rs"), RuleOutcome::Pass);
        assert!(matches!(rule.evaluate(&registry, "src/lib.cpp"),
                         RuleOutcome::Violation(_)));
    }
}
