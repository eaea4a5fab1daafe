use std::fs;

use logica::{
    engine::{registry::FunctionRegistry, value::Value},
    evaluate_str,
    validate::{validate_all, Rule, RuleOutcome},
};
use tempfile::TempDir;

/// Builds a small fixture tree:
///
/// ```text
/// root/
///   src/main.cpp     (has a main function)
///   src/util.cpp
///   src/util.hpp
///   notes.txt
///   empty/
/// ```
fn fixture_tree() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let root = dir.path();

    fs::create_dir(root.join("src")).expect("mkdir src");
    fs::create_dir(root.join("empty")).expect("mkdir empty");
    fs::write(root.join("src/main.cpp"),
              "#include <cstdio>\n\nint main() {\n  return 0;\n}\n").expect("write main.cpp");
    fs::write(root.join("src/util.cpp"),
              "// helpers\nint twice(int x) {\n  return x * 2;\n}\n").expect("write util.cpp");
    fs::write(root.join("src/util.hpp"), "int twice(int x);\n").expect("write util.hpp");
    fs::write(root.join("notes.txt"), "not code\n").expect("write notes.txt");

    dir
}

fn eval_in(dir: &TempDir, source: &str) -> Value {
    let registry = FunctionRegistry::with_builtins();
    let bindings = vec![("root".to_string(),
                         Value::Str(dir.path().display().to_string()))];
    evaluate_str(source, &registry, bindings).expect("expression should evaluate")
}

#[test]
fn listing_and_reading_real_files() {
    let dir = fixture_tree();

    assert_eq!(eval_in(&dir,
                       "collection.count(filesystem.get_files_with_extension(string.concat($root, \"/src\"), \"cpp\"))"),
               Value::Int(2));
    assert_eq!(eval_in(&dir, "filesystem.is_directory(string.concat($root, \"/src\"))"),
               Value::Bool(true));
    assert_eq!(eval_in(&dir,
                       "string.contains(filesystem.read_file(string.concat($root, \"/notes.txt\")), \"not code\")"),
               Value::Bool(true));
}

#[test]
fn quantifying_over_an_empty_directory_is_vacuously_true() {
    let dir = fixture_tree();

    assert_eq!(eval_in(&dir,
                       "forall f in filesystem.get_files(string.concat($root, \"/empty\")): string.length(f) > 0"),
               Value::Bool(true));
}

#[test]
fn source_heuristics_against_real_files() {
    let dir = fixture_tree();

    assert_eq!(eval_in(&dir,
                       "source.has_main(filesystem.read_file(string.concat($root, \"/src/main.cpp\")))"),
               Value::Bool(true));
    assert_eq!(eval_in(&dir,
                       "source.has_main(filesystem.read_file(string.concat($root, \"/src/util.cpp\")))"),
               Value::Bool(false));
    // `// helpers` is stripped, so util.cpp counts three code lines.
    assert_eq!(eval_in(&dir,
                       "source.line_count(filesystem.read_file(string.concat($root, \"/src/util.cpp\")))"),
               Value::Int(3));
}

#[test]
fn every_source_file_rule_against_the_tree() {
    let dir = fixture_tree();

    // All C++ files in src/ must be non-empty.
    let expr = format!("forall f in filesystem.get_files_with_extension(\"{}\", \"cpp\"): \
                        string.length(filesystem.read_file(f)) > 0",
                       dir.path().join("src").display());
    let registry = FunctionRegistry::with_builtins();
    assert_eq!(evaluate_str(&expr, &registry, Vec::new()), Ok(Value::Bool(true)));
}

#[test]
fn parallel_validation_aggregates_per_pair_outcomes() {
    let dir = fixture_tree();
    let registry = FunctionRegistry::with_builtins();

    let rules = vec![
        Rule::new("target-is-named", "string.length($target) > 0").compile().expect("parse"),
        Rule::new("no-cpp-targets", "!filesystem.has_extension($target, \"cpp\")").compile()
                                                                                  .expect("parse"),
    ];
    let targets: Vec<String> = ["src/main.cpp", "src/util.hpp", "notes.txt"]
        .iter()
        .map(|p| dir.path().join(p).display().to_string())
        .collect();

    let report = validate_all(&rules, &targets, &registry);

    // First rule passes everywhere; second flags only the .cpp file.
    assert_eq!(report.passed, 5);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule_id, "no-cpp-targets");
    assert!(report.violations[0].target.ends_with("main.cpp"));
    assert!(report.errors.is_empty());
    assert!(!report.is_clean());
}

#[test]
fn broken_rules_surface_as_errors_not_passes() {
    let registry = FunctionRegistry::with_builtins();

    let rules = vec![
        Rule::new("bad-call", "no.such_function($target)").compile().expect("parse"),
        Rule::new("not-a-predicate", "1 + 1").compile().expect("parse"),
        Rule::new("fine", "true").compile().expect("parse"),
    ];
    let targets = vec!["a".to_string()];

    let report = validate_all(&rules, &targets, &registry);

    assert_eq!(report.passed, 1);
    assert!(report.violations.is_empty());
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().any(|e| e.contains("bad-call")));
    assert!(report.errors.iter().any(|e| e.contains("not-a-predicate")));
}

#[test]
fn unparseable_rules_are_reported_at_compile_time() {
    let error = Rule::new("syntax", "forall x in : true").compile();
    assert!(error.is_err());
}

#[test]
fn rule_outcomes_are_deterministic_across_repeated_runs() {
    let dir = fixture_tree();
    let registry = FunctionRegistry::with_builtins();

    let rules = vec![Rule::new("has-sources",
                               "exists f in filesystem.get_files_recursive($target): \
                                filesystem.has_extension(f, \"cpp\")").compile()
                                                                      .expect("parse")];
    let targets = vec![dir.path().display().to_string()];

    let first = validate_all(&rules, &targets, &registry);
    let second = validate_all(&rules, &targets, &registry);

    assert_eq!(first.passed, second.passed);
    assert_eq!(first.violations, second.violations);
    assert_eq!(first.passed, 1);
}

#[test]
fn rule_outcome_categories_are_distinct() {
    let registry = FunctionRegistry::with_builtins();

    let violation = Rule::new("v", "false").compile().expect("parse");
    match violation.evaluate(&registry, "some/file.rs") {
        RuleOutcome::Violation(v) => {
            assert_eq!(v.rule_id, "v");
            assert_eq!(v.target, "some/file.rs");
        },
        other => panic!("expected a violation, got {other:?}"),
    }
}
