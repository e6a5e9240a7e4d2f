//! End-to-end analysis of small mixed Java/Python projects through the
//! public `Ripple` API.
//!
//! Project layout used by most tests:
//! ```text
//! src/com/app/BaseService.java   BaseService
//! src/com/app/UserService.java   UserService extends BaseService implements Auditable
//! app/helpers.py                 load() -> read_file()
//! app/main.py                    main() -> load(), render()
//! app/broken.py                  syntax error
//! ```

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use ripple::changes::{changed_items_from_diff, parse_unified_diff};
use ripple::{AnalysisConfig, Direction, Error, Ripple};
use tempfile::TempDir;

const BASE_SERVICE: &str = "package com.app;

public abstract class BaseService {
    public void start() {
    }
}
";

const USER_SERVICE: &str = "package com.app;

import com.app.models.User;

public class UserService extends BaseService implements Auditable {
    public User createUser(String name) {
        validate(name);
        return new User(name);
    }

    private void validate(String name) {
        check(name);
    }
}
";

const HELPERS: &str = "def load():
    return read_file()
";

const MAIN: &str = "from helpers import load

def main():
    data = load()
    return render(data)
";

const BROKEN: &str = "def broken(:
    pass
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dirs");
    }
    fs::write(path, content).expect("failed to write file");
}

#[fixture]
fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write(dir.path(), "src/com/app/BaseService.java", BASE_SERVICE);
    write(dir.path(), "src/com/app/UserService.java", USER_SERVICE);
    write(dir.path(), "app/helpers.py", HELPERS);
    write(dir.path(), "app/main.py", MAIN);
    write(dir.path(), "app/broken.py", BROKEN);
    dir
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[rstest]
fn analyze_collects_records_and_isolates_failures(project: TempDir) {
    let ripple = Ripple::new(project.path()).expect("open project");
    let analysis = ripple.analyze().expect("analyze");

    assert_eq!(analysis.records.len(), 5);
    assert_eq!(analysis.call_graphs.len(), 5);
    assert_eq!(analysis.errors.len(), 1);
    assert!(analysis.errors[0].path.ends_with("app/broken.py"));

    let broken = analysis
        .record(Path::new("app/broken.py"))
        .expect("broken file still has a record");
    assert!(broken.is_empty());
}

#[rstest]
fn inheritance_and_implementation_edges_are_recorded(project: TempDir) {
    let analysis = Ripple::new(project.path())
        .expect("open project")
        .analyze()
        .expect("analyze");
    let graph = &analysis.graph;

    assert!(graph.is_mirrored());
    assert!(graph.inheritance()["UserService"].contains("BaseService"));
    assert!(graph.implementations()["UserService"].contains("Auditable"));

    let main = analysis
        .record(Path::new("app/main.py"))
        .expect("main.py record");
    assert!(graph.dependencies()[&main.path].contains("helpers.load"));
}

#[rstest]
fn impact_traces_dependents_and_dependencies(project: TempDir) {
    let analysis = Ripple::new(project.path())
        .expect("open project")
        .analyze()
        .expect("analyze");

    let report = analysis.impact(&strings(&["BaseService", "UserService"]), 5);

    let upstream: Vec<&[String]> = report
        .chains("BaseService", Direction::Upstream)
        .iter()
        .map(|c| c.nodes())
        .collect();
    assert_eq!(upstream, vec![strings(&["BaseService", "UserService"])]);

    let downstream: Vec<&[String]> = report
        .chains("UserService", Direction::Downstream)
        .iter()
        .map(|c| c.nodes())
        .collect();
    assert_eq!(
        downstream,
        vec![
            strings(&["UserService", "Auditable"]),
            strings(&["UserService", "BaseService"]),
        ]
    );
    assert_eq!(report.total_affected, 3);
    assert!(report.unknown_roots.is_empty());
}

#[rstest]
fn call_graph_of_one_file_resolves_relative_paths(project: TempDir) {
    let ripple = Ripple::new(project.path()).expect("open project");
    let graph = ripple
        .call_graph(Path::new("src/com/app/UserService.java"))
        .expect("call graph");

    assert!(graph.function("createUser").is_some());
    assert!(graph.callees_of("createUser").is_some_and(|c| c.contains("validate")));
    assert_eq!(
        graph.call_chain("validate", 3),
        vec![strings(&["validate", "check"])]
    );
    assert_eq!(
        graph.reverse_call_chain("validate", 3),
        vec![strings(&["createUser", "validate"])]
    );
}

#[rstest]
fn unresolved_python_calls_end_their_chains(project: TempDir) {
    let ripple = Ripple::new(project.path()).expect("open project");
    let graph = ripple
        .call_graph(Path::new("app/main.py"))
        .expect("call graph");

    assert_eq!(graph.functions().len(), 1);
    assert_eq!(graph.entry_functions(), vec!["main"]);
    assert_eq!(graph.leaf_functions(), Vec::<&str>::new());
    assert_eq!(
        graph.call_chain("main", 3),
        vec![strings(&["main", "load"]), strings(&["main", "render"])]
    );
}

#[rstest]
fn merged_call_graph_links_functions_across_files(project: TempDir) {
    let analysis = Ripple::new(project.path())
        .expect("open project")
        .analyze()
        .expect("analyze");

    let merged = analysis.merged_call_graph();

    assert!(merged.is_mirrored());
    assert!(
        merged
            .call_chain("main", 5)
            .contains(&strings(&["main", "load", "read_file"]))
    );
}

#[rstest]
fn diff_maps_to_changed_declarations(project: TempDir) {
    let ripple = Ripple::new(project.path()).expect("open project");
    let analysis = ripple.analyze().expect("analyze");
    let patch = "\
diff --git a/src/com/app/UserService.java b/src/com/app/UserService.java
--- a/src/com/app/UserService.java
+++ b/src/com/app/UserService.java
@@ -11,3 +11,3 @@ public class UserService extends BaseService implements Auditable {
     private void validate(String name) {
-        check(name);
+        checkName(name);
     }
";

    let diffs = parse_unified_diff(patch);
    let items = changed_items_from_diff(&diffs, &analysis.records, ripple.config());

    assert!(items[0].ends_with("UserService.java"));
    assert!(items.contains(&"UserService".to_string()));
    assert!(items.contains(&"UserService.validate".to_string()));
}

#[rstest]
fn config_file_restricts_languages(project: TempDir) {
    write(project.path(), ".ripple.yaml", "languages: [python]\n");

    let ripple = Ripple::new(project.path()).expect("open project");
    let analysis = ripple.analyze().expect("analyze");

    assert_eq!(ripple.config().languages.len(), 1);
    assert_eq!(analysis.records.len(), 3);
    assert!(analysis.graph.inheritance().is_empty());
}

#[rstest]
fn invalid_config_is_rejected(project: TempDir) {
    let config = AnalysisConfig {
        report_chain_limit: 0,
        ..AnalysisConfig::default()
    };

    let err = Ripple::with_config(project.path(), config).expect_err("invalid config");
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn missing_root_fails_analysis() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let ripple = Ripple::with_config(&dir.path().join("absent"), AnalysisConfig::default())
        .expect("config is valid");

    assert!(matches!(ripple.analyze(), Err(Error::Config(_))));
}
