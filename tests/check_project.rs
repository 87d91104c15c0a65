use apexcheck::check::{check_path, check_project, exit_status};
use apexcheck::factory::create_parser;
use apexcheck::models::Status;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = fs::File::create(path).unwrap();
    writeln!(f, "{}", body).unwrap();
}

const DEFAULT: [&str; 0] = [];

fn sample_project(root: &Path) {
    write(
        &root.join("sfdx-project.json"),
        r#"{
  "packageDirectories": [
    { "path": "force-app", "default": true },
    { "path": "unpackaged" }
  ],
  "namespace": "",
  "sourceApiVersion": "59.0"
}"#,
    );
    write(
        &root.join("force-app/main/default/classes/AccountService.cls"),
        r#"public with sharing class AccountService {
    public static List<Account> recent(Integer n) {
        return [SELECT Id, Name FROM Account ORDER BY CreatedDate DESC LIMIT :n];
    }
}"#,
    );
    write(
        &root.join("force-app/main/default/classes/Broken.cls"),
        "public class Broken {\n    Integer x = 1\n}",
    );
    write(
        &root.join("force-app/main/default/triggers/AccountTrigger.trigger"),
        "trigger AccountTrigger on Account (before insert, after update) {\n    for (Account a : Trigger.new) { a.Name = a.Name?.trim(); }\n}",
    );
}

#[test]
fn project_with_missing_package_folds_to_missing() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let results = check_project(dir.path(), &DEFAULT);
    assert_eq!(results.len(), 2);

    let present = &results[0];
    assert_eq!(present.pkg.as_deref(), Some("force-app"));
    assert_eq!(present.result.status, Status::Clean);
    assert_eq!(present.result.errors.len(), 1);
    let err = &present.result.errors[0];
    assert_eq!(err.path, "main/default/classes/Broken.cls");
    assert_eq!(err.line, 3);
    assert_eq!(err.message, "missing ';' at '}'");

    assert_eq!(results[1].result.status, Status::Missing);
    assert!(results[1].result.errors.is_empty());
    assert_eq!(exit_status(&results), 2);
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    let first = check_project(dir.path(), &DEFAULT);
    let second = check_project(dir.path(), &DEFAULT);
    assert_eq!(first, second);
}

#[test]
fn unknown_extension_aborts_the_run() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    let results = check_project(dir.path(), &["cls", "js"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result.status, Status::Failed);
    assert!(results[0].result.errors.is_empty());
    assert_eq!(exit_status(&results), 1);
}

#[test]
fn anonymous_scripts_are_checked_on_request() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("scripts/apex/hello.apex"),
        "String s = 'hello';\nSystem.debug(s);\ninsert new Account(Name = s);",
    );
    write(&dir.path().join("scripts/apex/bad.apex"), "System.debug(;");

    let r = check_path(dir.path(), &["apex"]);
    assert_eq!(r.status, Status::Clean);
    assert_eq!(r.extensions, vec![".apex"]);
    assert_eq!(r.errors.len(), 1);
    assert_eq!(r.errors[0].path, "scripts/apex/bad.apex");
}

#[test]
fn fail_fast_and_collect_all_statements() {
    let mut parser = create_parser("public class Hello {", true).unwrap();
    assert_eq!(parser.compilation_unit().unwrap_err().line, 1);

    let mut parser = create_parser("if (x == 3); else { ; }", false).unwrap();
    parser.statement().unwrap();
    assert_eq!(parser.syntax_error_count(), 1);

    let mut parser = create_parser("while (x++ < 10);", false).unwrap();
    parser.statement().unwrap();
    assert_eq!(parser.syntax_error_count(), 0);
}

#[test]
fn deeply_nested_source_is_checked_on_a_worker_thread() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("sfdx-project.json"),
        r#"{ "packageDirectories": [{ "path": "a" }, { "path": "b" }] }"#,
    );
    let depth = 3000;
    let body = format!(
        "public class Deep {{ Integer x = {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    write(&root.join("a/Deep.cls"), &body);
    write(&root.join("b/Ok.cls"), "public class Ok { }");

    let results = check_project(root, &DEFAULT);
    let statuses: Vec<Status> = results.iter().map(|r| r.result.status).collect();
    assert_eq!(statuses, vec![Status::Clean, Status::Clean]);
    assert!(results.iter().all(|r| r.result.errors.is_empty()));
}
