//! Output rendering for check results.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! one item per checked package and a top-level summary.

use crate::check::exit_status;
use crate::models::{Diagnostic, ProjectCheckResult, Status};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Diagnostic location as seen from the project root.
fn location(result: &ProjectCheckResult, d: &Diagnostic) -> String {
    let file = if result.path == "." {
        d.path.clone()
    } else {
        format!("{}/{}", result.path, d.path)
    };
    format!("{}:{}:{}", file, d.line, d.column)
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Clean => "ok",
        Status::Failed => "failed",
        Status::Missing => "missing",
    }
}

/// Print check results in the requested format.
pub fn print_results(results: &[ProjectCheckResult], output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_results_json(results)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("cannot render results: {}", e),
        },
        _ => {
            let color = use_colors(output);
            for r in results {
                for d in &r.result.errors {
                    let loc = location(r, d);
                    if color {
                        println!(
                            "{} {} {} — {}",
                            "✖".red(),
                            "⟦error⟧".red().bold(),
                            loc.bold(),
                            d.message
                        );
                    } else {
                        println!("✖ ⟦error⟧ {} — {}", loc, d.message);
                    }
                }
                let scope = match &r.pkg {
                    Some(pkg) => format!("[{}] {}", r.name, pkg),
                    None => format!("[{}]", r.name),
                };
                let line = format!(
                    "— {} — status={} errors={}",
                    scope,
                    status_label(r.result.status),
                    r.result.errors.len()
                );
                match (color, r.result.status) {
                    (false, _) => println!("{}", line),
                    (true, Status::Clean) if r.result.errors.is_empty() => {
                        println!("{}", line.green().bold())
                    }
                    (true, Status::Clean) => println!("{}", line.yellow().bold()),
                    (true, _) => println!("{}", line.red().bold()),
                }
            }
        }
    }
}

/// Results and a summary with the folded exit status.
pub fn compose_results_json(results: &[ProjectCheckResult]) -> JsonVal {
    let summary = json!({
        "status": exit_status(results),
        "errors": results.iter().map(|r| r.result.errors.len()).sum::<usize>(),
        "packages": results.len(),
    });
    json!({"results": results, "summary": summary})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckResult;

    fn result(path: &str, pkg: Option<&str>, status: Status, errors: usize) -> ProjectCheckResult {
        ProjectCheckResult {
            name: "proj".into(),
            path: path.into(),
            pkg: pkg.map(String::from),
            result: CheckResult {
                status,
                extensions: vec![".cls".into()],
                errors: (0..errors)
                    .map(|i| Diagnostic {
                        column: 1,
                        line: i + 1,
                        message: "missing ';' at '}'".into(),
                        path: "classes/A.cls".into(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_compose_results_json_shape() {
        let results = vec![
            result("force-app", Some("force-app"), Status::Clean, 2),
            result("gone", Some("gone"), Status::Missing, 0),
        ];
        let out = compose_results_json(&results);
        assert_eq!(out["summary"]["status"], 2);
        assert_eq!(out["summary"]["errors"], 2);
        assert_eq!(out["summary"]["packages"], 2);
        assert_eq!(out["results"][0]["pkg"], "force-app");
        assert_eq!(out["results"][0]["errors"][1]["line"], 2);
        assert_eq!(out["results"][1]["status"], 2);
    }

    #[test]
    fn test_location_is_project_relative() {
        let r = result("force-app", Some("force-app"), Status::Clean, 1);
        assert_eq!(location(&r, &r.result.errors[0]), "force-app/classes/A.cls:1:1");
        let whole = result(".", None, Status::Clean, 1);
        assert_eq!(location(&whole, &whole.result.errors[0]), "classes/A.cls:1:1");
    }

    #[test]
    fn test_json_mode_disables_colors() {
        assert!(!use_colors("json"));
    }
}
