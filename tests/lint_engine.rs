//! Lint: engine code must not panic.
//!
//! Every failure of the progression engine is returned as a value, so
//! `.unwrap()`, `.expect(` and `panic!(` are only allowed inside test
//! modules. This test scans all `.rs` files under `src/` and flags those
//! calls in the part of each file that precedes its `#[cfg(test)] mod`.

use std::fs;
use std::path::Path;

const FORBIDDEN: &[&str] = &[".unwrap()", ".expect(", "panic!("];

/// Scan non-test code for panicking calls.
fn find_panicking_calls(source: &str) -> Vec<(usize, String)> {
    let mut violations = Vec::new();
    let lines: Vec<&str> = source.lines().collect();

    for (line_num_0, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        // Stop at the test module
        if trimmed == "#[cfg(test)]" {
            let next = lines[line_num_0 + 1..]
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty());
            if next.map_or(false, |l| l.starts_with("mod ")) {
                break;
            }
        }

        // Skip comments
        if trimmed.starts_with("//") {
            continue;
        }

        if FORBIDDEN.iter().any(|pat| line.contains(pat)) {
            violations.push((line_num_0 + 1, trimmed.to_string()));
        }
    }

    violations
}

#[test]
fn no_panicking_calls_outside_tests() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut all_violations = Vec::new();

    visit_source_files(&src_dir, &mut all_violations);

    if !all_violations.is_empty() {
        let mut msg = String::from(
            "Found panicking calls outside test modules.\n\
             Return an EngineError or ConfigError instead.\n\n",
        );
        for (file, line_num, line) in &all_violations {
            msg.push_str(&format!("  {}:{}: {}\n", file, line_num, line));
        }
        panic!("{}", msg);
    }
}

fn visit_source_files(dir: &Path, violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_source_files(&path, violations);
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            let Ok(source) = fs::read_to_string(&path) else {
                continue;
            };
            let display_path = path.display().to_string();
            for (line_num, line) in find_panicking_calls(&source) {
                violations.push((display_path.clone(), line_num, line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unwrap_in_engine_code() {
        let source = "fn f(x: Option<u32>) -> u32 {\n    x.unwrap()\n}\n";
        let violations = find_panicking_calls(source);
        assert_eq!(violations, vec![(2, "x.unwrap()".to_string())]);
    }

    #[test]
    fn allows_unwrap_or_variants() {
        let source = "let n = x.unwrap_or(0);\nlet m = y.unwrap_or_default();";
        assert!(find_panicking_calls(source).is_empty());
    }

    #[test]
    fn ignores_test_module() {
        let source = "fn f() {}\n\n#[cfg(test)]\nmod tests {\n    fn t() { Some(1).unwrap(); }\n}\n";
        assert!(find_panicking_calls(source).is_empty());
    }

    #[test]
    fn cfg_test_item_does_not_end_scan() {
        let source = "#[cfg(test)]\nuse std::fmt;\nfn f() { panic!(\"boom\"); }\n";
        assert_eq!(find_panicking_calls(source).len(), 1);
    }

    #[test]
    fn ignores_comments() {
        let source = "// never call .unwrap() here\n/// or .expect(\"x\")";
        assert!(find_panicking_calls(source).is_empty());
    }
}
