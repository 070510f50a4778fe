//! End-to-end tests running the `modhost` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn modhost(args: &[&str]) -> Output {
    let workdir = tempfile::tempdir().expect("tempdir");
    Command::new(env!("CARGO_BIN_EXE_modhost"))
        .args(args)
        .current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("modhost runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Shared library built from another workspace member. Both modules are
/// dev-dependencies, so cargo builds them before this test; the file may
/// carry a `-<hash>` suffix when built as a dependency.
fn built_module(crate_name: &str) -> PathBuf {
    let stem = format!(
        "{}{}",
        std::env::consts::DLL_PREFIX,
        crate_name.replace('-', "_")
    );
    let suffix = std::env::consts::DLL_SUFFIX;
    let bin_dir = Path::new(env!("CARGO_BIN_EXE_modhost"))
        .parent()
        .expect("binary directory");

    let matches = |path: &Path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(&stem))
            .and_then(|rest| rest.strip_suffix(suffix))
            .is_some_and(|hash| hash.is_empty() || hash.starts_with('-'))
    };

    [bin_dir.to_path_buf(), bin_dir.join("deps")]
        .iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && matches(path.as_path()))
        .max_by_key(|path| std::fs::metadata(path).and_then(|m| m.modified()).ok())
        .unwrap_or_else(|| panic!("{stem}{suffix} not built under {}", bin_dir.display()))
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = modhost(&[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
}

#[test]
fn test_create_without_module_prints_usage() {
    let output = modhost(&["create"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_call_with_one_argument_prints_usage() {
    let output = modhost(&["call", "./libmylib.so"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
    assert!(!stdout(&output).contains("Could not open library"));
}

#[test]
fn test_create_nonexistent_module() {
    let output = modhost(&["create", "/nonexistent/libfoo.so"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.starts_with("Could not open library /nonexistent/libfoo.so : "));
    assert!(!out.contains("creating a"));
}

#[test]
fn test_call_nonexistent_module() {
    let output = modhost(&["call", "/nonexistent/libmylib.so", "run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("Could not open library /nonexistent/libmylib.so : "));
}

#[cfg(target_os = "linux")]
#[test]
fn test_create_module_without_classname() {
    let output = modhost(&["create", "libc.so.6"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Could not find classname in libc.so.6\n");
}

#[cfg(target_os = "linux")]
#[test]
fn test_call_module_without_libname() {
    let output = modhost(&["call", "libc.so.6", "sync"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "Could not find library name in library libc.so.6\n"
    );
}

#[test]
fn test_scan_skips_invalid_modules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ext = std::env::consts::DLL_EXTENSION;
    std::fs::write(dir.path().join(format!("broken.{ext}")), b"not a module").expect("write");

    let dir_arg = dir.path().to_string_lossy().into_owned();
    let output = modhost(&["--format", "json", "scan", &dir_arg]);
    assert!(output.status.success());

    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&stdout(&output)).expect("json listing");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["file"], format!("broken.{ext}"));
    assert_eq!(rows[0]["variant"], "-");
    assert!(
        rows[0]["status"]
            .as_str()
            .is_some_and(|s| s.starts_with("Could not open library"))
    );
}

#[test]
fn test_scan_missing_directory() {
    let output = modhost(&["scan", "/nonexistent/plugins"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("/nonexistent/plugins does not exist"));
}

#[test]
fn test_create_foo_lifecycle_order() {
    let module = built_module("plugin-foo").to_string_lossy().into_owned();
    for _ in 0..3 {
        let output = modhost(&["create", &module]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        for step in ["making foo", "foo created", "foo tested", "foo destroyed"] {
            assert_eq!(out.matches(step).count(), 1, "{step} in {out}");
        }
        let lines: Vec<String> = out.lines().map(str::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "creating a \"foo Object\"...",
                "    making foo [plugin-foo - FooFactory::construct()]",
                "    foo created [plugin-foo - Foo::new()]",
                "    foo tested [plugin-foo - Foo::test()]",
                "    foo destroyed [plugin-foo - Foo::drop()]",
            ]
        );
    }
}

#[test]
fn test_call_mylib_run_and_missing() {
    let module = built_module("plugin-mylib").to_string_lossy().into_owned();

    let output = modhost(&["call", &module, "run"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Using library: MyLib\nran\n");

    let output = modhost(&["call", &module, "missing"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        format!("Using library: MyLib\nCould not find symbol missing in library {module}\n")
    );
}
