//! Integration tests for the constraints and inspect commands.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_schema-mapper")
        .unwrap_or_else(|_| "target/debug/schema-mapper".to_string())
}

fn create_test_schema(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("app.sql");
    fs::write(
        &path,
        r#"
CREATE TABLE users (
  id INT PRIMARY KEY,
  email VARCHAR(255)
);

CREATE TABLE posts (
  id INT PRIMARY KEY,
  user_id INT,
  title VARCHAR(255)
);

CREATE TABLE comments (
  id INT PRIMARY KEY,
  post_id INT,
  user_id INT
);
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_constraints_alter_script() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = Command::new(get_binary_path())
        .args(["constraints", schema.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let sql = String::from_utf8_lossy(&output.stdout);

    assert!(sql.starts_with("BEGIN;"));
    assert!(sql.trim_end().ends_with("COMMIT;"));
    assert!(sql.contains(
        "ALTER TABLE posts ADD CONSTRAINT fk_posts_users FOREIGN KEY (user_id) REFERENCES users(id);"
    ));
    assert!(sql.contains("ALTER TABLE comments ADD CONSTRAINT fk_comments_posts"));
    assert!(sql.contains("ALTER TABLE comments ADD CONSTRAINT fk_comments_users"));
}

#[test]
fn test_constraints_inline_clauses() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = Command::new(get_binary_path())
        .args(["constraints", schema.to_str().unwrap(), "--inline"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let sql = String::from_utf8_lossy(&output.stdout);

    assert!(!sql.contains("ALTER TABLE"));
    assert!(sql.contains("-- posts"));
    assert!(sql.contains("FOREIGN KEY (user_id) REFERENCES users (id)"));
}

#[test]
fn test_constraints_output_file() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);
    let out = dir.path().join("constraints.sql");

    let status = Command::new(get_binary_path())
        .args([
            "constraints",
            schema.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .status()
        .unwrap();

    assert!(status.success());
    let sql = fs::read_to_string(&out).unwrap();
    assert!(sql.contains("ALTER TABLE posts"));
}

#[test]
fn test_constraints_nothing_to_synthesize() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.sql");
    fs::write(&path, "CREATE TABLE standalone (id INT PRIMARY KEY);").unwrap();

    let output = Command::new(get_binary_path())
        .args(["constraints", path.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No relationships"));
}

#[test]
fn test_inspect_summary() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = Command::new(get_binary_path())
        .args(["inspect", schema.to_str().unwrap(), "--assume"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);

    assert!(text.contains("Found 3 table(s)"));
    assert!(text.contains("users"));
    assert!(text.contains("posts"));
    assert!(text.contains("comments"));
    assert!(text.contains("TOTAL"));
}

#[test]
fn test_completions_generate() {
    let output = Command::new(get_binary_path())
        .args(["completions", "bash"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains("schema-mapper"));
}
