#![cfg(unix)]

use std::fs;
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the entrygate binary with a scrubbed environment so host settings
/// such as DATABASE_URL cannot leak into the test.
fn entrygate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_entrygate"))
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .args(args)
        .output()
        .expect("failed to run entrygate")
}

/// Runs the binary with the scrubbed environment plus `vars`.
fn entrygate_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_entrygate"))
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .envs(vars.iter().copied())
        .args(args)
        .output()
        .expect("failed to run entrygate")
}

/// A fake migration tool that appends each invocation's arguments to `log`
/// and the `DATABASE_URL` it was given to `log` with an `env` extension.
fn recording_tool(dir: &Path, log: &Path, exit_code: i32) -> PathBuf {
    let script = dir.join("fake-migrate");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\necho \"${{DATABASE_URL:-unset}}\" >> '{}'\nexit {}\n",
            log.display(),
            log.with_extension("env").display(),
            exit_code
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn test_full_sequence_execs_command_with_argv_intact() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let temp = TempDir::new().unwrap();
    let versions = temp.path().join("migrations/versions");
    let log = temp.path().join("migrate.log");
    let tool = recording_tool(temp.path(), &log, 0);

    let output = entrygate(&[
        "--db-host",
        "127.0.0.1",
        "--db-port",
        &port,
        "--wait-interval-ms",
        "50",
        "--migrations-dir",
        versions.to_str().unwrap(),
        "--migrate-program",
        tool.to_str().unwrap(),
        "--",
        "sh",
        "-c",
        "for a in \"$@\"; do printf '<%s>\\n' \"$a\"; done",
        "sh",
        "two words",
        "--flag",
        "",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<two words>\n<--flag>\n<>\n"
    );

    assert!(versions.is_dir());
    let calls = fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(
        calls,
        vec!["revision --autogenerate -m Initial migration", "upgrade head"]
    );
}

#[test]
fn test_failed_migration_aborts_before_exec() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("app-started");
    let log = temp.path().join("migrate.log");
    let tool = recording_tool(temp.path(), &log, 1);
    let versions = temp.path().join("versions");
    fs::create_dir_all(&versions).unwrap();
    fs::write(versions.join("0001_initial.py"), "").unwrap();

    let output = entrygate(&[
        "--skip-wait",
        "--migrations-dir",
        versions.to_str().unwrap(),
        "--migrate-program",
        tool.to_str().unwrap(),
        "--",
        "touch",
        marker.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!marker.exists(), "application must not start");
    assert_eq!(fs::read_to_string(&log).unwrap().trim(), "upgrade head");
}

#[test]
fn test_wait_timeout_exits_non_zero() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port().to_string()
    };

    let output = entrygate(&[
        "--db-host",
        "127.0.0.1",
        "--db-port",
        &port,
        "--wait-interval-ms",
        "100",
        "--wait-timeout-secs",
        "1",
        "--skip-migrations",
        "--",
        "true",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_required_env_exits_non_zero() {
    let output = entrygate(&[
        "--skip-wait",
        "--skip-migrations",
        "--require-env",
        "SECRET_KEY",
        "--",
        "true",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SECRET_KEY"));
}

#[test]
fn test_dry_run_prints_plan_without_running() {
    let temp = TempDir::new().unwrap();
    let versions = temp.path().join("versions");

    let output = entrygate(&[
        "--dry-run",
        "--database-url",
        "postgresql+asyncpg://app:hunter2@db:6543/app",
        "--migrations-dir",
        versions.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["wait"]["endpoint"]["host"], "db");
    assert_eq!(plan["wait"]["endpoint"]["port"], 6543);
    assert_eq!(plan["command"][0], "uvicorn");
    assert!(!plan.to_string().contains("hunter2"));
    assert!(!versions.exists(), "dry run must not touch the filesystem");
}

#[test]
fn test_config_file_supplies_command() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("entrygate.toml");
    fs::write(
        &config,
        "[wait]\nenabled = false\n\n[migrations]\nenabled = false\n\n[startup]\ncommand = [\"sh\", \"-c\", \"echo from-config\"]\n",
    )
    .unwrap();

    let output = entrygate(&["--config", config.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "from-config\n");
}

#[test]
fn test_migration_tool_sees_sync_database_url() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("migrate.log");
    let tool = recording_tool(temp.path(), &log, 0);
    let versions = temp.path().join("versions");
    fs::create_dir_all(&versions).unwrap();
    fs::write(versions.join("0001_initial.py"), "").unwrap();

    let output = entrygate(&[
        "--skip-wait",
        "--database-url",
        "postgresql+asyncpg://app:pw@db:5432/app",
        "--migrations-dir",
        versions.to_str().unwrap(),
        "--migrate-program",
        tool.to_str().unwrap(),
        "--",
        "true",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read_to_string(log.with_extension("env")).unwrap().trim(),
        "postgresql://app:pw@db:5432/app"
    );
}

#[test]
fn test_hostless_database_url_allowed_without_wait() {
    let output = entrygate(&[
        "--skip-wait",
        "--skip-migrations",
        "--database-url",
        "sqlite:///app.db",
        "--",
        "true",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_database_url_env_decides_endpoint() {
    let output = entrygate_with_env(
        &["--dry-run", "--skip-migrations"],
        &[
            ("DATABASE_URL", "postgresql+asyncpg://app:pw@db.internal:6432/app"),
            ("MIGRATIONS_DIR", "migrations/versions"),
        ],
    );

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["wait"]["endpoint"]["host"], "db.internal");
    assert_eq!(plan["wait"]["endpoint"]["port"], 6432);
}
