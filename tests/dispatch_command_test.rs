//! Integration tests for the dispatch and render commands.
//!
//! These tests verify that:
//! - A leader start writes the pod spec, state and relation files
//! - Re-dispatching unchanged config leaves the spec file untouched
//! - Restarting re-submits the spec
//! - Fixing a broken config clears the blocked status
//! - Non-leaders never write a pod spec
//! - Invalid config blocks the unit instead of failing the command

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::fs;
use std::path::{Path, PathBuf};

use zk_charm::cli::{DispatchArgs, PolicyArg};
use zk_charm::commands::{cmd_dispatch, cmd_render};
use zk_reconciler::{CharmState, PodSpec, ReconcileOutcome, UnitStatus};

const CONFIG: &str = "\
image: zk:3.4
client-port: 2181
server-port: 2888
leader-election-port: 3888
num-units: 3
";

fn args(dir: &Path, hook: &str, leader: bool) -> DispatchArgs {
    DispatchArgs {
        hook: hook.to_string(),
        config: dir.join("config.yaml"),
        state: dir.join("state.json"),
        spec_out: dir.join("spec.json"),
        relation_out: Some(dir.join("relation.json")),
        leader,
        app: "zookeeper".to_string(),
        non_leader_policy: PolicyArg::Waiting,
    }
}

fn write_config(dir: &Path, text: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join("config.yaml");
    fs::write(&path, text)?;
    Ok(path)
}

#[tokio::test]
async fn test_leader_start_writes_spec_state_and_relation() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;

    let report = cmd_dispatch(&args(dir.path(), "start", true)).await?;
    assert_eq!(report.outcome, ReconcileOutcome::Applied);

    let spec: PodSpec = serde_json::from_str(&fs::read_to_string(dir.path().join("spec.json"))?)?;
    let state = CharmState::load(&dir.path().join("state.json"))?;
    assert!(state.started);
    assert_eq!(state.applied_spec.as_ref(), Some(&spec));
    assert_eq!(state.status, UnitStatus::active());

    let relation: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("relation.json"))?)?;
    assert_eq!(relation["host"], "zookeeper");
    assert_eq!(relation["port"], "2181");
    Ok(())
}

#[tokio::test]
async fn test_unchanged_config_does_not_rewrite_spec() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;
    cmd_dispatch(&args(dir.path(), "start", true)).await?;

    // Remove the spec file; an idempotent pass must not recreate it.
    fs::remove_file(dir.path().join("spec.json"))?;
    let report = cmd_dispatch(&args(dir.path(), "config-changed", true)).await?;

    assert_eq!(report.outcome, ReconcileOutcome::Unchanged);
    assert!(!dir.path().join("spec.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_restart_rewrites_spec_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;
    cmd_dispatch(&args(dir.path(), "start", true)).await?;

    fs::remove_file(dir.path().join("spec.json"))?;
    let report = cmd_dispatch(&args(dir.path(), "start", true)).await?;

    assert_eq!(report.outcome, ReconcileOutcome::Applied);
    assert!(dir.path().join("spec.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_fixed_config_returns_unit_to_active() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;
    cmd_dispatch(&args(dir.path(), "start", true)).await?;

    write_config(dir.path(), &CONFIG.replace("image: zk:3.4", "image: \"\""))?;
    cmd_dispatch(&args(dir.path(), "config-changed", true)).await?;
    let blocked = CharmState::load(&dir.path().join("state.json"))?;
    assert!(matches!(blocked.status, UnitStatus::Blocked(_)));

    write_config(dir.path(), CONFIG)?;
    let report = cmd_dispatch(&args(dir.path(), "config-changed", true)).await?;

    assert_eq!(report.outcome, ReconcileOutcome::Unchanged);
    let state = CharmState::load(&dir.path().join("state.json"))?;
    assert_eq!(state.status, UnitStatus::active());
    Ok(())
}

#[tokio::test]
async fn test_non_leader_writes_no_spec() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;

    let report = cmd_dispatch(&args(dir.path(), "config-changed", false)).await?;

    assert_eq!(report.outcome, ReconcileOutcome::SkippedNotLeader);
    assert!(!dir.path().join("spec.json").exists());
    assert!(!dir.path().join("relation.json").exists());
    let state = CharmState::load(&dir.path().join("state.json"))?;
    assert!(matches!(state.status, UnitStatus::Waiting(_)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_blocks_unit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), &CONFIG.replace("client-port: 2181", "client-port: lots"))?;

    let report = cmd_dispatch(&args(dir.path(), "config-changed", true)).await?;

    assert!(matches!(report.outcome, ReconcileOutcome::InvalidConfig { .. }));
    let state = CharmState::load(&dir.path().join("state.json"))?;
    assert!(matches!(state.status, UnitStatus::Blocked(ref m) if m.contains("client-port")));
    assert_eq!(state.applied_spec, None);
    Ok(())
}

#[tokio::test]
async fn test_unknown_hook_fails_command() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_config(dir.path(), CONFIG)?;

    let result = cmd_dispatch(&args(dir.path(), "install", true)).await;

    assert!(result.is_err());
    assert!(!dir.path().join("state.json").exists());
    Ok(())
}

#[test]
fn test_render_prints_spec_for_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_config(dir.path(), CONFIG)?;

    let spec = cmd_render(&path, "zk")?;

    let container = spec.container().cloned();
    assert_eq!(container.as_ref().map(|c| c.name.as_str()), Some("zk"));
    assert_eq!(container.and_then(|c| c.port("client")), Some(2181));
    Ok(())
}
