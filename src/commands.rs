//! CLI command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use zk_events::Charm;
use zk_reconciler::{
    derive_specification, CharmConfig, CharmState, PodSpec, RawConfig, ReconcileReport,
    ReconcilerBuilder, StaticLeadership,
};

use crate::cli::{Commands, DispatchArgs};
use crate::host::{FileRelation, FileSpecSink, LogStatusSink};

/// Execute a CLI command, printing its result to stdout.
///
/// # Errors
///
/// Returns an error if input files cannot be read, state cannot be saved, or
/// the hook is unknown.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Dispatch(args) => {
            let report = cmd_dispatch(&args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Render { config, app } => {
            let spec = cmd_render(&config, &app)?;
            print!("{}", serde_yaml::to_string(&spec)?);
        }
    }
    Ok(())
}

/// Handle one hook against file-backed state and capabilities.
///
/// Invalid configuration and failed submissions are not errors here: they
/// end up in the unit status and in the returned report.
///
/// # Errors
///
/// Returns an error if the config or state file cannot be read, the hook is
/// unknown, or the updated state cannot be saved.
pub async fn cmd_dispatch(args: &DispatchArgs) -> Result<ReconcileReport> {
    let raw = load_raw_config(&args.config)?;
    let mut state = CharmState::load(&args.state)?;

    let mut builder = ReconcilerBuilder::new()
        .with_sink(Arc::new(FileSpecSink::new(&args.spec_out)))
        .with_status(Arc::new(LogStatusSink::new()))
        .app_name(args.app.as_str())
        .non_leader_policy(args.non_leader_policy.into())
        .advertise_endpoint(args.relation_out.is_some());
    if let Some(path) = &args.relation_out {
        builder = builder.with_relation(Arc::new(FileRelation::new(path)));
    }
    let reconciler = builder.build()?;

    let charm = Charm::new(reconciler, Arc::new(StaticLeadership::new(args.leader)));
    let report = charm
        .dispatch_named(&args.hook, &raw, &mut state)
        .await
        .with_context(|| format!("failed to handle hook '{}'", args.hook))?;

    state
        .save(&args.state)
        .context("failed to persist charm state")?;

    info!(
        hook = %args.hook,
        outcome = ?report.outcome,
        converged = report.outcome.is_converged(),
        "Hook complete"
    );
    Ok(report)
}

/// Derive the pod spec for a config file without touching any state.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the configuration is invalid.
pub fn cmd_render(config: &Path, app: &str) -> Result<PodSpec> {
    let raw = load_raw_config(config)?;
    let config = CharmConfig::from_raw(&raw)?;
    Ok(derive_specification(&config, app))
}

fn load_raw_config(path: &Path) -> Result<RawConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;
    RawConfig::from_yaml_str(&text)
        .with_context(|| format!("failed to parse config '{}'", path.display()))
}
