//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use zk_reconciler::NonLeaderPolicy;

/// zk-charm - Zookeeper pod spec reconciler
#[derive(Parser, Debug)]
#[command(name = "zk-charm")]
#[command(version)]
#[command(about = "Reconciles a Zookeeper pod spec from charm configuration")]
#[command(
    long_about = "zk-charm handles one host hook per invocation: it derives the pod spec from the charm configuration, applies it when this unit is the leader, and reports unit status."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle one hook (config-changed, start, upgrade-charm)
    Dispatch(DispatchArgs),

    /// Print the pod spec derived from a config file
    Render {
        /// Charm config (YAML mapping)
        #[arg(short, long)]
        config: PathBuf,

        /// Application name
        #[arg(long, default_value = "zookeeper")]
        app: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DispatchArgs {
    /// Hook name as delivered by the host
    pub hook: String,

    /// Charm config (YAML mapping)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Persisted charm state (JSON, created if missing)
    #[arg(short, long)]
    pub state: PathBuf,

    /// Where the applied pod spec is written
    #[arg(long)]
    pub spec_out: PathBuf,

    /// Relation data bag; enables endpoint advertisement
    #[arg(long)]
    pub relation_out: Option<PathBuf>,

    /// This unit is the leader
    #[arg(long, default_value_t = false)]
    pub leader: bool,

    /// Application name
    #[arg(long, default_value = "zookeeper")]
    pub app: String,

    /// Status a non-leader reports when a new spec is pending
    #[arg(long, value_enum, default_value_t = PolicyArg::Waiting)]
    pub non_leader_policy: PolicyArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    Waiting,
    Unchanged,
}

impl From<PolicyArg> for NonLeaderPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Waiting => Self::Waiting,
            PolicyArg::Unchanged => Self::Unchanged,
        }
    }
}
