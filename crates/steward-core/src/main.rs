//! Steward - managed-node configuration agent (refresh plugin harness)
//!
//! Runs the association refresh plugin against a node-state fixture:
//! - Loads the refresh request (the document's `Properties` payload)
//! - Loads the node state (instance identity plus registered associations)
//! - Wires file-backed collaborators and executes the plugin
//! - Prints the JSON plugin result on stdout
//!
//! Log output goes to stderr; stdout carries only the result payload.

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use steward_core::association::service::{
    NoopCache, StaticAssociationService, StaticIdentityResolver,
};
use steward_core::association::InstanceAssociation;
use steward_core::config::PluginConfig;
use steward_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use steward_core::persist::FileResultPersister;
use steward_core::plugin::{
    AtomicGate, Collaborators, ExecutionContext, RefreshPlugin, PLUGIN_NAME,
};
use steward_core::schedule::{ExecutionSignal, InMemoryScheduleManager};
use steward_core::upload::NoopUploader;
use steward_common::InstanceId;
use tracing::{error, info};

/// Steward - force immediate re-evaluation of node associations
#[derive(Parser)]
#[command(name = "steward")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, env = "STEWARD_LOG")]
    log_level: Option<LogLevel>,

    /// Log format (human, jsonl)
    #[arg(long, global = true, env = "STEWARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh plugin over a request against a node-state fixture
    Refresh(RefreshArgs),
}

#[derive(Args, Debug)]
struct RefreshArgs {
    /// Path to the request JSON (`Properties` payload: object or list)
    #[arg(long)]
    request: PathBuf,

    /// Path to the node state JSON (instance id + associations)
    #[arg(long)]
    state: PathBuf,

    /// Base working directory; omitted means a retained temp dir
    #[arg(long)]
    orchestration_dir: Option<PathBuf>,

    /// Directory the plugin result is persisted under
    #[arg(long, default_value = ".steward/state")]
    state_dir: PathBuf,

    /// Output bucket name (empty disables upload)
    #[arg(long, default_value = "")]
    bucket: String,

    /// Key prefix inside the output bucket
    #[arg(long, default_value = "")]
    prefix: String,
}

/// Node-state fixture shape consumed by the harness.
#[derive(Debug, Deserialize)]
struct NodeState {
    instance_id: InstanceId,
    #[serde(default)]
    associations: Vec<NodeAssociation>,
}

#[derive(Debug, Deserialize)]
struct NodeAssociation {
    association_id: String,
    name: String,
    #[serde(default)]
    content: Option<String>,
}

/// Signal that only announces itself; the harness has no live scheduler.
#[derive(Debug, Default)]
struct LoggingSignal;

impl ExecutionSignal for LoggingSignal {
    fn execute_associations(&self) {
        info!("execution signal fired: due associations will run");
    }
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let code = match cli.command {
        Commands::Refresh(args) => run_refresh(&args),
    };
    std::process::exit(code);
}

fn run_refresh(args: &RefreshArgs) -> i32 {
    let run_id = generate_run_id();
    info!(%run_id, plugin = PLUGIN_NAME, "starting refresh");

    let properties = match read_json(&args.request) {
        Ok(value) => value,
        Err(message) => {
            error!(path = %args.request.display(), "{}", message);
            return 2;
        }
    };
    let state: NodeState = match read_json(&args.state).and_then(|value| {
        serde_json::from_value(value).map_err(|err| format!("invalid node state: {}", err))
    }) {
        Ok(state) => state,
        Err(message) => {
            error!(path = %args.state.display(), "{}", message);
            return 2;
        }
    };

    let associations: Vec<InstanceAssociation> = state
        .associations
        .iter()
        .map(|a| InstanceAssociation::new(a.association_id.as_str(), a.name.as_str(), state.instance_id.clone()))
        .collect();
    let mut service = StaticAssociationService::new(associations);
    for assoc in &state.associations {
        if let Some(content) = &assoc.content {
            service = service.with_content(assoc.association_id.as_str(), content.as_str());
        }
    }

    let identity = StaticIdentityResolver::new(state.instance_id.clone());
    let cache = NoopCache;
    let schedule = InMemoryScheduleManager::default();
    let signal = LoggingSignal;
    let uploader = NoopUploader;
    let persister = FileResultPersister::new(&args.state_dir);

    let plugin = RefreshPlugin::new(
        PluginConfig::from_env(),
        Collaborators {
            identity: &identity,
            service: &service,
            cache: &cache,
            schedule: &schedule,
            signal: &signal,
            uploader: &uploader,
            persister: &persister,
        },
    );

    let context = ExecutionContext {
        plugin_id: PLUGIN_NAME.to_string(),
        orchestration_dir: args.orchestration_dir.clone().unwrap_or_default(),
        output_bucket: args.bucket.clone(),
        output_prefix: args.prefix.clone(),
    };

    let result = plugin.execute(&context, &properties, &AtomicGate::new());

    let due: Vec<String> = schedule.due_ids().iter().map(|id| id.to_string()).collect();
    info!(?due, status = %result.status, "refresh finished");

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            error!(%err, "failed to serialize plugin result");
            return 2;
        }
    }
    result.exit_code
}

fn read_json(path: &PathBuf) -> Result<serde_json::Value, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid JSON in {}: {}", path.display(), err))
}
