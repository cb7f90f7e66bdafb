use std::path::PathBuf;

use clap::Parser;

use bot::{Bot, BotConfig, BotConfigFile, BotError, PluginRegistry, Scenario};
use types::PluginKind;

#[derive(Parser, Debug)]
struct Params {
    /// Strategy plugin id
    #[arg(short, long)]
    strategy: Option<String>,

    /// Per-decision time budget in milliseconds
    #[arg(short = 't', long)]
    decision_timeout_ms: Option<u64>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the available strategies and exit
    #[arg(long)]
    list: bool,

    /// YAML scenario to replay
    scenario: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let yaml_config = args
        .config
        .as_deref()
        .map(BotConfigFile::from_yaml_file)
        .transpose()?;
    let config =
        BotConfig::from_cli_or_env_or_yaml(args.strategy, args.decision_timeout_ms, yaml_config)?;

    let mut registry = PluginRegistry::with_builtin_strategies();
    let skipped = registry.load_all();
    if !skipped.is_empty() {
        log::warn!("Skipped {} plugin(s) that failed to load", skipped.len());
    }

    if args.list {
        for info in registry.infos_by_kind(PluginKind::Strategy) {
            println!("{}\t{}\t{}", info.name, info.version, info.description);
        }
        return Ok(());
    }

    let Some(scenario_path) = args.scenario else {
        return Err(BotError::Config("no scenario given".to_string()));
    };
    let scenario = Scenario::from_yaml_file(&scenario_path)?;

    let bot = Bot::new(registry.guarded(&config.strategy, config.decision_timeout)?);
    let steps = bot.replay(&scenario).await?;
    for step in &steps {
        println!("{}", serde_json::to_string(step)?);
    }

    // faults are logged by the registry
    registry.unload_all();
    Ok(())
}
