use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "liteci",
    version,
    about = "Schema-driven planner: compiles deployment intent into a deterministic plan DAG"
)]
struct Cli {
    /// Config directory for composition definitions (use * or ** for
    /// recursive scanning)
    #[arg(short = 'c', long = "config-dir", global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an execution plan from an intent
    Plan {
        /// Intent file path
        #[arg(short, long, default_value = "intent.yaml")]
        intent: PathBuf,

        /// Output plan file path (.yaml/.yml for YAML, anything else JSON)
        #[arg(short, long, default_value = "plan.json")]
        output: PathBuf,

        /// Restrict the plan to one environment
        #[arg(short, long)]
        env: Option<String>,

        /// Print a plan summary after generation
        #[arg(long, default_value_t = false)]
        debug: bool,
    },

    /// Validate an intent against composition schemas
    Validate {
        /// Intent file path
        #[arg(short, long, default_value = "intent.yaml")]
        intent: PathBuf,
    },

    /// List available compositions, or inspect one
    #[command(alias = "composition")]
    Compositions {
        /// Composition name for detailed information
        name: Option<String>,

        /// Show detailed information for every composition
        #[arg(short, long, default_value_t = false)]
        long: bool,

        /// Show job steps and schema fields (with detail output)
        #[arg(short, long, default_value_t = false)]
        expand_jobs: bool,
    },

    /// List components with their merged properties, or inspect one
    #[command(alias = "components")]
    Component {
        /// Component name for detailed information
        name: Option<String>,

        /// Intent file path
        #[arg(short, long, default_value = "intent.yaml")]
        intent: PathBuf,

        /// Show detailed information
        #[arg(short, long, default_value_t = false)]
        long: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Cli { config_dir, cmd } = Cli::parse();
    let config_dir = config_dir.as_deref();

    match cmd {
        Command::Plan {
            intent,
            output,
            env,
            debug,
        } => commands::plan::run(required(config_dir)?, &intent, &output, env.as_deref(), debug),

        Command::Validate { intent } => commands::validate::run(required(config_dir)?, &intent),

        Command::Compositions {
            name,
            long,
            expand_jobs,
        } => commands::compositions::run(required(config_dir)?, name.as_deref(), long, expand_jobs),

        Command::Component { name, intent, long } => {
            commands::component::run(name.as_deref(), &intent, long)
        }
    }
}

fn required(config_dir: Option<&str>) -> anyhow::Result<&str> {
    config_dir.ok_or_else(|| anyhow::anyhow!("--config-dir is required for this command"))
}
