//! Argument definitions for the `leaflink` binary.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "leaflink",
    version,
    about = "Plant telemetry devices from the command line",
    long_about = "Monitor Leaflink plant sensors: live soil, temperature, humidity and \
                  light readings, device pairing, and account management."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend server URL override.
    #[arg(long, global = true, env = "LEAFLINK_SERVER")]
    pub server: Option<String>,

    /// Output format.
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress decorative output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the auth token
    Login(LoginArgs),

    /// Sign out and clear the stored token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List your plants
    Plants,

    /// Watch live sensor readings for a plant
    Watch(WatchArgs),

    /// Pair a new device (interactive)
    Pair(PairArgs),

    /// Join a shared plant by sharing code
    Join(JoinArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted).
    #[arg(long)]
    pub email: Option<String>,

    /// Account password (prompted when omitted; prefer the prompt).
    #[arg(long, env = "LEAFLINK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Device uuid of the plant to watch.
    pub uuid: String,

    /// Refresh interval in seconds (config default when omitted).
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Take one reading and exit.
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Finish without waiting for the device's first signal.
    #[arg(long)]
    pub skip_wait: bool,
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    /// The sharing code from the plant's owner.
    pub code: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the effective configuration
    Show,

    /// Interactive configuration wizard
    Init,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
