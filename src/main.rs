use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use achira_wf::{
    cli::{print_error, Command, CommandContext, CommandStatus},
    config::Config,
};

#[derive(Parser, Debug)]
#[command(name = "achira-wf")]
#[command(about = "Achira Workflow OS - Install agents, skills, and project scaffolds into any folder")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// 対象プロジェクトのルート（デフォルトはカレントディレクトリ）
    #[arg(short, long, global = true)]
    target: Option<PathBuf>,

    /// インストール元バンドルディレクトリ（未指定なら埋め込み版）
    #[arg(long, global = true)]
    bundle: Option<PathBuf>,

    /// 設定ファイルパス
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 詳細ログを表示 (INFO level)
    #[arg(long, global = true)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // トレーシング初期化（デフォルトはWARN、--verboseでINFO）
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(CommandStatus::Success) => ExitCode::SUCCESS,
        Ok(CommandStatus::Failure) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            print_error(&mut std::io::stdout(), &format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<CommandStatus> {
    let config = Config::load(args.config.as_deref())?;

    let target = match args.target {
        Some(target) => target,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let bundle_dir = config.bundle_dir(args.bundle.as_deref());

    tracing::info!("achira-wf v{} starting...", achira_wf::VERSION);
    tracing::info!("Target: {}", target.display());
    match &bundle_dir {
        Some(dir) => tracing::info!("Bundle: {}", dir.display()),
        None => tracing::info!("Bundle: embedded"),
    }

    let context = CommandContext::new(target, config.layout, bundle_dir);
    context.execute(&args.command)
}
