use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use crate::bundle::{Bundle, DirectoryBundle, EmbeddedBundle};
use crate::cli::output::{
    print_blank, print_entry, print_error, print_header, print_muted, print_plain,
    print_section, print_success, print_warning, Icons,
};
use crate::doctor::{check_integrity, IntegrityReport, RegistryStatus};
use crate::error::WorkflowError;
use crate::installer::{InstallOutcome, Installer};
use crate::layout::Layout;
use crate::registry::{load_registry, Registry};
use crate::template::resolve_template;

/// サブコマンド
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install .achira/ (agents, skills, workflows, scripts) into the target directory
    Init {
        /// Overwrite an existing installation (files not in the bundle are kept)
        #[arg(short, long)]
        force: bool,
    },
    /// Locate the workflow for a registered project template
    Create {
        /// Template name from the registry
        template: String,
    },
    /// List all available templates and slash commands
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Validate .achira/ installation integrity
    Doctor {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// 出力形式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// コマンド実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
}

/// コマンド実行コンテキスト
pub struct CommandContext {
    /// 対象プロジェクトのルート
    target: PathBuf,
    layout: Layout,
    /// ディスク上のバンドル（Noneなら埋め込み版）
    bundle_dir: Option<PathBuf>,
    cli_version: String,
}

impl CommandContext {
    pub fn new(target: PathBuf, layout: Layout, bundle_dir: Option<PathBuf>) -> Self {
        Self {
            target,
            layout,
            bundle_dir,
            cli_version: crate::VERSION.to_string(),
        }
    }

    /// CLIバージョンを差し替える
    pub fn with_cli_version(mut self, version: impl Into<String>) -> Self {
        self.cli_version = version.into();
        self
    }

    /// コマンドを実行し、標準出力に表示
    pub fn execute(&self, command: &Command) -> Result<CommandStatus> {
        self.execute_to(command, &mut std::io::stdout())
    }

    /// コマンドを実行し、`out` に表示
    ///
    /// ドメインエラーはここで表示して `Failure` を返す。
    pub fn execute_to<W: Write>(&self, command: &Command, out: &mut W) -> Result<CommandStatus> {
        let result = match command {
            Command::Init { force } => self.init(out, *force),
            Command::Create { template } => self.create(out, template),
            Command::List { format } => self.list(out, *format),
            Command::Doctor { format } => return self.doctor(out, *format),
        };

        match result {
            Ok(status) => Ok(status),
            Err(CommandError::Workflow(e)) => {
                tracing::debug!("Command failed: {:?}", e);
                self.report_error(out, &e);
                Ok(CommandStatus::Failure)
            }
            Err(CommandError::Other(e)) => Err(e),
        }
    }

    fn bundle(&self) -> Box<dyn Bundle> {
        match &self.bundle_dir {
            Some(dir) => Box::new(DirectoryBundle::new(dir)),
            None => Box::new(EmbeddedBundle),
        }
    }

    fn init<W: Write>(&self, out: &mut W, force: bool) -> Result<CommandStatus, CommandError> {
        print_header(out, "achira-wf init");
        print_muted(out, &format!("Target: {}", self.target.display()));
        print_blank(out);

        let bundle = self.bundle();
        let installer = Installer::new(self.layout.clone(), self.cli_version.clone());
        let outcome = installer.install(&self.target, bundle.as_ref(), force)?;

        self.print_install_outcome(out, &outcome);
        Ok(CommandStatus::Success)
    }

    fn print_install_outcome<W: Write>(&self, out: &mut W, outcome: &InstallOutcome) {
        print_success(
            out,
            &format!(
                "{} installed ({} files)",
                self.layout.root_label(),
                outcome.files_copied
            ),
        );
        if let Some(count) = outcome.synced_workflows {
            print_success(
                out,
                &format!(
                    "Synced {} workflows {} {}/",
                    count,
                    Icons::arrow(),
                    self.layout.discovery_dir.trim_end_matches('/')
                ),
            );
        }
        for warning in &outcome.warnings {
            print_warning(out, &warning.to_string());
        }

        if let Some(registry) = &outcome.registry {
            print_blank(out);
            print_plain(out, "Achira Workflow OS initialized.");
            print_registry(out, registry);
        }
        print_blank(out);
    }

    fn create<W: Write>(
        &self,
        out: &mut W,
        template: &str,
    ) -> Result<CommandStatus, CommandError> {
        let resolved = resolve_template(&self.layout, &self.target, template)?;

        print_header(out, &format!("achira-wf create {}", resolved.key));
        print_success(out, &format!("Template: {}", resolved.description));
        print_success(out, &format!("Workflow: {}", resolved.path.display()));
        print_blank(out);
        print_plain(
            out,
            &format!(
                "{} Open the workflow file and follow the steps, or use the /create slash command.",
                Icons::arrow()
            ),
        );
        print_blank(out);
        Ok(CommandStatus::Success)
    }

    fn list<W: Write>(
        &self,
        out: &mut W,
        format: OutputFormat,
    ) -> Result<CommandStatus, CommandError> {
        let registry = load_registry(&self.layout, &self.target)?;

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&registry)
                    .context("Failed to serialize registry")?;
                writeln!(out, "{}", json).context("Failed to write output")?;
            }
            OutputFormat::Text => {
                print_header(out, "Achira Workflow OS");
                print_muted(
                    out,
                    &format!(
                        "Engine: {}  Version: {}",
                        registry.engine_label(),
                        registry.version_label()
                    ),
                );
                print_registry(out, &registry);
                print_blank(out);
            }
        }
        Ok(CommandStatus::Success)
    }

    fn doctor<W: Write>(&self, out: &mut W, format: OutputFormat) -> Result<CommandStatus> {
        let report = check_integrity(&self.layout, &self.target);

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize integrity report")?;
                writeln!(out, "{}", json).context("Failed to write output")?;
            }
            OutputFormat::Text => print_report(out, &report),
        }

        Ok(if report.healthy {
            CommandStatus::Success
        } else {
            CommandStatus::Failure
        })
    }

    fn report_error<W: Write>(&self, out: &mut W, error: &WorkflowError) {
        match error {
            WorkflowError::AlreadyInstalled { .. } => {
                print_warning(
                    out,
                    &format!("{} already exists at target.", self.layout.root_label()),
                );
                print_muted(out, "   Use --force to overwrite.");
            }
            WorkflowError::UnknownTemplate { name, available } => {
                print_blank(out);
                print_error(out, &format!("Unknown template: \"{}\"", name));
                print_muted(out, &format!("   Available: {}", available.join(", ")));
            }
            WorkflowError::WorkflowFileMissing { workflow, path, .. } => {
                print_blank(out);
                print_error(out, &format!("Workflow file not found: {}", workflow));
                print_muted(out, &format!("   Expected at {}", path.display()));
            }
            other => {
                print_blank(out);
                print_error(out, &other.to_string());
            }
        }
        print_blank(out);
    }
}

/// コマンド内部のエラー（表示して終了するものとそれ以外）
enum CommandError {
    Workflow(WorkflowError),
    Other(anyhow::Error),
}

impl From<WorkflowError> for CommandError {
    fn from(e: WorkflowError) -> Self {
        Self::Workflow(e)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e)
    }
}

/// テンプレートとスラッシュコマンドの一覧を出力
fn print_registry<W: Write>(out: &mut W, registry: &Registry) {
    print_section(out, "Project Scaffolds:");
    for (key, entry) in &registry.templates {
        print_entry(out, &format!("achira-wf create {}", key), &entry.description);
    }

    print_section(out, "Slash Commands:");
    for (key, entry) in &registry.commands {
        print_entry(out, &format!("/{}", key), &entry.description);
    }
}

/// 整合性チェック結果を出力（全項目を1行ずつ）
fn print_report<W: Write>(out: &mut W, report: &IntegrityReport) {
    print_header(out, "achira-wf doctor");

    for check in &report.checks {
        if check.present {
            print_success(out, &check.label);
        } else {
            print_error(out, &format!("{} {} MISSING", check.label, Icons::dash()));
        }
    }

    print_blank(out);
    if let Some(count) = report.counts.agents {
        print_muted(out, &format!("Agents: {}", count));
    }
    if let Some(count) = report.counts.skills {
        print_muted(out, &format!("Skills: {}", count));
    }
    if let Some(count) = report.counts.workflows {
        print_muted(out, &format!("Workflows: {}", count));
    }

    match &report.registry {
        RegistryStatus::Parsed { engine, version } => {
            print_muted(out, &format!("Registry: engine {}, version {}", engine, version));
        }
        RegistryStatus::Corrupt { .. } => print_warning(out, "registry.json parse error"),
        RegistryStatus::Absent => {}
    }

    print_blank(out);
    if report.healthy {
        print_success(out, "All checks passed. System healthy.");
    } else {
        print_error(out, "Some checks failed. Run `achira-wf init --force` to repair.");
    }
    print_blank(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_fixture_bundle;
    use std::path::Path;
    use tempfile::tempdir;

    fn context(target: &Path, bundle: &Path) -> CommandContext {
        CommandContext::new(
            target.to_path_buf(),
            Layout::default(),
            Some(bundle.to_path_buf()),
        )
    }

    /// コマンドを実行し、表示内容を文字列で返す
    fn render(ctx: &CommandContext, command: Command) -> (CommandStatus, String) {
        let mut out = Vec::new();
        let status = ctx.execute_to(&command, &mut out).unwrap();
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_init_then_doctor() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());

        let init = ctx.execute(&Command::Init { force: false }).unwrap();
        let doctor = ctx
            .execute(&Command::Doctor {
                format: OutputFormat::Json,
            })
            .unwrap();

        assert_eq!(init, CommandStatus::Success);
        assert_eq!(doctor, CommandStatus::Success);
    }

    #[test]
    fn test_init_twice_requires_force() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());

        assert_eq!(
            ctx.execute(&Command::Init { force: false }).unwrap(),
            CommandStatus::Success
        );
        assert_eq!(
            ctx.execute(&Command::Init { force: false }).unwrap(),
            CommandStatus::Failure
        );
        assert_eq!(
            ctx.execute(&Command::Init { force: true }).unwrap(),
            CommandStatus::Success
        );
    }

    #[test]
    fn test_missing_bundle_fails() {
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), &target_dir.path().join("missing"));

        assert_eq!(
            ctx.execute(&Command::Init { force: false }).unwrap(),
            CommandStatus::Failure
        );
    }

    #[test]
    fn test_commands_fail_before_init() {
        let target_dir = tempdir().unwrap();
        let ctx = CommandContext::new(target_dir.path().to_path_buf(), Layout::default(), None);

        let create = ctx
            .execute(&Command::Create {
                template: "react".to_string(),
            })
            .unwrap();
        let list = ctx
            .execute(&Command::List {
                format: OutputFormat::Text,
            })
            .unwrap();
        let doctor = ctx
            .execute(&Command::Doctor {
                format: OutputFormat::Text,
            })
            .unwrap();

        assert_eq!(create, CommandStatus::Failure);
        assert_eq!(list, CommandStatus::Failure);
        assert_eq!(doctor, CommandStatus::Failure);
    }

    #[test]
    fn test_create_and_list_after_embedded_init() {
        let target_dir = tempdir().unwrap();
        let ctx = CommandContext::new(target_dir.path().to_path_buf(), Layout::default(), None);
        ctx.execute(&Command::Init { force: false }).unwrap();

        let create = ctx
            .execute(&Command::Create {
                template: "react".to_string(),
            })
            .unwrap();
        let unknown = ctx
            .execute(&Command::Create {
                template: "svelte".to_string(),
            })
            .unwrap();
        let list = ctx
            .execute(&Command::List {
                format: OutputFormat::Json,
            })
            .unwrap();

        assert_eq!(create, CommandStatus::Success);
        assert_eq!(unknown, CommandStatus::Failure);
        assert_eq!(list, CommandStatus::Success);
    }

    #[test]
    fn test_init_reports_engine_mismatch_without_failing() {
        let target_dir = tempdir().unwrap();
        let ctx = CommandContext::new(target_dir.path().to_path_buf(), Layout::default(), None)
            .with_cli_version("9.0.0");

        assert_eq!(
            ctx.execute(&Command::Init { force: false }).unwrap(),
            CommandStatus::Success
        );
    }

    #[test]
    fn test_init_output_lists_every_template_and_command() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());

        let (status, text) = render(&ctx, Command::Init { force: false });

        assert_eq!(status, CommandStatus::Success);
        assert!(text.contains("Achira Workflow OS initialized."));
        for key in ["react", "next", "html"] {
            assert!(text.contains(&format!("achira-wf create {}", key)), "{}", text);
        }
        for key in ["create", "plan"] {
            assert!(text.contains(&format!("/{}", key)), "{}", text);
        }
        // レジストリのファイル順で並ぶ
        let react = text.find("achira-wf create react").unwrap();
        let html = text.find("achira-wf create html").unwrap();
        assert!(react < html);
    }

    #[test]
    fn test_doctor_prints_one_line_per_check() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());
        ctx.execute_to(&Command::Init { force: false }, &mut Vec::<u8>::new())
            .unwrap();
        std::fs::remove_dir_all(target_dir.path().join(".achira/scripts")).unwrap();

        let (status, text) = render(
            &ctx,
            Command::Doctor {
                format: OutputFormat::Text,
            },
        );

        assert_eq!(status, CommandStatus::Failure);
        let missing: Vec<&str> = text.lines().filter(|l| l.contains("MISSING")).collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("scripts/"));
        // 8項目の成功行のみ（判定行は失敗側）
        let passed = text
            .lines()
            .filter(|l| l.contains(Icons::success()))
            .count();
        assert_eq!(passed, 8);
        assert!(text.contains("Some checks failed."));
    }

    #[test]
    fn test_unknown_template_prints_available() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());
        ctx.execute_to(&Command::Init { force: false }, &mut Vec::<u8>::new())
            .unwrap();

        let (status, text) = render(
            &ctx,
            Command::Create {
                template: "vue".to_string(),
            },
        );

        assert_eq!(status, CommandStatus::Failure);
        assert!(text.contains("Unknown template: \"vue\""));
        assert!(text.contains("Available: react, next, html"), "{}", text);
    }

    #[test]
    fn test_list_json_preserves_registry_order() {
        let bundle_dir = tempdir().unwrap();
        write_fixture_bundle(bundle_dir.path());
        let target_dir = tempdir().unwrap();
        let ctx = context(target_dir.path(), bundle_dir.path());
        ctx.execute_to(&Command::Init { force: false }, &mut Vec::<u8>::new())
            .unwrap();

        let (status, text) = render(
            &ctx,
            Command::List {
                format: OutputFormat::Json,
            },
        );

        assert_eq!(status, CommandStatus::Success);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = json["templates"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["react", "next", "html"]);
    }

    #[test]
    fn test_init_over_own_bundle_fails_cleanly() {
        let target_dir = tempdir().unwrap();
        let root = target_dir.path().join(".achira");
        write_fixture_bundle(&root);
        let ctx = context(target_dir.path(), &root);

        let (status, text) = render(&ctx, Command::Init { force: true });

        assert_eq!(status, CommandStatus::Failure);
        assert!(text.contains("overlaps install destination"), "{}", text);
        assert_eq!(
            std::fs::read_to_string(root.join("ARCHITECTURE.md")).unwrap(),
            "# Architecture"
        );
    }
}
