//! インストーラー
//!
//! アセットツリーをターゲットにコピーし、IDE向けにワークフローを同期して、
//! レジストリのエンジンバージョンを確認する。同期とバージョン確認はベストエフォートで、
//! 失敗しても警告として結果に積むだけでインストール自体は成功扱いにする。

use std::path::{Path, PathBuf};

use crate::bundle::Bundle;
use crate::error::{InstallWarning, WorkflowError};
use crate::layout::Layout;
use crate::registry::{check_compatibility, Compatibility, Registry};

/// インストール結果
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// インストール先ルート（`<target>/.achira`）
    pub installed_root: PathBuf,
    /// コピーしたファイル数
    pub files_copied: usize,
    /// IDE向けに同期したワークフロー数（同期失敗時はNone）
    pub synced_workflows: Option<usize>,
    /// インストール後に読み込んだレジストリ
    pub registry: Option<Registry>,
    /// ベストエフォート処理の警告
    pub warnings: Vec<InstallWarning>,
}

impl InstallOutcome {
    pub fn has_engine_mismatch(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, InstallWarning::EngineMismatch { .. }))
    }
}

/// インストーラー
pub struct Installer {
    layout: Layout,
    /// CLI自身のバージョン（互換性チェック用）
    cli_version: String,
}

impl Installer {
    pub fn new(layout: Layout, cli_version: impl Into<String>) -> Self {
        Self {
            layout,
            cli_version: cli_version.into(),
        }
    }

    /// `target` にアセットツリーをインストール
    ///
    /// # Arguments
    /// * `target` - インストール先プロジェクトのルート
    /// * `bundle` - インストール元アセットツリー
    /// * `force` - 既存インストールへの上書きを許可（マージ上書き、削除はしない）
    pub fn install(
        &self,
        target: &Path,
        bundle: &dyn Bundle,
        force: bool,
    ) -> Result<InstallOutcome, WorkflowError> {
        if !bundle.is_available() {
            return Err(WorkflowError::BundleMissing(bundle.describe()));
        }

        let installed_root = self.layout.installed_root(target);
        if installed_root.exists() && !force {
            return Err(WorkflowError::AlreadyInstalled {
                path: installed_root,
            });
        }

        bundle.check_destination(&installed_root)?;

        std::fs::create_dir_all(&installed_root)
            .map_err(|e| WorkflowError::io(&installed_root, e))?;
        let files_copied = bundle.copy_into(&installed_root)?;
        tracing::info!(
            "Installed {} files from {} into {}",
            files_copied,
            bundle.describe(),
            installed_root.display()
        );

        let mut warnings = Vec::new();

        let discovery_dir = self.layout.discovery_dir(target);
        let synced_workflows = match self.sync_workflows(target, &discovery_dir) {
            Ok(count) => {
                tracing::info!("Synced {} workflows to {}", count, discovery_dir.display());
                Some(count)
            }
            Err(e) => {
                tracing::warn!("Workflow sync failed: {}", e);
                warnings.push(InstallWarning::SyncFailed {
                    dir: discovery_dir,
                    reason: e.to_string(),
                });
                None
            }
        };

        let registry = self.inspect_registry(target, &mut warnings);

        Ok(InstallOutcome {
            installed_root,
            files_copied,
            synced_workflows,
            registry,
            warnings,
        })
    }

    /// workflows/ 直下の手順ファイルをIDE向けディレクトリにコピー
    fn sync_workflows(&self, target: &Path, discovery_dir: &Path) -> std::io::Result<usize> {
        std::fs::create_dir_all(discovery_dir)?;

        let mut synced = 0;
        for entry in std::fs::read_dir(self.layout.workflows_dir(target))? {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type()?.is_file() || !self.layout.is_procedure_file(&path) {
                continue;
            }

            std::fs::copy(&path, discovery_dir.join(entry.file_name()))?;
            synced += 1;
        }

        Ok(synced)
    }

    /// レジストリを読み込み、エンジンバージョンを確認
    fn inspect_registry(
        &self,
        target: &Path,
        warnings: &mut Vec<InstallWarning>,
    ) -> Option<Registry> {
        let path = self.layout.registry_path(target);
        if !path.exists() {
            tracing::debug!("No registry at {}", path.display());
            return None;
        }

        let registry = match Registry::load_from_file(&path) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!("{}", e);
                let reason = match e {
                    WorkflowError::RegistryCorrupt { reason, .. } => reason,
                    other => other.to_string(),
                };
                warnings.push(InstallWarning::RegistryUnreadable { reason });
                return None;
            }
        };

        if let Compatibility::Mismatch {
            cli_version,
            engine,
        } = check_compatibility(&self.cli_version, registry.engine.as_deref())
        {
            tracing::warn!("Engine mismatch: CLI v{} / registry engine {}", cli_version, engine);
            warnings.push(InstallWarning::EngineMismatch {
                cli_version,
                engine,
            });
        }

        Some(registry)
    }
}
