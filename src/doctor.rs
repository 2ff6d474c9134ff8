//! インストール整合性チェック
//!
//! 期待されるパスを順に確認し、エージェント・スキル・ワークフローの数と
//! レジストリのバージョン情報を集計する。読み取り専用で、修復は行わない。

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::layout::Layout;
use crate::registry::Registry;

/// チェック項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    /// 表示名（例: `core/agents/`）
    pub label: String,
    pub path: PathBuf,
    pub present: bool,
}

/// 各ディレクトリの件数（ディレクトリが無い場合はNone）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryCounts {
    pub agents: Option<usize>,
    pub skills: Option<usize>,
    pub workflows: Option<usize>,
}

/// レジストリの状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistryStatus {
    Absent,
    Parsed { engine: String, version: String },
    Corrupt { reason: String },
}

/// 整合性チェック結果
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub target: PathBuf,
    pub checks: Vec<CheckItem>,
    pub counts: InventoryCounts,
    pub registry: RegistryStatus,
    pub healthy: bool,
}

impl IntegrityReport {
    /// 見つからなかった項目
    pub fn missing(&self) -> Vec<&CheckItem> {
        self.checks.iter().filter(|c| !c.present).collect()
    }
}

/// チェックリスト（順序固定）
fn checklist(layout: &Layout, target: &Path) -> Vec<(String, PathBuf)> {
    vec![
        (layout.root_label(), layout.installed_root(target)),
        ("core/agents/".to_string(), layout.agents_dir(target)),
        ("core/skills/".to_string(), layout.skills_dir(target)),
        ("core/shared/".to_string(), layout.shared_dir(target)),
        ("workflows/".to_string(), layout.workflows_dir(target)),
        ("workflows/registry.json".to_string(), layout.registry_path(target)),
        ("scripts/".to_string(), layout.scripts_dir(target)),
        (format!("rules/{}", layout.rules_file), layout.rules_path(target)),
        (layout.architecture_file.clone(), layout.architecture_path(target)),
    ]
}

/// `target` のインストール状態を検査
///
/// 全項目を必ず評価する（途中で打ち切らない）。
pub fn check_integrity(layout: &Layout, target: &Path) -> IntegrityReport {
    let checks: Vec<CheckItem> = checklist(layout, target)
        .into_iter()
        .map(|(label, path)| {
            let present = path.exists();
            tracing::debug!("check {}: {}", label, if present { "ok" } else { "missing" });
            CheckItem {
                label,
                path,
                present,
            }
        })
        .collect();

    let counts = InventoryCounts {
        agents: count_entries(&layout.agents_dir(target), |path| {
            path.is_file() && layout.is_agent_file(path)
        }),
        skills: count_entries(&layout.skills_dir(target), |path| path.is_dir()),
        workflows: count_entries(&layout.workflows_dir(target), |path| {
            path.is_file() && layout.is_procedure_file(path)
        }),
    };

    let registry_path = layout.registry_path(target);
    let registry = if registry_path.exists() {
        match Registry::load_from_file(&registry_path) {
            Ok(registry) => RegistryStatus::Parsed {
                engine: registry.engine_label().to_string(),
                version: registry.version_label().to_string(),
            },
            Err(e) => {
                tracing::warn!("{}", e);
                RegistryStatus::Corrupt {
                    reason: e.to_string(),
                }
            }
        }
    } else {
        RegistryStatus::Absent
    };

    let healthy = checks.iter().all(|c| c.present)
        && !matches!(registry, RegistryStatus::Corrupt { .. });

    IntegrityReport {
        target: target.to_path_buf(),
        checks,
        counts,
        registry,
        healthy,
    }
}

/// ディレクトリ直下で条件に合うエントリ数を数える
fn count_entries(dir: &Path, predicate: impl Fn(&Path) -> bool) -> Option<usize> {
    if !dir.is_dir() {
        return None;
    }

    match std::fs::read_dir(dir) {
        Ok(entries) => Some(
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| predicate(entry.path().as_path()))
                .count(),
        ),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", dir.display(), e);
            None
        }
    }
}
