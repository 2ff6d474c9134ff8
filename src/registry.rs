//! ワークフローレジストリ（workflows/registry.json）
//!
//! テンプレートとスラッシュコマンドの一覧、および互換エンジンバージョンを保持する。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WorkflowError;
use crate::layout::Layout;

/// レジストリ本体
///
/// テンプレートとコマンドはファイルに書かれた順序を保つ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// 互換CLIバージョン（semver）
    #[serde(default)]
    pub engine: Option<String>,
    /// コンテンツのバージョン
    #[serde(default)]
    pub version: Option<String>,
    /// テンプレート名 -> テンプレート定義
    #[serde(default)]
    pub templates: IndexMap<String, TemplateEntry>,
    /// スラッシュコマンド名 -> コマンド定義
    #[serde(default)]
    pub commands: IndexMap<String, CommandEntry>,
}

/// プロジェクトスキャフォールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    #[serde(default)]
    pub description: String,
    /// workflows/ 配下のファイル名
    pub workflow: String,
}

/// スラッシュコマンド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    #[serde(default)]
    pub description: String,
}

impl Registry {
    /// JSON文字列からパース
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// ファイルから読み込み
    ///
    /// 読み込み・パースの失敗はどちらも `RegistryCorrupt` になる。
    pub fn load_from_file(path: &Path) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path).map_err(|e| WorkflowError::RegistryCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| WorkflowError::RegistryCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// 登録済みテンプレート名（ファイル順）
    pub fn template_names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// 表示用エンジンバージョン
    pub fn engine_label(&self) -> &str {
        self.engine.as_deref().unwrap_or("unknown")
    }

    pub fn version_label(&self) -> &str {
        self.version.as_deref().unwrap_or("unknown")
    }
}

/// インストール済みツリーからレジストリを読み込む
pub fn load_registry(layout: &Layout, target: &Path) -> Result<Registry, WorkflowError> {
    let path = layout.registry_path(target);
    if !path.exists() {
        return Err(WorkflowError::NotInstalled {
            root: layout.installed_root(target),
        });
    }

    let registry = Registry::load_from_file(&path)?;
    tracing::debug!(
        "Loaded registry {} ({} templates, {} commands)",
        path.display(),
        registry.templates.len(),
        registry.commands.len()
    );
    Ok(registry)
}

/// エンジン互換性の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    Mismatch { cli_version: String, engine: String },
}

/// CLIバージョンとレジストリのエンジンバージョンのメジャー番号を比較
///
/// どちらかのメジャー番号が読めない場合は不一致として扱う。
pub fn check_compatibility(cli_version: &str, engine: Option<&str>) -> Compatibility {
    let engine_label = engine.unwrap_or("unknown");
    let cli_major = major_version(cli_version);
    let engine_major = engine.and_then(major_version);

    match (cli_major, engine_major) {
        (Some(a), Some(b)) if a == b => Compatibility::Compatible,
        _ => Compatibility::Mismatch {
            cli_version: cli_version.to_string(),
            engine: engine_label.to_string(),
        },
    }
}

/// バージョン文字列の先頭の数字列をメジャー番号として取り出す
///
/// 先頭の `v` は無視する（`v2.1.0` -> 2）。
pub fn major_version(version: &str) -> Option<u64> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
