//! インストール先ディレクトリ構成
//!
//! `.achira/` 配下の各パスを、明示的に渡されたターゲットルートから組み立てる。

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// インストールツリーのパス定義
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Layout {
    /// インストールルート（ターゲットからの相対パス）
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// IDE向けワークフロー同期先（ターゲットからの相対パス）
    #[serde(default = "default_discovery_dir")]
    pub discovery_dir: String,
    /// ワークフロー手順ファイルの拡張子
    #[serde(default = "default_markdown_extension")]
    pub procedure_extension: String,
    /// エージェント定義ファイルの拡張子
    #[serde(default = "default_markdown_extension")]
    pub agent_extension: String,
    /// rules/ 配下のルールファイル名
    #[serde(default = "default_rules_file")]
    pub rules_file: String,
    /// ルート直下のアーキテクチャドキュメント名
    #[serde(default = "default_architecture_file")]
    pub architecture_file: String,
}

fn default_root_dir() -> String {
    ".achira".to_string()
}

fn default_discovery_dir() -> String {
    ".agent/workflows".to_string()
}

fn default_markdown_extension() -> String {
    "md".to_string()
}

fn default_rules_file() -> String {
    "GEMINI.md".to_string()
}

fn default_architecture_file() -> String {
    "ARCHITECTURE.md".to_string()
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            discovery_dir: default_discovery_dir(),
            procedure_extension: default_markdown_extension(),
            agent_extension: default_markdown_extension(),
            rules_file: default_rules_file(),
            architecture_file: default_architecture_file(),
        }
    }
}

impl Layout {
    pub fn installed_root(&self, target: &Path) -> PathBuf {
        join_relative(target, &self.root_dir)
    }

    pub fn agents_dir(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join("core").join("agents")
    }

    pub fn skills_dir(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join("core").join("skills")
    }

    pub fn shared_dir(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join("core").join("shared")
    }

    pub fn workflows_dir(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join("workflows")
    }

    pub fn registry_path(&self, target: &Path) -> PathBuf {
        self.workflows_dir(target).join("registry.json")
    }

    pub fn scripts_dir(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join("scripts")
    }

    pub fn rules_path(&self, target: &Path) -> PathBuf {
        self.installed_root(target)
            .join("rules")
            .join(&self.rules_file)
    }

    pub fn architecture_path(&self, target: &Path) -> PathBuf {
        self.installed_root(target).join(&self.architecture_file)
    }

    pub fn discovery_dir(&self, target: &Path) -> PathBuf {
        join_relative(target, &self.discovery_dir)
    }

    /// 表示用のルートラベル（例: `.achira/`）
    pub fn root_label(&self) -> String {
        format!("{}/", self.root_dir.trim_end_matches('/'))
    }

    /// 拡張子が手順ファイルのものか判定
    pub fn is_procedure_file(&self, path: &Path) -> bool {
        has_extension(path, &self.procedure_extension)
    }

    pub fn is_agent_file(&self, path: &Path) -> bool {
        has_extension(path, &self.agent_extension)
    }
}

/// `/` 区切りの相対パスをOSのパスとして連結
fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == extension)
        .unwrap_or(false)
}
