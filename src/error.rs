//! エラー型定義
//!
//! インストール・テンプレート解決・レジストリ読み込みで発生するエラーと、
//! 処理を止めない警告を定義する。

use std::path::PathBuf;
use thiserror::Error;

/// コマンドを中断させるエラー
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 同梱アセットが見つからない（配布物の破損）
    #[error("Bundle not found: {0}")]
    BundleMissing(String),

    /// インストール済み（--force 未指定）
    #[error("{} already exists at target. Use --force to overwrite.", .path.display())]
    AlreadyInstalled { path: PathBuf },

    /// 未インストール
    #[error("No {} found. Run `achira-wf init` first.", .root.display())]
    NotInstalled { root: PathBuf },

    /// registry.json のパース失敗
    #[error("Could not parse registry {}: {reason}", .path.display())]
    RegistryCorrupt { path: PathBuf, reason: String },

    /// 未登録のテンプレート名
    #[error("Unknown template: \"{name}\". Available: {}", .available.join(", "))]
    UnknownTemplate { name: String, available: Vec<String> },

    /// レジストリが参照するワークフローファイルが存在しない
    #[error("Workflow file not found for template \"{template}\": {workflow}")]
    WorkflowFileMissing {
        template: String,
        workflow: String,
        path: PathBuf,
    },

    /// バンドルとインストール先が同一、または一方が他方を含む
    #[error("Bundle {} overlaps install destination {}", .bundle.display(), .dest.display())]
    BundleOverlap { bundle: PathBuf, dest: PathBuf },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// インストール時のベストエフォート処理で発生した警告
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallWarning {
    /// IDE向けワークフロー同期の失敗
    #[error("Could not sync {}: {reason}", .dir.display())]
    SyncFailed { dir: PathBuf, reason: String },

    /// registry.json を読めなかった
    #[error("Could not parse registry.json: {reason}")]
    RegistryUnreadable { reason: String },

    /// CLIとレジストリのメジャーバージョン不一致
    #[error("Engine mismatch: CLI v{cli_version} / registry engine {engine}")]
    EngineMismatch { cli_version: String, engine: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_lists_available() {
        let err = WorkflowError::UnknownTemplate {
            name: "vue".to_string(),
            available: vec!["html".to_string(), "next".to_string(), "react".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"vue\""));
        assert!(msg.contains("html, next, react"));
    }

    #[test]
    fn test_engine_mismatch_message() {
        let warning = InstallWarning::EngineMismatch {
            cli_version: "2.0.0".to_string(),
            engine: "1.4.0".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Engine mismatch: CLI v2.0.0 / registry engine 1.4.0"
        );
    }
}
