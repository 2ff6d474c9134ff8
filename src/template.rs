//! テンプレート解決
//!
//! レジストリからテンプレートを探し、参照先ワークフローファイルのパスを返す。
//! ファイルの生成は行わない。

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::error::WorkflowError;
use crate::layout::Layout;
use crate::registry::load_registry;

/// 解決済みテンプレート
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    pub key: String,
    pub description: String,
    /// レジストリに書かれたファイル名
    pub workflow: String,
    /// ワークフローファイルの絶対パス
    pub path: PathBuf,
}

/// テンプレート名をワークフローファイルに解決
///
/// キーの存在確認のあと、参照先ファイルの存在を確認する。
/// 絶対パスや `..` などで workflows/ の外を指すものは `WorkflowFileMissing` とする。
pub fn resolve_template(
    layout: &Layout,
    target: &Path,
    key: &str,
) -> Result<ResolvedTemplate, WorkflowError> {
    let registry = load_registry(layout, target)?;

    let entry = registry
        .templates
        .get(key)
        .ok_or_else(|| WorkflowError::UnknownTemplate {
            name: key.to_string(),
            available: registry.template_names(),
        })?;

    let missing = |path: PathBuf| WorkflowError::WorkflowFileMissing {
        template: key.to_string(),
        workflow: entry.workflow.clone(),
        path,
    };

    let workflows_dir = layout.workflows_dir(target);
    let relative = Path::new(&entry.workflow);
    // ワークフローディレクトリ配下の相対パスのみ受け付ける
    if !is_plain_relative(relative) {
        return Err(missing(workflows_dir.join(relative)));
    }

    let path = workflows_dir.join(relative);
    if !path.is_file() {
        return Err(missing(path));
    }

    let path = std::fs::canonicalize(&path).map_err(|e| WorkflowError::io(&path, e))?;
    let root = std::fs::canonicalize(&workflows_dir)
        .map_err(|e| WorkflowError::io(&workflows_dir, e))?;
    // シンボリックリンク経由で外に出るものも拒否
    if !path.starts_with(&root) {
        return Err(missing(path));
    }

    tracing::debug!("Resolved template {} -> {}", key, path.display());

    Ok(ResolvedTemplate {
        key: key.to_string(),
        description: entry.description.clone(),
        workflow: entry.workflow.clone(),
        path,
    })
}

/// 空でなく、ルート・`..` を含まない相対パスか
fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
