//! 同梱アセットツリー
//!
//! インストール元となるアセットツリーを抽象化する。ディスク上のディレクトリと、
//! バイナリに埋め込まれたツリーの2種類がある。

pub mod embedded;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::WorkflowError;

pub use embedded::{EmbeddedAssets, EmbeddedBundle};

/// インストール元アセットツリー
pub trait Bundle {
    /// 表示用の説明（パスなど）
    fn describe(&self) -> String;

    /// アセットツリーが利用可能か
    fn is_available(&self) -> bool;

    /// `dest` へのコピーが安全か、書き込み前に確認する
    ///
    /// ディスク上のツリーは、コピー先と同一または包含関係にあると
    /// 自分自身を切り詰めたり再帰したりするため拒否する。
    fn check_destination(&self, _dest: &Path) -> Result<(), WorkflowError> {
        Ok(())
    }

    /// `dest` にツリーをコピーし、書き込んだファイル数を返す
    ///
    /// 既存ファイルは上書きし、バンドルに無いファイルは残す。
    fn copy_into(&self, dest: &Path) -> Result<usize, WorkflowError>;
}

/// ディスク上のディレクトリをアセットツリーとして扱う
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// 存在する最も近い祖先を正規化し、残りの要素をつなげ直す
///
/// まだ作られていないコピー先も比較できるようにする。
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path;
    let mut rest = Vec::new();

    loop {
        match std::fs::canonicalize(existing) {
            Ok(base) => {
                return Ok(rest.iter().rev().fold(base, |acc: PathBuf, name| acc.join(name)));
            }
            Err(e) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    rest.push(name.to_os_string());
                    existing = if parent.as_os_str().is_empty() {
                        Path::new(".")
                    } else {
                        parent
                    };
                }
                _ => return Err(e),
            },
        }
    }
}

impl Bundle for DirectoryBundle {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    fn check_destination(&self, dest: &Path) -> Result<(), WorkflowError> {
        let bundle = resolve_path(&self.root).map_err(|e| WorkflowError::io(&self.root, e))?;
        let resolved = resolve_path(dest).map_err(|e| WorkflowError::io(dest, e))?;

        if resolved.starts_with(&bundle) || bundle.starts_with(&resolved) {
            return Err(WorkflowError::BundleOverlap {
                bundle,
                dest: resolved,
            });
        }
        Ok(())
    }

    fn copy_into(&self, dest: &Path) -> Result<usize, WorkflowError> {
        self.check_destination(dest)?;

        let mut copied = 0;

        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                WorkflowError::io(path, e.into())
            })?;

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| WorkflowError::io(&target, e))?;
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| WorkflowError::io(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| WorkflowError::io(&target, e))?;
            tracing::debug!("Copied {}", relative.display());
            copied += 1;
        }

        Ok(copied)
    }
}
