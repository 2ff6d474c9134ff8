//! 埋め込みアセットツリー
//!
//! ビルド時に bundle/ ディレクトリをバイナリに埋め込み、
//! パッケージ単体でインストールできるようにする

use rust_embed::Embed;
use std::path::{Path, PathBuf};

use super::Bundle;
use crate::error::WorkflowError;

/// 埋め込みアセット
#[derive(Embed)]
#[folder = "bundle/"]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    /// 埋め込みファイル一覧を取得（`/` 区切りの相対パス）
    pub fn files() -> Vec<String> {
        Self::iter().map(|s| s.to_string()).collect()
    }

    /// ファイル内容を取得
    pub fn get_content(path: &str) -> Option<String> {
        Self::get(path).map(|f| String::from_utf8_lossy(&f.data).to_string())
    }
}

/// 埋め込みアセットをインストール元として扱う
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedBundle;

impl Bundle for EmbeddedBundle {
    fn describe(&self) -> String {
        "embedded bundle".to_string()
    }

    fn is_available(&self) -> bool {
        EmbeddedAssets::iter().next().is_some()
    }

    fn copy_into(&self, dest: &Path) -> Result<usize, WorkflowError> {
        let mut copied = 0;

        for path in EmbeddedAssets::iter() {
            let Some(file) = EmbeddedAssets::get(&path) else {
                continue;
            };

            let target = embedded_target(dest, &path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| WorkflowError::io(parent, e))?;
            }
            std::fs::write(&target, &file.data).map_err(|e| WorkflowError::io(&target, e))?;
            tracing::debug!("Wrote {}", path);
            copied += 1;
        }

        Ok(copied)
    }
}

/// 埋め込みパスを出力先のOSパスに変換
fn embedded_target(dest: &Path, embedded_path: &str) -> PathBuf {
    embedded_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(dest.to_path_buf(), |acc, segment| acc.join(segment))
}
