//! 設定ファイル管理モジュール
//!
//! config.tomlから設定を読み込み、インストール先のパス構成と
//! バンドルの場所を型安全な設定構造体として提供します。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::layout::Layout;

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// インストールツリーのパス構成
    #[serde(default)]
    pub layout: Layout,
    /// バンドル関連設定
    #[serde(default)]
    pub bundle: BundleConfig,
}

/// バンドル設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleConfig {
    /// ディスク上のバンドルディレクトリ（未指定なら埋め込み版を使用）
    pub path: Option<String>,
}

impl Config {
    /// TOMLファイルから設定を読み込む
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// TOML文字列から設定をパース
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// デフォルト設定ファイルパスを取得
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(config_path) = std::env::var("ACHIRA_WF_CONFIG") {
            if !config_path.is_empty() {
                return Some(PathBuf::from(config_path));
            }
        }

        // ホームディレクトリの.achira-wf/config.toml
        dirs::home_dir().map(|home| home.join(".achira-wf").join("config.toml"))
    }

    /// 設定を読み込む（ファイルが無ければデフォルト）
    ///
    /// 明示的に指定されたファイルが無い場合はエラー。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// バンドルディレクトリを解決（CLI引数 > 設定ファイル > 環境変数）
    pub fn bundle_dir(&self, cli_bundle: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_bundle {
            return Some(path.to_path_buf());
        }
        if let Some(path) = &self.bundle.path {
            return Some(PathBuf::from(path));
        }
        std::env::var("ACHIRA_WF_BUNDLE")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
