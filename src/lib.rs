//! achira-wf: Achira Workflow OS インストーラー
//!
//! エージェント・スキル・ワークフロー定義のアセットツリーをプロジェクトに
//! インストールし、テンプレートの解決とインストール状態の検査を行うCLIツール。

pub mod bundle;
pub mod cli;
pub mod config;
pub mod doctor;
pub mod error;
pub mod installer;
pub mod layout;
pub mod registry;
pub mod template;

#[cfg(test)]
mod test_support;

// 主要な型の再エクスポート
pub use bundle::{Bundle, DirectoryBundle, EmbeddedBundle};
pub use config::{BundleConfig, Config};
pub use doctor::{check_integrity, CheckItem, IntegrityReport, InventoryCounts, RegistryStatus};
pub use error::{InstallWarning, WorkflowError};
pub use installer::{InstallOutcome, Installer};
pub use layout::Layout;
pub use registry::{check_compatibility, load_registry, Compatibility, Registry};
pub use template::{resolve_template, ResolvedTemplate};

/// バージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
