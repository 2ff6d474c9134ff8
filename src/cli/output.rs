//! 色付き出力モジュール
//!
//! CLIの出力を色分けして表示するためのユーティリティ関数を提供

use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::Write;

/// Unicodeアイコンとフォールバック文字
pub struct Icons;

impl Icons {
    /// 成功アイコン
    pub fn success() -> &'static str {
        if Self::supports_unicode() { "✔" } else { "[+]" }
    }

    /// エラーアイコン
    pub fn error() -> &'static str {
        if Self::supports_unicode() { "✖" } else { "[x]" }
    }

    /// 警告アイコン
    pub fn warning() -> &'static str {
        if Self::supports_unicode() { "⚠" } else { "[!]" }
    }

    pub fn arrow() -> &'static str {
        if Self::supports_unicode() { "→" } else { "->" }
    }

    pub fn dash() -> &'static str {
        if Self::supports_unicode() { "—" } else { "-" }
    }

    /// Unicode対応チェック（環境変数でオーバーライド可能）
    fn supports_unicode() -> bool {
        // 環境変数でフォールバックを強制
        if std::env::var("ACHIRA_WF_NO_UNICODE").is_ok() {
            return false;
        }
        // TERM環境変数をチェック
        std::env::var("TERM").map_or(false, |term| {
            !term.contains("dumb") && !term.contains("linux")
        })
    }
}

fn print_colored<W: Write>(out: &mut W, color: Color, text: &str) {
    let _ = execute!(
        out,
        SetForegroundColor(color),
        Print(format!("{}\n", text)),
        ResetColor
    );
}

/// コマンド見出しをシアン+太字で出力
pub fn print_header<W: Write>(out: &mut W, title: &str) {
    let _ = execute!(
        out,
        SetForegroundColor(Color::Cyan),
        SetAttribute(Attribute::Bold),
        Print(format!("\n  {}\n\n", title)),
        SetAttribute(Attribute::Reset),
        ResetColor
    );
}

/// セクション見出しをシアンで出力
pub fn print_section<W: Write>(out: &mut W, title: &str) {
    print_colored(out, Color::Cyan, &format!("\n  {}\n", title));
}

/// 成功メッセージを緑色で出力
pub fn print_success<W: Write>(out: &mut W, msg: &str) {
    print_colored(out, Color::Green, &format!("  {}  {}", Icons::success(), msg));
}

/// エラーメッセージを赤色で出力
pub fn print_error<W: Write>(out: &mut W, msg: &str) {
    print_colored(out, Color::Red, &format!("  {}  {}", Icons::error(), msg));
}

/// 警告メッセージを黄色で出力
pub fn print_warning<W: Write>(out: &mut W, msg: &str) {
    print_colored(out, Color::Yellow, &format!("  {}  {}", Icons::warning(), msg));
}

/// 補足情報をグレーで出力
pub fn print_muted<W: Write>(out: &mut W, msg: &str) {
    print_colored(out, Color::DarkGrey, &format!("  {}", msg));
}

/// 通常テキストを出力
pub fn print_plain<W: Write>(out: &mut W, msg: &str) {
    print_colored(out, Color::White, &format!("  {}", msg));
}

/// 一覧の1行（名前=白、説明=グレー）を出力
pub fn print_entry<W: Write>(out: &mut W, name: &str, description: &str) {
    let _ = execute!(
        out,
        SetForegroundColor(Color::White),
        Print(format!("    {}", name)),
        SetForegroundColor(Color::DarkGrey),
        Print(format!("  {} {}\n", Icons::dash(), description)),
        ResetColor
    );
}

/// 空行を出力
pub fn print_blank<W: Write>(out: &mut W) {
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(write: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        write(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_success_writes_one_line() {
        let text = rendered(|out| print_success(out, "core/agents/"));

        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.contains(&format!("{}  core/agents/", Icons::success())));
    }

    #[test]
    fn test_print_entry_keeps_name_and_description() {
        let text = rendered(|out| print_entry(out, "/plan", "Write a plan"));

        assert!(text.contains("    /plan"));
        assert!(text.contains(&format!("{} Write a plan", Icons::dash())));
    }
}
