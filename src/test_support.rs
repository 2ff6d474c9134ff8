//! テスト用フィクスチャ
//!
//! エージェント3件・スキル2件・ワークフロー4件を持つバンドルを生成する。

use std::fs;
use std::path::Path;

pub const FIXTURE_AGENTS: usize = 3;
pub const FIXTURE_SKILLS: usize = 2;
pub const FIXTURE_WORKFLOWS: usize = 4;

pub const FIXTURE_REGISTRY: &str = r#"{
  "engine": "1.0.0",
  "version": "0.3.0",
  "templates": {
    "react": { "description": "React + Vite app", "workflow": "create-react.md" },
    "next": { "description": "Next.js app", "workflow": "create-next.md" },
    "html": { "description": "Static site", "workflow": "create-html.md" }
  },
  "commands": {
    "create": { "description": "Scaffold a project" },
    "plan": { "description": "Write a plan" }
  }
}"#;

/// `root` にフィクスチャバンドルを作成
pub fn write_fixture_bundle(root: &Path) {
    let agents = root.join("core").join("agents");
    let skills = root.join("core").join("skills");
    let shared = root.join("core").join("shared");
    let workflows = root.join("workflows");

    for dir in [&agents, &skills, &shared, &workflows] {
        fs::create_dir_all(dir).unwrap();
    }
    fs::create_dir_all(root.join("scripts")).unwrap();
    fs::create_dir_all(root.join("rules")).unwrap();

    for name in ["orchestrator", "planner", "reviewer"] {
        fs::write(agents.join(format!("{}.md", name)), format!("# {}", name)).unwrap();
    }
    // 拡張子違いはカウント対象外
    fs::write(agents.join("README.txt"), "notes").unwrap();

    for name in ["brainstorming", "plan-writing"] {
        fs::create_dir_all(skills.join(name)).unwrap();
        fs::write(skills.join(name).join("SKILL.md"), format!("# {}", name)).unwrap();
    }
    // ディレクトリ以外はスキルとして数えない
    fs::write(skills.join("index.md"), "index").unwrap();

    for name in ["create-react", "create-next", "create-html", "plan"] {
        fs::write(workflows.join(format!("{}.md", name)), format!("# {}", name)).unwrap();
    }
    fs::write(workflows.join("registry.json"), FIXTURE_REGISTRY).unwrap();

    fs::write(shared.join("conventions.md"), "# Conventions").unwrap();
    fs::write(root.join("scripts").join("run.sh"), "#!/bin/sh\n").unwrap();
    fs::write(root.join("rules").join("GEMINI.md"), "# Rules").unwrap();
    fs::write(root.join("ARCHITECTURE.md"), "# Architecture").unwrap();
}
