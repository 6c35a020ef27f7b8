use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SHOP_KDL: &str = r#"
app "shop" version=2

exposed-ports 5000

process "web" routable=#true {
    command "gunicorn" "app:app"
    units 2
}

process "worker" {
    command "celery" "worker"
}

labels {
    item target="deployment" process="web" version=2 {
        tier "frontend"
    }
    item target="deployment" process="web" version=3 {
        canary "true"
    }
}
"#;

pub struct TestProject {
    pub root: TempDir,
    config_home: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config_home = tempfile::tempdir().unwrap();
        Self { root, config_home }
    }

    pub fn write_procflow_kdl(&self, content: &str) {
        let path = self.root.path().join("procflow.kdl");
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクト直下で実行するコマンド（ホスト側の設定・環境変数の影響を受けない）
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("procflow").unwrap();
        cmd.current_dir(self.path())
            .env_remove("PROCFLOW_CONFIG_PATH")
            .env_remove("PROCFLOW_DEPLOYMENT_VERSION")
            .env("XDG_CONFIG_HOME", self.config_home.path());
        cmd
    }
}
