//! Integration tests for bundler-compose

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn bundler_compose() -> Command {
        let mut cmd = cargo_bin_cmd!("bundler-compose");
        cmd.env_remove("BUNDLE_GEMFILE")
            .env_remove("BUNDLE_APP_CONFIG")
            .env_remove("BUNDLER_COMPOSE_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        bundler_compose()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("gems"))
            .stdout(predicate::str::contains("gemfiles"));
    }

    #[test]
    fn version_displays() {
        bundler_compose()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("bundler-compose"));
    }

    #[test]
    fn gems_requires_arguments() {
        bundler_compose().arg("gems").assert().failure();
    }

    #[test]
    fn config_path_honours_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        bundler_compose()
            .arg("--config")
            .arg(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        bundler_compose()
            .arg("--config")
            .arg(dir.path().join("config.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[exec]"))
            .stdout(predicate::str::contains("loader = \"bundler\""));
    }

    #[test]
    fn outside_a_project() {
        let dir = TempDir::new().unwrap();
        bundler_compose()
            .current_dir(dir.path())
            .arg("--config")
            .arg(dir.path().join("config.toml"))
            .args(["cache", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not locate Gemfile"));
    }
}

#[cfg(unix)]
mod compose_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const GEMFILE: &str = "source \"https://rubygems.org\"\n\ngem \"rake\"\n";

    const LOCK: &str = "\
GEM
  remote: https://rubygems.org/
  specs:
    rack (3.0.8)
    rake (13.0.1)

PLATFORMS
  ruby

DEPENDENCIES
  rake

BUNDLED WITH
   2.5.3
";

    /// Project whose `bundle` is `echo`, so exec prints its own arguments
    struct Fixture {
        dir: TempDir,
        config: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("Gemfile"), GEMFILE).unwrap();
            fs::write(dir.path().join("Gemfile.lock"), LOCK).unwrap();
            let config = dir.path().join("config.toml");
            fs::write(
                &config,
                "[exec]\nbundle_command = \"echo\"\n\n[definition]\nloader = \"lockfile\"\n",
            )
            .unwrap();
            Self { dir, config }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("bundler-compose");
            cmd.current_dir(self.root())
                .env_remove("BUNDLE_GEMFILE")
                .env_remove("BUNDLE_APP_CONFIG")
                .arg("--config")
                .arg(&self.config);
            cmd
        }

        fn composed(&self, slug: &str) -> PathBuf {
            self.root()
                .join(".bundle/bundler-compose")
                .join(slug)
                .join(format!("gems.{}.rb", slug))
        }
    }

    #[test]
    fn gems_composes_and_execs() {
        let fixture = Fixture::new();

        fixture
            .cmd()
            .args(["gems", "rack", "--", "--version"])
            .assert()
            .success()
            .stdout(predicate::str::contains("exec rack --version"))
            .stderr(predicate::str::contains("Composed"));

        let text = fs::read_to_string(fixture.composed("rack")).unwrap();
        assert!(text.starts_with("# lockfile:../../../Gemfile:"));
        assert!(text.contains("gem \"rack\", \"= 3.0.8\"\n"));
        assert!(text.contains("gem \"rake\", \"= 13.0.1\"\n"));
        assert_eq!(
            fs::read_to_string(fixture.root().join(".bundle/bundler-compose/rack/gems.rack.rb.lock"))
                .unwrap(),
            LOCK
        );

        fixture
            .cmd()
            .args(["gems", "rack", "--exec", "rackup"])
            .assert()
            .success()
            .stdout(predicate::str::contains("exec rackup"))
            .stderr(predicate::str::contains("Using"));
    }

    #[test]
    fn gemfiles_compose_with_eval_gemfile() {
        let fixture = Fixture::new();
        fs::write(fixture.root().join("extra.rb"), "gem \"pry\"\n").unwrap();

        fixture
            .cmd()
            .args(["gemfiles", "extra.rb", "-e", "pry"])
            .assert()
            .success()
            .stdout(predicate::str::contains("exec pry"));

        let text = fs::read_to_string(fixture.composed("gemfiles+extra.rb")).unwrap();
        assert!(text.contains("eval_gemfile \"../../../extra.rb\"\n"));
    }

    #[test]
    fn missing_gemfile_argument() {
        let fixture = Fixture::new();
        fixture
            .cmd()
            .args(["gemfiles", "nope.rb", "-e", "pry"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.rb"));
    }

    #[test]
    fn cache_list_and_clear() {
        let fixture = Fixture::new();
        fixture.cmd().args(["gems", "rack"]).assert().success();

        fixture
            .cmd()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout("rack\n");

        fixture
            .cmd()
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"fresh\""));

        fs::write(fixture.root().join("Gemfile.lock"), LOCK.replace("13.0.1", "13.1.0")).unwrap();
        fixture
            .cmd()
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"stale\""));

        fixture.cmd().args(["cache", "clear", "rack"]).assert().success();
        assert!(!fixture.composed("rack").exists());

        fixture
            .cmd()
            .args(["cache", "clear", "rack"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn missing_lockfile_hints_install() {
        let fixture = Fixture::new();
        fs::remove_file(fixture.root().join("Gemfile.lock")).unwrap();
        fixture
            .cmd()
            .args(["gems", "rack"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("bundle install"));
    }
}
