use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Server, ServerGuard};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::{TempDir, tempdir};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Module zip as served by a Go proxy: every entry under `{path}@v{version}/`.
fn create_proxy_zip(tooth: &str, version: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<()> = FileOptions::default();
    for (name, content) in files {
        zip.start_file(format!("{}@v{}/{}", tooth, version, name), options)
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

struct Fixture {
    server: ServerGuard,
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            server: Server::new(),
            root: tempdir().unwrap(),
        }
    }

    fn workspace(&self) -> &Path {
        self.root.path()
    }

    fn serve_list(&mut self, tooth: &str, versions: &[&str]) {
        let body: String = versions.iter().map(|v| format!("v{}\n", v)).collect();
        self.server
            .mock("GET", format!("/{}/@v/list", tooth).as_str())
            .with_status(200)
            .with_body(body)
            .create();
    }

    fn serve_zip(&mut self, tooth: &str, version: &str, files: &[(&str, &str)]) {
        self.server
            .mock("GET", format!("/{}/@v/v{}.zip", tooth, version).as_str())
            .with_status(200)
            .with_body(create_proxy_zip(tooth, version, files))
            .create();
    }

    fn lip(&self) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("lip"));
        cmd.env("GOPROXY", self.server.url())
            .env("LIP_CACHE_DIR", self.root.path().join(".cache"))
            .env_remove("LIP_WORKSPACE")
            .env_remove("RUST_LOG")
            .arg("--workspace")
            .arg(self.workspace());
        cmd
    }
}

const TOOTH_A: &str = r#"{
    "tooth": "example.com/a",
    "version": "1.0.0",
    "dependencies": { "example.com/b": [[">=1.0.0"]] },
    "information": { "name": "A", "author": "someone" },
    "placement": [{ "source": "a.txt", "destination": "plugins/a.txt" }],
    "possession": ["plugins/a.txt"]
}"#;

const TOOTH_B: &str = r#"{
    "tooth": "example.com/b",
    "version": "1.0.0",
    "placement": [{ "source": "lib/", "destination": "plugins/lib" }],
    "possession": ["plugins/lib/"]
}"#;

fn serve_a_and_b(fixture: &mut Fixture) {
    fixture.serve_list("example.com/a", &["1.0.0"]);
    fixture.serve_list("example.com/b", &["1.0.0", "1.1.0"]);
    fixture.serve_zip(
        "example.com/a",
        "1.0.0",
        &[("tooth.json", TOOTH_A), ("a.txt", "hello from a")],
    );
    fixture.serve_zip(
        "example.com/b",
        "1.0.0",
        &[("tooth.json", TOOTH_B), ("lib/b.json", "{}"), ("lib/x/y.txt", "y")],
    );
}

#[test]
fn test_end_to_end_install_uninstall_autoremove() {
    let mut fixture = Fixture::new();
    serve_a_and_b(&mut fixture);
    let ws = fixture.workspace().to_path_buf();

    fixture
        .lip()
        .arg("install")
        .arg("-y")
        .arg("example.com/a")
        .assert()
        .success()
        .stdout(predicates::str::contains("Installed example.com/b@1.0.0"))
        .stdout(predicates::str::contains("Installed example.com/a@1.0.0"));

    assert_eq!(
        std::fs::read_to_string(ws.join("plugins/a.txt")).unwrap(),
        "hello from a"
    );
    assert!(ws.join("plugins/lib/b.json").exists());
    assert!(ws.join("plugins/lib/x/y.txt").exists());
    assert!(ws.join(".lip/records/example.com%2Fa.json").exists());

    fixture
        .lip()
        .arg("list")
        .assert()
        .success()
        .stdout(predicates::str::contains("example.com/a 1.0.0\n"))
        .stdout(predicates::str::contains("example.com/b 1.0.0 (dependency)"));

    fixture
        .lip()
        .arg("show")
        .arg("example.com/a")
        .assert()
        .success()
        .stdout(predicates::str::contains("Name: A"))
        .stdout(predicates::str::contains("example.com/b >=1.0.0"));

    fixture
        .lip()
        .arg("uninstall")
        .arg("-y")
        .arg("example.com/a")
        .assert()
        .success()
        .stdout(predicates::str::contains("Uninstalled example.com/a@1.0.0"));
    assert!(!ws.join("plugins/a.txt").exists());
    assert!(ws.join("plugins/lib/b.json").exists());

    fixture
        .lip()
        .arg("autoremove")
        .arg("-y")
        .assert()
        .success()
        .stdout(predicates::str::contains("Removed example.com/b"));
    assert!(!ws.join("plugins/lib").exists());

    fixture
        .lip()
        .arg("list")
        .assert()
        .success()
        .stdout(predicates::str::contains("No tooths installed."));
}

#[test]
fn test_second_install_uses_cache_and_skips() {
    let mut fixture = Fixture::new();
    serve_a_and_b(&mut fixture);

    fixture
        .lip()
        .args(["install", "-y", "example.com/b"])
        .assert()
        .success();

    fixture
        .lip()
        .args(["install", "-y", "example.com/b"])
        .assert()
        .success()
        .stdout(predicates::str::contains("example.com/b@1.0.0 is already installed"));

    assert!(
        fixture
            .root
            .path()
            .join(".cache/example.com%2Fb@1.0.0.tth")
            .exists()
    );

    fixture
        .lip()
        .args(["cache", "info"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Archives: 1"));
}

#[test]
fn test_install_unknown_tooth_fails() {
    let mut fixture = Fixture::new();
    fixture
        .server
        .mock("GET", "/example.com/missing/@v/list")
        .with_status(404)
        .create();

    fixture
        .lip()
        .args(["install", "-y", "example.com/missing"])
        .assert()
        .failure()
        .stderr(predicates::str::contains(
            "tooth example.com/missing not found in repository",
        ));

    assert!(!fixture.workspace().join(".lip/records").exists());
}

#[test]
fn test_install_invalid_specifier_fails() {
    let fixture = Fixture::new();

    fixture
        .lip()
        .args(["install", "-y", "example.com/a@"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid specifier"));
}

#[test]
fn test_uninstall_not_installed_fails() {
    let fixture = Fixture::new();

    fixture
        .lip()
        .args(["uninstall", "-y", "example.com/a"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("tooth example.com/a is not installed"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let fixture = Fixture::new();

    fixture.lip().args(["-v", "-q", "list"]).assert().failure();
}
