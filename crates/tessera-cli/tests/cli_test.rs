use assert_cmd::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("badges").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("tessera-cli"));
    cmd.env_remove("TESSERA_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf-8 stderr")
}

fn write_png(path: &Path, width: u32, height: u32) {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 0, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    fs::write(path, bytes).expect("write png");
}

/// A store whose default scope holds `clock` and `stack`, seeded through `normalize`.
fn seeded_store() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("tempdir");
    let shared = tmp.path().join("store").join("-default");
    fs::create_dir_all(&shared).expect("create default scope");
    for (name, file) in [("clock", "viewbox-only.svg"), ("stack", "inkscape.svg")] {
        let out = shared.join(format!("{name}.svg"));
        cli()
            .args(["normalize", "--name", name, "--out"])
            .arg(&out)
            .arg(fixture(file))
            .assert()
            .success();
        assert!(out.is_file());
    }
    tmp
}

fn store_arg(tmp: &tempfile::TempDir) -> PathBuf {
    tmp.path().join("store")
}

#[test]
fn normalize_prints_a_canonical_fragment() {
    let assert = cli()
        .arg("normalize")
        .arg(fixture("doctype.svg"))
        .assert()
        .success();
    let svg = stdout(assert.get_output());
    assert!(svg.starts_with("<svg"), "{svg}");
    assert!(svg.contains(r#"width="300px" height="100px""#));
    assert!(svg.contains(r#"<clipPath id="clip-doctype">"#));
    assert!(!svg.contains("DOCTYPE"));
}

#[test]
fn normalize_reads_stdin_with_an_explicit_type() {
    let assert = assert_cmd::Command::new(assert_cmd::cargo_bin!("tessera-cli"))
        .args(["normalize", "--name", "piped", "--type", "svg", "-"])
        .write_stdin(r#"<svg viewBox="0 0 50 25"><g/></svg>"#)
        .assert()
        .success();
    assert!(stdout(assert.get_output()).contains(r#"width="200px" height="100px""#));
}

#[test]
fn upload_then_render_a_grid() {
    let tmp = seeded_store();
    let png = tmp.path().join("wide.png");
    write_png(&png, 250, 100);

    let assert = cli()
        .args(["upload", "--owner", "alice", "--store"])
        .arg(store_arg(&tmp))
        .arg(&png)
        .assert()
        .success();
    let stored: serde_json::Value =
        serde_json::from_str(&stdout(assert.get_output())).expect("upload json");
    assert_eq!(stored["scope"], "alice");
    assert_eq!(stored["name"], "wide");
    assert_eq!(stored["mediaType"], "image/svg+xml");
    assert_eq!(stored["width"], 250.0);
    assert_eq!(stored["height"], 100.0);
    assert!(store_arg(&tmp).join("alice").join("wide.svg").is_file());

    let out = tmp.path().join("grid.svg");
    cli()
        .args(["render", "--owner", "alice", "--badge", "wide, clock,stack", "--row", "1"])
        .arg("--store")
        .arg(store_arg(&tmp))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    let svg = fs::read_to_string(&out).expect("read grid");
    // 100 + 5 + 40 + 5 + 80
    assert!(
        svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="230" height="40" viewBox="0 0 230 40">"#
        ),
        "{svg}"
    );
    assert_eq!(svg.matches(r#"height="40px""#).count(), 3);
}

#[test]
fn render_single_badge_to_stdout() {
    let tmp = seeded_store();
    let assert = cli()
        .args(["render", "--badge", "stack", "--store"])
        .arg(store_arg(&tmp))
        .assert()
        .success();
    let svg = stdout(assert.get_output());
    assert!(svg.contains(r#"width="80px" height="40px""#), "{svg}");
}

#[test]
fn unknown_badge_exits_with_not_found() {
    let tmp = seeded_store();
    let assert = cli()
        .args(["render", "--badge", "clock,missing", "--store"])
        .arg(store_arg(&tmp))
        .assert()
        .code(3);
    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    assert!(stderr(output).contains(r#"Could not find the badge named "missing""#));
}

#[test]
fn invalid_grid_is_reported_without_output() {
    let tmp = seeded_store();
    let assert = cli()
        .args(["render", "--badge", "clock,stack,clock", "--row", "1", "--col", "2"])
        .arg("--store")
        .arg(store_arg(&tmp))
        .assert()
        .code(1);
    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    assert!(stderr(output).contains("Invalid grid dimensions"));
}

#[test]
fn default_scope_is_read_only() {
    let tmp = seeded_store();
    let assert = cli()
        .args(["upload", "--owner", "-default", "--store"])
        .arg(store_arg(&tmp))
        .arg(fixture("doctype.svg"))
        .assert()
        .code(1);
    assert!(stderr(assert.get_output()).contains("default badges cannot be modified"));

    let assert = cli()
        .args(["upload", "--owner", "alice", "--name", "clock", "--store"])
        .arg(store_arg(&tmp))
        .arg(fixture("doctype.svg"))
        .assert()
        .code(1);
    assert!(stderr(assert.get_output()).contains(r#"already exists in scope "-default""#));
}

#[test]
fn unsupported_extension_is_rejected() {
    let tmp = seeded_store();
    let gif = tmp.path().join("anim.gif");
    fs::write(&gif, b"GIF89a").expect("write gif");
    let assert = cli()
        .args(["upload", "--owner", "alice", "--store"])
        .arg(store_arg(&tmp))
        .arg(&gif)
        .assert()
        .code(1);
    assert!(stderr(assert.get_output()).contains("Unsupported file type"));
}

#[test]
fn list_rename_and_delete_manage_an_owner_scope() {
    let tmp = seeded_store();
    let list = |scope: Option<&str>| {
        let mut cmd = cli();
        cmd.arg("list").arg("--store").arg(store_arg(&tmp));
        if let Some(scope) = scope {
            cmd.args(["--owner", scope]);
        }
        let assert = cmd.assert().success();
        stdout(assert.get_output()).trim().to_string()
    };

    assert_eq!(list(None), r#"{"scope":"-default","badges":["clock","stack"]}"#);

    cli()
        .args(["upload", "--owner", "alice", "--name", "logo", "--store"])
        .arg(store_arg(&tmp))
        .arg(fixture("doctype.svg"))
        .assert()
        .success();
    cli()
        .args(["rename", "--owner", "alice", "--name", "logo", "--to", "brand", "--store"])
        .arg(store_arg(&tmp))
        .assert()
        .success();
    assert_eq!(list(Some("alice")), r#"{"scope":"alice","badges":["brand"]}"#);
    let renamed = fs::read_to_string(store_arg(&tmp).join("alice").join("brand.svg")).unwrap();
    assert!(renamed.contains(r#"id="clip-brand""#));

    cli()
        .args(["delete", "--owner", "alice", "--name", "brand", "--store"])
        .arg(store_arg(&tmp))
        .assert()
        .success();
    assert_eq!(list(Some("alice")), r#"{"scope":"alice","badges":[]}"#);

    cli()
        .args(["delete", "--owner", "alice", "--name", "brand", "--store"])
        .arg(store_arg(&tmp))
        .assert()
        .code(3);
}

#[test]
fn config_file_sets_geometry_and_store_root() {
    let tmp = seeded_store();
    let config = tmp.path().join("tessera.json");
    let root = store_arg(&tmp);
    let json = serde_json::json!({ "rowHeight": 20, "storeRoot": root });
    fs::write(&config, json.to_string()).expect("write config");

    let assert = cli()
        .args(["render", "--badge", "clock", "--config"])
        .arg(&config)
        .assert()
        .success();
    assert!(stdout(assert.get_output()).contains(r#"width="20px" height="20px""#));
}

#[test]
fn usage_errors_exit_with_code_two() {
    cli().assert().code(2);
    cli().args(["render", "--badge"]).assert().code(2);
    cli().args(["render", "--row", "many"]).assert().code(2);
    cli().args(["normalize", "--bogus"]).assert().code(2);

    let assert = cli().args(["list"]).assert().code(2);
    assert!(stderr(assert.get_output()).contains("No badge store configured"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let assert = cli()
        .args(["--verbose", "normalize"])
        .arg(fixture("viewbox-only.svg"))
        .assert()
        .success();
    let output = assert.get_output();
    assert!(stdout(output).starts_with("<svg"));
    assert!(stderr(output).contains("normalized badge"));
}
