//! End-to-end tests: generate a server module and run it.
//!
//! The slow tests build a throwaway crate holding the example service, the
//! generated dispatcher and a check suite comparing dispatcher output with
//! the reference codec in `caefte-define`.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use caefte_gen::config::GeneratorConfig;
use caefte_gen::output::generate_and_write;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/example_controller.rs");

const ROUTES_MANIFEST: &str = r#"[package]
name = "routes"
version = "0.1.0"
edition = "2024"

[lib]
proc-macro = true
"#;

const ROUTES_LIB: &str = r#"use proc_macro::TokenStream;

#[proc_macro_attribute]
pub fn get(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}

#[proc_macro_attribute]
pub fn post(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}
"#;

const HOST_LIB: &str = "pub mod api;\npub mod controllers;\n\n#[cfg(test)]\nmod checks;\n";

const HOST_CHECKS: &str = r#"use std::future::Future;
use std::task::{Context, Poll, Waker};

use caefte_define::prelude::*;

fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = std::pin::pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
            return value;
        }
    }
}

fn fetch(path: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let matched = block_on(crate::api::dispatch(path, &mut out)).expect("dispatch");
    matched.then_some(out)
}

fn expect(path: &str, shape: TypeDescriptor, value: WireValue) {
    let mut expected = Vec::new();
    encode(&value, &mut expected).expect("encode");
    let actual = fetch(path).expect("route should match");
    assert_eq!(actual, expected, "{path}");

    let mut buf = actual.as_slice();
    assert_eq!(decode(&shape, &mut buf).expect("decode"), value, "{path}");
    assert!(buf.is_empty(), "{path}: trailing bytes");
}

fn string(s: &str) -> WireValue {
    WireValue::String(s.to_string())
}

fn strings() -> TypeDescriptor {
    TypeDescriptor::list_of(PrimitiveKind::Utf8String.into())
}

#[test]
fn scalars() {
    expect("/api/rng", PrimitiveKind::Int32.into(), WireValue::Int32(4));
    expect("/api/async_rng", PrimitiveKind::Int32.into(), WireValue::Int32(-17));
    expect("/api/version", PrimitiveKind::Utf8String.into(), string("1.2.3"));
    expect("/api/initial", PrimitiveKind::Utf16Char.into(), WireValue::Char(u16::from(b'Z')));
    expect("/api/ratio", PrimitiveKind::Float64.into(), WireValue::Float64(0.625));
}

#[test]
fn lists() {
    expect(
        "/api/files",
        strings(),
        WireValue::List(vec![string("a.txt"), string("b.txt"), string("ü.md")]),
    );
    expect("/api/recent", strings(), WireValue::List(vec![string("latest"), string("")]));
    expect(
        "/api/groups",
        TypeDescriptor::list_of(strings()),
        WireValue::List(vec![WireValue::List(vec![string("x")]), WireValue::List(vec![])]),
    );
    expect(
        "/api/flags",
        TypeDescriptor::list_of(PrimitiveKind::Bool.into()),
        WireValue::List(vec![WireValue::Bool(true), WireValue::Bool(false), WireValue::Bool(true)]),
    );
}

#[test]
fn unknown_paths_fall_through() {
    assert_eq!(fetch("/api/missing"), None);
    assert_eq!(fetch("/api/rng/"), None);
}

#[test]
fn rejects_characters_outside_the_bmp() {
    let mut out = Vec::new();
    let err = crate::api::encode_char(&mut out, '🦀').unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
"#;

const ELM_JSON: &str = r#"{
    "type": "application",
    "source-directories": ["src"],
    "elm-version": "0.19.1",
    "dependencies": {
        "direct": {
            "elm/bytes": "1.0.8",
            "elm/core": "1.0.5",
            "elm/http": "2.0.0"
        },
        "indirect": {
            "elm/file": "1.0.5",
            "elm/json": "1.1.3",
            "elm/time": "1.0.0"
        }
    },
    "test-dependencies": {
        "direct": {},
        "indirect": {}
    }
}
"#;

/// Lays out a workspace with the `routes` marker crate and a host crate
/// containing the fixture and the generated server module.
fn build_host(root: &Path) -> std::path::PathBuf {
    let define_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../define");
    let routes_dir = root.join("routes");
    let host_dir = root.join("host");

    fs::create_dir_all(routes_dir.join("src")).unwrap();
    fs::write(routes_dir.join("Cargo.toml"), ROUTES_MANIFEST).unwrap();
    fs::write(routes_dir.join("src/lib.rs"), ROUTES_LIB).unwrap();

    fs::create_dir_all(host_dir.join("src")).unwrap();
    let host_manifest = format!(
        "[package]\nname = \"host\"\nversion = \"0.1.0\"\nedition = \"2024\"\n\n[workspace]\n\n\
         [dependencies]\nroutes = {{ path = \"../routes\" }}\n\n\
         [dev-dependencies]\ncaefte-define = {{ path = {:?} }}\n",
        define_dir.display().to_string()
    );
    fs::write(host_dir.join("Cargo.toml"), host_manifest).unwrap();
    fs::write(host_dir.join("src/lib.rs"), HOST_LIB).unwrap();
    fs::write(host_dir.join("src/checks.rs"), HOST_CHECKS).unwrap();
    fs::copy(FIXTURE, host_dir.join("src/controllers.rs")).unwrap();

    let config = GeneratorConfig {
        module_root: "crate::controllers".to_string(),
        ..GeneratorConfig::default()
    };
    generate_and_write(
        &host_dir.join("src/controllers.rs"),
        &host_dir.join("src/api.rs"),
        &config,
        false,
    )
    .expect("Failed to generate server module");

    host_dir
}

/// Builds `cargo <subcommand> --manifest-path <host> <args>`; trailing args
/// may contain `--` and belong to the subcommand's driver.
fn cargo_command(host_dir: &Path, subcommand: &str, args: &[&str]) -> Command {
    let mut command = Command::new("cargo");
    command
        .arg(subcommand)
        .arg("--manifest-path")
        .arg(host_dir.join("Cargo.toml"))
        .args(args);
    command
}

/// Lays out an Elm application holding the generated client module.
fn build_client(root: &Path) -> std::path::PathBuf {
    let client_dir = root.join("client");
    fs::create_dir_all(client_dir.join("src")).unwrap();
    fs::write(client_dir.join("elm.json"), ELM_JSON).unwrap();

    generate_and_write(
        Path::new(FIXTURE),
        &client_dir.join("src/Api.elm"),
        &GeneratorConfig::default(),
        false,
    )
    .expect("Failed to generate client module");

    client_dir
}

fn run_cargo(host_dir: &Path, subcommand: &str, args: &[&str]) {
    let output = cargo_command(host_dir, subcommand, args)
        .output()
        .expect("Failed to run cargo");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "cargo {} {} failed:\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
            subcommand,
            args.join(" "),
            stdout,
            stderr
        );
    }
}

/// Tests that the generated dispatcher compiles and writes the bytes the
/// reference codec produces.
#[test]
#[ignore = "slow: compiles and runs generated code"]
fn generated_dispatcher_matches_reference_codec() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let host_dir = build_host(temp_dir.path());
    run_cargo(&host_dir, "test", &[]);
}

/// Tests that generated code has no clippy warnings.
#[test]
#[ignore = "slow: runs clippy on generated code"]
fn generated_dispatcher_passes_clippy() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let host_dir = build_host(temp_dir.path());
    run_cargo(&host_dir, "clippy", &["--all-targets", "--", "-D", "warnings"]);
}

/// Tests that the generated client compiles with `elm make`.
#[test]
#[ignore = "slow: needs the elm compiler and package downloads"]
fn generated_client_compiles_with_elm() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let client_dir = build_client(temp_dir.path());

    let output = Command::new("elm")
        .args(["make", "src/Api.elm", "--output=/dev/null"])
        .current_dir(&client_dir)
        .output()
        .expect("Failed to run elm");

    if !output.status.success() {
        panic!(
            "elm make failed:\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn cargo_driver_flags_follow_manifest_path() {
    let host_dir = Path::new("/tmp/host");
    let command = cargo_command(host_dir, "clippy", &["--all-targets", "--", "-D", "warnings"]);
    let args: Vec<_> = command
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    assert_eq!(args[0], "clippy");
    assert_eq!(args[1], "--manifest-path");
    let separator = args.iter().position(|arg| arg == "--").unwrap();
    assert!(separator > 2);
    assert_eq!(&args[separator + 1..], ["-D", "warnings"]);
}

/// Verifies the generated files exist and have the expected structure.
#[test]
fn generated_host_has_expected_structure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let host_dir = build_host(temp_dir.path());

    let api = fs::read_to_string(host_dir.join("src/api.rs")).expect("Failed to read api.rs");
    assert!(api.contains("//!"));
    assert!(api.contains("use std::io::{self, Write};"));
    assert!(api.contains("crate::controllers::ExampleController::default().rng();"));
    assert!(api.contains("pub fn encode_list_of_bool<W: Write>("));
    assert!(api.contains("items: &[bool]"));

    let manifest = fs::read_to_string(host_dir.join("Cargo.toml")).unwrap();
    assert!(manifest.contains("routes = { path = \"../routes\" }"));
}
