use std::fs;
use std::path::Path;

const VERSION_ENV: &str = "UNIDASH_VERSION";

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .expect("cargo sets CARGO_MANIFEST_DIR for build scripts");
    let workspace_root = Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("unidash-app lives two levels below the workspace root");
    let version_file = workspace_root.join("VERSION");
    println!("cargo:rerun-if-changed={}", version_file.display());

    let contents = fs::read_to_string(&version_file)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_file.display()));
    let version = contents.trim();
    assert!(
        !version.is_empty() && !version.contains(char::is_whitespace),
        "{} must hold a single version token, got {contents:?}",
        version_file.display()
    );

    println!("cargo:rustc-env={VERSION_ENV}={version}");
}
