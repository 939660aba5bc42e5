use std::path::{Path, PathBuf};
use std::process::Command;

/// Short hash of HEAD, if `repo` is a git checkout.
fn git_short_sha(repo: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (out.status.success() && !sha.is_empty()).then_some(sha)
}

fn main() {
    let workspace = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(".."));

    // Source tarballs have no .git; packagers can pass the hash in.
    println!("cargo:rerun-if-env-changed=MOVS_BUILD_SHA");
    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());

    let sha = std::env::var("MOVS_BUILD_SHA")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| git_short_sha(&workspace))
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=MOVS_BUILD_SHA={sha}");
}
