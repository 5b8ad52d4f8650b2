fn main() {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok();

    let hash = output
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let long_version = if hash.is_empty() {
        version
    } else {
        format!("{version} ({hash})")
    };

    println!("cargo::rustc-env=PQTOOL_VERSION={long_version}");
}
