//! Build script for timberstock
//!
//! Bumps the persisted build number and embeds it with a UTC timestamp.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

fn read_build_number(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    // Only rerun when src/ changes, not on every cargo build
    println!("cargo:rerun-if-changed=src");

    // Missing or unreadable file starts the count at 1
    let path = Path::new(BUILD_NUMBER_FILE);
    let build = read_build_number(path) + 1;

    // A read-only checkout still builds, just without persisting the number
    if let Err(e) = fs::write(path, build.to_string()) {
        println!("cargo:warning=could not persist {}: {}", BUILD_NUMBER_FILE, e);
    }

    // UTC so builds on different machines compare
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    // Picked up by option_env! in build_info.rs
    println!("cargo:rustc-env=TIMBERSTOCK_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=TIMBERSTOCK_BUILD_TIMESTAMP={}", timestamp);
    // Visible in the build log
    println!("cargo:warning=timberstock build #{} at {}", build, timestamp);
}
