//! Build script for the admin crate.
//!
//! Hashes `static/css/admin.css` so the stylesheet URL changes whenever its
//! content does and can be cached indefinitely.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/admin.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read admin.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=dev");
            return;
        }
    };

    // First 8 hex chars of SHA-256
    let hash = format!("{:x}", Sha256::digest(&content));
    println!("cargo:rustc-env=CSS_HASH={}", &hash[..8]);
}
