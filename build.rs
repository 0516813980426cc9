use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

/// Bundles `assets/` into the build output and tells the crate where it landed
/// through `SHOWCASE_BUNDLED_ASSETS`.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.is_dir() {
        return Ok(());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[&assets], &out_dir, &copy_options)?;
    println!(
        "cargo:rustc-env=SHOWCASE_BUNDLED_ASSETS={}",
        out_dir.join("assets").display()
    );

    Ok(())
}
