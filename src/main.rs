fn main() -> anyhow::Result<()> {
    // the web build starts from the library's wasm entry point
    #[cfg(not(target_arch = "wasm32"))]
    flow_showcase::run(flow_showcase::ShowcaseConfig::from_env())?;
    Ok(())
}
