fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `avax-tester version` prints the git sha baked in here
    vergen::EmitBuilder::builder()
        .git_sha(true)
        .git_branch()
        .fail_on_error()
        .emit()
        .or_else(|_| {
            // Building outside a git checkout: fall back to placeholder values.
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_BRANCH=unknown");
            Ok::<(), Box<dyn std::error::Error>>(())
        })?;

    Ok(())
}
