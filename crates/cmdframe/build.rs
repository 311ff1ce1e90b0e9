// Exposes build provenance to `cmdframe version --extended`.
fn main() {
    for (source, exported) in [("TARGET", "CMDFRAME_BUILD_TARGET"), ("GIT_HASH", "GIT_HASH")] {
        println!("cargo:rerun-if-env-changed={source}");
        if let Ok(value) = std::env::var(source) {
            println!("cargo:rustc-env={exported}={value}");
        }
    }
}
