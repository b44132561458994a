fn main() {
    use std::env;
    use std::path::Path;

    // Directory of the inspector manifest, also the working directory of
    // this script.
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(value) => value,
        Err(err) => {
            eprintln!("The CARGO_MANIFEST_DIR environment variable is not set: {err}");
            std::process::exit(1);
        },
    };

    let Some(workspace_root) = Path::new(&manifest_dir).parent() else {
        eprintln!("Failed to get the workspace directory");
        std::process::exit(1);
    };

    // Npcap SDK import libraries (Packet.lib, wpcap.lib) may be put into
    // ./lib of the workspace on Windows
    let lib_path = workspace_root.join("lib");
    if cfg!(target_os = "windows") || lib_path.exists() {
        println!("cargo:rustc-link-search=native={}", lib_path.display());
    }
    println!("cargo:rerun-if-changed=build.rs");
}
