use std::env;
use std::fs;
use std::path::Path;

fn main() {
    copy_settings();
    println!("cargo:rerun-if-changed=resources/default_knowledge.json");
}

/// Copies settings.json next to the built executable, where the CLI looks for it.
fn copy_settings() {
    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    // OUT_DIR is target/<profile>/build/<pkg>-<hash>/out
    let Some(target_dir) = Path::new(&out_dir).ancestors().nth(3) else {
        return;
    };

    let settings_src = Path::new("settings.json");
    if settings_src.exists() {
        let _ = fs::copy(settings_src, target_dir.join("settings.json"));
        println!("cargo:rerun-if-changed=settings.json");
    }
}
