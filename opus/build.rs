fn main() {
    println!("cargo:rerun-if-env-changed=OPUS_LIB_DIR");

    if std::env::var_os("CARGO_FEATURE_LIBOPUS").is_none() {
        return;
    }

    match std::env::var("OPUS_LIB_DIR") {
        Ok(dir) => println!("cargo:rustc-link-search=native={dir}"),
        Err(_) => println!("cargo:rustc-link-search=native=/opt/homebrew/lib"),
    }
    println!("cargo:rustc-link-lib=opus");
}
