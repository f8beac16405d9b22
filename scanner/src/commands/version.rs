/// Get the version string for ublue-scanner and libscanner
pub fn get_version_string() -> String {
    format!(
        "ublue-scanner {}\nlibscanner {}",
        env!("CARGO_PKG_VERSION"),
        libscanner::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
