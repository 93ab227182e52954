// Host architecture names

/// Key used by per-architecture tarball maps: `x64` or `i386`.
pub fn tarball_arch(machine: &str) -> Option<&'static str> {
    if machine.contains("64") {
        Some("x64")
    } else if machine.contains("86") {
        Some("i386")
    } else {
        None
    }
}

/// Architecture as the runner API names it: `x86_64` or `i386`.
pub fn api_arch(machine: &str) -> Option<&'static str> {
    if machine.contains("64") {
        Some("x86_64")
    } else if machine.contains("86") {
        Some("i386")
    } else {
        None
    }
}

pub fn host_machine() -> &'static str {
    std::env::consts::ARCH
}
