//! Linux-specific probes

use std::path::Path;

/// Read the TracerPid of the current process
pub fn tracer_pid() -> Option<u32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_tracer_pid(&status)
}

/// Extract TracerPid from the contents of a /proc/<pid>/status file
pub fn parse_tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|v| v.trim().parse().ok())
}

/// Check whether any device-mapper volume is a dm-crypt target
pub fn has_dm_crypt_volume() -> bool {
    let Ok(entries) = std::fs::read_dir("/sys/block") else {
        return false;
    };

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("dm-"))
        .any(|e| {
            std::fs::read_to_string(e.path().join("dm/uuid"))
                .map(|uuid| uuid.starts_with("CRYPT-"))
                .unwrap_or(false)
        })
}

/// Check if the CPU advertises the hypervisor flag
pub fn cpu_has_hypervisor_flag() -> bool {
    std::fs::read_to_string("/proc/cpuinfo")
        .map(|content| {
            content
                .lines()
                .filter(|l| l.starts_with("flags"))
                .any(|l| l.split_whitespace().any(|f| f == "hypervisor"))
        })
        .unwrap_or(false)
}

/// Read the DMI product name
pub fn dmi_product_name() -> Option<String> {
    let path = Path::new("/sys/class/dmi/id/product_name");
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
