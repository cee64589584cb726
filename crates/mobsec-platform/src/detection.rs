//! Host probing utilities

use mobsec_core::EncryptionStatus;
use std::path::Path;

/// Locations of su binaries and root managers on Android-like systems
const ROOT_PATHS: &[&str] = &[
    "/system/app/Superuser.apk",
    "/sbin/su",
    "/system/bin/su",
    "/system/xbin/su",
    "/data/local/xbin/su",
    "/data/local/bin/su",
    "/system/sd/xbin/su",
    "/system/bin/failsafe/su",
    "/data/local/su",
    "/su/bin/su",
];

/// Product names reported by common hypervisors
const VM_PRODUCTS: &[&str] = &["VirtualBox", "VMware", "QEMU", "KVM", "Bochs", "Android SDK"];

/// Get the hostname
pub fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Get a short description of the operating system
pub fn os_description() -> String {
    let name = sysinfo::System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let version = sysinfo::System::os_version().unwrap_or_else(|| "unknown".to_string());
    format!("{} {} ({})", name, version, std::env::consts::ARCH)
}

/// Check if running with elevated privileges
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// Collect evidence of root access
pub fn detect_root_indicators() -> Vec<String> {
    let mut indicators: Vec<String> = ROOT_PATHS
        .iter()
        .filter(|p| Path::new(p).exists())
        .map(|p| p.to_string())
        .collect();

    if is_elevated() {
        indicators.push("process runs with effective uid 0".to_string());
    }

    indicators
}

/// Detect whether a tracer is attached to this process
pub fn detect_debugger() -> Option<bool> {
    #[cfg(target_os = "linux")]
    {
        crate::linux::tracer_pid().map(|pid| pid != 0)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Detect storage encryption of the host
pub fn detect_storage_encryption() -> Option<EncryptionStatus> {
    #[cfg(target_os = "linux")]
    {
        Some(if crate::linux::has_dm_crypt_volume() {
            EncryptionStatus::Active
        } else {
            EncryptionStatus::Inactive
        })
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Collect evidence that the host is virtualised
pub fn detect_emulator_indicators() -> Option<Vec<String>> {
    #[cfg(target_os = "linux")]
    {
        let mut indicators = Vec::new();
        if crate::linux::cpu_has_hypervisor_flag() {
            indicators.push("cpu reports hypervisor flag".to_string());
        }
        if let Some(product) = crate::linux::dmi_product_name() {
            if let Some(hit) = match_vm_product(&product) {
                indicators.push(format!("dmi product name is {}", hit));
            }
        }
        Some(indicators)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Match a DMI product name against known hypervisor products
pub fn match_vm_product(product: &str) -> Option<&'static str> {
    let lower = product.to_lowercase();
    VM_PRODUCTS
        .iter()
        .find(|vm| lower.contains(&vm.to_lowercase()))
        .copied()
}
