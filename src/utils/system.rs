//! Small probes over system commands, each a regex over one command's output.

use crate::domain::model::Partition;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{PluginError, Result};

const MACOS_FAMILIES: [(&str, &str); 21] = [
    ("10.0", "Cheetah"),
    ("10.1", "Puma"),
    ("10.2", "Jaguar"),
    ("10.3", "Panther"),
    ("10.4", "Tiger"),
    ("10.5", "Leopard"),
    ("10.6", "Snow Leopard"),
    ("10.7", "Lion"),
    ("10.8", "Mountain Lion"),
    ("10.9", "Mavericks"),
    ("10.10", "Yosemite"),
    ("10.11", "El Capitan"),
    ("10.12", "Sierra"),
    ("10.13", "High Sierra"),
    ("10.14", "Mojave"),
    ("10.15", "Catalina"),
    ("11", "Big Sur"),
    ("12", "Monterey"),
    ("13", "Ventura"),
    ("14", "Sonoma"),
    ("15", "Sequoia"),
];

/// `sysctl -n <metric>`, or `None` when sysctl fails.
pub fn get_sysctl(runner: &dyn CommandRunner, metric: &str) -> Option<String> {
    match runner.run(&format!("sysctl -n {}", metric)) {
        Ok(output) if output.success() => Some(output.stdout),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("sysctl {} failed: {}", metric, e);
            None
        }
    }
}

pub fn parse_version(version: &str) -> Result<Vec<u32>> {
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .map_err(|e| PluginError::parse("version string", format!("{:?}: {}", version, e)))
        })
        .collect()
}

/// `14.2.1` becomes `macOS Sonoma 14.2`.
pub fn macos_version_string(version: &str) -> Option<String> {
    let parts = parse_version(version).ok()?;
    let major = *parts.first()?;
    let minor = parts.get(1).copied().unwrap_or(0);
    let family_key = if major == 10 {
        format!("{}.{}", major, minor)
    } else {
        major.to_string()
    };
    let family = MACOS_FAMILIES
        .iter()
        .find(|(key, _)| *key == family_key)
        .map(|(_, name)| *name)?;
    Some(format!("macOS {} {}.{}", family, major, minor))
}

pub fn macos_version(runner: &dyn CommandRunner) -> Option<String> {
    let output = runner.run("sw_vers -productVersion").ok()?;
    if !output.success() {
        return None;
    }
    macos_version_string(&output.stdout)
}

pub fn parse_partitions(mount_output: &str) -> Vec<Partition> {
    let re = regex!(r"^(/dev/disk[s0-9]+)\s+on\s+([^(]+)\s+\((.*)\)");
    mount_output
        .lines()
        .filter_map(|line| re.captures(line))
        .map(|caps| {
            let mut opts: Vec<String> = regex!(r"\s*,\s*")
                .split(&caps[3])
                .map(str::to_string)
                .collect();
            let fstype = if opts.is_empty() { String::new() } else { opts.remove(0) };
            Partition {
                device: caps[1].to_string(),
                mountpoint: caps[2].trim().to_string(),
                fstype,
                opts,
            }
        })
        .collect()
}

pub fn find_partitions(runner: &dyn CommandRunner) -> Vec<Partition> {
    match runner.run("mount") {
        Ok(output) if output.success() => parse_partitions(&output.stdout),
        _ => Vec::new(),
    }
}

pub fn find_valid_mountpoints(runner: &dyn CommandRunner) -> Vec<String> {
    let mut mountpoints: Vec<String> = find_partitions(runner)
        .into_iter()
        .map(|p| p.mountpoint)
        .collect();
    if mountpoints.is_empty() {
        return vec!["/".to_string()];
    }
    mountpoints.sort();
    mountpoints.dedup();
    mountpoints
}

pub fn parse_interfaces(ifconfig_output: &str) -> Vec<String> {
    let mut interfaces: Vec<String> = regex!(r"(?m)^([a-z0-9]+):\s*flags=")
        .captures_iter(ifconfig_output)
        .map(|caps| caps[1].to_string())
        .collect();
    interfaces.sort();
    interfaces
}

pub fn find_all_network_interfaces(runner: &dyn CommandRunner) -> Vec<String> {
    let interfaces = match runner.run("ifconfig") {
        Ok(output) if output.success() => parse_interfaces(&output.stdout),
        _ => Vec::new(),
    };
    if interfaces.is_empty() {
        vec!["lo0".to_string()]
    } else {
        interfaces
    }
}

/// Devices listed by `networksetup -listallhardwareports`.
pub fn parse_hardware_ports(output: &str, wifi_only: bool) -> Vec<String> {
    let re = if wifi_only {
        regex!(r"Hardware Port: Wi-Fi.*\nDevice:\s+(.*)")
    } else {
        regex!(r"Hardware Port:.*\nDevice:\s+(.*)")
    };
    let mut devices: Vec<String> = re
        .captures_iter(output)
        .map(|caps| caps[1].trim().to_string())
        .collect();
    devices.sort();
    devices
}

fn find_hardware_ports(runner: &dyn CommandRunner, wifi_only: bool) -> Vec<String> {
    let devices = match runner.run("networksetup -listallhardwareports") {
        Ok(output) if output.success() => parse_hardware_ports(&output.stdout, wifi_only),
        _ => Vec::new(),
    };
    if devices.is_empty() {
        vec!["en0".to_string()]
    } else {
        devices
    }
}

pub fn find_valid_network_interfaces(runner: &dyn CommandRunner) -> Vec<String> {
    find_hardware_ports(runner, false)
}

pub fn find_valid_wifi_interfaces(runner: &dyn CommandRunner) -> Vec<String> {
    find_hardware_ports(runner, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    const MOUNT_OUTPUT: &str = "\
/dev/disk3s1s1 on / (apfs, sealed, local, read-only, journaled)
devfs on /dev (devfs, local, nobrowse)
/dev/disk3s6 on /System/Volumes/VM (apfs, local, noexec, journaled, noatime, nobrowse)
/dev/disk5s1 on /Volumes/My Backup (apfs, local, nodev, nosuid, journaled)
map auto_home on /System/Volumes/Data/home (autofs, automounted, nobrowse)";

    #[test]
    fn test_parse_partitions() {
        let partitions = parse_partitions(MOUNT_OUTPUT);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[0].device, "/dev/disk3s1s1");
        assert_eq!(partitions[0].mountpoint, "/");
        assert_eq!(partitions[0].fstype, "apfs");
        assert_eq!(partitions[0].opts, vec!["sealed", "local", "read-only", "journaled"]);
        assert_eq!(partitions[2].mountpoint, "/Volumes/My Backup");
    }

    #[test]
    fn test_find_valid_mountpoints() {
        let runner = FakeRunner::new().with("mount", 0, MOUNT_OUTPUT);
        assert_eq!(
            find_valid_mountpoints(&runner),
            vec!["/", "/System/Volumes/VM", "/Volumes/My Backup"]
        );
        assert_eq!(find_valid_mountpoints(&FakeRunner::new()), vec!["/"]);
    }

    #[test]
    fn test_parse_interfaces() {
        let output = "\
lo0: flags=8049<UP,LOOPBACK,RUNNING,MULTICAST> mtu 16384
\toptions=1203<RXCSUM,TXCSUM,TXSTATUS,SW_TIMESTAMP>
en0: flags=8863<UP,BROADCAST,SMART,RUNNING,SIMPLEX,MULTICAST> mtu 1500
\tether a8:20:66:12:34:56
bridge0: flags=8863<UP,BROADCAST,SMART,RUNNING,SIMPLEX,MULTICAST> mtu 1500";
        assert_eq!(parse_interfaces(output), vec!["bridge0", "en0", "lo0"]);
        assert_eq!(find_all_network_interfaces(&FakeRunner::new()), vec!["lo0"]);
    }

    #[test]
    fn test_parse_hardware_ports() {
        let output = "\
Hardware Port: Thunderbolt Bridge
Device: bridge0
Ethernet Address: 36:1f:2e:00:00:01

Hardware Port: Wi-Fi
Device: en0
Ethernet Address: a8:20:66:12:34:56";
        assert_eq!(parse_hardware_ports(output, false), vec!["bridge0", "en0"]);
        assert_eq!(parse_hardware_ports(output, true), vec!["en0"]);
        assert_eq!(find_valid_wifi_interfaces(&FakeRunner::new()), vec!["en0"]);
    }

    #[test]
    fn test_macos_version_string() {
        assert_eq!(macos_version_string("14.2.1").as_deref(), Some("macOS Sonoma 14.2"));
        assert_eq!(macos_version_string("10.15.7").as_deref(), Some("macOS Catalina 10.15"));
        assert_eq!(macos_version_string("15").as_deref(), Some("macOS Sequoia 15.0"));
        assert_eq!(macos_version_string("9.1"), None);
        assert!(parse_version("14.x").is_err());
    }

    #[test]
    fn test_get_sysctl() {
        let runner = FakeRunner::new()
            .with("sysctl -n hw.memsize", 0, "17179869184")
            .with("sysctl -n bogus", 1, "");
        assert_eq!(get_sysctl(&runner, "hw.memsize").as_deref(), Some("17179869184"));
        assert_eq!(get_sysctl(&runner, "bogus"), None);
    }
}
