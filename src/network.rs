use std::{
    fs,
    path::{Path, PathBuf},
};
use pnet::datalink;
use crate::constants::{ETHER_PREFIXES, SYSFS_NET};
use crate::error::{Result, WatchdogError};

/// Where the sampler gets link readings from.
pub trait LinkStateSource: Send + Sync {
    /// Wired interfaces worth sampling. An error means this tick has no data.
    fn candidate_interfaces(&self) -> Result<Vec<String>>;

    /// `true` unless the interface positively reports a carrier.
    fn is_interface_down(&self, name: &str) -> bool;
}

pub fn is_ethernet_name(name: &str) -> bool {
    ETHER_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub fn filter_ethernet_interfaces<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().filter(|n| is_ethernet_name(n)).collect()
}

// "1" is carrier; zero, garbage and anything unreadable count as down.
pub fn parse_carrier(content: &str) -> bool {
    match content.trim().parse::<i32>() {
        Ok(value) => value == 0,
        Err(_) => true,
    }
}

/// Reads `<root>/<iface>/carrier` as exposed by the Linux kernel.
#[derive(Debug, Clone)]
pub struct SysfsLinkState {
    root: PathBuf,
}

impl SysfsLinkState {
    pub fn new() -> Self {
        Self::with_root(SYSFS_NET)
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn carrier_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("carrier")
    }
}

impl Default for SysfsLinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStateSource for SysfsLinkState {
    fn candidate_interfaces(&self) -> Result<Vec<String>> {
        // getifaddrs failures surface as an empty list; a live host always has `lo`.
        let interfaces = datalink::interfaces();
        if interfaces.is_empty() {
            return Err(WatchdogError::Enumeration);
        }
        Ok(filter_ethernet_interfaces(interfaces.into_iter().map(|i| i.name)))
    }

    fn is_interface_down(&self, name: &str) -> bool {
        let path = self.carrier_path(name);
        if !path.exists() {
            return true;
        }
        match fs::read_to_string(&path) {
            Ok(content) => parse_carrier(&content),
            Err(_) => true,
        }
    }
}
