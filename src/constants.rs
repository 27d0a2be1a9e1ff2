pub const SAMPLE_UNIT_SECS: u64 = 60; // one sample per minute
pub const DEFAULT_PERIOD: usize = 30;
pub const DEFAULT_WINDOW: usize = 5;

// Upper bound for Period and Window: one week of samples.
pub const MAX_PERIOD: usize = 7 * 24 * 60;

// Extra history kept past the period before a trim drops this many entries.
pub const TRIM_SLACK: usize = 10;

pub const DEFAULT_CONFIG_FILE: &str = "iflandown.toml";

// Usual Linux kernel names for wired Ethernet adapters.
pub const ETHER_PREFIXES: &[&str] = &["en", "eth"];

pub const SYSFS_NET: &str = "/sys/class/net";
