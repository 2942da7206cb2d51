//! Tunables for the two page agents
//!
//! Both agents run inside a host page, so there is no config file: each
//! agent takes one of these structs, usually `Default::default()`.

/// Column Finder timing and storage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    /// Namespace prefix for per-board storage keys (`<prefix>_<boardId>`)
    pub storage_prefix: String,
    /// Period of the background column scan
    pub scan_interval_ms: u32,
    /// Period of the address poller
    pub url_poll_ms: u32,
    /// Coalescing window for the structural navigation check
    pub navigation_settle_ms: u32,
    /// Delay before the forced rescan after a board switch
    pub rescan_delay_ms: u32,
    /// How long the "copied" notification stays on screen
    pub notification_ms: u32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "mondayColumnFinder".to_string(),
            scan_interval_ms: 5_000,
            url_poll_ms: 1_000,
            navigation_settle_ms: 100,
            rescan_delay_ms: 1_000,
            notification_ms: 2_000,
        }
    }
}

impl FinderConfig {
    /// Storage key holding one board's snapshot
    pub fn storage_key(&self, board_id: &str) -> String {
        format!("{}_{}", self.storage_prefix, board_id)
    }

    /// Prefix shared by every board key, separator included
    pub fn key_prefix(&self) -> String {
        format!("{}_", self.storage_prefix)
    }
}

/// Inline Annotator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// Coalescing window for observer-triggered sweeps
    pub debounce_ms: u32,
    /// Lead margin for the header intersection observer
    pub intersection_root_margin: String,
    /// Delay after DOM ready before the agent sets itself up
    pub startup_delay_ms: u32,
    /// Host toolbar that receives the toggle checkbox
    pub toolbar_selector: String,
    /// Global (not per board) key for the toggle state
    pub toggle_storage_key: String,
    /// Label shown next to the toggle checkbox
    pub toggle_label: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            intersection_root_margin: "50px".to_string(),
            startup_delay_ms: 3_000,
            toolbar_selector: "#mf-topbar".to_string(),
            toggle_storage_key: "devColumnToggleChecked".to_string(),
            toggle_label: "Show column IDs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_format() {
        let config = FinderConfig::default();
        assert_eq!(config.storage_key("12345"), "mondayColumnFinder_12345");
        assert!(config.storage_key("12345").starts_with(&config.key_prefix()));
    }

    #[test]
    fn test_annotator_defaults() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.toggle_storage_key, "devColumnToggleChecked");
    }
}
