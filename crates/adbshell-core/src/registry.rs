// ── Saved device registry ──
//
// In-memory view over the saved-device list. Lookups compare whole
// names, never prefixes.

use crate::model::SavedDevice;

/// Result of [`DeviceRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An entry with the same name existed and was overwritten in place.
    Replaced,
}

/// Ordered collection of saved devices, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<SavedDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from persisted records. Duplicate names resolve
    /// last-write-wins, keeping the first position.
    pub fn from_devices(devices: impl IntoIterator<Item = SavedDevice>) -> Self {
        let mut registry = Self::new();
        for device in devices {
            registry.insert(device);
        }
        registry
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        address: impl Into<String>,
        autoconnect: bool,
    ) -> AddOutcome {
        self.insert(SavedDevice::new(name, address, autoconnect))
    }

    pub fn insert(&mut self, device: SavedDevice) -> AddOutcome {
        if let Some(existing) = self.devices.iter_mut().find(|d| d.name == device.name) {
            *existing = device;
            AddOutcome::Replaced
        } else {
            self.devices.push(device);
            AddOutcome::Added
        }
    }

    /// Remove the device whose name equals `name` exactly.
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.name != name);
        self.devices.len() != before
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SavedDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn list(&self) -> &[SavedDevice] {
        &self.devices
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.devices.len();
        self.devices.clear();
        removed
    }

    pub fn set_autoconnect(&mut self, name: &str, autoconnect: bool) -> bool {
        self.find_mut(name)
            .map(|d| d.autoconnect = autoconnect)
            .is_some()
    }

    pub fn set_address(&mut self, name: &str, address: impl Into<String>) -> bool {
        self.find_mut(name).map(|d| d.address = address.into()).is_some()
    }

    /// Devices flagged for connection at startup, in list order.
    pub fn autoconnect_targets(&self) -> impl Iterator<Item = &SavedDevice> {
        self.devices.iter().filter(|d| d.autoconnect)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut SavedDevice> {
        self.devices.iter_mut().find(|d| d.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_then_find_returns_entry() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.add("phone", "10.0.0.5:5555", false), AddOutcome::Added);
        assert_eq!(
            registry.find_by_name("phone"),
            Some(&SavedDevice::new("phone", "10.0.0.5:5555", false))
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut registry = DeviceRegistry::new();
        registry.add("Phone", "10.0.0.5:5555", false);
        assert!(registry.find_by_name("phone").is_none());
    }

    #[test]
    fn add_with_existing_name_overwrites_in_place() {
        let mut registry = DeviceRegistry::new();
        registry.add("tablet", "10.0.0.9:5555", false);
        registry.add("phone", "10.0.0.5:5555", false);
        assert_eq!(
            registry.add("tablet", "10.0.0.10:5555", true),
            AddOutcome::Replaced
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list()[0], SavedDevice::new("tablet", "10.0.0.10:5555", true));
    }

    #[test]
    fn remove_only_entry_empties_registry() {
        let mut registry = DeviceRegistry::new();
        registry.add("phone", "10.0.0.5:5555", false);
        assert!(registry.remove_by_name("phone"));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_does_not_match_on_prefix() {
        let mut registry = DeviceRegistry::new();
        registry.add("foo", "10.0.0.1:5555", false);
        registry.add("foobar", "10.0.0.2:5555", false);

        assert!(registry.remove_by_name("foo"));
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_name("foobar").is_some());
        assert!(!registry.remove_by_name("fo"));
    }

    #[test]
    fn from_devices_resolves_duplicates_last_write_wins() {
        let registry = DeviceRegistry::from_devices([
            SavedDevice::new("tv", "10.0.0.3:5555", false),
            SavedDevice::new("tv", "10.0.0.4:5555", true),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_by_name("tv").unwrap().address, "10.0.0.4:5555");
    }

    #[test]
    fn autoconnect_targets_filters_and_keeps_order() {
        let mut registry = DeviceRegistry::new();
        registry.add("a", "1:1", true);
        registry.add("b", "2:2", false);
        registry.add("c", "3:3", true);
        let names: Vec<_> = registry.autoconnect_targets().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn setters_report_missing_names() {
        let mut registry = DeviceRegistry::new();
        registry.add("a", "1:1", false);
        assert!(registry.set_autoconnect("a", true));
        assert!(registry.set_address("a", "9:9"));
        assert!(!registry.set_autoconnect("b", true));
        assert_eq!(registry.find_by_name("a"), Some(&SavedDevice::new("a", "9:9", true)));
    }

    #[test]
    fn clear_all_reports_count() {
        let mut registry = DeviceRegistry::new();
        registry.add("a", "1:1", false);
        registry.add("b", "2:2", false);
        assert_eq!(registry.clear_all(), 2);
        assert!(registry.is_empty());
    }
}
