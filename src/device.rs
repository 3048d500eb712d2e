use lazy_static::lazy_static;
use regex::Regex;

use crate::parser::{joined, parse_id, parse_sections, Section};

/// A hardware profile from `avdmanager list device`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: u32,
    pub id_alias: String,
    pub name: Option<String>,
    pub oem: Option<String>,
    /// Empty when the listing has no `Tag` line.
    pub tag: String,
}

impl Device {
    pub(crate) fn parse_list(text: &str) -> Vec<Device> {
        parse_sections(text, DeviceDraft::default)
    }
}

lazy_static! {
    static ref ANNOTATION: Regex = Regex::new(r"[\(\[].*?[\)\]]").unwrap();
}

/// Finds the device an AVD's `Device:` line refers to.
///
/// The listing prints labels like `pixel_6 (Google)`; annotations in
/// parentheses or brackets are removed and the rest must equal a device's
/// `id_alias` exactly.
pub fn resolve_device(raw_label: &str, catalog: &[Device]) -> Option<Device> {
    let label = ANNOTATION.replace_all(raw_label, "");
    let label = label.trim();
    catalog.iter().find(|device| device.id_alias == label).cloned()
}

#[derive(Debug, Default)]
struct DeviceDraft {
    id: Option<(u32, String)>,
    name: Option<String>,
    oem: Option<String>,
    tag: String,
}

impl Section for DeviceDraft {
    type Record = Device;
    const SEPARATOR: &'static str = "---------";

    fn field(&mut self, key: &str, segments: &[&str]) {
        let value = joined(segments);
        match key {
            "ID" => {
                if let Some(id) = parse_id(&value) {
                    self.id = Some(id);
                }
            }
            "NAME" => self.name = Some(value),
            "OEM" => self.oem = Some(value),
            "TAG" => self.tag = value,
            _ => {}
        }
    }

    fn finish(self) -> Option<Device> {
        let (id, id_alias) = self.id?;
        Some(Device {
            id,
            id_alias,
            name: self.name,
            oem: self.oem,
            tag: self.tag,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::device::{resolve_device, Device};

    pub(crate) const LIST_DEVICE: &str = "\
id: 0 or \"automotive_1024p_landscape\"
    Name: Automotive (1024p landscape)
    OEM : Google
    Tag : android-automotive-playstore
---------
id: 1 or \"Nexus 5\"
    Name: Nexus 5
    OEM : Google
---------
id: 2 or \"pixel_6\"
    Name: Pixel 6
    OEM : Google
";

    pub(crate) fn device(id: u32, alias: &str) -> Device {
        Device {
            id,
            id_alias: alias.to_string(),
            name: None,
            oem: None,
            tag: String::new(),
        }
    }

    #[test]
    fn parses_devices_in_order() {
        let devices = Device::parse_list(LIST_DEVICE);

        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0], Device {
            id: 0,
            id_alias: "automotive_1024p_landscape".to_string(),
            name: Some("Automotive (1024p landscape)".to_string()),
            oem: Some("Google".to_string()),
            tag: "android-automotive-playstore".to_string(),
        });
        assert_eq!(devices[1].id_alias, "Nexus 5");
        assert_eq!(devices[1].tag, "");
        assert_eq!(devices[2].id, 2);
    }

    #[test]
    fn leading_separator_is_a_no_op() {
        let text = "---------\nid: 1 or Nexus_5\nName: Nexus 5\n---------\n";
        let devices = Device::parse_list(text);

        assert_eq!(devices, vec![Device {
            id: 1,
            id_alias: "Nexus_5".to_string(),
            name: Some("Nexus 5".to_string()),
            oem: None,
            tag: String::new(),
        }]);
    }

    #[test]
    fn keeps_colons_inside_values() {
        let text = "id: 3 or \"tv_4k\"\nName: Android TV (4K): preview\n";

        assert_eq!(Device::parse_list(text)[0].name.as_deref(), Some("Android TV (4K): preview"));
    }

    #[test]
    fn parsing_is_repeatable() {
        assert_eq!(Device::parse_list(LIST_DEVICE), Device::parse_list(LIST_DEVICE));
    }

    #[test]
    fn resolves_annotated_label() {
        let catalog = vec![device(1, "Nexus 5"), device(2, "pixel_6")];

        assert_eq!(resolve_device("Nexus 5 (Nexus 5)", &catalog), Some(device(1, "Nexus 5")));
        assert_eq!(resolve_device("pixel_6 (Google) [beta]", &catalog), Some(device(2, "pixel_6")));
    }

    // An unknown device is reported as None rather than an error; callers get
    // an Avd without a device.
    #[test]
    fn unknown_label_resolves_to_none() {
        let catalog = vec![device(1, "Nexus 5")];

        assert_eq!(resolve_device("Nexus 6 (Google)", &catalog), None);
        assert_eq!(resolve_device("Nexus 5", &[]), None);
    }
}
