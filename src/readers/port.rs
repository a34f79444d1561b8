use super::*;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// A reader device attached to the station host.
///
/// The physical label is the bus path the reader is plugged into
/// (`usb-0000:00:14.0-1/input0` for HID devices, the tty name for serial
/// devices); stations are mapped to team sides by this label, so a reader
/// keeps its side across reboots as long as it stays in the same socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    path: PathBuf,
    vendor: u16,
    product: u16,
    serial: Option<String>,
    label: String,
}

impl Port {
    pub fn new(
        path: impl Into<PathBuf>,
        vendor: u16,
        product: u16,
        serial: Option<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            vendor,
            product,
            serial,
            label: label.into(),
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn vendor(&self) -> u16 {
        self.vendor
    }
    pub fn product(&self) -> u16 {
        self.product
    }
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Discovery over a sysfs tree (`/sys` on a live host).
impl Port {
    /// Input event devices under `class/input/event*`.
    pub fn inputs(sysfs: &Path) -> Vec<Self> {
        let mut ports = entries(&sysfs.join("class").join("input"))
            .into_iter()
            .filter(|(name, _)| name.starts_with("event"))
            .filter_map(|(name, dir)| {
                let device = dir.join("device");
                Some(Self::new(
                    Path::new("/dev/input").join(&name),
                    read_id(&device.join("id").join("vendor"))?,
                    read_id(&device.join("id").join("product"))?,
                    None,
                    read_trimmed(&device.join("phys")).unwrap_or(name),
                ))
            })
            .collect::<Vec<_>>();
        ports.sort_by(|a, b| a.path.cmp(&b.path));
        ports
    }
    /// USB serial devices under `class/tty/*`.
    pub fn serials(sysfs: &Path) -> Vec<Self> {
        let mut ports = entries(&sysfs.join("class").join("tty"))
            .into_iter()
            .filter_map(|(name, dir)| {
                let usb = dir.join("device").join("..");
                Some(Self::new(
                    Path::new("/dev").join(&name),
                    read_id(&usb.join("idVendor"))?,
                    read_id(&usb.join("idProduct"))?,
                    read_trimmed(&usb.join("serial")),
                    name,
                ))
            })
            .collect::<Vec<_>>();
        ports.sort_by(|a, b| a.path.cmp(&b.path));
        ports
    }
    /// Every port with the given vendor and product plugged into one of `labels`.
    pub fn select(
        ports: &[Self],
        vendor: &str,
        product: &str,
        labels: &[String],
    ) -> Result<Vec<Self>, ReaderError> {
        let (v, p) = parse_id(vendor)
            .zip(parse_id(product))
            .ok_or_else(|| ReaderError::not_found(vendor, product, None))?;
        let found = ports
            .iter()
            .filter(|port| port.vendor == v && port.product == p)
            .filter(|port| labels.iter().any(|l| l == &port.label))
            .cloned()
            .collect::<Vec<_>>();
        match found.is_empty() {
            true => Err(ReaderError::not_found(vendor, product, None)),
            false => Ok(found),
        }
    }
    /// The single port with the given vendor, product and serial number.
    pub fn locate(
        ports: &[Self],
        vendor: &str,
        product: &str,
        serial: &str,
    ) -> Result<Self, ReaderError> {
        let missing = || ReaderError::not_found(vendor, product, Some(serial));
        let (v, p) = parse_id(vendor).zip(parse_id(product)).ok_or_else(missing)?;
        ports
            .iter()
            .find(|port| port.vendor == v && port.product == p && port.serial() == Some(serial))
            .cloned()
            .ok_or_else(missing)
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} [{:04x}:{:04x}] {}",
            self.path.display(),
            self.vendor,
            self.product,
            self.label
        )
    }
}

/// Parses a USB identifier written as hex, with or without a `0x` prefix.
pub fn parse_id(s: &str) -> Option<u16> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    match digits.is_empty() {
        true => None,
        false => u16::from_str_radix(digits, 16).ok(),
    }
}

fn entries(dir: &Path) -> Vec<(String, PathBuf)> {
    std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(Result::ok)
                .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
                .collect()
        })
        .inspect_err(|e| log::debug!("[discovery] cannot list {}: {}", dir.display(), e))
        .unwrap_or_default()
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_id(path: &Path) -> Option<u16> {
    read_trimmed(path).as_deref().and_then(parse_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sysfs() -> PathBuf {
        let root = std::env::temp_dir().join(format!("officegames-sysfs-{}", uuid::Uuid::now_v7()));
        let write = |path: PathBuf, contents: &str| {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        };
        let input = root.join("class").join("input");
        write(input.join("event3/device/id/vendor"), "ffff\n");
        write(input.join("event3/device/id/product"), "0035\n");
        write(input.join("event3/device/phys"), "usb-1/input0\n");
        write(input.join("event4/device/id/vendor"), "ffff\n");
        write(input.join("event4/device/id/product"), "0035\n");
        write(input.join("event4/device/phys"), "usb-2/input0\n");
        write(input.join("event5/device/id/vendor"), "046d\n");
        write(input.join("event5/device/id/product"), "c31c\n");
        write(input.join("mouse0/device/id/vendor"), "ffff\n");
        let tty = root.join("class").join("tty");
        std::fs::create_dir_all(tty.join("ttyUSB0/device")).unwrap();
        write(tty.join("ttyUSB0/idVendor"), "10c4\n");
        write(tty.join("ttyUSB0/idProduct"), "ea60\n");
        write(tty.join("ttyUSB0/serial"), "0001\n");
        std::fs::create_dir_all(tty.join("ttyS0/device")).unwrap();
        root
    }

    #[test]
    fn parses_ids() {
        assert_eq!(parse_id("0xffff"), Some(0xffff));
        assert_eq!(parse_id("0035"), Some(0x35));
        assert_eq!(parse_id(" 0X10C4 "), Some(0x10c4));
        assert_eq!(parse_id("0x"), None);
        assert_eq!(parse_id("zz"), None);
        assert_eq!(parse_id("0x1ffff"), None);
    }
    #[test]
    fn scans_inputs_and_serials() {
        let root = sysfs();
        let inputs = Port::inputs(&root);
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].path(), Path::new("/dev/input/event3"));
        assert_eq!(inputs[0].label(), "usb-1/input0");
        assert_eq!(inputs[2].label(), "event5");
        let serials = Port::serials(&root);
        assert_eq!(serials.len(), 1);
        assert_eq!(serials[0].serial(), Some("0001"));
        assert_eq!(serials[0].vendor(), 0x10c4);
        std::fs::remove_dir_all(root).unwrap();
    }
    #[test]
    fn selects_by_label() {
        let root = sysfs();
        let inputs = Port::inputs(&root);
        let labels = vec!["usb-2/input0".to_string()];
        let found = Port::select(&inputs, "0xffff", "0x0035", &labels).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path(), Path::new("/dev/input/event4"));
        std::fs::remove_dir_all(root).unwrap();
    }
    #[test]
    fn malformed_ids_are_not_found() {
        let ports = vec![Port::new("/dev/ttyUSB0", 0x10c4, 0xea60, Some("0001".into()), "ttyUSB0")];
        assert!(matches!(
            Port::select(&ports, "0xgggg", "0xea60", &["ttyUSB0".to_string()]),
            Err(ReaderError::NotFound { .. })
        ));
        assert!(matches!(
            Port::locate(&ports, "0x10c4", "", "0001"),
            Err(ReaderError::NotFound { .. })
        ));
        assert!(Port::locate(&ports, "0x10c4", "0xea60", "0001").is_ok());
        assert!(Port::locate(&ports, "0x10c4", "0xea60", "0002").is_err());
        assert!(Port::select(&ports, "0x10c4", "0xea60", &[]).is_err());
    }
}
