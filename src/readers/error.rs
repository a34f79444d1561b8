use std::path::PathBuf;

/// Failures of reader discovery and transport.
/// Every variant is fatal to the reader session that raised it.
#[derive(Debug)]
pub enum ReaderError {
    /// No device matched, or the identifiers to match on were malformed.
    NotFound {
        vendor: String,
        product: String,
        serial: Option<String>,
    },
    /// The device file could not be opened.
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A read from an open device failed.
    Io {
        label: String,
        source: std::io::Error,
    },
    /// The device stopped producing data (unplugged).
    Disconnected { label: String },
}

impl ReaderError {
    pub fn not_found(vendor: &str, product: &str, serial: Option<&str>) -> Self {
        Self::NotFound {
            vendor: vendor.to_string(),
            product: product.to_string(),
            serial: serial.map(str::to_string),
        }
    }
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                vendor,
                product,
                serial,
            } => write!(
                f,
                "no reader found with vendor_id={}, product_id={} and serial_number={}",
                vendor,
                product,
                serial.as_deref().unwrap_or("None")
            ),
            Self::Connect { path, source } => {
                write!(f, "could not connect to reader {}: {}", path.display(), source)
            }
            Self::Io { label, source } => write!(f, "reader {} failed: {}", label, source),
            Self::Disconnected { label } => write!(f, "reader {} disconnected", label),
        }
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn not_found_message() {
        let e = ReaderError::not_found("0xffff", "0x0035", None);
        assert_eq!(
            e.to_string(),
            "no reader found with vendor_id=0xffff, product_id=0x0035 and serial_number=None"
        );
    }
    #[test]
    fn io_has_source() {
        use std::error::Error;
        let e = ReaderError::Io {
            label: "usb-1".into(),
            source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
        };
        assert!(e.source().is_some());
        assert!(ReaderError::Disconnected { label: "usb-1".into() }.source().is_none());
    }
}
