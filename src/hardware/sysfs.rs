//! Linux sysfs GPIO sampler.
//!
//! Reads `<gpio_root>/gpio<N>/value`. Exporting the lines and setting their
//! direction to `in` is done by the host's bootstrap, not here.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::capabilities::{LineSampler, LinePins, PinId};
use crate::error::{AppResult, MonitorError};

/// Sampler backed by sysfs value files, kept open between reads.
pub struct SysfsSampler {
    lines: HashMap<PinId, File>,
}

impl SysfsSampler {
    /// Open the value files of both lines under `root` (usually `/sys/class/gpio`).
    pub fn open(root: impl AsRef<Path>, pins: LinePins) -> AppResult<Self> {
        let mut lines = HashMap::new();
        for pin in [pins.clock, pins.data] {
            let path = value_path(root.as_ref(), pin);
            let file = File::open(&path).map_err(|source| MonitorError::Sampler { pin, source })?;
            debug!(pin, path = %path.display(), "Opened GPIO value file");
            lines.insert(pin, file);
        }
        Ok(Self { lines })
    }
}

fn value_path(root: &Path, pin: PinId) -> PathBuf {
    root.join(format!("gpio{pin}")).join("value")
}

fn parse_level(byte: u8) -> Option<bool> {
    match byte {
        b'0' => Some(false),
        b'1' => Some(true),
        _ => None,
    }
}

impl LineSampler for SysfsSampler {
    fn read(&mut self, pin: PinId) -> AppResult<bool> {
        let file = self.lines.get_mut(&pin).ok_or_else(|| MonitorError::Sampler {
            pin,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "pin was not opened"),
        })?;

        let mut byte = [0u8; 1];
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.read_exact(&mut byte))
            .map_err(|source| MonitorError::Sampler { pin, source })?;

        parse_level(byte[0]).ok_or_else(|| MonitorError::Sampler {
            pin,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unexpected GPIO value byte {:#04x}", byte[0]),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_line(root: &Path, pin: PinId, level: &str) {
        let dir = root.join(format!("gpio{pin}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("value"), level).unwrap();
    }

    #[test]
    fn test_reads_levels_from_value_files() {
        let root = tempfile::tempdir().unwrap();
        fake_line(root.path(), 2, "1\n");
        fake_line(root.path(), 3, "0\n");

        let mut sampler = SysfsSampler::open(root.path(), LinePins::new(2, 3)).unwrap();
        assert!(sampler.read(2).unwrap());
        assert!(!sampler.read(3).unwrap());

        // Levels are re-read from the start of the file on every poll
        fs::write(root.path().join("gpio3").join("value"), "1\n").unwrap();
        assert!(sampler.read(3).unwrap());
    }

    #[test]
    fn test_missing_line_fails_to_open() {
        let root = tempfile::tempdir().unwrap();
        fake_line(root.path(), 2, "0\n");

        let err = SysfsSampler::open(root.path(), LinePins::new(2, 3))
            .err()
            .unwrap();
        assert!(matches!(err, MonitorError::Sampler { pin: 3, .. }));
    }

    #[test]
    fn test_unopened_pin_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fake_line(root.path(), 2, "0\n");
        fake_line(root.path(), 3, "0\n");

        let mut sampler = SysfsSampler::open(root.path(), LinePins::new(2, 3)).unwrap();
        assert!(sampler.read(17).is_err());
    }

    #[test]
    fn test_garbage_value_is_an_error() {
        assert_eq!(parse_level(b'1'), Some(true));
        assert_eq!(parse_level(b'0'), Some(false));
        assert_eq!(parse_level(b'x'), None);
    }
}
