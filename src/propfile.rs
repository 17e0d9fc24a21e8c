// Property file parser
// Parses simple `key = value` files such as signbridge.cfg

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Parse property text, invoking `handler` for each key-value pair.
///
/// Keys keep their case. `#` starts a comment that runs to the end of the
/// line, surrounding whitespace is trimmed, and lines without `=` are
/// warned about and skipped.
pub fn parse_propfile(data: &str, handler: &mut dyn FnMut(&str, &str)) {
    for (number, raw) in data.lines().enumerate() {
        let line = match raw.find('#') {
            Some(hash) => &raw[..hash],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Key without value on line {}: {}", number + 1, line);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            log::warn!("Value without key on line {}", number + 1);
            continue;
        }
        handler(key, value.trim());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("Property file not found")]
    FileNotFound,
    #[error("I/O error reading property file: {0}")]
    Io(io::Error),
}

impl From<io::Error> for PropertyError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => PropertyError::FileNotFound,
            _ => PropertyError::Io(err),
        }
    }
}

/// Key-value pairs read from a property file
///
/// Lookups are case-insensitive; later duplicates win.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyFile {
    properties: BTreeMap<String, String>,
}

impl PropertyFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PropertyError> {
        let data = fs::read_to_string(path)?;
        Ok(Self::parse(&data))
    }

    pub fn parse(data: &str) -> Self {
        let mut properties = BTreeMap::new();
        parse_propfile(data, &mut |key, value| {
            properties.insert(key.to_ascii_lowercase(), value.to_string());
        });
        Self { properties }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(&key.to_ascii_lowercase())
    }

    /// Pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect(data: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        parse_propfile(data, &mut |k, v| pairs.push((k.to_string(), v.to_string())));
        pairs
    }

    #[test]
    fn test_parse_basic_pairs() {
        let pairs = collect("angular_speed = 0.2\npause_ms=500\n");
        assert_eq!(
            pairs,
            vec![
                ("angular_speed".to_string(), "0.2".to_string()),
                ("pause_ms".to_string(), "500".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let pairs = collect("# header\n\n  avatar = xbot # trailing\n#captions = false\n");
        assert_eq!(pairs, vec![("avatar".to_string(), "xbot".to_string())]);
    }

    #[test]
    fn test_parse_skips_bare_keys() {
        let pairs = collect("captions\n= orphan\nframe_rate = 30");
        assert_eq!(pairs, vec![("frame_rate".to_string(), "30".to_string())]);
    }

    #[test]
    fn test_parse_empty_value() {
        let pairs = collect("signs_file =\n");
        assert_eq!(pairs, vec![("signs_file".to_string(), String::new())]);
    }

    #[test]
    fn test_property_file_case_insensitive() {
        let props = PropertyFile::parse("Step_Mode = time_scaled\nstep_mode = per_tick");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("STEP_MODE"), Some("per_tick"));
        assert!(props.contains("step_mode"));
        assert!(props.get("avatar").is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level = debug").unwrap();
        let props = PropertyFile::load(file.path()).unwrap();
        assert_eq!(props.iter().collect::<Vec<_>>(), vec![("log_level", "debug")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PropertyFile::load("/nonexistent/signbridge.cfg").unwrap_err();
        assert!(matches!(err, PropertyError::FileNotFound));
    }
}
