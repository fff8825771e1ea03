//! INI file configuration adapter.

use std::path::Path;

use configparser::ini::Ini;
use tracing::debug;

use crate::domain::error::FinbytesError;
use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FinbytesError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| FinbytesError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        debug!(file = %path.display(), sections = ?config.sections(), "loaded config");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, FinbytesError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| FinbytesError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
path = prices/AAPL.csv
symbol = AAPL

[strategy]
kind = ma_crossover
fast = 10
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("prices/AAPL.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "kind"),
            Some("ma_crossover".to_string())
        );
        assert_eq!(adapter.get_string("strategy", "fast"), Some("10".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn values_are_returned_raw() {
        let adapter = FileConfigAdapter::from_string("[analyze]\npivot_window = abc\n").unwrap();
        assert_eq!(
            adapter.get_string("analyze", "pivot_window"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\npretty = false\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "pretty"),
            Some("false".to_string())
        );
    }

    #[test]
    fn from_file_reports_missing_file_as_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(FinbytesError::ConfigParse { ref file, .. }) if file.contains("config.ini")
        ));
    }
}
