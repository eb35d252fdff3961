// packages/engine/src/interception/config_loader.rs
//! Redirect configuration loader
//!
//! Reads the INI-style configuration file into a [`RedirectTable`]:
//!
//! ```ini
//! [PocketProxy]
//! GetSendApiHostPort=https://alt.example.com:8443
//! TextApiHostPort=http://192.168.1.10:8080
//! ```
//!
//! Loading never fails. A missing file gives a disabled table, a syntax
//! error stops parsing and keeps whatever was read before the bad line.
//! A leading byte-order mark is ignored and invalid UTF-8 is decoded lossily.

use crate::interception::routing_table::{parse_target, EligibleHost, RedirectTable};
use crate::observability;
use crate::utils::errors::EngineError;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// The only section that carries redirect rules
pub const SECTION: &str = "PocketProxy";

/// Key for the get/send API target
pub const GET_SEND_KEY: &str = "GetSendApiHostPort";

/// Older spelling of [`GET_SEND_KEY`]
pub const LEGACY_GET_SEND_KEY: &str = "GetSendHostPort";

/// Key for the text API target
pub const TEXT_API_KEY: &str = "TextApiHostPort";

/// Result of loading a configuration source
#[derive(Debug)]
pub struct LoadReport {
    /// Rules that were read successfully
    pub table: RedirectTable,

    /// Why loading stopped early, if it did
    pub error: Option<EngineError>,

    /// Sections that were not recognized
    pub skipped_sections: Vec<String>,
}

impl LoadReport {
    /// Line at which parsing stopped
    pub fn error_line(&self) -> Option<usize> {
        self.error.as_ref().and_then(EngineError::line)
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// One rule slot being filled while parsing
#[derive(Default)]
struct Slot {
    target: Option<Url>,

    /// Set once the current key name has been seen; legacy keys no longer
    /// override it afterwards
    from_current_key: bool,
}

impl Slot {
    fn assign(&mut self, target: Option<Url>, current_key: bool) {
        if current_key || !self.from_current_key {
            self.target = target;
        }
        self.from_current_key |= current_key;
    }
}

#[derive(Default)]
struct Parser {
    get_send: Slot,
    text_api: Slot,
    skipped_sections: Vec<String>,
}

enum SectionState {
    /// Before the first header
    None,
    Recognized,
    Skipped,
}

impl Parser {
    fn run(mut self, source: &str) -> LoadReport {
        let mut section = SectionState::None;
        let mut error = None;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                match parse_section_name(rest) {
                    Some(name) if name == SECTION => section = SectionState::Recognized,
                    Some(name) => {
                        warn!("Skipping unrecognized config section [{}] at line {}", name, line_no);
                        self.skipped_sections.push(name.to_string());
                        section = SectionState::Skipped;
                    }
                    None => {
                        error = Some(syntax_error(line_no, raw));
                        break;
                    }
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                error = Some(syntax_error(line_no, raw));
                break;
            };

            let key = key.trim();
            if key.is_empty() {
                error = Some(syntax_error(line_no, raw));
                break;
            }

            match section {
                SectionState::Recognized => self.apply(key, unquote(value.trim()), line_no),
                SectionState::None => debug!("Ignoring key {} outside any section", key),
                SectionState::Skipped => {}
            }
        }

        let table = RedirectTable::disabled()
            .with_target(EligibleHost::GetSend, self.get_send.target)
            .with_target(EligibleHost::TextApi, self.text_api.target);

        LoadReport {
            table,
            error,
            skipped_sections: self.skipped_sections,
        }
    }

    fn apply(&mut self, key: &str, value: &str, line_no: usize) {
        let (slot, current_key) = match key {
            GET_SEND_KEY => (&mut self.get_send, true),
            LEGACY_GET_SEND_KEY => (&mut self.get_send, false),
            TEXT_API_KEY => (&mut self.text_api, true),
            other => {
                debug!("Ignoring unknown key {} at line {}", other, line_no);
                return;
            }
        };

        let target = if value.is_empty() {
            None
        } else {
            match parse_target(value) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("{} at line {}: {}", key, line_no, e);
                    None
                }
            }
        };

        slot.assign(target, current_key);
    }
}

/// Name inside `[...]`, given the text after the opening bracket
fn parse_section_name(rest: &str) -> Option<&str> {
    let name = rest.strip_suffix(']')?.trim();
    if name.is_empty() || name.contains(|c: char| c == '[' || c == ']') {
        return None;
    }
    Some(name)
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn syntax_error(line: usize, content: &str) -> EngineError {
    EngineError::ConfigSyntax {
        line,
        content: content.to_string(),
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the table at `path`, degrading to passthrough on any problem
    pub fn load(path: impl AsRef<Path>) -> RedirectTable {
        Self::load_with_report(path).table
    }

    /// Load the table at `path` and report how loading went
    pub fn load_with_report(path: impl AsRef<Path>) -> LoadReport {
        let path = path.as_ref();

        // Undecodable bytes become U+FFFD so one stray byte cannot drop
        // every rule in the file.
        let report = match std::fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(source) => LoadReport {
                table: RedirectTable::disabled(),
                error: Some(EngineError::ConfigUnavailable {
                    path: path.to_path_buf(),
                    source,
                }),
                skipped_sections: Vec::new(),
            },
        };

        match &report.error {
            None => info!("Loaded redirect config from {}", path.display()),
            Some(e @ EngineError::ConfigUnavailable { .. }) => {
                warn!("{}; redirection disabled", e)
            }
            Some(e) => warn!("{} in {}; keeping rules read so far", e, path.display()),
        }

        if !report.table.is_enabled() {
            info!("No redirect targets configured, all calls pass through");
        }

        observability::record_config_load(&report);
        report
    }

    /// Parse configuration text
    pub fn parse(source: &str) -> LoadReport {
        Parser::default().run(source)
    }
}
