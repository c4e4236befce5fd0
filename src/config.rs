//! Console configuration parameters
//!
//! All tunable parameters of an interactive console session.
//! Values can be handed to settings storage as a compact postcard blob.

use serde::{Deserialize, Serialize};

use crate::dispatcher::DEFAULT_TAG;
use crate::error::ConfigError;

/// Maximum length of the module tag placed in parser error lines.
pub const MAX_TAG_LEN: usize = 16;

/// Console session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Tag in front of parser errors (`-ERROR: <tag>: <error>`)
    pub tag: heapless::String<MAX_TAG_LEN>,
    /// Bytes requested from the transport per read
    pub read_chunk: u16,
    /// Upper bound on lines executed by a single poll
    pub max_lines_per_poll: u8,
    /// Report discarded input instead of silently dropping the line
    pub report_overflow: bool,
    /// Write every accepted line back to the output before running it
    pub echo: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let mut tag = heapless::String::new();
        // DEFAULT_TAG is shorter than MAX_TAG_LEN.
        let _ = tag.push_str(DEFAULT_TAG);

        Self {
            tag,
            read_chunk: 64,
            max_lines_per_poll: 8,
            report_overflow: true,
            echo: false,
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.is_empty() {
            return Err(ConfigError::EmptyTag);
        }
        if self.read_chunk == 0 {
            return Err(ConfigError::ZeroReadChunk);
        }
        if self.max_lines_per_poll == 0 {
            return Err(ConfigError::ZeroLinesPerPoll);
        }
        Ok(())
    }

    /// Serialize into a postcard blob for settings storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Codec)
    }

    /// Deserialize and validate a postcard blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Codec)?;
        config.validate()?;
        Ok(config)
    }
}
