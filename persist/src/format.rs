//! Byte framing of [`WireComponent`]s.
//!
//! A frame holds either a single component or an ordered batch. Batches
//! keep their order, so deserializing the decoded list front to back
//! rebuilds the components in the sequence they were written. Which
//! [`Format`] variants exist depends on the `serialize-ron` and
//! `serialize-bincode` features.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FormatError;
use crate::wire::WireComponent;

/// Byte representation of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Pretty-printed RON text, readable and diffable.
    #[cfg(feature = "serialize-ron")]
    Ron,
    /// Length-prefixed bincode.
    #[cfg(feature = "serialize-bincode")]
    Bincode,
}

impl Format {
    /// Short lowercase name, also used in [`FormatError`] messages.
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "serialize-ron")]
            Self::Ron => "ron",
            #[cfg(feature = "serialize-bincode")]
            Self::Bincode => "bincode",
        }
    }

    #[cfg(any(feature = "serialize-ron", feature = "serialize-bincode"))]
    fn write_error(self, message: impl ToString) -> FormatError {
        FormatError::Write {
            format: self.name(),
            message: message.to_string(),
        }
    }

    #[cfg(any(feature = "serialize-ron", feature = "serialize-bincode"))]
    fn read_error(self, message: impl ToString) -> FormatError {
        FormatError::Read {
            format: self.name(),
            message: message.to_string(),
        }
    }

    #[allow(unused_variables)]
    fn write<T: Serialize>(self, frame: &T) -> Result<Vec<u8>, FormatError> {
        match self {
            #[cfg(feature = "serialize-ron")]
            Self::Ron => ron::ser::to_string_pretty(frame, ron::ser::PrettyConfig::default())
                .map(String::into_bytes)
                .map_err(|e| self.write_error(e)),
            #[cfg(feature = "serialize-bincode")]
            Self::Bincode => bincode::serialize(frame).map_err(|e| self.write_error(e)),
        }
    }

    #[allow(unused_variables)]
    fn read<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, FormatError> {
        match self {
            #[cfg(feature = "serialize-ron")]
            Self::Ron => {
                let text = std::str::from_utf8(bytes).map_err(|e| self.read_error(e))?;
                ron::from_str(text).map_err(|e| self.read_error(e))
            }
            #[cfg(feature = "serialize-bincode")]
            Self::Bincode => bincode::deserialize(bytes).map_err(|e| self.read_error(e)),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame one component.
pub fn encode_component(component: &WireComponent, format: Format) -> Result<Vec<u8>, FormatError> {
    format.write(component)
}

/// Read a frame written by [`encode_component`].
pub fn decode_component(bytes: &[u8], format: Format) -> Result<WireComponent, FormatError> {
    format.read(bytes)
}

/// Frame an ordered batch of components.
pub fn encode_components(
    components: &[WireComponent],
    format: Format,
) -> Result<Vec<u8>, FormatError> {
    format.write(&components)
}

/// Read a batch written by [`encode_components`], in its original order.
pub fn decode_components(bytes: &[u8], format: Format) -> Result<Vec<WireComponent>, FormatError> {
    format.read(bytes)
}
