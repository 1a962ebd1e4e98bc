//! Soft warnings raised while populating a descriptor.
//!
//! A few record fields are parsed leniently: a bad value falls back to a
//! default instead of failing `populate`. Each fallback is logged and kept
//! on the descriptor so callers can inspect it.

use serde::Serialize;
use std::fmt;

/// A tolerated parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PopulateWarning {
    /// The VIF `device` string is not an integer; `device_order` was set to 0.
    UnparsableDeviceOrder { device: String },
    /// The VBD template-device flag is not a boolean; it was read as `false`.
    UnparsableTemplateDevice { value: String },
}

impl fmt::Display for PopulateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsableDeviceOrder { device } => {
                write!(f, "cannot parse VIF device {:?} as an integer", device)
            }
            Self::UnparsableTemplateDevice { value } => {
                write!(f, "cannot parse template device flag {:?} as a boolean", value)
            }
        }
    }
}
