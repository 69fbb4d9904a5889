use std::fmt;

use serde::{Serialize, Serializer};

/// Outcome of a window placement search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// No placement scored above zero; the renderer centers the image.
    Centered,
    /// Top of the winning window, in pixels from the image top.
    ///
    /// A winning top of 0 is still an offset and renders as `-0px`; only
    /// `Centered` renders as `50%`.
    Offset(u32),
}

impl Placement {
    pub fn offset(&self) -> Option<u32> {
        match self {
            Placement::Centered => None,
            Placement::Offset(top) => Some(*top),
        }
    }
}

/// CSS value for the renderer: `50%` or a negative pixel offset that
/// shifts the image up inside its container.
impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Centered => write!(f, "50%"),
            Placement::Offset(top) => write!(f, "-{top}px"),
        }
    }
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
