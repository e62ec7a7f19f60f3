//! Element identification.
//!
//! The host owns its entity tree (cards, pieces, spaces). The engine only
//! ever sees elements through an opaque numeric id, which is also how an
//! element travels inside serialized action arguments.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a host-owned game element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl ElementId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Element({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_display() {
        assert_eq!(ElementId::new(7).raw(), 7);
        assert_eq!(format!("{}", ElementId::new(7)), "Element(7)");
    }
}
