// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// Style transitions accumulated since the last [`commit`](crate::SelectionRegistry::commit).
///
/// Ids are listed in the order their final transition was recorded. An id
/// selected and deselected within one batch appears in neither list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleDamage<K> {
    /// Ids that gained the highlighted style.
    pub highlighted: SmallVec<[K; 4]>,
    /// Ids that went back to the default style.
    pub restored: SmallVec<[K; 4]>,
}

impl<K> Default for StyleDamage<K> {
    fn default() -> Self {
        Self {
            highlighted: SmallVec::new(),
            restored: SmallVec::new(),
        }
    }
}

impl<K> StyleDamage<K> {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty() && self.restored.is_empty()
    }
}
