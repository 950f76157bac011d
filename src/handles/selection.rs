use super::HandleId;

/// Handles selected in the active editing session.
///
/// Owned by the session and passed to the handle set explicitly. Cleared
/// whenever handles are spawned or torn down, so it never outlives them.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<HandleId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` unless already selected.
    pub fn insert(&mut self, id: HandleId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn ids(&self) -> &[HandleId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
