use crate::directory::ALL_CATEGORY;

/// Owns the active weight class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeController {
    active: String,
}

impl Default for ScopeController {
    fn default() -> Self {
        Self {
            active: ALL_CATEGORY.to_string(),
        }
    }
}

impl ScopeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    /// Returns true when the scope actually changed. Comparison is exact.
    ///
    /// Callers must invalidate everything derived from the old scope on `true`.
    pub fn set_category(&mut self, category: &str) -> bool {
        if self.active == category {
            return false;
        }
        self.active = category.to_string();
        true
    }
}
