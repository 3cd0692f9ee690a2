use crate::error::PredictError;

/// Sentinel category meaning "no weight class filter". Never sent to the backend.
pub const ALL_CATEGORY: &str = "All";

pub fn is_all(category: &str) -> bool {
    category == ALL_CATEGORY
}

/// Identifies one in-flight name fetch. Carried through the provider and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamesTicket {
    pub category: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryUpdate {
    Stored { category: String, count: usize },
    /// Response belonged to a category or generation that is no longer current.
    Stale,
    Failed(PredictError),
}

#[derive(Debug, Clone)]
struct CachedNames {
    category: String,
    names: Vec<String>,
}

/// Weight class list plus a single cached (weight class, fighters) pair.
#[derive(Debug, Clone, Default)]
pub struct DirectoryCache {
    categories: Vec<String>,
    cached: Option<CachedNames>,
    pending: Option<NamesTicket>,
    generation: u64,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote categories with the local "All" sentinel at the head.
    pub fn categories(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.categories.len() + 1);
        out.push(ALL_CATEGORY.to_string());
        out.extend(self.categories.iter().cloned());
        out
    }

    pub fn set_categories(&mut self, remote: Vec<String>) {
        self.categories = remote
            .into_iter()
            .filter(|c| !c.trim().is_empty() && !is_all(c))
            .collect();
    }

    /// Cached names for `category`, or an empty slice when nothing valid is held.
    ///
    /// Nothing is served while a fetch for a different category is pending.
    pub fn names(&self, category: &str) -> &[String] {
        if let Some(pending) = &self.pending
            && pending.category != category
        {
            return &[];
        }
        match &self.cached {
            Some(cached) if cached.category == category => &cached.names,
            _ => &[],
        }
    }

    pub fn contains_exact(&self, category: &str, name: &str) -> bool {
        self.names(category).iter().any(|n| n == name)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a fetch for `category` unless a valid entry is already cached or
    /// the same fetch is already in flight.
    pub fn request_names(&mut self, category: &str) -> Option<NamesTicket> {
        if self
            .cached
            .as_ref()
            .is_some_and(|cached| cached.category == category)
        {
            return None;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.category == category && p.generation == self.generation)
        {
            return None;
        }
        let ticket = NamesTicket {
            category: category.to_string(),
            generation: self.generation,
        };
        self.pending = Some(ticket.clone());
        Some(ticket)
    }

    /// Any fetch started before this call will be rejected when it resolves.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    pub fn apply_names(
        &mut self,
        ticket: NamesTicket,
        active_category: &str,
        result: Result<Vec<String>, PredictError>,
    ) -> DirectoryUpdate {
        if ticket.generation != self.generation || ticket.category != active_category {
            return DirectoryUpdate::Stale;
        }
        if self.pending.as_ref() == Some(&ticket) {
            self.pending = None;
        }
        match result {
            Ok(names) => {
                let count = names.len();
                self.cached = Some(CachedNames {
                    category: ticket.category.clone(),
                    names,
                });
                DirectoryUpdate::Stored {
                    category: ticket.category,
                    count,
                }
            }
            Err(err) => DirectoryUpdate::Failed(err),
        }
    }
}
