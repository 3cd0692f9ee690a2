use crate::error::PredictError;
use crate::state::Slot;

/// What the weight-class line under a fighter input shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MetadataDisplay {
    #[default]
    Hidden,
    Loading {
        name: String,
    },
    /// An empty list still means the fighter exists.
    Found {
        name: String,
        weight_classes: Vec<String>,
    },
    NotFound {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub slot: Slot,
    pub name: String,
    pub generation: u64,
}

/// Metadata display for one input, guarded by a generation counter so a late
/// lookup cannot repaint a slot that has since been cleared or re-targeted.
#[derive(Debug, Clone, Default)]
pub struct MetadataSlot {
    display: MetadataDisplay,
    generation: u64,
}

impl MetadataSlot {
    pub fn display(&self) -> &MetadataDisplay {
        &self.display
    }

    pub fn clear(&mut self) {
        self.bump();
        self.display = MetadataDisplay::Hidden;
    }

    /// Typed value is not in the directory; no lookup is issued.
    pub fn mark_unrecognized(&mut self, name: &str) {
        self.bump();
        self.display = MetadataDisplay::NotFound {
            name: name.to_string(),
        };
    }

    pub fn begin_lookup(&mut self, slot: Slot, name: &str) -> LookupTicket {
        self.bump();
        self.display = MetadataDisplay::Loading {
            name: name.to_string(),
        };
        LookupTicket {
            slot,
            name: name.to_string(),
            generation: self.generation,
        }
    }

    /// Returns false when the ticket is stale and nothing changed.
    pub fn apply(
        &mut self,
        ticket: LookupTicket,
        result: Result<Vec<String>, PredictError>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.display = match result {
            Ok(weight_classes) => MetadataDisplay::Found {
                name: ticket.name,
                weight_classes,
            },
            Err(_) => MetadataDisplay::NotFound { name: ticket.name },
        };
        true
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
