use std::collections::VecDeque;

use chrono::Local;

use crate::directory::{DirectoryCache, DirectoryUpdate, NamesTicket};
use crate::error::PredictError;
use crate::metadata::{LookupTicket, MetadataDisplay, MetadataSlot};
use crate::prediction::{PendingPrediction, PredictionController, PredictionResult, UiState};
use crate::scope::ScopeController;
use crate::suggest::{DEFAULT_SUGGESTION_LIMIT, suggest};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::First, Slot::Second];

    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::First => "Fighter 1",
            Slot::Second => "Fighter 2",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FighterInput {
    pub text: String,
    pub suggestions: Vec<String>,
    pub highlighted: Option<usize>,
    pub metadata: MetadataSlot,
}

impl FighterInput {
    fn reset(&mut self) {
        self.text.clear();
        self.hide_suggestions();
        self.metadata.clear();
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }
}

/// Remote work requested by the UI thread. Each one resolves into a [`Delta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchCategories,
    FetchNames(NamesTicket),
    LookupFighter(LookupTicket),
    Predict(PendingPrediction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    SetCategories(Result<Vec<String>, PredictError>),
    SetNames {
        ticket: NamesTicket,
        result: Result<Vec<String>, PredictError>,
    },
    SetMetadata {
        ticket: LookupTicket,
        result: Result<Vec<String>, PredictError>,
    },
    PredictionFinished {
        seq: u64,
        outcome: Result<PredictionResult, PredictError>,
    },
    Log(String),
}

/// Session context: every cache, selection and UI state lives here and is
/// only touched from the UI thread.
#[derive(Debug, Clone)]
pub struct AppState {
    pub scope: ScopeController,
    pub directory: DirectoryCache,
    pub inputs: [FighterInput; 2],
    pub prediction: PredictionController,
    pub suggestion_limit: usize,
    pub directory_notice: Option<String>,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_suggestion_limit(DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn with_suggestion_limit(limit: usize) -> Self {
        Self {
            scope: ScopeController::new(),
            directory: DirectoryCache::new(),
            inputs: [FighterInput::default(), FighterInput::default()],
            prediction: PredictionController::new(),
            suggestion_limit: limit,
            directory_notice: None,
            logs: VecDeque::new(),
        }
    }

    /// Commands to send once the provider is up: categories plus the unscoped list.
    pub fn startup_commands(&mut self) -> Vec<ProviderCommand> {
        let mut cmds = vec![ProviderCommand::FetchCategories];
        let active = self.scope.active().to_string();
        if let Some(ticket) = self.directory.request_names(&active) {
            cmds.push(ProviderCommand::FetchNames(ticket));
        }
        cmds
    }

    pub fn active_category(&self) -> &str {
        self.scope.active()
    }

    pub fn categories(&self) -> Vec<String> {
        self.directory.categories()
    }

    pub fn input(&self, slot: Slot) -> &FighterInput {
        &self.inputs[slot.index()]
    }

    fn input_mut(&mut self, slot: Slot) -> &mut FighterInput {
        &mut self.inputs[slot.index()]
    }

    pub fn ui_state(&self) -> &UiState {
        self.prediction.state()
    }

    pub fn current_names(&self) -> &[String] {
        self.directory.names(self.scope.active())
    }

    pub fn set_category(&mut self, category: &str) -> Option<ProviderCommand> {
        if !self.scope.set_category(category) {
            return None;
        }
        for input in &mut self.inputs {
            input.reset();
        }
        self.directory.invalidate();
        self.directory_notice = None;
        self.push_log(format!("[INFO] Weight class: {category}"));
        self.directory
            .request_names(category)
            .map(ProviderCommand::FetchNames)
    }

    /// Steps through the category list, wrapping at either end.
    pub fn cycle_category(&mut self, forward: bool) -> Option<ProviderCommand> {
        let categories = self.categories();
        let current = categories
            .iter()
            .position(|c| c == self.scope.active())
            .unwrap_or(0);
        let len = categories.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let category = categories[next].clone();
        self.set_category(&category)
    }

    pub fn on_input(&mut self, slot: Slot, text: &str) {
        let input = self.input_mut(slot);
        input.text = text.to_string();
        input.metadata.clear();
        self.refresh_suggestions(slot);
    }

    pub fn push_char(&mut self, slot: Slot, ch: char) {
        let mut text = self.input(slot).text.clone();
        text.push(ch);
        self.on_input(slot, &text);
    }

    pub fn pop_char(&mut self, slot: Slot) {
        let mut text = self.input(slot).text.clone();
        text.pop();
        self.on_input(slot, &text);
    }

    fn refresh_suggestions(&mut self, slot: Slot) {
        let names = self.directory.names(self.scope.active());
        let suggestions = suggest(&self.inputs[slot.index()].text, names, self.suggestion_limit);
        let input = self.input_mut(slot);
        input.suggestions = suggestions;
        input.highlighted = None;
    }

    pub fn move_highlight(&mut self, slot: Slot, down: bool) {
        let input = self.input_mut(slot);
        if input.suggestions.is_empty() {
            input.highlighted = None;
            return;
        }
        let last = input.suggestions.len() - 1;
        input.highlighted = Some(match (input.highlighted, down) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
    }

    pub fn hide_suggestions(&mut self, slot: Slot) {
        self.input_mut(slot).hide_suggestions();
    }

    /// Fills the input with the chosen suggestion and looks up its weight classes.
    pub fn pick_suggestion(&mut self, slot: Slot, index: usize) -> Option<ProviderCommand> {
        let input = self.input_mut(slot);
        let name = input.suggestions.get(index)?.clone();
        input.text = name.clone();
        input.hide_suggestions();
        let ticket = input.metadata.begin_lookup(slot, &name);
        Some(ProviderCommand::LookupFighter(ticket))
    }

    pub fn pick_highlighted(&mut self, slot: Slot) -> Option<ProviderCommand> {
        let index = self.input(slot).highlighted?;
        self.pick_suggestion(slot, index)
    }

    /// Only exact (case-sensitive) directory entries are looked up; anything
    /// else is marked unrecognized without a request.
    pub fn on_blur(&mut self, slot: Slot) -> Option<ProviderCommand> {
        self.hide_suggestions(slot);
        let value = self.input(slot).text.clone();
        if value.trim().is_empty() {
            self.input_mut(slot).metadata.clear();
            return None;
        }
        let already_shown = match self.input(slot).metadata.display() {
            MetadataDisplay::Loading { name } | MetadataDisplay::Found { name, .. } => {
                *name == value
            }
            _ => false,
        };
        if already_shown {
            return None;
        }
        if self.directory.contains_exact(self.scope.active(), &value) {
            let ticket = self.input_mut(slot).metadata.begin_lookup(slot, &value);
            Some(ProviderCommand::LookupFighter(ticket))
        } else {
            self.input_mut(slot).metadata.mark_unrecognized(&value);
            None
        }
    }

    pub fn submit(&mut self) -> Option<ProviderCommand> {
        for slot in Slot::BOTH {
            self.hide_suggestions(slot);
        }
        let category = self.scope.active().to_string();
        match self.prediction.submit(
            &self.inputs[0].text,
            &self.inputs[1].text,
            &category,
        ) {
            Ok(pending) => {
                self.push_log(format!(
                    "[INFO] Predicting {} vs {}",
                    pending.request.first, pending.request.second
                ));
                Some(ProviderCommand::Predict(pending))
            }
            Err(err) => {
                self.push_log(format!("[WARN] {err}"));
                None
            }
        }
    }

    pub fn toggle_details(&mut self) {
        self.prediction.toggle_details();
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetCategories(Ok(categories)) => {
            state.directory.set_categories(categories);
            let count = state.directory.categories().len() - 1;
            state.push_log(format!("[INFO] Loaded {count} weight classes"));
        }
        Delta::SetCategories(Err(err)) => {
            state.push_log(format!("[WARN] Weight classes: {}", err.log_detail()));
        }
        Delta::SetNames { ticket, result } => {
            let requested = ticket.category.clone();
            let active = state.scope.active().to_string();
            match state.directory.apply_names(ticket, &active, result) {
                DirectoryUpdate::Stored { category, count } => {
                    state.directory_notice = None;
                    state.push_log(format!("[INFO] Loaded {count} fighters ({category})"));
                    // Text typed before the list arrived gets its suggestions now.
                    for slot in Slot::BOTH {
                        if !state.input(slot).text.is_empty() {
                            state.refresh_suggestions(slot);
                        }
                    }
                }
                DirectoryUpdate::Stale => {
                    state.push_log(format!("[INFO] Dropped stale fighter list ({requested})"));
                }
                DirectoryUpdate::Failed(err) => {
                    state.directory_notice = Some(err.to_string());
                    state.push_log(format!("[WARN] Fighter list ({requested}): {}", err.log_detail()));
                }
            }
        }
        Delta::SetMetadata { ticket, result } => {
            let slot = ticket.slot;
            state.inputs[slot.index()].metadata.apply(ticket, result);
        }
        Delta::PredictionFinished { seq, outcome } => {
            if let Err(err) = &outcome {
                state.push_log(format!("[WARN] Prediction: {}", err.log_detail()));
            }
            if !state.prediction.apply(seq, outcome) {
                state.push_log("[INFO] Dropped superseded prediction response");
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
