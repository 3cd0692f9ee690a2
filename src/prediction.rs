use serde::Serialize;

use crate::directory::is_all;
use crate::error::PredictError;

/// Body of `POST /predict`. The weight class is left out entirely for "All".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    #[serde(rename = "fighter1")]
    pub first: String,
    #[serde(rename = "fighter2")]
    pub second: String,
    #[serde(rename = "weight_class", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PredictionRequest {
    /// Validates locally; nothing here touches the network.
    pub fn build(first: &str, second: &str, category: &str) -> Result<Self, PredictError> {
        let first = first.trim();
        let second = second.trim();
        if first.is_empty() || second.is_empty() {
            return Err(PredictError::MissingSelection);
        }
        if first == second {
            return Err(PredictError::DuplicateSelection);
        }
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
            category: (!is_all(category)).then(|| category.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionMethod {
    Simple,
    Weighted,
}

impl PredictionMethod {
    pub fn label(self) -> &'static str {
        match self {
            PredictionMethod::Simple => "Simple",
            PredictionMethod::Weighted => "Weighted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDetails {
    pub method: PredictionMethod,
    pub first_model_confidence: f64,
    pub second_model_confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub winner: String,
    pub win_probability: f64,
    pub confidence_level: f64,
    pub category: String,
    pub model_details: Option<ModelDetails>,
    pub order_randomized: bool,
    // Basic-model extras; older backends send these instead of model details.
    pub summary: Option<String>,
    pub ratings: Option<(f64, f64)>,
}

impl PredictionResult {
    pub fn win_probability_label(&self) -> String {
        format_percent(self.win_probability)
    }

    pub fn confidence_label(&self) -> String {
        format_percent(self.confidence_level)
    }
}

pub fn format_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Result(PredictionResult),
    Error(String),
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            UiState::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrediction {
    pub seq: u64,
    pub request: PredictionRequest,
}

/// Drives Idle → Loading → Result | Error.
///
/// Every submit takes a fresh sequence number, validation failures included,
/// and only the outcome carrying the latest one is applied.
#[derive(Debug, Clone, Default)]
pub struct PredictionController {
    state: UiState,
    seq: u64,
    details_expanded: bool,
    inflight: Option<PredictionRequest>,
    // Names behind the result on screen, independent of later edits.
    matchup: Option<PredictionRequest>,
}

impl PredictionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    pub fn details_expanded(&self) -> bool {
        self.details_expanded
    }

    pub fn toggle_details(&mut self) {
        self.details_expanded = !self.details_expanded;
    }

    /// The request whose result is currently shown.
    pub fn matchup(&self) -> Option<&PredictionRequest> {
        match self.state {
            UiState::Result(_) => self.matchup.as_ref(),
            _ => None,
        }
    }

    /// "A (Elo: 1712) | B (Elo: 1581)" for results that carry ratings.
    pub fn ratings_line(&self) -> Option<String> {
        let (first, second) = self.state.result()?.ratings?;
        let matchup = self.matchup()?;
        Some(format!(
            "{} (Elo: {}) | {} (Elo: {})",
            matchup.first,
            first.round(),
            matchup.second,
            second.round()
        ))
    }

    pub fn submit(
        &mut self,
        first: &str,
        second: &str,
        category: &str,
    ) -> Result<PendingPrediction, PredictError> {
        self.seq = self.seq.wrapping_add(1);
        match PredictionRequest::build(first, second, category) {
            Ok(request) => {
                self.state = UiState::Loading;
                self.inflight = Some(request.clone());
                Ok(PendingPrediction {
                    seq: self.seq,
                    request,
                })
            }
            Err(err) => {
                self.state = UiState::Error(err.to_string());
                self.inflight = None;
                Err(err)
            }
        }
    }

    /// Returns false when `seq` was superseded and the outcome was dropped.
    pub fn apply(&mut self, seq: u64, outcome: Result<PredictionResult, PredictError>) -> bool {
        if seq != self.seq {
            return false;
        }
        self.state = match outcome {
            Ok(result) => {
                self.details_expanded = false;
                self.matchup = self.inflight.take();
                UiState::Result(result)
            }
            Err(err) => {
                self.inflight = None;
                UiState::Error(err.to_string())
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(winner: &str) -> PredictionResult {
        PredictionResult {
            winner: winner.to_string(),
            win_probability: 0.6,
            confidence_level: 0.5,
            category: "Heavyweight".to_string(),
            model_details: None,
            order_randomized: false,
            summary: None,
            ratings: None,
        }
    }

    #[test]
    fn all_category_is_omitted_from_body() {
        let req = PredictionRequest::build(" Jon Jones ", "Stipe Miocic", "All").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"fighter1": "Jon Jones", "fighter2": "Stipe Miocic"})
        );
    }

    #[test]
    fn scoped_category_is_sent() {
        let req = PredictionRequest::build("A", "B", "Lightweight").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["weight_class"], "Lightweight");
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        assert!(PredictionRequest::build("jon jones", "Jon Jones", "All").is_ok());
        assert_eq!(
            PredictionRequest::build("Jon Jones", "Jon Jones", "All"),
            Err(PredictError::DuplicateSelection)
        );
    }

    #[test]
    fn superseded_submit_cannot_overwrite_newer_state() {
        let mut ctl = PredictionController::new();
        let first = ctl.submit("A", "B", "All").unwrap();
        let second = ctl.submit("C", "D", "All").unwrap();

        assert!(ctl.apply(second.seq, Ok(sample_result("C"))));
        assert!(!ctl.apply(first.seq, Ok(sample_result("A"))));
        assert_eq!(ctl.state().result().map(|r| r.winner.as_str()), Some("C"));
    }

    #[test]
    fn validation_failure_supersedes_inflight_request() {
        let mut ctl = PredictionController::new();
        let pending = ctl.submit("A", "B", "All").unwrap();
        assert!(ctl.submit("", "B", "All").is_err());
        assert!(!ctl.apply(pending.seq, Ok(sample_result("A"))));
        assert_eq!(ctl.state().error(), Some("Please enter both fighter names"));
    }

    #[test]
    fn result_collapses_details() {
        let mut ctl = PredictionController::new();
        ctl.toggle_details();
        let pending = ctl.submit("A", "B", "All").unwrap();
        assert!(ctl.details_expanded());
        ctl.apply(pending.seq, Ok(sample_result("A")));
        assert!(!ctl.details_expanded());
    }

    #[test]
    fn ratings_round_half_up() {
        let mut ctl = PredictionController::new();
        let pending = ctl.submit("A", "B", "All").unwrap();
        let mut result = sample_result("A");
        result.ratings = Some((1500.5, 1480.4));
        ctl.apply(pending.seq, Ok(result));
        assert_eq!(
            ctl.ratings_line().as_deref(),
            Some("A (Elo: 1501) | B (Elo: 1480)")
        );
    }

    #[test]
    fn no_ratings_line_without_ratings() {
        let mut ctl = PredictionController::new();
        let pending = ctl.submit("A", "B", "All").unwrap();
        ctl.apply(pending.seq, Ok(sample_result("A")));
        assert!(ctl.ratings_line().is_none());
        assert_eq!(ctl.matchup().map(|m| m.first.as_str()), Some("A"));
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.73), "73.0%");
        assert_eq!(format_percent(0.8134), "81.3%");
    }
}
