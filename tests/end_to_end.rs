use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use fightcard_terminal::api::{PredictApi, PredictReply, parse_predict_json};
use fightcard_terminal::error::{PredictError, TRANSPORT_FAILURE_MSG};
use fightcard_terminal::metadata::MetadataDisplay;
use fightcard_terminal::prediction::{PredictionRequest, PredictionResult, UiState};
use fightcard_terminal::provider::{run_command, spawn_provider};
use fightcard_terminal::state::{AppState, ProviderCommand, Slot, apply_delta};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

enum PredictMode {
    Fixture(&'static str),
    Unreachable,
    /// Names the first fighter the winner; "Slow" takes a while to answer.
    EchoFirst,
}

struct FakeApi {
    calls: Mutex<Vec<String>>,
    fighters: HashMap<String, Vec<String>>,
    weight_classes: HashMap<String, Vec<String>>,
    predict: PredictMode,
}

impl FakeApi {
    fn new(predict: PredictMode) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fighters: HashMap::new(),
            weight_classes: HashMap::new(),
            predict,
        }
    }

    fn with_fighters(mut self, category: &str, list: &[&str]) -> Self {
        self.fighters.insert(category.to_string(), names(list));
        self
    }

    fn with_weight_classes(mut self, name: &str, list: &[&str]) -> Self {
        self.weight_classes.insert(name.to_string(), names(list));
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PredictApi for FakeApi {
    fn weight_classes(&self) -> Result<Vec<String>, PredictError> {
        self.record("weight-classes".to_string());
        Ok(names(&["Lightweight", "Heavyweight"]))
    }

    fn fighters(&self, weight_class: Option<&str>) -> Result<Vec<String>, PredictError> {
        self.record(format!("fighters {weight_class:?}"));
        let key = weight_class.unwrap_or("All");
        self.fighters
            .get(key)
            .cloned()
            .ok_or_else(|| PredictError::DirectoryUnavailable(format!("no list for {key}")))
    }

    fn fighter_weight_classes(&self, name: &str) -> Result<Vec<String>, PredictError> {
        self.record(format!("lookup {name}"));
        self.weight_classes
            .get(name)
            .cloned()
            .ok_or(PredictError::MetadataNotFound)
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError> {
        self.record(format!(
            "predict {} vs {} ({:?})",
            request.first, request.second, request.category
        ));
        match &self.predict {
            PredictMode::Fixture(name) => match parse_predict_json(&read_fixture(name)) {
                Ok(PredictReply::Success(result)) => Ok(result),
                Ok(PredictReply::ServiceError(message)) => Err(PredictError::ServiceError(message)),
                Err(err) => Err(PredictError::transport(&err)),
            },
            PredictMode::Unreachable => Err(PredictError::TransportFailure(
                "operation timed out".to_string(),
            )),
            PredictMode::EchoFirst => {
                if request.first == "Slow" {
                    thread::sleep(Duration::from_millis(300));
                }
                Ok(PredictionResult {
                    winner: request.first.clone(),
                    win_probability: 0.5,
                    confidence_level: 0.5,
                    category: "All".to_string(),
                    model_details: None,
                    order_randomized: false,
                    summary: None,
                    ratings: None,
                })
            }
        }
    }
}

/// Sends every command straight through the fake, like the provider would.
fn drive(state: &mut AppState, api: &FakeApi, cmd: Option<ProviderCommand>) {
    if let Some(cmd) = cmd {
        let delta = run_command(api, cmd);
        apply_delta(state, delta);
    }
}

fn started(api: &FakeApi) -> AppState {
    let mut state = AppState::new();
    for cmd in state.startup_commands() {
        drive(&mut state, api, Some(cmd));
    }
    state
}

#[test]
fn duplicate_pair_never_reaches_the_service() {
    let api = FakeApi::new(PredictMode::Fixture("predict_success.json"))
        .with_fighters("All", &["Jon Jones"]);
    let mut state = started(&api);
    state.on_input(Slot::First, "Jon Jones");
    state.on_input(Slot::Second, "Jon Jones");

    let cmd = state.submit();
    assert!(cmd.is_none());
    drive(&mut state, &api, cmd);

    let message = state.ui_state().error().expect("should be an error");
    assert!(message.contains("different"));
    assert!(!api.calls().iter().any(|c| c.starts_with("predict")));
}

#[test]
fn blank_field_is_missing_selection() {
    let api = FakeApi::new(PredictMode::Fixture("predict_success.json"))
        .with_fighters("All", &["Jon Jones"]);
    let mut state = started(&api);
    state.on_input(Slot::First, "Jon Jones");
    state.on_input(Slot::Second, "   ");

    assert!(state.submit().is_none());
    assert_eq!(
        state.ui_state(),
        &UiState::Error("Please enter both fighter names".to_string())
    );
    assert!(!api.calls().iter().any(|c| c.starts_with("predict")));
}

#[test]
fn successful_prediction_renders_percentages() {
    let api = FakeApi::new(PredictMode::Fixture("predict_success.json"))
        .with_fighters("All", &["Jon Jones", "Stipe Miocic"]);
    let mut state = started(&api);
    state.on_input(Slot::First, "Jon Jones");
    state.on_input(Slot::Second, "Stipe Miocic");

    let cmd = state.submit();
    assert!(state.ui_state().is_loading());
    drive(&mut state, &api, cmd);

    let result = state.ui_state().result().expect("should be a result");
    assert_eq!(result.winner, "Jon Jones");
    assert_eq!(result.win_probability_label(), "73.0%");
    assert_eq!(result.confidence_label(), "81.0%");
    assert_eq!(result.category, "Heavyweight");
    assert!(
        api.calls()
            .contains(&"predict Jon Jones vs Stipe Miocic (None)".to_string())
    );
}

#[test]
fn scoped_directory_feeds_suggestions() {
    let api = FakeApi::new(PredictMode::Fixture("predict_success.json"))
        .with_fighters("All", &["Everyone"])
        .with_fighters("Lightweight", &["A", "B"]);
    let mut state = started(&api);

    let cmd = state.set_category("Lightweight");
    drive(&mut state, &api, cmd);
    assert!(api.calls().contains(&"fighters Some(\"Lightweight\")".to_string()));

    state.on_input(Slot::First, "a");
    assert_eq!(state.input(Slot::First).suggestions, names(&["A"]));
    state.on_input(Slot::First, "A");
    assert_eq!(state.input(Slot::First).suggestions, names(&["A"]));
}

#[test]
fn scoped_submit_sends_weight_class() {
    let api = FakeApi::new(PredictMode::Fixture("predict_weighted.json"))
        .with_fighters("All", &[])
        .with_fighters("Lightweight", &["Islam Makhachev", "Arman Tsarukyan"]);
    let mut state = started(&api);
    let cmd = state.set_category("Lightweight");
    drive(&mut state, &api, cmd);

    state.on_input(Slot::First, "Islam Makhachev");
    state.on_input(Slot::Second, "Arman Tsarukyan");
    state.toggle_details();
    let cmd = state.submit();
    drive(&mut state, &api, cmd);

    assert!(api.calls().contains(
        &"predict Islam Makhachev vs Arman Tsarukyan (Some(\"Lightweight\"))".to_string()
    ));
    assert!(state.ui_state().result().is_some());
    assert!(!state.prediction.details_expanded());
}

#[test]
fn transport_failure_shows_generic_message() {
    let api = FakeApi::new(PredictMode::Unreachable).with_fighters("All", &[]);
    let mut state = started(&api);
    state.on_input(Slot::First, "Jon Jones");
    state.on_input(Slot::Second, "Stipe Miocic");
    let cmd = state.submit();
    drive(&mut state, &api, cmd);

    let message = state.ui_state().error().expect("should be an error");
    assert_eq!(message, TRANSPORT_FAILURE_MSG);
    assert!(!message.contains("timed out"));
    assert!(state.logs.iter().any(|line| line.contains("timed out")));
}

#[test]
fn service_error_is_shown_verbatim() {
    let api = FakeApi::new(PredictMode::Fixture("predict_error.json")).with_fighters("All", &[]);
    let mut state = started(&api);
    state.on_input(Slot::First, "Jon Jonez");
    state.on_input(Slot::Second, "Stipe Miocic");
    let cmd = state.submit();
    drive(&mut state, &api, cmd);

    assert_eq!(
        state.ui_state(),
        &UiState::Error("Fighter Jon Jonez not found in historical data".to_string())
    );
}

#[test]
fn unknown_fighter_lookup_reads_not_found() {
    let api = FakeApi::new(PredictMode::Fixture("predict_success.json"))
        .with_fighters("All", &["Jon Jones", "Ghost"])
        .with_weight_classes("Jon Jones", &["Light Heavyweight", "Heavyweight"]);
    let mut state = started(&api);

    state.on_input(Slot::First, "Jon Jones");
    let cmd = state.on_blur(Slot::First);
    drive(&mut state, &api, cmd);
    assert_eq!(
        state.input(Slot::First).metadata.display(),
        &MetadataDisplay::Found {
            name: "Jon Jones".to_string(),
            weight_classes: names(&["Light Heavyweight", "Heavyweight"]),
        }
    );

    state.on_input(Slot::Second, "Ghost");
    let cmd = state.on_blur(Slot::Second);
    drive(&mut state, &api, cmd);
    assert_eq!(
        state.input(Slot::Second).metadata.display(),
        &MetadataDisplay::NotFound {
            name: "Ghost".to_string()
        }
    );
    assert!(api.calls().contains(&"lookup Ghost".to_string()));
}

#[test]
fn slow_earlier_prediction_cannot_overwrite_newer_one() {
    let api = Arc::new(FakeApi::new(PredictMode::EchoFirst));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(api.clone(), tx, cmd_rx);

    let mut state = AppState::new();
    state.on_input(Slot::First, "Slow");
    state.on_input(Slot::Second, "Other");
    let slow = state.submit().expect("valid submit");
    cmd_tx.send(slow).unwrap();

    state.on_input(Slot::First, "Fast");
    let fast = state.submit().expect("valid submit");
    cmd_tx.send(fast).unwrap();

    for _ in 0..2 {
        let delta = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("provider should answer");
        apply_delta(&mut state, delta);
    }

    let result = state.ui_state().result().expect("should be a result");
    assert_eq!(result.winner, "Fast");
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.contains("Dropped superseded prediction"))
    );
}
