use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::directory::{ALL_CATEGORY, is_all};
use crate::error::PredictError;
use crate::http_client::http_client;
use crate::prediction::{ModelDetails, PredictionMethod, PredictionRequest, PredictionResult};

/// The remote prediction service as the client sees it.
pub trait PredictApi: Send + Sync {
    fn weight_classes(&self) -> Result<Vec<String>, PredictError>;

    /// `None` and "All" both mean the unscoped list.
    fn fighters(&self, weight_class: Option<&str>) -> Result<Vec<String>, PredictError>;

    /// `Err(MetadataNotFound)` for unknown fighters. `Ok(vec![])` means known
    /// but without weight classes.
    fn fighter_weight_classes(&self, name: &str) -> Result<Vec<String>, PredictError>;

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError>;
}

/// What `/predict` answered, before it is mapped onto UI state.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictReply {
    Success(PredictionResult),
    ServiceError(String),
}

pub struct HttpPredictApi {
    client: &'static Client,
    base: Url,
}

impl HttpPredictApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid base url {}", config.base_url))?;
        let client = http_client(config.timeout)?;
        Ok(Self { client, base })
    }

    fn get_body(&self, url: Url) -> Result<String> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            bail!("http {status}: {body}");
        }
        Ok(body)
    }
}

impl PredictApi for HttpPredictApi {
    fn weight_classes(&self) -> Result<Vec<String>, PredictError> {
        weight_classes_url(&self.base)
            .and_then(|url| self.get_body(url))
            .and_then(|body| parse_weight_classes_json(&body))
            .map_err(|err| {
                warn!(error = %format!("{err:#}"), "weight class fetch failed");
                PredictError::directory(&err)
            })
    }

    fn fighters(&self, weight_class: Option<&str>) -> Result<Vec<String>, PredictError> {
        fighters_url(&self.base, weight_class)
            .and_then(|url| self.get_body(url))
            .and_then(|body| parse_fighters_json(&body))
            .map_err(|err| {
                warn!(error = %format!("{err:#}"), ?weight_class, "fighter fetch failed");
                PredictError::directory(&err)
            })
    }

    fn fighter_weight_classes(&self, name: &str) -> Result<Vec<String>, PredictError> {
        fighter_weight_classes_url(&self.base, name)
            .and_then(|url| self.get_body(url))
            .and_then(|body| parse_weight_classes_json(&body))
            .map_err(|err| {
                debug!(error = %format!("{err:#}"), name, "fighter lookup missed");
                PredictError::MetadataNotFound
            })
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError> {
        let reply = predict_url(&self.base)
            .and_then(|url| {
                debug!(%url, fighter1 = %request.first, fighter2 = %request.second, "POST");
                self.client
                    .post(url.clone())
                    .json(request)
                    .send()
                    .with_context(|| format!("request to {url} failed"))
            })
            .and_then(|resp| {
                // The body's status field decides, not the HTTP status.
                let status = resp.status();
                let body = resp.text().context("failed reading body")?;
                parse_predict_json(&body).with_context(|| format!("http {status}"))
            })
            .map_err(|err| {
                warn!(error = %format!("{err:#}"), "prediction transport failure");
                PredictError::transport(&err)
            })?;

        match reply {
            PredictReply::Success(result) => Ok(result),
            PredictReply::ServiceError(message) => Err(PredictError::ServiceError(message)),
        }
    }
}

pub fn weight_classes_url(base: &Url) -> Result<Url> {
    endpoint_url(base, &["weight-classes"])
}

pub fn fighters_url(base: &Url, weight_class: Option<&str>) -> Result<Url> {
    let mut url = endpoint_url(base, &["fighters"])?;
    if let Some(category) = weight_class.filter(|c| !is_all(c)) {
        url.query_pairs_mut().append_pair("weight_class", category);
    }
    Ok(url)
}

pub fn fighter_weight_classes_url(base: &Url, name: &str) -> Result<Url> {
    endpoint_url(base, &["fighter-weight-classes", name])
}

pub fn predict_url(base: &Url) -> Result<Url> {
    endpoint_url(base, &["predict"])
}

fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("base url {base} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn parse_weight_classes_json(raw: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid weight classes json")?;
    string_list(&root, "weight_classes")
}

pub fn parse_fighters_json(raw: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid fighters json")?;
    string_list(&root, "fighters")
}

/// String entries of the array under `key`; anything else in it is skipped.
fn string_list(root: &Value, key: &str) -> Result<Vec<String>> {
    let Some(list) = root.get(key).and_then(Value::as_array) else {
        bail!("payload has no {key} list");
    };
    Ok(list
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Deserialize)]
struct PredictionPayload {
    winner: String,
    win_probability: f64,
    confidence_level: f64,
    #[serde(default)]
    weight_class: Option<String>,
    #[serde(default)]
    model_details: Option<ModelDetailsPayload>,
    #[serde(default)]
    fighter_order_randomized: bool,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    fighter1_elo: Option<f64>,
    #[serde(default)]
    fighter2_elo: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelDetailsPayload {
    prediction_method: MethodPayload,
    red_model_confidence: f64,
    blue_model_confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MethodPayload {
    Simple,
    Weighted,
}

pub fn parse_predict_json(raw: &str) -> Result<PredictReply> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid prediction json")?;
    if root.get("status").and_then(Value::as_str) == Some("error") {
        let message = root
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Prediction failed")
            .to_string();
        return Ok(PredictReply::ServiceError(message));
    }

    let payload: PredictionPayload =
        serde_json::from_value(root).context("prediction payload is missing fields")?;
    ensure_unit("win_probability", payload.win_probability)?;
    ensure_unit("confidence_level", payload.confidence_level)?;

    let model_details = match payload.model_details {
        Some(details) => {
            ensure_unit("red_model_confidence", details.red_model_confidence)?;
            ensure_unit("blue_model_confidence", details.blue_model_confidence)?;
            Some(ModelDetails {
                method: match details.prediction_method {
                    MethodPayload::Simple => PredictionMethod::Simple,
                    MethodPayload::Weighted => PredictionMethod::Weighted,
                },
                first_model_confidence: details.red_model_confidence,
                second_model_confidence: details.blue_model_confidence,
            })
        }
        None => None,
    };

    Ok(PredictReply::Success(PredictionResult {
        winner: payload.winner,
        win_probability: payload.win_probability,
        confidence_level: payload.confidence_level,
        category: payload
            .weight_class
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| ALL_CATEGORY.to_string()),
        model_details,
        order_randomized: payload.fighter_order_randomized,
        summary: payload.prediction.filter(|s| !s.trim().is_empty()),
        ratings: payload.fighter1_elo.zip(payload.fighter2_elo),
    }))
}

fn ensure_unit(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("{field} out of range: {value}");
    }
    Ok(())
}
