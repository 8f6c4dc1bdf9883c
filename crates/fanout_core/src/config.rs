//! Model generation parameters.
//!
//! A [`GenerationConfig`] starts from the defaults of a model family and is
//! then overlaid with caller overrides. Every override is checked against the
//! parameter table below before it is accepted.

use derive_getters::Getters;
use fanout_error::{ConfigError, ConfigErrorKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Model families with known generation defaults.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelFamily {
    /// Llama and derivatives
    Llama,
    /// Mistral and Mixtral
    Mistral,
    /// Meta OPT
    Opt,
    /// TII Falcon
    Falcon,
}

impl ModelFamily {
    /// Family-specific sampling defaults.
    fn defaults(&self) -> [(&'static str, Value); 4] {
        match self {
            ModelFamily::Llama => [
                ("max_new_tokens", json!(128)),
                ("temperature", json!(0.6)),
                ("top_p", json!(0.9)),
                ("top_k", json!(12)),
            ],
            ModelFamily::Mistral => [
                ("max_new_tokens", json!(256)),
                ("temperature", json!(0.7)),
                ("top_p", json!(0.95)),
                ("top_k", json!(12)),
            ],
            ModelFamily::Opt => [
                ("max_new_tokens", json!(256)),
                ("temperature", json!(0.75)),
                ("top_p", json!(1.0)),
                ("top_k", json!(15)),
            ],
            ModelFamily::Falcon => [
                ("max_new_tokens", json!(200)),
                ("temperature", json!(0.75)),
                ("top_p", json!(1.0)),
                ("top_k", json!(10)),
            ],
        }
    }
}

/// Defaults shared by every family.
fn shared_defaults() -> [(&'static str, Value); 6] {
    [
        ("repetition_penalty", json!(1.0)),
        ("presence_penalty", json!(0.0)),
        ("frequency_penalty", json!(0.0)),
        ("n", json!(1)),
        ("best_of", json!(1)),
        ("use_beam_search", json!(false)),
    ]
}

#[derive(Debug, Clone, Copy)]
enum ParamRule {
    /// Integer >= 1
    PositiveInt,
    /// Integer >= 1, or -1 to disable
    TopK,
    /// Float in (0, 1]
    Probability,
    /// Float >= 0
    NonNegative,
    /// Float > 0
    Positive,
    /// Float in [-2, 2]
    Penalty,
    Bool,
    /// A string or an array of strings
    StopSequences,
}

const PARAMETERS: &[(&str, ParamRule)] = &[
    ("max_new_tokens", ParamRule::PositiveInt),
    ("max_tokens", ParamRule::PositiveInt),
    ("temperature", ParamRule::NonNegative),
    ("top_p", ParamRule::Probability),
    ("top_k", ParamRule::TopK),
    ("repetition_penalty", ParamRule::Positive),
    ("presence_penalty", ParamRule::Penalty),
    ("frequency_penalty", ParamRule::Penalty),
    ("n", ParamRule::PositiveInt),
    ("best_of", ParamRule::PositiveInt),
    ("use_beam_search", ParamRule::Bool),
    ("stop", ParamRule::StopSequences),
];

impl ParamRule {
    fn lookup(name: &str) -> Option<Self> {
        PARAMETERS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, rule)| *rule)
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamRule::PositiveInt => match value.as_i64() {
                Some(v) if v >= 1 => Ok(()),
                Some(v) => Err(format!("must be at least 1, got {v}")),
                None => Err(format!("expected an integer, got {value}")),
            },
            ParamRule::TopK => match value.as_i64() {
                Some(v) if v >= 1 || v == -1 => Ok(()),
                Some(v) => Err(format!("must be -1 or at least 1, got {v}")),
                None => Err(format!("expected an integer, got {value}")),
            },
            ParamRule::Probability => match value.as_f64() {
                Some(v) if v > 0.0 && v <= 1.0 => Ok(()),
                Some(v) => Err(format!("must be in (0, 1], got {v}")),
                None => Err(format!("expected a number, got {value}")),
            },
            ParamRule::NonNegative => match value.as_f64() {
                Some(v) if v >= 0.0 => Ok(()),
                Some(v) => Err(format!("must not be negative, got {v}")),
                None => Err(format!("expected a number, got {value}")),
            },
            ParamRule::Positive => match value.as_f64() {
                Some(v) if v > 0.0 => Ok(()),
                Some(v) => Err(format!("must be greater than 0, got {v}")),
                None => Err(format!("expected a number, got {value}")),
            },
            ParamRule::Penalty => match value.as_f64() {
                Some(v) if (-2.0..=2.0).contains(&v) => Ok(()),
                Some(v) => Err(format!("must be in [-2, 2], got {v}")),
                None => Err(format!("expected a number, got {value}")),
            },
            ParamRule::Bool => match value {
                Value::Bool(_) => Ok(()),
                other => Err(format!("expected true or false, got {other}")),
            },
            ParamRule::StopSequences => match value {
                Value::String(_) => Ok(()),
                Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
                other => Err(format!("expected a string or list of strings, got {other}")),
            },
        }
    }
}

/// Validated generation parameters for one model family.
///
/// Serializes as the flat parameter object sent in the `llm_config` field.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct GenerationConfig {
    /// Model family name
    #[serde(skip)]
    model: String,
    /// Merged parameter values
    #[serde(flatten)]
    parameters: BTreeMap<String, Value>,
}

impl GenerationConfig {
    /// Start from the defaults of the named model family.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::UnknownModel`] for an unrecognised family.
    #[instrument]
    pub fn for_model(model: &str) -> Result<Self, ConfigError> {
        let family: ModelFamily = model
            .trim()
            .parse()
            .map_err(|_| ConfigError::new(ConfigErrorKind::UnknownModel(model.to_string())))?;

        let parameters = family
            .defaults()
            .into_iter()
            .chain(shared_defaults())
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        debug!(model = %family, "Loaded model defaults");
        Ok(Self {
            model: family.to_string(),
            parameters,
        })
    }

    /// Override a single parameter.
    ///
    /// # Errors
    ///
    /// Fails if the parameter is unknown or the value is out of range.
    pub fn with_override(
        self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, ConfigError> {
        self.with_overrides([(name.into(), value.into())])
    }

    /// Override several parameters, stopping at the first invalid one.
    ///
    /// When `n` is raised above `best_of` and `best_of` is not among the
    /// overrides, `best_of` follows `n`.
    pub fn with_overrides<I, K>(mut self, overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut best_of_set = false;
        for (name, value) in overrides {
            let name = name.into();
            let rule = ParamRule::lookup(&name).ok_or_else(|| {
                ConfigError::new(ConfigErrorKind::UnknownParameter {
                    model: self.model.clone(),
                    name: name.clone(),
                })
            })?;
            rule.check(&value).map_err(|reason| {
                ConfigError::new(ConfigErrorKind::InvalidParameter {
                    name: name.clone(),
                    reason,
                })
            })?;
            best_of_set |= name == "best_of";
            debug!(parameter = %name, value = %value, "Applied override");
            self.parameters.insert(name, value);
        }

        self.reconcile_best_of(best_of_set)?;
        Ok(self)
    }

    /// Look up a single parameter value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    fn reconcile_best_of(&mut self, explicit: bool) -> Result<(), ConfigError> {
        let n = self.get("n").and_then(Value::as_i64).unwrap_or(1);
        let best_of = self.get("best_of").and_then(Value::as_i64).unwrap_or(1);
        if best_of >= n {
            return Ok(());
        }
        if explicit {
            return Err(ConfigError::new(ConfigErrorKind::InvalidParameter {
                name: "best_of".to_string(),
                reason: format!("must be at least n ({n}), got {best_of}"),
            }));
        }
        self.parameters.insert("best_of".to_string(), json!(n));
        Ok(())
    }
}
