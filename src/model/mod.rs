use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read feature file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feature json: {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse feature yaml: {path}: {source}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "sample {sample} of group {group} has {tokens} tokens but {acts} activations"
    )]
    MisalignedSample {
        group: usize,
        sample: usize,
        tokens: usize,
        acts: usize,
    },
}

/// One raw tokenizer unit and the activation recorded at its position.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub bytes: Vec<u8>,
    pub feature_act: f32,
}

impl Token {
    pub fn new(bytes: impl Into<Vec<u8>>, feature_act: f32) -> Self {
        Self {
            bytes: bytes.into(),
            feature_act,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub context: Vec<Vec<u8>>,
    pub feature_acts: Vec<f32>,
}

impl Sample {
    /// Pairs each context entry with its activation. Extra entries on either
    /// side are ignored; `Feature::validate` reports such samples.
    pub fn tokens(&self) -> Vec<Token> {
        self.context
            .iter()
            .zip(self.feature_acts.iter())
            .map(|(bytes, act)| Token::new(bytes.clone(), *act))
            .collect()
    }

    pub fn max_feature_act(&self) -> Option<f32> {
        max_of(self.feature_acts.iter().copied())
    }

    pub fn is_aligned(&self) -> bool {
        self.context.len() == self.feature_acts.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_name: Option<String>,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl SampleGroup {
    /// Peak activation of the group's reference sample (`samples[0]`).
    pub fn max_activation(&self) -> Option<f32> {
        self.samples.first().and_then(Sample::max_feature_act)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_name: Option<String>,
    pub max_feature_act: f32,
    #[serde(default)]
    pub sample_groups: Vec<SampleGroup>,
}

impl Feature {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (group_idx, group) in self.sample_groups.iter().enumerate() {
            for (sample_idx, sample) in group.samples.iter().enumerate() {
                if !sample.is_aligned() {
                    return Err(ModelError::MisalignedSample {
                        group: group_idx,
                        sample: sample_idx,
                        tokens: sample.context.len(),
                        acts: sample.feature_acts.len(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn title(&self) -> String {
        match (self.dictionary_name.as_deref(), self.feature_index) {
            (Some(dict), Some(idx)) => format!("{dict} #{idx}"),
            (None, Some(idx)) => format!("Feature #{idx}"),
            (Some(dict), None) => dict.to_string(),
            (None, None) => "Feature".to_string(),
        }
    }
}

/// A run of tokens whose concatenated bytes decode to `text`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenGroup {
    pub tokens: Vec<Token>,
    pub text: String,
}

impl TokenGroup {
    pub fn max_feature_act(&self) -> Option<f32> {
        max_of(self.tokens.iter().map(|t| t.feature_act))
    }

    pub fn bytes(&self) -> Vec<u8> {
        concat_bytes(&self.tokens)
    }
}

pub(crate) fn concat_bytes(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(|t| t.bytes.len()).sum());
    for token in tokens {
        out.extend_from_slice(&token.bytes);
    }
    out
}

fn max_of(values: impl Iterator<Item = f32>) -> Option<f32> {
    values.reduce(f32::max)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

fn document_format(path: &Path) -> DocumentFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("yml") | Some("yaml") => DocumentFormat::Yaml,
        _ => DocumentFormat::Json,
    }
}

pub fn parse_feature_json(contents: &str, path: &str) -> Result<Feature, ModelError> {
    let feature: Feature =
        serde_json::from_str(contents).map_err(|source| ModelError::ParseJson {
            path: path.to_string(),
            source,
        })?;
    feature.validate()?;
    Ok(feature)
}

pub fn parse_feature_yaml(contents: &str, path: &str) -> Result<Feature, ModelError> {
    let feature: Feature =
        serde_yaml::from_str(contents).map_err(|source| ModelError::ParseYaml {
            path: path.to_string(),
            source,
        })?;
    feature.validate()?;
    Ok(feature)
}

pub fn load_feature(path: &Path) -> Result<Feature, ModelError> {
    let display_path = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: display_path.clone(),
        source,
    })?;
    let feature = match document_format(path) {
        DocumentFormat::Json => parse_feature_json(&contents, &display_path)?,
        DocumentFormat::Yaml => parse_feature_yaml(&contents, &display_path)?,
    };
    tracing::debug!(
        path = %display_path,
        groups = feature.sample_groups.len(),
        "loaded feature"
    );
    Ok(feature)
}
