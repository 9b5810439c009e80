/*! Corpus records

Records flow from stage to stage as JSON lines:

- [Record] is a processed (normalized) unit of text with its provenance,
- [TaggedRecord] adds the script detection result,
- [SplitLabel] names the partition a tagged record ends up in.

Fields we do not know about are kept in [Record::extra] and written back untouched,
so that later stages never lose information added by earlier ones.
!*/
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Processed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(text: String, code: &str, source: &str) -> Self {
        Self {
            text,
            lang: code.to_string(),
            code: code.to_string(),
            source: Some(source.to_string()),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn with_license(mut self, license: &str) -> Self {
        self.license = Some(license.to_string());
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set an extra field, replacing any previous value.
    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) {
        self.extra.insert(key.to_string(), value.into());
    }

    /// Source used for stratification: `source`, then `domain`, then `"unknown"`.
    pub fn stratum_source(&self) -> &str {
        self.source
            .as_deref()
            .or(self.domain.as_deref())
            .unwrap_or("unknown")
    }

    /// Mark the record in its `trace` object (`trace.<stage> = <value>`),
    /// creating the object if needed.
    pub fn trace(&mut self, stage: &str, value: &str) {
        let trace = self
            .extra
            .entry("trace".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !trace.is_object() {
            *trace = Value::Object(Map::new());
        }
        if let Value::Object(m) = trace {
            m.insert(stage.to_string(), Value::String(value.to_string()));
        }
    }
}

/// Script detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptTag {
    /// Dominant script (Unicode long name), or `Unknown`.
    pub primary: String,
    /// Share of counted characters in the dominant script.
    pub primary_ratio: f64,
    /// Character counts by script.
    pub counts: BTreeMap<String, usize>,
}

/// Record with script tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub script: ScriptTag,
    pub is_romanized: bool,
}

/// Partitions of a split corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    Train,
    Dev,
    Test,
}

impl SplitLabel {
    pub const ALL: [SplitLabel; 3] = [SplitLabel::Train, SplitLabel::Dev, SplitLabel::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Dev => "dev",
            SplitLabel::Test => "test",
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SplitLabel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(SplitLabel::Train),
            "dev" => Ok(SplitLabel::Dev),
            "test" => Ok(SplitLabel::Test),
            other => Err(format!("unknown split: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive() {
        let line = r#"{"text":"hi","lang":"en","code":"en","source":"tatoeba","tatoeba_lang":"eng","trace":{"a":"b"}}"#;
        let rec: Record = serde_json::from_str(line).unwrap();
        assert_eq!(rec.extra.get("tatoeba_lang").unwrap(), "eng");

        let back: Value = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["tatoeba_lang"], "eng");
        assert_eq!(back["trace"]["a"], "b");
        // None fields are not written
        assert!(back.get("domain").is_none());
    }

    #[test]
    fn tagged_reads_plain_fields() {
        let line = r#"{"text":"hi","lang":"en","code":"en","script":{"primary":"Latin","primary_ratio":1.0,"counts":{"Latin":2}},"is_romanized":false}"#;
        let rec: TaggedRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.record.text, "hi");
        assert_eq!(rec.script.primary, "Latin");
        assert!(rec.record.extra.get("script").is_none());
    }

    #[test]
    fn trace_merges() {
        let mut rec = Record::new("x".to_string(), "en", "udhr");
        rec.trace("dedup", "kept");
        rec.trace("split", "dev");
        assert_eq!(rec.extra["trace"]["dedup"], "kept");
        assert_eq!(rec.extra["trace"]["split"], "dev");
    }

    #[test]
    fn stratum_fallbacks() {
        let mut rec = Record::default();
        assert_eq!(rec.stratum_source(), "unknown");
        rec.domain = Some("legal".to_string());
        assert_eq!(rec.stratum_source(), "legal");
        rec.source = Some("udhr".to_string());
        assert_eq!(rec.stratum_source(), "udhr");
    }
}
