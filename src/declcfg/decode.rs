//! Decoding records by their `schema` discriminator, and encoding them back

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    DeclarativeConfig, Meta, SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS, SCHEMA_PACKAGE,
};
use crate::error::Result;
use crate::error::fs::read_failed;
use crate::error::property::record_decode_failed;

fn typed<T: DeserializeOwned>(schema: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| record_decode_failed(schema, e.to_string()))
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl DeclarativeConfig {
    /// Decode one record and add it to the matching list
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::RecordDecode` if the value has no string
    /// `schema` field, or if a known schema's body does not decode.
    pub fn push_value(&mut self, value: Value) -> Result<()> {
        let Some(schema) = value.get("schema").and_then(Value::as_str) else {
            return Err(record_decode_failed(
                "unknown",
                "record has no string \"schema\" field",
            ));
        };

        match schema {
            SCHEMA_PACKAGE => self.packages.push(typed(schema, &value)?),
            SCHEMA_CHANNEL => self.channels.push(typed(schema, &value)?),
            SCHEMA_BUNDLE => self.bundles.push(typed(schema, &value)?),
            SCHEMA_DEPRECATIONS => self.deprecations.push(typed(schema, &value)?),
            _ => {
                let meta = Meta {
                    schema: schema.to_string(),
                    package: string_field(&value, "package"),
                    name: string_field(&value, "name"),
                    blob: value,
                };
                self.others.push(meta);
            }
        }
        Ok(())
    }

    /// Decode a stream of concatenated JSON objects
    pub fn from_json_stream(input: &str) -> Result<Self> {
        let mut cfg = Self::new();
        for value in serde_json::Deserializer::from_str(input).into_iter::<Value>() {
            let value = value.map_err(|e| record_decode_failed("json", e.to_string()))?;
            cfg.push_value(value)?;
        }
        Ok(cfg)
    }

    /// Decode a multi-document YAML string
    pub fn from_yaml_documents(input: &str) -> Result<Self> {
        let mut cfg = Self::new();
        for document in serde_yaml::Deserializer::from_str(input) {
            let value = Value::deserialize(document)
                .map_err(|e| record_decode_failed("yaml", e.to_string()))?;
            if value.is_null() {
                continue;
            }
            cfg.push_value(value)?;
        }
        Ok(cfg)
    }

    /// Load one file: `.yaml`/`.yml` as YAML documents, anything else as a JSON stream
    pub fn from_file(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| read_failed(path.display().to_string(), e.to_string()))?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_documents(&input)
        } else {
            Self::from_json_stream(&input)
        }
    }

    /// Load and merge several files in order
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut cfg = Self::new();
        for path in paths {
            cfg.merge(Self::from_file(path.as_ref())?);
        }
        Ok(cfg)
    }

    /// Every record as a JSON value, packages first and pass-through records last
    pub fn to_values(&self) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for p in &self.packages {
            out.push(serde_json::to_value(p)?);
        }
        for c in &self.channels {
            out.push(serde_json::to_value(c)?);
        }
        for b in &self.bundles {
            out.push(serde_json::to_value(b)?);
        }
        for d in &self.deprecations {
            out.push(serde_json::to_value(d)?);
        }
        out.extend(self.others.iter().map(|m| m.blob.clone()));
        Ok(out)
    }

    /// Pretty-printed JSON objects, one after another
    pub fn to_json_stream(&self) -> Result<String> {
        let mut out = String::new();
        for value in self.to_values()? {
            out.push_str(&serde_json::to_string_pretty(&value)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// YAML documents separated by `---`
    pub fn to_yaml_documents(&self) -> Result<String> {
        let mut out = String::new();
        for value in self.to_values()? {
            out.push_str("---\n");
            out.push_str(&serde_yaml::to_string(&value)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_value_dispatches_on_schema() {
        let mut cfg = DeclarativeConfig::new();
        cfg.push_value(json!({"schema": "olm.package", "name": "etcd", "defaultChannel": "alpha"}))
            .expect("package decodes");
        cfg.push_value(json!({
            "schema": "olm.channel",
            "name": "alpha",
            "package": "etcd",
            "entries": [{"name": "etcd.v0.9.2", "replaces": "etcd.v0.9.0", "skips": ["etcd.v0.9.1"], "skipRange": "<0.9.2"}]
        }))
        .expect("channel decodes");
        cfg.push_value(json!({
            "schema": "olm.bundle",
            "name": "etcd.v0.9.2",
            "package": "etcd",
            "image": "quay.io/etcd:v0.9.2",
            "properties": [{"type": "olm.package", "value": {"packageName": "etcd", "version": "0.9.2"}}],
            "relatedImages": [{"name": "operator", "image": "quay.io/etcd-operator:v0.9.2"}]
        }))
        .expect("bundle decodes");
        cfg.push_value(json!({"schema": "custom.thing", "package": "etcd", "name": "x", "data": 1}))
            .expect("unknown schemas pass through");

        assert_eq!(cfg.packages[0].default_channel, "alpha");
        let entry = &cfg.channels[0].entries[0];
        assert_eq!(entry.replaces, "etcd.v0.9.0");
        assert_eq!(entry.skips, vec!["etcd.v0.9.1".to_string()]);
        assert_eq!(entry.skip_range, "<0.9.2");
        assert_eq!(cfg.bundles[0].related_images[0].name, "operator");
        assert_eq!(cfg.others[0].schema, "custom.thing");
        assert_eq!(cfg.others[0].package, "etcd");
    }

    #[test]
    fn test_push_value_requires_schema() {
        let mut cfg = DeclarativeConfig::new();
        assert!(cfg.push_value(json!({"name": "etcd"})).is_err());
    }

    #[test]
    fn test_bad_known_record_fails() {
        let mut cfg = DeclarativeConfig::new();
        let err = cfg
            .push_value(json!({"schema": "olm.bundle", "name": 3}))
            .expect_err("bundle name must be a string");
        assert!(err.to_string().contains("olm.bundle"));
    }

    #[test]
    fn test_json_stream_and_yaml_documents_agree() {
        let json = r#"{"schema":"olm.package","name":"etcd","defaultChannel":"alpha"}
{"schema":"olm.channel","name":"alpha","package":"etcd","entries":[{"name":"etcd.v1"}]}"#;
        let yaml = "---\nschema: olm.package\nname: etcd\ndefaultChannel: alpha\n---\n\
                    schema: olm.channel\nname: alpha\npackage: etcd\nentries:\n  - name: etcd.v1\n";

        let from_json = DeclarativeConfig::from_json_stream(json).expect("json stream decodes");
        let from_yaml = DeclarativeConfig::from_yaml_documents(yaml).expect("yaml decodes");
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_encoded_streams_decode_again() {
        let json = r#"{"schema":"olm.package","name":"etcd","defaultChannel":"alpha"}
{"schema":"olm.channel","name":"alpha","package":"etcd","entries":[{"name":"etcd.v1"}]}"#;
        let cfg = DeclarativeConfig::from_json_stream(json).expect("json stream decodes");

        let as_json = cfg.to_json_stream().expect("encodes as json");
        let as_yaml = cfg.to_yaml_documents().expect("encodes as yaml");
        assert_eq!(DeclarativeConfig::from_json_stream(&as_json).expect("reparses"), cfg);
        assert_eq!(DeclarativeConfig::from_yaml_documents(&as_yaml).expect("reparses"), cfg);
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let yaml_path = temp.path().join("catalog.yaml");
        let json_path = temp.path().join("catalog.json");
        std::fs::write(&yaml_path, "schema: olm.package\nname: etcd\n").expect("write yaml");
        std::fs::write(&json_path, r#"{"schema":"olm.package","name":"prometheus"}"#)
            .expect("write json");

        let cfg = DeclarativeConfig::from_files(&[&yaml_path, &json_path]).expect("both load");
        let names: Vec<&str> = cfg.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["etcd", "prometheus"]);
        assert!(DeclarativeConfig::from_file(&temp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_to_values_skips_blobs() {
        let mut cfg = DeclarativeConfig::new();
        cfg.bundles.push(crate::declcfg::Bundle {
            schema: SCHEMA_BUNDLE.to_string(),
            name: "b".to_string(),
            package: "p".to_string(),
            csv_json: "{\"kind\":\"ClusterServiceVersion\"}".to_string(),
            ..Default::default()
        });
        let values = cfg.to_values().expect("records encode");
        assert!(values[0].get("csvJson").is_none());
        assert_eq!(values[0]["name"], "b");
    }
}
