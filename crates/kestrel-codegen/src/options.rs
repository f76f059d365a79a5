//! Emission options
//!
//! Runtime names used in emitted code, naming policy and worker count. Every
//! field has a default so a partial `[emit]` table in `kestrel.toml` is valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::QualifiedName;
use crate::symbols::NameStyle;

/// Invalid option values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Option '{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("Option '{field}' is not a valid identifier path: {value}")]
    InvalidIdentifier { field: &'static str, value: String },
}

/// Options controlling emitted code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Output identifier style
    pub name_style: NameStyle,
    /// Module provide declaration
    pub provide_fn: String,
    /// Module require declaration
    pub require_fn: String,
    /// Prototype inheritance linkage
    pub inherits_fn: String,
    /// Rename-protection export
    pub export_symbol_fn: String,
    /// Instance method receiving the encoded declarative root
    pub graph_builder: String,
    /// Prefix of the `_CLASS_INFO` / `_REFLECTION_INFO` members
    pub metadata_prefix: String,
    /// Class whose `createUpdateEvent` builds change notifications
    pub change_event_class: QualifiedName,
    /// Language helper class used for checked casts
    pub language_helper: QualifiedName,
    /// Mangle private member names with the owner's qualified name
    pub allow_private_name_conflicts: bool,
    /// Include private and synthesized members in reflection data
    pub reflect_private: bool,
    /// Emit an export statement for reflectable classes
    pub export_reflectable: bool,
    /// Emit the file-overview header comment
    pub emit_file_overview: bool,
    /// Worker threads for per-class codegen (0 = one per CPU)
    pub jobs: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            name_style: NameStyle::Dotted,
            provide_fn: "goog.provide".to_string(),
            require_fn: "goog.require".to_string(),
            inherits_fn: "goog.inherits".to_string(),
            export_symbol_fn: "goog.exportSymbol".to_string(),
            graph_builder: "generateMXMLAttributes".to_string(),
            metadata_prefix: "ROYALE".to_string(),
            change_event_class: QualifiedName::new("org.apache.royale.events.ValueChangeEvent"),
            language_helper: QualifiedName::new("org.apache.royale.utils.Language"),
            allow_private_name_conflicts: false,
            reflect_private: false,
            export_reflectable: true,
            emit_file_overview: true,
            jobs: 0,
        }
    }
}

impl EmitOptions {
    /// Set the output naming style
    pub fn with_name_style(mut self, style: NameStyle) -> Self {
        self.name_style = style;
        self
    }

    /// Set the worker count
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.jobs
        }
    }

    /// Name of the class-info member (`ROYALE_CLASS_INFO`)
    pub fn class_info_member(&self) -> String {
        format!("{}_CLASS_INFO", self.metadata_prefix)
    }

    /// Name of the reflection member (`ROYALE_REFLECTION_INFO`)
    pub fn reflection_member(&self) -> String {
        format!("{}_REFLECTION_INFO", self.metadata_prefix)
    }

    /// Check that every runtime name is a usable identifier path
    pub fn validate(&self) -> Result<(), OptionsError> {
        let paths: [(&'static str, &str); 8] = [
            ("provide_fn", &self.provide_fn),
            ("require_fn", &self.require_fn),
            ("inherits_fn", &self.inherits_fn),
            ("export_symbol_fn", &self.export_symbol_fn),
            ("graph_builder", &self.graph_builder),
            ("metadata_prefix", &self.metadata_prefix),
            ("change_event_class", self.change_event_class.as_str()),
            ("language_helper", self.language_helper.as_str()),
        ];
        for (field, value) in paths {
            if value.is_empty() {
                return Err(OptionsError::Empty { field });
            }
            if !is_identifier_path(value) {
                return Err(OptionsError::InvalidIdentifier {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn is_identifier_path(value: &str) -> bool {
    value.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = EmitOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.class_info_member(), "ROYALE_CLASS_INFO");
        assert!(options.worker_count() >= 1);
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let options: EmitOptions =
            serde_json::from_str(r#"{"name_style": "flattened", "jobs": 2}"#).unwrap();
        assert_eq!(options.name_style, NameStyle::Flattened);
        assert_eq!(options.worker_count(), 2);
        assert_eq!(options.provide_fn, "goog.provide");
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let options = EmitOptions {
            graph_builder: "generate attributes".to_string(),
            ..EmitOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::InvalidIdentifier {
                field: "graph_builder",
                value: "generate attributes".to_string()
            })
        );

        let options = EmitOptions {
            require_fn: String::new(),
            ..EmitOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::Empty {
                field: "require_fn"
            })
        );
    }
}
