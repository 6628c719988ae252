//! Per-entity resource configuration.
//!
//! One `ResourceConfig` replaces a hand-written client per entity: it names
//! the resource path, the single field holding the record id, and the fields
//! the create/edit form works with.

use serde_json::{Number, Value};

use crate::error::ApiError;
use crate::types::Record;

/// How a form field is coerced from its text draft at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    /// Coerce a draft value. Numeric fields map blank input to `null`.
    pub fn coerce(&self, raw: &str) -> Result<Value, ApiError> {
        let trimmed = raw.trim();
        match self.kind {
            FieldKind::Text => Ok(Value::String(raw.to_string())),
            _ if trimmed.is_empty() => Ok(Value::Null),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| self.invalid("a whole number")),
            FieldKind::Decimal => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| self.invalid("a number")),
        }
    }

    /// Render a record value back into draft text.
    pub fn draft_text(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn invalid(&self, expected: &str) -> ApiError {
        ApiError::Validation(format!("`{}` must be {expected}", self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    path: String,
    id_field: String,
    fields: Vec<Field>,
    default_export_name: String,
    read_only: bool,
}

impl ResourceConfig {
    /// Start a configuration for the resource mounted at `path`.
    pub fn builder(path: &str) -> ResourceConfigBuilder {
        ResourceConfigBuilder {
            config: ResourceConfig {
                path: path.trim_matches('/').to_string(),
                id_field: "id".to_string(),
                fields: Vec::new(),
                default_export_name: "export.xlsx".to_string(),
                read_only: false,
            },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn default_export_name(&self) -> &str {
        &self.default_export_name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Fail with `Unsupported` when the resource cannot be written to.
    pub fn ensure_writable(&self, operation: &'static str) -> Result<(), ApiError> {
        if self.read_only {
            return Err(ApiError::Unsupported {
                resource: self.path.clone(),
                operation,
            });
        }
        Ok(())
    }

    /// Build a request payload from draft text.
    ///
    /// Required fields must be non-blank. Only declared fields are sent;
    /// draft keys the configuration does not know are ignored.
    pub fn payload<'a, I>(&self, draft: I) -> Result<Record, ApiError>
    where
        I: Fn(&str) -> Option<&'a str>,
    {
        let mut payload = Record::new();
        for field in &self.fields {
            let raw = draft(&field.name).unwrap_or_default();
            if field.required && raw.trim().is_empty() {
                return Err(ApiError::Validation(format!("`{}` is required", field.name)));
            }
            payload.insert(field.name.clone(), field.coerce(raw)?);
        }
        Ok(payload)
    }
}

pub struct ResourceConfigBuilder {
    config: ResourceConfig,
}

impl ResourceConfigBuilder {
    pub fn id_field(mut self, name: &str) -> Self {
        self.config.id_field = name.to_string();
        self
    }

    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.config.fields.push(Field {
            name: name.to_string(),
            kind,
            required: false,
        });
        self
    }

    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.config.fields.push(Field {
            name: name.to_string(),
            kind,
            required: true,
        });
        self
    }

    pub fn text(self, name: &str) -> Self {
        self.field(name, FieldKind::Text)
    }

    pub fn integer(self, name: &str) -> Self {
        self.field(name, FieldKind::Integer)
    }

    pub fn decimal(self, name: &str) -> Self {
        self.field(name, FieldKind::Decimal)
    }

    pub fn export_name(mut self, name: &str) -> Self {
        self.config.default_export_name = name.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.config.read_only = true;
        self
    }

    pub fn build(self) -> ResourceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use serde_json::json;

    fn metas() -> ResourceConfig {
        ResourceConfig::builder("/product15/")
            .required("nombre", FieldKind::Text)
            .integer("ano")
            .text("mes")
            .decimal("meta")
            .build()
    }

    #[test]
    fn builder_defaults() {
        let config = metas();
        assert_eq!(config.path(), "product15");
        assert_eq!(config.id_field(), "id");
        assert_eq!(config.default_export_name(), "export.xlsx");
        assert!(!config.is_read_only());
        assert_eq!(config.fields().len(), 4);
    }

    #[test]
    fn payload_coerces_numeric_fields() {
        let draft: HashMap<&str, &str> =
            [("nombre", "Meta Q1"), ("ano", " 2024 "), ("mes", "Enero"), ("meta", "1500.5")].into();
        let payload = metas().payload(|k| draft.get(k).copied()).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"nombre": "Meta Q1", "ano": 2024, "mes": "Enero", "meta": 1500.5})
        );
    }

    #[test]
    fn blank_numeric_fields_become_null() {
        let draft: HashMap<&str, &str> = [("nombre", "x"), ("ano", ""), ("meta", "  ")].into();
        let payload = metas().payload(|k| draft.get(k).copied()).unwrap();
        assert_eq!(payload["ano"], Value::Null);
        assert_eq!(payload["meta"], Value::Null);
        assert_eq!(payload["mes"], json!(""));
    }

    #[test]
    fn missing_required_field_is_a_local_error() {
        let draft: HashMap<&str, &str> = [("nombre", "  "), ("ano", "2024")].into();
        let err = metas().payload(|k| draft.get(k).copied()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "`nombre` is required"));
    }

    #[test]
    fn unparseable_number_is_a_local_error() {
        let draft: HashMap<&str, &str> = [("nombre", "x"), ("ano", "dos mil")].into();
        let err = metas().payload(|k| draft.get(k).copied()).unwrap_err();
        assert!(err.is_local());
        assert_eq!(err.to_string(), "`ano` must be a whole number");
    }

    #[test]
    fn draft_text_renders_scalars() {
        assert_eq!(Field::draft_text(None), "");
        assert_eq!(Field::draft_text(Some(&json!(null))), "");
        assert_eq!(Field::draft_text(Some(&json!(2024))), "2024");
        assert_eq!(Field::draft_text(Some(&json!(12.5))), "12.5");
        assert_eq!(Field::draft_text(Some(&json!("Enero"))), "Enero");
    }

    #[test]
    fn read_only_refuses_writes() {
        let config = ResourceConfig::builder("shopify/products").read_only().build();
        assert!(matches!(
            config.ensure_writable("create"),
            Err(ApiError::Unsupported { operation: "create", .. })
        ));
    }
}
