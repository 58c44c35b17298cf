//! Field registry — maps a component id to the inputs it renders.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::WizardError;

/// Date format accepted by `Date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The fixed set of input kinds a page can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Password,
    Date,
    LongText,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Date => "date",
            Self::LongText => "long_text",
        };
        write!(f, "{s}")
    }
}

/// Render and validation contract for a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContract {
    /// Key under which the value is collected.
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldContract {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Check a collected value against this contract. A missing value is
    /// treated as empty.
    pub fn validate(&self, value: Option<&str>) -> Result<(), WizardError> {
        let value = value.unwrap_or("").trim();
        if value.is_empty() {
            if self.required {
                return Err(self.invalid(format!("{} is required", self.label)));
            }
            return Ok(());
        }
        if self.kind == FieldKind::Date && NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
            return Err(self.invalid(format!("expected a date as YYYY-MM-DD, got {value:?}")));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> WizardError {
        WizardError::InvalidField {
            field: self.name.clone(),
            reason,
        }
    }
}

/// The inputs one component contributes to a page, in render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentContract {
    pub component: String,
    pub fields: Vec<FieldContract>,
}

/// Lookup from component id to its [`ComponentContract`].
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    contracts: HashMap<String, ComponentContract>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the standard component catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(
            "email",
            vec![
                FieldContract::new("email", "Email", FieldKind::Text)
                    .required()
                    .with_placeholder("Your email"),
                FieldContract::new("password", "Password", FieldKind::Password)
                    .required()
                    .with_placeholder("Your password"),
            ],
        );
        registry.register(
            "birthdate",
            vec![FieldContract::new("birthdate", "Birthdate", FieldKind::Date)],
        );
        registry.register(
            "address",
            vec![
                FieldContract::new("address", "Address", FieldKind::Text)
                    .with_placeholder("Your address"),
            ],
        );
        registry.register(
            "aboutMe",
            vec![
                FieldContract::new("aboutMe", "About Me", FieldKind::LongText)
                    .with_placeholder("Tell us about yourself"),
            ],
        );
        registry
    }

    /// Register (or replace) the contract for a component.
    pub fn register(&mut self, component: &str, fields: Vec<FieldContract>) {
        self.contracts.insert(
            component.to_string(),
            ComponentContract {
                component: component.to_string(),
                fields,
            },
        );
    }

    pub fn get(&self, component: &str) -> Option<&ComponentContract> {
        self.contracts.get(component)
    }

    pub fn contains(&self, component: &str) -> bool {
        self.contracts.contains_key(component)
    }

    /// Resolve a page's components to their contracts, failing on the first
    /// component the registry does not know.
    pub fn resolve_page(
        &self,
        page: &str,
        components: &[String],
    ) -> Result<Vec<&ComponentContract>, WizardError> {
        components
            .iter()
            .map(|c| {
                self.get(c).ok_or_else(|| WizardError::UnknownComponent {
                    page: page.to_string(),
                    component: c.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_component_renders_email_and_password() {
        let registry = FieldRegistry::standard();
        let contract = registry.get("email").unwrap();
        let kinds: Vec<_> = contract
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.kind, f.required))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("email", FieldKind::Text, true),
                ("password", FieldKind::Password, true)
            ]
        );
    }

    #[test]
    fn standard_registry_covers_catalog() {
        let registry = FieldRegistry::standard();
        for definition in crate::graph::ComponentCatalog::standard().iter() {
            assert!(registry.contains(&definition.id), "{} missing", definition.id);
        }
        assert_eq!(
            registry.get("aboutMe").unwrap().fields[0].kind,
            FieldKind::LongText
        );
    }

    #[test]
    fn resolve_page_reports_unknown_component() {
        let registry = FieldRegistry::standard();
        let components = vec!["birthdate".to_string(), "favoriteColor".to_string()];
        let err = registry.resolve_page("page2", &components).unwrap_err();
        match err {
            WizardError::UnknownComponent { page, component } => {
                assert_eq!(page, "page2");
                assert_eq!(component, "favoriteColor");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn required_field_rejects_blank() {
        let field = FieldContract::new("email", "Email", FieldKind::Text).required();
        assert!(field.validate(None).is_err());
        assert!(field.validate(Some("   ")).is_err());
        assert!(field.validate(Some("a@b.com")).is_ok());
    }

    #[test]
    fn date_field_checks_format_only_when_present() {
        let field = FieldContract::new("birthdate", "Birthdate", FieldKind::Date);
        assert!(field.validate(None).is_ok());
        assert!(field.validate(Some("2000-01-01")).is_ok());
        assert!(field.validate(Some("01/01/2000")).is_err());
        assert!(field.validate(Some("2000-02-30")).is_err());
    }

    #[test]
    fn field_kind_display_matches_serde() {
        for kind in [
            FieldKind::Text,
            FieldKind::Password,
            FieldKind::Date,
            FieldKind::LongText,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(format!("\"{kind}\""), json);
        }
    }
}
