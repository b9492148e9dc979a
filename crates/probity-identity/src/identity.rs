//! ResourceIdentity - composing identities from titles and properties
//!
//! A title is either positional (its tokens fill the schema's fields left to
//! right) or opaque (a single free-form name the first field rejects, with
//! every field supplied by the properties). Fields not covered by title tokens come from the property
//! mapping; when both sources supply a field the title token wins.

use crate::error::IdentityError;
use crate::schema::{FieldSource, IdentitySchema};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// How the title string was interpreted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitlePattern {
    /// Tokens filling the leading identity fields
    Positional(Vec<String>),
    /// Free-form resource name; identity comes entirely from properties
    Opaque(String),
}

impl TitlePattern {
    /// Number of identity fields taken from the title
    #[inline]
    #[must_use]
    pub fn positional_len(&self) -> usize {
        match self {
            Self::Positional(tokens) => tokens.len(),
            Self::Opaque(_) => 0,
        }
    }
}

/// Fully resolved identity of one resource instance
///
/// Holds every canonical field of its schema, in canonical order and in
/// canonical (normalized) form. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    resource_type: String,
    fields: Vec<(String, String)>,
    pattern: TitlePattern,
}

impl ResourceIdentity {
    /// Resolve an identity from a title and a property source
    ///
    /// # Errors
    /// - [`IdentityError::TooManyTokens`] if the title has more tokens than
    ///   the schema has fields
    /// - [`IdentityError::MissingField`] if a field is in neither source
    /// - [`IdentityError::InvalidValue`] if a value fails its field kind
    pub fn compose<S>(schema: &IdentitySchema, title: &str, properties: &S) -> Result<Self, IdentityError>
    where
        S: FieldSource + ?Sized,
    {
        let tokens: Vec<&str> = title.split_whitespace().collect();
        if tokens.len() > schema.len() {
            return Err(IdentityError::TooManyTokens {
                resource_type: schema.resource_type().to_string(),
                tokens: tokens.len(),
                fields: schema.len(),
            });
        }

        // Only a lone token the first field rejects can be a free-form name.
        // Multi-token titles are always positional, so a bad token surfaces
        // as InvalidValue instead of being dropped.
        if let ([name], Some(first)) = (tokens.as_slice(), schema.fields().first()) {
            if !first.kind.accepts(name) {
                return Self::compose_opaque(schema, name, properties);
            }
        }

        let mut fields = Vec::with_capacity(schema.len());
        for (i, spec) in schema.fields().iter().enumerate() {
            let from_props = properties
                .field_value(&spec.name)
                .map(|v| spec.kind.normalize(&spec.name, v))
                .transpose()?;

            let value = match tokens.get(i) {
                Some(token) => {
                    let value = spec.kind.normalize(&spec.name, token)?;
                    if let Some(prop) = from_props.filter(|p| *p != value) {
                        tracing::debug!(
                            "{}: title value '{}' overrides property {} => '{}'",
                            schema.resource_type(),
                            value,
                            spec.name,
                            prop
                        );
                    }
                    value
                }
                None => from_props.ok_or_else(|| IdentityError::MissingField {
                    resource_type: schema.resource_type().to_string(),
                    field: spec.name.clone(),
                })?,
            };
            fields.push((spec.name.clone(), value));
        }

        let identity = Self {
            resource_type: schema.resource_type().to_string(),
            fields,
            pattern: TitlePattern::Positional(tokens.into_iter().map(str::to_string).collect()),
        };
        tracing::debug!("composed identity: {}", identity);
        Ok(identity)
    }

    /// Single-token title rejected by the first field: every field must come
    /// from properties, otherwise the rejected token is reported.
    fn compose_opaque<S>(schema: &IdentitySchema, name: &str, properties: &S) -> Result<Self, IdentityError>
    where
        S: FieldSource + ?Sized,
    {
        let mut fields = Vec::with_capacity(schema.len());
        for spec in schema.fields() {
            match properties.field_value(&spec.name) {
                Some(v) => fields.push((spec.name.clone(), spec.kind.normalize(&spec.name, v)?)),
                None => {
                    let first = &schema.fields()[0];
                    return Err(first.kind.normalize(&first.name, name).err().unwrap_or_else(|| {
                        IdentityError::MissingField {
                            resource_type: schema.resource_type().to_string(),
                            field: spec.name.clone(),
                        }
                    }));
                }
            }
        }

        let identity = Self {
            resource_type: schema.resource_type().to_string(),
            fields,
            pattern: TitlePattern::Opaque(name.to_string()),
        };
        tracing::debug!("composed identity from opaque title '{}': {}", name, identity);
        Ok(identity)
    }

    /// Parse a fully-qualified title (one token per field)
    ///
    /// # Errors
    /// Returns [`IdentityError`] if the token count differs from the field
    /// count or a token fails its field kind.
    pub fn parse_title(schema: &IdentitySchema, title: &str) -> Result<Self, IdentityError> {
        let tokens = title.split_whitespace().count();
        if tokens < schema.len() {
            let field = &schema.fields()[tokens];
            return Err(IdentityError::MissingField {
                resource_type: schema.resource_type().to_string(),
                field: field.name.clone(),
            });
        }
        let none: [(&str, &str); 0] = [];
        Self::compose(schema, title, &none)
    }

    /// Resource type name
    #[inline]
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Value of a canonical field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// `(name, value)` pairs in canonical order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field values in canonical order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// How the title was read
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &TitlePattern {
        &self.pattern
    }

    /// Fully-qualified title: every field value, space separated
    #[must_use]
    pub fn render(&self) -> String {
        self.values().collect::<Vec<_>>().join(" ")
    }

    /// Title to declare the resource with in a manifest
    ///
    /// Opaque names are kept as written; positional titles are expanded to
    /// the fully-qualified form.
    #[must_use]
    pub fn manifest_title(&self) -> String {
        match &self.pattern {
            TitlePattern::Opaque(name) => name.clone(),
            TitlePattern::Positional(_) => self.render(),
        }
    }
}

impl Display for ResourceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.resource_type, self.render())
    }
}

/// Compose an identity; see [`ResourceIdentity::compose`]
///
/// # Errors
/// Propagates [`IdentityError`] from composition.
pub fn compose<S>(schema: &IdentitySchema, title: &str, properties: &S) -> Result<ResourceIdentity, IdentityError>
where
    S: FieldSource + ?Sized,
{
    ResourceIdentity::compose(schema, title, properties)
}

/// Fully-qualified title of an identity; see [`ResourceIdentity::render`]
#[inline]
#[must_use]
pub fn render(identity: &ResourceIdentity) -> String {
    identity.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use pretty_assertions::assert_eq;

    fn pim() -> IdentitySchema {
        IdentitySchema::pim_grouplist()
    }

    #[test]
    fn two_token_title_takes_rest_from_properties() {
        let props = [("rp_addr", "44.44.44.44"), ("group", "226.0.0.0/8")];
        let id = compose(&pim(), "ipv4 red", &props).unwrap();

        assert_eq!(id.get("afi"), Some("ipv4"));
        assert_eq!(id.get("vrf"), Some("red"));
        assert_eq!(id.get("rp_addr"), Some("44.44.44.44"));
        assert_eq!(id.get("group"), Some("226.0.0.0/8"));
        assert_eq!(render(&id), "ipv4 red 44.44.44.44 226.0.0.0/8");
    }

    #[test]
    fn single_token_title() {
        let props = [("vrf", "red"), ("rp_addr", "33.33.33.33"), ("group", "225.0.0.0/8")];
        let id = compose(&pim(), "ipv4", &props).unwrap();

        assert_eq!(id.render(), "ipv4 red 33.33.33.33 225.0.0.0/8");
        assert_eq!(id.pattern().positional_len(), 1);
    }

    #[test]
    fn full_title_needs_no_properties() {
        let none: [(&str, &str); 0] = [];
        let id = compose(&pim(), "ipv4 default 55.55.55.55 227.0.0.0/8", &none).unwrap();

        assert_eq!(id.render(), "ipv4 default 55.55.55.55 227.0.0.0/8");
        assert_eq!(id.manifest_title(), id.render());
    }

    #[test]
    fn opaque_title_with_full_properties() {
        let props = [
            ("afi", "ipv4"),
            ("vrf", "red"),
            ("rp_addr", "22.22.22.22"),
            ("group", "224.0.0.0/8"),
        ];
        let id = compose(&pim(), "newyork", &props).unwrap();

        assert_eq!(id.pattern(), &TitlePattern::Opaque("newyork".into()));
        assert_eq!(id.render(), "ipv4 red 22.22.22.22 224.0.0.0/8");
        assert_eq!(id.manifest_title(), "newyork");
    }

    #[test]
    fn opaque_title_missing_property_reports_bad_token() {
        let props = [("vrf", "red")];
        let err = compose(&pim(), "newyork", &props).unwrap_err();

        assert_eq!(err.field(), Some("afi"));
        assert!(matches!(err, IdentityError::InvalidValue { ref value, .. } if value == "newyork"));
    }

    #[test]
    fn multi_token_title_with_bad_token_is_invalid() {
        let props = [
            ("afi", "ipv4"),
            ("vrf", "blue"),
            ("rp_addr", "2.2.2.2"),
            ("group", "224.0.0.0/8"),
        ];

        let err = compose(&pim(), "ipv4 red 1.1.1.1 224.0.0.0/33", &props).unwrap_err();
        assert_eq!(err.field(), Some("group"));

        let err = compose(&pim(), "ipv44 red", &props).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidValue { ref value, .. } if value == "ipv44"));
    }

    #[test]
    fn valid_multi_token_title_beats_full_properties() {
        let props = [
            ("afi", "ipv4"),
            ("vrf", "blue"),
            ("rp_addr", "2.2.2.2"),
            ("group", "224.0.0.0/8"),
        ];
        let id = compose(&pim(), "ipv4 red", &props).unwrap();

        assert_eq!(id.render(), "ipv4 red 2.2.2.2 224.0.0.0/8");
        assert_eq!(id.manifest_title(), id.render());
    }

    #[test]
    fn title_overrides_conflicting_property() {
        let props = [("vrf", "blue"), ("rp_addr", "1.1.1.1"), ("group", "224.0.0.0/4")];
        let id = compose(&pim(), "ipv4 red", &props).unwrap();

        assert_eq!(id.get("vrf"), Some("red"));
    }

    #[test]
    fn too_many_tokens() {
        let none: [(&str, &str); 0] = [];
        let err = compose(&IdentitySchema::bgp(), "2 default extra", &none).unwrap_err();

        assert_eq!(
            err,
            IdentityError::TooManyTokens {
                resource_type: "cisco_bgp".into(),
                tokens: 3,
                fields: 2,
            }
        );
    }

    #[test]
    fn missing_field_is_named() {
        let props = [("rp_addr", "1.1.1.1")];
        let err = compose(&pim(), "ipv4 red", &props).unwrap_err();

        assert_eq!(
            err,
            IdentityError::MissingField {
                resource_type: "cisco_pim_grouplist".into(),
                field: "group".into(),
            }
        );
        assert!(err.to_string().contains("'group'"));
    }

    #[test]
    fn asdot_title_normalizes() {
        let none: [(&str, &str); 0] = [];
        let id = compose(&IdentitySchema::bgp(), "1.1 blue", &none).unwrap();

        assert_eq!(id.render(), "65537 blue");
    }

    #[test]
    fn asdot_property_matching_asplain_title_is_not_a_conflict() {
        let props = [("asn", "1.1"), ("vrf", "blue")];
        let id = compose(&IdentitySchema::bgp(), "65537", &props).unwrap();

        assert_eq!(id.render(), "65537 blue");
    }

    #[test]
    fn empty_title_uses_properties_only() {
        let props = [("asn", "2"), ("vrf", "default")];
        let id = compose(&IdentitySchema::bgp(), "   ", &props).unwrap();

        assert_eq!(id.render(), "2 default");
        assert_eq!(id.pattern().positional_len(), 0);
    }

    #[test]
    fn parse_title_requires_every_field() {
        let schema = IdentitySchema::bgp();
        assert_eq!(ResourceIdentity::parse_title(&schema, "2 default").unwrap().render(), "2 default");
        assert!(matches!(
            ResourceIdentity::parse_title(&schema, "2"),
            Err(IdentityError::MissingField { ref field, .. }) if field == "vrf"
        ));
    }

    #[test]
    fn display_includes_type() {
        let schema = IdentitySchema::new("thing").field("name", FieldKind::Text);
        let id = ResourceIdentity::parse_title(&schema, "alpha").unwrap();

        assert_eq!(id.to_string(), "thing 'alpha'");
    }
}
