//! Identity schemas
//!
//! An [`IdentitySchema`] names a resource type and the canonical, ordered
//! list of fields that together identify one instance of it. Title tokens
//! are matched against these fields left to right.

use crate::error::IdentityError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

/// Value class of an identity field
///
/// The kind decides whether a title token can occupy the field and how the
/// value is written in its canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Any single token without whitespace
    #[default]
    Text,
    /// Address family: `ipv4` or `ipv6`
    Afi,
    /// IPv4 or IPv6 host address
    IpAddr,
    /// Address prefix in `address/length` form
    IpPrefix,
    /// BGP AS number, asplain or asdot
    Asn,
}

impl FieldKind {
    /// Check a value and return its canonical form
    ///
    /// # Errors
    /// Returns [`IdentityError::InvalidValue`] when the value does not belong
    /// to this kind.
    pub fn normalize(self, field: &str, value: &str) -> Result<String, IdentityError> {
        if value.is_empty() {
            return Err(IdentityError::invalid_value(field, value, "empty value"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(IdentityError::invalid_value(field, value, "contains whitespace"));
        }

        match self {
            Self::Text => Ok(value.to_string()),
            Self::Afi => match value {
                "ipv4" | "ipv6" => Ok(value.to_string()),
                _ => Err(IdentityError::invalid_value(field, value, "expected ipv4 or ipv6")),
            },
            Self::IpAddr => value
                .parse::<IpAddr>()
                .map(|addr| addr.to_string())
                .map_err(|e| IdentityError::invalid_value(field, value, e.to_string())),
            Self::IpPrefix => normalize_prefix(field, value),
            Self::Asn => normalize_asn(field, value),
        }
    }

    /// Whether a value belongs to this kind
    #[inline]
    #[must_use]
    pub fn accepts(self, value: &str) -> bool {
        self.normalize("", value).is_ok()
    }
}

fn normalize_prefix(field: &str, value: &str) -> Result<String, IdentityError> {
    let (addr, len) = value
        .split_once('/')
        .ok_or_else(|| IdentityError::invalid_value(field, value, "expected address/length"))?;

    let addr: IpAddr = addr
        .parse()
        .map_err(|e: std::net::AddrParseError| IdentityError::invalid_value(field, value, e.to_string()))?;
    let len: u8 = len
        .parse()
        .map_err(|_| IdentityError::invalid_value(field, value, "prefix length is not a number"))?;

    let max = if addr.is_ipv4() { 32 } else { 128 };
    if len > max {
        return Err(IdentityError::invalid_value(
            field,
            value,
            format!("prefix length exceeds {max}"),
        ));
    }

    Ok(format!("{addr}/{len}"))
}

/// Asdot `high.low` becomes asplain `high * 65536 + low`.
fn normalize_asn(field: &str, value: &str) -> Result<String, IdentityError> {
    let asn = match value.split_once('.') {
        Some((high, low)) => {
            let high: u16 = high
                .parse()
                .map_err(|_| IdentityError::invalid_value(field, value, "asdot high part out of range"))?;
            let low: u16 = low
                .parse()
                .map_err(|_| IdentityError::invalid_value(field, value, "asdot low part out of range"))?;
            u32::from(high) * 65_536 + u32::from(low)
        }
        None => value
            .parse::<u32>()
            .map_err(|_| IdentityError::invalid_value(field, value, "not an AS number"))?,
    };

    if asn == 0 {
        return Err(IdentityError::invalid_value(field, value, "AS number 0 is reserved"));
    }
    Ok(asn.to_string())
}

/// One canonical identity field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in properties and manifests
    pub name: String,
    /// Value class
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create field spec
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Resource type plus its ordered identity fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySchema {
    resource_type: String,
    fields: Vec<FieldSpec>,
}

impl IdentitySchema {
    /// Create schema with no fields
    #[inline]
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field in canonical order
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec::new(name, kind));
        self
    }

    /// `cisco_pim_grouplist`: `afi vrf rp_addr group`
    #[must_use]
    pub fn pim_grouplist() -> Self {
        Self::new("cisco_pim_grouplist")
            .field("afi", FieldKind::Afi)
            .field("vrf", FieldKind::Text)
            .field("rp_addr", FieldKind::IpAddr)
            .field("group", FieldKind::IpPrefix)
    }

    /// `cisco_bgp`: `asn vrf`
    #[must_use]
    pub fn bgp() -> Self {
        Self::new("cisco_bgp")
            .field("asn", FieldKind::Asn)
            .field("vrf", FieldKind::Text)
    }

    /// Resource type name
    #[inline]
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Canonical fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of canonical fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Lookup of schemas by resource type
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: BTreeMap<String, IdentitySchema>,
}

impl SchemaCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in schemas
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(IdentitySchema::pim_grouplist());
        catalog.register(IdentitySchema::bgp());
        catalog
    }

    /// Register (or replace) a schema
    pub fn register(&mut self, schema: IdentitySchema) {
        self.schemas.insert(schema.resource_type.clone(), schema);
    }

    /// Schema for a resource type
    ///
    /// # Errors
    /// Returns [`IdentityError::UnknownResourceType`] if none is registered.
    pub fn get(&self, resource_type: &str) -> Result<&IdentitySchema, IdentityError> {
        self.schemas
            .get(resource_type)
            .ok_or_else(|| IdentityError::UnknownResourceType(resource_type.to_string()))
    }

    /// Registered resource types, sorted
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

/// Source of identity field values outside the title
///
/// Implemented for the common map types; property containers in other
/// crates implement it to feed [`crate::compose`].
pub trait FieldSource {
    /// Value for a field, if supplied
    fn field_value(&self, name: &str) -> Option<&str>;
}

impl FieldSource for HashMap<String, String> {
    fn field_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for [(&str, &str)] {
    fn field_value(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> FieldSource for [(&str, &str); N] {
    fn field_value(&self, name: &str) -> Option<&str> {
        self.as_slice().field_value(name)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field_value(&self, name: &str) -> Option<&str> {
        (**self).field_value(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asn_asdot_converts_to_asplain() {
        assert_eq!(FieldKind::Asn.normalize("asn", "1.1").unwrap(), "65537");
        assert_eq!(FieldKind::Asn.normalize("asn", "55.77").unwrap(), "3604557");
        assert_eq!(FieldKind::Asn.normalize("asn", "2").unwrap(), "2");
    }

    #[test]
    fn asn_rejects_garbage() {
        assert!(!FieldKind::Asn.accepts("raleigh"));
        assert!(!FieldKind::Asn.accepts("0"));
        assert!(!FieldKind::Asn.accepts("70000.1"));
    }

    #[test]
    fn asn_zero_is_reserved_in_both_notations() {
        assert!(!FieldKind::Asn.accepts("0"));
        assert!(!FieldKind::Asn.accepts("0.0"));
        assert_eq!(FieldKind::Asn.normalize("asn", "0.1").unwrap(), "1");
    }

    #[test]
    fn afi_accepts_only_known_families() {
        assert!(FieldKind::Afi.accepts("ipv4"));
        assert!(FieldKind::Afi.accepts("ipv6"));
        assert!(!FieldKind::Afi.accepts("newyork"));
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(
            FieldKind::IpPrefix.normalize("group", "224.0.0.0/8").unwrap(),
            "224.0.0.0/8"
        );
        assert!(!FieldKind::IpPrefix.accepts("224.0.0.0/33"));
        assert!(!FieldKind::IpPrefix.accepts("224.0.0.0"));
        assert!(FieldKind::IpPrefix.accepts("ff00::/8"));
    }

    #[test]
    fn text_rejects_whitespace_and_empty() {
        assert!(FieldKind::Text.accepts("red"));
        assert!(!FieldKind::Text.accepts(""));
        assert!(!FieldKind::Text.accepts("two words"));
    }

    #[test]
    fn catalog_lookup() {
        let catalog = SchemaCatalog::builtin();
        assert_eq!(catalog.get("cisco_bgp").unwrap().len(), 2);
        assert_eq!(catalog.get("cisco_pim_grouplist").unwrap().len(), 4);
        assert_eq!(
            catalog.resource_types().collect::<Vec<_>>(),
            ["cisco_bgp", "cisco_pim_grouplist"]
        );
        assert!(matches!(
            catalog.get("cisco_nope"),
            Err(IdentityError::UnknownResourceType(t)) if t == "cisco_nope"
        ));
    }

    #[test]
    fn slice_field_source() {
        let props = [("vrf", "red"), ("afi", "ipv4")];
        assert_eq!(props.field_value("vrf"), Some("red"));
        assert_eq!(props.field_value("group"), None);
    }
}
