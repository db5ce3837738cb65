//! Native type mapping.
//!
//! Each dialect owns a [`TypeRegistry`] that maps generic [`TypeCode`]s to
//! native type templates. A template may contain the placeholders `$l`
//! (length), `$p` (precision) and `$s` (scale), and may be restricted to a
//! range of lengths so that vendors can switch types at a break point:
//!
//! ```
//! use oxide_db::schema::{Column, TypeCode};
//! use oxide_db::types::TypeRegistry;
//!
//! let registry = TypeRegistry::builder("example")
//!     .ranged(TypeCode::Varchar, "varchar($l)", 0, 4000)
//!     .ranged(TypeCode::Varchar, "clob", 4001, u32::MAX)
//!     .build_partial().unwrap();
//!
//! let short = Column::new("a", TypeCode::Varchar).length(100);
//! let long = Column::new("b", TypeCode::Varchar).length(10_000);
//! assert_eq!(registry.resolve(&short).unwrap(), "varchar(100)");
//! assert_eq!(registry.resolve(&long).unwrap(), "clob");
//! ```
//!
//! Registration order matters: the first entry whose range contains the
//! column's length wins.

use std::collections::HashMap;

use crate::error::{DbError, Result};
use crate::schema::{Column, TypeCode};

/// One registered native type template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Generic type code this entry renders.
    pub type_code: TypeCode,
    /// Native template, possibly containing `$l`, `$p`, `$s`.
    pub template: String,
    /// Smallest length this entry accepts.
    pub min: Option<u32>,
    /// Largest length this entry accepts.
    pub max: Option<u32>,
    /// Type code the rendered native type reads back as.
    pub canonical: Option<TypeCode>,
}

impl TypeEntry {
    /// Returns the type code the rendered native type classifies as.
    #[must_use]
    pub fn canonical_type(&self) -> TypeCode {
        self.canonical.unwrap_or(self.type_code)
    }

    /// Returns whether the given length falls into this entry's range.
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    fn bounds(&self) -> (u32, u32) {
        (self.min.unwrap_or(0), self.max.unwrap_or(u32::MAX))
    }

    fn overlaps(&self, other: &Self) -> bool {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        a_min <= b_max && b_min <= a_max
    }

    /// Substitutes the placeholders. Unset values render as the empty
    /// string.
    #[must_use]
    pub fn render(&self, length: Option<u32>, precision: Option<u32>, scale: Option<u32>) -> String {
        let text = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_default();
        self.template
            .replace("$l", &text(length))
            .replace("$p", &text(precision))
            .replace("$s", &text(scale))
    }

    /// Returns the normalised native name of this template.
    #[must_use]
    pub fn base_name(&self) -> String {
        NativeType::parse(&self.template).base
    }
}

/// Builder for a [`TypeRegistry`].
#[derive(Debug, Clone)]
pub struct TypeRegistryBuilder {
    dialect: String,
    entries: Vec<TypeEntry>,
    aliases: Vec<(String, TypeCode)>,
}

impl TypeRegistryBuilder {
    /// Registers a template with optional length bounds and canonical
    /// type.
    #[must_use]
    pub fn register(
        mut self,
        type_code: TypeCode,
        template: impl Into<String>,
        min: Option<u32>,
        max: Option<u32>,
        canonical: Option<TypeCode>,
    ) -> Self {
        self.entries.push(TypeEntry {
            type_code,
            template: template.into(),
            min,
            max,
            canonical,
        });
        self
    }

    /// Registers an unbounded template.
    #[must_use]
    pub fn add(self, type_code: TypeCode, template: impl Into<String>) -> Self {
        self.register(type_code, template, None, None, None)
    }

    /// Registers a template for lengths within `min..=max`.
    #[must_use]
    pub fn ranged(self, type_code: TypeCode, template: impl Into<String>, min: u32, max: u32) -> Self {
        self.register(type_code, template, Some(min), Some(max), None)
    }

    /// Registers a template whose native type reads back as `canonical`.
    #[must_use]
    pub fn canonical(
        self,
        type_code: TypeCode,
        template: impl Into<String>,
        canonical: TypeCode,
    ) -> Self {
        self.register(type_code, template, None, None, Some(canonical))
    }

    /// Registers an alternative native spelling used when reading live
    /// metadata.
    #[must_use]
    pub fn alias(mut self, native: impl Into<String>, type_code: TypeCode) -> Self {
        self.aliases.push((native.into(), type_code));
        self
    }

    /// Validates the registrations and builds the registry.
    ///
    /// Every type code except [`TypeCode::Special`] must be mapped,
    /// entries for one code must not overlap, and aliases and canonical
    /// names must be unique.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first violation.
    pub fn build(self) -> Result<TypeRegistry> {
        for code in TypeCode::ALL {
            if code != TypeCode::Special && !self.entries.iter().any(|e| e.type_code == code) {
                return Err(DbError::Configuration(format!(
                    "{} type registry has no mapping for {code}",
                    self.dialect
                )));
            }
        }
        self.validate()
    }

    /// Builds a registry that may leave type codes unmapped.
    ///
    /// Ranges, aliases and canonical names are still validated. Intended
    /// for small ad-hoc registries.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first violation.
    pub fn build_partial(self) -> Result<TypeRegistry> {
        self.validate()
    }

    fn validate(self) -> Result<TypeRegistry> {
        let duplicate = |name: &str| DbError::DuplicateRegistration {
            dialect: self.dialect.clone(),
            name: name.to_string(),
        };

        for (i, entry) in self.entries.iter().enumerate() {
            let overlapping = self.entries[..i]
                .iter()
                .any(|prior| prior.type_code == entry.type_code && prior.overlaps(entry));
            if overlapping {
                return Err(duplicate(entry.type_code.name()));
            }
        }

        // (type code, set explicitly through a canonical registration)
        let mut names: HashMap<String, (TypeCode, bool)> = HashMap::new();
        for entry in &self.entries {
            let base = entry.base_name();
            match (names.get(&base).copied(), entry.canonical) {
                (Some((existing, true)), Some(canonical)) if existing != canonical => {
                    return Err(duplicate(&base));
                }
                (Some((_, true)), _) => {}
                (_, Some(canonical)) => {
                    names.insert(base, (canonical, true));
                }
                (None, None) => {
                    names.insert(base, (entry.type_code, false));
                }
                (Some(_), None) => {}
            }
        }

        let mut aliases = HashMap::new();
        for (native, code) in &self.aliases {
            let key = NativeType::parse(native).base;
            if names.contains_key(&key) || aliases.insert(key, *code).is_some() {
                return Err(duplicate(native));
            }
        }

        let mut lookup: HashMap<String, TypeCode> =
            names.into_iter().map(|(k, (code, _))| (k, code)).collect();
        lookup.extend(aliases);

        Ok(TypeRegistry {
            dialect: self.dialect,
            entries: self.entries,
            names: lookup,
        })
    }
}

/// Maps generic type codes to native types and back.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    dialect: String,
    entries: Vec<TypeEntry>,
    names: HashMap<String, TypeCode>,
}

impl TypeRegistry {
    /// Starts a registry for the named dialect.
    #[must_use]
    pub fn builder(dialect: impl Into<String>) -> TypeRegistryBuilder {
        TypeRegistryBuilder {
            dialect: dialect.into(),
            entries: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Returns every entry in registration order.
    #[must_use]
    pub fn entries(&self) -> &[TypeEntry] {
        &self.entries
    }

    /// Renders the native type of a column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when no entry covers the
    /// column's type and length.
    pub fn resolve(&self, column: &Column) -> Result<String> {
        if column.type_code == TypeCode::Special {
            return column.native_type.clone().ok_or_else(|| DbError::UnmappedType {
                dialect: self.dialect.clone(),
                type_code: TypeCode::Special,
                length: None,
            });
        }
        self.resolve_type(column.type_code, column.length, column.precision, column.scale)
    }

    /// Renders a native type from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when no entry matches.
    pub fn resolve_type(
        &self,
        type_code: TypeCode,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Result<String> {
        let key = length.or(precision);
        self.entries
            .iter()
            .filter(|e| e.type_code == type_code)
            .find(|e| key.is_none_or(|k| e.contains(k)))
            .map(|e| e.render(length, precision, scale))
            .ok_or_else(|| DbError::UnmappedType {
                dialect: self.dialect.clone(),
                type_code,
                length: key,
            })
    }

    /// Classifies a native type name read from a live database.
    #[must_use]
    pub fn classify(&self, native: &str) -> Option<TypeCode> {
        self.names.get(&NativeType::parse(native).base).copied()
    }
}

/// A native type split into its base name and numeric arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Lower-case name with the argument list removed.
    pub base: String,
    /// Numeric arguments, in order. Non-numeric arguments are skipped.
    pub args: Vec<u32>,
}

impl NativeType {
    /// Parses a native type such as `numeric(10, 2)` or
    /// `varchar(20) for bit data`.
    #[must_use]
    pub fn parse(native: &str) -> Self {
        let lower = native.trim().to_ascii_lowercase();
        let (base, args) = match (lower.find('('), lower.rfind(')')) {
            (Some(open), Some(close)) if close > open => {
                let args = lower[open + 1..close]
                    .split(',')
                    .filter_map(|a| a.trim().parse::<u32>().ok())
                    .collect();
                (format!("{} {}", &lower[..open], &lower[close + 1..]), args)
            }
            _ => (lower, Vec::new()),
        };
        Self {
            base: base.split_whitespace().collect::<Vec<_>>().join(" "),
            args,
        }
    }

    /// Returns whether both types share a base name.
    #[must_use]
    pub fn same_base(&self, other: &Self) -> bool {
        self.base == other.base
    }

    /// Returns whether `other` only widens this type: same base, same
    /// number of arguments and none of them smaller.
    #[must_use]
    pub fn is_widened_by(&self, other: &Self) -> bool {
        self.same_base(other)
            && self.args.len() == other.args.len()
            && self.args.iter().zip(&other.args).all(|(old, new)| new >= old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistryBuilder {
        TypeRegistry::builder("test")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::Decimal, "numeric($p,$s)")
            .ranged(TypeCode::Char, "char($l)", 1, 254)
            .register(TypeCode::Char, "clob", Some(255), None, Some(TypeCode::Clob))
            .add(TypeCode::Clob, "clob")
    }

    #[test]
    fn test_resolve_first_matching_range() {
        let types = registry().build_partial().unwrap();
        let small = Column::new("c", TypeCode::Char).length(10);
        let large = Column::new("c", TypeCode::Char).length(1000);
        assert_eq!(types.resolve(&small).unwrap(), "char(10)");
        assert_eq!(types.resolve(&large).unwrap(), "clob");
    }

    #[test]
    fn test_resolve_substitutes_precision_and_scale() {
        let types = registry().build_partial().unwrap();
        let amount = Column::new("amount", TypeCode::Decimal).precision(12, 2);
        assert_eq!(types.resolve(&amount).unwrap(), "numeric(12,2)");

        let bare = Column::new("amount", TypeCode::Decimal);
        assert_eq!(types.resolve(&bare).unwrap(), "numeric(,)");
    }

    #[test]
    fn test_resolve_out_of_range() {
        let types = TypeRegistry::builder("test")
            .ranged(TypeCode::Char, "char($l)", 1, 254)
            .build_partial().unwrap();
        let column = Column::new("c", TypeCode::Char).length(300);
        assert!(matches!(
            types.resolve(&column),
            Err(DbError::UnmappedType { length: Some(300), .. })
        ));
    }

    #[test]
    fn test_resolve_unregistered_type() {
        let types = registry().build_partial().unwrap();
        let column = Column::new("b", TypeCode::Blob);
        assert!(matches!(
            types.resolve(&column),
            Err(DbError::UnmappedType { type_code: TypeCode::Blob, .. })
        ));
    }

    #[test]
    fn test_special_uses_native_type() {
        let types = registry().build_partial().unwrap();
        assert_eq!(types.resolve(&Column::special("doc", "jsonb")).unwrap(), "jsonb");
    }

    #[test]
    fn test_build_requires_every_type_code() {
        let err = registry().build().unwrap_err();
        assert!(matches!(err, DbError::Configuration(_)));
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let result = TypeRegistry::builder("test")
            .ranged(TypeCode::Varchar, "varchar($l)", 0, 4000)
            .ranged(TypeCode::Varchar, "clob", 4000, u32::MAX)
            .build_partial();
        assert!(matches!(result, Err(DbError::DuplicateRegistration { .. })));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = TypeRegistry::builder("test")
            .add(TypeCode::Integer, "integer")
            .alias("int4", TypeCode::Integer)
            .alias("INT4", TypeCode::BigInt)
            .build_partial();
        assert!(matches!(result, Err(DbError::DuplicateRegistration { .. })));

        let shadowing = TypeRegistry::builder("test")
            .add(TypeCode::Integer, "integer")
            .alias("integer", TypeCode::BigInt)
            .build_partial();
        assert!(shadowing.is_err());
    }

    #[test]
    fn test_classify_uses_canonical_and_aliases() {
        let types = TypeRegistry::builder("test")
            .canonical(TypeCode::TinyInt, "smallint", TypeCode::SmallInt)
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Varchar, "varchar($l)")
            .alias("character varying", TypeCode::Varchar)
            .build_partial().unwrap();
        assert_eq!(types.classify("SMALLINT"), Some(TypeCode::SmallInt));
        assert_eq!(types.classify("varchar(20)"), Some(TypeCode::Varchar));
        assert_eq!(types.classify("character  varying"), Some(TypeCode::Varchar));
        assert_eq!(types.classify("geometry"), None);
    }

    #[test]
    fn test_native_type_parse() {
        let parsed = NativeType::parse("NUMERIC(10, 2)");
        assert_eq!(parsed.base, "numeric");
        assert_eq!(parsed.args, vec![10, 2]);

        let bit_data = NativeType::parse("varchar(20) for bit data");
        assert_eq!(bit_data.base, "varchar for bit data");
        assert_eq!(bit_data.args, vec![20]);

        assert_eq!(NativeType::parse("varbinary(max)").args, Vec::<u32>::new());
    }

    #[test]
    fn test_widening() {
        let old = NativeType::parse("varchar(50)");
        assert!(old.is_widened_by(&NativeType::parse("varchar(100)")));
        assert!(!old.is_widened_by(&NativeType::parse("varchar(20)")));
        assert!(!old.is_widened_by(&NativeType::parse("char(100)")));
        let amount = NativeType::parse("decimal(10,2)");
        assert!(!amount.is_widened_by(&NativeType::parse("decimal(12,1)")));
    }
}
