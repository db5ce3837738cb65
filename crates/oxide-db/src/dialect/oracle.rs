//! Oracle dialect.

use regex::Regex;

use super::{
    push_clause, redefine_column_sql, CommentSupport, Dialect, DialectSettings, Limit, LimitedSql,
    SequenceDialect,
};
use crate::changes::{ColumnDefinitionChange, ColumnProperty};
use crate::error::{DbError, Result};
use crate::schema::{Column, ForeignKeyRule, Index, Sequence, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "Oracle",
    keywords: &[
        "ACCESS", "AUDIT", "COMMENT", "DATE", "FILE", "LEVEL", "LONG", "MODE", "NUMBER", "RAW",
        "RESOURCE", "ROWID", "ROWNUM", "SESSION", "SIZE", "SYNONYM", "SYSDATE", "UID", "USER",
    ],
    system_schemas: &[
        "SYS", "SYSTEM", "OUTLN", "DBSNMP", "XDB", "MDSYS", "CTXSYS", "ORDSYS", "WMSYS",
        "APPQOSSYS", "AUDSYS", "GSMADMIN_INTERNAL", "OJVMSYS", "LBACSYS", "DVSYS",
    ],
    comments: CommentSupport::Statement,
    varchar_type: "varchar2",
    ..DialectSettings::STANDARD
};

/// Oracle dialect.
///
/// Integral types are spelled as `number(p,0)`, so every `number` reads
/// back as [`TypeCode::Decimal`] and compares through its precision.
#[derive(Debug)]
pub struct OracleDialect {
    types: TypeRegistry,
    internal_index: Regex,
    internal_sequence: Regex,
}

impl OracleDialect {
    /// Creates a new Oracle dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .canonical(TypeCode::Boolean, "number(1,0)", TypeCode::Decimal)
            .canonical(TypeCode::Bit, "number(1,0)", TypeCode::Decimal)
            .canonical(TypeCode::TinyInt, "number(3,0)", TypeCode::Decimal)
            .canonical(TypeCode::SmallInt, "number(5,0)", TypeCode::Decimal)
            .canonical(TypeCode::Integer, "number(10,0)", TypeCode::Decimal)
            .canonical(TypeCode::BigInt, "number(19,0)", TypeCode::Decimal)
            .add(TypeCode::Real, "binary_float")
            .canonical(TypeCode::Float, "binary_double", TypeCode::Double)
            .add(TypeCode::Double, "binary_double")
            .add(TypeCode::Decimal, "number($p,$s)")
            .canonical(TypeCode::Numeric, "number($p,$s)", TypeCode::Decimal)
            .ranged(TypeCode::Char, "char($l)", 0, 2000)
            .ranged(TypeCode::Varchar, "varchar2($l)", 0, 4000)
            .register(TypeCode::Varchar, "clob", Some(4001), None, Some(TypeCode::Clob))
            .canonical(TypeCode::LongVarchar, "clob", TypeCode::Clob)
            .canonical(TypeCode::Binary, "blob", TypeCode::Blob)
            .canonical(TypeCode::VarBinary, "blob", TypeCode::Blob)
            .canonical(TypeCode::LongVarBinary, "blob", TypeCode::Blob)
            .add(TypeCode::Date, "date")
            .canonical(TypeCode::Time, "date", TypeCode::Date)
            .add(TypeCode::Timestamp, "timestamp")
            .add(TypeCode::Blob, "blob")
            .add(TypeCode::Clob, "clob")
            .alias("float", TypeCode::Double)
            .alias("varchar", TypeCode::Varchar)
            .alias("nvarchar2", TypeCode::Varchar)
            .alias("nchar", TypeCode::Char)
            .alias("nclob", TypeCode::Clob)
            .alias("long", TypeCode::LongVarchar)
            .alias("integer", TypeCode::Decimal)
            .build()?;
        let config = |e: regex::Error| DbError::Configuration(e.to_string());
        Ok(Self {
            types,
            internal_index: Regex::new(r"(?i)^(SYS_|BIN\$)").map_err(config)?,
            internal_sequence: Regex::new(r"(?i)ISEQ\$\$_").map_err(config)?,
        })
    }
}

impl Dialect for OracleDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        Some(self)
    }

    fn add_column_sql(&self, table: &TableName, column: &Column) -> Result<Vec<String>> {
        let mut sqls = vec![format!(
            "ALTER TABLE {} ADD ({})",
            self.qualify(table),
            self.column_definition(column)?
        )];
        if column.comment.is_some() {
            sqls.extend(self.comment_on_column_sql(table, column));
        }
        Ok(sqls)
    }

    fn supports_on_update(&self) -> bool {
        false
    }

    fn supports_on_delete(&self, rule: ForeignKeyRule) -> bool {
        rule != ForeignKeyRule::SetDefault
    }

    fn safe_alter_column_sql(&self, change: &ColumnDefinitionChange) -> Result<Vec<String>> {
        redefine_column_sql(self, change, |column| {
            let mut sqls = Vec::new();
            let modifies = [ColumnProperty::Default, ColumnProperty::Nullable, ColumnProperty::Size]
                .into_iter()
                .any(|p| change.has(p));
            if modifies {
                let mut parts = vec![self.identifier(&column.name), self.native_type(column)?];
                match self.default_value_sql(column) {
                    Some(default) => parts.push(format!("DEFAULT {default}")),
                    None if change.has(ColumnProperty::Default) => {
                        parts.push("DEFAULT NULL".to_string());
                    }
                    None => {}
                }
                // Oracle rejects a MODIFY that restates the current nullability.
                if change.has(ColumnProperty::Nullable) {
                    parts.push(self.null_clause(column.is_nullable()).to_string());
                }
                sqls.push(format!(
                    "ALTER TABLE {} MODIFY ({})",
                    self.qualify(&change.table),
                    parts.join(" ")
                ));
            }
            if change.has(ColumnProperty::Comment) {
                sqls.extend(self.comment_on_column_sql(&change.table, column));
            }
            Ok(sqls)
        })
    }

    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        LimitedSql {
            sql: format!(
                "SELECT * FROM ( SELECT A.*,ROWNUM ORACLE_ROWNUM FROM ( {sql} ) A WHERE ROWNUM <= ? ) WHERE ORACLE_ROWNUM >= ?"
            ),
            args: vec![limit.offset + limit.rows, limit.offset + 1],
        }
    }

    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        self.internal_index.is_match(&index.name)
            || index
                .name
                .to_ascii_uppercase()
                .starts_with(super::INTERNAL_NAME_PREFIX)
    }

    fn is_internal_sequence(&self, name: &str, _tables: &[Table]) -> bool {
        self.internal_sequence.is_match(name)
    }

    fn is_internal_default_value(&self, raw: &str) -> bool {
        self.internal_sequence.is_match(raw)
    }
}

impl SequenceDialect for OracleDialect {
    fn sequence_ddl(&self, sequence: &Sequence) -> Vec<String> {
        let mut parts = vec![format!(
            "CREATE SEQUENCE {}",
            self.qualify(&sequence.qualified_name())
        )];
        push_clause(&mut parts, "START WITH", sequence.start);
        push_clause(&mut parts, "INCREMENT BY", sequence.increment);
        push_clause(&mut parts, "MINVALUE", sequence.min_value);
        push_clause(&mut parts, "MAXVALUE", sequence.max_value);
        push_clause(&mut parts, "CACHE", sequence.cache);
        match sequence.cycle {
            Some(true) => parts.push("CYCLE".to_string()),
            Some(false) => parts.push("NOCYCLE".to_string()),
            None => {}
        }
        vec![parts.join(" ")]
    }

    fn drop_sequence_ddl(&self, name: &TableName) -> Vec<String> {
        vec![format!("DROP SEQUENCE {}", self.qualify(name))]
    }

    fn next_value(&self, name: &TableName) -> String {
        format!("{}.nextval", self.qualify(name))
    }

    fn current_value(&self, name: &TableName) -> Result<String> {
        Ok(format!("{}.currval", self.qualify(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ColumnPropertyChange;
    use crate::schema::{DefaultValue, ForeignKey};

    fn dialect() -> OracleDialect {
        OracleDialect::new().unwrap()
    }

    #[test]
    fn test_integer_normalises_to_number() {
        let d = dialect();
        let declared = Column::new("id", TypeCode::Integer);
        let live = Column::new("id", TypeCode::Decimal).precision(10, 0);
        assert_eq!(d.native_type(&declared).unwrap(), "number(10,0)");
        assert_eq!(d.native_type(&live).unwrap(), "number(10,0)");
        assert_eq!(d.types().classify("NUMBER"), Some(TypeCode::Decimal));
    }

    #[test]
    fn test_add_column_with_comment() {
        let d = dialect();
        let column = Column::new("nick", TypeCode::Varchar).length(30).comment("Nickname");
        assert_eq!(
            d.add_column_sql(&TableName::new("users"), &column).unwrap(),
            vec![
                "ALTER TABLE users ADD (nick varchar2(30) NULL)",
                "COMMENT ON COLUMN users.nick IS 'Nickname'",
            ]
        );
    }

    #[test]
    fn test_modify_restates_nullability_only_when_changed() {
        let d = dialect();
        let old = Column::new("name", TypeCode::Varchar).length(20).not_null();
        let new = Column::new("name", TypeCode::Varchar)
            .length(40)
            .not_null()
            .default_value(DefaultValue::Text("n/a".into()));
        let mut change = ColumnDefinitionChange::new(TableName::new("users"), old, new);
        change.push(ColumnPropertyChange::Size {
            old: "varchar2(20)".into(),
            new: "varchar2(40)".into(),
        });
        change.push(ColumnPropertyChange::Default {
            old: None,
            new: Some("'n/a'".into()),
        });
        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec!["ALTER TABLE users MODIFY (name varchar2(40) DEFAULT 'n/a')"]
        );

        let mut nullable = ColumnDefinitionChange::new(
            TableName::new("users"),
            Column::new("name", TypeCode::Varchar).length(20),
            Column::new("name", TypeCode::Varchar).length(20).not_null(),
        );
        nullable.push(ColumnPropertyChange::Nullable {
            old: true,
            new: false,
        });
        assert_eq!(
            d.safe_alter_column_sql(&nullable).unwrap(),
            vec!["ALTER TABLE users MODIFY (name varchar2(20) NOT NULL)"]
        );
    }

    #[test]
    fn test_comment_only_change_uses_comment_statement() {
        let d = dialect();
        let mut change = ColumnDefinitionChange::new(
            TableName::new("users"),
            Column::new("name", TypeCode::Varchar).length(20),
            Column::new("name", TypeCode::Varchar).length(20).comment("Full name"),
        );
        change.push(ColumnPropertyChange::Comment {
            old: None,
            new: Some("Full name".into()),
        });
        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec!["COMMENT ON COLUMN users.name IS 'Full name'"]
        );
    }

    #[test]
    fn test_foreign_key_rules_filtered() {
        let d = dialect();
        let fk = ForeignKey::new("fk_a", vec!["b_id".into()], "b", vec!["id".into()])
            .on_update(ForeignKeyRule::Cascade)
            .on_delete(ForeignKeyRule::Cascade);
        assert_eq!(
            d.create_foreign_key_sql(&TableName::new("a"), &fk),
            "ALTER TABLE a ADD CONSTRAINT fk_a FOREIGN KEY (b_id) REFERENCES b (id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_rownum_limit() {
        let limited = dialect().rewrite_for_limit("select * from t", Limit { offset: 10, rows: 5 });
        assert_eq!(
            limited.sql,
            "SELECT * FROM ( SELECT A.*,ROWNUM ORACLE_ROWNUM FROM ( select * from t ) A WHERE ROWNUM <= ? ) WHERE ORACLE_ROWNUM >= ?"
        );
        assert_eq!(limited.args, vec![15, 11]);
    }

    #[test]
    fn test_sequences() {
        let d = dialect();
        let seq = Sequence::new("order_seq").start(100).increment(1).cache(20).cycle(false);
        assert_eq!(
            d.create_sequence_sql(&seq).unwrap(),
            vec!["CREATE SEQUENCE order_seq START WITH 100 INCREMENT BY 1 CACHE 20 NOCYCLE"]
        );
        assert_eq!(
            d.next_value_expr(&TableName::new("order_seq")).unwrap(),
            "order_seq.nextval"
        );
    }

    #[test]
    fn test_internal_objects() {
        let d = dialect();
        let table = Table::new("USERS");
        assert!(d.is_internal_index(&table, &Index::new("SYS_C0012345", vec![])));
        assert!(d.is_internal_index(&table, &Index::new("BIN$abc==$0", vec![])));
        assert!(!d.is_internal_index(&table, &Index::new("IX_USERS_NAME", vec![])));
        assert!(d.is_internal_sequence("ISEQ$$_74511", &[]));
        assert!(d.is_internal_default_value("\"APP\".\"ISEQ$$_74511\".nextval"));
        assert!(!d.supports_auto_increment());
    }

    #[test]
    fn test_type_round_trip() {
        crate::dialect::tests::assert_types_round_trip(&dialect());
    }
}
