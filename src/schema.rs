//! SQL DDL ingestion.
//!
//! This module parses SQL schema files and builds the wire datamodel
//! handed to the generator: tables with per-column classification, enum
//! and composite type declarations, foreign-key relation fields and
//! `COMMENT ON` documentation.

use sqlparser::ast::{
    ColumnOption, CommentObject, GeneratedAs, ObjectName, Statement, TableConstraint,
    UserDefinedTypeRepresentation,
};
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::{Parser, ParserError};

use crate::plugin::{
    CompositeDecl, Datamodel, EnumDecl, EnumValue, FieldDecl, FieldKind, Model, ScalarKind,
};

/// SQL dialect type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    MySQL,
    SQLite,
    Generic,
    PostgreSQL,
}

impl SchemaDialect {
    /// Convert to sqlparser dialect
    pub fn to_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SchemaDialect::MySQL => Box::new(MySqlDialect {}),
            SchemaDialect::SQLite => Box::new(SQLiteDialect {}),
            SchemaDialect::Generic => Box::new(GenericDialect {}),
            SchemaDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
        }
    }

    /// Map a settings engine name onto a dialect. Unknown engines parse
    /// with the generic dialect.
    pub fn from_engine(engine: &str) -> Self {
        match engine {
            "postgresql" | "postgres" => SchemaDialect::PostgreSQL,
            "mysql" => SchemaDialect::MySQL,
            "sqlite" => SchemaDialect::SQLite,
            _ => SchemaDialect::Generic,
        }
    }
}

/// Accumulates DDL statements and produces the datamodel they describe.
pub struct SchemaParser {
    dialect: SchemaDialect,
    models: Vec<Model>,
    enums: Vec<EnumDecl>,
    composite_types: Vec<CompositeDecl>,
}

impl SchemaParser {
    /// Create a new schema parser with the specified dialect
    pub fn new(dialect: SchemaDialect) -> Self {
        Self {
            dialect,
            models: Vec::new(),
            enums: Vec::new(),
            composite_types: Vec::new(),
        }
    }

    /// Parse SQL schema from a string
    pub fn parse(&mut self, sql: &str) -> Result<(), ParserError> {
        let dialect = self.dialect.to_dialect();
        let statements = Parser::parse_sql(dialect.as_ref(), sql)?;

        for statement in statements {
            match statement {
                Statement::CreateTable(create_table) => {
                    self.add_table(
                        create_table.name,
                        create_table.columns,
                        create_table.constraints,
                    );
                }
                Statement::CreateType {
                    name,
                    representation,
                } => {
                    self.add_type(name, representation);
                }
                Statement::AlterTable {
                    name, operations, ..
                } => {
                    self.alter_table(name, operations);
                }
                Statement::Comment {
                    object_type,
                    object_name,
                    comment,
                    ..
                } => {
                    self.add_comment(object_type, object_name, comment);
                }
                _ => {
                    // CREATE VIEW, CREATE INDEX, INSERT and friends carry
                    // no type information
                }
            }
        }

        Ok(())
    }

    /// Consume the parser and return the accumulated datamodel.
    pub fn into_datamodel(self) -> Datamodel {
        Datamodel {
            models: self.models,
            enums: self.enums,
            composite_types: self.composite_types,
        }
    }

    /// Parse CREATE TABLE statement
    fn add_table(
        &mut self,
        name: ObjectName,
        columns: Vec<sqlparser::ast::ColumnDef>,
        constraints: Vec<TableConstraint>,
    ) {
        let table_name = base_name(&name);
        let mut model = Model {
            name: table_name.clone(),
            fields: Vec::new(),
            documentation: Vec::new(),
        };

        for column in &columns {
            let type_str = column.data_type.to_string();

            let mut is_required = false;
            let mut has_default = is_serial(&type_str);
            let mut is_generated = false;

            for option in &column.options {
                match &option.option {
                    ColumnOption::NotNull => is_required = true,
                    ColumnOption::Unique {
                        is_primary: true, ..
                    } => is_required = true,
                    ColumnOption::Default(_) => has_default = true,
                    ColumnOption::Generated { generated_as, .. } => match generated_as {
                        GeneratedAs::ByDefault => has_default = true,
                        GeneratedAs::Always | GeneratedAs::ExpStored => is_generated = true,
                    },
                    _ => {}
                }
            }

            let mut field = self.classify_column(&column.name.to_string(), &type_str);
            field.is_required = is_required;
            field.has_default = has_default;
            field.is_generated = is_generated;
            model.fields.push(field);
        }

        // Inline column constraints (column_name REFERENCES parent(id))
        for column in &columns {
            for option in &column.options {
                if let ColumnOption::ForeignKey {
                    foreign_table,
                    referred_columns,
                    ..
                } = &option.option
                {
                    model.fields.push(relation_field(
                        &table_name,
                        option.name.as_ref().map(|n| n.to_string()),
                        vec![column.name.to_string()],
                        base_name(foreign_table),
                        referred_columns.iter().map(|c| c.to_string()).collect(),
                    ));
                }
            }
        }

        // Table-level constraints
        for constraint in constraints {
            match constraint {
                TableConstraint::PrimaryKey { columns, .. } => {
                    for column in &columns {
                        let column_name = column.to_string();
                        if let Some(field) =
                            model.fields.iter_mut().find(|f| f.name == column_name)
                        {
                            field.is_required = true;
                        }
                    }
                }
                TableConstraint::ForeignKey {
                    name,
                    columns,
                    foreign_table,
                    referred_columns,
                    ..
                } => {
                    model.fields.push(relation_field(
                        &table_name,
                        name.map(|n| n.to_string()),
                        columns.iter().map(|c| c.to_string()).collect(),
                        base_name(&foreign_table),
                        referred_columns.iter().map(|c| c.to_string()).collect(),
                    ));
                }
                _ => {}
            }
        }

        self.models.push(model);
    }

    /// Parse CREATE TYPE statement
    fn add_type(&mut self, name: ObjectName, representation: UserDefinedTypeRepresentation) {
        let type_name = base_name(&name);
        match representation {
            UserDefinedTypeRepresentation::Enum { labels } => {
                self.enums.push(EnumDecl {
                    name: type_name,
                    values: labels
                        .into_iter()
                        .map(|label| EnumValue {
                            name: label.value,
                            documentation: None,
                        })
                        .collect(),
                    documentation: Vec::new(),
                });
            }
            UserDefinedTypeRepresentation::Composite { attributes } => {
                let mut fields = Vec::new();
                for attribute in attributes {
                    let type_str = attribute.data_type.to_string();
                    fields.push(self.classify_column(&attribute.name.to_string(), &type_str));
                }
                self.composite_types.push(CompositeDecl {
                    name: type_name,
                    fields,
                });
            }
        }
    }

    /// Parse ALTER TABLE statement
    fn alter_table(
        &mut self,
        name: ObjectName,
        operations: Vec<sqlparser::ast::AlterTableOperation>,
    ) {
        let table_name = base_name(&name);

        for operation in operations {
            if let sqlparser::ast::AlterTableOperation::AddConstraint { constraint, .. } = operation
            {
                match constraint {
                    TableConstraint::PrimaryKey { columns, .. } => {
                        if let Some(model) = self.model_mut(&table_name) {
                            for column in &columns {
                                let column_name = column.to_string();
                                if let Some(field) =
                                    model.fields.iter_mut().find(|f| f.name == column_name)
                                {
                                    field.is_required = true;
                                }
                            }
                        }
                    }
                    TableConstraint::ForeignKey {
                        name,
                        columns,
                        foreign_table,
                        referred_columns,
                        ..
                    } => {
                        let field = relation_field(
                            &table_name,
                            name.map(|n| n.to_string()),
                            columns.iter().map(|c| c.to_string()).collect(),
                            base_name(&foreign_table),
                            referred_columns.iter().map(|c| c.to_string()).collect(),
                        );
                        if let Some(model) = self.model_mut(&table_name) {
                            model.fields.push(field);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Parse COMMENT ON statement
    fn add_comment(
        &mut self,
        object_type: CommentObject,
        object_name: ObjectName,
        comment: Option<String>,
    ) {
        // COMMENT ... IS NULL clears the documentation
        let lines: Vec<String> = match comment {
            Some(text) => text.lines().map(str::to_string).collect(),
            None => Vec::new(),
        };

        match object_type {
            CommentObject::Table => {
                let table_name = base_name(&object_name);
                if let Some(model) = self.model_mut(&table_name) {
                    model.documentation = lines;
                }
            }
            CommentObject::Column => {
                let parts: Vec<String> =
                    object_name.0.iter().map(|part| part.to_string()).collect();
                if parts.len() < 2 {
                    return;
                }
                let column_name = &parts[parts.len() - 1];
                let table_name = &parts[parts.len() - 2];
                if let Some(model) = self.model_mut(table_name) {
                    if let Some(field) =
                        model.fields.iter_mut().find(|f| f.name == *column_name)
                    {
                        field.documentation = lines;
                    }
                }
            }
            _ => {}
        }
    }

    /// Classify a column against the declared enum and composite types,
    /// falling back to a scalar tag.
    fn classify_column(&self, column_name: &str, type_str: &str) -> FieldDecl {
        if self.enums.iter().any(|e| e.name == type_str) {
            return FieldDecl {
                name: column_name.to_string(),
                kind: FieldKind::Enum as i32,
                type_name: type_str.to_string(),
                ..Default::default()
            };
        }
        if self.composite_types.iter().any(|c| c.name == type_str) {
            return FieldDecl {
                name: column_name.to_string(),
                kind: FieldKind::Composite as i32,
                type_name: type_str.to_string(),
                ..Default::default()
            };
        }
        FieldDecl {
            name: column_name.to_string(),
            kind: FieldKind::Scalar as i32,
            scalar: scalar_kind(type_str) as i32,
            ..Default::default()
        }
    }

    fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.name == name)
    }
}

/// Build the relation field a foreign key contributes to its table.
/// Unnamed constraints get the conventional `<table>_<columns>_fkey` name.
fn relation_field(
    table: &str,
    constraint_name: Option<String>,
    columns: Vec<String>,
    target: String,
    referenced: Vec<String>,
) -> FieldDecl {
    let relation_name =
        constraint_name.unwrap_or_else(|| format!("{}_{}_fkey", table, columns.join("_")));
    FieldDecl {
        name: relation_name.clone(),
        kind: FieldKind::Relation as i32,
        type_name: target,
        relation_name,
        relation_from: columns,
        relation_to: referenced,
        ..Default::default()
    }
}

/// Map a SQL type name onto the wire scalar tag. Matching is prefix-based
/// so parameterized forms (VARCHAR(255), NUMERIC(10,2)) resolve too;
/// unmapped types degrade to TEXT.
fn scalar_kind(sql_type: &str) -> ScalarKind {
    let upper = sql_type.to_ascii_uppercase();
    let base = upper
        .split(|c: char| c == '(' || c == ' ' || c == '[')
        .next()
        .unwrap_or("");
    match base {
        "SMALLINT" | "INT" | "INTEGER" | "INT2" | "INT4" | "SERIAL" | "SMALLSERIAL" => {
            ScalarKind::Integer
        }
        "BIGINT" | "INT8" | "BIGSERIAL" => ScalarKind::BigInt,
        "REAL" | "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE" => ScalarKind::Float,
        "NUMERIC" | "DECIMAL" | "MONEY" => ScalarKind::Decimal,
        "BOOLEAN" | "BOOL" => ScalarKind::Boolean,
        "BYTEA" | "BLOB" | "BINARY" | "VARBINARY" => ScalarKind::Bytes,
        "TIMESTAMP" | "TIMESTAMPTZ" | "DATE" | "TIME" | "TIMETZ" | "DATETIME" => {
            ScalarKind::Timestamp
        }
        "JSON" | "JSONB" => ScalarKind::Json,
        _ => ScalarKind::Text,
    }
}

fn is_serial(sql_type: &str) -> bool {
    matches!(
        sql_type.to_ascii_uppercase().as_str(),
        "SERIAL" | "SMALLSERIAL" | "BIGSERIAL"
    )
}

/// Last segment of a possibly schema-qualified name
fn base_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|part| part.to_string())
        .unwrap_or_default()
}
