//! Normalized schema objects consumed by the generator.
//!
//! The normalizer turns the wire datamodel into an ordered list of
//! [`Schema`] values. Table, enum and composite-type names that are not
//! valid identifiers are rewritten into quoted string literals so they
//! stay usable as structural keys in the emitted description.

use crate::plugin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
    pub enums: Vec<EnumType>,
    pub composite_types: Vec<CompositeType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub is_required: bool,
    pub is_generated: bool,
    pub has_default: bool,
    pub is_list: bool,
    pub documentation: Vec<String>,
}

/// Closed field classification; the classifier matches this exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Enum(String),
    Relation(RelationInfo),
    Composite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    BigInt,
    Float,
    Decimal,
    Boolean,
    Bytes,
    Timestamp,
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInfo {
    pub relation_name: String,
    pub origin_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeType {
    pub name: String,
    pub fields: Vec<CompositeField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeField {
    pub name: String,
    pub ty: Option<CompositeFieldType>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeFieldType {
    Scalar(ScalarType),
    Enum(String),
}

/// Build the schema list from a wire datamodel.
///
/// Always yields the single "public" schema today; the emitter already
/// handles any number. Pure and total: an empty datamodel produces a
/// schema with empty collections.
pub fn normalize(datamodel: &plugin::Datamodel) -> Vec<Schema> {
    vec![Schema {
        name: "public".to_string(),
        tables: datamodel.models.iter().map(normalize_model).collect(),
        enums: datamodel.enums.iter().map(normalize_enum).collect(),
        composite_types: datamodel
            .composite_types
            .iter()
            .map(normalize_composite)
            .collect(),
    }]
}

fn normalize_model(model: &plugin::Model) -> Table {
    Table {
        name: escape_name(&model.name),
        fields: model.fields.iter().map(normalize_field).collect(),
        documentation: model.documentation.clone(),
    }
}

fn normalize_field(field: &plugin::FieldDecl) -> Field {
    let kind = match field_kind(field.kind) {
        plugin::FieldKind::Enum => FieldKind::Enum(field.type_name.clone()),
        plugin::FieldKind::Relation => FieldKind::Relation(RelationInfo {
            relation_name: field.relation_name.clone(),
            origin_columns: field.relation_from.clone(),
            referenced_table: field.type_name.clone(),
            referenced_columns: field.relation_to.clone(),
        }),
        plugin::FieldKind::Composite => FieldKind::Composite(field.type_name.clone()),
        plugin::FieldKind::Scalar | plugin::FieldKind::Unspecified => {
            FieldKind::Scalar(scalar_type(field.scalar))
        }
    };

    Field {
        name: field.name.clone(),
        kind,
        is_required: field.is_required,
        is_generated: field.is_generated,
        has_default: field.has_default,
        is_list: field.is_list,
        documentation: field.documentation.clone(),
    }
}

fn normalize_enum(decl: &plugin::EnumDecl) -> EnumType {
    EnumType {
        name: escape_name(&decl.name),
        variants: decl
            .values
            .iter()
            .map(|value| EnumVariant {
                name: value.name.clone(),
                documentation: value.documentation.clone().filter(|doc| !doc.is_empty()),
            })
            .collect(),
        documentation: decl.documentation.clone(),
    }
}

fn normalize_composite(decl: &plugin::CompositeDecl) -> CompositeType {
    CompositeType {
        name: escape_name(&decl.name),
        fields: decl
            .fields
            .iter()
            .map(|field| {
                let ty = match field_kind(field.kind) {
                    plugin::FieldKind::Scalar => {
                        Some(CompositeFieldType::Scalar(scalar_type(field.scalar)))
                    }
                    plugin::FieldKind::Enum => {
                        Some(CompositeFieldType::Enum(field.type_name.clone()))
                    }
                    _ => None,
                };
                CompositeField {
                    name: field.name.clone(),
                    ty,
                    documentation: field.documentation.clone(),
                }
            })
            .collect(),
    }
}

fn field_kind(tag: i32) -> plugin::FieldKind {
    plugin::FieldKind::try_from(tag).unwrap_or(plugin::FieldKind::Unspecified)
}

// Unknown tags degrade to TEXT; the normalizer has no failure mode.
fn scalar_type(tag: i32) -> ScalarType {
    match plugin::ScalarKind::try_from(tag).unwrap_or(plugin::ScalarKind::Unspecified) {
        plugin::ScalarKind::Integer => ScalarType::Integer,
        plugin::ScalarKind::BigInt => ScalarType::BigInt,
        plugin::ScalarKind::Float => ScalarType::Float,
        plugin::ScalarKind::Decimal => ScalarType::Decimal,
        plugin::ScalarKind::Boolean => ScalarType::Boolean,
        plugin::ScalarKind::Bytes => ScalarType::Bytes,
        plugin::ScalarKind::Timestamp => ScalarType::Timestamp,
        plugin::ScalarKind::Json => ScalarType::Json,
        plugin::ScalarKind::Text | plugin::ScalarKind::Unspecified => ScalarType::Text,
    }
}

/// Rewrite a name into a quoted string literal when it cannot stand as a
/// bare identifier key.
pub fn escape_name(name: &str) -> String {
    if is_identifier(name) {
        return name.to_string();
    }
    match serde_json::to_string(name) {
        Ok(quoted) => quoted,
        Err(_) => name.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
