//! The type-generation engine.
//!
//! Turns normalized [`Schema`] objects into the textual type description
//! consumed by query-validating client libraries: field classification
//! with Row/Insert/Update projection rules, foreign-key relationship
//! extraction, documentation rendering and deterministic assembly of the
//! final output string.

use serde::Deserialize;

use crate::model::{
    CompositeField, CompositeFieldType, CompositeType, EnumType, Field, FieldKind, ScalarType,
    Schema, Table,
};

/// Options recognized by the generator, decoded from the request's
/// `plugin_options` JSON. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Render documentation comments attached to tables, fields and enums.
    pub documentation: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            documentation: true,
        }
    }
}

/// Immutable scalar-to-output-token lookup handed to the classifier.
///
/// Decimal and timestamp columns share the generic `number` / `string`
/// precision of their neighbors; the description carries no
/// arbitrary-precision or calendar-aware representation.
#[derive(Debug, Clone)]
pub struct ScalarTypeMap {
    entries: [(ScalarType, &'static str); 9],
}

impl ScalarTypeMap {
    /// The fixed mapping used for the emitted description.
    pub fn standard() -> Self {
        Self {
            entries: [
                (ScalarType::Integer, "number"),
                (ScalarType::BigInt, "number"),
                (ScalarType::Float, "number"),
                (ScalarType::Decimal, "number"),
                (ScalarType::Boolean, "boolean"),
                (ScalarType::Bytes, "string"),
                (ScalarType::Timestamp, "string"),
                (ScalarType::Json, "Json"),
                (ScalarType::Text, "string"),
            ],
        }
    }

    pub fn token(&self, scalar: ScalarType) -> &'static str {
        self.entries
            .iter()
            .find(|(tag, _)| *tag == scalar)
            .map(|(_, token)| *token)
            .unwrap_or("unknown")
    }
}

/// A classified column ready for emission into one of the three table
/// projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub name: String,
    pub optional: bool,
    pub ty: String,
}

/// Output type for a non-relation field. Relation fields carry no column
/// type; they are the relationship extractor's concern.
fn field_type(kind: &FieldKind, map: &ScalarTypeMap) -> String {
    match kind {
        FieldKind::Scalar(scalar) => map.token(*scalar).to_string(),
        FieldKind::Enum(target) => enum_reference(target),
        FieldKind::Composite(target) => target.clone(),
        FieldKind::Relation(_) => String::new(),
    }
}

fn enum_reference(target: &str) -> String {
    format!("Database['public']['Enums']['{}']", target)
}

pub fn row_entry(field: &Field, map: &ScalarTypeMap) -> ColumnEntry {
    let mut ty = field_type(&field.kind, map);
    if !field.is_required {
        ty.push_str(" | null");
    }
    ColumnEntry {
        name: field.name.clone(),
        optional: false,
        ty,
    }
}

/// Insert projection. A field becomes optional when it is not required,
/// carries a default, or is server-generated; a generated field may never
/// be supplied at all, so its type collapses to `never`.
pub fn insert_entry(field: &Field, map: &ScalarTypeMap) -> ColumnEntry {
    if field.is_generated {
        return never_entry(field);
    }
    let mut ty = field_type(&field.kind, map);
    if !field.is_required {
        ty.push_str(" | null");
    }
    ColumnEntry {
        name: field.name.clone(),
        optional: !field.is_required || field.has_default,
        ty,
    }
}

/// Update projection: every non-generated field is optional, nullability
/// still tracks `is_required` alone.
pub fn update_entry(field: &Field, map: &ScalarTypeMap) -> ColumnEntry {
    if field.is_generated {
        return never_entry(field);
    }
    let mut ty = field_type(&field.kind, map);
    if !field.is_required {
        ty.push_str(" | null");
    }
    ColumnEntry {
        name: field.name.clone(),
        optional: true,
        ty,
    }
}

fn never_entry(field: &Field) -> ColumnEntry {
    ColumnEntry {
        name: field.name.clone(),
        optional: true,
        ty: "never".to_string(),
    }
}

/// A foreign-key relationship descriptor, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub foreign_key_name: String,
    pub columns: Vec<String>,
    pub is_one_to_one: bool,
    pub referenced_relation: String,
    pub referenced_columns: Vec<String>,
}

/// Relationships carried by a table's relation fields, sorted by field
/// name. Back-reference fields with no local foreign key (empty column
/// lists) are skipped, so the inverse side of a relation never produces a
/// phantom entry.
///
/// The one-to-one flag negates the originating field's list-ness. A
/// relation traversed from the "many" side can be misclassified by this;
/// the behavior is kept as-is.
pub fn relationships(table: &Table) -> Vec<Relationship> {
    let mut selected: Vec<&Field> = table
        .fields
        .iter()
        .filter(|field| match &field.kind {
            FieldKind::Relation(info) => {
                !info.relation_name.is_empty()
                    && !info.origin_columns.is_empty()
                    && !info.referenced_columns.is_empty()
            }
            _ => false,
        })
        .collect();
    selected.sort_by(|a, b| a.name.cmp(&b.name));

    selected
        .into_iter()
        .filter_map(|field| match &field.kind {
            FieldKind::Relation(info) => Some(Relationship {
                foreign_key_name: info.relation_name.clone(),
                columns: info.origin_columns.clone(),
                is_one_to_one: !field.is_list,
                referenced_relation: info.referenced_table.clone(),
                referenced_columns: info.referenced_columns.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Renders free-text documentation into comment blocks. A disabled
/// renderer emits nothing.
struct DocRenderer {
    enabled: bool,
}

impl DocRenderer {
    fn render(&self, lines: &[String], indent: &str) -> String {
        if !self.enabled || lines.is_empty() {
            return String::new();
        }
        if lines.len() == 1 {
            return format!("{}/** {} */\n", indent, lines[0]);
        }
        self.block(lines.iter().map(String::as_str), indent)
    }

    /// Enum documentation: the enum's own lines, then a `name: description`
    /// line for each documented variant. When both are present they render
    /// as one continuous block.
    fn render_enum(&self, enum_: &EnumType, indent: &str) -> String {
        if !self.enabled {
            return String::new();
        }
        let variant_lines: Vec<String> = enum_
            .variants
            .iter()
            .filter_map(|variant| {
                variant
                    .documentation
                    .as_ref()
                    .map(|doc| format!("{}: {}", variant.name, doc))
            })
            .collect();
        if variant_lines.is_empty() {
            return self.render(&enum_.documentation, indent);
        }
        self.block(
            enum_
                .documentation
                .iter()
                .map(String::as_str)
                .chain(variant_lines.iter().map(String::as_str)),
            indent,
        )
    }

    fn block<'a>(&self, lines: impl Iterator<Item = &'a str>, indent: &str) -> String {
        let mut out = format!("{}/**\n", indent);
        for line in lines {
            out.push_str(indent);
            out.push_str(" * ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(indent);
        out.push_str(" */\n");
        out
    }
}

// Ordering and elision, kept apart from the formatting below so both stay
// independently testable.

fn sorted_schemas(schemas: &[Schema]) -> Vec<&Schema> {
    let mut ordered: Vec<&Schema> = schemas.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    ordered
}

fn sorted_tables(schema: &Schema) -> Vec<&Table> {
    let mut tables: Vec<&Table> = schema.tables.iter().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    tables
}

/// Enums with zero variants are excluded from the output entirely.
fn visible_enums(schema: &Schema) -> Vec<&EnumType> {
    let mut enums: Vec<&EnumType> = schema
        .enums
        .iter()
        .filter(|enum_| !enum_.variants.is_empty())
        .collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));
    enums
}

/// Composite types with zero fields are excluded from the output entirely.
fn visible_composite_types(schema: &Schema) -> Vec<&CompositeType> {
    let mut types: Vec<&CompositeType> = schema
        .composite_types
        .iter()
        .filter(|ty| !ty.fields.is_empty())
        .collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));
    types
}

/// Column-bearing fields of a table, sorted by name. Relation fields are
/// not columns and never appear in Row/Insert/Update.
fn column_fields(table: &Table) -> Vec<&Field> {
    let mut fields: Vec<&Field> = table
        .fields
        .iter()
        .filter(|field| !matches!(field.kind, FieldKind::Relation(_)))
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

const EMPTY_SECTION: &str = "      [_ in never]: never";

/// Render the complete type description for a normalized schema list.
/// Deterministic: the same input always yields the identical string.
pub fn generate_types(schemas: &[Schema], config: &GeneratorConfig) -> String {
    let map = ScalarTypeMap::standard();
    let docs = DocRenderer {
        enabled: config.documentation,
    };

    let body: String = sorted_schemas(schemas)
        .into_iter()
        .map(|schema| schema_section(schema, &map, &docs))
        .collect();

    format!(
        "\nexport type Json = string | number | boolean | null | {{ [key: string]: Json | undefined }} | Json[]\n\nexport type Database = {{\n{}\n}}\n\n\n{}\n\n",
        body, HELPER_TYPES,
    )
}

fn schema_section(schema: &Schema, map: &ScalarTypeMap, docs: &DocRenderer) -> String {
    format!(
        "  {}: {{\n    Tables: {{\n{}\n    }}\n    Views: {{\n      /* No support for views */\n    }}\n    Functions: {{\n      /* No support for functions */\n    }}\n    Enums: {{\n{}\n    }}\n    CompositeTypes: {{\n{}\n    }}\n  }}",
        schema.name,
        tables_section(&sorted_tables(schema), map, docs),
        enums_section(&visible_enums(schema), docs),
        composite_types_section(&visible_composite_types(schema), map, docs),
    )
}

fn tables_section(tables: &[&Table], map: &ScalarTypeMap, docs: &DocRenderer) -> String {
    if tables.is_empty() {
        return EMPTY_SECTION.to_string();
    }
    tables
        .iter()
        .map(|table| table_entry(table, map, docs))
        .collect::<Vec<_>>()
        .join(";\n")
}

fn table_entry(table: &Table, map: &ScalarTypeMap, docs: &DocRenderer) -> String {
    let fields = column_fields(table);

    let row = projection_lines(&fields, docs, |field| row_entry(field, map));
    let insert = fields
        .iter()
        .map(|field| entry_line(&insert_entry(field, map)))
        .collect::<Vec<_>>()
        .join(";\n");
    let update = fields
        .iter()
        .map(|field| entry_line(&update_entry(field, map)))
        .collect::<Vec<_>>()
        .join(";\n");

    format!(
        "{}      {}: {{\n        Row: {{\n{}\n        }}\n        Insert: {{\n{}\n        }}\n        Update: {{\n{}\n        }}\n        Relationships: [\n{}\n        ]\n      }}",
        docs.render(&table.documentation, "      "),
        table.name,
        row,
        insert,
        update,
        relationships_section(&relationships(table)),
    )
}

/// Row lines carry the field documentation; Insert and Update repeat the
/// same columns and stay comment-free.
fn projection_lines(
    fields: &[&Field],
    docs: &DocRenderer,
    entry: impl Fn(&Field) -> ColumnEntry,
) -> String {
    fields
        .iter()
        .map(|field| {
            format!(
                "{}{}",
                docs.render(&field.documentation, "          "),
                entry_line(&entry(field))
            )
        })
        .collect::<Vec<_>>()
        .join(";\n")
}

fn entry_line(entry: &ColumnEntry) -> String {
    format!(
        "          {}{}: {}",
        entry.name,
        if entry.optional { "?" } else { "" },
        entry.ty,
    )
}

fn relationships_section(relationships: &[Relationship]) -> String {
    relationships
        .iter()
        .map(|rel| {
            format!(
                "          {{\n            foreignKeyName: \"{}\";\n            columns: {};\n            isOneToOne: {};\n            referencedRelation: \"{}\";\n            referencedColumns: {}\n          }}",
                rel.foreign_key_name,
                string_array(&rel.columns),
                rel.is_one_to_one,
                rel.referenced_relation,
                string_array(&rel.referenced_columns),
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

fn string_array(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("\"{}\"", item)).collect();
    format!("[{}]", quoted.join(","))
}

fn enums_section(enums: &[&EnumType], docs: &DocRenderer) -> String {
    if enums.is_empty() {
        return EMPTY_SECTION.to_string();
    }
    enums
        .iter()
        .map(|enum_| {
            let variants = enum_
                .variants
                .iter()
                .map(|variant| format!("\"{}\"", variant.name))
                .collect::<Vec<_>>()
                .join(" | ");
            format!(
                "{}      {}: {}",
                docs.render_enum(enum_, "      "),
                enum_.name,
                variants,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn composite_types_section(
    types: &[&CompositeType],
    map: &ScalarTypeMap,
    docs: &DocRenderer,
) -> String {
    if types.is_empty() {
        return EMPTY_SECTION.to_string();
    }
    types
        .iter()
        .map(|ty| {
            let fields = ty
                .fields
                .iter()
                .map(|field| {
                    format!(
                        "{}        {}: {}",
                        docs.render(&field.documentation, "        "),
                        field.name,
                        composite_field_type(field, map),
                    )
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!("      {}: {{\n{}\n      }}", ty.name, fields)
        })
        .collect::<Vec<_>>()
        .join(",\n\n")
}

/// Untyped composite members fall back to `unknown`; typed ones are always
/// nullable in the store.
fn composite_field_type(field: &CompositeField, map: &ScalarTypeMap) -> String {
    match &field.ty {
        Some(CompositeFieldType::Scalar(scalar)) => format!("{} | null", map.token(*scalar)),
        Some(CompositeFieldType::Enum(target)) => format!("{} | null", enum_reference(target)),
        None => "unknown".to_string(),
    }
}

/// Schema-accessor helpers appended to every generated description; pure
/// boilerplate, never derived from the model.
const HELPER_TYPES: &str = r#"type PublicSchema = Database[Extract<keyof Database, "public">]

export type Tables<
  PublicTableNameOrOptions extends
    | keyof (PublicSchema["Tables"] & PublicSchema["Views"])
    | { schema: keyof Database },
  TableName extends PublicTableNameOrOptions extends { schema: keyof Database }
    ? keyof (Database[PublicTableNameOrOptions["schema"]]["Tables"] &
        Database[PublicTableNameOrOptions["schema"]]["Views"])
    : never = never
> = PublicTableNameOrOptions extends { schema: keyof Database }
  ? (Database[PublicTableNameOrOptions["schema"]]["Tables"] &
      Database[PublicTableNameOrOptions["schema"]]["Views"])[TableName] extends {
      Row: infer R
    }
    ? R
    : never
  : PublicTableNameOrOptions extends keyof (PublicSchema["Tables"] & PublicSchema["Views"])
    ? (PublicSchema["Tables"] & PublicSchema["Views"])[PublicTableNameOrOptions] extends {
        Row: infer R
      }
      ? R
      : never
    : never

export type TablesInsert<
  PublicTableNameOrOptions extends
    | keyof PublicSchema["Tables"]
    | { schema: keyof Database },
  TableName extends PublicTableNameOrOptions extends { schema: keyof Database }
    ? keyof Database[PublicTableNameOrOptions["schema"]]["Tables"]
    : never = never
> = PublicTableNameOrOptions extends { schema: keyof Database }
  ? Database[PublicTableNameOrOptions["schema"]]["Tables"][TableName] extends {
      Insert: infer I
    }
    ? I
    : never
  : PublicTableNameOrOptions extends keyof PublicSchema["Tables"]
  ? PublicSchema["Tables"][PublicTableNameOrOptions] extends {
      Insert: infer I
    }
    ? I
    : never
  : never

export type TablesUpdate<
  PublicTableNameOrOptions extends
    | keyof PublicSchema["Tables"]
    | { schema: keyof Database },
  TableName extends PublicTableNameOrOptions extends { schema: keyof Database }
    ? keyof Database[PublicTableNameOrOptions["schema"]]["Tables"]
    : never = never
> = PublicTableNameOrOptions extends { schema: keyof Database }
  ? Database[PublicTableNameOrOptions["schema"]]["Tables"][TableName] extends {
      Update: infer U
    }
    ? U
    : never
  : PublicTableNameOrOptions extends keyof PublicSchema["Tables"]
  ? PublicSchema["Tables"][PublicTableNameOrOptions] extends {
      Update: infer U
    }
    ? U
    : never
  : never

export type Enums<
  PublicEnumNameOrOptions extends
    | keyof PublicSchema["Enums"]
    | { schema: keyof Database },
  EnumName extends PublicEnumNameOrOptions extends { schema: keyof Database }
    ? keyof Database[PublicEnumNameOrOptions["schema"]]["Enums"]
    : never = never
> = PublicEnumNameOrOptions extends { schema: keyof Database }
  ? Database[PublicEnumNameOrOptions["schema"]]["Enums"][EnumName]
  : PublicEnumNameOrOptions extends keyof PublicSchema["Enums"]
  ? PublicSchema["Enums"][PublicEnumNameOrOptions]
  : never

export type CompositeTypes<
  PublicCompositeTypeNameOrOptions extends
    | keyof PublicSchema['CompositeTypes']
    | { schema: keyof Database },
  CompositeTypeName extends PublicCompositeTypeNameOrOptions extends { schema: keyof Database }
    ? keyof Database[PublicCompositeTypeNameOrOptions['schema']]['CompositeTypes']
    : never = never
> = PublicCompositeTypeNameOrOptions extends { schema: keyof Database }
  ? Database[PublicCompositeTypeNameOrOptions['schema']]['CompositeTypes'][CompositeTypeName]
  : PublicCompositeTypeNameOrOptions extends keyof PublicSchema['CompositeTypes']
    ? PublicSchema['CompositeTypes'][PublicCompositeTypeNameOrOptions]
    : never"#;
