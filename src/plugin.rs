//! Wire format for the generator plugin protocol.
//!
//! The host encodes a [`GenerateRequest`] on the plugin's stdin and reads a
//! [`GenerateResponse`] from its stdout. The message set is small and
//! stable, so the definitions are hand-maintained `prost` types rather than
//! `protoc` output.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenerateRequest {
    #[prost(message, optional, tag = "1")]
    pub settings: ::core::option::Option<Settings>,
    #[prost(message, optional, tag = "2")]
    pub datamodel: ::core::option::Option<Datamodel>,
    #[prost(string, tag = "3")]
    pub generator_version: ::prost::alloc::string::String,
    /// Options addressed to this plugin, encoded as JSON.
    #[prost(bytes = "vec", tag = "4")]
    pub plugin_options: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub global_options: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Settings {
    /// SQL engine used when `schema` chunks are parsed
    /// ("postgresql", "mysql", "sqlite").
    #[prost(string, tag = "1")]
    pub engine: ::prost::alloc::string::String,
    /// Raw DDL chunks, consulted when no datamodel is supplied.
    #[prost(string, repeated, tag = "2")]
    pub schema: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Destination path the host writes the generated description to.
    #[prost(string, tag = "3")]
    pub output: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Datamodel {
    #[prost(message, repeated, tag = "1")]
    pub models: ::prost::alloc::vec::Vec<Model>,
    #[prost(message, repeated, tag = "2")]
    pub enums: ::prost::alloc::vec::Vec<EnumDecl>,
    #[prost(message, repeated, tag = "3")]
    pub composite_types: ::prost::alloc::vec::Vec<CompositeDecl>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Model {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub fields: ::prost::alloc::vec::Vec<FieldDecl>,
    #[prost(string, repeated, tag = "3")]
    pub documentation: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldDecl {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "FieldKind", tag = "2")]
    pub kind: i32,
    /// Only meaningful when `kind` is SCALAR.
    #[prost(enumeration = "ScalarKind", tag = "3")]
    pub scalar: i32,
    /// Referenced enum, composite type or relation target, depending on `kind`.
    #[prost(string, tag = "4")]
    pub type_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "5")]
    pub is_required: bool,
    #[prost(bool, tag = "6")]
    pub is_generated: bool,
    #[prost(bool, tag = "7")]
    pub has_default: bool,
    #[prost(bool, tag = "8")]
    pub is_list: bool,
    #[prost(string, tag = "9")]
    pub relation_name: ::prost::alloc::string::String,
    /// Originating columns of a relation field.
    #[prost(string, repeated, tag = "10")]
    pub relation_from: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Referenced columns of a relation field.
    #[prost(string, repeated, tag = "11")]
    pub relation_to: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "12")]
    pub documentation: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumDecl {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub values: ::prost::alloc::vec::Vec<EnumValue>,
    #[prost(string, repeated, tag = "3")]
    pub documentation: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumValue {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "2")]
    pub documentation: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompositeDecl {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// A field with kind UNSPECIFIED is untyped.
    #[prost(message, repeated, tag = "2")]
    pub fields: ::prost::alloc::vec::Vec<FieldDecl>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenerateResponse {
    #[prost(message, repeated, tag = "1")]
    pub files: ::prost::alloc::vec::Vec<File>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct File {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub contents: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FieldKind {
    Unspecified = 0,
    Scalar = 1,
    Enum = 2,
    Relation = 3,
    Composite = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ScalarKind {
    Unspecified = 0,
    Integer = 1,
    BigInt = 2,
    Float = 3,
    Decimal = 4,
    Boolean = 5,
    Bytes = 6,
    Timestamp = 7,
    Json = 8,
    Text = 9,
}
