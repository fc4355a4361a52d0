use crate::generate::{generate_types, GeneratorConfig};
use crate::model::normalize;
use crate::plugin::{Datamodel, File, GenerateRequest, GenerateResponse, Settings};
use crate::schema::{SchemaDialect, SchemaParser};
use prost::Message;
use std::io::{Read, Write};
use thiserror::Error;

/// Failures surfaced by [`process_request`]. The generator core itself is
/// total; everything here happens at the request boundary.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no output location provided")]
    MissingOutput,
    #[error("invalid plugin options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
    #[error("schema parse error: {0}")]
    Schema(#[from] sqlparser::parser::ParserError),
}

pub fn run<TFunc>(process: TFunc) -> Result<(), Box<dyn std::error::Error>>
where
    TFunc: FnOnce(GenerateRequest) -> Result<GenerateResponse, Box<dyn std::error::Error>>,
{
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with_io(stdin.lock(), stdout.lock(), process)
}

pub fn run_with_io<TReader, TWriter, TFunc>(
    mut reader: TReader,
    mut writer: TWriter,
    process: TFunc,
) -> Result<(), Box<dyn std::error::Error>>
where
    TReader: Read,
    TWriter: Write,
    TFunc: FnOnce(GenerateRequest) -> Result<GenerateResponse, Box<dyn std::error::Error>>,
{
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let request = GenerateRequest::decode(&input[..])?;
    let response = process(request)?;

    let mut output = Vec::new();
    response.encode(&mut output)?;

    writer.write_all(&output)?;
    Ok(())
}

/// Canonical processor: resolves the configuration, ingests the
/// datamodel and renders the type description into the configured output
/// file.
///
/// A request without an output destination fails before any generation
/// happens. A request without a datamodel falls back to parsing the DDL
/// chunks in its settings.
pub fn process_request(request: GenerateRequest) -> Result<GenerateResponse, GenerateError> {
    let settings = request.settings.unwrap_or_default();
    if settings.output.is_empty() {
        return Err(GenerateError::MissingOutput);
    }

    let config = if request.plugin_options.is_empty() {
        GeneratorConfig::default()
    } else {
        serde_json::from_slice(&request.plugin_options)?
    };

    let datamodel = match request.datamodel {
        Some(datamodel) => datamodel,
        None => parse_schema_chunks(&settings)?,
    };

    let schemas = normalize(&datamodel);
    let contents = generate_types(&schemas, &config);

    Ok(GenerateResponse {
        files: vec![File {
            name: settings.output,
            contents: contents.into_bytes(),
        }],
    })
}

fn parse_schema_chunks(settings: &Settings) -> Result<Datamodel, GenerateError> {
    let mut parser = SchemaParser::new(SchemaDialect::from_engine(&settings.engine));
    for chunk in &settings.schema {
        parser.parse(chunk)?;
    }
    Ok(parser.into_datamodel())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{FieldDecl, FieldKind, Model, ScalarKind};

    fn sample_datamodel() -> Datamodel {
        Datamodel {
            models: vec![Model {
                name: "User".to_string(),
                fields: vec![FieldDecl {
                    name: "id".to_string(),
                    kind: FieldKind::Scalar as i32,
                    scalar: ScalarKind::Text as i32,
                    is_required: true,
                    ..Default::default()
                }],
                documentation: vec![],
            }],
            ..Default::default()
        }
    }

    fn create_sample_request() -> GenerateRequest {
        GenerateRequest {
            settings: Some(Settings {
                engine: "postgresql".to_string(),
                schema: vec![],
                output: "database.ts".to_string(),
            }),
            datamodel: Some(sample_datamodel()),
            generator_version: "test".to_string(),
            plugin_options: vec![],
            global_options: vec![],
        }
    }

    #[test]
    fn test_run_with_io_success() {
        let mut input = Vec::new();
        let mut output = Vec::new();

        let request = create_sample_request();
        request.encode(&mut input).unwrap();

        let result = run_with_io(&input[..], &mut output, |req| {
            assert_eq!(req.generator_version, "test");
            process_request(req).map_err(Into::into)
        });
        assert!(result.is_ok(), "run_with_io should succeed");

        let response = GenerateResponse::decode(&output[..]).unwrap();
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].name, "database.ts");

        let contents = String::from_utf8(response.files[0].contents.clone()).unwrap();
        assert!(contents.contains("export type Database = {"));
        assert!(contents.contains("      User: {"));
    }

    #[test]
    fn test_run_with_io_processor_error() {
        let mut input = Vec::new();
        let mut output = Vec::new();

        let request = create_sample_request();
        request.encode(&mut input).unwrap();

        let result = run_with_io(&input[..], &mut output, |_req| {
            Err("Processing failed".into())
        });
        assert!(
            result.is_err(),
            "run_with_io should fail when processor fails"
        );
        assert_eq!(result.unwrap_err().to_string(), "Processing failed");
    }

    #[test]
    fn test_run_with_io_invalid_input() {
        let input = b"invalid protobuf data";
        let mut output = Vec::new();

        let result = run_with_io(&input[..], &mut output, |req| {
            process_request(req).map_err(Into::into)
        });
        assert!(
            result.is_err(),
            "run_with_io should fail with invalid input"
        );
    }

    #[test]
    fn test_missing_output_is_fatal_before_generation() {
        let mut request = create_sample_request();
        request.settings = None;
        assert!(matches!(
            process_request(request),
            Err(GenerateError::MissingOutput)
        ));

        let mut request = create_sample_request();
        request.settings = Some(Settings::default());
        assert!(matches!(
            process_request(request),
            Err(GenerateError::MissingOutput)
        ));
    }

    #[test]
    fn test_invalid_plugin_options() {
        let mut request = create_sample_request();
        request.plugin_options = b"not json".to_vec();
        assert!(matches!(
            process_request(request),
            Err(GenerateError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_documentation_option_disables_comments() {
        let mut datamodel = sample_datamodel();
        datamodel.models[0].documentation = vec!["Application users.".to_string()];

        let mut request = create_sample_request();
        request.datamodel = Some(datamodel.clone());
        let with_docs = process_request(request).unwrap();
        let text = String::from_utf8(with_docs.files[0].contents.clone()).unwrap();
        assert!(text.contains("/** Application users. */"));

        let mut request = create_sample_request();
        request.datamodel = Some(datamodel);
        request.plugin_options = br#"{"documentation": false}"#.to_vec();
        let without_docs = process_request(request).unwrap();
        let text = String::from_utf8(without_docs.files[0].contents.clone()).unwrap();
        assert!(!text.contains("/**"));
    }

    #[test]
    fn test_ddl_fallback_when_no_datamodel() {
        let mut request = create_sample_request();
        request.datamodel = None;
        request.settings = Some(Settings {
            engine: "postgresql".to_string(),
            schema: vec![
                "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);".to_string(),
            ],
            output: "database.ts".to_string(),
        });

        let response = process_request(request).unwrap();
        let contents = String::from_utf8(response.files[0].contents.clone()).unwrap();
        assert!(contents.contains("      users: {"));
        assert!(contents.contains("          email: string"));
    }

    #[test]
    fn test_ddl_parse_error_propagates() {
        let mut request = create_sample_request();
        request.datamodel = None;
        request.settings = Some(Settings {
            engine: "postgresql".to_string(),
            schema: vec!["CREATE TABLE (".to_string()],
            output: "database.ts".to_string(),
        });
        assert!(matches!(
            process_request(request),
            Err(GenerateError::Schema(_))
        ));
    }
}
