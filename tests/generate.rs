//! End-to-end generation tests: datamodel in, type description out.

use prost::Message;
use typegen_core::generate::{generate_types, GeneratorConfig};
use typegen_core::model::normalize;
use typegen_core::plugin::{
    Datamodel, EnumDecl, EnumValue, FieldDecl, FieldKind, GenerateRequest, GenerateResponse,
    Model, ScalarKind, Settings,
};
use typegen_core::runtime::{process_request, run_with_io};

fn scalar(name: &str, kind: ScalarKind, required: bool, default: bool) -> FieldDecl {
    FieldDecl {
        name: name.to_string(),
        kind: FieldKind::Scalar as i32,
        scalar: kind as i32,
        is_required: required,
        has_default: default,
        ..Default::default()
    }
}

/// A blog datamodel: Post belongs to User, User has an enum role and an
/// inverse relation back to Post.
fn blog_datamodel() -> Datamodel {
    Datamodel {
        models: vec![
            Model {
                name: "Post".to_string(),
                fields: vec![
                    scalar("id", ScalarKind::Text, true, true),
                    scalar("title", ScalarKind::Text, true, false),
                    scalar("content", ScalarKind::Text, false, false),
                    scalar("published", ScalarKind::Boolean, true, true),
                    scalar("authorId", ScalarKind::Text, true, false),
                    FieldDecl {
                        name: "author".to_string(),
                        kind: FieldKind::Relation as i32,
                        type_name: "User".to_string(),
                        relation_name: "PostToUser".to_string(),
                        relation_from: vec!["authorId".to_string()],
                        relation_to: vec!["id".to_string()],
                        is_required: true,
                        ..Default::default()
                    },
                ],
                documentation: vec![],
            },
            Model {
                name: "User".to_string(),
                fields: vec![
                    scalar("id", ScalarKind::Text, true, true),
                    scalar("email", ScalarKind::Text, true, false),
                    scalar("name", ScalarKind::Text, false, false),
                    FieldDecl {
                        name: "role".to_string(),
                        kind: FieldKind::Enum as i32,
                        type_name: "UserRole".to_string(),
                        is_required: true,
                        has_default: true,
                        ..Default::default()
                    },
                    // inverse side, no local foreign key
                    FieldDecl {
                        name: "posts".to_string(),
                        kind: FieldKind::Relation as i32,
                        type_name: "Post".to_string(),
                        relation_name: "PostToUser".to_string(),
                        is_list: true,
                        ..Default::default()
                    },
                ],
                documentation: vec![],
            },
        ],
        enums: vec![EnumDecl {
            name: "UserRole".to_string(),
            values: vec![
                EnumValue {
                    name: "USER".to_string(),
                    documentation: None,
                },
                EnumValue {
                    name: "ADMIN".to_string(),
                    documentation: None,
                },
            ],
            documentation: vec![],
        }],
        composite_types: vec![],
    }
}

#[test]
fn generates_expected_description_for_blog_model() {
    let schemas = normalize(&blog_datamodel());
    let output = generate_types(&schemas, &GeneratorConfig::default());

    let expected_body = r#"
export type Json = string | number | boolean | null | { [key: string]: Json | undefined } | Json[]

export type Database = {
  public: {
    Tables: {
      Post: {
        Row: {
          authorId: string;
          content: string | null;
          id: string;
          published: boolean;
          title: string
        }
        Insert: {
          authorId: string;
          content?: string | null;
          id?: string;
          published?: boolean;
          title: string
        }
        Update: {
          authorId?: string;
          content?: string | null;
          id?: string;
          published?: boolean;
          title?: string
        }
        Relationships: [
          {
            foreignKeyName: "PostToUser";
            columns: ["authorId"];
            isOneToOne: true;
            referencedRelation: "User";
            referencedColumns: ["id"]
          }
        ]
      };
      User: {
        Row: {
          email: string;
          id: string;
          name: string | null;
          role: Database['public']['Enums']['UserRole']
        }
        Insert: {
          email: string;
          id?: string;
          name?: string | null;
          role?: Database['public']['Enums']['UserRole']
        }
        Update: {
          email?: string;
          id?: string;
          name?: string | null;
          role?: Database['public']['Enums']['UserRole']
        }
        Relationships: [

        ]
      }
    }
    Views: {
      /* No support for views */
    }
    Functions: {
      /* No support for functions */
    }
    Enums: {
      UserRole: "USER" | "ADMIN"
    }
    CompositeTypes: {
      [_ in never]: never
    }
  }
}


"#;

    assert!(
        output.starts_with(expected_body),
        "unexpected body:\n{}",
        output
    );

    // the fixed accessor suite follows the schema mapping
    assert!(output.contains("type PublicSchema = Database[Extract<keyof Database, \"public\">]"));
    assert!(output.contains("export type Tables<"));
    assert!(output.contains("export type TablesInsert<"));
    assert!(output.contains("export type TablesUpdate<"));
    assert!(output.contains("export type Enums<"));
    assert!(output.contains("export type CompositeTypes<"));
    assert!(output.ends_with("    : never\n\n"));
}

#[test]
fn generation_is_deterministic_across_runs() {
    let datamodel = blog_datamodel();
    let first = generate_types(&normalize(&datamodel), &GeneratorConfig::default());
    let second = generate_types(&normalize(&datamodel), &GeneratorConfig::default());
    assert_eq!(first, second);
}

#[test]
fn table_order_is_alphabetical_regardless_of_input_order() {
    let mut datamodel = blog_datamodel();
    datamodel.models.reverse();

    let shuffled = generate_types(&normalize(&datamodel), &GeneratorConfig::default());
    let baseline = generate_types(&normalize(&blog_datamodel()), &GeneratorConfig::default());
    assert_eq!(shuffled, baseline);
}

#[test]
fn ddl_round_trip_through_the_plugin_protocol() {
    let ddl = r#"
        CREATE TYPE status AS ENUM ('draft', 'published');
        CREATE TABLE authors (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE articles (
            id BIGSERIAL PRIMARY KEY,
            author_id BIGINT NOT NULL,
            status status NOT NULL,
            body TEXT,
            CONSTRAINT articles_author_id_fkey FOREIGN KEY (author_id) REFERENCES authors (id)
        );
        COMMENT ON TABLE articles IS 'Published and draft articles.';
    "#;

    let request = GenerateRequest {
        settings: Some(Settings {
            engine: "postgresql".to_string(),
            schema: vec![ddl.to_string()],
            output: "database.ts".to_string(),
        }),
        datamodel: None,
        generator_version: "0.1.0".to_string(),
        plugin_options: vec![],
        global_options: vec![],
    };

    let mut input = Vec::new();
    request.encode(&mut input).unwrap();
    let mut output = Vec::new();

    run_with_io(&input[..], &mut output, |req| {
        process_request(req).map_err(Into::into)
    })
    .unwrap();

    let response = GenerateResponse::decode(&output[..]).unwrap();
    assert_eq!(response.files.len(), 1);
    assert_eq!(response.files[0].name, "database.ts");

    let text = String::from_utf8(response.files[0].contents.clone()).unwrap();
    assert!(text.contains("/** Published and draft articles. */"));
    assert!(text.contains("      articles: {"));
    assert!(text.contains("          status: Database['public']['Enums']['status']"));
    assert!(text.contains("          id?: number"));
    assert!(text.contains("            foreignKeyName: \"articles_author_id_fkey\";"));
    assert!(text.contains("            columns: [\"author_id\"];"));
    assert!(text.contains("            referencedRelation: \"authors\";"));
    assert!(text.contains("            referencedColumns: [\"id\"]"));
    assert!(text.contains("      status: \"draft\" | \"published\""));
}
