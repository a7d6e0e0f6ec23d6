// crates/proto-mcp-gen/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Descriptor set files for generator tests.
// Purpose: Provide a small greeter service as serialized descriptor bytes.
// Dependencies: prost, prost-types, tempfile
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use prost::Message;
use prost_types::DescriptorProto;
use prost_types::FieldDescriptorProto;
use prost_types::FileDescriptorProto;
use prost_types::FileDescriptorSet;
use prost_types::MethodDescriptorProto;
use prost_types::ServiceDescriptorProto;
use prost_types::SourceCodeInfo;
use prost_types::field_descriptor_proto::Label;
use prost_types::field_descriptor_proto::Type;
use prost_types::source_code_info::Location;

fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::String as i32),
        json_name: Some(name.to_string()),
        ..FieldDescriptorProto::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..DescriptorProto::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        ..MethodDescriptorProto::default()
    }
}

/// Greeter service with one documented unary method and one stream.
pub fn greeter_set() -> FileDescriptorSet {
    let mut streaming = method("WatchHellos", ".demo.v1.HelloRequest", ".demo.v1.HelloReply");
    streaming.server_streaming = Some(true);
    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("demo/v1/greeter.proto".to_string()),
            package: Some("demo.v1".to_string()),
            syntax: Some("proto3".to_string()),
            message_type: vec![
                message("HelloRequest", vec![string_field("name", 1)]),
                message("HelloReply", vec![string_field("message", 1)]),
            ],
            service: vec![ServiceDescriptorProto {
                name: Some("Greeter".to_string()),
                method: vec![
                    method("SayHello", ".demo.v1.HelloRequest", ".demo.v1.HelloReply"),
                    streaming,
                ],
                ..ServiceDescriptorProto::default()
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![Location {
                    path: vec![6, 0, 2, 0],
                    span: vec![0, 0, 0],
                    leading_comments: Some(" Says \"hello\".\n".to_string()),
                    ..Location::default()
                }],
            }),
            ..FileDescriptorProto::default()
        }],
    }
}

/// Writes the greeter descriptor set into `dir` and returns its path.
pub fn write_greeter_set(dir: &Path) -> PathBuf {
    let path = dir.join("greeter.binpb");
    fs::write(&path, greeter_set().encode_to_vec()).expect("write descriptor set");
    path
}
