// crates/proto-mcp-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Descriptor pool fixtures with raw field-option bytes.
// Purpose: Exercise annotation regions exactly as protoc writes them.
// Dependencies: prost, prost-reflect, prost-types
// ============================================================================

//! ## Overview
//! `prost-types` drops unknown option fields on encode, so annotated fields
//! are spliced by hand: each field is encoded without options and the
//! options entry (tag 8) is appended carrying raw `1052` varints. Messages and
//! files are assembled the same way so the bytes reach
//! [`DescriptorPool::decode`] untouched.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use prost::Message;
use prost::encoding::WireType;
use prost::encoding::encode_key;
use prost::encoding::encode_varint;
use prost_reflect::DescriptorPool;
use prost_reflect::MessageDescriptor;
use prost_types::DescriptorProto;
use prost_types::EnumDescriptorProto;
use prost_types::EnumValueDescriptorProto;
use prost_types::FieldDescriptorProto;
use prost_types::FieldOptions;
use prost_types::FileDescriptorProto;
use prost_types::MessageOptions;
use prost_types::MethodDescriptorProto;
use prost_types::ServiceDescriptorProto;
use prost_types::SourceCodeInfo;
use prost_types::field_descriptor_proto::Label;
use prost_types::field_descriptor_proto::Type;
use prost_types::source_code_info::Location;
use proto_mcp_core::annotations::FIELD_BEHAVIOR_FIELD_NUMBER;
use proto_mcp_core::annotations::FIELD_BEHAVIOR_INPUT_ONLY;
use proto_mcp_core::annotations::FIELD_BEHAVIOR_OUTPUT_ONLY;
use proto_mcp_core::annotations::FIELD_BEHAVIOR_REQUIRED;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// One field plus the field-behavior values spliced into its options.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    proto: FieldDescriptorProto,
    behaviors: Vec<u64>,
}

impl FieldSpec {
    fn new(name: &str, number: i32, kind: Type, type_name: Option<&str>) -> Self {
        Self {
            proto: FieldDescriptorProto {
                name: Some(name.to_string()),
                number: Some(number),
                label: Some(Label::Optional as i32),
                r#type: Some(kind as i32),
                type_name: type_name.map(str::to_string),
                json_name: Some(json_name(name)),
                ..FieldDescriptorProto::default()
            },
            behaviors: Vec::new(),
        }
    }

    pub fn repeated(mut self) -> Self {
        self.proto.label = Some(Label::Repeated as i32);
        self
    }

    pub fn required(self) -> Self {
        self.behavior(FIELD_BEHAVIOR_REQUIRED)
    }

    pub fn output_only(self) -> Self {
        self.behavior(FIELD_BEHAVIOR_OUTPUT_ONLY)
    }

    pub fn input_only(self) -> Self {
        self.behavior(FIELD_BEHAVIOR_INPUT_ONLY)
    }

    pub fn behavior(mut self, value: u64) -> Self {
        self.behaviors.push(value);
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.proto.encode_to_vec();
        if !self.behaviors.is_empty() {
            let mut options = Vec::new();
            for value in &self.behaviors {
                encode_key(FIELD_BEHAVIOR_FIELD_NUMBER, WireType::Varint, &mut options);
                encode_varint(*value, &mut options);
            }
            append_bytes(&mut bytes, 8, &options);
        }
        bytes
    }
}

pub fn scalar(name: &str, number: i32, kind: Type) -> FieldSpec {
    FieldSpec::new(name, number, kind, None)
}

pub fn message_field(name: &str, number: i32, type_name: &str) -> FieldSpec {
    FieldSpec::new(name, number, Type::Message, Some(type_name))
}

pub fn enum_field(name: &str, number: i32, type_name: &str) -> FieldSpec {
    FieldSpec::new(name, number, Type::Enum, Some(type_name))
}

/// A message with spliced fields and nested messages.
#[derive(Debug, Clone)]
pub struct MessageSpec {
    proto: DescriptorProto,
    fields: Vec<FieldSpec>,
    nested: Vec<MessageSpec>,
}

impl MessageSpec {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn nested(mut self, nested: MessageSpec) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn enum_type(mut self, descriptor: EnumDescriptorProto) -> Self {
        self.proto.enum_type.push(descriptor);
        self
    }

    /// Adds `map<key, value>` named `name`, with its synthetic entry type.
    ///
    /// `scope` is the fully-qualified name of this message.
    pub fn map(mut self, scope: &str, name: &str, number: i32, key: Type, value: FieldSpec) -> Self {
        let entry_name = format!("{}Entry", pascal_case(name));
        let mut value = value;
        value.proto.name = Some("value".to_string());
        value.proto.number = Some(2);
        value.proto.json_name = Some("value".to_string());
        let mut entry = message(&entry_name).field(scalar("key", 1, key)).field(value);
        entry.proto.options = Some(MessageOptions {
            map_entry: Some(true),
            ..MessageOptions::default()
        });
        self.nested.push(entry);
        let type_name = format!(".{scope}.{entry_name}");
        self.fields.push(message_field(name, number, &type_name).repeated());
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.proto.encode_to_vec();
        for field in &self.fields {
            append_bytes(&mut bytes, 2, &field.encode());
        }
        for nested in &self.nested {
            append_bytes(&mut bytes, 3, &nested.encode());
        }
        bytes
    }
}

pub fn message(name: &str) -> MessageSpec {
    MessageSpec {
        proto: DescriptorProto {
            name: Some(name.to_string()),
            ..DescriptorProto::default()
        },
        fields: Vec::new(),
        nested: Vec::new(),
    }
}

pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .map(|(value_name, number)| EnumValueDescriptorProto {
                name: Some((*value_name).to_string()),
                number: Some(*number),
                ..EnumValueDescriptorProto::default()
            })
            .collect(),
        ..EnumDescriptorProto::default()
    }
}

pub fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        ..MethodDescriptorProto::default()
    }
}

pub fn server_streaming(mut method: MethodDescriptorProto) -> MethodDescriptorProto {
    method.server_streaming = Some(true);
    method
}

pub fn service(name: &str, methods: Vec<MethodDescriptorProto>) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method: methods,
        ..ServiceDescriptorProto::default()
    }
}

/// A proto3 file with spliced messages.
#[derive(Debug, Clone)]
pub struct FileSpec {
    proto: FileDescriptorProto,
    messages: Vec<MessageSpec>,
}

impl FileSpec {
    pub fn dependency(mut self, name: &str) -> Self {
        self.proto.dependency.push(name.to_string());
        self
    }

    pub fn message(mut self, message: MessageSpec) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enum_type(mut self, descriptor: EnumDescriptorProto) -> Self {
        self.proto.enum_type.push(descriptor);
        self
    }

    pub fn service(mut self, service: ServiceDescriptorProto) -> Self {
        self.proto.service.push(service);
        self
    }

    pub fn extension(mut self, field: FieldDescriptorProto) -> Self {
        self.proto.extension.push(field);
        self
    }

    pub fn syntax(mut self, syntax: &str) -> Self {
        self.proto.syntax = Some(syntax.to_string());
        self
    }

    /// Attaches a leading comment at a descriptor path.
    pub fn comment(mut self, path: &[i32], text: &str) -> Self {
        let info = self.proto.source_code_info.get_or_insert_with(SourceCodeInfo::default);
        info.location.push(Location {
            path: path.to_vec(),
            span: vec![0, 0, 0],
            leading_comments: Some(text.to_string()),
            ..Location::default()
        });
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.proto.encode_to_vec();
        for message in &self.messages {
            append_bytes(&mut bytes, 4, &message.encode());
        }
        bytes
    }
}

pub fn file(name: &str, package: &str) -> FileSpec {
    FileSpec {
        proto: FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            syntax: Some("proto3".to_string()),
            ..FileDescriptorProto::default()
        },
        messages: Vec::new(),
    }
}

/// Encodes files into a serialized `FileDescriptorSet`.
pub fn descriptor_set_bytes(files: &[FileSpec]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for spec in files {
        append_bytes(&mut bytes, 1, &spec.encode());
    }
    bytes
}

pub fn pool(files: &[FileSpec]) -> DescriptorPool {
    DescriptorPool::decode(descriptor_set_bytes(files).as_slice()).expect("fixture descriptor set")
}

/// Decodes `files` into a pool that also carries `google/protobuf/descriptor.proto`,
/// so option extensions declared by the fixtures are resolved on load.
pub fn pool_with_descriptor_proto(files: &[FileSpec]) -> DescriptorPool {
    let descriptor_proto = DescriptorPool::global()
        .get_file_by_name("google/protobuf/descriptor.proto")
        .expect("descriptor.proto in global pool")
        .file_descriptor_proto()
        .encode_to_vec();
    let mut bytes = Vec::new();
    append_bytes(&mut bytes, 1, &descriptor_proto);
    bytes.extend(descriptor_set_bytes(files));
    DescriptorPool::decode(bytes.as_slice()).expect("fixture descriptor set")
}

fn append_bytes(buf: &mut Vec<u8>, tag: u32, payload: &[u8]) {
    encode_key(tag, WireType::LengthDelimited, buf);
    encode_varint(u64::try_from(payload.len()).expect("payload length"), buf);
    buf.extend_from_slice(payload);
}

fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn pascal_case(name: &str) -> String {
    let camel = json_name(name);
    let mut chars = camel.chars();
    chars.next().map_or_else(String::new, |first| first.to_ascii_uppercase().to_string() + chars.as_str())
}

// ============================================================================
// SECTION: Sample Descriptors
// ============================================================================

/// Minimal well-known type declarations under their canonical names.
pub fn well_known_file() -> FileSpec {
    file("google/protobuf/well_known.proto", "google.protobuf")
        .message(
            message("Timestamp")
                .field(scalar("seconds", 1, Type::Int64))
                .field(scalar("nanos", 2, Type::Int32)),
        )
        .message(
            message("Duration")
                .field(scalar("seconds", 1, Type::Int64))
                .field(scalar("nanos", 2, Type::Int32)),
        )
        .message(message("Empty"))
        .message(message("StringValue").field(scalar("value", 1, Type::String)))
        .message(message("Int64Value").field(scalar("value", 1, Type::Int64)))
}

/// `google/api/field_behavior.proto` with the extension declared packed, as
/// older copies of the file do.
pub fn packed_field_behavior_file() -> FileSpec {
    file("google/api/field_behavior.proto", "google.api")
        .syntax("proto2")
        .dependency("google/protobuf/descriptor.proto")
        .enum_type(enumeration("FieldBehavior", &[
            ("FIELD_BEHAVIOR_UNSPECIFIED", 0),
            ("OPTIONAL", 1),
            ("REQUIRED", 2),
            ("OUTPUT_ONLY", 3),
            ("INPUT_ONLY", 4),
        ]))
        .extension(FieldDescriptorProto {
            name: Some("field_behavior".to_string()),
            number: Some(1052),
            label: Some(Label::Repeated as i32),
            r#type: Some(Type::Enum as i32),
            type_name: Some(".google.api.FieldBehavior".to_string()),
            extendee: Some(".google.protobuf.FieldOptions".to_string()),
            json_name: Some("fieldBehavior".to_string()),
            options: Some(FieldOptions {
                packed: Some(true),
                ..FieldOptions::default()
            }),
            ..FieldDescriptorProto::default()
        })
}

/// The `demo.v1` package used across the integration tests.
///
/// Message indexes (for comment paths): 0 `Person`, 1 `HelloRequest`,
/// 2 `HelloReply`, 3 `Node`, 4 `Tree`, 5 `Ping`, 6 `Pong`, 7 `Outer`,
/// 8 `Stamped`. Service 0 `Greeter` has methods `SayHello`, `ListHellos`,
/// `GetTree`, `Ping`.
pub fn demo_file() -> FileSpec {
    file("demo/v1/demo.proto", "demo.v1")
        .dependency("google/protobuf/well_known.proto")
        .enum_type(enumeration("Color", &[
            ("COLOR_UNSPECIFIED", 0),
            ("COLOR_RED", 1),
            ("COLOR_LIGHT_BLUE", 2),
        ]))
        .enum_type(enumeration("Placeholder", &[("PLACEHOLDER_UNSPECIFIED", 0)]))
        .message(message("Person").field(scalar("name", 1, Type::String)))
        .message(
            message("HelloRequest")
                .field(scalar("name", 1, Type::String).required())
                .field(scalar("id", 2, Type::String).output_only())
                .field(enum_field("color", 3, ".demo.v1.Color"))
                .map("demo.v1.HelloRequest", "labels", 4, Type::String, scalar("value", 2, Type::String))
                .field(message_field("send_time", 5, ".google.protobuf.Timestamp"))
                .field(scalar("tags", 6, Type::String).repeated())
                .field(enum_field("placeholder", 7, ".demo.v1.Placeholder"))
                .field(scalar("secret", 8, Type::String).input_only())
                .field(scalar("retry_count", 9, Type::Int32).required()),
        )
        .message(
            message("HelloReply")
                .field(scalar("message", 1, Type::String))
                .field(scalar("id", 2, Type::String).output_only())
                .field(scalar("secret", 3, Type::String).input_only())
                .field(scalar("total", 4, Type::Int64)),
        )
        .message(
            message("Node")
                .field(scalar("value", 1, Type::String))
                .field(message_field("next", 2, ".demo.v1.Node")),
        )
        .message(
            message("Tree")
                .field(message_field("left", 1, ".demo.v1.Node"))
                .field(message_field("right", 2, ".demo.v1.Node")),
        )
        .message(message("Ping").field(message_field("pong", 1, ".demo.v1.Pong")))
        .message(message("Pong").field(message_field("ping", 1, ".demo.v1.Ping")))
        .message(
            message("Outer")
                .nested(message("Inner").field(enum_field("color", 1, ".demo.v1.Color")))
                .field(message_field("inner", 1, ".demo.v1.Outer.Inner"))
                .field(message_field("items", 2, ".demo.v1.Outer.Inner").repeated())
                .map(
                    "demo.v1.Outer",
                    "by_key",
                    3,
                    Type::String,
                    message_field("value", 2, ".demo.v1.Outer.Inner"),
                )
                .field(enum_field("colors", 4, ".demo.v1.Color").repeated()),
        )
        .message(
            message("Stamped")
                .field(message_field("at", 1, ".google.protobuf.Timestamp"))
                .field(message_field("nickname", 2, ".google.protobuf.StringValue"))
                .field(message_field("nothing", 3, ".google.protobuf.Empty")),
        )
        .service(service("Greeter", vec![
            method("SayHello", ".demo.v1.HelloRequest", ".demo.v1.HelloReply"),
            server_streaming(method(
                "ListHellos",
                ".demo.v1.HelloRequest",
                ".demo.v1.HelloReply",
            )),
            method("GetTree", ".demo.v1.Tree", ".demo.v1.Tree"),
            method("Ping", ".google.protobuf.Empty", ".google.protobuf.Empty"),
        ]))
        .comment(&[4, 1, 2, 0], " The caller's\n display name.\n")
        .comment(&[6, 0, 2, 0], " Sends a greeting.\n")
}

/// Pool holding the demo package and its well-known dependencies.
pub fn demo_pool() -> DescriptorPool {
    pool(&[well_known_file(), demo_file()])
}

pub fn demo_message(name: &str) -> MessageDescriptor {
    demo_pool()
        .get_message_by_name(&format!("demo.v1.{name}"))
        .unwrap_or_else(|| panic!("missing fixture message {name}"))
}
