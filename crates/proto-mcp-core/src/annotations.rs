// crates/proto-mcp-core/src/annotations.rs
// ============================================================================
// Module: Field Annotations
// Description: Bounded recovery of field-behavior annotations from option bytes.
// Purpose: Decide field inclusion and required-ness without extension schemas.
// Dependencies: prost, prost-reflect, tracing
// ============================================================================

//! ## Overview
//! Field-behavior annotations (`required`, `output-only`, ...) usually arrive
//! as extension fields the loaded descriptor pool does not know about, so they
//! survive only as raw bytes inside the field's options message. This module
//! walks those bytes as a sequence of `(tag, wire type)` entries and collects
//! the varint values carried under one wanted tag. When the pool does know the
//! extension and it is declared packed, re-encoded options carry the values as
//! one length-delimited run, which is unpacked the same way.
//!
//! The scanner is a small explicit state machine. Malformed input never
//! raises: the scan stops at the first entry it cannot resolve and returns
//! every value recovered before that point. Annotations are advisory, so a
//! damaged region must degrade schema generation, never block it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use prost::Message;
use prost::bytes::Buf;
use prost::encoding::WireType;
use prost::encoding::decode_key;
use prost::encoding::decode_varint;
use prost_reflect::FieldDescriptor;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Option field number carrying field-behavior annotations.
pub const FIELD_BEHAVIOR_FIELD_NUMBER: u32 = 1052;
/// Field-behavior value marking a field the caller must supply.
pub const FIELD_BEHAVIOR_REQUIRED: u64 = 2;
/// Field-behavior value marking a field only the server populates.
pub const FIELD_BEHAVIOR_OUTPUT_ONLY: u64 = 3;
/// Field-behavior value marking a field never echoed back in responses.
pub const FIELD_BEHAVIOR_INPUT_ONLY: u64 = 4;

// ============================================================================
// SECTION: Scanner
// ============================================================================

/// Outcome of scanning an annotation byte region.
///
/// # Invariants
/// - `values` preserves wire order of the matching entries.
/// - When `truncated_at` is set, `values` holds exactly the matches found before that offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Varint values recovered for the wanted tag.
    pub values: Vec<u64>,
    /// Byte offset of the entry that stopped the scan, when input was malformed.
    pub truncated_at: Option<usize>,
}

/// Scanner states over `(tag, wire type)` entries.
enum ScanState {
    /// Expecting an entry header at the cursor.
    Header {
        /// Offset of the header within the region.
        start: usize,
    },
    /// Header decoded; payload pending.
    Payload {
        /// Offset of the entry header.
        start: usize,
        /// Decoded tag number.
        number: u32,
        /// Decoded wire type.
        wire_type: WireType,
    },
    /// Region fully consumed.
    Done,
    /// Malformed entry at the given offset.
    Truncated {
        /// Offset of the entry header that could not be resolved.
        start: usize,
    },
}

/// Payload classification after consuming one entry body.
enum Payload<'a> {
    /// Variable-length integer value.
    Varint(u64),
    /// Length-delimited body; packed varints when the tag matches.
    Delimited(&'a [u8]),
    /// Fixed-width payload, skipped without interpretation.
    Skipped,
}

/// Scans `bytes` for varint values tagged `wanted`, plain or packed, reporting truncation.
#[must_use]
pub fn scan(bytes: &[u8], wanted: u32) -> Scan {
    let mut cursor = bytes;
    let mut values = Vec::new();
    let mut state = ScanState::Header {
        start: 0,
    };
    loop {
        state = match state {
            ScanState::Header {
                start,
            } => {
                if cursor.is_empty() {
                    ScanState::Done
                } else {
                    match decode_key(&mut cursor) {
                        Ok((number, wire_type)) => ScanState::Payload {
                            start,
                            number,
                            wire_type,
                        },
                        Err(_) => ScanState::Truncated {
                            start,
                        },
                    }
                }
            }
            ScanState::Payload {
                start,
                number,
                wire_type,
            } => match consume_payload(&mut cursor, wire_type) {
                Some(Payload::Varint(value)) => {
                    if number == wanted {
                        values.push(value);
                    }
                    ScanState::Header {
                        start: bytes.len() - cursor.len(),
                    }
                }
                Some(Payload::Delimited(body)) if number == wanted => {
                    match decode_packed(body) {
                        Some(packed) => {
                            values.extend(packed);
                            ScanState::Header {
                                start: bytes.len() - cursor.len(),
                            }
                        }
                        None => ScanState::Truncated {
                            start,
                        },
                    }
                }
                Some(Payload::Delimited(_) | Payload::Skipped) => ScanState::Header {
                    start: bytes.len() - cursor.len(),
                },
                None => ScanState::Truncated {
                    start,
                },
            },
            ScanState::Done => {
                return Scan {
                    values,
                    truncated_at: None,
                };
            }
            ScanState::Truncated {
                start,
            } => {
                return Scan {
                    values,
                    truncated_at: Some(start),
                };
            }
        };
    }
}

/// Returns the varint values carried under `wanted`, dropping truncation details.
#[must_use]
pub fn extract(bytes: &[u8], wanted: u32) -> Vec<u64> {
    scan(bytes, wanted).values
}

/// Consumes one payload according to its wire type.
///
/// Returns `None` when the payload is incomplete or the wire type is a group
/// marker, which this scanner does not descend into.
fn consume_payload<'a>(cursor: &mut &'a [u8], wire_type: WireType) -> Option<Payload<'a>> {
    match wire_type {
        WireType::Varint => decode_varint(cursor).ok().map(Payload::Varint),
        WireType::ThirtyTwoBit => skip_exact(cursor, 4),
        WireType::SixtyFourBit => skip_exact(cursor, 8),
        WireType::LengthDelimited => {
            let len = decode_varint(cursor).ok()?;
            let len = usize::try_from(len).ok()?;
            if cursor.len() < len {
                return None;
            }
            let (body, rest) = cursor.split_at(len);
            *cursor = rest;
            Some(Payload::Delimited(body))
        }
        WireType::StartGroup | WireType::EndGroup => None,
    }
}

/// Decodes a packed run of varints, or `None` when the run is cut short.
fn decode_packed(mut body: &[u8]) -> Option<Vec<u64>> {
    let mut values = Vec::new();
    while !body.is_empty() {
        values.push(decode_varint(&mut body).ok()?);
    }
    Some(values)
}

/// Advances the cursor by `len` bytes when that many remain.
fn skip_exact<'a>(cursor: &mut &'a [u8], len: usize) -> Option<Payload<'a>> {
    if cursor.remaining() < len {
        return None;
    }
    cursor.advance(len);
    Some(Payload::Skipped)
}

// ============================================================================
// SECTION: Field Annotations
// ============================================================================

/// Field-behavior annotations recovered for one field.
///
/// # Invariants
/// - Membership tests ignore ordering and multiplicity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAnnotations {
    /// Recovered field-behavior values in wire order.
    behaviors: Vec<u64>,
}

impl FieldAnnotations {
    /// Builds annotations from a raw option byte region.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            behaviors: extract(bytes, FIELD_BEHAVIOR_FIELD_NUMBER),
        }
    }

    /// Recovers annotations from a field's options, including unrecognized entries.
    #[must_use]
    pub fn from_field(field: &FieldDescriptor) -> Self {
        let bytes = field.options().encode_to_vec();
        let scan = scan(&bytes, FIELD_BEHAVIOR_FIELD_NUMBER);
        if let Some(offset) = scan.truncated_at {
            warn!(
                field = field.full_name(),
                offset,
                recovered = scan.values.len(),
                "field annotation bytes truncated"
            );
        }
        Self {
            behaviors: scan.values,
        }
    }

    /// Returns the recovered values in wire order.
    #[must_use]
    pub fn behaviors(&self) -> &[u64] {
        &self.behaviors
    }

    /// Returns true when `behavior` was recovered at least once.
    #[must_use]
    pub fn contains(&self, behavior: u64) -> bool {
        self.behaviors.contains(&behavior)
    }

    /// Returns true when the field is annotated required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.contains(FIELD_BEHAVIOR_REQUIRED)
    }

    /// Returns true when the field is annotated output-only.
    #[must_use]
    pub fn is_output_only(&self) -> bool {
        self.contains(FIELD_BEHAVIOR_OUTPUT_ONLY)
    }

    /// Returns true when the field is annotated input-only.
    #[must_use]
    pub fn is_input_only(&self) -> bool {
        self.contains(FIELD_BEHAVIOR_INPUT_ONLY)
    }
}

/// Returns true when `field` carries the required annotation.
#[must_use]
pub fn is_required(field: &FieldDescriptor) -> bool {
    FieldAnnotations::from_field(field).is_required()
}

/// Returns true when `field` carries the output-only annotation.
#[must_use]
pub fn is_output_only(field: &FieldDescriptor) -> bool {
    FieldAnnotations::from_field(field).is_output_only()
}
