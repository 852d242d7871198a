//! # Wire Records
//!
//! One record per line, each a JSON object tagged by `type`:
//!
//! ```text
//! {"type":"settings","props":{...}}
//! {"type":"vertex","id":<int|string>,"props":{...}}
//! {"type":"edge","source":<id>,"target":<id>,"props":{...}}
//! {"type":"frame","duration":<non-negative int>,"props":{...}}
//! ```
//!
//! `props` is optional everywhere. Frames only occur in animation streams.

use crate::error::{LoadErrorKind, Result};
use crate::id::VertexId;
use crate::value::{Props, props_from_json, props_to_json};
use serde::Serialize;
use serde_json::{Map, Value as Json};

/// A decoded wire record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Settings {
        props: Option<Props>,
    },
    Vertex {
        id: VertexId,
        props: Option<Props>,
    },
    Edge {
        source: VertexId,
        target: VertexId,
        props: Option<Props>,
    },
    Frame {
        duration: u64,
        props: Option<Props>,
    },
}

/// Which end of an edge record is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

/// Borrowed encoding view, so that field order on the wire is fixed.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireRecord<'a> {
    Settings {
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<Map<String, Json>>,
    },
    Vertex {
        id: &'a VertexId,
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<Map<String, Json>>,
    },
    Edge {
        source: &'a VertexId,
        target: &'a VertexId,
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<Map<String, Json>>,
    },
    Frame {
        duration: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<Map<String, Json>>,
    },
}

impl Record {
    /// Record type tag as written on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Settings { .. } => "settings",
            Record::Vertex { .. } => "vertex",
            Record::Edge { .. } => "edge",
            Record::Frame { .. } => "frame",
        }
    }

    #[must_use]
    pub fn props(&self) -> Option<&Props> {
        match self {
            Record::Settings { props }
            | Record::Vertex { props, .. }
            | Record::Edge { props, .. }
            | Record::Frame { props, .. } => props.as_ref(),
        }
    }

    /// Decode a single line.
    pub fn decode(line: &str) -> std::result::Result<Self, LoadErrorKind> {
        Self::decode_with(line, |_, _| Ok(()))
    }

    /// Decode a single line, handing each edge endpoint to `check` as soon
    /// as it is read. The source is read and checked before the target.
    pub fn decode_with<F>(line: &str, mut check: F) -> std::result::Result<Self, LoadErrorKind>
    where
        F: FnMut(Endpoint, &VertexId) -> std::result::Result<(), LoadErrorKind>,
    {
        let json: Json =
            serde_json::from_str(line).map_err(|e| LoadErrorKind::Json(e.to_string()))?;
        let Json::Object(mut data) = json else {
            return Err(LoadErrorKind::NotAnObject);
        };

        let props = match data.remove("props") {
            None | Some(Json::Null) => None,
            Some(Json::Object(map)) => Some(props_from_json(map)),
            Some(_) => return Err(LoadErrorKind::InvalidProps),
        };

        match data.get("type") {
            Some(Json::String(kind)) => match kind.as_str() {
                "settings" => Ok(Record::Settings { props }),
                "vertex" => Ok(Record::Vertex {
                    id: take_id(&mut data, "id")?,
                    props,
                }),
                "edge" => {
                    let source = take_id(&mut data, "source")?;
                    check(Endpoint::Source, &source)?;
                    let target = take_id(&mut data, "target")?;
                    check(Endpoint::Target, &target)?;
                    Ok(Record::Edge {
                        source,
                        target,
                        props,
                    })
                }
                "frame" => Ok(Record::Frame {
                    duration: take_count(&mut data, "duration")?,
                    props,
                }),
                other => Err(LoadErrorKind::UnknownType(other.to_string())),
            },
            Some(other) => Err(LoadErrorKind::UnknownType(other.to_string())),
            None => Err(LoadErrorKind::MissingField("type")),
        }
    }

    /// Encode as one line including the trailing newline.
    ///
    /// Null-valued props are left out; an empty `props` object is not
    /// written at all.
    pub fn encode(&self) -> Result<String> {
        let props = match self.props() {
            Some(props) => {
                let map = props_to_json(props)?;
                (!map.is_empty()).then_some(map)
            }
            None => None,
        };
        let wire = match self {
            Record::Settings { .. } => WireRecord::Settings { props },
            Record::Vertex { id, .. } => WireRecord::Vertex { id, props },
            Record::Edge { source, target, .. } => WireRecord::Edge {
                source,
                target,
                props,
            },
            Record::Frame { duration, .. } => WireRecord::Frame {
                duration: *duration,
                props,
            },
        };
        let mut line = serde_json::to_string(&wire)?;
        line.push('\n');
        Ok(line)
    }
}

fn take_id(
    data: &mut Map<String, Json>,
    key: &'static str,
) -> std::result::Result<VertexId, LoadErrorKind> {
    match data.remove(key) {
        Some(Json::Number(n)) => n
            .as_i64()
            .map(VertexId::Int)
            .ok_or(LoadErrorKind::InvalidId(key)),
        Some(Json::String(s)) => Ok(VertexId::Str(s)),
        Some(_) => Err(LoadErrorKind::InvalidId(key)),
        None => Err(LoadErrorKind::MissingField(key)),
    }
}

fn take_count(
    data: &mut Map<String, Json>,
    key: &'static str,
) -> std::result::Result<u64, LoadErrorKind> {
    match data.remove(key) {
        Some(Json::Number(n)) => n.as_u64().ok_or(LoadErrorKind::InvalidCount(key)),
        Some(_) => Err(LoadErrorKind::InvalidCount(key)),
        None => Err(LoadErrorKind::MissingField(key)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
