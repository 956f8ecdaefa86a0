//! # Object Codec
//!
//! Reads and writes [`Resource`] objects in their textual form.
//!
//! Input may be YAML or JSON: the first non-whitespace byte decides (`{` means JSON,
//! anything else is parsed as YAML). Output is always YAML, the canonical on-disk
//! encoding, or JSON when a caller asks for it explicitly.
//!
//! Every object that passes through [`decode`] or [`encode`] has its `apiVersion` and
//! `kind` overwritten with the canonical values for its [`Kind`], so identity metadata
//! stored in a file can never disagree with where the store found it.

use crate::error::{Result, ServingError};
use crate::model::{Kind, Resource, ResourceList, LIST_API_VERSION, LIST_KIND};
use serde::de::Error as _;
use serde::Deserialize;
use std::io::{Read, Write};

/// Force the canonical identity fields for `kind` onto `resource`.
pub fn stamp(resource: &mut Resource, kind: Kind) {
    resource.api_version = kind.api_version().to_string();
    resource.kind = kind.type_name().to_string();
}

pub fn stamp_list(list: &mut ResourceList, kind: Kind) {
    list.api_version = LIST_API_VERSION.to_string();
    list.kind = LIST_KIND.to_string();
    for item in &mut list.items {
        stamp(item, kind);
    }
}

fn looks_like_json(text: &str) -> bool {
    text.trim_start().starts_with('{')
}

fn invalid_document(msg: &str) -> ServingError {
    serde_yaml::Error::custom(msg).into()
}

/// Decode one object. Only the first document of a YAML stream is read, and an
/// object without `metadata.name` is rejected.
pub fn decode_str(text: &str, kind: Kind) -> Result<Resource> {
    if text.trim().is_empty() {
        return Err(invalid_document("empty document"));
    }
    let mut resource: Resource = if looks_like_json(text) {
        serde_json::from_str(text)?
    } else {
        let document = serde_yaml::Deserializer::from_str(text)
            .next()
            .ok_or_else(|| invalid_document("empty document"))?;
        Resource::deserialize(document)?
    };
    if resource.metadata.name.is_empty() {
        return Err(invalid_document("metadata.name is required"));
    }
    stamp(&mut resource, kind);
    Ok(resource)
}

pub fn decode<R: Read>(mut reader: R, kind: Kind) -> Result<Resource> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode_str(&text, kind)
}

/// Stamp a copy of `resource` and write it as YAML.
pub fn encode<W: Write>(resource: &Resource, kind: Kind, writer: W) -> Result<()> {
    let mut stamped = resource.clone();
    stamp(&mut stamped, kind);
    serde_yaml::to_writer(writer, &stamped)?;
    Ok(())
}

pub fn to_yaml(resource: &Resource) -> Result<String> {
    Ok(serde_yaml::to_string(resource)?)
}

pub fn to_json(resource: &Resource) -> Result<String> {
    Ok(serde_json::to_string_pretty(resource)?)
}

pub fn list_to_yaml(list: &ResourceList) -> Result<String> {
    Ok(serde_yaml::to_string(list)?)
}

pub fn list_to_json(list: &ResourceList) -> Result<String> {
    Ok(serde_json::to_string_pretty(list)?)
}
