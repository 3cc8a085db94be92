//! `$batch` support using the OData V4 multipart/mixed encoding.
//!
//! A [`BatchRequest`] collects independent entity-set queries. Each query is
//! encoded as one `application/http` part holding a `GET` request line with
//! an absolute URL. The response envelope is split back into one
//! [`PartResponse`] per request, in submission order, and each part is
//! materialized on its own: a failed part never affects its siblings.

use std::marker::PhantomData;

use url::Url;

use crate::query::{EntitySetQuery, Query};
use crate::types::{Collection, EntitySet};
use crate::Error;

struct BatchPart {
    entity_set: &'static str,
    resource: String,
    options: Vec<(&'static str, String)>,
}

/// Ordered set of queries sent in one `$batch` round-trip.
#[derive(Default)]
pub struct BatchRequest {
    parts: Vec<BatchPart>,
}

/// Typed handle to one query's position in a batch.
pub struct BatchSlot<E> {
    index: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for BatchSlot<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for BatchSlot<E> {}

impl<E> BatchSlot<E> {
    /// Zero-based position of the query in the batch.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl BatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query and returns the handle used to read its result.
    pub fn add<E: EntitySet>(&mut self, query: &EntitySetQuery<E>) -> BatchSlot<E> {
        self.parts.push(BatchPart {
            entity_set: E::NAME,
            resource: query.resource_path(),
            options: query.query_options(),
        });
        BatchSlot {
            index: self.parts.len() - 1,
            _entity: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn entity_sets(&self) -> Vec<&'static str> {
        self.parts.iter().map(|p| p.entity_set).collect()
    }

    /// Encodes the multipart body. `root` must end with a slash.
    pub(crate) fn encode(&self, root: &Url, boundary: &str) -> Result<String, Error> {
        let mut body = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            let mut url = root
                .join(&part.resource)
                .map_err(|e| Error::InvalidUrl(e.to_string()))?;
            if !part.options.is_empty() {
                url.query_pairs_mut().extend_pairs(part.options.iter());
            }
            body.push_str(&format!("--{}\r\n", boundary));
            body.push_str("Content-Type: application/http\r\n");
            body.push_str("Content-Transfer-Encoding: binary\r\n");
            body.push_str(&format!("Content-ID: {}\r\n\r\n", i + 1));
            body.push_str(&format!("GET {} HTTP/1.1\r\n", url));
            body.push_str("Accept: application/json\r\n\r\n\r\n");
        }
        body.push_str(&format!("--{}--\r\n", boundary));
        Ok(body)
    }
}

pub(crate) fn new_boundary() -> String {
    format!("batch_{:032x}", rand::random::<u128>())
}

/// One demultiplexed response from a batch envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct PartResponse {
    pub status: u16,
    pub body: String,
}

impl PartResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Per-query responses of a batch, in submission order.
#[derive(Debug, Default)]
pub struct BatchResponse {
    parts: Vec<PartResponse>,
    entity_sets: Vec<&'static str>,
}

impl BatchResponse {
    pub(crate) fn new(parts: Vec<PartResponse>, entity_sets: Vec<&'static str>) -> Self {
        Self { parts, entity_sets }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[PartResponse] {
        &self.parts
    }

    /// Entity set each part was addressed to, in submission order.
    pub fn entity_sets(&self) -> &[&'static str] {
        &self.entity_sets
    }

    /// Materializes the entities of one part.
    ///
    /// Only the first page of the part is returned; a batch does not follow
    /// `@odata.nextLink`.
    pub fn take<E: EntitySet>(&self, slot: BatchSlot<E>) -> Result<Vec<E>, Error> {
        let part = self.parts.get(slot.index).ok_or_else(|| {
            Error::Deserialization(format!("batch response has no part {}", slot.index))
        })?;
        if !part.is_success() {
            tracing::error!(
                "Batch part {} ({}) failed with status {}",
                slot.index,
                E::NAME,
                part.status
            );
            return Err(Error::HttpStatus {
                status: part.status,
                body: part.body.clone(),
            });
        }
        let collection: Collection<E> = serde_json::from_str(&part.body).map_err(|e| {
            tracing::error!("Failed to parse batch part {} ({}): {}", slot.index, E::NAME, e);
            Error::Deserialization(e.to_string())
        })?;
        Ok(collection.value)
    }
}

/// Splits a multipart/mixed batch envelope into its part responses.
pub(crate) fn decode(content_type: &str, body: &str) -> Result<Vec<PartResponse>, Error> {
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|e| Error::Deserialization(format!("bad batch content type {:?}: {}", content_type, e)))?;
    if mime.type_() != mime::MULTIPART {
        return Err(Error::Deserialization(format!(
            "expected a multipart batch response, got {}",
            mime
        )));
    }
    let boundary = mime
        .get_param(mime::BOUNDARY)
        .ok_or_else(|| Error::Deserialization("batch response has no boundary".to_string()))?;
    let delimiter = format!("--{}", boundary.as_str());

    let mut parts = Vec::new();
    for section in body.split(delimiter.as_str()).skip(1) {
        if section.starts_with("--") {
            break;
        }
        parts.push(decode_part(section)?);
    }
    Ok(parts)
}

fn decode_part(section: &str) -> Result<PartResponse, Error> {
    let malformed = || Error::Deserialization("malformed batch part".to_string());
    let section = section
        .strip_prefix("\r\n")
        .or_else(|| section.strip_prefix('\n'))
        .unwrap_or(section);
    // MIME part headers, then the embedded HTTP response
    let (_, http) = split_head(section).ok_or_else(malformed)?;
    let (head, body) = split_head(http).ok_or_else(malformed)?;
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    Ok(PartResponse {
        status,
        body: body.trim_end_matches(['\r', '\n']).to_string(),
    })
}

fn split_head(s: &str) -> Option<(&str, &str)> {
    if let Some(pos) = s.find("\r\n\r\n") {
        return Some((&s[..pos], &s[pos + 4..]));
    }
    s.find("\n\n").map(|pos| (&s[..pos], &s[pos + 2..]))
}
