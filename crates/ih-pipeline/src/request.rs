//! Request parsing: object key plus ordered action chain.
//!
//! Two equivalent spellings are accepted:
//!
//! - query form: `/<key>?x-oss-process=image/resize,w_100/quality,q_50`
//! - path form: `/<key>/@image/resize,w_100/quality,q_50`
//!
//! In both, the chain is split on `/` into directives and each directive on
//! `,` into tokens. The first directive names the processor and must be
//! `image`. A `@` segment naming anything else is part of the key.

use std::collections::{BTreeMap, HashMap};

use percent_encoding::percent_decode_str;

use ih_core::{Error, Result};

use crate::processor::NAMESPACE;

/// Query parameter that carries the chain in query form.
pub const PROCESS_QUERY_KEY: &str = "x-oss-process";

/// Path segments starting with this marker begin the chain in path form.
pub const PATH_CHAIN_MARKER: char = '@';

/// One `/`-separated chain segment, split into its `,`-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDirective {
    raw: String,
    tokens: Vec<String>,
}

impl ActionDirective {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            tokens: raw.split(',').map(String::from).collect(),
        }
    }

    /// The first token: the action name.
    pub fn name(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// All tokens, name included.
    pub fn params(&self) -> Vec<&str> {
        self.tokens.iter().map(String::as_str).collect()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Empty directives and the namespace marker carry no transform.
    pub fn is_transform(&self) -> bool {
        let name = self.name();
        !name.is_empty() && name != NAMESPACE
    }
}

/// An object key and the directives to apply to it, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub object_key: String,
    pub actions: Vec<ActionDirective>,
    /// Query parameters other than the chain, for actions that read
    /// request-wide settings.
    pub query: BTreeMap<String, String>,
}

impl ParsedRequest {
    /// Request for `object_key` with `actions` and no extra query parameters.
    pub fn new(object_key: impl Into<String>, actions: Vec<ActionDirective>) -> Self {
        Self {
            object_key: object_key.into(),
            actions,
            query: BTreeMap::new(),
        }
    }

    /// Whether any directive asks for an actual transform.
    pub fn has_transforms(&self) -> bool {
        self.actions.iter().any(ActionDirective::is_transform)
    }
}

/// Parse a raw request path and its decoded query parameters.
///
/// # Errors
///
/// [`Error::MalformedRequest`] for undecodable paths, empty or escaping
/// keys, a chain given twice, or a chain for another processor.
pub fn parse_request(raw_path: &str, query: &HashMap<String, String>) -> Result<ParsedRequest> {
    let path = percent_decode_str(raw_path)
        .decode_utf8()
        .map_err(|_| Error::MalformedRequest("path is not valid UTF-8".into()))?;

    let mut key_segments = Vec::new();
    let mut path_chain: Option<Vec<&str>> = None;
    for segment in path.split('/') {
        match path_chain.as_mut() {
            Some(chain) => chain.push(segment),
            None => match segment.strip_prefix(PATH_CHAIN_MARKER) {
                Some(namespace) if namespace == NAMESPACE => path_chain = Some(vec![namespace]),
                _ => key_segments.push(segment),
            },
        }
    }

    let query_chain = query
        .get(PROCESS_QUERY_KEY)
        .map(String::as_str)
        .filter(|v| !v.is_empty());

    let chain: Vec<&str> = match (path_chain, query_chain) {
        (Some(_), Some(_)) => {
            return Err(Error::MalformedRequest(
                "action chain given in both path and query".into(),
            ))
        }
        (Some(chain), None) => chain,
        (None, Some(q)) => q.split('/').collect(),
        (None, None) => Vec::new(),
    };

    let object_key = object_key(&key_segments)?;
    let actions = directives(&chain)?;

    let query = query
        .iter()
        .filter(|(k, _)| k.as_str() != PROCESS_QUERY_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(ParsedRequest {
        object_key,
        actions,
        query,
    })
}

/// Parse a bare chain such as `image/resize,w_10/format,png`.
pub fn parse_chain(chain: &str) -> Result<Vec<ActionDirective>> {
    let segments: Vec<&str> = chain.split('/').collect();
    directives(&segments)
}

fn object_key(segments: &[&str]) -> Result<String> {
    let mut kept = Vec::with_capacity(segments.len());
    for &segment in segments {
        if segment == ".." {
            return Err(Error::MalformedRequest(
                "object key may not contain '..'".into(),
            ));
        }
        if !segment.is_empty() {
            kept.push(segment);
        }
    }
    if kept.is_empty() {
        return Err(Error::MalformedRequest("object key is empty".into()));
    }
    Ok(kept.join("/"))
}

fn directives(segments: &[&str]) -> Result<Vec<ActionDirective>> {
    let mut segments = segments.iter().copied().filter(|s| !s.is_empty());
    let Some(namespace) = segments.next() else {
        return Ok(Vec::new());
    };
    if namespace != NAMESPACE {
        return Err(Error::MalformedRequest(format!(
            "unsupported processor \"{namespace}\""
        )));
    }

    let mut actions = vec![ActionDirective::parse(namespace)];
    actions.extend(segments.map(ActionDirective::parse));
    Ok(actions)
}
