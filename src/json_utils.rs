use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all JSON object/array structures in the given text. Coordinates are byte indices.
///
/// Brackets inside string literals are ignored. Mismatched closers drop the
/// open frame, so prose like `(see [1})` never yields a node.
#[instrument(target = "quiz_forge::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                // quotes only matter inside a structure
                in_string = !stack.is_empty();
                None
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                None
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                None
            }
            b'}' => Some(NodeType::Object),
            b']' => Some(NodeType::Array),
            _ => None,
        };

        if let Some(kind) = closing {
            if let Some(frame) = stack.pop() {
                if frame.kind == kind {
                    let node = ObjCoords::new(frame.start, i, kind, frame.children);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => results.push(node),
                    }
                }
            }
        }
    }

    debug!(target: "quiz_forge::json", count = results.len(), "found root structures");
    results
}

/// Deserialize the first `T` found in a model response.
///
/// The whole (trimmed) text is tried first, then each root structure in
/// order. Nested children are not searched: a payload is expected at the top
/// level, possibly wrapped in prose or a code fence. On failure the error of
/// the first attempted candidate is returned.
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let first_err = match serde_json::from_str::<T>(text.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let roots = find_json_structures(text);
    let mut candidate_err = None;
    for node in &roots {
        match serde_json::from_str::<T>(node.slice(text)) {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(target: "quiz_forge::json", start = node.start, end = node.end, error = %e, "root structure rejected");
                candidate_err.get_or_insert(e);
            }
        }
    }

    Err(candidate_err.unwrap_or(first_err))
}
