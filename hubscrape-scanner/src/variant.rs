//! Metadata containers embedded in model detail pages.
//!
//! The hub renders model metadata as JSON inside the `data-props` attribute of
//! a `div[data-target=...]` element. Two markup generations are known:
//!
//! * **Model header**: a `ModelHeaderActions` container whose payload carries a
//!   full `model` object (`author`, `id`, `likes`, `tag_objs`, ...).
//! * **Like button**: a `LikeButton` container with `repoId` and `likes`, with
//!   the tags in a separate `ModelHeaderTags` container.

use crate::record::{FieldValue, ModelRecord};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fmt;
use tracing::debug;

pub const MODEL_HEADER_ACTIONS: &str = "ModelHeaderActions";
pub const LIKE_BUTTON: &str = "LikeButton";
pub const MODEL_HEADER_TAGS: &str = "ModelHeaderTags";

/// Scalars copied verbatim from a `model` object.
const MODEL_SCALAR_FIELDS: [&str; 5] = ["author", "id", "cardExists", "lastModified", "likes"];

const PIPELINE_TAG: &str = "pipeline_tag";
const SUB_TYPE: &str = "subType";

/// Which markup generation a detail page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVariant {
    ModelHeader,
    LikeButton,
}

impl PageVariant {
    /// Picks the variant by which container is present, preferring the newer
    /// markup when both are.
    pub fn detect(document: &Html) -> Option<Self> {
        if find_container(document, MODEL_HEADER_ACTIONS).is_some() {
            Some(PageVariant::ModelHeader)
        } else if find_container(document, LIKE_BUTTON).is_some()
            || find_container(document, MODEL_HEADER_TAGS).is_some()
        {
            Some(PageVariant::LikeButton)
        } else {
            None
        }
    }

    fn apply(self, document: &Html, extraction: &mut PageExtraction) {
        match self {
            PageVariant::ModelHeader => {
                if let Some(payload) = extraction.payload(document, MODEL_HEADER_ACTIONS) {
                    match payload.get("model") {
                        Some(model) => apply_model_object(model, &mut extraction.record),
                        None => debug!("{} payload has no model object", MODEL_HEADER_ACTIONS),
                    }
                }
            }
            PageVariant::LikeButton => {
                if let Some(payload) = extraction.payload(document, LIKE_BUTTON) {
                    apply_like_button(&payload, &mut extraction.record);
                }
                if let Some(payload) = extraction.payload(document, MODEL_HEADER_TAGS) {
                    // Some pages carry the whole model object here instead of a bare tag list.
                    match payload.get("model") {
                        Some(model) => apply_model_object(model, &mut extraction.record),
                        None => apply_tags(&payload, &mut extraction.record),
                    }
                }
            }
        }
    }
}

impl fmt::Display for PageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageVariant::ModelHeader => f.write_str(MODEL_HEADER_ACTIONS),
            PageVariant::LikeButton => f.write_str(LIKE_BUTTON),
        }
    }
}

/// Something that kept a detail page from yielding all of its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractIssue {
    /// None of the known containers exist on the page.
    NoContainer,
    MissingContainer { container: &'static str },
    MissingPayload { container: &'static str },
    MalformedPayload {
        container: &'static str,
        reason: String,
    },
}

impl fmt::Display for ExtractIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractIssue::NoContainer => write!(
                f,
                "no metadata container found (looked for {}, {}, {})",
                MODEL_HEADER_ACTIONS, LIKE_BUTTON, MODEL_HEADER_TAGS
            ),
            ExtractIssue::MissingContainer { container } => {
                write!(f, "missing {} container", container)
            }
            ExtractIssue::MissingPayload { container } => {
                write!(f, "{} container has no data-props attribute", container)
            }
            ExtractIssue::MalformedPayload { container, reason } => {
                write!(f, "malformed {} payload: {}", container, reason)
            }
        }
    }
}

/// The record pulled out of one page together with whatever went wrong.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub variant: Option<PageVariant>,
    pub record: ModelRecord,
    pub issues: Vec<ExtractIssue>,
}

impl PageExtraction {
    /// Parses the payload of `container`, recording an issue when it is
    /// absent or unreadable.
    fn payload(&mut self, document: &Html, container: &'static str) -> Option<Value> {
        let Some(element) = find_container(document, container) else {
            self.issues.push(ExtractIssue::MissingContainer { container });
            return None;
        };
        let Some(raw) = element.value().attr("data-props") else {
            self.issues.push(ExtractIssue::MissingPayload { container });
            return None;
        };
        match parse_payload(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.issues.push(ExtractIssue::MalformedPayload {
                    container,
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

/// Extracts model metadata from an already-parsed detail page.
pub fn extract_from_document(document: &Html) -> PageExtraction {
    let mut extraction = PageExtraction::default();

    match PageVariant::detect(document) {
        Some(variant) => {
            extraction.variant = Some(variant);
            variant.apply(document, &mut extraction);
        }
        None => extraction.issues.push(ExtractIssue::NoContainer),
    }

    extraction
}

fn find_container<'a>(document: &'a Html, name: &str) -> Option<ElementRef<'a>> {
    // `name` is one of our constants, so the selector always parses.
    let selector = Selector::parse(&format!(r#"div[data-target="{}"]"#, name)).ok()?;
    document.select(&selector).next()
}

/// Parses a JSON payload taken from an HTML attribute.
///
/// Some page generations double-escape quotes inside string values
/// (`\\"` where `\"` is meant). The raw text is tried first so that a
/// legitimate trailing backslash survives; the normalized text is the
/// fallback.
pub fn parse_payload(raw: &str) -> serde_json::Result<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            let normalized = raw.replace(r#"\\""#, r#"\""#);
            if normalized == raw {
                return Err(first);
            }
            serde_json::from_str(&normalized)
        }
    }
}

/// Splits a `repoId` into author and model name.
///
/// `"acme/bert-base"` has an explicit author; `"gpt2"` does not, and its
/// author is recorded as null.
pub fn split_repo_id(repo_id: &str) -> (Option<&str>, &str) {
    match repo_id.split_once('/') {
        Some((author, name)) => (Some(author), name),
        None => (None, repo_id),
    }
}

fn apply_like_button(payload: &Value, record: &mut ModelRecord) {
    if let Some(repo_id) = payload.get("repoId").and_then(Value::as_str) {
        let (author, name) = split_repo_id(repo_id);
        match author {
            Some(author) => record.insert("author", author),
            None => record.insert("author", FieldValue::Null),
        }
        record.insert("model_name", name);
    }
    if let Some(likes) = payload.get("likes").and_then(FieldValue::from_json) {
        record.insert("likes", likes);
    }
}

fn apply_model_object(model: &Value, record: &mut ModelRecord) {
    for field in MODEL_SCALAR_FIELDS {
        if let Some(value) = model.get(field).and_then(FieldValue::from_json) {
            record.insert(field, value);
        }
    }
    apply_tags(model, record);
}

/// Groups tag ids by tag type. The `pipeline_tag` also contributes its
/// `subType` as a top-level field.
fn apply_tags(source: &Value, record: &mut ModelRecord) {
    let Some(tags) = source
        .get("tag_objs")
        .or_else(|| source.get("tagObjs"))
        .and_then(Value::as_array)
    else {
        return;
    };

    for tag in tags {
        let (Some(tag_type), Some(id)) = (
            tag.get("type").and_then(Value::as_str),
            tag.get("id").and_then(Value::as_str),
        ) else {
            debug!("Skipping tag without type or id: {}", tag);
            continue;
        };

        // `subType` only ever comes from the pipeline tag.
        if tag_type == SUB_TYPE {
            debug!("Tag type {} is reserved, skipping {}", tag_type, id);
            continue;
        }

        if !record.push_to_list(tag_type, id) {
            debug!("Tag type {} collides with a scalar field, skipping {}", tag_type, id);
            continue;
        }

        if tag_type == PIPELINE_TAG
            && let Some(sub_type) = tag.get("subType").and_then(Value::as_str)
        {
            record.insert(SUB_TYPE, sub_type);
        }
    }
}
