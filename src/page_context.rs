//! The page context handed over by the render hook.
//!
//! [`PageContext::from_json`] is the boundary check: it turns the loosely
//! shaped record produced by the render hook into a typed value, reporting
//! every missing field as a usage error. Past this point the pipeline only
//! sees validated data.

use serde_json::{Map, Value};

use crate::assets::PageAsset;
use crate::serialize::PageValue;
use crate::{Result, SsrError};

/// Key holding the page identifier, both on the page context and on the
/// client page context.
pub const PAGE_ID_KEY: &str = "_pageId";

const API: &str = "[html.injectAssets(htmlString, pageContext)]";

#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub url_normalized: String,
    pub page_id: String,
    /// The subset of the page context sent to the browser.
    pub page_context_client: PageValue,
    pub page_assets: Vec<PageAsset>,
    pub page_file_path: String,
    /// Root-relative path of the page's client entry.
    pub page_client_file_path: String,
}

impl PageContext {
    /// Validate a page context record coming from the render hook.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut record) = value else {
            return Err(SsrError::usage(format!(
                "{} Argument `pageContext` is missing.",
                API
            )));
        };

        let url_normalized = take_string(&mut record, "urlNormalized", "should be a string")?;
        let page_id = take_string(&mut record, PAGE_ID_KEY, "should be a string")?;

        let page_context_client = match record.remove("_pageContextClient") {
            Some(value @ Value::Object(_)) => PageValue::from(value),
            _ => return Err(field_error("_pageContextClient", "is missing")),
        };

        let page_assets = match record.remove("_pageAssets") {
            Some(value) => serde_json::from_value(value)
                .map_err(|err| field_error("_pageAssets", &format!("is malformed ({})", err)))?,
            None => return Err(field_error("_pageAssets", "is missing")),
        };

        let page_file_path = take_string(&mut record, "_pageFilePath", "is missing")?;
        let page_client_file_path = take_string(&mut record, "_pageClientFilePath", "is missing")?;

        Ok(Self {
            url_normalized,
            page_id,
            page_context_client,
            page_assets,
            page_file_path,
            page_client_file_path,
        })
    }

    /// Serialize the client page context, checking it belongs to this page.
    pub fn serialize_client(&self) -> Result<String> {
        let client_page_id = self
            .page_context_client
            .get(PAGE_ID_KEY)
            .and_then(PageValue::as_str);
        match client_page_id {
            Some(id) if id == self.page_id => Ok(crate::serialize::uneval(&self.page_context_client)),
            Some(id) => Err(SsrError::invariant(format!(
                "Client page context belongs to page `{}`, expected `{}`.",
                id, self.page_id
            ))),
            None => Err(SsrError::invariant(format!(
                "Client page context of page `{}` has no `{}`.",
                self.page_id, PAGE_ID_KEY
            ))),
        }
    }
}

/// Read `_pageClientFilePath` from a record that is not complete yet (no
/// `_pageAssets`), with the same usage error [`PageContext::from_json`] raises.
pub fn page_client_file_path(page_context: &Value) -> Result<&str> {
    page_context
        .get("_pageClientFilePath")
        .and_then(Value::as_str)
        .ok_or_else(|| field_error("_pageClientFilePath", "is missing"))
}

fn take_string(record: &mut Map<String, Value>, field: &str, problem: &str) -> Result<String> {
    match record.remove(field) {
        Some(Value::String(value)) => Ok(value),
        _ => Err(field_error(field, problem)),
    }
}

fn field_error(field: &str, problem: &str) -> SsrError {
    SsrError::usage(format!(
        "{} `pageContext.{}` {}. Make sure that `pageContext` is the object that the framework provided to your `render(pageContext)` hook.",
        API, field, problem
    ))
}
