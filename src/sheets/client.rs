use crate::error::StoreError;
use crate::google_oauth::AccessTokenProvider;
use dompet_schema::sheets::{ClearValuesResponse, UpdateValuesResponse, ValueRange};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Thin client for the Sheets v4 `values` endpoints of one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        base: Url,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            base,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    fn values_url(&self, range: &str, verb: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                StoreError::Backend(format!("sheets api url cannot be a base: {}", self.base))
            })?;
            segments.pop_if_empty().push(&self.spreadsheet_id).push("values");
            match verb {
                Some(verb) => segments.push(&format!("{range}:{verb}")),
                None => segments.push(range),
            };
        }
        Ok(url)
    }

    pub async fn get_values(&self, range: &str) -> Result<ValueRange, StoreError> {
        let mut url = self.values_url(range, None)?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");
        self.send::<(), _>(Method::GET, url, None).await
    }

    pub async fn update_values(
        &self,
        range: &str,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse, StoreError> {
        let mut url = self.values_url(range, None)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        self.send(Method::PUT, url, Some(body)).await
    }

    pub async fn clear_values(&self, range: &str) -> Result<ClearValuesResponse, StoreError> {
        let url = self.values_url(range, Some("clear"))?;
        self.send(Method::POST, url, Some(&serde_json::json!({}))).await
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, StoreError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;
        debug!(%method, path = url.path(), "Sheets request");
        let mut req = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            warn!(
                "Sheets API error. Status: {}, Body: {:.100}",
                status,
                String::from_utf8_lossy(&bytes)
            );
            return Err(StoreError::UpstreamStatus(status));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// A1 range on `sheet`; an empty sheet name addresses the first sheet.
pub(crate) fn a1(sheet: &str, cells: &str) -> String {
    if sheet.is_empty() {
        cells.to_string()
    } else {
        format!("'{}'!{cells}", sheet.replace('\'', "''"))
    }
}
