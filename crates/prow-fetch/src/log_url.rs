//! Console log URL resolution through an indirection document.

use crate::text_fetcher::{FetchError, TextFetcher};

/// Placeholder in the log URL template that receives the indirection body.
pub const LOG_URL_PLACEHOLDER: &str = "%s";

/// Substitutes the trimmed indirection body into `template`.
pub fn format_log_url(template: &str, indirection_body: &str) -> Result<String, FetchError> {
    if template.matches(LOG_URL_PLACEHOLDER).count() != 1 {
        return Err(FetchError::InvalidTemplate {
            template: template.to_string(),
        });
    }
    Ok(template.replacen(LOG_URL_PLACEHOLDER, indirection_body.trim(), 1))
}

/// Fetches the indirection document and formats the console log URL from it.
pub async fn resolve_log_url(
    fetcher: &dyn TextFetcher,
    indirection_url: &str,
    template: &str,
) -> Result<String, FetchError> {
    let body = fetcher.fetch_text(indirection_url).await?;
    if body.trim().is_empty() {
        return Err(FetchError::EmptyIndirection {
            url: indirection_url.to_string(),
        });
    }
    let log_url = format_log_url(template, &body)?;
    tracing::info!(indirection_url, log_url = %log_url, "resolved console log url");
    Ok(log_url)
}
