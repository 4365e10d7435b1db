use reqwest::Url;
use sync_connector::{AppError, Result};

const CHARGEBEE_DOMAIN: &str = ".chargebee.com";

/// Check the `site` account field before any API call. It must be the bare
/// subdomain, not the site URL.
pub fn validate_site(site: &str) -> Result<&str> {
    let site = site.trim();
    if site.is_empty() {
        return Err(AppError::validation("Site is empty"));
    }

    if site.contains("://") || site.contains('.') {
        let url = if site.starts_with("http") {
            site.to_string()
        } else {
            format!("https://{}", site)
        };
        if let Some(subdomain) = Url::parse(&url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .and_then(|host| host.strip_suffix(CHARGEBEE_DOMAIN).map(str::to_string))
        {
            return Err(AppError::validation(format!(
                "Please enter just the subdomain instead of the full URL (suggestion: '{}')",
                subdomain
            )));
        }
    }
    Ok(site)
}
