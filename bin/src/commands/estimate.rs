//! Estimate command.

use anyhow::{Result, bail};
use datawire_lib::prelude::*;
use datawire_lib::DownloadRuleTable;

/// Show the upload and fallback download estimates for a request.
pub(crate) fn estimate(url: &str, method: &str, headers: &[String]) -> Result<()> {
    let mut request = RequestMeta::new(url, method);
    for line in headers {
        let Some(header) = Header::parse_line(line) else {
            bail!("Invalid header '{line}', expected \"Name: value\"");
        };
        request = request.with_header(header);
    }

    let estimator = SizeEstimator::global();
    let upload = estimator.upload_size(&request);
    let download = estimator.download_size_from_url(url);
    let rule = DownloadRuleTable::global()
        .matching_rule(url)
        .map_or("default", |rule| rule.label.as_str());

    println!("Domain:    {}", extract_domain(url));
    println!("Upload:    {} ({upload} bytes)", format_bytes(upload));
    println!(
        "Download:  {} ({download} bytes, {rule} rule, used without content-length)",
        format_bytes(download)
    );

    Ok(())
}
