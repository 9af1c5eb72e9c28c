use reqwest::Url;

use crate::StorageError;

/// Maps an uploaded-photo URL onto the public bucket.
///
/// The path is `/{bucket}/{folder}/{file}`; the result is
/// `{public_base}/{folder}/{file}`. Anything that is not an http(s) URL with
/// at least those three segments is rejected.
pub fn resolve_public_url(source: &str, public_base: &str) -> Result<String, StorageError> {
    if !source.starts_with("http") {
        return Err(StorageError::InvalidUrl(format!("{source}: not an http URL")));
    }
    let parsed = Url::parse(source).map_err(|e| StorageError::InvalidUrl(format!("{source}: {e}")))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    if segments.len() < 3 {
        return Err(StorageError::InvalidUrl(format!(
            "{source}: expected /bucket/folder/file"
        )));
    }
    Ok(format!(
        "{}/{}/{}",
        public_base.trim_end_matches('/'),
        segments[1],
        segments[2]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_to_public_bucket() {
        let url = resolve_public_url(
            "https://s3.example.com/private-bucket/777a84e2/photo.jpg",
            "https://public.example.com/bucket/",
        )
        .unwrap();
        assert_eq!(url, "https://public.example.com/bucket/777a84e2/photo.jpg");
    }

    #[test]
    fn rejects_non_http() {
        assert!(matches!(
            resolve_public_url("s3://bucket/a/b", "https://p"),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_short_paths() {
        assert!(resolve_public_url("https://host/bucket/file.jpg", "https://p").is_err());
        assert!(resolve_public_url("https://host", "https://p").is_err());
    }

    #[test]
    fn ignores_query_and_extra_segments() {
        let url = resolve_public_url("http://h/b/f/x.png/extra?sig=1", "http://pub").unwrap();
        assert_eq!(url, "http://pub/f/x.png");
    }
}
