//! Guessing a document's file type before (or while) downloading it.

/// File extension for a regulation link.
///
/// The URL is checked first; when it carries no recognisable extension the
/// response `Content-Type` decides.
pub fn infer_extension(url: &str, content_type: Option<&str>) -> Option<&'static str> {
    let url = url.to_ascii_lowercase();
    if url.contains(".pdf") {
        return Some("pdf");
    }
    if url.contains(".htm") {
        return Some("html");
    }
    if url.contains(".txt") {
        return Some("txt");
    }

    let mime = content_type?
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "application/pdf" | "application/x-pdf" => Some("pdf"),
        "text/html" | "application/xhtml+xml" => Some("html"),
        "text/plain" => Some("txt"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_url() {
        assert_eq!(infer_extension("https://x.gov.br/Decreto-35606.PDF", None), Some("pdf"));
        assert_eq!(infer_extension("https://x.gov.br/lei.htm", None), Some("html"));
        assert_eq!(infer_extension("https://x.gov.br/lei.html?id=3", None), Some("html"));
        assert_eq!(infer_extension("https://x.gov.br/gazette.txt", None), Some("txt"));
    }

    #[test]
    fn extension_from_content_type() {
        let url = "https://leismunicipais.com.br/a/sp/decreto/2012/5362";
        assert_eq!(infer_extension(url, Some("application/pdf")), Some("pdf"));
        assert_eq!(infer_extension(url, Some("text/html; charset=ISO-8859-1")), Some("html"));
        assert_eq!(infer_extension(url, Some("application/zip")), None);
        assert_eq!(infer_extension(url, None), None);
    }
}
