use super::domain::{Lang, ResultCode};

const SHARE_TITLE: &str = "Spot Eraser";

/// Parse the path segment of a share link; anything non-numeric shows the
/// first artwork.
pub fn share_code(raw: &str) -> ResultCode {
    raw.trim()
        .parse::<u8>()
        .map(ResultCode)
        .unwrap_or(ResultCode::FALLBACK)
}

/// Absolute artwork URL for a result code. English artwork carries `_eng`.
pub fn share_image_url(origin: &str, code: ResultCode, lang: Lang) -> String {
    let suffix = match lang {
        Lang::Eng => "_eng",
        Lang::Kor => "",
    };
    format!("{origin}/assets/result-{code}{suffix}.png")
}

/// Link-preview page: Open Graph and Twitter card tags for messengers, then an
/// immediate redirect to the landing page.
pub fn render_share_page(code: ResultCode, lang: Lang, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let image = escape_html(&share_image_url(origin, code, lang));
    let canonical = escape_html(&format!("{origin}/"));
    let title = escape_html(SHARE_TITLE);
    let (html_lang, description) = match lang {
        Lang::Eng => ("en", "Check your acne type"),
        Lang::Kor => ("ko", "당신의 여드름 타입을 확인하세요"),
    };
    let description = escape_html(description);

    format!(
        r#"<!doctype html>
<html lang="{html_lang}">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <meta property="og:type" content="website">
  <meta property="og:title" content="{title}">
  <meta property="og:description" content="{description}">
  <meta property="og:image" content="{image}">
  <meta property="og:url" content="{canonical}">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{title}">
  <meta name="twitter:description" content="{description}">
  <meta name="twitter:image" content="{image}">
  <meta http-equiv="refresh" content="0;url={canonical}">
</head>
<body>
  <a href="{canonical}">Open Spot Eraser</a>
</body>
</html>"#
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
