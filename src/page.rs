//! HTML for the single-page download form.

use crate::session::{ReadyState, SessionState};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
input[type=url], select { width: 100%; padding: .4rem; margin: .3rem 0 .8rem; box-sizing: border-box; }
.warning { background: #fff4ce; padding: .6rem; border-radius: 4px; }
.error { background: #fde7e9; padding: .6rem; border-radius: 4px; }
.success { background: #dff6dd; padding: .6rem; border-radius: 4px; }
#spinner { display: none; }
form.busy #spinner { display: block; }
img.thumb { max-width: 100%; border-radius: 4px; }
"#;

/// Escapes text for both element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Link under which a produced file can be retrieved.
pub fn file_href(file_name: &str) -> String {
    format!("/files/{}", utf8_percent_encode(file_name, NON_ALPHANUMERIC))
}

pub fn render(state: &SessionState) -> String {
    let mut body = String::new();
    match state {
        SessionState::Idle => url_form(&mut body, ""),
        SessionState::IdleWithWarning { url, warning, error } => {
            url_form(&mut body, url);
            if let Some(error) = error {
                banner(&mut body, "error", error);
            }
            banner(&mut body, "warning", warning);
        }
        SessionState::Ready(ready) => {
            url_form(&mut body, &ready.url);
            quality_form(&mut body, ready);
        }
        SessionState::Delivered { url, file_name, .. } => {
            url_form(&mut body, url);
            body.push_str(&format!(
                r#"<p class="success">Video downloaded as '{name}'!</p>
<p><a href="{href}" download="{name}" type="video/mp4">Click to download the file</a></p>
<p><a href="/">Download another video</a></p>"#,
                name = escape(file_name),
                href = file_href(file_name),
            ));
        }
    }
    layout(&body)
}

fn banner(body: &mut String, class: &str, text: &str) {
    body.push_str(&format!(r#"<p class="{}">{}</p>"#, class, escape(text)));
}

fn url_form(body: &mut String, url: &str) {
    body.push_str(&format!(
        r#"<form method="get" action="/">
<label for="url">Video URL</label>
<input type="url" id="url" name="url" value="{}" placeholder="https://..." required>
<button type="submit">Fetch qualities</button>
</form>"#,
        escape(url)
    ));
}

// Options are submitted by label; the download handler maps the label onto
// a fresh resolution.
fn quality_form(body: &mut String, ready: &ReadyState) {
    body.push_str(&format!("<h2>{}</h2>", escape(&ready.title)));
    if let Some(thumbnail) = &ready.thumbnail {
        body.push_str(&format!(r#"<img class="thumb" src="{}" alt="">"#, escape(thumbnail)));
    }
    if let Some(error) = &ready.error {
        banner(body, "error", error);
    }

    body.push_str(&format!(
        r#"<form method="post" action="/download" onsubmit="this.classList.add('busy')">
<input type="hidden" name="url" value="{}">
<label for="quality">Select Video Quality</label>
<select id="quality" name="quality">"#,
        escape(&ready.url)
    ));
    for option in &ready.options {
        let label = escape(&option.label);
        let selected = if option.label == ready.selected { " selected" } else { "" };
        body.push_str(&format!(r#"<option value="{label}"{selected}>{label}</option>"#));
    }
    body.push_str(
        r#"</select>
<button type="submit">Download</button>
<p id="spinner">Downloading...</p>
</form>"#,
    );
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Video Downloader</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Video Downloader</h1>
<p>Enter a video URL and select the quality to download.</p>
{body}
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectableOption;
    use crate::session::{WARN_NO_FORMATS, WARN_UNRESOLVED};
    use std::path::PathBuf;

    fn ready() -> ReadyState {
        ReadyState {
            url: "https://example.com/video/123".into(),
            title: "Tom & Jerry".into(),
            thumbnail: None,
            options: vec![
                SelectableOption { label: "720p (mp4) - 5.00 MB".into(), format_id: "a".into() },
                SelectableOption { label: "1080p (mp4) - Size not available".into(), format_id: "b".into() },
            ],
            selected: "1080p (mp4) - Size not available".into(),
            error: None,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn idle_page_has_no_download_action() {
        let html = render(&SessionState::Idle);
        assert!(html.contains(r#"name="url""#));
        assert!(!html.contains("/download"));
    }

    #[test]
    fn warning_page_has_no_download_action() {
        let html = render(&SessionState::IdleWithWarning {
            url: "https://example.com/x".into(),
            warning: WARN_NO_FORMATS,
            error: None,
        });
        assert!(html.contains(WARN_NO_FORMATS));
        assert!(!html.contains(r#"action="/download""#));

        let html = render(&SessionState::IdleWithWarning {
            url: "https://example.com/x".into(),
            warning: WARN_UNRESOLVED,
            error: Some("Error fetching video info: <boom>".into()),
        });
        assert!(html.contains("Couldn&#39;t retrieve video info. Check the URL."));
        assert!(html.contains("Error fetching video info: &lt;boom&gt;"));
    }

    #[test]
    fn ready_page_lists_options_in_order_with_selection() {
        let html = render(&SessionState::Ready(ready()));
        let first = html.find("720p (mp4) - 5.00 MB").unwrap();
        let second = html.find("1080p (mp4) - Size not available").unwrap();
        assert!(first < second);
        assert!(html.contains(
            r#"<option value="1080p (mp4) - Size not available" selected>1080p (mp4) - Size not available</option>"#
        ));
        assert!(html.contains(r#"<option value="720p (mp4) - 5.00 MB">720p (mp4) - 5.00 MB</option>"#));
        // Identifiers never reach the browser; they are looked up again on download.
        assert!(!html.contains(r#"value="a""#) && !html.contains(r#"value="b""#));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains(r#"action="/download""#));
    }

    #[test]
    fn delivered_page_links_the_file() {
        let html = render(&SessionState::Delivered {
            url: "https://example.com/video/123".into(),
            path: PathBuf::from("my video.mp4"),
            file_name: "my video.mp4".into(),
        });
        assert!(html.contains("Video downloaded as &#39;my video.mp4&#39;!"));
        assert!(html.contains(r#"href="/files/my%20video%2Emp4""#));
    }
}
