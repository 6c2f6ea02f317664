/// Server-rendered studio page
/// The page is a pure rendering of `StudioView`; every control posts to the JSON API and reloads

use genga::{OutputPanel, StudioView};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #12121a; color: #eee; margin: 0; }
main { display: grid; grid-template-columns: 380px 1fr; gap: 24px; padding: 24px; }
section { background: #1c1c28; border-radius: 12px; padding: 20px; }
label { display: block; margin: 14px 0 6px; font-weight: 600; }
textarea, select { width: 100%; box-sizing: border-box; background: #12121a; color: #eee; border: 1px solid #333; border-radius: 8px; padding: 8px; }
button { background: #e0533d; color: #fff; border: 0; border-radius: 8px; padding: 10px 16px; cursor: pointer; }
button:disabled { opacity: .5; cursor: default; }
.chip { background: #2c2c3c; margin: 4px 4px 0 0; padding: 6px 10px; font-size: 13px; }
.preview img { max-width: 100%; border-radius: 8px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 16px; }
figure { margin: 0; } figure img { width: 100%; border-radius: 8px; }
.error { color: #ff8a80; } .muted { color: #888; }
"#;

const SCRIPT: &str = r#"
async function call(method, url, body) {
  const res = await fetch(url, {
    method,
    headers: { 'content-type': 'application/json' },
    body: body === undefined ? undefined : JSON.stringify(body),
  });
  if (!res.ok) {
    const err = await res.json().catch(() => ({ error: res.statusText }));
    if (res.status !== 400 || !err.error.startsWith('Please enter')) alert(err.error);
  }
  location.reload();
}
function scene(update) {
  const description = document.getElementById('description').value;
  return call('PUT', '/api/scene', Object.assign({ description }, update));
}
async function generateFrames() {
  await fetch('/api/scene', {
    method: 'PUT',
    headers: { 'content-type': 'application/json' },
    body: JSON.stringify({ description: document.getElementById('description').value }),
  });
  call('POST', '/api/generate');
}
function uploadImage(input) {
  const file = input.files[0];
  if (!file) return;
  const reader = new FileReader();
  reader.onload = () => call('POST', '/api/image', { data_url: reader.result });
  reader.readAsDataURL(file);
}
"#;

/// Escape text for HTML content and attribute values
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the full page
pub fn render(view: &StudioView) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Genga Studio</title>\n");
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    let _ = writeln!(html, "<script>{}</script>", SCRIPT);
    if view.status.is_busy() {
        html.push_str("<script>setTimeout(() => location.reload(), 1500);</script>\n");
    }
    html.push_str("</head>\n<body>\n<main>\n");

    render_controls(&mut html, view);
    render_output(&mut html, &view.output);

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_controls(html: &mut String, view: &StudioView) {
    html.push_str("<section class=\"controls\">\n<h1>Genga Studio</h1>\n");

    // Reference frame
    html.push_str("<label>Reference key frame</label>\n<div class=\"preview\">\n");
    match &view.reference_image {
        Some(src) => {
            let _ = writeln!(
                html,
                "<img src=\"{}\" alt=\"Reference frame\">\n<button class=\"chip\" onclick=\"call('DELETE', '/api/image')\">Remove image</button>",
                html_escape(src)
            );
        }
        None => {
            html.push_str("<input type=\"file\" accept=\"image/*\" onchange=\"uploadImage(this)\">\n");
            html.push_str("<p class=\"muted\">Upload a frame to continue it, or describe a new scene.</p>\n");
        }
    }
    html.push_str("</div>\n");

    if view.analyzing {
        html.push_str("<p class=\"muted\">Analyzing the frame...</p>\n");
    } else if !view.suggestions.is_empty() {
        html.push_str("<div class=\"suggestions\">\n");
        for (index, suggestion) in view.suggestions.iter().enumerate() {
            let _ = writeln!(
                html,
                "<button class=\"chip\" onclick=\"call('POST', '/api/suggestions/{}/select')\">{}</button>",
                index,
                html_escape(suggestion)
            );
        }
        html.push_str("</div>\n");
    }

    // Description
    let _ = writeln!(
        html,
        "<label for=\"description\">{}</label>\n<textarea id=\"description\" rows=\"4\" placeholder=\"{}\">{}</textarea>",
        view.description_label,
        html_escape(view.description_placeholder),
        html_escape(&view.description)
    );

    // Style
    html.push_str("<label for=\"style\">Art style</label>\n<select id=\"style\" onchange=\"scene({ style: this.value })\">\n");
    for option in &view.styles {
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            option.label,
            if option.selected { " selected" } else { "" },
            option.label
        );
    }
    html.push_str("</select>\n");

    // Frame count
    let control = &view.frame_count;
    let _ = writeln!(
        html,
        "<label for=\"frames\">{}</label>\n<input id=\"frames\" type=\"range\" min=\"{}\" max=\"{}\" value=\"{}\"{} onchange=\"scene({{ frame_count: Number(this.value) }})\">",
        html_escape(&control.label),
        control.min,
        control.max,
        control.value,
        if control.enabled { "" } else { " disabled" }
    );

    // Generate
    let button = &view.generate_button;
    let _ = writeln!(
        html,
        "<p><button id=\"generate\" onclick=\"generateFrames()\"{}>{}</button></p>",
        if button.enabled { "" } else { " disabled" },
        button.label
    );

    // Presets
    html.push_str("<label>Examples</label>\n<div class=\"presets\">\n");
    for preset in &view.presets {
        let _ = writeln!(
            html,
            "<button class=\"chip\" onclick=\"call('POST', '/api/presets/{}/apply')\">{}</button>",
            preset.index,
            html_escape(preset.name)
        );
    }
    html.push_str("</div>\n</section>\n");
}

fn render_output(html: &mut String, output: &OutputPanel) {
    html.push_str("<section class=\"output\">\n");
    match output {
        OutputPanel::Loading => {
            html.push_str("<p>Drawing your key frames...</p>\n");
        }
        OutputPanel::Error(message) => {
            let _ = writeln!(html, "<p class=\"error\">{}</p>", html_escape(message));
        }
        OutputPanel::Empty => {
            html.push_str("<p class=\"muted\">Your key frames will appear here.</p>\n");
        }
        OutputPanel::Results(tiles) => {
            html.push_str("<div class=\"grid\">\n");
            for tile in tiles {
                let caption = html_escape(&tile.caption);
                let _ = writeln!(
                    html,
                    "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
                    html_escape(&tile.src),
                    caption,
                    caption
                );
            }
            html.push_str("</div>\n");
        }
    }
    html.push_str("</section>\n");
}
