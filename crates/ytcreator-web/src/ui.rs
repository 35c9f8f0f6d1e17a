//! Server-rendered page: one topic input, the generated title and script, and
//! three collapsible panels (title history, script history, research).

use std::fmt::Write;
use uuid::Uuid;
use ytcreator_chain::PipelineResult;

pub const PAGE_TITLE: &str = "LangChain YouTube GPT Creator";
pub const INPUT_LABEL: &str = "Plug in your prompt here.";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#fafafa;color:#262730}\
main{max-width:46rem;margin:0 auto;padding:3rem 1rem}\
label{display:block;margin-bottom:.4rem;font-size:.9rem}\
input[type=text]{width:100%;box-sizing:border-box;padding:.6rem;font-size:1rem;border:1px solid #ccc;border-radius:.4rem}\
.title{font-size:1.3rem;font-weight:600}\
.script{white-space:pre-wrap}\
.error{background:#ffe8e8;color:#7d1a1a;padding:.8rem;border-radius:.4rem;margin:1rem 0}\
details{border:1px solid #ddd;border-radius:.4rem;margin:.6rem 0;padding:.4rem .8rem;background:#fff}\
summary{cursor:pointer}\
.info{white-space:pre-wrap;background:#e8f0fe;padding:.8rem;border-radius:.4rem;font-family:inherit}";

/// Everything a successful submission displays
#[derive(Debug, Clone)]
pub struct ResultView {
    pub result: PipelineResult,
    pub title_history: String,
    pub script_history: String,
}

#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub session_id: Option<Uuid>,
    pub topic: String,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

impl PageView {
    pub fn new(session_id: Uuid, topic: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id),
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(html, "<title>{}</title>", PAGE_TITLE);
        let _ = writeln!(html, "<style>{}</style>", STYLE);
        html.push_str("</head>\n<body>\n<main>\n");
        let _ = writeln!(html, "<h1>{}</h1>", PAGE_TITLE);

        html.push_str("<form method=\"post\" action=\"/\">\n");
        let _ = writeln!(html, "<label for=\"topic\">{}</label>", INPUT_LABEL);
        let _ = writeln!(
            html,
            "<input type=\"text\" id=\"topic\" name=\"topic\" value=\"{}\" autofocus>",
            escape_html(&self.topic)
        );
        let session_id = self.session_id.map(|id| id.to_string()).unwrap_or_default();
        let _ = writeln!(
            html,
            "<input type=\"hidden\" name=\"session_id\" value=\"{}\">",
            session_id
        );
        html.push_str("</form>\n");

        if let Some(error) = &self.error {
            let _ = writeln!(html, "<div class=\"error\" role=\"alert\">{}</div>", escape_html(error));
        } else if let Some(view) = &self.result {
            render_result(&mut html, view);
        }

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

fn render_result(html: &mut String, view: &ResultView) {
    html.push_str("<section class=\"result\">\n");
    let _ = writeln!(html, "<p class=\"title\">{}</p>", escape_html(&view.result.title));
    let _ = writeln!(html, "<div class=\"script\">{}</div>", escape_html(&view.result.script));
    html.push_str("</section>\n");

    render_panel(html, "Title History", &view.title_history);
    render_panel(html, "Script History", &view.script_history);
    render_panel(html, "Wikipedia Research", &view.result.research);
}

fn render_panel(html: &mut String, summary: &str, body: &str) {
    let _ = writeln!(
        html,
        "<details><summary>{}</summary><pre class=\"info\">{}</pre></details>",
        summary,
        escape_html(body)
    );
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
