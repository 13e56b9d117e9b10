//! HTML templates for the dashboard page.
//!
//! Each function returns a String used in Axum `Html` responses. The page is
//! a single column: intro, upload form, then either an error banner or the
//! results (summary, preview table, charts, download link).

use crate::config::{EXPORT_FILE_NAME, REQUIRED_COLUMNS};
use crate::error::AppError;
use crate::pipeline::Report;
use crate::types::{format_value, AugmentedTable};

/// Full page around `content`.
pub fn base_template(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Default Risk Prediction</title>
    <style>
        {styles}
    </style>
</head>
<body>
    <main class="content">
        <h1>📊 Predictive Analysis of Credit Default</h1>
        {intro}
        {upload_form}
        {content}
    </main>
</body>
</html>"#,
        styles = styles(),
        intro = intro(),
        upload_form = upload_form(),
        content = content,
    )
}

/// Initial state: nothing uploaded yet.
pub fn awaiting_page() -> String {
    base_template("")
}

pub fn results_page(report: &Report) -> String {
    base_template(&results_section(report))
}

pub fn error_page(err: &AppError) -> String {
    base_template(&error_banner(err))
}

fn styles() -> &'static str {
    r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f7fa;
            color: #2d3748;
            line-height: 1.6;
        }
        .content { max-width: 960px; margin: 0 auto; padding: 30px 20px; }
        h1 { font-size: 1.8em; margin-bottom: 12px; }
        h2 { font-size: 1.3em; margin: 28px 0 8px; }
        p { margin-bottom: 8px; }
        code { background: #edf2f7; padding: 1px 4px; border-radius: 3px; }
        .card {
            background: white;
            border-radius: 8px;
            padding: 20px;
            margin: 16px 0;
            box-shadow: 0 1px 3px rgba(0,0,0,0.08);
        }
        .alert { border-radius: 6px; padding: 12px 16px; margin: 16px 0; }
        .alert-error { background: #fed7d7; color: #822727; }
        .alert-success { background: #c6f6d5; color: #22543d; }
        .table-wrap { overflow-x: auto; }
        table { border-collapse: collapse; font-size: 0.85em; white-space: nowrap; }
        th, td { padding: 4px 8px; border-bottom: 1px solid #e2e8f0; text-align: right; }
        th { background: #edf2f7; position: sticky; top: 0; }
        .chart { width: 100%; height: auto; background: white; }
        .btn {
            display: inline-block;
            background: #667eea;
            color: white;
            border: none;
            border-radius: 6px;
            padding: 8px 16px;
            text-decoration: none;
            cursor: pointer;
        }
    "#
}

fn intro() -> String {
    format!(
        r#"<p>This dashboard estimates each customer's risk of defaulting on next month's payment.
Upload a spreadsheet in the original base format (for example <code>credit_data.csv</code>) and a trained
machine learning model will score every record.</p>
<p><strong>Required columns:</strong> <code>{}</code></p>"#,
        REQUIRED_COLUMNS.join(", ")
    )
}

fn upload_form() -> &'static str {
    r#"<form class="card" action="/upload" method="post" enctype="multipart/form-data">
    <label for="file">📂 Upload a CSV file of the original base</label><br>
    <input id="file" type="file" name="file" accept=".csv,text/csv" required>
    <button class="btn" type="submit">Analyze</button>
</form>"#
}

fn error_banner(err: &AppError) -> String {
    let hint = err
        .hint()
        .map(|h| format!("<p><code>{}</code></p>", escape_html(&h)))
        .unwrap_or_default();
    format!(
        r#"<div class="alert alert-error">❌ Error processing the file: {}</div>{hint}"#,
        escape_html(&err.to_string())
    )
}

fn results_section(report: &Report) -> String {
    let summary = &report.summary;
    let charts: String = report
        .charts
        .iter()
        .map(|c| format!(r#"<div class="card">{}</div>"#, c.to_svg()))
        .collect();

    format!(
        r#"<div class="alert alert-success">✅ File loaded successfully.</div>
<h2>🧾 Analysis Result</h2>
<p>{summary_text}</p>
<p>Below are the <strong>first {preview_len} results</strong> with the estimated probability of default:</p>
<div class="card table-wrap">{preview}</div>
<h2>📊 Charts</h2>
{charts}
<p><a class="btn" href="/download" download="{file_name}">📥 Download CSV with predictions</a></p>"#,
        summary_text = escape_html(&summary.text()),
        preview_len = report.preview().len(),
        preview = preview_table(report),
        charts = charts,
        file_name = EXPORT_FILE_NAME,
    )
}

fn preview_table(report: &Report) -> String {
    let header: String = AugmentedTable::column_names()
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = report
        .preview()
        .iter()
        .map(|row| {
            let mut cells: String = row
                .features
                .iter()
                .map(|v| format!("<td>{}</td>", format_value(*v)))
                .collect();
            cells.push_str(&format!("<td>{:.2}</td>", row.probability_pct));
            cells.push_str(&format!("<td>{}</td>", row.label.as_text()));
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table>")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
