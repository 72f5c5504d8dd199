// SPDX-License-Identifier: MIT
//!
//! HTTP upload boundary: POST a spreadsheet, get the translated workbook back
//!

use crate::config::Config;
use crate::error::Result;
use crate::openai::OpenAi;
use crate::pipeline::{Pipeline, OUTPUT_FILE};
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>NB Legend translator</title></head>
<body>
<h1>Translate product strings to Canadian French</h1>
<p>Upload a .csv or .xlsx file with an "English" column.</p>
<form action="/translate" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept=".csv,.xlsx">
<button type="submit">Translate</button>
</form>
</body>
</html>
"#;

pub struct AppState {
    pub config: Config,
    pub translator: OpenAi,
}

pub fn router(state: Arc<AppState>) -> axum::Router {
    let max_upload = state.config.max_upload_bytes;
    axum::Router::new()
        .route("/", axum::routing::get(index))
        .route("/translate", axum::routing::post(translate))
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Listen on `bind` until the process is stopped
pub async fn serve(config: Config, bind: &str) -> Result<()> {
    let translator = OpenAi::new(&config)?;
    std::fs::create_dir_all(&config.upload_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let app = router(Arc::new(AppState { config, translator }));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// JSON error response, `{"error": ...}`
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, axum::Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // 413 when the upload is over the body limit
        Self(err.status(), err.body_text())
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(err: crate::error::Error) -> Self {
        log::error!("Translation failed: {}", err);
        Self(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

async fn translate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    // Find "file" part
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError(StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;
    let filename = secure_filename(&filename)
        .ok_or_else(|| ApiError(StatusCode::BAD_REQUEST, "No selected file".to_string()))?;

    // Store upload, one directory per run
    let run_dir = state
        .config
        .upload_dir
        .join(uuid::Uuid::new_v4().to_string());
    tokio::fs::create_dir_all(&run_dir)
        .await
        .map_err(crate::error::Error::from)?;
    let input = run_dir.join(&filename);
    tokio::fs::write(&input, &data)
        .await
        .map_err(crate::error::Error::from)?;
    log::info!("Stored upload {:?} ({} bytes)", input, data.len());

    let pipeline = Pipeline::new(&state.config, state.translator.clone());
    let output = pipeline.process_file(&input).await?;
    let body = tokio::fs::read(&output)
        .await
        .map_err(crate::error::Error::from)?;

    let disposition = format!("attachment; filename=\"{}\"", OUTPUT_FILE);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Reduce an uploaded file name to a safe single path component
///
/// Returns `None` when nothing usable is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::openai::test::mock_endpoint;
    use crate::sheet::Table;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "legendboundary";

    fn multipart_request(field: &str, filename: &str, data: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{data}\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            filename = filename,
            data = data,
        );
        Request::builder()
            .method("POST")
            .uri("/translate")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn state(dir: &std::path::Path, endpoint: &str) -> Arc<AppState> {
        state_with_limit(dir, endpoint, Config::default().max_upload_bytes)
    }

    fn state_with_limit(dir: &std::path::Path, endpoint: &str, limit: usize) -> Arc<AppState> {
        let config = Config {
            endpoint: endpoint.to_string(),
            max_upload_bytes: limit,
            glossary: dir.join("NB Legend.xlsx"),
            upload_dir: dir.join("uploads"),
            output_dir: dir.join("outputs"),
            ..Config::default()
        }
        .with_api_key(Some("sk-test".to_string()));
        let translator = OpenAi::new(&config).unwrap();
        Arc::new(AppState { config, translator })
    }

    fn write_glossary(path: &std::path::Path) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("English");
        sheet.get_cell_mut((2, 1)).set_value_string("French");
        sheet.get_cell_mut((1, 2)).set_value_string("chart");
        sheet.get_cell_mut((2, 2)).set_value_string("dossier");
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    async fn error_of(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["error"].clone()
    }

    #[test]
    fn filename_sanitized() {
        assert_eq!(secure_filename("strings.csv").as_deref(), Some("strings.csv"));
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            secure_filename("C:\\Users\\me\\My Strings.xlsx").as_deref(),
            Some("My_Strings.xlsx")
        );
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename(".."), None);
    }

    #[tokio::test]
    async fn index_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path(), "http://127.0.0.1:9/"));

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn no_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path(), "http://127.0.0.1:9/"));

        let resp = app
            .oneshot(multipart_request("other", "a.csv", "English\nx\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, "No file uploaded");
    }

    #[tokio::test]
    async fn empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path(), "http://127.0.0.1:9/"));

        let resp = app
            .oneshot(multipart_request("file", "", "English\nx\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, "No selected file");
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with_limit(dir.path(), "http://127.0.0.1:9/", 256));
        let data = format!("English\n{}\n", "Open chart ".repeat(200));

        let resp = app
            .oneshot(multipart_request("file", "in.csv", &data))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn pipeline_failure_is_500() {
        // No glossary written
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path(), "http://127.0.0.1:9/"));

        let resp = app
            .oneshot(multipart_request("file", "in.csv", "English\nOpen chart\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = error_of(resp).await;
        assert!(err.as_str().unwrap().starts_with("resource not found"));
    }

    #[tokio::test]
    async fn translated_workbook_returned() {
        let dir = tempfile::tempdir().unwrap();
        write_glossary(&dir.path().join("NB Legend.xlsx"));
        let completion = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Ouvrir le dossier"}}]
        });
        let (endpoint, seen) = mock_endpoint(StatusCode::OK, completion.to_string()).await;
        let app = router(state(dir.path(), &endpoint));

        let resp = app
            .oneshot(multipart_request("file", "in.csv", "English\nOpen chart\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"translated_file.xlsx\""
        );

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let downloaded = dir.path().join("downloaded.xlsx");
        std::fs::write(&downloaded, &bytes).unwrap();
        let table = Table::read(&downloaded).unwrap();
        assert_eq!(
            table.column("Translated String").unwrap(),
            vec!["Ouvrir le dossier"]
        );
        assert_eq!(
            table.column("NB Legend Term(s)").unwrap(),
            vec!["chart (dossier)"]
        );

        let (_, req) = seen.lock().unwrap().take().unwrap();
        assert!(req["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("chart (dossier)\n\nOpen chart"));
    }
}
