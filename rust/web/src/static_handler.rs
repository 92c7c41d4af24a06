use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use mime_guess::{mime, MimeGuess};
use tokio::fs;
use warp::http::{header::HeaderValue, Response, StatusCode};
use warp::hyper::Body;

/// Browser front-end compiled into the binary. Used when the asset is not on disk.
const EMBEDDED_ASSETS: &[(&str, &str)] = &[
    ("index.html", include_str!("../static/index.html")),
    ("app.js", include_str!("../static/app.js")),
    ("style.css", include_str!("../static/style.css")),
];

#[derive(Debug, thiserror::Error)]
pub enum StaticError {
    #[error("asset not found")]
    NotFound,
    #[error("asset io error: {0}")]
    Io(#[from] std::io::Error),
}

impl crate::errors::IntoErrorResponse for StaticError {
    fn status_code(&self) -> warp::http::StatusCode {
        match self {
            StaticError::NotFound => StatusCode::NOT_FOUND,
            StaticError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StaticError::NotFound => "static_not_found",
            StaticError::Io(_) => "static_io_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct StaticHandler {
    root: Arc<PathBuf>,
    cache_header: HeaderValue,
}

impl StaticHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
            cache_header: HeaderValue::from_static("public, max-age=3600"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub async fn index(&self) -> Result<warp::reply::Response, StaticError> {
        self.serve_relative("index.html").await
    }

    pub async fn asset(&self, path: &str) -> Result<warp::reply::Response, StaticError> {
        if path.is_empty() {
            return Err(StaticError::NotFound);
        }
        self.serve_relative(path).await
    }

    pub fn error_response(&self, error: StaticError) -> warp::reply::Response {
        let (status, body) = match &error {
            StaticError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            StaticError::Io(err) => {
                tracing::error!(error = %err, root = %self.root.display(), "static asset read failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            warp::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        );
        response
    }

    async fn serve_relative(&self, relative: &str) -> Result<warp::reply::Response, StaticError> {
        let (resolved, key) = self.resolve(relative)?;
        let mime = MimeGuess::from_path(&resolved).first_or_octet_stream();

        match fs::read(&resolved).await {
            Ok(bytes) => Ok(self.build_response(bytes, mime)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let embedded = embedded_asset(&key).ok_or(StaticError::NotFound)?;
                tracing::trace!(asset = %key, "serving embedded asset");
                Ok(self.build_response(embedded.as_bytes().to_vec(), mime))
            }
            Err(err) => Err(StaticError::Io(err)),
        }
    }

    fn build_response(&self, bytes: Vec<u8>, mime: mime::Mime) -> warp::reply::Response {
        let mut response = Response::new(Body::from(bytes));
        let mut content_type = mime.essence_str().to_string();
        if mime.type_() == mime::TEXT || mime.subtype() == mime::JAVASCRIPT {
            content_type.push_str("; charset=utf-8");
        }

        response.headers_mut().insert(
            warp::http::header::CONTENT_TYPE,
            HeaderValue::from_str(&content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
        );
        response
            .headers_mut()
            .insert(warp::http::header::CACHE_CONTROL, self.cache_header.clone());
        response
    }

    /// Confine `path` to the asset root. Returns the disk path and the
    /// slash-joined key used for embedded lookups.
    fn resolve(&self, path: &str) -> Result<(PathBuf, String), StaticError> {
        let mut buf = PathBuf::new();
        let mut segments = Vec::new();
        for comp in Path::new(path).components() {
            match comp {
                Component::Normal(seg) => {
                    buf.push(seg);
                    segments.push(seg.to_string_lossy().into_owned());
                }
                Component::CurDir | Component::RootDir => {}
                Component::Prefix(_) | Component::ParentDir => return Err(StaticError::NotFound),
            }
        }

        if segments.is_empty() {
            return Err(StaticError::NotFound);
        }

        Ok((self.root.join(buf), segments.join("/")))
    }
}

fn embedded_asset(key: &str) -> Option<&'static str> {
    EMBEDDED_ASSETS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, body)| *body)
}
