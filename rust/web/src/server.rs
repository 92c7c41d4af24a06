use crate::errors::handle_rejection;
use crate::events::EventBus;
use crate::handlers;
use crate::middleware::with_request_logging;
use crate::session::{SessionError, SessionManager};
use crate::settings::{AppSettings, SettingsError, SettingsStore};
use crate::static_handler::StaticHandler;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    static_dir: PathBuf,
    settings: AppSettings,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            static_dir: static_dir.into(),
            settings: AppSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Ephemeral port, embedded assets only.
    pub fn for_tests() -> Self {
        let dir = std::env::temp_dir().join("pairs_web_static_absent");
        Self::new("127.0.0.1", 0, dir)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }
}

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: Arc<EventBus>,
    sessions: Arc<SessionManager>,
    settings: Arc<SettingsStore>,
    static_handler: Arc<StaticHandler>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let settings = Arc::new(SettingsStore::with_settings(config.settings().clone())?);
        let event_bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionManager::with_ttl(
            Arc::clone(&event_bus),
            config.settings().session_timeout(),
        ));
        let static_handler = Arc::new(StaticHandler::new(config.static_dir().to_path_buf()));

        Ok(Self {
            config,
            event_bus,
            sessions,
            settings,
            static_handler,
        })
    }

    pub fn new_for_tests() -> Self {
        let config = ServerConfig::for_tests();
        let event_bus = Arc::new(EventBus::new());
        Self {
            sessions: Arc::new(SessionManager::new(Arc::clone(&event_bus))),
            settings: Arc::new(SettingsStore::new()),
            static_handler: Arc::new(StaticHandler::new(config.static_dir().to_path_buf())),
            event_bus,
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }

    pub fn static_handler(&self) -> Arc<StaticHandler> {
        Arc::clone(&self.static_handler)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let context = AppContext::new(config)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(%addr, static_dir = %context.config().static_dir().display(), "web server listening");

        let task = tokio::spawn(server_future);
        let sweeper = tokio::spawn(Self::sweep_expired(context.sessions()));

        Ok(ServerHandle {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
            sweeper: Some(sweeper),
            context,
        })
    }

    async fn sweep_expired(sessions: Arc<SessionManager>) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.cleanup_expired_sessions();
        }
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    /// Every route, logged, with rejections rendered as JSON errors.
    pub fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let routes = Self::health_route(context)
            .or(Self::static_routes(context))
            .unify()
            .or(Self::api_routes(context))
            .unify()
            .or(Self::sse_routes(context))
            .unify()
            .or(Self::settings_routes(context))
            .unify();

        with_request_logging(routes)
            .recover(handle_rejection)
            .unify()
            .boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let sessions = context.sessions();
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(move || handlers::health(sessions.active_sessions().len()).into_response())
            .boxed()
    }

    fn static_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let handler = context.static_handler();

        let index = warp::path::end()
            .and(warp::get())
            .and(with_shared(handler.clone()))
            .and_then(|handler: Arc<StaticHandler>| async move {
                let response = handler
                    .index()
                    .await
                    .unwrap_or_else(|err| handler.error_response(err));
                Ok::<_, Infallible>(response)
            });

        let assets = warp::path("static")
            .and(warp::path::tail())
            .and(warp::get())
            .and(with_shared(handler))
            .and_then(
                |tail: warp::path::Tail, handler: Arc<StaticHandler>| async move {
                    let response = handler
                        .asset(tail.as_str())
                        .await
                        .unwrap_or_else(|err| handler.error_response(err));
                    Ok::<_, Infallible>(response)
                },
            );

        index.or(assets).unify().boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let sessions = context.sessions();
        let settings = context.settings();

        let create = warp::path!("api" / "sessions")
            .and(warp::post())
            .and(with_shared(sessions.clone()))
            .and(with_shared(settings))
            .and(warp::body::json())
            .and_then(
                |sessions: Arc<SessionManager>,
                 settings: Arc<SettingsStore>,
                 request: handlers::CreateSessionRequest| async move {
                    Ok::<_, Infallible>(handlers::create_session(sessions, settings, request).await)
                },
            );

        let info = warp::path!("api" / "sessions" / String)
            .and(warp::get())
            .and(with_shared(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    Ok::<_, Infallible>(handlers::get_session(sessions, session_id).await)
                },
            );

        let select = warp::path!("api" / "sessions" / String / "selections")
            .and(warp::post())
            .and(with_shared(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::SelectionRequest| async move {
                    Ok::<_, Infallible>(handlers::select_card(sessions, session_id, request).await)
                },
            );

        let restart = warp::path!("api" / "sessions" / String / "restart")
            .and(warp::post())
            .and(with_shared(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::RestartRequest| async move {
                    Ok::<_, Infallible>(
                        handlers::restart_session(sessions, session_id, request).await,
                    )
                },
            );

        let delete = warp::path!("api" / "sessions" / String)
            .and(warp::delete())
            .and(with_shared(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    Ok::<_, Infallible>(handlers::delete_session(sessions, session_id).await)
                },
            );

        create
            .or(select)
            .unify()
            .or(restart)
            .unify()
            .or(info)
            .unify()
            .or(delete)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        warp::path!("api" / "sessions" / String / "events")
            .and(warp::get())
            .and(with_shared(context.sessions()))
            .and(with_shared(context.event_bus()))
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 event_bus: Arc<EventBus>| async move {
                    Ok::<_, Infallible>(
                        handlers::stream_events(session_id, sessions, event_bus).await,
                    )
                },
            )
            .boxed()
    }

    fn settings_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let get = warp::path!("api" / "settings")
            .and(warp::get())
            .and(with_shared(context.settings()))
            .and_then(|store: Arc<SettingsStore>| async move {
                Ok::<_, Infallible>(handlers::get_settings(store).await)
            });

        let put = warp::path!("api" / "settings")
            .and(warp::put())
            .and(with_shared(context.settings()))
            .and(with_shared(context.sessions()))
            .and(warp::body::json())
            .and_then(
                |store: Arc<SettingsStore>,
                 sessions: Arc<SessionManager>,
                 request: handlers::UpdateSettingsRequest| async move {
                    Ok::<_, Infallible>(handlers::update_settings(store, sessions, request).await)
                },
            );

        get.or(put).unify().boxed()
    }
}

fn with_shared<T>(value: Arc<T>) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone
where
    T: Send + Sync + ?Sized + 'static,
{
    warp::any().map(move || Arc::clone(&value))
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
    context: AppContext,
}

impl ServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.await
                .map_err(|err| ServerError::ConfigError(format!("server task join error: {err}")))?;
        }

        tracing::info!(addr = %self.addr, "web server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
