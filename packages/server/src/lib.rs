#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the game play visualization dashboard.
//!
//! Every configured view runs as its own dashboard task. The rendering side
//! reads snapshots from `/api/views/{id}` and posts interaction events to
//! `/api/views/{id}/events`; each event answers with the snapshot it
//! produced.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use game_viz_dashboard::DashboardHandle;
use game_viz_dataset::DataRoot;
use game_viz_view::ViewDefinition;

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or running the HTTP server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured port is not a valid port number.
    #[error("Invalid port '{0}'")]
    InvalidPort(String),
}

/// Where the server listens and reads data from.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: String,
    /// Port.
    pub port: u16,
    /// Base location of the view datasets.
    pub data_root: DataRoot,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and `GAME_VIZ_DATA_ROOT`, defaulting to
    /// `127.0.0.1:8080` and `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidPort`] if `PORT` is set but is not a
    /// valid port number.
    pub fn from_env() -> Result<Self, ServerError> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("PORT") {
            Ok(p) => p.parse().map_err(|_| ServerError::InvalidPort(p))?,
            Err(_) => 8080,
        };
        Ok(Self {
            bind_addr,
            port,
            data_root: DataRoot::from_env(),
        })
    }
}

/// Shared application state.
pub struct AppState {
    /// One running dashboard per view, in navigation order.
    handles: Vec<DashboardHandle>,
}

impl AppState {
    /// Spawns a dashboard task for each view. Must be called from within a
    /// Tokio runtime.
    #[must_use]
    pub fn spawn(views: Vec<ViewDefinition>, root: &DataRoot) -> Self {
        let handles = views
            .into_iter()
            .map(|view| DashboardHandle::spawn(view, root))
            .collect();
        Self { handles }
    }

    /// All views in navigation order.
    pub fn views(&self) -> impl Iterator<Item = &DashboardHandle> {
        self.handles.iter()
    }

    /// The view with id `id`.
    #[must_use]
    pub fn view(&self, id: &str) -> Option<&DashboardHandle> {
        self.handles.iter().find(|h| h.view().id == id)
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(handlers::json_error))
            .route("/health", web::get().to(handlers::health))
            .route("/views", web::get().to(handlers::views))
            .route("/views/{id}", web::get().to(handlers::snapshot))
            .route("/views/{id}/regions", web::get().to(handlers::regions))
            .route("/views/{id}/events", web::post().to(handlers::apply_event)),
    );
}

/// Starts the dashboard API server.
///
/// Spawns one dashboard per configured view (each begins loading its dataset
/// immediately) and serves the API until shutdown. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let views = game_viz_view::all_views();
    log::info!("Starting {} views from {:?}", views.len(), config.data_root);
    let state = web::Data::new(AppState::spawn(views, &config.data_root));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use actix_web::{http::StatusCode, test};
    use game_viz_view::view_by_id;

    use super::*;

    const CALIFORNIA_CSV: &str = "\
County,Weekly_Avg_Video_Game_Hours,Weekly_Avg_Exercise_Hours,Lat,Lon
Alameda,6.0,3.0,37.6,-122.0
Fresno,8.0,2.0,36.7,-119.8
Alameda,4.0,5.0,37.8,-122.2
";

    async fn loaded_state(name: &str) -> (web::Data<AppState>, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "game_viz_server_{name}_{}",
            std::process::id()
        ));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("incomedata_ca.csv"), CALIFORNIA_CSV)
            .await
            .unwrap();

        let state = AppState::spawn(
            vec![view_by_id("california").unwrap()],
            &DataRoot::Dir(dir.clone()),
        );
        for handle in state.views() {
            handle.wait_until_loaded().await.unwrap();
        }
        (web::Data::new(state), dir)
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn lists_views_and_serves_snapshots() {
        let (state, dir) = loaded_state("list").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/views").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], "california");
        assert_eq!(body[0]["status"], "ready");
        assert_eq!(body[0]["recordCount"], 3);

        let req = test::TestRequest::get()
            .uri("/api/views/california")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["filterLabel"], "California");
        assert_eq!(body["inScopeCount"], 3);

        let req = test::TestRequest::get()
            .uri("/api/views/california/regions")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["regions"], serde_json::json!(["All", "Alameda", "Fresno"]));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[actix_web::test]
    async fn posting_an_event_returns_the_new_snapshot() {
        let (state, dir) = loaded_state("event").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/views/california/events")
            .set_json(serde_json::json!({"type": "select_region", "name": "Fresno"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["filter"]["scope"], "region");
        assert_eq!(body["filterLabel"], "Fresno");
        assert_eq!(body["inScopeCount"], 1);
        assert_eq!(body["viewport"]["zoom"], 8.0);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[actix_web::test]
    async fn unknown_view_is_404() {
        let (state, dir) = loaded_state("missing").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/views/atlantis").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "View 'atlantis' not found");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[actix_web::test]
    async fn unknown_cell_is_400() {
        let (state, dir) = loaded_state("cell").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/views/california/events")
            .set_json(serde_json::json!({"type": "select_cell_by_id", "cellId": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unknown cell 'nope' in view 'california'");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[actix_web::test]
    async fn unknown_event_type_is_json_400() {
        let (state, dir) = loaded_state("bad_event").await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/views/california/events")
            .set_json(serde_json::json!({"type": "zoom"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("unknown variant `zoom`"), "{message}");

        let snapshot = test::TestRequest::get()
            .uri("/api/views/california")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, snapshot).await;
        assert_eq!(body["filter"]["scope"], "all");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
