use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub owner: Option<String>,
    pub project: String,
    pub snapshots: u32,
    pub stacks: Vec<String>,
    pub platform: Option<String>,
    pub android: bool,
    pub auto_repackaging: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotReceipt {
    pub id: Uuid,
    pub owner: Option<String>,
    pub project: String,
    pub parts: usize,
    pub stacks: Vec<String>,
}

#[derive(Deserialize)]
pub struct DeleteProject {
    pub owner: Option<String>,
    pub project: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub project: String,
    pub deleted: bool,
}

pub type Db = Arc<RwLock<HashMap<(String, String), ProjectStatus>>>;

type ApiError = (StatusCode, String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    let api = Router::new()
        .route("/{owner}/{project}", delete(delete_project))
        .route("/{owner}/{project}/snapshot", post(post_snapshot))
        .route("/{owner}/{project}/status", get(project_status));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Every route needs Basic credentials; their value is not checked.
fn authorize(headers: &HeaderMap) -> Result<(), ApiError> {
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if basic {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "missing credentials".to_string()))
    }
}

fn bad_request(e: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn post_snapshot(
    State(db): State<Db>,
    Path((owner, project)): Path<(String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SnapshotReceipt>), ApiError> {
    authorize(&headers)?;

    let mut meta = ProjectStatus {
        owner: Some(owner.clone()),
        project: project.clone(),
        ..ProjectStatus::default()
    };
    let mut parts = 0;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            field.bytes().await.map_err(bad_request)?;
            parts += 1;
            continue;
        }
        let value = field.text().await.map_err(bad_request)?;
        match name.as_str() {
            "stacks" => meta.stacks.push(value),
            "platform" => meta.platform = Some(value),
            "android" => meta.android = value == "true",
            "autoRepackaging" => meta.auto_repackaging = value == "true",
            _ => {}
        }
    }
    if parts == 0 {
        return Err(bad_request("snapshot carries no payload"));
    }

    let mut projects = db.write().await;
    let entry = projects
        .entry((owner.clone(), project.clone()))
        .or_insert_with(|| ProjectStatus {
            owner: Some(owner.clone()),
            project: project.clone(),
            ..ProjectStatus::default()
        });
    entry.snapshots += 1;
    entry.stacks = meta.stacks.clone();
    entry.platform = meta.platform;
    entry.android = meta.android;
    entry.auto_repackaging = meta.auto_repackaging;

    tracing::info!(%owner, %project, parts, "snapshot received");
    Ok((
        StatusCode::CREATED,
        Json(SnapshotReceipt {
            id: Uuid::new_v4(),
            owner: Some(owner),
            project,
            parts,
            stacks: meta.stacks,
        }),
    ))
}

async fn delete_project(
    State(db): State<Db>,
    Path((owner, project)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<DeleteProject>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    authorize(&headers)?;
    let owner_matches = input.owner.as_deref().map_or(true, |o| o == owner);
    if input.project != project || !owner_matches {
        return Err(bad_request("body does not match the project in the path"));
    }

    let mut projects = db.write().await;
    match projects.remove(&(owner.clone(), project.clone())) {
        Some(_) => {
            tracing::info!(%owner, %project, "project deleted");
            Ok(Json(DeleteConfirmation {
                project,
                deleted: true,
            }))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            format!("project {owner}/{project} not found"),
        )),
    }
}

async fn project_status(
    State(db): State<Db>,
    Path((owner, project)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ProjectStatus>, ApiError> {
    authorize(&headers)?;
    let projects = db.read().await;
    projects
        .get(&(owner.clone(), project.clone()))
        .cloned()
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("project {owner}/{project} not found"),
        ))
}
