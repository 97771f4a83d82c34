use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const RESOURCE_KINDS: [&str; 2] = ["vds", "vhost"];

/// Service record as the panel reports it: id, lifecycle status, and every
/// parameter set through `edit`/`open`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub elid: String,
    pub status: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Service {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "elid" => Some(self.elid.clone()),
            "status" => Some(self.status.clone()),
            other => self.params.get(other).and_then(scalar),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuSession {
    pub user_id: String,
    pub auth: String,
}

#[derive(Default)]
struct Store {
    next_id: u64,
    services: BTreeMap<u64, Service>,
    filter: Map<String, Value>,
}

struct Panel {
    api_key: String,
    stores: RwLock<HashMap<&'static str, Store>>,
}

type SharedPanel = Arc<Panel>;

pub fn app(api_key: &str) -> Router {
    let stores: HashMap<&'static str, Store> = RESOURCE_KINDS
        .iter()
        .map(|kind| (*kind, Store::default()))
        .collect();
    let panel: SharedPanel = Arc::new(Panel {
        api_key: api_key.to_string(),
        stores: RwLock::new(stores),
    });
    Router::new()
        .route("/{resource}", get(list_services))
        .route("/{resource}/filter", post(set_filter))
        .route("/{resource}/edit", post(edit_service))
        .route("/{resource}/open", post(open_service))
        .route("/{resource}/delete", post(delete_services))
        .route("/{resource}/suspend", post(suspend_services))
        .route("/{resource}/resume", post(resume_services))
        .route("/{resource}/su", get(su_login))
        .layer(middleware::from_fn_with_state(panel.clone(), require_bearer))
        .with_state(panel)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_bearer(
    State(panel): State<SharedPanel>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = format!("Bearer {}", panel.api_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        debug!(uri = %request.uri(), "rejecting request without valid bearer key");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn resource_kind(resource: &str) -> Result<&'static str, StatusCode> {
    RESOURCE_KINDS
        .iter()
        .copied()
        .find(|kind| *kind == resource)
        .ok_or(StatusCode::NOT_FOUND)
}

/// String form of a scalar JSON value; `None` for null, arrays and objects.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if *flag { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn confirmed(params: &Map<String, Value>) -> bool {
    params.get("sok").and_then(Value::as_str) == Some("ok")
}

/// Parse an `elid` list such as `"1, 2"`. `None` if any id is malformed.
fn parse_elid(raw: &str) -> Option<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse().ok())
        .collect()
}

fn lookup_id(params: &Map<String, Value>) -> Result<Option<u64>, StatusCode> {
    match params.get("elid").and_then(scalar) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| StatusCode::NOT_FOUND),
    }
}

async fn list_services(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<DataResponse<Vec<Service>>>, StatusCode> {
    let kind = resource_kind(&resource)?;
    let stores = panel.stores.read().await;
    let store = stores.get(kind).ok_or(StatusCode::NOT_FOUND)?;

    let mut criteria: HashMap<String, String> = store
        .filter
        .iter()
        .filter_map(|(name, value)| scalar(value).map(|value| (name.clone(), value)))
        .collect();
    criteria.extend(query);

    let services = store
        .services
        .values()
        .filter(|service| {
            criteria
                .iter()
                .all(|(name, value)| service.field(name).as_deref() == Some(value.as_str()))
        })
        .cloned()
        .collect();
    Ok(Json(DataResponse { data: services }))
}

async fn set_filter(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Json(filter): Json<Map<String, Value>>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    let kind = resource_kind(&resource)?;
    let mut stores = panel.stores.write().await;
    let store = stores.get_mut(kind).ok_or(StatusCode::NOT_FOUND)?;
    info!(resource = kind, keys = filter.len(), "filter saved");
    store.filter = filter;
    Ok(Json(SuccessResponse { success: true }))
}

async fn edit_service(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Json(mut params): Json<Map<String, Value>>,
) -> Result<Json<DataResponse<Option<Service>>>, StatusCode> {
    let kind = resource_kind(&resource)?;
    let mut stores = panel.stores.write().await;
    let store = stores.get_mut(kind).ok_or(StatusCode::NOT_FOUND)?;
    let id = lookup_id(&params)?;

    if !confirmed(&params) {
        // Unconfirmed forms only echo the current state.
        let current = match id {
            Some(id) => Some(store.services.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?),
            None => None,
        };
        return Ok(Json(DataResponse { data: current }));
    }
    params.remove("sok");
    params.remove("elid");

    let service = match id {
        Some(id) => {
            let service = store.services.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
            service.params.extend(params);
            info!(resource = kind, elid = id, "service updated");
            service.clone()
        }
        None => {
            store.next_id += 1;
            let id = store.next_id;
            let service = Service {
                elid: id.to_string(),
                status: "ordered".to_string(),
                params,
            };
            store.services.insert(id, service.clone());
            info!(resource = kind, elid = id, "service created");
            service
        }
    };
    Ok(Json(DataResponse { data: Some(service) }))
}

async fn open_service(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Json(mut params): Json<Map<String, Value>>,
) -> Result<Json<DataResponse<Option<Service>>>, StatusCode> {
    let kind = resource_kind(&resource)?;
    let mut stores = panel.stores.write().await;
    let store = stores.get_mut(kind).ok_or(StatusCode::NOT_FOUND)?;
    let id = lookup_id(&params)?.ok_or(StatusCode::BAD_REQUEST)?;
    let service = store.services.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    if !confirmed(&params) {
        return Ok(Json(DataResponse { data: None }));
    }
    params.remove("sok");
    params.remove("elid");
    service.params.extend(params);
    service.status = "active".to_string();
    info!(resource = kind, elid = id, "service opened");
    Ok(Json(DataResponse {
        data: Some(service.clone()),
    }))
}

enum BatchAction {
    Delete,
    Suspend,
    Resume,
}

async fn apply_batch(
    panel: &Panel,
    resource: &str,
    query: &HashMap<String, String>,
    action: BatchAction,
) -> Result<Json<SuccessResponse>, StatusCode> {
    let kind = resource_kind(resource)?;
    let raw = query.get("elid").ok_or(StatusCode::BAD_REQUEST)?;
    let mut stores = panel.stores.write().await;
    let store = stores.get_mut(kind).ok_or(StatusCode::NOT_FOUND)?;

    let ids = match parse_elid(raw) {
        Some(ids) if !ids.is_empty() && ids.iter().all(|id| store.services.contains_key(id)) => ids,
        _ => {
            debug!(resource = kind, elid = %raw, "batch rejected, unknown ids");
            return Ok(Json(SuccessResponse { success: false }));
        }
    };

    for id in &ids {
        match action {
            BatchAction::Delete => {
                store.services.remove(id);
            }
            BatchAction::Suspend | BatchAction::Resume => {
                if let Some(service) = store.services.get_mut(id) {
                    service.status = match action {
                        BatchAction::Suspend => "suspended",
                        _ => "active",
                    }
                    .to_string();
                }
            }
        }
    }
    info!(resource = kind, count = ids.len(), "batch applied");
    Ok(Json(SuccessResponse { success: true }))
}

async fn delete_services(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    apply_batch(&panel, &resource, &query, BatchAction::Delete).await
}

async fn suspend_services(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    apply_batch(&panel, &resource, &query, BatchAction::Suspend).await
}

async fn resume_services(
    State(panel): State<SharedPanel>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<SuccessResponse>, StatusCode> {
    apply_batch(&panel, &resource, &query, BatchAction::Resume).await
}

async fn su_login(
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<DataResponse<SuSession>>, StatusCode> {
    resource_kind(&resource)?;
    let user_id = query.get("user_id").ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(DataResponse {
        data: SuSession {
            user_id: user_id.clone(),
            auth: Uuid::new_v4().simple().to_string(),
        },
    }))
}
