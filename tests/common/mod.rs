//! In-memory mock of an RDF4J-style server for integration tests
//!
//! Statements are stored as N-Quads lines. Queries are not evaluated:
//! SELECT echoes the query text and parameters back as result rows, ASK
//! answers whether the repository has any statements.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use triplestore_client::{ClientConfig, TripleStoreClient};

type Params = Vec<(String, String)>;
type Shared = Arc<Mutex<ServerState>>;

#[derive(Default)]
struct Repo {
    title: String,
    statements: Vec<String>,
    namespaces: BTreeMap<String, String>,
    graphs: BTreeMap<String, Vec<String>>,
}

struct Tx {
    repo: String,
    working: Vec<String>,
}

pub struct ServerState {
    base_url: String,
    repos: BTreeMap<String, Repo>,
    transactions: HashMap<String, Tx>,
    next_tx: u64,
    auth: Option<String>,
    log: Vec<(Method, String)>,
}

pub struct MockServer {
    pub base_url: String,
    state: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with_auth(None).await
    }

    /// Start a server that rejects requests without this Authorization header
    pub async fn start_with_auth(auth: Option<&str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(ServerState {
            base_url: base_url.clone(),
            repos: BTreeMap::new(),
            transactions: HashMap::new(),
            next_tx: 1,
            auth: auth.map(str::to_string),
            log: Vec::new(),
        }));

        let app = router(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server failed: {}", e);
            }
        });

        Self { base_url, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
    }

    pub fn client(&self) -> TripleStoreClient {
        TripleStoreClient::new(self.config()).unwrap()
    }

    /// Create a repository directly in server state
    pub fn add_repository(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(id.to_string(), Repo::default());
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().log.len()
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn open_transactions(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/protocol", get(|| async { "12" }))
        .route("/repositories", get(list_repositories))
        .route(
            "/repositories/:id",
            get(query_get).post(query_post).put(create_repository).delete(delete_repository),
        )
        .route("/repositories/:id/size", get(size))
        .route("/repositories/:id/contexts", get(contexts))
        .route(
            "/repositories/:id/statements",
            get(get_statements).post(post_statements).put(put_statements).delete(delete_statements),
        )
        .route("/repositories/:id/namespaces", get(list_namespaces).delete(clear_namespaces))
        .route(
            "/repositories/:id/namespaces/:prefix",
            get(get_namespace).put(set_namespace).delete(delete_namespace),
        )
        .route("/repositories/:id/transactions", axum::routing::post(begin_transaction))
        .route(
            "/repositories/:id/transactions/:tx",
            put(transaction_action).delete(transaction_action),
        )
        .route(
            "/repositories/:id/rdf-graphs/service",
            get(graph_get).put(graph_put).post(graph_post).delete(graph_delete),
        )
        .route(
            "/repositories/:id/rdf-graphs/:name",
            get(graph_get).put(graph_put).post(graph_post).delete(graph_delete),
        )
        .layer(middleware::from_fn_with_state(state.clone(), check_auth))
        .with_state(state)
}

async fn check_auth(State(state): State<Shared>, request: Request, next: Next) -> Response {
    {
        let mut guard = state.lock().unwrap();
        guard.log.push((request.method().clone(), request.uri().path().to_string()));
        if let Some(expected) = &guard.auth {
            let given = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            if given != Some(expected.as_str()) {
                return StatusCode::UNAUTHORIZED.into_response();
            }
        }
    }
    next.run(request).await
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("Unknown {}", what)).into_response()
}

fn sparql_json(value: serde_json::Value) -> Response {
    (
        [(header::CONTENT_TYPE, "application/sparql-results+json")],
        value.to_string(),
    )
        .into_response()
}

fn text(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn parse_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.trim_end_matches('.').trim_end().to_string())
        .collect()
}

fn terms(statement: &str) -> Vec<&str> {
    statement.split_whitespace().collect()
}

fn graph_of(statement: &str) -> &str {
    terms(statement).get(3).copied().unwrap_or("null")
}

fn with_context(lines: Vec<String>, params: &Params) -> Vec<String> {
    match param(params, "context") {
        Some(context) => lines
            .into_iter()
            .map(|l| {
                if terms(&l).len() == 3 {
                    format!("{} {}", l, context)
                } else {
                    l
                }
            })
            .collect(),
        None => lines,
    }
}

fn matches(statement: &str, params: &Params) -> bool {
    let t = terms(statement);
    if let Some(subj) = param(params, "subj") {
        if t.first() != Some(&subj) {
            return false;
        }
    }
    if let Some(pred) = param(params, "pred") {
        if t.get(1) != Some(&pred) {
            return false;
        }
    }
    if let Some(contexts) = param(params, "context") {
        let graph = graph_of(statement);
        if !contexts.split(',').any(|c| c == graph) {
            return false;
        }
    }
    true
}

fn nquads(statements: &[&String]) -> String {
    statements.iter().map(|s| format!("{} .\n", s)).collect()
}

/// Echo a query back as a result table: one row for the query text, one per parameter
fn echo(query: &str, params: &Params, statements: &[String]) -> Response {
    if query.trim_start().to_uppercase().starts_with("ASK") {
        return sparql_json(json!({"head": {}, "boolean": !statements.is_empty()}));
    }

    let mut rows = vec![json!({
        "name": {"type": "literal", "value": "query"},
        "value": {"type": "literal", "value": query},
    })];
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    for (k, v) in sorted {
        rows.push(json!({
            "name": {"type": "literal", "value": k},
            "value": {"type": "literal", "value": v},
        }));
    }
    sparql_json(json!({"head": {"vars": ["name", "value"]}, "results": {"bindings": rows}}))
}

// ---------------------------------------------------------------
// Repositories and queries
// ---------------------------------------------------------------

async fn list_repositories(State(state): State<Shared>) -> Response {
    let guard = state.lock().unwrap();
    let rows: Vec<serde_json::Value> = guard
        .repos
        .iter()
        .map(|(id, repo)| {
            json!({
                "uri": {"type": "uri", "value": format!("{}/repositories/{}", guard.base_url, id)},
                "id": {"type": "literal", "value": id},
                "title": {"type": "literal", "value": repo.title},
                "readable": {"type": "literal", "value": "true"},
                "writable": {"type": "literal", "value": "true"},
            })
        })
        .collect();
    sparql_json(json!({
        "head": {"vars": ["uri", "id", "title", "readable", "writable"]},
        "results": {"bindings": rows}
    }))
}

async fn create_repository(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !content_type(&headers).starts_with("text/turtle") {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    let title = body
        .lines()
        .find_map(|l| l.trim().strip_prefix("rdfs:label \""))
        .and_then(|rest| rest.split('"').next())
        .unwrap_or_default()
        .to_string();

    let mut guard = state.lock().unwrap();
    if guard.repos.contains_key(&id) {
        return (StatusCode::CONFLICT, "repository exists").into_response();
    }
    guard.repos.insert(
        id,
        Repo {
            title,
            ..Repo::default()
        },
    );
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_repository(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match state.lock().unwrap().repos.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("repository"),
    }
}

async fn query_get(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let Some(query) = param(&params, "query") else {
        return (StatusCode::BAD_REQUEST, "missing query").into_response();
    };
    let rest: Params = params.iter().filter(|(k, _)| k != "query").cloned().collect();
    echo(query, &rest, &repo.statements)
}

async fn query_post(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !content_type(&headers).starts_with("application/sparql-query") {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    echo(&body, &params, &repo.statements)
}

async fn size(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let count = repo.statements.iter().filter(|s| matches(s, &params)).count();
    text(count.to_string())
}

async fn contexts(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let mut seen: Vec<&str> = Vec::new();
    for statement in &repo.statements {
        let graph = graph_of(statement);
        if graph != "null" && !seen.contains(&graph) {
            seen.push(graph);
        }
    }
    let rows: Vec<serde_json::Value> = seen
        .iter()
        .map(|g| json!({"contextID": {"type": "uri", "value": g.trim_matches(['<', '>'])}}))
        .collect();
    sparql_json(json!({"head": {"vars": ["contextID"]}, "results": {"bindings": rows}}))
}

// ---------------------------------------------------------------
// Statements
// ---------------------------------------------------------------

async fn get_statements(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> Response {
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let selected: Vec<&String> = repo.statements.iter().filter(|s| matches(s, &params)).collect();

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if accept == "application/rdf+json" {
        let mut doc = serde_json::Map::new();
        for statement in selected {
            let t = terms(statement);
            let subject = t[0].trim_matches(['<', '>']).to_string();
            let predicate = t[1].trim_matches(['<', '>']).to_string();
            let entry = doc
                .entry(subject)
                .or_insert_with(|| json!({}))
                .as_object_mut()
                .unwrap()
                .entry(predicate)
                .or_insert_with(|| json!([]));
            entry
                .as_array_mut()
                .unwrap()
                .push(json!({"type": "uri", "value": t[2].trim_matches(['<', '>'])}));
        }
        return ([(header::CONTENT_TYPE, "application/rdf+json")], serde_json::Value::Object(doc).to_string())
            .into_response();
    }
    ([(header::CONTENT_TYPE, "application/n-quads")], nquads(&selected)).into_response()
}

async fn post_statements(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    if content_type(&headers).starts_with("application/sparql-update") {
        return match body.trim() {
            "CLEAR ALL" => {
                repo.statements.clear();
                StatusCode::NO_CONTENT.into_response()
            }
            _ => (StatusCode::BAD_REQUEST, "MALFORMED QUERY").into_response(),
        };
    }
    repo.statements.extend(with_context(parse_lines(&body), &params));
    StatusCode::NO_CONTENT.into_response()
}

async fn put_statements(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    let replacement = with_context(parse_lines(&body), &params);
    match param(&params, "context") {
        Some(_) => repo.statements.retain(|s| !matches(s, &params)),
        None => repo.statements.clear(),
    }
    repo.statements.extend(replacement);
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_statements(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.statements.retain(|s| !matches(s, &params));
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------

async fn list_namespaces(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let rows: Vec<serde_json::Value> = repo
        .namespaces
        .iter()
        .map(|(prefix, ns)| {
            json!({
                "prefix": {"type": "literal", "value": prefix},
                "namespace": {"type": "literal", "value": ns},
            })
        })
        .collect();
    sparql_json(json!({"head": {"vars": ["prefix", "namespace"]}, "results": {"bindings": rows}}))
}

async fn clear_namespaces(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.namespaces.clear();
    StatusCode::NO_CONTENT.into_response()
}

async fn get_namespace(
    State(state): State<Shared>,
    Path((id, prefix)): Path<(String, String)>,
) -> Response {
    let guard = state.lock().unwrap();
    match guard.repos.get(&id).and_then(|r| r.namespaces.get(&prefix)) {
        Some(ns) => text(ns.clone()),
        None => not_found("namespace"),
    }
}

async fn set_namespace(
    State(state): State<Shared>,
    Path((id, prefix)): Path<(String, String)>,
    body: String,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.namespaces.insert(prefix, body.trim().to_string());
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_namespace(
    State(state): State<Shared>,
    Path((id, prefix)): Path<(String, String)>,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.namespaces.remove(&prefix);
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------

async fn begin_transaction(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(repo) = guard.repos.get(&id) else {
        return not_found("repository");
    };
    let working = repo.statements.clone();
    let tx_id = format!("tx-{:04}", guard.next_tx);
    guard.next_tx += 1;
    guard.transactions.insert(tx_id.clone(), Tx { repo: id.clone(), working });

    let location = format!("{}/repositories/{}/transactions/{}", guard.base_url, id, tx_id);
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

async fn transaction_action(
    State(state): State<Shared>,
    Path((id, tx_id)): Path<(String, String)>,
    Query(params): Query<Params>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut guard = state.lock().unwrap();
    let server = &mut *guard;
    let action = param(&params, "action").unwrap_or_default().to_string();

    if method == Method::DELETE {
        return match server.transactions.remove(&tx_id) {
            Some(_) => StatusCode::NO_CONTENT.into_response(),
            None => not_found("transaction"),
        };
    }

    let Some(tx) = server.transactions.get_mut(&tx_id) else {
        return not_found("transaction");
    };
    if tx.repo != id {
        return not_found("transaction");
    }

    match action.as_str() {
        "ADD" => {
            tx.working.extend(with_context(parse_lines(&body), &params));
            StatusCode::OK.into_response()
        }
        "DELETE" => {
            let removed = parse_lines(&body);
            tx.working.retain(|s| !removed.contains(s));
            StatusCode::OK.into_response()
        }
        "UPDATE" => {
            if !content_type(&headers).starts_with("application/sparql-update") {
                return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
            }
            match body.trim() {
                "CLEAR ALL" => {
                    tx.working.clear();
                    StatusCode::OK.into_response()
                }
                _ => (StatusCode::BAD_REQUEST, "MALFORMED QUERY").into_response(),
            }
        }
        "QUERY" => {
            let rest: Params = params.iter().filter(|(k, _)| k != "action").cloned().collect();
            echo(&body, &rest, &tx.working)
        }
        "GET" => {
            let selected: Vec<&String> = tx.working.iter().filter(|s| matches(s, &params)).collect();
            ([(header::CONTENT_TYPE, "application/n-quads")], nquads(&selected)).into_response()
        }
        "SIZE" => {
            let count = tx.working.iter().filter(|s| matches(s, &params)).count();
            text(count.to_string())
        }
        "PING" => StatusCode::OK.into_response(),
        "COMMIT" => {
            let Some(tx) = server.transactions.remove(&tx_id) else {
                return not_found("transaction");
            };
            if let Some(repo) = server.repos.get_mut(&tx.repo) {
                repo.statements = tx.working;
            }
            StatusCode::OK.into_response()
        }
        other => (StatusCode::BAD_REQUEST, format!("unknown action {}", other)).into_response(),
    }
}

// ---------------------------------------------------------------
// Graph store
// ---------------------------------------------------------------

fn graph_key(state: &ServerState, id: &str, name: Option<&str>, params: &Params) -> Option<String> {
    match name {
        Some(name) => Some(format!("{}/repositories/{}/rdf-graphs/{}", state.base_url, id, name)),
        None if param(params, "default").is_some() => Some(String::new()),
        None => param(params, "graph").map(str::to_string),
    }
}

fn graph_name(path: HashMap<String, String>) -> (String, Option<String>) {
    let id = path.get("id").cloned().unwrap_or_default();
    let name = path.get("name").cloned();
    (id, name)
}

async fn graph_get(
    State(state): State<Shared>,
    Path(path): Path<HashMap<String, String>>,
    Query(params): Query<Params>,
) -> Response {
    let (id, name) = graph_name(path);
    let guard = state.lock().unwrap();
    let Some(key) = graph_key(&guard, &id, name.as_deref(), &params) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match guard.repos.get(&id).and_then(|r| r.graphs.get(&key)) {
        Some(lines) => {
            let refs: Vec<&String> = lines.iter().collect();
            Response::builder()
                .header(header::CONTENT_TYPE, "application/n-triples")
                .body(Body::from(nquads(&refs)))
                .unwrap()
        }
        None => not_found("graph"),
    }
}

async fn graph_put(
    State(state): State<Shared>,
    Path(path): Path<HashMap<String, String>>,
    Query(params): Query<Params>,
    body: String,
) -> Response {
    let (id, name) = graph_name(path);
    let mut guard = state.lock().unwrap();
    let Some(key) = graph_key(&guard, &id, name.as_deref(), &params) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.graphs.insert(key, parse_lines(&body));
    StatusCode::NO_CONTENT.into_response()
}

async fn graph_post(
    State(state): State<Shared>,
    Path(path): Path<HashMap<String, String>>,
    Query(params): Query<Params>,
    body: String,
) -> Response {
    let (id, name) = graph_name(path);
    let mut guard = state.lock().unwrap();
    let Some(key) = graph_key(&guard, &id, name.as_deref(), &params) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(repo) = guard.repos.get_mut(&id) else {
        return not_found("repository");
    };
    repo.graphs.entry(key).or_default().extend(parse_lines(&body));
    StatusCode::NO_CONTENT.into_response()
}

async fn graph_delete(
    State(state): State<Shared>,
    Path(path): Path<HashMap<String, String>>,
    Query(params): Query<Params>,
) -> Response {
    let (id, name) = graph_name(path);
    let mut guard = state.lock().unwrap();
    let Some(key) = graph_key(&guard, &id, name.as_deref(), &params) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match guard.repos.get_mut(&id).and_then(|r| r.graphs.remove(&key)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("graph"),
    }
}
