//! 测试用的假后端：在随机端口上提供 `/api` 下的 REST 接口，并记录收到的请求
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Multipart, Path, Query, Request, State},
    http::{Response, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use epage::{backend::HttpBackend, config::Site, state::AppState, web};

#[derive(Default)]
struct Store {
    articles: Vec<Value>,
    categories: Vec<Value>,
    comments: Vec<Value>,
    uploads: Vec<(String, String)>,
    requests: Vec<String>,
    failing: bool,
    next_id: usize,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn category_name(&self, id: &str) -> Value {
        self.categories
            .iter()
            .find(|c| c["id"] == id)
            .map(|c| c["name"].clone())
            .unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
pub struct FakeApi {
    store: Arc<Mutex<Store>>,
}

impl FakeApi {
    /// 两个分类、三篇文章（其中一篇草稿）、两条评论（其中一条待审核）
    pub fn seeded() -> Self {
        let api = Self::default();
        {
            let mut store = api.store.lock().unwrap();
            store.categories = vec![
                json!({"id": "c1", "name": "Politique", "description": "Vie politique", "color": "#CE1021"}),
                json!({"id": "c2", "name": "Économie", "description": "Économie nationale", "color": "#007FFF"}),
            ];
            store.articles = vec![
                json!({
                    "id": "a1",
                    "title": "Les élections de 2024",
                    "content": "<p>Le scrutin <strong>présidentiel</strong> approche.</p>",
                    "author": "Jean Mbala",
                    "category_id": "c1",
                    "category_name": "Politique",
                    "image_url": "/api/uploads/urne.jpg",
                    "published": true,
                    "created_at": "2024-03-15T12:00:00Z"
                }),
                json!({
                    "id": "a2",
                    "title": "Budget national",
                    "content": "<p>Le budget est voté.</p>",
                    "author": "Marie Kabila",
                    "category_id": "c2",
                    "category_name": "Économie",
                    "image_url": "",
                    "published": true,
                    "created_at": "2024-03-10T12:00:00Z"
                }),
                json!({
                    "id": "a3",
                    "title": "Brouillon sur la réforme",
                    "content": "<p>À compléter</p>",
                    "author": "Jean Mbala",
                    "category_id": "c1",
                    "category_name": "Politique",
                    "published": false,
                    "created_at": "2024-03-01T12:00:00Z"
                }),
            ];
            store.comments = vec![
                json!({"id": "m1", "article_id": "a1", "author": "Jean", "content": "Bon article", "approved": true, "created_at": "2024-03-16T08:00:00Z"}),
                json!({"id": "m2", "article_id": "a1", "author": "Paul", "content": "Message en attente", "approved": false, "created_at": "2024-03-16T09:00:00Z"}),
            ];
            // 新建的 id 从 101 开始，不与上面的数据冲突
            store.next_id = 100;
        }
        api
    }

    /// 在随机端口上启动，返回后端源地址
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("绑定端口失败");
        let addr = listener.local_addr().expect("读取地址失败");
        let router = self.router();

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("假后端启动失败");
        });

        format!("http://{}", addr)
    }

    fn router(&self) -> Router {
        let api = Router::new()
            .route("/articles", get(list_articles).post(create_article))
            .route(
                "/articles/{id}",
                get(get_article).put(update_article).delete(delete_article),
            )
            .route("/categories", get(list_categories).post(create_category))
            .route("/categories/{id}", axum::routing::delete(delete_category))
            .route("/comments", post(create_comment))
            .route(
                "/comments/{id}",
                get(list_comments).delete(delete_comment),
            )
            .route("/comments/{id}/approve", put(approve_comment))
            .route("/upload", post(upload));

        Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }

    /// 之后的所有请求都返回 500
    pub fn set_failing(&self, failing: bool) {
        self.store.lock().unwrap().failing = failing;
    }

    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.store.lock().unwrap().requests.clear();
    }

    pub fn article(&self, id: &str) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store.articles.iter().find(|a| a["id"] == id).cloned()
    }

    pub fn comments(&self) -> Vec<Value> {
        self.store.lock().unwrap().comments.clone()
    }

    pub fn categories(&self) -> Vec<Value> {
        self.store.lock().unwrap().categories.clone()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.store.lock().unwrap().uploads.clone()
    }
}

async fn record(State(api): State<FakeApi>, req: Request, next: Next) -> axum::response::Response {
    let failing = {
        let mut store = api.store.lock().unwrap();
        store.requests.push(format!("{} {}", req.method(), req.uri()));
        store.failing
    };

    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    next.run(req).await
}

fn not_found() -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))).into_response()
}

async fn list_articles(
    State(api): State<FakeApi>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let store = api.store.lock().unwrap();
    let published_only = params.get("published_only").is_some_and(|v| v == "true");
    let search = params.get("search").map(|s| s.to_lowercase());

    let articles = store
        .articles
        .iter()
        .filter(|a| !published_only || a["published"] == true)
        .filter(|a| match params.get("category_id") {
            Some(id) => a["category_id"] == id.as_str(),
            None => true,
        })
        .filter(|a| match &search {
            Some(s) => {
                let title = a["title"].as_str().unwrap_or_default().to_lowercase();
                let content = a["content"].as_str().unwrap_or_default().to_lowercase();
                title.contains(s) || content.contains(s)
            }
            None => true,
        })
        .cloned()
        .collect();

    Json(articles)
}

async fn get_article(State(api): State<FakeApi>, Path(id): Path<String>) -> axum::response::Response {
    match api.article(&id) {
        Some(article) => Json(article).into_response(),
        None => not_found(),
    }
}

async fn create_article(State(api): State<FakeApi>, Json(mut draft): Json<Value>) -> Json<Value> {
    let mut store = api.store.lock().unwrap();
    draft["id"] = json!(store.next_id("a"));
    draft["category_name"] = store.category_name(draft["category_id"].as_str().unwrap_or_default());
    draft["created_at"] = json!("2024-04-01T10:00:00Z");
    store.articles.insert(0, draft.clone());
    Json(draft)
}

async fn update_article(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    Json(draft): Json<Value>,
) -> axum::response::Response {
    let mut store = api.store.lock().unwrap();
    let category_name = store.category_name(draft["category_id"].as_str().unwrap_or_default());
    let Some(article) = store.articles.iter_mut().find(|a| a["id"] == id.as_str()) else {
        return not_found();
    };

    if let (Some(article), Some(draft)) = (article.as_object_mut(), draft.as_object()) {
        for (key, value) in draft {
            article.insert(key.clone(), value.clone());
        }
        article.insert("category_name".to_string(), category_name);
        article.insert("updated_at".to_string(), json!("2024-04-02T10:00:00Z"));
    }
    Json(article.clone()).into_response()
}

async fn delete_article(State(api): State<FakeApi>, Path(id): Path<String>) -> StatusCode {
    let mut store = api.store.lock().unwrap();
    store.articles.retain(|a| a["id"] != id.as_str());
    store.comments.retain(|c| c["article_id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn list_categories(State(api): State<FakeApi>) -> Json<Vec<Value>> {
    Json(api.categories())
}

async fn create_category(State(api): State<FakeApi>, Json(mut draft): Json<Value>) -> Json<Value> {
    let mut store = api.store.lock().unwrap();
    draft["id"] = json!(store.next_id("c"));
    store.categories.push(draft.clone());
    Json(draft)
}

async fn delete_category(State(api): State<FakeApi>, Path(id): Path<String>) -> StatusCode {
    let mut store = api.store.lock().unwrap();
    store.categories.retain(|c| c["id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn list_comments(
    State(api): State<FakeApi>,
    Path(article_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let approved_only = params.get("approved_only").is_some_and(|v| v == "true");
    let comments = api
        .comments()
        .into_iter()
        .filter(|c| c["article_id"] == article_id.as_str())
        .filter(|c| !approved_only || c["approved"] == true)
        .collect();
    Json(comments)
}

async fn create_comment(State(api): State<FakeApi>, Json(mut draft): Json<Value>) -> Json<Value> {
    let mut store = api.store.lock().unwrap();
    draft["id"] = json!(store.next_id("m"));
    draft["approved"] = json!(false);
    draft["created_at"] = json!("2024-04-01T10:00:00Z");
    store.comments.push(draft.clone());
    Json(draft)
}

async fn approve_comment(State(api): State<FakeApi>, Path(id): Path<String>) -> axum::response::Response {
    let mut store = api.store.lock().unwrap();
    match store.comments.iter_mut().find(|c| c["id"] == id.as_str()) {
        Some(comment) => {
            comment["approved"] = json!(true);
            Json(json!({"message": "Comment approved"})).into_response()
        }
        None => not_found(),
    }
}

async fn delete_comment(State(api): State<FakeApi>, Path(id): Path<String>) -> StatusCode {
    let mut store = api.store.lock().unwrap();
    store.comments.retain(|c| c["id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn upload(State(api): State<FakeApi>, mut multipart: Multipart) -> axum::response::Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return (StatusCode::BAD_REQUEST, "File must be an image").into_response();
        }

        api.store
            .lock()
            .unwrap()
            .uploads
            .push((file_name.clone(), content_type));
        return Json(json!({"url": format!("/api/uploads/{}", file_name)})).into_response();
    }

    (StatusCode::BAD_REQUEST, "missing file").into_response()
}

/// 被测的前端应用，后端指向假后端
pub struct TestApp {
    router: Router,
    pub api: FakeApi,
    pub origin: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let api = FakeApi::seeded();
        let origin = api.spawn().await;
        let backend = HttpBackend::new(&origin).expect("创建客户端失败");
        let router = web::setup_route(AppState::new(backend, Site::default()));

        Self {
            router,
            api,
            origin,
        }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot fail")
    }

    /// 发送 GET 请求，返回状态码和页面内容
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let req = Request::get(uri).body(Body::empty()).expect("请求失败");
        read(self.request(req).await).await
    }

    /// 发送表单请求
    pub async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, String) {
        let req = Request::post(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::new(body.to_string()))
            .expect("请求失败");
        read(self.request(req).await).await
    }

    /// 发送 multipart 表单，`file` 为 (字段名, 文件名, 类型, 内容)
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &str, &[u8])>,
    ) -> (StatusCode, String) {
        const BOUNDARY: &str = "epage-test-boundary";

        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, name, file_name, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let req = Request::post(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .expect("请求失败");
        read(self.request(req).await).await
    }
}

async fn read(resp: Response<Body>) -> (StatusCode, String) {
    let status = resp.status();
    let data = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("读取数据失败");
    let text = String::from_utf8(data.to_vec()).expect("读取数据失败");
    (status, text)
}
