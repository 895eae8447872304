use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::{header, HeaderName, Method, StatusCode},
    routing::{get, on},
    Json, Router,
};
use model::{
    station::{CreateStation, Station, StationDetails, UpdateStation},
    WithId,
};
use stations::database::Database;
use utility::id::Id;

use crate::{
    common::{
        route_not_found, schema, MessageResponse, RouteErrorResponse, RouteResult,
        METHOD_FILTER_ALL,
    },
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/stations{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes<D: Database + 'static>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Station>))
        .route(
            "/:id",
            get(get_station::<D>)
                .put(update_station::<D>)
                .delete(delete_station::<D>),
        )
        .route("/", get(get_stations::<D>).post(create_station::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn create_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { stations }): State<WebState<D>>,
    payload: Result<Json<CreateStation>, JsonRejection>,
) -> RouteResult<(StatusCode, [(HeaderName, String); 1], Json<MessageResponse>)> {
    let error = |why: RouteErrorResponse| why.with_method(&Method::POST).with_uri(original_uri.path());

    let Json(input) = payload.map_err(|why| error(RouteErrorResponse::malformed_body(why)))?;
    let id = stations
        .create(input)
        .await
        .map_err(|why| error(RouteErrorResponse::from(why)))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, resource!("/{}", id))],
        MessageResponse::new("station created successfully")
            .with_id(id.raw())
            .json(),
    ))
}

async fn get_stations<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { stations }): State<WebState<D>>,
) -> RouteResult<Json<Vec<WithId<Station>>>> {
    stations.list().await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })
}

async fn get_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { stations }): State<WebState<D>>,
) -> RouteResult<Json<StationDetails>> {
    stations.get(&Id::new(id)).await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })
}

async fn update_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { stations }): State<WebState<D>>,
    payload: Result<Json<UpdateStation>, JsonRejection>,
) -> RouteResult<Json<MessageResponse>> {
    let error = |why: RouteErrorResponse| why.with_method(&Method::PUT).with_uri(original_uri.path());

    let Json(input) = payload.map_err(|why| error(RouteErrorResponse::malformed_body(why)))?;
    stations
        .update(&Id::new(id), input)
        .await
        .map(|_| MessageResponse::new("station updated successfully").json())
        .map_err(|why| error(RouteErrorResponse::from(why)))
}

async fn delete_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { stations }): State<WebState<D>>,
) -> RouteResult<Json<MessageResponse>> {
    stations
        .soft_delete(&Id::new(id))
        .await
        .map(|_| MessageResponse::new("station deleted successfully").json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, Response, StatusCode};
    use serde_json::{json, Value};
    use stations::{memory::MemoryDatabase, StationService};
    use tokio::net::TcpListener;

    use crate::{router, serve, WebState};

    struct TestServer {
        base: String,
        client: Client,
    }

    impl TestServer {
        async fn spawn() -> Self {
            let state = WebState::new(StationService::new(MemoryDatabase::new()));
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let address = listener.local_addr().unwrap();
            tokio::spawn(serve(listener, router(state)));
            Self {
                base: format!("http://{}", address),
                client: Client::new(),
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        async fn post(&self, path: &str, body: Value) -> Response {
            self.client.post(self.url(path)).json(&body).send().await.unwrap()
        }

        async fn put(&self, path: &str, body: Value) -> Response {
            self.client.put(self.url(path)).json(&body).send().await.unwrap()
        }

        async fn get(&self, path: &str) -> Response {
            self.client.get(self.url(path)).send().await.unwrap()
        }

        async fn delete(&self, path: &str) -> Response {
            self.client.delete(self.url(path)).send().await.unwrap()
        }

        async fn create_central(&self) -> String {
            let response = self
                .post(
                    "/stations",
                    json!({
                        "name": "Estación Central",
                        "location": "Av. Siempre Viva 742",
                        "type": "origen"
                    }),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            let body: Value = response.json().await.unwrap();
            body["id"].as_str().unwrap().to_owned()
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let server = TestServer::spawn().await;
        let response = server
            .post(
                "/stations",
                json!({
                    "name": "Estación Central",
                    "location": "Av. Siempre Viva 742",
                    "type": "origen"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()["location"].to_str().unwrap().to_owned();
        let body: Value = response.json().await.unwrap();
        let id = body["id"].as_str().unwrap();
        assert_eq!(body["message"], "station created successfully");
        assert_eq!(location, format!("/stations/{}", id));

        let listed: Value = server.get("/stations").await.json().await.unwrap();
        let stations = listed.as_array().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0]["id"], id);
        assert_eq!(stations[0]["status"], "activa");
        assert_eq!(stations[0]["type"], "origen");
        assert!(stations[0]["created_at"].is_string());
        assert!(stations[0]["updated_at"].is_string());
    }

    #[tokio::test]
    async fn create_accepts_spanish_keys_and_mixed_case_type() {
        let server = TestServer::spawn().await;
        let response = server
            .post(
                "/stations",
                json!({
                    "nombre": "Estación Norte",
                    "ubicacion": "Calle Los Olivos 1200",
                    "tipo": "Intermedia"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = response.json::<Value>().await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_owned();

        let station: Value = server.get(&format!("/stations/{}", id)).await.json().await.unwrap();
        assert_eq!(station["type"], "intermedia");
    }

    #[tokio::test]
    async fn invalid_create_is_bad_request() {
        let server = TestServer::spawn().await;
        let response = server
            .post(
                "/stations",
                json!({ "name": "No", "location": "Main St. 5", "type": "origen" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("invalid name"));
        assert_eq!(body["httpMethod"], "POST");
        assert_eq!(body["requestedUri"], "/stations");

        let missing = server.post("/stations", json!({ "name": "Norte" })).await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let server = TestServer::spawn().await;
        let response = server
            .client
            .post(server.url("/stations"))
            .header("content-type", "application/json")
            .body("{ not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let wrong_type = server
            .post(
                "/stations",
                json!({ "name": 42, "location": "Main St. 5", "type": "origen" }),
            )
            .await;
        assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let server = TestServer::spawn().await;
        server.create_central().await;
        let response = server
            .post(
                "/stations",
                json!({
                    "name": "Estación Central",
                    "location": "Av. Siempre Viva 742",
                    "type": "destino"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_unknown_station_is_not_found() {
        let server = TestServer::spawn().await;
        let response = server.get("/stations/does-not-exist").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "station not found");
    }

    #[tokio::test]
    async fn get_hides_status_of_inactive_station_but_list_does_not() {
        let server = TestServer::spawn().await;
        let id = server.create_central().await;
        let path = format!("/stations/{}", id);

        let active: Value = server.get(&path).await.json().await.unwrap();
        assert_eq!(active["status"], "activa");

        let response = server.put(&path, json!({ "status": "INACTIVA" })).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "station updated successfully");

        let inactive: Value = server.get(&path).await.json().await.unwrap();
        assert!(inactive.get("status").is_none());
        assert_eq!(inactive["name"], "Estación Central");

        let listed: Value = server.get("/stations").await.json().await.unwrap();
        assert_eq!(listed[0]["status"], "inactiva");
    }

    #[tokio::test]
    async fn update_failures_map_to_status_codes() {
        let server = TestServer::spawn().await;
        let id = server.create_central().await;
        let other = server
            .post(
                "/stations",
                json!({ "name": "Estación Sur", "location": "Av. Las Industrias 450", "type": "destino" }),
            )
            .await
            .json::<Value>()
            .await
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_owned();

        let empty = server.put(&format!("/stations/{}", id), json!({})).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let unknown = server.put("/stations/unknown", json!({})).await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let conflict = server
            .put(
                &format!("/stations/{}", other),
                json!({ "name": "Estación Central", "location": "Av. Siempre Viva 742" }),
            )
            .await;
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let bad_status = server
            .put(&format!("/stations/{}", id), json!({ "status": "borrada" }))
            .await;
        assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrongly_typed_update_fields_are_checked_after_the_lookup() {
        let server = TestServer::spawn().await;
        let id = server.create_central().await;

        let unknown = server.put("/stations/unknown", json!({ "name": 42 })).await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let known = server
            .put(&format!("/stations/{}", id), json!({ "name": 42 }))
            .await;
        assert_eq!(known.status(), StatusCode::BAD_REQUEST);
        let body: Value = known.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("invalid name"));

        let syntax_error = server
            .client
            .put(server.url("/stations/unknown"))
            .header("content-type", "application/json")
            .body("{ \"name\": ")
            .send()
            .await
            .unwrap();
        assert_eq!(syntax_error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_hides_station() {
        let server = TestServer::spawn().await;
        let id = server.create_central().await;
        let path = format!("/stations/{}", id);

        let response = server.delete(&path).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "station deleted successfully");

        assert_eq!(server.get(&path).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(server.delete(&path).await.status(), StatusCode::NOT_FOUND);
        let listed: Value = server.get("/stations").await.json().await.unwrap();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn schema_is_served() {
        let server = TestServer::spawn().await;
        let response = server.get("/stations/schema").await;
        assert_eq!(response.status(), StatusCode::OK);
        let schema: Value = response.json().await.unwrap();
        assert!(schema["properties"]["name"].is_object());
    }

    #[tokio::test]
    async fn ping_and_unknown_routes() {
        let server = TestServer::spawn().await;
        let pong: Value = server.get("/ping").await.json().await.unwrap();
        assert_eq!(pong["message"], "pong!");

        let response = server.get("/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["requestedUri"], "/nowhere");
    }
}
