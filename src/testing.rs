//! Local HTTP stubs for the open-data, Sheets and token endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

use crate::auth::{Authenticator, AuthorizedUser};

/// Serves `filter` on an ephemeral loopback port and returns its address.
pub fn spawn_stub<R: Reply + 'static>(filter: BoxedFilter<(R,)>) -> SocketAddr {
    let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Every query string the permits stub has seen.
pub type SeenQueries = Arc<Mutex<Vec<Vec<(String, String)>>>>;

/// Permits endpoint that records each query and answers with `body`.
pub fn permits_stub(body: Value) -> (SocketAddr, SeenQueries) {
    let seen: SeenQueries = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let route = warp::get()
        .and(warp::query::<Vec<(String, String)>>())
        .map(move |query: Vec<(String, String)>| {
            recorder.lock().unwrap().push(query);
            warp::reply::json(&body)
        })
        .boxed();
    (spawn_stub(route), seen)
}

/// Endpoint that always fails with `status`.
pub fn failing_stub(status: u16) -> SocketAddr {
    let code = warp::http::StatusCode::from_u16(status).unwrap();
    let route = warp::any()
        .map(move || warp::reply::with_status("upstream unavailable", code))
        .boxed();
    spawn_stub(route)
}

#[derive(Debug, Clone)]
pub struct SheetsWrite {
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Value,
}

pub type SeenWrites = Arc<Mutex<Vec<SheetsWrite>>>;

/// Sheets values-update endpoint that records each PUT.
pub fn sheets_stub() -> (SocketAddr, SeenWrites) {
    let seen: SeenWrites = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let route = warp::put()
        .and(warp::path::full())
        .and(warp::query::raw())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .map(
            move |path: warp::path::FullPath,
                  query: String,
                  authorization: Option<String>,
                  body: Value| {
                let range = body["range"].clone();
                recorder.lock().unwrap().push(SheetsWrite {
                    path: path.as_str().to_string(),
                    query,
                    authorization,
                    body,
                });
                warp::reply::json(&json!({ "updatedRange": range }))
            },
        )
        .boxed();
    (spawn_stub(route), seen)
}

pub type SeenForms = Arc<Mutex<Vec<Vec<(String, String)>>>>;

/// OAuth token endpoint that records each form and answers with `body`.
pub fn token_stub(body: Value) -> (SocketAddr, SeenForms) {
    let seen: SeenForms = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let route = warp::post()
        .and(warp::body::form::<Vec<(String, String)>>())
        .map(move |form: Vec<(String, String)>| {
            recorder.lock().unwrap().push(form);
            warp::reply::json(&body)
        })
        .boxed();
    (spawn_stub(route), seen)
}

pub fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn sample_permits() -> Value {
    json!([
        {
            "permitnum": "6901234-CN",
            "permitclass": "Commercial",
            "permitclassmapped": "Non-Residential",
            "permittypedesc": "New",
            "description": "Construct new 5-story mixed use building",
            "statuscurrent": "Application Accepted",
            "originaladdress1": "1600 DEXTER AVE N",
            "originalcity": "SEATTLE",
            "originalstate": "WA",
            "originalzip": "98109",
            "link": { "url": "https://services.seattle.gov/portal/customization/common/launchpad.aspx?id=6901234-CN" },
            "latitude": "47.6340",
            "applieddate": "2024-04-02"
        },
        {
            "permitnum": "6905678-CN",
            "permitclass": "Commercial",
            "permitclassmapped": "Non-Residential",
            "permittypedesc": "Addition/Alteration",
            "description": "Tenant improvement to existing office",
            "statuscurrent": "Application Accepted",
            "originaladdress1": "400 PINE ST",
            "originalcity": "SEATTLE",
            "originalstate": "WA",
            "originalzip": 98101,
            "link": { "url": "https://services.seattle.gov/portal/customization/common/launchpad.aspx?id=6905678-CN" }
        },
        {
            "permitnum": "6909999-DM",
            "permitclass": "Commercial",
            "permitclassmapped": "Non-Residential",
            "permittypedesc": "Demolition",
            "statuscurrent": "Application Accepted",
            "originaladdress1": "2201 WESTLAKE AVE",
            "originalcity": "SEATTLE",
            "originalstate": "WA",
            "originalzip": "98121"
        }
    ])
}

/// Credentials holding a token that stays valid for an hour.
pub fn test_auth() -> Authenticator {
    Authenticator::in_memory(AuthorizedUser {
        token: "ya29.test".into(),
        refresh_token: None,
        token_uri: "http://127.0.0.1:1/token".into(),
        client_id: "id".into(),
        client_secret: "secret".into(),
        scopes: vec![],
        expiry: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    })
}
