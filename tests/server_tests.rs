//! End-to-end tests over HTTP.

mod common;

use reqwest::StatusCode;
use serde_json::Value;

use common::{client, config, eventually, spawn_server};
use page_mounts::config::MountConfig;

#[tokio::test]
async fn test_hybrid_page_redirects_then_resumes() {
    let server = spawn_server(config()).await;
    let client = client();

    let res = client.get(server.url("/wizard/step/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    assert_eq!(location, "/wizard/step/1.0");

    let res = client.get(server.url(&location)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["page_type"], "app.Wizard");
    assert_eq!(page["title"], "Signup wizard");
    assert_eq!(page["page_id"], 0);
    assert_eq!(page["parameters"]["step"], "1");
    assert_eq!(page["url"], "/wizard/step/1.0");
    assert_eq!(page["listener"]["interface"], "IRedirectListener");
}

#[tokio::test]
async fn test_unknown_page_id_starts_a_fresh_page() {
    let server = spawn_server(config()).await;
    let client = client();

    let res = client.get(server.url("/wizard.42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/wizard.0");
}

#[tokio::test]
async fn test_callback_into_missing_page_is_gone() {
    let server = spawn_server(config()).await;
    let client = client();

    let res = client.get(server.url("/wizard/step/1")).send().await.unwrap();
    assert_eq!(res.headers()["location"], "/wizard/step/1.0");

    // The stored page still answers callbacks.
    let res = client
        .get(server.url("/wizard/step/1.0"))
        .header("x-ui-interface", ":link:0:ILinkListener::")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["page_id"], 0);

    let res = client
        .get(server.url("/wizard/step/1.7"))
        .header("x-ui-interface", ":link:0:ILinkListener::")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::GONE);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = client
        .get(server.url("/wizard/step/1.7"))
        .header("x-ui-interface", "not-a-callback")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stateless_page_renders_without_storing() {
    let server = spawn_server(config()).await;

    let res = client().get(server.url("/about/lang/en")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["stateless"], true);
    assert_eq!(page["title"], "About");
    assert_eq!(page["page_id"], Value::Null);
    assert_eq!(page["parameters"]["lang"], "en");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = spawn_server(config()).await;

    let res = client()
        .get(server.url("/about"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_mixed_and_indexed_parameters() {
    let server = spawn_server(config()).await;
    let client = client();

    let res = client
        .get(server.url("/blog/2024/hello?ref=feed"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["parameters"]["year"], "2024");
    assert_eq!(page["parameters"]["slug"], "hello");
    assert_eq!(page["parameters"]["ref"], "feed");
    // Not hybrid: stored, but there is no URL to resume it.
    assert_eq!(page["page_id"], 0);
    assert_eq!(page["url"], Value::Null);

    let res = client.get(server.url("/archive/2023/05")).send().await.unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["parameters"]["0"], "2023");
    assert_eq!(page["parameters"]["1"], "05");
}

#[tokio::test]
async fn test_package_mount() {
    let server = spawn_server(config()).await;

    let res = client().get(server.url("/shop/Cart/id/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["page_type"], "shop.Cart");
    assert_eq!(page["parameters"]["id"], "3");

    let res = client().get(server.url("/shop/Nothing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unhandled_paths_are_not_found() {
    let server = spawn_server(config()).await;
    let client = client();

    for path in ["/", "/nowhere", "/static/site.css", "/about/odd", "/wizardry"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        let body: Value = res.json().await.unwrap();
        assert!(body["error"].is_string(), "{path}");
    }
}

#[tokio::test]
async fn test_ajax_requests_bypass_hybrid_mounts() {
    let server = spawn_server(config()).await;

    let res = client()
        .get(server.url("/wizard/step/1"))
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mount_listing() {
    let server = spawn_server(config()).await;

    let res = client().get(server.url("/_mounts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let mounts: Vec<Value> = res.json().await.unwrap();
    let paths: Vec<&str> = mounts.iter().map(|m| m["path"].as_str().unwrap()).collect();
    assert_eq!(
        paths,
        vec!["/wizard", "/static", "/shop", "/blog", "/archive", "/about"]
    );
    assert_eq!(mounts[0]["kind"], "hybrid");
    assert_eq!(mounts[1]["kind"], "ignored");
    assert_eq!(mounts[2]["kind"], "package");
    assert_eq!(mounts[3]["kind"], "mixed");
}

#[tokio::test]
async fn test_config_reload_swaps_mounts() {
    let server = spawn_server(config()).await;
    let client = client();

    let mut updated = config();
    updated.mounts.push(MountConfig::new("faq", "app.About"));
    server.updates.send(updated).unwrap();

    let url = server.url("/faq");
    assert!(
        eventually(|| {
            let request = client.get(&url).send();
            async move { request.await.is_ok_and(|res| res.status() == StatusCode::OK) }
        })
        .await
    );
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = spawn_server(config()).await;
    let client = client();
    assert!(eventually(|| {
        let request = client.get(server.url("/about")).send();
        async move { request.await.is_ok() }
    })
    .await);

    server.shutdown.trigger();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server.handle)
        .await
        .expect("server stops")
        .unwrap();
    assert!(result.is_ok());
}
