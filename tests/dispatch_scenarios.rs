use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use waypost::{
    config::CachePolicy,
    core::{HandlerError, RequestContext, Resource, ResourceId, Router},
    resources,
};

fn bundled_router() -> Router {
    Router::builder()
        .resources(resources::bundled())
        .build()
        .expect("bundled resources register")
}

#[test]
fn test_get_root_says_hello() {
    let response = bundled_router().dispatch("GET", "/");
    assert_eq!(response.status(), 200);
    assert_eq!(response.body().as_ref(), b"Hello World!");
}

#[test]
fn test_post_to_get_only_resource_is_405() {
    let response = bundled_router().dispatch("POST", "/");
    assert_eq!(response.status(), 405);
    assert_eq!(response.body().as_ref(), b"Method Not Allowed");
    assert_eq!(response.content_type(), "application/json");
}

#[test]
fn test_unknown_path_is_404() {
    let response = bundled_router().dispatch("GET", "/missing");
    assert_eq!(response.status(), 404);
    assert_eq!(response.body().as_ref(), b"Not Found");
}

#[test]
fn test_handler_sees_path_parameter() {
    let seen = Arc::new(std::sync::Mutex::new(None::<String>));
    let recorder = seen.clone();
    let router = Router::builder()
        .resource(
            Resource::builder("UsersResource")
                .uri("/users/:id")
                .get(move |ctx: &mut RequestContext| {
                    *recorder.lock().unwrap() = ctx.param("id").map(str::to_string);
                }),
        )
        .build()
        .unwrap();

    assert_eq!(router.dispatch("GET", "/users/7").status(), 200);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("7"));
}

#[test]
fn test_earliest_registration_wins() {
    let router = Router::builder()
        .resource(
            Resource::builder("First")
                .uri("/shared")
                .get(|ctx: &mut RequestContext| ctx.set_body("first")),
        )
        .resource(
            Resource::builder("Second")
                .uri("/:anything")
                .get(|ctx: &mut RequestContext| ctx.set_body("second")),
        )
        .build()
        .unwrap();

    assert_eq!(
        router.search("/shared").as_ref(),
        &[ResourceId::new(0), ResourceId::new(1)]
    );
    assert_eq!(router.dispatch("GET", "/shared").body().as_ref(), b"first");
    assert_eq!(router.dispatch("GET", "/other").body().as_ref(), b"second");
}

#[test]
fn test_content_type_override_and_error_reset() {
    let router = Router::builder()
        .default_content_type("text/html")
        .resource(
            Resource::builder("Report")
                .uri("/report")
                .get(|ctx: &mut RequestContext| ctx.set_content_type("text/csv"))
                .post(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
                    ctx.set_content_type("text/csv");
                    Err(HandlerError::bad_request("no"))
                }),
        )
        .build()
        .unwrap();

    assert_eq!(router.dispatch("GET", "/report").content_type(), "text/csv");

    let failed = router.dispatch("POST", "/report");
    assert_eq!(failed.status(), 400);
    assert_eq!(failed.content_type(), "text/html");
    assert_eq!(router.dispatch("GET", "/gone").content_type(), "text/html");
}

#[test]
fn test_concurrent_search_is_idempotent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let router = Arc::new(
        Router::builder()
            .cache_policy(CachePolicy::Lru { capacity: 64 })
            .resources(resources::bundled())
            .resource(
                Resource::builder("Counter")
                    .uri("/count/{n}")
                    .get(move |_: &mut RequestContext| {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }),
            )
            .build()
            .unwrap(),
    );

    let expected = router.search("/users/7");
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let router = router.clone();
            let expected = expected.clone();
            scope.spawn(move || {
                for i in 0..200 {
                    assert_eq!(router.search("/users/7"), expected);
                    let path = format!("/count/{}", (worker * 200 + i) % 50);
                    assert_eq!(router.dispatch("GET", &path).status(), 200);
                }
            });
        }
    });

    assert_eq!(calls.load(Ordering::Relaxed), 8 * 200);
    assert!(router.index().cached_paths() <= 128);
}
