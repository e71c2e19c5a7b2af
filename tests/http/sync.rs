use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use herd_sync::{
    CollectionItem, HttpRemote, ItemId, Operation, ProductId, ProductRef, RemoteCollection,
    RemoteConfig, RemoteError, SyncError, WishlistSync, NETWORK_ERROR_MESSAGE,
};
use serde_json::json;

use crate::support::{backend, client_for, start_server};

#[tokio::test]
async fn wishlist_round_trip_over_http() {
    let server = backend();
    let base = start_server(server.clone()).await;
    let wishlist = WishlistSync::new(client_for(&base, "buyer-1"));

    wishlist.optimistic_add("5").unwrap();
    let created = wishlist.add("5").await.unwrap();
    assert_eq!(
        created.product.as_ref().unwrap().get("name"),
        Some(&json!("Dorper ram"))
    );
    assert_eq!(wishlist.len().unwrap(), 1);
    assert!(!wishlist.items().unwrap()[0].is_placeholder());

    wishlist.add("7").await.unwrap();
    wishlist.remove("5").await.unwrap();

    let fetched = wishlist.fetch_all().await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert!(wishlist.contains(&ProductId::from(7u64)).unwrap());
    assert_eq!(server.for_owner("buyer-1").items("wishlist"), fetched);
}

#[tokio::test]
async fn users_only_see_their_own_wishlist() {
    let base = start_server(backend()).await;
    let alice = WishlistSync::new(client_for(&base, "alice"));
    let bob = WishlistSync::new(client_for(&base, "bob"));

    alice.add("5").await.unwrap();

    assert!(bob.fetch_all().await.unwrap().is_empty());
    assert_eq!(alice.fetch_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_token_is_an_ordinary_failure() {
    let base = start_server(backend()).await;
    let remote = HttpRemote::new(&RemoteConfig::new(base.as_str())).unwrap();
    let wishlist = WishlistSync::new(remote);

    let err = wishlist.fetch_all().await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Remote(RemoteError::rejected(
            401,
            "Authentication credentials were not provided."
        ))
    );
    assert_eq!(
        wishlist.error().unwrap().as_deref(),
        Some("Authentication credentials were not provided.")
    );
}

#[tokio::test]
async fn server_message_is_passed_through() {
    let server = backend();
    let base = start_server(server.clone()).await;
    let wishlist = WishlistSync::new(client_for(&base, "buyer-1"));

    server
        .fail_next(
            Operation::Add,
            RemoteError::rejected(422, "Listing is no longer available."),
        )
        .unwrap();
    let err = wishlist.add("7").await.unwrap_err();

    assert_eq!(err.message(), "Listing is no longer available.");
    assert_eq!(
        err,
        SyncError::Remote(RemoteError::rejected(422, "Listing is no longer available."))
    );
}

#[tokio::test]
async fn deleting_unknown_wrapper_is_not_found() {
    let base = start_server(backend()).await;
    let remote = client_for(&base, "buyer-1");

    let err = remote
        .delete("wishlist", &ItemId::from("404"))
        .await
        .unwrap_err();

    assert_eq!(err, RemoteError::rejected(404, "Not found."));
}

#[tokio::test]
async fn unreachable_server_is_a_generic_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let wishlist = WishlistSync::new(client_for(&format!("http://{addr}"), "buyer-1"));
    let err = wishlist.fetch_all().await.unwrap_err();

    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert!(err.needs_resync());
}

#[tokio::test]
async fn wrapper_ids_with_reserved_characters_are_deleted() {
    let server = backend();
    server
        .for_owner("buyer-1")
        .seed(
            "wishlist",
            vec![
                CollectionItem::new(ItemId::from("a/b"), ProductRef::new("5")),
                CollectionItem::new(ItemId::from("c?d"), ProductRef::new("7")),
            ],
        )
        .unwrap();
    let base = start_server(server.clone()).await;
    let wishlist = WishlistSync::new(client_for(&base, "buyer-1"));
    wishlist.fetch_all().await.unwrap();

    wishlist.remove("5").await.unwrap();

    let left = server.for_owner("buyer-1").items("wishlist");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, ItemId::from("c?d"));
    assert!(!wishlist.contains(&ProductId::from("5")).unwrap());
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    async fn list(headers: HeaderMap) -> Result<Json<Vec<CollectionItem>>, StatusCode> {
        match headers.get(USER_AGENT).and_then(|value| value.to_str().ok()) {
            Some("herd-sync-test/1.0") => Ok(Json(Vec::new())),
            _ => Err(StatusCode::BAD_REQUEST),
        }
    }

    let app = Router::new().route("/wishlist/", get(list));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = format!("http://{addr}");

    let branded =
        HttpRemote::new(&RemoteConfig::new(&base).with_user_agent("herd-sync-test/1.0")).unwrap();
    assert!(branded.list("wishlist").await.unwrap().is_empty());

    let plain = HttpRemote::new(&RemoteConfig::new(&base)).unwrap();
    let err = plain.list("wishlist").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}
