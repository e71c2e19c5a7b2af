use herd_sync::{server, HttpRemote, InMemoryRemote, ProductRef, RemoteConfig, StaticToken};

pub fn backend() -> InMemoryRemote {
    InMemoryRemote::new()
        .with_product(
            ProductRef::new("5")
                .with("name", "Dorper ram")
                .with("price", "450.00"),
        )
        .with_product(ProductRef::new("7").with("name", "Boer goat doe"))
}

/// Bind to port 0 and return the base URL.
pub async fn start_server(backend: InMemoryRemote) -> String {
    let app = server::router(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client_for(base: &str, token: &str) -> HttpRemote {
    HttpRemote::new(&RemoteConfig::new(base).with_timeout(5))
        .unwrap()
        .with_tokens(StaticToken::new(token))
}
