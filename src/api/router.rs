use super::handlers::*;
use super::protocol::{ENDPOINT_VALUE_BY_ID, ENDPOINT_VALUES};

use axum::Router;
use axum::extract::Extension;
use axum::routing::get;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(ENDPOINT_VALUES, get(handle_get_all).post(handle_create))
        .route(
            ENDPOINT_VALUE_BY_ID,
            get(handle_get_by_id)
                .put(handle_update)
                .delete(handle_delete),
        )
        .layer(Extension(store))
}
