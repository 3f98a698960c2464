//! # Dispatch Endpoints
//!
//! A dispatch is one server-side routing pass. Creating one assigns the
//! pending orders to vehicles, so it dirties far more than the dispatch
//! list itself.

use shared::dto::dispatch::DispatchResponse;

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;
use crate::services::api::orders::orders_key;
use crate::services::api::routes::routes_key;
use crate::services::api::users::users_key;

pub fn dispatches_key() -> ResourceKey {
    ResourceKey::from(["dispatches"])
}

pub fn dispatch_key(dispatch_id: &str) -> ResourceKey {
    ResourceKey::from(["dispatches", dispatch_id])
}

pub fn current_dispatch_key() -> ResourceKey {
    ResourceKey::from(["dispatches", "current"])
}

pub async fn get_dispatches(core: &Core) -> Result<Vec<DispatchResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(dispatches_key(), move || async move {
            gateway.get("/dispatches").await
        })
        .await
}

pub async fn get_current_dispatch(core: &Core) -> Result<DispatchResponse> {
    let gateway = core.gateway();
    core.cache()
        .fetch(current_dispatch_key(), move || async move {
            gateway.get("/dispatches/current").await
        })
        .await
}

pub async fn get_dispatch(core: &Core, dispatch_id: &str) -> Result<DispatchResponse> {
    let gateway = core.gateway();
    let path = format!("/dispatches/{dispatch_id}");
    core.cache()
        .fetch(dispatch_key(dispatch_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

/// Kick off a routing pass over the pending orders. The response carries
/// no payload; the new state is re-fetched through the invalidated keys.
#[tracing::instrument(skip(core))]
pub async fn create_dispatch(core: &Core) -> Result<()> {
    let gateway = core.gateway().clone();
    core.cache()
        .mutate(
            Mutation::create("dispatches").invalidating([
                dispatches_key(),
                orders_key(),
                routes_key(),
                users_key(),
            ]),
            move || async move { gateway.post_unit("/dispatches").await },
        )
        .await
}
