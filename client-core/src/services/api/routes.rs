//! # Route Endpoints
//!
//! Computed routes are read through three views: by route id, by the
//! vehicle currently driving them, and by the dispatch that produced them.

use shared::dto::route::RouteResponse;

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;
use crate::services::api::dispatches::dispatches_key;
use crate::services::api::orders::orders_key;
use crate::services::api::users::users_key;
use crate::services::api::vehicles::vehicles_key;

pub fn routes_key() -> ResourceKey {
    ResourceKey::from(["routes"])
}

pub fn route_key(route_id: &str) -> ResourceKey {
    ResourceKey::from(["routes", route_id])
}

pub fn vehicle_route_key(vehicle_id: &str) -> ResourceKey {
    ResourceKey::from(["vehicles", vehicle_id, "route"])
}

pub fn vehicle_routes_key(vehicle_id: &str) -> ResourceKey {
    ResourceKey::from(["vehicles", vehicle_id, "routes"])
}

pub fn dispatch_routes_key(dispatch_id: &str) -> ResourceKey {
    ResourceKey::from(["dispatches", dispatch_id, "routes"])
}

pub async fn get_route(core: &Core, route_id: &str) -> Result<RouteResponse> {
    let gateway = core.gateway();
    let path = format!("/routes/{route_id}");
    core.cache()
        .fetch(route_key(route_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

/// The route a vehicle is currently driving.
pub async fn get_vehicle_current_route(core: &Core, vehicle_id: &str) -> Result<RouteResponse> {
    let gateway = core.gateway();
    let path = format!("/vehicles/{vehicle_id}/route");
    core.cache()
        .fetch(vehicle_route_key(vehicle_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn get_routes_by_vehicle(core: &Core, vehicle_id: &str) -> Result<Vec<RouteResponse>> {
    let gateway = core.gateway();
    let path = format!("/vehicles/{vehicle_id}/routes");
    core.cache()
        .fetch(vehicle_routes_key(vehicle_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn get_routes_by_dispatch(core: &Core, dispatch_id: &str) -> Result<Vec<RouteResponse>> {
    let gateway = core.gateway();
    let path = format!("/dispatches/{dispatch_id}/routes");
    core.cache()
        .fetch(dispatch_routes_key(dispatch_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

/// Driver finishes a route. Completion flips the route, the orders on it,
/// the vehicle's current-route view, and potentially the whole dispatch,
/// so all of those prefixes go stale at once.
#[tracing::instrument(skip(core))]
pub async fn mark_route_done(core: &Core, route_id: &str) -> Result<RouteResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/routes/{route_id}/done");
    core.cache()
        .mutate(
            Mutation::update("routes").invalidating([
                routes_key(),
                vehicles_key(),
                dispatches_key(),
                orders_key(),
                users_key(),
            ]),
            move || async move { gateway.post_empty(&path).await },
        )
        .await
}
