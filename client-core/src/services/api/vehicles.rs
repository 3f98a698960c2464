//! # Vehicle Endpoints

use shared::dto::vehicle::{VehicleCreateRequest, VehicleResponse, VehicleUpdateRequest};

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;
use crate::services::api::users::users_key;

pub fn vehicles_key() -> ResourceKey {
    ResourceKey::from(["vehicles"])
}

pub fn vehicle_key(vehicle_id: &str) -> ResourceKey {
    ResourceKey::from(["vehicles", vehicle_id])
}

/// A driver's assigned vehicle lives under the user subtree.
pub fn driver_vehicle_key(driver_id: &str) -> ResourceKey {
    ResourceKey::from(["users", driver_id, "vehicle"])
}

pub async fn get_vehicles(core: &Core) -> Result<Vec<VehicleResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(vehicles_key(), move || async move {
            gateway.get("/vehicles").await
        })
        .await
}

pub async fn get_vehicle(core: &Core, vehicle_id: &str) -> Result<VehicleResponse> {
    let gateway = core.gateway();
    let path = format!("/vehicles/{vehicle_id}");
    core.cache()
        .fetch(vehicle_key(vehicle_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn get_vehicle_by_driver(core: &Core, driver_id: &str) -> Result<VehicleResponse> {
    let gateway = core.gateway();
    let path = format!("/users/{driver_id}/vehicle");
    core.cache()
        .fetch(driver_vehicle_key(driver_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn create_vehicle(core: &Core, request: VehicleCreateRequest) -> Result<VehicleResponse> {
    let gateway = core.gateway().clone();
    core.cache()
        .mutate(
            Mutation::create("vehicles").invalidating([vehicles_key(), users_key()]),
            move || async move { gateway.post("/vehicles", &request).await },
        )
        .await
}

/// Update a vehicle. Reassigning the driver moves the vehicle between
/// `users/{driver}/vehicle` views, hence the `users` prefix.
pub async fn update_vehicle(
    core: &Core,
    vehicle_id: &str,
    request: VehicleUpdateRequest,
) -> Result<VehicleResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/vehicles/{vehicle_id}");
    core.cache()
        .mutate(
            Mutation::update("vehicles").invalidating([vehicles_key(), users_key()]),
            move || async move { gateway.post(&path, &request).await },
        )
        .await
}

pub async fn delete_vehicle(core: &Core, vehicle_id: &str) -> Result<()> {
    let gateway = core.gateway().clone();
    let path = format!("/vehicles/{vehicle_id}");
    core.cache()
        .mutate(
            Mutation::delete("vehicles").invalidating([vehicles_key(), users_key()]),
            move || async move { gateway.delete(&path).await },
        )
        .await
}
