//! # Depot Endpoints

use shared::dto::depot::{DepotCreateRequest, DepotResponse, DepotUpdateRequest};

use crate::cache::{Mutation, ResourceKey};
use crate::core::error::Result;
use crate::core::Core;

pub fn depots_key() -> ResourceKey {
    ResourceKey::from(["depots"])
}

pub fn depot_key(depot_id: &str) -> ResourceKey {
    ResourceKey::from(["depots", depot_id])
}

pub async fn get_depots(core: &Core) -> Result<Vec<DepotResponse>> {
    let gateway = core.gateway();
    core.cache()
        .fetch(depots_key(), move || async move {
            gateway.get("/depots").await
        })
        .await
}

pub async fn get_depot(core: &Core, depot_id: &str) -> Result<DepotResponse> {
    let gateway = core.gateway();
    let path = format!("/depots/{depot_id}");
    core.cache()
        .fetch(depot_key(depot_id), move || async move {
            gateway.get(&path).await
        })
        .await
}

pub async fn create_depot(core: &Core, request: DepotCreateRequest) -> Result<DepotResponse> {
    let gateway = core.gateway().clone();
    core.cache()
        .mutate(
            Mutation::create("depots").invalidating([depots_key()]),
            move || async move { gateway.post("/depots", &request).await },
        )
        .await
}

pub async fn update_depot(
    core: &Core,
    depot_id: &str,
    request: DepotUpdateRequest,
) -> Result<DepotResponse> {
    let gateway = core.gateway().clone();
    let path = format!("/depots/{depot_id}");
    core.cache()
        .mutate(
            Mutation::update("depots").invalidating([depots_key()]),
            move || async move { gateway.post(&path, &request).await },
        )
        .await
}

pub async fn delete_depot(core: &Core, depot_id: &str) -> Result<()> {
    let gateway = core.gateway().clone();
    let path = format!("/depots/{depot_id}");
    core.cache()
        .mutate(
            Mutation::delete("depots").invalidating([depots_key()]),
            move || async move { gateway.delete(&path).await },
        )
        .await
}
