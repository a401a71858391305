//! Zone mutations. Users, tours and salidas are written through REST only.

use async_graphql::{Context, Error, ID, Object, Result, SimpleObject};
use rust_decimal::Decimal;

use tours_catalog::{NewZone, Zone, ZonePatch, coordinate_errors};
use tours_core::ZoneId;
use tours_infra::{RecordStore, StoreResult};

use crate::graphql::types::{ZoneType, records, store_error};

#[derive(SimpleObject)]
#[graphql(name = "CreateZone")]
pub struct CreateZonePayload {
    pub zone: ZoneType,
}

#[derive(SimpleObject)]
#[graphql(name = "DeleteZone")]
pub struct DeleteZonePayload {
    pub ok: bool,
}

#[derive(SimpleObject)]
#[graphql(name = "UpdateZone")]
pub struct UpdateZonePayload {
    pub zone: Option<ZoneType>,
    pub ok: bool,
}

/// Outcome of an update: a missing zone is a result, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneUpdate {
    Updated(Zone),
    NotFound,
}

impl From<ZoneUpdate> for UpdateZonePayload {
    fn from(update: ZoneUpdate) -> Self {
        match update {
            ZoneUpdate::Updated(zone) => Self {
                zone: Some(ZoneType(zone)),
                ok: true,
            },
            ZoneUpdate::NotFound => Self {
                zone: None,
                ok: false,
            },
        }
    }
}

pub async fn update_zone(
    records: &dyn RecordStore,
    id: ZoneId,
    patch: &ZonePatch,
) -> StoreResult<ZoneUpdate> {
    Ok(match records.update_zone(id, patch).await? {
        Some(zone) => ZoneUpdate::Updated(zone),
        None => ZoneUpdate::NotFound,
    })
}

fn parse_zone_id(id: &ID) -> Result<ZoneId> {
    Ok(id.parse::<ZoneId>()?)
}

/// Reject coordinates the store cannot keep exactly.
fn check_coordinates(latitud: Option<Decimal>, longitud: Option<Decimal>) -> Result<()> {
    let errors = coordinate_errors(latitud, longitud);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::new(errors.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a zone. Only `name` is required; coordinates must fit the
    /// stored precision.
    async fn create_zone(
        &self,
        ctx: &Context<'_>,
        name: String,
        description: Option<String>,
        latitud: Option<Decimal>,
        longitud: Option<Decimal>,
    ) -> Result<CreateZonePayload> {
        check_coordinates(latitud, longitud)?;
        let new = NewZone {
            name,
            description,
            latitude: latitud,
            longitude: longitud,
        };
        let zone = records(ctx)?.create_zone(new).await.map_err(store_error)?;
        tracing::info!(zone_id = %zone.id, "zone created via graphql");
        Ok(CreateZonePayload {
            zone: ZoneType(zone),
        })
    }

    /// Delete a zone; `ok` tells whether it existed.
    async fn delete_zone(&self, ctx: &Context<'_>, id: ID) -> Result<DeleteZonePayload> {
        let id = parse_zone_id(&id)?;
        let ok = records(ctx)?.delete_zone(id).await.map_err(store_error)?;
        tracing::info!(zone_id = %id, ok, "zone delete via graphql");
        Ok(DeleteZonePayload { ok })
    }

    /// Overwrite the supplied fields; omitted (or null) arguments are left as they are.
    async fn update_zone(
        &self,
        ctx: &Context<'_>,
        id: ID,
        name: Option<String>,
        description: Option<String>,
        longitud: Option<Decimal>,
        latitud: Option<Decimal>,
    ) -> Result<UpdateZonePayload> {
        let id = parse_zone_id(&id)?;
        check_coordinates(latitud, longitud)?;
        let patch = ZonePatch {
            name,
            description: description.map(Some),
            latitude: latitud.map(Some),
            longitude: longitud.map(Some),
        };
        let update = update_zone(records(ctx)?.as_ref(), id, &patch)
            .await
            .map_err(store_error)?;
        if update == ZoneUpdate::NotFound {
            tracing::info!(zone_id = %id, "graphql update of missing zone");
        }
        Ok(update.into())
    }
}
