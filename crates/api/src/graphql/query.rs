use async_graphql::{Context, Object, Result};

use crate::graphql::types::{SalidaType, TourType, UserType, ZoneType, records, store_error};

/// Read side: one unfiltered collection per record type, ordered by id.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn all_users(&self, ctx: &Context<'_>) -> Result<Vec<UserType>> {
        let users = records(ctx)?.list_users().await.map_err(store_error)?;
        Ok(users.into_iter().map(UserType).collect())
    }

    async fn all_zones(&self, ctx: &Context<'_>) -> Result<Vec<ZoneType>> {
        let zones = records(ctx)?.list_zones().await.map_err(store_error)?;
        Ok(zones.into_iter().map(ZoneType).collect())
    }

    async fn all_tours(&self, ctx: &Context<'_>) -> Result<Vec<TourType>> {
        let tours = records(ctx)?.list_tours().await.map_err(store_error)?;
        Ok(tours.into_iter().map(TourType).collect())
    }

    async fn all_salidas(&self, ctx: &Context<'_>) -> Result<Vec<SalidaType>> {
        let salidas = records(ctx)?.list_salidas().await.map_err(store_error)?;
        Ok(salidas.into_iter().map(SalidaType).collect())
    }
}
