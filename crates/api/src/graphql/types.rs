//! GraphQL object types over the catalog records.

use std::sync::Arc;

use async_graphql::{Context, ID, Object, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use tours_catalog::{Genre, Salida, Tour, User, Zone, ZoneRole};
use tours_core::ZoneId;
use tours_infra::{RecordStore, StoreError};

pub(crate) fn records<'a>(ctx: &Context<'a>) -> Result<&'a Arc<dyn RecordStore>> {
    ctx.data::<Arc<dyn RecordStore>>()
}

/// Log the store failure and hand the client a generic error.
pub(crate) fn store_error(err: StoreError) -> async_graphql::Error {
    tracing::error!(error = %err, "record store failure in graphql resolver");
    async_graphql::Error::new("internal record store error")
}

fn gql_id(id: i64) -> ID {
    ID::from(id.to_string())
}

pub struct UserType(pub User);

#[Object]
impl UserType {
    async fn id(&self) -> ID {
        gql_id(self.0.id.get())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn last_name(&self) -> &str {
        &self.0.last_name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn birthday(&self) -> Option<NaiveDate> {
        self.0.birthday
    }

    /// `H` or `M`.
    async fn genre(&self) -> Option<&'static str> {
        self.0.genre.map(Genre::code)
    }

    async fn key(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    #[graphql(name = "type")]
    async fn user_type(&self) -> Option<&str> {
        self.0.user_type.as_deref()
    }
}

pub struct ZoneType(pub Zone);

impl ZoneType {
    async fn tours(&self, ctx: &Context<'_>, role: ZoneRole) -> Result<Vec<TourType>> {
        let tours = records(ctx)?
            .tours_for_zone(self.0.id, role)
            .await
            .map_err(store_error)?;
        Ok(tours.into_iter().map(TourType).collect())
    }
}

#[Object]
impl ZoneType {
    async fn id(&self) -> ID {
        gql_id(self.0.id.get())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn latitud(&self) -> Option<Decimal> {
        self.0.latitude
    }

    async fn longitud(&self) -> Option<Decimal> {
        self.0.longitude
    }

    /// Tours departing from this zone.
    async fn tours_salida(&self, ctx: &Context<'_>) -> Result<Vec<TourType>> {
        self.tours(ctx, ZoneRole::Departure).await
    }

    /// Tours arriving at this zone.
    async fn tours_llegada(&self, ctx: &Context<'_>) -> Result<Vec<TourType>> {
        self.tours(ctx, ZoneRole::Arrival).await
    }
}

pub struct TourType(pub Tour);

async fn zone_by_id(ctx: &Context<'_>, id: ZoneId) -> Result<ZoneType> {
    records(ctx)?
        .get_zone(id)
        .await
        .map_err(store_error)?
        .map(ZoneType)
        .ok_or_else(|| async_graphql::Error::new(format!("zone {id} not found")))
}

#[Object]
impl TourType {
    async fn id(&self) -> ID {
        gql_id(self.0.id.get())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn img(&self) -> Option<&str> {
        self.0.img.as_deref()
    }

    async fn zona_salida(&self, ctx: &Context<'_>) -> Result<ZoneType> {
        zone_by_id(ctx, self.0.departure_zone).await
    }

    async fn zona_llegada(&self, ctx: &Context<'_>) -> Result<ZoneType> {
        zone_by_id(ctx, self.0.arrival_zone).await
    }

    async fn salidas(&self, ctx: &Context<'_>) -> Result<Vec<SalidaType>> {
        let salidas = records(ctx)?
            .salidas_for_tour(self.0.id)
            .await
            .map_err(store_error)?;
        Ok(salidas.into_iter().map(SalidaType).collect())
    }
}

pub struct SalidaType(pub Salida);

#[Object]
impl SalidaType {
    async fn id(&self) -> ID {
        gql_id(self.0.id.get())
    }

    async fn tour(&self, ctx: &Context<'_>) -> Result<TourType> {
        let tour = self.0.tour;
        records(ctx)?
            .get_tour(tour)
            .await
            .map_err(store_error)?
            .map(TourType)
            .ok_or_else(|| async_graphql::Error::new(format!("tour {tour} not found")))
    }

    async fn fecha(&self) -> NaiveDate {
        self.0.departs_on
    }

    async fn cupo(&self) -> Option<i32> {
        self.0.capacity
    }

    async fn precio(&self) -> Option<Decimal> {
        self.0.price
    }
}
