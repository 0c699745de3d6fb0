// src/services/property_service.rs

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PropertyStore, RoleStore},
    models::{
        auth::AppRole,
        property::{
            CreatePropertyPayload, Property, PropertyDetail, PropertySearchQuery, PropertyStatus,
            UpdatePropertyPayload,
        },
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

#[derive(Clone)]
pub struct PropertyService {
    repo: Arc<dyn PropertyStore>,
    roles: Arc<dyn RoleStore>,
    feed: ChangeFeed,
}

fn ensure_positive_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::InvalidInput("O preço deve ser positivo.".into()));
    }
    Ok(())
}

impl PropertyService {
    pub fn new(repo: Arc<dyn PropertyStore>, roles: Arc<dyn RoleStore>, feed: ChangeFeed) -> Self {
        Self { repo, roles, feed }
    }

    pub async fn search(&self, query: &PropertySearchQuery) -> Result<Vec<Property>, AppError> {
        self.repo.search(query).await
    }

    pub async fn detail(&self, property_id: Uuid) -> Result<PropertyDetail, AppError> {
        let property = self
            .repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Imóvel".into()))?;
        let gallery = self.repo.list_images(property_id).await?;

        Ok(PropertyDetail { property, gallery })
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, AppError> {
        self.repo.list_for_owner(owner_id).await
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreatePropertyPayload) -> Result<Property, AppError> {
        ensure_positive_price(payload.price)?;

        let property = self.repo.create(owner_id, &payload).await?;
        tracing::info!("✅ Imóvel criado: {}", property.id);
        self.publish(ChangeKind::Insert, &property);
        Ok(property)
    }

    pub async fn update(
        &self,
        caller_id: Uuid,
        property_id: Uuid,
        payload: UpdatePropertyPayload,
    ) -> Result<Property, AppError> {
        if let Some(price) = payload.price {
            ensure_positive_price(price)?;
        }
        self.ensure_can_edit(caller_id, property_id).await?;

        let property = self
            .repo
            .update(property_id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Imóvel".into()))?;
        self.publish(ChangeKind::Update, &property);
        Ok(property)
    }

    pub async fn set_status(
        &self,
        caller_id: Uuid,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, AppError> {
        self.ensure_can_edit(caller_id, property_id).await?;

        let property = self
            .repo
            .set_status(property_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Imóvel".into()))?;
        tracing::info!("Imóvel {} agora está {:?}", property_id, status);
        self.publish(ChangeKind::Update, &property);
        Ok(property)
    }

    // Dono do anúncio ou admin
    async fn ensure_can_edit(&self, caller_id: Uuid, property_id: Uuid) -> Result<(), AppError> {
        let property = self
            .repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Imóvel".into()))?;

        if property.owner_id == caller_id || self.roles.has_role(caller_id, AppRole::Admin).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden("Apenas o proprietário pode alterar este imóvel.".into()))
        }
    }

    fn publish(&self, kind: ChangeKind, property: &Property) {
        self.feed
            .publish(ChangeEvent::new("properties", kind, Some(property.owner_id), property));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn service(store: &Arc<MemoryStore>) -> PropertyService {
        PropertyService::new(store.clone(), store.clone(), ChangeFeed::new())
    }

    fn new_listing(price: i64) -> CreatePropertyPayload {
        serde_json::from_value(serde_json::json!({
            "title": "Villa Koregaon",
            "propertyType": "villa",
            "price": price,
            "city": "Pune",
            "address": "Lane 5",
            "bedrooms": 4,
            "bathrooms": 3,
            "amenities": ["pool", "garden"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_rejects_non_positive_price() {
        let store = Arc::new(MemoryStore::default());
        let owner = Uuid::new_v4();

        let err = service(&store).create(owner, new_listing(0)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let property = service(&store).create(owner, new_listing(90000)).await.unwrap();
        assert_eq!(property.owner_id, owner);
        assert_eq!(property.amenities, vec!["pool".to_string(), "garden".to_string()]);
    }

    #[tokio::test]
    async fn only_owner_or_admin_can_edit() {
        let store = Arc::new(MemoryStore::default());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let admin = Uuid::new_v4();
        store.grant_admin(admin);
        let property_id = store.seed_listing(owner);
        let properties = service(&store);

        let err = properties
            .set_status(stranger, property_id, PropertyStatus::Rented)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = properties
            .update(stranger, property_id, UpdatePropertyPayload { title: Some("Meu agora".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(store.listing(property_id).unwrap().title, "Sunny 2BHK");

        let updated = properties
            .update(owner, property_id, UpdatePropertyPayload { price: Some(Decimal::from(27000)), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.price, Decimal::from(27000));

        let parked = properties
            .set_status(admin, property_id, PropertyStatus::Maintenance)
            .await
            .unwrap();
        assert_eq!(parked.status, PropertyStatus::Maintenance);
    }

    #[tokio::test]
    async fn update_rejects_non_positive_price_before_touching_the_listing() {
        let store = Arc::new(MemoryStore::default());
        let owner = Uuid::new_v4();
        let property_id = store.seed_listing(owner);

        let err = service(&store)
            .update(owner, property_id, UpdatePropertyPayload { price: Some(Decimal::from(-1)), ..Default::default() })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(store.listing(property_id).unwrap().price, Decimal::from(25000));
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let store = Arc::new(MemoryStore::default());

        let err = service(&store).detail(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service(&store)
            .set_status(Uuid::new_v4(), Uuid::new_v4(), PropertyStatus::Rented)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_hides_listings_that_are_not_available() {
        let store = Arc::new(MemoryStore::default());
        let owner = Uuid::new_v4();
        let visible = store.seed_listing(owner);
        let rented = store.seed_listing(owner);
        service(&store).set_status(owner, rented, PropertyStatus::Rented).await.unwrap();

        let found = service(&store).search(&PropertySearchQuery::default()).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, visible);
    }
}
