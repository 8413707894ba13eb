//! Reconciliation of parsed titles against the stored hierarchy.

use database::{
    datacenter, rack, region, service_type, Database, DatabaseError, Datacenter, Rack, Region,
    Result,
};
use status_feed::title::region_from_datacenter_code;
use status_feed::{FeedSource, LocationToken, TitleScope};
use tracing::debug;

use crate::dispatcher::NotificationTarget;

/// Outcome of reconciling a title scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// Hierarchy nodes to notify, in title order.
    Targets(Vec<NotificationTarget>),
    /// The title names a rack that does not exist.
    UnknownRack(String),
}

/// Get-or-create access to regions and datacenters, lookup of racks.
#[derive(Debug, Clone)]
pub struct EntityStore {
    db: Database,
}

impl EntityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a region by code, creating it when absent.
    pub async fn get_or_create_region(&self, name: &str) -> Result<Region> {
        region::get_or_create_region(self.db.pool(), name).await
    }

    /// Get a datacenter by code, creating it and its region when absent.
    ///
    /// The region is the first three characters of the code.
    pub async fn get_or_create_datacenter(&self, code: &str) -> Result<Datacenter> {
        datacenter::get_or_create_datacenter(self.db.pool(), code, region_from_datacenter_code(code))
            .await
    }

    /// Find a rack by label. Racks are never created here.
    pub async fn find_rack(&self, label: &str) -> Result<Option<Rack>> {
        rack::find_rack(self.db.pool(), label).await
    }

    /// Sources bound to a service type that does not exist.
    ///
    /// Incidents from such a source reach no tracker.
    pub async fn unbound_sources<'a>(&self, sources: &'a [FeedSource]) -> Result<Vec<&'a FeedSource>> {
        let mut unbound = Vec::new();

        for source in sources {
            let Some(name) = source.service_type.as_deref() else {
                continue;
            };

            match service_type::get_service_type_by_name(self.db.pool(), name).await {
                Ok(_) => {}
                Err(DatabaseError::NotFound { .. }) => unbound.push(source),
                Err(e) => return Err(e),
            }
        }

        Ok(unbound)
    }

    /// Map a title scope to the hierarchy nodes it affects.
    pub async fn resolve(&self, scope: &TitleScope) -> Result<Reconciled> {
        match scope {
            TitleScope::Rack(label) => match self.find_rack(label).await? {
                Some(rack) => Ok(Reconciled::Targets(vec![NotificationTarget::Rack(rack)])),
                None => Ok(Reconciled::UnknownRack(label.clone())),
            },
            TitleScope::Locations(tokens) => {
                let mut targets = Vec::with_capacity(tokens.len());

                for token in tokens {
                    let target = match token {
                        LocationToken::Region(code) => {
                            NotificationTarget::Region(self.get_or_create_region(code).await?)
                        }
                        LocationToken::Datacenter(code) => {
                            NotificationTarget::Datacenter(self.get_or_create_datacenter(code).await?)
                        }
                    };
                    debug!(location = %token.code(), "Resolved location");
                    targets.push(target);
                }

                Ok(Reconciled::Targets(targets))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use status_feed::title::classify;

    async fn test_store() -> EntityStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        EntityStore::new(db)
    }

    #[tokio::test]
    async fn test_datacenter_creates_region() {
        let store = test_store().await;

        let sbg5 = store.get_or_create_datacenter("SBG5").await.unwrap();
        let sbg = store.get_or_create_region("SBG").await.unwrap();
        assert_eq!(sbg5.region_id, sbg.id);

        let again = store.get_or_create_datacenter("SBG5").await.unwrap();
        assert_eq!(again.id, sbg5.id);
    }

    #[tokio::test]
    async fn test_resolve_locations_in_title_order() {
        let store = test_store().await;
        let scope = classify("Scheduled maintenance [FRA/SBG5]").unwrap();

        let Reconciled::Targets(targets) = store.resolve(&scope).await.unwrap() else {
            panic!("expected targets");
        };

        assert_eq!(targets.len(), 2);
        assert!(matches!(&targets[0], NotificationTarget::Region(r) if r.name == "FRA"));
        assert!(matches!(&targets[1], NotificationTarget::Datacenter(d) if d.name == "SBG5"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_rack() {
        let store = test_store().await;
        let scope = classify("Incident on Rack A12 in SBG5").unwrap();

        assert_eq!(
            store.resolve(&scope).await.unwrap(),
            Reconciled::UnknownRack("A12".to_string())
        );
    }

    #[tokio::test]
    async fn test_unbound_sources() {
        let store = test_store().await;
        let sources = vec![
            FeedSource::new("public-cloud", "https://cloud.test/rss").with_service_type("public-cloud"),
            FeedSource::new("dedicated", "https://dedicated.test/rss").with_service_type("dedicated"),
            FeedSource::new("any", "https://any.test/rss"),
        ];

        let unbound = store.unbound_sources(&sources).await.unwrap();
        assert_eq!(unbound.len(), 1);
        assert_eq!(unbound[0].name, "dedicated");

        assert!(store
            .unbound_sources(&FeedSource::defaults())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_resolve_invalid_datacenter_code() {
        let store = test_store().await;
        let scope = classify("[VERYLONGDATACENTER] Outage").unwrap();

        let result = store.resolve(&scope).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }
}
