//! Subscriber resolution and notification fan-out.

use std::collections::HashSet;

use broadcaster::{Notifier, WebhookMessage};
use database::{rack, tracker, Database, Datacenter, Rack, Region, Result, Tracker, TrackerScope};
use status_feed::Incident;
use tracing::{debug, info, warn};

/// A hierarchy node affected by an incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    Region(Region),
    Datacenter(Datacenter),
    Rack(Rack),
}

impl NotificationTarget {
    /// Trackers to notify for this target, in delivery order.
    ///
    /// A datacenter escalates to the racks whose name appears in the incident
    /// title and then to its region. A rack does not escalate.
    pub async fn subscribers(
        &self,
        db: &Database,
        incident: &Incident,
        service_type: Option<&str>,
    ) -> Result<Vec<Tracker>> {
        let pool = db.pool();

        match self {
            NotificationTarget::Region(region) => {
                tracker::trackers_for_scope(pool, TrackerScope::Region(region.id), service_type)
                    .await
            }
            NotificationTarget::Rack(rack) => {
                tracker::trackers_for_scope(pool, TrackerScope::Rack(rack.id), service_type).await
            }
            NotificationTarget::Datacenter(datacenter) => {
                let mut subscribers = tracker::trackers_for_scope(
                    pool,
                    TrackerScope::Datacenter(datacenter.id),
                    service_type,
                )
                .await?;

                for rack in rack::list_racks_in_datacenter(pool, datacenter.id).await? {
                    if !incident.title.contains(&rack.name) {
                        continue;
                    }

                    debug!(
                        incident = %incident.id,
                        datacenter = %datacenter.name,
                        rack = %rack.name,
                        "Escalating to rack"
                    );
                    subscribers.extend(
                        tracker::trackers_for_scope(pool, TrackerScope::Rack(rack.id), service_type)
                            .await?,
                    );
                }

                subscribers.extend(
                    tracker::trackers_for_scope(
                        pool,
                        TrackerScope::Region(datacenter.region_id),
                        service_type,
                    )
                    .await?,
                );

                Ok(subscribers)
            }
        }
    }
}

/// Delivery counts for one incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Resolves subscribers and delivers rendered incidents to them.
pub struct Dispatcher<N: Notifier> {
    db: Database,
    notifier: N,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(db: Database, notifier: N) -> Self {
        Self { db, notifier }
    }

    /// The notifier used for delivery.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Trackers to notify for an incident, each webhook URL at most once.
    ///
    /// Target subscribers come first in target order, global trackers last.
    /// Deduplication is by endpoint, not by tracker: two trackers sharing a
    /// webhook URL (for instance one per service type when feeds are not
    /// bound to a service type) receive a single message, attributed to the
    /// first of them in delivery order.
    pub async fn resolve(
        &self,
        targets: &[NotificationTarget],
        incident: &Incident,
        service_type: Option<&str>,
    ) -> Result<Vec<Tracker>> {
        let mut candidates = Vec::new();
        for target in targets {
            candidates.extend(target.subscribers(&self.db, incident, service_type).await?);
        }
        candidates.extend(
            tracker::trackers_for_scope(self.db.pool(), TrackerScope::Global, service_type).await?,
        );

        let mut endpoints = HashSet::new();
        candidates.retain(|tracker| endpoints.insert(tracker.webhook_url.clone()));

        Ok(candidates)
    }

    /// Render an incident once and deliver it to every recipient.
    ///
    /// Delivery failures are logged and counted; they never stop the remaining
    /// deliveries.
    pub async fn deliver(&self, recipients: &[Tracker], incident: &Incident) -> DispatchReport {
        let message = WebhookMessage::render(&incident.title, &incident.summary);
        let mut report = DispatchReport::default();

        for recipient in recipients {
            match self.notifier.deliver(&recipient.webhook_url, &message).await {
                Ok(()) => {
                    debug!(
                        incident = %incident.id,
                        tracker = recipient.id,
                        endpoint = %recipient.webhook_url,
                        "Delivered notification"
                    );
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        incident = %incident.id,
                        tracker = recipient.id,
                        endpoint = %recipient.webhook_url,
                        "Failed to deliver notification: {}",
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            incident = %incident.id,
            delivered = report.delivered,
            failed = report.failed,
            "Dispatched incident"
        );

        report
    }

    /// Resolve the recipients of an incident and deliver to them.
    pub async fn dispatch(
        &self,
        targets: &[NotificationTarget],
        incident: &Incident,
        service_type: Option<&str>,
    ) -> Result<DispatchReport> {
        let recipients = self.resolve(targets, incident, service_type).await?;
        Ok(self.deliver(&recipients, incident).await)
    }
}
