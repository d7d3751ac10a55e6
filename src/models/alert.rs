//! Alert types and the in-memory alert store
//!
//! Alerts live only in process memory; there is deliberately no database
//! behind this. The store is a plain Vec behind a lock, which is plenty for
//! the advisory CRUD surface.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Default lifetime for alerts created without an explicit expiry.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Degrees-to-kilometers factor (1 degree of latitude is roughly 111 km).
const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub service: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: Option<GeoPoint>,
    pub affected_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub source: String,
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emergency_contacts: Vec<EmergencyContact>,
}

impl Alert {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether this alert's location falls within `radius_km` of the query
    /// point. Alerts without a location never match.
    pub fn affects(&self, latitude: f64, longitude: f64, radius_km: f64) -> bool {
        let Some(loc) = self.location else {
            return false;
        };
        let lat_km = (latitude - loc.latitude).abs() * KM_PER_DEGREE;
        let lon_km = (longitude - loc.longitude).abs()
            * KM_PER_DEGREE
            * latitude.to_radians().cos().abs();
        (lat_km * lat_km + lon_km * lon_km).sqrt() <= radius_km
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlert {
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub affected_areas: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
}

/// Body for the emergency shortcut. Everything optional; severity and kind
/// are forced, and the fixed contact catalog is attached.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmergencyAlert {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub affected_areas: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

impl CreateEmergencyAlert {
    pub fn into_create(self) -> CreateAlert {
        let recommended_actions = if self.recommended_actions.is_empty() {
            vec![
                "follow_official_instructions".to_string(),
                "evacuate_if_instructed".to_string(),
                "stay_informed".to_string(),
            ]
        } else {
            self.recommended_actions
        };

        CreateAlert {
            kind: "emergency".to_string(),
            severity: Severity::Critical,
            title: self.title.unwrap_or_else(|| "Emergency Alert".to_string()),
            description: self
                .description
                .unwrap_or_else(|| "Emergency situation detected".to_string()),
            location: self.location,
            affected_areas: self.affected_areas,
            expires_at: None,
            source: Some("emergency_system".to_string()),
            recommended_actions,
            emergency_contacts: vec![
                EmergencyContact {
                    service: "Emergency Services".to_string(),
                    number: "911".to_string(),
                },
                EmergencyContact {
                    service: "Local Emergency Management".to_string(),
                    number: "emergency_line".to_string(),
                },
            ],
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAlert {
    pub severity: Option<Severity>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub affected_areas: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub recommended_actions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub active_only: bool,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
    pub total_count: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationAlerts {
    pub alerts: Vec<Alert>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub total_count: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertStats {
    pub total_alerts: usize,
    pub active_alerts: usize,
    pub expired_alerts: usize,
    pub severity_distribution: BTreeMap<String, usize>,
    pub kind_distribution: BTreeMap<String, usize>,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Default)]
pub struct AlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, req: CreateAlert) -> Alert {
        let now = Utc::now();
        let alert = Alert {
            id: Uuid::new_v4(),
            kind: req.kind,
            severity: req.severity,
            title: req.title,
            description: req.description,
            location: req.location,
            affected_areas: req.affected_areas,
            created_at: now,
            expires_at: req
                .expires_at
                .unwrap_or_else(|| now + Duration::hours(DEFAULT_EXPIRY_HOURS)),
            source: req.source.unwrap_or_else(|| "hazardcast".to_string()),
            recommended_actions: req.recommended_actions,
            emergency_contacts: req.emergency_contacts,
        };
        self.alerts.write().push(alert.clone());
        alert
    }

    pub fn get(&self, id: Uuid) -> Option<Alert> {
        self.alerts.read().iter().find(|a| a.id == id).cloned()
    }

    pub fn list(&self, filter: &AlertFilter) -> Vec<Alert> {
        let now = Utc::now();
        self.alerts
            .read()
            .iter()
            .filter(|a| !filter.active_only || a.is_active(now))
            .filter(|a| filter.severity.map_or(true, |s| a.severity == s))
            .cloned()
            .collect()
    }

    pub fn update(&self, id: Uuid, update: UpdateAlert) -> Option<Alert> {
        let mut alerts = self.alerts.write();
        let alert = alerts.iter_mut().find(|a| a.id == id)?;

        if let Some(severity) = update.severity {
            alert.severity = severity;
        }
        if let Some(title) = update.title {
            alert.title = title;
        }
        if let Some(description) = update.description {
            alert.description = description;
        }
        if let Some(areas) = update.affected_areas {
            alert.affected_areas = areas;
        }
        if let Some(expires_at) = update.expires_at {
            alert.expires_at = expires_at;
        }
        if let Some(actions) = update.recommended_actions {
            alert.recommended_actions = actions;
        }
        Some(alert.clone())
    }

    pub fn delete(&self, id: Uuid) -> Option<Alert> {
        let mut alerts = self.alerts.write();
        let pos = alerts.iter().position(|a| a.id == id)?;
        Some(alerts.remove(pos))
    }

    pub fn statistics(&self) -> AlertStats {
        let now = Utc::now();
        let alerts = self.alerts.read();

        let mut severity_distribution = BTreeMap::new();
        let mut kind_distribution = BTreeMap::new();
        let mut active = 0usize;
        for alert in alerts.iter() {
            *severity_distribution
                .entry(alert.severity.as_str().to_string())
                .or_insert(0) += 1;
            *kind_distribution.entry(alert.kind.clone()).or_insert(0) += 1;
            if alert.is_active(now) {
                active += 1;
            }
        }

        AlertStats {
            total_alerts: alerts.len(),
            active_alerts: active,
            expired_alerts: alerts.len() - active,
            severity_distribution,
            kind_distribution,
            last_updated: now,
        }
    }
}

// ============================================================================
// LOCATION-SCOPED GENERATION
// ============================================================================

/// Known high-seismicity boxes (California, Japan, New Zealand,
/// Turkey/Greece).
pub fn is_seismic_zone(latitude: f64, longitude: f64) -> bool {
    const ZONES: [(f64, f64, f64, f64); 4] = [
        (32.0, 42.0, -125.0, -114.0),
        (35.0, 45.0, 135.0, 145.0),
        (-45.0, -35.0, 165.0, 180.0),
        (36.0, 42.0, 25.0, 35.0),
    ];
    ZONES.iter().any(|&(lat_min, lat_max, lon_min, lon_max)| {
        (lat_min..=lat_max).contains(&latitude) && (lon_min..=lon_max).contains(&longitude)
    })
}

const WEATHER_TITLES: [&str; 4] =
    ["Severe Weather Watch", "High Wind Advisory", "Heavy Rain Warning", "Storm Alert"];

/// Synthesize plausible area alerts for a location: a possible weather
/// alert anywhere, a fire alert away from the equatorial belt, and an
/// earthquake preparedness reminder inside seismic zones. Randomness comes
/// from the caller's RNG.
pub fn location_alerts<R: Rng>(rng: &mut R, latitude: f64, longitude: f64) -> Vec<Alert> {
    let now = Utc::now();
    let here = Some(GeoPoint { latitude, longitude });
    let mut alerts = Vec::new();

    if rng.gen_bool(0.3) {
        alerts.push(Alert {
            id: Uuid::new_v4(),
            kind: "weather".to_string(),
            severity: [Severity::Low, Severity::Moderate, Severity::High]
                [rng.gen_range(0..3)],
            title: WEATHER_TITLES[rng.gen_range(0..WEATHER_TITLES.len())].to_string(),
            description: "Weather conditions may pose risks to the area. Monitor updates and take appropriate precautions.".to_string(),
            location: here,
            affected_areas: vec![format!(
                "Within 25km of coordinates {latitude:.2}, {longitude:.2}"
            )],
            created_at: now - Duration::hours(rng.gen_range(1..=12)),
            expires_at: now + Duration::hours(rng.gen_range(6..=48)),
            source: "weather_monitoring_system".to_string(),
            recommended_actions: vec![
                "monitor_weather_updates".to_string(),
                "secure_loose_items".to_string(),
                "avoid_unnecessary_travel".to_string(),
            ],
            emergency_contacts: Vec::new(),
        });
    }

    if latitude.abs() > 25.0 && rng.gen_bool(0.2) {
        alerts.push(Alert {
            id: Uuid::new_v4(),
            kind: "wildfire".to_string(),
            severity: [Severity::Moderate, Severity::High][rng.gen_range(0..2)],
            title: "Fire Weather Warning".to_string(),
            description: "Dry conditions and winds create elevated fire risk. Exercise extreme caution with any ignition sources.".to_string(),
            location: here,
            affected_areas: vec![format!("Fire risk zone near {latitude:.2}, {longitude:.2}")],
            created_at: now - Duration::hours(rng.gen_range(2..=24)),
            expires_at: now + Duration::hours(rng.gen_range(12..=72)),
            source: "fire_monitoring_system".to_string(),
            recommended_actions: vec![
                "no_outdoor_burning".to_string(),
                "prepare_evacuation_routes".to_string(),
                "monitor_fire_conditions".to_string(),
            ],
            emergency_contacts: Vec::new(),
        });
    }

    if is_seismic_zone(latitude, longitude) && rng.gen_bool(0.1) {
        alerts.push(Alert {
            id: Uuid::new_v4(),
            kind: "earthquake".to_string(),
            severity: Severity::Moderate,
            title: "Earthquake Preparedness Reminder".to_string(),
            description: "This area has elevated seismic activity. Ensure earthquake preparedness measures are in place.".to_string(),
            location: here,
            affected_areas: vec![format!("Seismic zone including {latitude:.2}, {longitude:.2}")],
            created_at: now - Duration::days(rng.gen_range(1..=7)),
            expires_at: now + Duration::days(30),
            source: "seismic_monitoring_system".to_string(),
            recommended_actions: vec![
                "earthquake_kit_ready".to_string(),
                "secure_heavy_objects".to_string(),
                "know_evacuation_routes".to_string(),
            ],
            emergency_contacts: Vec::new(),
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert(severity: Severity, expires_in_hours: i64) -> CreateAlert {
        CreateAlert {
            kind: "weather".to_string(),
            severity,
            title: "Severe Weather Watch".to_string(),
            description: "Strong winds and heavy rain expected".to_string(),
            location: Some(GeoPoint { latitude: 37.77, longitude: -122.42 }),
            affected_areas: vec!["Bay Area".to_string()],
            expires_at: Some(Utc::now() + Duration::hours(expires_in_hours)),
            source: None,
            recommended_actions: vec!["secure outdoor items".to_string()],
            emergency_contacts: Vec::new(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = AlertStore::new();
        let created = store.create(sample_alert(Severity::Moderate, 24));
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.source, "hazardcast");
    }

    #[test]
    fn test_filters_active_and_severity() {
        let store = AlertStore::new();
        store.create(sample_alert(Severity::High, 24));
        store.create(sample_alert(Severity::Low, -1)); // already expired

        let all = store.list(&AlertFilter::default());
        assert_eq!(all.len(), 2);

        let active = store.list(&AlertFilter { active_only: true, severity: None });
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::High);

        let low = store.list(&AlertFilter { active_only: false, severity: Some(Severity::Low) });
        assert_eq!(low.len(), 1);
    }

    #[test]
    fn test_update_is_partial() {
        let store = AlertStore::new();
        let alert = store.create(sample_alert(Severity::Low, 24));

        let updated = store
            .update(
                alert.id,
                UpdateAlert { severity: Some(Severity::Critical), ..Default::default() },
            )
            .unwrap();
        assert_eq!(updated.severity, Severity::Critical);
        assert_eq!(updated.title, alert.title);
    }

    #[test]
    fn test_delete_removes_alert() {
        let store = AlertStore::new();
        let alert = store.create(sample_alert(Severity::High, 24));
        assert!(store.delete(alert.id).is_some());
        assert!(store.get(alert.id).is_none());
        assert!(store.delete(alert.id).is_none());
    }

    #[test]
    fn test_affects_uses_radius() {
        let store = AlertStore::new();
        let alert = store.create(sample_alert(Severity::High, 24)); // Bay Area

        // Oakland is well within 50 km of the sample alert's location.
        assert!(alert.affects(37.80, -122.27, 50.0));
        // Los Angeles is not.
        assert!(!alert.affects(34.05, -118.24, 50.0));
    }

    #[test]
    fn test_alert_without_location_never_matches() {
        let store = AlertStore::new();
        let mut req = sample_alert(Severity::Low, 24);
        req.location = None;
        let alert = store.create(req);
        assert!(!alert.affects(37.77, -122.42, 10_000.0));
    }

    #[test]
    fn test_seismic_zone_boxes() {
        assert!(is_seismic_zone(37.77, -122.42)); // California
        assert!(is_seismic_zone(36.0, 140.0)); // Japan
        assert!(is_seismic_zone(-41.0, 174.0)); // New Zealand
        assert!(is_seismic_zone(39.0, 30.0)); // Turkey
        assert!(!is_seismic_zone(0.0, 0.0));
        assert!(!is_seismic_zone(51.5, -0.12)); // London
    }

    #[test]
    fn test_location_alerts_respect_regional_rules() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);

        // Equatorial non-seismic point: no wildfire, no earthquake alerts
        // across many draws.
        for _ in 0..200 {
            for alert in location_alerts(&mut rng, 0.0, 0.0) {
                assert_eq!(alert.kind, "weather");
                assert!(WEATHER_TITLES.contains(&alert.title.as_str()));
                assert!(alert.is_active(Utc::now()));
            }
        }

        // A seismic mid-latitude point can produce all three kinds.
        let mut kinds = std::collections::BTreeSet::new();
        for _ in 0..500 {
            for alert in location_alerts(&mut rng, 37.77, -122.42) {
                kinds.insert(alert.kind.clone());
            }
        }
        assert!(kinds.contains("weather"));
        assert!(kinds.contains("wildfire"));
        assert!(kinds.contains("earthquake"));
    }

    #[test]
    fn test_emergency_alert_is_forced_critical() {
        let store = AlertStore::new();
        let body = CreateEmergencyAlert {
            title: None,
            description: None,
            location: Some(GeoPoint { latitude: 37.77, longitude: -122.42 }),
            affected_areas: vec!["Downtown".to_string()],
            recommended_actions: Vec::new(),
        };
        let alert = store.create(body.into_create());

        assert_eq!(alert.kind, "emergency");
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.title, "Emergency Alert");
        assert_eq!(alert.source, "emergency_system");
        assert!(!alert.emergency_contacts.is_empty());
        assert!(alert.recommended_actions.contains(&"stay_informed".to_string()));
        // It lands in the store like any other alert.
        assert!(store.get(alert.id).is_some());
    }

    #[test]
    fn test_statistics_counts() {
        let store = AlertStore::new();
        store.create(sample_alert(Severity::High, 24));
        store.create(sample_alert(Severity::High, 24));
        store.create(sample_alert(Severity::Low, -2));

        let stats = store.statistics();
        assert_eq!(stats.total_alerts, 3);
        assert_eq!(stats.active_alerts, 2);
        assert_eq!(stats.expired_alerts, 1);
        assert_eq!(stats.severity_distribution["high"], 2);
        assert_eq!(stats.kind_distribution["weather"], 3);
    }
}
