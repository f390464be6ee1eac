//! Per-zone metrics and recommendations for `GET /zones`.

use citypulse_city_models::ZonePriority;
use citypulse_database::zones::Zone;
use citypulse_server_models::ApiZone;
use rand::Rng;

/// Recommendation when no threshold is crossed.
pub const ALL_CLEAR: &str = "All systems operating within normal parameters.";

/// Builds the API view of a zone. Water usage (60-120) and complaint
/// counts (1-5, or 10-25 for high-priority zones) are simulated per
/// request; `aqi` is the zone's air reading, `0` when unknown.
pub fn zone_view<R: Rng + ?Sized>(rng: &mut R, zone: &Zone, aqi: Option<u8>) -> ApiZone {
    let water_usage = rng.gen_range(60..=120);
    let complaints = match zone.priority {
        ZonePriority::High => rng.gen_range(10..=25),
        ZonePriority::Normal | ZonePriority::Eco => rng.gen_range(1..=5),
    };

    ApiZone {
        id: zone.id,
        name: zone.name.clone(),
        priority: zone.priority,
        position: zone.position.clone(),
        aqi: aqi.unwrap_or(0),
        complaints,
        water_usage,
        recommendations: recommendations(aqi, complaints, water_usage),
    }
}

/// Actions suggested for a zone's readings, in a fixed order.
#[must_use]
pub fn recommendations(aqi: Option<u8>, complaints: u32, water_usage: u32) -> Vec<String> {
    let mut out = Vec::new();
    if aqi.is_some_and(|v| v >= 4) {
        out.push("Deploy air purifiers and monitor emissions.".to_string());
    }
    if complaints > 15 {
        out.push("Prioritize complaint resolution teams in this area.".to_string());
    }
    if water_usage > 100 {
        out.push("Check for water leakages and promote conservation.".to_string());
    }
    if out.is_empty() {
        out.push(ALL_CLEAR.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use citypulse_server_models::ZonePosition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn zone(priority: ZonePriority) -> Zone {
        Zone {
            id: 1,
            name: "Industrial Hub".to_string(),
            priority,
            position: ZonePosition {
                top: "80%".to_string(),
                left: "65%".to_string(),
            },
            latitude: 28.5611,
            longitude: 77.2884,
        }
    }

    #[test]
    fn quiet_zone_is_all_clear() {
        assert_eq!(recommendations(Some(2), 3, 80), vec![ALL_CLEAR]);
        assert_eq!(recommendations(None, 15, 100), vec![ALL_CLEAR]);
    }

    #[test]
    fn every_threshold_adds_a_recommendation() {
        assert_eq!(
            recommendations(Some(4), 16, 101),
            vec![
                "Deploy air purifiers and monitor emissions.",
                "Prioritize complaint resolution teams in this area.",
                "Check for water leakages and promote conservation.",
            ]
        );
    }

    #[test]
    fn simulated_metrics_follow_priority() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..100 {
            let high = zone_view(&mut rng, &zone(ZonePriority::High), Some(3));
            assert!((10..=25).contains(&high.complaints));
            assert!((60..=120).contains(&high.water_usage));
            assert_eq!(high.aqi, 3);

            let eco = zone_view(&mut rng, &zone(ZonePriority::Eco), None);
            assert!((1..=5).contains(&eco.complaints));
            assert_eq!(eco.aqi, 0);
            assert_eq!(
                eco.recommendations,
                recommendations(None, eco.complaints, eco.water_usage)
            );
        }
    }
}
