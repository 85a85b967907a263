// Typed counterpart of the dashboard sidebar: every selector becomes a field
// on `FilterCriteria`. Applying a filter copies the matching rows; the
// canonical enriched table is never mutated.
use crate::types::EnrichedStation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugType {
    Ef,
    Type2,
    ComboCcs,
    Chademo,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    PayAsYouGo,
    Other,
}

/// A conjunction of the sidebar selections. `None`/empty means "no
/// constraint" for that axis; payment methods combine as any-of, matching
/// the dashboard's multiselect.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub operator: Option<String>,
    pub access_condition: Option<String>,
    pub plug: Option<PlugType>,
    pub payments: Vec<PaymentMethod>,
    /// Inclusive nominal-power range in kW. Stations with an unknown power
    /// rating never match a power constraint.
    pub power_kw: Option<(f64, f64)>,
    /// Inclusive charge-point-count range.
    pub charge_points: Option<(u32, u32)>,
}

impl FilterCriteria {
    pub fn matches(&self, station: &EnrichedStation) -> bool {
        let record = &station.record;

        if let Some(operator) = &self.operator {
            if record.operator != *operator {
                return false;
            }
        }
        if let Some(access) = &self.access_condition {
            if record.access_condition.as_deref() != Some(access.as_str()) {
                return false;
            }
        }
        if let Some(plug) = self.plug {
            let has_plug = match plug {
                PlugType::Ef => record.plug_ef,
                PlugType::Type2 => record.plug_type2,
                PlugType::ComboCcs => record.plug_combo_ccs,
                PlugType::Chademo => record.plug_chademo,
                PlugType::Other => record.plug_other,
            };
            if !has_plug {
                return false;
            }
        }
        if !self.payments.is_empty() {
            let accepts_any = self.payments.iter().any(|method| match method {
                PaymentMethod::CreditCard => record.payment_card,
                PaymentMethod::PayAsYouGo => record.payment_act,
                PaymentMethod::Other => record.payment_other,
            });
            if !accepts_any {
                return false;
            }
        }
        if let Some((lo, hi)) = self.power_kw {
            match record.power_kw {
                Some(p) if p >= lo && p <= hi => {}
                _ => return false,
            }
        }
        if let Some((lo, hi)) = self.charge_points {
            if record.charge_points < lo || record.charge_points > hi {
                return false;
            }
        }
        true
    }

    /// Filtered copy of the enriched table.
    pub fn apply(&self, stations: &[EnrichedStation]) -> Vec<EnrichedStation> {
        stations
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnrichedStation, StationRecord};

    fn enriched(operator: &str, power_kw: Option<f64>, card: bool, type2: bool) -> EnrichedStation {
        EnrichedStation {
            longitude: 2.35,
            latitude: 48.85,
            department: "75".to_string(),
            record: StationRecord {
                operator: operator.to_string(),
                address: None,
                longitude: Some(2.35),
                latitude: Some(48.85),
                power_kw,
                plug_ef: false,
                plug_type2: type2,
                plug_combo_ccs: false,
                plug_chademo: false,
                plug_other: false,
                payment_act: false,
                payment_card: card,
                payment_other: false,
                access_condition: Some("Accès libre".to_string()),
                reservation: None,
                commissioned: None,
                charge_points: 2,
            },
        }
    }

    #[test]
    fn default_criteria_match_everything() {
        let table = vec![
            enriched("TESLA", Some(250.0), false, false),
            enriched("IZIVIA", None, true, true),
        ];
        assert_eq!(FilterCriteria::default().apply(&table).len(), 2);
    }

    #[test]
    fn operator_and_plug_constraints_are_conjunctive() {
        let table = vec![
            enriched("TESLA", Some(250.0), false, false),
            enriched("IZIVIA", Some(22.0), true, true),
        ];
        let criteria = FilterCriteria {
            operator: Some("IZIVIA".to_string()),
            plug: Some(PlugType::Type2),
            ..Default::default()
        };
        let filtered = criteria.apply(&table);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.operator, "IZIVIA");
    }

    #[test]
    fn payment_methods_combine_as_any_of() {
        let table = vec![
            enriched("TESLA", Some(250.0), false, false),
            enriched("IZIVIA", Some(22.0), true, false),
        ];
        let criteria = FilterCriteria {
            payments: vec![PaymentMethod::CreditCard, PaymentMethod::PayAsYouGo],
            ..Default::default()
        };
        let filtered = criteria.apply(&table);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.operator, "IZIVIA");
    }

    #[test]
    fn unknown_power_never_matches_a_power_range() {
        let table = vec![
            enriched("TESLA", Some(250.0), false, false),
            enriched("IZIVIA", None, true, true),
        ];
        let criteria = FilterCriteria {
            power_kw: Some((0.0, 1000.0)),
            ..Default::default()
        };
        let filtered = criteria.apply(&table);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.operator, "TESLA");
    }

    #[test]
    fn apply_leaves_the_source_table_intact() {
        let table = vec![enriched("TESLA", Some(250.0), false, false)];
        let before = table.clone();
        let criteria = FilterCriteria {
            operator: Some("NOBODY".to_string()),
            ..Default::default()
        };
        assert!(criteria.apply(&table).is_empty());
        assert_eq!(table, before);
    }
}
