use crate::models::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stamp earned by a user. Written by the stamp/coupon award flow.
#[derive(Debug, Clone, PartialEq)]
pub struct StampAward {
    pub user_id: UserId,
    pub category: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StampCount {
    #[schema(example = "CLEAN_PLATE")]
    pub category: String,
    pub count: u64,
}

/// Read model recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StampSummary {
    pub user_id: i64,
    pub total_stamps: u64,
    pub categories: Vec<StampCount>,
    pub last_earned_at: Option<DateTime<Utc>>,
}

impl StampSummary {
    pub fn from_awards(user_id: UserId, awards: &[StampAward]) -> Self {
        let mut per_category: BTreeMap<&str, u64> = BTreeMap::new();
        for award in awards {
            *per_category.entry(award.category.as_str()).or_insert(0) += 1;
        }

        Self {
            user_id: user_id.value(),
            total_stamps: awards.len() as u64,
            categories: per_category
                .into_iter()
                .map(|(category, count)| StampCount { category: category.to_string(), count })
                .collect(),
            last_earned_at: awards.iter().map(|a| a.earned_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn award(category: &str, day: u32) -> StampAward {
        StampAward {
            user_id: UserId::new(1).unwrap(),
            category: category.to_string(),
            earned_at: Utc.with_ymd_and_hms(2025, 7, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_summary_groups_by_category() {
        let awards = vec![award("VEGAN", 1), award("CLEAN_PLATE", 3), award("CLEAN_PLATE", 2)];
        let summary = StampSummary::from_awards(UserId::new(1).unwrap(), &awards);

        assert_eq!(summary.total_stamps, 3);
        assert_eq!(
            summary.categories,
            vec![
                StampCount { category: "CLEAN_PLATE".into(), count: 2 },
                StampCount { category: "VEGAN".into(), count: 1 },
            ]
        );
        assert_eq!(summary.last_earned_at, Some(Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap()));
    }

    #[test]
    fn test_empty_summary() {
        let summary = StampSummary::from_awards(UserId::new(9).unwrap(), &[]);

        assert_eq!(summary.user_id, 9);
        assert_eq!(summary.total_stamps, 0);
        assert!(summary.categories.is_empty());
        assert!(summary.last_earned_at.is_none());
    }
}
