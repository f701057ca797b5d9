//! Resolves a random-selection configuration into concrete question ids.
//!
//! Per question type: draw each category's sub-quota first, then top up to the
//! type total from the type's whole remaining pool. Shortfalls are reported,
//! never raised. No id is selected twice within one resolution.

use crate::error::{Error, Result};
use crate::models::question::QuestionType;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Requested counts for one question type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeQuota {
    #[serde(default)]
    pub total: i64,
    #[serde(rename = "byCategory", default)]
    pub by_category: BTreeMap<String, i64>,
}

/// Resolved configuration: question type -> quota.
pub type RandomConfig = BTreeMap<QuestionType, TypeQuota>;

/// `random_config` as sent on the wire, keyed by type name or alias.
pub type RawRandomConfig = BTreeMap<String, TypeQuota>;

/// Maps wire type names onto question types. Two keys naming the same type
/// (`boolean` and `true_false`) are rejected rather than merged.
pub fn parse_config(raw: RawRandomConfig) -> Result<RandomConfig> {
    let mut config = RandomConfig::new();
    for (key, quota) in raw {
        let question_type: QuestionType =
            serde_json::from_value(serde_json::Value::String(key.clone())).map_err(|_| {
                Error::InvalidConfiguration(format!("Unknown question type '{}'", key))
            })?;
        if config.insert(question_type, quota).is_some() {
            return Err(Error::InvalidConfiguration(format!(
                "Quota for {} questions is given more than once",
                question_type
            )));
        }
    }
    Ok(config)
}

/// A candidate question in the pool of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    pub id: i64,
    /// Category name; `None` when uncategorized.
    pub category: Option<String>,
}

/// Gap between a quota line and what the pool could supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaShortfall {
    pub question_type: QuestionType,
    /// `None` for the type-level total.
    pub category: Option<String>,
    pub requested: usize,
    pub fulfilled: usize,
}

impl QuotaShortfall {
    pub fn deficit(&self) -> usize {
        self.requested.saturating_sub(self.fulfilled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Selected ids grouped by type.
    pub selected: BTreeMap<QuestionType, Vec<i64>>,
    pub shortfalls: Vec<QuotaShortfall>,
}

impl Resolution {
    pub fn ids_for(&self, question_type: QuestionType) -> &[i64] {
        self.selected
            .get(&question_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Rejects negative counts before any draw happens.
pub fn validate_config(config: &RandomConfig) -> Result<()> {
    for (question_type, quota) in config {
        if quota.total < 0 {
            return Err(Error::InvalidConfiguration(format!(
                "Negative total {} for {} questions",
                quota.total, question_type
            )));
        }
        for (category, need) in &quota.by_category {
            if *need < 0 {
                return Err(Error::InvalidConfiguration(format!(
                    "Negative count {} for category '{}' in {} questions",
                    need, category, question_type
                )));
            }
        }
    }
    Ok(())
}

/// Resolves every configured type. `pools` maps each type to its full candidate pool.
///
/// Category draws stop once the type total is reached, so a type never
/// receives more than `total` questions; the capped part of a category request
/// is not reported as a shortfall. Categories are visited in name order.
pub fn resolve<R: Rng + ?Sized>(
    config: &RandomConfig,
    pools: &BTreeMap<QuestionType, Vec<PoolEntry>>,
    rng: &mut R,
) -> Result<Resolution> {
    validate_config(config)?;

    let mut taken: HashSet<i64> = HashSet::new();
    let mut resolution = Resolution::default();

    for (question_type, quota) in config {
        let pool = pools.get(question_type).map(Vec::as_slice).unwrap_or(&[]);
        let ids = resolve_type(
            *question_type,
            quota,
            pool,
            &mut taken,
            &mut resolution.shortfalls,
            rng,
        );
        resolution.selected.insert(*question_type, ids);
    }

    Ok(resolution)
}

fn resolve_type<R: Rng + ?Sized>(
    question_type: QuestionType,
    quota: &TypeQuota,
    pool: &[PoolEntry],
    taken: &mut HashSet<i64>,
    shortfalls: &mut Vec<QuotaShortfall>,
    rng: &mut R,
) -> Vec<i64> {
    let total = quota.total.max(0) as usize;
    let mut picked: Vec<i64> = Vec::new();

    for (category, need) in &quota.by_category {
        let need = (*need).max(0) as usize;
        if need == 0 {
            continue;
        }
        let room = total.saturating_sub(picked.len());
        let want = need.min(room);

        let eligible: Vec<i64> = pool
            .iter()
            .filter(|e| e.category.as_deref() == Some(category.as_str()))
            .filter(|e| !taken.contains(&e.id))
            .map(|e| e.id)
            .collect();

        if !pool
            .iter()
            .any(|e| e.category.as_deref() == Some(category.as_str()))
        {
            tracing::warn!(
                question_type = %question_type,
                category = %category,
                "Category has no {} questions in the pool",
                question_type
            );
        }

        let drawn = draw(&eligible, want, rng);
        if drawn.len() < want {
            shortfalls.push(QuotaShortfall {
                question_type,
                category: Some(category.clone()),
                requested: want,
                fulfilled: drawn.len(),
            });
        }
        taken.extend(drawn.iter().copied());
        picked.extend(drawn);
    }

    let remaining = total.saturating_sub(picked.len());
    if remaining > 0 {
        let eligible: Vec<i64> = pool
            .iter()
            .filter(|e| !taken.contains(&e.id))
            .map(|e| e.id)
            .collect();
        let drawn = draw(&eligible, remaining, rng);
        taken.extend(drawn.iter().copied());
        picked.extend(drawn);
    }

    if picked.len() < total {
        tracing::warn!(
            question_type = %question_type,
            requested = total,
            fulfilled = picked.len(),
            "Question pool exhausted before reaching the requested total"
        );
        shortfalls.push(QuotaShortfall {
            question_type,
            category: None,
            requested: total,
            fulfilled: picked.len(),
        });
    }

    picked
}

/// Uniform draw of up to `amount` distinct ids without replacement.
fn draw<R: Rng + ?Sized>(eligible: &[i64], amount: usize, rng: &mut R) -> Vec<i64> {
    if amount == 0 {
        return Vec::new();
    }
    eligible.choose_multiple(rng, amount).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entries(ids: std::ops::RangeInclusive<i64>, category: Option<&str>) -> Vec<PoolEntry> {
        ids.map(|id| PoolEntry {
            id,
            category: category.map(str::to_string),
        })
        .collect()
    }

    fn quota(total: i64, by_category: &[(&str, i64)]) -> TypeQuota {
        TypeQuota {
            total,
            by_category: by_category
                .iter()
                .map(|(c, n)| (c.to_string(), *n))
                .collect(),
        }
    }

    fn single_pool(pool: Vec<PoolEntry>) -> BTreeMap<QuestionType, Vec<PoolEntry>> {
        BTreeMap::from([(QuestionType::Single, pool)])
    }

    fn distinct(ids: &[i64]) -> bool {
        ids.iter().collect::<HashSet<_>>().len() == ids.len()
    }

    #[test]
    fn exact_total_when_pool_suffices() {
        let mut pool = entries(1..=10, Some("basics"));
        pool.extend(entries(11..=20, Some("syntax")));
        pool.extend(entries(21..=25, None));
        let config = RandomConfig::from([(
            QuestionType::Single,
            quota(10, &[("basics", 3), ("syntax", 4)]),
        )]);

        let mut rng = StdRng::seed_from_u64(7);
        let out = resolve(&config, &single_pool(pool), &mut rng).unwrap();
        let ids = out.ids_for(QuestionType::Single);

        assert_eq!(ids.len(), 10);
        assert!(distinct(ids));
        assert!(ids.iter().filter(|id| (1..=10).contains(*id)).count() >= 3);
        assert!(ids.iter().filter(|id| (11..=20).contains(*id)).count() >= 4);
        assert!(out.shortfalls.is_empty());
    }

    #[test]
    fn category_shortfall_is_topped_up_from_elsewhere() {
        let mut pool = entries(1..=3, Some("geometry"));
        pool.extend(entries(4..=12, Some("algebra")));
        let config =
            RandomConfig::from([(QuestionType::Single, quota(6, &[("geometry", 5)]))]);

        let mut rng = StdRng::seed_from_u64(11);
        let out = resolve(&config, &single_pool(pool), &mut rng).unwrap();
        let ids = out.ids_for(QuestionType::Single);

        assert_eq!(ids.len(), 6);
        assert!(distinct(ids));
        for id in 1..=3 {
            assert!(ids.contains(&id), "all geometry questions are taken");
        }
        assert_eq!(
            out.shortfalls,
            vec![QuotaShortfall {
                question_type: QuestionType::Single,
                category: Some("geometry".into()),
                requested: 5,
                fulfilled: 3,
            }]
        );
    }

    #[test]
    fn never_exceeds_total_when_categories_ask_for_more() {
        let mut pool = entries(1..=5, Some("a"));
        pool.extend(entries(6..=10, Some("b")));
        let config =
            RandomConfig::from([(QuestionType::Single, quota(4, &[("a", 3), ("b", 3)]))]);

        let mut rng = StdRng::seed_from_u64(3);
        let out = resolve(&config, &single_pool(pool), &mut rng).unwrap();
        let ids = out.ids_for(QuestionType::Single);

        assert_eq!(ids.len(), 4);
        assert!(distinct(ids));
        assert!(out.shortfalls.is_empty(), "capping at the total is not a shortfall");
    }

    #[test]
    fn exhausted_pool_returns_fewer_and_reports() {
        let config = RandomConfig::from([(QuestionType::Single, quota(8, &[]))]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve(&config, &single_pool(entries(1..=5, None)), &mut rng).unwrap();

        assert_eq!(out.ids_for(QuestionType::Single).len(), 5);
        assert_eq!(out.shortfalls.len(), 1);
        assert_eq!(out.shortfalls[0].category, None);
        assert_eq!(out.shortfalls[0].deficit(), 3);
    }

    #[test]
    fn unknown_category_counts_as_empty_pool() {
        let config =
            RandomConfig::from([(QuestionType::Single, quota(2, &[("missing", 2)]))]);
        let mut rng = StdRng::seed_from_u64(5);
        let out = resolve(&config, &single_pool(entries(1..=4, Some("known"))), &mut rng)
            .unwrap();

        assert_eq!(out.ids_for(QuestionType::Single).len(), 2);
        assert_eq!(out.shortfalls[0].category.as_deref(), Some("missing"));
        assert_eq!(out.shortfalls[0].fulfilled, 0);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let pools = single_pool(entries(1..=3, None));

        let config = RandomConfig::from([(QuestionType::Single, quota(-1, &[]))]);
        assert!(matches!(
            resolve(&config, &pools, &mut rng),
            Err(Error::InvalidConfiguration(_))
        ));

        let config = RandomConfig::from([(QuestionType::Single, quota(2, &[("x", -2)]))]);
        assert!(matches!(
            resolve(&config, &pools, &mut rng),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn same_seed_gives_same_selection() {
        let pool = entries(1..=50, Some("all"));
        let config = RandomConfig::from([(QuestionType::Single, quota(10, &[("all", 4)]))]);
        let pools = single_pool(pool);

        let first = resolve(&config, &pools, &mut StdRng::seed_from_u64(99)).unwrap();
        let second = resolve(&config, &pools, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn aliased_type_keys_cannot_both_be_given() {
        let raw: RawRandomConfig = serde_json::from_value(serde_json::json!({
            "boolean": { "total": 1 },
            "true_false": { "total": 3 }
        }))
        .unwrap();
        assert!(matches!(parse_config(raw), Err(Error::InvalidConfiguration(_))));

        let raw: RawRandomConfig =
            serde_json::from_value(serde_json::json!({ "essay": { "total": 1 } })).unwrap();
        assert!(matches!(parse_config(raw), Err(Error::InvalidConfiguration(_))));

        let raw: RawRandomConfig = serde_json::from_value(serde_json::json!({
            "true_false": { "total": 2 },
            "single": { "total": 1 }
        }))
        .unwrap();
        let config = parse_config(raw).unwrap();
        assert_eq!(config[&QuestionType::Boolean].total, 2);
        assert_eq!(config[&QuestionType::Single].total, 1);
    }

    #[test]
    fn wire_format_uses_by_category_key() {
        let config: RandomConfig = serde_json::from_value(serde_json::json!({
            "single": { "total": 5, "byCategory": { "basics": 2 } },
            "true_false": { "total": 2 }
        }))
        .unwrap();
        assert_eq!(config[&QuestionType::Single].by_category["basics"], 2);
        assert_eq!(config[&QuestionType::Boolean].total, 2);
    }
}
