// Category-result lookup seam and the concurrent fan-out over it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::composite::{compose_full_eval, CategoryRecord, FullEvalReport};
use crate::error::{LookupError, ProfileError};
use crate::profile::FullEvalProfile;
use crate::tier::{AgeTier, CategoryKind};

/// "Most recent category result for (player, template label)".
///
/// Implementations must be `Send + Sync`; the aggregator issues all of its
/// lookups at once.
#[async_trait]
pub trait CategoryResultSource: Send + Sync {
    /// `Ok(None)` when the player has never been assessed on the template.
    async fn latest_category_result(
        &self,
        player_id: &str,
        template_label: &str,
    ) -> Result<Option<CategoryRecord>, LookupError>;
}

/// Fetch the five full-evaluation categories concurrently. A miss or a
/// failed lookup leaves that category out of the map.
pub async fn fetch_full_eval_inputs<S>(
    source: &S,
    player_id: &str,
    tier: AgeTier,
) -> BTreeMap<CategoryKind, CategoryRecord>
where
    S: CategoryResultSource + ?Sized,
{
    let [athletic, hitting, throwing, catching, fielding] = FullEvalProfile::CATEGORIES;
    let fetch = |kind| fetch_one(source, player_id, tier, kind);

    let (athletic, hitting, throwing, catching, fielding) = tokio::join!(
        fetch(athletic),
        fetch(hitting),
        fetch(throwing),
        fetch(catching),
        fetch(fielding),
    );

    [athletic, hitting, throwing, catching, fielding]
        .into_iter()
        .flatten()
        .collect()
}

async fn fetch_one<S>(
    source: &S,
    player_id: &str,
    tier: AgeTier,
    kind: CategoryKind,
) -> Option<(CategoryKind, CategoryRecord)>
where
    S: CategoryResultSource + ?Sized,
{
    let label = tier.template_label(kind);
    match source.latest_category_result(player_id, &label).await {
        Ok(Some(record)) => Some((kind, record)),
        Ok(None) => {
            debug!("no `{label}` result for player {player_id}");
            None
        }
        Err(e) => {
            warn!("{e}; treating `{label}` as not assessed");
            None
        }
    }
}

/// Fetch and compose a player's full-evaluation report.
///
/// Fails only when the tier has no full evaluation; that is checked before
/// any lookup is issued.
pub async fn full_eval_report<S>(
    source: &S,
    player_id: &str,
    tier: AgeTier,
) -> Result<FullEvalReport, ProfileError>
where
    S: CategoryResultSource + ?Sized,
{
    tier.profile().full_eval()?;
    let records = fetch_full_eval_inputs(source, player_id, tier).await;
    compose_full_eval(player_id, tier, &records)
}
