//! Document scanner and transaction coordinator.
//!
//! Three phases over one mutable tree:
//!
//! 1. **Scan**: a depth-first walk collects every eligible paragraph into a
//!    per-invocation job list (no shared state between invocations).
//! 2. **Fan-out**: one task per target fetches metadata, materializes the
//!    favicon and preview image, and resolves a render-ready record. Tasks
//!    are independent; one failing (or panicking) never discards another's
//!    completed work.
//! 3. **Commit**: after *all* outcomes are collected, a second walk
//!    re-resolves each target in the current tree and swaps in the card
//!    node. A target that no longer matches its scan-time snapshot is a
//!    silent no-op; a failed job leaves its paragraph untouched.
//!
//! The commit never uses child indices captured before mutation, so the net
//! result is independent of job completion order. The transform itself is
//! infallible: coordinator-level faults are logged and the tree is always
//! returned to the caller in a consistent state.

mod scan;

pub use scan::{EligibleParagraph, eligible, scan};

use markdown_it::Node;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

use crate::cache::AssetCache;
use crate::card::LinkCard;
use crate::config::LinkCardConfig;
use crate::fetch::{HttpTransport, Transport};
use crate::metadata::{self, MetadataRecord};
use crate::{debug, log};

/// Shared, read-only state for one transform invocation.
struct JobContext {
    config: LinkCardConfig,
    transport: Arc<dyn Transport>,
    /// Present only when asset caching is enabled.
    cache: Option<AssetCache>,
}

/// Replace every eligible bare-URL paragraph in `root` with a link card.
///
/// Mutates the tree in place. Never fails: every error degrades to "that
/// paragraph keeps its original form" and is logged.
pub async fn transform(root: &mut Node, config: &LinkCardConfig) {
    let transport = match HttpTransport::new(config) {
        Ok(transport) => Arc::new(transport),
        Err(err) => {
            log!("error"; "cannot build http transport: {err}");
            return;
        }
    };
    transform_with_transport(root, config, transport).await;
}

/// `transform` with an injected transport (test seam and embedder hook).
pub async fn transform_with_transport(
    root: &mut Node,
    config: &LinkCardConfig,
    transport: Arc<dyn Transport>,
) {
    let targets = scan(root);
    if targets.is_empty() {
        return;
    }
    debug!("card"; "found {} eligible paragraph(s)", targets.len());

    let ctx = Arc::new(JobContext {
        cache: config.cache.then(|| {
            AssetCache::new(
                config.asset_dir(),
                config.image_reduction.clone(),
                transport.clone(),
            )
        }),
        config: config.clone(),
        transport,
    });

    // Fan out one job per target. Keys tie completion-ordered results back
    // to scan-ordered targets.
    let mut jobs = JoinSet::new();
    for (key, target) in targets.iter().enumerate() {
        let url = target.url.clone();
        let ctx = Arc::clone(&ctx);
        jobs.spawn(async move {
            let outcome = resolve_card(&url, &ctx).await;
            (key, outcome)
        });
    }

    // Collect every outcome, success or failure alike. A failed or panicked
    // job only forfeits its own replacement.
    let mut outcomes: Vec<Option<MetadataRecord>> = Vec::new();
    outcomes.resize_with(targets.len(), || None);
    while let Some(joined) = jobs.join_next().await {
        match joined {
            Ok((key, outcome)) => outcomes[key] = outcome,
            Err(err) => log!("error"; "link card job failed: {err}"),
        }
    }

    let mut next = 0;
    commit(root, &targets, &mut outcomes, &mut next);
}

/// Resolve one target URL into a render-ready record.
///
/// Returns `None` when the paragraph should keep its original form.
async fn resolve_card(target_url: &str, ctx: &JobContext) -> Option<MetadataRecord> {
    let parsed = match Url::parse(target_url) {
        Ok(parsed) => parsed,
        Err(err) => {
            log!("error"; "failed to parse url \"{target_url}\": {err}");
            return None;
        }
    };

    let mut record = metadata::fetch_metadata(
        target_url,
        &parsed,
        ctx.transport.as_ref(),
        ctx.config.shorten_url,
    )
    .await;

    // With caching on, both assets are materialized concurrently and the
    // record's remote sources are swapped for public cache paths. A failed
    // materialization empties the field, which omits that card element.
    if let Some(cache) = &ctx.cache {
        let favicon = cache.materialize(&record.favicon_src);
        let image = async {
            if record.image_src.is_empty() {
                None
            } else {
                cache.materialize(&record.image_src).await
            }
        };
        let (favicon, image) = tokio::join!(favicon, image);

        record.favicon_src = favicon
            .map(|filename| ctx.config.public_src(&filename))
            .unwrap_or_default();
        record.image_src = image
            .map(|filename| ctx.config.public_src(&filename))
            .unwrap_or_default();
    }

    Some(record)
}

/// Walk the tree in scan order and swap successful outcomes in place.
///
/// Each replacement touches exactly the node it targets, inside that node's
/// current parent. Snapshot mismatches consume their outcome slot but leave
/// the tree alone.
fn commit(
    node: &mut Node,
    targets: &[EligibleParagraph],
    outcomes: &mut [Option<MetadataRecord>],
    next: &mut usize,
) {
    for child in node.children.iter_mut() {
        if let Some(current) = eligible(child) {
            let slot = *next;
            *next += 1;

            let Some(target) = targets.get(slot) else {
                continue;
            };
            if current.snapshot != target.snapshot {
                debug!("card"; "target moved, skipping: {}", target.url);
                continue;
            }
            if let Some(record) = outcomes[slot].take() {
                *child = Node::new(LinkCard::new(record));
            }
        } else {
            commit(child, targets, outcomes, next);
        }
    }
}
