use crate::aspect::{AspectRatioResolver, ImageSource};
use crate::layout::fill_group;
use crate::options::CalculationOptions;
use crate::types::*;
use std::collections::HashMap;

/// Expand requests into one instance per physical copy.
///
/// Height is derived from the requested width and the logo's ratio. Logos
/// missing from `ratios` use `default_ratio`.
pub fn expand_requests(
    requests: &[SelectionRequest],
    ratios: &HashMap<String, f64>,
    default_ratio: f64,
) -> Vec<LogoInstance> {
    let mut instances = Vec::new();

    for (index, request) in requests.iter().enumerate() {
        let ratio = ratios
            .get(&request.logo.id)
            .copied()
            .unwrap_or(default_ratio);
        let height = request.width_in / ratio;

        for copy in 0..request.quantity {
            instances.push(LogoInstance {
                id: InstanceId {
                    request: index,
                    copy,
                },
                logo: request.logo.clone(),
                note: request.note.clone(),
                rotated: request.rotated,
                width_in: request.width_in,
                height_in: height,
            });
        }
    }

    instances
}

/// Bucket instances by note, in order of each note's first appearance
pub fn group_by_note(instances: Vec<LogoInstance>) -> Vec<(String, Vec<LogoInstance>)> {
    let mut groups: Vec<(String, Vec<LogoInstance>)> = Vec::new();

    for instance in instances {
        let key = instance.note.as_deref().unwrap_or("");
        match groups.iter_mut().find(|(note, _)| note == key) {
            Some((_, bucket)) => bucket.push(instance),
            None => groups.push((key.to_string(), vec![instance])),
        }
    }

    groups
}

/// Pack requests whose ratios are already known.
///
/// Sheets come out grouped by note, each group in generation order.
pub fn pack_requests(
    requests: &[SelectionRequest],
    ratios: &HashMap<String, f64>,
    options: &CalculationOptions,
) -> Vec<Sheet> {
    let instances = expand_requests(requests, ratios, options.default_aspect_ratio);
    let mut sheets = Vec::new();

    for (note, group) in group_by_note(instances) {
        let count = group.len();
        let group_sheets = fill_group(group, options.preferred_size, &options.packing);
        log::debug!(
            "Group {:?}: {} logos on {} sheets",
            note,
            count,
            group_sheets.len()
        );
        sheets.extend(group_sheets);
    }

    sheets
}

/// Resolve every logo's ratio, then pack.
///
/// Packing starts only once all ratios are known or have fallen back. The
/// fallback ratio and fetch timeout come from `options`.
pub async fn calculate_sheets<S: ImageSource>(
    requests: &[SelectionRequest],
    options: &CalculationOptions,
    resolver: &AspectRatioResolver<S>,
) -> Vec<Sheet> {
    if requests.is_empty() {
        return Vec::new();
    }

    let ratios = resolver
        .for_options(options)
        .resolve_all(requests.iter().map(|request| &request.logo))
        .await;

    let sheets = pack_requests(requests, &ratios, options);

    let placed: usize = sheets.iter().map(|s| s.placements.len()).sum();
    log::info!(
        "Packed {} logos from {} requests onto {} sheets",
        placed,
        requests.len(),
        sheets.len()
    );

    sheets
}
