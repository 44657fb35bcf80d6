// Construction phase of the max-p heuristic: grow contiguous regions from
// random seeds until each meets the floor, then absorb leftover enclaves
// into neighboring regions.

use std::collections::VecDeque;
use rustc_hash::FxHashMap;
use tracing::debug;
use crate::graph::Graph;
use crate::objective::partition_ssd;
use crate::rng::HashRng;

// Constructions per start before the start is declared infeasible.
pub(crate) const MAX_ATTEMPTS: usize = 100;

/// A feasible partition produced by the construction phase, scored with the
/// construction-time objective.
pub(crate) struct GrownPartition {
    pub regions: Vec<Vec<usize>>,
    pub area_to_region: FxHashMap<usize, usize>,
    pub objective: f64,
}

/// Run construction attempts until one produces a feasible partition whose
/// objective beats `best_ss`, or the attempt limit runs out.
pub(crate) fn construct_solution(
    graph: &Graph,
    attributes: &[Vec<f64>],
    floor_variable: &[f64],
    floor: f64,
    best_ss: f64,
    rng: &mut HashRng,
    mut enclave_picks: Option<VecDeque<usize>>,
) -> Option<GrownPartition> {
    let mut attempts = 0;
    while attempts <= MAX_ATTEMPTS {
        if let Some((regions, area_to_region)) =
            grow_partition(graph, floor_variable, floor, rng, &mut enclave_picks)
        {
            let objective = partition_ssd(&regions, attributes);
            if objective < best_ss {
                return Some(GrownPartition { regions, area_to_region, objective });
            }
        }
        attempts += 1;
    }
    debug!(attempts = MAX_ATTEMPTS, "no feasible construction found");
    None
}

/// One construction attempt. Returns a full partition (every area covered)
/// or `None` when no region reached the floor or some enclave could not be
/// attached.
fn grow_partition(
    graph: &Graph,
    floor_variable: &[f64],
    floor: f64,
    rng: &mut HashRng,
    enclave_picks: &mut Option<VecDeque<usize>>,
) -> Option<(Vec<Vec<usize>>, FxHashMap<usize, usize>)> {
    let num_areas = graph.len();

    let mut queue: VecDeque<usize> = rng.permutation(num_areas).into();
    let mut is_candidate = vec![true; num_areas];

    let mut regions: Vec<Vec<usize>> = Vec::new();
    let mut enclaves: VecDeque<usize> = VecDeque::new();

    // Areas claimed during an earlier growth stay in the queue; skip them.
    while let Some(seed) = queue.pop_front() {
        if !is_candidate[seed] {
            continue;
        }
        is_candidate[seed] = false;

        let mut members = vec![seed];
        let mut frontier = vec![seed];
        let mut cv = floor_variable[seed];

        // Grow until the floor is met or the frontier dries up. Growth stops
        // the instant the floor is reached; refusing to keep absorbing areas
        // is what leaves room for more regions.
        'grow: while cv < floor {
            let Some(area) = frontier.pop() else { break };
            for nbr in graph.neighbors(area) {
                if is_candidate[nbr] {
                    is_candidate[nbr] = false;
                    members.push(nbr);
                    frontier.push(nbr);
                    cv += floor_variable[nbr];
                    if cv >= floor {
                        break 'grow;
                    }
                }
            }
        }

        if cv >= floor {
            regions.push(members);
        } else {
            enclaves.extend(members);
        }
    }

    if regions.is_empty() {
        return None;
    }

    let mut area_to_region =
        FxHashMap::with_capacity_and_hasher(num_areas, Default::default());
    for (region_id, region) in regions.iter().enumerate() {
        for &member in region {
            area_to_region.insert(member, region_id);
        }
    }

    assign_enclaves(graph, &mut regions, &mut area_to_region, &mut enclaves, rng, enclave_picks);

    if enclaves.is_empty() {
        Some((regions, area_to_region))
    } else {
        None
    }
}

/// Attach enclaves to randomly chosen neighboring regions. FIFO with
/// re-enqueue; stops after a full cycle without progress.
fn assign_enclaves(
    graph: &Graph,
    regions: &mut [Vec<usize>],
    area_to_region: &mut FxHashMap<usize, usize>,
    enclaves: &mut VecDeque<usize>,
    rng: &mut HashRng,
    enclave_picks: &mut Option<VecDeque<usize>>,
) {
    let mut enc_count = enclaves.len();
    let mut enc_attempts = 0;

    while enc_count > 0 && enc_attempts != enc_count {
        let enclave = enclaves.pop_front().unwrap();

        let mut adjacent_regions: Vec<usize> = Vec::new();
        for nbr in graph.neighbors(enclave) {
            // neighbors still waiting in the enclave queue have no region yet
            let Some(&region_id) = area_to_region.get(&nbr) else { continue };
            if !adjacent_regions.contains(&region_id) {
                adjacent_regions.push(region_id);
            }
        }

        if !adjacent_regions.is_empty() {
            let pick = match enclave_picks {
                Some(queue) => queue.pop_front().expect("enclave index queue exhausted"),
                None => rng.index_below(adjacent_regions.len()),
            };
            let region_id = adjacent_regions[pick];
            regions[region_id].push(enclave);
            area_to_region.insert(enclave, region_id);
            enc_count = enclaves.len();
            enc_attempts = 0;
        } else {
            enclaves.push_back(enclave);
            enc_attempts += 1;
        }
    }
}
