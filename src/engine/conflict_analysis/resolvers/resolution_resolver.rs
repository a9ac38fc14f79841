use super::super::ConflictAnalysisContext;
use super::super::LearnedNogood;
use super::ConflictResolver;
use super::NoLearningResolver;
use crate::calabash_assert_simple;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::predicates::predicate::PredicateType;
use crate::engine::state::State;
use crate::engine::variables::DomainId;
use crate::propagators::nogoods::NogoodPropagator;

/// Derives a first-UIP nogood from the conflict by resolving the predicates assigned in the
/// current world against the reasons on the trail, then backjumps and installs the nogood in the
/// nogood propagator.
#[derive(Default, Debug, Clone, Copy)]
pub(crate) struct ResolutionResolver;

impl ConflictResolver for ResolutionResolver {
    fn resolve_conflict(&mut self, context: &mut ConflictAnalysisContext<'_>) -> bool {
        let current_world = context.state.current_world() as usize;
        calabash_assert_simple!(current_world > 0);

        let seed = context.state.conflict_conjunction(&context.conflict);

        let Some(nogood) = analyse(context.state, context.brancher, seed, current_world) else {
            // The conflict does not involve the current world (possible with temporarily posted
            // constraints); fall back to chronological refutation.
            return NoLearningResolver.resolve_conflict(context);
        };

        context.backtrack(nogood.backjump_world as u32);

        NogoodPropagator::install_learned_nogood(context.state, context.nogood_propagator, nogood)
    }
}

/// The first-UIP resolution: repeatedly replace the latest-assigned current-world predicate of
/// the working nogood by the reason of the trail entry that made it true, until a single
/// current-world predicate remains.
fn analyse(
    state: &mut State,
    brancher: &mut dyn crate::branching::Brancher,
    seed: Vec<Predicate>,
    current_world: usize,
) -> Option<LearnedNogood> {
    // Dates each explicit removal `[x != v]` by its trail index; bound-derived disequalities are
    // dated through the bound history instead.
    let removal_index: HashMap<(DomainId, i32), usize> = (0..state.domains.trail_len())
        .filter_map(|index| {
            let entry = state.domains.trail_entry(index);
            entry.predicate.is_not_equal_predicate().then(|| {
                (
                    (
                        entry.predicate.get_domain(),
                        entry.predicate.get_right_hand_side(),
                    ),
                    index,
                )
            })
        })
        .collect();

    let mut seen: HashSet<Predicate> = HashSet::default();
    // Predicates assigned before the current world, forming the tail of the learned nogood.
    let mut rest: Vec<Predicate> = Vec::new();
    let mut backjump_world = 0_usize;
    // Predicates assigned in the current world, with the trail index that made them true.
    let mut current: Vec<(usize, Predicate)> = Vec::new();

    let mut add = |state: &State,
                   predicate: Predicate,
                   rest: &mut Vec<Predicate>,
                   current: &mut Vec<(usize, Predicate)>,
                   backjump_world: &mut usize,
                   seen: &mut HashSet<Predicate>| {
        if !seen.insert(predicate) {
            return;
        }
        let Some(position) = position_of_truth(state, &removal_index, predicate) else {
            // True since the root bounds; carries no information.
            return;
        };
        let world = state.domains.trail.world_of_index(position);
        if world == 0 {
            // A root fact holds in every world of this search.
            return;
        }
        if world == current_world {
            current.push((position, predicate));
        } else {
            rest.push(predicate);
            *backjump_world = (*backjump_world).max(world);
        }
    };

    for predicate in seed {
        brancher.on_appearance_in_conflict_predicate(predicate);
        add(
            state,
            predicate,
            &mut rest,
            &mut current,
            &mut backjump_world,
            &mut seen,
        );
    }

    if current.is_empty() {
        return None;
    }

    // The index at which the current world's trail segment (and thus its decision) starts.
    let segment_start = state.domains.trail.segment_start_of(current_world);

    let mut reason_buffer: Vec<Predicate> = Vec::new();
    while current.len() > 1 {
        // Resolve the predicate assigned last.
        let latest = current
            .iter()
            .enumerate()
            .max_by_key(|(_, (position, _))| *position)
            .map(|(index, _)| index)
            .unwrap();
        let (position, _) = current.swap_remove(latest);
        let entry = state.domains.trail_entry(position);

        match entry.reason {
            Some(reason_ref) => {
                reason_buffer.clear();
                state.compute_reason(reason_ref, &mut reason_buffer);
                for &reason_predicate in &reason_buffer {
                    brancher.on_appearance_in_conflict_predicate(reason_predicate);
                    add(
                        state,
                        reason_predicate,
                        &mut rest,
                        &mut current,
                        &mut backjump_world,
                        &mut seen,
                    );
                }
            }
            None if position == segment_start => {
                // The entry is the decision of the current world. It is the earliest entry of the
                // world, so every remaining current-world predicate is dated at this same entry
                // and entailed by the decision; collapse them into it.
                debug_assert!(current.iter().all(|(other, _)| *other == position));
                current.clear();
                current.push((position, entry.predicate));
            }
            None => {
                // A reasonless entry that is not the decision: a refutation posted by an earlier
                // chronological step. It cannot be resolved, so give up on learning from this
                // conflict.
                return None;
            }
        }
    }

    let (_, asserting) = current[0];
    let mut predicates = vec![asserting];
    predicates.extend(rest);

    Some(LearnedNogood {
        predicates,
        backjump_world,
    })
}

/// The index of the trail entry that made `predicate` true, or [`None`] if it holds under the
/// initial domains. Only valid for currently-true predicates; truth is monotone along the live
/// trail.
fn position_of_truth(
    state: &State,
    removal_index: &HashMap<(DomainId, i32), usize>,
    predicate: Predicate,
) -> Option<usize> {
    debug_assert!(state.domains.is_predicate_satisfied(predicate));

    if satisfied_at(state, removal_index, predicate, 0) {
        return None;
    }

    let trail_len = state.domains.trail_len();
    for index in 0..trail_len {
        let entry = state.domains.trail_entry(index);
        if entry.predicate.get_domain() != predicate.get_domain() {
            continue;
        }
        if satisfied_at(state, removal_index, predicate, index + 1) {
            return Some(index);
        }
    }

    unreachable!("a satisfied non-initial predicate becomes true at some trail entry")
}

/// Whether `predicate` held just before the trail entry at `position` was applied.
fn satisfied_at(
    state: &State,
    removal_index: &HashMap<(DomainId, i32), usize>,
    predicate: Predicate,
    position: usize,
) -> bool {
    let domain = predicate.get_domain();
    let value = predicate.get_right_hand_side();
    let (lower_bound, upper_bound) = bounds_at(state, domain, position);

    match predicate.get_predicate_type() {
        PredicateType::LowerBound => lower_bound >= value,
        PredicateType::UpperBound => upper_bound <= value,
        PredicateType::Equal => lower_bound == value && upper_bound == value,
        PredicateType::NotEqual => {
            value < lower_bound
                || value > upper_bound
                || (state.domains.is_explicit_hole(domain, value)
                    && removal_index
                        .get(&(domain, value))
                        .map_or(true, |&removed_at| removed_at < position))
        }
    }
}

/// The bounds of `domain` just before the trail entry at `position`: the old bounds of the first
/// entry at or after `position` touching the domain, or the current bounds if there is none.
fn bounds_at(state: &State, domain: DomainId, position: usize) -> (i32, i32) {
    let trail_len = state.domains.trail_len();
    for index in position..trail_len {
        let entry = state.domains.trail_entry(index);
        if entry.predicate.get_domain() == domain {
            return (entry.old_lower_bound, entry.old_upper_bound);
        }
    }
    (
        state.domains.lower_bound(domain),
        state.domains.upper_bound(domain),
    )
}
