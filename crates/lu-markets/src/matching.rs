//! Deferred-acceptance matching over a dense utility matrix.
//!
//! Proposer-optimal Gale–Shapley.  Both sides rank the other by the same
//! symmetric utility, read from a row-major `proposers × receivers` matrix.
//! Pairs with non-positive utility are never proposed, so the result is a
//! partial matching: participants with no acceptable counterpart stay
//! unmatched.

/// Compute a stable one-to-one matching.
///
/// `utility` is row-major with `n_proposers` rows and `n_receivers`
/// columns.  Returns matched `(proposer, receiver)` index pairs in
/// ascending proposer order.
///
/// A receiver switches only for a strictly better proposer, so ties go to
/// the earlier proposal; combined with the deterministic proposal order
/// this keeps the result reproducible.
pub fn deferred_acceptance(
    n_proposers: usize,
    n_receivers: usize,
    utility: &[f64],
) -> Vec<(usize, usize)> {
    debug_assert_eq!(utility.len(), n_proposers * n_receivers);
    if n_proposers == 0 || n_receivers == 0 {
        return Vec::new();
    }
    let score = |p: usize, r: usize| utility[p * n_receivers + r];

    // Receiver indices per proposer, best first, acceptable only.
    let preferences: Vec<Vec<usize>> = (0..n_proposers)
        .map(|p| {
            let mut prefs: Vec<usize> =
                (0..n_receivers).filter(|&r| score(p, r) > 0.0).collect();
            prefs.sort_by(|&a, &b| {
                score(p, b)
                    .partial_cmp(&score(p, a))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            prefs
        })
        .collect();

    let mut next_proposal = vec![0usize; n_proposers];
    let mut engaged_to: Vec<Option<usize>> = vec![None; n_receivers];
    // LIFO order of the free list does not affect the outcome; proposer
    // optimality makes the result order-independent.
    let mut free: Vec<usize> = (0..n_proposers).rev().collect();

    while let Some(proposer) = free.pop() {
        let prefs = &preferences[proposer];
        let Some(&receiver) = prefs.get(next_proposal[proposer]) else {
            // Exhausted every acceptable receiver; stays unmatched.
            continue;
        };
        next_proposal[proposer] += 1;

        match engaged_to[receiver] {
            None => engaged_to[receiver] = Some(proposer),
            Some(current) => {
                if score(proposer, receiver) > score(current, receiver) {
                    engaged_to[receiver] = Some(proposer);
                    free.push(current);
                } else {
                    free.push(proposer);
                }
            }
        }
    }

    let mut matches: Vec<(usize, usize)> = engaged_to
        .iter()
        .enumerate()
        .filter_map(|(receiver, proposer)| proposer.map(|p| (p, receiver)))
        .collect();
    matches.sort();
    matches
}
