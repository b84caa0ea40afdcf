//! Vote tallying
//!
//! [`tally`] is a pure function of a decision's votes, the collaboration's
//! voting rules and its participant list. Evaluation order is fixed:
//!
//! 1. Quorum gate: fewer voters than `quorum` of the active participants
//!    leaves the decision pending, whatever the votes say.
//! 2. Veto rights: a `reject` from any curator listed in `veto_rights`
//!    rejects, under every mechanism.
//! 3. The configured [`VotingMechanism`].
//!
//! Ties never resolve; they stay pending.

use eden_types::{CuratorId, Outcome, Participant, Vote, VoteChoice, VotingMechanism, VotingRules};
use serde::{Deserialize, Serialize};

/// Compute the outcome of a set of votes
pub fn tally(votes: &[Vote], rules: &VotingRules, participants: &[Participant]) -> Outcome {
    let active = participants.iter().filter(|p| p.active).count();
    if !quorum_met(votes.len(), active, rules.quorum) {
        return Outcome::Pending;
    }

    if !rules.veto_rights.is_empty()
        && votes
            .iter()
            .any(|v| v.vote == VoteChoice::Reject && rules.veto_rights.contains(&v.curator_id))
    {
        return Outcome::Rejected;
    }

    match rules.mechanism {
        // Both reduce to: one reject sinks the work, otherwise one accept carries it.
        VotingMechanism::Unanimous | VotingMechanism::Veto => reject_dominates(votes),
        VotingMechanism::Majority => majority(votes),
        VotingMechanism::Weighted => weighted(votes, rules),
    }
}

/// Whether `voted / active >= quorum`.
///
/// Follows float division: with no active participants, any vote meets
/// quorum (`n / 0 = inf`) and no votes never does (`0 / 0 = NaN`).
pub fn quorum_met(voted: usize, active: usize, quorum: f64) -> bool {
    voted as f64 / active as f64 >= quorum
}

fn reject_dominates(votes: &[Vote]) -> Outcome {
    if votes.iter().any(|v| v.vote == VoteChoice::Reject) {
        Outcome::Rejected
    } else if votes.iter().any(|v| v.vote == VoteChoice::Accept) {
        Outcome::Accepted
    } else {
        Outcome::Pending
    }
}

fn majority(votes: &[Vote]) -> Outcome {
    let counts = VoteCounts::from_votes(votes);
    compare(counts.accept as f64, counts.reject as f64)
}

fn weighted(votes: &[Vote], rules: &VotingRules) -> Outcome {
    // No weight map at all means no weighted outcome, not equal weights.
    let Some(weights) = rules.weightings.as_ref() else {
        return Outcome::Pending;
    };

    let weight = |curator: &CuratorId| weights.get(curator).copied().unwrap_or(1.0);
    let (accept, reject) = votes.iter().fold((0.0, 0.0), |(a, r), v| match v.vote {
        VoteChoice::Accept => (a + weight(&v.curator_id), r),
        VoteChoice::Reject => (a, r + weight(&v.curator_id)),
        VoteChoice::Abstain => (a, r),
    });
    compare(accept, reject)
}

fn compare(accept: f64, reject: f64) -> Outcome {
    if accept > reject {
        Outcome::Accepted
    } else if reject > accept {
        Outcome::Rejected
    } else {
        Outcome::Pending
    }
}

/// Per-choice vote counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub accept: usize,
    pub reject: usize,
    pub abstain: usize,
}

impl VoteCounts {
    pub fn from_votes(votes: &[Vote]) -> Self {
        votes.iter().fold(Self::default(), |mut counts, v| {
            match v.vote {
                VoteChoice::Accept => counts.accept += 1,
                VoteChoice::Reject => counts.reject += 1,
                VoteChoice::Abstain => counts.abstain += 1,
            }
            counts
        })
    }
}

/// Participation overview for one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    /// Active participants
    pub total_participants: usize,
    pub voted: usize,
    /// Active participants without a vote
    pub not_voted: Vec<CuratorId>,
    pub votes: VoteCounts,
    pub quorum_met: bool,
}

/// Summarize participation in a decision
pub fn summarize(votes: &[Vote], rules: &VotingRules, participants: &[Participant]) -> VoteSummary {
    let active: Vec<&Participant> = participants.iter().filter(|p| p.active).collect();
    let not_voted = active
        .iter()
        .filter(|p| !votes.iter().any(|v| v.curator_id == p.curator_id))
        .map(|p| p.curator_id.clone())
        .collect();

    VoteSummary {
        total_participants: active.len(),
        voted: votes.len(),
        not_voted,
        votes: VoteCounts::from_votes(votes),
        quorum_met: quorum_met(votes.len(), active.len(), rules.quorum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn participants(ids: &[&str]) -> Vec<Participant> {
        ids.iter()
            .map(|id| Participant {
                curator_id: CuratorId::new(*id),
                name: id.to_uppercase(),
                active: true,
            })
            .collect()
    }

    fn vote(curator: &str, choice: VoteChoice) -> Vote {
        Vote::new(CuratorId::new(curator), choice)
    }

    fn trio() -> Vec<Participant> {
        participants(&["a", "b", "c"])
    }

    #[test]
    fn test_majority_two_of_three_accepts() {
        let rules = VotingRules::new(VotingMechanism::Majority, 0.6);
        let votes = vec![vote("a", VoteChoice::Accept), vote("b", VoteChoice::Accept)];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Accepted);
    }

    #[test]
    fn test_unanimous_single_reject_rejects() {
        let rules = VotingRules::new(VotingMechanism::Unanimous, 0.6);
        let votes = vec![vote("a", VoteChoice::Accept), vote("b", VoteChoice::Reject)];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Rejected);
    }

    #[test]
    fn test_weighted_without_map_stays_pending() {
        let rules = VotingRules::new(VotingMechanism::Weighted, 1.0);
        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Accept),
            vote("c", VoteChoice::Accept),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
    }

    #[test]
    fn test_weighted_map_defaults_missing_voters_to_one() {
        let mut weights = BTreeMap::new();
        weights.insert(CuratorId::new("a"), 3.0);
        let rules = VotingRules::new(VotingMechanism::Weighted, 0.5).with_weightings(weights);

        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Reject),
            vote("c", VoteChoice::Reject),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Accepted);

        let empty = VotingRules::new(VotingMechanism::Weighted, 0.5).with_weightings(BTreeMap::new());
        assert_eq!(tally(&votes, &empty, &trio()), Outcome::Rejected);
    }

    #[test]
    fn test_weighted_tie_is_pending() {
        let mut weights = BTreeMap::new();
        weights.insert(CuratorId::new("a"), 2.0);
        let rules = VotingRules::new(VotingMechanism::Weighted, 0.5).with_weightings(weights);
        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Reject),
            vote("c", VoteChoice::Reject),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
    }

    #[test]
    fn test_quorum_gate_precedes_everything() {
        let rules = VotingRules::new(VotingMechanism::Veto, 0.6)
            .with_veto_rights(vec![CuratorId::new("a")]);
        let votes = vec![vote("a", VoteChoice::Reject)];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
    }

    #[test]
    fn test_veto_rights_override_majority() {
        let rules = VotingRules::new(VotingMechanism::Majority, 0.5)
            .with_veto_rights(vec![CuratorId::new("c")]);
        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Accept),
            vote("c", VoteChoice::Reject),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Rejected);
    }

    #[test]
    fn test_reject_from_non_veto_holder_does_not_veto() {
        let rules = VotingRules::new(VotingMechanism::Majority, 0.5)
            .with_veto_rights(vec![CuratorId::new("c")]);
        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Reject),
            vote("c", VoteChoice::Accept),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Accepted);
    }

    #[test]
    fn test_unanimous_all_abstain_is_pending() {
        let rules = VotingRules::new(VotingMechanism::Unanimous, 0.5);
        let votes = vec![vote("a", VoteChoice::Abstain), vote("b", VoteChoice::Abstain)];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);

        let votes = vec![vote("a", VoteChoice::Abstain), vote("b", VoteChoice::Accept)];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Accepted);
    }

    #[test]
    fn test_majority_ignores_abstains_and_ties_pend() {
        let rules = VotingRules::new(VotingMechanism::Majority, 0.5);
        let votes = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Reject),
            vote("c", VoteChoice::Abstain),
        ];
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
    }

    #[test]
    fn test_veto_mechanism() {
        let rules = VotingRules::new(VotingMechanism::Veto, 0.5);
        let accepting = vec![vote("a", VoteChoice::Accept), vote("b", VoteChoice::Abstain)];
        assert_eq!(tally(&accepting, &rules, &trio()), Outcome::Accepted);

        let rejecting = vec![
            vote("a", VoteChoice::Accept),
            vote("b", VoteChoice::Accept),
            vote("c", VoteChoice::Reject),
        ];
        assert_eq!(tally(&rejecting, &rules, &trio()), Outcome::Rejected);
    }

    #[test]
    fn test_inactive_participants_shrink_quorum_denominator() {
        let mut people = trio();
        people[2].active = false;
        let rules = VotingRules::new(VotingMechanism::Majority, 0.6);
        let votes = vec![vote("a", VoteChoice::Accept)];
        // 1/3 misses quorum, 1/2 does not
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
        assert_eq!(tally(&votes, &rules, &people), Outcome::Pending);

        let rules = VotingRules::new(VotingMechanism::Majority, 0.5);
        assert_eq!(tally(&votes, &rules, &trio()), Outcome::Pending);
        assert_eq!(tally(&votes, &rules, &people), Outcome::Accepted);
    }

    #[test]
    fn test_quorum_with_no_active_participants() {
        assert!(!quorum_met(0, 0, 0.5));
        assert!(quorum_met(1, 0, 0.5));
        assert!(quorum_met(0, 3, 0.0));
    }

    #[test]
    fn test_summary_lists_missing_voters() {
        let mut people = trio();
        people[1].active = false;
        let rules = VotingRules::new(VotingMechanism::Majority, 0.5);
        let votes = vec![vote("a", VoteChoice::Reject)];

        let summary = summarize(&votes, &rules, &people);
        assert_eq!(summary.total_participants, 2);
        assert_eq!(summary.voted, 1);
        assert_eq!(summary.not_voted, vec![CuratorId::new("c")]);
        assert_eq!(summary.votes.reject, 1);
        assert!(summary.quorum_met);
    }

    fn choice_strategy() -> impl Strategy<Value = VoteChoice> {
        prop_oneof![
            Just(VoteChoice::Accept),
            Just(VoteChoice::Reject),
            Just(VoteChoice::Abstain),
        ]
    }

    fn mechanism_strategy() -> impl Strategy<Value = VotingMechanism> {
        prop_oneof![
            Just(VotingMechanism::Unanimous),
            Just(VotingMechanism::Majority),
            Just(VotingMechanism::Weighted),
            Just(VotingMechanism::Veto),
        ]
    }

    const POOL: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    fn ballots(choices: &[VoteChoice]) -> Vec<Vote> {
        choices
            .iter()
            .zip(POOL.iter())
            .map(|(choice, id)| vote(id, *choice))
            .collect()
    }

    proptest! {
        #[test]
        fn property_tally_is_pure(
            choices in proptest::collection::vec(choice_strategy(), 0..6),
            mechanism in mechanism_strategy(),
            quorum in 0.0f64..=1.0,
        ) {
            let votes = ballots(&choices);
            let rules = VotingRules::new(mechanism, quorum);
            let people = participants(&POOL);
            prop_assert_eq!(tally(&votes, &rules, &people), tally(&votes, &rules, &people));
        }

        #[test]
        fn property_below_quorum_is_pending(
            choices in proptest::collection::vec(choice_strategy(), 0..6),
            mechanism in mechanism_strategy(),
        ) {
            let votes = ballots(&choices);
            let people = participants(&POOL);
            // strictly above the achieved ratio
            let quorum = (votes.len() as f64 + 0.5) / people.len() as f64;
            let rules = VotingRules::new(mechanism, quorum)
                .with_veto_rights(vec![CuratorId::new("a")]);
            prop_assert_eq!(tally(&votes, &rules, &people), Outcome::Pending);
        }

        #[test]
        fn property_veto_holder_reject_always_rejects(
            rest in proptest::collection::vec(choice_strategy(), 0..5),
            mechanism in mechanism_strategy(),
        ) {
            let mut choices = vec![VoteChoice::Reject];
            choices.extend(rest);
            let votes = ballots(&choices);
            let rules = VotingRules::new(mechanism, 0.0)
                .with_veto_rights(vec![CuratorId::new("a")]);
            prop_assert_eq!(tally(&votes, &rules, &participants(&POOL)), Outcome::Rejected);
        }

        #[test]
        fn property_weighted_without_map_is_pending(
            choices in proptest::collection::vec(choice_strategy(), 0..6),
        ) {
            let votes = ballots(&choices);
            let rules = VotingRules::new(VotingMechanism::Weighted, 0.0);
            prop_assert_eq!(tally(&votes, &rules, &participants(&POOL)), Outcome::Pending);
        }

        #[test]
        fn property_majority_follows_counts(
            choices in proptest::collection::vec(choice_strategy(), 0..6),
        ) {
            let votes = ballots(&choices);
            let rules = VotingRules::new(VotingMechanism::Majority, 0.0);
            let counts = VoteCounts::from_votes(&votes);
            let expected = match counts.accept.cmp(&counts.reject) {
                std::cmp::Ordering::Greater => Outcome::Accepted,
                std::cmp::Ordering::Less => Outcome::Rejected,
                std::cmp::Ordering::Equal => Outcome::Pending,
            };
            prop_assert_eq!(tally(&votes, &rules, &participants(&POOL)), expected);
        }
    }
}
