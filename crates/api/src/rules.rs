// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Business rules for the voting and team-formation workflows.
//!
//! Handlers load the current state inside a transaction and let these
//! functions decide; the functions themselves never touch the database,
//! which keeps every rule testable in isolation.

use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{GameCategory, JoinRequestStatus, UserRole};

/// Participants may endorse at most this many PC games. Console and
/// board games are not capped.
pub const PC_VOTE_QUOTA: i64 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Voting is currently disabled")]
    VotingDisabled,
    #[error("You can vote for at most {PC_VOTE_QUOTA} PC games")]
    QuotaExceeded,
    #[error("This team is already complete")]
    TeamComplete,
    #[error("You are already a member of this team")]
    AlreadyMember,
    #[error("You already have a pending request for this team")]
    DuplicatePending,
    #[error("You already have a team for this game")]
    AlreadyCaptain,
    #[error("Only the team captain may do this")]
    Forbidden,
    #[error("Request not found or already decided")]
    NotFound,
    #[error("You are already registered for this game")]
    AlreadyRegistered,
    #[error("This game is not open for registration")]
    GameInactive,
    #[error("A team registration needs a team name")]
    TeamNameRequired,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, juniper::GraphQLEnum)]
pub enum VoteOutcome {
    Cast,
    Retracted,
}

/// The `voting_enabled` setting is deliberately fail-open: an event that
/// never created the row should not lock everyone out of voting.
pub fn voting_open(setting: Option<&str>) -> bool {
    match setting {
        Some(value) => value != "false",
        None => true,
    }
}

/// Decide a vote toggle. Retracting an existing vote is always allowed
/// while voting is open; casting a new PC vote is subject to the quota.
pub fn decide_vote(
    voting_enabled: bool,
    already_voted: bool,
    category: GameCategory,
    pc_votes: i64,
) -> Result<VoteOutcome, RuleViolation> {
    if !voting_enabled {
        return Err(RuleViolation::VotingDisabled);
    }
    if already_voted {
        return Ok(VoteOutcome::Retracted);
    }
    if category == GameCategory::Pc && pc_votes >= PC_VOTE_QUOTA {
        return Err(RuleViolation::QuotaExceeded);
    }
    Ok(VoteOutcome::Cast)
}

/// A team is complete once it has as many members as the game allows.
/// This is the single completeness rule; every game uses its
/// `max_team_size`, with no per-title exceptions.
pub fn team_is_complete(member_count: i64, max_team_size: i32) -> bool {
    member_count >= max_team_size as i64
}

/// Guards for a participant asking to join a team. `has_pending` must
/// only consider requests still in `Pending`; a rejected request never
/// blocks asking again.
pub fn check_join_request(
    member_count: i64,
    max_team_size: i32,
    is_member: bool,
    has_pending: bool,
) -> Result<(), RuleViolation> {
    if is_member {
        return Err(RuleViolation::AlreadyMember);
    }
    if team_is_complete(member_count, max_team_size) {
        return Err(RuleViolation::TeamComplete);
    }
    if has_pending {
        return Err(RuleViolation::DuplicatePending);
    }
    Ok(())
}

pub fn check_captain(captain_id: Uuid, actor_id: Uuid) -> Result<(), RuleViolation> {
    if captain_id == actor_id {
        Ok(())
    } else {
        Err(RuleViolation::Forbidden)
    }
}

/// Guards for a captain approving a request. Approving anything that is
/// no longer pending fails with `NotFound` so a double approval can
/// never insert a second membership row.
pub fn check_approval(
    captain_id: Uuid,
    actor_id: Uuid,
    status: JoinRequestStatus,
    member_count: i64,
    max_team_size: i32,
) -> Result<(), RuleViolation> {
    check_captain(captain_id, actor_id)?;
    if status != JoinRequestStatus::Pending {
        return Err(RuleViolation::NotFound);
    }
    if team_is_complete(member_count, max_team_size) {
        return Err(RuleViolation::TeamComplete);
    }
    Ok(())
}

pub fn check_rejection(
    captain_id: Uuid,
    actor_id: Uuid,
    status: JoinRequestStatus,
) -> Result<(), RuleViolation> {
    check_captain(captain_id, actor_id)?;
    if status != JoinRequestStatus::Pending {
        return Err(RuleViolation::NotFound);
    }
    Ok(())
}

/// Email addresses are visible to their owner and to event staff
/// (moderators and up). One threshold for accounts and participant
/// profiles alike.
pub fn may_view_email(is_self: bool, viewer_role: Option<UserRole>) -> bool {
    is_self || viewer_role.is_some_and(|role| role >= UserRole::Moderator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> Uuid {
        Uuid::now_v7()
    }

    #[test]
    fn voting_defaults_open_when_setting_absent() {
        assert!(voting_open(None));
        assert!(voting_open(Some("true")));
        assert!(!voting_open(Some("false")));
    }

    #[test]
    fn disabled_voting_rejects_every_toggle() {
        for (voted, category, pc_votes) in [
            (false, GameCategory::Pc, 0),
            (true, GameCategory::Pc, 3),
            (false, GameCategory::Board, 0),
        ] {
            assert_eq!(
                decide_vote(false, voted, category, pc_votes),
                Err(RuleViolation::VotingDisabled)
            );
        }
    }

    #[test]
    fn pc_quota_caps_at_three() {
        assert_eq!(
            decide_vote(true, false, GameCategory::Pc, 2),
            Ok(VoteOutcome::Cast)
        );
        assert_eq!(
            decide_vote(true, false, GameCategory::Pc, 3),
            Err(RuleViolation::QuotaExceeded)
        );
    }

    #[test]
    fn quota_does_not_apply_to_console_or_board() {
        assert_eq!(
            decide_vote(true, false, GameCategory::Console, 3),
            Ok(VoteOutcome::Cast)
        );
        assert_eq!(
            decide_vote(true, false, GameCategory::Board, 17),
            Ok(VoteOutcome::Cast)
        );
    }

    #[test]
    fn retract_allowed_even_at_quota() {
        assert_eq!(
            decide_vote(true, true, GameCategory::Pc, 3),
            Ok(VoteOutcome::Retracted)
        );
    }

    #[test]
    fn toggle_twice_restores_counter() {
        // Counter math lives in SQL, but the decision sequence must be
        // cast-then-retract for any fresh (participant, game) pair.
        let first = decide_vote(true, false, GameCategory::Pc, 0).unwrap();
        assert_eq!(first, VoteOutcome::Cast);
        let second = decide_vote(true, true, GameCategory::Pc, 1).unwrap();
        assert_eq!(second, VoteOutcome::Retracted);
    }

    #[test]
    fn completeness_uses_max_team_size() {
        // Two of five is not a complete team, regardless of the game's
        // minimum size.
        assert!(!team_is_complete(2, 5));
        assert!(!team_is_complete(4, 5));
        assert!(team_is_complete(5, 5));
        assert!(team_is_complete(1, 1));
    }

    #[test]
    fn join_guards() {
        assert_eq!(check_join_request(2, 5, false, false), Ok(()));
        assert_eq!(
            check_join_request(5, 5, false, false),
            Err(RuleViolation::TeamComplete)
        );
        assert_eq!(
            check_join_request(2, 5, true, false),
            Err(RuleViolation::AlreadyMember)
        );
        assert_eq!(
            check_join_request(2, 5, false, true),
            Err(RuleViolation::DuplicatePending)
        );
    }

    #[test]
    fn rejected_request_does_not_block_reasking() {
        // A rejection leaves the row behind with status Rejected; only
        // pending rows count towards the duplicate guard.
        assert_eq!(check_join_request(2, 5, false, false), Ok(()));
    }

    #[test]
    fn only_captain_may_decide() {
        let captain = uid();
        let stranger = uid();
        assert_eq!(check_captain(captain, captain), Ok(()));
        assert_eq!(check_captain(captain, stranger), Err(RuleViolation::Forbidden));
        assert_eq!(
            check_approval(captain, stranger, JoinRequestStatus::Pending, 1, 5),
            Err(RuleViolation::Forbidden)
        );
        assert_eq!(
            check_rejection(captain, stranger, JoinRequestStatus::Pending),
            Err(RuleViolation::Forbidden)
        );
    }

    #[test]
    fn approving_a_full_team_fails() {
        let captain = uid();
        assert_eq!(
            check_approval(captain, captain, JoinRequestStatus::Pending, 5, 5),
            Err(RuleViolation::TeamComplete)
        );
    }

    #[test]
    fn approval_is_idempotent_safe() {
        let captain = uid();
        assert_eq!(
            check_approval(captain, captain, JoinRequestStatus::Approved, 1, 5),
            Err(RuleViolation::NotFound)
        );
        assert_eq!(
            check_rejection(captain, captain, JoinRequestStatus::Rejected),
            Err(RuleViolation::NotFound)
        );
    }

    #[test]
    fn back_to_back_approvals_stop_at_capacity() {
        // Approvals for the same team decide against serialized counts
        // (the team row is locked while deciding), so the second of two
        // approvals at four-of-five sees five members and is refused.
        let captain = uid();
        assert_eq!(
            check_approval(captain, captain, JoinRequestStatus::Pending, 4, 5),
            Ok(())
        );
        assert_eq!(
            check_approval(captain, captain, JoinRequestStatus::Pending, 5, 5),
            Err(RuleViolation::TeamComplete)
        );
    }

    #[test]
    fn email_visible_to_owner_and_staff_only() {
        assert!(may_view_email(true, None));
        assert!(may_view_email(false, Some(UserRole::Moderator)));
        assert!(may_view_email(false, Some(UserRole::Admin)));
        assert!(!may_view_email(false, Some(UserRole::Participant)));
        assert!(!may_view_email(false, None));
    }

    #[test]
    fn approval_below_capacity_succeeds() {
        let captain = uid();
        assert_eq!(
            check_approval(captain, captain, JoinRequestStatus::Pending, 2, 5),
            Ok(())
        );
    }
}
