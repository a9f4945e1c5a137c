//! Session aggregate
//!
//! All operations validate first and mutate second: a rejected operation
//! returns an error and leaves the session exactly as it was.

use super::participant::{ConnectionStatus, Participant, ParticipantProfile, ParticipantRole};
use super::phase::SessionPhase;
use super::settings::{SessionSettings, SettingsUpdate};
use super::work_item::{WorkItem, WorkItemDraft};
use crate::core::error::SessionError;
use crate::core::ids::{ParticipantId, SessionId, WorkItemId};
use crate::intent::Intent;
use crate::vote::{Vote, VoteValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of [`Session::join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new participant entry was created
    Joined(ParticipantRole),
    /// An existing entry was refreshed and marked connected
    Rejoined,
}

/// What an applied intent changed, beyond "the session changed"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The last missing vote came in and the round was revealed automatically
    AutoRevealed,
    /// A participant was removed; their channels should be dropped
    ParticipantRemoved(ParticipantId),
}

/// The estimation session (Aggregate Root)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    name: String,
    moderator_id: ParticipantId,
    participants: Vec<Participant>,
    work_items: Vec<WorkItem>,
    active_work_item_id: Option<WorkItemId>,
    phase: SessionPhase,
    votes: BTreeMap<ParticipantId, Vote>,
    settings: SessionSettings,
}

impl Session {
    /// Create an empty session in the lobby, owned by `moderator_id`.
    ///
    /// The owner becomes a participant when they join.
    pub fn new(
        id: SessionId,
        name: impl Into<String>,
        moderator_id: ParticipantId,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            moderator_id,
            participants: Vec::new(),
            work_items: Vec::new(),
            active_work_item_id: None,
            phase: SessionPhase::Lobby,
            votes: BTreeMap::new(),
            settings,
        }
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn moderator_id(&self) -> &ParticipantId {
        &self.moderator_id
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn work_items(&self) -> &[WorkItem] {
        &self.work_items
    }

    pub fn work_item(&self, id: &WorkItemId) -> Option<&WorkItem> {
        self.work_items.iter().find(|w| &w.id == id)
    }

    pub fn active_work_item_id(&self) -> Option<&WorkItemId> {
        self.active_work_item_id.as_ref()
    }

    pub fn active_work_item(&self) -> Option<&WorkItem> {
        self.active_work_item_id
            .as_ref()
            .and_then(|id| self.work_item(id))
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn votes(&self) -> &BTreeMap<ParticipantId, Vote> {
        &self.votes
    }

    pub fn vote_values(&self) -> Vec<VoteValue> {
        self.votes.values().map(|v| v.value).collect()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Whether `id` may perform moderator-only operations: the session owner,
    /// or any participant holding the moderator role.
    pub fn is_moderator(&self, id: &ParticipantId) -> bool {
        self.participant(id)
            .is_some_and(|p| p.id == self.moderator_id || p.role == ParticipantRole::Moderator)
    }

    // ==================== Operations ====================

    /// Add a participant, or refresh an existing one with the same id.
    ///
    /// The first participant and the session owner join as moderator,
    /// everyone else as voter. Rejoining never changes the role.
    pub fn join(&mut self, profile: ParticipantProfile) -> Result<JoinOutcome, SessionError> {
        let display_name = profile.display_name.trim();
        if display_name.is_empty() {
            return Err(SessionError::malformed("display name cannot be empty"));
        }
        let display_name = display_name.to_string();

        if let Some(existing) = self.participants.iter_mut().find(|p| p.id == profile.id) {
            existing.display_name = display_name;
            existing.job_category = profile.job_category;
            if profile.avatar_url.is_some() {
                existing.avatar_url = profile.avatar_url;
            }
            existing.connection_status = ConnectionStatus::Connected;
            return Ok(JoinOutcome::Rejoined);
        }

        let role = if self.participants.is_empty() || profile.id == self.moderator_id {
            ParticipantRole::Moderator
        } else {
            ParticipantRole::Voter
        };
        let profile = ParticipantProfile {
            display_name,
            ..profile
        };
        self.participants
            .push(Participant::from_profile(profile, role));
        Ok(JoinOutcome::Joined(role))
    }

    /// Append a work item. Moderator only; does not change the active item.
    pub fn add_work_item(
        &mut self,
        actor: &ParticipantId,
        draft: WorkItemDraft,
    ) -> Result<WorkItemId, SessionError> {
        self.require_moderator(actor, "add_work_item")?;
        if draft.title.trim().is_empty() {
            return Err(SessionError::malformed("work item title cannot be empty"));
        }

        let id = self.next_work_item_id();
        self.work_items
            .push(WorkItem::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// Make `work_item_id` the item under estimation and start a fresh round.
    ///
    /// Always discards in-flight votes, even when re-activating the same item.
    pub fn set_active_work_item(
        &mut self,
        actor: &ParticipantId,
        work_item_id: &WorkItemId,
    ) -> Result<(), SessionError> {
        self.require_moderator(actor, "set_active_work_item")?;
        if self.work_item(work_item_id).is_none() {
            return Err(SessionError::not_found(format!(
                "work item {}",
                work_item_id
            )));
        }

        self.active_work_item_id = Some(work_item_id.clone());
        self.reset_round();
        Ok(())
    }

    /// Cast, replace or (with [`VoteValue::Empty`]) retract the actor's vote.
    ///
    /// Returns `true` when this vote completed the round and auto reveal
    /// moved the session to `revealing`.
    pub fn cast_vote(
        &mut self,
        actor: &ParticipantId,
        value: VoteValue,
        cast_at: u64,
    ) -> Result<bool, SessionError> {
        let participant = self
            .participant(actor)
            .ok_or_else(|| SessionError::authorization(format!("{} is not in this session", actor)))?;
        if !participant.role.can_vote() {
            return Err(SessionError::authorization("observers cannot vote"));
        }
        if self.phase != SessionPhase::Voting {
            return Err(SessionError::invalid_phase("cast_vote", self.phase));
        }

        let has_voted = !value.is_empty();
        if has_voted {
            self.votes
                .insert(actor.clone(), Vote::new(actor.clone(), value, cast_at));
        } else {
            self.votes.remove(actor);
        }
        if let Some(p) = self.participants.iter_mut().find(|p| &p.id == actor) {
            p.has_voted = has_voted;
        }

        Ok(has_voted && self.auto_reveal_if_complete())
    }

    /// Expose the round's votes. Moderator only, from `voting`.
    pub fn reveal_votes(&mut self, actor: &ParticipantId) -> Result<(), SessionError> {
        self.require_moderator(actor, "reveal_votes")?;
        if self.phase != SessionPhase::Voting {
            return Err(SessionError::invalid_phase("reveal_votes", self.phase));
        }
        self.phase = SessionPhase::Revealing;
        Ok(())
    }

    /// Move from `revealing` to `results`. Moderator only.
    pub fn show_results(&mut self, actor: &ParticipantId) -> Result<(), SessionError> {
        self.require_moderator(actor, "show_results")?;
        if self.phase != SessionPhase::Revealing {
            return Err(SessionError::invalid_phase("show_results", self.phase));
        }
        self.phase = SessionPhase::Results;
        Ok(())
    }

    /// Discard the round's votes and start voting again. Moderator only.
    ///
    /// Legal from `voting` (aborting the round), `revealing` and `results`.
    pub fn clear_votes(&mut self, actor: &ParticipantId) -> Result<(), SessionError> {
        self.require_moderator(actor, "clear_votes")?;
        if self.phase == SessionPhase::Lobby {
            return Err(SessionError::invalid_phase("clear_votes", self.phase));
        }
        self.reset_round();
        Ok(())
    }

    /// Record (or with [`VoteValue::Empty`] clear) the agreed estimate of a
    /// work item. Moderator only; the phase is left alone.
    pub fn set_agreed_estimate(
        &mut self,
        actor: &ParticipantId,
        work_item_id: &WorkItemId,
        estimate: VoteValue,
    ) -> Result<(), SessionError> {
        self.require_moderator(actor, "set_agreed_estimate")?;
        let item = self
            .work_items
            .iter_mut()
            .find(|w| &w.id == work_item_id)
            .ok_or_else(|| SessionError::not_found(format!("work item {}", work_item_id)))?;
        item.agreed_estimate = estimate;
        Ok(())
    }

    /// Remove a participant and their vote. Moderator only.
    ///
    /// If the removed participant was the last one still to vote, auto
    /// reveal applies.
    pub fn remove_participant(
        &mut self,
        actor: &ParticipantId,
        target: &ParticipantId,
    ) -> Result<(), SessionError> {
        self.require_moderator(actor, "kick_participant")?;
        let index = self
            .participants
            .iter()
            .position(|p| &p.id == target)
            .ok_or_else(|| SessionError::not_found(format!("participant {}", target)))?;

        self.participants.remove(index);
        self.votes.remove(target);
        self.auto_reveal_if_complete();
        Ok(())
    }

    /// Change the card deck and/or auto reveal. Moderator only.
    pub fn update_settings(
        &mut self,
        actor: &ParticipantId,
        update: SettingsUpdate,
    ) -> Result<(), SessionError> {
        self.require_moderator(actor, "update_settings")?;
        if let Some(deck) = &update.card_deck {
            if deck.is_empty() {
                return Err(SessionError::malformed("card deck cannot be empty"));
            }
            for card in deck {
                match card.parse::<VoteValue>() {
                    Ok(value) if !value.is_empty() => {}
                    _ => {
                        return Err(SessionError::malformed(format!(
                            "invalid card label: {:?}",
                            card
                        )));
                    }
                }
            }
        }

        if let Some(deck) = update.card_deck {
            self.settings.card_deck = deck;
        }
        if let Some(auto_reveal) = update.auto_reveal {
            self.settings.auto_reveal = auto_reveal;
        }
        Ok(())
    }

    /// Mark a participant disconnected, keeping their entry and vote.
    ///
    /// Disconnected voters are no longer waited for, so this may complete
    /// the round under auto reveal. Returns `false` if the participant is
    /// unknown or already disconnected.
    pub fn mark_disconnected(&mut self, id: &ParticipantId) -> bool {
        match self.participants.iter_mut().find(|p| &p.id == id) {
            Some(p) if p.connection_status != ConnectionStatus::Disconnected => {
                p.connection_status = ConnectionStatus::Disconnected;
            }
            _ => return false,
        }
        self.auto_reveal_if_complete();
        true
    }

    /// Apply a client intent on behalf of `actor`.
    pub fn apply(
        &mut self,
        actor: &ParticipantId,
        intent: Intent,
        now: u64,
    ) -> Result<Applied, SessionError> {
        let applied = match intent {
            Intent::Join(request) => {
                self.join(request.into_profile(actor.clone()))?;
                Applied::Updated
            }
            Intent::CastVote { value } => {
                if self.cast_vote(actor, value, now)? {
                    Applied::AutoRevealed
                } else {
                    Applied::Updated
                }
            }
            Intent::RevealVotes => {
                self.reveal_votes(actor)?;
                Applied::Updated
            }
            Intent::ShowResults => {
                self.show_results(actor)?;
                Applied::Updated
            }
            Intent::ClearVotes => {
                self.clear_votes(actor)?;
                Applied::Updated
            }
            Intent::AddWorkItem(draft) => {
                self.add_work_item(actor, draft)?;
                Applied::Updated
            }
            Intent::SetActiveWorkItem { work_item_id } => {
                self.set_active_work_item(actor, &work_item_id)?;
                Applied::Updated
            }
            Intent::SetAgreedEstimate {
                work_item_id,
                estimate,
            } => {
                self.set_agreed_estimate(actor, &work_item_id, estimate)?;
                Applied::Updated
            }
            Intent::KickParticipant { participant_id } => {
                self.remove_participant(actor, &participant_id)?;
                Applied::ParticipantRemoved(participant_id)
            }
            Intent::UpdateSettings(update) => {
                self.update_settings(actor, update)?;
                Applied::Updated
            }
            Intent::Leave => {
                if self.participant(actor).is_none() {
                    return Err(SessionError::not_found(format!("participant {}", actor)));
                }
                self.mark_disconnected(actor);
                Applied::Updated
            }
        };

        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
        Ok(applied)
    }

    /// Copy of this session with every vote value hidden.
    pub fn with_concealed_votes(&self) -> Session {
        let mut copy = self.clone();
        for vote in copy.votes.values_mut() {
            *vote = vote.concealed();
        }
        copy
    }

    /// Verify the aggregate's structural invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        if let Some(orphan) = self
            .votes
            .keys()
            .find(|id| self.participant(id).is_none())
        {
            return Err(format!("vote from non-participant {}", orphan));
        }
        if self.phase == SessionPhase::Lobby && !self.votes.is_empty() {
            return Err("votes present in lobby".to_string());
        }
        if let Some(p) = self
            .participants
            .iter()
            .find(|p| p.has_voted != self.votes.contains_key(&p.id))
        {
            return Err(format!("hasVoted out of sync for {}", p.id));
        }
        Ok(())
    }

    // ==================== Internals ====================

    fn require_moderator(&self, actor: &ParticipantId, operation: &str) -> Result<(), SessionError> {
        if self.is_moderator(actor) {
            Ok(())
        } else {
            Err(SessionError::authorization(format!(
                "{} requires the moderator role",
                operation
            )))
        }
    }

    fn reset_round(&mut self) {
        self.votes.clear();
        for p in &mut self.participants {
            p.has_voted = false;
        }
        self.phase = SessionPhase::Voting;
    }

    /// Move to `revealing` when auto reveal is on and every connected voter
    /// has voted. A round with no votes at all is never revealed this way.
    fn auto_reveal_if_complete(&mut self) -> bool {
        if self.settings.auto_reveal
            && self.phase == SessionPhase::Voting
            && !self.votes.is_empty()
            && self.all_connected_voters_voted()
        {
            self.phase = SessionPhase::Revealing;
            return true;
        }
        false
    }

    fn all_connected_voters_voted(&self) -> bool {
        self.participants
            .iter()
            .filter(|p| p.role.can_vote() && p.is_connected())
            .all(|p| p.has_voted)
    }

    fn next_work_item_id(&self) -> WorkItemId {
        let mut n = self.work_items.len() + 1;
        loop {
            let id = WorkItemId::new(format!("wi-{}", n));
            if self.work_item(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }
}
