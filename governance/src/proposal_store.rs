//! The proposal store: proposals and votes persisted as JSON collections in a
//! [`KvStore`].
//!
//! Two error policies coexist. Operations that report a user-facing decision
//! (`try_submit_proposal`, `cast_vote`, `delete_proposal`, `update_proposal`)
//! return `Result`. Everything else logs faults and hands back a benign value
//! (`false`, empty, zero), so a broken medium never takes the caller down.
//!
//! Each mutating operation holds `op_lock` for its full read-modify-write
//! cycle. Reads go straight to the medium.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use econexus_store::json::encoded_len;
use econexus_store::{keys, JsonStoreExt, KvStore, RemoteProposalSource, StoreError};
use econexus_types::{
    Clock, Proposal, ProposalId, VoteChoice, VotingRecord, VotingState, WalletAddress,
};
use tracing::{debug, error, info, warn};

use crate::budget::{self, ActivityKind, HistoryEntry, StorageReport, StorageUsage, VoteLogEntry};
use crate::error::{GovernanceError, Mutation};
use crate::favorites::FavoritesManager;
use crate::impact::ImpactMetrics;
use crate::limits::{check_submission, CreatorUsage, UserProposalLimits};
use crate::params::StoreParams;
use crate::proposal::{NewProposal, ProposalUpdate};
use crate::query::{DaoStats, ProposalFilter, ProposalTally};
use crate::retention::{sweep_expired, CleanupReport};

/// Block-confirmation round recorded for locally stored votes.
const LOCAL_CONFIRMED_ROUND: u64 = 1;

pub struct ProposalStore {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    params: StoreParams,
    remote: Option<Arc<dyn RemoteProposalSource>>,
    op_lock: Mutex<()>,
}

impl ProposalStore {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>, params: StoreParams) -> Self {
        Self {
            kv,
            clock,
            params,
            remote: None,
            op_lock: Mutex::new(()),
        }
    }

    /// Consult `remote` when the local collection has nothing to offer.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteProposalSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Construct and verify the persisted proposal collection decodes.
    pub fn open(
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        params: StoreParams,
    ) -> Result<Self, GovernanceError> {
        let store = Self::new(kv, clock, params);
        let proposals = store.load_proposals()?;
        info!(
            proposals = proposals.len(),
            max_per_user = store.params.rate_limits.max_per_user,
            max_per_day = store.params.rate_limits.max_per_day,
            "proposal store opened"
        );
        Ok(store)
    }

    pub fn params(&self) -> &StoreParams {
        &self.params
    }

    /// Make all previous writes durable.
    pub fn flush(&self) -> Result<(), GovernanceError> {
        let _guard = self.guard();
        self.kv.flush()?;
        Ok(())
    }

    /// Favorites kept on the same medium.
    pub fn favorites(&self) -> FavoritesManager {
        FavoritesManager::load(self.kv.clone(), self.clock.clone())
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Validate, rate-limit and persist a new proposal.
    pub fn try_submit_proposal(&self, input: NewProposal) -> Result<Proposal, GovernanceError> {
        input.validate()?;

        let _guard = self.guard();
        let now = self.clock.now();
        let mut proposals = self.load_proposals()?;

        if proposals.iter().any(|p| p.id == input.id) {
            return Err(GovernanceError::DuplicateProposal(input.id));
        }

        let usage = CreatorUsage::measure(&proposals, &input.creator, now);
        if let Err(violation) = check_submission(&usage, now, &self.params.rate_limits) {
            warn!(creator = %input.creator, %violation, "proposal submission rate limited");
            return Err(violation.into());
        }

        let proposal = input.into_proposal(now);
        proposals.push(proposal.clone());
        self.save_proposals(&proposals)?;

        self.append_history(HistoryEntry {
            kind: ActivityKind::ProposalSubmitted,
            proposal_id: proposal.id,
            timestamp: now,
            actor: Some(proposal.creator.clone()),
        });

        info!(
            id = %proposal.id,
            creator = %proposal.creator,
            category = %proposal.category,
            "proposal submitted"
        );
        Ok(proposal)
    }

    /// [`try_submit_proposal`](Self::try_submit_proposal) reduced to success
    /// or failure.
    pub fn submit_proposal(&self, input: NewProposal) -> bool {
        match self.try_submit_proposal(input) {
            Ok(_) => true,
            Err(e) if e.is_user_facing() => {
                warn!(error = %e, "proposal rejected");
                false
            }
            Err(e) => {
                error!(error = %e, "failed to store proposal");
                false
            }
        }
    }

    // ── Votes ───────────────────────────────────────────────────────────

    /// Record a vote without any duplicate or deadline check.
    ///
    /// Callers that need one-vote-per-address consult
    /// [`get_user_voting_state`](Self::get_user_voting_state) first, or use
    /// [`cast_vote`](Self::cast_vote).
    pub fn store_vote(
        &self,
        id: ProposalId,
        vote: VoteChoice,
        voter: &WalletAddress,
        tx_id: &str,
    ) -> bool {
        let _guard = self.guard();
        match self.record_vote(id, vote, voter, tx_id) {
            Ok(_) => true,
            Err(e) => {
                error!(%id, %voter, error = %e, "failed to store vote");
                false
            }
        }
    }

    /// Record a vote only if `voter` has not voted on `id` yet and the
    /// proposal is still open.
    pub fn cast_vote(
        &self,
        id: ProposalId,
        vote: VoteChoice,
        voter: &WalletAddress,
        tx_id: &str,
    ) -> Result<VotingRecord, GovernanceError> {
        let _guard = self.guard();
        let now = self.clock.now();

        let history = self.load_voting_history(voter)?;
        if history.iter().any(|r| r.proposal_id == id) {
            return Err(GovernanceError::AlreadyVoted {
                voter: voter.clone(),
                proposal: id,
            });
        }

        let proposals = self.load_proposals()?;
        let proposal = proposals
            .iter()
            .find(|p| p.id == id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if !proposal.is_voting_open(now) {
            return Err(GovernanceError::VotingClosed(id));
        }

        Ok(self.record_vote(id, vote, voter, tx_id)?)
    }

    /// Counters are written before the voter's history so a failed write
    /// never leaves a record that was not counted. If the history write
    /// fails the counters are restored.
    fn record_vote(
        &self,
        id: ProposalId,
        vote: VoteChoice,
        voter: &WalletAddress,
        tx_id: &str,
    ) -> Result<VotingRecord, StoreError> {
        let now = self.clock.now();
        let proposals = self.load_proposals()?;
        let index = proposals.iter().position(|p| p.id == id);

        let record = VotingRecord {
            proposal_id: id,
            proposal_title: index
                .map(|i| proposals[i].title.clone())
                .unwrap_or_else(|| format!("Proposal #{id}")),
            vote,
            timestamp: now,
            tx_id: tx_id.to_string(),
            confirmed_round: LOCAL_CONFIRMED_ROUND,
        };

        let history_key = keys::user_votes(voter);
        let mut history: Vec<VotingRecord> = self.kv.get_json_or_default(&history_key)?;
        history.push(record.clone());

        let tally = match index {
            Some(i) => {
                let mut counted = proposals.clone();
                let proposal = &mut counted[i];
                match vote {
                    VoteChoice::For => proposal.vote_yes += 1,
                    VoteChoice::Against => proposal.vote_no += 1,
                }
                let tally = ProposalTally::from_proposal(proposal, now);
                self.save_proposals(&counted)?;
                Some(tally)
            }
            None => {
                warn!(%id, %voter, "vote recorded for unknown proposal");
                None
            }
        };

        if let Err(e) = self.kv.put_json(&history_key, &history) {
            if tally.is_some() {
                if let Err(rollback) = self.save_proposals(&proposals) {
                    error!(%id, error = %rollback, "failed to restore vote counters");
                }
            }
            return Err(e);
        }

        if let Some(tally) = tally {
            if let Err(e) = self.kv.put_json(&keys::proposal_votes(id), &tally) {
                warn!(%id, error = %e, "failed to refresh tally cache");
            }
        }

        self.append_vote_log(VoteLogEntry {
            proposal_id: id,
            vote,
            timestamp: now,
            voter: voter.clone(),
            tx_id: Some(tx_id.to_string()),
        });
        self.append_history(HistoryEntry {
            kind: ActivityKind::VoteCast,
            proposal_id: id,
            timestamp: now,
            actor: Some(voter.clone()),
        });

        info!(%id, %voter, vote = %vote, "vote stored");
        Ok(record)
    }

    /// How `voter` voted on `id`, taken from their most recent record.
    pub fn get_user_voting_state(&self, id: ProposalId, voter: &WalletAddress) -> VotingState {
        let record = self
            .get_user_voting_history(voter)
            .into_iter()
            .find(|r| r.proposal_id == id);
        VotingState::from_record(record)
    }

    /// Every vote `voter` has cast, most recent first.
    pub fn get_user_voting_history(&self, voter: &WalletAddress) -> Vec<VotingRecord> {
        match self.load_voting_history(voter) {
            Ok(mut history) => {
                history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                history
            }
            Err(e) => {
                error!(%voter, error = %e, "failed to read voting history");
                Vec::new()
            }
        }
    }

    pub fn get_batch_voting_states(
        &self,
        ids: &[ProposalId],
        voter: &WalletAddress,
    ) -> BTreeMap<ProposalId, VotingState> {
        let history = self.get_user_voting_history(voter);
        ids.iter()
            .map(|id| {
                let record = history.iter().find(|r| r.proposal_id == *id).cloned();
                (*id, VotingState::from_record(record))
            })
            .collect()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Proposals matching `filter`, in stored order.
    pub fn get_proposals(&self, filter: &ProposalFilter) -> Vec<Proposal> {
        let mut proposals = match self.load_proposals() {
            Ok(proposals) => proposals,
            Err(e) => {
                error!(error = %e, "failed to read proposals");
                return Vec::new();
            }
        };
        debug!(stored = proposals.len(), "loaded proposals");

        if proposals.is_empty() {
            if let Some(remote) = self.available_remote() {
                match remote.fetch_proposals() {
                    Ok(fetched) => {
                        debug!(fetched = fetched.len(), "using remote proposals");
                        proposals = fetched;
                    }
                    Err(e) => warn!(error = %e, "remote proposal fetch failed"),
                }
            }
        }

        filter.apply(proposals)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Option<Proposal> {
        match self.load_proposals() {
            Ok(proposals) => {
                if let Some(found) = proposals.into_iter().find(|p| p.id == id) {
                    return Some(found);
                }
            }
            Err(e) => {
                error!(%id, error = %e, "failed to read proposals");
                return None;
            }
        }

        let remote = self.available_remote()?;
        remote.fetch_proposal(id).unwrap_or_else(|e| {
            warn!(%id, error = %e, "remote proposal fetch failed");
            None
        })
    }

    pub fn get_proposal_votes(&self, id: ProposalId) -> Option<ProposalTally> {
        let proposal = self.get_proposal(id)?;
        Some(ProposalTally::from_proposal(&proposal, self.clock.now()))
    }

    pub fn get_stats(&self, user: Option<&WalletAddress>) -> DaoStats {
        let proposals = self.get_proposals(&ProposalFilter::default());
        let user_votes = user
            .map(|u| self.get_user_voting_history(u).len())
            .unwrap_or(0);
        DaoStats::collect(&proposals, user, user_votes)
    }

    pub fn get_impact_metrics(&self) -> ImpactMetrics {
        ImpactMetrics::estimate(&self.get_proposals(&ProposalFilter::default()))
    }

    pub fn get_user_proposal_limits(&self, address: &WalletAddress) -> UserProposalLimits {
        let now = self.clock.now();
        let limits = &self.params.rate_limits;
        match self.load_proposals() {
            Ok(proposals) => {
                let usage = CreatorUsage::measure(&proposals, address, now);
                UserProposalLimits::from_usage(&usage, now, limits)
            }
            Err(e) => {
                error!(%address, error = %e, "failed to read proposals for limits");
                UserProposalLimits::unused(now, limits)
            }
        }
    }

    // ── Maintenance ─────────────────────────────────────────────────────

    /// Expire overdue proposals and remove unpreserved ones whose deadline
    /// passed more than `days_to_keep` days ago.
    pub fn cleanup_expired_proposals(&self, days_to_keep: u64) -> CleanupReport {
        let _guard = self.guard();
        let retention_ms = days_to_keep.saturating_mul(econexus_types::time::MS_PER_DAY);
        match self.sweep(retention_ms) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "expired proposal cleanup failed");
                CleanupReport::default()
            }
        }
    }

    /// [`cleanup_expired_proposals`](Self::cleanup_expired_proposals) with the
    /// configured retention.
    pub fn cleanup_expired(&self) -> CleanupReport {
        self.cleanup_expired_proposals(self.params.retention_days)
    }

    fn sweep(&self, retention_ms: u64) -> Result<CleanupReport, StoreError> {
        let now = self.clock.now();
        let sweep = sweep_expired(self.load_proposals()?, now, retention_ms);
        self.save_proposals(&sweep.kept)?;
        for id in &sweep.removed {
            self.kv.delete(&keys::proposal_votes(*id))?;
        }

        let report = sweep.report();
        info!(
            removed = report.removed_count,
            kept = report.kept_count,
            newly_expired = sweep.newly_expired,
            "expired proposal cleanup finished"
        );
        Ok(report)
    }

    /// Compact proposals and activity logs when their combined size crosses
    /// the budget threshold.
    pub fn enforce_storage_limits(&self) -> StorageReport {
        let _guard = self.guard();
        match self.compact_to_budget() {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "storage enforcement failed");
                StorageReport::unavailable()
            }
        }
    }

    fn compact_to_budget(&self) -> Result<StorageReport, StoreError> {
        let budget = &self.params.storage;
        let usage = StorageUsage {
            proposals: self.load_proposals()?,
            votes: self.kv.get_json_or_default(keys::VOTE_LOG)?,
            history: self.kv.get_json_or_default(keys::USER_HISTORY)?,
        };
        let old_size = usage.size()?;
        let threshold = budget.cleanup_threshold_bytes();
        debug!(size = old_size, threshold, "storage usage");

        if old_size <= threshold {
            return Ok(StorageReport::WithinBudget {
                current_size: old_size,
                proposals_count: usage.proposals.len(),
            });
        }

        let total = usage.proposals.len();
        let old_votes_len = encoded_len(&usage.votes)?;
        let old_history_len = encoded_len(&usage.history)?;
        let compaction = budget::compact(usage, budget);
        let compacted = &compaction.usage;
        self.save_proposals(&compacted.proposals)?;

        // Proposals are compacted; a log that cannot be rewritten keeps its
        // old size and is retried on the next pass.
        let mut new_size = encoded_len(&compacted.proposals)?;
        new_size += match self.kv.put_json(keys::VOTE_LOG, &compacted.votes) {
            Ok(len) => len,
            Err(e) => {
                warn!(error = %e, "failed to compact vote log");
                old_votes_len
            }
        };
        new_size += match self.kv.put_json(keys::USER_HISTORY, &compacted.history) {
            Ok(len) => len,
            Err(e) => {
                warn!(error = %e, "failed to compact user history");
                old_history_len
            }
        };
        for id in &compaction.evicted {
            if let Err(e) = self.kv.delete(&keys::proposal_votes(*id)) {
                warn!(%id, error = %e, "failed to delete tally cache");
            }
        }

        let kept = compacted.proposals.len();
        warn!(
            old_size,
            new_size,
            kept,
            removed = total - kept,
            "storage threshold exceeded, compacted"
        );
        Ok(StorageReport::Compacted {
            old_size,
            new_size,
            proposals_kept: kept,
            proposals_removed: total - kept,
        })
    }

    // ── Creator mutations ───────────────────────────────────────────────

    /// Remove a proposal that nobody has voted on. Only its creator may.
    pub fn delete_proposal(
        &self,
        id: ProposalId,
        requester: &WalletAddress,
    ) -> Result<(), GovernanceError> {
        let _guard = self.guard();
        let mut proposals = self.load_proposals()?;
        let index = proposals
            .iter()
            .position(|p| p.id == id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        ensure_mutable(&proposals[index], requester, Mutation::Delete)?;

        proposals.remove(index);
        self.save_proposals(&proposals)?;

        // The proposal is gone; leftovers under side keys are only logged.
        if let Err(e) = self.kv.delete(&keys::proposal_votes(id)) {
            warn!(%id, error = %e, "failed to delete tally cache");
        }
        if let Err(e) = self.forget_own_votes(id, requester) {
            warn!(%id, %requester, error = %e, "failed to prune voting history");
        }

        info!(%id, %requester, "proposal deleted");
        Ok(())
    }

    fn forget_own_votes(&self, id: ProposalId, voter: &WalletAddress) -> Result<(), StoreError> {
        let history_key = keys::user_votes(voter);
        if let Some(mut history) = self.kv.get_json::<Vec<VotingRecord>>(&history_key)? {
            history.retain(|r| r.proposal_id != id);
            self.kv.put_json(&history_key, &history)?;
        }
        Ok(())
    }

    /// Edit the descriptive fields of a proposal nobody has voted on. Only
    /// its creator may.
    pub fn update_proposal(
        &self,
        update: ProposalUpdate,
        requester: &WalletAddress,
    ) -> Result<(), GovernanceError> {
        update.validate()?;

        let _guard = self.guard();
        let mut proposals: Vec<Proposal> = self
            .kv
            .get_json(keys::PROPOSALS)?
            .ok_or(GovernanceError::NoProposals)?;
        let id = update.id;
        let proposal = proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        ensure_mutable(proposal, requester, Mutation::Update)?;

        update.apply_to(proposal);
        self.save_proposals(&proposals)?;

        info!(%id, %requester, "proposal updated");
        Ok(())
    }

    // ── Development resets ──────────────────────────────────────────────

    /// Remove the proposal collection and every `proposal_*` key.
    pub fn clear_all_proposals(&self) {
        let _guard = self.guard();
        let result = self.kv.delete(keys::PROPOSALS).and_then(|()| {
            self.delete_prefixed(keys::PROPOSAL_PREFIX)
        });
        match result {
            Ok(removed) => info!(removed_keys = removed + 1, "all proposal data cleared"),
            Err(e) => error!(error = %e, "failed to clear proposals"),
        }
    }

    /// Remove every per-voter vote key.
    pub fn clear_all_votes(&self) {
        let _guard = self.guard();
        let result = self
            .delete_prefixed(keys::VOTE_PREFIX)
            .and_then(|legacy| Ok(legacy + self.delete_prefixed(keys::USER_VOTES_PREFIX)?));
        match result {
            Ok(removed) => info!(removed_keys = removed, "all voting data cleared"),
            Err(e) => error!(error = %e, "failed to clear votes"),
        }
    }

    /// Remove every key from the medium.
    pub fn clear_all_data(&self) {
        let _guard = self.guard();
        match self.kv.clear() {
            Ok(()) => info!("all stored data cleared"),
            Err(e) => error!(error = %e, "failed to clear stored data"),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.op_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        self.kv.get_json_or_default(keys::PROPOSALS)
    }

    fn save_proposals(&self, proposals: &[Proposal]) -> Result<(), StoreError> {
        let bytes = self.kv.put_json(keys::PROPOSALS, proposals)?;
        debug!(count = proposals.len(), bytes, "proposals saved");
        Ok(())
    }

    fn load_voting_history(&self, voter: &WalletAddress) -> Result<Vec<VotingRecord>, StoreError> {
        self.kv.get_json_or_default(&keys::user_votes(voter))
    }

    fn available_remote(&self) -> Option<&Arc<dyn RemoteProposalSource>> {
        self.remote.as_ref().filter(|r| r.is_available())
    }

    fn delete_prefixed(&self, prefix: &str) -> Result<usize, StoreError> {
        let doomed = self.kv.keys_with_prefix(prefix)?;
        for key in &doomed {
            self.kv.delete(key)?;
        }
        Ok(doomed.len())
    }

    fn append_vote_log(&self, entry: VoteLogEntry) {
        if let Err(e) = self.append(keys::VOTE_LOG, entry) {
            warn!(error = %e, "failed to append to vote log");
        }
    }

    fn append_history(&self, entry: HistoryEntry) {
        if let Err(e) = self.append(keys::USER_HISTORY, entry) {
            warn!(error = %e, "failed to append to user history");
        }
    }

    fn append<T>(&self, key: &str, entry: T) -> Result<(), StoreError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let mut log: Vec<T> = self.kv.get_json_or_default(key)?;
        log.push(entry);
        self.kv.put_json(key, &log)?;
        Ok(())
    }
}

fn ensure_mutable(
    proposal: &Proposal,
    requester: &WalletAddress,
    mutation: Mutation,
) -> Result<(), GovernanceError> {
    if &proposal.creator != requester {
        return Err(GovernanceError::NotCreator(mutation));
    }
    if proposal.has_votes() {
        return Err(GovernanceError::HasVotes(mutation));
    }
    Ok(())
}

impl std::fmt::Debug for ProposalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalStore")
            .field("params", &self.params)
            .field("remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econexus_nullables::{NullClock, NullKvStore, NullRemote};
    use econexus_types::time::{MS_PER_DAY, MS_PER_MINUTE};
    use econexus_types::{ProposalStatus, Timestamp};

    const T0: u64 = 1_700_000_000_000;

    struct Fixture {
        kv: Arc<NullKvStore>,
        clock: Arc<NullClock>,
        store: ProposalStore,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(NullKvStore::new());
        let clock = Arc::new(NullClock::new(T0));
        let store = ProposalStore::new(kv.clone(), clock.clone(), StoreParams::default());
        Fixture { kv, clock, store }
    }

    fn input(id: u64, creator: &str, end_time: Timestamp) -> NewProposal {
        NewProposal {
            id: ProposalId::new(id),
            title: format!("Proposal {id}"),
            description: "desc".into(),
            creator: WalletAddress::new(creator),
            funding_amount: 1_000.0,
            category: "reforestation".into(),
            end_time,
            ai_score: None,
            expected_impact: None,
            location: None,
        }
    }

    fn week_from(clock: &NullClock) -> Timestamp {
        clock.now().plus_days(7)
    }

    #[test]
    fn duplicate_id_rejected() {
        let f = fixture();
        f.store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        f.clock.advance(31 * MS_PER_MINUTE);
        let err = f
            .store
            .try_submit_proposal(input(1, "B", week_from(&f.clock)))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::DuplicateProposal(id) if id.get() == 1));
    }

    #[test]
    fn spacing_violation_reports_minutes() {
        let f = fixture();
        assert!(f.store.submit_proposal(input(1, "A", week_from(&f.clock))));
        f.clock.advance(5 * MS_PER_MINUTE);
        let err = f
            .store
            .try_submit_proposal(input(2, "A", week_from(&f.clock)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please wait 25 minute(s) before submitting another proposal"
        );
        assert!(!f.store.submit_proposal(input(2, "A", week_from(&f.clock))));
    }

    #[test]
    fn write_failure_makes_submit_false() {
        let f = fixture();
        f.kv.set_fail_writes(true);
        assert!(!f.store.submit_proposal(input(1, "A", week_from(&f.clock))));
        f.kv.set_fail_writes(false);
        assert!(f.store.get_proposals(&ProposalFilter::default()).is_empty());
    }

    #[test]
    fn corrupt_collection_reads_as_empty() {
        let f = fixture();
        f.kv.put(keys::PROPOSALS, "{broken").unwrap();
        assert!(f.store.get_proposals(&ProposalFilter::default()).is_empty());
        assert_eq!(f.store.cleanup_expired_proposals(7), CleanupReport::default());
        assert_eq!(f.store.enforce_storage_limits(), StorageReport::unavailable());
        assert!(ProposalStore::open(f.kv.clone(), f.clock.clone(), StoreParams::default()).is_err());
    }

    #[test]
    fn store_vote_backfills_title_and_caches_tally() {
        let f = fixture();
        f.store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        let voter = WalletAddress::new("V");
        assert!(f.store.store_vote(ProposalId::new(1), VoteChoice::For, &voter, "TX1"));
        assert!(f.store.store_vote(ProposalId::new(99), VoteChoice::Against, &voter, "TX2"));

        let history = f.store.get_user_voting_history(&voter);
        assert_eq!(history.len(), 2);
        let titles: Vec<_> = history.iter().map(|r| r.proposal_title.as_str()).collect();
        assert!(titles.contains(&"Proposal 1"));
        assert!(titles.contains(&"Proposal #99"));
        assert!(history.iter().all(|r| r.confirmed_round == 1));

        let tally: ProposalTally = f
            .kv
            .get_json(&keys::proposal_votes(ProposalId::new(1)))
            .unwrap()
            .unwrap();
        assert_eq!(tally.yes_votes, 1);
        assert_eq!(tally.yes_percentage, 100);
        assert!(f
            .kv
            .get(&keys::proposal_votes(ProposalId::new(99)))
            .unwrap()
            .is_none());

        let log: Vec<VoteLogEntry> = f.kv.get_json_or_default(keys::VOTE_LOG).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].tx_id.as_deref(), Some("TX1"));
        let activity: Vec<HistoryEntry> = f.kv.get_json_or_default(keys::USER_HISTORY).unwrap();
        assert_eq!(activity.len(), 3);
        assert_eq!(activity[0].kind, ActivityKind::ProposalSubmitted);
    }

    #[test]
    fn history_is_most_recent_first() {
        let f = fixture();
        let voter = WalletAddress::new("V");
        for id in 1..=3 {
            f.store
                .store_vote(ProposalId::new(id), VoteChoice::For, &voter, "TX");
            f.clock.advance(1_000);
        }
        let ids: Vec<u64> = f
            .store
            .get_user_voting_history(&voter)
            .iter()
            .map(|r| r.proposal_id.get())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn cast_vote_rejects_unknown_and_closed() {
        let f = fixture();
        let voter = WalletAddress::new("V");
        let err = f
            .store
            .cast_vote(ProposalId::new(5), VoteChoice::For, &voter, "TX")
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotFound(_)));

        f.store
            .try_submit_proposal(input(5, "A", f.clock.now().plus_millis(1_000)))
            .unwrap();
        f.clock.advance(1_000);
        let err = f
            .store
            .cast_vote(ProposalId::new(5), VoteChoice::For, &voter, "TX")
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingClosed(_)));
        assert!(f.store.get_user_voting_history(&voter).is_empty());
    }

    #[test]
    fn batch_states_cover_every_requested_id() {
        let f = fixture();
        let voter = WalletAddress::new("V");
        f.store
            .store_vote(ProposalId::new(1), VoteChoice::Against, &voter, "TX");
        let states = f
            .store
            .get_batch_voting_states(&[ProposalId::new(1), ProposalId::new(2)], &voter);
        assert_eq!(states.len(), 2);
        assert_eq!(
            states[&ProposalId::new(1)].user_vote,
            Some(VoteChoice::Against)
        );
        assert!(!states[&ProposalId::new(2)].has_voted);
    }

    #[test]
    fn remote_fallback_only_when_local_is_empty() {
        let mut remote_proposal = input(50, "R", Timestamp::from_millis(T0 + MS_PER_DAY))
            .into_proposal(Timestamp::from_millis(T0));
        remote_proposal.status = ProposalStatus::Active;
        let remote = Arc::new(NullRemote::new(vec![remote_proposal]));

        let f = fixture();
        let store = ProposalStore::new(f.kv.clone(), f.clock.clone(), StoreParams::default())
            .with_remote(remote.clone());

        assert_eq!(store.get_proposals(&ProposalFilter::default()).len(), 1);
        assert!(store.get_proposal(ProposalId::new(50)).is_some());
        assert_eq!(remote.fetch_count(), 2);

        store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        let ids: Vec<u64> = store
            .get_proposals(&ProposalFilter::default())
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![1]);

        remote.set_available(false);
        assert!(store.get_proposal(ProposalId::new(50)).is_none());
        assert_eq!(remote.fetch_count(), 2);
    }

    #[test]
    fn store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProposalStore>();
    }

    #[test]
    fn update_requires_a_collection() {
        let f = fixture();
        let update = ProposalUpdate {
            id: ProposalId::new(1),
            title: "x".into(),
            description: "y".into(),
            funding_amount: 1.0,
            category: "other".into(),
            expected_impact: None,
            location: None,
        };
        let err = f
            .store
            .update_proposal(update, &WalletAddress::new("A"))
            .unwrap_err();
        assert_eq!(err.to_string(), "No proposals found");
    }

    #[test]
    fn delete_drops_tally_and_requesters_own_records() {
        let f = fixture();
        let creator = WalletAddress::new("A");
        f.store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        // A stale record for the proposal, as left by an older client.
        f.kv
            .put_json(
                &keys::user_votes(&creator),
                &vec![VotingRecord {
                    proposal_id: ProposalId::new(1),
                    proposal_title: "Proposal 1".into(),
                    vote: VoteChoice::For,
                    timestamp: f.clock.now(),
                    tx_id: "TX".into(),
                    confirmed_round: 1,
                }],
            )
            .unwrap();
        f.kv.put(&keys::proposal_votes(ProposalId::new(1)), "{}").unwrap();

        f.store.delete_proposal(ProposalId::new(1), &creator).unwrap();
        assert!(f.store.get_proposal(ProposalId::new(1)).is_none());
        assert!(f.store.get_user_voting_history(&creator).is_empty());
        assert!(f
            .kv
            .get(&keys::proposal_votes(ProposalId::new(1)))
            .unwrap()
            .is_none());
    }

    #[test]
    fn resets_remove_their_key_families() {
        let f = fixture();
        let voter = WalletAddress::new("V");
        f.store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        f.store.store_vote(ProposalId::new(1), VoteChoice::For, &voter, "TX");
        f.kv.put("vote_V_1", "{}").unwrap();

        f.store.clear_all_votes();
        assert!(f.kv.get("vote_V_1").unwrap().is_none());
        assert!(f.store.get_user_voting_history(&voter).is_empty());
        assert_eq!(f.store.get_proposals(&ProposalFilter::default()).len(), 1);

        f.store.clear_all_proposals();
        assert!(f.store.get_proposals(&ProposalFilter::default()).is_empty());
        assert!(f.kv.keys_with_prefix(keys::PROPOSAL_PREFIX).unwrap().is_empty());
        assert!(f.kv.get(keys::VOTE_LOG).unwrap().is_some());

        f.store.clear_all_data();
        assert!(f.kv.keys().unwrap().is_empty());
    }

    #[test]
    fn limits_snapshot_reflects_usage() {
        let f = fixture();
        f.store
            .try_submit_proposal(input(1, "A", week_from(&f.clock)))
            .unwrap();
        f.clock.advance(10 * MS_PER_MINUTE);
        let snap = f.store.get_user_proposal_limits(&WalletAddress::new("A"));
        assert_eq!(snap.current_total, 1);
        assert_eq!(snap.remaining_today, 2);
        assert_eq!(
            snap.can_submit_next,
            Timestamp::from_millis(T0 + 30 * MS_PER_MINUTE)
        );
    }
}
