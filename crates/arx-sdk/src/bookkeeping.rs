//! Descriptive bookkeeping operations on the [`Arx`] facade.
//!
//! These wrap the [`arx_annex`] collaborator: plain key-value state with no
//! core invariants. Writes still run the ban/pause guards plus an ownership
//! guard where the data describes the asset; reads require the asset to
//! exist.

use arx_annex::{Annex, Comment, Feedback, LogEntry};
use arx_registry::OpError;
use arx_types::{AssetId, Principal};

use crate::service::{Arx, ArxResult};

impl Arx {
    /// Replace the metadata pointer. Owner-only.
    pub fn update_metadata_uri(
        &self,
        caller: Principal,
        asset: AssetId,
        uri: String,
    ) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.require_owner(asset, caller)?;
        state.annex.set_metadata_uri(asset, uri);
        Ok(())
    }

    /// Replace the document pointer. Owner-only.
    pub fn update_document_uri(
        &self,
        caller: Principal,
        asset: AssetId,
        uri: String,
    ) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.require_owner(asset, caller)?;
        state.annex.set_document_uri(asset, uri);
        Ok(())
    }

    /// The metadata pointer of `asset`.
    pub fn metadata_uri(&self, asset: AssetId) -> ArxResult<String> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state
            .annex
            .record(asset)
            .map(|r| r.metadata_uri.clone())
            .unwrap_or_default())
    }

    /// The document pointer of `asset`.
    pub fn document_uri(&self, asset: AssetId) -> ArxResult<String> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state
            .annex
            .record(asset)
            .map(|r| r.document_uri.clone())
            .unwrap_or_default())
    }

    /// Register the canonical document digest for `asset`. Admin-only.
    pub fn register_document_digest(
        &self,
        caller: Principal,
        asset: AssetId,
        digest: [u8; 32],
    ) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        arx_gate::require_admin(&state.roles, caller)?;
        state.annex.register_document_digest(asset, digest);
        Ok(())
    }

    /// `true` if `digest` matches the registered document digest.
    pub fn verify_document_digest(&self, asset: AssetId, digest: [u8; 32]) -> bool {
        self.state_read().annex.verify_document_digest(asset, digest)
    }

    /// The BLAKE3 digest of a document's bytes.
    pub fn document_digest_of(content: &[u8]) -> [u8; 32] {
        Annex::digest_of(content)
    }

    /// Set a preview pointer. Owner-only.
    pub fn set_preview(&self, caller: Principal, asset: AssetId, uri: String) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.require_owner(asset, caller)?;
        state.annex.set_preview_uri(asset, uri);
        Ok(())
    }

    /// The preview pointer, if set.
    pub fn preview(&self, asset: AssetId) -> ArxResult<Option<String>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state
            .annex
            .record(asset)
            .and_then(|r| r.preview_uri.clone()))
    }

    /// Store a translated rendition for a language. Owner-only.
    pub fn set_translation(
        &self,
        caller: Principal,
        asset: AssetId,
        language: String,
        text: String,
    ) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.require_owner(asset, caller)?;
        state.annex.set_translation(asset, language, text);
        Ok(())
    }

    /// The stored translation for a language, if any.
    pub fn translation(&self, asset: AssetId, language: &str) -> ArxResult<Option<String>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state
            .annex
            .translation(asset, language)
            .map(str::to_string))
    }

    /// Add a tag. Owner-only; duplicates are ignored.
    pub fn add_tag(&self, caller: Principal, asset: AssetId, tag: String) -> ArxResult<()> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.require_owner(asset, caller)?;
        state.annex.add_tag(asset, tag);
        Ok(())
    }

    /// All tags on `asset`.
    pub fn tags(&self, asset: AssetId) -> ArxResult<Vec<String>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.tags(asset).to_vec())
    }

    /// Add a free-text comment. Any principal not banned may comment.
    pub fn add_comment(&self, caller: Principal, asset: AssetId, text: String) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.get(asset)?;
        state.annex.add_comment(asset, caller, text, now);
        Ok(())
    }

    /// All comments on `asset`, in posting order.
    pub fn comments(&self, asset: AssetId) -> ArxResult<Vec<Comment>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.comments(asset).to_vec())
    }

    /// Add a rating with a comment. Any principal not banned may review.
    pub fn add_feedback(
        &self,
        caller: Principal,
        asset: AssetId,
        rating: u8,
        comment: String,
    ) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.get(asset)?;
        state.annex.add_feedback(asset, caller, rating, comment, now);
        Ok(())
    }

    /// All feedback on `asset`, in posting order.
    pub fn feedback(&self, asset: AssetId) -> ArxResult<Vec<Feedback>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.feedback(asset).to_vec())
    }

    /// Integer average rating, or `None` without feedback.
    pub fn average_rating(&self, asset: AssetId) -> ArxResult<Option<u8>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.average_rating(asset))
    }

    /// Count one view of `asset` and return the new total.
    pub fn record_view(&self, caller: Principal, asset: AssetId) -> ArxResult<u64> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        state.registry.get(asset)?;
        Ok(state.annex.record_view(asset))
    }

    /// The view count of `asset`.
    pub fn views(&self, asset: AssetId) -> ArxResult<u64> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.views(asset))
    }

    /// Award engagement points to a principal. Admin-only.
    pub fn award_engagement(
        &self,
        caller: Principal,
        principal: Principal,
        points: u64,
    ) -> ArxResult<u64> {
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        arx_gate::require_admin(&state.roles, caller)?;
        Ok(state.annex.award_engagement(principal, points))
    }

    /// Accumulated engagement points of a principal.
    pub fn engagement(&self, principal: Principal) -> u64 {
        self.state_read().annex.engagement(principal)
    }

    /// Append an update-log line. Permitted to the owner or administrator.
    pub fn add_log(&self, caller: Principal, asset: AssetId, note: String) -> ArxResult<()> {
        let now = self.clock.now();
        let mut state = self.state_write();
        Self::guard_mutation(&state, caller)?;
        let owner = state.registry.owner_of(asset)?;
        if caller != owner && !state.roles.is_admin(caller) {
            return Err(OpError::Unauthorized(caller));
        }
        state.annex.add_log(asset, note, now);
        Ok(())
    }

    /// The update log of `asset`, in append order.
    pub fn logs(&self, asset: AssetId) -> ArxResult<Vec<LogEntry>> {
        let state = self.state_read();
        state.registry.get(asset)?;
        Ok(state.annex.logs(asset).to_vec())
    }

    /// Export the bookkeeping record as JSON.
    pub fn export(&self, asset: AssetId) -> ArxResult<serde_json::Value> {
        let state = self.state_read();
        state.registry.get(asset)?;
        state
            .annex
            .export(asset)
            .ok_or(OpError::NotFound(asset))
    }
}
