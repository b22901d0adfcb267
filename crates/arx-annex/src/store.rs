use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use arx_types::{AssetId, Principal, Timestamp};

/// One reader's rating of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub reviewer: Principal,
    /// Rating on a 1–5 scale.
    pub rating: u8,
    pub comment: String,
    pub at: Timestamp,
}

/// A free-text comment on an asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Principal,
    pub text: String,
    pub at: Timestamp,
}

/// One line of an asset's update history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: Timestamp,
    pub note: String,
}

/// The descriptive record kept alongside one asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnexRecord {
    pub metadata_uri: String,
    pub document_uri: String,
    /// BLAKE3 digest of the canonical document, if registered.
    pub document_digest: Option<[u8; 32]>,
    pub preview_uri: Option<String>,
    /// Translated renditions keyed by language tag.
    pub translations: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub feedback: Vec<Feedback>,
    pub views: u64,
    pub update_log: Vec<LogEntry>,
}

/// Bookkeeping store for all assets, plus a process-wide engagement ledger.
#[derive(Clone, Debug, Default)]
pub struct Annex {
    records: HashMap<AssetId, AnnexRecord>,
    engagement: HashMap<Principal, u64>,
}

impl Annex {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The BLAKE3 digest of a document's bytes, as stored by
    /// [`register_document_digest`](Self::register_document_digest).
    pub fn digest_of(content: &[u8]) -> [u8; 32] {
        *blake3::hash(content).as_bytes()
    }

    /// Start a record for a freshly minted asset.
    pub fn init_asset(&mut self, asset: AssetId, metadata_uri: String, document_uri: String) {
        self.records.insert(
            asset,
            AnnexRecord {
                metadata_uri,
                document_uri,
                ..Default::default()
            },
        );
    }

    /// Drop the record of a revoked asset.
    pub fn remove_asset(&mut self, asset: AssetId) {
        self.records.remove(&asset);
    }

    /// The record for `asset`, if one exists.
    pub fn record(&self, asset: AssetId) -> Option<&AnnexRecord> {
        self.records.get(&asset)
    }

    fn entry(&mut self, asset: AssetId) -> &mut AnnexRecord {
        self.records.entry(asset).or_default()
    }

    // ---- Pointers ----

    pub fn set_metadata_uri(&mut self, asset: AssetId, uri: String) {
        self.entry(asset).metadata_uri = uri;
        debug!(%asset, "metadata pointer updated");
    }

    pub fn set_document_uri(&mut self, asset: AssetId, uri: String) {
        self.entry(asset).document_uri = uri;
        debug!(%asset, "document pointer updated");
    }

    pub fn set_preview_uri(&mut self, asset: AssetId, uri: String) {
        self.entry(asset).preview_uri = Some(uri);
    }

    /// Record the canonical document digest for later verification.
    pub fn register_document_digest(&mut self, asset: AssetId, digest: [u8; 32]) {
        self.entry(asset).document_digest = Some(digest);
    }

    /// `true` if `digest` matches the registered document digest.
    pub fn verify_document_digest(&self, asset: AssetId, digest: [u8; 32]) -> bool {
        self.record(asset)
            .and_then(|r| r.document_digest)
            .map(|stored| stored == digest)
            .unwrap_or(false)
    }

    // ---- Translations ----

    pub fn set_translation(&mut self, asset: AssetId, language: String, text: String) {
        self.entry(asset).translations.insert(language, text);
    }

    pub fn translation(&self, asset: AssetId, language: &str) -> Option<&str> {
        self.record(asset)?.translations.get(language).map(String::as_str)
    }

    // ---- Tags, comments, feedback ----

    /// Add a tag; duplicates are ignored.
    pub fn add_tag(&mut self, asset: AssetId, tag: String) {
        let tags = &mut self.entry(asset).tags;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    pub fn tags(&self, asset: AssetId) -> &[String] {
        self.record(asset).map(|r| r.tags.as_slice()).unwrap_or(&[])
    }

    pub fn add_comment(&mut self, asset: AssetId, author: Principal, text: String, at: Timestamp) {
        self.entry(asset).comments.push(Comment { author, text, at });
    }

    pub fn comments(&self, asset: AssetId) -> &[Comment] {
        self.record(asset).map(|r| r.comments.as_slice()).unwrap_or(&[])
    }

    pub fn add_feedback(
        &mut self,
        asset: AssetId,
        reviewer: Principal,
        rating: u8,
        comment: String,
        at: Timestamp,
    ) {
        self.entry(asset).feedback.push(Feedback {
            reviewer,
            rating,
            comment,
            at,
        });
    }

    pub fn feedback(&self, asset: AssetId) -> &[Feedback] {
        self.record(asset).map(|r| r.feedback.as_slice()).unwrap_or(&[])
    }

    /// Integer average of all ratings, or `None` without feedback.
    pub fn average_rating(&self, asset: AssetId) -> Option<u8> {
        let feedback = self.feedback(asset);
        if feedback.is_empty() {
            return None;
        }
        let sum: u64 = feedback.iter().map(|f| f.rating as u64).sum();
        Some((sum / feedback.len() as u64) as u8)
    }

    // ---- Counters and logs ----

    /// Count one view and return the new total.
    pub fn record_view(&mut self, asset: AssetId) -> u64 {
        let record = self.entry(asset);
        record.views += 1;
        record.views
    }

    pub fn views(&self, asset: AssetId) -> u64 {
        self.record(asset).map(|r| r.views).unwrap_or(0)
    }

    /// Award engagement points to a principal.
    pub fn award_engagement(&mut self, principal: Principal, points: u64) -> u64 {
        let entry = self.engagement.entry(principal).or_insert(0);
        *entry += points;
        *entry
    }

    pub fn engagement(&self, principal: Principal) -> u64 {
        self.engagement.get(&principal).copied().unwrap_or(0)
    }

    pub fn add_log(&mut self, asset: AssetId, note: String, at: Timestamp) {
        self.entry(asset).update_log.push(LogEntry { at, note });
    }

    pub fn logs(&self, asset: AssetId) -> &[LogEntry] {
        self.record(asset)
            .map(|r| r.update_log.as_slice())
            .unwrap_or(&[])
    }

    // ---- Export ----

    /// Snapshot the record as JSON for external consumption.
    pub fn export(&self, asset: AssetId) -> Option<serde_json::Value> {
        self.record(asset)
            .and_then(|record| serde_json::to_value(record).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> AssetId {
        AssetId::new(0)
    }

    fn seeded() -> Annex {
        let mut annex = Annex::new();
        annex.init_asset(asset(), "ipfs://meta1".into(), "ipfs://doc1".into());
        annex
    }

    #[test]
    fn init_and_update_pointers() {
        let mut annex = seeded();
        assert_eq!(annex.record(asset()).unwrap().metadata_uri, "ipfs://meta1");

        annex.set_metadata_uri(asset(), "ipfs://meta2".into());
        annex.set_document_uri(asset(), "ipfs://doc2".into());
        let record = annex.record(asset()).unwrap();
        assert_eq!(record.metadata_uri, "ipfs://meta2");
        assert_eq!(record.document_uri, "ipfs://doc2");
    }

    #[test]
    fn document_digest_verification() {
        let mut annex = seeded();
        let digest = Annex::digest_of(b"This is a document content");
        annex.register_document_digest(asset(), digest);

        assert!(annex.verify_document_digest(asset(), digest));
        assert!(!annex.verify_document_digest(asset(), Annex::digest_of(b"tampered")));
        assert!(!annex.verify_document_digest(AssetId::new(9), digest));
    }

    #[test]
    fn translations_roundtrip() {
        let mut annex = seeded();
        annex.set_translation(asset(), "fr".into(), "Contenu traduit".into());
        assert_eq!(annex.translation(asset(), "fr"), Some("Contenu traduit"));
        assert_eq!(annex.translation(asset(), "de"), None);
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut annex = seeded();
        annex.add_tag(asset(), "AI".into());
        annex.add_tag(asset(), "AI".into());
        annex.add_tag(asset(), "systems".into());
        assert_eq!(annex.tags(asset()), &["AI".to_string(), "systems".to_string()]);
    }

    #[test]
    fn comments_accumulate_in_order() {
        let mut annex = seeded();
        let a = Principal::named("a");
        annex.add_comment(asset(), a, "Insightful work!".into(), Timestamp::new(10));
        annex.add_comment(asset(), a, "Second read, still good".into(), Timestamp::new(20));

        let comments = annex.comments(asset());
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "Insightful work!");
    }

    #[test]
    fn average_rating_is_integer_mean() {
        let mut annex = seeded();
        assert_eq!(annex.average_rating(asset()), None);

        annex.add_feedback(asset(), Principal::named("a"), 3, "Average.".into(), Timestamp::ZERO);
        annex.add_feedback(asset(), Principal::named("b"), 5, "Excellent!".into(), Timestamp::ZERO);
        assert_eq!(annex.average_rating(asset()), Some(4));
    }

    #[test]
    fn view_counter_increments() {
        let mut annex = seeded();
        assert_eq!(annex.record_view(asset()), 1);
        assert_eq!(annex.record_view(asset()), 2);
        assert_eq!(annex.record_view(asset()), 3);
        assert_eq!(annex.views(asset()), 3);
        assert_eq!(annex.views(AssetId::new(9)), 0);
    }

    #[test]
    fn engagement_points_accumulate() {
        let mut annex = Annex::new();
        let user = Principal::named("user");
        assert_eq!(annex.award_engagement(user, 10), 10);
        assert_eq!(annex.award_engagement(user, 5), 15);
        assert_eq!(annex.engagement(user), 15);
    }

    #[test]
    fn update_log_accumulates() {
        let mut annex = seeded();
        annex.add_log(asset(), "Log entry 1".into(), Timestamp::new(5));
        assert_eq!(annex.logs(asset()).len(), 1);
        assert_eq!(annex.logs(asset())[0].note, "Log entry 1");
    }

    #[test]
    fn export_includes_the_pointer_fields() {
        let annex = seeded();
        let value = annex.export(asset()).unwrap();
        assert_eq!(value["metadata_uri"], "ipfs://meta1");
        assert_eq!(value["document_uri"], "ipfs://doc1");
    }

    #[test]
    fn remove_clears_the_record() {
        let mut annex = seeded();
        annex.remove_asset(asset());
        assert!(annex.record(asset()).is_none());
        assert!(annex.export(asset()).is_none());
    }
}
