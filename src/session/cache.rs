use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::profile::AthleteProfile;
use crate::prompts::ModuleKind;

/// Stable key for a (module, profile) request: SHA-256 over the module slug
/// and the profile's canonical JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

#[derive(Serialize)]
struct FingerprintInput<'a> {
    module: &'a str,
    profile: &'a AthleteProfile,
}

impl Fingerprint {
    pub fn of(module: ModuleKind, profile: &AthleteProfile) -> Self {
        let input = FingerprintInput {
            module: module.as_str(),
            profile,
        };
        // Serializing plain structs, enums, strings and a BTreeSet cannot fail.
        let canonical = serde_json::to_vec(&input).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell entries apart in logs
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// Generated text for this session, keyed by request fingerprint.
///
/// Entries are never evicted. A profile change produces a new fingerprint,
/// so older entries stay reachable if the athlete switches back.
#[derive(Debug, Default)]
pub struct PlanCache {
    entries: HashMap<Fingerprint, String>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module: ModuleKind, profile: &AthleteProfile) -> Option<&str> {
        self.entries
            .get(&Fingerprint::of(module, profile))
            .map(String::as_str)
    }

    /// Store `text`, replacing only an entry with the same fingerprint.
    pub fn put(&mut self, module: ModuleKind, profile: &AthleteProfile, text: impl Into<String>) {
        self.entries
            .insert(Fingerprint::of(module, profile), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
