use crate::core::models::recipient::{Recipient, Role};
use crate::core::services::scheme_hints::normalize_hex;

/// Ordered, de-duplicated public keys to try as the counterparty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateKeySet {
    keys: Vec<String>,
}

impl CandidateKeySet {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Derives the candidate key set for a message.
pub struct CandidateKeyResolver;

impl CandidateKeyResolver {
    /// Candidates in order: sender, declared recipients, actor.
    ///
    /// Keys are expected normalized (see `normalize_hex`); anything else
    /// is skipped. Returns `None` when no counterparty can be determined.
    pub fn resolve(
        &self,
        sender: Option<&str>,
        recipients: &[Recipient],
        actor: Option<&str>,
    ) -> Option<CandidateKeySet> {
        let mut keys: Vec<String> = Vec::new();

        let ordered = sender
            .into_iter()
            .chain(recipients.iter().map(|r| r.pubkey.as_str()))
            .chain(actor);

        for raw in ordered {
            if let Some(key) = normalize_hex(raw)
                && !keys.contains(&key)
            {
                keys.push(key);
            }
        }

        (!keys.is_empty()).then_some(CandidateKeySet { keys })
    }
}

/// Collect declared recipients from `["p", <pubkey>, <relay>...]` tags.
///
/// Malformed keys are skipped. A key tagged more than once yields one
/// recipient carrying the union of its relay hints.
pub fn collect_recipients(tags: &[Vec<String>]) -> Vec<Recipient> {
    let mut recipients: Vec<Recipient> = Vec::new();

    for tag in tags.iter().filter(|t| t.first().is_some_and(|n| n == "p")) {
        let Some(pubkey) = tag.get(1).and_then(|k| normalize_hex(k)) else {
            continue;
        };

        let hints = tag
            .iter()
            .skip(2)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty());

        match recipients.iter_mut().find(|r| r.pubkey == pubkey) {
            Some(existing) => {
                for hint in hints {
                    if !existing.relay_hints.iter().any(|h| h == hint) {
                        existing.relay_hints.push(hint.to_string());
                    }
                }
            }
            None => recipients.push(Recipient {
                pubkey,
                relay_hints: hints.map(String::from).collect(),
                role: Role::Recipient,
            }),
        }
    }

    recipients
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> String {
        c.to_string().repeat(64)
    }

    fn tag(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn collects_p_tags_in_order() {
        let tags = vec![
            tag(&["p", &key('b'), "wss://relay.one"]),
            tag(&["e", &key('c')]),
            tag(&["p", &key('a')]),
        ];

        let recipients = collect_recipients(&tags);

        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].pubkey, key('b'));
        assert_eq!(recipients[0].relay_hints, vec!["wss://relay.one"]);
        assert_eq!(recipients[1].pubkey, key('a'));
        assert_eq!(recipients[1].role, Role::Recipient);
    }

    #[test]
    fn merges_relay_hints_of_repeated_recipient() {
        let upper = key('B');
        let tags = vec![
            tag(&["p", &key('b'), "wss://one"]),
            tag(&["p", &upper, "wss://two", "wss://one"]),
        ];

        let recipients = collect_recipients(&tags);

        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].relay_hints, vec!["wss://one", "wss://two"]);
    }

    #[test]
    fn skips_malformed_recipient_keys() {
        let tags = vec![tag(&["p", "npub-not-hex"]), tag(&["p"])];

        assert!(collect_recipients(&tags).is_empty());
    }

    #[test]
    fn orders_sender_recipients_actor() {
        let recipients = collect_recipients(&[tag(&["p", &key('b')])]);

        let set = CandidateKeyResolver
            .resolve(Some(&key('a')), &recipients, Some(&key('c')))
            .unwrap();

        assert_eq!(set.keys(), &[key('a'), key('b'), key('c')]);
    }

    #[test]
    fn never_repeats_a_key_across_roles() {
        let recipients = collect_recipients(&[tag(&["p", &key('a')]), tag(&["p", &key('b')])]);

        let set = CandidateKeyResolver
            .resolve(Some(&key('a')), &recipients, Some(&key('b')))
            .unwrap();

        assert_eq!(set.keys(), &[key('a'), key('b')]);
    }

    #[test]
    fn no_candidates_yields_none() {
        assert!(CandidateKeyResolver.resolve(None, &[], None).is_none());
        assert!(
            CandidateKeyResolver
                .resolve(Some("not-a-key"), &[], Some(""))
                .is_none()
        );
    }
}
