//! Keyword-matched canned replies for local-responder mode.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reply used when no rule matches.
pub const GENERIC_ACKNOWLEDGEMENT: &str = "Obrigado pela sua mensagem! Um de nossos especialistas vai analisar e responder em breve.";

/// A canned reply and the keywords that trigger it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResponderRule {
    #[serde(default)]
    pub name: String,
    pub triggers: Vec<String>,
    pub reply: String,
}

impl ResponderRule {
    fn new(name: &str, triggers: &[&str], reply: &str) -> Self {
        Self {
            name: name.to_string(),
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            reply: reply.to_string(),
        }
    }

    /// `haystack` must already be lowercased.
    fn matches(&self, haystack: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| !trigger.is_empty() && haystack.contains(trigger.as_str()))
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalResponder {
    rules: Vec<ResponderRule>,
    fallback: String,
}

impl LocalResponder {
    /// Builds a responder from `rules`, tried in order.
    ///
    /// Rules with a blank reply are dropped, and a blank `fallback` is replaced by
    /// [`GENERIC_ACKNOWLEDGEMENT`], so every reply is non-empty.
    pub fn new(rules: Vec<ResponderRule>, fallback: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|rule| {
                let usable = !rule.reply.trim().is_empty();
                if !usable {
                    warn!("Dropping responder rule '{}' with a blank reply", rule.name);
                }
                usable
            })
            .map(|rule| ResponderRule {
                triggers: rule.triggers.iter().map(|t| t.to_lowercase()).collect(),
                ..rule
            })
            .collect();

        let fallback = fallback.into();
        let fallback = if fallback.trim().is_empty() {
            GENERIC_ACKNOWLEDGEMENT.to_string()
        } else {
            fallback
        };

        Self { rules, fallback }
    }

    /// Reply for `text`. Matching is a case-insensitive substring test.
    pub fn reply(&self, text: &str) -> String {
        let haystack = text.to_lowercase();
        match self.rules.iter().find(|rule| rule.matches(&haystack)) {
            Some(rule) => {
                debug!("Local responder matched rule '{}'", rule.name);
                rule.reply.clone()
            }
            None => self.fallback.clone(),
        }
    }

    pub fn rules(&self) -> &[ResponderRule] {
        &self.rules
    }
}

impl Default for LocalResponder {
    fn default() -> Self {
        // Pricing goes before greeting: short greeting triggers like "oi" also occur
        // inside longer words.
        let rules = vec![
            ResponderRule::new(
                "pricing",
                &["preço", "preco", "quanto custa", "valor", "plano", "orçamento"],
                "Nossos planos começam a partir de R$ 99/mês. Quer que eu envie a tabela completa de preços?",
            ),
            ResponderRule::new(
                "greeting",
                &["olá", "ola", "oi", "bom dia", "boa tarde", "boa noite"],
                "Olá! Sou o assistente virtual da ChatWise.ai. Como posso ajudar você hoje?",
            ),
            ResponderRule::new(
                "integration",
                &["integrar", "integração", "integracao", "instalar", "api"],
                "A integração leva poucos minutos: basta adicionar nosso widget ao seu site ou aplicação.",
            ),
            ResponderRule::new(
                "support",
                &["ajuda", "suporte", "problema", "erro"],
                "Sinto muito pelo inconveniente! Descreva o problema que nossa equipe de suporte vai ajudar.",
            ),
            ResponderRule::new(
                "thanks",
                &["obrigado", "obrigada", "valeu"],
                "Por nada! Se precisar de mais alguma coisa, é só chamar.",
            ),
            ResponderRule::new(
                "farewell",
                &["tchau", "até logo", "ate logo", "até mais"],
                "Até logo! Foi um prazer conversar com você.",
            ),
        ];
        Self::new(rules, GENERIC_ACKNOWLEDGEMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_reply(responder: &LocalResponder, name: &str) -> String {
        responder
            .rules()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.reply.clone())
            .unwrap()
    }

    #[test]
    fn test_greeting_trigger() {
        let responder = LocalResponder::default();
        assert_eq!(
            responder.reply("Olá, tudo bem?"),
            rule_reply(&responder, "greeting")
        );
    }

    #[test]
    fn test_pricing_trigger() {
        let responder = LocalResponder::default();
        assert_eq!(
            responder.reply("quanto custa?"),
            rule_reply(&responder, "pricing")
        );
    }

    #[test]
    fn test_no_match_returns_generic_acknowledgement() {
        let responder = LocalResponder::default();
        assert_eq!(responder.reply("xyz123"), GENERIC_ACKNOWLEDGEMENT);
        assert_eq!(responder.reply(""), GENERIC_ACKNOWLEDGEMENT);
    }

    #[test]
    fn test_matching_ignores_case() {
        let responder = LocalResponder::default();
        assert_eq!(
            responder.reply("QUANTO CUSTA o PLANO?"),
            rule_reply(&responder, "pricing")
        );
        assert_eq!(
            responder.reply("BOM DIA"),
            rule_reply(&responder, "greeting")
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let responder = LocalResponder::new(
            vec![
                ResponderRule {
                    name: "first".to_string(),
                    triggers: vec!["Alpha".to_string()],
                    reply: "first reply".to_string(),
                },
                ResponderRule {
                    name: "second".to_string(),
                    triggers: vec!["alpha".to_string(), "beta".to_string()],
                    reply: "second reply".to_string(),
                },
            ],
            "none",
        );

        assert_eq!(responder.reply("alpha and beta"), "first reply");
        assert_eq!(responder.reply("only beta"), "second reply");
        assert_eq!(responder.reply("gamma"), "none");
    }

    #[test]
    fn test_empty_trigger_never_matches() {
        let responder = LocalResponder::new(
            vec![ResponderRule {
                name: "empty".to_string(),
                triggers: vec![String::new()],
                reply: "should not happen".to_string(),
            }],
            "fallback",
        );
        assert_eq!(responder.reply("anything"), "fallback");
    }

    #[test]
    fn test_blank_replies_are_never_produced() {
        let responder = LocalResponder::new(
            vec![
                ResponderRule {
                    name: "silent".to_string(),
                    triggers: vec!["oi".to_string()],
                    reply: "  ".to_string(),
                },
                ResponderRule {
                    name: "greeting".to_string(),
                    triggers: vec!["oi".to_string()],
                    reply: "Oi!".to_string(),
                },
            ],
            "",
        );

        assert_eq!(responder.rules().len(), 1);
        assert_eq!(responder.reply("oi"), "Oi!");
        assert_eq!(responder.reply("xyz"), GENERIC_ACKNOWLEDGEMENT);
    }
}
